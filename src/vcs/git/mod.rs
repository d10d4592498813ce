pub mod context;
pub mod diff;

use git2::Repository;
use log::debug;
use std::path::{Path, PathBuf};

use crate::error::{Result, VoomError};

use super::traits::{DiffSnapshot, DiffSource, FileLines, LineSource};

pub use context::fetch_context_lines;
pub use diff::{diff_hash, get_working_tree_diff_text};

/// Git backend implementation using git2 library
pub struct GitBackend {
    repo: Repository,
    root_path: PathBuf,
}

impl GitBackend {
    /// Discover the git repository containing `dir`.
    pub fn discover(dir: &Path) -> Result<Self> {
        let not_a_repo = || VoomError::NotARepository(dir.to_path_buf());
        let repo = Repository::discover(dir).map_err(|_| not_a_repo())?;
        let root_path = repo.workdir().ok_or_else(not_a_repo)?.to_path_buf();
        debug!("using git repository at {}", root_path.display());

        Ok(Self { repo, root_path })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl DiffSource for GitBackend {
    fn snapshot(&self) -> Result<DiffSnapshot> {
        let diff = get_working_tree_diff_text(&self.repo)?;
        let hash = diff_hash(&diff);
        debug!("working tree diff: {} bytes, hash {hash}", diff.len());

        Ok(DiffSnapshot {
            diff,
            directory: self.root_path.clone(),
            hash,
        })
    }
}

impl LineSource for GitBackend {
    fn get_lines(&self, path: &str, start: u32, end: u32) -> Result<FileLines> {
        fetch_context_lines(&self.repo, path, start, end)
    }
}
