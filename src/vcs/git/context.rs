use git2::Repository;
use std::path::{Component, Path};

use crate::error::{Result, VoomError};
use crate::vcs::traits::{FileLines, slice_lines};

/// Fetch a line range of `file_path` for context expansion.
///
/// Reads the working tree; files that no longer exist there (deleted files)
/// are read from the HEAD blob instead.
pub fn fetch_context_lines(
    repo: &Repository,
    file_path: &str,
    start_line: u32,
    end_line: u32,
) -> Result<FileLines> {
    let content = read_file(repo, file_path)?;
    Ok(slice_lines(&content, start_line, end_line))
}

fn read_file(repo: &Repository, file_path: &str) -> Result<String> {
    let relative = Path::new(file_path);
    // Only plain paths inside the repository are served.
    if file_path.is_empty()
        || !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
    {
        return Err(VoomError::FileNotFound(file_path.to_string()));
    }

    let workdir = repo
        .workdir()
        .ok_or_else(|| VoomError::NotARepository(repo.path().to_path_buf()))?;
    let full_path = workdir.join(relative);

    if full_path.is_file() {
        let bytes = std::fs::read(&full_path)?;
        return String::from_utf8(bytes).map_err(|_| VoomError::InvalidUtf8(file_path.to_string()));
    }

    fetch_blob_content(repo, file_path)
}

fn fetch_blob_content(repo: &Repository, file_path: &str) -> Result<String> {
    let not_found = || VoomError::FileNotFound(file_path.to_string());

    let head = repo.head().map_err(|_| not_found())?.peel_to_tree()?;
    let entry = head.get_path(Path::new(file_path)).map_err(|_| not_found())?;
    let blob = repo.find_blob(entry.id()).map_err(|_| not_found())?;

    std::str::from_utf8(blob.content())
        .map(str::to_string)
        .map_err(|_| VoomError::InvalidUtf8(file_path.to_string()))
}
