use git2::{Diff, DiffFormat, DiffOptions, ErrorCode, Repository};
use std::hash::Hasher;
use twox_hash::XxHash64;

use crate::error::Result;

/// Unified diff text of everything not yet committed.
///
/// Unstaged changes (index to working tree, untracked files included with
/// their content) come first, staged changes (HEAD to index) after.
pub fn get_working_tree_diff_text(repo: &Repository) -> Result<String> {
    let mut opts = DiffOptions::new();
    opts.include_untracked(true);
    opts.show_untracked_content(true);
    opts.recurse_untracked_dirs(true);

    let unstaged = repo.diff_index_to_workdir(None, Some(&mut opts))?;

    let head_tree = match repo.head() {
        Ok(head) => Some(head.peel_to_tree()?),
        // Unborn branch: everything in the index is new.
        Err(err) if err.code() == ErrorCode::UnbornBranch => None,
        Err(err) => return Err(err.into()),
    };
    let staged = repo.diff_tree_to_index(head_tree.as_ref(), None, None)?;

    let mut text = Vec::new();
    print_patch(&unstaged, &mut text)?;
    print_patch(&staged, &mut text)?;

    Ok(String::from_utf8_lossy(&text).into_owned())
}

fn print_patch(diff: &Diff<'_>, out: &mut Vec<u8>) -> Result<()> {
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let prefix: &[u8] = match line.origin() {
            ' ' => b" ",
            '+' => b"+",
            '-' => b"-",
            _ => b"",
        };
        out.extend_from_slice(prefix);
        out.extend_from_slice(line.content());
        true
    })?;
    Ok(())
}

/// Hex xxHash64 of the diff text, used to notice when the working tree changed.
pub fn diff_hash(text: &str) -> String {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(text.as_bytes());
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn should_diff_staged_files_on_unborn_branch() {
        // given
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("first.txt"), "hello\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("first.txt")).unwrap();
        index.write().unwrap();

        // when
        let text = get_working_tree_diff_text(&repo).unwrap();

        // then
        assert!(text.contains("+++ b/first.txt"));
        assert!(text.contains("+hello"));
    }

    #[test]
    fn should_propagate_broken_head_reference() {
        // given
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let branch = repo
            .find_reference("HEAD")
            .unwrap()
            .symbolic_target()
            .unwrap()
            .to_string();
        let ref_path = repo.path().join(&branch);
        fs::create_dir_all(ref_path.parent().unwrap()).unwrap();
        fs::write(&ref_path, "not a commit id\n").unwrap();

        // when
        let result = get_working_tree_diff_text(&repo);

        // then
        assert!(result.is_err());
    }

    #[test]
    fn should_hash_to_fixed_width_hex() {
        let hash = diff_hash("diff --git a/x b/x\n");

        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn should_hash_deterministically() {
        assert_eq!(diff_hash("same"), diff_hash("same"));
        assert_ne!(diff_hash("same"), diff_hash("other"));
        assert_eq!(diff_hash(""), format!("{:016x}", XxHash64::with_seed(0).finish()));
    }
}
