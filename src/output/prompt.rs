use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

use crate::error::{Result, VoomError};
use crate::model::{CommentLineType, DiffFile, HunkExpansions, LineComment};

/// Turn review comments into a Markdown prompt for a coding agent.
/// Returns an error if there are no comments.
///
/// `expansions` holds one store per entry of `files`.
pub fn generate_prompt(
    comments: &[LineComment],
    files: &[DiffFile],
    expansions: &[HunkExpansions],
) -> Result<String> {
    if comments.is_empty() {
        return Err(VoomError::NoComments);
    }

    let mut by_file: BTreeMap<&str, Vec<&LineComment>> = BTreeMap::new();
    for comment in comments {
        by_file.entry(&comment.file_path).or_default().push(comment);
    }

    let mut md = String::new();
    let _ = writeln!(md, "# Code Review Feedback");
    let _ = writeln!(md);
    let _ = writeln!(md, "Please address the following code review comments:");
    let _ = writeln!(md);

    for (path, mut file_comments) in by_file {
        // File-level comments first, then by line.
        file_comments.sort_by_key(|c| (!c.is_file_comment(), c.line_number));

        let _ = writeln!(md, "## File: {path}");
        let _ = writeln!(md);

        for comment in file_comments {
            match comment.line_number.filter(|_| !comment.is_file_comment()) {
                Some(line_number) => {
                    let line_type = comment.line_type.unwrap_or(CommentLineType::Context);
                    let _ = writeln!(md, "### Line {line_number} ({})", line_type.as_str());

                    if let Some(content) =
                        find_line_content(path, line_number, line_type, files, expansions)
                    {
                        let ext = Path::new(path)
                            .extension()
                            .and_then(|e| e.to_str())
                            .unwrap_or("");
                        let _ = writeln!(md, "```{ext}");
                        let _ = writeln!(md, "{content}");
                        let _ = writeln!(md, "```");
                    }
                }
                None => {
                    let _ = writeln!(md, "### File comment");
                }
            }
            let _ = writeln!(md, "**Comment:** {}", comment.content);
            let _ = writeln!(md);
        }
    }

    Ok(md)
}

/// Text of the commented line, searched in each hunk's loaded "before"
/// context, the hunk itself, then its loaded "after" context, across every
/// section of the diff that touches `path`.
fn find_line_content<'a>(
    path: &str,
    line_number: u32,
    line_type: CommentLineType,
    files: &'a [DiffFile],
    expansions: &'a [HunkExpansions],
) -> Option<&'a str> {
    files
        .iter()
        .enumerate()
        .filter(|(_, f)| f.new_path == path || f.old_path == path)
        .find_map(|(section, file)| {
            let store = expansions.get(section);
            file.hunks.iter().enumerate().find_map(|(hunk_index, hunk)| {
                let state = store.and_then(|s| s.get(file.display_path(), hunk_index));
                let before = state.into_iter().flat_map(|s| s.before_lines.iter());
                let after = state.into_iter().flat_map(|s| s.after_lines.iter());

                before
                    .chain(hunk.lines.iter())
                    .chain(after)
                    .find(|line| line_type.matches(line, line_number))
                    .map(|line| line.content.as_str())
            })
        })
}
