use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The working tree's unified diff text plus a fingerprint for change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSnapshot {
    pub diff: String,
    pub directory: PathBuf,
    /// Hex xxHash64 of `diff`.
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberedLine {
    pub line_num: u32,
    pub content: String,
}

/// Response of a line-range fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLines {
    pub lines: Vec<NumberedLine>,
    /// Whether the file continues past the requested end line.
    pub has_more: bool,
    pub total_lines: u32,
}

/// Produces the unified diff of the current working tree.
pub trait DiffSource {
    fn snapshot(&self) -> Result<DiffSnapshot>;
}

/// Fetches a closed, 1-based range of lines from a file.
pub trait LineSource {
    fn get_lines(&self, path: &str, start: u32, end: u32) -> Result<FileLines>;
}

/// Cut `[start, end]` out of `content`, clamping both ends to the file.
///
/// A start past the last line yields no lines and `has_more = false`.
pub fn slice_lines(content: &str, start: u32, end: u32) -> FileLines {
    let all: Vec<&str> = content.lines().collect();
    let total_lines = u32::try_from(all.len()).unwrap_or(u32::MAX);

    if start > total_lines {
        return FileLines {
            lines: Vec::new(),
            has_more: false,
            total_lines,
        };
    }

    let first = start.max(1);
    let last = end.min(total_lines);
    let lines = (first..=last)
        .map(|line_num| NumberedLine {
            line_num,
            content: all[(line_num - 1) as usize].to_string(),
        })
        .collect();

    FileLines {
        lines,
        has_more: end < total_lines,
        total_lines,
    }
}
