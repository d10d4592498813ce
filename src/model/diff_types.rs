use serde::{Deserialize, Serialize};

use crate::diff::path::is_null_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
}

impl FileStatus {
    pub fn as_char(&self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineKind {
    Context,
    Addition,
    Deletion,
    HunkHeader,
}

/// Presentational category attached to a span of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxKind {
    Keyword,
    String,
    Comment,
    Number,
    Operator,
    Type,
    Punctuation,
}

/// A contiguous span of a line's text.
///
/// `highlighted` is true only for spans that differ from the paired line
/// under word diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    pub text: String,
    pub highlighted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<SyntaxKind>,
}

impl TextSegment {
    pub fn plain(text: impl Into<String>, highlighted: bool) -> Self {
        Self {
            text: text.into(),
            highlighted,
            syntax: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_lineno: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_lineno: Option<u32>,
    /// Render spans for this line, attached by the highlight pass.
    /// Concatenating their text always reproduces `content`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<TextSegment>>,
}

impl DiffLine {
    pub fn hunk_header(trailing: impl Into<String>) -> Self {
        Self {
            kind: LineKind::HunkHeader,
            content: trailing.into(),
            old_lineno: None,
            new_lineno: None,
            segments: None,
        }
    }

    pub fn context(content: impl Into<String>, old_lineno: Option<u32>, new_lineno: u32) -> Self {
        Self {
            kind: LineKind::Context,
            content: content.into(),
            old_lineno,
            new_lineno: Some(new_lineno),
            segments: None,
        }
    }

    /// The line number a comment on this line is keyed by: the old side for
    /// deletions, the new side for everything else.
    pub fn anchor_lineno(&self) -> Option<u32> {
        match self.kind {
            LineKind::Deletion => self.old_lineno,
            _ => self.new_lineno,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffHunk {
    pub header: String,
    /// Starting line number in the old file (from @@ header)
    pub old_start: u32,
    /// Number of lines from the old file in this hunk
    pub old_count: u32,
    /// Starting line number in the new file (from @@ header)
    pub new_start: u32,
    /// Number of lines from the new file in this hunk
    pub new_count: u32,
    /// First entry is always the synthetic hunk-header line.
    pub lines: Vec<DiffLine>,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffFile {
    pub old_path: String,
    /// Equal to `old_path` for deleted files so there is always a display path.
    pub new_path: String,
    pub status: FileStatus,
    pub hunks: Vec<DiffHunk>,
    pub additions: usize,
    pub deletions: usize,
    pub is_binary: bool,
    pub is_image: bool,
}

impl DiffFile {
    pub fn display_path(&self) -> &str {
        if self.new_path.is_empty() || is_null_path(&self.new_path) {
            &self.old_path
        } else {
            &self.new_path
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.hunks.iter().flat_map(|hunk| hunk.lines.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(old_path: &str, new_path: &str) -> DiffFile {
        DiffFile {
            old_path: old_path.to_string(),
            new_path: new_path.to_string(),
            status: FileStatus::Modified,
            hunks: Vec::new(),
            additions: 0,
            deletions: 0,
            is_binary: false,
            is_image: false,
        }
    }

    #[test]
    fn should_prefer_new_path_for_display() {
        assert_eq!(file("old.rs", "new.rs").display_path(), "new.rs");
        assert_eq!(file("gone.rs", "/dev/null").display_path(), "gone.rs");
        assert_eq!(file("only.rs", "").display_path(), "only.rs");
    }

    #[test]
    fn should_anchor_deletions_on_old_side() {
        let deletion = DiffLine {
            kind: LineKind::Deletion,
            content: "x".to_string(),
            old_lineno: Some(4),
            new_lineno: None,
            segments: None,
        };
        assert_eq!(deletion.anchor_lineno(), Some(4));
        assert_eq!(DiffLine::context("y", Some(3), 7).anchor_lineno(), Some(7));
    }

    #[test]
    fn should_serialize_line_kind_as_kebab_case() {
        let json = serde_json::to_string(&DiffLine::hunk_header(" fn main()")).unwrap();
        assert!(json.contains("\"type\":\"hunk-header\""));
        assert!(!json.contains("segments"));
    }
}
