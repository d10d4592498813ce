use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::diff_types::{DiffLine, LineKind};

/// What a review comment is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentLineType {
    Addition,
    Deletion,
    Context,
    File,
}

impl CommentLineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentLineType::Addition => "addition",
            CommentLineType::Deletion => "deletion",
            CommentLineType::Context => "context",
            CommentLineType::File => "file",
        }
    }

    /// Whether `line` is the one a comment of this type at `line_number` refers to.
    /// Deletions are keyed by old line number, everything else by new.
    pub fn matches(&self, line: &DiffLine, line_number: u32) -> bool {
        let kind = match self {
            CommentLineType::Addition => LineKind::Addition,
            CommentLineType::Deletion => LineKind::Deletion,
            CommentLineType::Context => LineKind::Context,
            CommentLineType::File => return false,
        };
        line.kind == kind && line.anchor_lineno() == Some(line_number)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineComment {
    #[serde(default = "new_comment_id")]
    pub id: String,
    pub file_path: String,
    #[serde(default)]
    pub line_number: Option<u32>,
    /// None is treated as a file-level comment.
    #[serde(default)]
    pub line_type: Option<CommentLineType>,
    #[serde(default)]
    pub hunk_index: Option<usize>,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn new_comment_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl LineComment {
    pub fn new(
        file_path: impl Into<String>,
        line_number: u32,
        line_type: CommentLineType,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_comment_id(),
            file_path: file_path.into(),
            line_number: Some(line_number),
            line_type: Some(line_type),
            hunk_index: None,
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn for_file(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_comment_id(),
            file_path: file_path.into(),
            line_number: None,
            line_type: Some(CommentLineType::File),
            hunk_index: None,
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_file_comment(&self) -> bool {
        self.line_number.is_none() || matches!(self.line_type, None | Some(CommentLineType::File))
    }

    /// Replace the comment text, bumping `updated_at`.
    pub fn edit(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.updated_at = Utc::now();
    }

    /// The `filePath:lineNumber:lineType` key an external store indexes comments by.
    pub fn key(&self) -> String {
        let line = self
            .line_number
            .map_or_else(|| "file".to_string(), |n| n.to_string());
        let kind = self.line_type.unwrap_or(CommentLineType::File);
        format!("{}:{}:{}", self.file_path, line, kind.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_match_deletion_by_old_line_number() {
        let line = DiffLine {
            kind: LineKind::Deletion,
            content: "gone".to_string(),
            old_lineno: Some(12),
            new_lineno: None,
            segments: None,
        };
        assert!(CommentLineType::Deletion.matches(&line, 12));
        assert!(!CommentLineType::Addition.matches(&line, 12));
        assert!(!CommentLineType::Deletion.matches(&line, 13));
    }

    #[test]
    fn should_match_context_by_new_line_number() {
        let line = DiffLine::context("ctx", Some(3), 5);
        assert!(CommentLineType::Context.matches(&line, 5));
        assert!(!CommentLineType::Context.matches(&line, 3));
        assert!(!CommentLineType::File.matches(&line, 5));
    }

    #[test]
    fn should_build_stable_key() {
        let comment = LineComment::new("src/a.rs", 7, CommentLineType::Addition, "why?");
        assert_eq!(comment.key(), "src/a.rs:7:addition");
        assert!(!comment.is_file_comment());

        let file_comment = LineComment::for_file("src/a.rs", "split this file");
        assert_eq!(file_comment.key(), "src/a.rs:file:file");
        assert!(file_comment.is_file_comment());
    }

    #[test]
    fn should_bump_updated_at_on_edit() {
        let mut comment = LineComment::new("a.rs", 1, CommentLineType::Context, "first");
        let created = comment.created_at;
        comment.edit("second");
        assert_eq!(comment.content, "second");
        assert!(comment.updated_at >= created);
    }

    #[test]
    fn should_deserialize_without_optional_fields() {
        let json = r#"{
            "id": "1",
            "filePath": "a.rs",
            "content": "hi",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let comment: LineComment = serde_json::from_str(json).unwrap();
        assert!(comment.is_file_comment());
        assert_eq!(comment.hunk_index, None);
    }

    #[test]
    fn should_fill_in_id_and_timestamps_when_missing() {
        let json = r#"{"filePath": "a.rs", "lineNumber": 3, "lineType": "deletion", "content": "why"}"#;
        let comment: LineComment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.line_number, Some(3));
        assert_eq!(comment.line_type, Some(CommentLineType::Deletion));
        assert!(!comment.id.is_empty());
        assert_eq!(comment.key(), "a.rs:3:deletion");
    }
}
