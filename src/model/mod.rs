pub mod comment;
pub mod diff_types;
pub mod expansion;

pub use comment::{CommentLineType, LineComment};
pub use diff_types::{DiffFile, DiffHunk, DiffLine, FileStatus, LineKind, SyntaxKind, TextSegment};
pub use expansion::{ExpansionKey, HunkExpansionState, HunkExpansions};
