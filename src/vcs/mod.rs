//! Collaborators that supply diff text and file contents.
//!
//! The core only depends on the [`DiffSource`] and [`LineSource`] traits;
//! [`GitBackend`] implements both on top of a local git working tree.

pub mod git;
mod traits;

pub use git::GitBackend;
pub use traits::{DiffSnapshot, DiffSource, FileLines, LineSource, NumberedLine, slice_lines};
