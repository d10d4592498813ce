use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoomError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid UTF-8 in file: {0}")]
    InvalidUtf8(String),

    #[error("No changes to review")]
    NoChanges,

    #[error("No comments to include in the prompt")]
    NoComments,
}

pub type Result<T> = std::result::Result<T, VoomError>;
