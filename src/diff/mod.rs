//! Turning unified diff text into the structured review model.

pub mod parser;
pub mod path;
pub mod word_diff;

pub use parser::parse_diff;
pub use path::{is_image_path, is_null_path, unescape_path};
pub use word_diff::{WordDiff, coarse_word_diff, compute_word_diff, pair_changed_lines};
