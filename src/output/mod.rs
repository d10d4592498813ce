pub mod prompt;
pub mod text;

pub use prompt::generate_prompt;
pub use text::{render_files, render_line};
