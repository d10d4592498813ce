//! Core of a local code-review diff viewer: unified-diff parsing, intra-line
//! word diff, line-level syntax tokens, render segments and on-demand
//! context expansion.

pub mod config;
pub mod context;
pub mod diff;
pub mod error;
pub mod highlight;
pub mod model;
pub mod output;
pub mod syntax;
pub mod vcs;
