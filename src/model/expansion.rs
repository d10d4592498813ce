use std::collections::HashMap;

use super::diff_types::DiffLine;

/// Extra context loaded around one hunk during a review session.
///
/// The flags only ever move from `true` to `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkExpansionState {
    pub before_lines: Vec<DiffLine>,
    pub after_lines: Vec<DiffLine>,
    pub can_expand_before: bool,
    pub can_expand_after: bool,
}

impl Default for HunkExpansionState {
    fn default() -> Self {
        Self {
            before_lines: Vec::new(),
            after_lines: Vec::new(),
            can_expand_before: true,
            can_expand_after: true,
        }
    }
}

impl HunkExpansionState {
    pub fn loaded_before(&self) -> u32 {
        self.before_lines.len() as u32
    }

    pub fn loaded_after(&self) -> u32 {
        self.after_lines.len() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpansionKey {
    pub file_path: String,
    pub hunk_index: usize,
}

impl ExpansionKey {
    pub fn new(file_path: impl Into<String>, hunk_index: usize) -> Self {
        Self {
            file_path: file_path.into(),
            hunk_index,
        }
    }
}

/// Session-only expansion store, owned by the caller.
#[derive(Debug, Clone, Default)]
pub struct HunkExpansions {
    states: HashMap<ExpansionKey, HunkExpansionState>,
}

impl HunkExpansions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_path: &str, hunk_index: usize) -> Option<&HunkExpansionState> {
        self.states.get(&ExpansionKey::new(file_path, hunk_index))
    }

    pub fn insert(&mut self, file_path: &str, hunk_index: usize, state: HunkExpansionState) {
        self.states
            .insert(ExpansionKey::new(file_path, hunk_index), state);
    }

    /// State for the key, inserting a fresh one if none exists yet.
    pub fn entry(&mut self, file_path: &str, hunk_index: usize) -> &mut HunkExpansionState {
        self.states
            .entry(ExpansionKey::new(file_path, hunk_index))
            .or_default()
    }

    pub fn loaded_before(&self, file_path: &str, hunk_index: usize) -> u32 {
        self.get(file_path, hunk_index)
            .map_or(0, HunkExpansionState::loaded_before)
    }

    pub fn loaded_after(&self, file_path: &str, hunk_index: usize) -> u32 {
        self.get(file_path, hunk_index)
            .map_or(0, HunkExpansionState::loaded_after)
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
