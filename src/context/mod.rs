//! Revealing unchanged lines around hunks on request.
//!
//! [`plan_expansion`] is pure: it works out the next range to fetch from the
//! hunk geometry and what the session has already loaded. [`expand_hunk`]
//! drives one request end to end against a [`LineSource`].

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{DiffFile, DiffHunk, DiffLine, FileStatus, HunkExpansionState, HunkExpansions};
use crate::vcs::{FileLines, LineSource};

/// Lines fetched per expansion request unless configured otherwise.
pub const DEFAULT_CONTEXT_WINDOW: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpandDirection {
    Before,
    After,
}

/// Closed, 1-based range of new-file lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub start: u32,
    pub end: u32,
}

impl LineSpan {
    fn contains(&self, line: u32) -> bool {
        (self.start..=self.end).contains(&line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionPlan {
    /// Range to fetch, `None` when nothing is left in that direction.
    pub request: Option<LineSpan>,
    /// Whether another request may follow this one. For "after" this is
    /// provisional until the fetch reports whether the file goes on.
    pub can_expand: bool,
}

impl ExpansionPlan {
    const EXHAUSTED: Self = Self {
        request: None,
        can_expand: false,
    };
}

/// A hunk together with how much extra context the session loaded around it.
#[derive(Debug, Clone, Copy)]
pub struct HunkView<'a> {
    pub hunk: &'a DiffHunk,
    pub loaded_before: u32,
    pub loaded_after: u32,
}

impl<'a> HunkView<'a> {
    pub fn new(hunk: &'a DiffHunk, state: Option<&HunkExpansionState>) -> Self {
        Self {
            hunk,
            loaded_before: state.map_or(0, HunkExpansionState::loaded_before),
            loaded_after: state.map_or(0, HunkExpansionState::loaded_after),
        }
    }

    fn from_store(
        hunks: &'a [DiffHunk],
        expansions: &HunkExpansions,
        path: &str,
        index: usize,
    ) -> Self {
        Self {
            hunk: &hunks[index],
            loaded_before: expansions.loaded_before(path, index),
            loaded_after: expansions.loaded_after(path, index),
        }
    }

    /// First visible new-file line.
    pub fn effective_start(&self) -> i64 {
        i64::from(self.hunk.new_start) - i64::from(self.loaded_before)
    }

    /// Last visible new-file line.
    pub fn effective_end(&self) -> i64 {
        i64::from(self.hunk.new_start) + i64::from(self.hunk.new_count) - 1
            + i64::from(self.loaded_after)
    }
}

fn to_line(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|line| *line > 0)
}

/// Work out the next range to request around `hunk`.
///
/// "Before" ranges end just above the hunk's effective start and never reach
/// into the previous hunk's effective end or above line 1. "After" ranges
/// start just below the effective end and stop short of the next hunk's
/// effective start. An exhausted direction yields no request, so repeated
/// calls with nothing new loaded are stable.
pub fn plan_expansion(
    hunk: &DiffHunk,
    state: &HunkExpansionState,
    prev: Option<HunkView<'_>>,
    next: Option<HunkView<'_>>,
    direction: ExpandDirection,
    window: u32,
) -> ExpansionPlan {
    let current = HunkView::new(hunk, Some(state));
    let window = i64::from(window.max(1));

    match direction {
        ExpandDirection::Before => {
            if !state.can_expand_before {
                return ExpansionPlan::EXHAUSTED;
            }
            let end = current.effective_start() - 1;
            let lower = prev.map_or(1, |p| p.effective_end() + 1).max(1);
            if end < lower {
                return ExpansionPlan::EXHAUSTED;
            }
            let start = lower.max(end + 1 - window);
            match (to_line(start), to_line(end)) {
                (Some(start), Some(end)) => ExpansionPlan {
                    request: Some(LineSpan { start, end }),
                    can_expand: i64::from(start) > lower,
                },
                _ => ExpansionPlan::EXHAUSTED,
            }
        }
        ExpandDirection::After => {
            if !state.can_expand_after {
                return ExpansionPlan::EXHAUSTED;
            }
            let start = (current.effective_end() + 1).max(1);
            let upper = next.map(|n| n.effective_start() - 1);
            let mut end = start + window - 1;
            if let Some(upper) = upper {
                end = end.min(upper);
            }
            if end < start {
                return ExpansionPlan::EXHAUSTED;
            }
            match (to_line(start), to_line(end)) {
                (Some(start), Some(end)) => ExpansionPlan {
                    request: Some(LineSpan { start, end }),
                    can_expand: upper.is_none_or(|upper| i64::from(end) < upper),
                },
                _ => ExpansionPlan::EXHAUSTED,
            }
        }
    }
}

/// Difference between new and old line numbers at the hunk edge facing
/// `direction`.
pub fn line_offset(hunk: &DiffHunk, direction: ExpandDirection) -> i64 {
    match direction {
        ExpandDirection::Before => i64::from(hunk.new_start) - i64::from(hunk.old_start),
        ExpandDirection::After => {
            (i64::from(hunk.new_start) + i64::from(hunk.new_count))
                - (i64::from(hunk.old_start) + i64::from(hunk.old_count))
        }
    }
}

/// Fold fetched lines into `state` and settle the direction's flag.
///
/// Lines outside the planned span are dropped. Returns how many lines were
/// added.
pub fn apply_fetched(
    state: &mut HunkExpansionState,
    hunk: &DiffHunk,
    plan: &ExpansionPlan,
    direction: ExpandDirection,
    fetched: &FileLines,
) -> usize {
    let Some(span) = plan.request else {
        close(state, direction);
        return 0;
    };

    let offset = line_offset(hunk, direction);
    let mut lines: Vec<DiffLine> = fetched
        .lines
        .iter()
        .filter(|line| span.contains(line.line_num))
        .map(|line| {
            let old_lineno = to_line(i64::from(line.line_num) - offset);
            DiffLine::context(line.content.clone(), old_lineno, line.line_num)
        })
        .collect();
    let added = lines.len();

    match direction {
        ExpandDirection::Before => {
            lines.append(&mut state.before_lines);
            state.before_lines = lines;
            state.can_expand_before &= plan.can_expand && added > 0;
        }
        ExpandDirection::After => {
            state.after_lines.extend(lines);
            state.can_expand_after &= plan.can_expand && fetched.has_more && added > 0;
        }
    }

    added
}

fn close(state: &mut HunkExpansionState, direction: ExpandDirection) {
    match direction {
        ExpandDirection::Before => state.can_expand_before = false,
        ExpandDirection::After => state.can_expand_after = false,
    }
}

fn has_gap_before(
    hunks: &[DiffHunk],
    expansions: &HunkExpansions,
    path: &str,
    index: usize,
) -> bool {
    let current = HunkView::from_store(hunks, expansions, path, index);
    match index.checked_sub(1) {
        Some(prev) => {
            let prev = HunkView::from_store(hunks, expansions, path, prev);
            current.effective_start() > prev.effective_end() + 1
        }
        None => current.effective_start() > 1,
    }
}

fn has_gap_after(
    hunks: &[DiffHunk],
    expansions: &HunkExpansions,
    path: &str,
    index: usize,
) -> bool {
    if index + 1 >= hunks.len() {
        // The end of the file is only known after a fetch.
        return true;
    }
    let current = HunkView::from_store(hunks, expansions, path, index);
    let next = HunkView::from_store(hunks, expansions, path, index + 1);
    current.effective_end() + 1 < next.effective_start()
}

/// Whether an "expand above" control belongs on hunk `index`.
pub fn show_expand_before(
    hunks: &[DiffHunk],
    index: usize,
    expansions: &HunkExpansions,
    path: &str,
) -> bool {
    index < hunks.len()
        && has_gap_before(hunks, expansions, path, index)
        && expansions
            .get(path, index)
            .is_none_or(|state| state.can_expand_before)
}

/// Whether an "expand below" control belongs on hunk `index`.
pub fn show_expand_after(
    hunks: &[DiffHunk],
    index: usize,
    expansions: &HunkExpansions,
    path: &str,
) -> bool {
    index < hunks.len()
        && has_gap_after(hunks, expansions, path, index)
        && expansions
            .get(path, index)
            .is_none_or(|state| state.can_expand_after)
}

/// Close flags on `index` and its neighbours whose gap has been filled.
fn refresh_flags(hunks: &[DiffHunk], expansions: &mut HunkExpansions, path: &str, index: usize) {
    let last = hunks.len().saturating_sub(1);
    for i in index.saturating_sub(1)..=(index + 1).min(last) {
        let closed_before = !has_gap_before(hunks, expansions, path, i);
        let closed_after = !has_gap_after(hunks, expansions, path, i);
        if closed_before || closed_after {
            let state = expansions.entry(path, i);
            if closed_before {
                state.can_expand_before = false;
            }
            if closed_after {
                state.can_expand_after = false;
            }
        }
    }
}

/// Plan, fetch and record one expansion of hunk `hunk_index` in `file`.
///
/// Callers must not run two expansions for the same hunk concurrently; the
/// `&mut` store enforces that within one session. Returns the number of
/// context lines added.
pub fn expand_hunk(
    source: &dyn LineSource,
    expansions: &mut HunkExpansions,
    file: &DiffFile,
    hunk_index: usize,
    direction: ExpandDirection,
    window: u32,
) -> Result<usize> {
    let path = file.display_path();
    let hunks = &file.hunks;
    let Some(hunk) = hunks.get(hunk_index) else {
        debug!("expand {direction:?}: {path} has no hunk {hunk_index}");
        return Ok(0);
    };

    let prev = hunk_index
        .checked_sub(1)
        .map(|i| HunkView::from_store(hunks, expansions, path, i));
    let next = (hunk_index + 1 < hunks.len())
        .then(|| HunkView::from_store(hunks, expansions, path, hunk_index + 1));
    let state = expansions.get(path, hunk_index).cloned().unwrap_or_default();

    let plan = plan_expansion(hunk, &state, prev, next, direction, window);
    debug!("expand {direction:?}: {path} hunk {hunk_index} plan {plan:?}");

    let fetched = match plan.request {
        Some(span) => source.get_lines(path, span.start, span.end)?,
        None => FileLines::default(),
    };

    let added = apply_fetched(
        expansions.entry(path, hunk_index),
        hunk,
        &plan,
        direction,
        &fetched,
    );
    refresh_flags(hunks, expansions, path, hunk_index);
    debug!("expand {direction:?}: {path} hunk {hunk_index} added {added} lines");

    Ok(added)
}

/// Reveal one window of context on each open side of every hunk.
///
/// Returns one store per entry of `files`. The same path can appear in more
/// than one section (unstaged and staged changes), and each section is planned
/// against its own hunks only. Failed fetches are logged and skipped.
pub fn expand_files(
    source: &dyn LineSource,
    files: &[DiffFile],
    window: u32,
) -> Vec<HunkExpansions> {
    files
        .iter()
        .map(|file| {
            let mut expansions = HunkExpansions::new();
            // Deleted files have no new-side lines to anchor context to.
            if file.is_binary || file.status == FileStatus::Deleted {
                return expansions;
            }

            let path = file.display_path();
            for index in 0..file.hunks.len() {
                for direction in [ExpandDirection::Before, ExpandDirection::After] {
                    let offered = match direction {
                        ExpandDirection::Before => {
                            show_expand_before(&file.hunks, index, &expansions, path)
                        }
                        ExpandDirection::After => {
                            show_expand_after(&file.hunks, index, &expansions, path)
                        }
                    };
                    if !offered {
                        continue;
                    }
                    if let Err(err) =
                        expand_hunk(source, &mut expansions, file, index, direction, window)
                    {
                        warn!("Could not expand {path} hunk {index} {direction:?}: {err}");
                    }
                }
            }
            expansions
        })
        .collect()
}
