//! Render spans: syntax tokens and word-diff highlights merged per line.

use log::debug;

use crate::diff::word_diff::{coarse_word_diff, compute_word_diff, pair_changed_lines};
use crate::model::{DiffFile, DiffHunk, LineKind, SyntaxKind, TextSegment};
use crate::syntax::{Language, tokenize_line};

pub const DEFAULT_WORD_DIFF_MAX_LINE_LENGTH: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightOptions {
    /// Paired lines longer than this many characters get one coarse segment
    /// instead of a token-level diff.
    pub word_diff_max_line_length: usize,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            word_diff_max_line_length: DEFAULT_WORD_DIFF_MAX_LINE_LENGTH,
        }
    }
}

/// Build the final segments for one line.
///
/// Without word-diff segments every syntax token becomes one unhighlighted
/// segment. With them, the two span lists are intersected by byte offset so
/// each output segment carries the syntax kind of its token and the highlight
/// flag of its word-diff segment.
pub fn compose_segments(
    content: &str,
    language: Option<Language>,
    word_segments: Option<&[TextSegment]>,
) -> Vec<TextSegment> {
    let tokens = tokenize_line(content, language);

    let word_segments = word_segments.filter(|segments| {
        let covers = concatenates_to(segments, content);
        if !covers {
            debug!("word-diff segments do not reproduce line content, ignoring them");
        }
        covers
    });

    let Some(word_segments) = word_segments else {
        return tokens
            .into_iter()
            .map(|token| TextSegment {
                text: token.text.to_string(),
                highlighted: false,
                syntax: token.kind,
            })
            .collect();
    };

    let mut out: Vec<TextSegment> = Vec::new();
    let mut words = word_segments.iter();
    let mut word_remaining = 0;
    let mut highlighted = false;
    let mut offset = 0;

    for token in tokens {
        let mut token_remaining = token.text.len();
        while token_remaining > 0 {
            while word_remaining == 0 {
                match words.next() {
                    Some(segment) => {
                        word_remaining = segment.text.len();
                        highlighted = segment.highlighted;
                    }
                    None => {
                        word_remaining = usize::MAX;
                        highlighted = false;
                    }
                }
            }
            let take = token_remaining.min(word_remaining);
            push_segment(&mut out, &content[offset..offset + take], highlighted, token.kind);
            offset += take;
            token_remaining -= take;
            word_remaining -= take;
        }
    }

    out
}

fn push_segment(
    out: &mut Vec<TextSegment>,
    text: &str,
    highlighted: bool,
    syntax: Option<SyntaxKind>,
) {
    match out.last_mut() {
        Some(last) if last.highlighted == highlighted && last.syntax == syntax => {
            last.text.push_str(text);
        }
        _ => out.push(TextSegment {
            text: text.to_string(),
            highlighted,
            syntax,
        }),
    }
}

fn concatenates_to(segments: &[TextSegment], content: &str) -> bool {
    let mut rest = content;
    for segment in segments {
        match rest.strip_prefix(segment.text.as_str()) {
            Some(tail) => rest = tail,
            None => return false,
        }
    }
    rest.is_empty()
}

/// Attach segments to every content line of every file.
///
/// Paired deletion/addition lines get word-diff highlights, everything else
/// syntax only. Hunk-header lines are left without segments.
pub fn annotate(files: Vec<DiffFile>, options: &HighlightOptions) -> Vec<DiffFile> {
    files
        .into_iter()
        .map(|mut file| {
            let language = Language::from_path(file.display_path());
            for hunk in &mut file.hunks {
                annotate_hunk(hunk, language, options);
            }
            file
        })
        .collect()
}

fn annotate_hunk(hunk: &mut DiffHunk, language: Option<Language>, options: &HighlightOptions) {
    let mut word_segments: Vec<Option<Vec<TextSegment>>> = vec![None; hunk.lines.len()];

    for (deletion, addition) in pair_changed_lines(&hunk.lines) {
        let old = &hunk.lines[deletion].content;
        let new = &hunk.lines[addition].content;
        let limit = options.word_diff_max_line_length;
        let diff = if old.chars().count() > limit || new.chars().count() > limit {
            coarse_word_diff(old, new)
        } else {
            compute_word_diff(old, new)
        };
        word_segments[deletion] = Some(diff.deletion);
        word_segments[addition] = Some(diff.addition);
    }

    for (line, words) in hunk.lines.iter_mut().zip(word_segments) {
        if line.kind == LineKind::HunkHeader {
            continue;
        }
        line.segments = Some(compose_segments(&line.content, language, words.as_deref()));
    }
}
