//! Intra-line highlighting for a deleted line paired with its replacement.

use crate::model::{DiffLine, LineKind, TextSegment};

/// Highlight segments for both sides of a paired deletion/addition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordDiff {
    pub deletion: Vec<TextSegment>,
    pub addition: Vec<TextSegment>,
}

/// Compute a token-level diff between a deleted line and the line that replaced it.
///
/// Tokens are maximal whitespace / non-whitespace runs. Tokens outside the
/// longest common subsequence of the two token lists are highlighted.
pub fn compute_word_diff(deletion: &str, addition: &str) -> WordDiff {
    let del_tokens = tokenize(deletion);
    let add_tokens = tokenize(addition);
    let lcs = longest_common_subsequence(&del_tokens, &add_tokens);

    WordDiff {
        deletion: merge_segments(mark_tokens(&del_tokens, &lcs)),
        addition: merge_segments(mark_tokens(&add_tokens, &lcs)),
    }
}

/// One segment per side, highlighted iff the lines differ.
///
/// Used instead of [`compute_word_diff`] for lines too long for the
/// quadratic alignment.
pub fn coarse_word_diff(deletion: &str, addition: &str) -> WordDiff {
    let changed = deletion != addition;
    let side = |text: &str| {
        if text.is_empty() {
            Vec::new()
        } else {
            vec![TextSegment::plain(text, changed)]
        }
    };
    WordDiff {
        deletion: side(deletion),
        addition: side(addition),
    }
}

/// Pair the i-th deletion with the i-th addition of every deletion run that
/// is immediately followed by an addition run.
///
/// Returns `(deletion_index, addition_index)` pairs into `lines`. Excess
/// lines on either side stay unpaired. This is a positional heuristic, not
/// an alignment, so unrelated lines get paired when the run lengths differ.
pub fn pair_changed_lines(lines: &[DiffLine]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].kind != LineKind::Deletion {
            i += 1;
            continue;
        }

        let deletions_start = i;
        while i < lines.len() && lines[i].kind == LineKind::Deletion {
            i += 1;
        }
        let additions_start = i;
        while i < lines.len() && lines[i].kind == LineKind::Addition {
            i += 1;
        }

        let deletions = deletions_start..additions_start;
        let additions = additions_start..i;
        pairs.extend(deletions.zip(additions));
    }

    pairs
}

fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_word: Option<bool> = None;

    for (idx, ch) in text.char_indices() {
        let is_word = !ch.is_whitespace();
        match in_word {
            Some(current) if current != is_word => {
                tokens.push(&text[start..idx]);
                start = idx;
            }
            _ => {}
        }
        in_word = Some(is_word);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }

    tokens
}

/// Classic O(m·n) dynamic programming LCS over exact token equality.
fn longest_common_subsequence<'a>(a: &[&'a str], b: &[&str]) -> Vec<&'a str> {
    let (m, n) = (a.len(), b.len());
    let mut dp = vec![vec![0usize; n + 1]; m + 1];

    for i in 1..=m {
        for j in 1..=n {
            dp[i][j] = if a[i - 1] == b[j - 1] {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }

    let mut lcs = Vec::with_capacity(dp[m][n]);
    let (mut i, mut j) = (m, n);
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            lcs.push(a[i - 1]);
            i -= 1;
            j -= 1;
        } else if dp[i - 1][j] > dp[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    lcs.reverse();

    lcs
}

fn mark_tokens(tokens: &[&str], lcs: &[&str]) -> Vec<TextSegment> {
    let mut next = 0;
    tokens
        .iter()
        .map(|&token| {
            let common = lcs.get(next).is_some_and(|&c| c == token);
            if common {
                next += 1;
            }
            TextSegment::plain(token, !common)
        })
        .collect()
}

fn merge_segments(segments: Vec<TextSegment>) -> Vec<TextSegment> {
    let mut merged: Vec<TextSegment> = Vec::with_capacity(segments.len());
    for segment in segments {
        match merged.last_mut() {
            Some(last) if last.highlighted == segment.highlighted => {
                last.text.push_str(&segment.text);
            }
            _ => merged.push(segment),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(segments: &[TextSegment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    fn highlighted(segments: &[TextSegment]) -> Vec<&str> {
        segments
            .iter()
            .filter(|s| s.highlighted)
            .map(|s| s.text.as_str())
            .collect()
    }

    fn line(kind: LineKind, content: &str) -> DiffLine {
        DiffLine {
            kind,
            content: content.to_string(),
            old_lineno: None,
            new_lineno: None,
            segments: None,
        }
    }

    #[test]
    fn should_tokenize_into_alternating_runs() {
        assert_eq!(
            tokenize("  let x =  1;"),
            vec!["  ", "let", " ", "x", " ", "=", "  ", "1;"]
        );
        assert!(tokenize("").is_empty());
        assert_eq!(tokenize("\t"), vec!["\t"]);
    }

    #[test]
    fn should_highlight_changed_token_only() {
        let diff = compute_word_diff("const x = 1;", "const x = 2;");

        assert_eq!(highlighted(&diff.deletion), vec!["1;"]);
        assert_eq!(highlighted(&diff.addition), vec!["2;"]);
        assert!(!diff.deletion[0].highlighted);
        assert!(diff.deletion[0].text.starts_with("const"));
        assert!(diff.addition[0].text.starts_with("const"));
    }

    #[test]
    fn should_not_highlight_identical_lines() {
        let diff = compute_word_diff("const x = 1;", "const x = 1;");

        assert!(diff.deletion.iter().all(|s| !s.highlighted));
        assert!(diff.addition.iter().all(|s| !s.highlighted));
        assert_eq!(diff.deletion.len(), 1);
    }

    #[test]
    fn should_round_trip_both_sides() {
        let cases = [
            ("foo(bar, baz)", "foo(bar,  qux)"),
            ("", "entirely new"),
            ("entirely old", ""),
            ("  indent", "\tindent"),
            ("naïve café", "naive café"),
        ];
        for (old, new) in cases {
            let diff = compute_word_diff(old, new);
            assert_eq!(joined(&diff.deletion), old);
            assert_eq!(joined(&diff.addition), new);
        }
    }

    #[test]
    fn should_merge_adjacent_segments_with_same_flag() {
        let diff = compute_word_diff("a b c", "x b z");

        assert_eq!(diff.deletion.len(), 3);
        assert_eq!(highlighted(&diff.deletion), vec!["a", "c"]);
        assert!(!diff.deletion[1].highlighted);
        assert_eq!(diff.deletion[1].text, " b ");
        assert_eq!(highlighted(&diff.addition), vec!["x", "z"]);
    }

    #[test]
    fn should_highlight_inserted_tokens() {
        let diff = compute_word_diff("call(a)", "call(a) && check(b)");

        assert!(diff.deletion.iter().all(|s| !s.highlighted));
        assert_eq!(highlighted(&diff.addition), vec![" && check(b)"]);
    }

    #[test]
    fn should_compute_lcs() {
        let a = ["a", " ", "b", " ", "c"];
        let b = ["a", " ", "c"];
        assert_eq!(longest_common_subsequence(&a, &b), vec!["a", " ", "c"]);
    }

    #[test]
    fn should_fall_back_to_coarse_diff() {
        let diff = coarse_word_diff("old", "new");
        assert_eq!(diff.deletion, vec![TextSegment::plain("old", true)]);
        assert_eq!(diff.addition, vec![TextSegment::plain("new", true)]);

        let same = coarse_word_diff("same", "same");
        assert!(!same.deletion[0].highlighted);
        assert!(coarse_word_diff("", "x").deletion.is_empty());
    }

    #[test]
    fn should_pair_deletion_run_with_following_addition_run() {
        let lines = vec![
            line(LineKind::HunkHeader, ""),
            line(LineKind::Context, "a"),
            line(LineKind::Deletion, "b"),
            line(LineKind::Deletion, "c"),
            line(LineKind::Deletion, "d"),
            line(LineKind::Addition, "B"),
            line(LineKind::Addition, "C"),
            line(LineKind::Context, "e"),
            line(LineKind::Deletion, "f"),
            line(LineKind::Context, "g"),
            line(LineKind::Addition, "h"),
        ];

        assert_eq!(pair_changed_lines(&lines), vec![(2, 5), (3, 6)]);
    }

    #[test]
    fn should_leave_excess_additions_unpaired() {
        let lines = vec![
            line(LineKind::Deletion, "x"),
            line(LineKind::Addition, "y"),
            line(LineKind::Addition, "z"),
        ];

        assert_eq!(pair_changed_lines(&lines), vec![(0, 1)]);
    }
}
