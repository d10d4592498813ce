//! Lightweight, line-at-a-time syntax tokenizer.
//!
//! Each language gets an ordered list of anchored pattern rules. At every
//! position the first rule that matches consumes its match; characters no
//! rule claims accumulate into untyped runs. There is no state between
//! lines, so multi-line constructs are only recognised when they open and
//! close on the same line.

pub mod language;

use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::SyntaxKind;
pub use language::{CommentStyle, Language, LanguageConfig};

/// A span of a line with its syntax category (`None` for plain text).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxToken<'a> {
    pub text: &'a str,
    pub kind: Option<SyntaxKind>,
}

static TOKENIZERS: LazyLock<HashMap<Language, Tokenizer>> = LazyLock::new(|| {
    Language::ALL
        .iter()
        .map(|&language| (language, Tokenizer::for_language(language)))
        .collect()
});

/// Tokenize one line. Without a language the whole line is one untyped token.
///
/// Adjacent tokens of the same kind are merged, and the token texts always
/// concatenate back to `line`.
pub fn tokenize_line(line: &str, language: Option<Language>) -> Vec<SyntaxToken<'_>> {
    if line.is_empty() {
        return Vec::new();
    }
    match language.and_then(|language| TOKENIZERS.get(&language)) {
        Some(tokenizer) => tokenizer.tokenize(line),
        None => vec![SyntaxToken {
            text: line,
            kind: None,
        }],
    }
}

/// Extra condition checked around a regex match.
#[derive(Debug, Clone, Copy)]
enum Guard {
    Always,
    /// Next non-blank character is `=` (markup attribute names).
    FollowedByEquals,
    /// Match is a whole word.
    WordEnd,
    /// Preceding non-blank text ends with `:` (type annotations).
    AfterColon,
}

impl Guard {
    fn allows(self, line: &str, span: Range<usize>) -> bool {
        match self {
            Guard::Always => true,
            Guard::FollowedByEquals => line[span.end..].trim_start().starts_with('='),
            Guard::WordEnd => line[span.end..]
                .chars()
                .next()
                .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_')),
            Guard::AfterColon => line[..span.start].trim_end().ends_with(':'),
        }
    }
}

#[derive(Debug)]
struct Rule {
    kind: Option<SyntaxKind>,
    regex: Regex,
    guard: Guard,
}

#[derive(Debug)]
struct Tokenizer {
    rules: Vec<Rule>,
}

fn rule(kind: Option<SyntaxKind>, pattern: &str, guard: Guard) -> Rule {
    Rule {
        kind,
        regex: Regex::new(pattern).expect("token patterns are valid regexes"),
        guard,
    }
}

fn keyword_pattern(keywords: &[&str], ignore_case: bool) -> String {
    let mut sorted: Vec<&str> = keywords.to_vec();
    // Longest first so a keyword never loses to its own prefix.
    sorted.sort_by_key(|k| std::cmp::Reverse(k.len()));
    let alternation = sorted
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    let flags = if ignore_case { "(?i)" } else { "" };
    format!("{flags}^(?:{alternation})")
}

impl Tokenizer {
    fn for_language(language: Language) -> Self {
        use SyntaxKind::*;

        let config = language.config();
        let markup = language.is_markup();
        let mut rules = Vec::new();

        for style in config.comment_styles {
            match style {
                CommentStyle::Slash => {
                    rules.push(rule(Some(Comment), r"^//.*", Guard::Always));
                    rules.push(rule(Some(Comment), r"^/\*.*?\*/", Guard::Always));
                }
                CommentStyle::Hash => rules.push(rule(Some(Comment), r"^#.*", Guard::Always)),
                CommentStyle::Markup => {
                    rules.push(rule(Some(Comment), r"^<!--.*?-->", Guard::Always))
                }
                CommentStyle::Sql => rules.push(rule(Some(Comment), r"^--.*", Guard::Always)),
            }
        }

        if markup {
            rules.push(rule(Some(Keyword), r"(?i)^<!DOCTYPE[^>]*>", Guard::Always));
            rules.push(rule(Some(Comment), r"^<!\[CDATA\[.*?\]\]>", Guard::Always));
            rules.push(rule(Some(Keyword), r"^<\?.*?\?>", Guard::Always));
            rules.push(rule(Some(Keyword), r"^</[a-zA-Z][a-zA-Z0-9-]*\s*>", Guard::Always));
            rules.push(rule(Some(Keyword), r"^<[a-zA-Z][a-zA-Z0-9-]*", Guard::Always));
            rules.push(rule(Some(Keyword), r"^/?>", Guard::Always));
            rules.push(rule(
                Some(Type),
                r"^[a-zA-Z_:][a-zA-Z0-9_:.-]*",
                Guard::FollowedByEquals,
            ));
        }

        if language.has_triple_quoted_strings() {
            rules.push(rule(Some(String), r#"^""".*?""""#, Guard::Always));
            rules.push(rule(Some(String), r"^'''.*?'''", Guard::Always));
        }
        rules.push(rule(Some(String), r"^`(?:[^`\\]|\\.)*`", Guard::Always));
        rules.push(rule(Some(String), r#"^"(?:[^"\\]|\\.)*""#, Guard::Always));
        rules.push(rule(Some(String), r"^'(?:[^'\\]|\\.)*'", Guard::Always));

        if language == Language::Css {
            rules.push(rule(Some(Number), r"^#[0-9a-fA-F]{3,8}\b", Guard::Always));
        }
        rules.push(rule(Some(Number), r"^0[xX][0-9a-fA-F]+", Guard::Always));
        rules.push(rule(Some(Number), r"^0[bB][01]+", Guard::Always));
        rules.push(rule(Some(Number), r"^0[oO][0-7]+", Guard::Always));
        rules.push(rule(
            Some(Number),
            r"^[0-9]+\.?[0-9]*(?:[eE][+-]?[0-9]+)?",
            Guard::Always,
        ));
        rules.push(rule(Some(Number), r"^\.[0-9]+(?:[eE][+-]?[0-9]+)?", Guard::Always));

        if !markup {
            rules.push(rule(
                Some(Operator),
                r"^(?:>>>|<<=|>>=|===|!==|\.\.\.|==|!=|<=|>=|&&|\|\||=>|\?\?|\?\.|<<|>>|\+\+|--|\+=|-=|\*=|/=|%=|&=|\|=|\^=)",
                Guard::Always,
            ));
            rules.push(rule(Some(Operator), r"^[-+*/%=<>!&|^~?:]", Guard::Always));
        }

        if !config.keywords.is_empty() {
            let pattern = keyword_pattern(config.keywords, language.keywords_ignore_case());
            rules.push(rule(Some(Keyword), &pattern, Guard::WordEnd));
        }

        if !markup {
            rules.push(rule(Some(Type), r"^[A-Z][a-zA-Z0-9_]*", Guard::AfterColon));
        }

        rules.push(rule(None, r"^[a-zA-Z_][a-zA-Z0-9_]*", Guard::Always));
        rules.push(rule(Some(Punctuation), r"^[{}\[\](),;.]", Guard::Always));

        Self { rules }
    }

    fn match_at(&self, line: &str, pos: usize) -> Option<(usize, Option<SyntaxKind>)> {
        let rest = &line[pos..];
        self.rules.iter().find_map(|rule| {
            let found = rule.regex.find(rest)?;
            let end = pos + found.end();
            (found.end() > 0 && rule.guard.allows(line, pos..end)).then_some((end, rule.kind))
        })
    }

    fn tokenize<'a>(&self, line: &'a str) -> Vec<SyntaxToken<'a>> {
        let mut spans: Vec<(Range<usize>, Option<SyntaxKind>)> = Vec::new();
        let mut plain_start: Option<usize> = None;
        let mut pos = 0;

        while pos < line.len() {
            match self.match_at(line, pos) {
                Some((end, kind)) => {
                    if let Some(start) = plain_start.take() {
                        push_span(&mut spans, start..pos, None);
                    }
                    push_span(&mut spans, pos..end, kind);
                    pos = end;
                }
                None => {
                    plain_start.get_or_insert(pos);
                    pos += line[pos..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        if let Some(start) = plain_start {
            push_span(&mut spans, start..line.len(), None);
        }

        spans
            .into_iter()
            .map(|(range, kind)| SyntaxToken {
                text: &line[range],
                kind,
            })
            .collect()
    }
}

/// Append a span, extending the previous one when the kinds agree.
fn push_span(
    spans: &mut Vec<(Range<usize>, Option<SyntaxKind>)>,
    range: Range<usize>,
    kind: Option<SyntaxKind>,
) {
    match spans.last_mut() {
        Some((last, last_kind)) if *last_kind == kind && last.end == range.start => {
            last.end = range.end;
        }
        _ => spans.push((range, kind)),
    }
}
