use std::fmt::Write;

use crate::model::{DiffFile, DiffLine, HunkExpansions, LineKind};

/// Plain-text rendering of annotated files.
///
/// Highlighted spans are wrapped as `[-removed-]` on deletions and
/// `{+added+}` on additions. Lines without segments print their raw content.
/// `expansions` holds one store per entry of `files`; context loaded there
/// is printed around its hunk.
pub fn render_files(files: &[DiffFile], expansions: &[HunkExpansions]) -> String {
    let mut out = String::new();

    for (section, file) in files.iter().enumerate() {
        let _ = writeln!(
            out,
            "{} {} (+{} -{})",
            file.status.as_char(),
            file.display_path(),
            file.additions,
            file.deletions
        );
        if file.is_binary {
            let kind = if file.is_image { "Image" } else { "Binary" };
            let _ = writeln!(out, "    {kind} file not shown");
        }

        for (index, hunk) in file.hunks.iter().enumerate() {
            let state = expansions
                .get(section)
                .and_then(|store| store.get(file.display_path(), index));
            let before = state.into_iter().flat_map(|s| s.before_lines.iter());
            let after = state.into_iter().flat_map(|s| s.after_lines.iter());

            let _ = writeln!(out, "{}", hunk.header);
            for line in before {
                let _ = writeln!(out, "{}", render_line(line));
            }
            for line in hunk.lines.iter().filter(|l| l.kind != LineKind::HunkHeader) {
                let _ = writeln!(out, "{}", render_line(line));
            }
            for line in after {
                let _ = writeln!(out, "{}", render_line(line));
            }
        }
        let _ = writeln!(out);
    }

    out
}

fn line_number(value: Option<u32>) -> String {
    value.map_or_else(String::new, |n| n.to_string())
}

/// One diff row: old and new line numbers, the marker and the line text.
pub fn render_line(line: &DiffLine) -> String {
    let (marker, open, close) = match line.kind {
        LineKind::Addition => ('+', "{+", "+}"),
        LineKind::Deletion => ('-', "[-", "-]"),
        _ => (' ', "", ""),
    };

    let text = match &line.segments {
        Some(segments) => segments.iter().fold(String::new(), |mut acc, segment| {
            if segment.highlighted && !open.is_empty() {
                let _ = write!(acc, "{open}{}{close}", segment.text);
            } else {
                acc.push_str(&segment.text);
            }
            acc
        }),
        None => line.content.clone(),
    };

    format!(
        "{:>5} {:>5} {marker}{text}",
        line_number(line.old_lineno),
        line_number(line.new_lineno)
    )
}
