//! Unified diff parser for `git diff` style output.
//!
//! The parser is a single forward fold over the input lines. It never fails:
//! malformed or truncated input yields a best-effort partial model, so
//! consumers must tolerate hunks whose line arrays disagree with their
//! declared counts.

use log::debug;

use super::path::{is_image_path, is_null_path, unescape_path};
use crate::model::{DiffFile, DiffHunk, DiffLine, FileStatus, LineKind};

const FILE_HEADER_PREFIX: &str = "diff --git";

/// Parse the text of one or more concatenated unified diffs.
pub fn parse_diff(diff_text: &str) -> Vec<DiffFile> {
    let mut state = ParseState::default();
    for line in diff_text.lines() {
        state.feed(line);
    }
    let files = state.finish();
    debug!(
        "parsed {} file(s), {} hunk(s)",
        files.len(),
        files.iter().map(|f| f.hunks.len()).sum::<usize>()
    );
    files
}

/// A file section whose status may not be known yet.
#[derive(Debug)]
struct FileBuilder {
    old_path: String,
    new_path: String,
    status: Option<FileStatus>,
    hunks: Vec<DiffHunk>,
    additions: usize,
    deletions: usize,
    is_binary: bool,
    is_image: bool,
}

impl FileBuilder {
    fn from_header(line: &str) -> Self {
        let (old_path, new_path) = parse_git_header(line).unwrap_or_default();
        Self {
            old_path,
            new_path,
            status: None,
            hunks: Vec::new(),
            additions: 0,
            deletions: 0,
            is_binary: false,
            is_image: false,
        }
    }

    fn build(mut self) -> DiffFile {
        let status = match self.status {
            Some(status) => status,
            None if is_null_path(&self.old_path) => FileStatus::Added,
            None if is_null_path(&self.new_path) => {
                self.new_path = self.old_path.clone();
                FileStatus::Deleted
            }
            None => FileStatus::Modified,
        };
        DiffFile {
            old_path: self.old_path,
            new_path: self.new_path,
            status,
            hunks: self.hunks,
            additions: self.additions,
            deletions: self.deletions,
            is_binary: self.is_binary,
            is_image: self.is_image,
        }
    }
}

/// An open hunk plus the number of old/new lines still expected by its header.
#[derive(Debug)]
struct HunkBuilder {
    hunk: DiffHunk,
    old_remaining: u32,
    new_remaining: u32,
}

impl HunkBuilder {
    fn is_exhausted(&self) -> bool {
        self.old_remaining == 0 && self.new_remaining == 0
    }
}

#[derive(Debug, Default)]
struct ParseState {
    files: Vec<DiffFile>,
    file: Option<FileBuilder>,
    hunk: Option<HunkBuilder>,
    old_lineno: u32,
    new_lineno: u32,
}

impl ParseState {
    fn feed(&mut self, line: &str) {
        if line.starts_with(FILE_HEADER_PREFIX) {
            self.flush_file();
            self.file = Some(FileBuilder::from_header(line));
            return;
        }

        let Some(file) = self.file.as_mut() else {
            return;
        };
        // A path marker inside a hunk that still expects lines is content
        // ("--- x" deleting "-- x"), not a header.
        let in_hunk_body = self.hunk.as_ref().is_some_and(|h| !h.is_exhausted());

        if !in_hunk_body {
            if line.starts_with("new file mode") {
                file.status = Some(FileStatus::Added);
                return;
            }
            if line.starts_with("deleted file mode") {
                file.status = Some(FileStatus::Deleted);
                return;
            }
            if line.starts_with("Binary files") {
                file.is_binary = true;
                let path = if file.new_path.is_empty() {
                    &file.old_path
                } else {
                    &file.new_path
                };
                file.is_image = is_image_path(path);
                return;
            }
            if let Some(rest) = line.strip_prefix("--- ") {
                file.old_path = parse_marker_path(rest);
                return;
            }
            if let Some(rest) = line.strip_prefix("+++ ") {
                file.new_path = parse_marker_path(rest);
                file.status = Some(if is_null_path(&file.new_path) {
                    file.new_path = file.old_path.clone();
                    FileStatus::Deleted
                } else if is_null_path(&file.old_path) {
                    FileStatus::Added
                } else {
                    FileStatus::Modified
                });
                return;
            }
        }

        if let Some(header) = parse_hunk_header(line) {
            self.flush_hunk();
            self.old_lineno = header.old_start;
            self.new_lineno = header.new_start;
            self.hunk = Some(HunkBuilder {
                hunk: DiffHunk {
                    header: line.to_string(),
                    old_start: header.old_start,
                    old_count: header.old_count,
                    new_start: header.new_start,
                    new_count: header.new_count,
                    lines: vec![DiffLine::hunk_header(header.trailing)],
                },
                old_remaining: header.old_count,
                new_remaining: header.new_count,
            });
            return;
        }

        let Some(open) = self.hunk.as_mut() else {
            return;
        };

        let (kind, content) = if let Some(rest) = line.strip_prefix('+') {
            (LineKind::Addition, rest)
        } else if let Some(rest) = line.strip_prefix('-') {
            (LineKind::Deletion, rest)
        } else if let Some(rest) = line.strip_prefix(' ') {
            (LineKind::Context, rest)
        } else if line.is_empty() {
            (LineKind::Context, "")
        } else {
            // "\ No newline at end of file" and anything unrecognised
            return;
        };

        let (old_lineno, new_lineno) = match kind {
            LineKind::Addition => {
                file.additions += 1;
                open.new_remaining = open.new_remaining.saturating_sub(1);
                (None, Some(post_increment(&mut self.new_lineno)))
            }
            LineKind::Deletion => {
                file.deletions += 1;
                open.old_remaining = open.old_remaining.saturating_sub(1);
                (Some(post_increment(&mut self.old_lineno)), None)
            }
            _ => {
                open.old_remaining = open.old_remaining.saturating_sub(1);
                open.new_remaining = open.new_remaining.saturating_sub(1);
                (
                    Some(post_increment(&mut self.old_lineno)),
                    Some(post_increment(&mut self.new_lineno)),
                )
            }
        };

        open.hunk.lines.push(DiffLine {
            kind,
            content: content.to_string(),
            old_lineno,
            new_lineno,
            segments: None,
        });
    }

    fn flush_hunk(&mut self) {
        if let Some(open) = self.hunk.take()
            && let Some(file) = self.file.as_mut()
        {
            file.hunks.push(open.hunk);
        }
    }

    fn flush_file(&mut self) {
        self.flush_hunk();
        if let Some(file) = self.file.take() {
            self.files.push(file.build());
        }
    }

    fn finish(mut self) -> Vec<DiffFile> {
        self.flush_file();
        self.files
    }
}

fn post_increment(counter: &mut u32) -> u32 {
    let value = *counter;
    *counter = counter.saturating_add(1);
    value
}

/// Split the paths out of a `diff --git` header line.
///
/// Handles the quoted pair form and the unquoted `a/X b/Y` form. When X
/// contains spaces the split is ambiguous; the symmetric split (old path ==
/// new path) is tried first, then the last `" b/"` occurrence.
fn parse_git_header(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix(FILE_HEADER_PREFIX)?.strip_prefix(' ')?;

    if let Some(quoted) = rest.strip_prefix("\"a/").and_then(|s| s.strip_suffix('"')) {
        let split = quoted.rfind("\" \"b/")?;
        let old_path = &quoted[..split];
        let new_path = &quoted[split + 5..];
        if old_path.is_empty() || new_path.is_empty() {
            return None;
        }
        return Some((unescape_path(old_path), unescape_path(new_path)));
    }

    let paths = rest.strip_prefix("a/")?;

    let len = paths.len();
    if len > 3 && (len - 3) % 2 == 0 {
        let path_len = (len - 3) / 2;
        if let (Some(old_path), Some(separator), Some(new_path)) = (
            paths.get(..path_len),
            paths.get(path_len..path_len + 3),
            paths.get(path_len + 3..),
        ) && separator == " b/"
            && old_path == new_path
        {
            return Some((old_path.to_string(), new_path.to_string()));
        }
    }

    let split = paths.rfind(" b/")?;
    Some((paths[..split].to_string(), paths[split + 3..].to_string()))
}

/// Path from a `--- ` / `+++ ` marker, without its `a/` or `b/` prefix.
///
/// Git terminates an unquoted path containing spaces with a tab.
fn parse_marker_path(raw: &str) -> String {
    let raw = raw.split('\t').next().unwrap_or(raw);
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        let inner = &raw[1..raw.len() - 1];
        return unescape_path(strip_side_prefix(inner));
    }
    strip_side_prefix(raw).to_string()
}

fn strip_side_prefix(path: &str) -> &str {
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path)
}

#[derive(Debug, PartialEq, Eq)]
struct HunkHeader<'a> {
    old_start: u32,
    old_count: u32,
    new_start: u32,
    new_count: u32,
    trailing: &'a str,
}

/// Parse `@@ -old_start,old_count +new_start,new_count @@ trailing`.
/// An elided or unparseable count defaults to 1.
fn parse_hunk_header(line: &str) -> Option<HunkHeader<'_>> {
    let rest = line.strip_prefix("@@ -")?;
    let (ranges, trailing) = rest.split_once(" @@")?;
    let (old_range, new_range) = ranges.split_once(" +")?;

    let (old_start, old_count) = parse_range(old_range)?;
    let (new_start, new_count) = parse_range(new_range)?;

    Some(HunkHeader {
        old_start,
        old_count,
        new_start,
        new_count,
        trailing,
    })
}

fn parse_range(s: &str) -> Option<(u32, u32)> {
    let (start, count) = match s.split_once(',') {
        Some((start, count)) => (start, Some(count)),
        None => (s, None),
    };
    if start.is_empty() || !start.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let start = start.parse().ok()?;
    let count = count.and_then(|c| c.parse().ok()).unwrap_or(1);
    Some((start, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Language;

    fn kinds(hunk: &DiffHunk) -> Vec<LineKind> {
        hunk.lines.iter().map(|l| l.kind).collect()
    }

    #[test]
    fn should_return_nothing_for_empty_input() {
        assert!(parse_diff("").is_empty());
        assert!(parse_diff("random text\nwithout headers\n").is_empty());
    }

    #[test]
    fn should_parse_simple_modification() {
        let diff = "diff --git a/x.ts b/x.ts\n--- a/x.ts\n+++ b/x.ts\n@@ -1,3 +1,3 @@\n const x = 1;\n-const y = 2;\n+const y = 3;\n const z = 3;";

        let files = parse_diff(diff);

        assert_eq!(files.len(), 1);
        let file = &files[0];
        assert_eq!(file.status, FileStatus::Modified);
        assert_eq!(file.old_path, "x.ts");
        assert_eq!(file.new_path, "x.ts");
        assert_eq!(file.additions, 1);
        assert_eq!(file.deletions, 1);
        assert_eq!(file.hunks.len(), 1);
        let hunk = &file.hunks[0];
        assert_eq!(
            (hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count),
            (1, 3, 1, 3)
        );
        assert_eq!(
            kinds(hunk),
            vec![
                LineKind::HunkHeader,
                LineKind::Context,
                LineKind::Deletion,
                LineKind::Addition,
                LineKind::Context,
            ]
        );
    }

    #[test]
    fn should_parse_empty_new_file_without_markers() {
        let diff = "diff --git a/e.txt b/e.txt\nnew file mode 100644\nindex 0000000..e69de29";

        let files = parse_diff(diff);

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].status, FileStatus::Added);
        assert!(files[0].hunks.is_empty());
        assert_eq!(files[0].new_path, "e.txt");
    }

    #[test]
    fn should_parse_empty_deleted_file_without_markers() {
        let diff = "diff --git a/gone.txt b/gone.txt\ndeleted file mode 100644\nindex e69de29..0000000\n";

        let files = parse_diff(diff);

        assert_eq!(files[0].status, FileStatus::Deleted);
        assert!(files[0].hunks.is_empty());
    }

    #[test]
    fn should_parse_added_file_and_keep_null_old_path() {
        let diff = "diff --git a/new.rs b/new.rs\nnew file mode 100644\nindex 0000000..abc\n--- /dev/null\n+++ b/new.rs\n@@ -0,0 +1,2 @@\n+fn a() {}\n+fn b() {}\n";

        let files = parse_diff(diff);

        let file = &files[0];
        assert_eq!(file.status, FileStatus::Added);
        assert_eq!(file.old_path, "/dev/null");
        assert_eq!(file.new_path, "new.rs");
        assert_eq!(file.additions, 2);
        assert_eq!(file.hunks[0].lines[1].new_lineno, Some(1));
        assert_eq!(file.hunks[0].lines[2].new_lineno, Some(2));
    }

    #[test]
    fn should_use_old_path_as_display_path_for_deleted_file() {
        let diff = "diff --git a/old.rs b/old.rs\ndeleted file mode 100644\n--- a/old.rs\n+++ /dev/null\n@@ -1,2 +0,0 @@\n-fn old() {\n-}\n";

        let files = parse_diff(diff);

        let file = &files[0];
        assert_eq!(file.status, FileStatus::Deleted);
        assert_eq!(file.old_path, "old.rs");
        assert_eq!(file.new_path, "old.rs");
        assert_eq!(file.deletions, 2);
    }

    #[test]
    fn should_infer_status_from_header_paths_when_no_markers() {
        let added = FileBuilder {
            old_path: "/dev/null".to_string(),
            new_path: "x".to_string(),
            status: None,
            hunks: Vec::new(),
            additions: 0,
            deletions: 0,
            is_binary: false,
            is_image: false,
        }
        .build();
        assert_eq!(added.status, FileStatus::Added);

        let deleted = FileBuilder {
            old_path: "x".to_string(),
            new_path: "dev/null".to_string(),
            status: None,
            hunks: Vec::new(),
            additions: 0,
            deletions: 0,
            is_binary: false,
            is_image: false,
        }
        .build();
        assert_eq!(deleted.status, FileStatus::Deleted);
        assert_eq!(deleted.new_path, "x");
    }

    #[test]
    fn should_track_line_numbers_across_hunk() {
        let diff = "diff --git a/f b/f\n--- a/f\n+++ b/f\n@@ -5,4 +5,5 @@\n context\n-deleted\n+added1\n+added2\n more\n";

        let files = parse_diff(diff);
        let lines = &files[0].hunks[0].lines;

        assert_eq!((lines[1].old_lineno, lines[1].new_lineno), (Some(5), Some(5)));
        assert_eq!((lines[2].old_lineno, lines[2].new_lineno), (Some(6), None));
        assert_eq!((lines[3].old_lineno, lines[3].new_lineno), (None, Some(6)));
        assert_eq!((lines[4].old_lineno, lines[4].new_lineno), (None, Some(7)));
        assert_eq!((lines[5].old_lineno, lines[5].new_lineno), (Some(7), Some(8)));
    }

    #[test]
    fn should_carry_trailing_hunk_context_in_header_line() {
        let diff = "diff --git a/m.rs b/m.rs\n--- a/m.rs\n+++ b/m.rs\n@@ -10,2 +10,2 @@ fn main() {\n-a\n+b\n";

        let files = parse_diff(diff);
        let hunk = &files[0].hunks[0];

        assert_eq!(hunk.header, "@@ -10,2 +10,2 @@ fn main() {");
        assert_eq!(hunk.lines[0].kind, LineKind::HunkHeader);
        assert_eq!(hunk.lines[0].content, " fn main() {");
        assert_eq!(hunk.lines[0].old_lineno, None);
        assert_eq!(hunk.lines[0].new_lineno, None);
    }

    #[test]
    fn should_parse_multiple_files_and_hunks() {
        let diff = "diff --git a/a.txt b/a.txt\n--- a/a.txt\n+++ b/a.txt\n@@ -1 +1 @@\n-old\n+new\n@@ -10,2 +10,3 @@\n keep\n+more\n keep\ndiff --git a/b.txt b/b.txt\n--- a/b.txt\n+++ b/b.txt\n@@ -1,2 +1,1 @@\n keep\n-remove\n";

        let files = parse_diff(diff);

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].hunks.len(), 2);
        assert_eq!(files[0].additions, 2);
        assert_eq!(files[0].deletions, 1);
        assert_eq!(files[1].new_path, "b.txt");
        assert_eq!(files[1].deletions, 1);
    }

    #[test]
    fn should_ignore_no_newline_marker() {
        let diff = "diff --git a/n b/n\n--- a/n\n+++ b/n\n@@ -1 +1 @@\n-old\n\\ No newline at end of file\n+new\n\\ No newline at end of file\n";

        let files = parse_diff(diff);

        assert_eq!(files[0].hunks[0].lines.len(), 3);
    }

    #[test]
    fn should_treat_marker_lookalikes_inside_hunk_as_content() {
        let diff = "diff --git a/q.sql b/q.sql\n--- a/q.sql\n+++ b/q.sql\n@@ -1,2 +1,2 @@\n--- old comment\n+++ new comment\n select 1;\n";

        let files = parse_diff(diff);
        let file = &files[0];

        assert_eq!(file.old_path, "q.sql");
        assert_eq!(file.new_path, "q.sql");
        assert_eq!(file.deletions, 1);
        assert_eq!(file.additions, 1);
        assert_eq!(file.hunks[0].lines[1].content, "-- old comment");
        assert_eq!(file.hunks[0].lines[2].content, "++ new comment");
    }

    #[test]
    fn should_treat_empty_line_inside_hunk_as_context() {
        let diff = "diff --git a/e b/e\n--- a/e\n+++ b/e\n@@ -1,3 +1,3 @@\n a\n\n-b\n+c\n";

        let files = parse_diff(diff);
        let lines = &files[0].hunks[0].lines;

        assert_eq!(lines[2].kind, LineKind::Context);
        assert_eq!(lines[2].content, "");
        assert_eq!(lines[2].new_lineno, Some(2));
    }

    #[test]
    fn should_mark_binary_image() {
        let diff = "diff --git a/logo.PNG b/logo.PNG\nindex abc..def 100644\nBinary files a/logo.PNG and b/logo.PNG differ\n";

        let files = parse_diff(diff);

        assert!(files[0].is_binary);
        assert!(files[0].is_image);
        assert!(files[0].hunks.is_empty());
        assert_eq!(files[0].status, FileStatus::Modified);
    }

    #[test]
    fn should_mark_binary_non_image() {
        let diff = "diff --git a/lib.so b/lib.so\nnew file mode 100755\nBinary files /dev/null and b/lib.so differ\n";

        let files = parse_diff(diff);

        assert!(files[0].is_binary);
        assert!(!files[0].is_image);
        assert_eq!(files[0].status, FileStatus::Added);
    }

    #[test]
    fn should_decode_quoted_paths() {
        let diff = "diff --git \"a/caf\\303\\251.txt\" \"b/caf\\303\\251.txt\"\n--- \"a/caf\\303\\251.txt\"\n+++ \"b/caf\\303\\251.txt\"\n@@ -1 +1 @@\n-a\n+b\n";

        let files = parse_diff(diff);

        assert_eq!(files[0].old_path, "café.txt");
        assert_eq!(files[0].new_path, "café.txt");
    }

    #[test]
    fn should_drop_tab_terminator_from_marker_paths() {
        let diff = "diff --git a/my file.rs b/my file.rs\nindex 1111111..2222222 100644\n--- a/my file.rs\t\n+++ b/my file.rs\t\n@@ -1 +1 @@\n-let a = 1;\n+let a = 2;\n";

        let files = parse_diff(diff);

        assert_eq!(files[0].old_path, "my file.rs");
        assert_eq!(files[0].new_path, "my file.rs");
        assert_eq!(Language::from_path(files[0].display_path()), Some(Language::Rust));
    }

    #[test]
    fn should_take_paths_from_header_when_markers_absent() {
        let diff = "diff --git \"a/\\303\\274.txt\" \"b/\\303\\274.txt\"\nnew file mode 100644\nindex 0000000..e69de29\n";

        let files = parse_diff(diff);

        assert_eq!(files[0].new_path, "ü.txt");
    }

    #[test]
    fn should_split_header_with_spaces_symmetrically() {
        assert_eq!(
            parse_git_header("diff --git a/my dir b/file.txt b/my dir b/file.txt"),
            Some(("my dir b/file.txt".to_string(), "my dir b/file.txt".to_string()))
        );
    }

    #[test]
    fn should_fall_back_to_last_separator_for_renames() {
        assert_eq!(
            parse_git_header("diff --git a/old name.txt b/new.txt"),
            Some(("old name.txt".to_string(), "new.txt".to_string()))
        );
    }

    #[test]
    fn should_reject_unrecognised_header() {
        assert_eq!(parse_git_header("diff --git x y"), None);
        assert_eq!(parse_git_header("diff --gitx"), None);
    }

    #[test]
    fn should_parse_hunk_header() {
        assert_eq!(
            parse_hunk_header("@@ -10,5 +20,8 @@ context"),
            Some(HunkHeader {
                old_start: 10,
                old_count: 5,
                new_start: 20,
                new_count: 8,
                trailing: " context",
            })
        );
    }

    #[test]
    fn should_default_elided_hunk_counts_to_one() {
        let header = parse_hunk_header("@@ -5 +10 @@").unwrap();
        assert_eq!((header.old_count, header.new_count), (1, 1));
        assert_eq!(header.trailing, "");
    }

    #[test]
    fn should_reject_invalid_hunk_header() {
        assert!(parse_hunk_header("not a hunk header").is_none());
        assert!(parse_hunk_header("@@ invalid").is_none());
        assert!(parse_hunk_header("@@ -a,1 +1 @@").is_none());
    }

    #[test]
    fn should_default_unparseable_count_to_one() {
        assert_eq!(parse_range("10,5"), Some((10, 5)));
        assert_eq!(parse_range("42"), Some((42, 1)));
        assert_eq!(parse_range("3,x"), Some((3, 1)));
        assert_eq!(parse_range("abc"), None);
    }

    #[test]
    fn should_tolerate_truncated_hunk() {
        let diff = "diff --git a/t b/t\n--- a/t\n+++ b/t\n@@ -1,10 +1,10 @@\n one\n-two\n";

        let files = parse_diff(diff);
        let hunk = &files[0].hunks[0];

        assert_eq!(hunk.old_count, 10);
        assert_eq!(hunk.lines.len(), 3);
    }

    #[test]
    fn should_keep_counts_consistent_with_lines() {
        let diff = "diff --git a/a b/a\n--- a/a\n+++ b/a\n@@ -1,3 +1,4 @@\n x\n-y\n+y1\n+y2\n z\n@@ -20,2 +21,1 @@\n-p\n-q\n+r\n";

        for file in parse_diff(diff) {
            let additions = file.lines().filter(|l| l.kind == LineKind::Addition).count();
            let deletions = file.lines().filter(|l| l.kind == LineKind::Deletion).count();
            assert_eq!(file.additions, additions);
            assert_eq!(file.deletions, deletions);
        }
    }

    #[test]
    fn should_saturate_line_numbers_at_u32_max() {
        let diff = "diff --git a/big b/big\n--- a/big\n+++ b/big\n@@ -4294967295,2 +4294967295,2 @@\n one\n two\n";

        let files = parse_diff(diff);
        let lines = &files[0].hunks[0].lines;

        assert_eq!(lines[1].new_lineno, Some(u32::MAX));
        assert_eq!(lines[2].new_lineno, Some(u32::MAX));
        assert_eq!(lines[2].old_lineno, Some(u32::MAX));
    }

    #[test]
    fn should_parse_identically_twice() {
        let diff = "diff --git a/a b/a\n--- a/a\n+++ b/a\n@@ -1,2 +1,2 @@\n-x\n+y\n z\n";
        assert_eq!(parse_diff(diff), parse_diff(diff));
    }

    #[test]
    fn should_handle_crlf_line_endings() {
        let diff = "diff --git a/w b/w\r\n--- a/w\r\n+++ b/w\r\n@@ -1 +1 @@\r\n-a\r\n+b\r\n";

        let files = parse_diff(diff);

        assert_eq!(files[0].new_path, "w");
        assert_eq!(files[0].hunks[0].lines[2].content, "b");
    }
}
