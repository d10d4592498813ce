//! Decoding of the quoted path form git uses for unusual file names.
//!
//! Git wraps such paths in double quotes, writes every non-ASCII byte as a
//! three-digit octal escape (`\303\251` for `é`) and uses C-style escapes for
//! control characters, quotes and backslashes.

use std::path::Path;

/// Conventional path standing for "no file" on one side of an add/delete.
pub const NULL_DEVICE: &str = "/dev/null";

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "bmp", "tiff", "tif",
];

/// Decode a possibly quoted git path into literal UTF-8 text.
///
/// Consecutive octal escapes are collected into one byte sequence before
/// decoding, so multi-byte characters survive. Invalid UTF-8 decodes to
/// replacement characters rather than failing.
///
/// Escapes are read left to right in a single pass, so an escaped backslash
/// is never taken as the start of an octal escape: `"a\\303"` decodes to
/// `a\303`.
pub fn unescape_path(raw: &str) -> String {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);

    let mut out = String::with_capacity(inner.len());
    let mut octal_run: Vec<u8> = Vec::new();
    let bytes = inner.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' {
            if let Some(byte) = octal_byte(&bytes[i + 1..]) {
                octal_run.push(byte);
                i += 4;
                continue;
            }
            flush_octal_run(&mut octal_run, &mut out);
            let replacement = match bytes.get(i + 1) {
                Some(b'n') => Some('\n'),
                Some(b't') => Some('\t'),
                Some(b'"') => Some('"'),
                Some(b'\\') => Some('\\'),
                _ => None,
            };
            if let Some(ch) = replacement {
                out.push(ch);
                i += 2;
                continue;
            }
        } else {
            flush_octal_run(&mut octal_run, &mut out);
        }

        // Copy one whole character; `i` always sits on a char boundary here.
        let ch = inner[i..].chars().next().unwrap_or('\u{FFFD}');
        out.push(ch);
        i += ch.len_utf8().max(1);
    }
    flush_octal_run(&mut octal_run, &mut out);

    out
}

fn octal_byte(digits: &[u8]) -> Option<u8> {
    let [a, b, c, ..] = digits else {
        return None;
    };
    if ![a, b, c].iter().all(|d| (b'0'..=b'7').contains(*d)) {
        return None;
    }
    let value = u32::from(a - b'0') * 64 + u32::from(b - b'0') * 8 + u32::from(c - b'0');
    // \400 and above do not fit a byte; keep them as literal text.
    u8::try_from(value).ok()
}

fn flush_octal_run(run: &mut Vec<u8>, out: &mut String) {
    if !run.is_empty() {
        out.push_str(&String::from_utf8_lossy(run));
        run.clear();
    }
}

/// Whether `path` is the null-device sentinel, with or without the leading slash
/// (an `a/`/`b/` prefix strip can eat it).
pub fn is_null_path(path: &str) -> bool {
    path == NULL_DEVICE || path == "dev/null"
}

/// Whether the file's extension is one of the common raster/vector image types.
pub fn is_image_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}
