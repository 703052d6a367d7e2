//! Byte-level helpers for scanning generated text.
//!
//! The macro pass works on plain text, not tokens. These helpers know just
//! enough syntax to step over string literals, template literals and
//! comments, and to find the argument list of a call.
//!
//! All positions are byte offsets. Every position returned lies on an ASCII
//! byte or at the end of the text, so slicing there is always valid.

use memchr::{memchr, memchr2, memchr3, memmem};

#[inline]
pub(crate) fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

#[inline]
pub(crate) fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// End of the identifier starting at `pos`.
pub(crate) fn ident_end(bytes: &[u8], pos: usize) -> usize {
    bytes[pos..]
        .iter()
        .position(|&b| !is_ident_continue(b))
        .map_or(bytes.len(), |len| pos + len)
}

/// First position at or after `pos` that is not horizontal or vertical
/// whitespace.
pub(crate) fn skip_whitespace(bytes: &[u8], pos: usize) -> usize {
    bytes[pos..]
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map_or(bytes.len(), |len| pos + len)
}

/// If a string, template literal or comment starts at `pos`, the position
/// just past it. Unterminated ones run to the end of the text.
pub(crate) fn skip_opaque(bytes: &[u8], pos: usize) -> Option<usize> {
    match bytes[pos] {
        quote @ (b'"' | b'\'') => Some(skip_string(bytes, pos + 1, quote)),
        b'`' => Some(skip_template(bytes, pos + 1)),
        b'/' => match bytes.get(pos + 1) {
            Some(b'/') => Some(memchr(b'\n', &bytes[pos..]).map_or(bytes.len(), |i| pos + i)),
            Some(b'*') => Some(
                memmem::find(&bytes[pos + 2..], b"*/").map_or(bytes.len(), |i| pos + 2 + i + 2),
            ),
            _ => None,
        },
        _ => None,
    }
}

fn skip_string(bytes: &[u8], mut pos: usize, quote: u8) -> usize {
    while let Some(i) = memchr3(quote, b'\\', b'\n', &bytes[pos..]) {
        let at = pos + i;
        match bytes[at] {
            b'\\' => pos = (at + 2).min(bytes.len()),
            // A line break ends a broken string; leave it to the caller.
            b'\n' => return at,
            _ => return at + 1,
        }
    }
    bytes.len()
}

fn skip_template(bytes: &[u8], mut pos: usize) -> usize {
    while let Some(i) = memchr2(b'`', b'\\', &bytes[pos..]) {
        let at = pos + i;
        if bytes[at] == b'\\' {
            pos = (at + 2).min(bytes.len());
        } else {
            return at + 1;
        }
    }
    bytes.len()
}

/// Position of the `)` closing the `(` at `open`, skipping nested brackets,
/// strings and comments. `None` if the text ends first or a bracket of
/// another kind closes first.
pub(crate) fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut stack: Vec<u8> = Vec::new();
    let mut pos = open;
    while pos < bytes.len() {
        if let Some(end) = skip_opaque(bytes, pos) {
            pos = end;
            continue;
        }
        match bytes[pos] {
            b @ (b'(' | b'[' | b'{') => stack.push(b),
            b @ (b')' | b']' | b'}') => {
                let opener = stack.pop()?;
                if !matches!((opener, b), (b'(', b')') | (b'[', b']') | (b'{', b'}')) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(pos);
                }
            }
            _ => {}
        }
        pos += 1;
    }
    None
}

/// One argument of a call: its text and byte offset in the argument list.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct Arg<'a> {
    pub text: &'a str,
    pub offset: usize,
}

/// Split the text between a call's parentheses at top-level commas.
/// Whitespace-only text has no arguments.
pub(crate) fn split_args(inner: &str) -> Vec<Arg<'_>> {
    if inner.trim().is_empty() {
        return Vec::new();
    }
    let bytes = inner.as_bytes();
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        if let Some(end) = skip_opaque(bytes, pos) {
            pos = end;
            continue;
        }
        match bytes[pos] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                args.push(Arg {
                    text: &inner[start..pos],
                    offset: start,
                });
                start = pos + 1;
            }
            _ => {}
        }
        pos += 1;
    }
    args.push(Arg {
        text: &inner[start..],
        offset: start,
    });
    args
}

/// Number of line breaks in `bytes`.
pub(crate) fn count_lines(bytes: &[u8]) -> u32 {
    let count = memchr::memchr_iter(b'\n', bytes).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}
