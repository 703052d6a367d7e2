//! The global macro pass over pasted-up text.
//!
//! Three forms are recognized, in priority order:
//!
//! ```text
//! @new T                      @new T.Array(n)
//! T[.qual].Array[.path][.op](base, index, args...)
//! T.path[.op](self, args...)
//! ```
//!
//! Each is lowered to memory operations through [`crate::emit`].
//! Arguments are expanded first; the rewritten text is not scanned again,
//! which makes the pass idempotent on its own output.
//!
//! The pass is tolerant: a near-miss (wrong arity, an operation the target
//! does not support, a bad array path) is reported as a warning and the
//! text is left alone. Only malformed `@new` is a hard error.

use flat_diagnostic::{CompileError, CompileResult, Diagnostic, DiagnosticQueue, ErrorCode};
use flat_types::{Defn, Qual, Session};
use smallvec::SmallVec;

use crate::emit::{self, element_address, field_address, operand};
use crate::lines::{LineCursor, LineMap};
use crate::pasteup::Pasted;
use crate::scan::{
    ident_end, is_ident_continue, is_ident_start, matching_paren, skip_opaque, skip_whitespace,
    split_args, Arg,
};
use crate::target::{resolve_in_element, resolve_in_type, Target};

const NEW: &str = "@new";

/// Expand every macro in the pasted text. Diagnostics are reported under
/// `file`, at the source lines recorded in `pasted.lines`.
pub fn expand_macros(
    session: &Session,
    file: &str,
    pasted: &Pasted,
    diagnostics: &mut DiagnosticQueue,
) -> CompileResult<String> {
    let mut expander = MacroExpander {
        session,
        file,
        source: &pasted.text,
        lines: &pasted.lines,
        diagnostics,
    };
    expander.expand(&pasted.text, 0)
}

struct MacroExpander<'a> {
    session: &'a Session,
    file: &'a str,
    /// The whole pasted text; nested expansions work on slices of it.
    source: &'a str,
    lines: &'a LineMap,
    diagnostics: &'a mut DiagnosticQueue,
}

/// Outcome of looking at a candidate.
enum Step {
    /// Replace the text up to `end` with `text`.
    Rewrite { text: String, end: usize },
    /// Not a macro here; resume scanning at `resume`.
    Skip { resume: usize },
}

/// `T.a.b` as written, before the argument list.
struct Candidate<'t> {
    type_name: &'t str,
    segments: SmallVec<[&'t str; 4]>,
    /// Position just past the last segment.
    end: usize,
}

impl MacroExpander<'_> {
    /// Expand `text`, the slice of the pasted text starting at `base`.
    fn expand(&mut self, text: &str, base: usize) -> CompileResult<String> {
        let bytes = text.as_bytes();
        let (source, map) = (self.source, self.lines);
        let source = source.as_bytes();
        let mut lines = LineCursor::new(map);
        let mut out = String::with_capacity(text.len());
        let mut copied = 0;
        let mut pos = 0;
        while pos < bytes.len() {
            if let Some(end) = skip_opaque(bytes, pos) {
                pos = end;
                continue;
            }
            let step = if bytes[pos] == b'@' && is_new(bytes, pos) {
                let line = lines.at(source, base + pos);
                self.allocation(text, base, pos, line)?
            } else if is_ident_start(bytes[pos]) && starts_word(bytes, pos) {
                let line = lines.at(source, base + pos);
                self.access(text, base, pos, line)?
            } else {
                Step::Skip { resume: pos + 1 }
            };
            match step {
                Step::Rewrite { text: replacement, end } => {
                    tracing::trace!(
                        file = self.file,
                        line = lines.at(source, base + pos),
                        from = &text[pos..end],
                        to = replacement.as_str(),
                        "expanded macro"
                    );
                    out.push_str(&text[copied..pos]);
                    out.push_str(&replacement);
                    copied = end;
                    pos = end;
                }
                Step::Skip { resume } => pos = resume,
            }
        }
        out.push_str(&text[copied..]);
        Ok(out)
    }

    fn warn(&mut self, code: ErrorCode, line: u32, message: String) {
        self.diagnostics.push(
            Diagnostic::warning(code)
                .with_message(message)
                .at(self.file, line),
        );
    }

    fn error(&self, code: ErrorCode, line: u32, message: String) -> CompileError {
        CompileError::program(code, self.file, line, message)
    }

    /// Expand each argument of a call whose `(` is at `open` in the slice
    /// starting at `base`.
    fn arguments(
        &mut self,
        base: usize,
        open: usize,
        args: &[Arg<'_>],
    ) -> CompileResult<Vec<String>> {
        args.iter()
            .map(|arg| self.expand(arg.text, base + open + 1 + arg.offset))
            .collect()
    }

    // ─── `@new` ─────────────────────────────────────────────────────

    fn allocation(&mut self, text: &str, base: usize, pos: usize, line: u32) -> CompileResult<Step> {
        let session = self.session;
        let bytes = text.as_bytes();
        let name_start = skip_whitespace(bytes, pos + NEW.len());
        if name_start >= bytes.len() || !is_ident_start(bytes[name_start]) {
            return Err(self.error(
                ErrorCode::E3008,
                line,
                format!("`{NEW}` must be followed by a type name"),
            ));
        }
        let candidate = read_path(bytes, text, name_start);
        let type_name = candidate.type_name;
        let Some(id) = session.lookup(type_name) else {
            return Err(self.error(
                ErrorCode::E3005,
                line,
                format!("`{NEW}` of unknown type `{type_name}`"),
            ));
        };

        match candidate.segments.as_slice() {
            [] => {
                let Defn::User(defn) = session.get(id) else {
                    return Err(self.error(
                        ErrorCode::E3008,
                        line,
                        format!("`{NEW} {type_name}` allocates a primitive; use `{type_name}.Array`"),
                    ));
                };
                let alloc = format!("FlatJS.allocOrThrow({}, {})", defn.size, defn.align);
                let text = if defn.is_class() {
                    format!("{type_name}.initInstance({alloc})")
                } else {
                    alloc
                };
                Ok(Step::Rewrite {
                    text,
                    end: candidate.end,
                })
            }
            ["Array"] => {
                let open = candidate.end;
                let close = match bytes.get(open) {
                    Some(b'(') => matching_paren(bytes, open),
                    _ => None,
                };
                let Some(close) = close else {
                    return Err(self.error(
                        ErrorCode::E3006,
                        line,
                        format!("`{NEW} {type_name}.Array` needs one length argument"),
                    ));
                };
                let args = split_args(&text[open + 1..close]);
                if args.len() != 1 {
                    return Err(self.error(
                        ErrorCode::E3006,
                        line,
                        format!(
                            "`{NEW} {type_name}.Array` takes one argument, found {}",
                            args.len()
                        ),
                    ));
                }
                let length = self.arguments(base, open, &args)?;
                let element = Target::of_value(session, id);
                Ok(Step::Rewrite {
                    text: format!(
                        "FlatJS.allocOrThrow({} * {}, {})",
                        element.stride(),
                        operand(&length[0]),
                        element.align()
                    ),
                    end: close + 1,
                })
            }
            [qual, "Array"] if Qual::from_keyword(qual).is_some() => Err(self.error(
                ErrorCode::E3007,
                line,
                format!("`{NEW} {type_name}.{qual}.Array` is not supported"),
            )),
            _ => Err(self.error(
                ErrorCode::E3008,
                line,
                format!(
                    "malformed `{NEW} {type_name}.{}`",
                    candidate.segments.join(".")
                ),
            )),
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────

    fn access(&mut self, text: &str, base: usize, pos: usize, line: u32) -> CompileResult<Step> {
        let bytes = text.as_bytes();
        let session = self.session;
        let candidate = read_path(bytes, text, pos);
        let skip = Step::Skip {
            resume: candidate.end,
        };
        let Some(id) = session.lookup(candidate.type_name) else {
            return Ok(skip);
        };
        if candidate.segments.is_empty() || bytes.get(candidate.end) != Some(&b'(') {
            return Ok(skip);
        }
        let written = format!(
            "{}.{}",
            candidate.type_name,
            candidate.segments.join(".")
        );

        let array = match candidate.segments.as_slice() {
            ["Array", rest @ ..] => Some((Qual::None, rest)),
            [qual, "Array", rest @ ..] => Qual::from_keyword(qual).map(|qual| (qual, rest)),
            _ => None,
        };

        let (element, access) = match array {
            Some((qual, rest)) => {
                let element = match qual {
                    Qual::None => Some(id),
                    _ => session.qualified(id, qual),
                };
                let Some(element) = element else {
                    self.warn(
                        ErrorCode::W3002,
                        line,
                        format!(
                            "`{written}`: `{}` cannot be {}",
                            candidate.type_name,
                            qual.keyword()
                        ),
                    );
                    return Ok(skip);
                };
                let element = Target::of_value(session, element);
                let Some(access) = resolve_in_element(session, element, rest) else {
                    self.warn(
                        ErrorCode::W3002,
                        line,
                        format!("`{written}` is not a valid array access"),
                    );
                    return Ok(skip);
                };
                (Some(element), access)
            }
            None => {
                let Defn::User(defn) = session.get(id) else {
                    return Ok(skip);
                };
                match resolve_in_type(session, defn, &candidate.segments) {
                    Some(access) => (None, access),
                    None => return Ok(skip),
                }
            }
        };

        let open = candidate.end;
        let Some(close) = matching_paren(bytes, open) else {
            self.warn(
                ErrorCode::W3003,
                line,
                format!("unterminated argument list for `{written}`"),
            );
            return Ok(skip);
        };
        let args = split_args(&text[open + 1..close]);
        let leading = if element.is_some() { 2 } else { 1 };
        let expected = access.op.arity() - 1 + leading;
        let given = args.iter().filter(|arg| !arg.text.trim().is_empty()).count();
        if args.len() != expected || given != expected {
            self.warn(
                ErrorCode::W3001,
                line,
                format!("`{written}` takes {expected} argument(s), found {given}"),
            );
            return Ok(skip);
        }
        if !access.target.supports(access.op) {
            self.warn(
                ErrorCode::W3002,
                line,
                format!(
                    "operation `{}` in `{written}` does not apply to {}",
                    access.op,
                    access.target.describe()
                ),
            );
            return Ok(skip);
        }

        let args = self.arguments(base, open, &args)?;
        let (address, rest) = match element {
            Some(element) => (
                element_address(&args[0], &args[1], element.stride(), access.offset),
                &args[2..],
            ),
            None => (field_address(&args[0], access.offset), &args[1..]),
        };
        Ok(Step::Rewrite {
            text: emit::access(access.target, &address, access.op, rest)?,
            end: close + 1,
        })
    }
}

/// Whether `@new` starts at `pos` as a whole word.
fn is_new(bytes: &[u8], pos: usize) -> bool {
    bytes[pos..].starts_with(NEW.as_bytes())
        && !bytes
            .get(pos + NEW.len())
            .is_some_and(|&b| is_ident_continue(b))
        && starts_word(bytes, pos)
}

/// Whether a name at `pos` is not the tail of another name or a member.
fn starts_word(bytes: &[u8], pos: usize) -> bool {
    pos == 0 || {
        let prev = bytes[pos - 1];
        !is_ident_continue(prev) && prev != b'.'
    }
}

/// The dotted name starting at `start`, segments joined by `.` with no
/// surrounding whitespace.
fn read_path<'t>(bytes: &[u8], text: &'t str, start: usize) -> Candidate<'t> {
    let name_end = ident_end(bytes, start);
    let mut segments = SmallVec::new();
    let mut end = name_end;
    while bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(|&b| is_ident_start(b)) {
        let segment_end = ident_end(bytes, end + 1);
        segments.push(&text[end + 1..segment_end]);
        end = segment_end;
    }
    Candidate {
        type_name: &text[start..name_end],
        segments,
        end,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
