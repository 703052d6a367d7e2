//! Expansion of `SELF.path` shorthand inside method bodies.
//!
//! Rewrites, with `T` the type whose method is being expanded:
//!
//! ```text
//! SELF.x                  T.x(SELF)
//! SELF.x = v              T.x.set(SELF, v)          (also += -= &= |= ^=)
//! SELF.pos.y.add(1)       T.pos.y.add(SELF, 1)
//! SELF.area(k)            T.area(SELF, k)           virtual: T's dispatcher
//! SELF.init(k)            Base.init(SELF, k)        non-virtual: declaring class
//! SELF.get()              T.get(SELF)               struct bodies only
//! ```
//!
//! Bodies are re-lexed, so strings and comments are never touched.
//! Arguments and right-hand sides are expanded recursively.

use flat_diagnostic::{CompileError, CompileResult, ErrorCode};
use flat_lexer::{Lexer, Token, TokenKind};
use flat_parse::SELF;
use flat_types::{Method, MethodKind, Session, UserDefn};

use crate::ops::Op;
use crate::target::{longest_field, resolve_in_type};

/// Expand every `SELF` reference in `method`'s body.
pub fn expand_body(session: &Session, defn: &UserDefn, method: &Method) -> CompileResult<String> {
    let tokens = lex_body(defn, method)?;
    let expander = SelfExpander { session, defn };
    let body = expander.expand(&tokens)?;
    tracing::trace!(
        type_name = %defn.name,
        method = %method.name,
        line = method.line,
        "expanded method body"
    );
    Ok(body)
}

fn lex_body<'b>(defn: &UserDefn, method: &'b Method) -> CompileResult<Vec<Token<'b>>> {
    let mut lexer = Lexer::with_start_line(&method.body, method.line);
    let mut tokens = Vec::new();
    loop {
        let token = lexer
            .next()
            .map_err(|err| flat_parse::lex_error(&defn.file, err))?;
        if token.kind == TokenKind::Eof {
            return Ok(tokens);
        }
        tokens.push(token);
    }
}

struct SelfExpander<'s> {
    session: &'s Session,
    defn: &'s UserDefn,
}

/// A `SELF.a.b` reference after its path has been read.
struct Reference<'t> {
    segments: Vec<&'t str>,
    line: u32,
    /// Index of the first token after the path.
    end: usize,
}

impl SelfExpander<'_> {
    fn expand(&self, tokens: &[Token<'_>]) -> CompileResult<String> {
        let mut out = String::new();
        let mut i = 0;
        while i < tokens.len() {
            if let Some(reference) = self_reference(tokens, i) {
                i = self.rewrite(tokens, reference, &mut out)?;
            } else {
                out.push_str(tokens[i].text);
                i += 1;
            }
        }
        Ok(out)
    }

    fn error(&self, code: ErrorCode, line: u32, message: String) -> CompileError {
        CompileError::program(code, self.defn.file.as_str(), line, message)
    }

    /// Write the expansion of `reference` and return the index of the first
    /// token not consumed.
    fn rewrite(
        &self,
        tokens: &[Token<'_>],
        reference: Reference<'_>,
        out: &mut String,
    ) -> CompileResult<usize> {
        let type_name = &self.defn.name;
        let written = format!("{SELF}.{}", reference.segments.join("."));
        let next = skip_trivia(tokens, reference.end);

        if let Some(access) = resolve_in_type(self.session, self.defn, &reference.segments) {
            let prefix = format!("{type_name}.{}", reference.segments.join("."));
            let check = |op: Op| -> CompileResult<()> {
                if access.target.supports(op) {
                    Ok(())
                } else {
                    Err(self.error(
                        ErrorCode::E3002,
                        reference.line,
                        format!(
                            "operation `{op}` in `{written}` does not apply to {}",
                            access.target.describe()
                        ),
                    ))
                }
            };

            // Assignment shorthand.
            if let Some(assign) = tokens.get(next).filter(|t| t.kind == TokenKind::Assign) {
                if access.explicit {
                    return Err(self.error(
                        ErrorCode::E3004,
                        assign.line,
                        format!("cannot assign to the operation `{written}`"),
                    ));
                }
                let Some(op) = Op::from_assignment(assign.text) else {
                    return Err(self.error(
                        ErrorCode::E3004,
                        assign.line,
                        format!("unsupported assignment `{}` to `{written}`", assign.text),
                    ));
                };
                check(op)?;
                let end = rhs_end(tokens, next + 1);
                let rhs = self.expand(&tokens[next + 1..end])?;
                let value = rhs.trim();
                if value.is_empty() {
                    return Err(self.error(
                        ErrorCode::E3003,
                        assign.line,
                        format!("missing value after `{written} {}`", assign.text),
                    ));
                }
                let trailing = &rhs[rhs.trim_end().len()..];
                out.push_str(&format!("{prefix}.{op}({SELF}, {value}){trailing}"));
                return Ok(end);
            }

            if !access.explicit {
                check(Op::Get)?;
                out.push_str(&format!("{prefix}({SELF})"));
                return Ok(reference.end);
            }

            // Explicit operation: `SELF.x.add(1)`.
            check(access.op)?;
            let Some((close, args, count)) = self.call_args(tokens, next)? else {
                return Err(self.error(
                    ErrorCode::E3003,
                    reference.line,
                    format!("operation `{written}` must be called"),
                ));
            };
            if count + 1 != access.op.arity() {
                return Err(self.error(
                    ErrorCode::E3003,
                    reference.line,
                    format!(
                        "`{written}` takes {} argument(s), found {count}",
                        access.op.arity() - 1
                    ),
                ));
            }
            out.push_str(&call(&prefix, &args));
            return Ok(close + 1);
        }

        if let [name] = reference.segments.as_slice() {
            if let Some((owner, method)) = self.find_method(name)? {
                let Some((close, args, _)) = self.call_args(tokens, next)? else {
                    return Err(self.error(
                        ErrorCode::E3001,
                        reference.line,
                        format!("method `{written}` must be called"),
                    ));
                };
                let target = match method.kind {
                    MethodKind::Virtual => type_name.as_str(),
                    _ => owner.name.as_str(),
                };
                out.push_str(&call(&format!("{target}.{name}"), &args));
                return Ok(close + 1);
            }
        }

        let what = match longest_field(self.defn, &reference.segments) {
            Some((len, _)) => format!(
                "`{}` is not an operation on `{SELF}.{}`",
                reference.segments[len..].join("."),
                reference.segments[..len].join(".")
            ),
            None => format!("unknown member `{written}` of `{type_name}`"),
        };
        Err(self.error(ErrorCode::E3001, reference.line, what))
    }

    /// The type declaring the named method `name`, searching up from the
    /// current type.
    fn find_method(&self, name: &str) -> CompileResult<Option<(&UserDefn, &Method)>> {
        let mut current = Some(self.defn);
        while let Some(defn) = current {
            if let Some(method) = defn.method(name) {
                return Ok(Some((defn, method)));
            }
            current = match defn.base() {
                Some(base) => Some(self.session.user(base)?),
                None => None,
            };
        }
        Ok(None)
    }

    /// If `tokens[open]` opens a call: the index of its `)`, the expanded
    /// argument text and the argument count.
    fn call_args(
        &self,
        tokens: &[Token<'_>],
        open: usize,
    ) -> CompileResult<Option<(usize, String, usize)>> {
        if tokens.get(open).map(|t| t.kind) != Some(TokenKind::LParen) {
            return Ok(None);
        }
        let Some(close) = matching_close(tokens, open) else {
            return Err(CompileError::internal("unbalanced method body after parsing"));
        };
        let inner = &tokens[open + 1..close];
        let count = count_args(inner);
        Ok(Some((close, self.expand(inner)?, count)))
    }
}

/// `callee(SELF, args)`.
fn call(callee: &str, args: &str) -> String {
    let args = args.trim_start();
    if args.trim_end().is_empty() {
        format!("{callee}({SELF})")
    } else {
        format!("{callee}({SELF}, {args})")
    }
}

/// A `SELF.ident(.ident)*` reference starting at `i`, unless `SELF` is
/// itself a member (`x.SELF`).
fn self_reference<'t>(tokens: &[Token<'t>], i: usize) -> Option<Reference<'t>> {
    if !tokens[i].is_ident(SELF) {
        return None;
    }
    let after_dot = tokens[..i]
        .iter()
        .rev()
        .find(|t| !t.kind.is_trivia())
        .is_some_and(|t| t.kind == TokenKind::Dot);
    if after_dot {
        return None;
    }
    let mut segments = Vec::new();
    let mut end = i + 1;
    while let (Some(dot), Some(name)) = (tokens.get(end), tokens.get(end + 1)) {
        if dot.kind != TokenKind::Dot || name.kind != TokenKind::Ident {
            break;
        }
        segments.push(name.text);
        end += 2;
    }
    if segments.is_empty() {
        return None;
    }
    Some(Reference {
        segments,
        line: tokens[i].line,
        end,
    })
}

fn skip_trivia(tokens: &[Token<'_>], mut i: usize) -> usize {
    while tokens.get(i).is_some_and(|t| t.kind.is_trivia()) {
        i += 1;
    }
    i
}

/// End of an assignment's right-hand side: the first `;` or `,` at depth
/// zero, or a closer with no opener.
fn rhs_end(tokens: &[Token<'_>], start: usize) -> usize {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(start) {
        match token.kind {
            k if k.is_open() => depth += 1,
            k if k.is_close() => {
                if depth == 0 {
                    return i;
                }
                depth -= 1;
            }
            TokenKind::Semicolon | TokenKind::Comma if depth == 0 => return i,
            _ => {}
        }
    }
    tokens.len()
}

fn matching_close(tokens: &[Token<'_>], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if token.kind.is_open() {
            depth += 1;
        } else if token.kind.is_close() {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Arguments in a call's inner tokens: top-level commas plus one, or zero
/// when only trivia.
fn count_args(inner: &[Token<'_>]) -> usize {
    if inner.iter().all(|t| t.kind.is_trivia()) {
        return 0;
    }
    let mut depth = 0usize;
    let mut count = 1;
    for token in inner {
        match token.kind {
            k if k.is_open() => depth += 1,
            k if k.is_close() => depth = depth.saturating_sub(1),
            TokenKind::Comma if depth == 0 => count += 1,
            _ => {}
        }
    }
    count
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
