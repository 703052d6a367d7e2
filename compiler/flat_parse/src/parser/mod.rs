//! Recursive-descent parser for definition blocks.
//!
//! ```text
//! block  := '@flatjs' ('struct' | 'class') Name ['extends' Base] '{' member* '}' '@end'
//! member := name ':' Type ['.' ('atomic' | 'synchronic')] ['.' 'Array'] ';'
//!         | ('@method' | '@virtual') name '(' 'SELF' (',' param)* ')' '{' body '}'
//!         | '@get' '(' 'SELF' ')' '{' body '}'
//!         | '@set' '(' 'SELF' ',' param ')' '{' body '}'
//! ```
//!
//! Outside blocks every token is copied to the residual unchanged.

use flat_diagnostic::{CompileError, CompileResult, ErrorCode};
use flat_lexer::{Token, TokenKind};
use flat_types::{Method, MethodKind, Prop, Qual, Signature, UserDefn};

use crate::cursor::Cursor;
use crate::{ParsedFile, Resume};

/// The parameter every method takes first.
pub const SELF: &str = "SELF";

pub(crate) struct Parser<'a> {
    file: &'a str,
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(file: &'a str, tokens: Vec<Token<'a>>) -> Self {
        Parser {
            file,
            cursor: Cursor::new(tokens),
        }
    }

    pub(crate) fn parse(mut self) -> CompileResult<ParsedFile> {
        let mut residual = String::new();
        let mut defs = Vec::new();
        let mut resumes = Vec::new();
        let mut after_block = false;
        while let Some(token) = self.cursor.next_raw() {
            if token.kind == TokenKind::DefnStart {
                let mut defn = self.definition(token.line)?;
                defn.origin = residual.len();
                defs.push(defn);
                after_block = true;
            } else {
                if after_block && token.kind != TokenKind::LineReset {
                    resumes.push(Resume {
                        offset: residual.len(),
                        line: token.line,
                    });
                    after_block = false;
                }
                residual.push_str(token.text);
            }
        }
        Ok(ParsedFile {
            file: self.file.to_string(),
            residual,
            resumes,
            defs,
        })
    }

    fn error(&self, code: ErrorCode, line: u32, message: impl Into<String>) -> CompileError {
        CompileError::program(code, self.file, line, message)
    }

    // ─── Blocks ─────────────────────────────────────────────────────

    /// Everything after `@flatjs` through `@end`.
    fn definition(&mut self, line: u32) -> CompileResult<UserDefn> {
        let keyword = self.cursor.bump();
        let is_class = match keyword.text {
            "struct" if keyword.kind == TokenKind::Ident => false,
            "class" if keyword.kind == TokenKind::Ident => true,
            _ => {
                return Err(self.error(
                    ErrorCode::E1001,
                    keyword.line,
                    format!("expected `struct` or `class` after `@flatjs`, found {keyword}"),
                ))
            }
        };
        let name = self.expect_ident("type name")?;

        let base = if self.cursor.peek().is_ident("extends") {
            let extends = self.cursor.bump();
            if !is_class {
                return Err(self.error(
                    ErrorCode::E1011,
                    extends.line,
                    format!("struct `{}` cannot extend another type", name.text),
                ));
            }
            Some(self.expect_ident("base class name")?.text.to_string())
        } else {
            None
        };

        let mut defn = if is_class {
            UserDefn::new_class(name.text, base, self.file, line)
        } else {
            UserDefn::new_struct(name.text, self.file, line)
        };

        self.expect(TokenKind::LBrace, "`{`")?;
        loop {
            let token = self.cursor.bump();
            match token.kind {
                TokenKind::RBrace => break,
                TokenKind::Ident => self.field(&mut defn, token)?,
                TokenKind::Other if token.text == "@" => self.member(&mut defn, token)?,
                TokenKind::Eof => {
                    return Err(self.error(
                        ErrorCode::E1006,
                        token.line,
                        format!("end of input inside definition of `{}`", defn.name),
                    ))
                }
                _ => {
                    return Err(self.error(
                        ErrorCode::E1011,
                        token.line,
                        format!("unexpected {token} in definition of `{}`", defn.name),
                    ))
                }
            }
        }

        let at = self.cursor.bump();
        if at.kind != TokenKind::Other || at.text != "@" || !self.annotation_is("end") {
            return Err(self.error(
                ErrorCode::E1011,
                at.line,
                format!("expected `@end` after definition of `{}`, found {at}", defn.name),
            ));
        }
        self.cursor.next_raw();
        Ok(defn)
    }

    /// `name : Type[.qual][.Array] ;`
    fn field(&mut self, defn: &mut UserDefn, name: Token<'a>) -> CompileResult<()> {
        let malformed = |parser: &Self, line: u32, what: &str| {
            parser.error(
                ErrorCode::E1005,
                line,
                format!("malformed declaration of field `{}`: {what}", name.text),
            )
        };

        if self.cursor.bump().kind != TokenKind::Colon {
            return Err(malformed(self, name.line, "expected `:`"));
        }
        let ty = self.cursor.bump();
        if ty.kind != TokenKind::Ident {
            return Err(malformed(self, ty.line, "expected a type name"));
        }

        let mut prop = Prop::new(name.text, ty.text, name.line);
        while self.cursor.peek().kind == TokenKind::Dot {
            self.cursor.bump();
            let suffix = self.cursor.bump();
            if suffix.kind != TokenKind::Ident {
                return Err(malformed(self, suffix.line, "expected a name after `.`"));
            }
            match Qual::from_keyword(suffix.text) {
                Some(qual) if prop.qual == Qual::None && !prop.is_array => {
                    prop = prop.with_qual(qual);
                }
                None if suffix.text == "Array" && !prop.is_array => prop = prop.array(),
                _ => {
                    return Err(malformed(
                        self,
                        suffix.line,
                        &format!("unexpected type suffix `.{}`", suffix.text),
                    ))
                }
            }
        }

        let end = self.cursor.bump();
        if end.kind != TokenKind::Semicolon {
            return Err(malformed(self, end.line, &format!("expected `;`, found {end}")));
        }
        self.check_unique(defn, &prop.name, prop.line)?;
        defn.props.push(prop);
        Ok(())
    }

    // ─── Methods ────────────────────────────────────────────────────

    /// An `@`-annotated member.
    fn member(&mut self, defn: &mut UserDefn, at: Token<'a>) -> CompileResult<()> {
        let Some(word) = self.cursor.peek_raw().filter(|t| t.kind == TokenKind::Ident) else {
            return Err(self.error(
                ErrorCode::E1011,
                at.line,
                format!("expected an annotation after `@` in definition of `{}`", defn.name),
            ));
        };
        self.cursor.next_raw();
        let is_class = defn.is_class();

        match word.text {
            "method" | "virtual" => {
                if !is_class {
                    let (code, message) = if word.text == "virtual" {
                        (
                            ErrorCode::E1002,
                            format!("virtual method in struct `{}`", defn.name),
                        )
                    } else {
                        (
                            ErrorCode::E1004,
                            format!(
                                "struct `{}` may only declare `@get` and `@set` methods",
                                defn.name
                            ),
                        )
                    };
                    return Err(self.error(code, word.line, message));
                }
                let name = self.expect_ident("method name")?;
                let signature = self.signature(name.text)?;
                let (body, line) = self.body(name.text)?;
                self.check_unique(defn, name.text, name.line)?;
                let kind = if word.text == "virtual" {
                    MethodKind::Virtual
                } else {
                    MethodKind::NonVirtual
                };
                defn.add_method(Method {
                    kind,
                    name: name.text.to_string(),
                    signature,
                    body,
                    line,
                });
            }
            "get" | "set" => {
                let (kind, arity) = if word.text == "get" {
                    (MethodKind::Get, 0)
                } else {
                    (MethodKind::Set, 1)
                };
                if is_class {
                    return Err(self.error(
                        ErrorCode::E1003,
                        word.line,
                        format!(
                            "`@{}` in class `{}`; only structs have getters and setters",
                            word.text, defn.name
                        ),
                    ));
                }
                if defn.methods.iter().any(|m| m.kind == kind) {
                    return Err(self.error(
                        ErrorCode::E1008,
                        word.line,
                        format!("duplicate `@{}` in struct `{}`", word.text, defn.name),
                    ));
                }
                let what = format!("@{}", word.text);
                let signature = self.signature(&what)?;
                if signature.len() != arity {
                    let expected = if arity == 0 { "(SELF)" } else { "(SELF, value)" };
                    return Err(self.error(
                        ErrorCode::E1009,
                        word.line,
                        format!("`{what}` must be declared as `{what}{expected}`"),
                    ));
                }
                let (body, line) = self.body(&what)?;
                defn.add_method(Method {
                    kind,
                    name: String::new(),
                    signature,
                    body,
                    line,
                });
            }
            other => {
                return Err(self.error(
                    ErrorCode::E1011,
                    word.line,
                    format!("unknown annotation `@{other}` in definition of `{}`", defn.name),
                ))
            }
        }
        Ok(())
    }

    /// `( SELF [, param]* )`, returning the parameters after `SELF`.
    fn signature(&mut self, method: &str) -> CompileResult<Signature> {
        let open = self.expect(TokenKind::LParen, "`(`")?;
        let malformed = |parser: &Self, line: u32, what: &str| {
            parser.error(
                ErrorCode::E1009,
                line,
                format!("malformed signature of `{method}`: {what}"),
            )
        };

        let first = self.cursor.bump();
        if !first.is_ident(SELF) {
            return Err(malformed(self, open.line, "first parameter must be `SELF`"));
        }
        let mut params = Signature::new();
        loop {
            let token = self.cursor.bump();
            match token.kind {
                TokenKind::RParen => return Ok(params),
                TokenKind::Comma => {
                    let param = self.cursor.bump();
                    if param.kind != TokenKind::Ident || param.text == SELF {
                        return Err(malformed(self, param.line, &format!("bad parameter {param}")));
                    }
                    params.push(param.text.to_string());
                }
                TokenKind::Eof => {
                    return Err(self.error(
                        ErrorCode::E1006,
                        token.line,
                        format!("end of input in parameter list of `{method}`"),
                    ))
                }
                _ => return Err(malformed(self, token.line, &format!("unexpected {token}"))),
            }
        }
    }

    /// `{ ... }` as raw text, with the line of the opening brace.
    fn body(&mut self, method: &str) -> CompileResult<(String, u32)> {
        let open = self.expect(TokenKind::LBrace, "`{`")?;
        let mut nesting: Vec<TokenKind> = Vec::new();
        let mut body = String::new();
        loop {
            let Some(token) = self.cursor.next_raw() else {
                return Err(self.error(
                    ErrorCode::E1006,
                    open.line,
                    format!("end of input inside body of `{method}`"),
                ));
            };
            if token.kind.is_open() {
                nesting.push(token.kind);
            } else if token.kind.is_close() {
                match nesting.pop() {
                    None if token.kind == TokenKind::RBrace => return Ok((body, open.line)),
                    Some(opener) if closes(opener, token.kind) => {}
                    _ => {
                        return Err(self.error(
                            ErrorCode::E1007,
                            token.line,
                            format!("unbalanced {token} in body of `{method}`"),
                        ))
                    }
                }
            }
            body.push_str(token.text);
        }
    }

    // ─── Helpers ────────────────────────────────────────────────────

    fn expect(&mut self, kind: TokenKind, what: &str) -> CompileResult<Token<'a>> {
        let token = self.cursor.bump();
        if token.kind == kind {
            return Ok(token);
        }
        let code = if token.kind == TokenKind::Eof {
            ErrorCode::E1006
        } else {
            ErrorCode::E1011
        };
        Err(self.error(code, token.line, format!("expected {what}, found {token}")))
    }

    fn expect_ident(&mut self, what: &str) -> CompileResult<Token<'a>> {
        let token = self.cursor.bump();
        if token.kind == TokenKind::Ident {
            return Ok(token);
        }
        Err(self.error(
            ErrorCode::E1011,
            token.line,
            format!("expected {what}, found {token}"),
        ))
    }

    /// Whether the raw token right after an `@` is `word`.
    fn annotation_is(&self, word: &str) -> bool {
        self.cursor.peek_raw().is_some_and(|t| t.is_ident(word))
    }

    fn check_unique(&self, defn: &UserDefn, name: &str, line: u32) -> CompileResult<()> {
        if defn.has_member(name) {
            return Err(self.error(
                ErrorCode::E1010,
                line,
                format!("duplicate member `{name}` in `{}`", defn.name),
            ));
        }
        Ok(())
    }
}

fn closes(open: TokenKind, close: TokenKind) -> bool {
    matches!(
        (open, close),
        (TokenKind::LParen, TokenKind::RParen)
            | (TokenKind::LBracket, TokenKind::RBracket)
            | (TokenKind::LBrace, TokenKind::RBrace)
    )
}
