//! Hand-written lexer producing one [`Token`] per call.
//!
//! Main dispatch is on the current byte. Each arm calls a focused method
//! that advances the cursor and returns the token kind; the token text is
//! the slice consumed. Tokens that span line breaks (template literals,
//! block comments, continued strings) are followed by a `LineReset` token.

use std::fmt;

use crate::cursor::{count_newlines, Cursor};
use crate::operators::{classify, operator_trie};
use crate::{Token, TokenKind};

/// What went wrong in a [`LexError`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum LexErrorKind {
    /// String literal reached end of input.
    UnterminatedString,
    /// String literal contains a raw line break.
    NewlineInString,
    /// Template literal reached end of input.
    UnterminatedTemplate,
    /// Block comment reached end of input.
    UnterminatedComment,
}

/// A fatal tokenization error.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct LexError {
    /// 1-based line where the offending token starts.
    pub line: u32,
    pub kind: LexErrorKind,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LexErrorKind::UnterminatedString => "unterminated string literal",
            LexErrorKind::NewlineInString => "line break inside string literal",
            LexErrorKind::UnterminatedTemplate => "unterminated template literal",
            LexErrorKind::UnterminatedComment => "unterminated block comment",
        })
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LexError {}

/// Lazy tokenizer over one source text.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    /// Line of the next token.
    line: u32,
    /// Set after a multi-line token; the next call reports it.
    pending_reset: Option<u32>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self::with_start_line(src, 1)
    }

    /// Lex `src` as if its first byte were on `line`.
    pub fn with_start_line(src: &'a str, line: u32) -> Self {
        Lexer {
            cursor: Cursor::new(src, 0),
            line,
            pending_reset: None,
        }
    }

    /// Produce the next token. Returns `Eof` repeatedly once exhausted.
    #[allow(
        clippy::should_implement_trait,
        reason = "fallible and not restartable; not an Iterator"
    )]
    pub fn next(&mut self) -> Result<Token<'a>, LexError> {
        if let Some(line) = self.pending_reset.take() {
            return Ok(Token {
                kind: TokenKind::LineReset,
                text: "",
                line,
            });
        }

        let start = self.cursor.pos();
        let line = self.line;
        let kind = match self.cursor.current() {
            0 if self.cursor.is_eof() => TokenKind::Eof,
            b' ' | b'\t' | 0x0B | 0x0C => self.whitespace(),
            b'\r' => self.carriage_return(),
            b'\n' => self.newline(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => self.identifier(),
            b'0'..=b'9' => self.number(),
            quote @ (b'"' | b'\'') => self.string(quote)?,
            b'`' => self.template_literal()?,
            b'/' => self.slash_or_comment()?,
            b'@' => self.at_marker(),
            b'(' => self.single(TokenKind::LParen),
            b')' => self.single(TokenKind::RParen),
            b'[' => self.single(TokenKind::LBracket),
            b']' => self.single(TokenKind::RBracket),
            b'{' => self.single(TokenKind::LBrace),
            b'}' => self.single(TokenKind::RBrace),
            b',' => self.single(TokenKind::Comma),
            b';' => self.single(TokenKind::Semicolon),
            b':' => self.single(TokenKind::Colon),
            b'+' | b'-' | b'*' | b'%' | b'=' | b'!' | b'<' | b'>' | b'&' | b'|' | b'^' | b'~'
            | b'?' | b'.' => self.operator(),
            0..=0x7F => self.single(TokenKind::Other),
            _ => {
                self.cursor.advance_char();
                TokenKind::Other
            }
        };

        let text = self.cursor.slice_from(start);
        if matches!(kind, TokenKind::Comment | TokenKind::Other) {
            self.note_line_breaks(text);
        }
        Ok(Token { kind, text, line })
    }

    /// Account for line breaks embedded in a just-lexed token.
    fn note_line_breaks(&mut self, text: &str) {
        let breaks = count_newlines(text);
        if breaks > 0 {
            self.line += breaks;
            self.pending_reset = Some(self.line);
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    // ─── Whitespace & Newlines ──────────────────────────────────────

    fn whitespace(&mut self) -> TokenKind {
        self.cursor
            .eat_while(|b| matches!(b, b' ' | b'\t' | 0x0B | 0x0C));
        TokenKind::Whitespace
    }

    fn carriage_return(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.current() == b'\n' {
            self.cursor.advance();
            self.line += 1;
            TokenKind::Linebreak
        } else {
            // Lone CR is horizontal whitespace.
            TokenKind::Whitespace
        }
    }

    fn newline(&mut self) -> TokenKind {
        self.cursor.advance();
        self.line += 1;
        TokenKind::Linebreak
    }

    // ─── Identifiers & Markers ──────────────────────────────────────

    fn identifier(&mut self) -> TokenKind {
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        TokenKind::Ident
    }

    /// `@flatjs` and `@new` are markers only as whole words; any other `@`
    /// is a lone `Other` token.
    fn at_marker(&mut self) -> TokenKind {
        let word = self.cursor.rest()[1..]
            .split(|c: char| !c.is_ascii() || !is_ident_continue(c as u8))
            .next()
            .unwrap_or("");
        let kind = match word {
            "flatjs" => TokenKind::DefnStart,
            "new" => TokenKind::NewInstance,
            _ => return self.single(TokenKind::Other),
        };
        self.cursor.advance_n(1 + word.len());
        kind
    }

    // ─── Numeric Literals ───────────────────────────────────────────

    fn number(&mut self) -> TokenKind {
        let first = self.cursor.current();
        self.cursor.advance();

        if first == b'0'
            && matches!(self.cursor.current(), b'x' | b'X')
            && self.cursor.peek().is_ascii_hexdigit()
        {
            self.cursor.advance();
            self.cursor.eat_while(|b| b.is_ascii_hexdigit());
            return TokenKind::Other;
        }

        self.cursor.eat_while(|b| b.is_ascii_digit());
        if self.cursor.current() == b'.' && self.cursor.peek().is_ascii_digit() {
            self.cursor.advance();
            self.cursor.eat_while(|b| b.is_ascii_digit());
        }
        self.eat_exponent();
        TokenKind::Other
    }

    fn eat_exponent(&mut self) {
        if !matches!(self.cursor.current(), b'e' | b'E') {
            return;
        }
        let signed = matches!(self.cursor.peek(), b'+' | b'-');
        let digit = if signed {
            self.cursor.peek2()
        } else {
            self.cursor.peek()
        };
        if digit.is_ascii_digit() {
            self.cursor.advance_n(if signed { 2 } else { 1 });
            self.cursor.eat_while(|b| b.is_ascii_digit());
        }
    }

    // ─── Strings & Templates ────────────────────────────────────────

    fn string(&mut self, quote: u8) -> Result<TokenKind, LexError> {
        self.cursor.advance();
        loop {
            match self.cursor.skip_to_string_delim(quote) {
                b if b == quote => {
                    self.cursor.advance();
                    return Ok(TokenKind::Other);
                }
                b'\\' => {
                    self.cursor.advance();
                    if self.cursor.is_eof() {
                        return Err(self.error(LexErrorKind::UnterminatedString));
                    }
                    // Escaped CRLF is a line continuation.
                    if self.cursor.current() == b'\r' && self.cursor.peek() == b'\n' {
                        self.cursor.advance();
                    }
                    self.cursor.advance_char();
                }
                b'\n' | b'\r' => return Err(self.error(LexErrorKind::NewlineInString)),
                _ => return Err(self.error(LexErrorKind::UnterminatedString)),
            }
        }
    }

    fn template_literal(&mut self) -> Result<TokenKind, LexError> {
        self.cursor.advance();
        loop {
            match self.cursor.skip_to_template_delim() {
                b'`' => {
                    self.cursor.advance();
                    return Ok(TokenKind::Other);
                }
                b'\\' => {
                    self.cursor.advance();
                    if self.cursor.is_eof() {
                        return Err(self.error(LexErrorKind::UnterminatedTemplate));
                    }
                    self.cursor.advance_char();
                }
                _ => return Err(self.error(LexErrorKind::UnterminatedTemplate)),
            }
        }
    }

    // ─── Comments & Operators ───────────────────────────────────────

    fn slash_or_comment(&mut self) -> Result<TokenKind, LexError> {
        match self.cursor.peek() {
            b'/' => {
                self.cursor.eat_until_newline_or_eof();
                Ok(TokenKind::Comment)
            }
            b'*' => {
                self.cursor.advance_n(2);
                if self.cursor.eat_block_comment_body() {
                    Ok(TokenKind::Comment)
                } else {
                    Err(self.error(LexErrorKind::UnterminatedComment))
                }
            }
            _ => Ok(self.operator()),
        }
    }

    fn operator(&mut self) -> TokenKind {
        let start = self.cursor.pos();
        let len = operator_trie().longest_match(self.cursor.rest().as_bytes());
        if len == 0 {
            return self.single(TokenKind::Other);
        }
        self.cursor.advance_n(len);
        classify(self.cursor.slice_from(start))
    }

    fn error(&self, kind: LexErrorKind) -> LexError {
        LexError {
            line: self.line,
            kind,
        }
    }
}

#[inline]
fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Lex all of `src`, excluding the trailing `Eof`.
pub fn tokenize(src: &str) -> Result<Vec<Token<'_>>, LexError> {
    let mut lexer = Lexer::new(src);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next()?;
        if token.kind == TokenKind::Eof {
            return Ok(tokens);
        }
        tokens.push(token);
    }
}
