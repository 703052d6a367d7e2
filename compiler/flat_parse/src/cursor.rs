//! Token cursor for navigating the token stream.
//!
//! Two views over the same tokens: the *raw* view sees every token
//! (method bodies and residual text are copied from it), the *significant*
//! view skips whitespace, line breaks and comments.

use flat_lexer::{Token, TokenKind};

pub(crate) struct Cursor<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tokens: Vec<Token<'a>>) -> Self {
        Cursor { tokens, pos: 0 }
    }

    /// Next token without skipping trivia. `None` at end of input.
    pub(crate) fn next_raw(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).copied()?;
        self.pos += 1;
        Some(token)
    }

    /// Current raw token, not consumed.
    pub(crate) fn peek_raw(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    /// Next significant token, or a synthetic `Eof`.
    pub(crate) fn bump(&mut self) -> Token<'a> {
        while let Some(token) = self.next_raw() {
            if !token.kind.is_trivia() {
                return token;
            }
        }
        self.eof()
    }

    /// Next significant token without consuming it.
    pub(crate) fn peek(&self) -> Token<'a> {
        self.tokens[self.pos..]
            .iter()
            .find(|token| !token.kind.is_trivia())
            .copied()
            .unwrap_or_else(|| self.eof())
    }

    fn eof(&self) -> Token<'a> {
        let line = self.tokens.last().map_or(1, |last| {
            let breaks = last.text.matches('\n').count();
            last.line + u32::try_from(breaks).unwrap_or(0)
        });
        Token {
            kind: TokenKind::Eof,
            text: "",
            line,
        }
    }
}
