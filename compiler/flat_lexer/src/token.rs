use std::fmt;

/// Classification of a lexed token.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    /// `[A-Za-z_$][A-Za-z0-9_$]*`
    Ident,
    /// `.`
    Dot,
    /// `...`
    Ellipsis,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `=` and every compound assignment operator (`+=`, `>>>=`, ...).
    Assign,
    /// Catch-all: remaining operators, string/number literals, unknown chars.
    Other,
    /// Run of horizontal whitespace.
    Whitespace,
    /// `\n` or `\r\n`.
    Linebreak,
    /// Line or block comment, including delimiters.
    Comment,
    /// Zero-width marker emitted after a token that spans several lines.
    /// The token's `line` is the line the scanner continues on.
    LineReset,
    /// `@flatjs`, opening a definition block.
    DefnStart,
    /// `@new`, the allocation construct.
    NewInstance,
    /// End of input. Repeats on further calls.
    Eof,
}

impl TokenKind {
    /// Tokens with no effect on program structure.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Linebreak | TokenKind::Comment | TokenKind::LineReset
        )
    }

    pub fn is_open(self) -> bool {
        matches!(self, TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace)
    }

    pub fn is_close(self) -> bool {
        matches!(self, TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace)
    }
}

/// A token borrowed from the source text.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Exact source text. Empty for `LineReset` and `Eof`.
    pub text: &'a str,
    /// 1-based line on which the token starts.
    pub line: u32,
}

impl Token<'_> {
    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == name
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("end of input"),
            TokenKind::Linebreak => f.write_str("line break"),
            TokenKind::LineReset => f.write_str("line marker"),
            _ => write!(f, "`{}`", self.text),
        }
    }
}
