//! Tokenizer for FlatJS annotated sources.
//!
//! The lexer is lossless: concatenating the text of every token it produces
//! reproduces the input exactly. It understands just enough of the host
//! language to track nesting, strings, comments and identifiers; everything
//! else falls through to [`TokenKind::Other`].
//!
//! # Limitations
//!
//! Regular-expression literals are not detected. A `/` always starts a
//! comment or an operator, so a regex containing a quote or `//` confuses
//! the scanner. Downstream passes tolerate this.
//!
//! # Usage
//!
//! ```text
//! let mut lexer = Lexer::new(source);
//! loop {
//!     let token = lexer.next()?;
//!     if token.kind == TokenKind::Eof { break; }
//! }
//! ```

mod cursor;
mod lexer;
mod operators;
mod token;

pub use cursor::count_newlines;
pub use lexer::{tokenize, LexError, LexErrorKind, Lexer};
pub use token::{Token, TokenKind};
