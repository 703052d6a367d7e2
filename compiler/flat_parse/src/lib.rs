//! Definition parser for FlatJS sources.
//!
//! Splits a file into two streams: the *residual* text (everything outside
//! `@flatjs ... @end` blocks, byte for byte) and the parsed [`UserDefn`]s.
//! Each definition records its *origin*, the byte offset in the residual
//! where its generated code is spliced back in.
//!
//! Method bodies are captured as opaque text; only bracket balance is
//! checked here.

mod cursor;
mod parser;

use flat_diagnostic::{CompileError, CompileResult, ErrorCode};
use flat_lexer::{count_newlines, tokenize, LexError, LexErrorKind};
use flat_types::UserDefn;

pub use parser::SELF;

/// One source file after definition parsing.
#[derive(Clone, Debug)]
pub struct ParsedFile {
    pub file: String,
    /// Source text with every definition block removed.
    pub residual: String,
    /// Where copying picked up again after each run of blocks.
    pub resumes: Vec<Resume>,
    /// Definitions in source order.
    pub defs: Vec<UserDefn>,
}

/// Residual text from `offset` on starts at source line `line`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Resume {
    pub offset: usize,
    pub line: u32,
}

impl ParsedFile {
    /// Source line of the residual text at byte `offset`.
    pub fn residual_line(&self, offset: usize) -> u32 {
        let after = self.resumes.partition_point(|r| r.offset <= offset);
        let (start, line) = match after.checked_sub(1).and_then(|i| self.resumes.get(i)) {
            Some(resume) => (resume.offset, resume.line),
            None => (0, 1),
        };
        line + count_newlines(self.residual.get(start..offset).unwrap_or_default())
    }
}

/// Parse `src`, reported under the name `file`.
pub fn parse_file(file: &str, src: &str) -> CompileResult<ParsedFile> {
    let tokens = tokenize(src).map_err(|err| lex_error(file, err))?;
    let parsed = parser::Parser::new(file, tokens).parse()?;
    tracing::debug!(
        file,
        defs = parsed.defs.len(),
        residual_bytes = parsed.residual.len(),
        "parsed definitions"
    );
    Ok(parsed)
}

/// Convert a tokenizer failure into a program error.
pub fn lex_error(file: &str, err: LexError) -> CompileError {
    let code = match err.kind {
        LexErrorKind::UnterminatedString => ErrorCode::E0001,
        LexErrorKind::NewlineInString => ErrorCode::E0002,
        LexErrorKind::UnterminatedTemplate => ErrorCode::E0003,
        LexErrorKind::UnterminatedComment => ErrorCode::E0004,
    };
    CompileError::program(code, file, err.line, err.kind.to_string())
}
