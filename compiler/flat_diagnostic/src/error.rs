//! The error type every stage returns.

use std::path::PathBuf;

use crate::{Diagnostic, ErrorCode};

/// A batch-aborting failure.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Bad command-line arguments; reported before any parsing.
    #[error("usage: {0}")]
    Usage(String),

    /// A syntactic or semantic violation in user source.
    #[error("{0}")]
    Program(Diagnostic),

    /// A broken compiler invariant. Never reachable from user input.
    #[error("internal compiler error[E9001]: {message}")]
    Internal { message: String },

    /// Reading an input or writing an output failed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type CompileResult<T> = Result<T, CompileError>;

impl CompileError {
    /// A program error at `file:line`.
    pub fn program(
        code: ErrorCode,
        file: impl Into<String>,
        line: u32,
        message: impl Into<String>,
    ) -> Self {
        CompileError::Program(Diagnostic::error(code).with_message(message).at(file, line))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CompileError::Internal {
            message: message.into(),
        }
    }

    /// The diagnostic behind a program error.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            CompileError::Program(diag) => Some(diag),
            _ => None,
        }
    }

    /// The error code of a program or internal error.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            CompileError::Program(diag) => Some(diag.code),
            CompileError::Internal { .. } => Some(ErrorCode::E9001),
            CompileError::Usage(_) | CompileError::Io { .. } => None,
        }
    }
}

impl From<Diagnostic> for CompileError {
    fn from(diag: Diagnostic) -> Self {
        CompileError::Program(diag)
    }
}
