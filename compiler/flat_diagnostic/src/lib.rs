//! Diagnostic system for flatc.
//!
//! The compiler is fail-fast: the first program error aborts the batch and
//! travels up as a [`CompileError`]. Soft warnings from the tolerant macro
//! pass are collected in a [`DiagnosticQueue`] and printed without aborting.
//!
//! - Error codes for searchability ([`ErrorCode`])
//! - File and 1-based line on every program error
//! - A distinct internal-error path for broken compiler invariants

mod diagnostic;
mod error;
mod error_code;
pub mod queue;

pub use diagnostic::{Diagnostic, Severity};
pub use error::{CompileError, CompileResult};
pub use error_code::ErrorCode;
pub use queue::DiagnosticQueue;
