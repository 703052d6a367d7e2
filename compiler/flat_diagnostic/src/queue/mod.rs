//! Collector for soft warnings.
//!
//! Errors never pass through here: they abort the run as a
//! [`CompileError`](crate::CompileError). The queue keeps warnings in
//! emission order and drops exact duplicates (same file, line and message),
//! which arise when a macro is expanded from several nested call sites.

use rustc_hash::FxHashSet;

use crate::Diagnostic;

#[derive(Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<(String, u32, String)>,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning. Returns `false` if it duplicated an earlier one.
    pub fn push(&mut self, diag: Diagnostic) -> bool {
        let key = (diag.file.clone(), diag.line, diag.message.clone());
        if !self.seen.insert(key) {
            return false;
        }
        tracing::warn!(code = %diag.code, file = %diag.file, line = diag.line, "{}", diag.message);
        self.diagnostics.push(diag);
        true
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Consume the queue, yielding warnings in emission order.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
