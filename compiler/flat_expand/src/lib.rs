//! Code generation for flatc: everything after analysis.
//!
//! ```text
//! ParsedFile ──► paste_up ──────────────► expand_macros ──► output text
//!                (generated code at        (accessor shorthand lowered
//!                 origins, SELF.x           to typed-array indexing,
//!                 expanded in bodies)       Atomics and runtime calls)
//! ```
//!
//! Both passes read the analyzed [`Session`] and never modify it. Pasting
//! up keeps a [`LineMap`] so macro diagnostics name source lines.

mod emit;
mod lines;
mod macros;
mod ops;
mod pasteup;
mod scan;
mod self_access;
mod target;

#[cfg(test)]
mod test_helpers;

use flat_diagnostic::{CompileResult, DiagnosticQueue};
use flat_parse::ParsedFile;
use flat_types::Session;

pub use lines::LineMap;
pub use macros::expand_macros;
pub use ops::Op;
pub use pasteup::{generate, paste_up, Pasted};
pub use self_access::expand_body;

/// Generated output for one parsed file. Warnings from the macro pass go
/// to `diagnostics`.
pub fn expand_file(
    session: &Session,
    parsed: &ParsedFile,
    diagnostics: &mut DiagnosticQueue,
) -> CompileResult<String> {
    let pasted = paste_up(session, parsed)?;
    let expanded = expand_macros(session, &parsed.file, &pasted, diagnostics)?;
    tracing::debug!(
        file = %parsed.file,
        bytes = expanded.len(),
        warnings = diagnostics.len(),
        "expanded file"
    );
    Ok(expanded)
}
