//! The flatc driver: a whole batch of FlatJS sources in, one output per
//! input out.
//!
//! ```text
//! parse every file ──► one Session ──► analyze ──► expand every file
//! ```
//!
//! All files share a single [`Session`], so types declared in one file are
//! visible in every other. The first error aborts the batch and nothing is
//! written.

mod paths;

use std::fs;
use std::path::{Path, PathBuf};

use flat_diagnostic::{CompileError, CompileResult, Diagnostic, DiagnosticQueue, Severity};
use flat_types::Session;

pub use paths::output_path;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Driver settings.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// Prepend the `// Generated from ...` line to every output.
    pub emit_header: bool,
    /// Write outputs here instead of next to their inputs.
    pub out_dir: Option<PathBuf>,
    /// Fail the batch if the macro pass reports any warning.
    pub deny_warnings: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            emit_header: true,
            out_dir: None,
            deny_warnings: false,
        }
    }
}

/// One generated file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Output {
    /// The input, as named by the caller.
    pub source: String,
    pub path: PathBuf,
    pub text: String,
}

/// A successful batch.
#[derive(Clone, Debug, Default)]
pub struct Compilation {
    pub outputs: Vec<Output>,
    pub warnings: Vec<Diagnostic>,
}

/// The header line naming the input.
pub fn header(source: &str) -> String {
    format!("// Generated from {source} by flatc {VERSION}.\n")
}

/// Compile in-memory sources given as `(name, text)` pairs. Names must
/// carry a `.flat_<ext>` extension.
pub fn compile_sources(
    sources: &[(String, String)],
    options: &CompileOptions,
) -> CompileResult<Compilation> {
    let paths = sources
        .iter()
        .map(|(name, _)| output_path(Path::new(name), options.out_dir.as_deref()))
        .collect::<CompileResult<Vec<_>>>()?;

    let mut parsed = Vec::with_capacity(sources.len());
    for (name, text) in sources {
        parsed.push(flat_parse::parse_file(name, text)?);
    }

    let mut session = Session::new();
    for file in &parsed {
        for defn in &file.defs {
            session.register(defn.clone())?;
        }
    }
    session.analyze()?;
    tracing::debug!(
        files = parsed.len(),
        types = session.user_types().len(),
        "analyzed program"
    );

    let mut diagnostics = DiagnosticQueue::new();
    let mut outputs = Vec::with_capacity(parsed.len());
    for (file, path) in parsed.iter().zip(paths) {
        let expanded = flat_expand::expand_file(&session, file, &mut diagnostics)?;
        let text = if options.emit_header {
            header(&file.file) + &expanded
        } else {
            expanded
        };
        outputs.push(Output {
            source: file.file.clone(),
            path,
            text,
        });
    }

    let warnings = diagnostics.into_vec();
    if options.deny_warnings {
        if let Some(first) = warnings.first() {
            return Err(CompileError::Program(Diagnostic {
                severity: Severity::Error,
                note: Some(format!("{} warning(s) denied", warnings.len())),
                ..first.clone()
            }));
        }
    }
    Ok(Compilation { outputs, warnings })
}

/// Read and compile the named files.
pub fn compile_files(files: &[PathBuf], options: &CompileOptions) -> CompileResult<Compilation> {
    for file in files {
        output_path(file, options.out_dir.as_deref())?;
    }
    let sources = files
        .iter()
        .map(|file| {
            let text = fs::read_to_string(file).map_err(|source| CompileError::Io {
                path: file.clone(),
                source,
            })?;
            Ok((file.display().to_string(), text))
        })
        .collect::<CompileResult<Vec<_>>>()?;
    compile_sources(&sources, options)
}

/// Write every output, creating directories as needed.
pub fn write_outputs(outputs: &[Output]) -> CompileResult<()> {
    for output in outputs {
        let io_error = |source| CompileError::Io {
            path: output.path.clone(),
            source,
        };
        if let Some(dir) = output.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_error)?;
        }
        fs::write(&output.path, &output.text).map_err(io_error)?;
        tracing::debug!(path = %output.path.display(), bytes = output.text.len(), "wrote output");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
