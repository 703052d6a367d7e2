//! flatc command line.

use std::path::PathBuf;
use std::process::ExitCode;

use flat_diagnostic::CompileError;
use flatc::{compile_files, write_outputs, CompileOptions, VERSION};

const USAGE: &str = "\
Usage: flatc [options] <file.flat_ext>...

Compiles each input to a file without the `flat_` marker in its extension
(scene.flat_js -> scene.js).

Options:
  --out-dir=<dir>     Write outputs to <dir> instead of next to the inputs
  --no-header         Do not prepend the `// Generated from` line
  --deny-warnings     Treat macro warnings as errors
  -v, --verbose       Log pipeline progress to stderr (RUST_LOG overrides)
  -h, --help          Print this message
  -V, --version       Print the version";

enum Command {
    Help,
    Version,
    Compile {
        options: CompileOptions,
        files: Vec<PathBuf>,
        verbose: bool,
    },
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut options = CompileOptions::default();
    let mut files = Vec::new();
    let mut verbose = false;
    for arg in args {
        if let Some(dir) = arg.strip_prefix("--out-dir=") {
            if dir.is_empty() {
                return Err("`--out-dir` needs a directory".to_string());
            }
            options.out_dir = Some(PathBuf::from(dir));
        } else if arg == "--no-header" {
            options.emit_header = false;
        } else if arg == "--deny-warnings" {
            options.deny_warnings = true;
        } else if arg == "-v" || arg == "--verbose" {
            verbose = true;
        } else if arg == "-h" || arg == "--help" {
            return Ok(Command::Help);
        } else if arg == "-V" || arg == "--version" {
            return Ok(Command::Version);
        } else if arg.starts_with('-') {
            return Err(format!("unknown option `{arg}`"));
        } else {
            files.push(PathBuf::from(arg));
        }
    }
    if files.is_empty() {
        return Err("no input files".to_string());
    }
    Ok(Command::Compile {
        options,
        files,
        verbose,
    })
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "error" }));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (options, files, verbose) = match parse_args(&args) {
        Ok(Command::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Ok(Command::Version) => {
            println!("flatc {VERSION}");
            return ExitCode::SUCCESS;
        }
        Ok(Command::Compile {
            options,
            files,
            verbose,
        }) => (options, files, verbose),
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!();
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };
    init_tracing(verbose);

    let result = compile_files(&files, &options).and_then(|compiled| {
        for warning in &compiled.warnings {
            eprintln!("{warning}");
        }
        write_outputs(&compiled.outputs)
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ CompileError::Usage(_)) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
        Err(CompileError::Program(diag)) => {
            eprintln!("{diag}");
            ExitCode::FAILURE
        }
        Err(err) if err.code().is_some_and(|code| code.is_internal_error()) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
