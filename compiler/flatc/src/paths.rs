use std::path::{Path, PathBuf};

use flat_diagnostic::{CompileError, CompileResult};

const INPUT_PREFIX: &str = "flat_";

/// Where the output for `input` goes: `.flat_<ext>` becomes `.<ext>`, in
/// `out_dir` if given, otherwise next to the input.
pub fn output_path(input: &Path, out_dir: Option<&Path>) -> CompileResult<PathBuf> {
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.strip_prefix(INPUT_PREFIX))
        .filter(|ext| !ext.is_empty());
    let (Some(ext), Some(stem)) = (ext, input.file_stem()) else {
        return Err(CompileError::Usage(format!(
            "`{}` does not end in `.{INPUT_PREFIX}<ext>`",
            input.display()
        )));
    };
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(ext);
    Ok(match out_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    })
}
