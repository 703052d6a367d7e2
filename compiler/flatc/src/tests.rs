use flat_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

use super::*;

fn sources(files: &[(&str, &str)]) -> Vec<(String, String)> {
    files
        .iter()
        .map(|(name, text)| ((*name).to_string(), (*text).to_string()))
        .collect()
}

fn bare() -> CompileOptions {
    CompileOptions {
        emit_header: false,
        ..CompileOptions::default()
    }
}

#[test]
fn types_are_shared_across_files() {
    let batch = sources(&[
        ("geom.flat_js", "@flatjs struct Vec3 { x: float64; y: float64; z: float64; } @end\n"),
        ("use.flat_js", "var y = Vec3.y(p);\n"),
    ]);
    let compiled = compile_sources(&batch, &bare()).unwrap();
    assert_eq!(compiled.outputs.len(), 2);
    assert_eq!(compiled.outputs[1].text, "var y = _mem_float64[(p + 8) >> 3];\n");
    assert_eq!(compiled.outputs[1].path, PathBuf::from("use.js"));
    assert!(compiled.outputs[0].text.starts_with("function Vec3() {}\n"));
}

#[test]
fn header_names_the_input() {
    let batch = sources(&[("a.flat_js", "x();\n")]);
    let compiled = compile_sources(&batch, &CompileOptions::default()).unwrap();
    assert_eq!(
        compiled.outputs[0].text,
        format!("// Generated from a.flat_js by flatc {VERSION}.\nx();\n")
    );
}

#[test]
fn text_without_definitions_is_unchanged() {
    let text = "function f(a, b) {\n  return a / b; // done\n}\n";
    let compiled = compile_sources(&sources(&[("f.flat_js", text)]), &bare()).unwrap();
    assert_eq!(compiled.outputs[0].text, text);
}

#[test]
fn first_error_aborts_the_batch() {
    let batch = sources(&[
        ("a.flat_js", "@flatjs struct A { b: B; } @end\n"),
        ("b.flat_js", "@flatjs struct B { a: A; } @end\n"),
    ]);
    let err = compile_sources(&batch, &bare()).unwrap_err();
    assert!(matches!(err, CompileError::Program(_)));
}

#[test]
fn bad_names_are_usage_errors() {
    let batch = sources(&[("a.js", "x();\n")]);
    assert!(matches!(
        compile_sources(&batch, &bare()),
        Err(CompileError::Usage(_))
    ));
}

#[test]
fn warnings_are_collected() {
    let batch = sources(&[(
        "w.flat_js",
        "@flatjs struct P { x: int32; } @end\nP.x.set(p);\n",
    )]);
    let compiled = compile_sources(&batch, &bare()).unwrap();
    assert_eq!(compiled.warnings.len(), 1);
    assert_eq!(compiled.warnings[0].code, ErrorCode::W3001);
    assert_eq!(compiled.warnings[0].file, "w.flat_js");
}

#[test]
fn denied_warnings_fail() {
    let batch = sources(&[(
        "w.flat_js",
        "@flatjs struct P { x: int32; } @end\nP.x.set(p);\n",
    )]);
    let options = CompileOptions {
        deny_warnings: true,
        ..bare()
    };
    let err = compile_sources(&batch, &options).unwrap_err();
    let diag = err.diagnostic().unwrap();
    assert_eq!(diag.code, ErrorCode::W3001);
    assert!(diag.is_error());
}

#[test]
fn macro_errors_name_source_lines() {
    let batch = sources(&[(
        "p.flat_js",
        "@flatjs struct P {\n  x: int32;\n  y: int32;\n} @end\n\nvar q = @new Nope;\n",
    )]);
    let err = compile_sources(&batch, &bare()).unwrap_err();
    assert!(err.to_string().starts_with("p.flat_js:6: "), "{err}");
    assert_eq!(err.code(), Some(ErrorCode::E3005));
}

#[test]
fn fields_cannot_hide_inherited_virtuals() {
    let batch = sources(&[(
        "v.flat_js",
        "\
@flatjs class A {
  @virtual m(SELF) { return 1; }
} @end
@flatjs class B extends A {
  m: int32;
} @end
var z = B.m(p);
",
    )]);
    let err = compile_sources(&batch, &bare()).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::E2010));
    assert_eq!(err.diagnostic().unwrap().line, 5);
}
