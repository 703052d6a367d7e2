//! Whole-pipeline benchmarks for flatc.
//!
//! Measures parse, analysis and expansion together over programs of
//! growing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flatc::{compile_sources, CompileOptions};

/// `n` classes in one inheritance chain, each with a struct field, an
/// atomic counter and an overriding virtual.
fn generate_chain(n: usize) -> String {
    let mut src = String::from("@flatjs struct Vec3 { x: float64; y: float64; z: float64; } @end\n");
    for i in 0..n {
        let extends = if i == 0 {
            String::new()
        } else {
            format!(" extends C{}", i - 1)
        };
        src.push_str(&format!(
            "\
@flatjs class C{i}{extends} {{
  pos{i}: Vec3;
  hits{i}: int32.atomic;
  @method bump{i}(SELF, k) {{ SELF.hits{i} += k; return SELF.pos{i}.x; }}
  @virtual area(SELF) {{ return SELF.hits{i}; }}
}} @end
function use{i}(p) {{ return C{i}.pos{i}.y(p) + C{i}.hits{i}.add(p, 1); }}
"
        ));
    }
    src
}

fn bench_pipeline(c: &mut Criterion) {
    let options = CompileOptions::default();
    let mut group = c.benchmark_group("pipeline/chain");
    for n in [1, 10, 50] {
        let sources = vec![("chain.flat_js".to_string(), generate_chain(n))];
        group.bench_with_input(BenchmarkId::from_parameter(n), &sources, |b, sources| {
            b.iter(|| black_box(compile_sources(sources, &options)));
        });
    }
    group.finish();
}

fn bench_plain_text(c: &mut Criterion) {
    let options = CompileOptions::default();
    let text = "function f(a, b) { return a / b; } // nothing to expand\n".repeat(1000);
    let sources = vec![("plain.flat_js".to_string(), text)];
    c.bench_function("pipeline/plain_text", |b| {
        b.iter(|| black_box(compile_sources(&sources, &options)));
    });
}

criterion_group!(benches, bench_pipeline, bench_plain_text);
criterion_main!(benches);
