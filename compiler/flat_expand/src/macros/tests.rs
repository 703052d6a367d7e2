use flat_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::pasteup::{paste_up, Pasted};
use crate::test_helpers::{analyzed, session, FILE, SHAPES};

fn run_pasted(session: &Session, pasted: &Pasted) -> (String, Vec<Diagnostic>) {
    let mut queue = DiagnosticQueue::new();
    let out = expand_macros(session, FILE, pasted, &mut queue).unwrap();
    (out, queue.into_vec())
}

fn run(session: &Session, text: &str) -> (String, Vec<Diagnostic>) {
    run_pasted(session, &Pasted::plain(text))
}

fn expand(text: &str) -> String {
    let (out, warnings) = run(&session(SHAPES), text);
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    out
}

/// Expand text expected to be left alone with exactly one warning.
fn warning(text: &str) -> Diagnostic {
    let (out, mut warnings) = run(&session(SHAPES), text);
    assert_eq!(out, text);
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    warnings.remove(0)
}

fn error(text: &str) -> (ErrorCode, u32) {
    let mut queue = DiagnosticQueue::new();
    let err = expand_macros(&session(SHAPES), FILE, &Pasted::plain(text), &mut queue).unwrap_err();
    (err.code().unwrap(), err.diagnostic().unwrap().line)
}

// ─── Field accesses ─────────────────────────────────────────────────

#[test]
fn vanilla_fields() {
    assert_eq!(expand("Node.weight(p)"), "_mem_float32[(p + 20) >> 2]");
    assert_eq!(
        expand("Node.weight.set(p, 1.5);"),
        "(_mem_float32[(p + 20) >> 2] = 1.5);"
    );
    assert_eq!(expand("Vec3.x(SELF)"), "_mem_float64[SELF >> 3]");
    assert_eq!(expand("Node.pos.y(p)"), "_mem_float64[(p + 32) >> 3]");
    assert_eq!(expand("Node.next(p)"), "_mem_int32[(p + 48) >> 2]");
}

#[test]
fn atomic_and_synchronic_fields() {
    assert_eq!(
        expand("Node.hits.add(p, 1)"),
        "Atomics.add(_mem_int32, (p + 4) >> 2, 1)"
    );
    assert_eq!(
        expand("Node.flag.notify(p)"),
        "FlatJS.syncNotify(_mem_int32, (p + 8))"
    );
    assert_eq!(expand("Node.hits.ref(p)"), "(p + 4)");
}

#[test]
fn struct_values() {
    assert_eq!(expand("Node.pos(p)"), "Vec3._get_impl(p + 24)");
    assert_eq!(expand("Vec3.get(v)"), "Vec3._get_impl(v)");
    assert_eq!(expand("Vec3.set(v, w)"), "Vec3._set_impl(v, w)");
}

#[test]
fn array_elements() {
    assert_eq!(expand("float64.Array(a, i)"), "_mem_float64[(a + 8 * i) >> 3]");
    assert_eq!(
        expand("int32.Array.add(a, i + 1, 2)"),
        "(_mem_int32[(a + 4 * (i + 1)) >> 2] += 2)"
    );
    assert_eq!(
        expand("int32.atomic.Array.compareExchange(a, i, 0, 1)"),
        "Atomics.compareExchange(_mem_int32, (a + 4 * i) >> 2, 0, 1)"
    );
    assert_eq!(expand("Vec3.Array.z(a, i)"), "_mem_float64[(a + 24 * i + 16) >> 3]");
    assert_eq!(expand("Vec3.Array(a, i)"), "Vec3._get_impl(a + 24 * i)");
    assert_eq!(expand("Node.Array(a, i)"), "_mem_int32[(a + 4 * i) >> 2]");
}

#[test]
fn arguments_are_expanded_first() {
    assert_eq!(
        expand("Node.weight.set(p, Node.weight(Node.next(p)))"),
        "(_mem_float32[(p + 20) >> 2] = _mem_float32[((_mem_int32[(p + 48) >> 2]) + 20) >> 2])"
    );
}

// ─── Allocation ─────────────────────────────────────────────────────

#[test]
fn allocations() {
    assert_eq!(expand("var v = @new Vec3;"), "var v = FlatJS.allocOrThrow(24, 8);");
    assert_eq!(
        expand("var n = @new Node;"),
        "var n = Node.initInstance(FlatJS.allocOrThrow(80, 16));"
    );
    assert_eq!(
        expand("@new float64.Array(n + 1)"),
        "FlatJS.allocOrThrow(8 * (n + 1), 8)"
    );
    assert_eq!(expand("@new Vec3.Array(10)"), "FlatJS.allocOrThrow(24 * 10, 8)");
    assert_eq!(expand("@new Node.Array(4)"), "FlatJS.allocOrThrow(4 * 4, 4)");
}

#[test]
fn allocation_errors() {
    assert_eq!(error("a;\nb = @new Missing;"), (ErrorCode::E3005, 2));
    assert_eq!(error("@new Vec3.Array()").0, ErrorCode::E3006);
    assert_eq!(error("@new Vec3.Array(1, 2)").0, ErrorCode::E3006);
    assert_eq!(error("@new Vec3.Array").0, ErrorCode::E3006);
    assert_eq!(error("@new int32.atomic.Array(4)").0, ErrorCode::E3007);
    assert_eq!(error("@new int32").0, ErrorCode::E3008);
    assert_eq!(error("@new Vec3.x").0, ErrorCode::E3008);
    assert_eq!(error("@new 5").0, ErrorCode::E3008);
}

// ─── Left alone ─────────────────────────────────────────────────────

#[test]
fn non_macros_pass_through() {
    let text = "\
Node.touch(p); Node.area(p); Vec3._get_impl(p);
x.Vec3.x(p); Vec3(p); Unknown.x(p); int32.foo(p); Vec3.x;
var s = \"Vec3.x(p)\"; // Vec3.x(p)
/* @new Missing */ `Node.weight(p)` @newer
";
    assert_eq!(expand(text), text);
}

#[test]
fn second_run_changes_nothing() {
    let (session, parsed) = analyzed(SHAPES);
    let pasted = paste_up(&session, &parsed).unwrap();
    let (once, warnings) = run_pasted(&session, &pasted);
    assert!(warnings.is_empty(), "{warnings:?}");
    let (twice, _) = run(&session, &once);
    assert_eq!(twice, once);
}

proptest! {
    #[test]
    fn expansion_is_idempotent(
        picks in prop::collection::vec(0usize..8, 1..6),
        name in "[a-z]{1,3}",
    ) {
        const FORMS: [&str; 8] = [
            "Node.weight(#)",
            "Node.hits.add(#, 1)",
            "Vec3.Array.y(#, #)",
            "Node.pos.set(#, Vec3.get(#))",
            "int32.Array.sub(#, # + 1, 2)",
            "@new Node",
            "Node.flag.loadWhenEqual(#, 0)",
            "f(#).weight",
        ];
        let text = picks
            .iter()
            .map(|&i| FORMS[i].replace('#', &name))
            .collect::<Vec<_>>()
            .join(";\n");
        let session = session(SHAPES);
        let (once, _) = run(&session, &text);
        let (twice, _) = run(&session, &once);
        prop_assert_eq!(twice, once);
    }
}

// ─── Warnings ───────────────────────────────────────────────────────

#[test]
fn arity_mismatch_is_left_unchanged() {
    let diag = warning("\n\nVec3.x.set(p)");
    assert_eq!(diag.code, ErrorCode::W3001);
    assert_eq!(diag.line, 3);
    assert_eq!(diag.message, "`Vec3.x.set` takes 2 argument(s), found 1");
    assert_eq!(warning("float64.Array(a)").code, ErrorCode::W3001);
}

#[test]
fn inapplicable_operations_are_left_unchanged() {
    let diag = warning("Node.weight.compareExchange(p, 1, 2)");
    assert_eq!(diag.code, ErrorCode::W3002);
    assert_eq!(
        diag.message,
        "operation `compareExchange` in `Node.weight.compareExchange` does not apply to `float32`"
    );
    assert_eq!(warning("Vec3.Array.w(a, i)").code, ErrorCode::W3002);
    assert_eq!(warning("float64.atomic.Array(a, i)").code, ErrorCode::W3002);
}

#[test]
fn blank_arguments_do_not_count() {
    let diag = warning("Vec3.x.set(p, )");
    assert_eq!(diag.code, ErrorCode::W3001);
    assert_eq!(diag.message, "`Vec3.x.set` takes 2 argument(s), found 1");
    assert_eq!(warning("Vec3.Array.x(a,  )").code, ErrorCode::W3001);
    assert_eq!(warning("Node.hits.add(, 1)").code, ErrorCode::W3001);
}

#[test]
fn unterminated_calls_are_left_unchanged() {
    assert_eq!(warning("Vec3.x(p").code, ErrorCode::W3003);
}

#[test]
fn warnings_in_arguments_carry_their_own_line() {
    let (out, warnings) = run(&session(SHAPES), "Node.weight.set(p,\n  Vec3.x.set(q))");
    assert_eq!(out, "(_mem_float32[(p + 20) >> 2] = Vec3.x.set(q))");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].line, 2);
}

#[test]
fn errors_below_definitions_name_the_source_line() {
    let (session, parsed) = analyzed(
        "\
@flatjs struct P {
  x: int32;
  y: int32;
} @end

var q = @new Nope;
",
    );
    let pasted = paste_up(&session, &parsed).unwrap();
    let mut queue = DiagnosticQueue::new();
    let err = expand_macros(&session, FILE, &pasted, &mut queue).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::E3005));
    assert_eq!(err.diagnostic().unwrap().line, 6);
}

#[test]
fn warnings_around_definitions_name_source_lines() {
    let (session, parsed) = analyzed(
        "\
P.x.set(a);
@flatjs struct P {
  x: int32;
  @get(SELF) { return P.x.set(SELF); }
} @end

P.x.set(b);
",
    );
    let pasted = paste_up(&session, &parsed).unwrap();
    let (_, warnings) = run_pasted(&session, &pasted);
    let lines: Vec<u32> = warnings.iter().map(|w| w.line).collect();
    assert_eq!(lines, vec![1, 4, 7]);
    assert!(warnings.iter().all(|w| w.code == ErrorCode::W3001));
}

// ─── Whole definitions ──────────────────────────────────────────────

#[test]
fn counter_methods_use_atomics() {
    let (session, parsed) = analyzed(
        "\
@flatjs class Counter {
  count: int32.atomic;
  @method bump(SELF) { return SELF.count.add(1); }
  @method swap(SELF) { return SELF.count.compareExchange(8, 4); }
} @end
",
    );
    let pasted = paste_up(&session, &parsed).unwrap();
    let (out, _) = run_pasted(&session, &pasted);
    assert!(out.contains(
        "Counter.bump = function (SELF) { return Atomics.add(_mem_int32, (SELF + 4) >> 2, 1); };"
    ));
    assert!(out.contains(
        "Counter.swap = function (SELF) { \
         return Atomics.compareExchange(_mem_int32, (SELF + 4) >> 2, 8, 4); };"
    ));
}

#[test]
fn default_struct_accessors_touch_every_field_in_order() {
    let (session, parsed) = analyzed(SHAPES);
    let pasted = paste_up(&session, &parsed).unwrap();
    let (out, _) = run_pasted(&session, &pasted);
    assert!(out.contains(
        "\
  v.x = _mem_float64[SELF >> 3];
  v.y = _mem_float64[(SELF + 8) >> 3];
  v.z = _mem_float64[(SELF + 16) >> 3];"
    ));
    assert!(out.contains(
        "\
  (_mem_float64[SELF >> 3] = v.x);
  (_mem_float64[(SELF + 8) >> 3] = v.y);
  (_mem_float64[(SELF + 16) >> 3] = v.z);"
    ));
    assert!(out.contains("  v.origin = Vec3._get_impl(SELF + 8);"));
}
