use flat_diagnostic::{CompileResult, ErrorCode};
use flat_types::MethodKind;
use pretty_assertions::assert_eq;

use super::*;
use crate::test_helpers::{session, user};

/// Shapes with `run`'s body (line 16) substituted.
fn source(body: &str) -> String {
    format!(
        "\
@flatjs struct Vec3 {{
  x: float64;
  y: float64;
  z: float64;
}} @end
@flatjs class Base {{
  hits: int32.atomic;
  weight: float32;
  pos: Vec3;
  items: int32.Array;
  @method init(SELF, w) {{ return SELF; }}
  @virtual area(SELF) {{ return 0; }}
}} @end
@flatjs class Shape extends Base {{
  flag: int32.synchronic;
  @method run(SELF, k) {{{body}}}
}} @end
"
    )
}

fn expand(body: &str) -> CompileResult<String> {
    let session = session(&source(body));
    let shape = user(&session, "Shape");
    let run = shape.method("run").unwrap();
    expand_body(&session, shape, run)
}

fn fails(body: &str) -> (ErrorCode, u32, String) {
    let err = expand(body).unwrap_err();
    let diagnostic = err.diagnostic().unwrap();
    (diagnostic.code, diagnostic.line, diagnostic.message.clone())
}

// ─── Reads and writes ───────────────────────────────────────────────

#[test]
fn bare_field_is_a_get() {
    assert_eq!(
        expand(" return SELF.weight; ").unwrap(),
        " return Shape.weight(SELF); "
    );
}

#[test]
fn assignments() {
    assert_eq!(
        expand(" SELF.weight = k; ").unwrap(),
        " Shape.weight.set(SELF, k); "
    );
    assert_eq!(
        expand(" SELF.hits += 1; ").unwrap(),
        " Shape.hits.add(SELF, 1); "
    );
    assert_eq!(
        expand(" SELF.pos.y -= 2; ").unwrap(),
        " Shape.pos.y.sub(SELF, 2); "
    );
    assert_eq!(
        expand(" SELF.hits ^= k; SELF.hits |= 1; SELF.hits &= 3; ").unwrap(),
        " Shape.hits.xor(SELF, k); Shape.hits.or(SELF, 1); Shape.hits.and(SELF, 3); "
    );
}

#[test]
fn assignment_keeps_trailing_whitespace() {
    assert_eq!(
        expand(" SELF.weight = k ").unwrap(),
        " Shape.weight.set(SELF, k) "
    );
}

#[test]
fn assignment_stops_at_argument_comma() {
    assert_eq!(
        expand(" f(SELF.weight = 1, 2); ").unwrap(),
        " f(Shape.weight.set(SELF, 1), 2); "
    );
}

#[test]
fn explicit_operations() {
    assert_eq!(
        expand(" return SELF.hits.compareExchange(8, 4); ").unwrap(),
        " return Shape.hits.compareExchange(SELF, 8, 4); "
    );
    assert_eq!(
        expand(" SELF.flag.notify(); ").unwrap(),
        " Shape.flag.notify(SELF); "
    );
    assert_eq!(
        expand(" var p = SELF.pos.ref(); ").unwrap(),
        " var p = Shape.pos.ref(SELF); "
    );
}

#[test]
fn struct_and_array_fields() {
    assert_eq!(
        expand(" SELF.pos = v; return SELF.items; ").unwrap(),
        " Shape.pos.set(SELF, v); return Shape.items(SELF); "
    );
}

#[test]
fn nested_references_are_expanded() {
    assert_eq!(
        expand(" SELF.weight = SELF.weight * k; ").unwrap(),
        " Shape.weight.set(SELF, Shape.weight(SELF) * k); "
    );
    assert_eq!(
        expand(" SELF.hits.add(SELF.hits); ").unwrap(),
        " Shape.hits.add(SELF, Shape.hits(SELF)); "
    );
}

// ─── Methods ────────────────────────────────────────────────────────

#[test]
fn virtual_calls_use_the_current_type() {
    assert_eq!(expand(" return SELF.area(); ").unwrap(), " return Shape.area(SELF); ");
}

#[test]
fn plain_calls_use_the_declaring_type() {
    assert_eq!(
        expand(" SELF.init(k + 1); ").unwrap(),
        " Base.init(SELF, k + 1); "
    );
}

// ─── Left alone ─────────────────────────────────────────────────────

#[test]
fn strings_comments_and_members_are_untouched() {
    let body = " var s = \"SELF.weight\"; // SELF.hits\n x.SELF.weight; return SELF; ";
    assert_eq!(expand(body).unwrap(), body);
}

#[test]
fn struct_bodies_allow_whole_value_operations() {
    let session = session(
        "\
@flatjs struct Pair {
  a: int32;
  b: int32;
  @get(SELF) { return SELF.a + SELF.b; }
  @set(SELF, v) { SELF.a = v; return SELF.ref(); }
} @end
",
    );
    let pair = user(&session, "Pair");
    let get = pair.methods.iter().find(|m| m.kind == MethodKind::Get).unwrap();
    let set = pair.methods.iter().find(|m| m.kind == MethodKind::Set).unwrap();
    assert_eq!(
        expand_body(&session, pair, get).unwrap(),
        " return Pair.a(SELF) + Pair.b(SELF); "
    );
    assert_eq!(
        expand_body(&session, pair, set).unwrap(),
        " Pair.a.set(SELF, v); return Pair.ref(SELF); "
    );
}

// ─── Errors ─────────────────────────────────────────────────────────

#[test]
fn unknown_member() {
    let (code, line, message) = fails("\n  SELF.missing;\n");
    assert_eq!(code, ErrorCode::E3001);
    assert_eq!(line, 17);
    assert_eq!(message, "unknown member `SELF.missing` of `Shape`");
}

#[test]
fn bad_segment_after_field() {
    let (code, _, message) = fails(" SELF.pos.w; ");
    assert_eq!(code, ErrorCode::E3001);
    assert_eq!(message, "`w` is not an operation on `SELF.pos`");
}

#[test]
fn whole_value_operations_need_a_struct() {
    assert_eq!(fails(" SELF.get(); ").0, ErrorCode::E3001);
}

#[test]
fn uncalled_method() {
    assert_eq!(fails(" var f = SELF.area; ").0, ErrorCode::E3001);
}

#[test]
fn inapplicable_operations() {
    let (code, line, message) = fails(" SELF.weight.compareExchange(1, 2); ");
    assert_eq!(code, ErrorCode::E3002);
    assert_eq!(line, 16);
    assert_eq!(
        message,
        "operation `compareExchange` in `SELF.weight.compareExchange` does not apply to `float32`"
    );
    assert_eq!(fails(" SELF.weight &= 1; ").0, ErrorCode::E3002);
    assert_eq!(fails(" SELF.pos.add(v); ").0, ErrorCode::E3002);
}

#[test]
fn wrong_arity() {
    let (code, _, message) = fails(" SELF.hits.add(); ");
    assert_eq!(code, ErrorCode::E3003);
    assert_eq!(message, "`SELF.hits.add` takes 1 argument(s), found 0");
    assert_eq!(fails(" SELF.hits.compareExchange(1); ").0, ErrorCode::E3003);
    assert_eq!(fails(" var f = SELF.hits.add; ").0, ErrorCode::E3003);
    assert_eq!(fails(" SELF.hits = ; ").0, ErrorCode::E3003);
}

#[test]
fn unsupported_assignments() {
    let (code, _, message) = fails(" SELF.hits *= 2; ");
    assert_eq!(code, ErrorCode::E3004);
    assert_eq!(message, "unsupported assignment `*=` to `SELF.hits`");
    assert_eq!(fails(" SELF.hits.add = 2; ").0, ErrorCode::E3004);
}
