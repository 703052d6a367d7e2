//! Low-level memory operations in the generated code.
//!
//! Every access ends up as one of:
//!
//! ```text
//! vanilla     _mem_float64[a >> 3]          (_mem_int32[a >> 2] += v)
//! SIMD        SIMD.Float32x4.load(_mem_float32, a >> 2)
//! atomic      Atomics.add(_mem_int32, a >> 2, v)
//! synchronic  FlatJS.syncAdd(_mem_int32, a, v)
//! struct      Vec3._get_impl(a)             Vec3._set_impl(a, v)
//! ```
//!
//! Synchronic helpers take the byte address of the whole cell, header
//! included, rather than a view index.

use std::borrow::Cow;

use flat_diagnostic::{CompileError, CompileResult};
use flat_types::{PrimDefn, PrimKind, Store};

use crate::ops::Op;
use crate::scan::is_ident_continue;
use crate::target::Target;

/// `expr` as an operand: unchanged if it is a plain name, number or member
/// chain, parenthesized otherwise.
pub fn operand(expr: &str) -> Cow<'_, str> {
    let expr = expr.trim();
    let simple = !expr.is_empty() && expr.bytes().all(|b| is_ident_continue(b) || b == b'.');
    if simple || is_wrapped(expr) {
        Cow::Borrowed(expr)
    } else {
        Cow::Owned(format!("({expr})"))
    }
}

/// Whether `expr` is one parenthesized group, `(a + b)` but not `(a) + (b)`.
fn is_wrapped(expr: &str) -> bool {
    let bytes = expr.as_bytes();
    bytes.first() == Some(&b'(')
        && crate::scan::matching_paren(bytes, 0) == Some(bytes.len() - 1)
}

/// `expr` without one enclosing pair of parentheses.
fn unwrapped(expr: &str) -> &str {
    if is_wrapped(expr) {
        &expr[1..expr.len() - 1]
    } else {
        expr
    }
}

/// Address of a field at `offset` from `base`.
pub fn field_address(base: &str, offset: u32) -> String {
    let base = operand(base);
    if offset == 0 {
        base.into_owned()
    } else {
        format!("({base} + {offset})")
    }
}

/// Address of a field at `offset` within element `index` of an array at
/// `base` with elements of `stride` bytes.
pub fn element_address(base: &str, index: &str, stride: u32, offset: u32) -> String {
    let base = operand(base);
    let index = operand(index);
    if offset == 0 {
        format!("({base} + {stride} * {index})")
    } else {
        format!("({base} + {stride} * {index} + {offset})")
    }
}

/// View index of the byte address `addr`.
fn view_index(addr: &str, store: Store) -> String {
    match store.shift() {
        0 => addr.to_string(),
        shift => format!("{addr} >> {shift}"),
    }
}

/// The expression performing `op` on `target` at `addr`. `args` are the
/// operation's arguments after the address.
pub fn access(target: Target<'_>, addr: &str, op: Op, args: &[String]) -> CompileResult<String> {
    if args.len() + 1 != op.arity() || !target.supports(op) {
        return Err(CompileError::internal(format!(
            "`{op}` with {} arguments emitted for {}",
            args.len(),
            target.describe()
        )));
    }
    if op == Op::Ref {
        return Ok(addr.to_string());
    }
    let text = match target {
        Target::Prim(prim) => primitive(prim, addr, op, args),
        Target::Pointer => vanilla(Store::Int32, addr, op, args),
        Target::Struct(defn) => match args {
            [] => format!("{}._get_impl({})", defn.name, unwrapped(addr)),
            [value] => format!(
                "{}._set_impl({}, {})",
                defn.name,
                unwrapped(addr),
                value.trim()
            ),
            _ => return Err(CompileError::internal("struct access with extra arguments")),
        },
    };
    Ok(text)
}

fn primitive(prim: &PrimDefn, addr: &str, op: Op, args: &[String]) -> String {
    let view = prim.store.view();
    let list = args.iter().map(|arg| arg.trim()).collect::<Vec<_>>().join(", ");
    let tail = if list.is_empty() {
        String::new()
    } else {
        format!(", {list}")
    };
    match prim.kind {
        PrimKind::Vanilla => vanilla(prim.store, addr, op, args),
        PrimKind::Simd => {
            let simd = prim.simd.unwrap_or("Float32x4");
            let index = view_index(addr, prim.store);
            let method = if op == Op::Get { "load" } else { "store" };
            format!("SIMD.{simd}.{method}({view}, {index}{tail})")
        }
        PrimKind::Atomic => {
            let index = view_index(addr, prim.store);
            format!("Atomics.{}({view}, {index}{tail})", runtime_name(op))
        }
        PrimKind::Synchronic => {
            let name = runtime_name(op);
            let (first, rest) = name.split_at(1);
            format!(
                "FlatJS.sync{}{rest}({view}, {addr}{tail})",
                first.to_ascii_uppercase()
            )
        }
    }
}

/// `get` and `set` are `load` and `store` in the runtime.
fn runtime_name(op: Op) -> &'static str {
    match op {
        Op::Get => "load",
        Op::Set => "store",
        other => other.name(),
    }
}

fn vanilla(store: Store, addr: &str, op: Op, args: &[String]) -> String {
    let element = format!("{}[{}]", store.view(), view_index(addr, store));
    match (op.assignment(), args) {
        (Some(assign), [value]) => format!("({element} {assign} {})", value.trim()),
        _ => element,
    }
}
