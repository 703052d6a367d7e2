//! What an access path lands on, and which operations it supports.
//!
//! Both expanders resolve `Type.a.b[.op]` the same way: the longest dotted
//! prefix naming an entry in the type's field map, then at most one
//! operation segment.

use flat_types::{
    Defn, MapEntry, PrimDefn, PrimKind, Session, TypeId, UserDefn, POINTER_ALIGN, POINTER_SIZE,
};

use crate::ops::Op;

/// The memory an access reads or writes.
#[derive(Copy, Clone, Debug)]
pub enum Target<'s> {
    Prim(&'s PrimDefn),
    /// A 4-byte slot holding an array or class reference.
    Pointer,
    /// A struct stored by value.
    Struct(&'s UserDefn),
}

impl<'s> Target<'s> {
    /// Target of a field map entry.
    pub fn of_entry(session: &'s Session, entry: &MapEntry) -> Self {
        if entry.is_array {
            return Target::Pointer;
        }
        Self::of_value(session, entry.ty)
    }

    /// Target of a value of type `ty`, e.g. one array element.
    pub fn of_value(session: &'s Session, ty: TypeId) -> Self {
        match session.get(ty) {
            Defn::Primitive(prim) => Target::Prim(prim),
            Defn::User(user) if user.is_class() => Target::Pointer,
            Defn::User(user) => Target::Struct(user),
        }
    }

    /// Bytes one element of this target occupies in an array.
    pub fn stride(&self) -> u32 {
        match self {
            Target::Prim(prim) => prim.size,
            Target::Pointer => POINTER_SIZE,
            Target::Struct(user) => user.size,
        }
    }

    pub fn align(&self) -> u32 {
        match self {
            Target::Prim(prim) => prim.align,
            Target::Pointer => POINTER_ALIGN,
            Target::Struct(user) => user.align,
        }
    }

    pub fn supports(&self, op: Op) -> bool {
        use Op::{Add, And, CompareExchange, Get, Or, Ref, Set, Sub, Xor};
        match self {
            Target::Prim(prim) => match prim.kind {
                PrimKind::Vanilla => {
                    matches!(op, Get | Set | Ref | Add | Sub)
                        || (prim.is_integer() && matches!(op, And | Or | Xor))
                }
                PrimKind::Simd => matches!(op, Get | Set | Ref),
                PrimKind::Atomic => {
                    matches!(op, Get | Set | Ref | Add | Sub | And | Or | Xor | CompareExchange)
                }
                PrimKind::Synchronic => true,
            },
            Target::Pointer | Target::Struct(_) => matches!(op, Get | Set | Ref),
        }
    }

    /// Short description for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Target::Prim(prim) => match prim.kind {
                PrimKind::Atomic | PrimKind::Synchronic => {
                    let (qual, base) = prim
                        .name
                        .split_once('/')
                        .unwrap_or(("", prim.name.as_str()));
                    format!("{qual} `{base}`")
                }
                PrimKind::Vanilla | PrimKind::Simd => format!("`{}`", prim.name),
            },
            Target::Pointer => "a reference".to_string(),
            Target::Struct(user) => format!("struct `{}`", user.name),
        }
    }
}

/// A resolved access: what is touched, where, and how.
#[derive(Copy, Clone, Debug)]
pub struct Access<'s> {
    pub target: Target<'s>,
    /// Byte offset from the base address.
    pub offset: u32,
    pub op: Op,
    /// The operation was written out rather than implied.
    pub explicit: bool,
}

/// Longest prefix of `segments` naming an entry in `defn`'s field map.
pub fn longest_field<'d>(defn: &'d UserDefn, segments: &[&str]) -> Option<(usize, &'d MapEntry)> {
    (1..=segments.len())
        .rev()
        .find_map(|len| defn.entry(&segments[..len].join(".")).map(|entry| (len, entry)))
}

/// Resolve `segments` against a user type. `None` if they are not a field
/// path with an optional trailing operation, nor a bare struct operation.
pub fn resolve_in_type<'s>(
    session: &'s Session,
    defn: &'s UserDefn,
    segments: &[&str],
) -> Option<Access<'s>> {
    if let Some((len, entry)) = longest_field(defn, segments) {
        let (op, explicit) = match &segments[len..] {
            [] => (Op::Get, false),
            [name] => (Op::from_name(name)?, true),
            _ => return None,
        };
        return Some(Access {
            target: Target::of_entry(session, entry),
            offset: entry.offset,
            op,
            explicit,
        });
    }
    if defn.is_class() {
        return None;
    }
    let (op, explicit) = trailing_op(segments)?;
    Some(Access {
        target: Target::Struct(defn),
        offset: 0,
        op,
        explicit,
    })
}

/// Resolve `segments` against one array element of type `element`.
pub fn resolve_in_element<'s>(
    session: &'s Session,
    element: Target<'s>,
    segments: &[&str],
) -> Option<Access<'s>> {
    if let Target::Struct(defn) = element {
        return resolve_in_type(session, defn, segments);
    }
    let (op, explicit) = trailing_op(segments)?;
    Some(Access {
        target: element,
        offset: 0,
        op,
        explicit,
    })
}

/// No segments (implicit `get`) or a single operation name.
fn trailing_op(segments: &[&str]) -> Option<(Op, bool)> {
    match segments {
        [] => Some((Op::Get, false)),
        [name] => Op::from_name(name).map(|op| (op, true)),
        _ => None,
    }
}
