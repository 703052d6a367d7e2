//! The program model shared by every flatc stage.
//!
//! A [`Session`] owns every type definition (built-in primitives and user
//! structs/classes) plus the two global tables: name to type and class id to
//! type. Stages run in a fixed order over the whole program:
//!
//! ```text
//! register ──► resolve ──► check_recursion ──► compute_layouts ──► build_vtables
//!              (refs)      (acyclic)           (offsets, ids)      (dispatch)
//! ```
//!
//! [`Session::analyze`] runs all of them. After it succeeds, definitions
//! are read-only.
//!
//! # Design
//!
//! - Types are referenced by [`TypeId`], an index into the session. Class
//!   subclass lists hold indices, never owning pointers.
//! - The first error aborts analysis; there is no error recovery.

mod class_id;
mod defn;
mod flags;
mod idx;
mod layout;
mod prim;
mod recursion;
mod resolve;
mod session;
mod vtable;

#[cfg(test)]
mod test_helpers;

pub use class_id::class_id_hash;
pub use defn::{
    ClassInfo, Defn, DefnKind, MapEntry, Method, MethodKind, Prop, Qual, Signature, StructInfo,
    UserDefn, UserKind, Virtual,
};
pub use flags::DefnFlags;
pub use idx::TypeId;
pub use layout::{align_to, CLASS_HEADER_SIZE, POINTER_ALIGN, POINTER_SIZE};
pub use prim::{PrimDefn, PrimKind, Store, SYNCHRONIC_HEADER_SIZE};
pub use session::Session;
pub use vtable::impl_name;
