//! The compilation session: every definition plus the global tables.
//!
//! # Architecture
//!
//! ```text
//! Session
//!     ├── defs       Vec<Defn>, indexed by TypeId
//!     ├── names      name → TypeId (built-ins and user types)
//!     ├── class_ids  class id → TypeId
//!     └── user       user types in registration order
//! ```
//!
//! Registration order is program order: files in command-line order, and
//! definitions in source order within each file. Every later pass walks
//! `user` so output is deterministic.

use flat_diagnostic::{CompileError, CompileResult, Diagnostic, ErrorCode};
use rustc_hash::FxHashMap;

use crate::defn::{Defn, UserDefn};
use crate::prim::{builtins, qualified_name, PrimDefn, PrimKind};
use crate::{layout, recursion, resolve, vtable, Qual, TypeId};

#[derive(Debug)]
pub struct Session {
    defs: Vec<Defn>,
    names: FxHashMap<String, TypeId>,
    class_ids: FxHashMap<u32, TypeId>,
    user: Vec<TypeId>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session seeded with every built-in primitive.
    pub fn new() -> Self {
        let mut session = Session {
            defs: Vec::new(),
            names: FxHashMap::default(),
            class_ids: FxHashMap::default(),
            user: Vec::new(),
        };
        for prim in builtins() {
            session.insert(prim.name.clone(), Defn::Primitive(prim));
        }
        session
    }

    fn insert(&mut self, name: String, defn: Defn) -> TypeId {
        let id = TypeId::from_raw(u32::try_from(self.defs.len()).unwrap_or(u32::MAX));
        self.defs.push(defn);
        self.names.insert(name, id);
        id
    }

    /// Register a parsed user type. Names are global across all files.
    pub fn register(&mut self, defn: UserDefn) -> CompileResult<TypeId> {
        if let Some(&existing) = self.names.get(&defn.name) {
            let mut diag = Diagnostic::error(ErrorCode::E2001)
                .with_message(format!("duplicate definition of type `{}`", defn.name))
                .at(defn.file.as_str(), defn.line);
            if let Some(prev) = self.get(existing).as_user() {
                diag = diag.with_note(format!("first defined at {}:{}", prev.file, prev.line));
            }
            return Err(diag.into());
        }
        let id = self.insert(defn.name.clone(), Defn::User(defn));
        self.user.push(id);
        Ok(id)
    }

    /// Look up a type by source name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    /// The atomic or synchronic variant of a vanilla integer type.
    pub fn qualified(&self, base: TypeId, qual: Qual) -> Option<TypeId> {
        let prim = self.prim(base)?;
        let kind = match qual {
            Qual::None => return Some(base),
            Qual::Atomic => PrimKind::Atomic,
            Qual::Synchronic => PrimKind::Synchronic,
        };
        if !prim.accepts_qualifier() {
            return None;
        }
        self.lookup(&qualified_name(&prim.name, kind))
    }

    pub fn get(&self, id: TypeId) -> &Defn {
        &self.defs[id.index()]
    }

    pub fn prim(&self, id: TypeId) -> Option<&PrimDefn> {
        self.get(id).as_prim()
    }

    /// A user definition; a primitive here is a compiler bug.
    pub fn user(&self, id: TypeId) -> CompileResult<&UserDefn> {
        self.get(id)
            .as_user()
            .ok_or_else(|| CompileError::internal(format!("{id:?} is not a user type")))
    }

    pub(crate) fn user_mut(&mut self, id: TypeId) -> CompileResult<&mut UserDefn> {
        self.defs[id.index()]
            .as_user_mut()
            .ok_or_else(|| CompileError::internal(format!("{id:?} is not a user type")))
    }

    /// User types in registration order.
    pub fn user_types(&self) -> &[TypeId] {
        &self.user
    }

    /// Claim `class_id` for `ty`; on collision returns the current owner.
    pub(crate) fn claim_class_id(&mut self, class_id: u32, ty: TypeId) -> Result<(), TypeId> {
        match self.class_ids.get(&class_id) {
            Some(&owner) if owner != ty => Err(owner),
            _ => {
                self.class_ids.insert(class_id, ty);
                Ok(())
            }
        }
    }

    /// Resolve, check, lay out and build dispatch tables for the whole
    /// program.
    pub fn analyze(&mut self) -> CompileResult<()> {
        resolve::resolve_types(self)?;
        recursion::check_recursion(self)?;
        layout::compute_layouts(self)?;
        vtable::build_vtables(self)?;
        tracing::debug!(types = self.user.len(), "analysis complete");
        Ok(())
    }
}
