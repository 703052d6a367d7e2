//! Single-inheritance dispatch tables.
//!
//! For class `C` and each virtual name visible in it, every class in the
//! inclusive subtree rooted at `C` is mapped to its effective
//! implementation: the nearest class at or above it, stopping before `C`'s
//! base, that declares the method. A name `C` inherits without overriding
//! also gets a default: the implementation `C`'s base would use. The
//! emitted dispatcher is a single switch on the runtime type tag.

use flat_diagnostic::{CompileError, CompileResult, ErrorCode};
use rustc_hash::FxHashSet;

use crate::{MethodKind, Session, Signature, TypeId, Virtual};

/// Name of the function holding `type_name`'s own body for `method`.
pub fn impl_name(type_name: &str, method: &str) -> String {
    format!("{type_name}.{method}_impl")
}

pub(crate) fn build_vtables(session: &mut Session) -> CompileResult<()> {
    for id in session.user_types().to_vec() {
        if !session.user(id)?.is_class() {
            continue;
        }
        check_shadowing(session, id)?;
        let vtable = class_vtable(session, id)?;
        if let Some(info) = session.user_mut(id)?.class_mut() {
            info.vtable = vtable;
        }
    }
    Ok(())
}

fn class_vtable(session: &Session, id: TypeId) -> CompileResult<Vec<Virtual>> {
    let defn = session.user(id)?;
    let base = defn.base();
    let subtree = inclusive_subtree(session, id)?;

    let mut vtable = Vec::new();
    for (name, signature) in visible_virtuals(session, id)? {
        let mut reverse_cases: Vec<(String, Vec<u32>)> = Vec::new();
        for &sub in &subtree {
            let Some(implementor) = find_implementation(session, sub, &name, base)? else {
                continue;
            };
            let implementation = impl_name(&session.user(implementor)?.name, &name);
            let class_id = class_id_of(session, sub)?;
            match reverse_cases.iter_mut().find(|(imp, _)| *imp == implementation) {
                Some((_, ids)) => ids.push(class_id),
                None => reverse_cases.push((implementation, vec![class_id])),
            }
        }

        let default = match base {
            Some(base) if !defn.declares_virtual(&name) => {
                match find_implementation(session, base, &name, None)? {
                    Some(implementor) => Some(impl_name(&session.user(implementor)?.name, &name)),
                    None => None,
                }
            }
            _ => None,
        };

        tracing::debug!(
            class = %defn.name,
            method = %name,
            cases = reverse_cases.len(),
            default = ?default,
            "built dispatch table"
        );
        vtable.push(Virtual {
            name,
            signature,
            reverse_cases,
            default,
        });
    }
    Ok(vtable)
}

/// Virtual names visible in `id`, nearest declaration first. The signature
/// comes from the nearest declaration.
fn visible_virtuals(session: &Session, id: TypeId) -> CompileResult<Vec<(String, Signature)>> {
    let mut seen = FxHashSet::default();
    let mut names = Vec::new();
    let mut current = Some(id);
    while let Some(ty) = current {
        let defn = session.user(ty)?;
        for method in defn.methods.iter().filter(|m| m.kind == MethodKind::Virtual) {
            if seen.insert(method.name.clone()) {
                names.push((method.name.clone(), method.signature.clone()));
            }
        }
        current = defn.base();
    }
    Ok(names)
}

/// First class from `start` upward declaring virtual `name`, not walking
/// into `stop`.
fn find_implementation(
    session: &Session,
    start: TypeId,
    name: &str,
    stop: Option<TypeId>,
) -> CompileResult<Option<TypeId>> {
    let mut current = Some(start);
    while let Some(ty) = current {
        if Some(ty) == stop {
            break;
        }
        let defn = session.user(ty)?;
        if defn.declares_virtual(name) {
            return Ok(Some(ty));
        }
        current = defn.base();
    }
    Ok(None)
}

/// `root` and all its descendants, pre-order, children in registration
/// order.
fn inclusive_subtree(session: &Session, root: TypeId) -> CompileResult<Vec<TypeId>> {
    let mut order = Vec::new();
    let mut stack = vec![root];
    while let Some(ty) = stack.pop() {
        order.push(ty);
        if let Some(info) = session.user(ty)?.class() {
            stack.extend(info.subclasses.iter().rev());
        }
    }
    Ok(order)
}

fn class_id_of(session: &Session, id: TypeId) -> CompileResult<u32> {
    session
        .user(id)?
        .class()
        .map(|info| info.class_id)
        .ok_or_else(|| CompileError::internal("subclass is not a class"))
}

/// A plain `@method` may not reuse the name of an inherited virtual.
fn check_shadowing(session: &Session, id: TypeId) -> CompileResult<()> {
    let defn = session.user(id)?;
    let Some(base) = defn.base() else {
        return Ok(());
    };
    for method in defn.methods.iter().filter(|m| m.kind == MethodKind::NonVirtual) {
        if let Some(ancestor) = find_implementation(session, base, &method.name, None)? {
            return Err(CompileError::program(
                ErrorCode::E2011,
                defn.file.as_str(),
                method.line,
                format!(
                    "method `{}` overrides virtual `{}.{}` and must be declared `@virtual`",
                    method.name,
                    session.user(ancestor)?.name,
                    method.name
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
