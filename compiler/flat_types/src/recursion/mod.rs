//! Reject structs that contain themselves by value and cyclic inheritance.
//!
//! Classic white/gray/black search: `LIVE` marks the current path and
//! `CHECKED` caches finished types, so each containment edge is walked once.
//! Array fields are pointers and never count as containment. Flags are
//! cleared again when the pass ends.

use flat_diagnostic::{CompileError, CompileResult, ErrorCode};

use crate::{DefnFlags, DefnKind, Session, TypeId};

pub(crate) fn check_recursion(session: &mut Session) -> CompileResult<()> {
    let ids = session.user_types().to_vec();

    let mut path = Vec::new();
    for &id in &ids {
        if !session.user(id)?.is_class() {
            check_struct(session, id, &mut path)?;
        }
    }
    clear_flags(session, &ids)?;

    for &id in &ids {
        if session.user(id)?.is_class() {
            check_base_chain(session, id)?;
        }
    }
    clear_flags(session, &ids)?;
    tracing::debug!(types = ids.len(), "no recursive containment");
    Ok(())
}

fn check_struct(session: &mut Session, id: TypeId, path: &mut Vec<TypeId>) -> CompileResult<()> {
    let defn = session.user(id)?;
    if defn.flags.contains(DefnFlags::CHECKED) {
        return Ok(());
    }
    if defn.flags.contains(DefnFlags::LIVE) {
        let start = path.iter().position(|&p| p == id).unwrap_or(0);
        let cycle = describe(session, &path[start..], id, " contains ")?;
        return Err(CompileError::program(
            ErrorCode::E2006,
            defn.file.as_str(),
            defn.line,
            format!("recursive type definition: {cycle}"),
        ));
    }

    let embedded: Vec<TypeId> = defn
        .props
        .iter()
        .filter(|prop| !prop.is_array)
        .filter_map(|prop| prop.type_ref)
        .filter(|&ty| session.get(ty).kind() == DefnKind::Struct)
        .collect();

    session.user_mut(id)?.flags.insert(DefnFlags::LIVE);
    path.push(id);
    for child in embedded {
        check_struct(session, child, path)?;
    }
    path.pop();
    let flags = &mut session.user_mut(id)?.flags;
    flags.remove(DefnFlags::LIVE);
    flags.insert(DefnFlags::CHECKED);
    Ok(())
}

fn check_base_chain(session: &mut Session, id: TypeId) -> CompileResult<()> {
    let mut chain = Vec::new();
    let mut current = Some(id);
    while let Some(ty) = current {
        let defn = session.user(ty)?;
        if defn.flags.contains(DefnFlags::CHECKED) {
            break;
        }
        if defn.flags.contains(DefnFlags::LIVE) {
            let start = chain.iter().position(|&c| c == ty).unwrap_or(0);
            let cycle = describe(session, &chain[start..], ty, " extends ")?;
            return Err(CompileError::program(
                ErrorCode::E2007,
                defn.file.as_str(),
                defn.line,
                format!("inheritance cycle: {cycle}"),
            ));
        }
        current = defn.base();
        session.user_mut(ty)?.flags.insert(DefnFlags::LIVE);
        chain.push(ty);
    }
    for ty in chain {
        let flags = &mut session.user_mut(ty)?.flags;
        flags.remove(DefnFlags::LIVE);
        flags.insert(DefnFlags::CHECKED);
    }
    Ok(())
}

/// `A contains B contains A`.
fn describe(session: &Session, cycle: &[TypeId], back_to: TypeId, joiner: &str) -> CompileResult<String> {
    let mut names = cycle
        .iter()
        .map(|&ty| Ok(session.user(ty)?.name.clone()))
        .collect::<CompileResult<Vec<_>>>()?;
    names.push(session.user(back_to)?.name.clone());
    Ok(names.join(joiner))
}

fn clear_flags(session: &mut Session, ids: &[TypeId]) -> CompileResult<()> {
    for &id in ids {
        session
            .user_mut(id)?
            .flags
            .remove(DefnFlags::LIVE | DefnFlags::CHECKED);
    }
    Ok(())
}
