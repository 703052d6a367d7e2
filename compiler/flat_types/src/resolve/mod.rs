//! Resolve field types and base classes.
//!
//! Every `Prop::type_ref` and class `base` is set after this pass, or it
//! has failed with the first unresolvable reference.

use flat_diagnostic::{CompileError, CompileResult, ErrorCode};

use crate::{DefnKind, Prop, Qual, Session, TypeId};

pub(crate) fn resolve_types(session: &mut Session) -> CompileResult<()> {
    for id in session.user_types().to_vec() {
        let defn = session.user(id)?;
        let props = defn
            .props
            .iter()
            .map(|prop| resolve_prop(session, &defn.file, prop))
            .collect::<CompileResult<Vec<_>>>()?;
        let base = match defn.class().and_then(|info| info.base_name.as_deref()) {
            Some(base_name) => Some(resolve_base(session, id, base_name)?),
            None => None,
        };

        let defn = session.user_mut(id)?;
        for (prop, ty) in defn.props.iter_mut().zip(props) {
            prop.type_ref = Some(ty);
        }
        if let Some(base) = base {
            if let Some(info) = defn.class_mut() {
                info.base = Some(base);
            }
            if let Some(info) = session.user_mut(base)?.class_mut() {
                info.subclasses.push(id);
            }
        }
    }
    Ok(())
}

fn resolve_prop(session: &Session, file: &str, prop: &Prop) -> CompileResult<TypeId> {
    let Some(ty) = session.lookup(&prop.type_name) else {
        return Err(CompileError::program(
            ErrorCode::E2002,
            file,
            prop.line,
            format!(
                "unknown type `{}` for field `{}`",
                prop.type_name, prop.name
            ),
        ));
    };
    if prop.qual == Qual::None {
        return Ok(ty);
    }
    session.qualified(ty, prop.qual).ok_or_else(|| {
        CompileError::program(
            ErrorCode::E2005,
            file,
            prop.line,
            format!(
                "type `{}` of field `{}` does not support the `.{}` qualifier; only integer primitives do",
                prop.type_name,
                prop.name,
                prop.qual.keyword()
            ),
        )
    })
}

fn resolve_base(session: &Session, id: TypeId, base_name: &str) -> CompileResult<TypeId> {
    let defn = session.user(id)?;
    let Some(base) = session.lookup(base_name) else {
        return Err(CompileError::program(
            ErrorCode::E2003,
            defn.file.as_str(),
            defn.line,
            format!("unknown base class `{base_name}` for class `{}`", defn.name),
        ));
    };
    let kind = session.get(base).kind();
    if kind != DefnKind::Class {
        return Err(CompileError::program(
            ErrorCode::E2004,
            defn.file.as_str(),
            defn.line,
            format!(
                "base `{base_name}` of class `{}` is a {kind}, not a class",
                defn.name
            ),
        ));
    }
    Ok(base)
}
