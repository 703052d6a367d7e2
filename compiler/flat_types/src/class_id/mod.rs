//! Class names and runtime type tags.
//!
//! A class's qualified name is its ancestor chain joined by `>`, root first
//! (`Base>Mid>Leaf`). The class id is a 28-bit rolling hash of that name.
//! Ids must be unique across the program; a collision is an error, not
//! something to resolve.

use flat_diagnostic::{CompileResult, Diagnostic, ErrorCode};

use crate::{Session, TypeId};

/// Hash a qualified class name. `None` if it has a character outside
/// `[A-Za-z0-9_>]`.
pub fn class_id_hash(qualified: &str) -> Option<u32> {
    let mut n = u32::try_from(qualified.len()).ok()? & 0x0FFF_FFFF;
    for c in qualified.chars() {
        let v = match c {
            'A'..='Z' => c as u32 - 'A' as u32,
            'a'..='z' => c as u32 - 'a' as u32 + 26,
            '0'..='9' => c as u32 - '0' as u32 + 52,
            '_' => 62,
            '>' => 63,
            _ => return None,
        };
        n = (((n & 0x1FF_FFFF) << 3) | (n >> 25)) ^ v;
    }
    Some(n)
}

fn qualified_name(session: &Session, id: TypeId) -> CompileResult<String> {
    let mut chain = Vec::new();
    let mut current = Some(id);
    while let Some(ty) = current {
        let defn = session.user(ty)?;
        chain.push(defn.name.as_str());
        current = defn.base();
    }
    chain.reverse();
    Ok(chain.join(">"))
}

pub(crate) fn assign_class_ids(session: &mut Session) -> CompileResult<()> {
    for id in session.user_types().to_vec() {
        if !session.user(id)?.is_class() {
            continue;
        }
        let class_name = qualified_name(session, id)?;
        let defn = session.user(id)?;
        let Some(class_id) = class_id_hash(&class_name) else {
            return Err(Diagnostic::error(ErrorCode::E2009)
                .with_message(format!(
                    "class name `{class_name}` cannot be hashed to a class id"
                ))
                .with_note("class names may only use ASCII letters, digits and `_`")
                .at(defn.file.as_str(), defn.line)
                .into());
        };
        if let Err(owner) = session.claim_class_id(class_id, id) {
            let defn = session.user(id)?;
            let owner = session.user(owner)?;
            return Err(Diagnostic::error(ErrorCode::E2008)
                .with_message(format!(
                    "duplicate class id {class_id}: `{}` collides with `{}` ({}:{})",
                    defn.name, owner.name, owner.file, owner.line
                ))
                .with_note("rename one of the classes")
                .at(defn.file.as_str(), defn.line)
                .into());
        }
        tracing::debug!(class = %class_name, class_id, "assigned class id");
        if let Some(info) = session.user_mut(id)?.class_mut() {
            info.class_name = class_name;
            info.class_id = class_id;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
