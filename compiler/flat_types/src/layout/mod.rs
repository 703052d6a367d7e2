//! Memory layout of structs and classes.
//!
//! Fields are placed in declaration order. Each field is aligned to its
//! own alignment; arrays and class references occupy one pointer slot; an
//! embedded struct gets a pass-through entry plus a copy of each of its
//! entries under `outer.inner` at `outer_offset + inner_offset`.
//!
//! Classes start with a 4-byte type tag at offset 0. A derived class starts
//! from a copy of its base's map, size and alignment. Struct sizes are
//! rounded up to their alignment so arrays of them stay aligned.

use flat_diagnostic::{CompileError, CompileResult, ErrorCode};

use crate::{class_id, DefnFlags, DefnKind, MapEntry, Session, TypeId};

/// Size of a pointer slot (array or class reference).
pub const POINTER_SIZE: u32 = 4;
pub const POINTER_ALIGN: u32 = 4;
/// The class type tag at offset 0.
pub const CLASS_HEADER_SIZE: u32 = 4;

/// Round `value` up to a multiple of `align`, a power of two.
#[inline]
pub fn align_to(value: u32, align: u32) -> u32 {
    debug_assert!(align.is_power_of_two(), "alignment {align} is not a power of two");
    (value + align - 1) & !(align - 1)
}

/// Running state while placing fields.
struct Builder {
    size: u32,
    align: u32,
    map: Vec<MapEntry>,
}

impl Builder {
    fn place(&mut self, size: u32, align: u32) -> u32 {
        let offset = align_to(self.size, align);
        self.size = offset + size;
        self.align = self.align.max(align);
        offset
    }

    fn push(&mut self, name: String, expand: bool, offset: u32, ty: TypeId, is_array: bool) {
        self.map.push(MapEntry {
            name,
            expand,
            offset,
            ty,
            is_array,
        });
    }
}

pub(crate) fn compute_layouts(session: &mut Session) -> CompileResult<()> {
    for id in session.user_types().to_vec() {
        layout_type(session, id)?;
    }
    class_id::assign_class_ids(session)
}

/// Lay out `id`, laying out its base and embedded structs first. Recursion
/// has already been ruled out.
fn layout_type(session: &mut Session, id: TypeId) -> CompileResult<()> {
    let defn = session.user(id)?;
    if defn.flags.contains(DefnFlags::LAID_OUT) {
        return Ok(());
    }
    let is_class = defn.is_class();
    let base = defn.base();
    let file = defn.file.clone();
    let props = defn.props.clone();
    let methods = defn.methods.clone();

    let mut builder = match base {
        Some(base) => {
            layout_type(session, base)?;
            let base = session.user(base)?;
            Builder {
                size: base.size,
                align: base.align,
                map: base.map.clone(),
            }
        }
        None if is_class => Builder {
            size: CLASS_HEADER_SIZE,
            align: POINTER_ALIGN,
            map: Vec::new(),
        },
        None => Builder {
            size: 0,
            align: 1,
            map: Vec::new(),
        },
    };

    for prop in props {
        let ty = prop.type_ref.ok_or_else(|| {
            CompileError::internal(format!("field `{}` laid out before resolution", prop.name))
        })?;
        if builder.map.iter().any(|entry| entry.name == prop.name) {
            return Err(CompileError::program(
                ErrorCode::E2010,
                file.as_str(),
                prop.line,
                format!("field `{}` redeclares an inherited field", prop.name),
            ));
        }
        if let Some(owner) = inherited_method(session, base, &prop.name)? {
            return Err(CompileError::program(
                ErrorCode::E2010,
                file.as_str(),
                prop.line,
                format!(
                    "field `{}` hides the inherited method `{owner}.{}`",
                    prop.name, prop.name
                ),
            ));
        }

        let kind = session.get(ty).kind();
        match kind {
            _ if prop.is_array => {
                let offset = builder.place(POINTER_SIZE, POINTER_ALIGN);
                builder.push(prop.name, true, offset, ty, true);
            }
            DefnKind::Class => {
                let offset = builder.place(POINTER_SIZE, POINTER_ALIGN);
                builder.push(prop.name, true, offset, ty, false);
            }
            DefnKind::Primitive => {
                let defn = session.get(ty);
                let offset = builder.place(defn.size(), defn.align());
                builder.push(prop.name, true, offset, ty, false);
            }
            DefnKind::Struct => {
                layout_type(session, ty)?;
                let inner = session.user(ty)?;
                let offset = builder.place(inner.size, inner.align);
                builder.push(prop.name.clone(), false, offset, ty, false);
                for entry in &inner.map {
                    builder.push(
                        format!("{}.{}", prop.name, entry.name),
                        entry.expand,
                        offset + entry.offset,
                        entry.ty,
                        entry.is_array,
                    );
                }
            }
        }
    }

    if let Some(method) = methods
        .iter()
        .find(|m| builder.map.iter().any(|entry| entry.name == m.name))
    {
        return Err(CompileError::program(
            ErrorCode::E2010,
            file.as_str(),
            method.line,
            format!("method `{}` redeclares an inherited field", method.name),
        ));
    }

    if !is_class {
        builder.size = align_to(builder.size, builder.align);
    }

    let defn = session.user_mut(id)?;
    defn.size = builder.size;
    defn.align = builder.align;
    defn.set_map(builder.map);
    defn.flags.insert(DefnFlags::LAID_OUT);
    tracing::debug!(
        type_name = %defn.name,
        size = defn.size,
        align = defn.align,
        entries = defn.map.len(),
        "laid out"
    );
    Ok(())
}

/// The nearest class from `next` up the base chain with a method `name`.
fn inherited_method(
    session: &Session,
    mut next: Option<TypeId>,
    name: &str,
) -> CompileResult<Option<String>> {
    while let Some(id) = next {
        let defn = session.user(id)?;
        if defn.methods.iter().any(|m| m.name == name) {
            return Ok(Some(defn.name.clone()));
        }
        next = defn.base();
    }
    Ok(None)
}
