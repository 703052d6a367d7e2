//! Built-in primitive types.

use std::fmt;

/// Extra bytes in front of a synchronic payload (version word and waiter
/// count, 4 bytes each).
pub const SYNCHRONIC_HEADER_SIZE: u32 = 8;

/// How a primitive field is accessed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PrimKind {
    /// Plain typed-array loads and stores.
    Vanilla,
    /// `Atomics.*` operations.
    Atomic,
    /// Runtime synchronic helpers (atomic plus wait/notify).
    Synchronic,
    /// `SIMD.*` vector loads and stores.
    Simd,
}

/// The typed-array view backing a primitive.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Store {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl Store {
    /// Name of the runtime's memory view, e.g. `_mem_int32`.
    pub fn view(self) -> &'static str {
        match self {
            Store::Int8 => "_mem_int8",
            Store::Uint8 => "_mem_uint8",
            Store::Int16 => "_mem_int16",
            Store::Uint16 => "_mem_uint16",
            Store::Int32 => "_mem_int32",
            Store::Uint32 => "_mem_uint32",
            Store::Float32 => "_mem_float32",
            Store::Float64 => "_mem_float64",
        }
    }

    /// Element size in bytes.
    pub fn width(self) -> u32 {
        match self {
            Store::Int8 | Store::Uint8 => 1,
            Store::Int16 | Store::Uint16 => 2,
            Store::Int32 | Store::Uint32 | Store::Float32 => 4,
            Store::Float64 => 8,
        }
    }

    /// log2 of the element size; byte address `>> shift` is the view index.
    pub fn shift(self) -> u32 {
        self.width().trailing_zeros()
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, Store::Float32 | Store::Float64)
    }
}

/// A primitive scalar or vector type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PrimDefn {
    /// Source name (`int32`) or internal name of a qualified variant
    /// (`atomic/int32`), which no identifier can spell.
    pub name: String,
    pub kind: PrimKind,
    pub store: Store,
    pub size: u32,
    pub align: u32,
    /// Payload size. Differs from `size` only for synchronic cells.
    pub base_size: u32,
    /// `SIMD` constructor name for vector kinds, e.g. `Float32x4`.
    pub simd: Option<&'static str>,
}

impl PrimDefn {
    fn scalar(name: &str, store: Store) -> Self {
        PrimDefn {
            name: name.to_string(),
            kind: PrimKind::Vanilla,
            store,
            size: store.width(),
            align: store.width(),
            base_size: store.width(),
            simd: None,
        }
    }

    fn vector(name: &str, store: Store, simd: &'static str) -> Self {
        PrimDefn {
            name: name.to_string(),
            kind: PrimKind::Simd,
            store,
            size: 16,
            align: 16,
            base_size: 16,
            simd: Some(simd),
        }
    }

    /// Integer scalar (any kind). Bitwise operations require this.
    pub fn is_integer(&self) -> bool {
        self.simd.is_none() && self.store.is_integer()
    }

    /// Whether `.atomic` and `.synchronic` may be applied to this type.
    pub fn accepts_qualifier(&self) -> bool {
        self.kind == PrimKind::Vanilla && self.is_integer()
    }

    /// The qualified variant of this vanilla integer type.
    pub(crate) fn qualified(&self, kind: PrimKind) -> Self {
        let (size, align) = match kind {
            PrimKind::Synchronic => (self.size + SYNCHRONIC_HEADER_SIZE, self.align.max(4)),
            _ => (self.size, self.align),
        };
        PrimDefn {
            name: qualified_name(&self.name, kind),
            kind,
            store: self.store,
            size,
            align,
            base_size: self.size,
            simd: None,
        }
    }
}

impl fmt::Display for PrimDefn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Internal table name of a qualified variant.
pub(crate) fn qualified_name(base: &str, kind: PrimKind) -> String {
    match kind {
        PrimKind::Atomic => format!("atomic/{base}"),
        PrimKind::Synchronic => format!("synchronic/{base}"),
        PrimKind::Vanilla | PrimKind::Simd => base.to_string(),
    }
}

/// Every built-in, vanilla types first, then their qualified variants.
pub(crate) fn builtins() -> Vec<PrimDefn> {
    let mut prims = vec![
        PrimDefn::scalar("int8", Store::Int8),
        PrimDefn::scalar("uint8", Store::Uint8),
        PrimDefn::scalar("int16", Store::Int16),
        PrimDefn::scalar("uint16", Store::Uint16),
        PrimDefn::scalar("int32", Store::Int32),
        PrimDefn::scalar("uint32", Store::Uint32),
        PrimDefn::scalar("float32", Store::Float32),
        PrimDefn::scalar("float64", Store::Float64),
        PrimDefn::vector("int32x4", Store::Int32, "Int32x4"),
        PrimDefn::vector("float32x4", Store::Float32, "Float32x4"),
        PrimDefn::vector("float64x2", Store::Float64, "Float64x2"),
    ];
    let qualified: Vec<_> = prims
        .iter()
        .filter(|p| p.accepts_qualifier())
        .flat_map(|p| [p.qualified(PrimKind::Atomic), p.qualified(PrimKind::Synchronic)])
        .collect();
    prims.extend(qualified);
    prims
}
