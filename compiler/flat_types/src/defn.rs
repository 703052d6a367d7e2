//! Type definitions: primitives and user structs/classes.

use std::fmt;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{DefnFlags, PrimDefn, TypeId};

/// Parameter names of a method, excluding the leading `SELF`.
pub type Signature = SmallVec<[String; 4]>;

/// Field qualifier.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Qual {
    #[default]
    None,
    Atomic,
    Synchronic,
}

impl Qual {
    /// Parse the suffix keyword of a field type (`int32.atomic`).
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "atomic" => Some(Qual::Atomic),
            "synchronic" => Some(Qual::Synchronic),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Qual::None => "",
            Qual::Atomic => "atomic",
            Qual::Synchronic => "synchronic",
        }
    }
}

/// A declared field.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Prop {
    pub name: String,
    pub qual: Qual,
    pub is_array: bool,
    /// Type name as written.
    pub type_name: String,
    /// Set by resolution.
    pub type_ref: Option<TypeId>,
    pub line: u32,
}

impl Prop {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, line: u32) -> Self {
        Prop {
            name: name.into(),
            qual: Qual::None,
            is_array: false,
            type_name: type_name.into(),
            type_ref: None,
            line,
        }
    }

    #[must_use]
    pub fn with_qual(mut self, qual: Qual) -> Self {
        self.qual = qual;
        self
    }

    #[must_use]
    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MethodKind {
    Virtual,
    NonVirtual,
    Get,
    Set,
}

/// A declared method. The body is the raw text between the braces.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Method {
    pub kind: MethodKind,
    /// Empty for getters and setters.
    pub name: String,
    pub signature: Signature,
    pub body: String,
    /// Line of the opening brace.
    pub line: u32,
}

/// One addressable entry in a type's field map.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MapEntry {
    /// Field path; dotted for fields reached through embedded structs.
    pub name: String,
    /// A directly addressable primitive or pointer slot. `false` marks the
    /// pass-through entry of an embedded struct.
    pub expand: bool,
    /// Byte offset from the start of the containing instance.
    pub offset: u32,
    /// Field type; the element type for arrays.
    pub ty: TypeId,
    /// The slot holds a pointer to an array of `ty`.
    pub is_array: bool,
}

/// Dispatch table of one virtual method as seen from one class.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Virtual {
    pub name: String,
    pub signature: Signature,
    /// Implementation name to the class ids dispatching to it, in discovery
    /// order.
    pub reverse_cases: Vec<(String, Vec<u32>)>,
    /// Implementation for ids not listed; `None` fails at runtime.
    pub default: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct StructInfo {
    pub has_get_method: bool,
    pub has_set_method: bool,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct ClassInfo {
    pub base_name: Option<String>,
    pub base: Option<TypeId>,
    /// Ancestor-qualified name, `Base>Mid>Leaf`.
    pub class_name: String,
    pub class_id: u32,
    /// Direct subclasses in registration order.
    pub subclasses: Vec<TypeId>,
    pub vtable: Vec<Virtual>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum UserKind {
    Struct(StructInfo),
    Class(ClassInfo),
}

/// A user-defined struct or class.
#[derive(Clone, Debug)]
pub struct UserDefn {
    pub name: String,
    pub file: String,
    pub line: u32,
    pub props: Vec<Prop>,
    pub methods: Vec<Method>,
    /// Byte offset in the file's residual text where generated code goes.
    pub origin: usize,
    /// Field map in layout order. Populated by layout.
    pub map: Vec<MapEntry>,
    map_index: FxHashMap<String, usize>,
    pub size: u32,
    pub align: u32,
    pub flags: DefnFlags,
    pub kind: UserKind,
}

impl UserDefn {
    fn new(name: String, file: String, line: u32, kind: UserKind) -> Self {
        UserDefn {
            name,
            file,
            line,
            props: Vec::new(),
            methods: Vec::new(),
            origin: 0,
            map: Vec::new(),
            map_index: FxHashMap::default(),
            size: 0,
            align: 1,
            flags: DefnFlags::empty(),
            kind,
        }
    }

    pub fn new_struct(name: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self::new(
            name.into(),
            file.into(),
            line,
            UserKind::Struct(StructInfo::default()),
        )
    }

    pub fn new_class(
        name: impl Into<String>,
        base_name: Option<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        Self::new(
            name.into(),
            file.into(),
            line,
            UserKind::Class(ClassInfo {
                base_name,
                ..ClassInfo::default()
            }),
        )
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, UserKind::Class(_))
    }

    pub fn class(&self) -> Option<&ClassInfo> {
        match &self.kind {
            UserKind::Class(info) => Some(info),
            UserKind::Struct(_) => None,
        }
    }

    pub fn class_mut(&mut self) -> Option<&mut ClassInfo> {
        match &mut self.kind {
            UserKind::Class(info) => Some(info),
            UserKind::Struct(_) => None,
        }
    }

    pub fn struct_info(&self) -> Option<&StructInfo> {
        match &self.kind {
            UserKind::Struct(info) => Some(info),
            UserKind::Class(_) => None,
        }
    }

    /// Base class, once resolved.
    pub fn base(&self) -> Option<TypeId> {
        self.class().and_then(|info| info.base)
    }

    /// Add a method, keeping the struct getter/setter flags current.
    pub fn add_method(&mut self, method: Method) {
        if let UserKind::Struct(info) = &mut self.kind {
            match method.kind {
                MethodKind::Get => info.has_get_method = true,
                MethodKind::Set => info.has_set_method = true,
                MethodKind::Virtual | MethodKind::NonVirtual => {}
            }
        }
        self.methods.push(method);
    }

    /// Whether a field or named method called `name` is already declared.
    pub fn has_member(&self, name: &str) -> bool {
        self.props.iter().any(|p| p.name == name)
            || self.methods.iter().any(|m| !m.name.is_empty() && m.name == name)
    }

    /// A named (virtual or non-virtual) method declared in this type.
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.name == name && matches!(m.kind, MethodKind::Virtual | MethodKind::NonVirtual))
    }

    pub fn declares_virtual(&self, name: &str) -> bool {
        self.method(name)
            .is_some_and(|m| m.kind == MethodKind::Virtual)
    }

    /// Field map entry for a (possibly dotted) path.
    pub fn entry(&self, path: &str) -> Option<&MapEntry> {
        self.map_index.get(path).map(|&i| &self.map[i])
    }

    pub(crate) fn set_map(&mut self, map: Vec<MapEntry>) {
        self.map_index = map
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.name.clone(), i))
            .collect();
        self.map = map;
    }
}

/// Coarse classification of a definition.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DefnKind {
    Primitive,
    Struct,
    Class,
}

impl fmt::Display for DefnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DefnKind::Primitive => "primitive",
            DefnKind::Struct => "struct",
            DefnKind::Class => "class",
        })
    }
}

/// Any type known to the session.
#[derive(Clone, Debug)]
pub enum Defn {
    Primitive(PrimDefn),
    User(UserDefn),
}

impl Defn {
    pub fn name(&self) -> &str {
        match self {
            Defn::Primitive(prim) => &prim.name,
            Defn::User(user) => &user.name,
        }
    }

    pub fn kind(&self) -> DefnKind {
        match self {
            Defn::Primitive(_) => DefnKind::Primitive,
            Defn::User(user) if user.is_class() => DefnKind::Class,
            Defn::User(_) => DefnKind::Struct,
        }
    }

    pub fn size(&self) -> u32 {
        match self {
            Defn::Primitive(prim) => prim.size,
            Defn::User(user) => user.size,
        }
    }

    pub fn align(&self) -> u32 {
        match self {
            Defn::Primitive(prim) => prim.align,
            Defn::User(user) => user.align,
        }
    }

    pub fn as_prim(&self) -> Option<&PrimDefn> {
        match self {
            Defn::Primitive(prim) => Some(prim),
            Defn::User(_) => None,
        }
    }

    pub fn as_user(&self) -> Option<&UserDefn> {
        match self {
            Defn::User(user) => Some(user),
            Defn::Primitive(_) => None,
        }
    }

    pub(crate) fn as_user_mut(&mut self) -> Option<&mut UserDefn> {
        match self {
            Defn::User(user) => Some(user),
            Defn::Primitive(_) => None,
        }
    }
}
