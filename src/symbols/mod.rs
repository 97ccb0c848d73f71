//! Resolved program symbols: the read-only model the checker runs against.
//!
//! A host front end owns parsing and name resolution. It hands the checker a
//! [`SymbolModel`], either its own implementation or the in-memory
//! [`SymbolGraph`] built through [`SymbolGraphBuilder`] or loaded from a
//! serialized document.

mod graph;
mod loader;

use std::borrow::Cow;
use std::fmt;

use crate::diagnostics::Span;

pub use graph::{AccessorDecl, MemberDecl, SymbolGraph, SymbolGraphBuilder, TypeDecl};
pub use loader::{DocumentFormat, LoadedProgram, load_program, parse_program};

/// Identity handle for a type. Two handles are the same type iff they are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

/// Identity handle for a member (method, property or accessor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(u32);

macro_rules! arena_index {
    ($name:ident) => {
        impl $name {
            /// Number of distinct handles this type can represent.
            pub(crate) const CAPACITY: usize = u32::MAX as usize;

            /// Handles past [`Self::CAPACITY`] all map to the last slot;
            /// [`SymbolGraphBuilder::finish`] rejects such graphs.
            pub(crate) fn from_index(index: usize) -> Self {
                Self(u32::try_from(index).unwrap_or(u32::MAX))
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_index!(TypeId);
arena_index!(MemberId);

/// Namespace-qualified metadata name without generic arity.
///
/// `ImplAttribute`1` through `ImplAttribute`4` all share one `MetadataName`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MetadataName {
    namespace: Option<String>,
    name: String,
}

impl MetadataName {
    #[must_use]
    pub fn new(namespace: Option<&str>, name: &str) -> Self {
        Self {
            namespace: namespace
                .map(str::trim)
                .filter(|ns| !ns.is_empty())
                .map(str::to_string),
            name: strip_arity(name.trim()).to_string(),
        }
    }

    /// Parse `Some.Namespace.Name`, `Name`1` or `Name<T1, T2>` spellings.
    #[must_use]
    pub fn parse(qualified: &str) -> Self {
        let unparameterized = strip_arity(qualified.trim());
        match unparameterized.rsplit_once('.') {
            Some((namespace, name)) => Self::new(Some(namespace), name),
            None => Self::new(None, unparameterized),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

fn strip_arity(name: &str) -> &str {
    let end = name.find(['`', '<']).unwrap_or(name.len());
    name[..end].trim_end()
}

impl fmt::Display for MetadataName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{namespace}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
}

impl TypeKind {
    #[must_use]
    pub fn is_interface(self) -> bool {
        matches!(self, TypeKind::Interface)
    }

    /// Classes and value types are checked; interfaces are not.
    #[must_use]
    pub fn is_concrete(self) -> bool {
        !self.is_interface()
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Method,
    Property,
    Getter,
    Setter,
}

impl MemberKind {
    #[must_use]
    pub fn is_accessor(self) -> bool {
        matches!(self, MemberKind::Getter | MemberKind::Setter)
    }
}

/// An attribute attached to a member. `class` is the unparameterized
/// identity of the attribute type; `type_arguments` are its generic
/// arguments in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub class: MetadataName,
    pub type_arguments: Vec<TypeId>,
    pub span: Option<Span>,
}

impl Attribute {
    #[must_use]
    pub fn new(class: MetadataName, type_arguments: impl IntoIterator<Item = TypeId>) -> Self {
        Self {
            class,
            type_arguments: type_arguments.into_iter().collect(),
            span: None,
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

#[derive(Clone, Debug)]
pub struct TypeSymbol {
    pub id: TypeId,
    pub name: String,
    pub namespace: Option<String>,
    pub kind: TypeKind,
    pub span: Option<Span>,
    pub base: Option<TypeId>,
    /// Interfaces listed directly on the declaration.
    pub interfaces: Vec<TypeId>,
    /// Methods and properties in declaration order. Accessors hang off
    /// their property.
    pub members: Vec<MemberId>,
}

impl TypeSymbol {
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MemberSymbol {
    pub id: MemberId,
    pub name: String,
    pub kind: MemberKind,
    pub containing_type: TypeId,
    /// Canonical signature text supplied by the front end. Only compared
    /// for equality.
    pub signature: String,
    pub is_static: bool,
    pub is_public: bool,
    pub span: Option<Span>,
    pub attributes: Vec<Attribute>,
    /// Owning property, for accessors.
    pub property: Option<MemberId>,
    /// Accessors, for properties.
    pub accessors: Vec<MemberId>,
    /// Interface members this member implements explicitly.
    pub explicit_implementations: Vec<MemberId>,
}

/// Read-only view of a resolved program, as required by the checker.
///
/// Implementations must be shareable across worker threads; the checker
/// never mutates the model.
pub trait SymbolModel: Sync {
    /// Concrete (non-interface) types declared in the program.
    fn declared_types(&self) -> Vec<TypeId>;

    fn type_kind(&self, ty: TypeId) -> TypeKind;

    fn type_name(&self, ty: TypeId) -> &str;

    /// Namespace-qualified name, used to tell apart interfaces that share
    /// a display name.
    fn qualified_type_name(&self, ty: TypeId) -> Cow<'_, str> {
        Cow::Borrowed(self.type_name(ty))
    }

    fn type_span(&self, ty: TypeId) -> Option<Span>;

    fn member_name(&self, member: MemberId) -> &str;

    fn member_span(&self, member: MemberId) -> Option<Span>;

    /// Every interface `ty` implements directly or through other interfaces
    /// or base classes, deduplicated by identity.
    fn transitive_interfaces(&self, ty: TypeId) -> &[TypeId];

    /// Members declared directly on `interface`, in declaration order.
    fn members_of(&self, interface: TypeId) -> &[MemberId];

    /// The member of `ty` that satisfies `interface_member`, if any.
    fn resolve_implementation(&self, ty: TypeId, interface_member: MemberId) -> Option<MemberId>;

    fn attributes_of(&self, member: MemberId) -> &[Attribute];

    /// The property owning `member` when `member` is an accessor.
    fn owning_property_of(&self, member: MemberId) -> Option<MemberId>;
}
