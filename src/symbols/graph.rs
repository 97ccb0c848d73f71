use std::borrow::Cow;
use std::collections::{HashSet, VecDeque};

use crate::diagnostics::Span;
use crate::error::{Error, Result};

use super::{
    Attribute, MemberId, MemberKind, MemberSymbol, SymbolModel, TypeId, TypeKind, TypeSymbol,
};

/// Immutable in-memory symbol graph with precomputed interface closures.
#[derive(Clone, Debug)]
pub struct SymbolGraph {
    types: Vec<TypeSymbol>,
    members: Vec<MemberSymbol>,
    interface_closures: Vec<Vec<TypeId>>,
}

impl SymbolGraph {
    #[must_use]
    pub fn type_symbol(&self, ty: TypeId) -> &TypeSymbol {
        &self.types[ty.index()]
    }

    #[must_use]
    pub fn member(&self, member: MemberId) -> &MemberSymbol {
        &self.members[member.index()]
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeSymbol> {
        self.types.iter()
    }

    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Look up a type by namespace-qualified name. Returns the first match;
    /// qualified names are not identities and may repeat.
    #[must_use]
    pub fn find_type(&self, qualified_name: &str) -> Option<TypeId> {
        self.types
            .iter()
            .find(|ty| ty.qualified_name() == qualified_name)
            .map(|ty| ty.id)
    }

    /// Find a method or property declared on `ty` by name.
    #[must_use]
    pub fn find_member(&self, ty: TypeId, name: &str) -> Option<MemberId> {
        self.type_symbol(ty)
            .members
            .iter()
            .copied()
            .find(|id| self.member(*id).name == name)
    }

    /// `ty` followed by its base classes, nearest first.
    fn base_chain(&self, ty: TypeId) -> impl Iterator<Item = &TypeSymbol> {
        std::iter::successors(Some(self.type_symbol(ty)), |current| {
            current.base.map(|base| self.type_symbol(base))
        })
    }

    fn explicit_implementation(&self, ty: &TypeSymbol, target: MemberId) -> Option<MemberId> {
        ty.members
            .iter()
            .flat_map(|id| {
                let member = self.member(*id);
                std::iter::once(member).chain(member.accessors.iter().map(|a| self.member(*a)))
            })
            .find(|member| member.explicit_implementations.contains(&target))
            .map(|member| member.id)
    }

    fn implicit_implementation(&self, ty: &TypeSymbol, target: &MemberSymbol) -> Option<MemberId> {
        ty.members
            .iter()
            .map(|id| self.member(*id))
            .find(|member| {
                member.is_public
                    && member.is_static == target.is_static
                    && member.kind == target.kind
                    && member.name == target.name
                    && member.signature == target.signature
            })
            .map(|member| member.id)
    }
}

impl SymbolModel for SymbolGraph {
    fn declared_types(&self) -> Vec<TypeId> {
        self.types
            .iter()
            .filter(|ty| ty.kind.is_concrete())
            .map(|ty| ty.id)
            .collect()
    }

    fn type_kind(&self, ty: TypeId) -> TypeKind {
        self.type_symbol(ty).kind
    }

    fn type_name(&self, ty: TypeId) -> &str {
        &self.type_symbol(ty).name
    }

    fn qualified_type_name(&self, ty: TypeId) -> Cow<'_, str> {
        let symbol = self.type_symbol(ty);
        match &symbol.namespace {
            Some(_) => Cow::Owned(symbol.qualified_name()),
            None => Cow::Borrowed(&symbol.name),
        }
    }

    fn type_span(&self, ty: TypeId) -> Option<Span> {
        self.type_symbol(ty).span
    }

    fn member_name(&self, member: MemberId) -> &str {
        &self.member(member).name
    }

    fn member_span(&self, member: MemberId) -> Option<Span> {
        self.member(member).span
    }

    fn transitive_interfaces(&self, ty: TypeId) -> &[TypeId] {
        &self.interface_closures[ty.index()]
    }

    fn members_of(&self, interface: TypeId) -> &[MemberId] {
        let symbol = self.type_symbol(interface);
        if symbol.kind.is_interface() {
            &symbol.members
        } else {
            &[]
        }
    }

    fn resolve_implementation(&self, ty: TypeId, interface_member: MemberId) -> Option<MemberId> {
        let target = self.member(interface_member);
        if !self.type_kind(target.containing_type).is_interface() || self.type_kind(ty).is_interface()
        {
            return None;
        }
        self.base_chain(ty).find_map(|current| {
            self.explicit_implementation(current, interface_member)
                .or_else(|| self.implicit_implementation(current, target))
        })
    }

    fn attributes_of(&self, member: MemberId) -> &[Attribute] {
        &self.member(member).attributes
    }

    fn owning_property_of(&self, member: MemberId) -> Option<MemberId> {
        self.member(member).property
    }
}

/// Declaration of a type for [`SymbolGraphBuilder::add_type`].
#[derive(Clone, Debug)]
pub struct TypeDecl {
    name: String,
    namespace: Option<String>,
    kind: TypeKind,
    span: Option<Span>,
}

impl TypeDecl {
    #[must_use]
    pub fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            kind,
            span: None,
        }
    }

    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Class, name)
    }

    #[must_use]
    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Struct, name)
    }

    #[must_use]
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Interface, name)
    }

    #[must_use]
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

#[derive(Clone, Debug)]
pub struct AccessorDecl {
    kind: MemberKind,
    is_public: bool,
    span: Option<Span>,
    attributes: Vec<Attribute>,
}

impl AccessorDecl {
    #[must_use]
    pub fn get() -> Self {
        Self::new(MemberKind::Getter)
    }

    #[must_use]
    pub fn set() -> Self {
        Self::new(MemberKind::Setter)
    }

    fn new(kind: MemberKind) -> Self {
        Self {
            kind,
            is_public: true,
            span: None,
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    #[must_use]
    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// Declaration of a method or property for [`SymbolGraphBuilder::add_member`].
#[derive(Clone, Debug)]
pub struct MemberDecl {
    name: String,
    kind: MemberKind,
    signature: String,
    is_static: bool,
    is_public: bool,
    span: Option<Span>,
    attributes: Vec<Attribute>,
    accessors: Vec<AccessorDecl>,
}

impl MemberDecl {
    #[must_use]
    pub fn method(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self::new(MemberKind::Method, name, signature)
    }

    #[must_use]
    pub fn property(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(MemberKind::Property, name, ty)
    }

    fn new(kind: MemberKind, name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            signature: signature.into(),
            is_static: false,
            is_public: true,
            span: None,
            attributes: Vec::new(),
            accessors: Vec::new(),
        }
    }

    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    #[must_use]
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[must_use]
    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add an accessor. Ignored for methods.
    #[must_use]
    pub fn with_accessor(mut self, accessor: AccessorDecl) -> Self {
        self.accessors.push(accessor);
        self
    }
}

/// Handles are only distinct below `limit`.
fn ensure_capacity(what: &str, count: usize, limit: usize) -> Result<()> {
    if count > limit {
        return Err(Error::symbols(format!(
            "program declares {count} {what}; at most {limit} are supported"
        )));
    }
    Ok(())
}

/// Mutable staging area for a [`SymbolGraph`].
#[derive(Debug, Default)]
pub struct SymbolGraphBuilder {
    types: Vec<TypeSymbol>,
    members: Vec<MemberSymbol>,
}

impl SymbolGraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type(&mut self, decl: TypeDecl) -> TypeId {
        let id = TypeId::from_index(self.types.len());
        self.types.push(TypeSymbol {
            id,
            name: decl.name,
            namespace: decl.namespace,
            kind: decl.kind,
            span: decl.span,
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
        });
        id
    }

    pub fn set_base(&mut self, ty: TypeId, base: TypeId) {
        self.types[ty.index()].base = Some(base);
    }

    /// Record that `ty` lists `interface` in its declaration. Duplicates are
    /// kept as written; the closure deduplicates.
    pub fn implement(&mut self, ty: TypeId, interface: TypeId) {
        self.types[ty.index()].interfaces.push(interface);
    }

    pub fn add_member(&mut self, owner: TypeId, decl: MemberDecl) -> MemberId {
        let id = self.push_member(MemberSymbol {
            id: MemberId::from_index(self.members.len()),
            name: decl.name.clone(),
            kind: decl.kind,
            containing_type: owner,
            signature: decl.signature.clone(),
            is_static: decl.is_static,
            is_public: decl.is_public,
            span: decl.span,
            attributes: decl.attributes,
            property: None,
            accessors: Vec::new(),
            explicit_implementations: Vec::new(),
        });
        self.types[owner.index()].members.push(id);

        if decl.kind == MemberKind::Property {
            for accessor in decl.accessors {
                let prefix = match accessor.kind {
                    MemberKind::Setter => "set",
                    _ => "get",
                };
                let accessor_id = self.push_member(MemberSymbol {
                    id: MemberId::from_index(self.members.len()),
                    name: format!("{prefix}_{}", decl.name),
                    kind: accessor.kind,
                    containing_type: owner,
                    signature: decl.signature.clone(),
                    is_static: decl.is_static,
                    is_public: decl.is_public && accessor.is_public,
                    span: accessor.span.or(decl.span),
                    attributes: accessor.attributes,
                    property: Some(id),
                    accessors: Vec::new(),
                    explicit_implementations: Vec::new(),
                });
                self.members[id.index()].accessors.push(accessor_id);
            }
        }
        id
    }

    fn push_member(&mut self, member: MemberSymbol) -> MemberId {
        let id = member.id;
        self.members.push(member);
        id
    }

    pub fn add_attribute(&mut self, member: MemberId, attribute: Attribute) {
        self.members[member.index()].attributes.push(attribute);
    }

    /// Record `member` as an explicit implementation of `interface_member`.
    pub fn add_explicit_implementation(&mut self, member: MemberId, interface_member: MemberId) {
        self.members[member.index()]
            .explicit_implementations
            .push(interface_member);
    }

    #[must_use]
    pub fn accessors_of(&self, property: MemberId) -> &[MemberId] {
        &self.members[property.index()].accessors
    }

    /// Find a method or property on `ty` by name and, optionally, signature.
    #[must_use]
    pub fn find_member(&self, ty: TypeId, name: &str, signature: Option<&str>) -> Option<MemberId> {
        self.types[ty.index()].members.iter().copied().find(|id| {
            let member = &self.members[id.index()];
            member.name == name && signature.is_none_or(|sig| member.signature == sig)
        })
    }

    /// Validate the staged declarations and freeze them into a graph.
    ///
    /// # Errors
    /// Returns [`Error::Symbols`] when a type lists a non-interface as an
    /// interface, has an invalid base type, sits on a cyclic base chain, or
    /// a member explicitly implements something that is not an interface
    /// member. Programs with more types or members than handles can
    /// represent are rejected too.
    pub fn finish(self) -> Result<SymbolGraph> {
        ensure_capacity("types", self.types.len(), TypeId::CAPACITY)?;
        ensure_capacity("members", self.members.len(), MemberId::CAPACITY)?;
        self.validate()?;
        let closures = (0..self.types.len())
            .map(|index| self.interface_closure(TypeId::from_index(index)))
            .collect();
        let graph = SymbolGraph {
            types: self.types,
            members: self.members,
            interface_closures: closures,
        };
        tracing::debug!(
            target: "symbols",
            stage = "symbols.finish",
            types = graph.types.len(),
            members = graph.members.len(),
        );
        Ok(graph)
    }

    fn validate(&self) -> Result<()> {
        for ty in &self.types {
            for interface in &ty.interfaces {
                let listed = &self.types[interface.index()];
                if !listed.kind.is_interface() {
                    return Err(Error::symbols(format!(
                        "{} `{}` lists {} `{}` as an interface",
                        ty.kind.as_str(),
                        ty.qualified_name(),
                        listed.kind.as_str(),
                        listed.qualified_name()
                    )));
                }
            }
            if let Some(base) = ty.base {
                let base_symbol = &self.types[base.index()];
                if ty.kind != TypeKind::Class || base_symbol.kind != TypeKind::Class {
                    return Err(Error::symbols(format!(
                        "{} `{}` cannot derive from {} `{}`",
                        ty.kind.as_str(),
                        ty.qualified_name(),
                        base_symbol.kind.as_str(),
                        base_symbol.qualified_name()
                    )));
                }
            }
            self.check_base_chain(ty)?;
        }
        for member in &self.members {
            for target in &member.explicit_implementations {
                let target_symbol = &self.members[target.index()];
                let owner = &self.types[target_symbol.containing_type.index()];
                if !owner.kind.is_interface() {
                    return Err(Error::symbols(format!(
                        "`{}` explicitly implements `{}.{}`, which is not an interface member",
                        member.name,
                        owner.qualified_name(),
                        target_symbol.name
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_base_chain(&self, ty: &TypeSymbol) -> Result<()> {
        let mut seen = HashSet::from([ty.id]);
        let mut cursor = ty.base;
        while let Some(base) = cursor {
            if !seen.insert(base) {
                return Err(Error::symbols(format!(
                    "base class chain of `{}` is cyclic",
                    ty.qualified_name()
                )));
            }
            cursor = self.types[base.index()].base;
        }
        Ok(())
    }

    /// Breadth-first interface closure over the type, its base classes and
    /// interface inheritance. First-seen order, no duplicates, never
    /// contains `ty` itself.
    fn interface_closure(&self, ty: TypeId) -> Vec<TypeId> {
        let mut queue: VecDeque<TypeId> = VecDeque::new();
        let mut cursor = Some(ty);
        while let Some(current) = cursor {
            let symbol = &self.types[current.index()];
            queue.extend(symbol.interfaces.iter().copied());
            cursor = symbol.base;
        }

        let mut visited = HashSet::new();
        let mut closure = Vec::new();
        while let Some(current) = queue.pop_front() {
            if current == ty {
                tracing::warn!(
                    target: "symbols",
                    "interface `{}` inherits from itself",
                    self.types[ty.index()].qualified_name()
                );
                continue;
            }
            if !visited.insert(current) {
                continue;
            }
            closure.push(current);
            queue.extend(self.types[current.index()].interfaces.iter().copied());
        }
        closure
    }
}
