use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Deserialize;

use crate::diagnostics::{FileCache, FileId, Span};
use crate::error::{Error, Result};

use super::graph::{AccessorDecl, MemberDecl, SymbolGraph, SymbolGraphBuilder, TypeDecl};
use super::{Attribute, MemberId, MetadataName, TypeId, TypeKind};

/// Serialization of a symbol-graph document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a file extension (`.json`, `.yaml`, `.yml`).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// A symbol graph plus the source files its spans point into.
#[derive(Debug)]
pub struct LoadedProgram {
    pub graph: SymbolGraph,
    pub files: FileCache,
}

/// Load a symbol-graph document from disk.
///
/// Sources omitted from the document are read relative to the document's
/// directory. A source that cannot be read is logged and left empty;
/// diagnostics pointing into it are still reported, without snippets.
///
/// # Errors
/// Returns [`Error::Io`] when the document cannot be read and
/// [`Error::Symbols`] when it is malformed or inconsistent.
pub fn load_program(path: &Path) -> Result<LoadedProgram> {
    let started = Instant::now();
    let format = DocumentFormat::from_path(path).ok_or_else(|| {
        Error::symbols("unsupported document extension (expected .json, .yaml or .yml)")
            .in_document(path)
    })?;
    let text = fs::read_to_string(path)?;
    let program = parse_program(&text, format, path.parent()).map_err(|err| err.in_document(path))?;
    tracing::info!(
        target: "symbols",
        stage = "symbols.load",
        path = %path.display(),
        types = program.graph.type_count(),
        files = program.files.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
    );
    Ok(program)
}

/// Parse a symbol-graph document held in memory. `base_dir` anchors
/// relative source paths; without it, sources must be inline.
///
/// # Errors
/// Returns [`Error::Symbols`] when the document is malformed or refers to
/// unknown types, members or files.
pub fn parse_program(
    text: &str,
    format: DocumentFormat,
    base_dir: Option<&Path>,
) -> Result<LoadedProgram> {
    let raw: RawDocument = match format {
        DocumentFormat::Json => serde_json::from_str(text)
            .map_err(|err| Error::symbols(format!("failed to parse JSON: {err}")))?,
        DocumentFormat::Yaml => serde_yaml::from_str(text)
            .map_err(|err| Error::symbols(format!("failed to parse YAML: {err}")))?,
    };
    let files = load_files(&raw.files, base_dir);
    let graph = DocumentLowering::new(files.len()).lower(&raw.types)?;
    Ok(LoadedProgram { graph, files })
}

fn load_files(raw: &[RawFile], base_dir: Option<&Path>) -> FileCache {
    let mut files = FileCache::default();
    for file in raw {
        let source = match &file.source {
            Some(source) => source.clone(),
            None => read_source(&file.path, base_dir),
        };
        files.add_file(file.path.clone(), source);
    }
    files
}

fn read_source(path: &Path, base_dir: Option<&Path>) -> String {
    let resolved = match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    };
    fs::read_to_string(&resolved).unwrap_or_else(|err| {
        tracing::warn!(
            target: "symbols",
            "could not read source `{}`: {err}",
            resolved.display()
        );
        String::new()
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    #[serde(default)]
    files: Vec<RawFile>,
    #[serde(default)]
    types: Vec<RawType>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFile {
    path: PathBuf,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawType {
    key: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    namespace: Option<String>,
    kind: RawTypeKind,
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    interfaces: Vec<String>,
    #[serde(default)]
    span: Option<RawSpan>,
    #[serde(default)]
    members: Vec<RawMember>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawTypeKind {
    Class,
    Struct,
    Interface,
}

impl From<RawTypeKind> for TypeKind {
    fn from(kind: RawTypeKind) -> Self {
        match kind {
            RawTypeKind::Class => TypeKind::Class,
            RawTypeKind::Struct => TypeKind::Struct,
            RawTypeKind::Interface => TypeKind::Interface,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSpan {
    file: usize,
    start: usize,
    end: usize,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMember {
    name: String,
    kind: RawMemberKind,
    #[serde(default)]
    signature: String,
    #[serde(default, rename = "static")]
    is_static: bool,
    #[serde(default = "default_public")]
    public: bool,
    #[serde(default)]
    span: Option<RawSpan>,
    #[serde(default)]
    attributes: Vec<RawAttribute>,
    #[serde(default)]
    accessors: Vec<RawAccessor>,
    #[serde(default)]
    implements: Vec<RawMemberRef>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawMemberKind {
    Method,
    Property,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAttribute {
    class: String,
    #[serde(default)]
    arguments: Vec<String>,
    #[serde(default)]
    span: Option<RawSpan>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAccessor {
    Short(RawAccessorKind),
    Detailed(RawAccessorDetail),
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawAccessorKind {
    Get,
    Set,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAccessorDetail {
    kind: RawAccessorKind,
    #[serde(default = "default_public")]
    public: bool,
    #[serde(default)]
    span: Option<RawSpan>,
    #[serde(default)]
    attributes: Vec<RawAttribute>,
    #[serde(default)]
    implements: Vec<RawMemberRef>,
}

/// `Type.Key::Member`, or a table naming the overload by signature.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMemberRef {
    Path(String),
    Detailed { member: String, signature: String },
}

fn default_public() -> bool {
    true
}

/// Lowers raw document records into a [`SymbolGraph`] in four passes:
/// types, inheritance, members, explicit implementations.
struct DocumentLowering<'doc> {
    builder: SymbolGraphBuilder,
    file_count: usize,
    keys: HashMap<&'doc str, TypeId>,
}

impl<'doc> DocumentLowering<'doc> {
    fn new(file_count: usize) -> Self {
        Self {
            builder: SymbolGraphBuilder::new(),
            file_count,
            keys: HashMap::new(),
        }
    }

    fn lower(mut self, types: &'doc [RawType]) -> Result<SymbolGraph> {
        let mut ids = Vec::with_capacity(types.len());
        for raw in types {
            ids.push(self.declare_type(raw)?);
        }
        for (raw, &id) in types.iter().zip(&ids) {
            if let Some(base) = &raw.base {
                let base = self.type_key(base, &raw.key)?;
                self.builder.set_base(id, base);
            }
            for interface in &raw.interfaces {
                let interface = self.type_key(interface, &raw.key)?;
                self.builder.implement(id, interface);
            }
        }

        let mut pending = Vec::new();
        for (raw, &id) in types.iter().zip(&ids) {
            for member in &raw.members {
                self.declare_member(id, raw, member, &mut pending)?;
            }
        }
        for (member, reference, owner) in pending {
            let target = self.member_ref(reference, owner)?;
            self.builder.add_explicit_implementation(member, target);
        }
        self.builder.finish()
    }

    fn declare_type(&mut self, raw: &'doc RawType) -> Result<TypeId> {
        if self.keys.contains_key(raw.key.as_str()) {
            return Err(Error::symbols(format!("duplicate type key `{}`", raw.key)));
        }
        let (namespace, name) = match &raw.name {
            Some(name) => (raw.namespace.clone(), name.clone()),
            None => match raw.key.rsplit_once('.') {
                Some((namespace, name)) => (
                    raw.namespace.clone().or_else(|| Some(namespace.to_string())),
                    name.to_string(),
                ),
                None => (raw.namespace.clone(), raw.key.clone()),
            },
        };
        let mut decl = TypeDecl::new(raw.kind.into(), name);
        if let Some(namespace) = namespace {
            decl = decl.in_namespace(namespace);
        }
        if let Some(span) = self.span(raw.span.as_ref(), &raw.key)? {
            decl = decl.at(span);
        }
        let id = self.builder.add_type(decl);
        self.keys.insert(&raw.key, id);
        Ok(id)
    }

    fn declare_member(
        &mut self,
        owner: TypeId,
        owner_raw: &'doc RawType,
        raw: &'doc RawMember,
        pending: &mut Vec<(MemberId, &'doc RawMemberRef, &'doc str)>,
    ) -> Result<()> {
        let context = format!("{}::{}", owner_raw.key, raw.name);
        let mut decl = match raw.kind {
            RawMemberKind::Method => MemberDecl::method(&raw.name, &raw.signature),
            RawMemberKind::Property => MemberDecl::property(&raw.name, &raw.signature),
        };
        if raw.is_static {
            decl = decl.as_static();
        }
        if !raw.public {
            decl = decl.private();
        }
        if let Some(span) = self.span(raw.span.as_ref(), &context)? {
            decl = decl.at(span);
        }
        for attribute in &raw.attributes {
            decl = decl.with_attribute(self.attribute(attribute, &context)?);
        }
        if matches!(raw.kind, RawMemberKind::Method) && !raw.accessors.is_empty() {
            return Err(Error::symbols(format!(
                "method `{context}` cannot declare accessors"
            )));
        }
        for accessor in &raw.accessors {
            decl = decl.with_accessor(self.accessor(accessor, &context)?);
        }

        let id = self.builder.add_member(owner, decl);
        for reference in &raw.implements {
            pending.push((id, reference, owner_raw.key.as_str()));
        }
        let accessor_ids = self.builder.accessors_of(id).to_vec();
        for (accessor, accessor_id) in raw.accessors.iter().zip(accessor_ids) {
            if let RawAccessor::Detailed(detail) = accessor {
                for reference in &detail.implements {
                    pending.push((accessor_id, reference, owner_raw.key.as_str()));
                }
            }
        }
        Ok(())
    }

    fn accessor(&self, raw: &RawAccessor, context: &str) -> Result<AccessorDecl> {
        let new = |kind| match kind {
            RawAccessorKind::Get => AccessorDecl::get(),
            RawAccessorKind::Set => AccessorDecl::set(),
        };
        match raw {
            RawAccessor::Short(kind) => Ok(new(*kind)),
            RawAccessor::Detailed(detail) => {
                let mut decl = new(detail.kind);
                if !detail.public {
                    decl = decl.private();
                }
                if let Some(span) = self.span(detail.span.as_ref(), context)? {
                    decl = decl.at(span);
                }
                for attribute in &detail.attributes {
                    decl = decl.with_attribute(self.attribute(attribute, context)?);
                }
                Ok(decl)
            }
        }
    }

    fn attribute(&self, raw: &RawAttribute, context: &str) -> Result<Attribute> {
        let arguments = raw
            .arguments
            .iter()
            .map(|key| self.type_key(key, context))
            .collect::<Result<Vec<_>>>()?;
        let mut attribute = Attribute::new(MetadataName::parse(&raw.class), arguments);
        if let Some(span) = self.span(raw.span.as_ref(), context)? {
            attribute = attribute.with_span(span);
        }
        Ok(attribute)
    }

    fn type_key(&self, key: &str, context: &str) -> Result<TypeId> {
        self.keys.get(key).copied().ok_or_else(|| {
            Error::symbols(format!("unknown type `{key}` referenced by `{context}`"))
        })
    }

    fn member_ref(&self, reference: &RawMemberRef, context: &str) -> Result<MemberId> {
        let (path, signature) = match reference {
            RawMemberRef::Path(path) => (path.as_str(), None),
            RawMemberRef::Detailed { member, signature } => {
                (member.as_str(), Some(signature.as_str()))
            }
        };
        let Some((key, name)) = path.rsplit_once("::") else {
            return Err(Error::symbols(format!(
                "member reference `{path}` in `{context}` must look like `Type::Member`"
            )));
        };
        let ty = self.type_key(key, context)?;
        self.builder
            .find_member(ty, name, signature)
            .ok_or_else(|| {
                Error::symbols(format!(
                    "unknown member `{path}` referenced by `{context}`"
                ))
            })
    }

    fn span(&self, raw: Option<&RawSpan>, context: &str) -> Result<Option<Span>> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        if raw.file >= self.file_count {
            return Err(Error::symbols(format!(
                "span of `{context}` points at file #{} but only {} files are declared",
                raw.file, self.file_count
            )));
        }
        if raw.start > raw.end {
            return Err(Error::symbols(format!(
                "span of `{context}` ends before it starts"
            )));
        }
        Ok(Some(Span::in_file(FileId(raw.file), raw.start, raw.end)))
    }
}
