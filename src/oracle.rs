//! Type-System Oracle
//!
//! The resolvers never inspect types themselves; they ask a [`TypeOracle`]. The trait is
//! the injection seam (tests can substitute their own), and [`SourceOracle`] is the
//! implementation backed by the declarations of a single parsed file.

use std::path::{Component, Path, PathBuf};

use crate::metadata::LiteralValue;
use crate::model::{Keyword, TypeExpr, TypeIndex};

/// Alias chains longer than this are treated as unresolvable (covers alias cycles).
const MAX_ALIAS_DEPTH: usize = 16;

/// Module specifiers with this suffix are assumed to export enums.
const ENUM_MODULE_SUFFIX: &str = ".enum";

/// Read-only query surface over a type system. Every query is pure; a miss is `None`
/// or `false`, never an error.
pub trait TypeOracle {
    type Handle: Clone + std::fmt::Debug;

    fn resolve_type(&self, expr: &TypeExpr) -> Option<Self::Handle>;

    /// The type of a declared property. Implementations may widen optional properties.
    fn resolve_declared(&self, expr: &TypeExpr, optional: bool) -> Option<Self::Handle> {
        let _ = optional;
        self.resolve_type(expr)
    }

    fn canonical_reference(&self, handle: &Self::Handle) -> Option<String>;

    fn is_enum_type(&self, handle: &Self::Handle) -> bool;

    fn is_enum_member(&self, handle: &Self::Handle) -> bool;

    /// A union that stands for a single real type: the one synthesized for an
    /// optional property, or a written `T | null`.
    fn is_auto_generated_union(&self, handle: &Self::Handle) -> bool;

    /// Members of a union; for an auto-generated union the real type comes last.
    fn union_constituents(&self, handle: &Self::Handle) -> Vec<Self::Handle>;

    /// The enum type behind a union of that enum's members.
    fn enum_from_member_union(&self, handle: &Self::Handle) -> Option<Self::Handle>;

    /// `(element, true)` for array types, `(handle, false)` otherwise.
    fn unwrap_array(&self, handle: &Self::Handle) -> Option<(Self::Handle, bool)>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE ORACLE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct NamedType {
    pub name: String,
    /// Resolved module the name is imported from; `None` for local and global names
    pub module: Option<String>,
}

impl NamedType {
    fn qualified(&self) -> String {
        match &self.module {
            Some(module) => format!("import(\"{}\").{}", module, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeHandle {
    Keyword(Keyword),
    Null,
    Undefined,
    Literal(LiteralValue),
    Named(NamedType),
    Enum(NamedType),
    EnumMember { owner: NamedType, member: String },
    Array(Box<TypeHandle>),
    Union {
        members: Vec<TypeHandle>,
        synthesized: bool,
    },
    Object,
    Opaque(String),
}

impl TypeHandle {
    fn is_nullish(&self) -> bool {
        matches!(self, TypeHandle::Null | TypeHandle::Undefined)
    }
}

/// Oracle over one file: its enums, type aliases and imports.
pub struct SourceOracle<'a> {
    index: &'a TypeIndex,
    host_file: &'a str,
}

impl<'a> SourceOracle<'a> {
    pub fn new(index: &'a TypeIndex, host_file: &'a str) -> Self {
        Self { index, host_file }
    }

    fn resolve_bounded(&self, expr: &TypeExpr, depth: usize) -> Option<TypeHandle> {
        match expr {
            TypeExpr::Keyword(keyword) => Some(TypeHandle::Keyword(*keyword)),
            TypeExpr::Null => Some(TypeHandle::Null),
            TypeExpr::Undefined => Some(TypeHandle::Undefined),
            TypeExpr::Literal(value) => Some(TypeHandle::Literal(value.clone())),
            TypeExpr::Array(element) => self
                .resolve_bounded(element, depth)
                .map(|e| TypeHandle::Array(Box::new(e))),
            TypeExpr::Union(members) => {
                let members: Vec<TypeHandle> = members
                    .iter()
                    .filter_map(|m| self.resolve_bounded(m, depth))
                    .collect();
                if members.is_empty() {
                    return None;
                }
                Some(TypeHandle::Union {
                    members,
                    synthesized: false,
                })
            }
            TypeExpr::ObjectLiteral(_) => Some(TypeHandle::Object),
            TypeExpr::Reference { name, arguments } => {
                self.resolve_reference(name, arguments, depth)
            }
            TypeExpr::Other(text) => Some(TypeHandle::Opaque(text.clone())),
        }
    }

    fn resolve_reference(
        &self,
        name: &str,
        arguments: &[TypeExpr],
        depth: usize,
    ) -> Option<TypeHandle> {
        if matches!(name, "Array" | "ReadonlyArray") && arguments.len() == 1 {
            return self
                .resolve_bounded(&arguments[0], depth)
                .map(|e| TypeHandle::Array(Box::new(e)));
        }

        if let Some(aliased) = self.index.aliases.get(name) {
            if depth >= MAX_ALIAS_DEPTH {
                tracing::trace!(alias = name, "alias chain too deep, treating as unresolved");
                return None;
            }
            return self.resolve_bounded(aliased, depth + 1);
        }

        if let Some((owner, member)) = name.rsplit_once('.') {
            if self.names_enum(owner) {
                return Some(TypeHandle::EnumMember {
                    owner: self.named(owner),
                    member: member.to_string(),
                });
            }
        }

        if self.names_enum(name) {
            return Some(TypeHandle::Enum(self.named(name)));
        }

        Some(TypeHandle::Named(self.named(name)))
    }

    fn names_enum(&self, name: &str) -> bool {
        if self.index.is_enum(name) {
            return true;
        }
        self.index
            .imports
            .get(name)
            .map(|binding| binding.module.ends_with(ENUM_MODULE_SUFFIX))
            .unwrap_or(false)
    }

    fn named(&self, name: &str) -> NamedType {
        match self.index.imports.get(name) {
            Some(binding) => NamedType {
                name: binding.imported.clone(),
                module: Some(resolve_module(self.host_file, &binding.module)),
            },
            None => NamedType {
                name: name.to_string(),
                module: None,
            },
        }
    }
}

impl TypeOracle for SourceOracle<'_> {
    type Handle = TypeHandle;

    fn resolve_type(&self, expr: &TypeExpr) -> Option<TypeHandle> {
        self.resolve_bounded(expr, 0)
    }

    fn resolve_declared(&self, expr: &TypeExpr, optional: bool) -> Option<TypeHandle> {
        let declared = self.resolve_type(expr)?;
        if !optional {
            return Some(declared);
        }
        Some(TypeHandle::Union {
            members: vec![TypeHandle::Undefined, declared],
            synthesized: true,
        })
    }

    fn canonical_reference(&self, handle: &TypeHandle) -> Option<String> {
        match handle {
            TypeHandle::Keyword(keyword) => keyword_constructor(*keyword).map(str::to_string),
            TypeHandle::Literal(LiteralValue::String(_)) => Some("String".to_string()),
            TypeHandle::Literal(LiteralValue::Number(_)) => Some("Number".to_string()),
            TypeHandle::Literal(LiteralValue::Boolean(_)) => Some("Boolean".to_string()),
            TypeHandle::Named(named) | TypeHandle::Enum(named) => Some(named.qualified()),
            TypeHandle::EnumMember { owner, member } => {
                Some(format!("{}.{}", owner.qualified(), member))
            }
            TypeHandle::Object => Some("Object".to_string()),
            TypeHandle::Union { members, .. } => {
                let mut names = members
                    .iter()
                    .filter(|m| !m.is_nullish())
                    .map(|m| self.canonical_reference(m));
                let first = names.next()??;
                names
                    .all(|n| n.as_deref() == Some(first.as_str()))
                    .then_some(first)
            }
            _ => None,
        }
    }

    fn is_enum_type(&self, handle: &TypeHandle) -> bool {
        matches!(handle, TypeHandle::Enum(_))
    }

    fn is_enum_member(&self, handle: &TypeHandle) -> bool {
        matches!(handle, TypeHandle::EnumMember { .. })
    }

    fn is_auto_generated_union(&self, handle: &TypeHandle) -> bool {
        match handle {
            TypeHandle::Union {
                synthesized: true, ..
            } => true,
            // `T | null`: one real type widened with null-like members
            TypeHandle::Union { members, .. } => {
                members.iter().filter(|m| !m.is_nullish()).count() == 1
            }
            _ => false,
        }
    }

    /// Null-like members first, so the real type is always last.
    fn union_constituents(&self, handle: &TypeHandle) -> Vec<TypeHandle> {
        match handle {
            TypeHandle::Union { members, .. } => {
                let (mut ordered, rest): (Vec<TypeHandle>, Vec<TypeHandle>) =
                    members.iter().cloned().partition(TypeHandle::is_nullish);
                ordered.extend(rest);
                ordered
            }
            _ => Vec::new(),
        }
    }

    fn enum_from_member_union(&self, handle: &TypeHandle) -> Option<TypeHandle> {
        let TypeHandle::Union { members, .. } = handle else {
            return None;
        };
        let significant: Vec<&TypeHandle> = members.iter().filter(|m| !m.is_nullish()).collect();

        if let [TypeHandle::Enum(named)] = significant.as_slice() {
            return Some(TypeHandle::Enum(named.clone()));
        }

        let mut owners = significant.iter().map(|m| match m {
            TypeHandle::EnumMember { owner, .. } => Some(owner),
            _ => None,
        });
        let first = owners.next()??;
        if owners.all(|o| o == Some(first)) {
            Some(TypeHandle::Enum(first.clone()))
        } else {
            None
        }
    }

    fn unwrap_array(&self, handle: &TypeHandle) -> Option<(TypeHandle, bool)> {
        match handle {
            TypeHandle::Array(element) => Some(((**element).clone(), true)),
            other => Some((other.clone(), false)),
        }
    }
}

fn keyword_constructor(keyword: Keyword) -> Option<&'static str> {
    match keyword {
        Keyword::String => Some("String"),
        Keyword::Number => Some("Number"),
        Keyword::Boolean => Some("Boolean"),
        Keyword::BigInt => Some("BigInt"),
        Keyword::Symbol => Some("Symbol"),
        Keyword::Any | Keyword::Unknown | Keyword::Object => Some("Object"),
        Keyword::Void | Keyword::Never => None,
    }
}

/// Resolves a relative module specifier against the importing file; package
/// specifiers are returned unchanged. Resolved paths always start with `/` or `.`.
pub fn resolve_module(host_file: &str, specifier: &str) -> String {
    if !specifier.starts_with('.') {
        return specifier.to_string();
    }
    let base = Path::new(host_file).parent().unwrap_or_else(|| Path::new(""));
    let joined = normalize_path(&base.join(specifier));
    let joined = joined.to_string_lossy().replace('\\', "/");
    if joined.starts_with('/') || joined.starts_with('.') {
        joined
    } else {
        format!("./{}", joined)
    }
}

/// Lexically folds `.` and `..` components.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
