//! Owned class/property model.
//!
//! The parser lowers the oxc AST into these types so the resolution core never touches
//! arena lifetimes. Anything the core does not need is dropped during lowering.

use std::collections::HashMap;

use crate::metadata::LiteralValue;

#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    pub path: String,
    pub classes: Vec<ClassModel>,
    pub index: TypeIndex,
}

#[derive(Debug, Clone, Default)]
pub struct ClassModel {
    /// `None` for anonymous class expressions
    pub name: Option<String>,
    pub properties: Vec<PropertyModel>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyName {
    Identifier(String),
    /// `[key]: T`
    Computed(String),
    /// `#key: T`
    Private(String),
    /// `'some-key': T`
    Quoted(String),
}

#[derive(Debug, Clone, Default)]
pub struct PropertyModel {
    pub name: Option<PropertyName>,
    pub is_static: bool,
    /// Presence marker: `name?: T`
    pub optional: bool,
    pub type_expr: Option<TypeExpr>,
    pub initializer: Option<RawExpr>,
    pub decorators: Vec<Decorator>,
    /// Raw `/** ... */` block attached to the property
    pub doc_comment: Option<String>,
}

impl PropertyModel {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(PropertyName::Identifier(name.to_string())),
            ..Self::default()
        }
    }

    /// The property name when it is a plain identifier; computed, private and quoted
    /// keys cannot be represented in the metadata map.
    pub fn identifier_name(&self) -> Option<&str> {
        match &self.name {
            Some(PropertyName::Identifier(name))
                if oxc_syntax::identifier::is_identifier_name(name) =>
            {
                Some(name.as_str())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Any,
    Unknown,
    Object,
    Void,
    Never,
}

/// A property's declared type, as written.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Keyword(Keyword),
    Null,
    Undefined,
    Literal(LiteralValue),
    Reference {
        name: String,
        arguments: Vec<TypeExpr>,
    },
    Array(Box<TypeExpr>),
    Union(Vec<TypeExpr>),
    /// `{ a: string; b?: number }`
    ObjectLiteral(Vec<PropertyModel>),
    Other(String),
}

impl TypeExpr {
    pub fn reference(name: &str) -> Self {
        TypeExpr::Reference {
            name: name.to_string(),
            arguments: Vec::new(),
        }
    }

    pub fn array_of(element: TypeExpr) -> Self {
        TypeExpr::Array(Box::new(element))
    }
}

// Doc comments do not take part in equality.
impl PartialEq for PropertyModel {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.is_static == other.is_static
            && self.optional == other.optional
            && self.type_expr == other.type_expr
            && self.initializer == other.initializer
            && self.decorators == other.decorators
    }
}

/// An expression kept verbatim, with a structural view for the forms the core
/// interprets.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExpr {
    pub text: String,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(LiteralValue),
    Array(Vec<RawExpr>),
    Object(Vec<(String, RawExpr)>),
    /// `() => body`
    Arrow(Box<RawExpr>),
    /// `Name` or `A.B.C`
    Path(String),
    /// `x as T`, `<T>x`, `x satisfies T`, `x!`
    TypeAssertion(Box<RawExpr>),
    Other,
}

impl RawExpr {
    pub fn new(text: &str, kind: ExprKind) -> Self {
        Self {
            text: text.to_string(),
            kind,
        }
    }

    pub fn literal(text: &str, value: LiteralValue) -> Self {
        Self::new(text, ExprKind::Literal(value))
    }

    pub fn path(name: &str) -> Self {
        Self::new(name, ExprKind::Path(name.to_string()))
    }

    /// Strips type-assertion wrappers.
    pub fn unwrap_assertions(&self) -> &RawExpr {
        let mut current = self;
        while let ExprKind::TypeAssertion(inner) = &current.kind {
            current = inner;
        }
        current
    }

    /// The literal value when the expression is a literal or an array of literals.
    pub fn as_literal(&self) -> Option<LiteralValue> {
        match &self.kind {
            ExprKind::Literal(value) => Some(value.clone()),
            ExprKind::Array(items) => items
                .iter()
                .map(RawExpr::as_literal)
                .collect::<Option<Vec<_>>>()
                .map(LiteralValue::Sequence),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    /// Callee name; the last segment for `ns.Name(...)`
    pub name: String,
    pub arguments: Vec<RawExpr>,
}

impl Decorator {
    pub fn new(name: &str, arguments: Vec<RawExpr>) -> Self {
        Self {
            name: name.to_string(),
            arguments,
        }
    }
}

/// Declarations in one file the oracle needs to classify type names.
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    pub enums: Vec<String>,
    /// Alias name to aliased type
    pub aliases: HashMap<String, TypeExpr>,
    /// Local name to (module specifier, imported name)
    pub imports: HashMap<String, ImportBinding>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportBinding {
    pub module: String,
    pub imported: String,
}

impl TypeIndex {
    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.iter().any(|e| e == name)
    }
}
