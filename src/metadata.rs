//! Metadata records produced by the resolution core.
//!
//! A [`PropertyMetadata`] is an ordered key/value record; a [`ClassMetadata`] maps
//! property names to records. Both are built through builders and are read-only once
//! finished.

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Metadata keys with fixed meaning.
pub mod keys {
    pub const REQUIRED: &str = "required";
    pub const TYPE: &str = "type";
    pub const NULLABLE: &str = "nullable";
    pub const IS_ARRAY: &str = "isArray";
    pub const ENUM: &str = "enum";
    pub const DEFAULT: &str = "default";
    pub const MINIMUM: &str = "minimum";
    pub const MAXIMUM: &str = "maximum";
    pub const MIN_LENGTH: &str = "minLength";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const DESCRIPTION: &str = "description";
    pub const EXAMPLE: &str = "example";
    pub const EXAMPLES: &str = "examples";
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALUES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Sequence(Vec<LiteralValue>),
}

impl LiteralValue {
    /// Converts an arbitrary JSON value. Objects have no literal form and are kept as
    /// their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => LiteralValue::Null,
            serde_json::Value::Bool(b) => LiteralValue::Boolean(*b),
            serde_json::Value::Number(n) => LiteralValue::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => LiteralValue::String(s.clone()),
            serde_json::Value::Array(items) => {
                LiteralValue::Sequence(items.iter().map(LiteralValue::from_json).collect())
            }
            serde_json::Value::Object(_) => LiteralValue::String(value.to_string()),
        }
    }
}

/// The type a property is described with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum TypeDescriptor {
    /// A primitive type named by string, e.g. `type: 'string'`
    Primitive(String),
    /// A constructor or class reference by name
    Reference(String),
    ArrayOf(Box<TypeDescriptor>),
    /// An inline object schema
    ObjectLiteral(ClassMetadata),
    /// Deferred descriptor; evaluated against a [`crate::registry::MetadataRegistry`]
    /// once every class is known
    Lazy(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn lazy(self) -> Self {
        match self {
            lazy @ TypeDescriptor::Lazy(_) => lazy,
            other => TypeDescriptor::Lazy(Box::new(other)),
        }
    }

    pub fn array_of(element: TypeDescriptor) -> Self {
        TypeDescriptor::ArrayOf(Box::new(element))
    }

    /// Strips any lazy wrappers.
    pub fn forced(&self) -> &TypeDescriptor {
        let mut current = self;
        while let TypeDescriptor::Lazy(inner) = current {
            current = inner;
        }
        current
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumRef {
    pub name: String,
    pub is_array: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum MetadataValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Literal(LiteralValue),
    Examples(Vec<LiteralValue>),
    Type(TypeDescriptor),
    Enum(EnumRef),
    /// Source expression kept verbatim
    Expression(String),
}

impl MetadataValue {
    pub fn as_type(&self) -> Option<&TypeDescriptor> {
        match self {
            MetadataValue::Type(descriptor) => Some(descriptor),
            _ => None,
        }
    }
}

/// Key/value pairs a resolver offers to the assembler.
pub type Contribution = Vec<(String, MetadataValue)>;

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTY METADATA
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    entries: Vec<(String, MetadataValue)>,
}

impl PropertyMetadata {
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accumulates one property's record. First write wins; explicit annotations are
/// seeded up front and can never be overwritten.
#[derive(Debug, Default)]
pub struct MetadataBuilder {
    explicit: Vec<(String, MetadataValue)>,
    inferred: Vec<(String, MetadataValue)>,
}

impl MetadataBuilder {
    pub fn seeded(explicit: Vec<(String, MetadataValue)>) -> Result<Self, ResolveError> {
        let has = |key: &str| explicit.iter().any(|(k, _)| k == key);
        if has(keys::EXAMPLE) && has(keys::EXAMPLES) {
            return Err(ResolveError::ConflictingExamples);
        }

        let mut deduped: Vec<(String, MetadataValue)> = Vec::with_capacity(explicit.len());
        for (key, value) in explicit {
            if !deduped.iter().any(|(k, _)| *k == key) {
                deduped.push((key, value));
            }
        }

        Ok(Self {
            explicit: deduped,
            inferred: Vec::new(),
        })
    }

    pub fn has(&self, key: &str) -> bool {
        self.explicit.iter().any(|(k, _)| k == key) || self.inferred.iter().any(|(k, _)| k == key)
    }

    /// Adds `key` unless it is already present. Returns whether the value was kept.
    pub fn contribute(&mut self, key: &str, value: MetadataValue) -> bool {
        if self.has(key) {
            return false;
        }
        self.inferred.push((key.to_string(), value));
        true
    }

    pub fn contribute_all(&mut self, contribution: Contribution) {
        for (key, value) in contribution {
            self.contribute(&key, value);
        }
    }

    /// Inferred keys in merge order, then explicit keys in authored order.
    pub fn finish(self) -> PropertyMetadata {
        let mut entries = self.inferred;
        entries.extend(self.explicit);
        PropertyMetadata { entries }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASS METADATA
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetadata {
    properties: Vec<(String, PropertyMetadata)>,
}

impl ClassMetadata {
    pub fn get(&self, property: &str) -> Option<&PropertyMetadata> {
        self.properties
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, m)| m)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyMetadata)> {
        self.properties.iter().map(|(name, m)| (name.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Owned by a single class scan; frozen into a [`ClassMetadata`] when the scan ends.
#[derive(Debug, Default)]
pub struct ClassMetadataBuilder {
    properties: Vec<(String, PropertyMetadata)>,
}

impl ClassMetadataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record; an existing record under the same name is replaced wholesale.
    pub fn insert(&mut self, name: &str, metadata: PropertyMetadata) {
        if let Some(slot) = self.properties.iter_mut().find(|(n, _)| n == name) {
            slot.1 = metadata;
        } else {
            self.properties.push((name.to_string(), metadata));
        }
    }

    pub fn freeze(self) -> ClassMetadata {
        ClassMetadata {
            properties: self.properties,
        }
    }
}
