//! Annotation Reader
//!
//! Decorator lookup by name, and the explicit metadata a user authored through
//! `@ApiProperty({ ... })`.

use crate::metadata::{keys, EnumRef, LiteralValue, MetadataValue, TypeDescriptor};
use crate::model::{Decorator, ExprKind, RawExpr};

/// Decorators whose first object argument holds explicit metadata.
pub const PROPERTY_DECORATORS: &[&str] = &["ApiProperty", "ApiPropertyOptional"];

/// Marks a property as excluded from metadata.
pub const HIDE_DECORATOR: &str = "ApiHideProperty";

/// First decorator whose name is in `names`.
pub fn first_matching<'d>(names: &[&str], decorators: &'d [Decorator]) -> Option<&'d Decorator> {
    decorators.iter().find(|d| names.contains(&d.name.as_str()))
}

pub fn arguments(decorator: &Decorator) -> &[RawExpr] {
    &decorator.arguments
}

pub fn is_hidden(decorators: &[Decorator]) -> bool {
    first_matching(&[HIDE_DECORATOR], decorators).is_some()
}

/// Raw explicit annotations: the keys of the first object-literal argument of the
/// property decorator, in authored order.
pub fn explicit_annotations(decorators: &[Decorator]) -> Vec<(String, RawExpr)> {
    let Some(decorator) = first_matching(PROPERTY_DECORATORS, decorators) else {
        return Vec::new();
    };
    arguments(decorator)
        .iter()
        .find_map(|arg| match &arg.kind {
            ExprKind::Object(entries) => Some(entries.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Explicit annotations interpreted as metadata values.
pub fn explicit_metadata(decorators: &[Decorator]) -> Vec<(String, MetadataValue)> {
    explicit_annotations(decorators)
        .into_iter()
        .map(|(key, raw)| {
            let value = interpret_explicit(&key, &raw);
            (key, value)
        })
        .collect()
}

/// Interprets one authored expression under its key.
pub fn interpret_explicit(key: &str, raw: &RawExpr) -> MetadataValue {
    let raw = raw.unwrap_assertions();
    match (&raw.kind, key) {
        (ExprKind::Arrow(body), _) => match type_descriptor_of(body) {
            Some(descriptor) => MetadataValue::Type(descriptor.lazy()),
            None => MetadataValue::Expression(raw.text.clone()),
        },
        (ExprKind::Literal(LiteralValue::String(name)), keys::TYPE) => {
            MetadataValue::Type(TypeDescriptor::Primitive(name.clone()))
        }
        (ExprKind::Path(_) | ExprKind::Array(_), keys::TYPE) => match type_descriptor_of(raw) {
            Some(descriptor) => MetadataValue::Type(descriptor),
            None => MetadataValue::Expression(raw.text.clone()),
        },
        (ExprKind::Path(name), keys::ENUM) => MetadataValue::Enum(EnumRef {
            name: name.clone(),
            is_array: false,
        }),
        (ExprKind::Array(_), keys::EXAMPLES) => match raw.as_literal() {
            Some(LiteralValue::Sequence(items)) => MetadataValue::Examples(items),
            _ => MetadataValue::Expression(raw.text.clone()),
        },
        _ => literal_value(raw),
    }
}

/// Bool/number/string literals map to their own value kinds, other literals to
/// `Literal`, anything else is kept verbatim.
pub fn literal_value(raw: &RawExpr) -> MetadataValue {
    match raw.as_literal() {
        Some(LiteralValue::Boolean(b)) => MetadataValue::Bool(b),
        Some(LiteralValue::Number(n)) => MetadataValue::Number(n),
        Some(LiteralValue::String(s)) => MetadataValue::Text(s),
        Some(other) => MetadataValue::Literal(other),
        None => MetadataValue::Expression(raw.text.clone()),
    }
}

/// `String` → reference, `[String]` → array of reference.
fn type_descriptor_of(raw: &RawExpr) -> Option<TypeDescriptor> {
    match &raw.kind {
        ExprKind::Path(name) => Some(TypeDescriptor::Reference(name.clone())),
        ExprKind::Literal(LiteralValue::String(name)) => {
            Some(TypeDescriptor::Primitive(name.clone()))
        }
        ExprKind::Array(items) if items.len() == 1 => {
            type_descriptor_of(&items[0]).map(TypeDescriptor::array_of)
        }
        ExprKind::TypeAssertion(inner) => type_descriptor_of(inner),
        _ => None,
    }
}
