//! Enrichers: default values, validation bounds, and documentation.

use crate::annotations::{self, literal_value};
use crate::assembler::ResolveContext;
use crate::docs::DocExtractor;
use crate::error::ResolveError;
use crate::metadata::{keys, Contribution, MetadataBuilder, MetadataValue};
use crate::model::PropertyModel;
use crate::oracle::TypeOracle;

/// Validation decorator → metadata key.
pub const BOUND_DECORATORS: &[(&str, &str)] = &[
    ("Min", keys::MINIMUM),
    ("Max", keys::MAXIMUM),
    ("MinLength", keys::MIN_LENGTH),
    ("MaxLength", keys::MAX_LENGTH),
];

// ═══════════════════════════════════════════════════════════════════════════════
// DEFAULT VALUE
// ═══════════════════════════════════════════════════════════════════════════════

/// `default` from the property initializer, with type assertions stripped.
pub fn extract_default(property: &PropertyModel, record: &MetadataBuilder) -> Contribution {
    if record.has(keys::DEFAULT) {
        return Vec::new();
    }
    let Some(initializer) = &property.initializer else {
        return Vec::new();
    };
    let initializer = initializer.unwrap_assertions();

    let value = match initializer.as_literal() {
        Some(literal) => MetadataValue::Literal(literal),
        None => MetadataValue::Expression(initializer.text.clone()),
    };
    vec![(keys::DEFAULT.to_string(), value)]
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALIDATION BOUNDS
// ═══════════════════════════════════════════════════════════════════════════════

/// `minimum`/`maximum`/`minLength`/`maxLength` from class-validator decorators.
pub fn extract_bounds(property: &PropertyModel, record: &MetadataBuilder) -> Contribution {
    let mut contribution = Contribution::new();
    for &(decorator_name, key) in BOUND_DECORATORS {
        if record.has(key) {
            continue;
        }
        let Some(decorator) = annotations::first_matching(&[decorator_name], &property.decorators)
        else {
            continue;
        };
        if let Some(first) = annotations::arguments(decorator).first() {
            contribution.push((key.to_string(), literal_value(first.unwrap_assertions())));
        }
    }
    contribution
}

// ═══════════════════════════════════════════════════════════════════════════════
// DOCUMENTATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Description and examples from the property's doc comment.
pub fn enrich_docs<O: TypeOracle>(
    property: &PropertyModel,
    record: &MetadataBuilder,
    ctx: &ResolveContext<'_, O>,
) -> Result<Contribution, ResolveError> {
    let summary = ctx.docs.extract(property)?;
    let mut contribution = Contribution::new();

    let description_key = ctx.options.dto_key_of_comment.as_str();
    if let Some(description) = summary.description {
        if !record.has(description_key) {
            contribution.push((description_key.to_string(), MetadataValue::Text(description)));
        }
    }

    if record.has(keys::EXAMPLE) || record.has(keys::EXAMPLES) {
        return Ok(contribution);
    }
    let mut examples = summary.examples;
    match examples.len() {
        0 => {}
        1 => {
            let example = examples.remove(0);
            contribution.push((keys::EXAMPLE.to_string(), MetadataValue::Literal(example)));
        }
        _ => contribution.push((keys::EXAMPLES.to_string(), MetadataValue::Examples(examples))),
    }
    Ok(contribution)
}
