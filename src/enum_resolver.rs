//! Enum Resolver
//!
//! Contributes `enum` (and `isArray` for arrays of an enum) from a property's declared
//! type. Works entirely through the oracle so that enums reached through aliases,
//! imports or optional-property unions are found the same way as direct ones.

use crate::assembler::ResolveContext;
use crate::import_path::ImportNormalizer;
use crate::metadata::{keys, Contribution, EnumRef, MetadataBuilder, MetadataValue};
use crate::model::PropertyModel;
use crate::oracle::TypeOracle;

pub fn resolve_enum_metadata<O: TypeOracle>(
    property: &PropertyModel,
    record: &MetadataBuilder,
    ctx: &ResolveContext<'_, O>,
) -> Contribution {
    if record.has(keys::ENUM) {
        return Vec::new();
    }
    let Some(type_expr) = &property.type_expr else {
        return Vec::new();
    };
    let oracle = ctx.oracle;

    let Some(mut working) = oracle.resolve_declared(type_expr, property.optional) else {
        return Vec::new();
    };

    // Auto-generated unions list the real type last; `roles?: Role[] | null` nests two.
    while oracle.is_auto_generated_union(&working) {
        match oracle.union_constituents(&working).pop() {
            Some(last) => working = last,
            None => return Vec::new(),
        }
    }

    let Some((mut element, mut is_array)) = oracle.unwrap_array(&working) else {
        return Vec::new();
    };

    if !oracle.is_enum_type(&element) {
        if oracle.is_enum_member(&element) {
            return Vec::new();
        }
        let Some(found) = oracle.enum_from_member_union(&element) else {
            return Vec::new();
        };
        let Some((unwrapped, nested_array)) = oracle.unwrap_array(&found) else {
            return Vec::new();
        };
        element = unwrapped;
        is_array |= nested_array;
        if !oracle.is_enum_type(&element) {
            return Vec::new();
        }
    }

    let Some(name) = oracle.canonical_reference(&element) else {
        return Vec::new();
    };
    let name = ctx.normalizer.normalize(&name, ctx.host_file);

    let mut contribution = vec![(
        keys::ENUM.to_string(),
        MetadataValue::Enum(EnumRef { name, is_array }),
    )];
    if is_array {
        contribution.push((keys::IS_ARRAY.to_string(), MetadataValue::Bool(true)));
    }
    contribution
}
