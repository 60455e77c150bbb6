//! Type Resolver
//!
//! Contributes `type` (and `nullable` for `T | null`) from a property's declared type.
//! Enum-typed properties get no `type`; the enum resolver describes them instead.

use crate::assembler::{scan_members, ResolveContext};
use crate::error::ResolveError;
use crate::import_path::ImportNormalizer;
use crate::metadata::{keys, Contribution, MetadataBuilder, MetadataValue, TypeDescriptor};
use crate::model::TypeExpr;
use crate::oracle::TypeOracle;

pub fn resolve_type_metadata<O: TypeOracle>(
    type_expr: Option<&TypeExpr>,
    record: &MetadataBuilder,
    ctx: &ResolveContext<'_, O>,
) -> Result<Contribution, ResolveError> {
    if record.has(keys::TYPE) {
        return Ok(Vec::new());
    }
    let Some(type_expr) = type_expr else {
        return Ok(Vec::new());
    };

    let TypeExpr::Union(members) = type_expr else {
        return Ok(type_contribution(describe(type_expr, ctx)?));
    };

    let has_null = members.iter().any(|m| matches!(m, TypeExpr::Null));
    let remaining: Vec<&TypeExpr> = members
        .iter()
        .filter(|m| !matches!(m, TypeExpr::Null))
        .collect();

    match remaining.as_slice() {
        [single] => {
            let mut contribution = type_contribution(describe(single, ctx)?);
            if has_null {
                contribution.push((keys::NULLABLE.to_string(), MetadataValue::Bool(true)));
            }
            Ok(contribution)
        }
        // Unions of two or more real variants are left undescribed.
        _ => Ok(Vec::new()),
    }
}

fn type_contribution(descriptor: Option<TypeDescriptor>) -> Contribution {
    descriptor
        .map(|d| vec![(keys::TYPE.to_string(), MetadataValue::Type(d.lazy()))])
        .unwrap_or_default()
}

/// Descriptor for a single (non-union) type expression.
fn describe<O: TypeOracle>(
    expr: &TypeExpr,
    ctx: &ResolveContext<'_, O>,
) -> Result<Option<TypeDescriptor>, ResolveError> {
    match expr {
        TypeExpr::ObjectLiteral(members) => {
            let nested = scan_members(members, &ctx.nested()?)?;
            Ok(Some(TypeDescriptor::ObjectLiteral(nested)))
        }
        TypeExpr::Array(element) => {
            Ok(describe(element, ctx)?.map(TypeDescriptor::array_of))
        }
        _ => Ok(oracle_reference(expr, ctx)),
    }
}

fn oracle_reference<O: TypeOracle>(
    expr: &TypeExpr,
    ctx: &ResolveContext<'_, O>,
) -> Option<TypeDescriptor> {
    let oracle = ctx.oracle;
    let handle = oracle.resolve_type(expr)?;
    let (element, is_array) = oracle.unwrap_array(&handle)?;

    if oracle.is_enum_type(&element)
        || oracle.is_enum_member(&element)
        || oracle.enum_from_member_union(&element).is_some()
    {
        return None;
    }

    let name = oracle.canonical_reference(&element)?;
    let reference = TypeDescriptor::Reference(ctx.normalizer.normalize(&name, ctx.host_file));
    Some(if is_array {
        TypeDescriptor::array_of(reference)
    } else {
        reference
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::JsDocExtractor;
    use crate::import_path::RequireNormalizer;
    use crate::metadata::{ClassMetadataBuilder, LiteralValue};
    use crate::model::{ImportBinding, Keyword, PropertyModel, TypeIndex};
    use crate::options::PluginOptions;
    use crate::oracle::SourceOracle;
    use pretty_assertions::assert_eq;

    fn run(expr: &TypeExpr, index: &TypeIndex) -> Contribution {
        let oracle = SourceOracle::new(index, "src/cats/cat.dto.ts");
        let options = PluginOptions::default();
        let ctx = ResolveContext::new(
            &oracle,
            &RequireNormalizer,
            &JsDocExtractor,
            &options,
            "src/cats/cat.dto.ts",
        );
        resolve_type_metadata(Some(expr), &MetadataBuilder::default(), &ctx).unwrap()
    }

    fn lazy_ref(name: &str) -> MetadataValue {
        MetadataValue::Type(TypeDescriptor::Reference(name.into()).lazy())
    }

    fn type_entry(value: MetadataValue) -> (String, MetadataValue) {
        (keys::TYPE.to_string(), value)
    }

    #[test]
    fn test_keyword() {
        assert_eq!(
            run(&TypeExpr::Keyword(Keyword::String), &TypeIndex::default()),
            vec![type_entry(lazy_ref("String"))]
        );
    }

    #[test]
    fn test_nullable_single_variant() {
        let expr = TypeExpr::Union(vec![TypeExpr::reference("Owner"), TypeExpr::Null]);
        assert_eq!(
            run(&expr, &TypeIndex::default()),
            vec![
                type_entry(lazy_ref("Owner")),
                (keys::NULLABLE.to_string(), MetadataValue::Bool(true)),
            ]
        );
    }

    #[test]
    fn test_two_variants_are_left_alone() {
        let expr = TypeExpr::Union(vec![
            TypeExpr::Keyword(Keyword::String),
            TypeExpr::Keyword(Keyword::Number),
            TypeExpr::Null,
        ]);
        assert!(run(&expr, &TypeIndex::default()).is_empty());
    }

    #[test]
    fn test_undefined_is_a_real_variant() {
        let expr = TypeExpr::Union(vec![TypeExpr::Keyword(Keyword::Number), TypeExpr::Undefined]);
        assert!(run(&expr, &TypeIndex::default()).is_empty());

        let with_null = TypeExpr::Union(vec![
            TypeExpr::Keyword(Keyword::Number),
            TypeExpr::Undefined,
            TypeExpr::Null,
        ]);
        assert!(run(&with_null, &TypeIndex::default()).is_empty());
    }

    #[test]
    fn test_arrays() {
        let expected = vec![type_entry(MetadataValue::Type(
            TypeDescriptor::array_of(TypeDescriptor::Reference("String".into())).lazy(),
        ))];
        let written = TypeExpr::array_of(TypeExpr::Keyword(Keyword::String));
        assert_eq!(run(&written, &TypeIndex::default()), expected);

        let generic = TypeExpr::Reference {
            name: "Array".into(),
            arguments: vec![TypeExpr::Keyword(Keyword::String)],
        };
        assert_eq!(run(&generic, &TypeIndex::default()), expected);
    }

    #[test]
    fn test_enums_get_no_type() {
        let mut index = TypeIndex::default();
        index.enums.push("Role".into());
        assert!(run(&TypeExpr::reference("Role"), &index).is_empty());
        assert!(run(&TypeExpr::array_of(TypeExpr::reference("Role")), &index).is_empty());
        assert!(run(&TypeExpr::reference("Role.Admin"), &index).is_empty());
    }

    #[test]
    fn test_imported_reference_is_normalized() {
        let mut index = TypeIndex::default();
        index.imports.insert(
            "Owner".into(),
            ImportBinding {
                module: "../owners/owner.dto".into(),
                imported: "Owner".into(),
            },
        );
        assert_eq!(
            run(&TypeExpr::reference("Owner"), &index),
            vec![type_entry(lazy_ref("require(\"../owners/owner.dto\").Owner"))]
        );
    }

    #[test]
    fn test_inline_object_literal() {
        let mut street = PropertyModel::named("street");
        street.type_expr = Some(TypeExpr::Keyword(Keyword::String));
        let mut zip = PropertyModel::named("zip");
        zip.optional = true;
        zip.type_expr = Some(TypeExpr::Literal(LiteralValue::Number(1.0)));
        let expr = TypeExpr::ObjectLiteral(vec![street, zip]);

        let mut street_record = MetadataBuilder::default();
        street_record.contribute(keys::REQUIRED, MetadataValue::Bool(true));
        street_record.contribute(keys::TYPE, lazy_ref("String"));
        let mut zip_record = MetadataBuilder::default();
        zip_record.contribute(keys::REQUIRED, MetadataValue::Bool(false));
        zip_record.contribute(keys::TYPE, lazy_ref("Number"));
        let mut nested = ClassMetadataBuilder::new();
        nested.insert("street", street_record.finish());
        nested.insert("zip", zip_record.finish());

        assert_eq!(
            run(&expr, &TypeIndex::default()),
            vec![type_entry(MetadataValue::Type(
                TypeDescriptor::ObjectLiteral(nested.freeze()).lazy()
            ))]
        );
    }

    #[test]
    fn test_self_nesting_literal_hits_depth_limit() {
        let mut expr = TypeExpr::Keyword(Keyword::String);
        for _ in 0..40 {
            let mut member = PropertyModel::named("inner");
            member.type_expr = Some(expr);
            expr = TypeExpr::ObjectLiteral(vec![member]);
        }
        let index = TypeIndex::default();
        let oracle = SourceOracle::new(&index, "a.ts");
        let options = PluginOptions::default();
        let ctx = ResolveContext::new(&oracle, &RequireNormalizer, &JsDocExtractor, &options, "a.ts");
        assert!(matches!(
            resolve_type_metadata(Some(&expr), &MetadataBuilder::default(), &ctx),
            Err(ResolveError::DepthExceeded { .. })
        ));
    }

    #[test]
    fn test_explicit_type_short_circuits() {
        let index = TypeIndex::default();
        let oracle = SourceOracle::new(&index, "a.ts");
        let options = PluginOptions::default();
        let ctx = ResolveContext::new(&oracle, &RequireNormalizer, &JsDocExtractor, &options, "a.ts");
        let record = MetadataBuilder::seeded(vec![(keys::TYPE.into(), lazy_ref("Date"))]).unwrap();
        let contribution = resolve_type_metadata(
            Some(&TypeExpr::Keyword(Keyword::String)),
            &record,
            &ctx,
        )
        .unwrap();
        assert!(contribution.is_empty());
    }
}
