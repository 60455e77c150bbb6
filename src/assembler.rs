//! Metadata Assembler
//!
//! Runs the resolvers for one property in a fixed order and merges their output into a
//! single record. Explicit annotations are seeded first; after that every key is
//! first-write-wins, so the merge order below is also the precedence order:
//!
//! `required` → type → documentation → default → enum → validation bounds

use std::borrow::Cow;

use crate::annotations;
use crate::docs::DocExtractor;
use crate::enrich::{enrich_docs, extract_bounds, extract_default};
use crate::enum_resolver::resolve_enum_metadata;
use crate::error::ResolveError;
use crate::import_path::ImportNormalizer;
use crate::metadata::{
    keys, ClassMetadata, ClassMetadataBuilder, MetadataBuilder, MetadataValue, PropertyMetadata,
};
use crate::model::PropertyModel;
use crate::options::PluginOptions;
use crate::oracle::TypeOracle;
use crate::type_resolver::resolve_type_metadata;

/// Deepest inline object-literal schema that is still resolved.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Everything a resolver may consult while resolving one property.
pub struct ResolveContext<'a, O: TypeOracle> {
    pub oracle: &'a O,
    pub normalizer: &'a dyn ImportNormalizer,
    pub docs: &'a dyn DocExtractor,
    pub options: Cow<'a, PluginOptions>,
    /// File the metadata will be attached to; import paths are made relative to it
    pub host_file: &'a str,
    /// Inline object-literal nesting level; 0 for class members
    pub depth: usize,
}

impl<'a, O: TypeOracle> ResolveContext<'a, O> {
    pub fn new(
        oracle: &'a O,
        normalizer: &'a dyn ImportNormalizer,
        docs: &'a dyn DocExtractor,
        options: &'a PluginOptions,
        host_file: &'a str,
    ) -> Self {
        Self {
            oracle,
            normalizer,
            docs,
            options: Cow::Borrowed(options),
            host_file,
            depth: 0,
        }
    }

    /// Context for the members of an inline object-literal schema: one level deeper,
    /// enrichers disabled.
    pub fn nested(&self) -> Result<ResolveContext<'a, O>, ResolveError> {
        let depth = self.depth + 1;
        if depth > MAX_NESTING_DEPTH {
            return Err(ResolveError::DepthExceeded {
                depth,
                limit: MAX_NESTING_DEPTH,
            });
        }
        Ok(ResolveContext {
            oracle: self.oracle,
            normalizer: self.normalizer,
            docs: self.docs,
            options: Cow::Owned(self.options.narrowed()),
            host_file: self.host_file,
            depth,
        })
    }
}

/// Resolves one property into its finished record.
pub fn resolve_property<O: TypeOracle>(
    property: &PropertyModel,
    ctx: &ResolveContext<'_, O>,
) -> Result<PropertyMetadata, ResolveError> {
    let mut record = MetadataBuilder::seeded(annotations::explicit_metadata(&property.decorators))?;

    record.contribute(keys::REQUIRED, MetadataValue::Bool(!property.optional));

    let type_contribution = resolve_type_metadata(property.type_expr.as_ref(), &record, ctx)?;
    record.contribute_all(type_contribution);

    if ctx.options.introspect_comments {
        let docs = enrich_docs(property, &record, ctx)?;
        record.contribute_all(docs);
    }

    let default = extract_default(property, &record);
    record.contribute_all(default);

    let enum_contribution = resolve_enum_metadata(property, &record, ctx);
    record.contribute_all(enum_contribution);

    if ctx.options.class_validator_shim {
        let bounds = extract_bounds(property, &record);
        record.contribute_all(bounds);
    }

    Ok(record.finish())
}

/// Resolves the members of an inline object-literal schema. Unlike a class scan there is
/// no hide/static filtering and a failing member fails the whole literal.
pub fn scan_members<O: TypeOracle>(
    members: &[PropertyModel],
    ctx: &ResolveContext<'_, O>,
) -> Result<ClassMetadata, ResolveError> {
    let mut class = ClassMetadataBuilder::new();
    for member in members {
        let Some(name) = member.identifier_name() else {
            continue;
        };
        let record = resolve_property(member, ctx)?;
        class.insert(name, record);
    }
    Ok(class.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::JsDocExtractor;
    use crate::import_path::RequireNormalizer;
    use crate::metadata::{EnumRef, LiteralValue, TypeDescriptor};
    use crate::model::{Decorator, ExprKind, Keyword, RawExpr, TypeExpr, TypeIndex};
    use crate::oracle::SourceOracle;
    use pretty_assertions::assert_eq;

    fn reference(name: &str) -> MetadataValue {
        MetadataValue::Type(TypeDescriptor::Reference(name.into()).lazy())
    }

    fn resolve(property: &PropertyModel, index: &TypeIndex, options: &PluginOptions) -> PropertyMetadata {
        let oracle = SourceOracle::new(index, "src/cat.dto.ts");
        let ctx = ResolveContext::new(&oracle, &RequireNormalizer, &JsDocExtractor, options, "src/cat.dto.ts");
        resolve_property(property, &ctx).unwrap()
    }

    fn entries(record: &PropertyMetadata) -> Vec<(&str, MetadataValue)> {
        record.iter().map(|(k, v)| (k, v.clone())).collect()
    }

    #[test]
    fn test_merge_order() {
        let mut index = TypeIndex::default();
        index.enums.push("Role".into());

        let mut property = PropertyModel::named("role");
        property.type_expr = Some(TypeExpr::reference("Role"));
        property.initializer = Some(RawExpr::path("Role.Admin"));
        property.doc_comment = Some("/** The role */".into());
        property.decorators = vec![Decorator::new(
            "MaxLength",
            vec![RawExpr::literal("10", LiteralValue::Number(10.0))],
        )];

        let options = PluginOptions {
            introspect_comments: true,
            ..PluginOptions::default()
        };
        let record = resolve(&property, &index, &options);
        assert_eq!(
            entries(&record),
            vec![
                (keys::REQUIRED, MetadataValue::Bool(true)),
                (keys::DESCRIPTION, MetadataValue::Text("The role".into())),
                (keys::DEFAULT, MetadataValue::Expression("Role.Admin".into())),
                (
                    keys::ENUM,
                    MetadataValue::Enum(EnumRef {
                        name: "Role".into(),
                        is_array: false
                    })
                ),
                (keys::MAX_LENGTH, MetadataValue::Number(10.0)),
            ]
        );
    }

    #[test]
    fn test_explicit_required_beats_presence_marker() {
        let mut property = PropertyModel::named("name");
        property.optional = true;
        property.type_expr = Some(TypeExpr::Keyword(Keyword::String));
        property.decorators = vec![Decorator::new(
            "ApiProperty",
            vec![RawExpr::new(
                "{ required: true }",
                ExprKind::Object(vec![(
                    "required".into(),
                    RawExpr::literal("true", LiteralValue::Boolean(true)),
                )]),
            )],
        )];
        let record = resolve(&property, &TypeIndex::default(), &PluginOptions::default());
        assert_eq!(
            entries(&record),
            vec![
                (keys::TYPE, reference("String")),
                (keys::REQUIRED, MetadataValue::Bool(true)),
            ]
        );
    }

    #[test]
    fn test_nested_context_narrows_options() {
        let index = TypeIndex::default();
        let oracle = SourceOracle::new(&index, "a.ts");
        let options = PluginOptions {
            introspect_comments: true,
            class_validator_shim: true,
            dto_key_of_comment: "summary".into(),
            ..PluginOptions::default()
        };
        let ctx = ResolveContext::new(&oracle, &RequireNormalizer, &JsDocExtractor, &options, "a.ts");
        let nested = ctx.nested().unwrap();
        assert_eq!(nested.depth, 1);
        assert!(!nested.options.introspect_comments);
        assert!(!nested.options.class_validator_shim);
        assert_eq!(nested.options.dto_key_of_comment, "description");
    }

    #[test]
    fn test_nesting_limit() {
        let index = TypeIndex::default();
        let oracle = SourceOracle::new(&index, "a.ts");
        let options = PluginOptions::default();
        let mut ctx = ResolveContext::new(&oracle, &RequireNormalizer, &JsDocExtractor, &options, "a.ts");
        ctx.depth = MAX_NESTING_DEPTH;
        assert_eq!(
            ctx.nested().err(),
            Some(ResolveError::DepthExceeded {
                depth: MAX_NESTING_DEPTH + 1,
                limit: MAX_NESTING_DEPTH
            })
        );
    }
}
