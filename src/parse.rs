//! Parse Module
//!
//! Parses TypeScript with oxc and lowers what the metadata core needs into the owned
//! model of [`crate::model`]: classes and their properties, plus the enums, type
//! aliases and imports the oracle consults.

use oxc_allocator::Allocator;
use oxc_ast::ast;
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use oxc_syntax::operator::UnaryOperator;

use crate::error::ScanError;
use crate::metadata::LiteralValue;
use crate::model::{
    ClassModel, Decorator, ExprKind, ImportBinding, Keyword, PropertyModel, PropertyName, RawExpr,
    SourceFile, TypeExpr, TypeIndex,
};

/// Parses one TypeScript module. Any syntax error fails the whole file.
pub fn parse_source(source: &str, path: &str) -> Result<SourceFile, ScanError> {
    let allocator = Allocator::default();
    let source_type = SourceType::default()
        .with_module(true)
        .with_typescript(true);
    let ret = Parser::new(&allocator, source, source_type).parse();

    if !ret.errors.is_empty() {
        let message = ret
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ScanError::Parse {
            path: path.to_string(),
            message,
        });
    }

    let mut lowering = Lowering {
        source,
        classes: Vec::new(),
        index: TypeIndex::default(),
    };
    lowering.visit_program(&ret.program);

    Ok(SourceFile {
        path: path.to_string(),
        classes: lowering.classes,
        index: lowering.index,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOWERING
// ═══════════════════════════════════════════════════════════════════════════════

struct Lowering<'s> {
    source: &'s str,
    classes: Vec<ClassModel>,
    index: TypeIndex,
}

impl<'a> Visit<'a> for Lowering<'_> {
    fn visit_class(&mut self, class: &ast::Class<'a>) {
        let model = self.lower_class(class);
        self.classes.push(model);
        walk::walk_class(self, class);
    }

    fn visit_ts_enum_declaration(&mut self, decl: &ast::TSEnumDeclaration<'a>) {
        self.index.enums.push(decl.id.name.to_string());
    }

    fn visit_ts_type_alias_declaration(&mut self, decl: &ast::TSTypeAliasDeclaration<'a>) {
        let aliased = self.lower_type(&decl.type_annotation);
        self.index.aliases.insert(decl.id.name.to_string(), aliased);
    }

    fn visit_import_declaration(&mut self, decl: &ast::ImportDeclaration<'a>) {
        let module = decl.source.value.to_string();
        for specifier in decl.specifiers.iter().flat_map(|specifiers| specifiers.iter()) {
            let (local, imported) = match specifier {
                ast::ImportDeclarationSpecifier::ImportSpecifier(s) => {
                    (s.local.name.to_string(), s.imported.name().to_string())
                }
                ast::ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                    (s.local.name.to_string(), "default".to_string())
                }
                // `E.Member` through a namespace import is not resolved
                ast::ImportDeclarationSpecifier::ImportNamespaceSpecifier(_) => continue,
            };
            self.index.imports.insert(
                local,
                ImportBinding {
                    module: module.clone(),
                    imported,
                },
            );
        }
    }
}

impl Lowering<'_> {
    fn text(&self, span: Span) -> &str {
        &self.source[span.start as usize..span.end as usize]
    }

    fn lower_class(&self, class: &ast::Class<'_>) -> ClassModel {
        let mut properties = Vec::new();
        let mut gap_start = class.body.span.start;

        for element in &class.body.body {
            if let ast::ClassElement::PropertyDefinition(prop) = element {
                let start = prop
                    .decorators
                    .iter()
                    .map(|d| d.span.start)
                    .fold(prop.span.start, u32::min);
                let doc_comment = self.doc_comment_between(gap_start, start);
                properties.push(self.lower_property(prop, doc_comment));
            }
            gap_start = element.span().end;
        }

        ClassModel {
            name: class.id.as_ref().map(|id| id.name.to_string()),
            properties,
        }
    }

    /// Last `/** ... */` block in `[start, end)`.
    fn doc_comment_between(&self, start: u32, end: u32) -> Option<String> {
        let gap = self.source.get(start as usize..end as usize)?;
        let open = gap.rfind("/**")?;
        let close = open + 3 + gap[open + 3..].find("*/")? + 2;
        Some(gap[open..close].to_string())
    }

    fn lower_property(
        &self,
        prop: &ast::PropertyDefinition<'_>,
        doc_comment: Option<String>,
    ) -> PropertyModel {
        PropertyModel {
            name: self.property_name(&prop.key, prop.computed),
            is_static: prop.r#static,
            optional: prop.optional,
            type_expr: prop
                .type_annotation
                .as_ref()
                .map(|annotation| self.lower_type(&annotation.type_annotation)),
            initializer: prop.value.as_ref().map(|value| self.lower_expr(value)),
            decorators: prop
                .decorators
                .iter()
                .filter_map(|d| self.lower_decorator(d))
                .collect(),
            doc_comment,
        }
    }

    fn property_name(&self, key: &ast::PropertyKey<'_>, computed: bool) -> Option<PropertyName> {
        if computed {
            return Some(PropertyName::Computed(self.text(key.span()).to_string()));
        }
        match key {
            ast::PropertyKey::StaticIdentifier(ident) => {
                Some(PropertyName::Identifier(ident.name.to_string()))
            }
            ast::PropertyKey::PrivateIdentifier(ident) => {
                Some(PropertyName::Private(ident.name.to_string()))
            }
            ast::PropertyKey::StringLiteral(lit) => Some(PropertyName::Quoted(lit.value.to_string())),
            ast::PropertyKey::NumericLiteral(_) => {
                Some(PropertyName::Quoted(self.text(key.span()).to_string()))
            }
            _ => None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TYPES
    // ═══════════════════════════════════════════════════════════════════════════

    fn lower_type(&self, ty: &ast::TSType<'_>) -> TypeExpr {
        match ty {
            ast::TSType::TSStringKeyword(_) => TypeExpr::Keyword(Keyword::String),
            ast::TSType::TSNumberKeyword(_) => TypeExpr::Keyword(Keyword::Number),
            ast::TSType::TSBooleanKeyword(_) => TypeExpr::Keyword(Keyword::Boolean),
            ast::TSType::TSBigIntKeyword(_) => TypeExpr::Keyword(Keyword::BigInt),
            ast::TSType::TSSymbolKeyword(_) => TypeExpr::Keyword(Keyword::Symbol),
            ast::TSType::TSAnyKeyword(_) => TypeExpr::Keyword(Keyword::Any),
            ast::TSType::TSUnknownKeyword(_) => TypeExpr::Keyword(Keyword::Unknown),
            ast::TSType::TSObjectKeyword(_) => TypeExpr::Keyword(Keyword::Object),
            ast::TSType::TSVoidKeyword(_) => TypeExpr::Keyword(Keyword::Void),
            ast::TSType::TSNeverKeyword(_) => TypeExpr::Keyword(Keyword::Never),
            ast::TSType::TSNullKeyword(_) => TypeExpr::Null,
            ast::TSType::TSUndefinedKeyword(_) => TypeExpr::Undefined,
            ast::TSType::TSArrayType(array) => TypeExpr::array_of(self.lower_type(&array.element_type)),
            ast::TSType::TSUnionType(union) => {
                TypeExpr::Union(union.types.iter().map(|t| self.lower_type(t)).collect())
            }
            ast::TSType::TSTypeReference(reference) => TypeExpr::Reference {
                name: self.text(reference.type_name.span()).to_string(),
                arguments: reference
                    .type_arguments
                    .as_ref()
                    .map(|args| args.params.iter().map(|t| self.lower_type(t)).collect())
                    .unwrap_or_default(),
            },
            ast::TSType::TSTypeLiteral(literal) => TypeExpr::ObjectLiteral(
                literal
                    .members
                    .iter()
                    .filter_map(|member| match member {
                        ast::TSSignature::TSPropertySignature(sig) => Some(self.lower_signature(sig)),
                        _ => None,
                    })
                    .collect(),
            ),
            ast::TSType::TSLiteralType(literal) => match &literal.literal {
                ast::TSLiteral::StringLiteral(lit) => {
                    TypeExpr::Literal(LiteralValue::String(lit.value.to_string()))
                }
                ast::TSLiteral::NumericLiteral(lit) => TypeExpr::Literal(LiteralValue::Number(lit.value)),
                ast::TSLiteral::BooleanLiteral(lit) => {
                    TypeExpr::Literal(LiteralValue::Boolean(lit.value))
                }
                _ => TypeExpr::Other(self.text(ty.span()).to_string()),
            },
            other => TypeExpr::Other(self.text(other.span()).to_string()),
        }
    }

    fn lower_signature(&self, sig: &ast::TSPropertySignature<'_>) -> PropertyModel {
        PropertyModel {
            name: self.property_name(&sig.key, sig.computed),
            optional: sig.optional,
            type_expr: sig
                .type_annotation
                .as_ref()
                .map(|annotation| self.lower_type(&annotation.type_annotation)),
            ..PropertyModel::default()
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EXPRESSIONS
    // ═══════════════════════════════════════════════════════════════════════════

    fn lower_decorator(&self, decorator: &ast::Decorator<'_>) -> Option<Decorator> {
        match &decorator.expression {
            ast::Expression::CallExpression(call) => {
                let name = callee_name(&call.callee)?;
                let arguments = call
                    .arguments
                    .iter()
                    .map(|arg| match arg.as_expression() {
                        Some(expr) => self.lower_expr(expr),
                        None => RawExpr::new(self.text(arg.span()), ExprKind::Other),
                    })
                    .collect();
                Some(Decorator::new(&name, arguments))
            }
            bare => callee_name(bare).map(|name| Decorator::new(&name, Vec::new())),
        }
    }

    fn lower_expr(&self, expr: &ast::Expression<'_>) -> RawExpr {
        let kind = match expr {
            ast::Expression::StringLiteral(lit) => {
                ExprKind::Literal(LiteralValue::String(lit.value.to_string()))
            }
            ast::Expression::NumericLiteral(lit) => ExprKind::Literal(LiteralValue::Number(lit.value)),
            ast::Expression::BooleanLiteral(lit) => ExprKind::Literal(LiteralValue::Boolean(lit.value)),
            ast::Expression::NullLiteral(_) => ExprKind::Literal(LiteralValue::Null),
            ast::Expression::UnaryExpression(unary) if unary.operator == UnaryOperator::UnaryNegation => {
                match &unary.argument {
                    ast::Expression::NumericLiteral(lit) => {
                        ExprKind::Literal(LiteralValue::Number(-lit.value))
                    }
                    _ => ExprKind::Other,
                }
            }
            ast::Expression::ArrayExpression(array) => array
                .elements
                .iter()
                .map(|element| element.as_expression().map(|e| self.lower_expr(e)))
                .collect::<Option<Vec<_>>>()
                .map(ExprKind::Array)
                .unwrap_or(ExprKind::Other),
            ast::Expression::ObjectExpression(object) => ExprKind::Object(
                object
                    .properties
                    .iter()
                    .filter_map(|property| match property {
                        ast::ObjectPropertyKind::ObjectProperty(p) if !p.computed => {
                            Some((static_key(&p.key)?, self.lower_expr(&p.value)))
                        }
                        _ => None,
                    })
                    .collect(),
            ),
            ast::Expression::ArrowFunctionExpression(arrow) => match arrow_body(arrow) {
                Some(body) => ExprKind::Arrow(Box::new(self.lower_expr(body))),
                None => ExprKind::Other,
            },
            ast::Expression::Identifier(_) | ast::Expression::StaticMemberExpression(_) => {
                match dotted_path(expr) {
                    Some(path) => ExprKind::Path(path),
                    None => ExprKind::Other,
                }
            }
            ast::Expression::TSAsExpression(e) => {
                ExprKind::TypeAssertion(Box::new(self.lower_expr(&e.expression)))
            }
            ast::Expression::TSSatisfiesExpression(e) => {
                ExprKind::TypeAssertion(Box::new(self.lower_expr(&e.expression)))
            }
            ast::Expression::TSTypeAssertion(e) => {
                ExprKind::TypeAssertion(Box::new(self.lower_expr(&e.expression)))
            }
            ast::Expression::TSNonNullExpression(e) => {
                ExprKind::TypeAssertion(Box::new(self.lower_expr(&e.expression)))
            }
            ast::Expression::ParenthesizedExpression(paren) => return self.lower_expr(&paren.expression),
            _ => ExprKind::Other,
        };
        RawExpr::new(self.text(expr.span()), kind)
    }
}

fn callee_name(callee: &ast::Expression<'_>) -> Option<String> {
    match callee {
        ast::Expression::Identifier(ident) => Some(ident.name.to_string()),
        ast::Expression::StaticMemberExpression(member) => Some(member.property.name.to_string()),
        _ => None,
    }
}

/// `Name` or `A.B.C`.
fn dotted_path(expr: &ast::Expression<'_>) -> Option<String> {
    match expr {
        ast::Expression::Identifier(ident) => Some(ident.name.to_string()),
        ast::Expression::StaticMemberExpression(member) => {
            Some(format!("{}.{}", dotted_path(&member.object)?, member.property.name))
        }
        _ => None,
    }
}

fn static_key(key: &ast::PropertyKey<'_>) -> Option<String> {
    match key {
        ast::PropertyKey::StaticIdentifier(ident) => Some(ident.name.to_string()),
        ast::PropertyKey::StringLiteral(lit) => Some(lit.value.to_string()),
        _ => None,
    }
}

/// The body of a concise arrow: `() => body`.
fn arrow_body<'b, 'a>(arrow: &'b ast::ArrowFunctionExpression<'a>) -> Option<&'b ast::Expression<'a>> {
    if !arrow.expression {
        return None;
    }
    match arrow.body.statements.first()? {
        ast::Statement::ExpressionStatement(stmt) => Some(&stmt.expression),
        _ => None,
    }
}
