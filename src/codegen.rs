//! Codegen module
//!
//! Renders finished class metadata as JavaScript: the object literal itself, and the
//! static provider method a host attaches to the class.

#[cfg(feature = "napi")]
use napi_derive::napi;

use crate::metadata::{ClassMetadata, LiteralValue, MetadataValue, PropertyMetadata, TypeDescriptor};
use crate::visitor::{walk_array, walk_lazy, TypeVisitor};

/// Name of the static method that returns a class's property metadata.
pub const METADATA_FACTORY: &str = "_OPENAPI_METADATA_FACTORY";

/// `{ name: { required: true, type: () => String }, ... }`
pub fn render_class_metadata(metadata: &ClassMetadata) -> String {
    let mut renderer = MetadataRenderer::default();
    renderer.write_class(metadata);
    renderer.out
}

/// `static _OPENAPI_METADATA_FACTORY() { return {...}; }`
pub fn render_metadata_factory(metadata: &ClassMetadata) -> String {
    format!(
        "static {}() {{\n    return {};\n}}",
        METADATA_FACTORY,
        render_class_metadata(metadata)
    )
}

#[cfg(feature = "napi")]
#[napi(object)]
pub struct ClassFactory {
    pub class_name: String,
    pub factory: String,
}

/// Scans `source` and renders the provider method for every named class.
#[cfg(feature = "napi")]
#[napi]
pub fn render_metadata_factory_native(
    source: String,
    file_path: String,
    options_json: Option<String>,
) -> napi::Result<Vec<ClassFactory>> {
    let options = crate::discovery::options_from_json(options_json)?;
    let metadata = crate::discovery::scan_source(&source, &file_path, &options)
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    Ok(metadata
        .classes
        .iter()
        .map(|class| ClassFactory {
            class_name: class.name.clone(),
            factory: render_metadata_factory(&class.metadata),
        })
        .collect())
}

// ═══════════════════════════════════════════════════════════════════════════════
// RENDERER
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct MetadataRenderer {
    out: String,
}

impl MetadataRenderer {
    fn write_class(&mut self, class: &ClassMetadata) {
        if class.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push_str("{ ");
        for (i, (name, property)) in class.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.write_key(name);
            self.out.push_str(": ");
            self.write_property(property);
        }
        self.out.push_str(" }");
    }

    fn write_property(&mut self, property: &PropertyMetadata) {
        if property.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push_str("{ ");
        for (i, (key, value)) in property.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.write_key(key);
            self.out.push_str(": ");
            self.write_value(value);
        }
        self.out.push_str(" }");
    }

    fn write_key(&mut self, key: &str) {
        if oxc_syntax::identifier::is_identifier_name(key) {
            self.out.push_str(key);
        } else {
            self.out.push_str(&js_string(key));
        }
    }

    fn write_value(&mut self, value: &MetadataValue) {
        match value {
            MetadataValue::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            MetadataValue::Number(n) => self.out.push_str(&js_number(*n)),
            MetadataValue::Text(text) => self.out.push_str(&js_string(text)),
            MetadataValue::Literal(literal) => self.write_literal(literal),
            MetadataValue::Examples(items) => self.write_sequence(items),
            MetadataValue::Type(descriptor) => self.visit_descriptor(descriptor),
            MetadataValue::Enum(enum_ref) => self.out.push_str(&enum_ref.name),
            MetadataValue::Expression(text) => self.out.push_str(text),
        }
    }

    fn write_literal(&mut self, literal: &LiteralValue) {
        match literal {
            LiteralValue::Null => self.out.push_str("null"),
            LiteralValue::Boolean(b) => self.out.push_str(if *b { "true" } else { "false" }),
            LiteralValue::Number(n) => self.out.push_str(&js_number(*n)),
            LiteralValue::String(s) => self.out.push_str(&js_string(s)),
            LiteralValue::Sequence(items) => self.write_sequence(items),
        }
    }

    fn write_sequence(&mut self, items: &[LiteralValue]) {
        self.out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.write_literal(item);
        }
        self.out.push(']');
    }
}

impl TypeVisitor for MetadataRenderer {
    fn visit_primitive(&mut self, name: &str) {
        self.out.push_str(&js_string(name));
    }

    fn visit_reference(&mut self, name: &str) {
        self.out.push_str(name);
    }

    fn visit_array(&mut self, element: &TypeDescriptor) {
        self.out.push('[');
        walk_array(self, element);
        self.out.push(']');
    }

    fn visit_object_literal(&mut self, members: &ClassMetadata) {
        self.write_class(members);
    }

    fn visit_lazy(&mut self, inner: &TypeDescriptor) {
        self.out.push_str("() => ");
        // An object literal body needs parentheses to not read as a block.
        if let TypeDescriptor::ObjectLiteral(_) = inner {
            self.out.push('(');
            walk_lazy(self, inner);
            self.out.push(')');
        } else {
            walk_lazy(self, inner);
        }
    }
}

fn js_string(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

fn js_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        (if n > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
