use crate::metadata::{ClassMetadata, TypeDescriptor};

/// The TypeVisitor trait defines the single traversal mechanism over `TypeDescriptor` trees.
///
/// Rules:
/// 1. Implementers override `visit_*` methods to add behavior.
/// 2. Implementers call the matching `walk_*` function to continue traversal unless
///    pruning is intended.
/// 3. Object literals are walked through every member's `type` descriptor, in member order.
pub trait TypeVisitor {
    fn visit_descriptor(&mut self, descriptor: &TypeDescriptor) {
        walk_descriptor(self, descriptor);
    }

    fn visit_primitive(&mut self, _name: &str) {
        // Leaf
    }

    fn visit_reference(&mut self, _name: &str) {
        // Leaf
    }

    fn visit_array(&mut self, element: &TypeDescriptor) {
        walk_array(self, element);
    }

    fn visit_object_literal(&mut self, members: &ClassMetadata) {
        walk_object_literal(self, members);
    }

    fn visit_lazy(&mut self, inner: &TypeDescriptor) {
        walk_lazy(self, inner);
    }
}

pub fn walk_descriptor<V: TypeVisitor + ?Sized>(visitor: &mut V, descriptor: &TypeDescriptor) {
    match descriptor {
        TypeDescriptor::Primitive(name) => visitor.visit_primitive(name),
        TypeDescriptor::Reference(name) => visitor.visit_reference(name),
        TypeDescriptor::ArrayOf(element) => visitor.visit_array(element),
        TypeDescriptor::ObjectLiteral(members) => visitor.visit_object_literal(members),
        TypeDescriptor::Lazy(inner) => visitor.visit_lazy(inner),
    }
}

pub fn walk_array<V: TypeVisitor + ?Sized>(visitor: &mut V, element: &TypeDescriptor) {
    visitor.visit_descriptor(element);
}

pub fn walk_lazy<V: TypeVisitor + ?Sized>(visitor: &mut V, inner: &TypeDescriptor) {
    visitor.visit_descriptor(inner);
}

pub fn walk_object_literal<V: TypeVisitor + ?Sized>(visitor: &mut V, members: &ClassMetadata) {
    for (_, metadata) in members.iter() {
        for (_, value) in metadata.iter() {
            if let Some(descriptor) = value.as_type() {
                visitor.visit_descriptor(descriptor);
            }
        }
    }
}

/// Collects every referenced name, in first-seen order.
#[derive(Debug, Default)]
pub struct ReferenceCollector {
    pub references: Vec<String>,
}

impl TypeVisitor for ReferenceCollector {
    fn visit_reference(&mut self, name: &str) {
        if !self.references.iter().any(|r| r == name) {
            self.references.push(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{keys, ClassMetadataBuilder, MetadataBuilder, MetadataValue};

    #[test]
    fn test_collects_references_through_nesting() {
        let mut member = MetadataBuilder::default();
        member.contribute(
            keys::TYPE,
            MetadataValue::Type(TypeDescriptor::Reference("Owner".into()).lazy()),
        );
        let mut literal = ClassMetadataBuilder::new();
        literal.insert("owner", member.finish());

        let descriptor = TypeDescriptor::array_of(TypeDescriptor::ObjectLiteral(literal.freeze()))
            .lazy();
        let mut collector = ReferenceCollector::default();
        collector.visit_descriptor(&descriptor);
        collector.visit_descriptor(&TypeDescriptor::Reference("Owner".into()));
        collector.visit_descriptor(&TypeDescriptor::Primitive("string".into()));

        assert_eq!(collector.references, vec!["Owner".to_string()]);
    }
}
