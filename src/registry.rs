//! Registry of finished class metadata.
//!
//! Lazy type descriptors name classes without resolving them. Once every class of a
//! scan is registered, [`MetadataRegistry::force`] evaluates a descriptor to the
//! metadata it points at, which is what makes forward and circular references work.

use std::path::Path;

use crate::metadata::{ClassMetadata, TypeDescriptor};
use crate::oracle::resolve_module;
use crate::visitor::{ReferenceCollector, TypeVisitor};

/// Constructor names that never correspond to a scanned class.
const BUILTIN_REFERENCES: &[&str] = &[
    "String", "Number", "Boolean", "BigInt", "Symbol", "Object", "Date", "Array", "Buffer",
    "Map", "Set", "Record", "Promise",
];

const SOURCE_EXTENSIONS: &[&str] = &[".d.ts", ".tsx", ".ts", ".mts", ".cts"];

#[derive(Debug, Clone, PartialEq)]
pub enum Forced<'r> {
    Class(&'r ClassMetadata),
    ArrayOf(Box<Forced<'r>>),
    /// Primitive or built-in reference with no class behind it
    Opaque(&'r TypeDescriptor),
}

/// A class is identified by its module (file path without extension) and its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassKey {
    pub module: String,
    pub name: String,
}

impl ClassKey {
    pub fn new(file: &str, name: &str) -> Self {
        Self {
            module: module_of(file),
            name: name.to_string(),
        }
    }

    /// The class a reference names, as seen from `referrer`: `require("./cat.dto").Cat`
    /// resolves against the referrer's directory, a bare `Cat` names a class of the
    /// referrer's own module.
    pub fn from_reference(reference: &str, referrer: &str) -> Self {
        match split_required(reference) {
            Some((specifier, name)) => Self {
                module: strip_extension(&resolve_module(referrer, specifier)).to_string(),
                name: name.to_string(),
            },
            None => Self::new(referrer, reference),
        }
    }
}

#[derive(Debug, Default)]
pub struct MetadataRegistry {
    classes: Vec<(ClassKey, ClassMetadata)>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the class `name` declared in `file`, replacing an earlier registration
    /// of the same class.
    pub fn register(&mut self, file: &str, name: &str, metadata: ClassMetadata) {
        let key = ClassKey::new(file, name);
        if let Some(slot) = self.classes.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = metadata;
        } else {
            self.classes.push((key, metadata));
        }
    }

    pub fn get(&self, file: &str, name: &str) -> Option<&ClassMetadata> {
        self.lookup(&ClassKey::new(file, name))
    }

    fn lookup(&self, key: &ClassKey) -> Option<&ClassMetadata> {
        self.classes.iter().find(|(k, _)| k == key).map(|(_, m)| m)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Evaluates a (possibly lazy) descriptor found in `referrer` one level deep.
    /// Returns `None` for a reference to a class that was never registered.
    pub fn force<'r>(&'r self, descriptor: &'r TypeDescriptor, referrer: &str) -> Option<Forced<'r>> {
        match descriptor.forced() {
            TypeDescriptor::Reference(name) => {
                match self.lookup(&ClassKey::from_reference(name, referrer)) {
                    Some(class) => Some(Forced::Class(class)),
                    None if is_builtin(name) => Some(Forced::Opaque(descriptor.forced())),
                    None => None,
                }
            }
            TypeDescriptor::ObjectLiteral(members) => Some(Forced::Class(members)),
            TypeDescriptor::ArrayOf(element) => self
                .force(element, referrer)
                .map(|f| Forced::ArrayOf(Box::new(f))),
            primitive => Some(Forced::Opaque(primitive)),
        }
    }

    /// Referenced classes that were never registered, as written, in first-seen order.
    pub fn dangling_references(&self) -> Vec<String> {
        let mut dangling: Vec<String> = Vec::new();
        for (key, class) in &self.classes {
            let mut collector = ReferenceCollector::default();
            for (_, property) in class.iter() {
                for (_, value) in property.iter() {
                    if let Some(descriptor) = value.as_type() {
                        collector.visit_descriptor(descriptor);
                    }
                }
            }

            for reference in collector.references {
                let unresolved = !is_builtin(&reference)
                    && self
                        .lookup(&ClassKey::from_reference(&reference, &key.module))
                        .is_none();
                if unresolved && !dangling.contains(&reference) {
                    dangling.push(reference);
                }
            }
        }
        dangling
    }
}

/// `require("./cat.dto").Cat` → `("./cat.dto", "Cat")`.
fn split_required(reference: &str) -> Option<(&str, &str)> {
    reference
        .strip_prefix("require(\"")?
        .split_once("\").")
}

fn strip_extension(path: &str) -> &str {
    SOURCE_EXTENSIONS
        .iter()
        .find_map(|ext| path.strip_suffix(ext))
        .unwrap_or(path)
}

/// Module path of a source file, normalized the way import specifiers are resolved.
fn module_of(file: &str) -> String {
    let stem = strip_extension(file);
    let file_name = Path::new(stem)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    resolve_module(stem, &format!("./{}", file_name))
}

fn is_builtin(name: &str) -> bool {
    BUILTIN_REFERENCES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{keys, ClassMetadataBuilder, MetadataBuilder, MetadataValue};

    fn class_with_reference(property: &str, target: &str) -> ClassMetadata {
        let mut record = MetadataBuilder::default();
        record.contribute(keys::REQUIRED, MetadataValue::Bool(true));
        record.contribute(
            keys::TYPE,
            MetadataValue::Type(TypeDescriptor::Reference(target.into()).lazy()),
        );
        let mut class = ClassMetadataBuilder::new();
        class.insert(property, record.finish());
        class.freeze()
    }

    #[test]
    fn test_circular_references_force_one_level() {
        let mut registry = MetadataRegistry::new();
        // Forward reference: Owner is registered after Cat points at it.
        registry.register("src/cat.dto.ts", "Cat", class_with_reference("owner", "Owner"));
        registry.register("src/cat.dto.ts", "Owner", class_with_reference("cat", "Cat"));

        let cat = registry.get("src/cat.dto.ts", "Cat").unwrap();
        let owner_type = cat.get("owner").unwrap().get(keys::TYPE).unwrap().as_type().unwrap();
        let Some(Forced::Class(owner)) = registry.force(owner_type, "src/cat.dto.ts") else {
            panic!("owner should force to a class");
        };
        let back = owner.get("cat").unwrap().get(keys::TYPE).unwrap().as_type().unwrap();
        assert_eq!(registry.force(back, "src/cat.dto.ts"), Some(Forced::Class(cat)));
        assert!(registry.dangling_references().is_empty());
    }

    #[test]
    fn test_required_paths_resolve_against_the_referrer() {
        let mut registry = MetadataRegistry::new();
        registry.register("src/cats/cat.dto.ts", "Cat", ClassMetadata::default());
        let descriptor =
            TypeDescriptor::array_of(TypeDescriptor::Reference("require(\"../cats/cat.dto\").Cat".into()))
                .lazy();
        assert!(matches!(
            registry.force(&descriptor, "src/owners/owner.dto.ts"),
            Some(Forced::ArrayOf(inner)) if matches!(*inner, Forced::Class(_))
        ));
        assert_eq!(registry.force(&descriptor, "src/owner.dto.ts"), None);
    }

    #[test]
    fn test_same_name_in_different_modules() {
        let mut registry = MetadataRegistry::new();
        registry.register("src/a/cat.dto.ts", "Cat", class_with_reference("a", "String"));
        registry.register("src/b/cat.dto.ts", "Cat", class_with_reference("b", "String"));
        assert_eq!(registry.len(), 2);

        let from_a = TypeDescriptor::Reference("require(\"./a/cat.dto\").Cat".into()).lazy();
        let from_b = TypeDescriptor::Reference("require(\"./b/cat.dto\").Cat".into()).lazy();
        let Some(Forced::Class(a)) = registry.force(&from_a, "src/owner.dto.ts") else {
            panic!("./a/cat.dto should be registered");
        };
        let Some(Forced::Class(b)) = registry.force(&from_b, "src/owner.dto.ts") else {
            panic!("./b/cat.dto should be registered");
        };
        assert!(a.get("a").is_some() && a.get("b").is_none());
        assert!(b.get("b").is_some() && b.get("a").is_none());

        let local = TypeDescriptor::Reference("Cat".into());
        assert_eq!(
            registry.force(&local, "src/b/cat.dto.ts"),
            Some(Forced::Class(b))
        );
    }

    #[test]
    fn test_dangling_references_skip_builtins() {
        let mut registry = MetadataRegistry::new();
        registry.register("cat.dto.ts", "Cat", class_with_reference("owner", "Owner"));
        registry.register("cat.dto.ts", "Dog", class_with_reference("born", "Date"));
        assert_eq!(registry.dangling_references(), vec!["Owner".to_string()]);
        assert_eq!(
            registry.force(&TypeDescriptor::Reference("Owner".into()).lazy(), "cat.dto.ts"),
            None
        );
    }

    #[test]
    fn test_class_keys() {
        assert_eq!(
            ClassKey::new("/app/src/cat.dto.ts", "Cat"),
            ClassKey {
                module: "/app/src/cat.dto".into(),
                name: "Cat".into()
            }
        );
        assert_eq!(
            ClassKey::from_reference("require(\"../cat.dto\").Cat", "/app/src/owners/owner.dto.ts"),
            ClassKey::new("/app/src/cat.dto.ts", "Cat")
        );
        assert_eq!(ClassKey::new("cat.dto.ts", "Cat").module, "./cat.dto");
    }
}
