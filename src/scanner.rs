//! Class Scanner
//!
//! Turns a class's property list into its [`ClassMetadata`]. A property that fails to
//! resolve is dropped on its own; the rest of the class is still described.

use serde::{Deserialize, Serialize};

use crate::annotations;
use crate::assembler::{resolve_property, ResolveContext};
use crate::metadata::{ClassMetadata, ClassMetadataBuilder};
use crate::model::{ClassModel, PropertyModel};
use crate::oracle::TypeOracle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedClass {
    pub name: String,
    pub metadata: ClassMetadata,
}

/// Scans a named class. Anonymous classes produce nothing.
#[tracing::instrument(level = "debug", skip_all, fields(class = class.name.as_deref().unwrap_or("<anonymous>")))]
pub fn scan_class<O: TypeOracle>(
    class: &ClassModel,
    ctx: &ResolveContext<'_, O>,
) -> Option<ScannedClass> {
    let Some(name) = &class.name else {
        tracing::debug!("skipping class without a name");
        return None;
    };
    Some(ScannedClass {
        name: name.clone(),
        metadata: scan_properties(&class.properties, ctx),
    })
}

/// Metadata for every eligible property, with per-property failure isolation.
pub fn scan_properties<O: TypeOracle>(
    properties: &[PropertyModel],
    ctx: &ResolveContext<'_, O>,
) -> ClassMetadata {
    let mut class = ClassMetadataBuilder::new();

    for property in properties {
        if annotations::is_hidden(&property.decorators) || property.is_static {
            continue;
        }
        let Some(name) = property.identifier_name() else {
            tracing::trace!(property = ?property.name, "skipping unrepresentable property name");
            continue;
        };

        match resolve_property(property, ctx) {
            Ok(record) => class.insert(name, record),
            Err(err) => {
                tracing::debug!(property = name, error = %err, "dropping property");
            }
        }
    }

    class.freeze()
}
