//! # DTO Property Metadata
//!
//! Static analysis of TypeScript DTO classes: for every eligible property, a metadata
//! record (`required`, `type`, `nullable`, `enum`, `isArray`, `default`, bounds, docs)
//! that a host attaches to the class as `static _OPENAPI_METADATA_FACTORY()`.
//!
//! ## Pipeline
//!
//! 1. **Parse**: oxc parses the source; classes, enums, aliases and imports are lowered
//!    into the owned model (`model`).
//! 2. **Resolve**: per property, explicit `@ApiProperty` keys are seeded, then the
//!    resolvers contribute in a fixed order. First write wins.
//! 3. **Scan**: the class scanner isolates failures per property.
//! 4. **Link**: lazy type references are forced against the registry once every file of
//!    a directory scan is known, so circular class references are fine.
//! 5. **Render**: codegen emits the provider method.

mod annotations;
mod assembler;
mod cache;
mod codegen;
mod discovery;
mod docs;
mod enrich;
mod enum_resolver;
mod error;
mod import_path;
mod metadata;
mod model;
mod options;
mod oracle;
mod parse;
mod registry;
mod scanner;
mod type_resolver;
mod visitor;

#[cfg(test)]
mod parse_tests;

pub use assembler::{resolve_property, scan_members, ResolveContext, MAX_NESTING_DEPTH};
pub use cache::MetadataCache;
pub use codegen::{render_class_metadata, render_metadata_factory, METADATA_FACTORY};
pub use discovery::{
    discover_dto_files, scan_directory, scan_file, scan_source, DirectoryScan, FileMetadata,
};
pub use docs::{DocExtractor, DocSummary, JsDocExtractor};
pub use error::{ResolveError, ScanError};
pub use import_path::{ImportNormalizer, RequireNormalizer};
pub use metadata::{
    keys, ClassMetadata, Contribution, EnumRef, LiteralValue, MetadataValue, PropertyMetadata,
    TypeDescriptor,
};
pub use model::{ClassModel, PropertyModel, SourceFile, TypeExpr};
pub use options::PluginOptions;
pub use oracle::{SourceOracle, TypeOracle};
pub use parse::parse_source;
pub use registry::{ClassKey, Forced, MetadataRegistry};
pub use scanner::{scan_class, scan_properties, ScannedClass};
pub use visitor::TypeVisitor;

// Native bridge
#[cfg(feature = "napi")]
pub use codegen::{render_metadata_factory_native, ClassFactory};
#[cfg(feature = "napi")]
pub use discovery::{scan_directory_native, scan_source_native};
