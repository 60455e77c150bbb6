//! Discovery Module
//!
//! Finds DTO sources on disk and scans them into per-file metadata. Files are
//! independent, so a directory scan runs them in parallel.

#[cfg(feature = "napi")]
use napi_derive::napi;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::assembler::ResolveContext;
use crate::cache::MetadataCache;
use crate::docs::JsDocExtractor;
use crate::error::ScanError;
use crate::import_path::RequireNormalizer;
use crate::model::SourceFile;
use crate::options::PluginOptions;
use crate::oracle::SourceOracle;
use crate::parse::parse_source;
use crate::registry::MetadataRegistry;
use crate::scanner::{scan_class, ScannedClass};

// ═══════════════════════════════════════════════════════════════════════════════
// METADATA TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub path: String,
    /// Named classes in declaration order
    pub classes: Vec<ScannedClass>,
}

impl FileMetadata {
    pub fn class(&self, name: &str) -> Option<&ScannedClass> {
        self.classes.iter().find(|c| c.name == name)
    }
}

#[derive(Debug)]
pub struct DirectoryScan {
    /// Successfully scanned files, sorted by path
    pub files: Vec<FileMetadata>,
    pub failures: Vec<(PathBuf, ScanError)>,
    /// Every scanned class, for forcing lazy type references
    pub registry: MetadataRegistry,
}

// ═══════════════════════════════════════════════════════════════════════════════
// FILE SCAN
// ═══════════════════════════════════════════════════════════════════════════════

/// Parses and scans one source file.
#[tracing::instrument(level = "debug", skip(source, options))]
pub fn scan_source(
    source: &str,
    path: &str,
    options: &PluginOptions,
) -> Result<FileMetadata, ScanError> {
    let file = parse_source(source, path)?;
    Ok(scan_file(&file, options))
}

/// Scans every class of an already parsed file.
pub fn scan_file(file: &SourceFile, options: &PluginOptions) -> FileMetadata {
    let oracle = SourceOracle::new(&file.index, &file.path);
    let ctx = ResolveContext::new(
        &oracle,
        &RequireNormalizer,
        &JsDocExtractor,
        options,
        &file.path,
    );

    FileMetadata {
        path: file.path.clone(),
        classes: file
            .classes
            .iter()
            .filter_map(|class| scan_class(class, &ctx))
            .collect(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIRECTORY SCAN
// ═══════════════════════════════════════════════════════════════════════════════

/// Recursively find DTO sources under `dir`, sorted by path.
pub fn discover_dto_files(dir: &Path, options: &PluginOptions) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != "node_modules")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| options.is_dto_file(name))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

#[tracing::instrument(level = "debug", skip(options, cache), fields(dir = %dir.display()))]
pub fn scan_directory(
    dir: &Path,
    options: &PluginOptions,
    cache: Option<&MetadataCache>,
) -> DirectoryScan {
    let paths = discover_dto_files(dir, options);
    tracing::debug!(count = paths.len(), "discovered DTO files");

    let results: Vec<(PathBuf, Result<FileMetadata, ScanError>)> = paths
        .into_par_iter()
        .map(|path| {
            let result = scan_path(&path, options, cache);
            (path, result)
        })
        .collect();

    let mut files = Vec::new();
    let mut failures = Vec::new();
    for (path, result) in results {
        match result {
            Ok(metadata) => files.push(metadata),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping file");
                failures.push((path, err));
            }
        }
    }

    let mut registry = MetadataRegistry::new();
    for file in &files {
        for class in &file.classes {
            registry.register(&file.path, &class.name, class.metadata.clone());
        }
    }
    for reference in registry.dangling_references() {
        tracing::debug!(reference = %reference, "referenced class was not part of the scan");
    }

    DirectoryScan {
        files,
        failures,
        registry,
    }
}

fn scan_path(
    path: &Path,
    options: &PluginOptions,
    cache: Option<&MetadataCache>,
) -> Result<FileMetadata, ScanError> {
    let source = fs::read_to_string(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let path_str = path.to_string_lossy().replace('\\', "/");

    if let Some(hit) = cache.and_then(|c| c.get(&path_str, &source, options)) {
        return Ok(hit);
    }

    let metadata = scan_source(&source, &path_str, options)?;
    if let Some(cache) = cache {
        if let Err(err) = cache.set(&path_str, &source, options, &metadata) {
            tracing::warn!(error = %err, "failed to write cache entry");
        }
    }
    Ok(metadata)
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI BRIDGE
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
pub(crate) fn options_from_json(options_json: Option<String>) -> napi::Result<PluginOptions> {
    match options_json {
        Some(json) => PluginOptions::from_json(&json)
            .map_err(|e| napi::Error::from_reason(format!("Options parse error: {}", e))),
        None => Ok(PluginOptions::default()),
    }
}

/// Scans one source text; returns the file metadata as JSON.
#[cfg(feature = "napi")]
#[napi]
pub fn scan_source_native(
    source: String,
    file_path: String,
    options_json: Option<String>,
) -> napi::Result<String> {
    let options = options_from_json(options_json)?;
    let metadata = scan_source(&source, &file_path, &options)
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    serde_json::to_string(&metadata)
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}

/// Scans a directory; returns `{ files, failures }` as JSON.
#[cfg(feature = "napi")]
#[napi]
pub fn scan_directory_native(
    dir: String,
    options_json: Option<String>,
    cache_dir: Option<String>,
) -> napi::Result<String> {
    let options = options_from_json(options_json)?;
    let cache = cache_dir
        .map(MetadataCache::new)
        .transpose()
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;

    let scan = scan_directory(Path::new(&dir), &options, cache.as_ref());
    let failures: Vec<serde_json::Value> = scan
        .failures
        .iter()
        .map(|(path, err)| {
            serde_json::json!({ "path": path.to_string_lossy(), "error": err.to_string() })
        })
        .collect();
    let output = serde_json::json!({ "files": scan.files, "failures": failures });
    Ok(output.to_string())
}
