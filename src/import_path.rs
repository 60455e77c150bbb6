//! Import-path normalization for emitted type references.
//!
//! The oracle names types from other modules as `import("<module>").Name`. Emitted
//! metadata must load those modules relative to the file the metadata is attached to,
//! so every such reference is rewritten into `require("<relative module>").Name`.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Component, Path};

use crate::oracle::normalize_path;

lazy_static! {
    static ref IMPORT_REFERENCE_RE: Regex = Regex::new(r#"import\("([^"]+)"\)"#).unwrap();
}

pub trait ImportNormalizer {
    /// Rewrites a canonical reference for use inside `host_file`. Pure.
    fn normalize(&self, reference: &str, host_file: &str) -> String;
}

/// Rewrites `import("...")` references into host-relative `require("...")` calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequireNormalizer;

impl ImportNormalizer for RequireNormalizer {
    fn normalize(&self, reference: &str, host_file: &str) -> String {
        IMPORT_REFERENCE_RE
            .replace_all(reference, |caps: &regex::Captures| {
                let module = &caps[1];
                format!("require(\"{}\")", relative_specifier(host_file, module))
            })
            .to_string()
    }
}

/// Module specifier for `module` as seen from `host_file`. Package specifiers pass
/// through untouched.
pub fn relative_specifier(host_file: &str, module: &str) -> String {
    if !(module.starts_with('.') || module.starts_with('/')) {
        return module.to_string();
    }

    let from = normalize_path(Path::new(host_file).parent().unwrap_or_else(|| Path::new("")));
    let to = normalize_path(Path::new(module));
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = to.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    for _ in common..from.len() {
        segments.push("..".to_string());
    }
    for component in &to[common..] {
        segments.push(component.as_os_str().to_string_lossy().to_string());
    }

    let joined = segments.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{}", joined)
    }
}
