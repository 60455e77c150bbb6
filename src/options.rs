//! Plugin configuration.
//!
//! Mirrors the options object a JS host hands to the plugin. Every field has a default,
//! so `{}` is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::ScanError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginOptions {
    /// File name suffixes a directory scan treats as DTO sources
    pub dto_file_name_suffix: Vec<String>,
    /// Enables description/example enrichment from JSDoc comments
    pub introspect_comments: bool,
    /// Enables `minimum`/`maximum`/`minLength`/`maxLength` from validation decorators
    pub class_validator_shim: bool,
    /// Metadata key the comment description is written to
    pub dto_key_of_comment: String,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            dto_file_name_suffix: vec![".dto.ts".to_string(), ".entity.ts".to_string()],
            introspect_comments: false,
            class_validator_shim: true,
            dto_key_of_comment: "description".to_string(),
        }
    }
}

impl PluginOptions {
    pub fn from_json(json: &str) -> Result<Self, ScanError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Configuration for members of inline object-literal schemas: enrichers off.
    pub fn narrowed(&self) -> Self {
        Self {
            introspect_comments: false,
            class_validator_shim: false,
            ..Self::default()
        }
    }

    pub fn is_dto_file(&self, file_name: &str) -> bool {
        self.dto_file_name_suffix
            .iter()
            .any(|suffix| file_name.ends_with(suffix.as_str()))
    }

    /// Stable text form of the options, mixed into cache keys.
    pub fn fingerprint(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.dto_file_name_suffix.join(","),
            self.introspect_comments,
            self.class_validator_shim,
            self.dto_key_of_comment
        )
    }
}
