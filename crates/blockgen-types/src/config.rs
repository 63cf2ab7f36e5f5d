//! Generator configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keywords::{Keywords, ReservedWords};

/// Indent used for statement bodies and the setup/main hooks.
pub const DEFAULT_INDENT: &str = "   ";

/// Default nesting limit before a pass is aborted.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Default number of blocks walked in one statement chain.
pub const DEFAULT_MAX_CHAIN_LEN: usize = 4096;

/// Errors raised while loading a [`GeneratorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid generator config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid generator config: {0}")]
    Invalid(String),
}

/// Settings for one target system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Active target system, e.g. `"arduino"`. Locates the code template
    /// and decides which system-restricted blocks are compatible.
    pub system_prefix: String,
    /// Indent applied to statement bodies and to the setup/main hooks.
    pub indent: String,
    /// Maximum nesting depth of block resolution.
    pub max_depth: usize,
    /// Maximum number of blocks in one statement chain.
    pub max_chain_len: usize,
    pub keywords: Keywords,
    pub reserved_words: ReservedWords,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            system_prefix: "arduino".to_string(),
            indent: DEFAULT_INDENT.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_chain_len: DEFAULT_MAX_CHAIN_LEN,
            keywords: Keywords::new(),
            reserved_words: ReservedWords::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn new(system_prefix: impl Into<String>) -> Self {
        Self {
            system_prefix: system_prefix.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON configuration. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system_prefix.is_empty() {
            return Err(ConfigError::Invalid("system_prefix must not be empty".into()));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be positive".into()));
        }
        if self.max_chain_len == 0 {
            return Err(ConfigError::Invalid("max_chain_len must be positive".into()));
        }
        if !self.indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(ConfigError::Invalid(format!(
                "indent must be spaces or tabs, got {:?}",
                self.indent
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.indent, "   ");
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_chain_len, DEFAULT_MAX_CHAIN_LEN);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = GeneratorConfig::from_json(
            r#"{ "system_prefix": "calliope", "keywords": [["NUMBER", "int"]] }"#,
        )
        .unwrap();
        assert_eq!(config.system_prefix, "calliope");
        assert_eq!(config.keywords.keyword("NUMBER"), "int");
        assert_eq!(config.indent, DEFAULT_INDENT);
    }

    #[test]
    fn test_from_json_rejects_zero_depth() {
        let err = GeneratorConfig::from_json(r#"{ "max_depth": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_from_json_rejects_zero_chain_len() {
        let err = GeneratorConfig::from_json(r#"{ "max_chain_len": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("max_chain_len"));
    }

    #[test]
    fn test_from_json_rejects_bad_indent() {
        let err = GeneratorConfig::from_json(r#"{ "indent": "--" }"#).unwrap_err();
        assert!(err.to_string().contains("indent"));
    }

    #[test]
    fn test_from_json_syntax_error() {
        let err = GeneratorConfig::from_json("{").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
