//! Master code template sources.
//!
//! Every target system ships a code template at `<system>/code_template`.
//! It is fetched once, before the first generation pass.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{CodegenError, CodegenResult};

/// Relative location of the code template of `system_prefix`.
pub fn template_path(system_prefix: &str) -> String {
    format!("{system_prefix}/code_template")
}

/// Fetches text resources by relative path.
pub trait TemplateSource {
    fn fetch_text(&self, path: &str) -> CodegenResult<String>;
}

/// Reads resources from a directory tree on disk.
#[derive(Debug, Clone)]
pub struct DirTemplateSource {
    root: PathBuf,
}

impl DirTemplateSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateSource for DirTemplateSource {
    fn fetch_text(&self, path: &str) -> CodegenResult<String> {
        std::fs::read_to_string(self.root.join(path)).map_err(|e| CodegenError::TemplateFetch {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

/// In-memory resources keyed by path.
impl TemplateSource for HashMap<String, String> {
    fn fetch_text(&self, path: &str) -> CodegenResult<String> {
        self.get(path)
            .cloned()
            .ok_or_else(|| CodegenError::TemplateFetch {
                path: path.to_string(),
                reason: "not found".to_string(),
            })
    }
}
