//! Code buckets accumulated during one generation pass.
//!
//! Blocks push cross-cutting code here (libraries, defines, setup lines...)
//! while the orchestrator fills the signature, block, device and main
//! buckets. A fresh state is created for every pass.

use serde::Serialize;

/// Per-pass code buckets, one per template hook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationState {
    pub defines_code: String,
    /// Required libraries in first-insertion order, without duplicates.
    pub libraries: Vec<String>,
    pub global_var_code: String,
    pub init_hook_code: String,
    pub setup_hook_code: String,
    /// Appended after the setup hook code, separated by blank lines.
    pub setup_hook_code_add: String,
    pub signature_code: String,
    pub block_code: String,
    pub main_code: String,
    pub device_code: String,
}

impl GenerationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `library`. Adding it again is a no-op.
    pub fn add_library(&mut self, library: &str) {
        if !self.libraries.iter().any(|l| l == library) {
            self.libraries.push(library.to_string());
        }
    }

    pub fn add_defines_code(&mut self, code: &str, prepend: bool) {
        add_unique(&mut self.defines_code, code, prepend);
    }

    pub fn add_setup_code(&mut self, code: &str, prepend: bool) {
        add_unique(&mut self.setup_hook_code, code, prepend);
    }

    /// Add code placed after everything in the setup hook.
    pub fn append_setup_code(&mut self, code: &str) {
        add_unique(&mut self.setup_hook_code_add, code, false);
    }

    pub fn add_init_code(&mut self, code: &str, prepend: bool) {
        add_unique(&mut self.init_hook_code, code, prepend);
    }

    pub fn add_global_var_code(&mut self, code: &str) {
        add_unique(&mut self.global_var_code, code, false);
    }
}

/// Add `code` to `buffer` on its own line unless the buffer already contains
/// it anywhere, even as part of a longer line.
fn add_unique(buffer: &mut String, code: &str, prepend: bool) {
    if buffer.contains(code) {
        return;
    }
    if prepend {
        if !buffer.is_empty() {
            buffer.insert(0, '\n');
        }
        buffer.insert_str(0, code);
    } else {
        if !buffer.is_empty() {
            buffer.push('\n');
        }
        buffer.push_str(code);
    }
}
