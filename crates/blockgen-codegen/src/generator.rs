//! Workspace orchestration.
//!
//! Drives a full pass over the editor workspace:
//! 1. Reset the pass state and the error sink
//! 2. Run the target's `init_generator` hook
//! 3. Classify top-level blocks (devices, main, functions/ISRs)
//! 4. Resolve them last to first, routing code into buckets
//! 5. Run the target's `check_options` hook
//! 6. Splice the buckets into the code template hooks
//! 7. Scrub surplus whitespace

use blockgen_types::{Block, ErrorSink, GeneratorConfig, Keywords, Workspace};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{CodegenError, CodegenResult};
use crate::generation::Generation;
use crate::loader::{template_path, TemplateSource};
use crate::registry::CodeRegistry;
use crate::state::GenerationState;
use crate::system::{CSystem, TargetSystem};

/// Hook markers recognised in the code template.
pub mod hooks {
    pub const DEFINES: &str = "###defines###";
    pub const LIBRARIES: &str = "###libraries###";
    pub const GLOBALVARS: &str = "###globalvars###";
    pub const MAIN: &str = "###main###";
    pub const INITHOOK: &str = "###inithook###";
    pub const SETUPHOOK: &str = "###setuphook###";
    pub const BLOCKS: &str = "###blocks###";
    pub const DEVICES: &str = "###devices###";
    pub const SIGNATURES: &str = "###signatures###";
}

const DEVICES_TYPE: &str = "devices";
const MAIN_PREFIX: &str = "main";

/// Function declarations and interrupt/event handlers.
fn is_routine(block_type: &str) -> bool {
    block_type == "func_decl" || block_type == "int_isr" || block_type.starts_with("event_isr_")
}

/// Output of one pass: the finished code and the buckets it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedCode {
    pub code: String,
    pub state: GenerationState,
}

// ══════════════════════════════════════════════════════════════════════════════
// CodeGenerator
// ══════════════════════════════════════════════════════════════════════════════

/// Generator for one target system.
///
/// Holds the configuration, the code registry, the target hooks and the
/// loaded code template. Passes borrow it immutably and own their state,
/// so a generator can serve several passes at once.
pub struct CodeGenerator {
    config: GeneratorConfig,
    registry: CodeRegistry,
    system: Box<dyn TargetSystem>,
    code_template: Option<String>,
}

impl CodeGenerator {
    /// Generator with the plain C target hooks.
    pub fn new(config: GeneratorConfig) -> CodegenResult<Self> {
        Self::with_system(config, Box::new(CSystem))
    }

    pub fn with_system(
        config: GeneratorConfig,
        system: Box<dyn TargetSystem>,
    ) -> CodegenResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: CodeRegistry::new(),
            system,
            code_template: None,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn registry(&self) -> &CodeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CodeRegistry {
        &mut self.registry
    }

    pub fn keywords(&self) -> &Keywords {
        &self.config.keywords
    }

    pub fn keyword<'a>(&'a self, tag: &'a str) -> &'a str {
        self.config.keywords.keyword(tag)
    }

    pub fn set_keyword(&mut self, tag: &str, word: &str) {
        self.config.keywords.set_keyword(tag, word);
    }

    // ── Code template ────────────────────────────────────────────────────

    /// Fetch the code template of the active system from `source`.
    ///
    /// A failed fetch is logged and leaves the generator without a
    /// template; later passes then fail with
    /// [`CodegenError::TemplateNotLoaded`].
    pub fn init(&mut self, source: &dyn TemplateSource) {
        if let Err(err) = self.try_init(source) {
            warn!(system = %self.config.system_prefix, "{err}");
        }
    }

    /// Like [`init`](Self::init) but returns the fetch error.
    pub fn try_init(&mut self, source: &dyn TemplateSource) -> CodegenResult<()> {
        let path = template_path(&self.config.system_prefix);
        let text = source.fetch_text(&path)?;
        debug!(%path, len = text.len(), "code template loaded");
        self.code_template = Some(text);
        Ok(())
    }

    pub fn set_code_template(&mut self, text: impl Into<String>) {
        self.code_template = Some(text.into());
    }

    pub fn code_template(&self) -> Option<&str> {
        self.code_template.as_deref()
    }

    // ── Generation pass ──────────────────────────────────────────────────

    /// Generate the complete program for `workspace`.
    ///
    /// Block problems are reported to `errors` and do not fail the pass.
    /// `errors` is cleared first, even when the pass then fails.
    pub fn workspace_to_code(
        &self,
        workspace: &dyn Workspace,
        errors: &mut dyn ErrorSink,
    ) -> CodegenResult<String> {
        self.generate(workspace, errors).map(|out| out.code)
    }

    /// Like [`workspace_to_code`](Self::workspace_to_code), also returning
    /// the pass's code buckets.
    pub fn generate(
        &self,
        workspace: &dyn Workspace,
        errors: &mut dyn ErrorSink,
    ) -> CodegenResult<GeneratedCode> {
        errors.clear();
        let template = self
            .code_template
            .as_deref()
            .ok_or_else(|| CodegenError::TemplateNotLoaded(self.config.system_prefix.clone()))?;

        let mut gen = Generation::new(&self.registry, self.system.as_ref(), &self.config, errors);
        self.system.init_generator(&mut gen);

        let top_blocks = workspace.top_blocks();
        let slots = classify(&top_blocks);
        debug!(
            system = %self.config.system_prefix,
            top_blocks = top_blocks.len(),
            routines = slots.len() - 2,
            "generating code"
        );

        // Routines first, main last: handlers register the globals they touch
        // before the main block is resolved.
        for block in slots.iter().rev().flatten() {
            let line = gen.top_block_to_code(*block);
            if line.is_empty() {
                continue;
            }
            let block_type = block.block_type();
            let state = gen.state_mut();
            if is_routine(block_type) {
                state.signature_code.push_str(&block.signature().unwrap_or_default());
                state.signature_code.push_str(";\n");
                state.block_code.push_str(&line);
            } else if block_type == DEVICES_TYPE {
                state.device_code.push_str(&line);
            } else {
                state.main_code.push_str(&line);
            }
        }

        self.system.check_options(&mut gen);
        let state = gen.finish()?;

        let libraries = self.system.libraries_code(&state.libraries);
        let code = splice(template, &state, &libraries, &self.config.indent);
        debug!(len = code.len(), "code generated");
        Ok(GeneratedCode { code, state })
    }
}

/// Slot 0: devices block, slot 1: main block, then routines in editor order.
///
/// Other top-level blocks are ignored. A repeated devices or main block
/// replaces the earlier one.
fn classify<'b>(blocks: &[&'b dyn Block]) -> Vec<Option<&'b dyn Block>> {
    let mut slots: Vec<Option<&'b dyn Block>> = vec![None, None];
    for &block in blocks {
        let block_type = block.block_type();
        if block_type == DEVICES_TYPE {
            slots[0] = Some(block);
        } else if block_type.starts_with(MAIN_PREFIX) {
            slots[1] = Some(block);
        } else if is_routine(block_type) {
            slots.push(Some(block));
        }
    }
    slots
}

// ══════════════════════════════════════════════════════════════════════════════
// Template splicing
// ══════════════════════════════════════════════════════════════════════════════

/// Replace every hook marker in `template` with its bucket.
fn splice(template: &str, state: &GenerationState, libraries: &str, indent: &str) -> String {
    let code = template
        .replace(hooks::GLOBALVARS, &state.global_var_code)
        .replace(hooks::BLOCKS, &state.block_code)
        .replace(hooks::DEVICES, &state.device_code)
        .replace(hooks::SIGNATURES, &state.signature_code)
        .replace(hooks::DEFINES, &state.defines_code)
        .replace(hooks::LIBRARIES, libraries)
        .replace(hooks::INITHOOK, &state.init_hook_code);

    let mut setup = state.setup_hook_code.clone();
    if !state.setup_hook_code_add.is_empty() {
        setup.push('\n');
        setup.push_str(&state.setup_hook_code_add);
        setup.push('\n');
    }
    let code = code
        .replace(hooks::SETUPHOOK, &indent_hook(&setup, indent))
        .replace(hooks::MAIN, &indent_hook(&state.main_code, indent));

    scrub_whitespace(&code)
}

/// Indent a hook placed inside a function body: every line gets `indent`
/// and the result ends with a newline.
fn indent_hook(code: &str, indent: &str) -> String {
    let mut out = code.replace('\n', &format!("\n{indent}"));
    out.push('\n');
    if !out.starts_with(indent) {
        out.insert_str(0, indent);
    }
    out
}

/// Drop a leading blank region, collapse trailing blank lines into one
/// newline and strip trailing spaces and tabs from every line.
fn scrub_whitespace(code: &str) -> String {
    let code = strip_leading_blank(code);
    let code = collapse_trailing_blank(code);
    strip_trailing_spaces(&code)
}

/// Remove leading whitespace up to its last newline, provided at least one
/// whitespace character precedes that newline.
fn strip_leading_blank(code: &str) -> &str {
    let lead = &code[..code.len() - code.trim_start().len()];
    match lead.rfind('\n') {
        Some(pos) if pos > 0 => &code[pos + 1..],
        _ => code,
    }
}

/// Replace an all-whitespace tail that starts with a newline and has
/// something after it by a single newline.
fn collapse_trailing_blank(code: &str) -> String {
    let body_end = code.trim_end().len();
    match code[body_end..].find('\n') {
        Some(pos) if body_end + pos + 1 < code.len() => {
            let mut out = code[..body_end + pos].to_string();
            out.push('\n');
            out
        }
        _ => code.to_string(),
    }
}

fn strip_trailing_spaces(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut lines = code.split('\n').peekable();
    while let Some(line) = lines.next() {
        if lines.peek().is_some() {
            out.push_str(line.trim_end_matches(|c| c == ' ' || c == '\t'));
            out.push('\n');
        } else {
            out.push_str(line);
        }
    }
    out
}
