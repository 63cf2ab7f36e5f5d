//! One generation pass: block resolution and input traversal.
//!
//! A [`Generation`] owns the [`GenerationState`] of a single pass and
//! borrows everything else from the [`CodeGenerator`](crate::CodeGenerator).
//! [`Generation::to_code`] is the single recursive entry point; every
//! traversal helper funnels nested blocks back through it.
//!
//! Block problems never abort the pass. They are reported to the error sink
//! and the traversal returns best-effort code. The only aborts are the depth
//! guard and the chain length limit, surfaced by [`Generation::finish`].

use blockgen_types::{
    value_type, Block, CodeContext, ErrorKind, ErrorSink, GeneratorConfig, ILLEGAL_ANALOG_PIN,
    PLACEHOLDER_SENTINELS,
};
use tracing::{trace, warn};

use crate::error::{CodegenError, CodegenResult};
use crate::registry::{CodeEntry, CodeRegistry, Placeholder, TemplateDescriptor};
use crate::state::GenerationState;
use crate::system::TargetSystem;

/// Comment marker placement, see [`Generation::top_block_to_code`] and
/// [`Generation::block_to_code`].
const TOP_LINE_COMMENT: &str = "// ";
const NESTED_LINE_COMMENT: &str = "\t// ";

/// State and collaborators of one generation pass.
pub struct Generation<'a> {
    registry: &'a CodeRegistry,
    system: &'a dyn TargetSystem,
    config: &'a GeneratorConfig,
    errors: &'a mut dyn ErrorSink,
    state: GenerationState,
    depth: usize,
    /// Set once a depth or chain limit trips; later resolutions yield nothing.
    overflow: Option<CodegenError>,
}

impl<'a> Generation<'a> {
    pub fn new(
        registry: &'a CodeRegistry,
        system: &'a dyn TargetSystem,
        config: &'a GeneratorConfig,
        errors: &'a mut dyn ErrorSink,
    ) -> Self {
        Self {
            registry,
            system,
            config,
            errors,
            state: GenerationState::new(),
            depth: 0,
            overflow: None,
        }
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GenerationState {
        &mut self.state
    }

    pub fn config(&self) -> &GeneratorConfig {
        self.config
    }

    pub fn system_prefix(&self) -> &str {
        &self.config.system_prefix
    }

    /// End the pass and hand back its code buckets.
    pub fn finish(self) -> CodegenResult<GenerationState> {
        match self.overflow {
            Some(err) => Err(err),
            None => Ok(self.state),
        }
    }

    // ── Resolver ─────────────────────────────────────────────────────────

    /// Code of `block` alone, without its comment.
    ///
    /// A block with custom generation is asked first; otherwise its
    /// registry entry decides. Unregistered block types yield `""`.
    pub fn to_code(&mut self, block: &dyn Block) -> String {
        if self.overflow.is_some() {
            return String::new();
        }
        if self.depth >= self.config.max_depth {
            warn!(
                block = block.id(),
                depth = self.depth,
                "block nesting limit reached, is the graph cyclic?"
            );
            self.overflow = Some(CodegenError::RecursionLimit {
                block_id: block.id().to_string(),
                depth: self.config.max_depth,
            });
            return String::new();
        }

        self.depth += 1;
        let code = self.resolve(block);
        self.depth -= 1;
        code
    }

    fn resolve(&mut self, block: &dyn Block) -> String {
        trace!(block = block.id(), block_type = block.block_type(), "resolving block");
        if let Some(code) = block.generate_code(self) {
            return code;
        }
        let registry = self.registry;
        match registry.get(block.block_type()) {
            Some(CodeEntry::Function(generate)) => generate(block, self),
            Some(CodeEntry::Template(descriptor)) => self.render_template(block, descriptor),
            None => String::new(),
        }
    }

    /// Run the descriptor's prepare hook, resolve each placeholder in order
    /// and fill the template slots with the results.
    pub fn render_template(&mut self, block: &dyn Block, descriptor: &TemplateDescriptor) -> String {
        if let Some(prepare) = &descriptor.prepare {
            prepare(block, self);
        }
        let mut replacements = Vec::with_capacity(descriptor.placeholders.len());
        for placeholder in &descriptor.placeholders {
            replacements.push(self.placeholder_to_code(block, placeholder));
        }
        descriptor.template.render(replacements)
    }

    fn placeholder_to_code(&mut self, block: &dyn Block, placeholder: &Placeholder) -> String {
        match placeholder {
            Placeholder::Field(name) => self.field_to_code(block, name),
            Placeholder::Value {
                name,
                enforced_type,
            } => self
                .value_to_code(block, name, enforced_type.as_deref())
                .unwrap_or_default(),
            Placeholder::Statement(name) => {
                let config = self.config;
                self.statement_to_code(block, name, &config.indent)
            }
            Placeholder::Keyword(tag) => self.keyword(tag),
            Placeholder::Func(f) => f(block, self),
            Placeholder::Empty => String::new(),
        }
    }

    // ── Comments ─────────────────────────────────────────────────────────

    /// Code of a top-level block, preceded by its comment.
    pub fn top_block_to_code(&mut self, block: &dyn Block) -> String {
        let code = self.to_code(block);
        with_comment(block, code, TOP_LINE_COMMENT)
    }

    /// Code of a nested statement block, preceded by its comment. A
    /// single-line comment is tab-indented.
    pub fn block_to_code(&mut self, block: &dyn Block) -> String {
        let code = self.to_code(block);
        with_comment(block, code, NESTED_LINE_COMMENT)
    }

    // ── Inputs ───────────────────────────────────────────────────────────

    /// Code of the producer plugged into value input `name`.
    ///
    /// Reports [`ErrorKind::MissingInput`] or [`ErrorKind::EmptyInput`] and
    /// returns `None` when there is nothing to resolve. With an
    /// `enforced_type` differing from the producer's type the code is passed
    /// through [`TargetSystem::enforce_type`].
    pub fn value_to_code(
        &mut self,
        block: &dyn Block,
        name: &str,
        enforced_type: Option<&str>,
    ) -> Option<String> {
        let Some(input) = block.input(name) else {
            self.report(block, ErrorKind::MissingInput);
            return None;
        };
        let Some(target) = input.target else {
            self.report(block, ErrorKind::EmptyInput);
            return None;
        };

        let code = self.to_code(target);
        let Some(ty) = enforced_type else {
            return Some(code);
        };
        if self.type_of_value(block, name).as_deref() == Some(ty) {
            Some(code)
        } else {
            Some(self.enforce_type(&code, ty))
        }
    }

    /// Like [`value_to_code`](Self::value_to_code), but an absent input or
    /// producer silently yields `default`.
    pub fn value_to_code_unchecked(&mut self, block: &dyn Block, name: &str, default: &str) -> String {
        match block.input(name).and_then(|input| input.target) {
            Some(target) => self.to_code(target),
            None => default.to_string(),
        }
    }

    /// Field literal passed through the keyword table.
    ///
    /// Missing content and editor sentinels are reported, but the (possibly
    /// empty) value is returned regardless.
    pub fn field_to_code(&mut self, block: &dyn Block, name: &str) -> String {
        let content = block.field_value(name);
        match content {
            None => self.report(block, ErrorKind::MissingValue),
            Some(c) if PLACEHOLDER_SENTINELS.contains(&c) => {
                self.report(block, ErrorKind::UnfilledPlaceholder)
            }
            Some(c) if c == ILLEGAL_ANALOG_PIN => self.report(block, ErrorKind::IllegalPin),
            Some(_) => {}
        }
        content.map(|c| self.keyword(c)).unwrap_or_default()
    }

    /// Representative type tag of the producer plugged into `name`.
    pub fn type_of_value(&mut self, block: &dyn Block, name: &str) -> Option<String> {
        let Some(input) = block.input(name) else {
            self.report(block, ErrorKind::MissingValue);
            return None;
        };
        let Some(target) = input.target else {
            self.report(block, ErrorKind::EmptyValue);
            return None;
        };
        value_type::representative(target.output_types()).map(str::to_string)
    }

    /// Code of the statement chain at `name`, `prefix` before every line.
    ///
    /// An empty or missing statement input yields `""` without error. A
    /// chain longer than `max_chain_len` aborts the pass.
    pub fn statement_to_code(&mut self, block: &dyn Block, name: &str, prefix: &str) -> String {
        let Some(mut current) = block.input(name).and_then(|input| input.target) else {
            return String::new();
        };

        let mut code = String::new();
        let mut walked = 0;
        loop {
            if self.overflow.is_some() {
                break;
            }
            if walked == self.config.max_chain_len {
                warn!(
                    block = current.id(),
                    length = walked,
                    "statement chain limit reached, is the chain cyclic?"
                );
                self.overflow = Some(CodegenError::ChainLimit {
                    block_id: current.id().to_string(),
                    length: walked,
                });
                break;
            }
            walked += 1;

            let line = self.block_to_code(current);
            if !line.is_empty() {
                code.push_str(&line);
                code.push('\n');
            }
            match current.next_block() {
                Some(next) => current = next,
                None => break,
            }
        }

        if code.ends_with('\n') {
            code.pop();
        }
        let mut out = String::with_capacity(code.len() + prefix.len());
        out.push_str(prefix);
        out.push_str(&code.replace('\n', &format!("\n{prefix}")));
        out
    }

    // ── Keywords & types ─────────────────────────────────────────────────

    pub fn keyword(&self, tag: &str) -> String {
        self.config.keywords.keyword(tag).to_string()
    }

    pub fn enforce_type(&self, code: &str, ty: &str) -> String {
        self.system.enforce_type(code, ty, &self.config.keywords)
    }

    /// `(localized name, tag)` pairs for the editor's type selectors.
    pub fn type_list(&self) -> Vec<(String, &'static str)> {
        value_type::SELECTABLE
            .iter()
            .map(|&tag| (self.keyword(tag), tag))
            .collect()
    }

    /// Whether `word` is reserved in the target language.
    pub fn is_reserved(&self, word: &str) -> bool {
        self.config.reserved_words.check(word)
    }

    // ── Accumulators ─────────────────────────────────────────────────────

    pub fn add_library(&mut self, library: &str) {
        self.state.add_library(library);
    }

    /// Rendered library hook for the libraries required so far.
    pub fn libraries_code(&self) -> String {
        self.system.libraries_code(&self.state.libraries)
    }

    pub fn add_defines_code(&mut self, code: &str, prepend: bool) {
        self.state.add_defines_code(code, prepend);
    }

    pub fn add_setup_code(&mut self, code: &str, prepend: bool) {
        self.state.add_setup_code(code, prepend);
    }

    pub fn append_setup_code(&mut self, code: &str) {
        self.state.append_setup_code(code);
    }

    pub fn add_init_code(&mut self, code: &str, prepend: bool) {
        self.state.add_init_code(code, prepend);
    }

    pub fn add_global_var_code(&mut self, code: &str) {
        self.state.add_global_var_code(code);
    }

    #[deprecated(note = "use `add_init_code`")]
    pub fn add_pre_setup(&mut self, code: &str) {
        warn!("add_pre_setup is deprecated, forwarding to add_init_code");
        self.state.add_init_code(code, false);
    }

    // ── Errors ───────────────────────────────────────────────────────────

    pub fn report(&mut self, block: &dyn Block, kind: ErrorKind) {
        self.errors.add_error(block, kind);
    }

    /// Report [`ErrorKind::IncompatibleSystem`] unless the active system is
    /// one of `systems`.
    pub fn check_system(&mut self, block: &dyn Block, systems: &[&str]) {
        if !systems.contains(&self.config.system_prefix.as_str()) {
            self.report(block, ErrorKind::IncompatibleSystem);
        }
    }
}

impl CodeContext for Generation<'_> {
    fn value_to_code(
        &mut self,
        block: &dyn Block,
        name: &str,
        enforced_type: Option<&str>,
    ) -> Option<String> {
        Generation::value_to_code(self, block, name, enforced_type)
    }

    fn value_to_code_unchecked(&mut self, block: &dyn Block, name: &str, default: &str) -> String {
        Generation::value_to_code_unchecked(self, block, name, default)
    }

    fn field_to_code(&mut self, block: &dyn Block, name: &str) -> String {
        Generation::field_to_code(self, block, name)
    }

    fn type_of_value(&mut self, block: &dyn Block, name: &str) -> Option<String> {
        Generation::type_of_value(self, block, name)
    }

    fn statement_to_code(&mut self, block: &dyn Block, name: &str, prefix: &str) -> String {
        Generation::statement_to_code(self, block, name, prefix)
    }

    fn block_to_code(&mut self, block: &dyn Block) -> String {
        Generation::block_to_code(self, block)
    }

    fn keyword(&self, tag: &str) -> String {
        Generation::keyword(self, tag)
    }

    fn add_library(&mut self, library: &str) {
        Generation::add_library(self, library)
    }

    fn add_defines_code(&mut self, code: &str, prepend: bool) {
        Generation::add_defines_code(self, code, prepend)
    }

    fn add_setup_code(&mut self, code: &str, prepend: bool) {
        Generation::add_setup_code(self, code, prepend)
    }

    fn append_setup_code(&mut self, code: &str) {
        Generation::append_setup_code(self, code)
    }

    fn add_init_code(&mut self, code: &str, prepend: bool) {
        Generation::add_init_code(self, code, prepend)
    }

    fn add_global_var_code(&mut self, code: &str) {
        Generation::add_global_var_code(self, code)
    }

    fn report(&mut self, block: &dyn Block, kind: ErrorKind) {
        Generation::report(self, block, kind)
    }

    fn check_system(&mut self, block: &dyn Block, systems: &[&str]) {
        Generation::check_system(self, block, systems)
    }
}

/// Prepend the block's comment to `code`.
///
/// A multi-line comment becomes a `/** */` block and a blank line follows
/// the code; a single line gets `line_marker`.
fn with_comment(block: &dyn Block, code: String, line_marker: &str) -> String {
    match block.comment_text() {
        Some(comment) if comment.contains('\n') => {
            format!("/**\n * {}\n */\n{code}\n", comment.replace('\n', "\n * "))
        }
        Some(comment) if !comment.is_empty() => format!("{line_marker}{comment}\n{code}"),
        _ => code,
    }
}

/// Terminate a top-level value expression so it forms a statement.
pub fn scrub_naked_value(line: &str) -> String {
    format!("{line};\n")
}

/// Quote `text` as a single-quoted literal.
pub fn quote(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('\n', "\\\n")
        .replace('\'', "\\'");
    format!("'{escaped}'")
}
