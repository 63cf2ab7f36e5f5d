//! The generator surface offered to blocks with custom code generation.

use crate::block::Block;
use crate::error::ErrorKind;

/// Operations a block may call back into while generating its own code.
///
/// Implemented by the generation pass. Every method records advisory errors
/// on the pass's error sink instead of failing.
pub trait CodeContext {
    /// Code of the producer connected to value input `name`, cast to
    /// `enforced_type` when it declares a different type.
    fn value_to_code(
        &mut self,
        block: &dyn Block,
        name: &str,
        enforced_type: Option<&str>,
    ) -> Option<String>;

    /// Like [`value_to_code`](Self::value_to_code) but silent: `default`
    /// stands in for a missing input or producer.
    fn value_to_code_unchecked(&mut self, block: &dyn Block, name: &str, default: &str) -> String;

    /// Field literal passed through the keyword table.
    fn field_to_code(&mut self, block: &dyn Block, name: &str) -> String;

    /// Representative type tag of the producer connected to `name`.
    fn type_of_value(&mut self, block: &dyn Block, name: &str) -> Option<String>;

    /// Statement chain at `name`, every line prefixed with `prefix`.
    fn statement_to_code(&mut self, block: &dyn Block, name: &str, prefix: &str) -> String;

    /// Code of a nested statement block, preceded by its comment.
    fn block_to_code(&mut self, block: &dyn Block) -> String;

    fn keyword(&self, tag: &str) -> String;

    fn add_library(&mut self, library: &str);

    fn add_defines_code(&mut self, code: &str, prepend: bool);

    fn add_setup_code(&mut self, code: &str, prepend: bool);

    /// Add code placed after everything else in the setup hook.
    fn append_setup_code(&mut self, code: &str);

    fn add_init_code(&mut self, code: &str, prepend: bool);

    fn add_global_var_code(&mut self, code: &str);

    /// Record an advisory error against `block`.
    fn report(&mut self, block: &dyn Block, kind: ErrorKind);

    /// Report an incompatible system unless the active one is in `systems`.
    fn check_system(&mut self, block: &dyn Block, systems: &[&str]);
}
