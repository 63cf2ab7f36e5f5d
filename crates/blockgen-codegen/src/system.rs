//! Target system hooks.
//!
//! Each target system (Arduino, Calliope, ...) can adjust the generation
//! pass at fixed points and choose its include and cast syntax. The
//! defaults produce plain C.

use blockgen_types::Keywords;

use crate::generation::Generation;

/// Per-target customization of the generation pass.
pub trait TargetSystem: Send + Sync {
    /// Runs after the pass state is reset, before any block is resolved.
    fn init_generator(&self, _gen: &mut Generation<'_>) {}

    /// Runs after all blocks are resolved, before hooks are spliced into
    /// the code template. Used for option checks and final state fixups.
    fn check_options(&self, _gen: &mut Generation<'_>) {}

    /// Render the library hook. Empty when no library was required,
    /// otherwise one `#include <lib>` line per library and a blank line.
    fn libraries_code(&self, libraries: &[String]) -> String {
        if libraries.is_empty() {
            return String::new();
        }
        let mut code: String = libraries
            .iter()
            .map(|lib| format!("#include <{lib}>\n"))
            .collect();
        code.push('\n');
        code
    }

    /// Coerce `code` to value type `ty`. The result is fully parenthesized
    /// so it can fill a `(#)` slot.
    fn enforce_type(&self, code: &str, ty: &str, keywords: &Keywords) -> String {
        format!("(({})({}))", keywords.keyword(ty), code)
    }
}

/// Plain C target with the default hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct CSystem;

impl TargetSystem for CSystem {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_libraries_code_empty() {
        assert_eq!(CSystem.libraries_code(&[]), "");
    }

    #[test]
    fn test_libraries_code_include_lines() {
        let libs = vec!["Wire.h".to_string(), "Servo.h".to_string()];
        assert_eq!(
            CSystem.libraries_code(&libs),
            "#include <Wire.h>\n#include <Servo.h>\n\n"
        );
    }

    #[test]
    fn test_enforce_type_uses_keyword() {
        let keywords = Keywords::with_entries([("NUMBER", "int")]);
        assert_eq!(CSystem.enforce_type("x", "NUMBER", &keywords), "((int)(x))");
        assert_eq!(CSystem.enforce_type("a + b", "Servo", &keywords), "((Servo)(a + b))");
    }
}
