//! blockgen code generator: turns a workspace of visual blocks into target
//! source text.
//!
//! # Architecture
//!
//! A [`CodeGenerator`] holds the configuration of one target system, its
//! [`CodeRegistry`] of per-block-type entries and the master code template.
//! Each call to [`CodeGenerator::workspace_to_code`] runs one pass:
//!
//! - top-level blocks are classified (devices, main, functions/ISRs) and
//!   resolved through a [`Generation`], which owns the pass state
//! - blocks resolve their inputs recursively and push cross-cutting code
//!   (libraries, defines, setup lines, globals) into [`GenerationState`]
//! - the buckets are spliced into the `###hook###` markers of the template
//!   and surplus whitespace is scrubbed
//!
//! ## Templates
//!
//! Block templates use `#` for a plain slot and `(#)` for a slot that must
//! end up parenthesized. See [`template`] and [`registry`].
//!
//! ## Target systems
//!
//! [`TargetSystem`] customizes the pass: setup hooks, include syntax and
//! type coercion. [`CSystem`] is the plain C default.

pub mod error;
pub mod generation;
pub mod generator;
pub mod loader;
pub mod registry;
pub mod state;
pub mod system;
pub mod template;

pub use error::{CodegenError, CodegenResult};
pub use generation::{quote, scrub_naked_value, Generation};
pub use generator::{hooks, CodeGenerator, GeneratedCode};
pub use loader::{template_path, DirTemplateSource, TemplateSource};
pub use registry::{CodeEntry, CodeRegistry, Placeholder, TemplateDescriptor, TemplateMismatch};
pub use state::GenerationState;
pub use system::{CSystem, TargetSystem};
pub use template::{Segment, Template};
