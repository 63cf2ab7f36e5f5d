//! Codegen error types.
//!
//! Only conditions that abort a pass live here. Problems with individual
//! blocks are advisory and go to the pass's [`ErrorSink`](blockgen_types::ErrorSink).

use thiserror::Error;

/// Errors that stop code generation.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// No master code template was loaded for the target system.
    #[error("no code template loaded for system `{0}`")]
    TemplateNotLoaded(String),

    /// The code template could not be fetched.
    #[error("cannot fetch code template `{path}`: {reason}")]
    TemplateFetch { path: String, reason: String },

    /// Block nesting exceeded the configured depth, usually a cyclic graph.
    #[error("block nesting deeper than {depth} at block `{block_id}`")]
    RecursionLimit { block_id: String, depth: usize },

    /// A statement chain was longer than the configured limit, usually a
    /// `next` link looping back.
    #[error("statement chain longer than {length} blocks at block `{block_id}`")]
    ChainLimit { block_id: String, length: usize },

    /// The generator configuration was rejected.
    #[error(transparent)]
    Config(#[from] blockgen_types::ConfigError),
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
