//! Shared types for the blockgen code generator.
//!
//! This crate defines the block model the generator reads, the advisory
//! error taxonomy, the keyword table and the generator configuration.

pub mod block;
mod config;
mod context;
mod error;
mod keywords;
pub mod value_type;

pub use block::{
    chain, Block, BlockNode, BlockTree, Input, InputKind, InputNode, Workspace,
    ILLEGAL_ANALOG_PIN, PLACEHOLDER_SENTINELS,
};
pub use config::{
    ConfigError, GeneratorConfig, DEFAULT_INDENT, DEFAULT_MAX_CHAIN_LEN, DEFAULT_MAX_DEPTH,
};
pub use context::CodeContext;
pub use error::{BlockError, ErrorCollector, ErrorKind, ErrorSink};
pub use keywords::{Keywords, ReservedWords};
