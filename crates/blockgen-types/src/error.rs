use serde::{Deserialize, Serialize};
use std::fmt;

use crate::block::Block;

/// Kind of an advisory generation error.
///
/// None of these stop a pass. The generator records them and keeps emitting
/// best-effort code; callers decide afterwards whether to trust the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The block has no input of the requested name.
    MissingInput,
    /// A value input exists but nothing is plugged into it.
    EmptyInput,
    /// A typed value input exists but nothing is plugged into it.
    EmptyValue,
    /// A field or typed input has no content.
    MissingValue,
    /// A field still holds an editor placeholder (`<default>`, `???`, `<name>`).
    UnfilledPlaceholder,
    /// A field holds the illegal analog pin sentinel.
    IllegalPin,
    /// The block is restricted to other target systems.
    IncompatibleSystem,
}

impl ErrorKind {
    /// Localization key for the message shown in the editor.
    pub fn message_key(self) -> &'static str {
        match self {
            Self::MissingInput => "err.NOINPUT",
            Self::EmptyInput => "err.EMPTYINPUT",
            Self::EmptyValue => "err.EMPTYVALUE",
            Self::MissingValue => "err.NOVALUE",
            Self::UnfilledPlaceholder => "err.DEFAULT_VALUE",
            Self::IllegalPin => "err.ILLEGAL_ANALOG_PIN",
            Self::IncompatibleSystem => "err.INCOMPATIBLE_SYSTEM",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message_key())
    }
}

/// One recorded error: which block, and what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockError {
    pub block_id: String,
    pub block_type: String,
    pub kind: ErrorKind,
}

impl BlockError {
    pub fn new(block: &dyn Block, kind: ErrorKind) -> Self {
        Self {
            block_id: block.id().to_string(),
            block_type: block.block_type().to_string(),
            kind,
        }
    }
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.block_id, self.block_type, self.kind)
    }
}

/// Write-only destination for advisory errors.
pub trait ErrorSink {
    fn add_error(&mut self, block: &dyn Block, kind: ErrorKind);

    /// Forget everything recorded so far. Called at the start of every pass.
    fn clear(&mut self);
}

/// In-memory [`ErrorSink`] keeping errors in recording order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorCollector {
    pub errors: Vec<BlockError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of recorded errors of `kind`.
    pub fn count_of(&self, kind: ErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }

    /// Errors recorded against the block with `block_id`.
    pub fn for_block<'a>(&'a self, block_id: &'a str) -> impl Iterator<Item = &'a BlockError> {
        self.errors.iter().filter(move |e| e.block_id == block_id)
    }
}

impl ErrorSink for ErrorCollector {
    fn add_error(&mut self, block: &dyn Block, kind: ErrorKind) {
        self.errors.push(BlockError::new(block, kind));
    }

    fn clear(&mut self) {
        self.errors.clear();
    }
}
