//! Error taxonomy for extraction, parsing, and permutation validation.
//!
//! Statistical functions never return these: degenerate numeric input falls
//! back to a neutral value instead. Everything here is fatal for an audit run.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuditError>;

/// Why a sequence failed the bijection check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermutationDefect {
    /// Value is not smaller than the sequence length.
    OutOfRange,
    /// Value was already seen at an earlier index.
    Duplicate,
}

impl std::fmt::Display for PermutationDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "out of range"),
            Self::Duplicate => write!(f, "duplicate"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("could not find function `{function}` in source")]
    FunctionNotFound { function: String },

    #[error("could not find body start for `{function}`")]
    BodyStartNotFound { function: String },

    #[error("could not find body end for `{function}` (unclosed depth {depth} at end of text)")]
    UnbalancedBraces { function: String, depth: usize },

    #[error("literal `{literal}` in `{function}` does not fit in 64 bits")]
    LiteralOverflow { function: String, literal: String },

    #[error("`{function}` returns parsed != {expected} (got {found})")]
    CountMismatch {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("not a permutation: value {value} at index {index} is {reason}")]
    NotAPermutation {
        index: usize,
        value: u32,
        reason: PermutationDefect,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuditError {
    /// Short label of the pipeline stage that produced the error.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::FunctionNotFound { .. } | Self::BodyStartNotFound { .. } => "extract",
            Self::UnbalancedBraces { .. } => "extract",
            Self::LiteralOverflow { .. } | Self::CountMismatch { .. } => "collect",
            Self::NotAPermutation { .. } => "permutation",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }
}
