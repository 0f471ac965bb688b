//! Error types for model construction and decoding.

use std::fmt;

use thiserror::Error;

/// Which probability table a failed lookup was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbabilityTable {
    /// Initial-state probabilities.
    Start,
    /// State-to-state transition probabilities.
    Transition,
    /// Per-state emission probabilities.
    Emission,
    /// The model's emission alphabet (symbol never seen in any emission mapping).
    Symbol,
}

impl fmt::Display for ProbabilityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbabilityTable::Start => "start",
            ProbabilityTable::Transition => "transition",
            ProbabilityTable::Emission => "emission",
            ProbabilityTable::Symbol => "symbol",
        };
        f.write_str(name)
    }
}

/// Everything that can go wrong while building a model or decoding with it.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Empty observations, empty or duplicated state set, malformed dimensions
    /// or probabilities outside `[0, inf)`.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A probability entry required by the computation is absent.
    #[error("missing {table} probability for {key}")]
    Lookup {
        table: ProbabilityTable,
        key: String,
    },

    /// Every state in the final column scored zero. Under linear scoring this
    /// also happens when long sequences underflow; log-space scoring avoids it.
    #[error("every final state scored zero after {len} steps (impossible path or linear underflow; try log-space scoring)")]
    NoViablePath { len: usize },

    /// Writing the diagnostic table failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    pub(crate) fn lookup(table: ProbabilityTable, key: impl fmt::Debug) -> Self {
        DecodeError::Lookup {
            table,
            key: format!("{key:?}"),
        }
    }

    /// True for the missing-entry family of errors.
    pub fn is_lookup(&self) -> bool {
        matches!(self, DecodeError::Lookup { .. })
    }

    /// True for rejected inputs (empty sequences, bad dimensions, bad values).
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, DecodeError::InvalidInput(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DecodeError>;
