// ABOUTME: Error kinds raised by the lexer, parser, semantic pass, and evaluator

use crate::source_map::Range;
use thiserror::Error;

/// One error kind each for lexing, parsing, the semantic pre-pass, and
/// runtime/assertion failures. Each carries the range it should be
/// reported against; rendering is the diagnostics module's job, not
/// this type's `Display` impl.
#[derive(Error, Debug, Clone)]
pub enum LithiumError {
    #[error("{message}")]
    Lex { message: String, range: Range },

    #[error("{message}")]
    Parse { message: String, range: Range },

    #[error("{message}")]
    Semantic { message: String, range: Range },

    #[error("{message}")]
    Runtime { message: String, range: Range },

    #[error("assertion failed: {message}")]
    Assertion { message: String, range: Range },
}

impl LithiumError {
    pub fn range(&self) -> &Range {
        match self {
            LithiumError::Lex { range, .. }
            | LithiumError::Parse { range, .. }
            | LithiumError::Semantic { range, .. }
            | LithiumError::Runtime { range, .. }
            | LithiumError::Assertion { range, .. } => range,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LithiumError::Lex { message, .. }
            | LithiumError::Parse { message, .. }
            | LithiumError::Semantic { message, .. }
            | LithiumError::Runtime { message, .. }
            | LithiumError::Assertion { message, .. } => message,
        }
    }

    pub fn runtime(message: impl Into<String>, range: Range) -> Self {
        LithiumError::Runtime {
            message: message.into(),
            range,
        }
    }

    pub fn semantic(message: impl Into<String>, range: Range) -> Self {
        LithiumError::Semantic {
            message: message.into(),
            range,
        }
    }

    pub fn parse(message: impl Into<String>, range: Range) -> Self {
        LithiumError::Parse {
            message: message.into(),
            range,
        }
    }
}
