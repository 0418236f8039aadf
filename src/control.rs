// ABOUTME: Non-local transfer modeled as a tagged Result instead of thrown exceptions

use crate::error::LithiumError;
use crate::value::Value;

/// `return`, `break`, `continue`, and `exit` are non-local transfers,
/// not ordinary errors; a runtime error shares the same propagation
/// channel but is a distinct kind. Every statement/expression
/// evaluation returns `EvalResult<T>`; loops catch `Break`/`Continue`,
/// function calls catch `Return`, and the driver catches `Exit`.
/// `Error` propagates past everything up to the driver.
#[derive(Debug, Clone)]
pub enum Control {
    Return(Value),
    Break,
    Continue,
    Exit(i32),
    Error(LithiumError),
}

pub type EvalResult<T> = Result<T, Control>;

impl From<LithiumError> for Control {
    fn from(e: LithiumError) -> Self {
        Control::Error(e)
    }
}
