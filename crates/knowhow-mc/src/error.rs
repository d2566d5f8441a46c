//! Model checking error types.

use knowhow_automata::AutomataError;
use thiserror::Error;

/// An error raised while building or checking a model.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The pointed state handed to the checker is not part of the model.
    #[error("pointed state {0} is not part of the model")]
    StateNotInModel(String),

    /// A lookup named a state the model does not contain.
    #[error("state {0} is not in the model")]
    UnknownState(String),

    /// An automaton operation failed underneath the checker.
    #[error(transparent)]
    Automata(#[from] AutomataError),
}

pub type CheckResult<T> = Result<T, CheckError>;
