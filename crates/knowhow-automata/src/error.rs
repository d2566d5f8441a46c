//! Automaton error types.

use thiserror::Error;

/// An error raised by an automaton operation. These signal programmer or
/// input-data errors; none are transient, and none are recovered internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomataError {
    /// A lookup named a state the automaton does not contain.
    #[error("state {0} is not in the automaton")]
    UnknownState(String),

    /// The operation requires an initial state, but none was set.
    #[error("automaton has no initial state")]
    NoInitialState,

    /// `complete` was given an error state that already belongs to the
    /// automaton.
    #[error("error state {0} is already in the automaton")]
    StateAlreadyPresent(String),

    /// `intersection_all` was given no automata.
    #[error("cannot intersect an empty set of automata")]
    EmptyAutomataSet,

    /// `as_deterministic` was given an automaton with a genuinely
    /// non-deterministic structure.
    #[error("automaton is not deterministic: {0}")]
    NotDeterministic(&'static str),
}

pub type AutomataResult<T> = Result<T, AutomataError>;
