//! Explicit-state finite automata for knowing-how model checking.
//!
//! The two automaton variants share a shape (states, alphabet, an initial
//! state, final states, a transition relation) and differ in the transition
//! contract: the non-deterministic variant accumulates targets and supports
//! epsilon transitions, the deterministic variant keeps at most one target
//! per `(state, symbol)` pair and has no epsilon operation at all.
//!
//! Automata are built fresh per use and discarded; nothing here caches or
//! shares state between calls.

pub mod dfa;
pub mod dot;
pub mod error;
pub mod iter;
pub mod nfa;
pub mod ops;

pub use dfa::Dfa;
pub use dot::{dfa_to_dot, nfa_to_dot};
pub use error::{AutomataError, AutomataResult};
pub use iter::AcceptedWords;
pub use nfa::Nfa;
pub use ops::{
    as_deterministic, complement, determinize, intersection, intersection_all, intersection_nfa,
    minimize, to_integer_states,
};
