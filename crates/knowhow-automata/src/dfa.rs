//! Deterministic finite automata.

use crate::error::{AutomataError, AutomataResult};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;

/// A deterministic finite automaton over caller-supplied state and symbol
/// types.
///
/// At most one target exists per `(source, symbol)` pair; adding a second
/// transition for the same pair replaces the first. There is no epsilon
/// transition: the operation simply does not exist on this type.
#[derive(Debug, Clone, Default)]
pub struct Dfa<S, A> {
    /// `source -> symbol -> target`. Every state of the automaton is a key
    /// of this map, possibly with an empty row.
    transitions: HashMap<S, HashMap<A, S>>,
    initial: Option<S>,
    finals: HashSet<S>,
    alphabet: HashSet<A>,
}

impl<S, A> Dfa<S, A>
where
    S: Clone + Eq + Hash + fmt::Debug,
    A: Clone + Eq + Hash + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            transitions: HashMap::new(),
            initial: None,
            finals: HashSet::new(),
            alphabet: HashSet::new(),
        }
    }

    /// Add a state. Returns true if the state was not already present.
    pub fn add_state(&mut self, state: S) -> bool {
        match self.transitions.entry(state) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(HashMap::new());
                true
            }
        }
    }

    /// Set the initial state, adding it if absent.
    pub fn set_initial_state(&mut self, state: S) {
        self.add_state(state.clone());
        self.initial = Some(state);
    }

    pub fn initial_state(&self) -> Option<&S> {
        self.initial.as_ref()
    }

    /// Mark a state as final, adding it if absent. Returns true if it was
    /// not already final.
    pub fn add_final_state(&mut self, state: S) -> bool {
        self.add_state(state.clone());
        self.finals.insert(state)
    }

    pub fn add_final_states(&mut self, states: impl IntoIterator<Item = S>) {
        for state in states {
            self.add_final_state(state);
        }
    }

    pub fn final_states(&self) -> &HashSet<S> {
        &self.finals
    }

    /// States that are not final.
    pub fn non_final_states(&self) -> HashSet<S> {
        self.transitions
            .keys()
            .filter(|state| !self.finals.contains(state))
            .cloned()
            .collect()
    }

    pub fn is_final(&self, state: &S) -> bool {
        self.finals.contains(state)
    }

    pub fn alphabet(&self) -> &HashSet<A> {
        &self.alphabet
    }

    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.transitions.keys()
    }

    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn contains_state(&self, state: &S) -> bool {
        self.transitions.contains_key(state)
    }

    /// Add a transition. If a transition for `(source, symbol)` already
    /// exists, it is replaced (last write wins, not an error). Both
    /// endpoints are added if absent.
    pub fn add_transition(&mut self, source: S, target: S, symbol: A) {
        self.alphabet.insert(symbol.clone());
        self.add_state(target.clone());
        self.add_state(source.clone());
        if let Some(row) = self.transitions.get_mut(&source) {
            row.insert(symbol, target);
        }
    }

    /// The target of the transition from `source` on `symbol`, if any.
    pub fn delta(&self, source: &S, symbol: &A) -> AutomataResult<Option<S>> {
        let row = self
            .transitions
            .get(source)
            .ok_or_else(|| AutomataError::UnknownState(format!("{source:?}")))?;
        Ok(row.get(symbol).cloned())
    }

    /// Like `delta`, but silent on unknown sources. Used by the algorithms
    /// in this crate, which only ever ask about states they discovered.
    pub fn target(&self, source: &S, symbol: &A) -> Option<&S> {
        self.transitions.get(source)?.get(symbol)
    }

    /// All `(symbol, target)` pairs leaving `state`.
    pub fn outgoing_transitions(&self, state: &S) -> Vec<(A, S)> {
        self.transitions
            .get(state)
            .map(|row| {
                row.iter()
                    .map(|(symbol, target)| (symbol.clone(), target.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Evaluate a word by walking the unique run, rejecting on a missing
    /// transition. An automaton without an initial state accepts nothing.
    pub fn evaluate(&self, word: &[A]) -> bool {
        let Some(initial) = &self.initial else {
            return false;
        };
        let mut current = initial;
        for symbol in word {
            match self.target(current, symbol) {
                Some(target) => current = target,
                None => return false,
            }
        }
        self.finals.contains(current)
    }

    /// For every `(state, symbol)` pair with no transition, add one to
    /// `error`. The error state must not already belong to the automaton;
    /// it ends up with a self-loop on every symbol.
    pub fn complete(&mut self, error: S) -> AutomataResult<()> {
        if self.contains_state(&error) {
            return Err(AutomataError::StateAlreadyPresent(format!("{error:?}")));
        }
        self.add_state(error.clone());

        let mut missing = Vec::new();
        for (state, row) in &self.transitions {
            for symbol in &self.alphabet {
                if !row.contains_key(symbol) {
                    missing.push((state.clone(), symbol.clone()));
                }
            }
        }
        for (state, symbol) in missing {
            self.add_transition(state, error.clone(), symbol);
        }
        Ok(())
    }

    /// Whether the automaton has every `(state, symbol)` transition defined.
    pub fn is_complete(&self) -> bool {
        self.transitions
            .values()
            .all(|row| self.alphabet.iter().all(|symbol| row.contains_key(symbol)))
    }

    /// True iff no final state is reachable from the initial state.
    /// An automaton without an initial state is empty.
    pub fn is_empty(&self) -> bool {
        let Some(initial) = &self.initial else {
            return true;
        };
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(initial.clone());
        queue.push_back(initial.clone());

        while let Some(state) = queue.pop_front() {
            if self.finals.contains(&state) {
                return false;
            }
            if let Some(row) = self.transitions.get(&state) {
                for target in row.values() {
                    if visited.insert(target.clone()) {
                        queue.push_back(target.clone());
                    }
                }
            }
        }
        true
    }

    /// Replace the final-state set with its complement over all states.
    pub(crate) fn invert_final_states(&mut self) {
        self.finals = self
            .transitions
            .keys()
            .filter(|state| !self.finals.contains(state))
            .cloned()
            .collect();
    }
}

impl<A> Dfa<u32, A>
where
    A: Clone + Eq + Hash + fmt::Debug,
{
    /// The single-state automaton accepting exactly the empty word. Used as
    /// the fallback when a KH side condition quantifies over no states.
    pub fn accepting_empty_word() -> Self {
        let mut dfa = Dfa::new();
        dfa.set_initial_state(0);
        dfa.add_final_state(0);
        dfa
    }
}
