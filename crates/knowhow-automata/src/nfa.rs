//! Non-deterministic finite automata.

use crate::error::{AutomataError, AutomataResult};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

/// A non-deterministic finite automaton over caller-supplied state and
/// symbol types.
///
/// The transition map is keyed by `Option<A>`: the `None` row holds the
/// epsilon transitions, which only this variant supports. A state may have
/// any number of targets per symbol.
#[derive(Debug, Clone, Default)]
pub struct Nfa<S, A> {
    /// `source -> symbol (None = epsilon) -> targets`. Every state of the
    /// automaton is a key of this map, possibly with an empty row.
    transitions: HashMap<S, HashMap<Option<A>, HashSet<S>>>,
    initial: Option<S>,
    finals: HashSet<S>,
    alphabet: HashSet<A>,
}

impl<S, A> Nfa<S, A>
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

    /// Add a transition, accumulating targets per `(source, symbol)`.
    /// Both endpoints are added if absent. Returns true if the transition
    /// was not already present.
    pub fn add_transition(&mut self, source: S, target: S, symbol: A) -> bool {
        self.alphabet.insert(symbol.clone());
        self.add_transition_row(source, target, Some(symbol))
    }

    /// Add an epsilon transition. Legal only on this variant; the
    /// deterministic automaton has no counterpart by construction.
    pub fn add_empty_transition(&mut self, source: S, target: S) -> bool {
        self.add_transition_row(source, target, None)
    }

    fn add_transition_row(&mut self, source: S, target: S, symbol: Option<A>) -> bool {
        self.add_state(target.clone());
        self.add_state(source.clone());
        self.transitions
            .get_mut(&source)
            .map(|row| row.entry(symbol).or_default().insert(target))
            .unwrap_or(false)
    }

    /// Targets reachable from `source` by consuming `symbol`.
    pub fn delta(&self, source: &S, symbol: &A) -> AutomataResult<HashSet<S>> {
        let row = self
            .transitions
            .get(source)
            .ok_or_else(|| AutomataError::UnknownState(format!("{source:?}")))?;
        Ok(row
            .get(&Some(symbol.clone()))
            .cloned()
            .unwrap_or_default())
    }

    /// Targets reachable from `source` by a single epsilon transition.
    pub fn empty_delta(&self, source: &S) -> AutomataResult<HashSet<S>> {
        let row = self
            .transitions
            .get(source)
            .ok_or_else(|| AutomataError::UnknownState(format!("{source:?}")))?;
        Ok(row.get(&None).cloned().unwrap_or_default())
    }

    /// Fixpoint closure of a single state under epsilon transitions.
    pub fn lambda_closure(&self, state: &S) -> AutomataResult<HashSet<S>> {
        if !self.contains_state(state) {
            return Err(AutomataError::UnknownState(format!("{state:?}")));
        }
        let mut seed = HashSet::new();
        seed.insert(state.clone());
        Ok(self.closure_known(seed))
    }

    /// Fixpoint closure of a set of states under epsilon transitions.
    pub fn lambda_closure_set<'a, I>(&self, states: I) -> AutomataResult<HashSet<S>>
    where
        I: IntoIterator<Item = &'a S>,
        S: 'a,
    {
        let mut seed = HashSet::new();
        for state in states {
            if !self.contains_state(state) {
                return Err(AutomataError::UnknownState(format!("{state:?}")));
            }
            seed.insert(state.clone());
        }
        Ok(self.closure_known(seed))
    }

    /// Closure by repeated union until no new state is added. All members of
    /// `result` are states of the automaton, so the row lookups cannot miss.
    fn closure_known(&self, mut result: HashSet<S>) -> HashSet<S> {
        let mut changed = true;
        while changed {
            changed = false;
            let mut new_states = Vec::new();
            for state in &result {
                if let Some(targets) = self.transitions.get(state).and_then(|row| row.get(&None)) {
                    for target in targets {
                        if !result.contains(target) {
                            new_states.push(target.clone());
                        }
                    }
                }
            }
            for state in new_states {
                changed |= result.insert(state);
            }
        }
        result
    }

    /// Union of `delta` over the given states, ignoring epsilon transitions.
    pub fn move_set<'a, I>(&self, states: I, symbol: &A) -> AutomataResult<HashSet<S>>
    where
        I: IntoIterator<Item = &'a S>,
        S: 'a,
    {
        let mut result = HashSet::new();
        for state in states {
            result.extend(self.delta(state, symbol)?);
        }
        Ok(result)
    }

    /// Evaluate a word by simulating all runs at once: epsilon-close, move,
    /// repeat; accept iff the last closure intersects the final states.
    /// An automaton without an initial state accepts nothing.
    pub fn evaluate(&self, word: &[A]) -> bool {
        let Some(initial) = &self.initial else {
            return false;
        };
        let mut seed = HashSet::new();
        seed.insert(initial.clone());
        let mut current = self.closure_known(seed);

        for symbol in word {
            let mut moved = HashSet::new();
            for state in &current {
                if let Some(targets) = self
                    .transitions
                    .get(state)
                    .and_then(|row| row.get(&Some(symbol.clone())))
                {
                    moved.extend(targets.iter().cloned());
                }
            }
            current = self.closure_known(moved);
            if current.is_empty() {
                return false;
            }
        }

        current.iter().any(|state| self.finals.contains(state))
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
                let has_transition = row
                    .get(&Some(symbol.clone()))
                    .is_some_and(|targets| !targets.is_empty());
                if !has_transition {
                    missing.push((state.clone(), symbol.clone()));
                }
            }
        }
        for (state, symbol) in missing {
            self.add_transition(state, error.clone(), symbol);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// NFA for (a|b)*abb with epsilon glue, the textbook shape.
    fn abb_nfa() -> Nfa<u32, char> {
        let mut nfa = Nfa::new();
        nfa.set_initial_state(0);
        nfa.add_transition(0, 0, 'a');
        nfa.add_transition(0, 0, 'b');
        nfa.add_transition(0, 1, 'a');
        nfa.add_transition(1, 2, 'b');
        nfa.add_transition(2, 3, 'b');
        nfa.add_final_state(3);
        nfa
    }

    #[test]
    fn test_add_transition_accumulates() {
        let nfa = abb_nfa();
        let targets = nfa.delta(&0, &'a').expect("delta");
        assert_eq!(targets, HashSet::from([0, 1]));
    }

    #[test]
    fn test_delta_unknown_state() {
        let nfa = abb_nfa();
        assert!(matches!(
            nfa.delta(&42, &'a'),
            Err(AutomataError::UnknownState(_))
        ));
    }

    #[test]
    fn test_evaluate() {
        let nfa = abb_nfa();
        assert!(nfa.evaluate(&['a', 'b', 'b']));
        assert!(nfa.evaluate(&['b', 'a', 'a', 'b', 'b']));
        assert!(!nfa.evaluate(&['a', 'b']));
        assert!(!nfa.evaluate(&[]));
        assert!(!nfa.evaluate(&['c']));
    }

    #[test]
    fn test_lambda_closure() {
        let mut nfa: Nfa<u32, char> = Nfa::new();
        nfa.set_initial_state(0);
        nfa.add_empty_transition(0, 1);
        nfa.add_empty_transition(1, 2);
        nfa.add_transition(2, 3, 'a');

        let closure = nfa.lambda_closure(&0).expect("closure");
        assert_eq!(closure, HashSet::from([0, 1, 2]));
        let closure3 = nfa.lambda_closure(&3).expect("closure");
        assert_eq!(closure3, HashSet::from([3]));
    }

    #[test]
    fn test_epsilon_cycle_terminates() {
        let mut nfa: Nfa<u32, char> = Nfa::new();
        nfa.set_initial_state(0);
        nfa.add_empty_transition(0, 1);
        nfa.add_empty_transition(1, 0);
        let closure = nfa.lambda_closure(&0).expect("closure");
        assert_eq!(closure, HashSet::from([0, 1]));
    }

    #[test]
    fn test_evaluate_through_epsilon() {
        let mut nfa: Nfa<u32, char> = Nfa::new();
        nfa.set_initial_state(0);
        nfa.add_empty_transition(0, 1);
        nfa.add_transition(1, 2, 'a');
        nfa.add_empty_transition(2, 3);
        nfa.add_final_state(3);

        assert!(nfa.evaluate(&['a']));
        assert!(!nfa.evaluate(&[]));
    }

    #[test]
    fn test_empty_word_accepted_via_closure() {
        let mut nfa: Nfa<u32, char> = Nfa::new();
        nfa.set_initial_state(0);
        nfa.add_empty_transition(0, 1);
        nfa.add_final_state(1);
        // keep 'a' in the alphabet so the automaton is non-trivial
        nfa.add_transition(1, 1, 'a');

        assert!(nfa.evaluate(&[]));
    }

    #[test]
    fn test_complete() {
        let mut nfa = abb_nfa();
        nfa.complete(99).expect("complete");
        // every (state, symbol) pair now has a target
        for state in [0, 1, 2, 3, 99] {
            for symbol in ['a', 'b'] {
                assert!(
                    !nfa.delta(&state, &symbol).expect("delta").is_empty(),
                    "missing transition from {state} on {symbol}"
                );
            }
        }
        // the error state loops to itself
        assert_eq!(nfa.delta(&99, &'a').expect("delta"), HashSet::from([99]));
    }

    #[test]
    fn test_complete_rejects_existing_state() {
        let mut nfa = abb_nfa();
        assert!(matches!(
            nfa.complete(0),
            Err(AutomataError::StateAlreadyPresent(_))
        ));
    }

    #[test]
    fn test_complete_preserves_language() {
        let mut nfa = abb_nfa();
        nfa.complete(99).expect("complete");
        assert!(nfa.evaluate(&['a', 'b', 'b']));
        assert!(!nfa.evaluate(&['a', 'b']));
    }

    #[test]
    fn test_clone_is_structural() {
        let nfa = abb_nfa();
        let cloned = nfa.clone();
        assert_eq!(cloned.state_count(), nfa.state_count());
        assert_eq!(cloned.final_states(), nfa.final_states());
        assert!(cloned.evaluate(&['a', 'b', 'b']));
    }
}
