//! Labeled transition systems.

use crate::error::{CheckError, CheckResult};
use crate::frontier::Frontier;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

/// A finite labeled transition system: states carry sets of true
/// propositions, edges carry actions, and an action from a state may lead
/// to several targets.
#[derive(Debug, Clone, Default)]
pub struct Lts<S, A> {
    /// `source -> action -> targets`. Every state of the model is a key of
    /// this map, possibly with an empty row.
    transitions: HashMap<S, HashMap<A, HashSet<S>>>,
    /// Propositions true at each state. States added implicitly by a
    /// transition have no entry and an empty label set.
    labels: HashMap<S, HashSet<String>>,
    actions: HashSet<A>,
}

impl<S, A> Lts<S, A>
where
    S: Clone + Eq + Hash + Ord + fmt::Debug,
    A: Clone + Eq + Hash + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            transitions: HashMap::new(),
            labels: HashMap::new(),
            actions: HashSet::new(),
        }
    }

    /// Add a state with the propositions that hold in it. Re-adding a state
    /// replaces its labels.
    pub fn add_state<I, P>(&mut self, state: S, labels: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.transitions.entry(state.clone()).or_default();
        self.labels
            .insert(state, labels.into_iter().map(Into::into).collect());
    }

    /// Add a transition, adding either endpoint if absent (with no labels).
    pub fn add_transition(&mut self, source: S, target: S, action: A) {
        self.transitions.entry(target.clone()).or_default();
        self.actions.insert(action.clone());
        self.transitions
            .entry(source)
            .or_default()
            .entry(action)
            .or_default()
            .insert(target);
    }

    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.transitions.keys()
    }

    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn actions(&self) -> &HashSet<A> {
        &self.actions
    }

    pub fn contains_state(&self, state: &S) -> bool {
        self.transitions.contains_key(state)
    }

    /// The propositions true at `state`.
    pub fn labels(&self, state: &S) -> CheckResult<HashSet<String>> {
        if !self.contains_state(state) {
            return Err(CheckError::UnknownState(format!("{state:?}")));
        }
        Ok(self.labels.get(state).cloned().unwrap_or_default())
    }

    /// States reachable from `from` by performing `action`.
    pub fn targets(&self, from: &S, action: &A) -> CheckResult<HashSet<S>> {
        let row = self
            .transitions
            .get(from)
            .ok_or_else(|| CheckError::UnknownState(format!("{from:?}")))?;
        Ok(row.get(action).cloned().unwrap_or_default())
    }

    /// Union of `targets` over a frontier of states.
    ///
    /// With `strongly_executable` set, returns `None` when some member of
    /// the frontier has no `action`-successor at all; this is the primitive
    /// the strong-executability construction relies on.
    pub fn targets_from_set(
        &self,
        from: &Frontier<S>,
        action: &A,
        strongly_executable: bool,
    ) -> CheckResult<Option<HashSet<S>>> {
        let mut union = HashSet::new();
        for state in from {
            let targets = self.targets(state, action)?;
            if strongly_executable && targets.is_empty() {
                return Ok(None);
            }
            union.extend(targets);
        }
        Ok(Some(union))
    }
}
