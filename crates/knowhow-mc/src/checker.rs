//! The knowing-how model checker.
//!
//! `kh(init, goal)` holds at a model iff some finite plan is both strongly
//! executable from every init-state and guaranteed to land in a goal-state.
//! The check reduces to automaton emptiness: one automaton accepts exactly
//! the strongly executable plans, another exactly the plans that never take
//! an init-state to a non-goal-state, and the formula holds iff their
//! intersection is non-empty. Witness plans are enumerated from the same
//! intersection automaton.

use crate::error::{CheckError, CheckResult};
use crate::frontier::Frontier;
use crate::lts::Lts;
use knowhow_automata::{
    complement, intersection, intersection_all, minimize, to_integer_states, AcceptedWords, Dfa,
};
use knowhow_syntax::{Expr, ExprKind};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use tracing::debug;

/// Checker configuration, fixed at construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckConfig {
    /// Minimize each per-state automaton before the final intersections.
    /// Changes performance only, never the verdict or the witnesses.
    pub minimize: bool,
}

/// Evaluates knowing-how formulas over a labeled transition system,
/// pointed at one of its states.
///
/// Every check builds its automata from scratch and discards them; nothing
/// is cached between calls.
pub struct ModelChecker<'a, S, A> {
    lts: &'a Lts<S, A>,
    pointed: S,
    config: CheckConfig,
}

impl<'a, S, A> ModelChecker<'a, S, A>
where
    S: Clone + Eq + Hash + Ord + fmt::Debug,
    A: Clone + Eq + Hash + Ord + fmt::Debug,
{
    /// Create a checker for `lts` pointed at `pointed`.
    pub fn new(lts: &'a Lts<S, A>, pointed: S, config: CheckConfig) -> CheckResult<Self> {
        if !lts.contains_state(&pointed) {
            return Err(CheckError::StateNotInModel(format!("{pointed:?}")));
        }
        Ok(Self {
            lts,
            pointed,
            config,
        })
    }

    pub fn pointed_state(&self) -> &S {
        &self.pointed
    }

    /// Whether the model satisfies `expr` at the pointed state.
    pub fn check(&self, expr: &Expr) -> CheckResult<bool> {
        let pointed = self.pointed.clone();
        self.check_at(expr, &pointed)
    }

    /// Whether the model satisfies `expr` at `state`.
    ///
    /// Boolean connectives are evaluated structurally at the given state; a
    /// `kh` node is evaluated over the whole model, independent of `state`.
    pub fn check_at(&self, expr: &Expr, state: &S) -> CheckResult<bool> {
        match &expr.kind {
            ExprKind::Prop(name) => Ok(self.lts.labels(state)?.contains(name)),
            ExprKind::Not(e) => Ok(!self.check_at(e, state)?),
            ExprKind::And(l, r) => Ok(self.check_at(l, state)? && self.check_at(r, state)?),
            ExprKind::Or(l, r) => Ok(self.check_at(l, state)? || self.check_at(r, state)?),
            ExprKind::Implies(l, r) => Ok(!self.check_at(l, state)? || self.check_at(r, state)?),
            ExprKind::Kh(init, goal) => self.kh(init, goal),
        }
    }

    /// Witness plans for `kh(init, goal)` with length at most `limit`,
    /// shortest first.
    pub fn witnesses(
        &self,
        init: &Expr,
        goal: &Expr,
        limit: usize,
    ) -> CheckResult<AcceptedWords<u32, A>> {
        let automaton = self.kh_automaton(init, goal)?;
        Ok(AcceptedWords::new(automaton, limit))
    }

    /// Whether some plan witnesses `kh(init, goal)`.
    fn kh(&self, init: &Expr, goal: &Expr) -> CheckResult<bool> {
        Ok(!self.kh_automaton(init, goal)?.is_empty())
    }

    /// The automaton accepting exactly the plans that witness
    /// `kh(init, goal)`: plans that are executable everywhere init holds
    /// and that always deliver the goal.
    fn kh_automaton(&self, init: &Expr, goal: &Expr) -> CheckResult<Dfa<u32, A>> {
        debug!(init = %init, goal = %goal, "building kh automaton");
        let automaton = intersection(
            &self.executable_plans(init)?,
            &self.goal_guaranteeing_plans(init, goal)?,
        )?;
        debug!(states = automaton.state_count(), "kh automaton built");
        Ok(automaton)
    }

    /// Plans that are strongly executable from every state satisfying
    /// `init`: the intersection of the per-state frontier automata. With no
    /// init-state the condition is vacuous and only the empty plan remains.
    fn executable_plans(&self, init: &Expr) -> CheckResult<Dfa<u32, A>> {
        let mut automata = Vec::new();
        for state in self.states_holding(init)? {
            let mut automaton = self.se_automaton(&state)?;
            if self.config.minimize {
                automaton = minimize(&automaton)?;
            }
            automata.push(automaton);
        }

        if automata.is_empty() {
            debug!("no state satisfies the init expression; only the empty plan is executable");
            return Ok(Dfa::accepting_empty_word());
        }
        Ok(intersection_all(&automata)?)
    }

    /// Plans that, started in any state satisfying `init`, never end in a
    /// state violating `goal`: the intersection over all (init-state,
    /// non-goal-state) pairs of the complemented reachability automata.
    fn goal_guaranteeing_plans(&self, init: &Expr, goal: &Expr) -> CheckResult<Dfa<u32, A>> {
        let init_states = self.states_holding(init)?;
        let bad_states = self.states_holding(&goal.clone().negated())?;

        let mut automata = Vec::new();
        for init_state in &init_states {
            for bad_state in &bad_states {
                let mut automaton = self.avoidance_automaton(init_state, bad_state)?;
                if self.config.minimize {
                    automaton = minimize(&automaton)?;
                }
                automata.push(automaton);
            }
        }

        if automata.is_empty() {
            debug!("no (init, non-goal) state pair; only the empty plan is constrained");
            return Ok(Dfa::accepting_empty_word());
        }
        Ok(intersection_all(&automata)?)
    }

    /// The automaton of plans strongly executable from `state`.
    ///
    /// States are frontiers (sets of model states); from frontier `X`, an
    /// action `a` leads to the union of the `a`-successors iff every member
    /// of `X` has at least one. Every reachable frontier is final: a plan is
    /// accepted exactly as long as it stays strongly executable.
    fn se_automaton(&self, state: &S) -> CheckResult<Dfa<u32, A>> {
        let mut automaton: Dfa<Frontier<S>, A> = Dfa::new();
        let start = Frontier::singleton(state.clone());
        automaton.set_initial_state(start.clone());

        let mut visited = HashSet::new();
        let mut stack = vec![start];
        while let Some(frontier) = stack.pop() {
            if !visited.insert(frontier.clone()) {
                continue;
            }
            for action in self.lts.actions() {
                if let Some(targets) = self.lts.targets_from_set(&frontier, action, true)? {
                    let next: Frontier<S> = targets.into_iter().collect();
                    automaton.add_transition(frontier.clone(), next.clone(), action.clone());
                    if !visited.contains(&next) {
                        stack.push(next);
                    }
                }
            }
        }

        let frontiers: Vec<Frontier<S>> = automaton.states().cloned().collect();
        automaton.add_final_states(frontiers);
        Ok(to_integer_states(&automaton)?)
    }

    /// The automaton of plans that do **not** take `init_state` to
    /// `bad_state`: a mirror of the full transition relation rooted at
    /// `init_state` with `bad_state` as its sole final state, complemented
    /// as-is (the mirror is deliberately left incomplete; plans that fall
    /// off it are not executable and are already excluded by
    /// `executable_plans`).
    fn avoidance_automaton(&self, init_state: &S, bad_state: &S) -> CheckResult<Dfa<u32, A>> {
        let mut mirror: Dfa<S, A> = Dfa::new();
        for source in self.lts.states() {
            mirror.add_state(source.clone());
            for action in self.lts.actions() {
                let targets = self.lts.targets(source, action)?;
                if targets.len() > 1 {
                    debug!(
                        state = ?source,
                        action = ?action,
                        "non-deterministic edge collapsed to a single target in the mirror"
                    );
                }
                for target in targets {
                    mirror.add_transition(source.clone(), target, action.clone());
                }
            }
        }
        mirror.set_initial_state(init_state.clone());
        mirror.add_final_state(bad_state.clone());

        Ok(to_integer_states(&complement(&mirror))?)
    }

    /// The states where `expr` holds, by a flat scan of the model.
    ///
    /// A `kh` node nested inside `expr` is evaluated globally (see
    /// `check_at`), so it contributes the same verdict at every state;
    /// nested-KH semantics beyond that are undefined and deliberately not
    /// inferred.
    fn states_holding(&self, expr: &Expr) -> CheckResult<Vec<S>> {
        let mut holding = Vec::new();
        for state in self.lts.states() {
            if self.check_at(expr, state)? {
                holding.push(state.clone());
            }
        }
        Ok(holding)
    }
}
