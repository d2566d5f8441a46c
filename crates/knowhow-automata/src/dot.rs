//! Graphviz DOT rendering of automata.
//!
//! Output only; states and symbols are rendered with `Display` and sorted
//! so the output is stable.

use crate::dfa::Dfa;
use crate::nfa::Nfa;
use std::fmt::{self, Write};
use std::hash::Hash;

/// Render a DFA as a DOT digraph. The initial state is marked with a
/// point-shaped pseudo node, final states are doublecircles.
pub fn dfa_to_dot<S, A>(dfa: &Dfa<S, A>) -> String
where
    S: Clone + Eq + Hash + Ord + fmt::Display + fmt::Debug,
    A: Clone + Eq + Hash + Ord + fmt::Display + fmt::Debug,
{
    let mut out = String::from("digraph {\n");
    if let Some(initial) = dfa.initial_state() {
        out.push_str("  init_ [shape=\"point\"];\n");
        let _ = writeln!(out, "  init_ -> {initial};");
    }

    let mut finals: Vec<&S> = dfa.final_states().iter().collect();
    finals.sort();
    for state in finals {
        let _ = writeln!(out, "  {state} [shape=\"doublecircle\"];");
    }

    let mut states: Vec<&S> = dfa.states().collect();
    states.sort();
    let mut symbols: Vec<&A> = dfa.alphabet().iter().collect();
    symbols.sort();
    for &source in &states {
        for &symbol in &symbols {
            if let Some(target) = dfa.target(source, symbol) {
                let _ = writeln!(out, "  {source} -> {target} [label=\"{symbol}\"];");
            }
        }
    }
    out.push_str("}\n");
    out
}

/// Render an NFA as a DOT digraph. Epsilon transitions are unlabelled edges.
pub fn nfa_to_dot<S, A>(nfa: &Nfa<S, A>) -> String
where
    S: Clone + Eq + Hash + Ord + fmt::Display + fmt::Debug,
    A: Clone + Eq + Hash + Ord + fmt::Display + fmt::Debug,
{
    let mut out = String::from("digraph {\n");
    if let Some(initial) = nfa.initial_state() {
        out.push_str("  init_ [shape=\"point\"];\n");
        let _ = writeln!(out, "  init_ -> {initial};");
    }

    let mut finals: Vec<&S> = nfa.final_states().iter().collect();
    finals.sort();
    for state in finals {
        let _ = writeln!(out, "  {state} [shape=\"doublecircle\"];");
    }

    let mut states: Vec<&S> = nfa.states().collect();
    states.sort();
    let mut symbols: Vec<&A> = nfa.alphabet().iter().collect();
    symbols.sort();
    for &source in &states {
        for &symbol in &symbols {
            if let Ok(targets) = nfa.delta(source, symbol) {
                let mut targets: Vec<S> = targets.into_iter().collect();
                targets.sort();
                for target in targets {
                    let _ = writeln!(out, "  {source} -> {target} [label=\"{symbol}\"];");
                }
            }
        }
        if let Ok(targets) = nfa.empty_delta(source) {
            let mut targets: Vec<S> = targets.into_iter().collect();
            targets.sort();
            for target in targets {
                let _ = writeln!(out, "  {source} -> {target};");
            }
        }
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dfa_to_dot() {
        let mut dfa: Dfa<u32, char> = Dfa::new();
        dfa.set_initial_state(0);
        dfa.add_transition(0, 1, 'a');
        dfa.add_final_state(1);

        let dot = dfa_to_dot(&dfa);
        assert!(dot.contains("init_ -> 0;"));
        assert!(dot.contains("1 [shape=\"doublecircle\"];"));
        assert!(dot.contains("0 -> 1 [label=\"a\"];"));
    }

    #[test]
    fn test_nfa_to_dot_epsilon_unlabelled() {
        let mut nfa: Nfa<u32, char> = Nfa::new();
        nfa.set_initial_state(0);
        nfa.add_empty_transition(0, 1);
        nfa.add_transition(1, 2, 'a');
        nfa.add_final_state(2);

        let dot = nfa_to_dot(&nfa);
        assert!(dot.contains("  0 -> 1;\n"));
        assert!(dot.contains("1 -> 2 [label=\"a\"];"));
    }
}
