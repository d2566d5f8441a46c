//! Language-level operations on automata: determinization, minimization,
//! products, complement, and canonical renumbering.
//!
//! Operations that build a new automaton assign fresh sequential `u32` state
//! ids in first-visit order; the content of the input states is not
//! preserved, only the accepted language.

use crate::dfa::Dfa;
use crate::error::{AutomataError, AutomataResult};
use crate::nfa::Nfa;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;
use tracing::debug;

/// Determinize an NFA by subset construction.
///
/// DFA states are epsilon-closures of NFA state sets; the initial DFA state
/// is the closure of the NFA's initial state, and a DFA state is final iff
/// its underlying set intersects the NFA's final states. Empty successor
/// closures are never materialized, so the result is not necessarily
/// complete.
pub fn determinize<S, A>(nfa: &Nfa<S, A>) -> AutomataResult<Dfa<u32, A>>
where
    S: Clone + Eq + Hash + Ord + fmt::Debug,
    A: Clone + Eq + Hash + fmt::Debug,
{
    let initial = nfa.initial_state().ok_or(AutomataError::NoInitialState)?;

    let mut result = Dfa::new();
    let mut index: HashMap<BTreeSet<S>, u32> = HashMap::new();
    let mut unvisited: Vec<BTreeSet<S>> = Vec::new();

    let start: BTreeSet<S> = nfa.lambda_closure(initial)?.into_iter().collect();
    index.insert(start.clone(), 0);
    result.set_initial_state(0);
    if start.iter().any(|state| nfa.is_final(state)) {
        result.add_final_state(0);
    }
    unvisited.push(start);

    while let Some(set) = unvisited.pop() {
        let set_id = index[&set];

        for symbol in nfa.alphabet() {
            let moved = nfa.move_set(set.iter(), symbol)?;
            let closed: BTreeSet<S> = nfa
                .lambda_closure_set(moved.iter())?
                .into_iter()
                .collect();
            if closed.is_empty() {
                continue;
            }

            let next_id = match index.get(&closed).copied() {
                Some(id) => id,
                None => {
                    let id = index.len() as u32;
                    index.insert(closed.clone(), id);
                    if closed.iter().any(|state| nfa.is_final(state)) {
                        result.add_final_state(id);
                    }
                    unvisited.push(closed);
                    id
                }
            };
            result.add_transition(set_id, next_id, symbol.clone());
        }
    }

    debug!(
        nfa_states = nfa.state_count(),
        dfa_states = result.state_count(),
        "determinized"
    );
    Ok(result)
}

/// Minimize a DFA by Moore-style partition refinement.
///
/// The initial partition separates final from non-final states; blocks are
/// then repeatedly split by grouping states whose per-symbol targets fall in
/// the same current block. Two states lacking a transition for a symbol are
/// equivalent on that symbol only if both lack it.
pub fn minimize<S, A>(dfa: &Dfa<S, A>) -> AutomataResult<Dfa<u32, A>>
where
    S: Clone + Eq + Hash + Ord + fmt::Debug,
    A: Clone + Eq + Hash + Ord + fmt::Debug,
{
    let initial = dfa.initial_state().ok_or(AutomataError::NoInitialState)?;

    // sorted so block signatures are comparable across states
    let mut alphabet: Vec<&A> = dfa.alphabet().iter().collect();
    alphabet.sort();

    let finals: BTreeSet<S> = dfa.final_states().iter().cloned().collect();
    let non_finals: BTreeSet<S> = dfa.non_final_states().into_iter().collect();
    let mut partition: Vec<BTreeSet<S>> = [finals, non_finals]
        .into_iter()
        .filter(|block| !block.is_empty())
        .collect();

    loop {
        let block_of: HashMap<&S, usize> = partition
            .iter()
            .enumerate()
            .flat_map(|(i, block)| block.iter().map(move |state| (state, i)))
            .collect();

        let mut refined: Vec<BTreeSet<S>> = Vec::new();
        for block in &partition {
            let mut groups: HashMap<Vec<Option<usize>>, BTreeSet<S>> = HashMap::new();
            for state in block {
                let signature: Vec<Option<usize>> = alphabet
                    .iter()
                    .map(|symbol| dfa.target(state, *symbol).map(|target| block_of[target]))
                    .collect();
                groups.entry(signature).or_default().insert(state.clone());
            }
            refined.extend(groups.into_values());
        }

        let stable = refined.len() == partition.len();
        partition = refined;
        if stable {
            break;
        }
    }

    let block_of: HashMap<&S, usize> = partition
        .iter()
        .enumerate()
        .flat_map(|(i, block)| block.iter().map(move |state| (state, i)))
        .collect();

    let mut result = Dfa::new();
    for (id, block) in partition.iter().enumerate() {
        result.add_state(id as u32);
        if block.contains(initial) {
            result.set_initial_state(id as u32);
        }
        if block.iter().any(|state| dfa.is_final(state)) {
            result.add_final_state(id as u32);
        }
    }
    // transitions from any representative member
    for (id, block) in partition.iter().enumerate() {
        if let Some(representative) = block.first() {
            for symbol in &alphabet {
                if let Some(target) = dfa.target(representative, *symbol) {
                    result.add_transition(id as u32, block_of[target] as u32, (*symbol).clone());
                }
            }
        }
    }

    debug!(
        from_states = dfa.state_count(),
        to_states = result.state_count(),
        "minimized"
    );
    Ok(result)
}

/// Synchronized product of two DFAs, built lazily from the pair of initial
/// states. A transition exists in the product only if both operands have
/// one; a pair state is final iff both components are final.
pub fn intersection<S1, S2, A>(a: &Dfa<S1, A>, b: &Dfa<S2, A>) -> AutomataResult<Dfa<u32, A>>
where
    S1: Clone + Eq + Hash + fmt::Debug,
    S2: Clone + Eq + Hash + fmt::Debug,
    A: Clone + Eq + Hash + fmt::Debug,
{
    let a0 = a.initial_state().ok_or(AutomataError::NoInitialState)?;
    let b0 = b.initial_state().ok_or(AutomataError::NoInitialState)?;

    let mut result = Dfa::new();
    let mut index: HashMap<(S1, S2), u32> = HashMap::new();
    let mut unvisited: VecDeque<(S1, S2)> = VecDeque::new();

    index.insert((a0.clone(), b0.clone()), 0);
    result.set_initial_state(0);
    unvisited.push_back((a0.clone(), b0.clone()));

    while let Some(pair) = unvisited.pop_front() {
        let pair_id = index[&pair];
        if a.is_final(&pair.0) && b.is_final(&pair.1) {
            result.add_final_state(pair_id);
        }

        for symbol in a.alphabet() {
            let (Some(t1), Some(t2)) = (a.target(&pair.0, symbol), b.target(&pair.1, symbol))
            else {
                continue;
            };

            let next = (t1.clone(), t2.clone());
            let next_id = match index.get(&next).copied() {
                Some(id) => id,
                None => {
                    let id = index.len() as u32;
                    index.insert(next.clone(), id);
                    unvisited.push_back(next);
                    id
                }
            };
            result.add_transition(pair_id, next_id, symbol.clone());
        }
    }

    Ok(result)
}

/// Synchronized product of two NFAs, computed over epsilon-closed successor
/// sets so operands with epsilon transitions are supported. Product states
/// are pairs of the operand states.
pub fn intersection_nfa<S1, S2, A>(
    a: &Nfa<S1, A>,
    b: &Nfa<S2, A>,
) -> AutomataResult<Nfa<(S1, S2), A>>
where
    S1: Clone + Eq + Hash + fmt::Debug,
    S2: Clone + Eq + Hash + fmt::Debug,
    A: Clone + Eq + Hash + fmt::Debug,
{
    let a0 = a.initial_state().ok_or(AutomataError::NoInitialState)?;
    let b0 = b.initial_state().ok_or(AutomataError::NoInitialState)?;

    let mut result: Nfa<(S1, S2), A> = Nfa::new();
    let mut unvisited: VecDeque<(S1, S2)> = VecDeque::new();

    let initial = (a0.clone(), b0.clone());
    result.set_initial_state(initial.clone());
    if a.is_final(a0) && b.is_final(b0) {
        result.add_final_state(initial.clone());
    }
    unvisited.push_back(initial);

    while let Some(pair) = unvisited.pop_front() {
        for symbol in a.alphabet() {
            let s1 = a.lambda_closure_set(a.delta(&pair.0, symbol)?.iter())?;
            let s2 = b.lambda_closure_set(b.delta(&pair.1, symbol)?.iter())?;

            for state1 in &s1 {
                for state2 in &s2 {
                    let next = (state1.clone(), state2.clone());
                    if !result.contains_state(&next) {
                        result.add_state(next.clone());
                        if a.is_final(state1) && b.is_final(state2) {
                            result.add_final_state(next.clone());
                        }
                        unvisited.push_back(next.clone());
                    }
                    result.add_transition(pair.clone(), next, symbol.clone());
                }
            }
        }
    }

    Ok(result)
}

/// Intersection of an arbitrary non-empty collection of DFAs, as a left
/// fold of the pairwise product. Pairwise intersection is commutative and
/// associative up to isomorphism, so the fold order does not affect the
/// accepted language.
pub fn intersection_all<S, A>(automata: &[Dfa<S, A>]) -> AutomataResult<Dfa<u32, A>>
where
    S: Clone + Eq + Hash + fmt::Debug,
    A: Clone + Eq + Hash + fmt::Debug,
{
    let Some((first, rest)) = automata.split_first() else {
        return Err(AutomataError::EmptyAutomataSet);
    };

    let mut result = to_integer_states(first)?;
    for next in rest {
        result = intersection(&result, next)?;
    }
    Ok(result)
}

/// Complement a DFA by swapping final and non-final states.
///
/// Precondition: the input is complete (every `(state, symbol)` pair has a
/// transition). This is not enforced here; callers complete the automaton
/// first or get the complement relative to the defined transitions only.
pub fn complement<S, A>(dfa: &Dfa<S, A>) -> Dfa<S, A>
where
    S: Clone + Eq + Hash + fmt::Debug,
    A: Clone + Eq + Hash + fmt::Debug,
{
    let mut result = dfa.clone();
    result.invert_final_states();
    result
}

/// Reinterpret an NFA with a deterministic structure as a DFA, without
/// changing states. Fails if any state has an epsilon transition or more
/// than one target for some symbol.
pub fn as_deterministic<S, A>(nfa: &Nfa<S, A>) -> AutomataResult<Dfa<S, A>>
where
    S: Clone + Eq + Hash + fmt::Debug,
    A: Clone + Eq + Hash + fmt::Debug,
{
    let initial = nfa.initial_state().ok_or(AutomataError::NoInitialState)?;

    let mut dfa = Dfa::new();
    dfa.set_initial_state(initial.clone());

    for state in nfa.states() {
        if !nfa.empty_delta(state)?.is_empty() {
            return Err(AutomataError::NotDeterministic("has empty transitions"));
        }
        dfa.add_state(state.clone());

        for symbol in nfa.alphabet() {
            let targets = nfa.delta(state, symbol)?;
            if targets.len() > 1 {
                return Err(AutomataError::NotDeterministic(
                    "has multiple targets for one symbol",
                ));
            }
            if let Some(target) = targets.into_iter().next() {
                dfa.add_transition(state.clone(), target, symbol.clone());
            }
        }
    }

    for state in nfa.final_states() {
        dfa.add_final_state(state.clone());
    }
    Ok(dfa)
}

/// Renumber a DFA's states with sequential integers in first-seen iteration
/// order. A language-preserving bijection.
pub fn to_integer_states<S, A>(dfa: &Dfa<S, A>) -> AutomataResult<Dfa<u32, A>>
where
    S: Clone + Eq + Hash + fmt::Debug,
    A: Clone + Eq + Hash + fmt::Debug,
{
    let initial = dfa.initial_state().ok_or(AutomataError::NoInitialState)?;

    let mut result = Dfa::new();
    let mut index: HashMap<&S, u32> = HashMap::new();

    for state in dfa.states() {
        let id = index.len() as u32;
        index.insert(state, id);
        result.add_state(id);
        if dfa.is_final(state) {
            result.add_final_state(id);
        }
    }
    result.set_initial_state(index[initial]);

    for source in dfa.states() {
        for symbol in dfa.alphabet() {
            if let Some(target) = dfa.target(source, symbol) {
                result.add_transition(index[source], index[target], symbol.clone());
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// NFA for (ac | b+)+ with an epsilon loop back to the start.
    fn ac_or_bs_nfa() -> Nfa<&'static str, char> {
        let mut nfa = Nfa::new();
        nfa.set_initial_state("start");
        nfa.add_transition("start", "mid", 'a');
        nfa.add_transition("mid", "done", 'c');
        nfa.add_transition("start", "bs", 'b');
        nfa.add_transition("bs", "bs", 'b');
        nfa.add_empty_transition("bs", "done");
        nfa.add_empty_transition("done", "start");
        nfa.add_final_state("done");
        nfa
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_determinize_preserves_language() {
        let nfa = ac_or_bs_nfa();
        let dfa = determinize(&nfa).expect("determinize");

        for word in ["ac", "b", "bbb", "acb", "bac", "acacac", "", "a", "ca", "bba"] {
            let w = chars(word);
            assert_eq!(
                nfa.evaluate(&w),
                dfa.evaluate(&w),
                "disagreement on {word:?}"
            );
        }
    }

    #[test]
    fn test_determinize_initial_can_be_final() {
        let mut nfa: Nfa<u32, char> = Nfa::new();
        nfa.set_initial_state(0);
        nfa.add_empty_transition(0, 1);
        nfa.add_final_state(1);
        nfa.add_transition(1, 0, 'a');

        let dfa = determinize(&nfa).expect("determinize");
        assert!(dfa.evaluate(&[]));
    }

    #[test]
    fn test_determinize_requires_initial() {
        let nfa: Nfa<u32, char> = Nfa::new();
        assert!(matches!(
            determinize(&nfa),
            Err(AutomataError::NoInitialState)
        ));
    }

    /// DFA for 01+ with two redundant accepting states.
    fn redundant_01_dfa() -> Dfa<u32, char> {
        let mut dfa = Dfa::new();
        dfa.set_initial_state(0);
        dfa.add_transition(0, 1, '0');
        dfa.add_transition(1, 2, '1');
        dfa.add_transition(2, 3, '1');
        dfa.add_transition(3, 3, '1');
        dfa.add_final_state(2);
        dfa.add_final_state(3);
        dfa
    }

    #[test]
    fn test_minimize_merges_equivalent_states() {
        let dfa = redundant_01_dfa();
        let min = minimize(&dfa).expect("minimize");

        assert_eq!(min.state_count(), 3);
        for word in ["01", "011", "0111", "", "0", "1", "010"] {
            let w = chars(word);
            assert_eq!(
                dfa.evaluate(&w),
                min.evaluate(&w),
                "disagreement on {word:?}"
            );
        }
    }

    #[test]
    fn test_minimize_distinguishes_missing_transitions() {
        // states 1 and 2 are both final, but only 1 can continue with 'a';
        // they must not be merged
        let mut dfa: Dfa<u32, char> = Dfa::new();
        dfa.set_initial_state(0);
        dfa.add_transition(0, 1, 'a');
        dfa.add_transition(1, 2, 'b');
        dfa.add_transition(1, 1, 'a');
        dfa.add_final_state(1);
        dfa.add_final_state(2);

        let min = minimize(&dfa).expect("minimize");
        assert_eq!(min.state_count(), 3);
        assert!(min.evaluate(&['a', 'a', 'b']));
        assert!(!min.evaluate(&['a', 'b', 'b']));
    }

    /// DFA accepting words over {a, b} with an even number of 'a'.
    fn even_as() -> Dfa<u32, char> {
        let mut dfa = Dfa::new();
        dfa.set_initial_state(0);
        dfa.add_transition(0, 1, 'a');
        dfa.add_transition(1, 0, 'a');
        dfa.add_transition(0, 0, 'b');
        dfa.add_transition(1, 1, 'b');
        dfa.add_final_state(0);
        dfa
    }

    /// DFA accepting words over {a, b} ending in 'b'.
    fn ends_in_b() -> Dfa<u32, char> {
        let mut dfa = Dfa::new();
        dfa.set_initial_state(0);
        dfa.add_transition(0, 0, 'a');
        dfa.add_transition(0, 1, 'b');
        dfa.add_transition(1, 0, 'a');
        dfa.add_transition(1, 1, 'b');
        dfa.add_final_state(1);
        dfa
    }

    #[test]
    fn test_intersection_is_conjunction() {
        let d1 = even_as();
        let d2 = ends_in_b();
        let both = intersection(&d1, &d2).expect("intersection");

        for word in ["", "b", "ab", "aab", "aabab", "ba", "abab", "bb"] {
            let w = chars(word);
            assert_eq!(
                both.evaluate(&w),
                d1.evaluate(&w) && d2.evaluate(&w),
                "disagreement on {word:?}"
            );
        }
    }

    #[test]
    fn test_intersection_all() {
        // third operand: words of length >= 2
        let mut d3: Dfa<u32, char> = Dfa::new();
        d3.set_initial_state(0);
        d3.add_transition(0, 1, 'a');
        d3.add_transition(0, 1, 'b');
        d3.add_transition(1, 2, 'a');
        d3.add_transition(1, 2, 'b');
        d3.add_transition(2, 2, 'a');
        d3.add_transition(2, 2, 'b');
        d3.add_final_state(2);

        let result =
            intersection_all(&[even_as(), ends_in_b(), d3]).expect("intersection_all");

        for word in ["aab", "b", "ab", "aabb", "bbab", ""] {
            let w = chars(word);
            let expected = even_as().evaluate(&w) && ends_in_b().evaluate(&w) && w.len() >= 2;
            assert_eq!(result.evaluate(&w), expected, "disagreement on {word:?}");
        }
    }

    #[test]
    fn test_intersection_all_rejects_empty() {
        let automata: Vec<Dfa<u32, char>> = vec![];
        assert!(matches!(
            intersection_all(&automata),
            Err(AutomataError::EmptyAutomataSet)
        ));
    }

    #[test]
    fn test_intersection_nfa() {
        // (a|b)* with an even number of symbols vs words containing an 'a'
        let mut n1: Nfa<u32, char> = Nfa::new();
        n1.set_initial_state(0);
        n1.add_transition(0, 1, 'a');
        n1.add_transition(0, 1, 'b');
        n1.add_transition(1, 0, 'a');
        n1.add_transition(1, 0, 'b');
        n1.add_final_state(0);

        let mut n2: Nfa<u32, char> = Nfa::new();
        n2.set_initial_state(0);
        n2.add_transition(0, 0, 'a');
        n2.add_transition(0, 0, 'b');
        n2.add_transition(0, 1, 'a');
        n2.add_transition(1, 1, 'a');
        n2.add_transition(1, 1, 'b');
        n2.add_final_state(1);

        let product = intersection_nfa(&n1, &n2).expect("intersection_nfa");
        for word in ["ab", "ba", "aa", "bb", "a", "b", "", "abab", "bbbb", "bbba"] {
            let w = chars(word);
            assert_eq!(
                product.evaluate(&w),
                n1.evaluate(&w) && n2.evaluate(&w),
                "disagreement on {word:?}"
            );
        }
    }

    #[test]
    fn test_complement_after_complete() {
        let mut dfa = even_as();
        dfa.complete(99).expect("complete");
        let comp = complement(&dfa);

        for word in ["", "a", "aa", "ab", "ba", "bab"] {
            let w = chars(word);
            assert_eq!(
                comp.evaluate(&w),
                !dfa.evaluate(&w),
                "disagreement on {word:?}"
            );
        }
    }

    #[test]
    fn test_as_deterministic() {
        let mut nfa: Nfa<u32, char> = Nfa::new();
        nfa.set_initial_state(0);
        nfa.add_transition(0, 1, 'a');
        nfa.add_transition(1, 0, 'b');
        nfa.add_final_state(1);

        let dfa = as_deterministic(&nfa).expect("as_deterministic");
        assert!(dfa.evaluate(&['a']));
        assert!(dfa.evaluate(&['a', 'b', 'a']));
        assert!(!dfa.evaluate(&['b']));
        assert_eq!(dfa.state_count(), 2);
    }

    #[test]
    fn test_as_deterministic_rejects_epsilon() {
        let mut nfa: Nfa<u32, char> = Nfa::new();
        nfa.set_initial_state(0);
        nfa.add_empty_transition(0, 1);
        nfa.add_transition(1, 1, 'a');
        assert!(matches!(
            as_deterministic(&nfa),
            Err(AutomataError::NotDeterministic(_))
        ));
    }

    #[test]
    fn test_as_deterministic_rejects_branching() {
        let mut nfa: Nfa<u32, char> = Nfa::new();
        nfa.set_initial_state(0);
        nfa.add_transition(0, 1, 'a');
        nfa.add_transition(0, 2, 'a');
        assert!(matches!(
            as_deterministic(&nfa),
            Err(AutomataError::NotDeterministic(_))
        ));
    }

    #[test]
    fn test_to_integer_states_preserves_language() {
        let dfa = {
            let mut dfa: Dfa<&'static str, char> = Dfa::new();
            dfa.set_initial_state("one");
            dfa.add_transition("one", "two", 'x');
            dfa.add_transition("two", "one", 'y');
            dfa.add_final_state("two");
            dfa
        };
        let renumbered = to_integer_states(&dfa).expect("to_integer_states");

        assert_eq!(renumbered.state_count(), dfa.state_count());
        for word in ["x", "xy", "xyx", "", "y", "xx"] {
            let w = chars(word);
            assert_eq!(
                renumbered.evaluate(&w),
                dfa.evaluate(&w),
                "disagreement on {word:?}"
            );
        }
    }
}
