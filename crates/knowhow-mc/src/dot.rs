//! DOT import and export of labeled transition systems.
//!
//! The exporter writes one node line per state with the true propositions
//! in the label, and one edge line per transition with the action in the
//! label. The importer reads exactly that shape back, with string states
//! and actions:
//!
//! ```text
//! digraph {
//!   s0 [label="p q"];
//!   s1;
//!   s0 -> s1 [label="go"];
//! }
//! ```

use crate::lts::Lts;
use std::fmt::{self, Write};
use std::hash::Hash;
use thiserror::Error;

/// A DOT import error, pointing at the offending line.
#[derive(Debug, Error)]
pub enum DotError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

fn syntax(line: usize, message: impl Into<String>) -> DotError {
    DotError::Syntax {
        line,
        message: message.into(),
    }
}

/// Render an LTS as a DOT digraph. States, actions, and labels are sorted
/// so the output is stable.
pub fn lts_to_dot<S, A>(lts: &Lts<S, A>) -> String
where
    S: Clone + Eq + Hash + Ord + fmt::Display + fmt::Debug,
    A: Clone + Eq + Hash + Ord + fmt::Display + fmt::Debug,
{
    let mut out = String::from("digraph {\n");

    let mut states: Vec<&S> = lts.states().collect();
    states.sort();
    let mut actions: Vec<&A> = lts.actions().iter().collect();
    actions.sort();

    for &state in &states {
        let mut props: Vec<String> = lts
            .labels(state)
            .map(|labels| labels.into_iter().collect())
            .unwrap_or_default();
        props.sort();
        let _ = writeln!(out, "  {} [label=\"{}\"];", state, props.join(" "));
    }
    for &source in &states {
        for &action in &actions {
            if let Ok(targets) = lts.targets(source, action) {
                let mut targets: Vec<S> = targets.into_iter().collect();
                targets.sort();
                for target in targets {
                    let _ = writeln!(out, "  {source} -> {target} [label=\"{action}\"];");
                }
            }
        }
    }
    out.push_str("}\n");
    out
}

/// Parse an LTS from the DOT subset written by [`lts_to_dot`].
pub fn parse_lts(input: &str) -> Result<Lts<String, String>, DotError> {
    let mut lts = Lts::new();
    let mut seen_header = false;

    for (i, raw) in input.lines().enumerate() {
        let lineno = i + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if line.starts_with("digraph") {
            seen_header = true;
            continue;
        }
        if line == "}" {
            continue;
        }
        if !seen_header {
            return Err(syntax(lineno, "expected `digraph {` header"));
        }

        let line = line.strip_suffix(';').unwrap_or(line);
        if let Some((source, rest)) = line.split_once("->") {
            let source = source.trim();
            let (target, attrs) = split_attrs(rest.trim());
            if source.is_empty() || target.is_empty() {
                return Err(syntax(lineno, "edge needs a source and a target"));
            }
            let action = parse_label(attrs)
                .ok_or_else(|| syntax(lineno, "edge needs an action in [label=\"...\"]"))?;
            lts.add_transition(source.to_string(), target.to_string(), action);
        } else {
            let (name, attrs) = split_attrs(line);
            if name.is_empty() {
                return Err(syntax(lineno, "node needs a name"));
            }
            let props = parse_label(attrs).unwrap_or_default();
            lts.add_state(
                name.to_string(),
                props.split_whitespace().map(str::to_string),
            );
        }
    }

    if !seen_header {
        return Err(syntax(1, "expected `digraph {` header"));
    }
    Ok(lts)
}

/// Split `foo [attrs]` into the name and the bracketed attribute text.
fn split_attrs(text: &str) -> (&str, &str) {
    match text.split_once('[') {
        Some((name, rest)) => (name.trim(), rest.trim_end_matches(']')),
        None => (text.trim(), ""),
    }
}

/// Extract the value of a `label="..."` attribute.
fn parse_label(attrs: &str) -> Option<String> {
    let rest = attrs.split_once("label=\"")?.1;
    Some(rest.split_once('"')?.0.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample() -> Lts<String, String> {
        let mut lts = Lts::new();
        lts.add_state("s0".to_string(), ["p", "q"]);
        lts.add_state("s1".to_string(), ["r"]);
        lts.add_state("s2".to_string(), Vec::<String>::new());
        lts.add_transition("s0".to_string(), "s1".to_string(), "go".to_string());
        lts.add_transition("s1".to_string(), "s2".to_string(), "stop".to_string());
        lts.add_transition("s1".to_string(), "s0".to_string(), "back".to_string());
        lts
    }

    #[test]
    fn test_export_shape() {
        let dot = lts_to_dot(&sample());
        assert!(dot.starts_with("digraph {\n"));
        assert!(dot.contains("s0 [label=\"p q\"];"));
        assert!(dot.contains("s2 [label=\"\"];"));
        assert!(dot.contains("s0 -> s1 [label=\"go\"];"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn test_roundtrip() {
        let original = sample();
        let parsed = parse_lts(&lts_to_dot(&original)).expect("parse");

        let states: HashSet<&String> = parsed.states().collect();
        assert_eq!(states.len(), 3);
        assert_eq!(
            parsed.labels(&"s0".to_string()).expect("labels"),
            HashSet::from(["p".to_string(), "q".to_string()])
        );
        assert_eq!(
            parsed
                .targets(&"s1".to_string(), &"stop".to_string())
                .expect("targets"),
            HashSet::from(["s2".to_string()])
        );
        // a second round trip is identical text
        assert_eq!(lts_to_dot(&parsed), lts_to_dot(&original));
    }

    #[test]
    fn test_parse_rejects_missing_header() {
        assert!(matches!(
            parse_lts("s0 -> s1 [label=\"a\"];"),
            Err(DotError::Syntax { line: 1, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_unlabelled_edge() {
        let input = "digraph {\n  s0 -> s1;\n}\n";
        assert!(matches!(
            parse_lts(input),
            Err(DotError::Syntax { line: 2, .. })
        ));
    }

    #[test]
    fn test_parse_bare_node() {
        let lts = parse_lts("digraph {\n  lonely;\n}\n").expect("parse");
        assert!(lts.contains_state(&"lonely".to_string()));
        assert!(lts.labels(&"lonely".to_string()).expect("labels").is_empty());
    }
}
