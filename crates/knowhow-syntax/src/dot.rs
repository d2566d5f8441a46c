//! Graphviz DOT rendering of formula trees.

use crate::ast::Expr;
use std::fmt::Write;

/// Render a formula tree as a DOT digraph. Nodes are numbered pre-order,
/// so a child's id is the parent's id plus one plus the sizes of the
/// preceding siblings.
pub fn expr_to_dot(expr: &Expr) -> String {
    let mut out = String::from("digraph Tree {\n");
    write_node(expr, 0, &mut out);
    out.push_str("}\n");
    out
}

fn write_node(expr: &Expr, id: usize, out: &mut String) {
    let _ = writeln!(out, "  {} [label=\"{}\"];", id, escape(expr.name()));
    let mut child_id = id + 1;
    for child in expr.children() {
        let _ = writeln!(out, "  {} -> {};", id, child_id);
        write_node(child, child_id, out);
        child_id += child.size();
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
