//! Abstract syntax tree for knowing-how logic formulas.

use crate::token::Span;

/// A formula with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// The kind of formula.
///
/// The grammar is closed: propositions, the boolean connectives, and the
/// binary knowing-how operator `kh(init, goal)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// An atomic proposition. N-ary fluent-style names (`on(a, b)`) are kept
    /// as a single flat string.
    Prop(String),
    /// `not e`
    Not(Box<Expr>),
    /// `l and r`
    And(Box<Expr>, Box<Expr>),
    /// `l or r`
    Or(Box<Expr>, Box<Expr>),
    /// `l implies r`
    Implies(Box<Expr>, Box<Expr>),
    /// `kh(init, goal)`: some plan is strongly executable from every
    /// init-state and guaranteed to reach a goal-state.
    Kh(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Wrap this formula in a negation.
    pub fn negated(self) -> Expr {
        let span = self.span;
        Expr::new(ExprKind::Not(Box::new(self)), span)
    }

    /// Whether the top-level operator is `kh`.
    pub fn is_kh(&self) -> bool {
        matches!(self.kind, ExprKind::Kh(_, _))
    }

    /// Sub-formulas of this node, left to right.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Prop(_) => vec![],
            ExprKind::Not(e) => vec![e],
            ExprKind::And(l, r)
            | ExprKind::Or(l, r)
            | ExprKind::Implies(l, r)
            | ExprKind::Kh(l, r) => vec![l, r],
        }
    }

    /// Number of nodes in this formula.
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(|c| c.size()).sum::<usize>()
    }

    /// The operator (or proposition) name of this node.
    pub fn name(&self) -> &str {
        match &self.kind {
            ExprKind::Prop(name) => name,
            ExprKind::Not(_) => "not",
            ExprKind::And(_, _) => "and",
            ExprKind::Or(_, _) => "or",
            ExprKind::Implies(_, _) => "implies",
            ExprKind::Kh(_, _) => "kh",
        }
    }
}
