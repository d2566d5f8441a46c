//! Rendering formulas back to surface syntax.

use crate::ast::{Expr, ExprKind};
use std::fmt;

/// Precedence level of a node; higher binds tighter.
fn precedence(expr: &Expr) -> u8 {
    match expr.kind {
        ExprKind::Implies(_, _) => 1,
        ExprKind::Or(_, _) => 2,
        ExprKind::And(_, _) => 3,
        ExprKind::Not(_) => 4,
        ExprKind::Prop(_) | ExprKind::Kh(_, _) => 5,
    }
}

fn fmt_prec(expr: &Expr, min: u8, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let prec = precedence(expr);
    if prec < min {
        write!(f, "(")?;
    }
    match &expr.kind {
        ExprKind::Prop(name) => write!(f, "{name}")?,
        ExprKind::Not(e) => {
            write!(f, "not ")?;
            fmt_prec(e, 4, f)?;
        }
        ExprKind::And(l, r) => {
            fmt_prec(l, 3, f)?;
            write!(f, " and ")?;
            fmt_prec(r, 4, f)?;
        }
        ExprKind::Or(l, r) => {
            fmt_prec(l, 2, f)?;
            write!(f, " or ")?;
            fmt_prec(r, 3, f)?;
        }
        ExprKind::Implies(l, r) => {
            fmt_prec(l, 2, f)?;
            write!(f, " implies ")?;
            fmt_prec(r, 1, f)?;
        }
        ExprKind::Kh(init, goal) => {
            write!(f, "kh(")?;
            fmt_prec(init, 0, f)?;
            write!(f, ", ")?;
            fmt_prec(goal, 0, f)?;
            write!(f, ")")?;
        }
    }
    if prec < min {
        write!(f, ")")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_prec(self, 0, f)
    }
}
