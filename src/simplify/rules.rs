//! The standard rewrite rules.

use std::f64::consts::FRAC_PI_2;

use super::RewriteRule;
use crate::core::{NodeId, NodeKind, Session};

/// Folds operators whose operands are all constants.
pub struct ConstantFold;

/// Removes additive and multiplicative identities.
pub struct Identity;

/// `x * 0 = 0`.
pub struct Absorb;

/// Turns negations into subtractions and multiplications by `-1` into negations.
pub struct NegationFold;

fn is_zero(session: &Session<'_>, id: NodeId) -> bool {
    // Matches both +0.0 and -0.0.
    session.const_value(id) == Some(0.0)
}

fn is_const(session: &Session<'_>, id: NodeId, value: f64) -> bool {
    session.const_value(id) == Some(value)
}

/// `y` when `id` is `0 - y`.
fn negated(session: &Session<'_>, id: NodeId) -> Option<NodeId> {
    match session.kind(id) {
        NodeKind::Minus(zero, y) if is_zero(session, zero) => Some(y),
        _ => None,
    }
}

/// Exact cosine at constant angles: odd multiples of π/2 are zero.
fn cos_exact(angle: f64) -> f64 {
    let quarter_turns = angle / FRAC_PI_2;
    let odd = quarter_turns.fract() == 0.0 && quarter_turns.rem_euclid(2.0) == 1.0;
    if odd {
        0.0
    } else {
        angle.cos()
    }
}

impl RewriteRule for ConstantFold {
    fn name(&self) -> &'static str {
        "constant-fold"
    }

    fn rewrite(&self, session: &Session<'_>, kind: &NodeKind) -> Option<NodeId> {
        let binary = |a: NodeId, b: NodeId, op: fn(f64, f64) -> f64| {
            let x = session.const_value(a)?;
            let y = session.const_value(b)?;
            Some(session.lift(op(x, y)))
        };

        match *kind {
            NodeKind::Plus(a, b) => binary(a, b, |x, y| x + y),
            NodeKind::Minus(a, b) => binary(a, b, |x, y| x - y),
            NodeKind::Times(a, b) => binary(a, b, |x, y| x * y),
            NodeKind::Div(a, b) => binary(a, b, |x, y| x / y),
            NodeKind::Sin(a) => session.const_value(a).map(|x| session.lift(x.sin())),
            NodeKind::Cos(a) => session.const_value(a).map(|x| session.lift(cos_exact(x))),
            _ => None,
        }
    }
}

impl RewriteRule for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn rewrite(&self, session: &Session<'_>, kind: &NodeKind) -> Option<NodeId> {
        match *kind {
            NodeKind::Plus(a, b) if is_zero(session, b) => Some(a),
            NodeKind::Plus(a, b) if is_zero(session, a) => Some(b),
            NodeKind::Minus(a, b) if is_zero(session, b) => Some(a),
            NodeKind::Times(a, b) if is_const(session, b, 1.0) => Some(a),
            NodeKind::Times(a, b) if is_const(session, a, 1.0) => Some(b),
            NodeKind::Div(a, b) if is_const(session, b, 1.0) => Some(a),
            _ => None,
        }
    }
}

impl RewriteRule for Absorb {
    fn name(&self) -> &'static str {
        "absorb"
    }

    fn rewrite(&self, session: &Session<'_>, kind: &NodeKind) -> Option<NodeId> {
        match *kind {
            NodeKind::Times(a, b) if is_zero(session, a) || is_zero(session, b) => Some(session.lift(0.0)),
            _ => None,
        }
    }
}

impl RewriteRule for NegationFold {
    fn name(&self) -> &'static str {
        "negation-fold"
    }

    fn rewrite(&self, session: &Session<'_>, kind: &NodeKind) -> Option<NodeId> {
        match *kind {
            NodeKind::Plus(a, b) => negated(session, b).map(|y| session.minus(a, y)),
            NodeKind::Minus(a, b) => negated(session, b).map(|y| session.plus(a, y)),
            NodeKind::Times(a, b) if is_const(session, b, -1.0) => Some(session.negate(a)),
            NodeKind::Times(a, b) if is_const(session, a, -1.0) => Some(session.negate(b)),
            _ => None,
        }
    }
}
