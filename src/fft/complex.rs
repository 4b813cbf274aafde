//! Symbolic complex numbers.

use crate::core::{NodeId, Session};

/// A complex value as a pair of node handles. Not a node itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Complex {
    pub re: NodeId,
    pub im: NodeId,
}

impl Complex {
    pub fn new(re: NodeId, im: NodeId) -> Self {
        Self { re, im }
    }

    /// `cos(angle) + i*sin(angle)` for a specialization-time angle.
    pub fn polar_unit(session: &Session<'_>, angle: f64) -> Self {
        let theta = session.lift(angle);
        Self { re: session.cos(theta), im: session.sin(theta) }
    }

    pub fn add(self, other: Self, session: &Session<'_>) -> Self {
        Self { re: session.plus(self.re, other.re), im: session.plus(self.im, other.im) }
    }

    pub fn sub(self, other: Self, session: &Session<'_>) -> Self {
        Self { re: session.minus(self.re, other.re), im: session.minus(self.im, other.im) }
    }

    /// `(a + bi)(c + di) = (ac - bd) + (ad + bc)i`.
    pub fn mul(self, other: Self, session: &Session<'_>) -> Self {
        let ac = session.times(self.re, other.re);
        let bd = session.times(self.im, other.im);
        let ad = session.times(self.re, other.im);
        let bc = session.times(self.im, other.re);
        Self { re: session.minus(ac, bd), im: session.plus(ad, bc) }
    }
}
