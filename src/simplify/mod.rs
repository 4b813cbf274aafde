//! Algebraic simplifier.
//!
//! Arithmetic and trigonometric nodes are built through smart constructors
//! on [`Session`]. Each constructor offers the candidate node to an ordered
//! list of [`RewriteRule`]s; the first rule that answers wins, otherwise the
//! node is created plainly in the store. Rules may call the smart
//! constructors again, so a rewrite is itself simplified.
//!
//! The standard rule list is
//!
//! ```text
//! constant-fold -> identity -> absorb -> negation-fold
//! ```
//!
//! which yields, per operator and first match wins:
//!
//! | operator     | rewrites                                                          |
//! |--------------|-------------------------------------------------------------------|
//! | `Plus(a,b)`  | fold; `b = ±0 -> a`; `a = ±0 -> b`; `b = 0 - y -> a - y`          |
//! | `Minus(a,b)` | fold; `b = ±0 -> a`; `b = 0 - y -> a + y`                          |
//! | `Times(a,b)` | fold; one side `1` -> other; one side `±0` -> `0`; `-1` -> `0 - x` |
//! | `Div(a,b)`   | fold; `b = 1 -> a`                                                |
//! | `Cos(a)`     | fold, exactly `0` at odd multiples of π/2                         |
//! | `Sin(a)`     | fold                                                              |

pub mod rules;

use crate::core::{NodeId, NodeKind, Session};

pub use rules::{Absorb, ConstantFold, Identity, NegationFold};

/// A rewrite tried before a node is created.
///
/// Returning `Some(id)` replaces the candidate `kind` by `id`; returning
/// `None` passes the candidate on to the next rule.
pub trait RewriteRule {
    /// Name used in statistics and logs.
    fn name(&self) -> &'static str;

    fn rewrite(&self, session: &Session<'_>, kind: &NodeKind) -> Option<NodeId>;
}

/// Ordered list of rewrite rules.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn RewriteRule>>,
}

impl RuleSet {
    /// No rewrites: every constructor creates its node as written.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The full rule list used for optimized specialization.
    pub fn standard() -> Self {
        Self::empty()
            .with(ConstantFold)
            .with(Identity)
            .with(Absorb)
            .with(NegationFold)
    }

    /// Append a rule after the existing ones.
    pub fn with<R: RewriteRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule that rewrites `kind`, with its result.
    pub fn apply(&self, session: &Session<'_>, kind: &NodeKind) -> Option<(&'static str, NodeId)> {
        self.rules
            .iter()
            .find_map(|rule| rule.rewrite(session, kind).map(|id| (rule.name(), id)))
    }
}

impl<'arena> Session<'arena> {
    /// Build `kind` through the rewrite rules, falling back to plain node creation.
    pub fn build(&self, kind: NodeKind) -> NodeId {
        if let Some((rule, id)) = self.rules().apply(self, &kind) {
            self.record_rewrite(rule);
            log::trace!("{}: {:?} => {}", rule, kind, id);
            return id;
        }
        self.make_node(kind)
    }

    pub fn plus(&self, a: NodeId, b: NodeId) -> NodeId {
        self.build(NodeKind::Plus(a, b))
    }

    pub fn minus(&self, a: NodeId, b: NodeId) -> NodeId {
        self.build(NodeKind::Minus(a, b))
    }

    pub fn times(&self, a: NodeId, b: NodeId) -> NodeId {
        self.build(NodeKind::Times(a, b))
    }

    pub fn div(&self, a: NodeId, b: NodeId) -> NodeId {
        self.build(NodeKind::Div(a, b))
    }

    pub fn sin(&self, a: NodeId) -> NodeId {
        self.build(NodeKind::Sin(a))
    }

    pub fn cos(&self, a: NodeId) -> NodeId {
        self.build(NodeKind::Cos(a))
    }

    /// `0 - a`.
    pub fn negate(&self, a: NodeId) -> NodeId {
        let zero = self.lift(0.0);
        self.minus(zero, a)
    }
}
