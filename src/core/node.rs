// This module defines the expression graph vocabulary shared by every stage of the specializer.
// NodeId is a dense per-session index and the only way other components refer to a node;
// ArrayId names a symbolic array registered on the session. NodeKind is the tagged variant of
// all operators: constants, the four arithmetic operators, sine and cosine, array reads and
// writes, and result markers. NodeKey is the hashable structural key used by the intern table;
// it stores constants by bit pattern so that f64 values can take part in hashing.

//! Expression graph nodes.

use std::fmt;

/// Handle of a node inside one session. Dense, starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Index into the session's node table.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Handle of a symbolic array registered on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArrayId(pub u32);

/// Operator of a node. Operands are node ids, never values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Const(f64),
    Plus(NodeId, NodeId),
    Minus(NodeId, NodeId),
    Times(NodeId, NodeId),
    Div(NodeId, NodeId),
    Sin(NodeId),
    Cos(NodeId),
    /// Load of `array[index]` after `epoch` writes to that array.
    ArrayRead { array: ArrayId, index: usize, epoch: u32 },
    /// Store of `value` into `array[index]`.
    ArrayWrite { array: ArrayId, index: usize, value: NodeId },
    /// Marks a value as an output of the specialized function.
    Result(NodeId),
}

impl NodeKind {
    /// Data operands in evaluation order.
    pub fn operands(&self) -> impl Iterator<Item = NodeId> {
        let (a, b) = match *self {
            NodeKind::Const(_) | NodeKind::ArrayRead { .. } => (None, None),
            NodeKind::Plus(a, b)
            | NodeKind::Minus(a, b)
            | NodeKind::Times(a, b)
            | NodeKind::Div(a, b) => (Some(a), Some(b)),
            NodeKind::Sin(a) | NodeKind::Cos(a) | NodeKind::Result(a) => (Some(a), None),
            NodeKind::ArrayWrite { value, .. } => (Some(value), None),
        };
        a.into_iter().chain(b)
    }

    /// Whether the node may be shared between structurally equal uses.
    pub fn is_pure(&self) -> bool {
        !matches!(self, NodeKind::ArrayWrite { .. })
    }

    /// Literal value for constants.
    pub fn as_const(&self) -> Option<f64> {
        match *self {
            NodeKind::Const(c) => Some(c),
            _ => None,
        }
    }
}

/// A node record as stored in the session arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Sequence number in the effect log; only set for writes.
    pub seq: Option<u32>,
}

/// Structural identity of a pure node, used as the intern table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum NodeKey {
    Const(u64),
    Plus(NodeId, NodeId),
    Minus(NodeId, NodeId),
    Times(NodeId, NodeId),
    Div(NodeId, NodeId),
    Sin(NodeId),
    Cos(NodeId),
    Read(ArrayId, usize, u32),
    Result(NodeId),
}

impl NodeKey {
    /// Key for a pure kind, `None` for writes.
    pub(crate) fn of(kind: &NodeKind) -> Option<Self> {
        Some(match *kind {
            NodeKind::Const(c) => NodeKey::Const(c.to_bits()),
            NodeKind::Plus(a, b) => NodeKey::Plus(a, b),
            NodeKind::Minus(a, b) => NodeKey::Minus(a, b),
            NodeKind::Times(a, b) => NodeKey::Times(a, b),
            NodeKind::Div(a, b) => NodeKey::Div(a, b),
            NodeKind::Sin(a) => NodeKey::Sin(a),
            NodeKind::Cos(a) => NodeKey::Cos(a),
            NodeKind::ArrayRead { array, index, epoch } => NodeKey::Read(array, index, epoch),
            NodeKind::Result(a) => NodeKey::Result(a),
            NodeKind::ArrayWrite { .. } => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operands_order() {
        let kind = NodeKind::Minus(NodeId(4), NodeId(2));
        assert_eq!(kind.operands().collect::<Vec<_>>(), vec![NodeId(4), NodeId(2)]);

        let write = NodeKind::ArrayWrite { array: ArrayId(0), index: 3, value: NodeId(7) };
        assert_eq!(write.operands().collect::<Vec<_>>(), vec![NodeId(7)]);
        assert!(!write.is_pure());

        assert_eq!(NodeKind::Const(1.5).operands().count(), 0);
    }

    #[test]
    fn test_const_keys_distinguish_signed_zero() {
        let pos = NodeKey::of(&NodeKind::Const(0.0));
        let neg = NodeKey::of(&NodeKind::Const(-0.0));
        assert_ne!(pos, neg);
        assert_eq!(pos, NodeKey::of(&NodeKind::Const(0.0)));
    }

    #[test]
    fn test_writes_have_no_key() {
        let write = NodeKind::ArrayWrite { array: ArrayId(1), index: 0, value: NodeId(0) };
        assert!(NodeKey::of(&write).is_none());
    }
}
