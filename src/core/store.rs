//! Node table with structural interning.
//!
//! Nodes live in a growable vector addressed by [`NodeId`]. Pure nodes are
//! looked up by their structural key first so that equal sub-expressions
//! share one id. Writes always get a fresh slot.

use hashbrown::HashMap;

use super::node::{Node, NodeId, NodeKey, NodeKind};

/// Outcome of a [`NodeStore::make_node`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interned {
    /// A new node was allocated.
    Created(NodeId),
    /// An existing node with the same structure was returned.
    Reused(NodeId),
}

impl Interned {
    pub fn id(self) -> NodeId {
        match self {
            Interned::Created(id) | Interned::Reused(id) => id,
        }
    }
}

#[derive(Debug)]
pub struct NodeStore {
    nodes: Vec<Node>,
    interned: HashMap<NodeKey, NodeId>,
    interning: bool,
}

impl NodeStore {
    pub fn new(interning: bool) -> Self {
        Self { nodes: Vec::with_capacity(256), interned: HashMap::new(), interning }
    }

    /// Whether structurally equal pure nodes are shared.
    pub fn interning(&self) -> bool {
        self.interning
    }

    /// Return the node for `kind`, reusing an equal pure node when interning is on.
    ///
    /// `seq` is recorded on the node as-is; callers pass the effect log
    /// sequence number for writes and `None` otherwise.
    pub fn make_node(&mut self, kind: NodeKind, seq: Option<u32>) -> Interned {
        let key = if self.interning && kind.is_pure() { NodeKey::of(&kind) } else { None };
        if let Some(key) = key {
            if let Some(&id) = self.interned.get(&key) {
                return Interned::Reused(id);
            }
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { id, kind, seq });
        if let Some(key) = key {
            self.interned.insert(key, id);
        }
        Interned::Created(id)
    }

    /// Look up a node. Panics on an id from another session.
    pub fn get(&self, id: NodeId) -> &Node {
        self.nodes
            .get(id.index())
            .unwrap_or_else(|| panic!("node {} does not belong to this store ({} nodes)", id, self.nodes.len()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::ArrayId;

    #[test]
    fn test_pure_nodes_are_shared() {
        let mut store = NodeStore::new(true);
        let a = store.make_node(NodeKind::Const(2.0), None).id();
        let b = store.make_node(NodeKind::Const(3.0), None).id();

        let first = store.make_node(NodeKind::Plus(a, b), None);
        let second = store.make_node(NodeKind::Plus(a, b), None);
        assert!(matches!(first, Interned::Created(_)));
        assert_eq!(second, Interned::Reused(first.id()));

        // Operand order is part of the structure.
        let swapped = store.make_node(NodeKind::Plus(b, a), None);
        assert_ne!(swapped.id(), first.id());
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_writes_always_allocate() {
        let mut store = NodeStore::new(true);
        let v = store.make_node(NodeKind::Const(1.0), None).id();
        let write = NodeKind::ArrayWrite { array: ArrayId(0), index: 0, value: v };

        let w0 = store.make_node(write, Some(0)).id();
        let w1 = store.make_node(write, Some(1)).id();
        assert_ne!(w0, w1);
        assert_eq!(store.get(w1).seq, Some(1));
        assert_eq!(store.make_node(NodeKind::Const(1.0), None), Interned::Reused(v));
    }

    #[test]
    fn test_disabled_interning() {
        let mut store = NodeStore::new(false);
        let a = store.make_node(NodeKind::Const(1.0), None).id();
        let b = store.make_node(NodeKind::Const(1.0), None).id();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert!(!store.interning());
    }

    #[test]
    #[should_panic(expected = "does not belong")]
    fn test_unknown_id_panics() {
        let store = NodeStore::new(true);
        store.get(NodeId(3));
    }
}
