//! Staged values and the array interface.
//!
//! Specialization-time literals are plain `f64`; values only known when the
//! generated code runs are [`NodeId`] handles. [`Session::lift`] is the one
//! conversion from the former to the latter. Arrays are only touched through
//! [`Session::read`] and [`Session::write`], so every access is a node in the
//! graph and every write is ordered by the effect log.

use crate::core::{ArrayId, NodeId, NodeKind, Session};

/// A symbolic array together with its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagedArray {
    pub id: ArrayId,
    pub len: usize,
}

impl StagedArray {
    /// Register a new array of `len` cells on `session`.
    pub fn declare(session: &Session<'_>, name: &str, len: usize) -> Self {
        Self { id: session.declare_array(name, len), len }
    }

    pub fn read(&self, session: &Session<'_>, index: usize) -> NodeId {
        session.read(self.id, index)
    }

    pub fn write(&self, session: &Session<'_>, index: usize, value: NodeId) -> NodeId {
        session.write(self.id, index, value)
    }
}

impl<'arena> Session<'arena> {
    /// Lift a specialization-time literal into the graph.
    pub fn lift(&self, value: f64) -> NodeId {
        self.make_node(NodeKind::Const(value))
    }

    /// Load `array[index]` as seen after all writes staged so far.
    pub fn read(&self, array: ArrayId, index: usize) -> NodeId {
        self.check_index(array, index);
        let epoch = self.epoch(array);
        self.make_node(NodeKind::ArrayRead { array, index, epoch })
    }

    /// Store `value` into `array[index]`, ordered after every earlier write to `array`.
    pub fn write(&self, array: ArrayId, index: usize, value: NodeId) -> NodeId {
        self.check_index(array, index);
        self.make_node(NodeKind::ArrayWrite { array, index, value })
    }

    /// Mark `value` as an output of the specialized function.
    pub fn result(&self, value: NodeId) -> NodeId {
        self.make_node(NodeKind::Result(value))
    }

    fn check_index(&self, array: ArrayId, index: usize) {
        let info = self.array(array);
        assert!(
            index < info.len,
            "index {} out of bounds for array `{}` of length {}",
            index,
            info.name,
            info.len
        );
    }
}
