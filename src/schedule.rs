// This module implements the Scheduler, which turns the finished expression graph into the linear
// sequence of nodes the code generator emits. It performs two steps: 1) a reachability closure
// from the requested roots plus every logged array write, following data operands and effect
// edges, which drops every node no output depends on (dead-code elimination); and 2) a
// depth-first post-order over the kept nodes that places every node after its operands, every
// write after the previous write to the same array, every read after the write it observes, and
// every write after the reads that must still see the old cell value. With elimination disabled
// the schedule is simply every node in creation order, which already satisfies all of these
// constraints because nodes can only refer to nodes created before them.

//! Dependency-respecting linearization of the node graph.

use bumpalo::collections::Vec as BumpVec;
use hashbrown::HashMap;

use crate::core::{ArrayId, NodeId, NodeKind, Session};

/// Ordered node ids, allocated in the session arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule<'arena> {
    order: &'arena [NodeId],
}

impl<'arena> Schedule<'arena> {
    pub fn order(&self) -> &'arena [NodeId] {
        self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + 'arena {
        self.order.iter().copied()
    }

    /// Position of `id` in the schedule.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.order.iter().position(|&n| n == id)
    }
}

/// Writes of every array, indexed by sequence number.
pub struct EffectIndex {
    writes: HashMap<ArrayId, Vec<NodeId>>,
}

impl EffectIndex {
    pub fn new(session: &Session<'_>) -> Self {
        let mut writes: HashMap<ArrayId, Vec<NodeId>> = HashMap::new();
        for effect in session.effects().entries() {
            let slot = writes.entry(effect.array).or_default();
            debug_assert_eq!(slot.len(), effect.seq as usize);
            slot.push(effect.node);
        }
        Self { writes }
    }

    /// Write number `seq` of `array`.
    pub fn write(&self, array: ArrayId, seq: u32) -> Option<NodeId> {
        self.writes.get(&array).and_then(|w| w.get(seq as usize)).copied()
    }

    /// The write a node must follow because of its effects, if any.
    ///
    /// A write follows the previous write to its array; a read of epoch `e`
    /// follows write `e - 1`.
    pub fn predecessor(&self, kind: &NodeKind, seq: Option<u32>) -> Option<NodeId> {
        match *kind {
            NodeKind::ArrayWrite { array, .. } => {
                let seq = seq?;
                seq.checked_sub(1).and_then(|prev| self.write(array, prev))
            }
            NodeKind::ArrayRead { array, epoch, .. } => {
                epoch.checked_sub(1).and_then(|prev| self.write(array, prev))
            }
            _ => None,
        }
    }

    /// All writes in per-array sequence order, arrays in id order.
    pub fn all_writes(&self) -> Vec<NodeId> {
        let mut arrays: Vec<_> = self.writes.keys().copied().collect();
        arrays.sort();
        arrays.into_iter().flat_map(|a| self.writes[&a].iter().copied()).collect()
    }
}

/// Computes schedules over one session's graph.
pub struct Scheduler<'s, 'arena> {
    session: &'s Session<'arena>,
    dce: bool,
}

impl<'s, 'arena> Scheduler<'s, 'arena> {
    pub fn new(session: &'s Session<'arena>) -> Self {
        Self { session, dce: true }
    }

    /// Disable to schedule every node ever created, in creation order.
    pub fn with_dce(mut self, dce: bool) -> Self {
        self.dce = dce;
        self
    }

    /// Order the nodes needed by `roots` and by every array write.
    pub fn schedule(&self, roots: &[NodeId]) -> Schedule<'arena> {
        let order = if self.dce { self.reachable_order(roots) } else { self.creation_order() };
        log::debug!(
            "scheduled {} of {} nodes ({} roots, dce={})",
            order.len(),
            self.session.node_count(),
            roots.len(),
            self.dce
        );
        self.session.record_scheduled(order.len());
        Schedule { order: order.into_bump_slice() }
    }

    fn creation_order(&self) -> BumpVec<'arena, NodeId> {
        let store = self.session.store();
        let mut order = BumpVec::with_capacity_in(store.len(), self.session.arena());
        order.extend(store.nodes().iter().map(|n| n.id));
        order
    }

    fn reachable_order(&self, roots: &[NodeId]) -> BumpVec<'arena, NodeId> {
        let store = self.session.store();
        let index = EffectIndex::new(self.session);
        let writes = index.all_writes();

        let deps = |id: NodeId| {
            let node = store.get(id);
            node.kind.operands().chain(index.predecessor(&node.kind, node.seq))
        };

        // -------- reachability closure ---------
        let mut included = vec![false; store.len()];
        let mut stack: Vec<NodeId> = roots.iter().chain(writes.iter()).copied().collect();
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut included[id.index()], true) {
                continue;
            }
            stack.extend(deps(id));
        }

        // -------- anti-dependencies ---------
        // A read of epoch `e` must happen before write `e` of its array
        // overwrites the cell; later writes are chained behind write `e`.
        let mut readers: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for node in store.nodes() {
            if !included[node.id.index()] {
                continue;
            }
            if let NodeKind::ArrayRead { array, epoch, .. } = node.kind {
                if let Some(write) = index.write(array, epoch) {
                    readers.entry(write).or_default().push(node.id);
                }
            }
        }

        // -------- depth-first post-order ---------
        let kept = included.iter().filter(|&&i| i).count();
        let mut order = BumpVec::with_capacity_in(kept, self.session.arena());
        let mut visited = vec![false; store.len()];
        let mut stack: Vec<(NodeId, bool)> = Vec::new();
        for &start in roots.iter().chain(writes.iter()) {
            stack.push((start, false));
            while let Some((id, processed)) = stack.pop() {
                if processed {
                    order.push(id);
                    continue;
                }
                if std::mem::replace(&mut visited[id.index()], true) {
                    continue;
                }
                stack.push((id, true));

                let mut preds: Vec<NodeId> = deps(id).collect();
                if let Some(reads) = readers.get(&id) {
                    preds.extend(reads.iter().copied());
                }
                // Reversed so the first operand is emitted first.
                for pred in preds.into_iter().rev() {
                    if !visited[pred.index()] {
                        stack.push((pred, false));
                    }
                }
            }
        }
        order
    }
}
