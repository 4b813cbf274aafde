//! Effect log for array writes.
//!
//! Every write gets the next sequence number of its array. The scheduler
//! turns consecutive sequence numbers into ordering edges, so writes reach
//! the generated code in the order the specializer issued them.

use hashbrown::HashMap;

use super::node::{ArrayId, NodeId};

/// One logged write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    pub array: ArrayId,
    pub seq: u32,
    pub node: NodeId,
}

#[derive(Debug, Default)]
pub struct EffectLog {
    entries: Vec<Effect>,
    counters: HashMap<ArrayId, u32>,
}

impl EffectLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes logged for `array` so far. Reads staged now see this epoch.
    pub fn epoch(&self, array: ArrayId) -> u32 {
        self.counters.get(&array).copied().unwrap_or(0)
    }

    /// Reserve the next sequence number for a write to `array`.
    pub fn next_seq(&mut self, array: ArrayId) -> u32 {
        let counter = self.counters.entry(array).or_insert(0);
        let seq = *counter;
        *counter += 1;
        seq
    }

    /// Append a write that was assigned `seq` by [`EffectLog::next_seq`].
    pub fn record(&mut self, array: ArrayId, seq: u32, node: NodeId) {
        debug_assert_eq!(seq + 1, self.epoch(array), "write recorded out of sequence");
        self.entries.push(Effect { array, seq, node });
    }

    /// All writes in the order they were issued.
    pub fn entries(&self) -> &[Effect] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_per_array() {
        let mut log = EffectLog::new();
        let a = ArrayId(0);
        let b = ArrayId(1);

        let s0 = log.next_seq(a);
        log.record(a, s0, NodeId(10));
        let t0 = log.next_seq(b);
        log.record(b, t0, NodeId(11));
        let s1 = log.next_seq(a);
        log.record(a, s1, NodeId(12));

        assert_eq!((s0, s1, t0), (0, 1, 0));
        assert_eq!(log.epoch(a), 2);
        assert_eq!(log.epoch(b), 1);
        assert_eq!(log.entries()[2], Effect { array: a, seq: 1, node: NodeId(12) });
        assert_eq!(log.len(), 3);
    }
}
