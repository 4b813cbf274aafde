// This module provides the specialization session, the single owner of everything built while
// one transform is being specialized. Session holds the node store (with its intern table), the
// effect log of array writes, the registered symbolic arrays, the ordered rewrite rules used by
// the smart constructors, and running statistics. It borrows a bumpalo arena that outlives it:
// array names are interned into the arena and schedules are allocated there, so they can be
// handed out as plain slices. All mutation goes through RefCell so that the construction API
// takes &self; a session is used from one thread and is dropped once code generation is done.

//! Arena-based specialization session.
//!
//! Every node, write and array handle created while specializing one
//! transform belongs to a [`Session`]. Other components only hold
//! [`NodeId`]s and [`ArrayId`]s into it.

use bumpalo::Bump;
use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;

use super::effects::EffectLog;
use super::node::{ArrayId, Node, NodeId, NodeKind};
use super::store::{Interned, NodeStore};
use crate::simplify::RuleSet;

/// Construction switches for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Share structurally equal pure nodes.
    pub interning: bool,
    /// Run the algebraic rewrite rules in the smart constructors.
    pub simplify: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { interning: true, simplify: true }
    }
}

impl SessionOptions {
    /// Options for the unoptimized diagnostic build.
    pub fn unoptimized() -> Self {
        Self { interning: false, simplify: false }
    }

    pub fn with_interning(mut self, interning: bool) -> Self {
        self.interning = interning;
        self
    }

    pub fn with_simplify(mut self, simplify: bool) -> Self {
        self.simplify = simplify;
        self
    }
}

/// A symbolic array registered on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayInfo<'arena> {
    pub name: &'arena str,
    pub len: usize,
}

/// Specialization session.
pub struct Session<'arena> {
    /// Arena for names and schedules.
    arena: &'arena Bump,

    options: SessionOptions,

    /// Node table and intern map.
    store: RefCell<NodeStore>,

    /// Ordered array writes.
    effects: RefCell<EffectLog>,

    /// Registered arrays, indexed by `ArrayId`.
    arrays: RefCell<Vec<ArrayInfo<'arena>>>,

    /// Rewrite rules consulted by the smart constructors.
    rules: RuleSet,

    /// String interning for array names.
    interned_strings: RefCell<HashMap<String, &'arena str>>,

    stats: RefCell<SessionStats>,
}

impl<'arena> Session<'arena> {
    /// Create a session with default options (interning and simplification on).
    pub fn new(arena: &'arena Bump) -> Self {
        Self::with_options(arena, SessionOptions::default())
    }

    pub fn with_options(arena: &'arena Bump, options: SessionOptions) -> Self {
        let rules = if options.simplify { RuleSet::standard() } else { RuleSet::empty() };
        Self::with_rules(arena, options, rules)
    }

    /// Create a session with an explicit rule list.
    pub fn with_rules(arena: &'arena Bump, options: SessionOptions, rules: RuleSet) -> Self {
        log::debug!(
            "new session: interning={}, rules=[{}]",
            options.interning,
            rules.names().collect::<Vec<_>>().join(", ")
        );
        Self {
            arena,
            options,
            store: RefCell::new(NodeStore::new(options.interning)),
            effects: RefCell::new(EffectLog::new()),
            arrays: RefCell::new(Vec::new()),
            rules,
            interned_strings: RefCell::new(HashMap::new()),
            stats: RefCell::new(SessionStats::default()),
        }
    }

    /// Get access to the arena allocator.
    pub fn arena(&self) -> &'arena Bump {
        self.arena
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Intern a string in the arena.
    pub fn intern_str(&self, s: &str) -> &'arena str {
        let mut strings = self.interned_strings.borrow_mut();
        if let Some(&interned) = strings.get(s) {
            return interned;
        }

        let interned = self.arena.alloc_str(s);
        strings.insert(s.to_string(), interned);
        interned
    }

    /// Create or reuse the node for `kind` without consulting the rewrite rules.
    ///
    /// Writes always allocate and are appended to the effect log with the
    /// next sequence number of their array.
    pub fn make_node(&self, kind: NodeKind) -> NodeId {
        let result = if let NodeKind::ArrayWrite { array, .. } = kind {
            let mut effects = self.effects.borrow_mut();
            let seq = effects.next_seq(array);
            let id = self.store.borrow_mut().make_node(kind, Some(seq)).id();
            effects.record(array, seq, id);
            self.stats.borrow_mut().writes_logged += 1;
            log::trace!("{} = write #{} to array {}", id, seq, array.0);
            Interned::Created(id)
        } else {
            self.store.borrow_mut().make_node(kind, None)
        };

        let mut stats = self.stats.borrow_mut();
        match result {
            Interned::Created(id) => {
                stats.nodes_created += 1;
                log::trace!("{} = {:?}", id, kind);
            }
            Interned::Reused(_) => stats.intern_hits += 1,
        }
        result.id()
    }

    /// Copy of the node record for `id`.
    pub fn node(&self, id: NodeId) -> Node {
        *self.store.borrow().get(id)
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    /// Literal value if `id` is a constant.
    pub fn const_value(&self, id: NodeId) -> Option<f64> {
        self.kind(id).as_const()
    }

    pub fn node_count(&self) -> usize {
        self.store.borrow().len()
    }

    /// Borrow the node table. Must not be held across node construction.
    pub fn store(&self) -> Ref<'_, NodeStore> {
        self.store.borrow()
    }

    /// Borrow the effect log. Must not be held across node construction.
    pub fn effects(&self) -> Ref<'_, EffectLog> {
        self.effects.borrow()
    }

    /// Number of writes issued so far to `array`.
    pub fn epoch(&self, array: ArrayId) -> u32 {
        self.effects.borrow().epoch(array)
    }

    /// Register a symbolic array of `len` cells.
    pub fn declare_array(&self, name: &str, len: usize) -> ArrayId {
        let name = self.intern_str(name);
        let mut arrays = self.arrays.borrow_mut();
        let id = ArrayId(arrays.len() as u32);
        arrays.push(ArrayInfo { name, len });
        log::debug!("declared array `{}` with {} cells", name, len);
        id
    }

    /// Metadata of a registered array. Panics on a foreign id.
    pub fn array(&self, id: ArrayId) -> ArrayInfo<'arena> {
        self.arrays
            .borrow()
            .get(id.0 as usize)
            .copied()
            .unwrap_or_else(|| panic!("array {} is not registered on this session", id.0))
    }

    /// Record that `rule` rewrote a node.
    pub fn record_rewrite(&self, rule: &'static str) {
        let mut stats = self.stats.borrow_mut();
        stats.rewrites_applied += 1;
        *stats.rule_counts.entry(rule).or_insert(0) += 1;
    }

    /// Record the length of a computed schedule.
    pub fn record_scheduled(&self, count: usize) {
        self.stats.borrow_mut().nodes_scheduled = count;
    }

    /// Get specialization statistics.
    pub fn stats(&self) -> SessionStats {
        self.stats.borrow().clone()
    }
}

/// Specialization session statistics.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionStats {
    /// Nodes allocated in the store.
    pub nodes_created: usize,

    /// Constructions answered by an existing node.
    pub intern_hits: usize,

    /// Constructions answered by a rewrite rule.
    pub rewrites_applied: usize,

    /// Rewrites per rule name.
    pub rule_counts: HashMap<&'static str, usize>,

    /// Array writes appended to the effect log.
    pub writes_logged: usize,

    /// Length of the last schedule.
    pub nodes_scheduled: usize,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Specialization Session Statistics:")?;
        writeln!(f, "  Nodes created: {}", self.nodes_created)?;
        writeln!(f, "  Intern hits: {}", self.intern_hits)?;
        writeln!(f, "  Rewrites applied: {}", self.rewrites_applied)?;
        writeln!(f, "  Writes logged: {}", self.writes_logged)?;
        writeln!(f, "  Nodes scheduled: {}", self.nodes_scheduled)?;

        if !self.rule_counts.is_empty() {
            writeln!(f, "  Rewrite breakdown:")?;
            let mut sorted: Vec<_> = self.rule_counts.iter().collect();
            sorted.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

            for (rule, count) in sorted {
                writeln!(f, "    {}: {}", rule, count)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_utils::test::with_test_context;
    use crate::core::Effect;

    #[test]
    fn test_session_creation() {
        let arena = Bump::new();
        let session = Session::new(&arena);

        let stats = session.stats();
        assert_eq!(stats.nodes_created, 0);
        assert_eq!(stats.intern_hits, 0);
        assert_eq!(session.node_count(), 0);
        assert_eq!(session.options(), SessionOptions::default());
    }

    #[test]
    fn test_make_node_interns_pure_nodes() {
        with_test_context(|ctx| {
            let session = ctx.create_session();
            let a = session.make_node(NodeKind::Const(1.0));
            let b = session.make_node(NodeKind::Const(1.0));
            assert_eq!(a, b);

            let stats = session.stats();
            assert_eq!(stats.nodes_created, 1);
            assert_eq!(stats.intern_hits, 1);
        });
    }

    #[test]
    fn test_writes_are_logged_in_order() {
        with_test_context(|ctx| {
            let session = ctx.create_session();
            let array = session.declare_array("data", 2);
            let v = session.make_node(NodeKind::Const(3.0));

            let w0 = session.make_node(NodeKind::ArrayWrite { array, index: 0, value: v });
            let w1 = session.make_node(NodeKind::ArrayWrite { array, index: 0, value: v });

            assert_ne!(w0, w1);
            assert_eq!(session.node(w0).seq, Some(0));
            assert_eq!(session.node(w1).seq, Some(1));
            assert_eq!(session.epoch(array), 2);
            assert_eq!(session.effects().entries()[1], Effect { array, seq: 1, node: w1 });
            assert_eq!(session.stats().writes_logged, 2);
        });
    }

    #[test]
    fn test_array_names_are_interned() {
        let arena = Bump::new();
        let session = Session::new(&arena);

        let a = session.declare_array("data", 8);
        let b = session.declare_array("data", 4);
        assert_ne!(a, b);
        assert_eq!(session.array(a).name.as_ptr(), session.array(b).name.as_ptr());
        assert_eq!(session.array(b).len, 4);
    }

    #[test]
    fn test_unoptimized_session_has_no_rules() {
        let arena = Bump::new();
        let session = Session::with_options(&arena, SessionOptions::unoptimized());
        assert!(session.rules().is_empty());
        assert!(!session.store().interning());
    }

    #[test]
    fn test_statistics_display() {
        let arena = Bump::new();
        let session = Session::new(&arena);

        session.make_node(NodeKind::Const(2.0));
        session.record_rewrite("constant-fold");
        session.record_rewrite("constant-fold");
        session.record_rewrite("identity");
        session.record_scheduled(7);

        let output = format!("{}", session.stats());
        assert!(output.contains("Nodes created: 1"));
        assert!(output.contains("Rewrites applied: 3"));
        assert!(output.contains("Nodes scheduled: 7"));
        assert!(output.contains("constant-fold: 2"));
    }
}
