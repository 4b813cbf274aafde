// This module is the hub for the specializer's shared infrastructure: the node vocabulary of the
// expression graph, the node store with structural interning, the effect log that orders array
// writes, the session that owns all of them for one specialization run, and the error type.
// Every later stage (simplifier, staged arrays, FFT, scheduler, code generator) works against
// these types through NodeId handles and never owns a node itself.

//! Core specializer infrastructure
//!
//! # Key Components
//!
//! ## Nodes (`node`)
//! - `NodeId`/`ArrayId` handles and the `NodeKind` operator enum
//!
//! ## Node Store (`store`)
//! - Dense node table with a `hashbrown` intern map
//!
//! ## Effect Log (`effects`)
//! - Per-array sequence numbers for writes
//!
//! ## Session Management (`session`)
//! - Owns store, log and rule list; borrows a `bumpalo` arena
//! - Specialization statistics

pub mod node;
pub mod store;
pub mod effects;
pub mod session;
pub mod error;
pub mod test_utils;

pub use node::{ArrayId, Node, NodeId, NodeKind};

pub use store::{Interned, NodeStore};

pub use effects::{Effect, EffectLog};

pub use session::{
    ArrayInfo,
    Session,
    SessionOptions,
    SessionStats,
};

pub use error::{
    SpecializeError,
    SpecializeResult,
};
