//! Backends turn generated source text into something callable.
//!
//! The specializer itself stops at text. A [`Backend`] is the collaborator
//! that compiles that text; [`Interpreter`] is the bundled implementation,
//! which parses the straight-line Rust emitted by
//! [`RustTarget`](crate::codegen::RustTarget) and executes it directly.

pub mod interp;

use crate::core::SpecializeResult;

pub use interp::{Interpreter, Program};

/// A compiled transform over an interleaved `[re, im, ...]` array.
pub trait Transform {
    /// Number of `f64` values the transform consumes and produces.
    fn input_len(&self) -> usize;

    fn call(&self, data: &[f64]) -> SpecializeResult<Vec<f64>>;
}

/// Compiles generated source text.
pub trait Backend {
    fn name(&self) -> &'static str;

    fn compile(&self, source: &str) -> SpecializeResult<Box<dyn Transform>>;
}
