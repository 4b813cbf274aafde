//! fftgen - staged specialization of the radix-2 FFT.
//!
//! Given a transform size `N` (a power of two), the recursive Cooley-Tukey
//! algorithm is run once over symbolic values. Every index and twiddle angle
//! is known at that point, so the result is a branch-free arithmetic circuit
//! that is emitted as flat code over an interleaved `[re, im, ...]` array.
//!
//! # Primary Usage
//!
//! ```
//! use fftgen::backend::Interpreter;
//! use fftgen::driver::specialize_transform;
//!
//! let artifact = specialize_transform(4)?;
//! let transform = artifact.compile(&Interpreter::new())?;
//! let out = transform.call(&[1.0, 0.0, 2.0, 0.0, 3.0, 0.0, 0.0, 0.0])?;
//! assert_eq!(out, vec![6.0, 0.0, -2.0, -2.0, 2.0, 0.0, -2.0, 2.0]);
//! # Ok::<(), fftgen::SpecializeError>(())
//! ```
//!
//! # Architecture
//!
//! - [`core`] - Session, node store, interning, effect log, errors
//! - [`simplify`] - Smart constructors and the rewrite rules behind them
//! - [`staged`] - Constants and array reads/writes on a session
//! - [`fft`] - The Cooley-Tukey specializer over symbolic complex values
//! - [`schedule`] - Dependency-respecting order with dead-code elimination
//! - [`codegen`] - Rust source and Graphviz targets
//! - [`backend`] - Compiling generated source; the bundled interpreter
//! - [`driver`] - `specialize_transform` and its options

pub mod core;
pub mod simplify;
pub mod staged;
pub mod fft;
pub mod schedule;
pub mod codegen;
pub mod backend;
pub mod driver;

pub use crate::core::{NodeId, NodeKind, Session, SessionOptions, SessionStats, SpecializeError, SpecializeResult};
pub use driver::{specialize_transform, specialize_transform_with, Artifact, BindingMode, SpecializeOptions};
