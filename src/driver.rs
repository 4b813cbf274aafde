//! End-to-end specialization: size in, generated source out.

use std::fmt;

use bumpalo::Bump;

use crate::backend::{Backend, Transform};
use crate::codegen::{Binding, CodeGenerator, DotTarget, RustTarget};
use crate::core::{Session, SessionOptions, SessionStats, SpecializeError, SpecializeResult};
use crate::fft::{self, Complex};
use crate::schedule::Scheduler;
use crate::staged::StagedArray;

/// Name of the array parameter of the generated function.
pub const ARRAY_NAME: &str = "data";

/// Where the transformed values go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingMode {
    /// Written back over the input array.
    #[default]
    InPlace,
    /// Returned in a fresh buffer, one `Result` node per component.
    Results,
}

/// Knobs for one specialization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecializeOptions {
    pub interning: bool,
    pub simplify: bool,
    pub dce: bool,
    pub binding: BindingMode,
}

impl Default for SpecializeOptions {
    fn default() -> Self {
        Self { interning: true, simplify: true, dce: true, binding: BindingMode::InPlace }
    }
}

impl SpecializeOptions {
    /// Interning, simplification and dead-code elimination all off.
    pub fn unoptimized() -> Self {
        Self { interning: false, simplify: false, dce: false, binding: BindingMode::InPlace }
    }

    pub fn with_interning(mut self, interning: bool) -> Self {
        self.interning = interning;
        self
    }

    pub fn with_simplify(mut self, simplify: bool) -> Self {
        self.simplify = simplify;
        self
    }

    pub fn with_dce(mut self, dce: bool) -> Self {
        self.dce = dce;
        self
    }

    pub fn with_binding(mut self, binding: BindingMode) -> Self {
        self.binding = binding;
        self
    }

    fn session_options(&self) -> SessionOptions {
        SessionOptions::default().with_interning(self.interning).with_simplify(self.simplify)
    }
}

/// Output of one specialization run. Owns everything it reports; the
/// session that produced it is gone.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Number of complex points.
    pub size: usize,
    /// Rust source of `transform(data: &[f64]) -> Vec<f64>`.
    pub source: String,
    /// Graphviz rendering of the same schedule.
    pub graph: String,
    /// Number of scheduled nodes, constants included.
    pub schedule_len: usize,
    pub stats: SessionStats,
}

impl Artifact {
    /// Length of the interleaved array the transform operates on.
    pub fn array_len(&self) -> usize {
        2 * self.size
    }

    pub fn compile(&self, backend: &dyn Backend) -> SpecializeResult<Box<dyn Transform>> {
        log::debug!("compiling size {} transform with the {} backend", self.size, backend.name());
        backend.compile(&self.source)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Specialize a size-`size` forward FFT with default options.
pub fn specialize_transform(size: usize) -> SpecializeResult<Artifact> {
    specialize_transform_with(size, &SpecializeOptions::default())
}

pub fn specialize_transform_with(size: usize, options: &SpecializeOptions) -> SpecializeResult<Artifact> {
    if !size.is_power_of_two() {
        return Err(SpecializeError::NotPowerOfTwo { size });
    }
    let array_len = size.checked_mul(2).ok_or(SpecializeError::TooLarge { size })?;

    let arena = Bump::new();
    let session = Session::with_options(&arena, options.session_options());
    let data = StagedArray::declare(&session, ARRAY_NAME, array_len);

    let inputs: Vec<Complex> = (0..size)
        .map(|i| Complex::new(data.read(&session, 2 * i), data.read(&session, 2 * i + 1)))
        .collect();
    let outputs = fft::specialize(&session, &inputs)?;

    let (roots, binding) = match options.binding {
        BindingMode::InPlace => {
            for (k, z) in outputs.iter().enumerate() {
                data.write(&session, 2 * k, z.re);
                data.write(&session, 2 * k + 1, z.im);
            }
            (Vec::new(), Binding::InPlace)
        }
        BindingMode::Results => {
            let slots: Vec<_> = outputs
                .iter()
                .flat_map(|z| [z.re, z.im])
                .map(|value| session.result(value))
                .collect();
            (slots.clone(), Binding::Results(slots))
        }
    };

    let schedule = Scheduler::new(&session).with_dce(options.dce).schedule(&roots);
    let generator = CodeGenerator::new(&session, data.id);
    let source = generator.generate(RustTarget::new(), schedule, &binding)?;
    let graph = generator.generate(DotTarget::new(), schedule, &binding)?;

    log::debug!(
        "specialized size {}: {} nodes built, {} scheduled",
        size,
        session.node_count(),
        schedule.len()
    );

    Ok(Artifact { size, source, graph, schedule_len: schedule.len(), stats: session.stats() })
}
