//! Radix-2 Cooley-Tukey transform over symbolic complex values.
//!
//! The recursion runs at specialization time: the length, every index and
//! every twiddle angle are known, so cosine and sine of the angles fold to
//! constants and the result is a pure data-flow graph with no residual
//! control flow.

pub mod complex;

use std::f64::consts::PI;

use crate::core::{Session, SpecializeError, SpecializeResult};

pub use complex::Complex;

/// Forward DFT of `xs`, `X[k] = sum_n x[n] * exp(-2*pi*i*k*n/N)`.
///
/// `xs.len()` must be a power of two; other lengths are rejected instead of
/// dropping elements during the even/odd split.
pub fn specialize(session: &Session<'_>, xs: &[Complex]) -> SpecializeResult<Vec<Complex>> {
    if !xs.len().is_power_of_two() {
        return Err(SpecializeError::NotPowerOfTwo { size: xs.len() });
    }
    Ok(butterfly(session, xs))
}

fn butterfly(session: &Session<'_>, xs: &[Complex]) -> Vec<Complex> {
    let n = xs.len();
    if n == 1 {
        return xs.to_vec();
    }

    let even: Vec<Complex> = xs.iter().step_by(2).copied().collect();
    let odd: Vec<Complex> = xs.iter().skip(1).step_by(2).copied().collect();
    let e = butterfly(session, &even);
    let o = butterfly(session, &odd);

    let half = n / 2;
    let mut out = vec![xs[0]; n];
    for k in 0..half {
        let twiddle = Complex::polar_unit(session, -2.0 * PI * k as f64 / n as f64);
        let z = twiddle.mul(o[k], session);
        out[k] = e[k].add(z, session);
        out[k + half] = e[k].sub(z, session);
    }
    log::trace!("butterfly stage n={} done, {} nodes", n, session.node_count());
    out
}
