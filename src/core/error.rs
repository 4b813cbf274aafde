// This module defines the error type for fftgen using the thiserror crate. Graph construction
// itself cannot fail once the transform size is accepted, so the variants cover the edges of the
// pipeline: a rejected or unaddressable size, a schedule that touches an array the generated function cannot
// bind, source text the interpreting backend cannot parse, and calls into a compiled transform
// with the wrong input length. SpecializeResult<T> is the matching Result alias.

//! Error types for the FFT specializer.

use std::fmt;

use thiserror::Error;

/// Main error type for specialization, code generation and backends.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpecializeError {
    #[error("transform size {size} is not a power of two")]
    NotPowerOfTwo { size: usize },

    #[error("transform size {size} is too large to address")]
    TooLarge { size: usize },

    #[error("array `{name}` is not bound by the generated function")]
    UnboundArray { name: String },

    #[error("parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("transform expects {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("backend failed: {reason}")]
    Backend { reason: String },

    #[error("failed to format generated text")]
    Format(#[from] fmt::Error),
}

/// Result type alias for specializer operations.
pub type SpecializeResult<T> = Result<T, SpecializeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SpecializeError::NotPowerOfTwo { size: 6 };
        assert_eq!(err.to_string(), "transform size 6 is not a power of two");

        let err = SpecializeError::Parse { line: 3, reason: "unexpected token".into() };
        assert_eq!(err.to_string(), "parse error on line 3: unexpected token");

        let err: SpecializeError = fmt::Error.into();
        assert_eq!(err, SpecializeError::Format(fmt::Error));
    }
}
