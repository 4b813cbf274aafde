// This module defines the code generator that serializes a schedule into target text. The
// CodeGenerator validates that the schedule only touches the array bound to the generated
// function, then drives a Target through three hooks: a prologue (function header and binding
// setup), one emit call per scheduled node in schedule order, and an epilogue (copying results
// and returning). Constants are never bound to names; EmitContext::operand renders them inline
// as literals wherever they are used. Two targets exist: RustTarget produces the transform
// function as Rust source, DotTarget a Graphviz description of the same schedule.

//! Code generation from schedules.
//!
//! ```text
//! target.prologue(ctx);
//! for node in schedule {
//!     target.emit(ctx, node);
//! }
//! target.epilogue(ctx);
//! ```

pub mod rust;
pub mod dot;

use crate::core::{ArrayId, Node, NodeId, NodeKind, Session, SpecializeError, SpecializeResult};
use crate::schedule::{EffectIndex, Schedule};

pub use dot::DotTarget;
pub use rust::RustTarget;

/// How the transformed values reach the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Outputs were written back into the bound array; the function returns it.
    InPlace,
    /// Output slot `i` is the value of the `Result` node at position `i`.
    Results(Vec<NodeId>),
}

/// Hooks implemented by each output language.
pub trait Target {
    fn prologue(&mut self, ctx: &EmitContext<'_, '_>) -> SpecializeResult<()>;

    /// Emit one scheduled node. Constants are passed too and may be skipped.
    fn emit(&mut self, ctx: &EmitContext<'_, '_>, node: &Node) -> SpecializeResult<()>;

    fn epilogue(&mut self, ctx: &EmitContext<'_, '_>) -> SpecializeResult<()>;

    /// Consume the target and return the generated text.
    fn finish(self) -> String;
}

/// Read-only view handed to targets while emitting.
pub struct EmitContext<'s, 'arena> {
    pub session: &'s Session<'arena>,
    pub schedule: Schedule<'arena>,
    pub binding: &'s Binding,
    /// The array bound to the generated function's parameter.
    pub array: ArrayId,
    pub array_name: &'arena str,
    pub array_len: usize,
    pub effects: EffectIndex,
}

impl<'s, 'arena> EmitContext<'s, 'arena> {
    /// Name bound to a non-constant node.
    pub fn name(&self, id: NodeId) -> String {
        id.to_string()
    }

    /// Expression for `id` as an operand: a literal for constants, the bound name otherwise.
    pub fn operand(&self, id: NodeId) -> String {
        match self.session.kind(id) {
            NodeKind::Const(c) => literal(c),
            _ => self.name(id),
        }
    }
}

/// Rust literal for `value`; negative values are parenthesized so they can follow an operator.
pub fn literal(value: f64) -> String {
    if value.is_nan() {
        "f64::NAN".to_string()
    } else if value == f64::INFINITY {
        "f64::INFINITY".to_string()
    } else if value == f64::NEG_INFINITY {
        "f64::NEG_INFINITY".to_string()
    } else if value.is_sign_negative() {
        format!("({:?})", value)
    } else {
        format!("{:?}", value)
    }
}

/// Serializes schedules of one session for the array bound to the generated function.
pub struct CodeGenerator<'s, 'arena> {
    session: &'s Session<'arena>,
    array: ArrayId,
}

impl<'s, 'arena> CodeGenerator<'s, 'arena> {
    pub fn new(session: &'s Session<'arena>, array: ArrayId) -> Self {
        Self { session, array }
    }

    pub fn generate<T: Target>(&self, mut target: T, schedule: Schedule<'arena>, binding: &Binding) -> SpecializeResult<String> {
        self.check_bound(schedule)?;

        let info = self.session.array(self.array);
        let ctx = EmitContext {
            session: self.session,
            schedule,
            binding,
            array: self.array,
            array_name: info.name,
            array_len: info.len,
            effects: EffectIndex::new(self.session),
        };

        target.prologue(&ctx)?;
        for id in schedule.iter() {
            let node = self.session.node(id);
            target.emit(&ctx, &node)?;
        }
        target.epilogue(&ctx)?;

        let text = target.finish();
        log::debug!("generated {} lines for {} scheduled nodes", text.lines().count(), schedule.len());
        Ok(text)
    }

    fn check_bound(&self, schedule: Schedule<'arena>) -> SpecializeResult<()> {
        for id in schedule.iter() {
            let array = match self.session.kind(id) {
                NodeKind::ArrayRead { array, .. } | NodeKind::ArrayWrite { array, .. } => array,
                _ => continue,
            };
            if array != self.array {
                return Err(SpecializeError::UnboundArray { name: self.session.array(array).name.to_string() });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_utils::test::with_test_context;
    use crate::schedule::Scheduler;

    #[test]
    fn test_literals() {
        assert_eq!(literal(1.0), "1.0");
        assert_eq!(literal(0.25), "0.25");
        assert_eq!(literal(-1.0), "(-1.0)");
        assert_eq!(literal(-0.0), "(-0.0)");
        assert_eq!(literal(f64::NAN), "f64::NAN");
        assert_eq!(literal(f64::NEG_INFINITY), "f64::NEG_INFINITY");
        assert_eq!(literal(0.7071067811865476).parse::<f64>().unwrap(), 0.7071067811865476);
    }

    #[test]
    fn test_foreign_array_is_rejected() {
        with_test_context(|ctx| {
            let s = ctx.create_session();
            let data = s.declare_array("data", 2);
            let scratch = s.declare_array("scratch", 2);
            let x = s.read(data, 0);
            s.write(scratch, 0, x);

            let schedule = Scheduler::new(&s).schedule(&[]);
            let err = CodeGenerator::new(&s, data)
                .generate(RustTarget::new(), schedule, &Binding::InPlace)
                .unwrap_err();
            assert_eq!(err, SpecializeError::UnboundArray { name: "scratch".into() });
        });
    }
}
