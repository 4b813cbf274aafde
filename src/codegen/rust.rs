//! Rust source target.
//!
//! Emits one `transform` function over the interleaved array:
//!
//! ```text
//! #[allow(unused_parens, unused_mut)]
//! pub fn transform(data: &[f64]) -> Vec<f64> {
//!     assert_eq!(data.len(), 4);
//!     let mut data = data.to_vec();
//!     let x0 = data[0];
//!     let x1 = data[2];
//!     let x4 = x0 + x1;
//!     data[0] = x4;
//!     data
//! }
//! ```

use std::fmt::Write as _;

use super::{Binding, EmitContext, Target};
use crate::core::{Node, NodeId, NodeKind, SpecializeResult};

const INDENT: &str = "    ";

/// Name of the buffer returned under [`Binding::Results`].
pub const RESULTS_BUFFER: &str = "out";

#[derive(Debug, Default)]
pub struct RustTarget {
    out: String,
    statements: usize,
}

impl RustTarget {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&mut self, text: std::fmt::Arguments<'_>) -> SpecializeResult<()> {
        self.out.push_str(INDENT);
        self.out.write_fmt(text)?;
        self.out.push('\n');
        Ok(())
    }
}

impl Target for RustTarget {
    fn prologue(&mut self, ctx: &EmitContext<'_, '_>) -> SpecializeResult<()> {
        let name = ctx.array_name;
        let len = ctx.array_len;
        writeln!(
            self.out,
            "// Generated by fftgen: {} scheduled nodes over `{}` ({} values, interleaved re/im).",
            ctx.schedule.len(),
            name,
            len
        )?;
        self.out.push_str("#[allow(unused_parens, unused_mut)]\n");
        writeln!(self.out, "pub fn transform({}: &[f64]) -> Vec<f64> {{", name)?;
        self.line(format_args!("assert_eq!({}.len(), {});", name, len))?;
        self.line(format_args!("let mut {0} = {0}.to_vec();", name))?;
        if let Binding::Results(slots) = ctx.binding {
            self.line(format_args!("let mut {} = vec![0.0_f64; {}];", RESULTS_BUFFER, slots.len()))?;
        }
        Ok(())
    }

    fn emit(&mut self, ctx: &EmitContext<'_, '_>, node: &Node) -> SpecializeResult<()> {
        let name = ctx.name(node.id);
        let binary = |op: &str, a: NodeId, b: NodeId| format!("{} {} {}", ctx.operand(a), op, ctx.operand(b));

        let expr = match node.kind {
            NodeKind::Const(_) => return Ok(()),
            NodeKind::Plus(a, b) => binary("+", a, b),
            NodeKind::Minus(a, b) => binary("-", a, b),
            NodeKind::Times(a, b) => binary("*", a, b),
            NodeKind::Div(a, b) => binary("/", a, b),
            NodeKind::Sin(a) => format!("f64::sin({})", ctx.operand(a)),
            NodeKind::Cos(a) => format!("f64::cos({})", ctx.operand(a)),
            NodeKind::ArrayRead { index, .. } => format!("{}[{}]", ctx.array_name, index),
            NodeKind::Result(value) => ctx.operand(value),
            NodeKind::ArrayWrite { index, value, .. } => {
                self.line(format_args!("{}[{}] = {};", ctx.array_name, index, ctx.operand(value)))?;
                self.statements += 1;
                return Ok(());
            }
        };

        self.line(format_args!("let {} = {};", name, expr))?;
        self.statements += 1;
        Ok(())
    }

    fn epilogue(&mut self, ctx: &EmitContext<'_, '_>) -> SpecializeResult<()> {
        match ctx.binding {
            Binding::InPlace => self.line(format_args!("{}", ctx.array_name))?,
            Binding::Results(slots) => {
                for (slot, &id) in slots.iter().enumerate() {
                    self.line(format_args!("{}[{}] = {};", RESULTS_BUFFER, slot, ctx.operand(id)))?;
                }
                self.line(format_args!("{}", RESULTS_BUFFER))?;
            }
        }
        self.out.push_str("}\n");
        log::trace!("rust target: {} statements", self.statements);
        Ok(())
    }

    fn finish(self) -> String {
        self.out
    }
}
