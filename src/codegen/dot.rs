//! Graphviz export of a schedule.
//!
//! Vertices are scheduled nodes labelled with their statement; solid edges
//! are data operands, dashed edges are effect ordering between writes and
//! the reads that observe them.

use std::fmt::Write as _;

use super::{literal, EmitContext, Target};
use crate::core::{Node, NodeKind, SpecializeResult};

#[derive(Debug, Default)]
pub struct DotTarget {
    out: String,
}

impl DotTarget {
    pub fn new() -> Self {
        Self::default()
    }

    fn label(ctx: &EmitContext<'_, '_>, node: &Node) -> String {
        let name = ctx.name(node.id);
        match node.kind {
            NodeKind::Const(c) => literal(c),
            NodeKind::Plus(..) => format!("{} = +", name),
            NodeKind::Minus(..) => format!("{} = -", name),
            NodeKind::Times(..) => format!("{} = *", name),
            NodeKind::Div(..) => format!("{} = /", name),
            NodeKind::Sin(_) => format!("{} = sin", name),
            NodeKind::Cos(_) => format!("{} = cos", name),
            NodeKind::ArrayRead { index, epoch, .. } => {
                format!("{} = {}[{}] @{}", name, ctx.array_name, index, epoch)
            }
            NodeKind::ArrayWrite { index, .. } => {
                format!("{}[{}] := #{}", ctx.array_name, index, node.seq.unwrap_or(0))
            }
            NodeKind::Result(_) => format!("{} = result", name),
        }
    }
}

impl Target for DotTarget {
    fn prologue(&mut self, _ctx: &EmitContext<'_, '_>) -> SpecializeResult<()> {
        self.out.push_str("digraph fft {\n");
        self.out.push_str("  node [shape=box, fontname=monospace];\n");
        Ok(())
    }

    fn emit(&mut self, ctx: &EmitContext<'_, '_>, node: &Node) -> SpecializeResult<()> {
        let id = node.id.0;
        let shape = match node.kind {
            NodeKind::Const(_) => ", shape=plaintext",
            NodeKind::ArrayWrite { .. } => ", style=bold",
            _ => "",
        };
        writeln!(self.out, "  n{} [label=\"{}\"{}];", id, Self::label(ctx, node), shape)?;

        for operand in node.kind.operands() {
            writeln!(self.out, "  n{} -> n{};", operand.0, id)?;
        }
        if let Some(pred) = ctx.effects.predecessor(&node.kind, node.seq) {
            writeln!(self.out, "  n{} -> n{} [style=dashed];", pred.0, id)?;
        }
        // A read of epoch `e` must run before write `e` overwrites its cell.
        if let NodeKind::ArrayRead { array, epoch, .. } = node.kind {
            if let Some(overwrite) = ctx.effects.write(array, epoch) {
                writeln!(self.out, "  n{} -> n{} [style=dashed];", id, overwrite.0)?;
            }
        }
        Ok(())
    }

    fn epilogue(&mut self, _ctx: &EmitContext<'_, '_>) -> SpecializeResult<()> {
        self.out.push_str("}\n");
        Ok(())
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{Binding, CodeGenerator};
    use crate::core::test_utils::test::with_test_context;
    use crate::schedule::Scheduler;

    #[test]
    fn test_graph_edges() {
        with_test_context(|ctx| {
            let s = ctx.create_session();
            let data = s.declare_array("data", 2);
            let x = s.read(data, 0);
            let y = s.read(data, 1);
            let sum = s.plus(x, y);
            let w0 = s.write(data, 0, sum);
            let w1 = s.write(data, 1, s.lift(0.0));
            let z = s.read(data, 1);
            let w2 = s.write(data, 1, z);

            let schedule = Scheduler::new(&s).schedule(&[]);
            let dot = CodeGenerator::new(&s, data)
                .generate(DotTarget::new(), schedule, &Binding::InPlace)
                .unwrap();

            assert!(dot.starts_with("digraph fft {"));
            assert!(dot.contains(&format!("n{} -> n{};", x.0, sum.0)));
            assert!(dot.contains(&format!("n{} -> n{};", sum.0, w0.0)));
            assert!(dot.contains(&format!("n{} -> n{} [style=dashed];", w0.0, w1.0)));
            assert!(dot.contains("data[1] := #1"));

            // Reads point at the write that later overwrites their cell.
            assert!(dot.contains(&format!("n{} -> n{} [style=dashed];", x.0, w0.0)));
            assert!(dot.contains(&format!("n{} -> n{} [style=dashed];", w1.0, z.0)));
            assert!(dot.contains(&format!("n{} -> n{} [style=dashed];", z.0, w2.0)));
            assert!(dot.trim_end().ends_with('}'));
        });
    }
}
