//! Interpreting backend for generated Rust source.
//!
//! Accepts exactly the straight-line subset the Rust target emits:
//!
//! ```text
//! pub fn transform(data: &[f64]) -> Vec<f64> {
//!     assert_eq!(data.len(), 8);
//!     let mut data = data.to_vec();
//!     let mut out = vec![0.0_f64; 8];     ; results binding only
//!     let x3 = data[2];                   ; load
//!     let x7 = x3 - (-1.0);               ; binary operator
//!     let x9 = f64::cos(x7);              ; call
//!     let x11 = x9;                       ; copy
//!     data[0] = x11;                      ; store
//!     data                                ; returned buffer
//! }
//! ```
//!
//! Comment lines and attributes are skipped. Names must be bound before
//! they are used, so a parsed [`Program`] never reads an unset register.

use std::collections::HashMap;

use super::{Backend, Transform};
use crate::core::{SpecializeError, SpecializeResult};

/// Backend that parses and interprets generated source.
#[derive(Debug, Default, Clone, Copy)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    /// Parse `source` into an executable program.
    pub fn parse(&self, source: &str) -> SpecializeResult<Program> {
        Parser::new(source).parse()
    }
}

impl Backend for Interpreter {
    fn name(&self) -> &'static str {
        "interpreter"
    }

    fn compile(&self, source: &str) -> SpecializeResult<Box<dyn Transform>> {
        let program = self.parse(source)?;
        log::debug!(
            "interpreter: {} instructions, {} registers",
            program.instrs.len(),
            program.registers
        );
        Ok(Box::new(program))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Operand {
    Reg(usize),
    Imm(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Buffer {
    Data,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func {
    Sin,
    Cos,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Instr {
    Load { dst: usize, buffer: Buffer, index: usize },
    Binary { dst: usize, op: BinOp, lhs: Operand, rhs: Operand },
    Call { dst: usize, func: Func, arg: Operand },
    Copy { dst: usize, src: Operand },
    Store { buffer: Buffer, index: usize, src: Operand },
}

/// A parsed transform function.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    input_len: usize,
    out_len: Option<usize>,
    returns: Buffer,
    registers: usize,
    instrs: Vec<Instr>,
}

impl Program {
    /// Number of parsed statements.
    pub fn instruction_count(&self) -> usize {
        self.instrs.len()
    }

    fn buffer<'b>(&self, buffer: Buffer, data: &'b mut [f64], out: &'b mut [f64]) -> &'b mut [f64] {
        match buffer {
            Buffer::Data => data,
            Buffer::Out => out,
        }
    }
}

impl Transform for Program {
    fn input_len(&self) -> usize {
        self.input_len
    }

    fn call(&self, input: &[f64]) -> SpecializeResult<Vec<f64>> {
        if input.len() != self.input_len {
            return Err(SpecializeError::LengthMismatch { expected: self.input_len, actual: input.len() });
        }

        let mut data = input.to_vec();
        let mut out = vec![0.0; self.out_len.unwrap_or(0)];
        let mut regs = vec![0.0; self.registers];
        let value = |regs: &[f64], op: Operand| match op {
            Operand::Reg(r) => regs[r],
            Operand::Imm(v) => v,
        };
        let out_of_bounds = |index: usize, len: usize| SpecializeError::Backend {
            reason: format!("index {} out of bounds for buffer of length {}", index, len),
        };

        for instr in &self.instrs {
            match *instr {
                Instr::Load { dst, buffer, index } => {
                    let buf = self.buffer(buffer, &mut data, &mut out);
                    regs[dst] = *buf.get(index).ok_or_else(|| out_of_bounds(index, buf.len()))?;
                }
                Instr::Binary { dst, op, lhs, rhs } => {
                    let (a, b) = (value(&regs, lhs), value(&regs, rhs));
                    regs[dst] = match op {
                        BinOp::Add => a + b,
                        BinOp::Sub => a - b,
                        BinOp::Mul => a * b,
                        BinOp::Div => a / b,
                    };
                }
                Instr::Call { dst, func, arg } => {
                    let a = value(&regs, arg);
                    regs[dst] = match func {
                        Func::Sin => a.sin(),
                        Func::Cos => a.cos(),
                    };
                }
                Instr::Copy { dst, src } => regs[dst] = value(&regs, src),
                Instr::Store { buffer, index, src } => {
                    let v = value(&regs, src);
                    let buf = self.buffer(buffer, &mut data, &mut out);
                    let len = buf.len();
                    *buf.get_mut(index).ok_or_else(|| out_of_bounds(index, len))? = v;
                }
            }
        }

        Ok(match self.returns {
            Buffer::Data => data,
            Buffer::Out => out,
        })
    }
}

struct Parser<'a> {
    source: &'a str,
    line: usize,

    data_name: Option<&'a str>,
    out_name: Option<&'a str>,
    input_len: Option<usize>,
    out_len: Option<usize>,
    returns: Option<Buffer>,
    closed: bool,

    names: HashMap<&'a str, usize>,
    instrs: Vec<Instr>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            line: 0,
            data_name: None,
            out_name: None,
            input_len: None,
            out_len: None,
            returns: None,
            closed: false,
            names: HashMap::new(),
            instrs: Vec::new(),
        }
    }

    fn error(&self, reason: impl Into<String>) -> SpecializeError {
        SpecializeError::Parse { line: self.line, reason: reason.into() }
    }

    fn parse(mut self) -> SpecializeResult<Program> {
        for (idx, raw) in self.source.lines().enumerate() {
            self.line = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with("//") || line.starts_with("#[") {
                continue;
            }
            if self.closed {
                return Err(self.error("text after the end of the function"));
            }
            self.parse_line(line)?;
        }

        if !self.closed {
            return Err(self.error("missing closing brace"));
        }
        let input_len = self.input_len.ok_or_else(|| self.error("missing input length assertion"))?;
        let returns = self.returns.ok_or_else(|| self.error("function does not return a buffer"))?;

        Ok(Program {
            input_len,
            out_len: self.out_len,
            returns,
            registers: self.names.len(),
            instrs: self.instrs,
        })
    }

    fn parse_line(&mut self, line: &'a str) -> SpecializeResult<()> {
        if let Some(rest) = line.strip_prefix("pub fn ") {
            return self.parse_header(rest);
        }
        let data = self.data_name.ok_or_else(|| self.error("statement outside of a function"))?;

        if line == "}" {
            self.closed = true;
            return Ok(());
        }
        if let Some(rest) = line.strip_prefix("assert_eq!(") {
            let len = rest
                .strip_prefix(data)
                .and_then(|r| r.strip_prefix(".len(), "))
                .and_then(|r| r.strip_suffix(");"))
                .ok_or_else(|| self.error("malformed length assertion"))?;
            self.input_len = Some(len.parse().map_err(|_| self.error(format!("bad length `{}`", len)))?);
            return Ok(());
        }
        if let Some(rest) = line.strip_prefix("let mut ") {
            return self.parse_buffer(rest, data);
        }
        if let Some(rest) = line.strip_prefix("let ") {
            return self.parse_binding(rest);
        }
        if Some(line) == self.data_name {
            self.returns = Some(Buffer::Data);
            return Ok(());
        }
        if Some(line) == self.out_name {
            self.returns = Some(Buffer::Out);
            return Ok(());
        }
        if let Some((target, value)) = line.strip_suffix(';').and_then(|l| l.split_once(" = ")) {
            let (buffer, index) = self.parse_index(target)?;
            let src = self.parse_operand(value)?;
            self.instrs.push(Instr::Store { buffer, index, src });
            return Ok(());
        }
        Err(self.error(format!("unrecognized statement `{}`", line)))
    }

    fn parse_header(&mut self, rest: &'a str) -> SpecializeResult<()> {
        let param = rest
            .split_once('(')
            .and_then(|(_, r)| r.split_once(": &[f64]) -> Vec<f64> {"))
            .map(|(name, _)| name.trim())
            .ok_or_else(|| self.error("expected `fn name(param: &[f64]) -> Vec<f64> {`"))?;
        if self.data_name.is_some() {
            return Err(self.error("more than one function"));
        }
        self.data_name = Some(param);
        Ok(())
    }

    /// `let mut data = data.to_vec();` or `let mut out = vec![0.0_f64; N];`.
    fn parse_buffer(&mut self, rest: &'a str, data: &'a str) -> SpecializeResult<()> {
        let (name, init) = rest
            .strip_suffix(';')
            .and_then(|r| r.split_once(" = "))
            .ok_or_else(|| self.error("malformed buffer declaration"))?;

        if name == data && init == format!("{}.to_vec()", data) {
            return Ok(());
        }
        if let Some(len) = init.strip_prefix("vec![0.0_f64; ").and_then(|r| r.strip_suffix(']')) {
            let len = len.parse().map_err(|_| self.error(format!("bad length `{}`", len)))?;
            self.out_name = Some(name);
            self.out_len = Some(len);
            return Ok(());
        }
        Err(self.error(format!("unsupported buffer initializer `{}`", init)))
    }

    fn parse_binding(&mut self, rest: &'a str) -> SpecializeResult<()> {
        let (name, expr) = rest
            .strip_suffix(';')
            .and_then(|r| r.split_once(" = "))
            .ok_or_else(|| self.error("malformed binding"))?;
        if self.names.contains_key(name) {
            return Err(self.error(format!("`{}` is bound twice", name)));
        }

        let instr_for = |dst| -> SpecializeResult<Instr> {
            if let Some(arg) = expr.strip_prefix("f64::sin(").and_then(|r| r.strip_suffix(')')) {
                return Ok(Instr::Call { dst, func: Func::Sin, arg: self.parse_operand(arg)? });
            }
            if let Some(arg) = expr.strip_prefix("f64::cos(").and_then(|r| r.strip_suffix(')')) {
                return Ok(Instr::Call { dst, func: Func::Cos, arg: self.parse_operand(arg)? });
            }
            if expr.ends_with(']') {
                let (buffer, index) = self.parse_index(expr)?;
                return Ok(Instr::Load { dst, buffer, index });
            }

            let tokens: Vec<&str> = expr.split_whitespace().collect();
            match tokens.as_slice() {
                [lhs, op, rhs] => {
                    let op = match *op {
                        "+" => BinOp::Add,
                        "-" => BinOp::Sub,
                        "*" => BinOp::Mul,
                        "/" => BinOp::Div,
                        other => return Err(self.error(format!("unknown operator `{}`", other))),
                    };
                    Ok(Instr::Binary { dst, op, lhs: self.parse_operand(lhs)?, rhs: self.parse_operand(rhs)? })
                }
                [single] => Ok(Instr::Copy { dst, src: self.parse_operand(single)? }),
                _ => Err(self.error(format!("unsupported expression `{}`", expr))),
            }
        };

        let dst = self.names.len();
        let instr = instr_for(dst)?;
        self.names.insert(name, dst);
        self.instrs.push(instr);
        Ok(())
    }

    /// `name[index]` for one of the function's buffers.
    fn parse_index(&self, text: &str) -> SpecializeResult<(Buffer, usize)> {
        let (name, index) = text
            .strip_suffix(']')
            .and_then(|t| t.split_once('['))
            .ok_or_else(|| self.error(format!("expected `buffer[index]`, found `{}`", text)))?;

        let buffer = if Some(name) == self.data_name {
            Buffer::Data
        } else if Some(name) == self.out_name {
            Buffer::Out
        } else {
            return Err(self.error(format!("unknown buffer `{}`", name)));
        };
        let index = index.parse().map_err(|_| self.error(format!("bad index `{}`", index)))?;
        Ok((buffer, index))
    }

    fn parse_operand(&self, text: &str) -> SpecializeResult<Operand> {
        if let Some(&reg) = self.names.get(text) {
            return Ok(Operand::Reg(reg));
        }

        let literal = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')).unwrap_or(text);
        let value = match literal {
            "f64::NAN" => f64::NAN,
            "f64::INFINITY" => f64::INFINITY,
            "f64::NEG_INFINITY" => f64::NEG_INFINITY,
            other => match other.parse::<f64>() {
                Ok(v) if other.starts_with(|c: char| c.is_ascii_digit() || c == '-') => v,
                _ => return Err(self.error(format!("unbound name `{}`", text))),
            },
        };
        Ok(Operand::Imm(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SWAP: &str = "\
// swap the two complex values and negate the first real part
#[allow(unused_parens, unused_mut)]
pub fn transform(data: &[f64]) -> Vec<f64> {
    assert_eq!(data.len(), 4);
    let mut data = data.to_vec();
    let x0 = data[0];
    let x1 = data[1];
    let x2 = data[2];
    let x3 = data[3];
    let x4 = 0.0 - x2;
    data[0] = x4;
    data[1] = x3;
    data[2] = x0;
    data[3] = x1;
    data
}
";

    #[test]
    fn test_parse_and_run() {
        let program = Interpreter::new().parse(SWAP).unwrap();
        assert_eq!(program.input_len(), 4);
        assert_eq!(program.instruction_count(), 9);
        assert_eq!(program.call(&[1.0, 2.0, 3.0, 4.0]).unwrap(), vec![-3.0, 4.0, 1.0, 2.0]);
    }

    #[test]
    fn test_operators_and_calls() {
        let source = "\
pub fn transform(v: &[f64]) -> Vec<f64> {
    assert_eq!(v.len(), 2);
    let mut v = v.to_vec();
    let mut out = vec![0.0_f64; 3];
    let a = v[0];
    let b = v[1];
    let c = a / b;
    let d = a * (-2.0);
    let e = f64::cos(0.0);
    let f = f64::sin(b);
    out[0] = c;
    out[1] = d;
    out[2] = e;
    v[0] = f;
    out
}";
        let program = Interpreter::new().compile(source).unwrap();
        assert_eq!(program.call(&[3.0, 0.0]).unwrap(), vec![f64::INFINITY, -6.0, 1.0]);
    }

    #[test]
    fn test_reads_observe_earlier_stores() {
        let source = "\
pub fn transform(data: &[f64]) -> Vec<f64> {
    assert_eq!(data.len(), 1);
    let mut data = data.to_vec();
    data[0] = 5.0;
    let x1 = data[0];
    let x2 = x1 + x1;
    data[0] = x2;
    data
}";
        let program = Interpreter::new().parse(source).unwrap();
        assert_eq!(program.call(&[1.0]).unwrap(), vec![10.0]);
    }

    #[test]
    fn test_length_mismatch() {
        let program = Interpreter::new().parse(SWAP).unwrap();
        let err = program.call(&[1.0, 2.0]).unwrap_err();
        assert_eq!(err, SpecializeError::LengthMismatch { expected: 4, actual: 2 });
    }

    #[test]
    fn test_parse_errors_report_line() {
        let unbound = SWAP.replace("let x4 = 0.0 - x2;", "let x4 = 0.0 - x9;");
        match Interpreter::new().parse(&unbound) {
            Err(SpecializeError::Parse { line, reason }) => {
                assert_eq!(line, 10);
                assert!(reason.contains("x9"), "{}", reason);
            }
            other => panic!("expected parse error, got {:?}", other),
        }

        let truncated = SWAP.trim_end().trim_end_matches('}');
        assert!(matches!(
            Interpreter::new().parse(truncated),
            Err(SpecializeError::Parse { reason, .. }) if reason.contains("closing brace")
        ));

        let rebound = SWAP.replace("let x4 = 0.0 - x2;", "let x3 = 0.0 - x2;");
        assert!(Interpreter::new().parse(&rebound).is_err());
    }

    #[test]
    fn test_out_of_bounds_store_is_a_backend_error() {
        let source = "\
pub fn transform(data: &[f64]) -> Vec<f64> {
    assert_eq!(data.len(), 1);
    data[3] = 1.0;
    data
}";
        let program = Interpreter::new().parse(source).unwrap();
        assert!(matches!(program.call(&[0.0]), Err(SpecializeError::Backend { .. })));
    }
}
