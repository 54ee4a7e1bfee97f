//! Canonical pretty-printer for `Expr`/`Stmt`, used by the CLI's text output
//! mode and exercised directly by tests that assert on exact output text.
//!
//! Binary arithmetic is parenthesized and printed infix; `Add`/`Sub`/`Cmp`
//! space their operator, `Mul`/`Div`/`Mod` do not. `Min`/`Max` print as
//! function calls, matching how the rest of the non-infix IR (`Call`,
//! `select`, `ramp`) is printed.

use crate::ir::expr::{ArithOp, CallKind, CmpOp, ExprKind, ExprNode};
use crate::ir::stmt::{ForKind, StmtKind, StmtNode};
use std::fmt;

fn arith_symbol(op: ArithOp) -> Option<(&'static str, bool)> {
    // (symbol, spaced)
    match op {
        ArithOp::Add => Some(("+", true)),
        ArithOp::Sub => Some(("-", true)),
        ArithOp::Mul => Some(("*", false)),
        ArithOp::Div => Some(("/", false)),
        ArithOp::Mod => Some(("%", false)),
        ArithOp::Min | ArithOp::Max => None,
    }
}

fn cmp_symbol(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "==",
        CmpOp::Ne => "!=",
        CmpOp::Lt => "<",
        CmpOp::Le => "<=",
        CmpOp::Gt => ">",
        CmpOp::Ge => ">=",
    }
}

impl fmt::Display for ExprNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::IntImm(v) => write!(f, "{v}"),
            ExprKind::UIntImm(v) => write!(f, "{v}u"),
            ExprKind::FloatImm(v) => write!(f, "{v:?}"),
            ExprKind::Variable(name) => write!(f, "{name}"),
            ExprKind::Cast(value) => write!(f, "{}({value})", self.ty),
            ExprKind::Arith(op, a, b) => match arith_symbol(*op) {
                Some((sym, true)) => write!(f, "({a} {sym} {b})"),
                Some((sym, false)) => write!(f, "({a}{sym}{b})"),
                None => {
                    let name = if *op == ArithOp::Min { "min" } else { "max" };
                    write!(f, "{name}({a}, {b})")
                }
            },
            ExprKind::Cmp(op, a, b) => write!(f, "({a} {} {b})", cmp_symbol(*op)),
            ExprKind::And(a, b) => write!(f, "({a} && {b})"),
            ExprKind::Or(a, b) => write!(f, "({a} || {b})"),
            ExprKind::Not(a) => write!(f, "!{a}"),
            ExprKind::Select(c, t, e) => write!(f, "select({c}, {t}, {e})"),
            ExprKind::Load(buf, index) => write!(f, "{buf}[{index}]"),
            ExprKind::Ramp(base, stride, lanes) => write!(f, "ramp({base}, {stride}, {lanes})"),
            ExprKind::Broadcast(value, lanes) => write!(f, "x{lanes}({value})"),
            ExprKind::Call(name, args, kind) => {
                let tag = match kind {
                    CallKind::Halide => "",
                    CallKind::Image => "@",
                    CallKind::Extern => "extern ",
                };
                write!(f, "{tag}{name}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
            ExprKind::Let(name, value, body) => write!(f, "(let {name} = {value} in {body})"),
        }
    }
}

const INDENT: &str = "  ";

fn write_indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

fn fmt_stmt(s: &StmtNode, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    write_indent(f, depth)?;
    match &s.kind {
        StmtKind::LetStmt(name, value, body) => {
            writeln!(f, "let {name} = {value}")?;
            fmt_stmt(body, f, depth)
        }
        StmtKind::AssertStmt(cond, message) => writeln!(f, "assert({cond}, \"{message}\")"),
        StmtKind::PrintStmt(prefix, args) => {
            write!(f, "print(\"{prefix}\"")?;
            for a in args {
                write!(f, ", {a}")?;
            }
            writeln!(f, ")")
        }
        StmtKind::Pipeline(buf, produce, update, consume) => {
            writeln!(f, "produce {buf} {{")?;
            fmt_stmt(produce, f, depth + 1)?;
            write_indent(f, depth)?;
            if let Some(update) = update {
                writeln!(f, "}} update {buf} {{")?;
                fmt_stmt(update, f, depth + 1)?;
                write_indent(f, depth)?;
            }
            writeln!(f, "}} consume {buf} {{")?;
            fmt_stmt(consume, f, depth + 1)?;
            write_indent(f, depth)?;
            writeln!(f, "}}")
        }
        StmtKind::For(name, min, extent, kind, body) => {
            let kind_str = match kind {
                ForKind::Serial => "serial",
                ForKind::Parallel => "parallel",
                ForKind::Vectorized => "vectorized",
                ForKind::Unrolled => "unrolled",
            };
            writeln!(f, "for ({kind_str} {name}, {min}, {extent}) {{")?;
            fmt_stmt(body, f, depth + 1)?;
            write_indent(f, depth)?;
            writeln!(f, "}}")
        }
        StmtKind::Store(buf, value, index) => writeln!(f, "{buf}[{index}] = {value}"),
        StmtKind::Provide(buf, value, args) => {
            write!(f, "{buf}(")?;
            for (i, a) in args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{a}")?;
            }
            writeln!(f, ") = {value}")
        }
        StmtKind::Allocate(buf, ty, size, body) => {
            writeln!(f, "allocate {buf}[{ty} * {size}] {{")?;
            fmt_stmt(body, f, depth + 1)?;
            write_indent(f, depth)?;
            writeln!(f, "}}")
        }
        StmtKind::Realize(buf, ty, bounds, body) => {
            write!(f, "realize {buf}[{ty}](")?;
            for (i, (min, extent)) in bounds.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "[{min}, {extent}]")?;
            }
            writeln!(f, ") {{")?;
            fmt_stmt(body, f, depth + 1)?;
            write_indent(f, depth)?;
            writeln!(f, "}}")
        }
        StmtKind::Block(first, rest) => {
            fmt_stmt_noindent(first, f, depth)?;
            if let Some(r) = rest {
                fmt_stmt(r, f, depth)?;
            }
            Ok(())
        }
    }
}

fn fmt_stmt_noindent(s: &StmtNode, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    // Block's first statement is already at the right depth from the
    // enclosing call; avoid indenting twice.
    fmt_stmt(s, f, depth)
}

impl fmt::Display for StmtNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_stmt(self, f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::{ArithOp, ExprBuilder};
    use crate::ir::stmt::StmtBuilder;
    use crate::types::Type;

    #[test]
    fn scenario_a_canonical_printing() {
        let x = ExprBuilder::variable(Type::int(32), "x");
        let y = ExprBuilder::variable(Type::int(32), "y");
        let three = ExprBuilder::int_imm(Type::int(32), 3).unwrap();
        let two = ExprBuilder::int_imm(Type::int(32), 2).unwrap();
        let seventeen = ExprBuilder::int_imm(Type::int(32), 17).unwrap();

        let lhs = ExprBuilder::arith(ArithOp::Add, x, three).unwrap();
        let y_div_2 = ExprBuilder::arith(ArithOp::Div, y, two).unwrap();
        let rhs = ExprBuilder::arith(ArithOp::Add, y_div_2, seventeen).unwrap();
        let whole = ExprBuilder::arith(ArithOp::Mul, lhs, rhs).unwrap();

        assert_eq!(whole.to_string(), "((x + 3)*((y/2) + 17))");
    }

    #[test]
    fn store_prints_as_assignment() {
        let store = StmtBuilder::store(
            "buf",
            ExprBuilder::int_imm(Type::int(32), 1).unwrap(),
            ExprBuilder::int_imm(Type::int(32), 0).unwrap(),
        )
        .unwrap();
        assert_eq!(store.to_string(), "buf[0] = 1\n");
    }
}
