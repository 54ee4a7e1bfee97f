//! Storage flattening: turns multidimensional buffer access into 1-D
//! `Allocate`/`Store`/`Load`, and `Realize` into an explicit
//! `min`/`extent`/`stride` `LetStmt` chain around an `Allocate`.
//!
//! `Provide`/`Call(Halide)` nodes are rewritten the same way whether or not
//! their buffer was wrapped in a `Realize` earlier in the tree: they simply
//! reference `buf.min.i`/`buf.stride.i` by name. For a function that *was*
//! realized, those names are bound by the `LetStmt` chain this pass emits.
//! For the output function (never wrapped in `Realize` — its buffer is
//! supplied by the caller), they are left as free variables for the backend
//! to bind, per the external buffer contract.

use crate::error::CoreResult;
use crate::ir::expr::{ArithOp, CallKind, Expr, ExprBuilder, ExprKind};
use crate::ir::stmt::{Stmt, StmtBuilder, StmtKind};
use crate::mutator::{default_mutate_expr, default_mutate_stmt, Mutator};
use crate::symbol::Symbol;
use crate::types::Type;

fn qualify_index(buf: &Symbol, field: &str, i: usize) -> Symbol {
    Symbol::new(format!("{buf}.{field}.{i}"))
}

fn flat_index(buf: &Symbol, args: &[Expr]) -> CoreResult<Expr> {
    let idx_ty = Type::int(32);
    let mut index: Option<Expr> = None;
    for (i, arg) in args.iter().enumerate() {
        let min_i = ExprBuilder::variable(idx_ty, qualify_index(buf, "min", i));
        let stride_i = ExprBuilder::variable(idx_ty, qualify_index(buf, "stride", i));
        let diff = ExprBuilder::arith(ArithOp::Sub, arg.clone(), min_i)?;
        let term = ExprBuilder::arith(ArithOp::Mul, diff, stride_i)?;
        index = Some(match index {
            Some(acc) => ExprBuilder::arith(ArithOp::Add, acc, term)?,
            None => term,
        });
    }
    match index {
        Some(e) => Ok(e),
        None => ExprBuilder::int_imm(idx_ty, 0),
    }
}

struct Flattener;

/// Runs storage flattening over `stmt`.
pub fn flatten(stmt: &Stmt) -> CoreResult<Stmt> {
    let mut f = Flattener;
    f.mutate_stmt(stmt)
}

impl Mutator for Flattener {
    fn mutate_expr(&mut self, e: &Expr) -> CoreResult<Expr> {
        if let ExprKind::Call(name, args, CallKind::Halide) = &e.kind {
            let mut margs = Vec::with_capacity(args.len());
            for a in args {
                margs.push(self.mutate_expr(a)?);
            }
            let index = flat_index(name, &margs)?;
            return ExprBuilder::load(e.ty, name.clone(), index);
        }
        default_mutate_expr(self, e)
    }

    fn mutate_stmt(&mut self, s: &Stmt) -> CoreResult<Stmt> {
        match &s.kind {
            StmtKind::Provide(buf, value, args) => {
                let mv = self.mutate_expr(value)?;
                let mut margs = Vec::with_capacity(args.len());
                for a in args {
                    margs.push(self.mutate_expr(a)?);
                }
                let index = flat_index(buf, &margs)?;
                StmtBuilder::store(buf.clone(), mv, index)
            }

            StmtKind::Realize(buf, ty, bounds, body) => {
                let idx_ty = Type::int(32);
                let mbody = self.mutate_stmt(body)?;
                let n = bounds.len();

                let mut size = ExprBuilder::int_imm(idx_ty, 1)?;
                for (_, extent) in bounds {
                    size = ExprBuilder::arith(ArithOp::Mul, size, extent.clone())?;
                }
                let mut wrapped = StmtBuilder::allocate(buf.clone(), *ty, size, mbody)?;

                for i in (1..n).rev() {
                    let stride_prev = ExprBuilder::variable(idx_ty, qualify_index(buf, "stride", i - 1));
                    let extent_prev = ExprBuilder::variable(idx_ty, qualify_index(buf, "extent", i - 1));
                    let value = ExprBuilder::arith(ArithOp::Mul, stride_prev, extent_prev)?;
                    wrapped = StmtBuilder::let_stmt(qualify_index(buf, "stride", i), value, wrapped);
                }
                if n > 0 {
                    wrapped = StmtBuilder::let_stmt(
                        qualify_index(buf, "stride", 0),
                        ExprBuilder::int_imm(idx_ty, 1)?,
                        wrapped,
                    );
                }
                for i in (0..n).rev() {
                    wrapped = StmtBuilder::let_stmt(qualify_index(buf, "extent", i), bounds[i].1.clone(), wrapped);
                }
                for i in (0..n).rev() {
                    wrapped = StmtBuilder::let_stmt(qualify_index(buf, "min", i), bounds[i].0.clone(), wrapped);
                }
                Ok(wrapped)
            }

            _ => default_mutate_stmt(self, s),
        }
    }
}
