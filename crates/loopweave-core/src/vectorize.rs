//! Vectorize and unroll: replaces a `Vectorized`/`Unrolled` `For` with its
//! lane-widened or fully-replicated equivalent. Runs after storage
//! flattening, so the only width-sensitive statement left to worry about is
//! `Store` (`Provide`/`Realize` no longer exist in the tree by this point).

use crate::error::{CoreError, CoreResult};
use crate::ir::expr::{ArithOp, Expr, ExprBuilder, ExprKind};
use crate::ir::stmt::{ForKind, Stmt, StmtBuilder, StmtKind};
use crate::mutator::{default_mutate_expr, default_mutate_stmt, Mutator};
use crate::symbol::Symbol;

fn malformed(reason: impl Into<String>) -> CoreError {
    CoreError::MalformedIr {
        reason: reason.into(),
    }
}

fn const_extent(e: &Expr) -> CoreResult<u32> {
    match &e.kind {
        ExprKind::IntImm(n) if *n >= 0 => Ok(*n as u32),
        ExprKind::UIntImm(n) => Ok(*n as u32),
        _ => Err(malformed("loop extent is not a non-negative compile-time constant")),
    }
}

fn const_of(ty: crate::types::Type, v: i64) -> CoreResult<Expr> {
    match ty.kind {
        crate::types::TypeKind::Int => ExprBuilder::int_imm(ty, v),
        _ => ExprBuilder::uint_imm(ty, v as u64),
    }
}

fn widen(e: Expr, lanes: u32) -> CoreResult<Expr> {
    if e.ty.lanes == lanes {
        Ok(e)
    } else if e.ty.is_scalar() {
        ExprBuilder::broadcast(e, lanes)
    } else {
        Err(malformed(format!(
            "cannot reconcile lane widths {} and {}",
            e.ty.lanes, lanes
        )))
    }
}

/// Top-level pass: expands every `Vectorized`/`Unrolled` `For` found
/// anywhere in `stmt`.
pub fn vectorize_and_unroll(stmt: &Stmt) -> CoreResult<Stmt> {
    let mut expander = LoopExpander;
    expander.mutate_stmt(stmt)
}

struct LoopExpander;

impl Mutator for LoopExpander {
    fn mutate_stmt(&mut self, s: &Stmt) -> CoreResult<Stmt> {
        if let StmtKind::For(name, min, extent, kind, body) = &s.kind {
            match kind {
                ForKind::Vectorized => {
                    let n = const_extent(extent)?;
                    let mbody = self.mutate_stmt(body)?;
                    let one = const_of(min.ty, 1)?;
                    let ramp = ExprBuilder::ramp(min.clone(), one, n)?;
                    let mut v = Vectorizer {
                        loop_var: name.clone(),
                        ramp,
                    };
                    let widened = v.mutate_stmt(&mbody)?;
                    return Ok(StmtBuilder::let_stmt(name.clone(), min.clone(), widened));
                }
                ForKind::Unrolled => {
                    let n = const_extent(extent)?;
                    let mbody = self.mutate_stmt(body)?;
                    let mut copies = Vec::with_capacity(n.max(1) as usize);
                    for i in 0..n {
                        let offset = const_of(min.ty, i as i64)?;
                        let iter_val = ExprBuilder::arith(ArithOp::Add, min.clone(), offset)?;
                        copies.push(StmtBuilder::let_stmt(name.clone(), iter_val, mbody.clone()));
                    }
                    return match StmtBuilder::block_seq(copies) {
                        Some(block) => Ok(block),
                        None => Err(malformed("Unrolled loop has zero extent")),
                    };
                }
                ForKind::Serial | ForKind::Parallel => {}
            }
        }
        default_mutate_stmt(self, s)
    }
}

/// Replaces `loop_var` with `ramp` inside one vectorized loop's body,
/// broadcasting any scalar operand an `n`-lane value combines with.
struct Vectorizer {
    loop_var: Symbol,
    ramp: Expr,
}

impl Mutator for Vectorizer {
    fn mutate_expr(&mut self, e: &Expr) -> CoreResult<Expr> {
        match &e.kind {
            ExprKind::Variable(name) if *name == self.loop_var => Ok(self.ramp.clone()),

            ExprKind::Arith(op, a, b) => {
                let (ma, mb) = (self.mutate_expr(a)?, self.mutate_expr(b)?);
                let lanes = ma.ty.lanes.max(mb.ty.lanes);
                ExprBuilder::arith(*op, widen(ma, lanes)?, widen(mb, lanes)?)
            }

            ExprKind::Cmp(op, a, b) => {
                let (ma, mb) = (self.mutate_expr(a)?, self.mutate_expr(b)?);
                let lanes = ma.ty.lanes.max(mb.ty.lanes);
                ExprBuilder::cmp(*op, widen(ma, lanes)?, widen(mb, lanes)?)
            }

            ExprKind::And(a, b) => {
                let (ma, mb) = (self.mutate_expr(a)?, self.mutate_expr(b)?);
                let lanes = ma.ty.lanes.max(mb.ty.lanes);
                ExprBuilder::and(widen(ma, lanes)?, widen(mb, lanes)?)
            }

            ExprKind::Or(a, b) => {
                let (ma, mb) = (self.mutate_expr(a)?, self.mutate_expr(b)?);
                let lanes = ma.ty.lanes.max(mb.ty.lanes);
                ExprBuilder::or(widen(ma, lanes)?, widen(mb, lanes)?)
            }

            ExprKind::Select(c, t, f) => {
                let (mc, mt, mf) = (self.mutate_expr(c)?, self.mutate_expr(t)?, self.mutate_expr(f)?);
                let lanes = mc.ty.lanes.max(mt.ty.lanes).max(mf.ty.lanes);
                ExprBuilder::select(widen(mc, lanes)?, widen(mt, lanes)?, widen(mf, lanes)?)
            }

            ExprKind::Load(buf, index) => {
                let mi = self.mutate_expr(index)?;
                let ty = e.ty.with_lanes(mi.ty.lanes);
                ExprBuilder::load(ty, buf.clone(), mi)
            }

            ExprKind::Call(name, args, kind) => {
                let mut margs = Vec::with_capacity(args.len());
                for a in args {
                    margs.push(self.mutate_expr(a)?);
                }
                let lanes = margs.iter().map(|a| a.ty.lanes).max().unwrap_or(1);
                let margs = margs
                    .into_iter()
                    .map(|a| widen(a, lanes))
                    .collect::<CoreResult<Vec<_>>>()?;
                Ok(ExprBuilder::call(e.ty.with_lanes(lanes), name.clone(), margs, *kind))
            }

            ExprKind::Let(name, value, body) => {
                let mv = self.mutate_expr(value)?;
                let mbody = self.mutate_expr(body)?;
                Ok(ExprBuilder::let_(name.clone(), mv, mbody))
            }

            _ => default_mutate_expr(self, e),
        }
    }

    fn mutate_stmt(&mut self, s: &Stmt) -> CoreResult<Stmt> {
        if let StmtKind::Store(buf, value, index) = &s.kind {
            let (mv, mi) = (self.mutate_expr(value)?, self.mutate_expr(index)?);
            let lanes = mv.ty.lanes.max(mi.ty.lanes);
            return StmtBuilder::store(buf.clone(), widen(mv, lanes)?, widen(mi, lanes)?);
        }
        default_mutate_stmt(self, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    fn int(n: i64) -> Expr {
        ExprBuilder::int_imm(Type::int(32), n).unwrap()
    }

    #[test]
    fn vectorized_loop_widens_store_to_ramp() {
        let x = ExprBuilder::variable(Type::int(32), "x");
        let load = ExprBuilder::load(Type::int(32), "in", x.clone()).unwrap();
        let store = StmtBuilder::store("out", load, x).unwrap();
        let f = StmtBuilder::for_("x", int(0), int(4), ForKind::Vectorized, store).unwrap();
        let out = vectorize_and_unroll(&f).unwrap();
        match &out.kind {
            StmtKind::LetStmt(name, min, body) => {
                assert_eq!(name.as_str(), "x");
                assert!(matches!(min.kind, ExprKind::IntImm(0)));
                match &body.kind {
                    StmtKind::Store(_, value, index) => {
                        assert_eq!(value.ty.lanes, 4);
                        assert_eq!(index.ty.lanes, 4);
                    }
                    other => panic!("expected Store, got {other:?}"),
                }
            }
            other => panic!("expected LetStmt, got {other:?}"),
        }
    }

    #[test]
    fn unrolled_loop_produces_n_copies() {
        let x = ExprBuilder::variable(Type::int(32), "x");
        let store = StmtBuilder::store("out", int(1), x).unwrap();
        let f = StmtBuilder::for_("x", int(0), int(3), ForKind::Unrolled, store).unwrap();
        let out = vectorize_and_unroll(&f).unwrap();
        let mut count = 0;
        let mut cur = &out;
        loop {
            match &cur.kind {
                StmtKind::Block(first, rest) => {
                    assert!(matches!(first.kind, StmtKind::LetStmt(..)));
                    count += 1;
                    match rest {
                        Some(r) => cur = r,
                        None => break,
                    }
                }
                StmtKind::LetStmt(..) => {
                    count += 1;
                    break;
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn serial_loop_is_left_untouched() {
        let store = StmtBuilder::store("out", int(1), int(0)).unwrap();
        let f = StmtBuilder::for_("x", int(0), int(10), ForKind::Serial, store).unwrap();
        let out = vectorize_and_unroll(&f).unwrap();
        assert!(matches!(out.kind, StmtKind::For(..)));
    }
}
