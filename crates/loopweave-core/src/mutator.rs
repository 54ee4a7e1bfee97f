//! Functional rewriting that preserves sharing.
//!
//! `Mutator::mutate_expr`/`mutate_stmt` recursively mutate children and, if
//! every child came back pointer-identical to the original, return the
//! input handle unchanged instead of rebuilding. Override a variant's hook
//! (calling the `default_mutate_*` free function for everything else) to
//! implement a pass; every pass in this crate is a `Mutator`.

use crate::error::CoreResult;
use crate::ir::expr::{ArithOp, CallKind, CmpOp, Expr, ExprBuilder, ExprKind};
use crate::ir::stmt::{ForKind, Stmt, StmtBuilder, StmtKind};
use crate::ir::{expr_same_as, stmt_same_as};

pub trait Mutator {
    fn mutate_expr(&mut self, e: &Expr) -> CoreResult<Expr> {
        default_mutate_expr(self, e)
    }

    fn mutate_stmt(&mut self, s: &Stmt) -> CoreResult<Stmt> {
        default_mutate_stmt(self, s)
    }
}

pub fn default_mutate_expr<M: Mutator + ?Sized>(m: &mut M, e: &Expr) -> CoreResult<Expr> {
    let rebuilt = match &e.kind {
        ExprKind::IntImm(_)
        | ExprKind::UIntImm(_)
        | ExprKind::FloatImm(_)
        | ExprKind::Variable(_) => return Ok(e.clone()),

        ExprKind::Cast(x) => {
            let mx = m.mutate_expr(x)?;
            if expr_same_as(x, &mx) {
                return Ok(e.clone());
            }
            ExprBuilder::cast(e.ty, mx)
        }

        ExprKind::Arith(op, a, b) => {
            let (ma, mb) = (m.mutate_expr(a)?, m.mutate_expr(b)?);
            if expr_same_as(a, &ma) && expr_same_as(b, &mb) {
                return Ok(e.clone());
            }
            ExprBuilder::arith(*op, ma, mb)?
        }

        ExprKind::Cmp(op, a, b) => {
            let (ma, mb) = (m.mutate_expr(a)?, m.mutate_expr(b)?);
            if expr_same_as(a, &ma) && expr_same_as(b, &mb) {
                return Ok(e.clone());
            }
            ExprBuilder::cmp(*op, ma, mb)?
        }

        ExprKind::And(a, b) => {
            let (ma, mb) = (m.mutate_expr(a)?, m.mutate_expr(b)?);
            if expr_same_as(a, &ma) && expr_same_as(b, &mb) {
                return Ok(e.clone());
            }
            ExprBuilder::and(ma, mb)?
        }

        ExprKind::Or(a, b) => {
            let (ma, mb) = (m.mutate_expr(a)?, m.mutate_expr(b)?);
            if expr_same_as(a, &ma) && expr_same_as(b, &mb) {
                return Ok(e.clone());
            }
            ExprBuilder::or(ma, mb)?
        }

        ExprKind::Not(a) => {
            let ma = m.mutate_expr(a)?;
            if expr_same_as(a, &ma) {
                return Ok(e.clone());
            }
            ExprBuilder::not(ma)?
        }

        ExprKind::Select(c, t, f) => {
            let (mc, mt, mf) = (m.mutate_expr(c)?, m.mutate_expr(t)?, m.mutate_expr(f)?);
            if expr_same_as(c, &mc) && expr_same_as(t, &mt) && expr_same_as(f, &mf) {
                return Ok(e.clone());
            }
            ExprBuilder::select(mc, mt, mf)?
        }

        ExprKind::Load(buf, index) => {
            let mi = m.mutate_expr(index)?;
            if expr_same_as(index, &mi) {
                return Ok(e.clone());
            }
            ExprBuilder::load(e.ty, buf.clone(), mi)?
        }

        ExprKind::Ramp(base, stride, lanes) => {
            let (mbase, mstride) = (m.mutate_expr(base)?, m.mutate_expr(stride)?);
            if expr_same_as(base, &mbase) && expr_same_as(stride, &mstride) {
                return Ok(e.clone());
            }
            ExprBuilder::ramp(mbase, mstride, *lanes)?
        }

        ExprKind::Broadcast(value, lanes) => {
            let mv = m.mutate_expr(value)?;
            if expr_same_as(value, &mv) {
                return Ok(e.clone());
            }
            ExprBuilder::broadcast(mv, *lanes)?
        }

        ExprKind::Call(name, args, kind) => {
            let mut changed = false;
            let mut margs = Vec::with_capacity(args.len());
            for a in args {
                let ma = m.mutate_expr(a)?;
                changed |= !expr_same_as(a, &ma);
                margs.push(ma);
            }
            if !changed {
                return Ok(e.clone());
            }
            ExprBuilder::call(e.ty, name.clone(), margs, *kind)
        }

        ExprKind::Let(name, value, body) => {
            let (mv, mb) = (m.mutate_expr(value)?, m.mutate_expr(body)?);
            if expr_same_as(value, &mv) && expr_same_as(body, &mb) {
                return Ok(e.clone());
            }
            ExprBuilder::let_(name.clone(), mv, mb)
        }
    };
    Ok(rebuilt)
}

pub fn default_mutate_stmt<M: Mutator + ?Sized>(m: &mut M, s: &Stmt) -> CoreResult<Stmt> {
    let rebuilt = match &s.kind {
        StmtKind::LetStmt(name, value, body) => {
            let (mv, mb) = (m.mutate_expr(value)?, m.mutate_stmt(body)?);
            if expr_same_as(value, &mv) && stmt_same_as(body, &mb) {
                return Ok(s.clone());
            }
            StmtBuilder::let_stmt(name.clone(), mv, mb)
        }

        StmtKind::AssertStmt(cond, message) => {
            let mc = m.mutate_expr(cond)?;
            if expr_same_as(cond, &mc) {
                return Ok(s.clone());
            }
            StmtBuilder::assert_stmt(mc, message.clone())?
        }

        StmtKind::PrintStmt(prefix, args) => {
            let mut changed = false;
            let mut margs = Vec::with_capacity(args.len());
            for a in args {
                let ma = m.mutate_expr(a)?;
                changed |= !expr_same_as(a, &ma);
                margs.push(ma);
            }
            if !changed {
                return Ok(s.clone());
            }
            StmtBuilder::print_stmt(prefix.clone(), margs)
        }

        StmtKind::Pipeline(buf, produce, update, consume) => {
            let mp = m.mutate_stmt(produce)?;
            let mu = match update {
                Some(u) => Some(m.mutate_stmt(u)?),
                None => None,
            };
            let mcons = m.mutate_stmt(consume)?;
            let update_unchanged = match (update, &mu) {
                (Some(u), Some(mu2)) => stmt_same_as(u, mu2),
                (None, None) => true,
                _ => false,
            };
            if stmt_same_as(produce, &mp) && update_unchanged && stmt_same_as(consume, &mcons) {
                return Ok(s.clone());
            }
            StmtBuilder::pipeline(buf.clone(), mp, mu, mcons)
        }

        StmtKind::For(name, min, extent, kind, body) => {
            let (mmin, mextent, mbody) =
                (m.mutate_expr(min)?, m.mutate_expr(extent)?, m.mutate_stmt(body)?);
            if expr_same_as(min, &mmin)
                && expr_same_as(extent, &mextent)
                && stmt_same_as(body, &mbody)
            {
                return Ok(s.clone());
            }
            StmtBuilder::for_(name.clone(), mmin, mextent, *kind, mbody)?
        }

        StmtKind::Store(buf, value, index) => {
            let (mv, mi) = (m.mutate_expr(value)?, m.mutate_expr(index)?);
            if expr_same_as(value, &mv) && expr_same_as(index, &mi) {
                return Ok(s.clone());
            }
            StmtBuilder::store(buf.clone(), mv, mi)?
        }

        StmtKind::Provide(buf, value, args) => {
            let mv = m.mutate_expr(value)?;
            let mut changed = !expr_same_as(value, &mv);
            let mut margs = Vec::with_capacity(args.len());
            for a in args {
                let ma = m.mutate_expr(a)?;
                changed |= !expr_same_as(a, &ma);
                margs.push(ma);
            }
            if !changed {
                return Ok(s.clone());
            }
            StmtBuilder::provide(buf.clone(), mv, margs)?
        }

        StmtKind::Allocate(buf, ty, size, body) => {
            let (msize, mbody) = (m.mutate_expr(size)?, m.mutate_stmt(body)?);
            if expr_same_as(size, &msize) && stmt_same_as(body, &mbody) {
                return Ok(s.clone());
            }
            StmtBuilder::allocate(buf.clone(), *ty, msize, mbody)?
        }

        StmtKind::Realize(buf, ty, bounds, body) => {
            let mut changed = false;
            let mut mbounds: Vec<(Expr, Expr)> = Vec::with_capacity(bounds.len());
            for (min, extent) in bounds {
                let mmin = m.mutate_expr(min)?;
                let mextent = m.mutate_expr(extent)?;
                changed |= !expr_same_as(min, &mmin) || !expr_same_as(extent, &mextent);
                mbounds.push((mmin, mextent));
            }
            let mbody = m.mutate_stmt(body)?;
            changed |= !stmt_same_as(body, &mbody);
            if !changed {
                return Ok(s.clone());
            }
            StmtBuilder::realize(buf.clone(), *ty, mbounds, mbody)?
        }

        StmtKind::Block(first, rest) => {
            let mfirst = m.mutate_stmt(first)?;
            let mrest = match rest {
                Some(r) => Some(m.mutate_stmt(r)?),
                None => None,
            };
            let rest_unchanged = match (rest, &mrest) {
                (Some(r), Some(mr)) => stmt_same_as(r, mr),
                (None, None) => true,
                _ => false,
            };
            if stmt_same_as(first, &mfirst) && rest_unchanged {
                return Ok(s.clone());
            }
            StmtBuilder::block(mfirst, mrest)
        }
    };
    Ok(rebuilt)
}
