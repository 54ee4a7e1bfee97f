//! Interval arithmetic over the IR, and per-function region analysis.
//!
//! An interval's endpoints may be `None`, representing ±∞. `bounds.rs`
//! never estimates past what it can prove: anything it cannot bound from
//! below/above is reported undefined on that side rather than guessed.

use crate::error::{CoreError, CoreResult};
use crate::ir::expr::{ArithOp, Expr, ExprBuilder, ExprKind};
use crate::ir::stmt::{Stmt, StmtKind};
use crate::scope::Scope;
use crate::simplify::simplify_expr;
use crate::symbol::Symbol;
use crate::visitor::Visitor;

/// A (min, max) pair over a known scope of variable intervals. `None` on
/// either side means that side is unbounded.
pub type Interval = (Option<Expr>, Option<Expr>);

fn not_applicable(reason: impl Into<String>) -> CoreError {
    CoreError::AnalysisNotApplicable {
        reason: reason.into(),
    }
}

fn combine(op: ArithOp, a: Option<Expr>, b: Option<Expr>) -> CoreResult<Option<Expr>> {
    match (a, b) {
        (Some(a), Some(b)) => Ok(Some(simplify_expr(&ExprBuilder::arith(op, a, b)?)?)),
        _ => Ok(None),
    }
}

fn min_of(a: Option<Expr>, b: Option<Expr>) -> CoreResult<Option<Expr>> {
    combine(ArithOp::Min, a, b)
}

fn max_of(a: Option<Expr>, b: Option<Expr>) -> CoreResult<Option<Expr>> {
    combine(ArithOp::Max, a, b)
}

/// `bounds_of_expr_in_scope`: computes a sound (possibly undefined)
/// interval for `expr` given an environment of known variable intervals.
pub fn bounds_of_expr_in_scope(expr: &Expr, scope: &Scope<Interval>) -> CoreResult<Interval> {
    match &expr.kind {
        ExprKind::IntImm(_) | ExprKind::UIntImm(_) | ExprKind::FloatImm(_) => {
            Ok((Some(expr.clone()), Some(expr.clone())))
        }

        ExprKind::Variable(name) => {
            if scope.contains(name) {
                Ok(scope.get(name)?.clone())
            } else {
                Ok((Some(expr.clone()), Some(expr.clone())))
            }
        }

        ExprKind::Cast(value) => {
            let (min, max) = bounds_of_expr_in_scope(value, scope)?;
            let cast_side = |e: Option<Expr>| -> CoreResult<Option<Expr>> {
                match e {
                    Some(e) => Ok(Some(simplify_expr(&ExprBuilder::cast(expr.ty, e))?)),
                    None => Ok(None),
                }
            };
            Ok((cast_side(min)?, cast_side(max)?))
        }

        ExprKind::Arith(op, a, b) => bounds_of_arith(*op, a, b, expr.ty, scope),

        ExprKind::Let(name, value, body) => {
            let value_bounds = bounds_of_expr_in_scope(value, scope)?;
            let mut inner = scope.clone();
            inner.push(name.clone(), value_bounds);
            bounds_of_expr_in_scope(body, &inner)
        }

        ExprKind::Select(_, t, f) => {
            let (t_min, t_max) = bounds_of_expr_in_scope(t, scope)?;
            let (f_min, f_max) = bounds_of_expr_in_scope(f, scope)?;
            Ok((min_of(t_min, f_min)?, max_of(t_max, f_max)?))
        }

        ExprKind::Load(..) | ExprKind::Call(..) => representable_range_bounds(expr),

        ExprKind::Cmp(..) | ExprKind::And(..) | ExprKind::Or(..) | ExprKind::Not(..) => Err(
            not_applicable("bounds of a boolean-valued expression are unsupported"),
        ),

        ExprKind::Ramp(..) | ExprKind::Broadcast(..) => Err(not_applicable(
            "bounds of a vector-forming expression are unsupported",
        )),
    }
}

fn int_const_expr(ty: crate::types::Type, v: i128) -> CoreResult<Expr> {
    match ty.kind {
        crate::types::TypeKind::Int => ExprBuilder::int_imm(ty, v as i64),
        _ => ExprBuilder::uint_imm(ty, v as u64),
    }
}

fn int_one(ty: crate::types::Type) -> CoreResult<Expr> {
    int_const_expr(ty, 1)
}

fn representable_range_bounds(expr: &Expr) -> CoreResult<Interval> {
    match expr.ty.representable_range() {
        Some((lo, hi)) => {
            let min = int_const_expr(expr.ty, lo)?;
            let max = int_const_expr(expr.ty, hi)?;
            Ok((Some(min), Some(max)))
        }
        None => Ok((None, None)),
    }
}

fn bounds_of_arith(
    op: ArithOp,
    a: &Expr,
    b: &Expr,
    ty: crate::types::Type,
    scope: &Scope<Interval>,
) -> CoreResult<Interval> {
    let (a_min, a_max) = bounds_of_expr_in_scope(a, scope)?;
    let (b_min, b_max) = bounds_of_expr_in_scope(b, scope)?;
    match op {
        ArithOp::Add => Ok((
            combine(ArithOp::Add, a_min, b_min)?,
            combine(ArithOp::Add, a_max, b_max)?,
        )),
        ArithOp::Sub => Ok((
            combine(ArithOp::Sub, a_min, b_max)?,
            combine(ArithOp::Sub, a_max, b_min)?,
        )),
        ArithOp::Div => {
            let divisor_may_include_zero = match (&b_min, &b_max) {
                (Some(lo), Some(hi)) => !provably_excludes_zero(lo, hi),
                _ => true,
            };
            if divisor_may_include_zero {
                return Ok((None, None));
            }
            let quotients = four_combinations(op, &a_min, &a_max, &b_min, &b_max)?;
            fold_hull(quotients)
        }
        ArithOp::Mul => {
            let products = four_combinations(op, &a_min, &a_max, &b_min, &b_max)?;
            fold_hull(products)
        }
        ArithOp::Mod => {
            let zero = int_const_expr(ty, 0)?;
            let max = match b_max {
                Some(bm) => Some(simplify_expr(&ExprBuilder::arith(
                    ArithOp::Sub,
                    bm,
                    int_const_expr(ty, 1)?,
                )?)?),
                None => None,
            };
            Ok((Some(zero), max))
        }
        ArithOp::Min => Ok((min_of(a_min, b_min)?, min_of(a_max, b_max)?)),
        ArithOp::Max => Ok((max_of(a_min, b_min)?, max_of(a_max, b_max)?)),
    }
}

fn provably_excludes_zero(lo: &Expr, hi: &Expr) -> bool {
    let zero_lo = as_i128(lo);
    let zero_hi = as_i128(hi);
    match (zero_lo, zero_hi) {
        (Some(lo), Some(hi)) => !(lo <= 0 && 0 <= hi),
        _ => false,
    }
}

fn as_i128(e: &Expr) -> Option<i128> {
    match e.kind {
        ExprKind::IntImm(v) => Some(v as i128),
        ExprKind::UIntImm(v) => Some(v as i128),
        _ => None,
    }
}

fn four_combinations(
    op: ArithOp,
    a_min: &Option<Expr>,
    a_max: &Option<Expr>,
    b_min: &Option<Expr>,
    b_max: &Option<Expr>,
) -> CoreResult<Vec<Option<Expr>>> {
    let mut out = Vec::with_capacity(4);
    for a in [a_min, a_max] {
        for b in [b_min, b_max] {
            out.push(combine(op, a.clone(), b.clone())?);
        }
    }
    Ok(out)
}

fn fold_hull(values: Vec<Option<Expr>>) -> CoreResult<Interval> {
    if values.iter().any(|v| v.is_none()) {
        return Ok((None, None));
    }
    let values: Vec<Expr> = values.into_iter().map(|v| v.unwrap()).collect();
    let mut min = values[0].clone();
    let mut max = values[0].clone();
    for v in &values[1..] {
        min = min_of(Some(min), Some(v.clone()))?.unwrap();
        max = max_of(Some(max), Some(v.clone()))?.unwrap();
    }
    Ok((Some(min), Some(max)))
}

/// Per-dimension interval hull of every `Call(.., Halide)` node in `stmt`
/// whose callee is `func_name`.
pub fn region_required(
    func_name: &str,
    stmt: &Stmt,
    scope: &Scope<Interval>,
) -> CoreResult<Vec<Interval>> {
    let mut collector = RegionCollector::new(func_name, RegionKind::Required, scope.clone());
    collector.visit_stmt(stmt);
    collector.result()
}

/// Per-dimension interval hull of every `Provide` node in `stmt` whose
/// buffer is `func_name`.
pub fn region_provided(
    func_name: &str,
    stmt: &Stmt,
    scope: &Scope<Interval>,
) -> CoreResult<Vec<Interval>> {
    let mut collector = RegionCollector::new(func_name, RegionKind::Provided, scope.clone());
    collector.visit_stmt(stmt);
    collector.result()
}

/// The union, per dimension, of `region_required` and `region_provided`.
pub fn region_touched(
    func_name: &str,
    stmt: &Stmt,
    scope: &Scope<Interval>,
) -> CoreResult<Vec<Interval>> {
    let required = region_required(func_name, stmt, scope)?;
    let provided = region_provided(func_name, stmt, scope)?;
    let len = required.len().max(provided.len());
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let r = required.get(i).cloned().unwrap_or((None, None));
        let p = provided.get(i).cloned().unwrap_or((None, None));
        out.push((min_of(r.0, p.0)?, max_of(r.1, p.1)?));
    }
    Ok(out)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RegionKind {
    Required,
    Provided,
}

struct RegionCollector {
    func_name: Symbol,
    kind: RegionKind,
    scope: Scope<Interval>,
    hull: Vec<Interval>,
    error: Option<CoreError>,
}

impl RegionCollector {
    fn new(func_name: &str, kind: RegionKind, scope: Scope<Interval>) -> Self {
        RegionCollector {
            func_name: Symbol::new(func_name),
            kind,
            scope,
            hull: Vec::new(),
            error: None,
        }
    }

    fn result(self) -> CoreResult<Vec<Interval>> {
        if let Some(e) = self.error {
            return Err(e);
        }
        Ok(self.hull)
    }

    fn record(&mut self, args: &[Expr]) {
        if self.error.is_some() {
            return;
        }
        while self.hull.len() < args.len() {
            self.hull.push((None, None));
        }
        for (i, arg) in args.iter().enumerate() {
            match bounds_of_expr_in_scope(arg, &self.scope) {
                Ok((min, max)) => {
                    let existing = self.hull[i].clone();
                    let merged_min = if existing.0.is_none() {
                        min
                    } else {
                        match min_of(existing.0, min) {
                            Ok(v) => v,
                            Err(e) => {
                                self.error = Some(e);
                                return;
                            }
                        }
                    };
                    let merged_max = if existing.1.is_none() {
                        max
                    } else {
                        match max_of(existing.1, max) {
                            Ok(v) => v,
                            Err(e) => {
                                self.error = Some(e);
                                return;
                            }
                        }
                    };
                    self.hull[i] = (merged_min, merged_max);
                }
                Err(e) => self.error = Some(e),
            }
        }
    }
}

impl Visitor for RegionCollector {
    fn visit_expr(&mut self, e: &Expr) {
        if self.error.is_some() {
            return;
        }
        if self.kind == RegionKind::Required {
            if let ExprKind::Call(name, args, crate::ir::expr::CallKind::Halide) = &e.kind {
                if *name == self.func_name {
                    self.record(args);
                }
            }
        }
        crate::visitor::walk_expr(self, e);
    }

    fn visit_stmt(&mut self, s: &Stmt) {
        if self.error.is_some() {
            return;
        }
        match &s.kind {
            StmtKind::For(name, min, extent, _, body) => {
                self.visit_expr(min);
                self.visit_expr(extent);
                // Enclosing loop variables are bound to (min, min+extent-1)
                // so nested calls' argument bounds can be resolved.
                let hi = ExprBuilder::arith(ArithOp::Add, min.clone(), extent.clone())
                    .and_then(|sum| ExprBuilder::arith(ArithOp::Sub, sum, int_one(min.ty)?))
                    .and_then(|e| simplify_expr(&e));
                let bounds = match hi {
                    Ok(hi) => (Some(min.clone()), Some(hi)),
                    Err(_) => (Some(min.clone()), None),
                };
                let mut inner = self.scope.clone();
                inner.push(name.clone(), bounds);
                let saved = std::mem::replace(&mut self.scope, inner);
                self.visit_stmt(body);
                self.scope = saved;
            }
            StmtKind::LetStmt(name, value, body) => {
                self.visit_expr(value);
                if let Ok(bounds) = bounds_of_expr_in_scope(value, &self.scope) {
                    let mut inner = self.scope.clone();
                    inner.push(name.clone(), bounds);
                    let saved = std::mem::replace(&mut self.scope, inner);
                    self.visit_stmt(body);
                    self.scope = saved;
                } else {
                    self.visit_stmt(body);
                }
            }
            StmtKind::Provide(name, value, args) => {
                self.visit_expr(value);
                for a in args {
                    self.visit_expr(a);
                }
                if self.kind == RegionKind::Provided && *name == self.func_name {
                    self.record(args);
                }
            }
            _ => crate::visitor::walk_stmt(self, s),
        }
    }
}
