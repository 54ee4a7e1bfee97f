//! Binds each injected producer's per-dimension `min`/`extent` from the
//! region its consumers actually require.
//!
//! Runs after [`crate::inject_realization`]: every producer function shows
//! up in the tree as a `Realize` node. At each `Realize`, this pass computes
//! `region_required` of the producer's body (the subtree still inside the
//! `Realize`, under the consumer's enclosing loop bounds) and wraps it in
//! `LetStmt`s binding `f.<dim>.min`/`f.<dim>.extent`. The output function is
//! never wrapped in `Realize` — its bounds are bound separately, to the
//! caller-supplied buffer parameters (driver step 5).

use crate::bounds::{region_required, Interval};
use crate::error::{CoreError, CoreResult};
use crate::function::Environment;
use crate::ir::expr::{ArithOp, ExprBuilder};
use crate::ir::stmt::{Stmt, StmtBuilder, StmtKind};
use crate::scope::Scope;
use crate::simplify::simplify_expr;
use crate::types::Type;

fn unresolvable(name: &str) -> CoreError {
    CoreError::UnresolvableReference {
        name: name.to_string(),
    }
}

fn not_applicable(reason: impl Into<String>) -> CoreError {
    CoreError::AnalysisNotApplicable {
        reason: reason.into(),
    }
}

fn loop_hi(min: &crate::ir::expr::Expr, extent: &crate::ir::expr::Expr) -> Option<crate::ir::expr::Expr> {
    let one = ExprBuilder::int_imm(min.ty, 1).ok()?;
    let sum = ExprBuilder::arith(ArithOp::Add, min.clone(), extent.clone()).ok()?;
    let hi = ExprBuilder::arith(ArithOp::Sub, sum, one).ok()?;
    simplify_expr(&hi).ok()
}

/// Runs bounds inference over `stmt`, binding every producer's dimensions
/// found inside `Realize` nodes.
pub fn bounds_inference(stmt: &Stmt, env: &Environment) -> CoreResult<Stmt> {
    infer(stmt, env, &Scope::new())
}

fn infer(s: &Stmt, env: &Environment, scope: &Scope<Interval>) -> CoreResult<Stmt> {
    match &s.kind {
        StmtKind::For(name, min, extent, kind, body) => {
            let mut inner = scope.clone();
            inner.push(name.clone(), (Some(min.clone()), loop_hi(min, extent)));
            let new_body = infer(body, env, &inner)?;
            StmtBuilder::for_(name.clone(), min.clone(), extent.clone(), *kind, new_body)
        }

        StmtKind::LetStmt(name, value, body) => {
            let mut inner = scope.clone();
            let bounds = crate::bounds::bounds_of_expr_in_scope(value, scope).unwrap_or((None, None));
            inner.push(name.clone(), bounds);
            let new_body = infer(body, env, &inner)?;
            Ok(StmtBuilder::let_stmt(name.clone(), value.clone(), new_body))
        }

        StmtKind::Realize(name, ty, bounds, body) => {
            let f = env.get(name).ok_or_else(|| unresolvable(name))?;
            let region = region_required(name.as_str(), body, scope)?;
            if region.len() != f.dimensionality() {
                return Err(not_applicable(format!(
                    "region_required returned {} dims for {} but it has {}",
                    region.len(),
                    name,
                    f.dimensionality()
                )));
            }
            let mut new_body = infer(body, env, scope)?;
            for (i, (lo, hi)) in region.iter().enumerate().rev() {
                let (min_name, extent_name) = f.arg_bounds_names(i);
                let lo = lo.clone().ok_or_else(|| {
                    not_applicable(format!("could not bound the min of {name}'s dim {i}"))
                })?;
                let hi = hi.clone().ok_or_else(|| {
                    not_applicable(format!("could not bound the max of {name}'s dim {i}"))
                })?;
                let span = ExprBuilder::arith(ArithOp::Sub, hi, lo.clone())?;
                let one = ExprBuilder::int_imm(Type::int(32), 1)?;
                let extent_expr = simplify_expr(&ExprBuilder::arith(ArithOp::Add, span, one)?)?;
                new_body = StmtBuilder::let_stmt(extent_name, extent_expr, new_body);
                new_body = StmtBuilder::let_stmt(min_name, lo, new_body);
            }
            StmtBuilder::realize(name.clone(), *ty, bounds.clone(), new_body)
        }

        StmtKind::Pipeline(buf, produce, update, consume) => {
            let mp = infer(produce, env, scope)?;
            let mu = match update {
                Some(u) => Some(infer(u, env, scope)?),
                None => None,
            };
            let mc = infer(consume, env, scope)?;
            Ok(StmtBuilder::pipeline(buf.clone(), mp, mu, mc))
        }

        StmtKind::Allocate(buf, ty, size, body) => {
            let mb = infer(body, env, scope)?;
            StmtBuilder::allocate(buf.clone(), *ty, size.clone(), mb)
        }

        StmtKind::Block(first, rest) => {
            let mf = infer(first, env, scope)?;
            let mr = match rest {
                Some(r) => Some(infer(r, env, scope)?),
                None => None,
            };
            Ok(StmtBuilder::block(mf, mr))
        }

        StmtKind::AssertStmt(..) | StmtKind::PrintStmt(..) | StmtKind::Store(..) | StmtKind::Provide(..) => {
            Ok(s.clone())
        }
    }
}

/// Driver step 5: binds the output function's own dimensions to the
/// caller-supplied parameters `f.argI.min`/`f.argI.extent`, rather than to
/// any inferred region (nothing in the pipeline "requires" the output; its
/// extent is a property of the call, supplied by the host).
pub fn bind_output_bounds(stmt: &Stmt, output: &crate::function::Function) -> CoreResult<Stmt> {
    let mut body = stmt.clone();
    for i in (0..output.dimensionality()).rev() {
        let (min_name, extent_name) = output.arg_bounds_names(i);
        let param_min = crate::symbol::Symbol::new(format!("{}.arg{}.min", output.name, i));
        let param_extent = crate::symbol::Symbol::new(format!("{}.arg{}.extent", output.name, i));
        body = StmtBuilder::let_stmt(
            extent_name,
            ExprBuilder::variable(Type::int(32), param_extent),
            body,
        );
        body = StmtBuilder::let_stmt(min_name, ExprBuilder::variable(Type::int(32), param_min), body);
    }
    Ok(body)
}
