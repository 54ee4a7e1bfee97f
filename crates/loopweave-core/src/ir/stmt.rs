//! Statement nodes. Statements carry no type of their own.

use crate::error::{CoreError, CoreResult};
use crate::ir::expr::Expr;
use crate::symbol::Symbol;
use crate::types::Type;
use std::rc::Rc;

/// The loop kind annotation a schedule assigns to a `For`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForKind {
    Serial,
    Parallel,
    Vectorized,
    Unrolled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    LetStmt(Symbol, Expr, Stmt),
    AssertStmt(Expr, String),
    PrintStmt(String, Vec<Expr>),
    /// `buffer` is write-only inside `produce`, read-write inside `update`
    /// (possibly absent — reductions are out of scope), read-only inside
    /// `consume`.
    Pipeline(Symbol, Stmt, Option<Stmt>, Stmt),
    For(Symbol, Expr, Expr, ForKind, Stmt),
    Store(Symbol, Expr, Expr),
    Provide(Symbol, Expr, Vec<Expr>),
    Allocate(Symbol, Type, Expr, Stmt),
    Realize(Symbol, Type, Vec<(Expr, Expr)>, Stmt),
    Block(Stmt, Option<Stmt>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StmtNode {
    pub kind: StmtKind,
}

pub type Stmt = Rc<StmtNode>;

fn node(kind: StmtKind) -> Stmt {
    Rc::new(StmtNode { kind })
}

fn malformed(reason: impl Into<String>) -> CoreError {
    CoreError::MalformedIr {
        reason: reason.into(),
    }
}

fn require_scalar(e: &Expr, what: &str) -> CoreResult<()> {
    if e.ty.is_scalar() {
        Ok(())
    } else {
        Err(malformed(format!("{what} must be scalar, found {}", e.ty)))
    }
}

pub struct StmtBuilder;

impl StmtBuilder {
    pub fn let_stmt(name: impl Into<Symbol>, value: Expr, body: Stmt) -> Stmt {
        node(StmtKind::LetStmt(name.into(), value, body))
    }

    pub fn assert_stmt(cond: Expr, message: impl Into<String>) -> CoreResult<Stmt> {
        if !cond.ty.is_bool() {
            return Err(malformed("AssertStmt condition must be bool"));
        }
        Ok(node(StmtKind::AssertStmt(cond, message.into())))
    }

    pub fn print_stmt(prefix: impl Into<String>, args: Vec<Expr>) -> Stmt {
        node(StmtKind::PrintStmt(prefix.into(), args))
    }

    pub fn pipeline(
        buffer: impl Into<Symbol>,
        produce: Stmt,
        update: Option<Stmt>,
        consume: Stmt,
    ) -> Stmt {
        node(StmtKind::Pipeline(buffer.into(), produce, update, consume))
    }

    pub fn for_(
        name: impl Into<Symbol>,
        min: Expr,
        extent: Expr,
        kind: ForKind,
        body: Stmt,
    ) -> CoreResult<Stmt> {
        let name = name.into();
        require_scalar(&min, "For.min")?;
        require_scalar(&extent, "For.extent")?;
        if !min.ty.is_int() && !min.ty.is_uint() {
            return Err(malformed("For.min must be a scalar integer"));
        }
        if matches!(kind, ForKind::Vectorized | ForKind::Unrolled) {
            match &extent.kind {
                crate::ir::expr::ExprKind::IntImm(n) if *n >= 2 || kind == ForKind::Unrolled => {}
                crate::ir::expr::ExprKind::UIntImm(n)
                    if *n >= 2 || kind == ForKind::Unrolled => {}
                _ => {
                    return Err(malformed(format!(
                        "{name} extent must be a compile-time constant for {kind:?} loops"
                    )))
                }
            }
        }
        Ok(node(StmtKind::For(name, min, extent, kind, body)))
    }

    pub fn store(buffer: impl Into<Symbol>, value: Expr, index: Expr) -> CoreResult<Stmt> {
        if index.ty.lanes != value.ty.lanes {
            return Err(malformed("Store index lanes must match value lanes"));
        }
        Ok(node(StmtKind::Store(buffer.into(), value, index)))
    }

    pub fn provide(buffer: impl Into<Symbol>, value: Expr, args: Vec<Expr>) -> CoreResult<Stmt> {
        for a in &args {
            require_scalar(a, "Provide argument")?;
        }
        Ok(node(StmtKind::Provide(buffer.into(), value, args)))
    }

    pub fn allocate(
        buffer: impl Into<Symbol>,
        ty: Type,
        size: Expr,
        body: Stmt,
    ) -> CoreResult<Stmt> {
        require_scalar(&size, "Allocate.size")?;
        Ok(node(StmtKind::Allocate(buffer.into(), ty, size, body)))
    }

    pub fn realize(
        buffer: impl Into<Symbol>,
        ty: Type,
        bounds: Vec<(Expr, Expr)>,
        body: Stmt,
    ) -> CoreResult<Stmt> {
        for (min, extent) in &bounds {
            require_scalar(min, "Realize bound min")?;
            require_scalar(extent, "Realize bound extent")?;
        }
        Ok(node(StmtKind::Realize(buffer.into(), ty, bounds, body)))
    }

    pub fn block(first: Stmt, rest: Option<Stmt>) -> Stmt {
        node(StmtKind::Block(first, rest))
    }

    /// Chains a sequence of statements into nested `Block`s, the
    /// convenience constructor every pass building a loop body reaches for.
    pub fn block_seq(mut stmts: Vec<Stmt>) -> Option<Stmt> {
        let mut rest = stmts.pop();
        while let Some(last) = stmts.pop() {
            rest = Some(StmtBuilder::block(last, rest));
        }
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::ExprBuilder;

    fn int(n: i64) -> Expr {
        ExprBuilder::int_imm(Type::int(32), n).unwrap()
    }

    #[test]
    fn for_requires_constant_extent_when_vectorized() {
        let body = StmtBuilder::store("buf", int(1), int(0)).unwrap();
        let var_extent = ExprBuilder::variable(Type::int(32), "n");
        assert!(StmtBuilder::for_("x", int(0), var_extent, ForKind::Vectorized, body.clone())
            .is_err());
        assert!(StmtBuilder::for_("x", int(0), int(4), ForKind::Vectorized, body).is_ok());
    }

    #[test]
    fn assert_stmt_requires_bool_condition() {
        assert!(StmtBuilder::assert_stmt(int(1), "bad").is_err());
    }

    #[test]
    fn block_seq_chains_in_order() {
        let s1 = StmtBuilder::store("a", int(1), int(0)).unwrap();
        let s2 = StmtBuilder::store("b", int(2), int(0)).unwrap();
        let seq = StmtBuilder::block_seq(vec![s1, s2]).unwrap();
        match &seq.kind {
            StmtKind::Block(first, rest) => {
                assert!(matches!(first.kind, StmtKind::Store(..)));
                assert!(rest.is_some());
            }
            _ => panic!("expected Block"),
        }
    }

    #[test]
    fn cloning_a_handle_shares_the_node() {
        let s = StmtBuilder::store("a", int(1), int(0)).unwrap();
        let s2 = s.clone();
        assert!(Rc::ptr_eq(&s, &s2));
    }
}
