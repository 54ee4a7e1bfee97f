//! The algorithmic intermediate representation: immutable, reference-counted
//! expression and statement trees.

pub mod expr;
pub mod stmt;

pub use expr::{ArithOp, CallKind, CmpOp, Expr, ExprKind, ExprNode};
pub use stmt::{ForKind, Stmt, StmtKind, StmtNode};

/// True if two handles refer to the exact same node (pointer identity),
/// the notion of "unchanged" that mutators use to preserve sharing.
pub fn expr_same_as(a: &Expr, b: &Expr) -> bool {
    std::rc::Rc::ptr_eq(a, b)
}

pub fn stmt_same_as(a: &Stmt, b: &Stmt) -> bool {
    std::rc::Rc::ptr_eq(a, b)
}
