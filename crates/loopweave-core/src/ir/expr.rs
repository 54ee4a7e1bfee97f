//! Expression nodes.
//!
//! Every expression carries its own [`Type`]. Nodes are built through smart
//! constructors that enforce the invariants checked at construction time
//! (operand type agreement, comparison results are bool, Ramp/Broadcast
//! widths, etc.) and return a [`CoreError::MalformedIr`] otherwise. Once
//! built, a node is immutable; passes rewrite by building new nodes that
//! share unchanged subtrees.

use crate::error::{CoreError, CoreResult};
use crate::symbol::Symbol;
use crate::types::{Type, TypeKind};
use std::rc::Rc;

/// Binary arithmetic operator family: `Add, Sub, Mul, Div, Mod, Min, Max`.
/// Operands share the result type; integer `Div`/`Mod` round toward
/// negative infinity and `Mod`'s result is always non-negative (`fmod` for
/// floats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Min,
    Max,
}

/// Binary comparison operator family; always produces a bool (scalar or
/// vector matching the operand lane count).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// The provenance of a `Call` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// A read from another function in the environment.
    Halide,
    /// A read from an external buffer.
    Image,
    /// A foreign function invocation, opaque to analyses other than type.
    Extern,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntImm(i64),
    UIntImm(u64),
    FloatImm(f64),
    Variable(Symbol),
    Cast(Expr),
    Arith(ArithOp, Expr, Expr),
    Cmp(CmpOp, Expr, Expr),
    And(Expr, Expr),
    Or(Expr, Expr),
    Not(Expr),
    Select(Expr, Expr, Expr),
    Load(Symbol, Expr),
    Ramp(Expr, Expr, u32),
    Broadcast(Expr, u32),
    Call(Symbol, Vec<Expr>, CallKind),
    Let(Symbol, Expr, Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprNode {
    pub ty: Type,
    pub kind: ExprKind,
}

/// A handle to an immutable expression node. Cloning bumps the node's
/// reference count; it never deep-copies.
pub type Expr = Rc<ExprNode>;

fn node(ty: Type, kind: ExprKind) -> Expr {
    Rc::new(ExprNode { ty, kind })
}

fn malformed(reason: impl Into<String>) -> CoreError {
    CoreError::MalformedIr {
        reason: reason.into(),
    }
}

pub struct ExprBuilder;

impl ExprBuilder {
    pub fn int_imm(ty: Type, value: i64) -> CoreResult<Expr> {
        if ty.kind != TypeKind::Int {
            return Err(malformed("IntImm requires an int Type"));
        }
        Ok(node(ty, ExprKind::IntImm(value)))
    }

    pub fn uint_imm(ty: Type, value: u64) -> CoreResult<Expr> {
        if ty.kind != TypeKind::UInt {
            return Err(malformed("UIntImm requires a uint Type"));
        }
        Ok(node(ty, ExprKind::UIntImm(value)))
    }

    pub fn float_imm(ty: Type, value: f64) -> CoreResult<Expr> {
        if ty.kind != TypeKind::Float {
            return Err(malformed("FloatImm requires a float Type"));
        }
        Ok(node(ty, ExprKind::FloatImm(value)))
    }

    pub fn variable(ty: Type, name: impl Into<Symbol>) -> Expr {
        node(ty, ExprKind::Variable(name.into()))
    }

    pub fn cast(ty: Type, value: Expr) -> Expr {
        // Cast(t, x) where x.type == t is legal and kept as a no-op node;
        // the simplifier, not the constructor, collapses it away.
        node(ty, ExprKind::Cast(value))
    }

    pub fn arith(op: ArithOp, a: Expr, b: Expr) -> CoreResult<Expr> {
        if a.ty != b.ty {
            return Err(malformed(format!(
                "{op:?} operands have mismatched types: {} vs {}",
                a.ty, b.ty
            )));
        }
        let ty = a.ty;
        Ok(node(ty, ExprKind::Arith(op, a, b)))
    }

    pub fn cmp(op: CmpOp, a: Expr, b: Expr) -> CoreResult<Expr> {
        if a.ty != b.ty {
            return Err(malformed(format!(
                "{op:?} operands have mismatched types: {} vs {}",
                a.ty, b.ty
            )));
        }
        let ty = Type::bool_().with_lanes(a.ty.lanes);
        Ok(node(ty, ExprKind::Cmp(op, a, b)))
    }

    pub fn and(a: Expr, b: Expr) -> CoreResult<Expr> {
        require_bool(&a)?;
        require_bool(&b)?;
        if a.ty != b.ty {
            return Err(malformed("And operands have mismatched lane counts"));
        }
        let ty = a.ty;
        Ok(node(ty, ExprKind::And(a, b)))
    }

    pub fn or(a: Expr, b: Expr) -> CoreResult<Expr> {
        require_bool(&a)?;
        require_bool(&b)?;
        if a.ty != b.ty {
            return Err(malformed("Or operands have mismatched lane counts"));
        }
        let ty = a.ty;
        Ok(node(ty, ExprKind::Or(a, b)))
    }

    pub fn not(a: Expr) -> CoreResult<Expr> {
        require_bool(&a)?;
        let ty = a.ty;
        Ok(node(ty, ExprKind::Not(a)))
    }

    pub fn select(cond: Expr, t: Expr, f: Expr) -> CoreResult<Expr> {
        require_bool(&cond)?;
        if t.ty != f.ty {
            return Err(malformed("Select branches have mismatched types"));
        }
        if cond.ty.lanes != t.ty.lanes {
            return Err(malformed(
                "Select condition lane count must match branch lane count",
            ));
        }
        let ty = t.ty;
        Ok(node(ty, ExprKind::Select(cond, t, f)))
    }

    pub fn load(ty: Type, buffer: impl Into<Symbol>, index: Expr) -> CoreResult<Expr> {
        if index.ty.lanes != ty.lanes {
            return Err(malformed("Load index lanes must match result lanes"));
        }
        Ok(node(ty, ExprKind::Load(buffer.into(), index)))
    }

    pub fn ramp(base: Expr, stride: Expr, lanes: u32) -> CoreResult<Expr> {
        if lanes < 2 {
            return Err(malformed("Ramp.lanes must be >= 2"));
        }
        if !base.ty.is_scalar() || !stride.ty.is_scalar() {
            return Err(malformed("Ramp base and stride must be scalar"));
        }
        if base.ty != stride.ty {
            return Err(malformed("Ramp base and stride must share a scalar type"));
        }
        let ty = base.ty.with_lanes(lanes);
        Ok(node(ty, ExprKind::Ramp(base, stride, lanes)))
    }

    pub fn broadcast(value: Expr, lanes: u32) -> CoreResult<Expr> {
        if lanes < 2 {
            return Err(malformed("Broadcast.lanes must be >= 2"));
        }
        if !value.ty.is_scalar() {
            return Err(malformed("Broadcast value must be scalar"));
        }
        let ty = value.ty.with_lanes(lanes);
        Ok(node(ty, ExprKind::Broadcast(value, lanes)))
    }

    pub fn call(ty: Type, name: impl Into<Symbol>, args: Vec<Expr>, kind: CallKind) -> Expr {
        node(ty, ExprKind::Call(name.into(), args, kind))
    }

    pub fn let_(name: impl Into<Symbol>, value: Expr, body: Expr) -> Expr {
        let ty = body.ty;
        node(ty, ExprKind::Let(name.into(), value, body))
    }
}

fn require_bool(e: &Expr) -> CoreResult<()> {
    if e.ty.is_bool() {
        Ok(())
    } else {
        Err(malformed(format!(
            "expected a bool-typed operand, found {}",
            e.ty
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arith_requires_equal_types() {
        let a = ExprBuilder::int_imm(Type::int(32), 1).unwrap();
        let b = ExprBuilder::int_imm(Type::int(16), 1).unwrap();
        assert!(ExprBuilder::arith(ArithOp::Add, a, b).is_err());
    }

    #[test]
    fn cmp_produces_bool() {
        let a = ExprBuilder::int_imm(Type::int(32), 1).unwrap();
        let b = ExprBuilder::int_imm(Type::int(32), 2).unwrap();
        let cmp = ExprBuilder::cmp(CmpOp::Lt, a, b).unwrap();
        assert!(cmp.ty.is_bool());
    }

    #[test]
    fn ramp_requires_scalar_operands_and_min_lanes() {
        let base = ExprBuilder::int_imm(Type::int(32), 0).unwrap();
        let stride = ExprBuilder::int_imm(Type::int(32), 1).unwrap();
        assert!(ExprBuilder::ramp(base.clone(), stride.clone(), 1).is_err());
        let r = ExprBuilder::ramp(base, stride, 4).unwrap();
        assert_eq!(r.ty, Type::int(32).with_lanes(4));
    }

    #[test]
    fn broadcast_widens_lanes() {
        let v = ExprBuilder::float_imm(Type::float(32), 1.0).unwrap();
        let b = ExprBuilder::broadcast(v, 8).unwrap();
        assert_eq!(b.ty.lanes, 8);
    }

    #[test]
    fn select_requires_bool_condition_and_matching_branches() {
        let cond = ExprBuilder::cmp(
            CmpOp::Lt,
            ExprBuilder::int_imm(Type::int(32), 0).unwrap(),
            ExprBuilder::int_imm(Type::int(32), 1).unwrap(),
        )
        .unwrap();
        let t = ExprBuilder::int_imm(Type::int(32), 1).unwrap();
        let f = ExprBuilder::int_imm(Type::int(32), 2).unwrap();
        let s = ExprBuilder::select(cond, t, f).unwrap();
        assert_eq!(s.ty, Type::int(32));
    }

    #[test]
    fn let_type_equals_body_type() {
        let v = ExprBuilder::int_imm(Type::int(32), 1).unwrap();
        let body = ExprBuilder::variable(Type::int(32), "x");
        let l = ExprBuilder::let_("x", v, body);
        assert_eq!(l.ty, Type::int(32));
    }

    #[test]
    fn cloning_a_handle_shares_the_node() {
        let a = ExprBuilder::int_imm(Type::int(32), 1).unwrap();
        let b = a.clone();
        assert!(Rc::ptr_eq(&a, &b));
    }
}
