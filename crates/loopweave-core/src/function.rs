//! A pure, multidimensional function definition plus its schedule.

use crate::schedule::Schedule;
use crate::symbol::Symbol;
use crate::types::Type;
use std::collections::HashMap;

use crate::ir::expr::Expr;

/// A named, pure function: a list of argument names, an expression body,
/// and a schedule. Reduction (update) definitions are not represented —
/// this crate covers pure definitions only.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Symbol,
    pub args: Vec<Symbol>,
    pub body: Expr,
    pub schedule: Schedule,
}

impl Function {
    pub fn new(name: impl Into<Symbol>, args: Vec<Symbol>, body: Expr) -> Self {
        let schedule = Schedule::default_for_args(&args);
        Function {
            name: name.into(),
            args,
            body,
            schedule,
        }
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn dimensionality(&self) -> usize {
        self.args.len()
    }

    pub fn value_type(&self) -> Type {
        self.body.ty
    }

    /// The fully-qualified per-argument min/extent symbol pair used
    /// throughout the realization builder and bounds inference, e.g. for
    /// argument `x` of function `f`: `("f.x.min", "f.x.extent")`.
    pub fn arg_bounds_names(&self, index: usize) -> (Symbol, Symbol) {
        let arg = &self.args[index];
        (
            Symbol::qualify(&format!("{}.{}", self.name, arg), "min"),
            Symbol::qualify(&format!("{}.{}", self.name, arg), "extent"),
        )
    }
}

/// The environment the driver consumes: every function in the pipeline,
/// keyed by name.
pub type Environment = HashMap<Symbol, Function>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::ExprBuilder;

    #[test]
    fn dimensionality_matches_arg_count() {
        let body = ExprBuilder::int_imm(Type::int(32), 0).unwrap();
        let f = Function::new("f", vec![Symbol::new("x"), Symbol::new("y")], body);
        assert_eq!(f.dimensionality(), 2);
    }

    #[test]
    fn arg_bounds_names_are_fully_qualified() {
        let body = ExprBuilder::int_imm(Type::int(32), 0).unwrap();
        let f = Function::new("f", vec![Symbol::new("x")], body);
        let (min, extent) = f.arg_bounds_names(0);
        assert_eq!(min.as_str(), "f.x.min");
        assert_eq!(extent.as_str(), "f.x.extent");
    }
}
