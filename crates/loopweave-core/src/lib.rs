pub mod bounds;
pub mod bounds_inference;
pub mod buffer;
pub mod dead_let;
pub mod driver;
pub mod error;
pub mod flatten;
pub mod function;
pub mod inject_realization;
pub mod ir;
pub mod mutator;
pub mod printer;
pub mod realization_order;
pub mod realize;
pub mod schedule;
pub mod scope;
pub mod simplify;
pub mod substitute;
pub mod symbol;
pub mod types;
pub mod vectorize;
pub mod visitor;

// Re-export commonly used types
pub use bounds::Interval;
pub use buffer::{BufferDescriptor, MAX_RANK};
pub use driver::{lower, lower_function, Lowerer, NameSupply};
pub use error::{CoreError, CoreResult};
pub use function::{Environment, Function};
pub use ir::expr::ExprBuilder;
pub use ir::stmt::StmtBuilder;
pub use ir::{
    expr_same_as, stmt_same_as, ArithOp, CallKind, CmpOp, Expr, ExprKind, ExprNode, ForKind, Stmt,
    StmtKind, StmtNode,
};
pub use mutator::Mutator;
pub use schedule::{Dim, Schedule, Split};
pub use scope::Scope;
pub use symbol::Symbol;
pub use types::{Type, TypeKind};
pub use visitor::Visitor;
