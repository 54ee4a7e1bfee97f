//! Core error types for loopweave-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure taxonomy the lowering pipeline can raise. All variants are fatal
//! to the current lowering invocation; the core never retries and never
//! mutates state outside the in-progress tree on failure.

use thiserror::Error;

/// Errors produced while building, analyzing, or lowering the IR.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A constructor precondition was violated: undefined child where one
    /// is required, a type mismatch between operands, a negative/too-small
    /// Ramp or Broadcast width, etc.
    #[error("malformed IR: {reason}")]
    MalformedIr { reason: String },

    /// A variable was looked up in a `Scope` that does not contain it.
    /// Indicates an internal pass bug (a fully-qualified name should always
    /// have been bound before use).
    #[error("unresolvable reference: '{name}'")]
    UnresolvableReference { name: String },

    /// An analysis was asked a question it does not support, e.g. bounds
    /// of a boolean-typed expression or bounds of a statement.
    #[error("analysis not applicable: {reason}")]
    AnalysisNotApplicable { reason: String },

    /// A scheduling precondition was violated: compute level outside its
    /// store level, vectorizing/unrolling a non-constant-extent loop, or a
    /// cycle in the function call graph.
    #[error("scheduling error in '{function}': {reason}")]
    SchedulingError { function: String, reason: String },

    /// A feature that is explicitly not yet implemented.
    #[error("unsupported operation: {reason}")]
    UnsupportedOperation { reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
