//! Error types for expression evaluation.

use thiserror::Error;

/// Errors surfaced while evaluating an expression tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ExprError {
    /// A `Variable` node referenced an index outside the assignment context.
    #[error("variable {index} does not exist (expression is over {vars} variables)")]
    VariableOutOfRange {
        /// Zero-based index the node referenced.
        index: usize,
        /// Variable-count context of the tree.
        vars: usize,
    },
}
