//! Expression types exposed through the public api of the orchestrator.

use ::serde::{Deserialize, Serialize};

mod expression_id;

pub use expression_id::ExpressionId;

/// Request body to submit an expression.
/// Both fields are validated by the orchestrator, so empty strings are accepted here.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct CalculateRequest {
    pub id: String,
    pub expression: String,
}

/// Lifecycle of an expression.
/// `InProcess` -> `Done` once the last pending task is resolved.
/// `Error` is terminal and only reached at submission.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExpressionStatus {
    Error,
    Done,
    #[serde(rename = "In process")]
    InProcess,
}

/// Snapshot of an expression as seen by api callers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Expression {
    pub id: ExpressionId,
    pub status: ExpressionStatus,
    /// Final value in text form, empty until the expression is done.
    pub result: String,
    pub source: String,
}

/// Response body of `GET /api/v1/expressions`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ExpressionList {
    pub expressions: Vec<Expression>,
}

/// Response body of `GET /api/v1/expressions/{id}`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ExpressionUnit {
    pub expression: Expression,
}
