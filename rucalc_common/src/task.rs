//! Wire types of the internal task api shared by the orchestrator and the agents.

use ::core::fmt::Display;
use ::std::time::Duration;

use ::serde::{Deserialize, Serialize};

/// Process-lifetime unique id of a task, assigned by the orchestrator.
pub type TaskId = u64;

/// The closed set of binary operators.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Add),
            "-" => Some(Self::Sub),
            "*" => Some(Self::Mul),
            "/" => Some(Self::Div),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }

    /// Higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
        }
    }

    /// Plain f64 arithmetic: division by zero gives an infinity or NaN, never an error.
    pub fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A binary operation whose operands are both known.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    /// Operands travel as text so that agents decide how to parse them.
    pub arg1: String,
    pub arg2: String,
    pub operation: Operator,
    /// Simulated compute time, in milliseconds on the wire.
    #[serde(with = "duration_millis")]
    pub operation_time: Duration,
}

/// Response body of `GET /internal/task`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TaskResponse {
    pub task: Task,
}

/// Request body of `POST /internal/task`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TaskResult {
    pub id: TaskId,
    /// Decimal text, `NaN` and `inf` included.
    pub value: String,
}

mod duration_millis {
    use ::std::time::Duration;

    use ::serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis().try_into().unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
