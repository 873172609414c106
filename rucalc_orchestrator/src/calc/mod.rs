//! Decomposition-scheduling-reassembly engine of the orchestrator.

use ::std::time::Duration;

use ::rucalc_common::{serde::Deserialize, task::Operator};

pub(crate) mod compiler;
pub(crate) mod deadlines;
pub(crate) mod reduction;
pub mod scheduler;
pub(crate) mod tokens;

/// Simulated compute time of each operator, in milliseconds.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
#[serde(crate = "rucalc_common::serde")]
pub struct OperationTimes {
    pub addition_millis: u64,
    pub subtraction_millis: u64,
    pub multiplication_millis: u64,
    pub division_millis: u64,
}

impl OperationTimes {
    pub fn of(&self, operator: Operator) -> Duration {
        Duration::from_millis(match operator {
            Operator::Add => self.addition_millis,
            Operator::Sub => self.subtraction_millis,
            Operator::Mul => self.multiplication_millis,
            Operator::Div => self.division_millis,
        })
    }
}
