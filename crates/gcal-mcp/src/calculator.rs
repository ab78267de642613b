//! The `calculate` tool: basic arithmetic on two numbers.

use schemars::JsonSchema;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalculatorError {
    #[error("cannot divide by zero")]
    DivisionByZero,
}

pub fn calculate(operation: Operation, x: f64, y: f64) -> Result<f64, CalculatorError> {
    match operation {
        Operation::Add => Ok(x + y),
        Operation::Subtract => Ok(x - y),
        Operation::Multiply => Ok(x * y),
        Operation::Divide if y == 0.0 => Err(CalculatorError::DivisionByZero),
        Operation::Divide => Ok(x / y),
    }
}

/// Results are reported with two decimal places.
pub fn format_result(value: f64) -> String {
    format!("{:.2}", value)
}
