//! Arithmetic operations over an operand pair

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{GatewayError, Result};

/// Decimal digits kept on a division result
const DIVISION_DIGITS: usize = 10;

/// A binary arithmetic operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
        Operation::Power,
    ];

    /// Parse from the route/tool id
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "add" => Some(Self::Add),
            "subtract" => Some(Self::Subtract),
            "multiply" => Some(Self::Multiply),
            "divide" => Some(Self::Divide),
            "power" => Some(Self::Power),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Power => "power",
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Power => "^",
        }
    }

    /// Apply the operation.
    ///
    /// Only `Divide` can fail. `Power` follows `f64::powf`, so a negative base
    /// with a fractional exponent yields NaN rather than an error.
    pub fn apply(&self, pair: OperandPair) -> Result<f64> {
        let OperandPair { num1, num2 } = pair;
        let result = match self {
            Self::Add => num1 + num2,
            Self::Subtract => num1 - num2,
            Self::Multiply => num1 * num2,
            Self::Divide => {
                if num2 == 0.0 {
                    return Err(GatewayError::DivisionByZero);
                }
                round_to(num1 / num2, DIVISION_DIGITS)
            }
            Self::Power => num1.powf(num2),
        };
        Ok(result)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two operands every arithmetic tool takes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperandPair {
    pub num1: f64,
    pub num2: f64,
}

impl OperandPair {
    pub fn new(num1: f64, num2: f64) -> Self {
        Self { num1, num2 }
    }

    /// Extract `num1`/`num2` from a request body.
    ///
    /// Both must be JSON numbers; on failure the error carries the observed
    /// type of each operand.
    pub fn from_json(body: &Value) -> Result<Self> {
        let num1 = body.get("num1");
        let num2 = body.get("num2");
        match (num1.and_then(Value::as_f64), num2.and_then(Value::as_f64)) {
            (Some(num1), Some(num2)) => Ok(Self { num1, num2 }),
            _ => Err(GatewayError::InvalidArgument {
                message: "Both inputs must be numbers".to_string(),
                received: Some(json!({
                    "num1": type_tag(num1),
                    "num2": type_tag(num2),
                })),
            }),
        }
    }

    pub fn is_zero_divisor(&self) -> bool {
        self.num2 == 0.0
    }
}

/// Successful calculator response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub operation: Operation,
    pub num1: f64,
    pub num2: f64,
    pub result: f64,
}

impl Calculation {
    /// Run `operation` on `pair`
    pub fn compute(operation: Operation, pair: OperandPair) -> Result<Self> {
        let result = operation.apply(pair)?;
        log::info!(
            "Calculated: {} {} {} = {}",
            pair.num1,
            operation.symbol(),
            pair.num2,
            result
        );
        Ok(Self {
            operation,
            num1: pair.num1,
            num2: pair.num2,
            result,
        })
    }
}

/// Round to a fixed number of decimal digits, like `Number(x.toFixed(n))`
pub fn round_to(value: f64, digits: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    // `+ 0.0` turns -0.0 into 0.0
    format!("{:.*}", digits, value).parse::<f64>().unwrap_or(value) + 0.0
}

/// Dynamic type tag of a JSON field, mirroring `typeof` in the clients that call us
pub fn type_tag(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Null | Value::Array(_) | Value::Object(_)) => "object",
    }
}
