//! Local fast path for obvious two-operand add/multiply requests

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};

use crate::calculator::Operation;

static ADD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(add|plus|sum)\b|\+").expect("Invalid add regex"));
static MULTIPLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(multiply|times|product)\b|\*").expect("Invalid multiply regex"));

/// Anything the shortcut cannot compute: other operations, brackets, a binary
/// minus (but not a sign attached to a number), exponent notation and digit
/// grouping.
static UNSUPPORTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(subtract|minus|less|divide|divided|over|power|exponent|squared|cubed|sqrt|root|mod|modulo|percent|log|logs)\b|[/^(%]|\d\s*-|-\s|-$|\d[e][+-]?\d|\d,\d",
    )
    .expect("Invalid unsupported-operation regex")
});
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("Invalid number regex"));

/// A call that can skip the model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shortcut {
    pub operation: Operation,
    pub num1: f64,
    pub num2: f64,
}

impl Shortcut {
    pub fn tool_id(&self) -> &'static str {
        self.operation.as_str()
    }

    pub fn parameters(&self) -> Value {
        json!({ "num1": self.num1, "num2": self.num2 })
    }
}

/// Detect `message` as a plain addition or multiplication of exactly two numbers.
///
/// Anything mentioning both operations, any other operation, or a number
/// count other than two returns `None`.
pub fn detect(message: &str) -> Option<Shortcut> {
    let operation = match (ADD.is_match(message), MULTIPLY.is_match(message)) {
        (true, false) => Operation::Add,
        (false, true) => Operation::Multiply,
        _ => return None,
    };
    if UNSUPPORTED.is_match(message) {
        return None;
    }

    let numbers: Vec<f64> = NUMBER
        .find_iter(message)
        .map(|m| m.as_str().parse())
        .collect::<std::result::Result<_, _>>()
        .ok()?;

    match numbers.as_slice() {
        [num1, num2] => Some(Shortcut {
            operation,
            num1: *num1,
            num2: *num2,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_addition_phrasings() {
        for message in ["Add 5 and 3", "What is 10 plus 20?", "Calculate 7.5 + 2.25"] {
            let shortcut = detect(message).unwrap_or_else(|| panic!("no shortcut for {}", message));
            assert_eq!(shortcut.operation, Operation::Add);
        }
        let shortcut = detect("Calculate 7.5 + 2.25").unwrap();
        assert_eq!((shortcut.num1, shortcut.num2), (7.5, 2.25));
    }

    #[test]
    fn test_detect_multiplication_phrasings() {
        let shortcut = detect("Multiply 4 by 6").unwrap();
        assert_eq!(shortcut.tool_id(), "multiply");
        assert_eq!(shortcut.parameters(), json!({"num1": 4.0, "num2": 6.0}));
        assert_eq!(detect("What is 8 times 3?").unwrap().operation, Operation::Multiply);
    }

    #[test]
    fn test_more_than_two_numbers_is_none() {
        assert!(detect("add 1 and 2 and 3").is_none());
        assert!(detect("3 times 2 times 4").is_none());
    }

    #[test]
    fn test_ambiguous_or_unsupported_is_none() {
        assert!(detect("add 2 and 3 then multiply by 4").is_none());
        assert!(detect("what is 10 divided by 2 plus 1").is_none());
        assert!(detect("(2 + 3) * 4").is_none());
        assert!(detect("add 5").is_none());
        assert!(detect("what is 2 to the power 8").is_none());
        assert!(detect("hello there").is_none());
        assert!(detect("what is 5 - 3 + 2").is_none());
        assert!(detect("5-3+2").is_none());
        assert!(detect("what is 2e3 plus 1").is_none());
        assert!(detect("sqrt of 16 plus 9").is_none());
        assert!(detect("10 % 3 plus 1").is_none());
        assert!(detect("add 1,000 and 5").is_none());
        assert!(detect("cube root of 27 times 2").is_none());
    }

    #[test]
    fn test_negative_numbers() {
        let shortcut = detect("add -4 and 10").unwrap();
        assert_eq!((shortcut.num1, shortcut.num2), (-4.0, 10.0));
    }
}
