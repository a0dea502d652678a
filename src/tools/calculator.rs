//! Basic arithmetic for the analyst agent

use futures_util::future::BoxFuture;
use serde_json::Value;

use super::{arg_f64, arg_str, Tool};

/// Supported operations, in the order they are advertised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Sum,
    Subtract,
    Multiply,
    Divide,
    Power,
    Root,
    Modulo,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Sum,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
        Operation::Power,
        Operation::Root,
        Operation::Modulo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Sum => "sum",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
            Operation::Power => "power",
            Operation::Root => "root",
            Operation::Modulo => "modulo",
        }
    }

    /// Case-insensitive lookup. Spanish names and a few symbols are accepted as synonyms.
    pub fn parse(name: &str) -> Option<Self> {
        let op = match name.trim().to_lowercase().as_str() {
            "sum" | "add" | "addition" | "plus" | "+" | "suma" => Operation::Sum,
            "subtract" | "subtraction" | "minus" | "-" | "resta" => Operation::Subtract,
            "multiply" | "multiplication" | "times" | "*" | "x" | "multiplicacion"
            | "multiplicación" => Operation::Multiply,
            "divide" | "division" | "división" | "/" => Operation::Divide,
            "power" | "pow" | "exponent" | "^" | "**" | "potencia" => Operation::Power,
            "root" | "sqrt" | "raiz" | "raíz" => Operation::Root,
            "modulo" | "mod" | "remainder" | "%" | "resto" | "módulo" => Operation::Modulo,
            _ => return None,
        };
        Some(op)
    }
}

fn valid_operations() -> String {
    Operation::ALL
        .iter()
        .map(|op| op.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Apply `operation` to `a` and `b` and describe the result.
///
/// Invalid input (unknown operation, division by zero, even root of a
/// negative number) yields an error sentence rather than a number.
pub fn calculate(operation: &str, a: f64, b: f64) -> String {
    let Some(op) = Operation::parse(operation) else {
        return format!(
            "Operation '{}' not recognized. Valid operations: {}",
            operation,
            valid_operations()
        );
    };

    match op {
        Operation::Sum => format!("{} + {} = {}", a, b, a + b),
        Operation::Subtract => format!("{} - {} = {}", a, b, a - b),
        Operation::Multiply => format!("{} * {} = {}", a, b, a * b),
        Operation::Divide => {
            if b == 0.0 {
                return "Error: cannot divide by zero".to_string();
            }
            format!("{} / {} = {}", a, b, a / b)
        }
        Operation::Power => format!("{} ^ {} = {}", a, b, a.powf(b)),
        Operation::Root => root(a, b),
        Operation::Modulo => {
            if b == 0.0 {
                return "Error: cannot take the modulo by zero".to_string();
            }
            // floored modulo: the result takes the sign of the divisor
            let r = a - b * (a / b).floor();
            format!("{} % {} = {}", a, b, r)
        }
    }
}

fn root(a: f64, b: f64) -> String {
    if b == 0.0 {
        return "Error: the root index cannot be zero".to_string();
    }
    let integral = b.fract() == 0.0;
    if a < 0.0 && integral && b % 2.0 == 0.0 {
        return "Error: cannot take an even root of a negative number".to_string();
    }
    let value = if a < 0.0 && integral {
        // odd root of a negative number stays real
        -(-a).powf(1.0 / b)
    } else {
        a.powf(1.0 / b)
    };
    if value.is_nan() {
        return format!("Error: root {} of {} is not a real number", b, a);
    }
    format!("Root {} of {} = {}", b, a, value)
}

/// `calculator` tool
pub struct CalculatorTool;

impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Performs basic math operations: sum, subtract, multiply, divide, power, root and modulo of two numbers"
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "enum": Operation::ALL.iter().map(|op| op.name()).collect::<Vec<_>>(),
                    "description": "The operation to apply"
                },
                "a": {
                    "type": "number",
                    "description": "First operand (the radicand for root)"
                },
                "b": {
                    "type": "number",
                    "description": "Second operand (the root index for root)"
                }
            },
            "required": ["operation", "a", "b"]
        })
    }

    fn call<'a>(&'a self, args: &'a Value) -> BoxFuture<'a, String> {
        Box::pin(async move {
            let parsed = arg_str(args, "operation").and_then(|op| {
                Ok((op, arg_f64(args, "a")?, arg_f64(args, "b")?))
            });
            match parsed {
                Ok((op, a, b)) => calculate(op, a, b),
                Err(e) => format!("Calculator error: {}", e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        assert_eq!(calculate("suma", 2.0, 3.0), "2 + 3 = 5");
        assert_eq!(calculate("SUM", 2.5, 0.25), "2.5 + 0.25 = 2.75");
        assert_eq!(calculate("subtract", 2.0, 3.0), "2 - 3 = -1");
        assert_eq!(calculate("Multiply", 23.5, 17.8), format!("23.5 * 17.8 = {}", 23.5 * 17.8));
        assert_eq!(calculate("division", 9.0, 2.0), "9 / 2 = 4.5");
        assert_eq!(calculate("potencia", 15.0, 2.0), "15 ^ 2 = 225");
        assert_eq!(calculate("raiz", 8.0, 3.0), "Root 3 of 8 = 2");
        assert_eq!(calculate("resto", 7.0, 3.0), "7 % 3 = 1");
    }

    #[test]
    fn test_division_by_zero() {
        let out = calculate("division", 5.0, 0.0);
        assert!(out.starts_with("Error"));
        assert!(out.contains("divide by zero"));
        assert!(!out.contains('='));
    }

    #[test]
    fn test_even_root_of_negative() {
        let out = calculate("raiz", -4.0, 2.0);
        assert!(out.starts_with("Error"));
        assert!(out.contains("even root"));
    }

    #[test]
    fn test_odd_root_of_negative() {
        assert_eq!(calculate("root", -8.0, 3.0), "Root 3 of -8 = -2");
    }

    #[test]
    fn test_unknown_operation_lists_valid_ones() {
        let out = calculate("desconocida", 1.0, 1.0);
        assert!(out.contains("'desconocida' not recognized"));
        for op in Operation::ALL {
            assert!(out.contains(op.name()));
        }
    }

    #[test]
    fn test_modulo_follows_divisor_sign() {
        assert_eq!(calculate("modulo", -7.0, 3.0), "-7 % 3 = 2");
        assert!(calculate("modulo", 1.0, 0.0).starts_with("Error"));
    }

    #[tokio::test]
    async fn test_tool_reports_bad_arguments() {
        let out = CalculatorTool
            .call(&serde_json::json!({"operation": "sum", "a": 1}))
            .await;
        assert_eq!(out, "Calculator error: missing argument 'b'");

        let out = CalculatorTool
            .call(&serde_json::json!({"operation": "multiply", "a": "4", "b": 2.5}))
            .await;
        assert_eq!(out, "4 * 2.5 = 10");
    }
}
