//! Typed-value algebra (component C8, spec §4.8).
//!
//! [`Value`] is the result of evaluating any [`Expression`](crate::expression::Expression).
//! Arithmetic, comparison, logical, string, and array operators are all
//! dispatched from [`binary_op`]/[`unary_op`]. A type mismatch on an
//! arithmetic operator (`-`/`*`/`/`) comes back as
//! [`ValueError::CalculationFailed`], on a logical operator (`and`/`or`/
//! `xor`) as [`ValueError::LogicalOperationFailed`]; anything else the
//! table in spec §4.8 doesn't list at all comes back as
//! [`ValueError::BinaryOperatorNotSupported`]/[`ValueError::UnaryOperatorNotSupported`].
//! Shaped after the teacher's `value.rs` (`Value` enum, coercion methods)
//! narrowed to the four variants spec §3 names — no `Null`, `Bytes`, or
//! `Object`.

use crate::error::ValueError;
use crate::token::WordKind;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// The smallest positive subnormal `f64`, i.e. `nextafter(0.0, 1.0)`. Spec
/// §4.8/§9: two numbers compare equal when their difference is at most this
/// tight tolerance — in practice "bit-equal after subtraction" rather than a
/// generous epsilon, which is a deliberate choice for deterministic template
/// output and is preserved here rather than loosened.
pub const NUMERIC_TOLERANCE: f64 = f64::from_bits(1);

/// A typed runtime value (spec §3). There is no null; arrays are flat,
/// value-owned, and freed along with the `Value` that holds them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    Array(Vec<Value>),
}

impl Value {
    /// Coerce to a string per spec §4.8 `to_string`: numbers use the
    /// shortest round-trip decimal form, bools their literal spelling,
    /// strings pass through unchanged, and arrays recurse with a `,`
    /// separator and `[`/`]` brackets.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Array(items) => format!("[{}]", items.iter().map(Value::to_display_string).join(",")),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::Array(_) => "array",
        }
    }
}

/// Format a number the way spec §4.8 requires: the shortest decimal string
/// that round-trips back to the same `f64`. Rust's `f64` `Display`
/// implementation already produces this (e.g. `30.0` formats as `"30"`,
/// `2.1` as `"2.1"`), so this is a thin named wrapper rather than a custom
/// formatter.
fn format_number(n: f64) -> String {
    n.to_string()
}

fn numeric_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= NUMERIC_TOLERANCE
}

fn numeric_lt(a: f64, b: f64) -> bool {
    a < b && (b - a) > NUMERIC_TOLERANCE
}

fn numeric_gt(a: f64, b: f64) -> bool {
    a > b && (a - b) > NUMERIC_TOLERANCE
}

/// Structural equality used by `==`/`<>` and by `{select}` case matching.
/// Only same-type comparisons are defined, matching the table in spec
/// §4.8: comparing across types (e.g. a number to a string) is an
/// unsupported operation, not a silent `false`.
pub fn values_equal(lhs: &Value, rhs: &Value) -> Result<bool, ValueError> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(numeric_eq(*a, *b)),
        (Value::String(a), Value::String(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::Array(a), Value::Array(b)) => {
            if a.len() != b.len() {
                return Ok(false);
            }
            for (x, y) in a.iter().zip(b.iter()) {
                if !values_equal(x, y)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Err(ValueError::BinaryOperatorNotSupported { op: WordKind::Equal }),
    }
}

/// Apply a binary operator to two already-evaluated operands (spec §4.8).
pub fn binary_op(op: WordKind, lhs: Value, rhs: Value) -> Result<Value, ValueError> {
    use WordKind::{
        And, Divide, Equal, Greater, GreaterEq, Less, LessEq, Minus, Multiply, NotEqual, Or, Plus, Xor,
    };

    match (op, lhs, rhs) {
        (Plus, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Plus, Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
        (Plus, Value::String(a), Value::Number(b)) => Ok(Value::String(a + &format_number(b))),
        (Minus, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
        (Multiply, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
        (Divide, Value::Number(_), Value::Number(b)) if b == 0.0 => Err(ValueError::DivisionByZero),
        (Divide, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),

        (Equal, a, b) => values_equal(&a, &b).map(Value::Bool),
        (NotEqual, a, b) => values_equal(&a, &b).map(|eq| Value::Bool(!eq)),

        (Less, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(numeric_lt(a, b))),
        (Greater, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(numeric_gt(a, b))),
        (LessEq, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(!numeric_gt(a, b))),
        (GreaterEq, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(!numeric_lt(a, b))),

        (Less, Value::String(a), Value::String(b)) => Ok(Value::Bool(a < b)),
        (Greater, Value::String(a), Value::String(b)) => Ok(Value::Bool(a > b)),
        (LessEq, Value::String(a), Value::String(b)) => Ok(Value::Bool(a <= b)),
        (GreaterEq, Value::String(a), Value::String(b)) => Ok(Value::Bool(a >= b)),

        (And, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a && b)),
        (Or, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a || b)),
        (Xor, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a ^ b)),

        // Arithmetic operator applied to a type the table above has no
        // entry for: distinct from "not an operator at all" below.
        (Minus | Multiply | Divide, _, _) => Err(ValueError::CalculationFailed),
        // Same distinction for the logical operators.
        (And | Or | Xor, _, _) => Err(ValueError::LogicalOperationFailed),

        (op, _, _) => Err(ValueError::BinaryOperatorNotSupported { op }),
    }
}

/// Apply a unary operator to an already-evaluated operand (spec §4.8).
pub fn unary_op(op: WordKind, value: Value) -> Result<Value, ValueError> {
    match (op, value) {
        (WordKind::Plus, Value::Number(n)) => Ok(Value::Number(n)),
        (WordKind::Minus, Value::Number(n)) => Ok(Value::Number(-n)),
        (WordKind::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (op, _) => Err(ValueError::UnaryOperatorNotSupported { op }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_to_display_string_number_has_no_trailing_zero() {
        assert_eq!(Value::Number(30.0).to_display_string(), "30");
        assert_eq!(Value::Number(2.1).to_display_string(), "2.1");
    }

    #[test]
    fn test_to_display_string_array_recurses() {
        let v = Value::Array(vec![Value::Number(1.0), Value::String("a".into()), Value::Bool(true)]);
        assert_eq!(v.to_display_string(), "[1,a,true]");
    }

    #[rstest]
    #[case::number(Value::Number(2.5))]
    #[case::string(Value::String("hi".into()))]
    #[case::bool(Value::Bool(true))]
    #[case::array(Value::Array(vec![Value::Number(1.0), Value::Bool(false)]))]
    fn test_value_round_trips_through_json(#[case] value: Value) {
        let json = serde_json::to_string(&value).unwrap();
        let decoded: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, value);
    }

    #[rstest]
    #[case::exactly_equal(1.0, 1.0, true)]
    #[case::within_tolerance(1.0, 1.0 + NUMERIC_TOLERANCE, true)]
    #[case::clearly_different(1.0, 1.1, false)]
    fn test_numeric_eq_tolerance(#[case] a: f64, #[case] b: f64, #[case] expected: bool) {
        assert_eq!(numeric_eq(a, b), expected);
    }

    #[test]
    fn test_comparison_trichotomy() {
        for (a, b) in [(1.0, 2.0), (2.0, 1.0), (3.0, 3.0), (-1.5, 1.5)] {
            let lt = numeric_lt(a, b);
            let gt = numeric_gt(a, b);
            let eq = numeric_eq(a, b);
            assert_eq!([lt, gt, eq].iter().filter(|x| **x).count(), 1, "trichotomy failed for {a} vs {b}");
        }
    }

    #[test]
    fn test_plus_string_number_concat() {
        let result = binary_op(WordKind::Plus, Value::String("x=".into()), Value::Number(5.0)).unwrap();
        assert_eq!(result, Value::String("x=5".into()));
    }

    #[test]
    fn test_plus_number_string_unsupported() {
        let err = binary_op(WordKind::Plus, Value::Number(5.0), Value::String("x".into())).unwrap_err();
        assert_eq!(err, ValueError::BinaryOperatorNotSupported { op: WordKind::Plus });
    }

    #[test]
    fn test_division_by_zero() {
        let err = binary_op(WordKind::Divide, Value::Number(1.0), Value::Number(0.0)).unwrap_err();
        assert_eq!(err, ValueError::DivisionByZero);
    }

    #[test]
    fn test_array_equality_false_on_length_mismatch() {
        let a = Value::Array(vec![Value::Number(1.0)]);
        let b = Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]);
        assert_eq!(values_equal(&a, &b).unwrap(), false);
    }

    #[test]
    fn test_cross_type_equality_unsupported() {
        let err = values_equal(&Value::Number(1.0), &Value::String("1".into())).unwrap_err();
        assert_eq!(err, ValueError::BinaryOperatorNotSupported { op: WordKind::Equal });
    }

    #[test]
    fn test_unary_not_supported_for_wrong_type() {
        let err = unary_op(WordKind::Not, Value::Number(1.0)).unwrap_err();
        assert_eq!(err, ValueError::UnaryOperatorNotSupported { op: WordKind::Not });
    }

    #[rstest]
    #[case::minus(WordKind::Minus)]
    #[case::multiply(WordKind::Multiply)]
    #[case::divide(WordKind::Divide)]
    fn test_arithmetic_on_non_numbers_is_calculation_failed(#[case] op: WordKind) {
        let err = binary_op(op, Value::String("x".into()), Value::String("y".into())).unwrap_err();
        assert_eq!(err, ValueError::CalculationFailed);
    }

    #[rstest]
    #[case::and(WordKind::And)]
    #[case::or(WordKind::Or)]
    #[case::xor(WordKind::Xor)]
    fn test_logical_op_on_non_bools_is_logical_operation_failed(#[case] op: WordKind) {
        let err = binary_op(op, Value::Number(1.0), Value::Number(0.0)).unwrap_err();
        assert_eq!(err, ValueError::LogicalOperationFailed);
    }

    proptest::proptest! {
        /// Spec §8 invariant 5: a number's `to_string` form round-trips back
        /// to the same `f64` when re-parsed.
        #[test]
        fn test_number_display_round_trips(n in proptest::num::f64::NORMAL) {
            let displayed = Value::Number(n).to_display_string();
            let parsed: f64 = displayed.parse().unwrap();
            proptest::prop_assert!(numeric_eq(n, parsed));
        }

        /// `values_equal` on numbers is reflexive for any finite value,
        /// including ones close enough to collide under `NUMERIC_TOLERANCE`.
        #[test]
        fn test_numeric_eq_is_reflexive(n in proptest::num::f64::NORMAL) {
            proptest::prop_assert!(numeric_eq(n, n));
        }
    }
}
