//! Test-only assertion helpers (component A4).
//!
//! Inlined from the teacher's `slumber_util::test_util` macros verbatim in
//! shape (`assert_err!`, `assert_matches!`) since this crate has no
//! workspace-mate crate to share them from — `slumber` puts these in a
//! small shared `util` crate; here they just live next to the code they
//! test.

/// Assert a result is the `Err` variant, and the stringified error contains
/// the given message.
#[macro_export]
macro_rules! assert_err {
    ($e:expr, $msg:expr) => {{
        let msg = $msg;
        let error: anyhow::Error = $e.unwrap_err().into();
        let actual = error.to_string();
        assert!(actual.contains(msg), "expected error message to contain {msg:?}, but was: {actual:?}");
    }};
}

/// Assert the given expression matches a pattern and optional condition.
/// Additionally, evaluate an expression using the bound pattern.
#[macro_export]
macro_rules! assert_matches {
    ($expr:expr, $pattern:pat $(if $condition:expr)? $(,)?) => {
        $crate::assert_matches!($expr, $pattern $(if $condition)? => ());
    };
    ($expr:expr, $pattern:pat $(if $condition:expr)? => $output:expr $(,)?) => {
        match $expr {
            $(value @ $pattern if !$condition => {
                panic!(
                    "value {value:?} does not match condition {condition}",
                    condition = stringify!($condition),
                );
            })?
            #[allow(unused_variables)]
            $pattern => $output,
            value => panic!(
                "unexpected value {value:?} does not match pattern {expected}",
                expected = stringify!($pattern),
            ),
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::error::ValueError;

    #[test]
    fn test_assert_err_checks_message_substring() {
        let result: Result<(), ValueError> = Err(ValueError::DivisionByZero);
        crate::assert_err!(result, "division by zero");
    }

    #[test]
    fn test_assert_matches_extracts_bound_value() {
        let value = ValueError::ArrayIndexOutOfBounds { index: 5, len: 2 };
        let index = crate::assert_matches!(value, ValueError::ArrayIndexOutOfBounds { index, .. } => index);
        assert_eq!(index, 5);
    }
}
