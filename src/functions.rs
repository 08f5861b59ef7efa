//! Built-in host function registry (spec §4.7 `FunctionCall`, §1, §9).
//!
//! The spec names exactly one built-in, `now()`, and explicitly scopes
//! user-defined functions out (§1 Non-goals). The registry below is still
//! written as a small dispatch table rather than a single `if` so adding a
//! second built-in later is a one-line change, following the shape of the
//! teacher's `call_fn` dispatch in `functions.rs` (reduced here to
//! synchronous, argument-list calls instead of async keyword-argument
//! HCL functions, since this spec has no async surface and no
//! user-defined functions to marshal arguments into).

use crate::error::ValueError;
use crate::render_config::RenderConfig;
use crate::value::Value;

type BuiltinFn = fn(&[Value], &RenderConfig) -> Result<Value, ValueError>;

const BUILTINS: &[(&str, BuiltinFn)] = &[("now", now)];

/// Resolve and invoke a built-in by name. Unknown names surface as
/// [`ValueError::FunctionCallFailed`], matching spec §4.7.
pub fn call(name: &str, args: &[Value], config: &RenderConfig) -> Result<Value, ValueError> {
    for (candidate, f) in BUILTINS {
        if *candidate == name {
            return f(args, config);
        }
    }
    Err(ValueError::FunctionCallFailed { name: name.to_string() })
}

fn now(args: &[Value], config: &RenderConfig) -> Result<Value, ValueError> {
    if !args.is_empty() {
        return Err(ValueError::FunctionCallFailed { name: "now".to_string() });
    }
    let millis = config.clock.now_millis();
    Ok(Value::String(format_iso8601_utc(millis)))
}

/// Render Unix-epoch milliseconds as an ISO-8601 UTC timestamp with
/// millisecond precision (`YYYY-MM-DDTHH:MM:SS.mmmZ`). Spec §9 notes the
/// reference implementation computes this itself using proleptic
/// Gregorian rules (including the 400-year leap correction) rather than
/// calling into a calendar library, so this follows suit with Howard
/// Hinnant's `civil_from_days` algorithm instead of adding a chrono-style
/// dependency for a single call site.
fn format_iso8601_utc(millis: i64) -> String {
    let (days, ms_of_day) = {
        let days = millis.div_euclid(86_400_000);
        let rem = millis.rem_euclid(86_400_000);
        (days, rem)
    };
    let (year, month, day) = civil_from_days(days);
    let hour = ms_of_day / 3_600_000;
    let minute = (ms_of_day / 60_000) % 60;
    let second = (ms_of_day / 1_000) % 60;
    let ms = ms_of_day % 1_000;
    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}.{ms:03}Z")
}

/// Convert a day count relative to the Unix epoch (1970-01-01) into a
/// proleptic-Gregorian `(year, month, day)` triple. This is the standard
/// `civil_from_days` construction: shift to a March-based year so the
/// leap day falls at the end of the "year", then divide out 400-, 100-,
/// 4-, and 1-year blocks.
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468; // shift epoch to 0000-03-01
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64; // [0, 146096]
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let year = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32; // [1, 31]
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32; // [1, 12]
    let year = if month <= 2 { year + 1 } else { year };
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unix_epoch(0, "1970-01-01T00:00:00.000Z")]
    #[case::y2k(946_684_800_000, "2000-01-01T00:00:00.000Z")]
    #[case::leap_day_2000(951_782_400_000, "2000-02-29T00:00:00.000Z")]
    #[case::with_millis(1_234, "1970-01-01T00:00:01.234Z")]
    fn test_format_iso8601_utc(#[case] millis: i64, #[case] expected: &str) {
        assert_eq!(format_iso8601_utc(millis), expected);
    }

    #[test]
    fn test_now_uses_injected_clock() {
        let config = RenderConfig::identity().with_clock(std::sync::Arc::new(crate::render_config::TestClock(0)));
        let result = now(&[], &config).unwrap();
        assert_eq!(result, Value::String("1970-01-01T00:00:00.000Z".to_string()));
    }

    #[test]
    fn test_unknown_function_fails() {
        let config = RenderConfig::identity();
        let err = call("bogus", &[], &config).unwrap_err();
        assert_eq!(err, ValueError::FunctionCallFailed { name: "bogus".to_string() });
    }
}
