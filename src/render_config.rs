//! Host-injectable rendering policy (component A3).
//!
//! Spec §4.7/§9 calls out two behaviors the reference implementation hard-
//! codes but recommends making pluggable: the `Unfold` escape filter, and
//! the `now()` clock. [`RenderConfig`] bundles both as trait-object-backed
//! fields, mirroring the teacher's `Context` trait in `lib.rs` (host-
//! injected behavior passed in by the caller rather than read from a
//! global).

use std::fmt;
use std::sync::Arc;

/// A closure that filters the stringified result of `#{ ... }` before it's
/// inserted into the output. `RenderConfig::identity()` matches the
/// reference implementation's actual (non-escaping) default; a real
/// deployment is expected to supply something like
/// [`RenderConfig::html_escape`].
#[derive(Clone)]
pub struct EscapePolicy(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl EscapePolicy {
    pub fn new(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn apply(&self, s: &str) -> String {
        (self.0)(s)
    }
}

impl fmt::Debug for EscapePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EscapePolicy(..)")
    }
}

/// Supplies the current time to the `now()` built-in (spec §4.7, §9).
/// Evaluation is otherwise pure and deterministic; routing the clock
/// through a trait keeps it that way under test.
pub trait Clock: fmt::Debug {
    /// Milliseconds since the Unix epoch, UTC.
    fn now_millis(&self) -> i64;
}

/// Reads the real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Returns a fixed instant, for deterministic tests that exercise `now()`.
#[derive(Debug, Clone, Copy)]
pub struct TestClock(pub i64);

impl Clock for TestClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// Host-injected policy passed into [`crate::driver::ParseAnswer::get`].
#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub escape: EscapePolicy,
    pub clock: Arc<dyn Clock + Send + Sync>,
}

impl RenderConfig {
    /// The reference implementation's actual default: `Unfold` does not
    /// escape at all. Spec §9 explicitly flags this as something real
    /// deployments should override, not as behavior to silently "fix"
    /// here.
    pub fn identity() -> Self {
        Self { escape: EscapePolicy::new(|s| s.to_string()), clock: Arc::new(SystemClock) }
    }

    /// The "real deployment" example spec §9 recommends wiring up: HTML-
    /// escapes the five characters that matter for safe text-node
    /// insertion.
    pub fn html_escape() -> Self {
        Self { escape: EscapePolicy::new(html_escape), clock: Arc::new(SystemClock) }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::identity()
    }
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_does_not_escape() {
        let config = RenderConfig::identity();
        assert_eq!(config.escape.apply("<b>&'\""), "<b>&'\"");
    }

    #[test]
    fn test_html_escape() {
        let config = RenderConfig::html_escape();
        assert_eq!(config.escape.apply("<b>&'\""), "&lt;b&gt;&amp;&#39;&quot;");
    }

    #[test]
    fn test_test_clock_is_fixed() {
        let clock = TestClock(12345);
        assert_eq!(clock.now_millis(), 12345);
        assert_eq!(clock.now_millis(), 12345);
    }
}
