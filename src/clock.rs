use chrono::Utc;

/// Source of wall-clock readings for the generator.
///
/// The generation path only ever asks for "milliseconds now"; keeping that
/// behind a trait lets the tests replay scripted clock behavior (regressions,
/// frozen milliseconds) deterministically.
pub(crate) trait Clock: Send + Sync {
    /// Current time as milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Reads the operating system clock through `chrono`.
pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
