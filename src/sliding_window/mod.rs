//! Cap the number of operations admitted within a trailing time window.

mod gate;
pub mod future;
pub mod guard;
pub mod layer;
pub mod service;
pub mod submitter;

pub mod http;
pub mod internal_event;
pub mod reqwest_integration;

use std::time::Duration;

use bon::Builder;
use serde::Deserialize;
use snafu::Snafu;

pub use gate::RateGate;
pub use guard::RequestGuard;
pub use layer::RateGateLayer;
pub use service::RateGateService;
pub use submitter::{DocumentSubmitter, Outcome};

fn instant_now() -> std::time::Instant {
    tokio::time::Instant::now().into()
}

/// Granularity of the trailing window.
///
/// A gate configured with `TimeUnit::Seconds` and a limit of 3 admits at most
/// three operations in any interval of one second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub const fn as_duration(self) -> Duration {
        match self {
            TimeUnit::Nanoseconds => Duration::from_nanos(1),
            TimeUnit::Microseconds => Duration::from_micros(1),
            TimeUnit::Milliseconds => Duration::from_millis(1),
            TimeUnit::Seconds => Duration::from_secs(1),
            TimeUnit::Minutes => Duration::from_secs(60),
            TimeUnit::Hours => Duration::from_secs(60 * 60),
            TimeUnit::Days => Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl From<TimeUnit> for Duration {
    fn from(unit: TimeUnit) -> Self {
        unit.as_duration()
    }
}

/// Window policy of a [`RateGate`]: at most `limit` operations per `unit`.
///
/// The policy is fixed for the lifetime of the gate built from it.
///
/// # Example
///
/// ```rust
/// use request_gate::sliding_window::{RateGate, TimeUnit, WindowSettings};
///
/// let settings = WindowSettings::builder()
///     .unit(TimeUnit::Seconds)
///     .limit(3)
///     .build();
/// let gate = RateGate::from_settings(&settings).unwrap();
/// assert_eq!(gate.limit(), 3);
/// ```
///
/// Settings can also be read from JSON:
///
/// ```rust
/// use request_gate::sliding_window::{TimeUnit, WindowSettings};
///
/// let settings: WindowSettings =
///     serde_json::from_str(r#"{"unit": "minutes", "limit": 100}"#).unwrap();
/// assert_eq!(settings.unit(), TimeUnit::Minutes);
/// ```
#[derive(Clone, Copy, Debug, Builder, Deserialize)]
pub struct WindowSettings {
    /// Length of the trailing window.
    ///
    /// **Default**: `TimeUnit::Seconds`
    #[builder(default = TimeUnit::Seconds)]
    #[serde(default = "default_unit")]
    unit: TimeUnit,

    /// Maximum number of operations admitted within one window. Must be positive.
    limit: usize,
}

const fn default_unit() -> TimeUnit {
    TimeUnit::Seconds
}

impl WindowSettings {
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// Rejected window policy. No gate is produced.
#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum InvalidConfiguration {
    #[snafu(display("window length must be positive"))]
    ZeroWindow,

    #[snafu(display("limit must be positive, a limit of zero would never admit anything"))]
    ZeroLimit,
}

/// Result of asking for admission before doing rate-constrained work.
///
/// `RateLimited` is an expected outcome, not an error: nothing downstream was
/// called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission<T> {
    RateLimited,
    Admitted(T),
}

impl<T> Admission<T> {
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Admission::RateLimited)
    }

    pub fn admitted(self) -> Option<T> {
        match self {
            Admission::RateLimited => None,
            Admission::Admitted(value) => Some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_map_to_durations() {
        assert_eq!(TimeUnit::Milliseconds.as_duration(), Duration::from_millis(1));
        assert_eq!(TimeUnit::Seconds.as_duration(), Duration::from_secs(1));
        assert_eq!(Duration::from(TimeUnit::Hours), Duration::from_secs(3600));
        assert_eq!(TimeUnit::Days.as_duration(), Duration::from_secs(86_400));
    }

    #[test]
    fn settings_from_json_default_to_seconds() {
        let settings: WindowSettings = serde_json::from_str(r#"{"limit": 5}"#).unwrap();
        assert_eq!(settings.unit(), TimeUnit::Seconds);
        assert_eq!(settings.limit(), 5);
    }

    #[test]
    fn settings_reject_unknown_unit() {
        let parsed = serde_json::from_str::<WindowSettings>(r#"{"unit": "fortnights", "limit": 1}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn admission_accessors() {
        assert!(Admission::<u16>::RateLimited.is_rate_limited());
        assert_eq!(Admission::Admitted(201u16).admitted(), Some(201));
        assert_eq!(Admission::<u16>::RateLimited.admitted(), None);
    }
}
