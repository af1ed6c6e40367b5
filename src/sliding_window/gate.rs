use std::{
    collections::VecDeque,
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use snafu::ensure;

use super::{
    InvalidConfiguration, WindowSettings, ZeroLimitSnafu, ZeroWindowSnafu, instant_now,
    internal_event::{RateGateDecision, RateGateDecisionData},
};

/// Sliding-window admission counter.
///
/// Records the instant of every granted acquisition and admits a new one only
/// while fewer than `limit` of those instants lie within the trailing
/// `window`. The window slides with every call instead of resetting on tick
/// boundaries, so no burst of `2 * limit` can straddle a bucket edge.
///
/// A `RateGate` is meant to be shared (usually behind an `Arc`) between all
/// callers that talk to the same downstream API.
pub struct RateGate {
    window: Duration,
    limit: usize,
    // Oldest first. Never longer than `limit`.
    ledger: Mutex<VecDeque<Instant>>,
    events: RateGateDecision,
}

impl RateGate {
    /// Creates a gate admitting at most `limit` operations per `window`.
    pub fn new(window: Duration, limit: usize) -> Result<Self, InvalidConfiguration> {
        ensure!(!window.is_zero(), ZeroWindowSnafu);
        ensure!(limit > 0, ZeroLimitSnafu);

        Ok(Self {
            window,
            limit,
            ledger: Mutex::new(VecDeque::with_capacity(limit)),
            events: RateGateDecision::register(),
        })
    }

    pub fn from_settings(settings: &WindowSettings) -> Result<Self, InvalidConfiguration> {
        Self::new(settings.unit().as_duration(), settings.limit())
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Asks whether one more operation may proceed right now, and records it if so.
    ///
    /// Entries at least one full window old are evicted first; an entry exactly
    /// `window` old counts as expired. Denial leaves the ledger untouched and
    /// never waits.
    pub fn try_acquire(&self) -> bool {
        let mut ledger = self.lock_ledger();
        // Read under the lock so the ledger stays ordered across threads.
        let now = instant_now();

        while ledger
            .front()
            .is_some_and(|&entry| now.saturating_duration_since(entry) >= self.window)
        {
            ledger.pop_front();
        }

        let granted = ledger.len() < self.limit;
        if granted {
            ledger.push_back(now);
        }
        let in_window = ledger.len();
        drop(ledger);

        self.events.emit(RateGateDecisionData {
            granted,
            in_window,
            limit: self.limit,
        });
        granted
    }

    /// Number of granted operations still inside the trailing window.
    pub fn in_window(&self) -> usize {
        let ledger = self.lock_ledger();
        let now = instant_now();
        ledger
            .iter()
            .filter(|&&entry| now.saturating_duration_since(entry) < self.window)
            .count()
    }

    fn lock_ledger(&self) -> MutexGuard<'_, VecDeque<Instant>> {
        // Every mutation is a single push or pop, so a poisoned ledger is still consistent.
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for RateGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateGate")
            .field("window", &self.window)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}
