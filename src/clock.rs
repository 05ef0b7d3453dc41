use std::time::{Duration, Instant};

use crate::race::RaceError;

/// Every race lasts at most one minute.
pub const RACE_TIME_LIMIT: Duration = Duration::from_secs(60);

/// Tracks when a race started and whether a given elapsed time is past its limit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaceClock {
    started_at: Instant,
    limit: Duration,
}

impl RaceClock {
    pub fn new(started_at: Instant, limit: Duration) -> Self {
        Self { started_at, limit }
    }

    /// Clock with the fixed race limit, starting now.
    pub fn start_now() -> Self {
        Self::new(Instant::now(), RACE_TIME_LIMIT)
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Returns true once `seconds` since the start reaches the limit.
    pub fn passes_end_time(&self, seconds: f64) -> Result<bool, RaceError> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(RaceError::InvalidSeconds(seconds));
        }

        Ok(seconds >= self.limit.as_secs_f64())
    }

    /// Instant at which the race runs out of time.
    pub fn deadline(&self) -> Instant {
        self.started_at + self.limit
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.elapsed())
    }
}
