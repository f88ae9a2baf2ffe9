//! Time sources for sliding windows and day buckets.

use chrono::{Days, Local, NaiveDate};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Source of "now" for quota windows and of "today" for usage buckets.
///
/// Production code uses [`SystemClock`]. Tests use [`ManualClock`] to move
/// time forward without sleeping.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Monotonic now, used for window arithmetic.
    fn now(&self) -> Instant;

    /// Current calendar day on the process-local clock.
    fn today(&self) -> NaiveDate;
}

/// Wall clock backed by [`Instant::now`] and the local time zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Hand-driven clock.
///
/// Clones share the same elapsed time, so a test can keep one handle and
/// give another to the component under test.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use chrono::NaiveDate;
/// use tollgate_core::{Clock, ManualClock};
///
/// let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let clock = ManualClock::starting_on(start);
/// let before = clock.now();
///
/// clock.advance(Duration::from_secs(61));
/// assert_eq!(clock.now() - before, Duration::from_secs(61));
/// assert_eq!(clock.today(), start);
///
/// clock.advance(Duration::from_secs(86_400));
/// assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    origin_date: NaiveDate,
    elapsed: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Start a clock at the beginning of today.
    pub fn new() -> Self {
        Self::starting_on(Local::now().date_naive())
    }

    /// Start a clock at midnight of `date`.
    pub fn starting_on(date: NaiveDate) -> Self {
        Self {
            origin: Instant::now(),
            origin_date: date,
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(PoisonError::into_inner);
        *elapsed += by;
    }

    /// Time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn today(&self) -> NaiveDate {
        let days = self.elapsed().as_secs() / 86_400;
        self.origin_date
            .checked_add_days(Days::new(days))
            .unwrap_or(self.origin_date)
    }
}
