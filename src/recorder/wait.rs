use std::cell::Cell;

/// Offset subtracted from the previous statement time before bucketing.
pub const TIME_ADJUSTMENT_MILLIS: i64 = 3000;
/// Bucket width for replay waits.
pub const MINIMUM_WAIT_MILLIS: i64 = 5000;

/// Wall-clock source in epoch milliseconds.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<i64>,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.set(now);
    }

    pub fn advance(&self, millis: i64) {
        self.now.set(self.now.get() + millis);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.get()
    }
}

/// Quantizes the time since the previous statement into replay waits.
#[derive(Debug, Default, Clone)]
pub struct WaitBucketer {
    /// 0 means no statement has been timed yet.
    last_statement_time: i64,
}

impl WaitBucketer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts timing from `start_time`, e.g. when ZAP launched the browser.
    pub fn seed(&mut self, start_time: i64) {
        self.last_statement_time = start_time;
    }

    pub fn last_statement_time(&self) -> i64 {
        self.last_statement_time
    }

    /// `ceil((now - (last - 3000)) / 5000) * 5000`, then `last = now`.
    pub fn waited(&mut self, now: i64) -> u64 {
        if self.last_statement_time == 0 {
            self.last_statement_time = now;
        }
        let elapsed = now - (self.last_statement_time - TIME_ADJUSTMENT_MILLIS);
        let buckets = (elapsed + MINIMUM_WAIT_MILLIS - 1).div_euclid(MINIMUM_WAIT_MILLIS);
        self.last_statement_time = now;
        (buckets * MINIMUM_WAIT_MILLIS).max(0) as u64
    }
}
