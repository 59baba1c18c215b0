use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(1);

/// Detector replies per second, published once per one-second window.
#[derive(Debug, Default)]
pub struct ReplyRateCounter {
    window_start: Option<Instant>,
    count: u32,
    per_second: u32,
}

impl ReplyRateCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, now: Instant) {
        let start = *self.window_start.get_or_insert(now);
        self.count += 1;
        if now.saturating_duration_since(start) >= WINDOW {
            self.per_second = self.count;
            self.count = 0;
            self.window_start = Some(now);
        }
    }

    pub fn per_second(&self) -> u32 {
        self.per_second
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
