use std::time::{Duration, Instant};

/// Scoped wall-clock timer. Logs the elapsed time at `info` level when dropped.
#[derive(Debug)]
pub struct LogDuration {
    id: String,
    start: Instant,
}

impl LogDuration {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start: Instant::now(),
        }
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for LogDuration {
    fn drop(&mut self) {
        log::info!("{}: {} ms", self.id, self.start.elapsed().as_millis());
    }
}
