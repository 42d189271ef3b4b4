use log::{debug, warn};
use std::time::{Duration, Instant};

/// Repository writes slower than this are reported as warnings.
pub const SLOW_WRITE: Duration = Duration::from_millis(500);

/// RAII timer around a unit of work such as loading a word set or
/// writing a reviewed word back. Logs the elapsed time when dropped:
/// at `debug` normally, at `warn` once it passes the slow threshold.
pub struct Tracer {
    name: &'static str,
    start_time: Instant,
    slow_after: Option<Duration>,
}

impl Tracer {
    pub fn new(name: &'static str) -> Self {
        Tracer {
            name,
            start_time: Instant::now(),
            slow_after: None,
        }
    }

    pub fn with_slow_threshold(name: &'static str, slow_after: Duration) -> Self {
        Tracer {
            name,
            start_time: Instant::now(),
            slow_after: Some(slow_after),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    fn is_slow(&self, elapsed: Duration) -> bool {
        self.slow_after.is_some_and(|limit| elapsed >= limit)
    }
}

impl Drop for Tracer {
    fn drop(&mut self) {
        let elapsed = self.elapsed();
        if self.is_slow(elapsed) {
            warn!("[Trace] {} was slow: {:.2?}", self.name, elapsed);
        } else {
            debug!("[Trace] {}: {:.2?}", self.name, elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slow_threshold() {
        let tracer = Tracer::with_slow_threshold("write", Duration::from_millis(10));
        assert!(!tracer.is_slow(Duration::from_millis(9)));
        assert!(tracer.is_slow(Duration::from_millis(10)));
        assert!(!Tracer::new("load").is_slow(Duration::from_secs(60)));
    }
}
