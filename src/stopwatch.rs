use std::time::{Duration, Instant};

pub struct Stopwatch {
    started: Instant,
    elapsed: Option<Duration>,
}

impl Stopwatch {
    pub fn start() -> Self {
        Stopwatch {
            started: Instant::now(),
            elapsed: None,
        }
    }

    /// Freezes the reading; later calls keep the first value.
    pub fn stop(&mut self) -> Duration {
        let started = self.started;
        *self.elapsed.get_or_insert_with(|| started.elapsed())
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.unwrap_or_else(|| self.started.elapsed())
    }

    pub fn elapsed_ms(&self) -> f64 {
        millis(self.elapsed())
    }
}

pub fn millis(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1e6
}

#[test]
fn test_millis() {
    assert_eq!(millis(Duration::from_micros(1500)), 1.5);
    assert_eq!(millis(Duration::from_nanos(1)), 1e-6);
    assert_eq!(millis(Duration::from_secs(2)), 2000.0);
}

#[test]
fn test_stop_freezes_reading() {
    let mut watch = Stopwatch::start();
    let first = watch.stop();
    std::thread::sleep(Duration::from_millis(2));
    assert_eq!(watch.stop(), first);
    assert_eq!(watch.elapsed(), first);
}
