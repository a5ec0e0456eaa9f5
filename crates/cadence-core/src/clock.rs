use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock backed by the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Hand-driven clock. Clones share the same instant, so a test can keep one
/// copy and advance time under an engine that owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    instant: Arc<Mutex<DateTime<Local>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            instant: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, instant: DateTime<Local>) {
        *self.lock() = instant;
    }

    pub fn advance(&self, delta: chrono::Duration) {
        let mut guard = self.lock();
        *guard += delta;
    }

    pub fn advance_seconds(&self, seconds: i64) {
        self.advance(chrono::Duration::seconds(seconds));
    }

    pub fn advance_millis(&self, millis: i64) {
        self.advance(chrono::Duration::milliseconds(millis));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Local>> {
        self.instant
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.lock()
    }
}

/// Time elapsed from `earlier` to `later`, clamped to zero when the wall clock
/// moved backwards.
pub fn elapsed_between(earlier: DateTime<Local>, later: DateTime<Local>) -> std::time::Duration {
    later
        .signed_duration_since(earlier)
        .to_std()
        .unwrap_or(std::time::Duration::ZERO)
}

/// `instant + delay`, saturating at `instant` when the sum is not representable.
pub fn deadline_after(instant: DateTime<Local>, delay: std::time::Duration) -> DateTime<Local> {
    chrono::Duration::from_std(delay)
        .ok()
        .and_then(|delta| instant.checked_add_signed(delta))
        .unwrap_or(instant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn nine_am() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(nine_am());
        let shared = clock.clone();

        clock.advance_seconds(90);

        assert_eq!(shared.now(), nine_am() + chrono::Duration::seconds(90));
    }

    #[test]
    fn elapsed_between_clamps_backward_jumps() {
        let later = nine_am();
        let earlier = later - chrono::Duration::seconds(30);

        assert_eq!(elapsed_between(earlier, later).as_secs(), 30);
        assert_eq!(elapsed_between(later, earlier), std::time::Duration::ZERO);
    }

    #[test]
    fn deadline_after_adds_std_duration() {
        let due = deadline_after(nine_am(), std::time::Duration::from_millis(1500));

        assert_eq!(due, nine_am() + chrono::Duration::milliseconds(1500));
    }
}
