use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};

/// Source of "now" for every time-driven piece of the app.
///
/// Timers, the wheel reveal and the splash sequence never read the system
/// clock directly; they are handed a `Clock` so tests can drive them with a
/// [`VirtualClock`].
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Blocks until `by` has passed on this clock.
    fn sleep(&self, by: Duration) {
        if let Ok(by) = by.to_std() {
            std::thread::sleep(by);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct VirtualClock {
    now: Cell<DateTime<Utc>>,
}

impl VirtualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: i64) {
        self.advance(Duration::milliseconds(ms));
    }

    pub fn set(&self, to: DateTime<Utc>) {
        self.now.set(to);
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn sleep(&self, by: Duration) {
        self.advance(by);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn sleep(&self, by: Duration) {
        (**self).sleep(by);
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn sleep(&self, by: Duration) {
        (**self).sleep(by);
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn sleep(&self, by: Duration) {
        (**self).sleep(by);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{Clock, VirtualClock};

    #[test]
    fn virtual_clock_only_moves_when_advanced() {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
            .single()
            .expect("valid start");
        let clock = VirtualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance_ms(1_500);
        assert_eq!((clock.now() - start).num_milliseconds(), 1_500);

        clock.sleep(chrono::Duration::seconds(2));
        assert_eq!((clock.now() - start).num_milliseconds(), 3_500);
    }
}
