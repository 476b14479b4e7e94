//! The decision wheel: picks one incomplete task at random and reveals it
//! after the spin animation has had time to play.

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::sequence::PhaseSequence;
use crate::task::Task;

pub const DEFAULT_REVEAL_MS: i64 = 3_000;
const MIN_SPIN_DEGREES: u32 = 1_440;
const MAX_SPIN_DEGREES: u32 = 2_160;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SpinRejected {
    #[error("All tasks completed! You've finished everything. Time to celebrate! 🌟")]
    NoIncompleteTasks,
    #[error("the wheel is already spinning")]
    AlreadySpinning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WheelPhase {
    Reveal,
}

#[derive(Debug, Clone)]
pub struct DecisionWheel {
    reveal_ms: i64,
    rotation: u64,
    pending: Option<(Task, PhaseSequence<WheelPhase>)>,
    selected: Option<Task>,
}

impl Default for DecisionWheel {
    fn default() -> Self {
        Self::new(DEFAULT_REVEAL_MS)
    }
}

impl DecisionWheel {
    pub fn new(reveal_ms: i64) -> Self {
        Self {
            reveal_ms: reveal_ms.max(0),
            rotation: 0,
            pending: None,
            selected: None,
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.pending.is_some()
    }

    /// Accumulated rotation in degrees.
    pub fn rotation(&self) -> u64 {
        self.rotation
    }

    pub fn selected(&self) -> Option<&Task> {
        self.selected.as_ref()
    }

    pub fn reveal_due_at(&self) -> Option<DateTime<Utc>> {
        self.pending.as_ref().and_then(|(_, seq)| seq.next_due_at())
    }

    /// Picks the winner now; it stays hidden until [`DecisionWheel::poll`]
    /// observes the reveal delay has passed.
    #[instrument(skip(self, tasks, now, rng))]
    pub fn spin<R: Rng + ?Sized>(
        &mut self,
        tasks: &[Task],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<(), SpinRejected> {
        if self.is_spinning() {
            debug!("spin rejected; already spinning");
            return Err(SpinRejected::AlreadySpinning);
        }
        let candidates: Vec<&Task> = tasks.iter().filter(|task| !task.completed).collect();
        if candidates.is_empty() {
            debug!("spin rejected; nothing left to pick");
            return Err(SpinRejected::NoIncompleteTasks);
        }

        let index = rng.random_range(0..candidates.len());
        let spin = rng.random_range(MIN_SPIN_DEGREES..=MAX_SPIN_DEGREES);
        self.rotation += u64::from(spin);
        self.selected = None;
        info!(candidates = candidates.len(), degrees = spin, "wheel spinning");
        self.pending = Some((
            candidates[index].clone(),
            PhaseSequence::start(now, [(self.reveal_ms, WheelPhase::Reveal)]),
        ));
        Ok(())
    }

    /// Returns the chosen task once, at the first poll past the reveal time.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<Task> {
        let (_, sequence) = self.pending.as_mut()?;
        if sequence.poll(now).is_empty() {
            return None;
        }
        let (task, _) = self.pending.take()?;
        info!(task = %task.title, "wheel revealed");
        self.selected = Some(task.clone());
        Some(task)
    }

    pub fn reset(&mut self) {
        self.rotation = 0;
        self.pending = None;
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::{DecisionWheel, SpinRejected};
    use crate::clock::{Clock, VirtualClock};
    use crate::task::seed_tasks;

    fn clock() -> VirtualClock {
        VirtualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 3, 12, 0, 0)
                .single()
                .expect("valid start"),
        )
    }

    #[test]
    fn reveals_only_incomplete_tasks_after_delay() {
        let tasks = seed_tasks();
        for seed in 0..32 {
            let clock = clock();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut wheel = DecisionWheel::default();
            wheel.spin(&tasks, clock.now(), &mut rng).expect("spin");
            assert!(wheel.is_spinning());

            clock.advance_ms(2_999);
            assert!(wheel.poll(clock.now()).is_none());
            clock.advance_ms(1);
            let picked = wheel.poll(clock.now()).expect("revealed");
            assert!(!picked.completed);
            assert!(!wheel.is_spinning());
            assert!((1_440..=2_160).contains(&wheel.rotation()));
            assert!(wheel.poll(clock.now()).is_none());
        }
    }

    #[test]
    fn refuses_when_everything_is_done() {
        let mut tasks = seed_tasks();
        for task in &mut tasks {
            task.completed = true;
        }
        let mut wheel = DecisionWheel::default();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            wheel.spin(&tasks, clock().now(), &mut rng),
            Err(SpinRejected::NoIncompleteTasks)
        );
        assert_eq!(wheel.rotation(), 0);
        assert!(!wheel.is_spinning());
    }

    #[test]
    fn busy_wheel_rejects_second_spin() {
        let tasks = seed_tasks();
        let clock = clock();
        let mut wheel = DecisionWheel::default();
        let mut rng = StdRng::seed_from_u64(11);
        wheel.spin(&tasks, clock.now(), &mut rng).expect("spin");
        let rotation = wheel.rotation();
        assert_eq!(
            wheel.spin(&tasks, clock.now(), &mut rng),
            Err(SpinRejected::AlreadySpinning)
        );
        assert_eq!(wheel.rotation(), rotation);
    }

    #[test]
    fn reset_clears_everything() {
        let tasks = seed_tasks();
        let clock = clock();
        let mut wheel = DecisionWheel::new(10);
        let mut rng = StdRng::seed_from_u64(5);
        wheel.spin(&tasks, clock.now(), &mut rng).expect("spin");
        clock.advance_ms(10);
        assert!(wheel.poll(clock.now()).is_some());
        assert!(wheel.selected().is_some());

        wheel.reset();
        assert_eq!(wheel.rotation(), 0);
        assert!(wheel.selected().is_none());
        assert!(!wheel.is_spinning());
    }
}
