//! Start-up splash: logo, a progress bar and a short carousel of
//! encouraging messages.

use chrono::{DateTime, Utc};

use crate::sequence::PhaseSequence;

pub const MESSAGES: &[&str] = &[
    "Your unique brain is amazing! 🧠",
    "Different minds, incredible results! ✨",
    "Ready to conquer your day? 🎯",
    "You've got this, champion! ⚡",
    "Built with love for neurodivergent minds 💜",
];

const LOGO_AT_MS: i64 = 200;
const PROGRESS_AT_MS: i64 = 800;
const PROGRESS_STEP_MS: i64 = 30;
const PROGRESS_STEP: i64 = 2;
const FIRST_MESSAGE_AT_MS: i64 = 1_200;
const MESSAGE_EVERY_MS: i64 = 1_000;
const COMPLETE_AFTER_WRAP_MS: i64 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingPhase {
    ShowLogo,
    ProgressStarted,
    ShowMessage,
    Message(usize),
    Complete,
}

#[derive(Debug, Clone)]
pub struct LoadingAnimation {
    sequence: PhaseSequence<LoadingPhase>,
    logo_visible: bool,
    message_visible: bool,
    message_index: usize,
    complete: bool,
}

impl LoadingAnimation {
    pub fn start(now: DateTime<Utc>) -> Self {
        let count = MESSAGES.len() as i64;
        let mut phases = vec![
            (LOGO_AT_MS, LoadingPhase::ShowLogo),
            (PROGRESS_AT_MS, LoadingPhase::ProgressStarted),
            (FIRST_MESSAGE_AT_MS, LoadingPhase::ShowMessage),
        ];
        for step in 1..=count {
            let index = (step % count) as usize;
            phases.push((step * MESSAGE_EVERY_MS, LoadingPhase::Message(index)));
        }
        phases.push((
            count * MESSAGE_EVERY_MS + COMPLETE_AFTER_WRAP_MS,
            LoadingPhase::Complete,
        ));

        Self {
            sequence: PhaseSequence::start(now, phases),
            logo_visible: false,
            message_visible: false,
            message_index: 0,
            complete: false,
        }
    }

    /// Applies every phase due by `now` and returns them.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<LoadingPhase> {
        let due = self.sequence.poll(now);
        for phase in &due {
            match phase {
                LoadingPhase::ShowLogo => self.logo_visible = true,
                LoadingPhase::ProgressStarted => {}
                LoadingPhase::ShowMessage => self.message_visible = true,
                LoadingPhase::Message(index) => self.message_index = *index,
                LoadingPhase::Complete => self.complete = true,
            }
        }
        due
    }

    pub fn progress(&self, now: DateTime<Utc>) -> u8 {
        let since_start = self.sequence.elapsed_ms(now) - PROGRESS_AT_MS;
        if since_start < PROGRESS_STEP_MS {
            return 0;
        }
        ((since_start / PROGRESS_STEP_MS) * PROGRESS_STEP).min(100) as u8
    }

    pub fn next_due_at(&self) -> Option<DateTime<Utc>> {
        self.sequence.next_due_at()
    }

    pub fn logo_visible(&self) -> bool {
        self.logo_visible
    }

    pub fn message(&self) -> Option<&'static str> {
        self.message_visible.then(|| MESSAGES[self.message_index])
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{LoadingAnimation, LoadingPhase, MESSAGES};
    use crate::clock::{Clock, VirtualClock};

    fn clock() -> VirtualClock {
        VirtualClock::new(
            Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0)
                .single()
                .expect("valid start"),
        )
    }

    #[test]
    fn runs_phases_on_schedule() {
        let clock = clock();
        let mut splash = LoadingAnimation::start(clock.now());

        clock.advance_ms(199);
        assert!(splash.tick(clock.now()).is_empty());
        clock.advance_ms(1);
        assert_eq!(splash.tick(clock.now()), vec![LoadingPhase::ShowLogo]);
        assert!(splash.logo_visible());
        assert_eq!(splash.message(), None);

        clock.advance_ms(1_000);
        let due = splash.tick(clock.now());
        assert_eq!(
            due,
            vec![
                LoadingPhase::ProgressStarted,
                LoadingPhase::Message(1),
                LoadingPhase::ShowMessage
            ]
        );
        assert_eq!(splash.message(), Some(MESSAGES[1]));
    }

    #[test]
    fn completes_after_the_carousel_wraps() {
        let clock = clock();
        let mut splash = LoadingAnimation::start(clock.now());

        clock.advance_ms(5_799);
        splash.tick(clock.now());
        assert!(!splash.is_complete());
        assert_eq!(splash.message(), Some(MESSAGES[0]));

        clock.advance_ms(1);
        assert_eq!(splash.tick(clock.now()), vec![LoadingPhase::Complete]);
        assert!(splash.is_complete());
        assert_eq!(splash.next_due_at(), None);
    }

    #[test]
    fn progress_climbs_two_percent_every_thirty_ms() {
        let clock = clock();
        let splash = LoadingAnimation::start(clock.now());
        clock.advance_ms(800);
        assert_eq!(splash.progress(clock.now()), 0);
        clock.advance_ms(30);
        assert_eq!(splash.progress(clock.now()), 2);
        clock.advance_ms(300);
        assert_eq!(splash.progress(clock.now()), 22);
        clock.advance_ms(10_000);
        assert_eq!(splash.progress(clock.now()), 100);
    }
}
