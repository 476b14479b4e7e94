//! Preset-driven work/break countdown.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::datetime::format_countdown;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Work,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTemplate {
    pub kind: SessionKind,
    pub duration_secs: u32,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    pub sessions: &'static [SessionTemplate],
}

const fn work(minutes: u32, label: &'static str) -> SessionTemplate {
    SessionTemplate {
        kind: SessionKind::Work,
        duration_secs: minutes * 60,
        label,
    }
}

const fn rest(minutes: u32, label: &'static str) -> SessionTemplate {
    SessionTemplate {
        kind: SessionKind::Break,
        duration_secs: minutes * 60,
        label,
    }
}

pub const PRESETS: &[FocusPreset] = &[
    FocusPreset {
        id: "pomodoro",
        name: "Pomodoro Technique",
        emoji: "🍅",
        description: "25 min work, 5 min break",
        sessions: &[work(25, "Focus Time"), rest(5, "Short Break")],
    },
    FocusPreset {
        id: "deep-work",
        name: "Deep Work",
        emoji: "🧠",
        description: "45 min work, 15 min break",
        sessions: &[work(45, "Deep Focus"), rest(15, "Rest Break")],
    },
    FocusPreset {
        id: "adhd-friendly",
        name: "ADHD Friendly",
        emoji: "⚡",
        description: "15 min work, 5 min break",
        sessions: &[work(15, "Quick Focus"), rest(5, "Brain Break")],
    },
    FocusPreset {
        id: "micro-session",
        name: "Micro Session",
        emoji: "⏱️",
        description: "10 min work, 2 min break",
        sessions: &[work(10, "Micro Focus"), rest(2, "Quick Break")],
    },
];

pub fn find_preset(id_or_name: &str) -> Option<&'static FocusPreset> {
    let needle = id_or_name.trim().to_ascii_lowercase();
    PRESETS
        .iter()
        .find(|preset| preset.id == needle || preset.name.to_ascii_lowercase() == needle)
}

/// Preset matching an onboarding `focus_length` answer.
pub fn preset_for_focus_length(answer: &str) -> Option<&'static FocusPreset> {
    let id = match answer {
        "About 10 minutes" => "micro-session",
        "About 15 minutes" => "adhd-friendly",
        "About 25 minutes" => "pomodoro",
        "45 minutes or more" => "deep-work",
        _ => return None,
    };
    find_preset(id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    SessionComplete,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Counted,
    SessionFinished {
        finished: SessionTemplate,
        next: SessionTemplate,
    },
}

#[derive(Debug, Clone)]
pub struct FocusTimer {
    preset: &'static FocusPreset,
    state: TimerState,
    session_index: usize,
    remaining_secs: u32,
    completed_sessions: u32,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(&PRESETS[0])
    }
}

impl FocusTimer {
    pub fn new(preset: &'static FocusPreset) -> Self {
        Self {
            preset,
            state: TimerState::Idle,
            session_index: 0,
            remaining_secs: preset.sessions[0].duration_secs,
            completed_sessions: 0,
        }
    }

    pub fn preset(&self) -> &'static FocusPreset {
        self.preset
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn session_index(&self) -> usize {
        self.session_index
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    pub fn current_session(&self) -> SessionTemplate {
        self.preset.sessions[self.session_index % self.preset.sessions.len()]
    }

    pub fn display(&self) -> String {
        format_countdown(self.remaining_secs)
    }

    pub fn progress_percent(&self) -> f64 {
        let total = self.current_session().duration_secs;
        if total == 0 {
            return 100.0;
        }
        f64::from(total - self.remaining_secs.min(total)) / f64::from(total) * 100.0
    }

    /// Switches preset and starts over from its first session.
    #[instrument(skip(self, preset), fields(preset = preset.id))]
    pub fn select_preset(&mut self, preset: &'static FocusPreset) {
        info!("focus preset selected");
        *self = Self::new(preset);
    }

    /// Starts or resumes the countdown. Returns whether anything changed.
    pub fn start(&mut self) -> bool {
        match self.state {
            TimerState::Running => false,
            TimerState::Idle | TimerState::Paused | TimerState::SessionComplete => {
                debug!(session = self.session_index, remaining = self.remaining_secs, "focus timer running");
                self.state = TimerState::Running;
                true
            }
        }
    }

    pub fn pause(&mut self) -> bool {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
            true
        } else {
            false
        }
    }

    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.session_index = 0;
        self.completed_sessions = 0;
        self.remaining_secs = self.preset.sessions[0].duration_secs;
    }

    /// One second elapsed.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != TimerState::Running {
            return TickOutcome::Ignored;
        }
        if self.remaining_secs > 1 {
            self.remaining_secs -= 1;
            return TickOutcome::Counted;
        }

        let finished = self.current_session();
        self.completed_sessions += 1;
        self.session_index = (self.session_index + 1) % self.preset.sessions.len();
        let next = self.current_session();
        self.remaining_secs = next.duration_secs;
        self.state = TimerState::SessionComplete;
        info!(
            completed = self.completed_sessions,
            finished = finished.label,
            next = next.label,
            "focus session finished"
        );
        TickOutcome::SessionFinished { finished, next }
    }

    /// Applies up to `seconds` ticks, stopping early when a session ends.
    pub fn advance(&mut self, seconds: u32) -> TickOutcome {
        let mut last = TickOutcome::Ignored;
        for _ in 0..seconds {
            last = self.tick();
            match last {
                TickOutcome::Counted => {}
                TickOutcome::Ignored | TickOutcome::SessionFinished { .. } => break,
            }
        }
        last
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FocusTimer, PRESETS, SessionKind, TickOutcome, TimerState, find_preset,
        preset_for_focus_length,
    };

    #[test]
    fn adhd_friendly_rolls_into_break_after_fifteen_minutes() {
        let preset = find_preset("ADHD Friendly").expect("preset");
        let mut timer = FocusTimer::new(preset);
        assert_eq!(timer.display(), "15:00");

        assert!(timer.start());
        let outcome = timer.advance(900);
        assert!(matches!(outcome, TickOutcome::SessionFinished { .. }));
        assert_eq!(timer.completed_sessions(), 1);
        assert_eq!(timer.current_session().kind, SessionKind::Break);
        assert_eq!(timer.display(), "05:00");
        assert_eq!(timer.state(), TimerState::SessionComplete);
    }

    #[test]
    fn finished_session_waits_for_explicit_resume() {
        let mut timer = FocusTimer::new(&PRESETS[3]);
        timer.start();
        timer.advance(600);
        assert_eq!(timer.tick(), TickOutcome::Ignored);
        assert_eq!(timer.remaining_secs(), 120);

        timer.start();
        assert_eq!(timer.tick(), TickOutcome::Counted);
        assert_eq!(timer.remaining_secs(), 119);
    }

    #[test]
    fn cycle_wraps_after_last_template() {
        let mut timer = FocusTimer::new(&PRESETS[0]);
        for expected_index in [1, 0, 1] {
            timer.start();
            let duration = timer.current_session().duration_secs;
            timer.advance(duration);
            assert_eq!(timer.session_index(), expected_index);
        }
        assert_eq!(timer.completed_sessions(), 3);
        assert_eq!(timer.current_session().kind, SessionKind::Break);
    }

    #[test]
    fn pause_freezes_the_countdown() {
        let mut timer = FocusTimer::default();
        timer.start();
        timer.advance(10);
        assert!(timer.pause());
        assert_eq!(timer.advance(30), TickOutcome::Ignored);
        assert_eq!(timer.remaining_secs(), 25 * 60 - 10);
        assert!(!timer.pause());
    }

    #[test]
    fn reset_returns_to_first_template_from_any_state() {
        let mut timer = FocusTimer::new(&PRESETS[1]);
        timer.start();
        timer.advance(45 * 60);
        timer.start();
        timer.advance(42);
        timer.reset();
        assert_eq!(timer.session_index(), 0);
        assert_eq!(timer.completed_sessions(), 0);
        assert_eq!(timer.remaining_secs(), 45 * 60);
        assert_eq!(timer.state(), TimerState::Idle);
    }

    #[test]
    fn selecting_preset_reconfigures_first_session() {
        let mut timer = FocusTimer::default();
        timer.select_preset(find_preset("micro-session").expect("preset"));
        assert_eq!(timer.display(), "10:00");
        assert_eq!(timer.progress_percent(), 0.0);
    }

    #[test]
    fn onboarding_answer_maps_to_preset() {
        let preset = preset_for_focus_length("About 15 minutes").expect("preset");
        assert_eq!(preset.id, "adhd-friendly");
        assert!(preset_for_focus_length("whenever").is_none());
    }
}
