//! Persisted user preferences.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::notify::DEFAULT_BREAK_INTERVAL_MINUTES;
use crate::storage::{LocalStorage, SETTINGS_KEY};

/// Intervals offered for break reminders.
pub const BREAK_INTERVAL_CHOICES: &[i64] = &[15, 30, 45, 60];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub sounds: bool,
    pub vibration: bool,
    pub gentle_reminders: bool,
    pub celebration_animations: bool,
    pub task_reminders: bool,
    pub daily_motivation: bool,
    pub break_reminders: bool,
    pub break_interval_minutes: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sounds: true,
            vibration: true,
            gentle_reminders: true,
            celebration_animations: true,
            task_reminders: true,
            daily_motivation: true,
            break_reminders: false,
            break_interval_minutes: DEFAULT_BREAK_INTERVAL_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Sounds,
    Vibration,
    GentleReminders,
    CelebrationAnimations,
    TaskReminders,
    DailyMotivation,
    BreakReminders,
}

pub const TOGGLES: &[Toggle] = &[
    Toggle::Sounds,
    Toggle::Vibration,
    Toggle::GentleReminders,
    Toggle::CelebrationAnimations,
    Toggle::TaskReminders,
    Toggle::DailyMotivation,
    Toggle::BreakReminders,
];

impl Toggle {
    pub fn key(&self) -> &'static str {
        match self {
            Toggle::Sounds => "sounds",
            Toggle::Vibration => "vibration",
            Toggle::GentleReminders => "gentle-reminders",
            Toggle::CelebrationAnimations => "celebrations",
            Toggle::TaskReminders => "task-reminders",
            Toggle::DailyMotivation => "motivation",
            Toggle::BreakReminders => "breaks",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Toggle::Sounds => "🔊 Sounds",
            Toggle::Vibration => "📳 Vibration",
            Toggle::GentleReminders => "🔔 Gentle Reminders",
            Toggle::CelebrationAnimations => "🎉 Celebration Animations",
            Toggle::TaskReminders => "⏰ Task Reminders",
            Toggle::DailyMotivation => "💫 Daily Motivation",
            Toggle::BreakReminders => "☕ Break Reminders",
        }
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Toggle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('_', "-");
        TOGGLES
            .iter()
            .copied()
            .find(|toggle| {
                toggle.key() == needle || (needle.len() >= 3 && toggle.key().starts_with(&needle))
            })
            .ok_or_else(|| anyhow!("unknown setting: {s}"))
    }
}

impl Settings {
    #[instrument(skip(storage))]
    pub fn load(storage: &LocalStorage) -> Self {
        storage.get_or(SETTINGS_KEY, Self::default())
    }

    pub fn save(&self, storage: &mut LocalStorage) -> anyhow::Result<()> {
        storage.set(SETTINGS_KEY, self)
    }

    pub fn get(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Sounds => self.sounds,
            Toggle::Vibration => self.vibration,
            Toggle::GentleReminders => self.gentle_reminders,
            Toggle::CelebrationAnimations => self.celebration_animations,
            Toggle::TaskReminders => self.task_reminders,
            Toggle::DailyMotivation => self.daily_motivation,
            Toggle::BreakReminders => self.break_reminders,
        }
    }

    /// Returns whether the value changed.
    pub fn set(&mut self, toggle: Toggle, value: bool) -> bool {
        let slot = match toggle {
            Toggle::Sounds => &mut self.sounds,
            Toggle::Vibration => &mut self.vibration,
            Toggle::GentleReminders => &mut self.gentle_reminders,
            Toggle::CelebrationAnimations => &mut self.celebration_animations,
            Toggle::TaskReminders => &mut self.task_reminders,
            Toggle::DailyMotivation => &mut self.daily_motivation,
            Toggle::BreakReminders => &mut self.break_reminders,
        };
        let changed = *slot != value;
        *slot = value;
        if changed {
            info!(setting = %toggle, value, "setting changed");
        }
        changed
    }

    pub fn set_break_interval(&mut self, minutes: i64) -> anyhow::Result<bool> {
        if !BREAK_INTERVAL_CHOICES.contains(&minutes) {
            return Err(anyhow!(
                "break interval must be one of {BREAK_INTERVAL_CHOICES:?} minutes"
            ));
        }
        let changed = self.break_interval_minutes != minutes;
        self.break_interval_minutes = minutes;
        Ok(changed)
    }
}
