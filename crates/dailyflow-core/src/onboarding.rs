//! First-run questionnaire.
//!
//! Linear steps: a welcome card, three multiple-choice questions and a
//! completion card. Choice steps gate `next` until an option is picked.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::storage::{LocalStorage, ONBOARDING_ANSWERS_KEY, ONBOARDING_COMPLETE_KEY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    Welcome,
    Choice {
        key: &'static str,
        options: &'static [&'static str],
    },
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub kind: StepKind,
}

impl Step {
    pub fn options(&self) -> &'static [&'static str] {
        match self.kind {
            StepKind::Choice { options, .. } => options,
            _ => &[],
        }
    }
}

pub const STEPS: &[Step] = &[
    Step {
        title: "Welcome to DailyFlow",
        subtitle: "Your ADHD-friendly task management companion",
        kind: StepKind::Welcome,
    },
    Step {
        title: "What trips you up the most?",
        subtitle: "We'll tune reminders around it",
        kind: StepKind::Choice {
            key: "challenge",
            options: &[
                "Getting started",
                "Staying focused",
                "Remembering things",
                "Too many choices",
            ],
        },
    },
    Step {
        title: "When is your brain at its best?",
        subtitle: "Pick the time you usually get the most done",
        kind: StepKind::Choice {
            key: "peak_time",
            options: &["Morning", "Afternoon", "Evening", "It changes every day"],
        },
    },
    Step {
        title: "How long can you focus comfortably?",
        subtitle: "This picks your default focus preset",
        kind: StepKind::Choice {
            key: "focus_length",
            options: &["About 10 minutes", "About 15 minutes", "About 25 minutes", "45 minutes or more"],
        },
    },
    Step {
        title: "You're all set!",
        subtitle: "Small steps, big wins. Let's go.",
        kind: StepKind::Complete,
    },
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OnboardingError {
    #[error("pick an option before continuing")]
    SelectionRequired,
    #[error("option {index} does not exist on this step ({available} available)")]
    InvalidOption { index: usize, available: usize },
    #[error("this step has no options to choose from")]
    NotAChoiceStep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved(usize),
    Finished,
}

#[derive(Debug, Clone, Default)]
pub struct Onboarding {
    index: usize,
    selections: BTreeMap<usize, usize>,
}

pub fn is_complete(storage: &LocalStorage) -> bool {
    storage.get_or(ONBOARDING_COMPLETE_KEY, false)
}

impl Onboarding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn step(&self) -> &'static Step {
        &STEPS[self.index]
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == STEPS.len()
    }

    pub fn selection(&self) -> Option<usize> {
        self.selections.get(&self.index).copied()
    }

    pub fn can_advance(&self) -> bool {
        match self.step().kind {
            StepKind::Choice { .. } => self.selection().is_some(),
            StepKind::Welcome | StepKind::Complete => true,
        }
    }

    pub fn select(&mut self, option: usize) -> Result<(), OnboardingError> {
        let available = self.step().options().len();
        if available == 0 {
            return Err(OnboardingError::NotAChoiceStep);
        }
        if option >= available {
            return Err(OnboardingError::InvalidOption {
                index: option,
                available,
            });
        }
        debug!(step = self.index, option, "onboarding option selected");
        self.selections.insert(self.index, option);
        Ok(())
    }

    /// Moves forward; on the last step writes the completion flag.
    #[instrument(skip(self, storage), fields(step = self.index))]
    pub fn next(&mut self, storage: &mut LocalStorage) -> anyhow::Result<Advance> {
        if !self.can_advance() {
            return Err(OnboardingError::SelectionRequired.into());
        }
        if self.is_last() {
            self.finish(storage)?;
            return Ok(Advance::Finished);
        }
        self.index += 1;
        Ok(Advance::Moved(self.index))
    }

    pub fn back(&mut self) -> usize {
        self.index = self.index.saturating_sub(1);
        self.index
    }

    pub fn answers(&self) -> BTreeMap<&'static str, &'static str> {
        self.selections
            .iter()
            .filter_map(|(step, option)| match STEPS.get(*step)?.kind {
                StepKind::Choice { key, options } => Some((key, *options.get(*option)?)),
                _ => None,
            })
            .collect()
    }

    fn finish(&self, storage: &mut LocalStorage) -> anyhow::Result<()> {
        storage.set(ONBOARDING_ANSWERS_KEY, &self.answers())?;
        storage.set(ONBOARDING_COMPLETE_KEY, &true)?;
        info!("onboarding complete");
        Ok(())
    }
}
