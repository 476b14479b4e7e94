//! Pre-planned task bundles.

use std::str::FromStr;

use anyhow::anyhow;
use uuid::Uuid;

use crate::task::{Priority, Task};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrePlannedBundle {
    pub id: &'static str,
    pub title: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    pub tasks: &'static [&'static str],
    pub color: &'static str,
    pub category: &'static str,
    pub estimated_time: &'static str,
}

pub const CATALOG: &[PrePlannedBundle] = &[
    PrePlannedBundle {
        id: "plan1",
        title: "Focus Mode",
        emoji: "📘",
        description: "Deep work session with breaks",
        tasks: &[
            "📝 Write for 2 hours",
            "☕ Coffee break (15 min)",
            "💻 Code review",
            "🧘 Meditation (10 min)",
        ],
        color: "#4ecdc4",
        category: "Productivity",
        estimated_time: "3 hours",
    },
    PrePlannedBundle {
        id: "plan2",
        title: "Sunday Reset",
        emoji: "🧺",
        description: "Organize and prepare for the week",
        tasks: &[
            "🧹 Clean house",
            "🛒 Grocery shopping",
            "📅 Plan next week",
            "🧺 Do laundry",
            "📋 Review goals",
        ],
        color: "#ff6b6b",
        category: "Life",
        estimated_time: "4 hours",
    },
    PrePlannedBundle {
        id: "plan3",
        title: "Creative Flow",
        emoji: "🎨",
        description: "Express your creativity",
        tasks: &[
            "🎨 Art project (1 hour)",
            "📸 Photography walk",
            "✍️ Journal writing",
            "🎵 Listen to music",
        ],
        color: "#ffa726",
        category: "Creative",
        estimated_time: "2.5 hours",
    },
    PrePlannedBundle {
        id: "plan4",
        title: "Workout & Meal Prep",
        emoji: "🏋️",
        description: "Health and nutrition focus",
        tasks: &[
            "🏋️ Strength training",
            "🥗 Prep healthy meals",
            "💧 Drink water (8 glasses)",
            "🍎 Plan snacks",
        ],
        color: "#96ceb4",
        category: "Health",
        estimated_time: "2 hours",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanHorizon {
    #[default]
    Today,
    Week,
    Month,
}

impl PlanHorizon {
    fn categories(&self) -> &'static [&'static str] {
        match self {
            PlanHorizon::Today => &["Productivity", "Health", "Creative"],
            PlanHorizon::Week => &["Life", "Health", "Creative", "Productivity"],
            PlanHorizon::Month => &["Life", "Health", "Productivity", "Personal"],
        }
    }
}

impl FromStr for PlanHorizon {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" | "day" => Ok(PlanHorizon::Today),
            "week" => Ok(PlanHorizon::Week),
            "month" => Ok(PlanHorizon::Month),
            other => Err(anyhow!("unknown plan horizon: {other}")),
        }
    }
}

pub fn plans_for(horizon: PlanHorizon) -> Vec<&'static PrePlannedBundle> {
    CATALOG
        .iter()
        .filter(|plan| horizon.categories().contains(&plan.category))
        .collect()
}

pub fn find(id_or_title: &str) -> Option<&'static PrePlannedBundle> {
    let needle = id_or_title.trim().to_ascii_lowercase();
    CATALOG.iter().find(|plan| {
        plan.id == needle || plan.title.to_ascii_lowercase() == needle
    })
}

impl PrePlannedBundle {
    /// One task per bundle entry, in catalog order.
    pub fn expand(&self) -> Vec<Task> {
        let suffix = Uuid::new_v4().simple().to_string();
        self.tasks
            .iter()
            .enumerate()
            .map(|(index, title)| Task {
                id: format!("{}-{index}-{suffix}", self.id),
                title: title.to_string(),
                emoji: title.split_whitespace().next().unwrap_or_default().to_string(),
                completed: false,
                priority: Priority::for_bundle_index(index),
                time: None,
                category: self.category.to_string(),
            })
            .collect()
    }
}
