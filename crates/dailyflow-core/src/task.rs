use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn hex_color(&self) -> &'static str {
        match self {
            Priority::High => "#ff6b6b",
            Priority::Medium => "#ffa726",
            Priority::Low => "#66bb6a",
        }
    }

    /// Priority by position inside a pre-planned bundle.
    pub fn for_bundle_index(index: usize) -> Self {
        match index {
            0 => Priority::High,
            1 => Priority::Medium,
            _ => Priority::Low,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "high" => Ok(Priority::High),
            "m" | "medium" | "med" => Ok(Priority::Medium),
            "l" | "low" => Ok(Priority::Low),
            other => Err(anyhow!("unknown priority: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub emoji: String,
    pub completed: bool,
    pub priority: Priority,
    #[serde(default)]
    pub time: Option<String>,
    pub category: String,
}

/// Everything the add form collects; id and completion are assigned on add.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub emoji: String,
    pub priority: Priority,
    #[serde(default)]
    pub time: Option<String>,
    pub category: String,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            emoji: "📝".to_string(),
            priority: Priority::Medium,
            time: None,
            category: "Personal".to_string(),
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

impl Task {
    pub fn from_new(new: NewTask) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            title: new.title.trim().to_string(),
            emoji: new.emoji,
            completed: false,
            priority: new.priority,
            time: new.time,
            category: new.category,
        }
    }
}

/// The list every session starts from.
pub fn seed_tasks() -> Vec<Task> {
    let seed = |id: &str,
                title: &str,
                emoji: &str,
                completed: bool,
                priority: Priority,
                time: &str,
                category: &str| Task {
        id: id.to_string(),
        title: title.to_string(),
        emoji: emoji.to_string(),
        completed,
        priority,
        time: Some(time.to_string()),
        category: category.to_string(),
    };

    vec![
        seed("1", "Morning workout", "🏃", true, Priority::High, "7:00 AM", "Health"),
        seed("2", "Finish project presentation", "📊", false, Priority::High, "2:00 PM", "Work"),
        seed("3", "Buy groceries", "🛒", false, Priority::Medium, "5:00 PM", "Personal"),
        seed("4", "Read for 30 minutes", "📚", false, Priority::Low, "8:00 PM", "Personal"),
    ]
}
