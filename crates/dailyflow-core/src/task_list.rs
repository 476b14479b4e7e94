use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::plans::PrePlannedBundle;
use crate::task::{NewTask, Task, seed_tasks};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddRejected {
    #[error("a task needs a title")]
    EmptyTitle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Completed(Task),
    Reopened(Task),
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
}

impl Summary {
    pub fn motivational_message(&self) -> &'static str {
        let rate = self.percent;
        if self.total > 0 && self.completed == self.total {
            "🎉 Perfect day! You're unstoppable!"
        } else if rate >= 75.0 {
            "🌟 Almost there! You're doing amazing!"
        } else if rate >= 50.0 {
            "💪 Great progress! Keep the momentum!"
        } else if rate >= 25.0 {
            "🎯 You've got this! One task at a time!"
        } else {
            "✨ Fresh start! Your brain is ready to conquer!"
        }
    }
}

pub fn delete_prompt(task: &Task) -> String {
    format!("Are you sure you want to delete \"{}\"?", task.title)
}

/// The session's tasks, in insertion order.
#[derive(Debug, Clone)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl Default for TaskList {
    fn default() -> Self {
        Self::seeded()
    }
}

impl TaskList {
    pub fn seeded() -> Self {
        Self { tasks: seed_tasks() }
    }

    pub fn empty() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn incomplete(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|task| !task.completed).collect()
    }

    /// Accepts a 1-based position, a full id, or a unique id prefix. A number
    /// is read as the row shown in the task table before it is tried as an
    /// id.
    pub fn resolve(&self, needle: &str) -> Option<&Task> {
        let needle = needle.trim();
        if needle.is_empty() {
            return None;
        }
        if let Ok(position) = needle.parse::<usize>()
            && let Some(task) = position.checked_sub(1).and_then(|index| self.tasks.get(index))
        {
            return Some(task);
        }
        if let Some(task) = self.get(needle) {
            return Some(task);
        }
        let mut matches = self.tasks.iter().filter(|task| task.id.starts_with(needle));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Some(task),
            _ => None,
        }
    }

    #[instrument(skip(self, new), fields(title = %new.title))]
    pub fn add(&mut self, new: NewTask) -> Result<&Task, AddRejected> {
        if !new.has_title() {
            debug!("rejecting task without title");
            return Err(AddRejected::EmptyTitle);
        }
        let task = Task::from_new(new);
        info!(id = %task.id, "task added");
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    #[instrument(skip(self))]
    pub fn toggle(&mut self, id: &str) -> ToggleOutcome {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!("toggle ignored; no such task");
            return ToggleOutcome::NotFound;
        };
        task.completed = !task.completed;
        info!(completed = task.completed, "task toggled");
        if task.completed {
            ToggleOutcome::Completed(task.clone())
        } else {
            ToggleOutcome::Reopened(task.clone())
        }
    }

    /// Removes the task once `confirm` agrees. Declining or a missing id is
    /// a no-op.
    #[instrument(skip(self, confirm))]
    pub fn delete(&mut self, id: &str, confirm: impl FnOnce(&Task) -> bool) -> Option<Task> {
        let position = self.tasks.iter().position(|task| task.id == id)?;
        if !confirm(&self.tasks[position]) {
            debug!("delete declined");
            return None;
        }
        let removed = self.tasks.remove(position);
        info!(title = %removed.title, "task deleted");
        Some(removed)
    }

    #[instrument(skip(self, bundle), fields(bundle = bundle.id))]
    pub fn apply_bundle(&mut self, bundle: &PrePlannedBundle) -> Vec<Task> {
        let added = bundle.expand();
        info!(count = added.len(), "bundle applied");
        self.tasks.extend(added.iter().cloned());
        added
    }

    pub fn summary(&self) -> Summary {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        let percent = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        Summary {
            completed,
            total,
            percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AddRejected, TaskList, ToggleOutcome, delete_prompt};
    use crate::plans;
    use crate::task::{NewTask, Priority};

    #[test]
    fn toggling_twice_restores_state() {
        let mut list = TaskList::seeded();
        let before = list.tasks().to_vec();
        let id = before[1].id.clone();

        assert!(matches!(list.toggle(&id), ToggleOutcome::Completed(_)));
        assert!(matches!(list.toggle(&id), ToggleOutcome::Reopened(_)));
        assert_eq!(list.tasks(), before.as_slice());
    }

    #[test]
    fn toggle_of_unknown_id_changes_nothing() {
        let mut list = TaskList::seeded();
        let before = list.tasks().to_vec();
        assert_eq!(list.toggle("nope"), ToggleOutcome::NotFound);
        assert_eq!(list.tasks(), before.as_slice());
    }

    #[test]
    fn delete_removes_exactly_one_and_keeps_order() {
        let mut list = TaskList::seeded();
        let ids: Vec<String> = list.tasks().iter().map(|t| t.id.clone()).collect();

        let mut prompt = String::new();
        let removed = list
            .delete(&ids[1], |task| {
                prompt = delete_prompt(task);
                true
            })
            .expect("removed");
        assert_eq!(removed.id, ids[1]);
        assert_eq!(
            prompt,
            "Are you sure you want to delete \"Finish project presentation\"?"
        );

        let remaining: Vec<&str> = list.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(remaining, vec![ids[0].as_str(), ids[2].as_str(), ids[3].as_str()]);
    }

    #[test]
    fn declined_delete_is_noop() {
        let mut list = TaskList::seeded();
        let id = list.tasks()[0].id.clone();
        assert!(list.delete(&id, |_| false).is_none());
        assert!(list.delete("missing", |_| true).is_none());
        assert_eq!(list.tasks().len(), 4);
    }

    #[test]
    fn blank_titles_are_rejected() {
        let mut list = TaskList::empty();
        assert_eq!(list.add(NewTask::new("   ")).err(), Some(AddRejected::EmptyTitle));
        assert!(list.tasks().is_empty());
    }

    #[test]
    fn added_tasks_start_incomplete_with_unique_ids() {
        let mut list = TaskList::seeded();
        let mut new = NewTask::new("  Buy milk ");
        new.priority = Priority::Low;
        let id = list.add(new.clone()).expect("added").id.clone();
        let other = list.add(new).expect("added").id.clone();

        assert_ne!(id, other);
        let task = list.get(&id).expect("present");
        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
        assert_eq!(list.tasks().len(), 6);
    }

    #[test]
    fn resolve_accepts_position_and_prefix() {
        let mut list = TaskList::empty();
        let id = list.add(NewTask::new("Water plants")).expect("added").id.clone();
        assert_eq!(list.resolve("1").map(|t| t.id.as_str()), Some(id.as_str()));
        assert_eq!(list.resolve(&id[..6]).map(|t| t.id.as_str()), Some(id.as_str()));
        assert!(list.resolve("9").is_none());
    }

    #[test]
    fn resolve_prefers_row_number_over_numeric_id() {
        let mut list = TaskList::seeded();
        list.delete("1", |_| true).expect("deleted");
        assert_eq!(list.resolve("2").map(|t| t.title.as_str()), Some("Buy groceries"));
        assert_eq!(list.resolve("1").map(|t| t.id.as_str()), Some("2"));
    }

    #[test]
    fn summary_message_tracks_completion_rate() {
        let mut list = TaskList::seeded();
        let summary = list.summary();
        assert_eq!((summary.completed, summary.total), (1, 4));
        assert_eq!(summary.motivational_message(), "🎯 You've got this! One task at a time!");

        let ids: Vec<String> = list.tasks().iter().map(|t| t.id.clone()).collect();
        for id in &ids[1..] {
            list.toggle(id);
        }
        assert_eq!(list.summary().motivational_message(), "🎉 Perfect day! You're unstoppable!");
        assert_eq!(
            TaskList::empty().summary().motivational_message(),
            "✨ Fresh start! Your brain is ready to conquer!"
        );
    }

    #[test]
    fn bundle_tasks_are_appended_in_order() {
        let mut list = TaskList::empty();
        let plan = plans::find("plan3").expect("plan3");
        let added = list.apply_bundle(plan);
        assert_eq!(list.tasks(), added.as_slice());
        assert_eq!(list.incomplete().len(), plan.tasks.len());
    }
}
