use anyhow::{Result, bail};
use tracing::warn;

use crate::engine::ToggleOutcome;
use crate::store::TaskStore;
use crate::timefmt;
use crate::types::{Category, LogEntry, Task};

/// The timer state machine. Owns the ordered task list and the pointer to
/// the single task allowed to accumulate time, and writes the whole
/// collection back to the store after every mutation. Persistence is best
/// effort: a failed save is a warning and in-memory state stays
/// authoritative until the next successful save.
pub struct TimerEngine<S: TaskStore> {
    store: S,
    tasks: Vec<Task>,
    categories: Vec<Category>,
    active_index: Option<usize>,
}

impl<S: TaskStore> TimerEngine<S> {
    /// Load both collections and reconstruct the running pointer from the
    /// persisted epochs.
    pub fn load(mut store: S) -> Self {
        let tasks = store.load_tasks();
        let categories = store.load_categories();
        let active_index = restore_active(&tasks);
        Self {
            store,
            tasks,
            categories,
            active_index,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// Live duration for display: the accumulator plus the in-flight
    /// interval when the task is the running one. Pure in (task, now);
    /// callers recompute it on every render tick.
    pub fn current_duration(&self, index: usize, now: f64) -> f64 {
        let Some(task) = self.tasks.get(index) else {
            return 0.0;
        };
        let mut seconds = task.total_seconds;
        if self.active_index == Some(index) && task.start_epoch > 0.0 {
            seconds += (now - task.start_epoch).max(0.0);
        }
        seconds
    }

    /// Start or stop the timer on one task. A start is refused while any
    /// other timer runs (explicit single-timer discipline, no implicit
    /// switching) and on archived tasks.
    pub fn toggle(&mut self, index: usize, now: f64) -> ToggleOutcome {
        if index >= self.tasks.len() {
            return ToggleOutcome::NoSuchTask;
        }
        if let Some(active) = self.active_index {
            if active != index {
                return ToggleOutcome::OtherRunning { running: active };
            }
        }
        let outcome = if self.active_index == Some(index) {
            let elapsed = self.stop_task(index, now);
            ToggleOutcome::Stopped { elapsed }
        } else {
            if self.tasks[index].archived {
                return ToggleOutcome::Archived;
            }
            self.tasks[index].start_epoch = now;
            self.active_index = Some(index);
            ToggleOutcome::Started
        };
        self.persist_tasks();
        outcome
    }

    /// Stop whichever task is running, if any. Returns the elapsed seconds
    /// folded into its accumulator.
    pub fn stop_active(&mut self, now: f64) -> Option<f64> {
        let index = self.active_index?;
        let elapsed = self.stop_task(index, now);
        self.persist_tasks();
        Some(elapsed)
    }

    /// Internal stop, not subject to the other-timer guard: fold the
    /// clamped elapsed interval into the accumulator, zero the epoch, emit
    /// the audit row, clear the pointer. Callers persist.
    fn stop_task(&mut self, index: usize, now: f64) -> f64 {
        let task = &mut self.tasks[index];
        if task.start_epoch <= 0.0 {
            // Corrupted state: treat the run as starting just now.
            task.start_epoch = now;
        }
        let started = task.start_epoch;
        let elapsed = (now - started).max(0.0);
        task.total_seconds += elapsed;
        task.start_epoch = 0.0;
        let entry = LogEntry {
            task_id: task.id.clone(),
            task: task.name.clone(),
            category: task.category.clone(),
            start_epoch: started,
            end_epoch: now,
            duration_seconds: elapsed,
        };
        self.active_index = None;
        if let Err(err) = self.store.append_log(&entry) {
            warn!("failed to append work log entry: {err}");
        }
        elapsed
    }

    /// Create a task. Id and name are required; the category is stored as
    /// given (denormalized, no foreign-key check here).
    pub fn add_task(&mut self, id: &str, name: &str, category: &str, now: f64) -> Result<usize> {
        let id = id.trim();
        let name = name.trim();
        if id.is_empty() || name.is_empty() {
            bail!("task id and name are required");
        }
        self.tasks.push(Task::new(
            id.to_string(),
            name.to_string(),
            category.trim().to_string(),
            timefmt::local_date(now),
        ));
        self.persist_tasks();
        Ok(self.tasks.len() - 1)
    }

    /// Update name and/or category. An empty replacement name is ignored.
    pub fn edit_task(&mut self, index: usize, name: Option<&str>, category: Option<&str>) -> bool {
        let Some(task) = self.tasks.get_mut(index) else {
            return false;
        };
        if let Some(name) = name {
            if !name.trim().is_empty() {
                task.name = name.trim().to_string();
            }
        }
        if let Some(category) = category {
            task.category = category.trim().to_string();
        }
        self.persist_tasks();
        true
    }

    /// Append a timestamped line to a task's notes.
    pub fn append_note(&mut self, index: usize, text: &str, now: f64) -> bool {
        let Some(task) = self.tasks.get_mut(index) else {
            return false;
        };
        let line = format!("[{}] {}", timefmt::format_datetime(now), text.trim());
        if task.notes.is_empty() {
            task.notes = line;
        } else {
            task.notes.push('\n');
            task.notes.push_str(&line);
        }
        self.persist_tasks();
        true
    }

    /// Hard-delete a task. A running target is stopped first; a pointer
    /// above the removed row shifts down with the list.
    pub fn delete(&mut self, index: usize, now: f64) -> bool {
        if index >= self.tasks.len() {
            return false;
        }
        if self.active_index == Some(index) {
            self.stop_task(index, now);
        }
        self.tasks.remove(index);
        if let Some(active) = self.active_index {
            if active > index {
                self.active_index = Some(active - 1);
            }
        }
        self.persist_tasks();
        true
    }

    /// Flag every row of the (id, name) project as archived, stopping a
    /// running member first. Returns the number of rows flagged.
    pub fn archive_project(&mut self, id: &str, name: &str, now: f64) -> usize {
        if let Some(active) = self.active_index {
            if self.tasks[active].in_project(id, name) {
                self.stop_task(active, now);
            }
        }
        let completion = timefmt::local_date(now);
        let mut affected = 0;
        for task in self.tasks.iter_mut().filter(|t| t.in_project(id, name)) {
            task.archived = true;
            task.completion_date = Some(completion);
            affected += 1;
        }
        if affected > 0 {
            self.persist_tasks();
        }
        affected
    }

    /// Clear the archived flag and completion date on every row of the
    /// (id, name) project. Returns the number of rows touched.
    pub fn unarchive_project(&mut self, id: &str, name: &str) -> usize {
        let mut affected = 0;
        for task in self.tasks.iter_mut().filter(|t| t.in_project(id, name)) {
            task.archived = false;
            task.completion_date = None;
            affected += 1;
        }
        if affected > 0 {
            self.persist_tasks();
        }
        affected
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name)
    }

    /// Categories are an ordered collection with unique names.
    pub fn add_category(&mut self, name: &str, description: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            bail!("category name is required");
        }
        if self.has_category(name) {
            bail!("category '{name}' already exists");
        }
        self.categories.push(Category {
            name: name.to_string(),
            description: description.trim().to_string(),
        });
        self.persist_categories();
        Ok(())
    }

    /// Rename a category and cascade the new name to every task holding the
    /// old one (the task column is denormalized). Returns the number of
    /// tasks touched.
    pub fn rename_category(&mut self, old: &str, new: &str) -> Result<usize> {
        let new = new.trim();
        if new.is_empty() {
            bail!("category name is required");
        }
        if self.has_category(new) {
            bail!("category '{new}' already exists");
        }
        let Some(category) = self.categories.iter_mut().find(|c| c.name == old) else {
            bail!("category '{old}' not found");
        };
        category.name = new.to_string();
        let mut cascaded = 0;
        for task in self.tasks.iter_mut().filter(|t| t.category == old) {
            task.category = new.to_string();
            cascaded += 1;
        }
        self.persist_categories();
        if cascaded > 0 {
            self.persist_tasks();
        }
        Ok(cascaded)
    }

    /// The most recent completed runs, oldest first.
    pub fn recent_log(&mut self, limit: usize) -> Vec<LogEntry> {
        let mut entries = self.store.load_log();
        let skip = entries.len().saturating_sub(limit);
        entries.split_off(skip)
    }

    fn persist_tasks(&mut self) {
        if let Err(err) = self.store.save_tasks(&self.tasks) {
            warn!("failed to save tasks, keeping in-memory state: {err}");
        }
    }

    fn persist_categories(&mut self) {
        if let Err(err) = self.store.save_categories(&self.categories) {
            warn!("failed to save categories, keeping in-memory state: {err}");
        }
    }
}

/// The first record with a positive epoch wins. Extra "running" records are
/// a tolerated corruption: their epochs are left in place and go stale, and
/// the next toggle that starts such a task overwrites them.
fn restore_active(tasks: &[Task]) -> Option<usize> {
    tasks.iter().position(Task::is_running)
}
