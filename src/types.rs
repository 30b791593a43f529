use chrono::NaiveDate;

/// One timer line: an (identifier, description, category) row holding an
/// accumulated duration. Identifiers are free-form and not unique; rows
/// sharing (id, name) form a project, with one row per category.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Task {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Accumulated seconds while NOT running. The in-flight interval of a
    /// running task is only folded in when the timer stops.
    pub total_seconds: f64,
    /// 0.0 means not running; otherwise the Unix timestamp the run began.
    pub start_epoch: f64,
    pub notes: String,
    pub created_date: NaiveDate,
    pub archived: bool,
    pub completion_date: Option<NaiveDate>,
}

impl Task {
    pub fn new(id: String, name: String, category: String, created_date: NaiveDate) -> Self {
        Self {
            id,
            name,
            category,
            total_seconds: 0.0,
            start_epoch: 0.0,
            notes: String::new(),
            created_date,
            archived: false,
            completion_date: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.start_epoch > 0.0
    }

    /// Project membership: rows sharing (id, name) differ only by category.
    pub fn in_project(&self, id: &str, name: &str) -> bool {
        self.id == id && self.name == name
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Category {
    pub name: String,
    pub description: String,
}

/// One completed run, emitted as a side effect of stopping a timer.
/// Append-only; never mutated or deleted by the core.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LogEntry {
    pub task_id: String,
    pub task: String,
    pub category: String,
    pub start_epoch: f64,
    pub end_epoch: f64,
    pub duration_seconds: f64,
}
