mod state;

pub use state::TimerEngine;

/// Result of a toggle request. Rejections leave both the collection and the
/// store untouched.
#[derive(Clone, Debug, PartialEq)]
pub enum ToggleOutcome {
    Started,
    Stopped { elapsed: f64 },
    NoSuchTask,
    /// Another timer is running; stop it first before starting this one.
    OtherRunning { running: usize },
    Archived,
}
