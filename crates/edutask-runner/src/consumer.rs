/*
[INPUT]:  Submission and poll outcomes for one task flow
[OUTPUT]: TaskView state with validated transitions
[POS]:    Consumer domain logic - idle/processing/completed/error view
[UPDATE]: When view states or transition rules change
*/

use serde::Serialize;
use thiserror::Error;

/// What a consumer shows for its current task
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "lowercase")]
pub enum TaskView<T> {
    Idle,
    Processing { task_id: String },
    Completed(T),
    Error(String),
}

/// Payload-free discriminant of `TaskView`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    Idle,
    Processing,
    Completed,
    Error,
}

/// Events that move a view between states
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent<T> {
    /// A fresh submission discards whatever the view showed
    Reset,
    Submitted { task_id: String },
    Resolved(T),
    Failed(String),
}

impl<T> ViewEvent<T> {
    pub fn kind(&self) -> &'static str {
        match self {
            ViewEvent::Reset => "reset",
            ViewEvent::Submitted { .. } => "submitted",
            ViewEvent::Resolved(_) => "resolved",
            ViewEvent::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("Invalid transition: {from:?} -> {event}")]
    InvalidTransition {
        from: ViewPhase,
        event: &'static str,
    },
}

impl<T> Default for TaskView<T> {
    fn default() -> Self {
        TaskView::Idle
    }
}

impl<T> TaskView<T> {
    pub fn phase(&self) -> ViewPhase {
        match self {
            TaskView::Idle => ViewPhase::Idle,
            TaskView::Processing { .. } => ViewPhase::Processing,
            TaskView::Completed(_) => ViewPhase::Completed,
            TaskView::Error(_) => ViewPhase::Error,
        }
    }

    /// Completed and error views only change through a reset
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase(), ViewPhase::Completed | ViewPhase::Error)
    }

    pub fn can_apply(&self, event: &ViewEvent<T>) -> bool {
        matches!(
            (self.phase(), event),
            (_, ViewEvent::Reset)
                | (ViewPhase::Idle, ViewEvent::Submitted { .. })
                | (ViewPhase::Processing, ViewEvent::Resolved(_))
                | (ViewPhase::Idle | ViewPhase::Processing, ViewEvent::Failed(_))
        )
    }

    pub fn apply(&mut self, event: ViewEvent<T>) -> Result<(), StateError> {
        if !self.can_apply(&event) {
            return Err(StateError::InvalidTransition {
                from: self.phase(),
                event: event.kind(),
            });
        }

        *self = match event {
            ViewEvent::Reset => TaskView::Idle,
            ViewEvent::Submitted { task_id } => TaskView::Processing { task_id },
            ViewEvent::Resolved(payload) => TaskView::Completed(payload),
            ViewEvent::Failed(message) => TaskView::Error(message),
        };
        Ok(())
    }
}
