//! Drag-and-drop mapping for the three-column board.
//!
//! A press on a card arms a pending drag; the drag only activates once
//! the pointer travels past a small distance threshold, so plain clicks
//! never move cards. A release over a column resolves to at most one
//! store mutation, and dropping on the card's own column resolves to
//! none.

use crate::task::TaskStatus;

/// Pointer travel (in cells or pixels, whatever the frontend measures)
/// required before a pending drag becomes active.
pub const DRAG_ACTIVATION_DISTANCE: f64 = 3.0;

/// Fixed column layout, left to right.
pub const COLUMNS: [ColumnSpec; 3] = [
    ColumnSpec {
        status: TaskStatus::Todo,
        title: "To Do",
    },
    ColumnSpec {
        status: TaskStatus::Progress,
        title: "In Progress",
    },
    ColumnSpec {
        status: TaskStatus::Done,
        title: "Done",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub status: TaskStatus,
    pub title: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance_to(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// What a completed gesture asks the store to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Click, drop outside any column, or drop on the origin column.
    None,
    /// Exactly one move request.
    Move { task_id: String, to: TaskStatus },
}

#[derive(Debug, Clone)]
struct PendingDrag {
    task_id: String,
    origin: Point,
}

/// Tracks one gesture at a time from press to release.
#[derive(Debug, Default)]
pub struct DragController {
    pending: Option<PendingDrag>,
    active: Option<String>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the card currently being dragged, once past the threshold.
    pub fn dragging(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Press on a card. Arms a pending drag without activating it.
    pub fn pointer_down(&mut self, task_id: &str, at: Point) {
        self.pending = Some(PendingDrag {
            task_id: task_id.to_string(),
            origin: at,
        });
        self.active = None;
    }

    /// Pointer movement. Activates the drag once the travel from the
    /// press position exceeds the threshold.
    pub fn pointer_moved(&mut self, at: Point) {
        if self.active.is_some() {
            return;
        }
        if let Some(pending) = &self.pending {
            if pending.origin.distance_to(at) > DRAG_ACTIVATION_DISTANCE {
                self.active = Some(pending.task_id.clone());
            }
        }
    }

    /// Start a drag directly, bypassing the distance threshold. Used by
    /// keyboard-driven card movement where there is no pointer travel.
    pub fn begin(&mut self, task_id: &str) {
        self.pending = Some(PendingDrag {
            task_id: task_id.to_string(),
            origin: Point::new(0.0, 0.0),
        });
        self.active = Some(task_id.to_string());
    }

    /// Release. `target` is the column under the pointer, if any;
    /// `current_status` resolves the dragged card's present column so a
    /// same-column drop maps to no mutation. All gesture state is
    /// cleared regardless of outcome.
    pub fn pointer_up(
        &mut self,
        target: Option<TaskStatus>,
        current_status: impl Fn(&str) -> Option<TaskStatus>,
    ) -> DragOutcome {
        self.pending = None;
        let active = self.active.take();

        let (Some(task_id), Some(target)) = (active, target) else {
            return DragOutcome::None;
        };
        match current_status(&task_id) {
            Some(status) if status != target => DragOutcome::Move {
                task_id,
                to: target,
            },
            // Same column, or the card vanished mid-drag.
            _ => DragOutcome::None,
        }
    }
}
