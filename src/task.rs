//! Task board state machine for opsboard.
//!
//! The store owns the canonical in-memory task collection. Status moves
//! form a free graph (any column to any other), so a card dragged from
//! done back to todo is a legal correction, not an error. Every mutation
//! persists the full collection to `board.snapshot.json`; the remote
//! tasks resource is read-only and only seeds the collection before the
//! first local edit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{Error, Result};
use crate::storage::Storage;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Column a task lives in. Exactly one per task at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Progress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::Progress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Progress => "progress",
            TaskStatus::Done => "done",
        }
    }

    /// Human column title
    pub fn title(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::Progress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "progress" => Ok(TaskStatus::Progress),
            "done" => Ok(TaskStatus::Done),
            other => Err(Error::InvalidArgument(format!(
                "unknown task status '{other}' (expected todo|progress|done)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(Error::InvalidArgument(format!(
                "unknown task priority '{other}' (expected high|medium|low)"
            ))),
        }
    }
}

/// One unit of trackable work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    fn due_instant(&self) -> Option<DateTime<Utc>> {
        self.due_date
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Whether the due date has passed while the task is not done.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_instant() {
            Some(due) => self.status != TaskStatus::Done && due < now,
            None => false,
        }
    }

    /// Whole days until the due date, rounded up. Negative once the date
    /// has passed, `None` without a due date.
    pub fn days_until_due(&self, now: DateTime<Utc>) -> Option<i64> {
        let due = self.due_instant()?;
        let seconds = due.signed_duration_since(now).num_seconds() as f64;
        Some((seconds / SECONDS_PER_DAY).ceil() as i64)
    }
}

/// Validated input for a new task. Produced by the add-task form
/// (`crate::form`); the store trusts it apart from the title invariant.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

/// Partial update. Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
}

/// Wire format of the tasks resource and the persisted board snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub tasks: Vec<Task>,
    pub last_updated: DateTime<Utc>,
}

impl TaskSnapshot {
    pub fn empty() -> Self {
        Self {
            tasks: Vec::new(),
            last_updated: Utc::now(),
        }
    }
}

/// Per-status counts plus the overdue total, one row of the board header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub total: usize,
    pub todo: usize,
    pub progress: usize,
    pub done: usize,
    pub overdue: usize,
}

/// Owns the canonical task collection and enforces its invariants.
#[derive(Debug)]
pub struct TaskStore {
    tasks: Vec<Task>,
    storage: Storage,
    /// Set once any local mutation lands; later remote snapshots are
    /// ignored for the rest of the session.
    locally_edited: bool,
}

impl TaskStore {
    pub fn new(storage: Storage) -> Self {
        Self {
            tasks: Vec::new(),
            storage,
            locally_edited: false,
        }
    }

    /// Open the store, loading the persisted board snapshot when present.
    pub fn load(storage: Storage) -> Result<Self> {
        let snapshot: Option<TaskSnapshot> =
            storage.read_json(&storage.board_snapshot_path())?;
        let mut store = Self::new(storage);
        if let Some(snapshot) = snapshot {
            store.tasks = normalize_tasks(snapshot.tasks);
            // A persisted snapshot is the product of earlier local edits.
            store.locally_edited = true;
        }
        Ok(store)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Apply a freshly polled tasks snapshot. Returns false (and changes
    /// nothing) once a local mutation has made this session authoritative.
    pub fn apply_remote(&mut self, snapshot: TaskSnapshot) -> bool {
        if self.locally_edited {
            return false;
        }
        self.tasks = normalize_tasks(snapshot.tasks);
        true
    }

    /// Create a task from validated input. Status starts at todo, the id
    /// is fresh and unique, and the collection is persisted.
    pub fn add_task(&mut self, input: NewTask) -> Result<Task> {
        self.add_task_at(input, Utc::now())
    }

    fn add_task_at(&mut self, input: NewTask, now: DateTime<Utc>) -> Result<Task> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(Error::InvalidArgument("title cannot be empty".to_string()));
        }

        let task = Task {
            id: self.generate_task_id(),
            title: title.to_string(),
            description: input.description.filter(|text| !text.trim().is_empty()),
            priority: input.priority,
            status: TaskStatus::Todo,
            due_date: input.due_date,
            created_at: now,
            completed_at: None,
        };
        self.tasks.push(task.clone());
        self.mark_edited_and_persist()?;
        Ok(task)
    }

    /// Remove a task. Missing ids are a no-op, so deletion is idempotent.
    pub fn delete_task(&mut self, id: &str) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.mark_edited_and_persist()?;
        Ok(true)
    }

    /// Move a task to another column. Same-status moves and missing ids
    /// are no-ops; `completed_at` is set entering done and cleared
    /// leaving it.
    pub fn move_task(&mut self, id: &str, new_status: TaskStatus) -> Result<bool> {
        self.move_task_at(id, new_status, Utc::now())
    }

    fn move_task_at(
        &mut self,
        id: &str,
        new_status: TaskStatus,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(false);
        };
        if task.status == new_status {
            return Ok(false);
        }
        task.status = new_status;
        task.completed_at = if new_status == TaskStatus::Done {
            Some(now)
        } else {
            None
        };
        self.mark_edited_and_persist()?;
        Ok(true)
    }

    /// Merge the given fields into an existing task. Missing ids are a
    /// no-op. A status change goes through the same completed_at rule as
    /// `move_task`.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<bool> {
        self.update_task_at(id, patch, Utc::now())
    }

    fn update_task_at(
        &mut self,
        id: &str,
        patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidArgument("title cannot be empty".to_string()));
            }
        }
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(false);
        };

        let mut changed = false;
        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            if task.title != title {
                task.title = title;
                changed = true;
            }
        }
        if let Some(description) = patch.description {
            let description = Some(description).filter(|text| !text.trim().is_empty());
            if task.description != description {
                task.description = description;
                changed = true;
            }
        }
        if let Some(priority) = patch.priority {
            if task.priority != priority {
                task.priority = priority;
                changed = true;
            }
        }
        if let Some(due_date) = patch.due_date {
            if task.due_date != Some(due_date) {
                task.due_date = Some(due_date);
                changed = true;
            }
        }
        if let Some(status) = patch.status {
            if task.status != status {
                task.status = status;
                task.completed_at = if status == TaskStatus::Done {
                    Some(now)
                } else {
                    None
                };
                changed = true;
            }
        }

        if changed {
            self.mark_edited_and_persist()?;
        }
        Ok(changed)
    }

    /// Tasks in one column, in insertion order.
    pub fn by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.status == status)
            .collect()
    }

    pub fn stats(&self, now: DateTime<Utc>) -> BoardStats {
        let count = |status: TaskStatus| {
            self.tasks
                .iter()
                .filter(|task| task.status == status)
                .count()
        };
        BoardStats {
            total: self.tasks.len(),
            todo: count(TaskStatus::Todo),
            progress: count(TaskStatus::Progress),
            done: count(TaskStatus::Done),
            overdue: self
                .tasks
                .iter()
                .filter(|task| task.is_overdue(now))
                .count(),
        }
    }

    /// Full collection in wire format.
    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            tasks: self.tasks.clone(),
            last_updated: Utc::now(),
        }
    }

    fn generate_task_id(&self) -> String {
        loop {
            let id = format!("task-{}", Ulid::new().to_string().to_lowercase());
            if !self.tasks.iter().any(|task| task.id == id) {
                return id;
            }
        }
    }

    fn mark_edited_and_persist(&mut self) -> Result<()> {
        self.locally_edited = true;
        let snapshot = self.snapshot();
        self.storage
            .write_json(&self.storage.board_snapshot_path(), &snapshot)
    }
}

/// Drop duplicate ids (first occurrence wins) and clear a stray
/// `completed_at` on tasks that are not done.
fn normalize_tasks(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(tasks.len());
    for mut task in tasks {
        if !seen.insert(task.id.clone()) {
            continue;
        }
        if task.status != TaskStatus::Done {
            task.completed_at = None;
        }
        out.push(task);
    }
    out
}
