//! `opsboard task` subcommands.
//!
//! These operate on the local board snapshot only; the remote tasks
//! resource is read-only, so nothing here touches the network.

use chrono::Utc;
use serde::Serialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::form::TaskDraft;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::storage::Storage;
use crate::task::{Task, TaskStatus, TaskStore};

pub struct NewOptions {
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub due: Option<String>,
    pub config: Config,
    pub output: OutputOptions,
}

pub struct ListOptions {
    pub status: Option<String>,
    pub config: Config,
    pub output: OutputOptions,
}

pub struct MoveOptions {
    pub id: String,
    pub status: String,
    pub config: Config,
    pub output: OutputOptions,
}

pub struct RmOptions {
    pub id: String,
    pub config: Config,
    pub output: OutputOptions,
}

pub struct StatsOptions {
    pub config: Config,
    pub output: OutputOptions,
}

fn open_store(config: &Config) -> Result<TaskStore> {
    let storage = Storage::from_config(&config.board)?;
    TaskStore::load(storage)
}

pub fn run_new(opts: NewOptions) -> Result<()> {
    let draft = TaskDraft {
        title: opts.title,
        description: opts.description.unwrap_or_default(),
        priority: opts.priority,
        due_date: opts.due.unwrap_or_default(),
    };
    let input = draft.validate().map_err(Error::Validation)?;

    let mut store = open_store(&opts.config)?;
    let task = store.add_task(input)?;

    let mut human = HumanOutput::new("Task created");
    human.push_summary("id", &task.id);
    human.push_summary("title", &task.title);
    human.push_summary("status", task.status.as_str());
    human.push_summary("priority", task.priority.as_str());
    if let Some(days) = task.days_until_due(Utc::now()) {
        human.push_detail(format!("due in {days} day(s)"));
    }
    human.push_next_step("opsboard board");

    emit_success(opts.output, "task new", &task, Some(&human))
}

#[derive(Serialize)]
struct ListData<'a> {
    tasks: Vec<&'a Task>,
}

pub fn run_list(opts: ListOptions) -> Result<()> {
    let filter = opts
        .status
        .as_deref()
        .map(TaskStatus::parse)
        .transpose()?;
    let store = open_store(&opts.config)?;

    let tasks: Vec<&Task> = match filter {
        Some(status) => store.by_status(status),
        None => store.tasks().iter().collect(),
    };

    let mut human = HumanOutput::new(format!("{} task(s)", tasks.len()));
    let now = Utc::now();
    for task in &tasks {
        let overdue = if task.is_overdue(now) { " [overdue]" } else { "" };
        human.push_detail(format!(
            "{} [{}] {} ({}){}",
            task.id,
            task.status.as_str(),
            task.title,
            task.priority.as_str(),
            overdue
        ));
    }
    if tasks.is_empty() {
        human.push_next_step("opsboard task new --title \"...\"");
    }

    emit_success(opts.output, "task list", &ListData { tasks }, Some(&human))
}

#[derive(Serialize)]
struct MoveData<'a> {
    id: &'a str,
    status: &'a str,
    changed: bool,
}

pub fn run_move(opts: MoveOptions) -> Result<()> {
    let status = TaskStatus::parse(&opts.status)?;
    let mut store = open_store(&opts.config)?;
    let changed = store.move_task(&opts.id, status)?;

    let mut human = if changed {
        let mut out = HumanOutput::new("Task moved");
        out.push_summary("id", &opts.id);
        out.push_summary("status", status.as_str());
        out
    } else if store.find(&opts.id).is_some() {
        HumanOutput::new("Task already there, nothing to do")
    } else {
        let mut out = HumanOutput::new("No such task, nothing to do");
        out.push_next_step("opsboard task list");
        out
    };
    if changed {
        human.push_next_step("opsboard task stats");
    }

    emit_success(
        opts.output,
        "task move",
        &MoveData {
            id: &opts.id,
            status: status.as_str(),
            changed,
        },
        Some(&human),
    )
}

#[derive(Serialize)]
struct RmData<'a> {
    id: &'a str,
    deleted: bool,
}

pub fn run_rm(opts: RmOptions) -> Result<()> {
    let mut store = open_store(&opts.config)?;
    let deleted = store.delete_task(&opts.id)?;

    let human = if deleted {
        let mut out = HumanOutput::new("Task removed");
        out.push_summary("id", &opts.id);
        out
    } else {
        HumanOutput::new("No such task, nothing to do")
    };

    emit_success(
        opts.output,
        "task rm",
        &RmData {
            id: &opts.id,
            deleted,
        },
        Some(&human),
    )
}

pub fn run_stats(opts: StatsOptions) -> Result<()> {
    let store = open_store(&opts.config)?;
    let stats = store.stats(Utc::now());

    let mut human = HumanOutput::new("Board stats");
    human.push_summary("total", stats.total.to_string());
    human.push_summary("todo", stats.todo.to_string());
    human.push_summary("progress", stats.progress.to_string());
    human.push_summary("done", stats.done.to_string());
    human.push_summary("overdue", stats.overdue.to_string());

    emit_success(opts.output, "task stats", &stats, Some(&human))
}
