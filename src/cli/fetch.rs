//! One-shot fetches of the remote dashboard resources.
//!
//! `status`, `activity` and `tokens` each do a single GET and print the
//! result, so the data endpoint can be inspected without opening the TUI.

use chrono::Utc;

use crate::client::ApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::remote::{format_count, format_time_ago};

pub struct FetchOptions {
    pub config: Config,
    pub output: OutputOptions,
}

pub struct ActivityOptions {
    pub limit: usize,
    pub config: Config,
    pub output: OutputOptions,
}

fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new()?;
    Ok(runtime.block_on(future))
}

pub fn run_status(opts: FetchOptions) -> Result<()> {
    let client = ApiClient::new(opts.config.api)?;
    let status = block_on(client.fetch_bot_status())??;

    let mut human = HumanOutput::new(format!("Bot is {}", status.status.as_str()));
    human.push_summary("model", &status.model);
    human.push_summary(
        "context",
        format!(
            "{} / {} ({:.1}%)",
            format_count(status.context_used),
            format_count(status.context_limit),
            status.context_percentage()
        ),
    );
    human.push_summary("sessions", status.active_sessions.to_string());
    human.push_summary("memory files", status.memory_files.to_string());

    emit_success(opts.output, "status", &status, Some(&human))
}

pub fn run_activity(opts: ActivityOptions) -> Result<()> {
    let client = ApiClient::new(opts.config.api)?;
    let mut feed = block_on(client.fetch_activity())??;
    feed.activities.truncate(opts.limit);

    let now = Utc::now();
    let mut human = HumanOutput::new(format!("{} activity item(s)", feed.activities.len()));
    for item in &feed.activities {
        human.push_detail(format!(
            "{} {} ({}) {}",
            item.kind.symbol(),
            item.title,
            format_time_ago(item.timestamp, now),
            item.description
        ));
    }

    emit_success(opts.output, "activity", &feed, Some(&human))
}

pub fn run_tokens(opts: FetchOptions) -> Result<()> {
    let client = ApiClient::new(opts.config.api)?;
    let stats = block_on(client.fetch_token_stats())??;

    let mut human = HumanOutput::new("Token usage");
    human.push_summary(
        "tokens today",
        format_count(stats.summary.total_tokens_today),
    );
    human.push_summary(
        "avg context",
        format!("{:.1}%", stats.summary.avg_context_usage),
    );
    human.push_summary("peak API hour", &stats.summary.peak_api_hour);
    human.push_summary("efficiency", format!("{:.1}%", stats.summary.efficiency));
    human.push_summary(
        "task progress",
        format!(
            "{}/{} ({:.0}%)",
            stats.task_progress.completed,
            stats.task_progress.total,
            stats.task_progress.percentage
        ),
    );

    emit_success(opts.output, "tokens", &stats, Some(&human))
}
