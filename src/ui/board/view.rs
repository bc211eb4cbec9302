//! Board rendering. Pure layout and styling; all state lives in
//! [`AppState`].

use chrono::Utc;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

use crate::board::COLUMNS;
use crate::remote::{format_count, format_time_ago, BotState};
use crate::task::{Priority, Task};

use super::app::{AppState, FormField, StatusKind};

const ACTIVITY_ROWS: u16 = 8;

pub fn render(frame: &mut Frame, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(ACTIVITY_ROWS),
            Constraint::Length(1),
        ])
        .split(frame.size());

    render_header(frame, app, chunks[0]);
    render_columns(frame, app, chunks[1]);
    render_remote_panels(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);

    if app.form.is_some() {
        render_form(frame, app, frame.size());
    }
}

fn render_header(frame: &mut Frame, app: &AppState, area: Rect) {
    let stats = app.store.stats(Utc::now());
    let mut spans = vec![
        Span::styled("opsboard", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            "  {} tasks | {} todo | {} in progress | {} done",
            stats.total, stats.todo, stats.progress, stats.done
        )),
    ];
    if stats.overdue > 0 {
        spans.push(Span::styled(
            format!(" | {} overdue", stats.overdue),
            Style::default().fg(Color::Red),
        ));
    }

    let bot_line = match (app.bot.snapshot(), app.bot.error()) {
        (Some(bot), _) => {
            let color = match bot.status {
                BotState::Active => Color::Green,
                BotState::Busy => Color::Yellow,
                BotState::Idle => Color::DarkGray,
            };
            Line::from(vec![
                Span::styled(bot.status.as_str(), Style::default().fg(color)),
                Span::raw(format!(
                    "  {}  ctx {:.0}%  {} session(s)  {} memory file(s)",
                    bot.model,
                    bot.context_percentage(),
                    bot.active_sessions,
                    bot.memory_files
                )),
            ])
        }
        (None, Some(err)) => Line::from(Span::styled(
            format!("bot status unavailable: {err}"),
            Style::default().fg(Color::Red),
        )),
        (None, None) => Line::from(Span::styled(
            "bot status loading...",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let paragraph = Paragraph::new(vec![Line::from(spans), bot_line])
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(paragraph, area);
}

fn render_columns(frame: &mut Frame, app: &mut AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(34),
            Constraint::Percentage(33),
        ])
        .split(area);

    for (index, column) in COLUMNS.iter().enumerate() {
        app.column_areas[index] = chunks[index];
        let tasks = app.column_tasks(index);
        let dragging = app.drag.dragging();

        let border_style = if app.drag_target == Some(index) && dragging.is_some() {
            Style::default().fg(Color::Yellow)
        } else if app.selected_column == index {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };

        let items: Vec<ListItem> = tasks
            .iter()
            .enumerate()
            .map(|(row, task)| {
                let selected = app.selected_column == index && app.selected_row == row;
                let is_dragged = dragging == Some(task.id.as_str());
                ListItem::new(card_line(task, selected, is_dragged))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!("{} ({})", column.title, tasks.len())),
        );
        frame.render_widget(list, chunks[index]);
    }

    if let Some(err) = &app.tasks_error {
        let banner = Paragraph::new(format!("tasks unavailable: {err}"))
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        let line = Rect {
            y: area.y + area.height / 2,
            height: 1,
            ..area
        };
        frame.render_widget(banner, line);
    }
}

fn card_line(task: &Task, selected: bool, dragged: bool) -> Line<'static> {
    let now = Utc::now();
    let priority_color = match task.priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    };

    let mut spans = Vec::new();
    if dragged {
        spans.push(Span::styled("» ", Style::default().fg(Color::Yellow)));
    }
    spans.push(Span::styled("● ", Style::default().fg(priority_color)));
    let mut title_style = Style::default();
    if selected {
        title_style = title_style.add_modifier(Modifier::REVERSED);
    }
    spans.push(Span::styled(task.title.clone(), title_style));
    if task.is_overdue(now) {
        spans.push(Span::styled(" overdue", Style::default().fg(Color::Red)));
    } else if let Some(days) = task.days_until_due(now) {
        spans.push(Span::styled(
            format!(" {days}d"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn render_remote_panels(frame: &mut Frame, app: &AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_activity(frame, app, chunks[0]);
    render_tokens(frame, app, chunks[1]);
}

fn render_activity(frame: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Activity");
    let now = Utc::now();

    let body: Vec<Line> = match (app.activity.snapshot(), app.activity.error()) {
        (Some(feed), _) => feed
            .activities
            .iter()
            .take(area.height.saturating_sub(2) as usize)
            .map(|item| {
                Line::from(vec![
                    Span::styled(
                        format!("{} ", item.kind.symbol()),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(item.title.clone()),
                    Span::styled(
                        format!("  {}", format_time_ago(item.timestamp, now)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect(),
        (None, Some(err)) => vec![Line::from(Span::styled(
            format!("unavailable: {err}"),
            Style::default().fg(Color::Red),
        ))],
        (None, None) => vec![Line::from(Span::styled(
            "loading...",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    frame.render_widget(Paragraph::new(body).block(block), area);
}

fn render_tokens(frame: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Tokens");

    let body: Vec<Line> = match (app.token_stats.snapshot(), app.token_stats.error()) {
        (Some(stats), _) => vec![
            Line::from(format!(
                "today: {}",
                format_count(stats.summary.total_tokens_today)
            )),
            Line::from(format!(
                "avg ctx: {:.1}%  peak: {}",
                stats.summary.avg_context_usage, stats.summary.peak_api_hour
            )),
            Line::from(format!(
                "tasks: {}/{} ({:.0}%), {} left",
                stats.task_progress.completed,
                stats.task_progress.total,
                stats.task_progress.percentage,
                stats.task_progress.remaining()
            )),
            Line::from(format!("efficiency: {:.1}%", stats.summary.efficiency)),
        ],
        (None, Some(err)) => vec![Line::from(Span::styled(
            format!("unavailable: {err}"),
            Style::default().fg(Color::Red),
        ))],
        (None, None) => vec![Line::from(Span::styled(
            "loading...",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    frame.render_widget(Paragraph::new(body).block(block), area);
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let line = match &app.status {
        Some((StatusKind::Error, message)) => {
            Line::from(Span::styled(message.clone(), Style::default().fg(Color::Red)))
        }
        Some((StatusKind::Info, message)) => Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Green),
        )),
        None => {
            if app.drag.dragging().is_some() {
                Line::from("←/→ choose column | enter drop | esc cancel")
            } else {
                Line::from("n new | space pick up | x delete | arrows move | q quit")
            }
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_form(frame: &mut Frame, app: &AppState, area: Rect) {
    let Some(form) = &app.form else {
        return;
    };

    let width = area.width.min(52);
    let height = area.height.min(12);
    let modal = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    let mut lines = Vec::new();
    for field in FormField::ALL {
        let active = form.field == field;
        let marker = if active { "> " } else { "  " };
        let mut value = form.value(field).to_string();
        if active {
            value.push('_');
        }
        let style = if active {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{marker}{}: {value}", field.label()),
            style,
        )));
        if let Some(message) = form.errors.get(field.error_key()) {
            lines.push(Line::from(Span::styled(
                format!("    {message}"),
                Style::default().fg(Color::Red),
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "tab next field | enter add | esc close",
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Clear, modal);
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Add Task"));
    frame.render_widget(paragraph, modal);
}
