//! Interactive board application.
//!
//! The terminal loop is synchronous: poll results arrive on a channel
//! fed by the tokio pollers and are drained between input events, and
//! the screen only redraws when something changed. Cards move either by
//! mouse drag or by a keyboard pick-and-drop that goes through the same
//! drag controller.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::board::{DragController, DragOutcome, Point, COLUMNS};
use crate::client::ApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::form::{FieldErrors, TaskDraft};
use crate::poller::{PollKind, PollState, PollUpdate, Poller};
use crate::remote::{ActivityFeed, BotStatus, TokenStats};
use crate::storage::Storage;
use crate::task::{Task, TaskStore};

use super::view;

const EVENT_POLL_MS: u64 = 120;

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormField {
    Title,
    Description,
    Priority,
    Due,
}

impl FormField {
    pub(crate) const ALL: [FormField; 4] = [
        FormField::Title,
        FormField::Description,
        FormField::Priority,
        FormField::Due,
    ];

    pub(crate) fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Priority => "Priority",
            FormField::Due => "Due date",
        }
    }

    /// Error key as the validator reports it.
    pub(crate) fn error_key(&self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Description => "description",
            FormField::Priority => "priority",
            FormField::Due => "dueDate",
        }
    }

    fn next(&self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Priority,
            FormField::Priority => FormField::Due,
            FormField::Due => FormField::Title,
        }
    }

    fn prev(&self) -> Self {
        match self {
            FormField::Title => FormField::Due,
            FormField::Description => FormField::Title,
            FormField::Priority => FormField::Description,
            FormField::Due => FormField::Priority,
        }
    }
}

/// Add-task form state bound to the modal.
pub(crate) struct FormState {
    pub(crate) draft: TaskDraft,
    pub(crate) field: FormField,
    pub(crate) errors: FieldErrors,
}

impl FormState {
    fn new() -> Self {
        Self {
            draft: TaskDraft::default(),
            field: FormField::Title,
            errors: FieldErrors::default(),
        }
    }

    pub(crate) fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.draft.title,
            FormField::Description => &self.draft.description,
            FormField::Priority => &self.draft.priority,
            FormField::Due => &self.draft.due_date,
        }
    }

    fn value_mut(&mut self) -> &mut String {
        match self.field {
            FormField::Title => &mut self.draft.title,
            FormField::Description => &mut self.draft.description,
            FormField::Priority => &mut self.draft.priority,
            FormField::Due => &mut self.draft.due_date,
        }
    }
}

pub struct AppState {
    pub(crate) store: TaskStore,
    pub(crate) token_stats: PollState<TokenStats>,
    pub(crate) activity: PollState<ActivityFeed>,
    pub(crate) bot: PollState<BotStatus>,
    pub(crate) tasks_loaded: bool,
    pub(crate) tasks_error: Option<String>,
    pub(crate) selected_column: usize,
    pub(crate) selected_row: usize,
    pub(crate) drag: DragController,
    pub(crate) drag_target: Option<usize>,
    pub(crate) form: Option<FormState>,
    pub(crate) status: Option<(StatusKind, String)>,
    /// Column rectangles from the last render, for mouse hit tests.
    pub(crate) column_areas: [Rect; 3],
}

impl AppState {
    pub fn new(store: TaskStore) -> Self {
        Self {
            tasks_loaded: !store.is_empty(),
            store,
            token_stats: PollState::default(),
            activity: PollState::default(),
            bot: PollState::default(),
            tasks_error: None,
            selected_column: 0,
            selected_row: 0,
            drag: DragController::new(),
            drag_target: None,
            form: None,
            status: None,
            column_areas: [Rect::default(); 3],
        }
    }

    pub(crate) fn column_tasks(&self, column: usize) -> Vec<&Task> {
        self.store.by_status(COLUMNS[column].status)
    }

    fn selected_task_id(&self) -> Option<String> {
        self.column_tasks(self.selected_column)
            .get(self.selected_row)
            .map(|task| task.id.clone())
    }

    fn clamp_selection(&mut self) {
        let len = self.column_tasks(self.selected_column).len();
        if len == 0 {
            self.selected_row = 0;
        } else if self.selected_row >= len {
            self.selected_row = len - 1;
        }
    }

    fn set_status(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.status = Some((kind, message.into()));
    }

    /// Merge one poll outcome into the view state.
    pub(crate) fn handle_update(&mut self, update: PollUpdate) {
        match update {
            PollUpdate::Tasks(snapshot) => {
                if !self.store.apply_remote(snapshot) {
                    debug!("tasks poll ignored, board has local edits");
                }
                self.tasks_loaded = true;
                self.tasks_error = None;
                self.clamp_selection();
            }
            PollUpdate::TokenStats(stats) => self.token_stats.apply_success(stats),
            PollUpdate::Activity(feed) => self.activity.apply_success(feed),
            PollUpdate::BotStatus(status) => self.bot.apply_success(status),
            PollUpdate::Failed { kind, message } => match kind {
                PollKind::Tasks => {
                    if !self.tasks_loaded {
                        self.tasks_error = Some(message);
                    }
                }
                PollKind::TokenStats => self.token_stats.apply_failure(message),
                PollKind::Activity => self.activity.apply_failure(message),
                PollKind::BotStatus => self.bot.apply_failure(message),
            },
        }
    }

    fn resolve_drop(&mut self, target: Option<usize>) {
        let target_status = target.map(|index| COLUMNS[index].status);
        let store = &self.store;
        let outcome = self
            .drag
            .pointer_up(target_status, |id| store.find(id).map(|task| task.status));
        self.drag_target = None;

        if let DragOutcome::Move { task_id, to } = outcome {
            match self.store.move_task(&task_id, to) {
                Ok(true) => {
                    self.set_status(StatusKind::Info, format!("Moved to {}", to.title()));
                    if let Some(index) = COLUMNS.iter().position(|col| col.status == to) {
                        self.selected_column = index;
                    }
                }
                Ok(false) => {}
                Err(err) => self.set_status(StatusKind::Error, err.to_string()),
            }
        }
        self.clamp_selection();
    }

    fn submit_form(&mut self) {
        let Some(form) = &mut self.form else {
            return;
        };
        match form.draft.validate() {
            Ok(input) => match self.store.add_task(input) {
                Ok(task) => {
                    self.form = None;
                    self.set_status(StatusKind::Info, format!("Created {}", task.id));
                }
                Err(err) => {
                    let message = err.to_string();
                    self.set_status(StatusKind::Error, message);
                }
            },
            Err(errors) => {
                form.errors = errors;
            }
        }
    }

    /// Column index containing the point, if any.
    fn column_at(&self, x: u16, y: u16) -> Option<usize> {
        self.column_areas.iter().position(|area| {
            x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
        })
    }

    /// Card under the point: (column, row index, task id).
    fn card_at(&self, x: u16, y: u16) -> Option<(usize, usize, String)> {
        let column = self.column_at(x, y)?;
        let area = self.column_areas[column];
        // First card renders one line below the column border.
        let row = (y.checked_sub(area.y + 1)?) as usize;
        let task = self.column_tasks(column).get(row)?.id.clone();
        Some((column, row, task))
    }
}

pub fn run(config: Config) -> Result<()> {
    let storage = Storage::from_config(&config.board)?;
    let store = TaskStore::load(storage)?;
    let client = Arc::new(ApiClient::new(config.api.clone())?);

    let runtime = tokio::runtime::Runtime::new()?;
    let (updates_tx, updates_rx) = tokio::sync::mpsc::unbounded_channel();
    let guard = runtime.enter();
    let pollers = Poller::spawn_all(client, &config.poll, &updates_tx);

    let mut app = AppState::new(store);
    let result = run_terminal(&mut app, updates_rx);

    drop(pollers);
    drop(guard);
    result
}

fn run_terminal(app: &mut AppState, updates_rx: UnboundedReceiver<PollUpdate>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app, updates_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    mut updates_rx: UnboundedReceiver<PollUpdate>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        while let Ok(update) = updates_rx.try_recv() {
            app.handle_update(update);
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Mouse(mouse) => {
                    handle_mouse(app, mouse);
                    dirty = true;
                }
                Event::Resize(_, _) => {
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Returns true when the app should quit.
pub(crate) fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if app.form.is_some() {
        handle_form_key(app, key);
        return false;
    }

    if app.drag.dragging().is_some() {
        handle_drag_key(app, key);
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('n') => {
            app.form = Some(FormState::new());
        }
        KeyCode::Left | KeyCode::Char('h') => {
            if app.selected_column > 0 {
                app.selected_column -= 1;
                app.clamp_selection();
            }
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if app.selected_column + 1 < COLUMNS.len() {
                app.selected_column += 1;
                app.clamp_selection();
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.selected_row = app.selected_row.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.selected_row += 1;
            app.clamp_selection();
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some(id) = app.selected_task_id() {
                app.drag.begin(&id);
                app.drag_target = Some(app.selected_column);
            }
        }
        KeyCode::Char('x') => {
            if let Some(id) = app.selected_task_id() {
                match app.store.delete_task(&id) {
                    Ok(true) => app.set_status(StatusKind::Info, format!("Removed {id}")),
                    Ok(false) => {}
                    Err(err) => app.set_status(StatusKind::Error, err.to_string()),
                }
                app.clamp_selection();
            }
        }
        _ => {}
    }
    false
}

fn handle_drag_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => {
            if let Some(target) = app.drag_target {
                app.drag_target = Some(target.saturating_sub(1));
            }
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if let Some(target) = app.drag_target {
                app.drag_target = Some((target + 1).min(COLUMNS.len() - 1));
            }
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            let target = app.drag_target;
            app.resolve_drop(target);
        }
        KeyCode::Esc => {
            app.resolve_drop(None);
        }
        _ => {}
    }
}

fn handle_form_key(app: &mut AppState, key: KeyEvent) {
    let Some(form) = &mut app.form else {
        return;
    };
    match key.code {
        KeyCode::Esc => {
            app.form = None;
        }
        KeyCode::Enter => app.submit_form(),
        KeyCode::Tab | KeyCode::Down => {
            form.field = form.field.next();
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.field = form.field.prev();
        }
        KeyCode::Backspace => {
            form.value_mut().pop();
        }
        KeyCode::Char(ch) => {
            form.value_mut().push(ch);
        }
        _ => {}
    }
}

pub(crate) fn handle_mouse(app: &mut AppState, mouse: MouseEvent) {
    if app.form.is_some() {
        return;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some((column, row, task_id)) = app.card_at(mouse.column, mouse.row) {
                app.selected_column = column;
                app.selected_row = row;
                app.drag
                    .pointer_down(&task_id, Point::new(mouse.column as f64, mouse.row as f64));
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.drag
                .pointer_moved(Point::new(mouse.column as f64, mouse.row as f64));
            if app.drag.dragging().is_some() {
                app.drag_target = app.column_at(mouse.column, mouse.row);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let target = app.column_at(mouse.column, mouse.row);
            app.resolve_drop(target);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{NewTask, TaskStatus};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn test_app() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf());
        let store = TaskStore::new(storage);
        (dir, AppState::new(store))
    }

    fn add(app: &mut AppState, title: &str) -> String {
        app.store
            .add_task(NewTask {
                title: title.to_string(),
                description: None,
                priority: Default::default(),
                due_date: None,
            })
            .expect("add")
            .id
    }

    fn layout_columns(app: &mut AppState) {
        app.column_areas = [
            Rect::new(0, 2, 20, 20),
            Rect::new(20, 2, 20, 20),
            Rect::new(40, 2, 20, 20),
        ];
    }

    #[test]
    fn keyboard_pick_and_drop_moves_one_card() {
        let (_dir, mut app) = test_app();
        let id = add(&mut app, "Card");

        assert!(!handle_key(&mut app, key(KeyCode::Char(' '))));
        assert_eq!(app.drag.dragging(), Some(id.as_str()));
        handle_key(&mut app, key(KeyCode::Right));
        handle_key(&mut app, key(KeyCode::Right));
        handle_key(&mut app, key(KeyCode::Enter));

        let task = app.store.find(&id).expect("task");
        assert_eq!(task.status, TaskStatus::Done);
        assert!(task.completed_at.is_some());
        assert!(app.drag.dragging().is_none());
    }

    #[test]
    fn escape_cancels_a_keyboard_drag() {
        let (_dir, mut app) = test_app();
        let id = add(&mut app, "Card");

        handle_key(&mut app, key(KeyCode::Enter));
        handle_key(&mut app, key(KeyCode::Esc));

        assert_eq!(app.store.find(&id).expect("task").status, TaskStatus::Todo);
        assert!(app.drag.dragging().is_none());
    }

    #[test]
    fn mouse_click_without_travel_does_not_move() {
        let (_dir, mut app) = test_app();
        let id = add(&mut app, "Card");
        layout_columns(&mut app);

        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 5, 3));
        handle_mouse(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 45, 3));

        assert_eq!(app.store.find(&id).expect("task").status, TaskStatus::Todo);
    }

    #[test]
    fn mouse_drag_past_threshold_moves_the_card() {
        let (_dir, mut app) = test_app();
        let id = add(&mut app, "Card");
        layout_columns(&mut app);

        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 5, 3));
        handle_mouse(&mut app, mouse(MouseEventKind::Drag(MouseButton::Left), 25, 3));
        handle_mouse(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 45, 3));

        assert_eq!(app.store.find(&id).expect("task").status, TaskStatus::Done);
    }

    #[test]
    fn form_collects_input_and_creates_a_task() {
        let (_dir, mut app) = test_app();

        handle_key(&mut app, key(KeyCode::Char('n')));
        for ch in "Ship".chars() {
            handle_key(&mut app, key(KeyCode::Char(ch)));
        }
        handle_key(&mut app, key(KeyCode::Tab));
        for ch in "notes".chars() {
            handle_key(&mut app, key(KeyCode::Char(ch)));
        }
        handle_key(&mut app, key(KeyCode::Enter));

        assert!(app.form.is_none());
        assert_eq!(app.store.tasks().len(), 1);
        assert_eq!(app.store.tasks()[0].title, "Ship");
        assert_eq!(app.store.tasks()[0].description.as_deref(), Some("notes"));
    }

    #[test]
    fn form_shows_field_errors_and_stays_open() {
        let (_dir, mut app) = test_app();

        handle_key(&mut app, key(KeyCode::Char('n')));
        handle_key(&mut app, key(KeyCode::Enter));

        let form = app.form.as_ref().expect("form still open");
        assert!(form.errors.get("title").is_some());
        assert!(app.store.is_empty());
    }

    #[test]
    fn poll_failures_keep_stale_remote_data() {
        let (_dir, mut app) = test_app();
        let status: BotStatus = serde_json::from_str(
            r#"{"model":"sim","contextUsed":1,"contextLimit":2,
                "activeSessions":1,"memoryFiles":0,"status":"idle"}"#,
        )
        .expect("status");

        app.handle_update(PollUpdate::BotStatus(status));
        app.handle_update(PollUpdate::Failed {
            kind: PollKind::BotStatus,
            message: "HTTP 500".to_string(),
        });

        assert!(app.bot.snapshot().is_some());
        assert_eq!(app.bot.error(), None);
    }

    #[test]
    fn tasks_error_only_before_first_load() {
        let (_dir, mut app) = test_app();
        app.handle_update(PollUpdate::Failed {
            kind: PollKind::Tasks,
            message: "connection refused".to_string(),
        });
        assert!(app.tasks_error.is_some());

        app.handle_update(PollUpdate::Tasks(crate::task::TaskSnapshot::empty()));
        assert!(app.tasks_error.is_none());
        assert!(app.tasks_loaded);

        app.handle_update(PollUpdate::Failed {
            kind: PollKind::Tasks,
            message: "HTTP 500".to_string(),
        });
        assert!(app.tasks_error.is_none());
    }

    #[test]
    fn quit_keys() {
        let (_dir, mut app) = test_app();
        assert!(handle_key(&mut app, key(KeyCode::Char('q'))));
        assert!(handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
        ));
    }
}
