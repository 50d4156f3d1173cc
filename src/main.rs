mod report;
mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Instant,
};

use levelup::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{AppEvent, Runner, SystemClock, TerminalEvents},
    storage::SqliteSlotStore,
    task::{TaskInput, TaskStatus},
    timer::{Phase, PhaseCompleted},
    tracker::Tracker,
};

/// gamified focus timer and task tracker
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Pomodoro focus cycles, a self-tagging task list, and an experience/level/coin progression, in your terminal. Run without a subcommand for the interactive dashboard."
)]
pub struct Cli {
    /// slot database to use instead of the configured one
    #[clap(long)]
    db: Option<PathBuf>,

    /// config file to read instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// show level, experience, coins and today's focus totals
    Status,
    /// list tasks, pending first
    Tasks,
    /// add a task; category and difficulty are tagged automatically
    Add {
        title: String,
        #[clap(short, long, default_value = "")]
        description: String,
    },
    /// mark a task done, or reopen a done task (id prefix is enough)
    Toggle { id: String },
    /// show or change pomodoro settings
    Settings {
        /// focus length in minutes
        #[clap(long, value_parser = clap::value_parser!(u32).range(10..=90))]
        focus: Option<u32>,
        /// break length in minutes
        #[clap(long = "break", value_parser = clap::value_parser!(u32).range(3..=30))]
        break_minutes: Option<u32>,
        /// start breaks automatically when a focus phase ends
        #[clap(long)]
        auto_break: Option<bool>,
    },
    /// show or change the config file
    Config {
        /// default slot database
        #[clap(long)]
        db_path: Option<PathBuf>,
        /// default log filter, used when LEVELUP_LOG is unset
        #[clap(long)]
        log_filter: Option<String>,
        /// delay before a break starts on its own, in milliseconds
        #[clap(long)]
        auto_start_delay_ms: Option<u64>,
    },
}

impl Cli {
    fn resolve_db_path(&self, config: &Config) -> PathBuf {
        self.db
            .clone()
            .or_else(|| config.db_path.clone())
            .or_else(AppDirs::db_path)
            .unwrap_or_else(|| PathBuf::from("levelup.db"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Browse,
    EditTitle,
    EditDescription,
}

#[derive(Debug)]
pub struct App {
    pub tracker: Tracker<SqliteSlotStore>,
    pub mode: InputMode,
    pub draft: TaskInput,
    pub selected: usize,
    pub message: Option<String>,
}

impl App {
    pub fn new(tracker: Tracker<SqliteSlotStore>) -> Self {
        Self {
            tracker,
            mode: InputMode::Browse,
            draft: TaskInput::default(),
            selected: 0,
            message: None,
        }
    }

    /// Task ids in display order: pending first, then completed.
    pub fn visible_task_ids(&self) -> Vec<String> {
        let progress = self.tracker.progress();
        progress
            .pending_tasks()
            .chain(progress.completed_tasks())
            .map(|t| t.id.clone())
            .collect()
    }

    pub fn on_tick(&mut self, now: Instant) {
        let completed = self.tracker.poll(now);
        self.on_completed(completed);
    }

    pub fn on_completed(&mut self, completed: levelup::Result<Option<PhaseCompleted>>) {
        match completed {
            Ok(Some(PhaseCompleted {
                phase: Phase::Focus,
                focus_minutes,
            })) => {
                let reward = levelup::reward::pomodoro_reward();
                self.message = Some(format!(
                    "Focus complete: {} minutes, +{} EXP, +{} coins",
                    focus_minutes, reward.exp, reward.coins
                ));
            }
            Ok(Some(PhaseCompleted {
                phase: Phase::Break,
                ..
            })) => {
                self.message = Some("Break over, ready to focus".to_string());
            }
            Ok(None) => {}
            Err(e) => self.report_error(e),
        }
    }

    /// Returns true when the app should exit.
    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        match self.mode {
            InputMode::Browse => return self.on_browse_key(key, now),
            InputMode::EditTitle | InputMode::EditDescription => self.on_edit_key(key),
        }
        false
    }

    fn on_browse_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        // apply any tick that came due before the key, so a pause cannot swallow it
        self.on_tick(now);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Char(' ') => self.tracker.toggle_running(now),
            KeyCode::Char('r') => self.tracker.reset(),
            KeyCode::Char('f') => self.tracker.switch_phase(Phase::Focus),
            KeyCode::Char('b') => self.tracker.switch_phase(Phase::Break),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.update_settings(|s| s.nudge_focus(1));
            }
            KeyCode::Char('-') => self.update_settings(|s| s.nudge_focus(-1)),
            KeyCode::Char(']') => self.update_settings(|s| s.nudge_break(1)),
            KeyCode::Char('[') => self.update_settings(|s| s.nudge_break(-1)),
            KeyCode::Char('a') => self.update_settings(|mut s| {
                s.auto_start_break = !s.auto_start_break;
                s
            }),
            KeyCode::Char('n') => {
                self.draft = TaskInput::default();
                self.mode = InputMode::EditTitle;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let count = self.visible_task_ids().len();
                if self.selected + 1 < count {
                    self.selected += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char('x') => self.toggle_selected(),
            _ => {}
        }
        false
    }

    fn on_edit_key(&mut self, key: KeyEvent) {
        let field = match self.mode {
            InputMode::EditDescription => &mut self.draft.description,
            _ => &mut self.draft.title,
        };
        match key.code {
            KeyCode::Esc => {
                self.draft = TaskInput::default();
                self.mode = InputMode::Browse;
            }
            KeyCode::Tab => {
                self.mode = match self.mode {
                    InputMode::EditTitle => InputMode::EditDescription,
                    _ => InputMode::EditTitle,
                };
            }
            KeyCode::Backspace => {
                field.pop();
            }
            KeyCode::Char(c) => field.push(c),
            KeyCode::Enter => self.submit_draft(),
            _ => {}
        }
    }

    fn submit_draft(&mut self) {
        if self.draft.title.trim().is_empty() {
            // nothing to add yet, keep editing
            self.mode = InputMode::EditTitle;
            return;
        }
        let input = std::mem::take(&mut self.draft);
        match self.tracker.progress_mut().add_task(input) {
            Ok(task) => {
                self.message = Some(format!(
                    "Added \"{}\" ({})",
                    task.title,
                    report::tags_line(task)
                ));
                self.selected = 0;
            }
            Err(e) => self.report_error(e),
        }
        self.mode = InputMode::Browse;
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.visible_task_ids().get(self.selected).cloned() else {
            return;
        };
        match self.tracker.progress_mut().toggle_task_completion(&id) {
            Ok(TaskStatus::Done) => {
                if let Some(task) = self.tracker.progress().task(&id) {
                    let reward = levelup::reward::task_reward(task.difficulty);
                    self.message = Some(format!(
                        "Completed \"{}\": +{} EXP, +{} coins",
                        task.title, reward.exp, reward.coins
                    ));
                }
            }
            Ok(TaskStatus::Pending) => self.message = Some("Task reopened".to_string()),
            Err(e) => self.report_error(e),
        }
        let count = self.visible_task_ids().len();
        self.selected = self.selected.min(count.saturating_sub(1));
    }

    fn update_settings<F>(&mut self, change: F)
    where
        F: FnOnce(levelup::timer::TimerSettings) -> levelup::timer::TimerSettings,
    {
        let settings = change(self.tracker.timer().settings());
        if let Err(e) = self.tracker.update_settings(settings) {
            self.report_error(e);
        }
    }

    fn report_error(&mut self, e: levelup::LevelUpError) {
        tracing::warn!(error = %e, "operation failed");
        self.message = Some(format!("error: {}", e));
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_store = cli
        .config
        .as_ref()
        .map(FileConfigStore::with_path)
        .unwrap_or_default();
    let config = config_store.load();
    let db_path = cli.resolve_db_path(&config);

    if let Some(command) = cli.command.clone() {
        logging::init_stderr(&config.log_filter);
        let mut tracker = Tracker::load(SqliteSlotStore::open(&db_path)?);
        return report::run(command, &mut tracker, &config_store, &mut io::stdout());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(log_path) = AppDirs::log_path() {
        logging::init_file(&log_path, &config.log_filter)?;
    }
    tracing::info!(db = %db_path.display(), "starting levelup");

    let tracker = Tracker::load(SqliteSlotStore::open(&db_path)?)
        .with_auto_start_delay(config.auto_start_delay());
    let mut app = App::new(tracker);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(TerminalEvents, SystemClock);

    terminal.draw(|f| ui::draw(app, f))?;
    loop {
        let update = runner.step(&mut app.tracker);
        app.on_completed(update.completed);
        if let AppEvent::Key(key) = update.event {
            if app.on_key(key, update.now) {
                break;
            }
        }
        terminal.draw(|f| ui::draw(app, f))?;
    }

    // leaving the loop drops any scheduled countdown with the app
    tracing::info!("exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelup::timer::TimerState;
    use std::time::Duration;

    fn app() -> App {
        App::new(Tracker::load(SqliteSlotStore::open_in_memory().unwrap()))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.on_key(key(KeyCode::Char(c)), Instant::now());
        }
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["levelup"]);
        assert_eq!(cli.db, None);
        assert_eq!(cli.command, None);
    }

    #[test]
    fn test_cli_add_with_description() {
        let cli = Cli::parse_from(["levelup", "add", "Gym session", "-d", "legs day"]);
        assert_eq!(
            cli.command,
            Some(Command::Add {
                title: "Gym session".to_string(),
                description: "legs day".to_string()
            })
        );
    }

    #[test]
    fn test_cli_settings_ranges() {
        let cli = Cli::parse_from(["levelup", "settings", "--focus", "50", "--break", "10"]);
        assert_eq!(
            cli.command,
            Some(Command::Settings {
                focus: Some(50),
                break_minutes: Some(10),
                auto_break: None
            })
        );
        assert!(Cli::try_parse_from(["levelup", "settings", "--focus", "5"]).is_err());
        assert!(Cli::try_parse_from(["levelup", "settings", "--break", "45"]).is_err());
    }

    #[test]
    fn test_db_flag_overrides_config() {
        let cli = Cli::parse_from(["levelup", "--db", "/tmp/a.db"]);
        let config = Config {
            db_path: Some(PathBuf::from("/tmp/b.db")),
            ..Config::default()
        };
        assert_eq!(cli.resolve_db_path(&config), PathBuf::from("/tmp/a.db"));

        let cli = Cli::parse_from(["levelup"]);
        assert_eq!(cli.resolve_db_path(&config), PathBuf::from("/tmp/b.db"));
    }

    #[test]
    fn space_starts_and_pauses_timer() {
        let mut app = app();
        app.on_key(key(KeyCode::Char(' ')), Instant::now());
        assert_eq!(app.tracker.timer().state(), TimerState::Running);
        app.on_key(key(KeyCode::Char(' ')), Instant::now());
        assert_eq!(app.tracker.timer().state(), TimerState::Paused);
    }

    #[test]
    fn focus_completion_sets_message() {
        let mut app = app();
        let t0 = Instant::now();
        app.on_key(key(KeyCode::Char(' ')), t0);
        app.on_tick(t0 + Duration::from_secs(25 * 60));
        assert_eq!(app.tracker.progress().state().sessions_today, 1);
        assert!(app.message.as_deref().unwrap().contains("Focus complete"));
    }

    #[test]
    fn pause_key_after_deadline_still_completes_focus() {
        let mut app = app();
        let t0 = Instant::now();
        app.on_key(key(KeyCode::Char(' ')), t0);
        // no tick was delivered between the deadline and the key press
        app.on_key(
            key(KeyCode::Char(' ')),
            t0 + Duration::from_secs(25 * 60) + Duration::from_millis(50),
        );
        assert_eq!(app.tracker.progress().state().sessions_today, 1);
        assert_eq!(app.tracker.timer().phase(), Phase::Break);
        assert!(app.message.as_deref().unwrap().contains("Focus complete"));
    }

    #[test]
    fn add_task_through_editor() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('n')), Instant::now());
        assert_eq!(app.mode, InputMode::EditTitle);
        type_text(&mut app, "Yoga");
        app.on_key(key(KeyCode::Tab), Instant::now());
        type_text(&mut app, "morning");
        app.on_key(key(KeyCode::Enter), Instant::now());

        assert_eq!(app.mode, InputMode::Browse);
        let tasks = app.tracker.progress().tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Yoga");
        assert_eq!(tasks[0].description, "morning");
    }

    #[test]
    fn keys_while_editing_do_not_control_timer() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('n')), Instant::now());
        type_text(&mut app, "q r");
        assert_eq!(app.tracker.timer().state(), TimerState::Idle);
        assert_eq!(app.draft.title, "q r");
        app.on_key(key(KeyCode::Esc), Instant::now());
        assert_eq!(app.mode, InputMode::Browse);
        assert!(app.draft.title.is_empty());
    }

    #[test]
    fn blank_title_keeps_editor_open() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('n')), Instant::now());
        app.on_key(key(KeyCode::Enter), Instant::now());
        assert_eq!(app.mode, InputMode::EditTitle);
        assert!(app.tracker.progress().tasks().is_empty());
    }

    #[test]
    fn enter_toggles_selected_task() {
        let mut app = app();
        app.tracker
            .progress_mut()
            .add_task(TaskInput::new("Read a paper", ""))
            .unwrap();
        app.on_key(key(KeyCode::Enter), Instant::now());
        assert_eq!(app.tracker.progress().state().exp, 10);
        assert!(app.message.as_deref().unwrap().contains("+10 EXP"));

        app.on_key(key(KeyCode::Enter), Instant::now());
        assert_eq!(app.tracker.progress().completed_tasks().count(), 0);
        assert_eq!(app.tracker.progress().state().exp, 10);
    }

    #[test]
    fn settings_keys_adjust_and_persist() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('+')), Instant::now());
        app.on_key(key(KeyCode::Char('[')), Instant::now());
        app.on_key(key(KeyCode::Char('a')), Instant::now());
        let s = app.tracker.timer().settings();
        assert_eq!((s.focus_minutes, s.break_minutes), (30, 4));
        assert!(!s.auto_start_break);
        assert_eq!(app.tracker.timer().seconds_remaining(), 30 * 60);
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut app = app();
        app.on_key(key(KeyCode::Down), Instant::now());
        assert_eq!(app.selected, 0);
        for title in ["one", "two"] {
            app.tracker
                .progress_mut()
                .add_task(TaskInput::new(title, ""))
                .unwrap();
        }
        app.on_key(key(KeyCode::Down), Instant::now());
        app.on_key(key(KeyCode::Down), Instant::now());
        assert_eq!(app.selected, 1);
        app.on_key(key(KeyCode::Up), Instant::now());
        app.on_key(key(KeyCode::Up), Instant::now());
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert!(app.on_key(key(KeyCode::Char('q')), Instant::now()));
        assert!(app.on_key(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Instant::now()
        ));
    }
}
