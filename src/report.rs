use itertools::Itertools;
use std::error::Error;
use std::io::Write;

use levelup::{
    config::ConfigStore,
    reward::task_reward,
    storage::SlotStore,
    store::Snapshot,
    task::{Task, TaskInput, TaskStatus},
    tracker::Tracker,
};

use crate::Command;

const SHORT_ID_LEN: usize = 8;

pub fn short_id(task: &Task) -> &str {
    task.id.get(..SHORT_ID_LEN).unwrap_or(&task.id)
}

/// "Category • Difficulty • +N EXP"
pub fn tags_line(task: &Task) -> String {
    [
        task.category.to_string(),
        task.difficulty.to_string(),
        format!("+{} EXP", task.exp_value),
    ]
    .iter()
    .join(" • ")
}

pub fn progress_bar(percent: u16, width: usize) -> String {
    let filled = (percent.min(100) as usize * width).div_ceil(100).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn write_status<W: Write>(out: &mut W, snap: &Snapshot) -> std::io::Result<()> {
    writeln!(
        out,
        "Level {} {}  {} {}%  next at {} EXP",
        snap.level,
        snap.tier_name,
        progress_bar(snap.progress_percent, 20),
        snap.progress_percent,
        snap.next_threshold
    )?;
    writeln!(out, "EXP {}  Coins {}", snap.exp, snap.coins)?;
    writeln!(
        out,
        "Today: {} minutes focused • {} pomodoro sessions",
        snap.focus_minutes_today, snap.sessions_today
    )?;
    writeln!(
        out,
        "Tasks: {} pending • {} done",
        snap.pending_tasks, snap.done_tasks
    )
}

fn write_task<W: Write>(out: &mut W, task: &Task) -> std::io::Result<()> {
    let mark = if task.is_done() { "x" } else { " " };
    writeln!(
        out,
        "{}  [{}] {}  {}",
        short_id(task),
        mark,
        task.title,
        tags_line(task)
    )
}

/// Run a headless subcommand against the tracker, writing human-readable output.
pub fn run<S, C, W>(
    command: Command,
    tracker: &mut Tracker<S>,
    config_store: &C,
    out: &mut W,
) -> Result<(), Box<dyn Error>>
where
    S: SlotStore,
    C: ConfigStore,
    W: Write,
{
    match command {
        Command::Status => {
            write_status(out, &tracker.progress().snapshot())?;
            let s = tracker.timer().settings();
            writeln!(
                out,
                "Timer: focus {}m, break {}m, auto-break {}",
                s.focus_minutes,
                s.break_minutes,
                if s.auto_start_break { "on" } else { "off" }
            )?;
        }
        Command::Tasks => {
            let progress = tracker.progress();
            if progress.tasks().is_empty() {
                writeln!(out, "No tasks yet. Add one to start leveling up.")?;
            }
            for task in progress.pending_tasks().chain(progress.completed_tasks()) {
                write_task(out, task)?;
            }
        }
        Command::Add { title, description } => {
            let task = tracker
                .progress_mut()
                .add_task(TaskInput::new(title, description))?;
            writeln!(
                out,
                "Added {} \"{}\" ({})",
                short_id(task),
                task.title,
                tags_line(task)
            )?;
        }
        Command::Toggle { id } => {
            let id = tracker.progress().find_by_prefix(&id)?.id.clone();
            let status = tracker.progress_mut().toggle_task_completion(&id)?;
            let task = tracker
                .progress()
                .task(&id)
                .ok_or_else(|| levelup::LevelUpError::TaskNotFound(id.clone()))?;
            match status {
                TaskStatus::Done => {
                    let reward = task_reward(task.difficulty);
                    writeln!(
                        out,
                        "Completed \"{}\": +{} EXP, +{} coins",
                        task.title, reward.exp, reward.coins
                    )?;
                }
                TaskStatus::Pending => {
                    writeln!(out, "Reopened \"{}\" (reward kept)", task.title)?;
                }
            }
        }
        Command::Settings {
            focus,
            break_minutes,
            auto_break,
        } => {
            let mut settings = tracker.timer().settings();
            if let Some(focus) = focus {
                settings.focus_minutes = focus;
            }
            if let Some(minutes) = break_minutes {
                settings.break_minutes = minutes;
            }
            if let Some(auto) = auto_break {
                settings.auto_start_break = auto;
            }
            if settings != tracker.timer().settings() {
                tracker.update_settings(settings.clamped())?;
            }
            let s = tracker.timer().settings();
            writeln!(
                out,
                "focus {}m, break {}m, auto-break {}",
                s.focus_minutes,
                s.break_minutes,
                if s.auto_start_break { "on" } else { "off" }
            )?;
        }
        Command::Config {
            db_path,
            log_filter,
            auto_start_delay_ms,
        } => {
            let mut config = config_store.load();
            let before = config.clone();
            if let Some(path) = db_path {
                config.db_path = Some(path);
            }
            if let Some(filter) = log_filter {
                config.log_filter = filter;
            }
            if let Some(ms) = auto_start_delay_ms {
                config.auto_start_delay_ms = ms;
            }
            if config != before {
                config_store.save(&config)?;
            }
            let db = config
                .db_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(state directory)".to_string());
            writeln!(out, "db_path: {}", db)?;
            writeln!(out, "log_filter: {}", config.log_filter)?;
            writeln!(out, "auto_start_delay_ms: {}", config.auto_start_delay_ms)?;
        }
    }
    Ok(())
}
