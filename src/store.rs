//! Progression state and the task list, written through to a [`SlotStore`]
//! after every mutation.

use chrono::Utc;
use uuid::Uuid;

use crate::classifier::classify;
use crate::error::{LevelUpError, Result};
use crate::progression::{level_for, next_threshold, progress_percent};
use crate::reward::{pomodoro_reward, task_reward, Reward};
use crate::storage::{keys, load_list_or_skip, load_or_default, save, SlotStore};
use crate::task::{Task, TaskInput, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressionState {
    pub exp: u64,
    pub coins: u64,
    pub sessions_today: u64,
    pub focus_minutes_today: u64,
}

/// Derived profile figures for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub level: u32,
    pub tier_name: &'static str,
    pub exp: u64,
    pub coins: u64,
    pub progress_percent: u16,
    pub next_threshold: u64,
    pub sessions_today: u64,
    pub focus_minutes_today: u64,
    pub pending_tasks: usize,
    pub done_tasks: usize,
}

#[derive(Debug)]
pub struct ProgressionStore<S: SlotStore> {
    slots: S,
    state: ProgressionState,
    tasks: Vec<Task>,
}

impl<S: SlotStore> ProgressionStore<S> {
    /// Seed from persisted slots; anything missing or unreadable starts at zero/empty.
    pub fn load(slots: S) -> Self {
        let state = ProgressionState {
            exp: load_or_default(&slots, keys::EXPERIENCE),
            coins: load_or_default(&slots, keys::COINS),
            sessions_today: load_or_default(&slots, keys::SESSIONS_TODAY),
            focus_minutes_today: load_or_default(&slots, keys::FOCUS_MINUTES_TODAY),
        };
        let tasks: Vec<Task> = load_list_or_skip(&slots, keys::TASKS);
        tracing::debug!(?state, tasks = tasks.len(), "progression loaded");
        Self {
            slots,
            state,
            tasks,
        }
    }

    pub fn state(&self) -> ProgressionState {
        self.state
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut S {
        &mut self.slots
    }

    /// All tasks, newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.is_done())
    }

    pub fn completed_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.is_done())
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Resolve a unique id prefix to a task.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<&Task> {
        let mut matches = self.tasks.iter().filter(|t| t.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(task), None) if !prefix.is_empty() => Ok(task),
            (Some(_), _) => Err(LevelUpError::AmbiguousTaskId(prefix.to_string())),
            (None, _) => Err(LevelUpError::TaskNotFound(prefix.to_string())),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let tier = level_for(self.state.exp);
        Snapshot {
            level: tier.level,
            tier_name: tier.name,
            exp: self.state.exp,
            coins: self.state.coins,
            progress_percent: progress_percent(tier, self.state.exp),
            next_threshold: next_threshold(tier.level),
            sessions_today: self.state.sessions_today,
            focus_minutes_today: self.state.focus_minutes_today,
            pending_tasks: self.pending_tasks().count(),
            done_tasks: self.completed_tasks().count(),
        }
    }

    pub fn apply_reward(&mut self, reward: Reward) -> Result<()> {
        let before = level_for(self.state.exp).level;
        self.state.exp = self.state.exp.saturating_add(reward.exp);
        self.state.coins = self.state.coins.saturating_add(reward.coins);

        let tier = level_for(self.state.exp);
        if tier.level > before {
            tracing::info!(level = tier.level, name = tier.name, "level up");
        }
        tracing::debug!(exp = reward.exp, coins = reward.coins, "reward applied");

        save(&mut self.slots, keys::EXPERIENCE, &self.state.exp)?;
        save(&mut self.slots, keys::COINS, &self.state.coins)
    }

    pub fn record_pomodoro_completion(&mut self, focus_minutes: u32) -> Result<()> {
        self.state.sessions_today = self.state.sessions_today.saturating_add(1);
        self.state.focus_minutes_today = self
            .state
            .focus_minutes_today
            .saturating_add(u64::from(focus_minutes));
        self.apply_reward(pomodoro_reward())?;
        save(&mut self.slots, keys::SESSIONS_TODAY, &self.state.sessions_today)?;
        save(
            &mut self.slots,
            keys::FOCUS_MINUTES_TODAY,
            &self.state.focus_minutes_today,
        )
    }

    /// Classify and prepend a new pending task.
    pub fn add_task(&mut self, input: TaskInput) -> Result<&Task> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(LevelUpError::EmptyTitle);
        }
        let description = input.description.trim();
        let tags = classify(title, description);

        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category: tags.category,
            difficulty: tags.difficulty,
            exp_value: tags.exp_value,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        };
        tracing::debug!(id = %task.id, category = %task.category, difficulty = %task.difficulty, "task added");
        self.tasks.insert(0, task);

        save(&mut self.slots, keys::TASKS, &self.tasks)?;
        Ok(&self.tasks[0])
    }

    /// Flip a task between pending and done. Completing grants the task reward;
    /// undoing a completion keeps the reward already granted.
    pub fn toggle_task_completion(&mut self, id: &str) -> Result<TaskStatus> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| LevelUpError::TaskNotFound(id.to_string()))?;

        let reward = match task.status {
            TaskStatus::Pending => {
                task.status = TaskStatus::Done;
                task.completed_at = Some(Utc::now());
                Some(task_reward(task.difficulty))
            }
            TaskStatus::Done => {
                task.status = TaskStatus::Pending;
                task.completed_at = None;
                None
            }
        };
        let status = task.status;
        tracing::debug!(id, %status, "task toggled");

        save(&mut self.slots, keys::TASKS, &self.tasks)?;
        if let Some(reward) = reward {
            self.apply_reward(reward)?;
        }
        Ok(status)
    }
}
