use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Category tags decode leniently: a tag this build does not know becomes
/// `Skill`, the classifier's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
pub enum Category {
    Strength,
    Intelligence,
    #[serde(rename = "Will Power")]
    #[strum(serialize = "Will Power")]
    WillPower,
    Skill,
    Charisma,
}

impl Category {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Strength" => Some(Category::Strength),
            "Intelligence" => Some(Category::Intelligence),
            "Will Power" => Some(Category::WillPower),
            "Skill" => Some(Category::Skill),
            "Charisma" => Some(Category::Charisma),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Category::from_tag(&tag).unwrap_or_else(|| {
            tracing::warn!(tag = %tag, "unknown task category, using Skill");
            Category::Skill
        }))
    }
}

/// `Unrecognized` stands in for any stored difficulty tag outside the known
/// three; it is never produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Unrecognized,
}

impl Difficulty {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Easy" => Difficulty::Easy,
            "Medium" => Difficulty::Medium,
            "Hard" => Difficulty::Hard,
            _ => Difficulty::Unrecognized,
        }
    }

    /// Experience granted for completing a task of this difficulty.
    pub fn exp_value(self) -> u64 {
        match self {
            Difficulty::Easy | Difficulty::Unrecognized => 10,
            Difficulty::Medium => 20,
            Difficulty::Hard => 30,
        }
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        let difficulty = Difficulty::from_tag(&tag);
        if difficulty == Difficulty::Unrecognized && tag != "Unrecognized" {
            tracing::warn!(tag = %tag, "unknown task difficulty");
        }
        Ok(difficulty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Done,
}

/// Free-text task as submitted by the user, before classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
}

impl TaskInput {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub difficulty: Difficulty,
    #[serde(rename = "expValue")]
    pub exp_value: u64,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}
