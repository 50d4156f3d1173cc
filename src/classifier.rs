//! Keyword rules that tag free-text tasks with a category and difficulty.
//!
//! Rules are evaluated in a fixed order and the first match wins. Patterns are
//! plain substring alternations over the lower-cased `"{title} {description}"`.

use regex::Regex;
use std::sync::LazyLock;

use crate::task::{Category, Difficulty};

/// Texts shorter than this are considered quick tasks.
pub const EASY_TEXT_LEN: usize = 30;

static CATEGORY_RULES: LazyLock<Vec<(Category, Regex)>> = LazyLock::new(|| {
    [
        (
            Category::Strength,
            "workout|run|gym|pushup|yoga|walk|cycle|exercise",
        ),
        (
            Category::Intelligence,
            "study|read|learn|course|math|science|research",
        ),
        (
            Category::WillPower,
            "meditate|fast|habit|quit|discipline|journal",
        ),
        (Category::Skill, "code|design|practice|build|prototype|write"),
        (Category::Charisma, "network|social|call|meeting|present|speak"),
    ]
    .into_iter()
    .map(|(category, pattern)| (category, Regex::new(pattern).unwrap()))
    .collect()
});

static HARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("hard|long|complex|deadline|exam|marathon").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub difficulty: Difficulty,
    pub exp_value: u64,
}

pub fn classify(title: &str, description: &str) -> Classification {
    let text = format!("{title} {description}").to_lowercase();

    let category = CATEGORY_RULES
        .iter()
        .find(|(_, re)| re.is_match(&text))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Skill);

    let mut difficulty = Difficulty::Medium;
    if text.chars().count() < EASY_TEXT_LEN {
        difficulty = Difficulty::Easy;
    }
    // checked last so flagged short texts still end up Hard
    if HARD_RE.is_match(&text) {
        difficulty = Difficulty::Hard;
    }

    Classification {
        category,
        difficulty,
        exp_value: difficulty.exp_value(),
    }
}
