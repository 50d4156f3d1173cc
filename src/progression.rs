//! Level tiers and progress within a tier.

/// A contiguous experience range mapped to a level number and display name.
/// `max` is `None` for the unbounded top tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelTier {
    pub level: u32,
    pub name: &'static str,
    pub min: u64,
    pub max: Option<u64>,
}

impl LevelTier {
    pub fn contains(&self, exp: u64) -> bool {
        exp >= self.min && self.max.map_or(true, |max| exp <= max)
    }
}

/// All tiers, ordered and contiguous over `[0, ∞)`.
pub static LEVEL_TIERS: [LevelTier; 6] = [
    LevelTier {
        level: 1,
        name: "Novice",
        min: 0,
        max: Some(99),
    },
    LevelTier {
        level: 2,
        name: "Learner",
        min: 100,
        max: Some(299),
    },
    LevelTier {
        level: 3,
        name: "Explorer",
        min: 300,
        max: Some(599),
    },
    LevelTier {
        level: 4,
        name: "Achiever",
        min: 600,
        max: Some(999),
    },
    LevelTier {
        level: 5,
        name: "Pro",
        min: 1000,
        max: Some(1499),
    },
    LevelTier {
        level: 6,
        name: "Hero",
        min: 1500,
        max: None,
    },
];

pub fn level_for(exp: u64) -> &'static LevelTier {
    LEVEL_TIERS
        .iter()
        .find(|tier| tier.contains(exp))
        .unwrap_or(&LEVEL_TIERS[LEVEL_TIERS.len() - 1])
}

/// Fraction of `tier` completed at `exp`, in `[0, 1]`. Always 1.0 for the top tier.
pub fn progress_fraction(tier: &LevelTier, exp: u64) -> f64 {
    match tier.max {
        None => 1.0,
        Some(max) if max <= tier.min => 1.0,
        Some(max) => {
            let within = exp.clamp(tier.min, max) - tier.min;
            within as f64 / (max - tier.min) as f64
        }
    }
}

/// Whole-number percentage for gauges, capped at 100.
pub fn progress_percent(tier: &LevelTier, exp: u64) -> u16 {
    (progress_fraction(tier, exp) * 100.0).round().min(100.0) as u16
}

/// Experience at which the next level starts, shown as "next at N EXP".
pub fn next_threshold(level: u32) -> u64 {
    match level {
        1 => 100,
        2 => 300,
        3 => 600,
        4 => 1000,
        5 => 1500,
        _ => 1500,
    }
}
