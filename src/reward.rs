use crate::task::Difficulty;

pub const POMODORO_EXP: u64 = 20;
pub const POMODORO_COINS: u64 = 5;

/// Additive grant of experience and coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reward {
    pub exp: u64,
    pub coins: u64,
}

impl Reward {
    pub fn new(exp: u64, coins: u64) -> Self {
        Self { exp, coins }
    }
}

/// Fixed grant for a completed focus phase.
pub fn pomodoro_reward() -> Reward {
    Reward::new(POMODORO_EXP, POMODORO_COINS)
}

/// Coins are one per five experience, rounded up.
pub fn task_reward(difficulty: Difficulty) -> Reward {
    let exp = difficulty.exp_value();
    Reward::new(exp, exp.div_ceil(5))
}
