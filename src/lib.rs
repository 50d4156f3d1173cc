// Library surface for the binary, headless use, and integration tests.
// Rendering lives with the binary; keep this free of terminal drawing.
pub mod app_dirs;
pub mod classifier;
pub mod config;
pub mod error;
pub mod logging;
pub mod progression;
pub mod reward;
pub mod runtime;
pub mod storage;
pub mod store;
pub mod task;
pub mod timer;
pub mod tracker;

pub use error::{LevelUpError, Result};
