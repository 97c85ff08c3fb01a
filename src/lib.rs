//! Momentum: a local-first productivity core.
//!
//! Challenges own recurring, dated tasks; a recurrence plan is expanded
//! into one task record per qualifying day, and completion is aggregated
//! into per-day buckets on demand. Pomodoro sessions are tracked as one
//! record per attempt with a single terminal update. All records are
//! namespaced by an opaque user id supplied by the embedding
//! application.

pub mod batch;
pub mod challenges;
pub mod db;
pub mod error;
pub mod models;
pub mod pomodoro;
pub mod progress;
pub mod recurrence;
pub mod stats;

pub use batch::{BatchFailure, BatchReport};
pub use challenges::ChallengeManager;
pub use error::{Error, Result};
pub use pomodoro::{Countdown, PomodoroManager};
