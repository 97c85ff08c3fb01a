pub mod challenge;
pub mod focus_task;
pub mod session;
pub mod task;

pub use challenge::Challenge;
pub use focus_task::FocusTask;
pub use session::{PomodoroSession, SessionStatus};
pub use task::{ChallengeTask, Task, TaskKind};
