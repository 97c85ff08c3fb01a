pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS challenges (
    id INTEGER PRIMARY KEY,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    start_date TEXT,
    end_date TEXT,
    position INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY,
    challenge_id INTEGER NOT NULL REFERENCES challenges(id),
    name TEXT NOT NULL,
    kind TEXT NOT NULL,
    date TEXT,
    reminder_at INTEGER,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER
);

CREATE TABLE IF NOT EXISTS focus_tasks (
    id INTEGER PRIMARY KEY,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    counter INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS pomodoro_sessions (
    id INTEGER PRIMARY KEY,
    user_id TEXT NOT NULL,
    task_id INTEGER REFERENCES focus_tasks(id),
    planned_minutes INTEGER NOT NULL,
    started_at INTEGER NOT NULL,
    ended_at INTEGER,
    status TEXT NOT NULL,
    actual_focus_minutes INTEGER
);

CREATE INDEX IF NOT EXISTS idx_challenges_user ON challenges(user_id, position);
CREATE INDEX IF NOT EXISTS idx_tasks_challenge ON tasks(challenge_id, date);
CREATE INDEX IF NOT EXISTS idx_tasks_date ON tasks(date);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON pomodoro_sessions(user_id, started_at);
CREATE INDEX IF NOT EXISTS idx_sessions_running ON pomodoro_sessions(status) WHERE status = 'running';
"#;
