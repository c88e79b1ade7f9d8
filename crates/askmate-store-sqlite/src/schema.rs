//! SQL schema for the AskMate SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.
//!
//! There are no `FOREIGN KEY` clauses: every reference between tables is
//! kept valid by the cascade plans in `cascade.rs`. Join tables hold exactly
//! the two identifiers they relate.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS question (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    submission_time TEXT    NOT NULL,   -- RFC 3339 UTC; server-assigned
    view_number     INTEGER NOT NULL DEFAULT 0,
    votes_up        INTEGER NOT NULL DEFAULT 0,
    votes_down      INTEGER NOT NULL DEFAULT 0,
    title           TEXT    NOT NULL,
    message         TEXT    NOT NULL,
    image           TEXT
);

CREATE TABLE IF NOT EXISTS answer (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    submission_time TEXT    NOT NULL,
    votes_up        INTEGER NOT NULL DEFAULT 0,
    votes_down      INTEGER NOT NULL DEFAULT 0,
    question_id     INTEGER NOT NULL,
    message         TEXT    NOT NULL,
    image           TEXT,
    accepted        INTEGER NOT NULL DEFAULT 0,   -- 0 | 1
    edited_count    INTEGER NOT NULL DEFAULT 0
);

-- A comment hangs off a question or an answer, never both, never neither.
CREATE TABLE IF NOT EXISTS comment (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    question_id     INTEGER,
    answer_id       INTEGER,
    message         TEXT    NOT NULL,
    submission_time TEXT    NOT NULL,
    edited_count    INTEGER NOT NULL DEFAULT 0,
    CHECK ((question_id IS NULL) != (answer_id IS NULL))
);

CREATE TABLE IF NOT EXISTS tag (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT    NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS accounts (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    username          TEXT    NOT NULL UNIQUE,
    password          TEXT    NOT NULL,   -- argon2 PHC string, never clear text
    email             TEXT    NOT NULL UNIQUE,
    first_name        TEXT    NOT NULL,
    last_name         TEXT    NOT NULL,
    registration_time TEXT    NOT NULL
);

-- At most one row per question; replaced, never appended.
CREATE TABLE IF NOT EXISTS question_tag (
    question_id INTEGER NOT NULL,
    tag_id      INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS question_user (
    question_id INTEGER NOT NULL,
    user_id     INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS answer_user (
    answer_id INTEGER NOT NULL,
    user_id   INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS comment_user (
    comment_id INTEGER NOT NULL,
    user_id    INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS question_time_idx      ON question(submission_time);
CREATE INDEX IF NOT EXISTS answer_question_idx    ON answer(question_id);
CREATE INDEX IF NOT EXISTS comment_question_idx   ON comment(question_id);
CREATE INDEX IF NOT EXISTS comment_answer_idx     ON comment(answer_id);
CREATE INDEX IF NOT EXISTS question_tag_q_idx     ON question_tag(question_id);
CREATE INDEX IF NOT EXISTS question_tag_t_idx     ON question_tag(tag_id);
CREATE INDEX IF NOT EXISTS question_user_q_idx    ON question_user(question_id);
CREATE INDEX IF NOT EXISTS question_user_u_idx    ON question_user(user_id);
CREATE INDEX IF NOT EXISTS answer_user_a_idx      ON answer_user(answer_id);
CREATE INDEX IF NOT EXISTS answer_user_u_idx      ON answer_user(user_id);
CREATE INDEX IF NOT EXISTS comment_user_c_idx     ON comment_user(comment_id);

PRAGMA user_version = 1;
";
