//! [`IntegrityEngine`] for [`SqliteStore`]: cascading deletes.
//!
//! The schema has no foreign keys, so each parent delete is an explicit plan
//! that removes leaf rows before the rows they point at:
//!
//! ```text
//! question:  comment_user → comments on answers → comments on question
//!            → answer_user → answers → question_user → question_tag → question
//! answer:    comment_user → comments on answer → answer_user → answer
//! comment:   comment_user → comment
//! ```
//!
//! Every plan runs inside one transaction on the handle it is given. The
//! first failing statement returns early, the transaction is dropped without
//! commit, and nothing the plan did becomes visible.

use askmate_core::{
  Entity,
  ids::{AnswerId, CommentId, QuestionId},
  store::IntegrityEngine,
};
use tracing::{debug, warn};

use crate::{
  Result,
  error::abort,
  store::{SqliteStore, exists, ids_where, not_found},
};

/// What a plan removed, for logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Removed {
  pub answers:  usize,
  pub comments: usize,
  pub links:    usize,
}

/// Delete every row of `table` whose `column` equals one of `ids`.
fn delete_each(
  conn: &rusqlite::Connection,
  table: &str,
  column: &str,
  ids: &[i64],
) -> rusqlite::Result<usize> {
  let mut stmt =
    conn.prepare_cached(&format!("DELETE FROM {table} WHERE {column} = ?1"))?;
  let mut removed = 0;
  for id in ids {
    removed += stmt.execute([id])?;
  }
  Ok(removed)
}

// ─── Plans ───────────────────────────────────────────────────────────────────

pub(crate) fn delete_question_plan(
  conn: &rusqlite::Connection,
  question_id: i64,
) -> tokio_rusqlite::Result<Removed> {
  if !exists(conn, Entity::Question, question_id)? {
    return Err(abort(not_found(Entity::Question, question_id)));
  }

  let answer_ids = ids_where(
    conn,
    "SELECT id FROM answer WHERE question_id = ?1",
    question_id,
  )?;
  let question_comment_ids = ids_where(
    conn,
    "SELECT id FROM comment WHERE question_id = ?1",
    question_id,
  )?;
  let mut answer_comment_ids = Vec::new();
  for answer_id in &answer_ids {
    answer_comment_ids.extend(ids_where(
      conn,
      "SELECT id FROM comment WHERE answer_id = ?1",
      *answer_id,
    )?);
  }

  let mut removed = Removed::default();

  removed.links +=
    delete_each(conn, "comment_user", "comment_id", &answer_comment_ids)?;
  removed.links +=
    delete_each(conn, "comment_user", "comment_id", &question_comment_ids)?;
  removed.comments += delete_each(conn, "comment", "answer_id", &answer_ids)?;
  removed.comments += conn.execute(
    "DELETE FROM comment WHERE question_id = ?1",
    [question_id],
  )?;
  removed.links += delete_each(conn, "answer_user", "answer_id", &answer_ids)?;
  removed.answers +=
    conn.execute("DELETE FROM answer WHERE question_id = ?1", [question_id])?;
  removed.links += conn.execute(
    "DELETE FROM question_user WHERE question_id = ?1",
    [question_id],
  )?;
  removed.links += conn.execute(
    "DELETE FROM question_tag WHERE question_id = ?1",
    [question_id],
  )?;
  conn.execute("DELETE FROM question WHERE id = ?1", [question_id])?;

  Ok(removed)
}

pub(crate) fn delete_answer_plan(
  conn: &rusqlite::Connection,
  answer_id: i64,
) -> tokio_rusqlite::Result<Removed> {
  if !exists(conn, Entity::Answer, answer_id)? {
    return Err(abort(not_found(Entity::Answer, answer_id)));
  }

  let comment_ids =
    ids_where(conn, "SELECT id FROM comment WHERE answer_id = ?1", answer_id)?;

  let mut removed = Removed::default();
  removed.links += delete_each(conn, "comment_user", "comment_id", &comment_ids)?;
  removed.comments +=
    conn.execute("DELETE FROM comment WHERE answer_id = ?1", [answer_id])?;
  removed.links +=
    conn.execute("DELETE FROM answer_user WHERE answer_id = ?1", [answer_id])?;
  removed.answers += conn.execute("DELETE FROM answer WHERE id = ?1", [answer_id])?;

  Ok(removed)
}

pub(crate) fn delete_comment_plan(
  conn: &rusqlite::Connection,
  comment_id: i64,
) -> tokio_rusqlite::Result<Removed> {
  if !exists(conn, Entity::Comment, comment_id)? {
    return Err(abort(not_found(Entity::Comment, comment_id)));
  }

  let mut removed = Removed::default();
  removed.links += conn.execute(
    "DELETE FROM comment_user WHERE comment_id = ?1",
    [comment_id],
  )?;
  removed.comments +=
    conn.execute("DELETE FROM comment WHERE id = ?1", [comment_id])?;

  Ok(removed)
}

// ─── Transaction wrapper ─────────────────────────────────────────────────────

impl SqliteStore {
  /// Run `plan` for `id` inside one transaction.
  async fn run_plan(
    &self,
    entity: Entity,
    id: i64,
    plan: fn(&rusqlite::Connection, i64) -> tokio_rusqlite::Result<Removed>,
  ) -> Result<()> {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let removed = plan(&tx, id)?;
        tx.commit()?;
        Ok(removed)
      })
      .await;

    match outcome {
      Ok(removed) => {
        debug!(
          %entity,
          id,
          answers = removed.answers,
          comments = removed.comments,
          links = removed.links,
          "cascade delete committed"
        );
        Ok(())
      }
      Err(err) => {
        let err = crate::Error::from(err);
        warn!(%entity, id, error = %err, "cascade delete rolled back");
        Err(err)
      }
    }
  }
}

// ─── IntegrityEngine impl ────────────────────────────────────────────────────

impl IntegrityEngine for SqliteStore {
  async fn delete_question(&self, id: QuestionId) -> Result<()> {
    self
      .run_plan(Entity::Question, id.0, delete_question_plan)
      .await
  }

  async fn delete_answer(&self, id: AnswerId) -> Result<()> {
    self.run_plan(Entity::Answer, id.0, delete_answer_plan).await
  }

  async fn delete_comment(&self, id: CommentId) -> Result<()> {
    self.run_plan(Entity::Comment, id.0, delete_comment_plan).await
  }
}

#[cfg(test)]
mod tests {
  use rusqlite::Connection;

  use super::*;
  use crate::schema::SCHEMA;

  /// A bare connection with a question (1) holding answers 10 and 11,
  /// comment 100 on the question, 101 on answer 10, 102 on answer 11, all
  /// authored by user 7 and tagged with tag 3. Question 2 is an unrelated
  /// bystander with its own answer 20 and comment 200.
  fn seeded() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn
      .execute_batch(
        "INSERT INTO question (id, submission_time, title, message)
           VALUES (1, '2024-01-01T00:00:00.000000Z', 'q1', 'm'),
                  (2, '2024-01-02T00:00:00.000000Z', 'q2', 'm');
         INSERT INTO answer (id, submission_time, question_id, message)
           VALUES (10, '2024-01-01T00:00:00.000000Z', 1, 'a'),
                  (11, '2024-01-01T00:00:00.000000Z', 1, 'a'),
                  (20, '2024-01-02T00:00:00.000000Z', 2, 'a');
         INSERT INTO comment (id, question_id, answer_id, message, submission_time)
           VALUES (100, 1,    NULL, 'c', '2024-01-01T00:00:00.000000Z'),
                  (101, NULL, 10,   'c', '2024-01-01T00:00:00.000000Z'),
                  (102, NULL, 11,   'c', '2024-01-01T00:00:00.000000Z'),
                  (200, 2,    NULL, 'c', '2024-01-02T00:00:00.000000Z');
         INSERT INTO question_user VALUES (1, 7), (2, 7);
         INSERT INTO answer_user   VALUES (10, 7), (11, 7), (20, 7);
         INSERT INTO comment_user  VALUES (100, 7), (101, 7), (102, 7), (200, 7);
         INSERT INTO question_tag  VALUES (1, 3), (2, 3);",
      )
      .unwrap();
    conn
  }

  fn count(conn: &Connection, table: &str) -> i64 {
    conn
      .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
      .unwrap()
  }

  #[test]
  fn question_plan_removes_whole_thread_only() {
    let conn = seeded();
    let removed = delete_question_plan(&conn, 1).unwrap();

    assert_eq!(removed, Removed { answers: 2, comments: 3, links: 7 });
    assert_eq!(count(&conn, "question"), 1);
    assert_eq!(count(&conn, "answer"), 1);
    assert_eq!(count(&conn, "comment"), 1);
    assert_eq!(count(&conn, "question_user"), 1);
    assert_eq!(count(&conn, "answer_user"), 1);
    assert_eq!(count(&conn, "comment_user"), 1);
    assert_eq!(count(&conn, "question_tag"), 1);
  }

  #[test]
  fn answer_plan_keeps_question_comments() {
    let conn = seeded();
    let removed = delete_answer_plan(&conn, 10).unwrap();

    assert_eq!(removed, Removed { answers: 1, comments: 1, links: 2 });
    assert_eq!(count(&conn, "answer"), 2);
    assert_eq!(count(&conn, "comment"), 3);
    assert_eq!(count(&conn, "comment_user"), 3);
  }

  #[test]
  fn missing_parent_is_not_found() {
    let conn = seeded();
    assert!(delete_question_plan(&conn, 999).is_err());
    assert!(delete_answer_plan(&conn, 999).is_err());
    assert!(delete_comment_plan(&conn, 999).is_err());
    assert_eq!(count(&conn, "comment"), 4);
  }
}
