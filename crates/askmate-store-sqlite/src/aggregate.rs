//! [`AggregationEngine`] for [`SqliteStore`].
//!
//! Nothing here is cached: counts and reputation are recomputed from the
//! source rows on every call. The sub-queries behind one reputation value are
//! not wrapped in a transaction, so under concurrent voting a result may mix
//! slightly different snapshots.

use std::collections::BTreeMap;

use askmate_core::{
  Entity,
  ids::{AnswerId, QuestionId, UserId},
  reputation::Reputation,
  store::AggregationEngine,
};
use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{
  Result,
  error::abort,
  store::{SqliteStore, exists, not_found},
};

impl SqliteStore {
  /// Run a `(question_id, count)` reduction and collect it into a map.
  async fn count_map(&self, sql: &'static str) -> Result<BTreeMap<QuestionId, u64>> {
    let rows: Vec<(i64, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(id, n)| (QuestionId(id), u64::try_from(n).unwrap_or(0)))
        .collect(),
    )
  }

  /// Set or clear the accepted flag on `answer_id`. Accepting first clears
  /// the flag on every sibling answer of the same question.
  async fn set_accepted(&self, answer_id: AnswerId, accepted: bool) -> Result<()> {
    let question_id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let question_id: i64 = tx
          .query_row(
            "SELECT question_id FROM answer WHERE id = ?1",
            [answer_id.0],
            |r| r.get(0),
          )
          .optional()?
          .ok_or_else(|| abort(not_found(Entity::Answer, answer_id)))?;

        if accepted {
          tx.execute(
            "UPDATE answer SET accepted = 0
             WHERE question_id = ?1 AND id != ?2 AND accepted != 0",
            [question_id, answer_id.0],
          )?;
        }
        tx.execute(
          "UPDATE answer SET accepted = ?1 WHERE id = ?2",
          rusqlite::params![accepted, answer_id.0],
        )?;
        tx.commit()?;
        Ok(question_id)
      })
      .await?;

    debug!(answer = %answer_id, question = question_id, accepted, "answer acceptance changed");
    Ok(())
  }
}

impl AggregationEngine for SqliteStore {
  async fn answer_counts(&self) -> Result<BTreeMap<QuestionId, u64>> {
    self
      .count_map(
        "SELECT q.id, COUNT(a.id)
         FROM question q
         LEFT JOIN answer a ON a.question_id = q.id
         GROUP BY q.id",
      )
      .await
  }

  async fn comment_counts(&self) -> Result<BTreeMap<QuestionId, u64>> {
    self
      .count_map(
        "SELECT q.id, COUNT(c.id)
         FROM question q
         LEFT JOIN comment c ON c.question_id = q.id
         GROUP BY q.id",
      )
      .await
  }

  async fn tag_for_question(&self, id: QuestionId) -> Result<Option<String>> {
    let name: Option<String> = self
      .conn
      .call(move |conn| {
        if !exists(conn, Entity::Question, id.0)? {
          return Err(abort(not_found(Entity::Question, id)));
        }
        Ok(
          conn
            .query_row(
              "SELECT t.name
               FROM question_tag qt
               JOIN tag t ON t.id = qt.tag_id
               WHERE qt.question_id = ?1
               LIMIT 1",
              [id.0],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(name)
  }

  async fn reputation(&self, user_id: UserId) -> Result<Reputation> {
    let reputation = self
      .conn
      .call(move |conn| {
        if !exists(conn, Entity::Account, user_id.0)? {
          return Err(abort(not_found(Entity::Account, user_id)));
        }

        let (question_votes_up, question_votes_down): (i64, i64) = conn.query_row(
          "SELECT COALESCE(SUM(q.votes_up), 0), COALESCE(SUM(q.votes_down), 0)
           FROM question q
           JOIN question_user qu ON qu.question_id = q.id
           WHERE qu.user_id = ?1",
          [user_id.0],
          |r| Ok((r.get(0)?, r.get(1)?)),
        )?;

        let (answer_votes_up, answer_votes_down, accepted_answers): (i64, i64, i64) =
          conn.query_row(
            "SELECT COALESCE(SUM(a.votes_up), 0),
                    COALESCE(SUM(a.votes_down), 0),
                    COALESCE(SUM(a.accepted != 0), 0)
             FROM answer a
             JOIN answer_user au ON au.answer_id = a.id
             WHERE au.user_id = ?1",
            [user_id.0],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
          )?;

        Ok(Reputation {
          user_id,
          question_votes_up,
          question_votes_down,
          answer_votes_up,
          answer_votes_down,
          accepted_answers,
        })
      })
      .await?;
    Ok(reputation)
  }

  async fn accept_answer(&self, id: AnswerId) -> Result<()> {
    self.set_accepted(id, true).await
  }

  async fn decline_answer(&self, id: AnswerId) -> Result<()> {
    self.set_accepted(id, false).await
  }
}
