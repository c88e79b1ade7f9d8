//! [`EntityRepository`] for [`SqliteStore`]: single-row CRUD, votes, and
//! the join-row links created alongside new posts.

use askmate_core::{
  Entity, UserId,
  account::{Account, NewAccount},
  answer::{Answer, AnswerEdit, NewAnswer},
  comment::{Comment, CommentTarget, NewComment},
  ids::{AnswerId, CommentId, QuestionId, TagId},
  password,
  query::{Post, VoteChange, VoteDirection},
  question::{NewQuestion, Question, QuestionEdit},
  store::EntityRepository,
  tag::Tag,
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{
    ACCOUNT_COLUMNS, ANSWER_COLUMNS, COMMENT_COLUMNS, QUESTION_COLUMNS,
    RawAccount, RawAnswer, RawComment, RawQuestion, encode_dt,
  },
  error::abort,
  store::{SqliteStore, exists, integrity, not_found, table_of, tag_id_by_name},
};

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn select_question(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<RawQuestion>> {
  conn
    .query_row(
      &format!("SELECT {QUESTION_COLUMNS} FROM question q WHERE q.id = ?1"),
      [id],
      RawQuestion::from_row,
    )
    .optional()
}

fn select_answer(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<RawAnswer>> {
  conn
    .query_row(
      &format!("SELECT {ANSWER_COLUMNS} FROM answer a WHERE a.id = ?1"),
      [id],
      RawAnswer::from_row,
    )
    .optional()
}

fn select_comment(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<RawComment>> {
  conn
    .query_row(
      &format!("SELECT {COMMENT_COLUMNS} FROM comment c WHERE c.id = ?1"),
      [id],
      RawComment::from_row,
    )
    .optional()
}

/// Replace the question's tag link. Delete-then-insert keeps the table at
/// one row per question.
pub(crate) fn replace_question_tag(
  conn: &rusqlite::Connection,
  question_id: i64,
  tag_id: i64,
) -> rusqlite::Result<()> {
  conn.execute("DELETE FROM question_tag WHERE question_id = ?1", [question_id])?;
  conn.execute(
    "INSERT INTO question_tag (question_id, tag_id) VALUES (?1, ?2)",
    [question_id, tag_id],
  )?;
  Ok(())
}

/// Resolve `name` to a tag id, aborting the surrounding call with an
/// integrity violation if no such tag exists.
fn require_tag(
  conn: &rusqlite::Connection,
  name: &str,
) -> tokio_rusqlite::Result<i64> {
  tag_id_by_name(conn, name)?
    .ok_or_else(|| abort(integrity(format!("unknown tag: {name:?}"))))
}

fn require_author(
  conn: &rusqlite::Connection,
  author: Option<UserId>,
) -> tokio_rusqlite::Result<()> {
  if let Some(user) = author
    && !exists(conn, Entity::Account, user.0)?
  {
    return Err(abort(integrity(format!("unknown author: user {user}"))));
  }
  Ok(())
}

fn vote_column(direction: VoteDirection) -> &'static str {
  match direction {
    VoteDirection::Up => "votes_up",
    VoteDirection::Down => "votes_down",
  }
}

impl SqliteStore {
  /// One `UPDATE … SET col = col + delta`; never read-modify-write.
  async fn adjust_votes(
    &self,
    entity: Entity,
    id: i64,
    direction: VoteDirection,
    change: VoteChange,
  ) -> Result<()> {
    let column = vote_column(direction);
    let sql = format!(
      "UPDATE {} SET {column} = {column} + ?1 WHERE id = ?2",
      table_of(entity)
    );
    let delta = change.delta();

    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, [delta, id])?))
      .await?;

    if changed == 0 {
      return Err(not_found(entity, id));
    }
    Ok(())
  }

  async fn account_where(&self, column: &'static str, value: String) -> Result<Account> {
    let key = value.clone();
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {column} = ?1"),
              [value],
              RawAccount::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .ok_or_else(|| not_found(Entity::Account, key))?
      .into_account()
  }
}

// ─── EntityRepository impl ───────────────────────────────────────────────────

impl EntityRepository for SqliteStore {
  // ── Questions ─────────────────────────────────────────────────────────────

  async fn create_question(&self, input: NewQuestion) -> Result<Question> {
    let submitted = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        require_author(&tx, input.author)?;
        let tag_id = input
          .tag
          .as_deref()
          .map(|name| require_tag(&tx, name))
          .transpose()?;

        tx.execute(
          "INSERT INTO question (submission_time, title, message, image)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![submitted, input.title, input.message, input.image],
        )?;
        let id = tx.last_insert_rowid();

        if let Some(author) = input.author {
          tx.execute(
            "INSERT INTO question_user (question_id, user_id) VALUES (?1, ?2)",
            [id, author.0],
          )?;
        }
        if let Some(tag_id) = tag_id {
          replace_question_tag(&tx, id, tag_id)?;
        }

        let raw = tx.query_row(
          &format!("SELECT {QUESTION_COLUMNS} FROM question q WHERE q.id = ?1"),
          [id],
          RawQuestion::from_row,
        )?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_question()
  }

  async fn get_question(&self, id: QuestionId) -> Result<Question> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_question(conn, id.0)?))
      .await?;
    raw.ok_or_else(|| not_found(Entity::Question, id))?.into_question()
  }

  async fn find_question_by_title(&self, title: String) -> Result<Question> {
    let key = title.clone();
    let raw: Option<RawQuestion> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {QUESTION_COLUMNS} FROM question q
                 WHERE q.title = ?1
                 ORDER BY q.id
                 LIMIT 1"
              ),
              [title],
              RawQuestion::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw
      .ok_or_else(|| not_found(Entity::Question, format!("{key:?}")))?
      .into_question()
  }

  async fn latest_questions(&self, limit: usize) -> Result<Vec<Question>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let raws: Vec<RawQuestion> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {QUESTION_COLUMNS} FROM question q
           ORDER BY q.submission_time DESC, q.id DESC
           LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map([limit], RawQuestion::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawQuestion::into_question).collect()
  }

  async fn edit_question(&self, id: QuestionId, edit: QuestionEdit) -> Result<Question> {
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE question SET title = ?1, message = ?2, image = ?3 WHERE id = ?4",
          rusqlite::params![edit.title, edit.message, edit.image, id.0],
        )?;
        if changed == 0 {
          return Err(abort(not_found(Entity::Question, id)));
        }

        if let Some(name) = edit.tag.as_deref() {
          let tag_id = require_tag(&tx, name)?;
          replace_question_tag(&tx, id.0, tag_id)?;
        }

        let raw = tx.query_row(
          &format!("SELECT {QUESTION_COLUMNS} FROM question q WHERE q.id = ?1"),
          [id.0],
          RawQuestion::from_row,
        )?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_question()
  }

  async fn record_view(&self, id: QuestionId) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE question SET view_number = view_number + 1 WHERE id = ?1",
          [id.0],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(not_found(Entity::Question, id));
    }
    Ok(())
  }

  async fn vote_question(
    &self,
    id: QuestionId,
    direction: VoteDirection,
    change: VoteChange,
  ) -> Result<()> {
    self.adjust_votes(Entity::Question, id.0, direction, change).await
  }

  // ── Answers ───────────────────────────────────────────────────────────────

  async fn create_answer(&self, input: NewAnswer) -> Result<Answer> {
    let submitted = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, Entity::Question, input.question_id.0)? {
          return Err(abort(integrity(format!(
            "answer references missing question {}",
            input.question_id
          ))));
        }
        require_author(&tx, input.author)?;

        tx.execute(
          "INSERT INTO answer (submission_time, question_id, message, image)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            submitted,
            input.question_id.0,
            input.message,
            input.image
          ],
        )?;
        let id = tx.last_insert_rowid();

        if let Some(author) = input.author {
          tx.execute(
            "INSERT INTO answer_user (answer_id, user_id) VALUES (?1, ?2)",
            [id, author.0],
          )?;
        }

        let raw = tx.query_row(
          &format!("SELECT {ANSWER_COLUMNS} FROM answer a WHERE a.id = ?1"),
          [id],
          RawAnswer::from_row,
        )?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_answer()
  }

  async fn get_answer(&self, id: AnswerId) -> Result<Answer> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_answer(conn, id.0)?))
      .await?;
    raw.ok_or_else(|| not_found(Entity::Answer, id))?.into_answer()
  }

  async fn answers_for_question(&self, question_id: QuestionId) -> Result<Vec<Answer>> {
    let raws: Vec<RawAnswer> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ANSWER_COLUMNS} FROM answer a
           WHERE a.question_id = ?1
           ORDER BY a.submission_time, a.id"
        ))?;
        let rows = stmt
          .query_map([question_id.0], RawAnswer::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnswer::into_answer).collect()
  }

  async fn edit_answer(&self, id: AnswerId, edit: AnswerEdit) -> Result<Answer> {
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE answer
           SET message = ?1, image = ?2, edited_count = edited_count + 1
           WHERE id = ?3",
          rusqlite::params![edit.message, edit.image, id.0],
        )?;
        if changed == 0 {
          return Err(abort(not_found(Entity::Answer, id)));
        }
        let raw = tx.query_row(
          &format!("SELECT {ANSWER_COLUMNS} FROM answer a WHERE a.id = ?1"),
          [id.0],
          RawAnswer::from_row,
        )?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_answer()
  }

  async fn vote_answer(
    &self,
    id: AnswerId,
    direction: VoteDirection,
    change: VoteChange,
  ) -> Result<()> {
    self.adjust_votes(Entity::Answer, id.0, direction, change).await
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn create_comment(&self, input: NewComment) -> Result<Comment> {
    let submitted = encode_dt(Utc::now());
    let (question_id, answer_id) = input.target.columns();

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let parent_exists = match input.target {
          CommentTarget::Question(id) => exists(&tx, Entity::Question, id.0)?,
          CommentTarget::Answer(id) => exists(&tx, Entity::Answer, id.0)?,
        };
        if !parent_exists {
          return Err(abort(integrity(format!(
            "comment references missing parent {:?}",
            input.target
          ))));
        }
        require_author(&tx, input.author)?;

        tx.execute(
          "INSERT INTO comment (question_id, answer_id, message, submission_time)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![question_id, answer_id, input.message, submitted],
        )?;
        let id = tx.last_insert_rowid();

        if let Some(author) = input.author {
          tx.execute(
            "INSERT INTO comment_user (comment_id, user_id) VALUES (?1, ?2)",
            [id, author.0],
          )?;
        }

        let raw = tx.query_row(
          &format!("SELECT {COMMENT_COLUMNS} FROM comment c WHERE c.id = ?1"),
          [id],
          RawComment::from_row,
        )?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_comment()
  }

  async fn get_comment(&self, id: CommentId) -> Result<Comment> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_comment(conn, id.0)?))
      .await?;
    raw.ok_or_else(|| not_found(Entity::Comment, id))?.into_comment()
  }

  async fn comments_for_question(&self, question_id: QuestionId) -> Result<Vec<Comment>> {
    self.comments_where("c.question_id = ?1", question_id.0).await
  }

  async fn comments_for_answer(&self, answer_id: AnswerId) -> Result<Vec<Comment>> {
    self.comments_where("c.answer_id = ?1", answer_id.0).await
  }

  async fn edit_comment(&self, id: CommentId, message: String) -> Result<Comment> {
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE comment SET message = ?1, edited_count = edited_count + 1
           WHERE id = ?2",
          rusqlite::params![message, id.0],
        )?;
        if changed == 0 {
          return Err(abort(not_found(Entity::Comment, id)));
        }
        let raw = tx.query_row(
          &format!("SELECT {COMMENT_COLUMNS} FROM comment c WHERE c.id = ?1"),
          [id.0],
          RawComment::from_row,
        )?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_comment()
  }

  // ── Tags ──────────────────────────────────────────────────────────────────

  async fn create_tag(&self, name: String) -> Result<Tag> {
    let (id, name) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if tag_id_by_name(&tx, &name)?.is_some() {
          return Err(abort(integrity(format!("tag already exists: {name:?}"))));
        }
        tx.execute("INSERT INTO tag (name) VALUES (?1)", [&name])?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok((id, name))
      })
      .await?;

    Ok(Tag { id: TagId(id), name })
  }

  async fn list_tags(&self) -> Result<Vec<Tag>> {
    let rows: Vec<(i64, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM tag ORDER BY name")?;
        let rows = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(id, name)| Tag { id: TagId(id), name })
        .collect(),
    )
  }

  async fn tag_question(&self, question_id: QuestionId, tag_name: String) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, Entity::Question, question_id.0)? {
          return Err(abort(not_found(Entity::Question, question_id)));
        }
        let tag_id = require_tag(&tx, &tag_name)?;
        replace_question_tag(&tx, question_id.0, tag_id)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn untag_question(&self, question_id: QuestionId) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, Entity::Question, question_id.0)? {
          return Err(abort(not_found(Entity::Question, question_id)));
        }
        tx.execute(
          "DELETE FROM question_tag WHERE question_id = ?1",
          [question_id.0],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn register_account(&self, input: NewAccount) -> Result<Account> {
    let hash = password::hash_password(&input.password)?;
    let registered = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken: bool = tx.query_row(
          "SELECT EXISTS (SELECT 1 FROM accounts WHERE username = ?1 OR email = ?2)",
          [&input.username, &input.email],
          |r| r.get(0),
        )?;
        if taken {
          return Err(abort(integrity(format!(
            "username {:?} or email {:?} is already registered",
            input.username, input.email
          ))));
        }

        tx.execute(
          "INSERT INTO accounts
             (username, password, email, first_name, last_name, registration_time)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            input.username,
            hash,
            input.email,
            input.first_name,
            input.last_name,
            registered,
          ],
        )?;
        let id = tx.last_insert_rowid();

        let raw = tx.query_row(
          &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
          [id],
          RawAccount::from_row,
        )?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_account()
  }

  async fn get_account(&self, id: UserId) -> Result<Account> {
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
              [id.0],
              RawAccount::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.ok_or_else(|| not_found(Entity::Account, id))?.into_account()
  }

  async fn get_account_by_username(&self, username: String) -> Result<Account> {
    self.account_where("username", username).await
  }

  async fn verify_login(&self, username: String, password: String) -> Result<bool> {
    let stored: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT password FROM accounts WHERE username = ?1",
              [username],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(stored.is_some_and(|phc| password::verify_password(&password, &phc)))
  }

  async fn author_of(&self, post: Post) -> Result<Option<UserId>> {
    let (entity, id, sql) = match post {
      Post::Question(id) => (
        Entity::Question,
        id.0,
        "SELECT user_id FROM question_user WHERE question_id = ?1 LIMIT 1",
      ),
      Post::Answer(id) => (
        Entity::Answer,
        id.0,
        "SELECT user_id FROM answer_user WHERE answer_id = ?1 LIMIT 1",
      ),
      Post::Comment(id) => (
        Entity::Comment,
        id.0,
        "SELECT user_id FROM comment_user WHERE comment_id = ?1 LIMIT 1",
      ),
    };

    let found: Option<Option<i64>> = self
      .conn
      .call(move |conn| {
        if !exists(conn, entity, id)? {
          return Ok(None);
        }
        Ok(Some(conn.query_row(sql, [id], |r| r.get(0)).optional()?))
      })
      .await?;

    match found {
      Some(author) => Ok(author.map(UserId)),
      None => Err(not_found(entity, id)),
    }
  }
}

impl SqliteStore {
  async fn comments_where(&self, condition: &'static str, id: i64) -> Result<Vec<Comment>> {
    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM comment c
           WHERE {condition}
           ORDER BY c.submission_time, c.id"
        ))?;
        let rows = stmt
          .query_map([id], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }
}
