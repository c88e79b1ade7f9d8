//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed microsecond
//! width, so comparing the text compares the instants. Ids are stored as
//! plain integers.

use askmate_core::{
  AnswerId, CommentId, QuestionId, UserId,
  account::Account,
  answer::Answer,
  comment::{Comment, CommentTarget},
  question::Question,
};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// Build a `%…%` pattern matching `text` literally, lower-cased. Use with
/// `ESCAPE '\\'` against a column folded by `unicode_lower`.
pub fn contains_pattern(text: &str) -> String {
  let mut pattern = String::with_capacity(text.len() + 2);
  pattern.push('%');
  for ch in text.to_lowercase().chars() {
    if matches!(ch, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(ch);
  }
  pattern.push('%');
  pattern
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawQuestion::from_row`]; expects the alias `q`.
pub const QUESTION_COLUMNS: &str = "q.id, q.submission_time, q.view_number, \
   q.votes_up, q.votes_down, q.title, q.message, q.image";

/// Raw values read directly from a `question` row.
pub struct RawQuestion {
  pub id:              i64,
  pub submission_time: String,
  pub view_number:     i64,
  pub votes_up:        i64,
  pub votes_down:      i64,
  pub title:           String,
  pub message:         String,
  pub image:           Option<String>,
}

impl RawQuestion {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      submission_time: row.get(1)?,
      view_number:     row.get(2)?,
      votes_up:        row.get(3)?,
      votes_down:      row.get(4)?,
      title:           row.get(5)?,
      message:         row.get(6)?,
      image:           row.get(7)?,
    })
  }

  pub fn into_question(self) -> Result<Question> {
    Ok(Question {
      id:              QuestionId(self.id),
      submission_time: decode_dt(&self.submission_time)?,
      view_number:     self.view_number,
      votes_up:        self.votes_up,
      votes_down:      self.votes_down,
      title:           self.title,
      message:         self.message,
      image:           self.image,
    })
  }
}

/// Column list matching [`RawAnswer::from_row`]; expects the alias `a`.
pub const ANSWER_COLUMNS: &str = "a.id, a.submission_time, a.votes_up, \
   a.votes_down, a.question_id, a.message, a.image, a.accepted, a.edited_count";

pub struct RawAnswer {
  pub id:              i64,
  pub submission_time: String,
  pub votes_up:        i64,
  pub votes_down:      i64,
  pub question_id:     i64,
  pub message:         String,
  pub image:           Option<String>,
  pub accepted:        bool,
  pub edited_count:    i64,
}

impl RawAnswer {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      submission_time: row.get(1)?,
      votes_up:        row.get(2)?,
      votes_down:      row.get(3)?,
      question_id:     row.get(4)?,
      message:         row.get(5)?,
      image:           row.get(6)?,
      accepted:        row.get(7)?,
      edited_count:    row.get(8)?,
    })
  }

  pub fn into_answer(self) -> Result<Answer> {
    Ok(Answer {
      id:              AnswerId(self.id),
      submission_time: decode_dt(&self.submission_time)?,
      votes_up:        self.votes_up,
      votes_down:      self.votes_down,
      question_id:     QuestionId(self.question_id),
      message:         self.message,
      image:           self.image,
      accepted:        self.accepted,
      edited_count:    self.edited_count,
    })
  }
}

/// Column list matching [`RawComment::from_row`]; expects the alias `c`.
pub const COMMENT_COLUMNS: &str =
  "c.id, c.question_id, c.answer_id, c.message, c.submission_time, c.edited_count";

pub struct RawComment {
  pub id:              i64,
  pub question_id:     Option<i64>,
  pub answer_id:       Option<i64>,
  pub message:         String,
  pub submission_time: String,
  pub edited_count:    i64,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      question_id:     row.get(1)?,
      answer_id:       row.get(2)?,
      message:         row.get(3)?,
      submission_time: row.get(4)?,
      edited_count:    row.get(5)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    let target = match (self.question_id, self.answer_id) {
      (Some(q), None) => CommentTarget::Question(QuestionId(q)),
      (None, Some(a)) => CommentTarget::Answer(AnswerId(a)),
      _ => {
        return Err(Error::CorruptRow(format!(
          "comment {} must reference exactly one parent",
          self.id
        )));
      }
    };
    Ok(Comment {
      id: CommentId(self.id),
      target,
      message: self.message,
      submission_time: decode_dt(&self.submission_time)?,
      edited_count: self.edited_count,
    })
  }
}

/// Column list matching [`RawAccount::from_row`]. The password hash is
/// deliberately absent.
pub const ACCOUNT_COLUMNS: &str =
  "id, username, email, first_name, last_name, registration_time";

pub struct RawAccount {
  pub id:                i64,
  pub username:          String,
  pub email:             String,
  pub first_name:        String,
  pub last_name:         String,
  pub registration_time: String,
}

impl RawAccount {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      username:          row.get(1)?,
      email:             row.get(2)?,
      first_name:        row.get(3)?,
      last_name:         row.get(4)?,
      registration_time: row.get(5)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      id:                UserId(self.id),
      username:          self.username,
      email:             self.email,
      first_name:        self.first_name,
      last_name:         self.last_name,
      registration_time: decode_dt(&self.registration_time)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let late = early + chrono::Duration::microseconds(1500);
    let (a, b) = (encode_dt(early), encode_dt(late));
    assert_eq!(a.len(), b.len());
    assert!(a < b);
    assert_eq!(decode_dt(&b).unwrap(), late);
  }

  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(contains_pattern("Rust"), "%rust%");
    assert_eq!(contains_pattern("100%_sure"), "%100\\%\\_sure%");
  }
}
