//! Comments, attached to either a question or an answer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AnswerId, CommentId, QuestionId, UserId};

/// What a comment hangs off. Exactly one parent, never both, never neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CommentTarget {
  Question(QuestionId),
  Answer(AnswerId),
}

impl CommentTarget {
  /// Split into the `(question_id, answer_id)` column pair.
  pub fn columns(self) -> (Option<i64>, Option<i64>) {
    match self {
      Self::Question(id) => (Some(id.0), None),
      Self::Answer(id) => (None, Some(id.0)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub id:              CommentId,
  pub target:          CommentTarget,
  pub message:         String,
  pub submission_time: DateTime<Utc>,
  pub edited_count:    i64,
}

#[derive(Debug, Clone)]
pub struct NewComment {
  pub target:  CommentTarget,
  pub message: String,
  pub author:  Option<UserId>,
}

impl NewComment {
  pub fn new(target: CommentTarget, message: impl Into<String>) -> Self {
    Self { target, message: message.into(), author: None }
  }
}
