//! Answers to a question.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AnswerId, QuestionId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
  pub id:              AnswerId,
  pub submission_time: DateTime<Utc>,
  pub votes_up:        i64,
  pub votes_down:      i64,
  pub question_id:     QuestionId,
  pub message:         String,
  pub image:           Option<String>,
  /// At most one answer per question carries this flag.
  pub accepted:        bool,
  pub edited_count:    i64,
}

#[derive(Debug, Clone)]
pub struct NewAnswer {
  pub question_id: QuestionId,
  pub message:     String,
  pub image:       Option<String>,
  pub author:      Option<UserId>,
}

impl NewAnswer {
  pub fn new(question_id: QuestionId, message: impl Into<String>) -> Self {
    Self {
      question_id,
      message: message.into(),
      image: None,
      author: None,
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct AnswerEdit {
  pub message: String,
  pub image:   Option<String>,
}
