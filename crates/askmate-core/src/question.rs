//! Questions — the root of every discussion thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{QuestionId, UserId};

/// A persisted question.
///
/// The tag and author live in join tables and are not carried here; use
/// [`crate::store::AggregationEngine::tag_for_question`] and
/// [`crate::store::EntityRepository::author_of`] to resolve them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  pub id:              QuestionId,
  /// Server-assigned; never changes after creation.
  pub submission_time: DateTime<Utc>,
  pub view_number:     i64,
  pub votes_up:        i64,
  pub votes_down:      i64,
  pub title:           String,
  pub message:         String,
  /// Opaque media reference, passed through unchanged.
  pub image:           Option<String>,
}

impl Question {
  /// Net score shown next to the question.
  pub fn vote_balance(&self) -> i64 { self.votes_up - self.votes_down }
}

/// Input to [`crate::store::EntityRepository::create_question`].
#[derive(Debug, Clone, Default)]
pub struct NewQuestion {
  pub title:   String,
  pub message: String,
  pub image:   Option<String>,
  /// Linked through `question_user` when set.
  pub author:  Option<UserId>,
  /// Name of an existing tag; linked through `question_tag` when set.
  pub tag:     Option<String>,
}

impl NewQuestion {
  pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      message: message.into(),
      ..Default::default()
    }
  }
}

/// Replacement values for [`crate::store::EntityRepository::edit_question`].
///
/// `tag: None` leaves the current tag link untouched.
#[derive(Debug, Clone, Default)]
pub struct QuestionEdit {
  pub title:   String,
  pub message: String,
  pub image:   Option<String>,
  pub tag:     Option<String>,
}
