//! Selectors accepted by the search and vote operations.
//!
//! Every selector parses from the string the presentation shell hands over
//! and rejects anything it does not recognise with
//! [`Error::InvalidArgument`]; there is no silent default.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  ids::{AnswerId, CommentId, QuestionId},
};

// ─── Sorting ─────────────────────────────────────────────────────────────────

/// The column a question listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
  SubmissionTime,
  Title,
  Message,
  ViewCount,
  VoteCount,
  /// Not a stored column; joined from the comment-count aggregation.
  CommentCount,
}

impl FromStr for SortField {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "date" | "submission_time" => Ok(Self::SubmissionTime),
      "title" => Ok(Self::Title),
      "message" => Ok(Self::Message),
      "views" | "view_number" => Ok(Self::ViewCount),
      "votes" => Ok(Self::VoteCount),
      "comments" => Ok(Self::CommentCount),
      other => {
        Err(Error::InvalidArgument(format!("unknown sort field: {other:?}")))
      }
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  Ascending,
  #[default]
  Descending,
}

impl FromStr for SortOrder {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "ascending" | "asc" => Ok(Self::Ascending),
      "descending" | "desc" => Ok(Self::Descending),
      other => {
        Err(Error::InvalidArgument(format!("unknown sort order: {other:?}")))
      }
    }
  }
}

// ─── Voting ──────────────────────────────────────────────────────────────────

/// Which counter a vote touches: `votes_up` or `votes_down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
  Up,
  Down,
}

impl FromStr for VoteDirection {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "up" => Ok(Self::Up),
      "down" => Ok(Self::Down),
      other => Err(Error::InvalidArgument(format!(
        "unknown vote direction: {other:?}"
      ))),
    }
  }
}

/// Whether a vote is being cast (+1) or withdrawn (−1).
///
/// Counters are not clamped at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChange {
  #[default]
  Cast,
  Retract,
}

impl VoteChange {
  pub fn delta(self) -> i64 {
    match self {
      Self::Cast => 1,
      Self::Retract => -1,
    }
  }
}

// ─── Authored posts ──────────────────────────────────────────────────────────

/// Anything that can have an author linked through a join table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Post {
  Question(QuestionId),
  Answer(AnswerId),
  Comment(CommentId),
}

impl fmt::Display for Post {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Question(id) => write!(f, "question {id}"),
      Self::Answer(id) => write!(f, "answer {id}"),
      Self::Comment(id) => write!(f, "comment {id}"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Classify, ErrorKind};

  #[test]
  fn sort_field_accepts_listing_keys() {
    assert_eq!("date".parse::<SortField>().unwrap(), SortField::SubmissionTime);
    assert_eq!("views".parse::<SortField>().unwrap(), SortField::ViewCount);
    assert_eq!("votes".parse::<SortField>().unwrap(), SortField::VoteCount);
    assert_eq!(
      "comments".parse::<SortField>().unwrap(),
      SortField::CommentCount
    );
  }

  #[test]
  fn unknown_sort_field_fails_fast() {
    let err = "popularity".parse::<SortField>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
  }

  #[test]
  fn unknown_vote_direction_fails_fast() {
    assert_eq!("up".parse::<VoteDirection>().unwrap(), VoteDirection::Up);
    let err = "sideways".parse::<VoteDirection>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
  }

  #[test]
  fn retract_is_negative() {
    assert_eq!(VoteChange::Cast.delta(), 1);
    assert_eq!(VoteChange::Retract.delta(), -1);
  }
}
