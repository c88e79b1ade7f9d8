//! Store-assigned identifiers.
//!
//! Ids are opaque integers handed out by the store in increasing order. Each
//! entity gets its own newtype so an answer id can never be passed where a
//! question id is expected.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

macro_rules! id_type {
  ($(#[$meta:meta])* $name:ident, $label:literal) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
      }
    }

    impl FromStr for $name {
      type Err = Error;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self).map_err(|_| {
          Error::InvalidArgument(format!("malformed {} id: {s:?}", $label))
        })
      }
    }
  };
}

id_type!(QuestionId, "question");
id_type!(AnswerId, "answer");
id_type!(CommentId, "comment");
id_type!(TagId, "tag");
id_type!(
  /// Identifies a row in the `accounts` table.
  UserId,
  "user"
);

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Classify, ErrorKind};

  #[test]
  fn parses_plain_integers() {
    assert_eq!("42".parse::<QuestionId>().unwrap(), QuestionId(42));
    assert_eq!(" 7 ".parse::<UserId>().unwrap(), UserId(7));
  }

  #[test]
  fn malformed_id_is_invalid_argument() {
    let err = "forty-two".parse::<AnswerId>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(err.to_string().contains("answer"));
  }
}
