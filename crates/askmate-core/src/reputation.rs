//! User reputation — a derived score, never stored.
//!
//! A [`Reputation`] holds the raw tallies read from the user's questions and
//! answers; [`Reputation::score`] applies the weights. Missing categories are
//! zero, so a user with no answers still gets a well-defined score.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

pub const QUESTION_UPVOTE_WEIGHT: i64 = 5;
pub const QUESTION_DOWNVOTE_WEIGHT: i64 = -2;
pub const ANSWER_UPVOTE_WEIGHT: i64 = 10;
pub const ANSWER_DOWNVOTE_WEIGHT: i64 = -2;
pub const ACCEPTED_ANSWER_WEIGHT: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reputation {
  pub user_id:             UserId,
  /// Sum of `votes_up` over the user's questions.
  pub question_votes_up:   i64,
  pub question_votes_down: i64,
  pub answer_votes_up:     i64,
  pub answer_votes_down:   i64,
  /// Number of the user's answers currently marked accepted.
  pub accepted_answers:    i64,
}

impl Reputation {
  /// All tallies zero.
  pub fn empty(user_id: UserId) -> Self {
    Self {
      user_id,
      question_votes_up: 0,
      question_votes_down: 0,
      answer_votes_up: 0,
      answer_votes_down: 0,
      accepted_answers: 0,
    }
  }

  /// The weighted sum of the tallies, saturating at the `i64` bounds.
  pub fn score(&self) -> i64 {
    [
      (QUESTION_UPVOTE_WEIGHT, self.question_votes_up),
      (QUESTION_DOWNVOTE_WEIGHT, self.question_votes_down),
      (ANSWER_UPVOTE_WEIGHT, self.answer_votes_up),
      (ANSWER_DOWNVOTE_WEIGHT, self.answer_votes_down),
      (ACCEPTED_ANSWER_WEIGHT, self.accepted_answers),
    ]
    .into_iter()
    .fold(0i64, |acc, (weight, tally)| {
      acc.saturating_add(weight.saturating_mul(tally))
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_tallies_score_zero() {
    assert_eq!(Reputation::empty(UserId(9)).score(), 0);
  }

  #[test]
  fn weights_combine() {
    // Two questions (3 up / 1 down and 5 up / 0 down) plus one accepted
    // answer with 2 up-votes.
    let rep = Reputation {
      user_id:             UserId(1),
      question_votes_up:   8,
      question_votes_down: 1,
      answer_votes_up:     2,
      answer_votes_down:   0,
      accepted_answers:    1,
    };
    assert_eq!(rep.score(), 73);
  }

  #[test]
  fn downvotes_can_drive_score_negative() {
    let rep = Reputation {
      answer_votes_down: 4,
      ..Reputation::empty(UserId(2))
    };
    assert_eq!(rep.score(), -8);
  }

  #[test]
  fn extreme_tallies_saturate() {
    let rep = Reputation {
      answer_votes_up: i64::MAX,
      accepted_answers: i64::MAX,
      ..Reputation::empty(UserId(3))
    };
    assert_eq!(rep.score(), i64::MAX);

    let rep = Reputation {
      question_votes_down: i64::MAX,
      ..Reputation::empty(UserId(3))
    };
    assert_eq!(rep.score(), i64::MIN);
  }
}
