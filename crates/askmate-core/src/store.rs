//! The store traits and their supporting types.
//!
//! A backend implements four traits, one per engine, all sharing the error
//! type declared by [`ForumBackend`]:
//!
//! - [`EntityRepository`] — single-row CRUD, votes and join-row links.
//! - [`IntegrityEngine`] — cascading deletes.
//! - [`AggregationEngine`] — counts, tag resolution, reputation, and the
//!   accept-answer exclusivity rule.
//! - [`QuestionSearch`] — ordered and filtered question listings.
//!
//! [`ForumStore`] is implemented for anything providing all four. Higher
//! layers depend on these traits, not on any concrete backend.
//!
//! All methods return `Send` futures so the traits can be used from a
//! multi-threaded tokio runtime.

use std::{collections::BTreeMap, future::Future};

use crate::{
  Classify,
  account::{Account, NewAccount},
  answer::{Answer, AnswerEdit, NewAnswer},
  comment::{Comment, NewComment},
  ids::{AnswerId, CommentId, QuestionId, UserId},
  query::{Post, SortField, SortOrder, VoteChange, VoteDirection},
  question::{NewQuestion, Question, QuestionEdit},
  reputation::Reputation,
  tag::Tag,
};

/// Upper bound on free-text search results and on the "latest" listing.
pub const SHORT_LISTING_LIMIT: usize = 5;

/// Declares the error type shared by every engine trait.
pub trait ForumBackend: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;
}

// ─── Entity repository ───────────────────────────────────────────────────────

/// Single-row accessors. Reads by parent return an empty `Vec` when nothing
/// matches; reads by id fail with a not-found error.
pub trait EntityRepository: ForumBackend {
  // ── Questions ─────────────────────────────────────────────────────────

  /// Insert a question together with its optional author and tag links.
  ///
  /// Fails with an integrity violation (and writes nothing) if the tag name
  /// or author id is unknown.
  fn create_question(
    &self,
    input: NewQuestion,
  ) -> impl Future<Output = Result<Question, Self::Error>> + Send + '_;

  fn get_question(
    &self,
    id: QuestionId,
  ) -> impl Future<Output = Result<Question, Self::Error>> + Send + '_;

  fn find_question_by_title(
    &self,
    title: String,
  ) -> impl Future<Output = Result<Question, Self::Error>> + Send + '_;

  /// The `limit` most recently submitted questions, newest first.
  fn latest_questions(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Question>, Self::Error>> + Send + '_;

  /// Overwrite title, message and image, and replace the tag link when
  /// `edit.tag` is set, all in one transaction.
  fn edit_question(
    &self,
    id: QuestionId,
    edit: QuestionEdit,
  ) -> impl Future<Output = Result<Question, Self::Error>> + Send + '_;

  /// Increment `view_number` by one.
  fn record_view(
    &self,
    id: QuestionId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Adjust `votes_up` or `votes_down` by ±1 in a single statement.
  fn vote_question(
    &self,
    id: QuestionId,
    direction: VoteDirection,
    change: VoteChange,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Answers ───────────────────────────────────────────────────────────

  /// Fails with an integrity violation if the question does not exist.
  fn create_answer(
    &self,
    input: NewAnswer,
  ) -> impl Future<Output = Result<Answer, Self::Error>> + Send + '_;

  fn get_answer(
    &self,
    id: AnswerId,
  ) -> impl Future<Output = Result<Answer, Self::Error>> + Send + '_;

  /// Answers for a question, oldest first.
  fn answers_for_question(
    &self,
    question_id: QuestionId,
  ) -> impl Future<Output = Result<Vec<Answer>, Self::Error>> + Send + '_;

  /// Overwrite message and image and bump `edited_count`.
  fn edit_answer(
    &self,
    id: AnswerId,
    edit: AnswerEdit,
  ) -> impl Future<Output = Result<Answer, Self::Error>> + Send + '_;

  fn vote_answer(
    &self,
    id: AnswerId,
    direction: VoteDirection,
    change: VoteChange,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  /// Fails with an integrity violation if the parent does not exist.
  fn create_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    id: CommentId,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Comments attached directly to the question (not to its answers).
  fn comments_for_question(
    &self,
    question_id: QuestionId,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  fn comments_for_answer(
    &self,
    answer_id: AnswerId,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  fn edit_comment(
    &self,
    id: CommentId,
    message: String,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  // ── Tags ──────────────────────────────────────────────────────────────

  /// Fails with an integrity violation if the name is taken.
  fn create_tag(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Tag, Self::Error>> + Send + '_;

  /// All tags, ordered by name.
  fn list_tags(
    &self,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + '_;

  /// Link `tag_name` to the question, replacing any previous tag.
  fn tag_question(
    &self,
    question_id: QuestionId,
    tag_name: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove the question's tag link, if any.
  fn untag_question(
    &self,
    question_id: QuestionId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Hash the password and persist the account. Duplicate usernames or
  /// emails are integrity violations.
  fn register_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  fn get_account(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  fn get_account_by_username(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  /// `true` if the password matches the stored hash. Unknown usernames
  /// yield `false`, not an error.
  fn verify_login(
    &self,
    username: String,
    password: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// The linked author of a post, if any. Fails if the post itself is
  /// missing.
  fn author_of(
    &self,
    post: Post,
  ) -> impl Future<Output = Result<Option<UserId>, Self::Error>> + Send + '_;
}

// ─── Integrity engine ────────────────────────────────────────────────────────

/// Cascading deletes. Each call is one transaction: either the entity and
/// everything that depends on it disappear together, or nothing changes.
pub trait IntegrityEngine: ForumBackend {
  /// Remove a question, its answers, every comment on either, all of their
  /// authorship rows, and the question's tag row.
  fn delete_question(
    &self,
    id: QuestionId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove an answer, its comments, and their authorship rows.
  fn delete_answer(
    &self,
    id: AnswerId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_comment(
    &self,
    id: CommentId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Aggregation engine ──────────────────────────────────────────────────────

/// Derived, read-side views computed from the normalised tables on every
/// call, plus the accept/decline operations that guard the single accepted
/// answer per question.
pub trait AggregationEngine: ForumBackend {
  /// Number of answers per question. Every question is present; those
  /// without answers map to zero.
  fn answer_counts(
    &self,
  ) -> impl Future<Output = Result<BTreeMap<QuestionId, u64>, Self::Error>> + Send + '_;

  /// Number of comments attached directly to each question. Every question
  /// is present.
  fn comment_counts(
    &self,
  ) -> impl Future<Output = Result<BTreeMap<QuestionId, u64>, Self::Error>> + Send + '_;

  /// The question's tag name, or `None` if it is untagged.
  fn tag_for_question(
    &self,
    id: QuestionId,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  fn reputation(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Reputation, Self::Error>> + Send + '_;

  /// Mark the answer accepted, first declining whichever sibling answer
  /// currently holds the flag.
  fn accept_answer(
    &self,
    id: AnswerId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn decline_answer(
    &self,
    id: AnswerId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Search ──────────────────────────────────────────────────────────────────

pub trait QuestionSearch: ForumBackend {
  /// All questions ordered by `field`. Ties fall back to id in the same
  /// direction.
  fn sorted_questions(
    &self,
    field: SortField,
    order: SortOrder,
  ) -> impl Future<Output = Result<Vec<Question>, Self::Error>> + Send + '_;

  /// Questions carrying the named tag, newest first.
  fn questions_with_tag(
    &self,
    tag_name: String,
  ) -> impl Future<Output = Result<Vec<Question>, Self::Error>> + Send + '_;

  /// Case-insensitive substring match on title or tag name, newest first,
  /// at most [`SHORT_LISTING_LIMIT`] results.
  fn search_questions(
    &self,
    text: String,
  ) -> impl Future<Output = Result<Vec<Question>, Self::Error>> + Send + '_;
}

// ─── Umbrella ────────────────────────────────────────────────────────────────

/// Everything a presentation shell needs.
pub trait ForumStore:
  EntityRepository + IntegrityEngine + AggregationEngine + QuestionSearch
{
}

impl<T> ForumStore for T where
  T: EntityRepository + IntegrityEngine + AggregationEngine + QuestionSearch
{
}
