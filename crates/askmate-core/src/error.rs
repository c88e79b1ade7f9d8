//! Error types for `askmate-core`.
//!
//! Every failure a store can report falls into one of four [`ErrorKind`]s.
//! Backends keep their own error enums but expose the kind through
//! [`Classify`] so callers can tell them apart without matching on backend
//! internals.

use std::fmt;

use thiserror::Error;

/// The entity a lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
  Question,
  Answer,
  Comment,
  Tag,
  Account,
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Question => "question",
      Self::Answer => "answer",
      Self::Comment => "comment",
      Self::Tag => "tag",
      Self::Account => "account",
    })
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// A required single-row lookup returned nothing.
  #[error("{entity} not found: {key}")]
  NotFound { entity: Entity, key: String },

  /// The operation would leave a dangling reference or break a uniqueness
  /// rule.
  #[error("integrity violation: {0}")]
  IntegrityViolation(String),

  #[error("storage unavailable: {0}")]
  StorageUnavailable(String),

  /// An unrecognised sort field, vote direction, or similar selector.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// Argon2 could not produce a hash. An internal fault, classified with
  /// the other backend failures.
  #[error("password hashing failed: {0}")]
  PasswordHash(String),
}

impl Error {
  pub fn not_found(entity: Entity, key: impl fmt::Display) -> Self {
    Self::NotFound { entity, key: key.to_string() }
  }
}

/// The four failure categories callers are expected to distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  IntegrityViolation,
  StorageUnavailable,
  InvalidArgument,
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::NotFound => "not found",
      Self::IntegrityViolation => "integrity violation",
      Self::StorageUnavailable => "storage unavailable",
      Self::InvalidArgument => "invalid argument",
    })
  }
}

/// Maps an error onto its [`ErrorKind`].
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::NotFound { .. } => ErrorKind::NotFound,
      Self::IntegrityViolation(_) => ErrorKind::IntegrityViolation,
      Self::StorageUnavailable(_) | Self::PasswordHash(_) => {
        ErrorKind::StorageUnavailable
      }
      Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hashing_failure_is_an_internal_fault() {
    let err = Error::PasswordHash("salt too short".into());
    assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
  }

  #[test]
  fn selector_errors_are_invalid_arguments() {
    let err = Error::InvalidArgument("unknown sort field".into());
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(Error::not_found(Entity::Tag, "\"x\"").kind(), ErrorKind::NotFound);
  }
}
