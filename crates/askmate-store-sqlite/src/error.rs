//! Error type for `askmate-store-sqlite`.

use askmate_core::{Classify, ErrorKind};
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] askmate_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A row that breaks a schema invariant (e.g. a comment with two parents).
  #[error("corrupt row: {0}")]
  CorruptRow(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Wrap a domain error so it can leave a `Connection::call` closure.
///
/// Returning this from inside a transaction drops the transaction (rolling
/// it back); the `From` impl below unwraps it again on the async side.
pub(crate) fn abort(err: impl Into<Error>) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(err.into()))
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::Other(inner) => match inner.downcast::<Error>() {
        Ok(domain) => *domain,
        Err(other) => Error::Database(tokio_rusqlite::Error::Other(other)),
      },
      other => Error::Database(other),
    }
  }
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(e) => e.kind(),
      Error::Database(tokio_rusqlite::Error::Rusqlite(e))
        if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) =>
      {
        ErrorKind::IntegrityViolation
      }
      Error::Database(_) | Error::DateParse(_) | Error::CorruptRow(_) => {
        ErrorKind::StorageUnavailable
      }
    }
  }
}
