//! [`SqliteStore`] — the SQLite implementation of the AskMate store traits.
//!
//! The trait impls are split by engine: `repository.rs`, `cascade.rs`,
//! `aggregate.rs` and `search.rs`. This module owns the connection and the
//! small synchronous helpers those impls share. Helpers take a plain
//! `&rusqlite::Connection`, so they run unchanged against an open
//! `Transaction`.

use std::path::Path;

use askmate_core::{Entity, store::ForumBackend};
use rusqlite::{OptionalExtension as _, functions::FunctionFlags};
use tracing::info;

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An AskMate store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, and every
/// clone funnels its calls through the same database thread.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    info!(path = %path.display(), "opened askmate store");
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl ForumBackend for SqliteStore {
  type Error = Error;
}

// ─── Shared helpers ──────────────────────────────────────────────────────────

/// Register `unicode_lower(text)`. SQLite's built-in `LOWER` folds ASCII
/// only; this applies full Unicode lower-casing, matching
/// [`str::to_lowercase`] on the Rust side. `NULL` stays `NULL`.
fn register_functions(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    "unicode_lower",
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| {
      let text: Option<String> = ctx.get(0)?;
      Ok(text.map(|t| t.to_lowercase()))
    },
  )
}

/// The table holding rows of `entity`.
pub(crate) fn table_of(entity: Entity) -> &'static str {
  match entity {
    Entity::Question => "question",
    Entity::Answer => "answer",
    Entity::Comment => "comment",
    Entity::Tag => "tag",
    Entity::Account => "accounts",
  }
}

/// Whether a row with `id` exists for `entity`.
pub(crate) fn exists(
  conn: &rusqlite::Connection,
  entity: Entity,
  id: i64,
) -> rusqlite::Result<bool> {
  let sql = format!("SELECT 1 FROM {} WHERE id = ?1", table_of(entity));
  Ok(
    conn
      .query_row(&sql, [id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

/// Look up a tag id by its unique name.
pub(crate) fn tag_id_by_name(
  conn: &rusqlite::Connection,
  name: &str,
) -> rusqlite::Result<Option<i64>> {
  conn
    .query_row("SELECT id FROM tag WHERE name = ?1", [name], |r| r.get(0))
    .optional()
}

/// Collect the first column of every row returned by `sql` bound to `id`.
pub(crate) fn ids_where(
  conn: &rusqlite::Connection,
  sql: &str,
  id: i64,
) -> rusqlite::Result<Vec<i64>> {
  let mut stmt = conn.prepare_cached(sql)?;
  stmt
    .query_map([id], |r| r.get(0))?
    .collect::<rusqlite::Result<Vec<i64>>>()
}

pub(crate) fn not_found(entity: Entity, key: impl std::fmt::Display) -> Error {
  askmate_core::Error::not_found(entity, key).into()
}

pub(crate) fn integrity(message: impl Into<String>) -> Error {
  askmate_core::Error::IntegrityViolation(message.into()).into()
}
