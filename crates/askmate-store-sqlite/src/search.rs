//! [`QuestionSearch`] for [`SqliteStore`]: ordered and filtered listings.

use askmate_core::{
  Entity,
  query::{SortField, SortOrder},
  question::Question,
  store::{QuestionSearch, SHORT_LISTING_LIMIT},
};

use crate::{
  Result,
  encode::{QUESTION_COLUMNS, RawQuestion, contains_pattern},
  error::abort,
  store::{SqliteStore, not_found, tag_id_by_name},
};

/// The SQL expression a listing is ordered by. Only these fixed strings
/// are ever spliced into a statement.
fn order_expr(field: SortField) -> &'static str {
  match field {
    SortField::SubmissionTime => "q.submission_time",
    SortField::Title => "q.title",
    SortField::Message => "q.message",
    SortField::ViewCount => "q.view_number",
    SortField::VoteCount => "(q.votes_up - q.votes_down)",
    SortField::CommentCount => "comment_count",
  }
}

fn direction(order: SortOrder) -> &'static str {
  match order {
    SortOrder::Ascending => "ASC",
    SortOrder::Descending => "DESC",
  }
}

fn collect_questions(
  stmt: &mut rusqlite::Statement<'_>,
  params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<RawQuestion>> {
  stmt
    .query_map(params, RawQuestion::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

impl QuestionSearch for SqliteStore {
  async fn sorted_questions(
    &self,
    field: SortField,
    order: SortOrder,
  ) -> Result<Vec<Question>> {
    let dir = direction(order);
    // The comment count comes from the same left-join reduction that backs
    // `comment_counts`, so questions without comments sort as zero.
    let sql = format!(
      "SELECT {QUESTION_COLUMNS}, COUNT(c.id) AS comment_count
       FROM question q
       LEFT JOIN comment c ON c.question_id = q.id
       GROUP BY q.id
       ORDER BY {} {dir}, q.id {dir}",
      order_expr(field)
    );

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        Ok(collect_questions(&mut stmt, [])?)
      })
      .await?;

    raws.into_iter().map(RawQuestion::into_question).collect()
  }

  async fn questions_with_tag(&self, tag_name: String) -> Result<Vec<Question>> {
    let raws = self
      .conn
      .call(move |conn| {
        let tag_id = tag_id_by_name(conn, &tag_name)?
          .ok_or_else(|| abort(not_found(Entity::Tag, format!("{tag_name:?}"))))?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {QUESTION_COLUMNS}
           FROM question q
           JOIN question_tag qt ON qt.question_id = q.id
           WHERE qt.tag_id = ?1
           ORDER BY q.submission_time DESC, q.id DESC"
        ))?;
        Ok(collect_questions(&mut stmt, [tag_id])?)
      })
      .await?;

    raws.into_iter().map(RawQuestion::into_question).collect()
  }

  async fn search_questions(&self, text: String) -> Result<Vec<Question>> {
    let pattern = contains_pattern(&text);
    let limit = SHORT_LISTING_LIMIT as i64;

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT DISTINCT {QUESTION_COLUMNS}
           FROM question q
           LEFT JOIN question_tag qt ON qt.question_id = q.id
           LEFT JOIN tag t ON t.id = qt.tag_id
           WHERE unicode_lower(q.title) LIKE ?1 ESCAPE '\\'
              OR unicode_lower(t.name) LIKE ?1 ESCAPE '\\'
           ORDER BY q.submission_time DESC, q.id DESC
           LIMIT ?2"
        ))?;
        Ok(collect_questions(&mut stmt, rusqlite::params![pattern, limit])?)
      })
      .await?;

    raws.into_iter().map(RawQuestion::into_question).collect()
  }
}
