//! Human-readable "time ago" labels for submission timestamps.

use chrono::{DateTime, Utc};

const DAYS_PER_YEAR: i64 = 365;
const DAYS_PER_MONTH: i64 = 30;

/// Describe how long before `now` the instant `then` was, coarsest unit
/// first: "2 years ago", "1 month ago", "3 days ago", "5 hours ago".
///
/// Instants in the future are reported as "0 seconds ago".
pub fn time_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let delta = now.signed_duration_since(then);
  let days = delta.num_days();

  if days >= DAYS_PER_YEAR {
    return plural(days / DAYS_PER_YEAR, "year");
  }
  if days >= DAYS_PER_MONTH {
    return plural(days / DAYS_PER_MONTH, "month");
  }
  if days > 0 {
    return plural(days, "day");
  }

  let seconds = delta.num_seconds().max(0);
  if seconds >= 3600 {
    return plural(seconds / 3600, "hour");
  }
  if seconds >= 60 {
    return plural(seconds / 60, "minute");
  }
  plural(seconds, "second")
}

fn plural(n: i64, unit: &str) -> String {
  if n == 1 {
    format!("1 {unit} ago")
  } else {
    format!("{n} {unit}s ago")
  }
}
