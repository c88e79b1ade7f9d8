//! User accounts.
//!
//! The password hash never leaves the store: [`Account`] has no field for
//! it, and [`NewAccount`]'s `Debug` output redacts the clear-text password.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  pub id:                UserId,
  pub username:          String,
  pub email:             String,
  pub first_name:        String,
  pub last_name:         String,
  pub registration_time: DateTime<Utc>,
}

/// Input to [`crate::store::EntityRepository::register_account`].
#[derive(Clone)]
pub struct NewAccount {
  pub username:   String,
  /// Clear text; hashed by the store before it is written.
  pub password:   String,
  pub email:      String,
  pub first_name: String,
  pub last_name:  String,
}

impl fmt::Debug for NewAccount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("NewAccount")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .field("email", &self.email)
      .field("first_name", &self.first_name)
      .field("last_name", &self.last_name)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn debug_output_redacts_password() {
    let input = NewAccount {
      username:   "ada".into(),
      password:   "hunter2".into(),
      email:      "ada@example.com".into(),
      first_name: "Ada".into(),
      last_name:  "Lovelace".into(),
    };
    let shown = format!("{input:?}");
    assert!(!shown.contains("hunter2"));
    assert!(shown.contains("ada@example.com"));
  }
}
