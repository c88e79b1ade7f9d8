//! Tags. A question carries at most one.

use serde::{Deserialize, Serialize};

use crate::ids::TagId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
  pub id:   TagId,
  pub name: String,
}
