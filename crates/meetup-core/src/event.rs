//! Events: creator-owned listings with the same shape as meets, minus
//! attendance.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::user::UserSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  pub id:          String,
  pub title:       String,
  pub description: String,
  pub sport:       String,
  pub date:        String,
  pub location:    Option<String>,
  pub image:       Option<String>,
  pub creator:     UserSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewEvent {
  #[validate(length(min = 1))]
  pub title:       String,
  #[validate(length(min = 1))]
  pub creator_id:  String,
  #[serde(default)]
  pub description: String,
  #[validate(length(min = 1))]
  pub sport:       String,
  pub location:    Option<String>,
  #[validate(length(min = 1))]
  pub date:        String,
  pub image:       Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EventUpdate {
  #[validate(length(min = 1))]
  pub title:       Option<String>,
  #[validate(length(min = 1))]
  pub creator_id:  Option<String>,
  pub description: Option<String>,
  #[validate(length(min = 1))]
  pub sport:       Option<String>,
  pub location:    Option<String>,
  #[validate(length(min = 1))]
  pub date:        Option<String>,
  pub image:       Option<String>,
}
