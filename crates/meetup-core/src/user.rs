//! Users: the only login-capable and relationship-capable resource.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{identity::Role, meet::MeetSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
  Unspecified,
}

impl Gender {
  pub fn as_str(self) -> &'static str {
    match self {
      Gender::Male => "male",
      Gender::Female => "female",
      Gender::Unspecified => "unspecified",
    }
  }
}

/// A user as exposed through the API. Never carries the password digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:            String,
  pub username:      String,
  pub email:         String,
  pub role:          Role,
  pub avatar:        Option<String>,
  pub location:      String,
  pub birth_date:    String,
  pub gender:        Gender,
  pub bio:           String,
  pub friends:       Vec<UserSummary>,
  pub created_meets: Vec<MeetSummary>,
  pub saved_meets:   Vec<MeetSummary>,
  pub joined_meets:  Vec<MeetSummary>,
}

/// The slice of a user embedded in other resources (creators, attendees,
/// friend lists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
  pub id:       String,
  pub username: String,
  pub email:    String,
}

/// Registration payload. `password` is already a digest by the time this
/// reaches a repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
  #[validate(length(min = 1))]
  pub username:   String,
  #[validate(email)]
  pub email:      String,
  #[validate(length(min = 1))]
  pub password:   String,
  pub avatar:     Option<String>,
  #[validate(length(min = 1))]
  pub location:   String,
  #[validate(length(min = 1))]
  pub birth_date: String,
  pub gender:     Gender,
  #[serde(default)]
  pub bio:        String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[validate(schema(function = "at_least_one_field"))]
pub struct UserUpdate {
  #[validate(length(min = 1))]
  pub username:   Option<String>,
  #[validate(email)]
  pub email:      Option<String>,
  #[validate(length(min = 1))]
  pub password:   Option<String>,
  pub avatar:     Option<String>,
  pub location:   Option<String>,
  pub birth_date: Option<String>,
  pub bio:        Option<String>,
}

impl UserUpdate {
  pub fn is_empty(&self) -> bool { self == &UserUpdate::default() }
}

fn at_least_one_field(update: &UserUpdate) -> Result<(), ValidationError> {
  if update.is_empty() {
    let mut err = ValidationError::new("min_fields");
    err.message = Some("at least one field must be provided".into());
    return Err(err);
  }
  Ok(())
}

/// The credential-bearing projection returned by a login lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRecord {
  pub id:       String,
  pub username: String,
  pub email:    String,
  pub role:     Role,
  pub password: String,
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn new_user_defaults_bio() {
    let user: NewUser = serde_json::from_value(json!({
      "username": "ana",
      "email": "ana@example.com",
      "password": "digest",
      "location": "Madrid",
      "birthDate": "1990-01-01",
      "gender": "female",
    }))
    .unwrap();
    assert_eq!(user.bio, "");
    assert!(user.validate().is_ok());
  }

  #[test]
  fn new_user_rejects_bad_email() {
    let user: NewUser = serde_json::from_value(json!({
      "username": "ana",
      "email": "not-an-email",
      "password": "digest",
      "location": "Madrid",
      "birthDate": "1990-01-01",
      "gender": "female",
    }))
    .unwrap();
    assert!(user.validate().is_err());
  }

  #[test]
  fn empty_update_is_invalid() {
    assert!(UserUpdate::default().validate().is_err());
    let update = UserUpdate { bio: Some("hi".into()), ..Default::default() };
    assert!(update.validate().is_ok());
  }

  #[test]
  fn user_serialises_camel_case() {
    let summary = UserSummary {
      id:       "1".into(),
      username: "ana".into(),
      email:    "ana@example.com".into(),
    };
    let value = serde_json::to_value(&summary).unwrap();
    assert_eq!(value["username"], "ana");
  }
}
