//! The decoded claim carried by an access token.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  #[default]
  User,
  Guest,
}

impl std::str::FromStr for Role {
  type Err = crate::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "admin" => Ok(Role::Admin),
      "user" => Ok(Role::User),
      "guest" => Ok(Role::Guest),
      other => Err(crate::Error::Internal(format!("unknown role: {other:?}"))),
    }
  }
}

/// Who is making the request. Ownership checks compare against `id`; it is
/// never inferred from anything but a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub id:   String,
  pub role: Role,
}
