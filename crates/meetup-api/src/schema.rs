//! Input schemas for the Generic Controller.
//!
//! The controller only knows the [`Schema`] seam. [`Validated`] is the
//! implementation every resource uses: serde for shape, `validator` for
//! field rules.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

/// Turn a raw request body into a typed value, or explain why not.
pub trait Schema<T>: Send + Sync {
  fn validate(&self, raw: Value) -> Result<T, String>;
}

/// Deserialize into `T`, then run its `validator` rules.
pub struct Validated<T>(PhantomData<fn() -> T>);

impl<T> Validated<T> {
  pub fn new() -> Self { Self(PhantomData) }
}

impl<T> Default for Validated<T> {
  fn default() -> Self { Self::new() }
}

impl<T> Schema<T> for Validated<T>
where
  T: DeserializeOwned + Validate,
{
  fn validate(&self, raw: Value) -> Result<T, String> {
    let value: T = serde_json::from_value(raw).map_err(|e| e.to_string())?;
    value.validate().map_err(|e| e.to_string())?;
    Ok(value)
  }
}

#[cfg(test)]
mod tests {
  use meetup_core::{event::NewEvent, user::UserUpdate};
  use serde_json::json;

  use super::*;

  #[test]
  fn accepts_a_valid_body() {
    let event = Validated::<NewEvent>::new()
      .validate(json!({
        "title": "t",
        "sport": "football",
        "date": "01-01-2020",
        "creatorId": "u1",
      }))
      .unwrap();
    assert_eq!(event.creator_id, "u1");
  }

  #[test]
  fn reports_missing_fields() {
    let err = Validated::<NewEvent>::new()
      .validate(json!({ "title": "t" }))
      .unwrap_err();
    assert!(err.contains("missing field"), "{err}");
  }

  #[test]
  fn reports_rule_violations() {
    let err = Validated::<NewEvent>::new()
      .validate(json!({
        "title": "",
        "sport": "football",
        "date": "01-01-2020",
        "creatorId": "u1",
      }))
      .unwrap_err();
    assert!(err.contains("title"), "{err}");
  }

  #[test]
  fn empty_patch_is_rejected() {
    assert!(Validated::<UserUpdate>::new().validate(json!({})).is_err());
  }
}
