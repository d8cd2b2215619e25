//! Many-to-many relationship vocabulary and the relationship-capable
//! extension of the Resource Contract.
//!
//! Edges are not entities of their own. They exist only as membership of a
//! target in one of the owner's named collections, and every mutation is a
//! single idempotent set operation: connecting an existing edge and
//! disconnecting a missing one both succeed without changing anything.

use std::future::Future;

use crate::{Result, meet::MeetSummary, repository::Repository, user::UserSummary};

/// A named collection on the owning user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
  Friends,
  SavedMeets,
  JoinedMeets,
}

impl Relation {
  pub fn name(self) -> &'static str {
    match self {
      Relation::Friends => "friends",
      Relation::SavedMeets => "savedMeets",
      Relation::JoinedMeets => "joinedMeets",
    }
  }

  /// Whether the targets of this relation are meets (as opposed to users).
  pub fn targets_meets(self) -> bool { !matches!(self, Relation::Friends) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Connect,
  Disconnect,
}

/// Resources that own relationship collections.
///
/// Reads fail with `NotFound` only when the owner itself is missing; an empty
/// collection is a successful, empty result.
pub trait RelationshipRepository: Repository {
  /// Apply one already-resolved edge operation and return the updated owner.
  ///
  /// Connecting requires both ends to exist. Disconnecting only requires the
  /// owner.
  fn set_membership<'a>(
    &'a self,
    owner_id: &'a str,
    target_id: &'a str,
    relation: Relation,
    direction: Direction,
  ) -> impl Future<Output = Result<Self::Entity>> + Send + 'a;

  fn get_friends<'a>(
    &'a self,
    owner_id: &'a str,
  ) -> impl Future<Output = Result<Vec<UserSummary>>> + Send + 'a;

  /// List a meet collection. `relation` must target meets.
  fn get_meets<'a>(
    &'a self,
    owner_id: &'a str,
    relation: Relation,
  ) -> impl Future<Output = Result<Vec<MeetSummary>>> + Send + 'a;

  // ── Named toggles ─────────────────────────────────────────────────────

  fn add_friend<'a>(
    &'a self,
    owner_id: &'a str,
    friend_id: &'a str,
  ) -> impl Future<Output = Result<Self::Entity>> + Send + 'a {
    self.set_membership(owner_id, friend_id, Relation::Friends, Direction::Connect)
  }

  fn delete_friend<'a>(
    &'a self,
    owner_id: &'a str,
    friend_id: &'a str,
  ) -> impl Future<Output = Result<Self::Entity>> + Send + 'a {
    self.set_membership(owner_id, friend_id, Relation::Friends, Direction::Disconnect)
  }

  fn save_meet<'a>(
    &'a self,
    owner_id: &'a str,
    meet_id: &'a str,
  ) -> impl Future<Output = Result<Self::Entity>> + Send + 'a {
    self.set_membership(owner_id, meet_id, Relation::SavedMeets, Direction::Connect)
  }

  fn delete_meet<'a>(
    &'a self,
    owner_id: &'a str,
    meet_id: &'a str,
  ) -> impl Future<Output = Result<Self::Entity>> + Send + 'a {
    self.set_membership(owner_id, meet_id, Relation::SavedMeets, Direction::Disconnect)
  }

  fn join_meet<'a>(
    &'a self,
    owner_id: &'a str,
    meet_id: &'a str,
  ) -> impl Future<Output = Result<Self::Entity>> + Send + 'a {
    self.set_membership(owner_id, meet_id, Relation::JoinedMeets, Direction::Connect)
  }

  fn leave_meet<'a>(
    &'a self,
    owner_id: &'a str,
    meet_id: &'a str,
  ) -> impl Future<Output = Result<Self::Entity>> + Send + 'a {
    self.set_membership(owner_id, meet_id, Relation::JoinedMeets, Direction::Disconnect)
  }
}
