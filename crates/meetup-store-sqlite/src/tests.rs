//! Integration tests for the SQLite repositories against an in-memory
//! database.

use meetup_core::{
  Error as CoreError, Role,
  event::{EventUpdate, NewEvent},
  meet::{MeetUpdate, NewMeet},
  relationship::{Direction, Relation, RelationshipRepository},
  repository::{LoginKey, LoginRepository, Repository, SearchRepository},
  user::{Gender, NewUser, User, UserUpdate},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_user(username: &str) -> NewUser {
  NewUser {
    username:   username.into(),
    email:      format!("{username}@example.com"),
    password:   "$argon2id$fake".into(),
    avatar:     None,
    location:   "Madrid".into(),
    birth_date: "1990-01-01".into(),
    gender:     Gender::Unspecified,
    bio:        String::new(),
  }
}

fn new_meet(creator_id: &str, title: &str) -> NewMeet {
  NewMeet {
    title:       title.into(),
    creator_id:  creator_id.into(),
    description: String::new(),
    sport:       "football".into(),
    location:    None,
    date:        "01-01-2020".into(),
    image:       None,
  }
}

async fn user(s: &SqliteStore, username: &str) -> User {
  s.users().create(new_user(username)).await.unwrap()
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_read_user() {
  let s = store().await;
  let created = user(&s, "ana").await;
  assert_eq!(created.role, Role::User);
  assert!(created.friends.is_empty());

  let fetched = s.users().read_by_id(&created.id).await.unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn read_missing_user_is_not_found() {
  let s = store().await;
  let err = s.users().read_by_id("missing").await.unwrap_err();
  assert!(matches!(err, CoreError::NotFound(m) if m == "User missing not found"));
}

#[tokio::test]
async fn duplicate_username_is_bad_request() {
  let s = store().await;
  user(&s, "ana").await;
  let mut dup = new_user("ana");
  dup.email = "other@example.com".into();
  let err = s.users().create(dup).await.unwrap_err();
  assert!(matches!(err, CoreError::BadRequest(_)));
}

#[tokio::test]
async fn update_only_touches_supplied_fields() {
  let s = store().await;
  let ana = user(&s, "ana").await;

  let patch = UserUpdate { bio: Some("runner".into()), ..Default::default() };
  let updated = s.users().update(&ana.id, patch).await.unwrap();
  assert_eq!(updated.bio, "runner");
  assert_eq!(updated.location, ana.location);
}

#[tokio::test]
async fn update_and_delete_missing_user_are_not_found() {
  let s = store().await;
  let patch = UserUpdate { bio: Some("x".into()), ..Default::default() };
  assert!(matches!(
    s.users().update("nope", patch).await,
    Err(CoreError::NotFound(_))
  ));
  assert!(matches!(s.users().delete("nope").await, Err(CoreError::NotFound(_))));
  assert!(s.users().read_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_returns_the_removed_user() {
  let s = store().await;
  let ana = user(&s, "ana").await;
  let removed = s.users().delete(&ana.id).await.unwrap();
  assert_eq!(removed.id, ana.id);
  assert!(matches!(s.users().read_by_id(&ana.id).await, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn search_users_by_username() {
  let s = store().await;
  user(&s, "alice").await;
  user(&s, "alicia").await;
  user(&s, "bob").await;

  let found = s.users().search("ali").await.unwrap();
  assert_eq!(found.len(), 2);
  assert!(s.users().search("zed").await.unwrap().is_empty());
}

#[tokio::test]
async fn username_search_treats_wildcards_literally() {
  let s = store().await;
  user(&s, "ana_b").await;
  user(&s, "anaxb").await;

  let found = s.users().search("_").await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].username, "ana_b");
  assert_eq!(s.users().search("a_b").await.unwrap().len(), 1);
  assert!(s.users().search("%").await.unwrap().is_empty());
}

// ─── Login lookup ────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_lookup_by_email_and_username() {
  let s = store().await;
  let ana = user(&s, "ana").await;

  let by_email = s
    .users()
    .search_for_login(LoginKey::Email, "ana@example.com")
    .await
    .unwrap();
  assert_eq!(by_email.id, ana.id);
  assert_eq!(by_email.password, "$argon2id$fake");

  let by_name = s.users().search_for_login(LoginKey::Username, "ana").await.unwrap();
  assert_eq!(by_name.id, ana.id);
}

#[tokio::test]
async fn login_lookup_miss_is_bad_request() {
  let s = store().await;
  let err = s
    .users()
    .search_for_login(LoginKey::Email, "ghost@example.com")
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::BadRequest(m) if m == "Invalid email or password"));
}

// ─── Relationships ───────────────────────────────────────────────────────────

#[tokio::test]
async fn add_friend_twice_keeps_one_edge() {
  let s = store().await;
  let ana = user(&s, "ana").await;
  let bob = user(&s, "bob").await;

  s.users().add_friend(&ana.id, &bob.id).await.unwrap();
  let after = s.users().add_friend(&ana.id, &bob.id).await.unwrap();

  let ids: Vec<_> = after.friends.iter().map(|f| f.id.as_str()).collect();
  assert_eq!(ids, vec![bob.id.as_str()]);
}

#[tokio::test]
async fn friendship_is_mutual() {
  let s = store().await;
  let ana = user(&s, "ana").await;
  let bob = user(&s, "bob").await;

  s.users().add_friend(&ana.id, &bob.id).await.unwrap();
  let bobs_friends = s.users().get_friends(&bob.id).await.unwrap();
  assert_eq!(bobs_friends.len(), 1);
  assert_eq!(bobs_friends[0].id, ana.id);

  s.users().delete_friend(&bob.id, &ana.id).await.unwrap();
  assert!(s.users().get_friends(&ana.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_missing_friend_is_a_no_op() {
  let s = store().await;
  let ana = user(&s, "ana").await;
  let result = s.users().delete_friend(&ana.id, "nobody").await.unwrap();
  assert!(result.friends.is_empty());
}

#[tokio::test]
async fn befriending_yourself_is_rejected() {
  let s = store().await;
  let ana = user(&s, "ana").await;
  assert!(matches!(
    s.users().add_friend(&ana.id, &ana.id).await,
    Err(CoreError::BadRequest(_))
  ));
}

#[tokio::test]
async fn get_friends_of_missing_user_is_not_found() {
  let s = store().await;
  let err = s.users().get_friends("missingUser").await.unwrap_err();
  assert!(matches!(err, CoreError::NotFound(m) if m == "User missingUser not found"));
}

#[tokio::test]
async fn empty_collections_are_not_errors() {
  let s = store().await;
  let ana = user(&s, "ana").await;
  assert!(s.users().get_friends(&ana.id).await.unwrap().is_empty());
  assert!(s.users().get_meets(&ana.id, Relation::SavedMeets).await.unwrap().is_empty());
}

#[tokio::test]
async fn join_and_leave_meet() {
  let s = store().await;
  let ana = user(&s, "ana").await;
  let bob = user(&s, "bob").await;
  let meet = s.meets().create(new_meet(&ana.id, "Sunday run")).await.unwrap();

  s.users().join_meet(&bob.id, &meet.id).await.unwrap();
  let joined = s.users().join_meet(&bob.id, &meet.id).await.unwrap();
  assert_eq!(joined.joined_meets.len(), 1);

  let meet_view = s.meets().read_by_id(&meet.id).await.unwrap();
  assert_eq!(meet_view.attendees.len(), 1);
  assert_eq!(meet_view.attendees[0].id, bob.id);

  let left = s.users().leave_meet(&bob.id, &meet.id).await.unwrap();
  assert!(left.joined_meets.is_empty());
  let left_again = s.users().leave_meet(&bob.id, &meet.id).await.unwrap();
  assert!(left_again.joined_meets.is_empty());
}

#[tokio::test]
async fn saved_and_joined_are_separate_collections() {
  let s = store().await;
  let ana = user(&s, "ana").await;
  let meet = s.meets().create(new_meet(&ana.id, "Padel")).await.unwrap();

  let saved = s.users().save_meet(&ana.id, &meet.id).await.unwrap();
  assert_eq!(saved.saved_meets.len(), 1);
  assert!(saved.joined_meets.is_empty());

  let removed = s.users().delete_meet(&ana.id, &meet.id).await.unwrap();
  assert!(removed.saved_meets.is_empty());
}

#[tokio::test]
async fn connecting_to_a_missing_meet_is_not_found() {
  let s = store().await;
  let ana = user(&s, "ana").await;
  let err = s
    .users()
    .set_membership(&ana.id, "ghost", Relation::SavedMeets, Direction::Connect)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::NotFound(m) if m == "Meet ghost not found"));
}

// ─── Meets & events ──────────────────────────────────────────────────────────

#[tokio::test]
async fn meet_carries_creator_and_is_listed_on_user() {
  let s = store().await;
  let ana = user(&s, "ana").await;
  let meet = s.meets().create(new_meet(&ana.id, "Sunday run")).await.unwrap();
  assert_eq!(meet.creator.id, ana.id);

  let ana = s.users().read_by_id(&ana.id).await.unwrap();
  assert_eq!(ana.created_meets.len(), 1);
}

#[tokio::test]
async fn meet_with_unknown_creator_is_bad_request() {
  let s = store().await;
  let err = s.meets().create(new_meet("ghost", "x")).await.unwrap_err();
  assert!(matches!(err, CoreError::BadRequest(_)));
}

#[tokio::test]
async fn search_meets_by_title() {
  let s = store().await;
  let ana = user(&s, "ana").await;
  s.meets().create(new_meet(&ana.id, "Morning Run")).await.unwrap();
  s.meets().create(new_meet(&ana.id, "Evening swim")).await.unwrap();

  let found = s.meets().search("run").await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].title, "Morning Run");
}

#[tokio::test]
async fn title_search_treats_wildcards_literally() {
  let s = store().await;
  let ana = user(&s, "ana").await;
  s.meets().create(new_meet(&ana.id, "50% off run")).await.unwrap();
  s.meets().create(new_meet(&ana.id, "500 run")).await.unwrap();

  let found = s.meets().search("0%").await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].title, "50% off run");
  assert!(s.meets().search("_").await.unwrap().is_empty());
}

#[tokio::test]
async fn update_missing_meet_is_not_found() {
  let s = store().await;
  let patch = MeetUpdate { title: Some("x".into()), ..Default::default() };
  assert!(matches!(s.meets().update("nope", patch).await, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn event_crud() {
  let s = store().await;
  let ana = user(&s, "ana").await;
  let event = s
    .events()
    .create(NewEvent {
      title:       "t".into(),
      creator_id:  ana.id.clone(),
      description: String::new(),
      sport:       "football".into(),
      location:    None,
      date:        "01-01-2020".into(),
      image:       None,
    })
    .await
    .unwrap();
  assert_eq!(event.creator.id, ana.id);
  assert_eq!(s.events().read_all().await.unwrap().len(), 1);

  let patch = EventUpdate { sport: Some("tennis".into()), ..Default::default() };
  let updated = s.events().update(&event.id, patch).await.unwrap();
  assert_eq!(updated.sport, "tennis");
  assert_eq!(updated.title, "t");

  s.events().delete(&event.id).await.unwrap();
  assert!(matches!(
    s.events().read_by_id(&event.id).await,
    Err(CoreError::NotFound(m)) if m == format!("Event {} not found", event.id)
  ));
}
