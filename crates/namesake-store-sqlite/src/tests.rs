//! Integration tests for `SqliteStore` against an in-memory database.

use namesake_core::{
  Contact, ContactId, ContactName, Query, QueryField,
  store::{ContactStore, SequenceStatus, ViewEvent},
};
use namesake_match::{
  MatchConfig, MatchType,
  completion::CompletionSession,
  locate::{locate_match, try_locate_match},
  merging::{DuplicateGate, MergeOutcome, Resolution},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn seeded() -> SqliteStore {
  let s = store().await;
  s.add_contact(Contact::named("John", "Smith").with_email("JSmith@example.com"))
    .await
    .unwrap();
  s.add_contact(Contact::named("Johanna", "Doe").with_email("jo@doe.net"))
    .await
    .unwrap();
  s.add_contact(Contact::named("Alice", "Jones").with_email("ajones@example.com"))
    .await
    .unwrap();
  s
}

fn given(c: &Contact) -> &str {
  c.name.as_ref().and_then(|n| n.given.as_deref()).unwrap_or_default()
}

// ─── Contacts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_contact() {
  let s = store().await;
  let mut contact = Contact::named("Mary Ann", "Evans")
    .with_email("mae@example.com")
    .with_email("george@eliot.org");
  contact.nickname = Some("George".into());
  contact.file_as = Some("Eliot, George".into());
  contact.phones = vec!["555-0100".into()];

  let id = s.add_contact(contact.clone()).await.unwrap();
  let fetched = s.get_contact(&id).await.unwrap().unwrap();

  assert_eq!(fetched.id.as_ref(), Some(&id));
  assert_eq!(fetched, Contact { id: Some(id), ..contact });
}

#[tokio::test]
async fn add_ignores_the_callers_id() {
  let s = store().await;
  let id = s
    .add_contact(Contact::named("John", "Smith").with_id("chosen"))
    .await
    .unwrap();
  assert_ne!(id.as_str(), "chosen");
  assert!(s.get_contact(&ContactId::new("chosen")).await.unwrap().is_none());
}

#[tokio::test]
async fn get_contact_missing_returns_none() {
  let s = store().await;
  let result = s.get_contact(&ContactId::new("nope")).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn modify_replaces_fields_and_emails() {
  let s = seeded().await;
  let mut john = s
    .query(&Query::is(QueryField::FullName, "john smith"))
    .await
    .unwrap()
    .pop()
    .unwrap();

  john.emails = vec!["john@new.example.com".into()];
  john.name = Some(ContactName::new(Some("Jon"), None, Some("Smith")));
  s.modify_contact(john.clone()).await.unwrap();

  let fetched = s.get_contact(john.id.as_ref().unwrap()).await.unwrap().unwrap();
  assert_eq!(fetched, john);
  assert_eq!(s.list_contacts().await.unwrap().len(), 3);
}

#[tokio::test]
async fn modify_unknown_contact_fails() {
  let s = store().await;
  let err = s
    .modify_contact(Contact::named("John", "Smith").with_id("ghost"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ContactNotFound(id) if id.as_str() == "ghost"));

  let err = s.modify_contact(Contact::named("John", "Smith")).await.unwrap_err();
  assert!(matches!(err, Error::MissingId));
}

// ─── Queries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_keeps_insertion_order() {
  let s = seeded().await;
  let names: Vec<String> =
    s.list_contacts().await.unwrap().iter().map(|c| given(c).to_owned()).collect();
  assert_eq!(names, ["John", "Johanna", "Alice"]);
}

#[tokio::test]
async fn contains_is_case_insensitive() {
  let s = seeded().await;
  let hits = s.query(&Query::contains(QueryField::FullName, "JOH")).await.unwrap();
  assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn email_prefix_matches_any_address() {
  let s = seeded().await;
  let hits = s.query(&Query::begins_with(QueryField::Email, "jsmith")).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].emails, ["JSmith@example.com"]);

  let none = s.query(&Query::begins_with(QueryField::Email, "smith")).await.unwrap();
  assert!(none.is_empty());
}

#[tokio::test]
async fn compound_queries_combine() {
  let s = seeded().await;
  let query: Query =
    r#"(and (contains "full_name" "jo") (not (beginswith "email" "jo")))"#.parse().unwrap();
  let hits = s.query(&query).await.unwrap();
  let names: Vec<&str> = hits.iter().map(given).collect();
  assert_eq!(names, ["John", "Alice"]);
}

#[tokio::test]
async fn any_field_searches_every_column() {
  let s = seeded().await;
  let mut bob = Contact::named("Robert", "Brown");
  bob.nickname = Some("Bobby".into());
  s.add_contact(bob).await.unwrap();

  let hits = s.query(&Query::contains(QueryField::AnyField, "bobb")).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(s.query(&Query::everything()).await.unwrap().len(), 4);
}

#[tokio::test]
async fn sql_metacharacters_are_literal() {
  let s = store().await;
  s.add_contact(Contact::named("Percy", "100%")).await.unwrap();
  s.add_contact(Contact::named("Under", "Score")).await.unwrap();

  let hits = s.query(&Query::contains(QueryField::FullName, "0%")).await.unwrap();
  assert_eq!(hits.len(), 1);
  let hits = s.query(&Query::contains(QueryField::FullName, "_")).await.unwrap();
  assert!(hits.is_empty());
}

#[tokio::test]
async fn view_delivers_batches_then_completes() {
  let s = seeded().await;
  let mut view = s.view(&Query::everything(), 2).await.unwrap();

  let mut sizes = vec![];
  let status = loop {
    match view.next_event().await {
      Some(ViewEvent::ContactsAdded(batch)) => sizes.push(batch.len()),
      Some(ViewEvent::Complete(status)) => break status,
      None => panic!("view closed without completing"),
    }
  };
  assert_eq!(sizes, [2, 1]);
  assert_eq!(status, SequenceStatus::Success);
}

// ─── Matching over SQLite ────────────────────────────────────────────────────

#[tokio::test]
async fn locate_finds_synonym_duplicate() {
  let s = seeded().await;
  let result = try_locate_match(
    &s,
    Contact::named("Jon", "Smith"),
    &[],
    &MatchConfig::default(),
  )
  .await
  .unwrap();

  assert_eq!(result.match_type, MatchType::Exact);
  assert_eq!(given(&result.best.unwrap()), "John");
}

#[tokio::test]
async fn locate_by_email_username() {
  let s = seeded().await;
  let stranger = Contact::default().with_email("ajones@elsewhere.org");
  let result = locate_match(&s, stranger, &[], &MatchConfig::default()).await;

  assert_eq!(result.match_type, MatchType::Vague);
  assert_eq!(given(&result.best.unwrap()), "Alice");
}

#[tokio::test]
async fn gate_merges_into_sqlite() {
  let s = std::sync::Arc::new(seeded().await);
  let gate = DuplicateGate::new(s.clone(), Resolution::Merge, &MatchConfig::default());

  let outcome = gate
    .add_contact(Contact::named("John", "Smith").with_email("john@smith.org"))
    .await
    .unwrap();
  let MergeOutcome::Merged(id) = &outcome else {
    panic!("expected a merge, got {outcome:?}");
  };

  assert_eq!(s.list_contacts().await.unwrap().len(), 3);
  let merged = s.get_contact(id).await.unwrap().unwrap();
  assert_eq!(merged.emails, ["john@smith.org"]);
}

#[tokio::test]
async fn completion_ranks_sqlite_results() {
  let s = std::sync::Arc::new(seeded().await);
  let mut session = CompletionSession::new(s, &MatchConfig::default());

  let ranked = session.search("smi jo").collect_ranked().await;
  assert_eq!(ranked.status, Some(SequenceStatus::Success));
  assert_eq!(ranked.matches.len(), 1);
  assert_eq!(given(&ranked.matches[0].contact), "John");
  assert_eq!(ranked.matches[0].score, 5);
}
