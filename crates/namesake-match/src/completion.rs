//! Type-ahead completion over a contact store.
//!
//! A [`CompletionSession`] hands out one [`CompletionSearch`] per keystroke.
//! Starting a search bumps the session's generation and cancels the previous
//! search, so results belonging to an older generation are never observed
//! once a newer search exists. Cancellation is cooperative: a store call that
//! is already running may finish, but its results are dropped.

use std::{
  collections::VecDeque,
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
};

use namesake_core::{
  Contact, Query, QueryField,
  store::{ContactStore, ContactView, SequenceStatus, ViewEvent},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
  MatchConfig,
  match_type::{MatchPart, MatchType},
  name::compare_name_to_string_full,
  text::name_tokens,
};

// ─── Results ─────────────────────────────────────────────────────────────────

/// One completion candidate, scored against the typed text.
#[derive(Debug, Clone)]
pub struct CompletionMatch {
  pub contact:            Contact,
  /// Matched characters of the typed text; higher ranks first.
  pub score:              usize,
  pub match_type:         MatchType,
  pub matched_parts:      MatchPart,
  pub first_matched_part: MatchPart,
}

#[derive(Debug, Clone)]
pub enum CompletionEvent {
  Match { generation: u64, hit: CompletionMatch },
  /// The store finished the search. Always the last event.
  Ended { generation: u64, status: SequenceStatus },
}

/// Everything a search produced, best first.
#[derive(Debug, Clone, Default)]
pub struct RankedCompletions {
  pub matches: Vec<CompletionMatch>,
  /// `None` when the search was superseded or cancelled before it ended.
  pub status:  Option<SequenceStatus>,
}

/// The store query for completing `text`: every token must appear in the
/// full or file-as name, or start an e-mail address or nickname.
pub fn completion_query(text: &str) -> Option<Query> {
  let clauses = name_tokens(text)
    .into_iter()
    .map(|token| {
      Query::Or(vec![
        Query::contains(QueryField::FullName, token),
        Query::begins_with(QueryField::Email, token),
        Query::begins_with(QueryField::Nickname, token),
        Query::contains(QueryField::FileAs, token),
      ])
    })
    .collect();
  Query::all_of(clauses)
}

fn score(text: &str, contact: Contact) -> CompletionMatch {
  let m = compare_name_to_string_full(&contact, text, true);
  CompletionMatch {
    contact,
    score: m.matched_char_count,
    match_type: m.match_type,
    matched_parts: m.matched_parts,
    first_matched_part: m.first_matched_part,
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// A completion context (one entry field). Owns the generation counter and
/// the cancellation token of the newest search.
pub struct CompletionSession<S> {
  store:      Arc<S>,
  config:     MatchConfig,
  generation: Arc<AtomicU64>,
  cancel:     CancellationToken,
}

impl<S: ContactStore> CompletionSession<S> {
  pub fn new(store: Arc<S>, config: &MatchConfig) -> Self {
    Self {
      store,
      config: config.clone(),
      generation: Arc::new(AtomicU64::new(0)),
      cancel: CancellationToken::new(),
    }
  }

  /// Generation of the newest search; 0 before the first one.
  pub fn generation(&self) -> u64 { self.generation.load(Ordering::SeqCst) }

  /// Start completing `text`, superseding any earlier search.
  ///
  /// Nothing is sent to the store until the returned search is polled.
  pub fn search(&mut self, text: &str) -> CompletionSearch<S> {
    self.cancel.cancel();
    self.cancel = CancellationToken::new();
    let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
    debug!(generation, text, "starting completion search");

    CompletionSearch {
      store: Arc::clone(&self.store),
      text: text.to_owned(),
      generation,
      current: Arc::clone(&self.generation),
      cancel: self.cancel.clone(),
      batch_size: self.config.completion_batch_size,
      minimum_query_length: self.config.minimum_query_length,
      phase: Phase::Pending,
      pending: VecDeque::new(),
    }
  }

  /// Stop listening to the current search without starting a new one.
  pub fn cancel(&mut self) { self.cancel.cancel(); }
}

impl<S> Drop for CompletionSession<S> {
  fn drop(&mut self) { self.cancel.cancel(); }
}

// ─── Search ──────────────────────────────────────────────────────────────────

enum Phase {
  Pending,
  Streaming(ContactView),
  Finished,
}

/// One generation of a [`CompletionSession`].
pub struct CompletionSearch<S> {
  store:                Arc<S>,
  text:                 String,
  generation:           u64,
  current:              Arc<AtomicU64>,
  cancel:               CancellationToken,
  batch_size:           usize,
  minimum_query_length: usize,
  phase:                Phase,
  pending:              VecDeque<CompletionEvent>,
}

impl<S: ContactStore> CompletionSearch<S> {
  pub fn generation(&self) -> u64 { self.generation }

  /// True once a newer search has started or the session was cancelled.
  pub fn is_stale(&self) -> bool {
    self.cancel.is_cancelled() || self.current.load(Ordering::SeqCst) != self.generation
  }

  /// The next event, or `None` once the search has ended or gone stale.
  pub async fn next_event(&mut self) -> Option<CompletionEvent> {
    loop {
      if self.is_stale() {
        if !matches!(self.phase, Phase::Finished) || !self.pending.is_empty() {
          debug!(generation = self.generation, "discarding stale completion results");
        }
        // Dropping the view releases it on the store side.
        self.phase = Phase::Finished;
        self.pending.clear();
        return None;
      }

      if let Some(event) = self.pending.pop_front() {
        return Some(event);
      }

      match self.phase {
        Phase::Finished => return None,
        Phase::Pending => self.open().await,
        Phase::Streaming(_) => self.pump().await,
      }
    }
  }

  /// Drain the search and rank its matches by score, best first. Equal
  /// scores keep store order.
  pub async fn collect_ranked(mut self) -> RankedCompletions {
    let mut ranked = RankedCompletions::default();
    while let Some(event) = self.next_event().await {
      match event {
        CompletionEvent::Match { hit, .. } => ranked.matches.push(hit),
        CompletionEvent::Ended { status, .. } => ranked.status = Some(status),
      }
    }
    ranked.matches.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
  }

  fn finish(&mut self, status: SequenceStatus) {
    self.phase = Phase::Finished;
    self
      .pending
      .push_back(CompletionEvent::Ended { generation: self.generation, status });
  }

  async fn open(&mut self) {
    let query = if self.text.chars().count() >= self.minimum_query_length {
      completion_query(&self.text)
    } else {
      None
    };
    let Some(query) = query else {
      self.finish(SequenceStatus::Success);
      return;
    };

    let opened = tokio::select! {
      biased;
      _ = self.cancel.cancelled() => return,
      view = self.store.view(&query, self.batch_size) => view,
    };

    match opened {
      Ok(view) => self.phase = Phase::Streaming(view),
      Err(e) => {
        warn!(generation = self.generation, error = %e, "completion query failed");
        self.finish(SequenceStatus::OtherError);
      }
    }
  }

  async fn pump(&mut self) {
    let Phase::Streaming(view) = &mut self.phase else {
      return;
    };
    let event = tokio::select! {
      biased;
      _ = self.cancel.cancelled() => return,
      event = view.next_event() => event,
    };

    match event {
      Some(ViewEvent::ContactsAdded(batch)) => {
        for contact in batch {
          let hit = score(&self.text, contact);
          self
            .pending
            .push_back(CompletionEvent::Match { generation: self.generation, hit });
        }
      }
      Some(ViewEvent::Complete(status)) => self.finish(status),
      None => self.finish(SequenceStatus::OtherError),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use namesake_core::ContactName;

  use super::*;
  use crate::test_store::MemoryStore;

  fn store() -> MemoryStore {
    MemoryStore::with_contacts(vec![
      Contact::named("John", "Smith").with_id("john"),
      Contact::named("Johanna", "Doe").with_id("johanna"),
      Contact::named("Alice", "Jones").with_email("ajones@example.com").with_id("alice"),
    ])
  }

  fn ids(ranked: &RankedCompletions) -> Vec<&str> {
    ranked
      .matches
      .iter()
      .map(|m| m.contact.id.as_ref().map_or("", |id| id.as_str()))
      .collect()
  }

  #[test]
  fn query_ands_one_clause_per_token() {
    let query = completion_query("Jo, Sm").unwrap();
    let Query::And(parts) = &query else { panic!("expected a conjunction") };
    assert_eq!(parts.len(), 2);
    assert_eq!(
      parts[0].to_string(),
      r#"(or (contains "full_name" "Jo") (beginswith "email" "Jo") (beginswith "nickname" "Jo") (contains "file_as" "Jo"))"#
    );
    assert!(completion_query(" ").is_none());
  }

  #[tokio::test]
  async fn ranks_matches_by_matched_characters() {
    let mut session = CompletionSession::new(Arc::new(store()), &MatchConfig::default());
    let ranked = session.search("Jo").collect_ranked().await;

    assert_eq!(ranked.status, Some(SequenceStatus::Success));
    assert_eq!(ids(&ranked), ["john", "johanna", "alice"]);
    assert_eq!(ranked.matches[0].score, 2);
    // Alice is only found through her family name.
    assert_eq!(ranked.matches[2].matched_parts, MatchPart::FAMILY_NAME);

    let ranked = session.search("Smith Jo").collect_ranked().await;
    assert_eq!(ids(&ranked), ["john"]);
    assert_eq!(ranked.matches[0].score, 7);
    assert_eq!(ranked.matches[0].match_type, MatchType::Exact);
  }

  #[tokio::test]
  async fn email_only_hits_score_zero() {
    let mut session = CompletionSession::new(Arc::new(store()), &MatchConfig::default());
    let ranked = session.search("ajon").collect_ranked().await;
    assert_eq!(ids(&ranked), ["alice"]);
    assert_eq!(ranked.matches[0].score, 0);
    assert_eq!(ranked.matches[0].match_type, MatchType::None);
  }

  #[tokio::test]
  async fn events_carry_the_generation() {
    let mut session = CompletionSession::new(Arc::new(store()), &MatchConfig::default());
    let _ = session.search("x");
    let mut search = session.search("Alice");
    assert_eq!(search.generation(), 2);
    assert_eq!(session.generation(), 2);

    let mut events = vec![];
    while let Some(event) = search.next_event().await {
      events.push(event);
    }
    assert!(matches!(events[0], CompletionEvent::Match { generation: 2, .. }));
    assert!(matches!(
      events.last(),
      Some(CompletionEvent::Ended { generation: 2, status: SequenceStatus::Success })
    ));
  }

  #[tokio::test]
  async fn newer_search_discards_in_flight_results() {
    let store = MemoryStore {
      latency: Some(Duration::from_millis(50)),
      ..Default::default()
    };
    store.insert(Contact::named("John", "Smith"));
    store.insert(Contact::named("Alice", "Jones"));
    let store = Arc::new(store);
    let mut session = CompletionSession::new(Arc::clone(&store), &MatchConfig::default());

    let mut first = session.search("Jo");
    let pending = tokio::spawn(async move {
      let event = first.next_event().await;
      (event, first.is_stale())
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    let second = session.search("Alice");
    let (event, stale) = pending.await.unwrap();
    assert!(event.is_none());
    assert!(stale);

    let ranked = second.collect_ranked().await;
    assert_eq!(ranked.matches.len(), 1);
    assert_eq!(ranked.matches[0].contact.name.as_ref().unwrap().given.as_deref(), Some("Alice"));
  }

  #[tokio::test]
  async fn buffered_results_are_dropped_once_stale() {
    let config = MatchConfig { completion_batch_size: 1, ..Default::default() };
    let mut session = CompletionSession::new(Arc::new(store()), &config);

    let mut first = session.search("Jo");
    assert!(matches!(first.next_event().await, Some(CompletionEvent::Match { .. })));

    let _second = session.search("Al");
    assert!(first.next_event().await.is_none());
  }

  #[tokio::test]
  async fn cancel_stops_the_current_search() {
    let mut session = CompletionSession::new(Arc::new(store()), &MatchConfig::default());
    let mut search = session.search("Jo");
    session.cancel();
    assert!(search.is_stale());
    assert!(search.next_event().await.is_none());
  }

  #[tokio::test]
  async fn short_text_never_reaches_the_store() {
    let store = Arc::new(store());
    let config = MatchConfig { minimum_query_length: 3, ..Default::default() };
    let mut session = CompletionSession::new(Arc::clone(&store), &config);

    let ranked = session.search("Jo").collect_ranked().await;
    assert!(ranked.matches.is_empty());
    assert_eq!(ranked.status, Some(SequenceStatus::Success));

    let ranked = session.search("").collect_ranked().await;
    assert_eq!(ranked.status, Some(SequenceStatus::Success));
    assert!(store.query_log().is_empty());
  }

  #[tokio::test]
  async fn store_failure_ends_the_search() {
    let store = MemoryStore { failing: true, ..Default::default() };
    store.insert(Contact::default().with_name(ContactName::new(Some("John"), None, None)));
    let mut session = CompletionSession::new(Arc::new(store), &MatchConfig::default());

    let ranked = session.search("Jo").collect_ranked().await;
    assert!(ranked.matches.is_empty());
    assert_eq!(ranked.status, Some(SequenceStatus::OtherError));
  }
}
