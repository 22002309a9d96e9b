//! Best-match search: find the existing contact a new one most resembles.
//!
//! A disjunctive query is built from the contact's name parts and e-mail
//! usernames, run against the store, and every returned candidate is scored
//! with [`compare`]. The single best candidate wins.

use namesake_core::{Contact, ContactId, Query, QueryField, store::ContactStore};
use tracing::{debug, trace, warn};

use crate::{MatchConfig, MatchError, Result, compare::compare, email::username, match_type::MatchType};

/// Default cap on OR'd clauses in a match query.
pub const MAX_QUERY_PARTS: usize = 10;

/// Progress of a [`CandidateSearch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
  Idle,
  QueryBuilt,
  QueryIssued,
  ResultsReceived,
  Scored,
  Done,
  /// The store query failed.
  Error,
}

/// The outcome of a best-match search.
#[derive(Debug, Clone)]
pub struct LocateResult {
  /// The contact that was searched for.
  pub contact:    Contact,
  /// The highest-scoring candidate, if any scored above `None`.
  pub best:       Option<Contact>,
  pub match_type: MatchType,
}

/// Build the duplicate-search query for `contact`, or `None` when the contact
/// offers nothing to search on.
///
/// Clauses, in order: file-as; given, additional and family names longer
/// than one character; one `beginswith` per e-mail username. Lists only
/// contribute their file-as. At most `max_parts` clauses are kept.
pub fn build_match_query(contact: &Contact, max_parts: usize) -> Option<Query> {
  let mut parts = Vec::new();

  if let Some(file_as) = contact.file_as.as_deref().filter(|s| !s.is_empty()) {
    parts.push(Query::contains(QueryField::FileAs, file_as));
  }

  if !contact.is_list {
    if let Some(name) = &contact.name {
      for part in [&name.given, &name.additional, &name.family] {
        if let Some(value) = part.as_deref().filter(|s| s.chars().count() > 1) {
          parts.push(Query::contains(QueryField::FullName, value));
        }
      }
    }

    for address in contact.emails.iter().filter(|a| !a.is_empty()) {
      parts.push(Query::begins_with(QueryField::Email, username(address)));
    }
  }

  parts.truncate(max_parts);
  Query::any_of(parts)
}

/// One best-match search against a store, tracking its [`SearchState`].
pub struct CandidateSearch<'s, S> {
  store:           &'s S,
  max_query_parts: usize,
  state:           SearchState,
}

impl<'s, S: ContactStore> CandidateSearch<'s, S> {
  pub fn new(store: &'s S) -> Self {
    Self { store, max_query_parts: MAX_QUERY_PARTS, state: SearchState::Idle }
  }

  pub fn with_config(mut self, config: &MatchConfig) -> Self {
    self.max_query_parts = config.max_query_parts;
    self
  }

  pub fn state(&self) -> SearchState { self.state }

  fn advance(&mut self, next: SearchState) {
    trace!(from = ?self.state, to = ?next, "candidate search");
    self.state = next;
  }

  /// Find the best match for `contact`, ignoring candidates in `avoid`.
  ///
  /// Ties keep the first candidate the store returned.
  pub async fn run(
    &mut self,
    contact: &Contact,
    avoid: &[ContactId],
  ) -> Result<(Option<Contact>, MatchType)> {
    let Some(query) = build_match_query(contact, self.max_query_parts) else {
      debug!("nothing to search on; no match");
      self.advance(SearchState::Done);
      return Ok((None, MatchType::None));
    };
    self.advance(SearchState::QueryBuilt);

    debug!(%query, "issuing match query");
    self.advance(SearchState::QueryIssued);
    let candidates = match self.store.query(&query).await {
      Ok(candidates) => candidates,
      Err(e) => {
        self.advance(SearchState::Error);
        return Err(MatchError::store(e));
      }
    };
    self.advance(SearchState::ResultsReceived);

    let mut best = None;
    let mut best_type = MatchType::None;
    for candidate in candidates {
      if candidate.id.as_ref().is_some_and(|id| avoid.contains(id)) {
        continue;
      }
      let this_match = compare(contact, &candidate);
      if this_match > best_type {
        best = Some(candidate);
        best_type = this_match;
      }
    }
    self.advance(SearchState::Scored);

    debug!(match_type = ?best_type, best = ?best.as_ref().and_then(|c| c.id.as_ref()), "match search scored");
    self.advance(SearchState::Done);
    Ok((best, best_type))
  }
}

/// Locate the best match for `contact`, surfacing store failures.
pub async fn try_locate_match<S: ContactStore>(
  store: &S,
  contact: Contact,
  avoid: &[ContactId],
  config: &MatchConfig,
) -> Result<LocateResult> {
  let (best, match_type) =
    CandidateSearch::new(store).with_config(config).run(&contact, avoid).await?;
  Ok(LocateResult { contact, best, match_type })
}

/// Locate the best match for `contact`.
///
/// A failed store query is reported as "no match" and only logged, so
/// callers cannot tell it apart from an empty result. Use
/// [`try_locate_match`] to see the failure.
pub async fn locate_match<S: ContactStore>(
  store: &S,
  contact: Contact,
  avoid: &[ContactId],
  config: &MatchConfig,
) -> LocateResult {
  let mut search = CandidateSearch::new(store).with_config(config);
  match search.run(&contact, avoid).await {
    Ok((best, match_type)) => LocateResult { contact, best, match_type },
    Err(e) => {
      warn!(error = %e, "match query failed; treating as no match");
      LocateResult { contact, best: None, match_type: MatchType::None }
    }
  }
}

/// [`locate_match`] delivering its result to a callback.
pub async fn locate_match_with<S, F>(
  store: &S,
  contact: Contact,
  avoid: &[ContactId],
  config: &MatchConfig,
  callback: F,
) where
  S: ContactStore,
  F: FnOnce(LocateResult),
{
  callback(locate_match(store, contact, avoid, config).await);
}
