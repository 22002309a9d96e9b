//! Duplicate detection on insert and modify.
//!
//! Before a contact is written, the [`DuplicateGate`] looks for an existing
//! contact that resembles it. Below `Vague` the write goes straight through;
//! otherwise a [`MergeResolver`] (typically a dialog showing both contacts)
//! decides between merging, writing anyway, and cancelling.

use std::{future::Future, sync::Arc};

use namesake_core::{Contact, ContactId, store::ContactStore};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::{
  MatchConfig, MatchError, Result,
  locate::{LocateResult, locate_match},
  match_type::MatchType,
  text::eq_ignore_case,
};

// ─── Resolution ──────────────────────────────────────────────────────────────

/// What the gate is about to do with the contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOp {
  /// Insert a new contact.
  Add,
  /// Save changes to a contact already in the store.
  Commit,
}

/// A suspected duplicate, as presented to a [`MergeResolver`].
#[derive(Debug, Clone, Copy)]
pub struct Conflict<'a> {
  pub op:         MergeOp,
  /// The contact being written.
  pub new:        &'a Contact,
  /// The existing contact it resembles.
  pub existing:   &'a Contact,
  pub match_type: MatchType,
  /// Merging would change nothing; see [`contacts_identical`].
  pub identical:  bool,
  /// The contact being added already carries `existing`'s id. Adding
  /// anyway stores a copy under a fresh id.
  pub same_id:    bool,
}

/// The user's answer to a [`Conflict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
  /// Write the new contact's data under the existing contact's id.
  Merge,
  /// Write the contact as if no duplicate had been found.
  AddAnyway,
  Cancel,
}

/// Decides what happens to a suspected duplicate.
pub trait MergeResolver: Send + Sync {
  fn resolve<'a>(
    &'a self,
    conflict: Conflict<'a>,
  ) -> impl Future<Output = Resolution> + Send + 'a;
}

/// A fixed answer, for non-interactive callers.
impl MergeResolver for Resolution {
  async fn resolve(&self, _conflict: Conflict<'_>) -> Resolution { *self }
}

/// How a gated write ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
  /// Inserted as a new contact with this id.
  Added(ContactId),
  /// Written over the existing duplicate with this id.
  Merged(ContactId),
  /// Saved as a modification of the contact with this id.
  Modified(ContactId),
}

impl MergeOutcome {
  pub fn id(&self) -> &ContactId {
    match self {
      Self::Added(id) | Self::Merged(id) | Self::Modified(id) => id,
    }
  }
}

// ─── Identity check ──────────────────────────────────────────────────────────

fn non_empty(value: Option<&str>) -> Option<&str> { value.filter(|s| !s.is_empty()) }

/// A field is "the same" unless `new` has a value that `existing` lacks or
/// contradicts.
fn field_same(new: Option<&str>, existing: Option<&str>) -> bool {
  match (non_empty(new), non_empty(existing)) {
    (Some(a), Some(b)) => eq_ignore_case(a, b),
    (Some(_), None) => false,
    _ => true,
  }
}

fn list_same(new: &[String], existing: &[String]) -> bool {
  new.len() == existing.len()
    && new.iter().all(|a| existing.iter().any(|b| eq_ignore_case(a, b)))
}

/// True when merging `new` into `existing` would add nothing: every simple
/// field of `new` is absent or equal up to case, and both carry the same
/// e-mail addresses, postal addresses and phone numbers.
pub fn contacts_identical(new: &Contact, existing: &Contact) -> bool {
  let (a, b) = (new.name.clone().unwrap_or_default(), existing.name.clone().unwrap_or_default());

  field_same(a.given.as_deref(), b.given.as_deref())
    && field_same(a.additional.as_deref(), b.additional.as_deref())
    && field_same(a.family.as_deref(), b.family.as_deref())
    && field_same(new.nickname.as_deref(), existing.nickname.as_deref())
    && field_same(new.file_as.as_deref(), existing.file_as.as_deref())
    && list_same(&new.emails, &existing.emails)
    && list_same(&new.addresses, &existing.addresses)
    && list_same(&new.phones, &existing.phones)
}

// ─── Gate ────────────────────────────────────────────────────────────────────

/// Look up the best existing match for a contact about to be added.
///
/// Callers insert directly when the verdict is `None` or `NotApplicable`
/// and ask the user otherwise. A failed lookup also reports `None`.
pub async fn add_with_merge_check<S: ContactStore>(
  store: &S,
  contact: Contact,
  avoid: &[ContactId],
  config: &MatchConfig,
) -> LocateResult {
  locate_match(store, contact, avoid, config).await
}

/// Writes contacts through a duplicate check, with at most
/// `max_concurrent_lookups` checks running at once. Further requests wait
/// for a free slot in arrival order.
pub struct DuplicateGate<S, R> {
  store:    Arc<S>,
  resolver: R,
  config:   MatchConfig,
  slots:    Semaphore,
}

impl<S, R> DuplicateGate<S, R>
where
  S: ContactStore,
  R: MergeResolver,
{
  pub fn new(store: Arc<S>, resolver: R, config: &MatchConfig) -> Self {
    Self {
      store,
      resolver,
      config: config.clone(),
      slots: Semaphore::new(config.max_concurrent_lookups.max(1)),
    }
  }

  /// Stop accepting requests. Checks already holding a slot finish; those
  /// still waiting, and any made later, fail with
  /// [`MatchError::QueueClosed`].
  pub fn close(&self) {
    debug!("duplicate gate closed");
    self.slots.close();
  }

  /// Insert `contact`, asking the resolver first if it looks like a
  /// duplicate, including when the match carries the contact's own id.
  pub async fn add_contact(&self, contact: Contact) -> Result<MergeOutcome> {
    let _slot = self.slots.acquire().await.map_err(|_| MatchError::QueueClosed)?;
    let found =
      add_with_merge_check(&*self.store, contact, &[], &self.config).await;
    self.settle(MergeOp::Add, found).await
  }

  /// Save changes to `contact`, asking the resolver first if it now looks
  /// like a different existing contact.
  pub async fn commit_contact(&self, contact: Contact) -> Result<MergeOutcome> {
    let _slot = self.slots.acquire().await.map_err(|_| MatchError::QueueClosed)?;
    let avoid: Vec<ContactId> = contact.id.iter().cloned().collect();
    let found = locate_match(&*self.store, contact, &avoid, &self.config).await;
    self.settle(MergeOp::Commit, found).await
  }

  /// The existing contact `contact` duplicates, if the match is better than
  /// `Vague`.
  pub async fn find_contact(&self, contact: &Contact) -> Result<Option<Contact>> {
    let _slot = self.slots.acquire().await.map_err(|_| MatchError::QueueClosed)?;
    let avoid: Vec<ContactId> = contact.id.iter().cloned().collect();
    let found = locate_match(&*self.store, contact.clone(), &avoid, &self.config).await;
    Ok(found.best.filter(|_| found.match_type > MatchType::Vague))
  }

  async fn settle(&self, op: MergeOp, found: LocateResult) -> Result<MergeOutcome> {
    let LocateResult { mut contact, best, match_type } = found;

    let existing = match best {
      Some(existing) if match_type.is_match() => existing,
      _ => return self.write(op, contact).await,
    };

    let same_id = op == MergeOp::Add && existing.id.is_some() && existing.id == contact.id;
    let conflict = Conflict {
      op,
      new: &contact,
      existing: &existing,
      match_type,
      identical: contacts_identical(&contact, &existing),
      same_id,
    };
    let resolution = self.resolver.resolve(conflict).await;
    debug!(?op, ?match_type, ?resolution, existing = ?existing.id, "duplicate resolved");

    match resolution {
      Resolution::AddAnyway => {
        if same_id {
          contact.id = None;
        }
        self.write(op, contact).await
      }
      Resolution::Merge => {
        contact.id = existing.id;
        let id = self.modify(contact).await?.id().clone();
        Ok(MergeOutcome::Merged(id))
      }
      Resolution::Cancel => Err(MatchError::Cancelled),
    }
  }

  async fn write(&self, op: MergeOp, contact: Contact) -> Result<MergeOutcome> {
    match op {
      MergeOp::Add => {
        let id = self.store.add_contact(contact).await.map_err(MatchError::store)?;
        Ok(MergeOutcome::Added(id))
      }
      MergeOp::Commit => self.modify(contact).await,
    }
  }

  async fn modify(&self, contact: Contact) -> Result<MergeOutcome> {
    let id = contact
      .id
      .clone()
      .ok_or_else(|| MatchError::Store("cannot modify a contact without an id".into()))?;
    self.store.modify_contact(contact).await.map_err(MatchError::store)?;
    Ok(MergeOutcome::Modified(id))
  }
}
