//! The `ContactStore` trait and the live-view types stores hand back.
//!
//! The trait is implemented by storage backends (e.g. `namesake-store-sqlite`).
//! The matching engine depends on this abstraction only; the store handle is
//! always passed in explicitly.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{Contact, ContactId, Query};

// ─── View types ──────────────────────────────────────────────────────────────

/// How a store query sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceStatus {
  Success,
  TimeLimitExceeded,
  SizeLimitExceeded,
  InvalidQuery,
  QueryRefused,
  OtherError,
}

impl SequenceStatus {
  pub fn is_success(self) -> bool { matches!(self, Self::Success) }
}

/// One message from a live view.
#[derive(Debug, Clone)]
pub enum ViewEvent {
  ContactsAdded(Vec<Contact>),
  /// Always the last event of a view.
  Complete(SequenceStatus),
}

/// The receiving half of a live store query.
///
/// Contacts arrive in batches followed by a single
/// [`ViewEvent::Complete`]. Dropping the view releases it; the store observes
/// a closed channel and stops producing.
#[derive(Debug)]
pub struct ContactView {
  rx: mpsc::Receiver<ViewEvent>,
}

impl ContactView {
  /// A fresh view and the sender a store feeds it through.
  pub fn channel(capacity: usize) -> (mpsc::Sender<ViewEvent>, Self) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (tx, Self { rx })
  }

  /// A view already holding `contacts` in batches of `batch_size`, followed by
  /// `status`.
  pub fn from_contacts(
    contacts: Vec<Contact>,
    batch_size: usize,
    status: SequenceStatus,
  ) -> Self {
    let batch_size = batch_size.max(1);
    let batches = contacts.len().div_ceil(batch_size);
    let (tx, view) = Self::channel(batches + 1);

    let mut contacts = contacts.into_iter().peekable();
    while contacts.peek().is_some() {
      let batch: Vec<Contact> = contacts.by_ref().take(batch_size).collect();
      // Capacity covers every batch plus the terminator.
      let _ = tx.try_send(ViewEvent::ContactsAdded(batch));
    }
    let _ = tx.try_send(ViewEvent::Complete(status));
    view
  }

  /// The next event, or `None` once the store side has gone away.
  pub async fn next_event(&mut self) -> Option<ViewEvent> { self.rx.recv().await }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an address book backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait ContactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Run `query` to completion and return every matching contact.
  fn query<'a>(
    &'a self,
    query: &'a Query,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + 'a;

  /// Open a live view over `query`, delivering contacts in batches of at
  /// most `batch_size`.
  ///
  /// The default runs [`ContactStore::query`] and replays its result.
  fn view<'a>(
    &'a self,
    query: &'a Query,
    batch_size: usize,
  ) -> impl Future<Output = Result<ContactView, Self::Error>> + Send + 'a {
    async move {
      let contacts = self.query(query).await?;
      Ok(ContactView::from_contacts(contacts, batch_size, SequenceStatus::Success))
    }
  }

  /// Retrieve a contact by id. Returns `None` if not found.
  fn get_contact<'a>(
    &'a self,
    id: &'a ContactId,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + 'a;

  /// Insert a new contact and return the id the store assigned. Any id
  /// already set on `contact` is ignored.
  fn add_contact(
    &self,
    contact: Contact,
  ) -> impl Future<Output = Result<ContactId, Self::Error>> + Send + '_;

  /// Replace the stored contact carrying `contact.id`.
  fn modify_contact(
    &self,
    contact: Contact,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
