//! In-memory [`ContactStore`] doubles for the engine's tests.

use std::{
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use namesake_core::{Contact, ContactId, Query, store::ContactStore};

#[derive(Debug, thiserror::Error)]
#[error("memory store: {0}")]
pub struct MemoryError(pub String);

/// A vector-backed store evaluating queries in memory.
#[derive(Default)]
pub struct MemoryStore {
  pub contacts:  Mutex<Vec<Contact>>,
  pub next_id:   AtomicUsize,
  /// Every query text received, in order.
  pub queries:   Mutex<Vec<String>>,
  /// Make every query fail.
  pub failing:   bool,
  /// Delay applied to each query.
  pub latency:   Option<Duration>,
  pub in_flight: AtomicUsize,
  /// Highest number of queries observed running at once.
  pub peak:      AtomicUsize,
}

impl MemoryStore {
  pub fn with_contacts(contacts: Vec<Contact>) -> Self {
    let store = Self::default();
    for c in contacts {
      store.insert(c);
    }
    store
  }

  pub fn insert(&self, mut contact: Contact) -> ContactId {
    let id = contact.id.clone().unwrap_or_else(|| {
      ContactId::new(format!("mem-{}", self.next_id.fetch_add(1, Ordering::SeqCst)))
    });
    contact.id = Some(id.clone());
    self.contacts.lock().unwrap().push(contact);
    id
  }

  pub fn all(&self) -> Vec<Contact> { self.contacts.lock().unwrap().clone() }

  pub fn query_log(&self) -> Vec<String> { self.queries.lock().unwrap().clone() }
}

/// Counts one running query until dropped, including when the query future
/// is dropped mid-sleep.
struct InFlight<'a> {
  counter: &'a AtomicUsize,
  /// Queries running, this one included, when it started.
  count:   usize,
}

impl<'a> InFlight<'a> {
  fn enter(counter: &'a AtomicUsize) -> Self {
    let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
    Self { counter, count }
  }
}

impl Drop for InFlight<'_> {
  fn drop(&mut self) { self.counter.fetch_sub(1, Ordering::SeqCst); }
}

impl ContactStore for MemoryStore {
  type Error = MemoryError;

  async fn query(&self, query: &Query) -> Result<Vec<Contact>, MemoryError> {
    self.queries.lock().unwrap().push(query.to_string());

    let running = InFlight::enter(&self.in_flight);
    self.peak.fetch_max(running.count, Ordering::SeqCst);
    if let Some(latency) = self.latency {
      tokio::time::sleep(latency).await;
    }
    drop(running);

    if self.failing {
      return Err(MemoryError("query refused".into()));
    }
    Ok(self.all().into_iter().filter(|c| query.matches(c)).collect())
  }

  async fn get_contact(&self, id: &ContactId) -> Result<Option<Contact>, MemoryError> {
    Ok(self.all().into_iter().find(|c| c.id.as_ref() == Some(id)))
  }

  async fn add_contact(&self, mut contact: Contact) -> Result<ContactId, MemoryError> {
    contact.id = None;
    Ok(self.insert(contact))
  }

  async fn modify_contact(&self, contact: Contact) -> Result<(), MemoryError> {
    let mut contacts = self.contacts.lock().unwrap();
    let slot = contacts
      .iter_mut()
      .find(|c| c.id.is_some() && c.id == contact.id)
      .ok_or_else(|| MemoryError(format!("no contact {:?}", contact.id)))?;
    *slot = contact;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn abandoned_query_leaves_no_query_running() {
    let store = MemoryStore {
      latency: Some(Duration::from_millis(200)),
      ..Default::default()
    };

    let abandoned =
      tokio::time::timeout(Duration::from_millis(10), store.query(&Query::everything())).await;
    assert!(abandoned.is_err());
    assert_eq!(store.in_flight.load(Ordering::SeqCst), 0);
    assert_eq!(store.peak.load(Ordering::SeqCst), 1);

    let store = MemoryStore { latency: None, ..store };
    store.query(&Query::everything()).await.unwrap();
    assert_eq!(store.peak.load(Ordering::SeqCst), 1);
  }
}
