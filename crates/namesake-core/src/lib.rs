//! Core types and trait definitions for the namesake matching engine.
//!
//! This crate is deliberately free of database and CLI dependencies. It holds
//! the contact data model, the filter-query language spoken to contact
//! stores, and the [`store::ContactStore`] abstraction itself.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod contact;
pub mod error;
pub mod query;
pub mod store;

pub use contact::{Contact, ContactId, ContactName};
pub use error::{Error, Result};
pub use query::{Query, QueryField};
