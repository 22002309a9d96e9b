//! Contact fuzzy-matching and deduplication.
//!
//! The pure comparers ([`name`], [`email`], [`compare`]) score pairs of
//! contacts, or a contact against typed text, into a [`MatchType`]. On top of
//! them sit the asynchronous consumers: [`locate`] finds the best existing
//! match for a contact in a store, [`completion`] drives type-ahead searches,
//! and [`merging`] gates inserts behind a duplicate check.

pub mod compare;
pub mod completion;
pub mod config;
pub mod email;
pub mod error;
pub mod fragment;
pub mod locate;
pub mod match_type;
pub mod merging;
pub mod name;
pub mod synonyms;

mod text;

#[cfg(test)]
mod test_store;

pub use compare::compare;
pub use config::MatchConfig;
pub use error::{MatchError, Result};
pub use match_type::{MatchPart, MatchType, combine};
