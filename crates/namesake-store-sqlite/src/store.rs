//! [`SqliteStore`], the SQLite implementation of [`ContactStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use namesake_core::{Contact, ContactId, Query, store::ContactStore};

use crate::{
  Error, Result,
  encode::{ContactRow, RawContact},
  filter::Filter,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A contact store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Every stored contact, in insertion order.
  pub async fn list_contacts(&self) -> Result<Vec<Contact>> {
    self.query(&Query::everything()).await
  }

  /// Write `row`, replacing any existing row and e-mail addresses.
  ///
  /// Returns the number of `contacts` rows touched.
  async fn write_row(&self, row: ContactRow, replace: bool) -> Result<usize> {
    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let params = rusqlite::params![
          row.contact_id,
          row.given,
          row.additional,
          row.family,
          row.nickname,
          row.file_as,
          row.is_list,
          row.addresses,
          row.phones,
          row.full_name_fold,
          row.nickname_fold,
          row.file_as_fold,
        ];
        let changed = if replace {
          tx.execute(
            "UPDATE contacts SET
               given = ?2, additional = ?3, family = ?4, nickname = ?5,
               file_as = ?6, is_list = ?7, addresses = ?8, phones = ?9,
               full_name_fold = ?10, nickname_fold = ?11, file_as_fold = ?12
             WHERE contact_id = ?1",
            params,
          )?
        } else {
          tx.execute(
            "INSERT INTO contacts (
               contact_id, given, additional, family, nickname, file_as,
               is_list, addresses, phones, full_name_fold, nickname_fold, file_as_fold
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params,
          )?
        };

        if changed > 0 {
          tx.execute(
            "DELETE FROM contact_emails WHERE contact_id = ?1",
            rusqlite::params![row.contact_id],
          )?;
          for (position, (address, address_fold)) in row.emails.iter().enumerate() {
            tx.execute(
              "INSERT INTO contact_emails (contact_id, position, address, address_fold)
               VALUES (?1, ?2, ?3, ?4)",
              rusqlite::params![row.contact_id, position as i64, address, address_fold],
            )?;
          }
        }
        tx.commit()?;
        Ok(changed)
      })
      .await?;
    Ok(changed)
  }
}

/// Fill in each contact's e-mail addresses, in position order.
fn load_emails(conn: &rusqlite::Connection, raws: &mut [RawContact]) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare(
    "SELECT address FROM contact_emails WHERE contact_id = ?1 ORDER BY position",
  )?;
  for raw in raws {
    raw.emails = stmt
      .query_map(rusqlite::params![raw.contact_id], |row| row.get(0))?
      .collect::<rusqlite::Result<Vec<String>>>()?;
  }
  Ok(())
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  type Error = Error;

  async fn query(&self, query: &Query) -> Result<Vec<Contact>> {
    let Filter { sql: cond, params } = Filter::new(query);
    let sql = format!(
      "SELECT {} FROM contacts c WHERE {cond} ORDER BY c.rowid",
      RawContact::COLUMNS
    );
    debug!(%query, %sql, "contact query");

    let raws: Vec<RawContact> = self
      .conn
      .call(move |conn| {
        let mut raws = {
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map(rusqlite::params_from_iter(params.iter()), RawContact::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        load_emails(conn, &mut raws)?;
        Ok(raws)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn get_contact(&self, id: &ContactId) -> Result<Option<Contact>> {
    let id_str = id.as_str().to_owned();

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!("SELECT {} FROM contacts c WHERE c.contact_id = ?1", RawContact::COLUMNS),
            rusqlite::params![id_str],
            RawContact::from_row,
          )
          .optional()?;
        let mut raws: Vec<RawContact> = raw.into_iter().collect();
        load_emails(conn, &mut raws)?;
        Ok(raws.pop())
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  async fn add_contact(&self, contact: Contact) -> Result<ContactId> {
    let id = ContactId::new(Uuid::new_v4().hyphenated().to_string());
    let row = ContactRow::encode(&id, &contact)?;
    self.write_row(row, false).await?;
    debug!(%id, "contact added");
    Ok(id)
  }

  async fn modify_contact(&self, contact: Contact) -> Result<()> {
    let id = contact.id.clone().ok_or(Error::MissingId)?;
    let row = ContactRow::encode(&id, &contact)?;
    if self.write_row(row, true).await? == 0 {
      return Err(Error::ContactNotFound(id));
    }
    debug!(%id, "contact modified");
    Ok(())
  }
}
