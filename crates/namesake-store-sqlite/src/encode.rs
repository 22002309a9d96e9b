//! Conversions between [`Contact`] and the rows stored in SQLite.
//!
//! Addresses and phone numbers are opaque to matching and are stored as
//! compact JSON arrays. E-mail addresses get their own table so they can be
//! searched.

use namesake_core::{Contact, ContactId, ContactName};

use crate::Result;

fn fold(value: Option<&str>) -> Option<String> { value.map(str::to_lowercase) }

pub fn encode_list(values: &[String]) -> Result<String> { Ok(serde_json::to_string(values)?) }

pub fn decode_list(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column values for one `contacts` row plus its `contact_emails` rows.
pub struct ContactRow {
  pub contact_id:     String,
  pub given:          Option<String>,
  pub additional:     Option<String>,
  pub family:         Option<String>,
  pub nickname:       Option<String>,
  pub file_as:        Option<String>,
  pub is_list:        bool,
  pub addresses:      String,
  pub phones:         String,
  pub full_name_fold: String,
  pub nickname_fold:  Option<String>,
  pub file_as_fold:   Option<String>,
  /// `(address, address_fold)` in position order.
  pub emails:         Vec<(String, String)>,
}

impl ContactRow {
  pub fn encode(id: &ContactId, contact: &Contact) -> Result<Self> {
    let name = contact.name.clone().unwrap_or_default();
    Ok(Self {
      contact_id:     id.as_str().to_owned(),
      given:          name.given,
      additional:     name.additional,
      family:         name.family,
      nickname:       contact.nickname.clone(),
      file_as:        contact.file_as.clone(),
      is_list:        contact.is_list,
      addresses:      encode_list(&contact.addresses)?,
      phones:         encode_list(&contact.phones)?,
      full_name_fold: contact.full_name().to_lowercase(),
      nickname_fold:  fold(contact.nickname.as_deref()),
      file_as_fold:   fold(contact.file_as.as_deref()),
      emails:         contact
        .emails
        .iter()
        .map(|a| (a.clone(), a.to_lowercase()))
        .collect(),
    })
  }
}

/// Raw values read back from a `contacts` row and its e-mail addresses.
pub struct RawContact {
  pub contact_id: String,
  pub given:      Option<String>,
  pub additional: Option<String>,
  pub family:     Option<String>,
  pub nickname:   Option<String>,
  pub file_as:    Option<String>,
  pub is_list:    bool,
  pub addresses:  String,
  pub phones:     String,
  pub emails:     Vec<String>,
}

impl RawContact {
  pub const COLUMNS: &'static str = "c.contact_id, c.given, c.additional, c.family, \
                                     c.nickname, c.file_as, c.is_list, c.addresses, c.phones";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      contact_id: row.get(0)?,
      given:      row.get(1)?,
      additional: row.get(2)?,
      family:     row.get(3)?,
      nickname:   row.get(4)?,
      file_as:    row.get(5)?,
      is_list:    row.get(6)?,
      addresses:  row.get(7)?,
      phones:     row.get(8)?,
      emails:     vec![],
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    let name = ContactName {
      given:      self.given,
      additional: self.additional,
      family:     self.family,
    };
    Ok(Contact {
      id:        Some(ContactId::new(self.contact_id)),
      name:      (!name.is_empty()).then_some(name),
      nickname:  self.nickname,
      file_as:   self.file_as,
      emails:    self.emails,
      addresses: decode_list(&self.addresses)?,
      phones:    decode_list(&self.phones)?,
      is_list:   self.is_list,
    })
  }
}
