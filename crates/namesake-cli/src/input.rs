//! Contact fields given on the command line.

use anyhow::{Context as _, bail};
use clap::Args;
use namesake_core::{Contact, ContactName};

#[derive(Args, Debug, Default)]
pub struct ContactArgs {
  #[arg(long)]
  pub given:      Option<String>,
  #[arg(long)]
  pub additional: Option<String>,
  #[arg(long)]
  pub family:     Option<String>,
  #[arg(long)]
  pub nickname:   Option<String>,
  /// Sort/display name, e.g. "Smith, John".
  #[arg(long)]
  pub file_as:    Option<String>,
  /// E-mail address. May be repeated; the first is the primary one.
  #[arg(long = "email", value_name = "ADDRESS")]
  pub emails:     Vec<String>,
  #[arg(long = "phone", value_name = "NUMBER")]
  pub phones:     Vec<String>,
  #[arg(long = "address", value_name = "ADDRESS")]
  pub addresses:  Vec<String>,
  /// The contact is a distribution list.
  #[arg(long)]
  pub list:       bool,
  /// A whole contact as JSON. Other field flags are ignored.
  #[arg(long, value_name = "JSON", conflicts_with_all = ["given", "additional", "family"])]
  pub from_json:  Option<String>,
}

impl ContactArgs {
  pub fn into_contact(self) -> anyhow::Result<Contact> {
    if let Some(json) = &self.from_json {
      let mut contact: Contact =
        serde_json::from_str(json).context("failed to parse contact JSON")?;
      contact.id = None;
      return Ok(contact);
    }

    let name = ContactName {
      given:      self.given,
      additional: self.additional,
      family:     self.family,
    };
    let contact = Contact {
      id:        None,
      name:      (!name.is_empty()).then_some(name),
      nickname:  self.nickname,
      file_as:   self.file_as,
      emails:    self.emails,
      addresses: self.addresses,
      phones:    self.phones,
      is_list:   self.list,
    };

    if contact.name.is_none()
      && contact.file_as.is_none()
      && contact.nickname.is_none()
      && contact.emails.is_empty()
    {
      bail!("a contact needs at least a name, nickname, file-as or e-mail address");
    }
    Ok(contact)
  }
}
