//! The filter-query language understood by contact stores.
//!
//! Queries are s-expressions such as
//! `(or (contains "full_name" "John") (beginswith "email" "jsmith"))`.
//! [`Query`] is the typed form; its `Display` output is the textual form, and
//! [`Query::parse`] reads the textual form back.

use std::{fmt, str::FromStr};

use crate::{Contact, Error, Result};

// ─── Fields ──────────────────────────────────────────────────────────────────

/// A contact field a predicate can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryField {
  FullName,
  FileAs,
  Email,
  Nickname,
  /// Matches when any of the other fields does.
  AnyField,
}

impl QueryField {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::FullName => "full_name",
      Self::FileAs => "file_as",
      Self::Email => "email",
      Self::Nickname => "nickname",
      Self::AnyField => "x-evolution-any-field",
    }
  }
}

impl FromStr for QueryField {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "full_name" => Ok(Self::FullName),
      "file_as" => Ok(Self::FileAs),
      "email" => Ok(Self::Email),
      "nickname" => Ok(Self::Nickname),
      "x-evolution-any-field" => Ok(Self::AnyField),
      other => Err(Error::UnknownField(other.to_owned())),
    }
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
  /// Case-insensitive substring test.
  Contains(QueryField, String),
  /// Case-insensitive prefix test.
  BeginsWith(QueryField, String),
  /// Case-insensitive equality.
  Is(QueryField, String),
  And(Vec<Query>),
  Or(Vec<Query>),
  Not(Box<Query>),
}

impl Query {
  pub fn contains(field: QueryField, value: impl Into<String>) -> Self {
    Self::Contains(field, value.into())
  }

  pub fn begins_with(field: QueryField, value: impl Into<String>) -> Self {
    Self::BeginsWith(field, value.into())
  }

  pub fn is(field: QueryField, value: impl Into<String>) -> Self {
    Self::Is(field, value.into())
  }

  /// Matches every contact.
  pub fn everything() -> Self { Self::contains(QueryField::AnyField, "") }

  /// Disjunction of `parts`. A single part is returned bare; no parts yields
  /// `None`.
  pub fn any_of(mut parts: Vec<Query>) -> Option<Self> {
    match parts.len() {
      0 => None,
      1 => parts.pop(),
      _ => Some(Self::Or(parts)),
    }
  }

  /// Conjunction of `parts`, with the same collapsing rules as
  /// [`Query::any_of`].
  pub fn all_of(mut parts: Vec<Query>) -> Option<Self> {
    match parts.len() {
      0 => None,
      1 => parts.pop(),
      _ => Some(Self::And(parts)),
    }
  }

  pub fn parse(input: &str) -> Result<Self> {
    let mut parser = Parser { input, pos: 0 };
    let query = parser.query()?;
    parser.skip_ws();
    if parser.pos != input.len() {
      return Err(parser.error("trailing input after query"));
    }
    Ok(query)
  }

  /// Evaluate the query against a contact in memory.
  pub fn matches(&self, contact: &Contact) -> bool {
    match self {
      Self::Contains(field, value) => {
        let needle = value.to_lowercase();
        field_values(contact, *field)
          .iter()
          .any(|v| v.to_lowercase().contains(&needle))
      }
      Self::BeginsWith(field, value) => {
        let needle = value.to_lowercase();
        field_values(contact, *field)
          .iter()
          .any(|v| v.to_lowercase().starts_with(&needle))
      }
      Self::Is(field, value) => {
        let needle = value.to_lowercase();
        field_values(contact, *field)
          .iter()
          .any(|v| v.to_lowercase() == needle)
      }
      Self::And(parts) => parts.iter().all(|q| q.matches(contact)),
      Self::Or(parts) => parts.iter().any(|q| q.matches(contact)),
      Self::Not(inner) => !inner.matches(contact),
    }
  }
}

/// The textual values a field contributes for `contact`.
///
/// `AnyField` always includes the empty string, so `(contains
/// "x-evolution-any-field" "")` selects every contact.
fn field_values(contact: &Contact, field: QueryField) -> Vec<String> {
  match field {
    QueryField::FullName => vec![contact.full_name()],
    QueryField::FileAs => contact.file_as.iter().cloned().collect(),
    QueryField::Email => contact.emails.clone(),
    QueryField::Nickname => contact.nickname.iter().cloned().collect(),
    QueryField::AnyField => {
      let mut all = vec![String::new()];
      for f in [
        QueryField::FullName,
        QueryField::FileAs,
        QueryField::Email,
        QueryField::Nickname,
      ] {
        all.extend(field_values(contact, f));
      }
      all
    }
  }
}

// ─── Rendering ───────────────────────────────────────────────────────────────

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
  f.write_str("\"")?;
  for c in s.chars() {
    if c == '"' || c == '\\' {
      f.write_str("\\")?;
    }
    write!(f, "{c}")?;
  }
  f.write_str("\"")
}

fn write_list(f: &mut fmt::Formatter<'_>, op: &str, parts: &[Query]) -> fmt::Result {
  write!(f, "({op}")?;
  for p in parts {
    write!(f, " {p}")?;
  }
  f.write_str(")")
}

impl fmt::Display for Query {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let (op, field, value) = match self {
      Self::Contains(field, value) => ("contains", field, value),
      Self::BeginsWith(field, value) => ("beginswith", field, value),
      Self::Is(field, value) => ("is", field, value),
      Self::And(parts) => return write_list(f, "and", parts),
      Self::Or(parts) => return write_list(f, "or", parts),
      Self::Not(inner) => return write!(f, "(not {inner})"),
    };
    write!(f, "({op} ")?;
    write_escaped(f, field.as_str())?;
    f.write_str(" ")?;
    write_escaped(f, value)?;
    f.write_str(")")
  }
}

impl FromStr for Query {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

struct Parser<'a> {
  input: &'a str,
  pos:   usize,
}

impl Parser<'_> {
  fn error(&self, message: &str) -> Error {
    Error::QueryParse { offset: self.pos, message: message.to_owned() }
  }

  fn peek(&self) -> Option<char> { self.input[self.pos..].chars().next() }

  fn bump(&mut self) -> Option<char> {
    let c = self.peek()?;
    self.pos += c.len_utf8();
    Some(c)
  }

  fn skip_ws(&mut self) {
    while self.peek().is_some_and(char::is_whitespace) {
      self.bump();
    }
  }

  fn expect(&mut self, want: char) -> Result<()> {
    self.skip_ws();
    match self.bump() {
      Some(c) if c == want => Ok(()),
      Some(_) => Err(self.error(&format!("expected {want:?}"))),
      None => Err(self.error(&format!("unexpected end of input, expected {want:?}"))),
    }
  }

  fn atom(&mut self) -> Result<&str> {
    self.skip_ws();
    let start = self.pos;
    while self
      .peek()
      .is_some_and(|c| !c.is_whitespace() && c != '(' && c != ')' && c != '"')
    {
      self.bump();
    }
    if start == self.pos {
      return Err(self.error("expected an operator"));
    }
    Ok(&self.input[start..self.pos])
  }

  fn string(&mut self) -> Result<String> {
    self.expect('"')?;
    let mut out = String::new();
    loop {
      match self.bump() {
        Some('"') => return Ok(out),
        Some('\\') => match self.bump() {
          Some(c) => out.push(c),
          None => return Err(self.error("unterminated escape")),
        },
        Some(c) => out.push(c),
        None => return Err(self.error("unterminated string")),
      }
    }
  }

  fn query(&mut self) -> Result<Query> {
    self.expect('(')?;
    let op = self.atom()?.to_owned();
    let query = match op.as_str() {
      "contains" | "beginswith" | "is" => {
        let field: QueryField = self.string()?.parse()?;
        let value = self.string()?;
        match op.as_str() {
          "contains" => Query::Contains(field, value),
          "beginswith" => Query::BeginsWith(field, value),
          _ => Query::Is(field, value),
        }
      }
      "and" | "or" => {
        let mut parts = Vec::new();
        loop {
          self.skip_ws();
          if self.peek() == Some(')') {
            break;
          }
          parts.push(self.query()?);
        }
        if op == "and" { Query::And(parts) } else { Query::Or(parts) }
      }
      "not" => Query::Not(Box::new(self.query()?)),
      _ => return Err(Error::UnknownOperator(op)),
    };
    self.expect(')')?;
    Ok(query)
  }
}
