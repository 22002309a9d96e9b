//! E-mail address comparison.

use namesake_core::Contact;

use crate::{
  match_type::{MatchType, combine},
  text::{chars_eq_ignore_case, eq_ignore_case},
};

/// The part of `address` before the first `@`, or all of it.
pub fn username(address: &str) -> &str {
  address.split_once('@').map_or(address, |(user, _)| user)
}

fn hostname(address: &str) -> Option<&str> {
  address.rsplit_once('@').map(|(_, host)| host)
}

/// Hosts agree when they are equal up to case, or when one is a subdomain of
/// the other (`mail.example.com` vs `example.com`). Two bare usernames agree;
/// a bare username never agrees with a full address.
fn hostnames_match(a: &str, b: &str) -> bool {
  let (a, b) = match (hostname(a), hostname(b)) {
    (None, None) => return true,
    (Some(a), Some(b)) => (a, b),
    _ => return false,
  };

  let mut a = a.chars().rev();
  let mut b = b.chars().rev();
  loop {
    match (a.next(), b.next()) {
      (None, None) => return true,
      (Some('.'), None) | (None, Some('.')) => return true,
      (Some(x), Some(y)) if chars_eq_ignore_case(x, y) => {}
      _ => return false,
    }
  }
}

/// Compare two addresses: same username and host is `Exact`, same username
/// on another host is `Vague`.
pub fn compare_email_addresses(addr1: &str, addr2: &str) -> MatchType {
  if addr1.is_empty() || addr2.is_empty() {
    return MatchType::NotApplicable;
  }
  if !eq_ignore_case(username(addr1), username(addr2)) {
    return MatchType::None;
  }
  if hostnames_match(addr1, addr2) {
    MatchType::Exact
  } else {
    MatchType::Vague
  }
}

/// Pairwise comparison of every address of `contact1` against every address
/// of `contact2`, keeping the best verdict. Stops at the first exact pair.
pub fn compare_email(contact1: &Contact, contact2: &Contact) -> MatchType {
  if contact1.emails.is_empty() || contact2.emails.is_empty() {
    return MatchType::NotApplicable;
  }

  let mut result = MatchType::NotApplicable;
  for a in &contact1.emails {
    for b in &contact2.emails {
      result = combine(result, compare_email_addresses(a, b));
      if result == MatchType::Exact {
        return result;
      }
    }
  }
  result
}

#[cfg(test)]
mod tests {
  use super::*;

  fn with_emails(emails: &[&str]) -> Contact {
    Contact {
      emails: emails.iter().map(|e| e.to_string()).collect(),
      ..Default::default()
    }
  }

  #[test]
  fn same_address_is_exact() {
    let a = with_emails(&["bob@foo.com"]);
    let b = with_emails(&["BOB@Foo.com"]);
    assert_eq!(compare_email(&a, &b), MatchType::Exact);
  }

  #[test]
  fn same_username_other_host_is_vague() {
    let a = with_emails(&["bob@foo.com"]);
    let b = with_emails(&["bob@bar.com"]);
    assert_eq!(compare_email(&a, &b), MatchType::Vague);
  }

  #[test]
  fn other_username_is_none() {
    let a = with_emails(&["bob@foo.com"]);
    let c = with_emails(&["alice@foo.com"]);
    assert_eq!(compare_email(&a, &c), MatchType::None);
  }

  #[test]
  fn subdomain_is_exact() {
    let a = with_emails(&["bob@mail.ximian.com"]);
    let b = with_emails(&["bob@ximian.com"]);
    assert_eq!(compare_email(&a, &b), MatchType::Exact);
    assert_eq!(compare_email(&b, &a), MatchType::Exact);
  }

  #[test]
  fn suffix_without_dot_boundary_is_vague() {
    assert_eq!(
      compare_email_addresses("bob@myximian.com", "bob@ximian.com"),
      MatchType::Vague
    );
  }

  #[test]
  fn bare_usernames() {
    assert_eq!(compare_email_addresses("bob", "BOB"), MatchType::Exact);
    assert_eq!(compare_email_addresses("bob", "bob@foo.com"), MatchType::Vague);
    assert_eq!(compare_email_addresses("", "bob@foo.com"), MatchType::NotApplicable);
  }

  #[test]
  fn best_pair_wins() {
    let a = with_emails(&["alice@foo.com", "bob@foo.com"]);
    let b = with_emails(&["carol@foo.com", "bob@bar.com"]);
    assert_eq!(compare_email(&a, &b), MatchType::Vague);

    let c = with_emails(&["x@y.com", "bob@foo.com"]);
    assert_eq!(compare_email(&a, &c), MatchType::Exact);
  }

  #[test]
  fn missing_lists_are_not_applicable() {
    let a = with_emails(&["bob@foo.com"]);
    assert_eq!(compare_email(&a, &Contact::default()), MatchType::NotApplicable);
    assert_eq!(compare_email(&Contact::default(), &a), MatchType::NotApplicable);
  }
}
