//! Translation of a [`Query`] into an SQL `WHERE` expression over the
//! `contacts c` table, with its positional parameters.

use namesake_core::{Query, QueryField};

#[derive(Clone, Copy)]
enum Test {
  Contains,
  BeginsWith,
  Is,
}

/// A `WHERE` expression and the values bound to its `?N` placeholders.
pub struct Filter {
  pub sql:    String,
  pub params: Vec<String>,
}

impl Filter {
  pub fn new(query: &Query) -> Self {
    let mut filter = Self { sql: String::new(), params: vec![] };
    filter.sql = filter.expr(query);
    filter
  }

  fn bind(&mut self, value: String) -> String {
    self.params.push(value);
    format!("?{}", self.params.len())
  }

  fn expr(&mut self, query: &Query) -> String {
    match query {
      Query::Contains(field, value) => self.field(*field, Test::Contains, value),
      Query::BeginsWith(field, value) => self.field(*field, Test::BeginsWith, value),
      Query::Is(field, value) => self.field(*field, Test::Is, value),
      Query::And(parts) => self.join(parts, " AND ", "1"),
      Query::Or(parts) => self.join(parts, " OR ", "0"),
      // NULL columns make a test NULL; count that as false before negating.
      Query::Not(inner) => format!("NOT coalesce({}, 0)", self.expr(inner)),
    }
  }

  fn join(&mut self, parts: &[Query], op: &str, empty: &str) -> String {
    if parts.is_empty() {
      return empty.to_owned();
    }
    let exprs: Vec<String> = parts.iter().map(|q| format!("({})", self.expr(q))).collect();
    exprs.join(op)
  }

  fn field(&mut self, field: QueryField, test: Test, value: &str) -> String {
    let needle = value.to_lowercase();
    match field {
      QueryField::FullName => self.test("c.full_name_fold", test, needle),
      QueryField::FileAs => self.test("c.file_as_fold", test, needle),
      QueryField::Nickname => self.test("c.nickname_fold", test, needle),
      QueryField::Email => {
        let cond = self.test("e.address_fold", test, needle);
        format!(
          "EXISTS (SELECT 1 FROM contact_emails e WHERE e.contact_id = c.contact_id AND {cond})"
        )
      }
      // Every contact has the empty string among its values.
      QueryField::AnyField if needle.is_empty() => "1".to_owned(),
      QueryField::AnyField => {
        let alternatives: Vec<String> = [
          QueryField::FullName,
          QueryField::FileAs,
          QueryField::Email,
          QueryField::Nickname,
        ]
        .into_iter()
        .map(|f| format!("({})", self.field(f, test, &needle)))
        .collect();
        alternatives.join(" OR ")
      }
    }
  }

  /// Test one folded column. NULL columns never match.
  fn test(&mut self, column: &str, test: Test, needle: String) -> String {
    let p = self.bind(needle);
    match test {
      Test::Contains => format!("instr({column}, {p}) > 0"),
      Test::BeginsWith => format!("substr({column}, 1, length({p})) = {p}"),
      Test::Is => format!("{column} = {p}"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn disjunction_numbers_parameters_in_order() {
    let query = Query::any_of(vec![
      Query::contains(QueryField::FullName, "John"),
      Query::begins_with(QueryField::Email, "JSmith"),
    ])
    .unwrap();
    let filter = Filter::new(&query);

    assert_eq!(
      filter.sql,
      "(instr(c.full_name_fold, ?1) > 0) OR (EXISTS (SELECT 1 FROM contact_emails e \
       WHERE e.contact_id = c.contact_id AND substr(e.address_fold, 1, length(?2)) = ?2))"
    );
    assert_eq!(filter.params, ["john", "jsmith"]);
  }

  #[test]
  fn empty_any_field_selects_everything() {
    let filter = Filter::new(&Query::everything());
    assert_eq!(filter.sql, "1");
    assert!(filter.params.is_empty());
  }

  #[test]
  fn negation_wraps_inner_expression() {
    let filter = Filter::new(&Query::Not(Box::new(Query::is(QueryField::Nickname, "Bob"))));
    assert_eq!(filter.sql, "NOT coalesce(c.nickname_fold = ?1, 0)");
  }
}
