use crate::database::models::{SearchContactRequest, User};
use crate::paging::Window;

use super::filter_where::FilterWhere;
use super::types::{ContactColumn, Predicate, SqlResult, Term};

const CONTACTS_TABLE: &str = "contacts";

/// Accumulates search terms for one owner's contacts
#[derive(Debug, Clone)]
pub struct ContactFilter {
    owner: String,
    terms: Vec<Term>,
}

impl ContactFilter {
    pub fn for_owner(user: &User) -> Self {
        Self {
            owner: user.username.clone(),
            terms: vec![],
        }
    }

    pub fn contains(mut self, column: ContactColumn, needle: &str) -> Self {
        self.terms.push(Term::Contains { column, needle: needle.to_string() });
        self
    }

    pub fn contains_any(mut self, columns: &[ContactColumn], needle: &str) -> Self {
        let terms = columns
            .iter()
            .map(|column| Term::Contains { column: *column, needle: needle.to_string() })
            .collect::<Vec<_>>();
        if !terms.is_empty() {
            self.terms.push(Term::AnyOf(terms));
        }
        self
    }

    pub fn build(self) -> Predicate {
        Predicate {
            owner: self.owner,
            terms: self.terms,
        }
    }

    /// Compile search criteria into a predicate scoped to `user`.
    /// Absent criteria add no term.
    pub fn compile(user: &User, criteria: &SearchContactRequest) -> Predicate {
        let mut filter = Self::for_owner(user);
        if let Some(name) = criteria.name.as_deref() {
            filter = filter.contains_any(&[ContactColumn::FirstName, ContactColumn::LastName], name);
        }
        if let Some(email) = criteria.email.as_deref() {
            filter = filter.contains(ContactColumn::Email, email);
        }
        if let Some(phone) = criteria.phone.as_deref() {
            filter = filter.contains(ContactColumn::Phone, phone);
        }
        filter.build()
    }
}

impl Predicate {
    pub fn to_count_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(self);
        SqlResult {
            query: format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", CONTACTS_TABLE, where_clause),
            params,
        }
    }

    /// Windowed select, ordered by id so consecutive pages never overlap
    pub fn to_select_sql(&self, window: &Window) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(self);
        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", CONTACTS_TABLE),
            format!("WHERE {}", where_clause),
            "ORDER BY \"id\" ASC".to_string(),
            format!("LIMIT {} OFFSET {}", window.take, window.skip),
        ]
        .join(" ");
        SqlResult { query, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::Paging;
    use chrono::Utc;

    fn user(username: &str) -> User {
        User {
            username: username.to_string(),
            name: username.to_string(),
            password: "hash".to_string(),
            token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn criteria() -> SearchContactRequest {
        SearchContactRequest { page: 1, size: 10, ..Default::default() }
    }

    fn contact(owner: &str, first: &str, last: Option<&str>, email: Option<&str>) -> crate::database::models::Contact {
        crate::database::models::Contact {
            id: 1,
            username: owner.to_string(),
            first_name: first.to_string(),
            last_name: last.map(str::to_string),
            email: email.map(str::to_string),
            phone: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn absent_criteria_compile_to_owner_scope_only() {
        let predicate = ContactFilter::compile(&user("alice"), &criteria());
        assert!(predicate.is_owner_only());
        assert!(predicate.matches(&contact("alice", "Johnny", None, None)));
        assert!(!predicate.matches(&contact("bob", "Johnny", None, None)));
    }

    #[test]
    fn name_expands_to_first_or_last() {
        let predicate = ContactFilter::compile(
            &user("alice"),
            &SearchContactRequest { name: Some("DOE".into()), ..criteria() },
        );
        assert_eq!(
            predicate.terms(),
            &[Term::AnyOf(vec![
                Term::Contains { column: ContactColumn::FirstName, needle: "DOE".into() },
                Term::Contains { column: ContactColumn::LastName, needle: "DOE".into() },
            ])]
        );
        assert!(predicate.matches(&contact("alice", "Johnny", Some("Doeson"), None)));
        assert!(predicate.matches(&contact("alice", "Jadoe", None, None)));
        assert!(!predicate.matches(&contact("alice", "Johnny", None, None)));
    }

    #[test]
    fn criteria_are_conjunctive() {
        let predicate = ContactFilter::compile(
            &user("alice"),
            &SearchContactRequest {
                name: Some("john".into()),
                email: Some("example.com".into()),
                ..criteria()
            },
        );
        assert!(predicate.matches(&contact("alice", "Johnny", None, Some("j@example.com"))));
        assert!(!predicate.matches(&contact("alice", "Johnny", None, Some("j@other.org"))));
        assert!(!predicate.matches(&contact("alice", "Johnny", None, None)));
    }

    #[test]
    fn compile_is_deterministic() {
        let c = SearchContactRequest { phone: Some("555".into()), ..criteria() };
        assert_eq!(
            ContactFilter::compile(&user("alice"), &c),
            ContactFilter::compile(&user("alice"), &c)
        );
    }

    #[test]
    fn renders_windowed_select() {
        let predicate = ContactFilter::compile(
            &user("alice"),
            &SearchContactRequest { email: Some("ex".into()), ..criteria() },
        );
        let sql = predicate.to_select_sql(&Paging::window(25, 3, 10));
        assert_eq!(
            sql.query,
            "SELECT * FROM \"contacts\" WHERE \"username\" = $1 AND \"email\" ILIKE $2 ORDER BY \"id\" ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(sql.params, vec!["alice", "%ex%"]);

        let count = predicate.to_count_sql();
        assert_eq!(
            count.query,
            "SELECT COUNT(*) AS count FROM \"contacts\" WHERE \"username\" = $1 AND \"email\" ILIKE $2"
        );
    }
}
