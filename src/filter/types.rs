use crate::database::models::Contact;

/// Contact columns that accept partial-match search terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactColumn {
    FirstName,
    LastName,
    Email,
    Phone,
}

impl ContactColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactColumn::FirstName => "first_name",
            ContactColumn::LastName => "last_name",
            ContactColumn::Email => "email",
            ContactColumn::Phone => "phone",
        }
    }

    pub fn read<'a>(&self, contact: &'a Contact) -> Option<&'a str> {
        match self {
            ContactColumn::FirstName => Some(contact.first_name.as_str()),
            ContactColumn::LastName => contact.last_name.as_deref(),
            ContactColumn::Email => contact.email.as_deref(),
            ContactColumn::Phone => contact.phone.as_deref(),
        }
    }
}

/// One named condition in a compiled predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Case-insensitive substring match; NULL columns never match
    Contains { column: ContactColumn, needle: String },
    /// Satisfied when any inner term is
    AnyOf(Vec<Term>),
}

impl Term {
    pub fn matches(&self, contact: &Contact) -> bool {
        match self {
            Term::Contains { column, needle } => column
                .read(contact)
                .map(|value| value.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            Term::AnyOf(terms) => terms.iter().any(|t| t.matches(contact)),
        }
    }
}

/// Owner scope AND every term. An empty term list still restricts rows to the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub(super) owner: String,
    pub(super) terms: Vec<Term>,
}

impl Predicate {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn is_owner_only(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn matches(&self, contact: &Contact) -> bool {
        contact.username == self.owner && self.terms.iter().all(|t| t.matches(contact))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<String>,
}
