use super::types::{Predicate, Term};

/// Renders a compiled predicate into a parameterized WHERE clause
pub struct FilterWhere {
    param_values: Vec<String>,
}

impl FilterWhere {
    fn new() -> Self {
        Self { param_values: vec![] }
    }

    /// `"username" = $1` followed by one AND-joined clause per term
    pub fn generate(predicate: &Predicate) -> (String, Vec<String>) {
        let mut filter_where = Self::new();
        let mut conditions = vec![format!("\"username\" = {}", filter_where.param(predicate.owner().to_string()))];
        for term in predicate.terms() {
            conditions.push(filter_where.build_term(term));
        }
        (conditions.join(" AND "), filter_where.param_values)
    }

    fn build_term(&mut self, term: &Term) -> String {
        match term {
            Term::Contains { column, needle } => {
                let pattern = format!("%{}%", escape_like(needle));
                format!("\"{}\" ILIKE {}", column.as_str(), self.param(pattern))
            }
            Term::AnyOf(terms) => {
                let parts: Vec<String> = terms.iter().map(|t| self.build_term(t)).collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }

    fn param(&mut self, value: String) -> String {
        self.param_values.push(value);
        format!("${}", self.param_values.len())
    }
}

/// Escape LIKE metacharacters so user input only ever matches literally
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
