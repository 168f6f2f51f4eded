//! Dynamic WHERE clause assembly with numbered parameters.
//!
//! Owner scoping and the dashboard filters compose a variable number of
//! conditions. [`Conditions`] keeps each clause's `?N` placeholder in step
//! with the parameter list so callers never count indexes by hand.

/// Accumulates `AND`-joined SQL conditions and their bound values.
#[derive(Debug, Default)]
pub struct Conditions {
    clauses: Vec<String>,
    params: Vec<libsql::Value>,
}

impl Conditions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn placeholder(&mut self, value: libsql::Value) -> String {
        self.params.push(value);
        format!("?{}", self.params.len())
    }

    /// `column = ?N`.
    pub fn eq(&mut self, column: &str, value: impl Into<libsql::Value>) -> &mut Self {
        let slot = self.placeholder(value.into());
        self.clauses.push(format!("{column} = {slot}"));
        self
    }

    /// Restrict `column` to an owner. `None` (superuser) adds nothing.
    pub fn owner(&mut self, column: &str, owner_id: Option<&str>) -> &mut Self {
        if let Some(owner_id) = owner_id {
            self.eq(column, owner_id);
        }
        self
    }

    /// `column IN (?N, ...)`. An empty list adds nothing.
    pub fn one_of<S: AsRef<str>>(&mut self, column: &str, values: &[S]) -> &mut Self {
        if values.is_empty() {
            return self;
        }
        let slots: Vec<String> = values
            .iter()
            .map(|value| self.placeholder(value.as_ref().into()))
            .collect();
        self.clauses
            .push(format!("{column} IN ({})", slots.join(", ")));
        self
    }

    /// `column >= ?N`.
    pub fn at_least(&mut self, column: &str, value: impl Into<libsql::Value>) -> &mut Self {
        let slot = self.placeholder(value.into());
        self.clauses.push(format!("{column} >= {slot}"));
        self
    }

    /// `column <= ?N`.
    pub fn at_most(&mut self, column: &str, value: impl Into<libsql::Value>) -> &mut Self {
        let slot = self.placeholder(value.into());
        self.clauses.push(format!("{column} <= {slot}"));
        self
    }

    /// A clause without parameters, e.g. `h.last_review_date IS NULL`.
    pub fn raw(&mut self, clause: impl Into<String>) -> &mut Self {
        self.clauses.push(clause.into());
        self
    }

    /// `WHERE a AND b`, or an empty string when nothing was added.
    #[must_use]
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// Bind one more value and return its placeholder, for clauses outside
    /// the WHERE list (e.g. a `LIMIT`).
    pub fn bind(&mut self, value: impl Into<libsql::Value>) -> String {
        self.placeholder(value.into())
    }

    #[must_use]
    pub fn into_params(self) -> Vec<libsql::Value> {
        self.params
    }
}
