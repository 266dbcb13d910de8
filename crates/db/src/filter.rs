//! Dynamic `WHERE` clause assembly.
//!
//! Conditions are collected as SQL fragments with positional `$n`
//! placeholders alongside the values to bind, so scoped listings and
//! searches share one code path.

use agency_core::access::{ScopeFilter, ScopeRule};
use agency_core::types::DbId;

/// A value waiting to be bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    BigInt(i64),
    Text(String),
}

/// Accumulates conditions and their bind values.
#[derive(Debug, Default)]
pub struct WhereBuilder {
    conditions: Vec<String>,
    binds: Vec<BindValue>,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bind value and return its placeholder.
    pub fn bind(&mut self, value: BindValue) -> String {
        self.binds.push(value);
        format!("${}", self.binds.len())
    }

    pub fn push(&mut self, condition: impl Into<String>) {
        self.conditions.push(condition.into());
    }

    /// `column = $n` for a present id.
    pub fn push_eq_id(&mut self, column: &str, value: Option<DbId>) {
        if let Some(id) = value {
            let p = self.bind(BindValue::BigInt(id));
            self.push(format!("{column} = {p}"));
        }
    }

    /// `column = $n` for a present label.
    pub fn push_eq_text(&mut self, column: &str, value: Option<&str>) {
        if let Some(text) = value {
            let p = self.bind(BindValue::Text(text.to_string()));
            self.push(format!("{column} = {p}"));
        }
    }

    /// Restrict rows to the actor's scope.
    ///
    /// `project` is the alias of the owning `projects` row. `record_client`
    /// names the record's own client column, when it has one.
    pub fn push_scope(&mut self, scope: &ScopeFilter, project: &str, record_client: Option<&str>) {
        let column = match scope.rule {
            ScopeRule::Unrestricted => return,
            ScopeRule::ProjectClient => format!("{project}.client_id"),
            ScopeRule::InvoiceClient => record_client
                .map(str::to_string)
                .unwrap_or_else(|| format!("{project}.client_id")),
            ScopeRule::ProjectManager => format!("{project}.manager_id"),
            ScopeRule::ProjectParticipant => {
                let p = self.bind(BindValue::BigInt(scope.actor_id));
                self.push(format!(
                    "(EXISTS (SELECT 1 FROM team_members scope_tm \
                       WHERE scope_tm.team_id = {project}.team_id \
                         AND scope_tm.user_id = {p} AND scope_tm.is_active) \
                      OR EXISTS (SELECT 1 FROM tasks scope_t \
                       WHERE scope_t.project_id = {project}.id \
                         AND scope_t.assignee_id = {p}))"
                ));
                return;
            }
        };
        let p = self.bind(BindValue::BigInt(scope.actor_id));
        self.push(format!("{column} = {p}"));
    }

    /// `WHERE a AND b ...`, or an empty string when unconstrained.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn binds(&self) -> &[BindValue] {
        &self.binds
    }
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
pub fn bind_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for value in values {
        match value {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
        }
    }
    q
}
