//! Value objects describing the shape of an assembled statement.
//!
//! These types carry no rendering logic of their own beyond trivial
//! stringification; the assembler and the platform renderers consume them.

use std::fmt;

use crate::builder::QueryBuilder;
use crate::error::{QueryError, QueryResult};

/// A table introduced via FROM, the origin of a join subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromRoot {
    pub table: String,
    pub alias: Option<String>,
}

impl FromRoot {
    pub fn new(table: impl Into<String>, alias: Option<&str>) -> Self {
        Self {
            table: table.into(),
            alias: alias.map(str::to_string),
        }
    }

    /// The alias other clauses refer to this root by. Falls back to the
    /// table name when no distinct alias was given.
    pub fn reference(&self) -> &str {
        match &self.alias {
            Some(alias) if alias != &self.table => alias,
            _ => &self.table,
        }
    }

    /// The FROM-clause fragment: `table` or `table alias`.
    pub fn table_sql(&self) -> String {
        match &self.alias {
            Some(alias) if alias != &self.table => format!("{} {}", self.table, alias),
            _ => self.table.clone(),
        }
    }
}

/// The kind of a join clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => f.write_str("INNER"),
            JoinKind::Left => f.write_str("LEFT"),
            JoinKind::Right => f.write_str("RIGHT"),
        }
    }
}

/// A join attached to a parent alias in the assembler's adjacency map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    pub alias: String,
    pub condition: Option<String>,
}

impl Join {
    pub fn inner(table: impl Into<String>, alias: impl Into<String>, condition: Option<&str>) -> Self {
        Self::new(JoinKind::Inner, table, alias, condition)
    }

    pub fn left(table: impl Into<String>, alias: impl Into<String>, condition: Option<&str>) -> Self {
        Self::new(JoinKind::Left, table, alias, condition)
    }

    pub fn right(table: impl Into<String>, alias: impl Into<String>, condition: Option<&str>) -> Self {
        Self::new(JoinKind::Right, table, alias, condition)
    }

    fn new(
        kind: JoinKind,
        table: impl Into<String>,
        alias: impl Into<String>,
        condition: Option<&str>,
    ) -> Self {
        Self {
            kind,
            table: table.into(),
            alias: alias.into(),
            condition: condition.map(str::to_string),
        }
    }
}

/// The limit/offset pair of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Limit {
    pub max_results: Option<i64>,
    pub first_result: i64,
}

impl Limit {
    pub fn new(max_results: Option<i64>, first_result: i64) -> Self {
        Self {
            max_results,
            first_result,
        }
    }

    /// True when either a max-result count is set or the offset is
    /// non-default. A query with only an offset still counts as limited.
    pub fn is_defined(&self) -> bool {
        self.max_results.is_some() || self.first_result != 0
    }
}

/// How a FOR UPDATE lock reacts to already-locked rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolutionMode {
    /// Wait for the conflicting lock to be released.
    Ordinary,
    /// Skip rows that are already locked.
    SkipLocked,
}

/// A requested FOR UPDATE locking clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForUpdate {
    pub conflict_resolution_mode: ConflictResolutionMode,
}

impl ForUpdate {
    pub fn new(conflict_resolution_mode: ConflictResolutionMode) -> Self {
        Self {
            conflict_resolution_mode,
        }
    }
}

/// The set-operation keyword between two union parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionType {
    All,
    Distinct,
}

/// A raw SQL string or a nested builder, usable as a union part or CTE body.
#[derive(Debug, Clone, PartialEq)]
pub enum Subquery {
    Sql(String),
    Builder(Box<QueryBuilder>),
}

impl Subquery {
    /// Render this part, recursing into a nested builder when necessary.
    pub fn to_sql(&self) -> QueryResult<String> {
        match self {
            Subquery::Sql(sql) => Ok(sql.clone()),
            Subquery::Builder(builder) => builder.to_sql(),
        }
    }
}

impl From<&str> for Subquery {
    fn from(sql: &str) -> Self {
        Subquery::Sql(sql.to_string())
    }
}

impl From<String> for Subquery {
    fn from(sql: String) -> Self {
        Subquery::Sql(sql)
    }
}

impl From<QueryBuilder> for Subquery {
    fn from(builder: QueryBuilder) -> Self {
        Subquery::Builder(Box::new(builder))
    }
}

/// One part of a UNION statement. The first registered part carries no
/// type; every later part declares ALL or DISTINCT.
#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    pub query: Subquery,
    pub union_type: Option<UnionType>,
}

impl Union {
    pub fn new(query: impl Into<Subquery>, union_type: Option<UnionType>) -> Self {
        Self {
            query: query.into(),
            union_type,
        }
    }
}

/// A named subquery introduced by a WITH clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonTableExpression {
    pub name: String,
    pub query: Subquery,
    pub columns: Option<Vec<String>>,
}

impl CommonTableExpression {
    /// Create a CTE. An explicit but empty column list is rejected here,
    /// before any render.
    pub fn new(
        name: impl Into<String>,
        query: impl Into<Subquery>,
        columns: Option<Vec<String>>,
    ) -> QueryResult<Self> {
        let name = name.into();
        if let Some(columns) = &columns {
            if columns.is_empty() {
                return Err(QueryError::EmptyCteColumns(name));
            }
        }
        Ok(Self {
            name,
            query: query.into(),
            columns,
        })
    }
}

/// Immutable snapshot of a SELECT statement handed to the platform's
/// SELECT renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub distinct: bool,
    pub columns: Vec<String>,
    pub from: Vec<String>,
    pub where_clause: Option<String>,
    pub group_by: Vec<String>,
    pub having: Option<String>,
    pub order_by: Vec<String>,
    pub limit: Limit,
    pub for_update: Option<ForUpdate>,
}

/// Immutable snapshot of a UNION statement handed to the platform's
/// UNION renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionQuery {
    pub union_parts: Vec<Union>,
    pub order_by: Vec<String>,
    pub limit: Limit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_root_suppresses_redundant_alias() {
        let root = FromRoot::new("users", None);
        assert_eq!(root.table_sql(), "users");
        assert_eq!(root.reference(), "users");

        let root = FromRoot::new("users", Some("users"));
        assert_eq!(root.table_sql(), "users");
        assert_eq!(root.reference(), "users");

        let root = FromRoot::new("users", Some("u"));
        assert_eq!(root.table_sql(), "users u");
        assert_eq!(root.reference(), "u");
    }

    #[test]
    fn limit_is_defined_for_offset_only() {
        assert!(Limit::new(None, 5).is_defined());
        assert!(Limit::new(Some(10), 0).is_defined());
        assert!(!Limit::new(None, 0).is_defined());
    }

    #[test]
    fn cte_rejects_empty_column_list() {
        let err = CommonTableExpression::new("cte_a", "SELECT 1 as id", Some(vec![])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Columns defined in CTE \"cte_a\" should not be an empty array."
        );
    }

    #[test]
    fn cte_accepts_absent_or_populated_columns() {
        assert!(CommonTableExpression::new("cte_a", "SELECT 1", None).is_ok());
        assert!(
            CommonTableExpression::new("cte_a", "SELECT 1", Some(vec!["id".to_string()])).is_ok()
        );
    }
}
