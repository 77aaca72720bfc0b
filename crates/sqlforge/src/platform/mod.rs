//! Dialect strategy objects.
//!
//! A [`Platform`] bundles every dialect-sensitive rendering decision the
//! assembler needs: identifier and literal quoting, the limit/offset
//! injector, UNION keywords, and factories for the three sub-renderers.
//! The assembler only ever calls this interface; it never inspects which
//! dialect it is talking to.

use std::fmt;

use crate::error::{QueryError, QueryResult};
use crate::render::{
    DefaultSelectSqlBuilder, DefaultUnionSqlBuilder, SelectSqlBuilder, UnionSqlBuilder,
    WithSqlBuilder,
};

mod mysql;
mod oracle;
mod sqlserver;

pub use mysql::MySqlPlatform;
pub use oracle::OraclePlatform;
pub use sqlserver::SqlServerPlatform;

/// Capability interface for a SQL dialect.
///
/// Every method has a default body implementing the reference (ANSI-ish)
/// behavior; dialects override only what differs. The renderer factories
/// return boxed trait objects and receive the platform again at build time,
/// which keeps this trait object-safe.
pub trait Platform: fmt::Debug + Send + Sync {
    /// Quotes a single identifier (no dot-chain separation).
    fn quote_single_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Quotes a literal string.
    ///
    /// This is NOT an SQL injection defense; it only escapes this
    /// platform's string-literal quote character.
    fn quote_string_literal(&self, literal: &str) -> String {
        format!("'{}'", literal.replace('\'', "''"))
    }

    /// Adds a dialect-specific LIMIT clause to the query.
    fn modify_limit_query(
        &self,
        sql: &str,
        limit: Option<i64>,
        offset: i64,
    ) -> QueryResult<String> {
        if offset < 0 {
            return Err(QueryError::NegativeOffset(offset));
        }
        Ok(self.do_modify_limit_query(sql, limit, offset))
    }

    /// The dialect's limit-clause injector; `offset` is never negative here.
    fn do_modify_limit_query(&self, sql: &str, limit: Option<i64>, offset: i64) -> String {
        let mut sql = sql.to_string();
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if offset > 0 {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        sql
    }

    /// The `UNION ALL` keyword.
    fn union_all_sql(&self) -> &'static str {
        "UNION ALL"
    }

    /// The dialect-compatible `UNION DISTINCT` keyword.
    fn union_distinct_sql(&self) -> &'static str {
        "UNION"
    }

    /// Wraps a union part's subquery SQL.
    fn union_select_part_sql(&self, subquery: &str) -> String {
        format!("({subquery})")
    }

    /// The renderer for SELECT statements.
    fn create_select_sql_builder(&self) -> Box<dyn SelectSqlBuilder> {
        Box::new(DefaultSelectSqlBuilder::new(
            Some("FOR UPDATE"),
            Some("SKIP LOCKED"),
        ))
    }

    /// The renderer for UNION statements.
    fn create_union_sql_builder(&self) -> Box<dyn UnionSqlBuilder> {
        Box::new(DefaultUnionSqlBuilder)
    }

    /// The renderer for WITH (CTE) prefixes.
    fn create_with_sql_builder(&self) -> WithSqlBuilder {
        WithSqlBuilder
    }
}

/// The reference dialect: double-quoted identifiers, `LIMIT n OFFSET n`,
/// plain `UNION`/`UNION ALL`, FOR UPDATE and SKIP LOCKED supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPlatform;

impl Platform for DefaultPlatform {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_identifier_quoting_doubles_embedded_quotes() {
        let platform = DefaultPlatform;
        assert_eq!(platform.quote_single_identifier("user"), "\"user\"");
        assert_eq!(platform.quote_single_identifier("na\"me"), "\"na\"\"me\"");
    }

    #[test]
    fn string_literal_quoting_doubles_single_quotes() {
        let platform = DefaultPlatform;
        assert_eq!(platform.quote_string_literal("it's"), "'it''s'");
    }

    #[test]
    fn default_limit_injector_appends_limit_then_offset() {
        let platform = DefaultPlatform;
        assert_eq!(
            platform
                .modify_limit_query("SELECT * FROM users", Some(10), 5)
                .unwrap(),
            "SELECT * FROM users LIMIT 10 OFFSET 5"
        );
        assert_eq!(
            platform
                .modify_limit_query("SELECT * FROM users", None, 5)
                .unwrap(),
            "SELECT * FROM users OFFSET 5"
        );
        assert_eq!(
            platform
                .modify_limit_query("SELECT * FROM users", Some(10), 0)
                .unwrap(),
            "SELECT * FROM users LIMIT 10"
        );
    }

    #[test]
    fn negative_offset_is_rejected_before_dialect_dispatch() {
        let platform = DefaultPlatform;
        let err = platform
            .modify_limit_query("SELECT 1", Some(10), -1)
            .unwrap_err();
        assert_eq!(err, QueryError::NegativeOffset(-1));
    }
}
