//! Default renderers behind the platform's builder factories.
//!
//! Each renderer is a pure function from an immutable statement snapshot to
//! a SQL string. Dialects swap renderers by overriding the corresponding
//! factory on [`Platform`]; the assembler never constructs one directly.

use crate::error::{QueryError, QueryResult};
use crate::platform::Platform;
use crate::types::{CommonTableExpression, ConflictResolutionMode, SelectQuery, UnionQuery, UnionType};

/// Renders a [`SelectQuery`] snapshot into SQL.
pub trait SelectSqlBuilder: Send + Sync {
    fn build_sql(&self, platform: &dyn Platform, query: &SelectQuery) -> QueryResult<String>;
}

/// Renders a [`UnionQuery`] snapshot into SQL.
pub trait UnionSqlBuilder: Send + Sync {
    fn build_sql(&self, platform: &dyn Platform, query: &UnionQuery) -> QueryResult<String>;
}

/// The reference SELECT renderer.
///
/// The locking-clause texts are dialect configuration: `None` means the
/// dialect has no rendering for that feature and requesting it fails.
pub struct DefaultSelectSqlBuilder {
    for_update_sql: Option<&'static str>,
    skip_locked_sql: Option<&'static str>,
}

impl DefaultSelectSqlBuilder {
    pub fn new(
        for_update_sql: Option<&'static str>,
        skip_locked_sql: Option<&'static str>,
    ) -> Self {
        Self {
            for_update_sql,
            skip_locked_sql,
        }
    }
}

impl SelectSqlBuilder for DefaultSelectSqlBuilder {
    fn build_sql(&self, platform: &dyn Platform, query: &SelectQuery) -> QueryResult<String> {
        let mut parts: Vec<String> = vec!["SELECT".to_string()];

        if query.distinct {
            parts.push("DISTINCT".to_string());
        }

        parts.push(query.columns.join(", "));

        if !query.from.is_empty() {
            parts.push(format!("FROM {}", query.from.join(", ")));
        }

        if let Some(where_clause) = &query.where_clause {
            parts.push(format!("WHERE {where_clause}"));
        }

        if !query.group_by.is_empty() {
            parts.push(format!("GROUP BY {}", query.group_by.join(", ")));
        }

        if let Some(having) = &query.having {
            parts.push(format!("HAVING {having}"));
        }

        if !query.order_by.is_empty() {
            parts.push(format!("ORDER BY {}", query.order_by.join(", ")));
        }

        let mut sql = parts.join(" ");

        if query.limit.is_defined() {
            sql = platform.modify_limit_query(
                &sql,
                query.limit.max_results,
                query.limit.first_result,
            )?;
        }

        if let Some(for_update) = &query.for_update {
            let Some(for_update_sql) = self.for_update_sql else {
                return Err(QueryError::not_supported("FOR UPDATE"));
            };
            sql.push(' ');
            sql.push_str(for_update_sql);

            if for_update.conflict_resolution_mode == ConflictResolutionMode::SkipLocked {
                let Some(skip_locked_sql) = self.skip_locked_sql else {
                    return Err(QueryError::not_supported("SKIP LOCKED"));
                };
                sql.push(' ');
                sql.push_str(skip_locked_sql);
            }
        }

        Ok(sql)
    }
}

/// The reference UNION renderer.
pub struct DefaultUnionSqlBuilder;

impl UnionSqlBuilder for DefaultUnionSqlBuilder {
    fn build_sql(&self, platform: &dyn Platform, query: &UnionQuery) -> QueryResult<String> {
        let mut parts: Vec<String> = Vec::new();

        for union in &query.union_parts {
            if let Some(union_type) = union.union_type {
                parts.push(
                    match union_type {
                        UnionType::All => platform.union_all_sql(),
                        UnionType::Distinct => platform.union_distinct_sql(),
                    }
                    .to_string(),
                );
            }

            parts.push(platform.union_select_part_sql(&union.query.to_sql()?));
        }

        if !query.order_by.is_empty() {
            parts.push(format!("ORDER BY {}", query.order_by.join(", ")));
        }

        let mut sql = parts.join(" ");

        if query.limit.is_defined() {
            sql = platform.modify_limit_query(
                &sql,
                query.limit.max_results,
                query.limit.first_result,
            )?;
        }

        Ok(sql)
    }
}

/// Renders a list of CTEs into a `WITH` prefix, in registration order.
pub struct WithSqlBuilder;

impl WithSqlBuilder {
    pub fn build_sql(&self, expressions: &[CommonTableExpression]) -> QueryResult<String> {
        let mut cte_parts: Vec<String> = Vec::with_capacity(expressions.len());

        for cte in expressions {
            let mut part = cte.name.clone();
            if let Some(columns) = &cte.columns {
                part.push_str(&format!(" ({})", columns.join(", ")));
            }
            part.push_str(&format!(" AS ({})", cte.query.to_sql()?));
            cte_parts.push(part);
        }

        Ok(format!("WITH {}", cte_parts.join(", ")))
    }
}
