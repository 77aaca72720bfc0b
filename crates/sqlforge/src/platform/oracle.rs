//! Oracle dialect.

use super::Platform;

/// Oracle rendering rules: standard `OFFSET n ROWS` / `FETCH NEXT n ROWS
/// ONLY` paging, with the offset clause emitted first.
#[derive(Debug, Clone, Copy, Default)]
pub struct OraclePlatform;

impl Platform for OraclePlatform {
    fn do_modify_limit_query(&self, sql: &str, limit: Option<i64>, offset: i64) -> String {
        let mut sql = sql.to_string();
        if offset > 0 {
            sql.push_str(&format!(" OFFSET {offset} ROWS"));
        }
        if let Some(limit) = limit {
            sql.push_str(&format!(" FETCH NEXT {limit} ROWS ONLY"));
        }
        sql
    }
}
