//! MySQL dialect.

use super::Platform;

/// MySQL rendering rules: backtick identifier quoting, and a limit clause
/// that cannot express an offset without a limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlPlatform;

impl Platform for MySqlPlatform {
    fn quote_single_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn do_modify_limit_query(&self, sql: &str, limit: Option<i64>, offset: i64) -> String {
        let mut sql = sql.to_string();
        match limit {
            Some(limit) => {
                sql.push_str(&format!(" LIMIT {limit}"));
                if offset > 0 {
                    sql.push_str(&format!(" OFFSET {offset}"));
                }
            }
            None if offset > 0 => {
                // 2^64-1 is the maximum of unsigned BIGINT, the biggest limit possible
                sql.push_str(&format!(" LIMIT 18446744073709551615 OFFSET {offset}"));
            }
            None => {}
        }
        sql
    }
}
