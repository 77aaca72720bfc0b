//! SQL Server dialect.

use std::sync::OnceLock;

use regex::Regex;

use super::Platform;

fn order_by_regex() -> &'static Regex {
    static ORDER_BY_RE: OnceLock<Regex> = OnceLock::new();
    ORDER_BY_RE.get_or_init(|| {
        Regex::new(r"(?i)\s+order\s+by\s").expect("invalid built-in ORDER BY regex")
    })
}

fn select_distinct_regex() -> &'static Regex {
    static DISTINCT_RE: OnceLock<Regex> = OnceLock::new();
    DISTINCT_RE.get_or_init(|| {
        Regex::new(r"(?im)^SELECT\s+DISTINCT").expect("invalid built-in SELECT DISTINCT regex")
    })
}

/// SQL Server rendering rules: bracket identifier quoting and the
/// `OFFSET ... ROWS FETCH NEXT ... ROWS ONLY` paging clause, which is only
/// valid after an ORDER BY and with the clauses in the inverse of MySQL's
/// order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerPlatform;

impl Platform for SqlServerPlatform {
    fn quote_single_identifier(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }

    fn do_modify_limit_query(&self, sql: &str, limit: Option<i64>, offset: i64) -> String {
        if limit.is_none() && offset <= 0 {
            return sql.to_string();
        }

        let mut sql = sql.to_string();
        if should_add_order_by(&sql) {
            if select_distinct_regex().is_match(&sql) {
                // SQL Server won't let us order by a non-selected column in a
                // DISTINCT query, so order by the first result column. A
                // nonordered query's result order is non-deterministic anyway.
                sql.push_str(" ORDER BY 1");
            } else {
                // SQL Server rejects constant expressions in the order-by list,
                // so ORDER BY 0 is not an option here.
                sql.push_str(" ORDER BY (SELECT 0)");
            }
        }

        // Per TSQL spec, FETCH NEXT n ROWS ONLY is not valid without OFFSET n ROWS.
        sql.push_str(&format!(" OFFSET {offset} ROWS"));

        if let Some(limit) = limit {
            sql.push_str(&format!(" FETCH NEXT {limit} ROWS ONLY"));
        }

        sql
    }
}

/// A synthetic ORDER BY is needed unless the query already carries one at
/// the top level. An ORDER BY inside a parenthesized subquery does not
/// count: the clause is top-level only when the parentheses opened and
/// closed after its position balance out.
fn should_add_order_by(sql: &str) -> bool {
    let positions: Vec<usize> = order_by_regex().find_iter(sql).map(|m| m.start()).collect();
    if positions.is_empty() {
        return true;
    }

    for &pos in positions.iter().rev() {
        let tail = &sql[pos..];
        let open = tail.chars().filter(|&c| c == '(').count();
        let close = tail.chars().filter(|&c| c == ')').count();
        if open == close {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_bracket_quoted() {
        let platform = SqlServerPlatform;
        assert_eq!(platform.quote_single_identifier("user"), "[user]");
        assert_eq!(platform.quote_single_identifier("na]me"), "[na]]me]");
    }

    #[test]
    fn no_limit_and_no_offset_leaves_query_untouched() {
        let platform = SqlServerPlatform;
        assert_eq!(
            platform
                .modify_limit_query("SELECT id FROM users", None, 0)
                .unwrap(),
            "SELECT id FROM users"
        );
    }

    #[test]
    fn synthesizes_order_by_for_plain_select() {
        let platform = SqlServerPlatform;
        assert_eq!(
            platform
                .modify_limit_query("SELECT id FROM users", Some(10), 0)
                .unwrap(),
            "SELECT id FROM users ORDER BY (SELECT 0) OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn synthesizes_order_by_1_for_distinct_select() {
        let platform = SqlServerPlatform;
        assert_eq!(
            platform
                .modify_limit_query("SELECT DISTINCT id FROM users", Some(10), 5)
                .unwrap(),
            "SELECT DISTINCT id FROM users ORDER BY 1 OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn existing_top_level_order_by_is_kept() {
        let platform = SqlServerPlatform;
        assert_eq!(
            platform
                .modify_limit_query("SELECT id FROM users ORDER BY id", Some(10), 5)
                .unwrap(),
            "SELECT id FROM users ORDER BY id OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn order_by_inside_subquery_does_not_count() {
        let platform = SqlServerPlatform;
        let sql = "SELECT col1 FROM test WHERE id IN (SELECT col2 FROM test ORDER BY col2)";
        let modified = platform.modify_limit_query(sql, Some(10), 0).unwrap();
        assert!(modified.contains("ORDER BY (SELECT 0) OFFSET 0 ROWS"));
    }
}
