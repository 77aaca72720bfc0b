//! # sqlforge
//!
//! A programmatic SQL statement assembler.
//!
//! ## Features
//!
//! - **Fluent builders**: SELECT, INSERT, UPDATE, DELETE and UNION
//!   statements assembled through chained calls
//! - **Predicate algebra**: AND/OR composites with deterministic
//!   parenthesization via `CompositeExpression`
//! - **Dialect dispatch**: quoting and limit/offset handling per platform
//!   (generic, MySQL, Oracle, SQL Server)
//! - **Parameter bookkeeping**: named (`:dcValueN`) and positional (`?`)
//!   placeholders with typed bound values
//! - **No execution**: output is a SQL string plus a parameter map; no
//!   driver, no connection handling, no validation of the generated SQL
//!
//! ## Query Builder
//!
//! ```
//! use std::sync::Arc;
//! use sqlforge::{DefaultPlatform, QueryBuilder};
//!
//! let mut qb = QueryBuilder::new(Arc::new(DefaultPlatform));
//! let placeholder = qb.create_named_parameter("jane", sqlforge::ParameterType::String, None);
//!
//! let sql = qb
//!     .select(["u.id", "u.name"])
//!     .from("users", Some("u"))
//!     .left_join("u", "phones", "p", Some("p.user_id = u.id"))
//!     .where_(format!("u.name = {placeholder}"))
//!     .order_by("u.name", Some("ASC"))
//!     .to_sql()
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT u.id, u.name FROM users u LEFT JOIN phones p ON p.user_id = u.id \
//!      WHERE u.name = :dcValue1 ORDER BY u.name ASC"
//! );
//! ```

pub mod builder;
pub mod error;
pub mod expr;
pub mod param;
pub mod platform;
pub mod render;
pub mod types;

pub use builder::{QueryBuilder, QueryType, UpsertMode};
pub use error::{QueryError, QueryResult};
pub use expr::{CompositeExpression, CompositeKind, ExpressionBuilder, Predicate};
pub use param::{
    ArrayParameterType, BindType, ParamKey, ParameterRegistry, ParameterType, Value,
};
pub use platform::{
    DefaultPlatform, MySqlPlatform, OraclePlatform, Platform, SqlServerPlatform,
};
pub use render::{
    DefaultSelectSqlBuilder, DefaultUnionSqlBuilder, SelectSqlBuilder, UnionSqlBuilder,
    WithSqlBuilder,
};
pub use types::{
    CommonTableExpression, ConflictResolutionMode, ForUpdate, FromRoot, Join, JoinKind, Limit,
    SelectQuery, Subquery, Union, UnionQuery, UnionType,
};
