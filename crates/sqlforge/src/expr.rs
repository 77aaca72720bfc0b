//! Boolean predicate algebra for WHERE/HAVING clauses.
//!
//! A [`Predicate`] is either a raw SQL fragment supplied by the caller or a
//! [`CompositeExpression`] combining sub-predicates with AND or OR. The tree
//! is immutable; combining produces new values. Rendering parenthesizes each
//! part only when a composite actually has more than one part.
//!
//! Fragments are trusted verbatim. No escaping or validation happens here;
//! placeholders embedded in a fragment (`?`, `:name`) pass through untouched.

use std::fmt;
use std::sync::Arc;

use crate::error::{QueryError, QueryResult};
use crate::platform::Platform;

/// The boolean connective of a composite expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    And,
    Or,
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositeKind::And => f.write_str("AND"),
            CompositeKind::Or => f.write_str("OR"),
        }
    }
}

/// A node in the predicate tree: a raw fragment or an AND/OR composite.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// A caller-supplied SQL fragment, e.g. `u.name = ?`.
    Fragment(String),
    /// An AND/OR combination of sub-predicates.
    Composite(CompositeExpression),
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Fragment(sql) => f.write_str(sql),
            Predicate::Composite(composite) => composite.fmt(f),
        }
    }
}

impl From<&str> for Predicate {
    fn from(sql: &str) -> Self {
        Predicate::Fragment(sql.to_string())
    }
}

impl From<String> for Predicate {
    fn from(sql: String) -> Self {
        Predicate::Fragment(sql)
    }
}

impl From<CompositeExpression> for Predicate {
    fn from(composite: CompositeExpression) -> Self {
        Predicate::Composite(composite)
    }
}

/// An immutable AND/OR combination of one or more predicates.
///
/// A composite always holds at least one part. With a single part it renders
/// as that part's string, unparenthesized; with more, every part is wrapped
/// in parentheses and joined by the connective keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeExpression {
    kind: CompositeKind,
    parts: Vec<Predicate>,
}

impl CompositeExpression {
    /// Create a composite of the given kind. Errors when no parts are given.
    pub fn new<I, P>(kind: CompositeKind, parts: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Predicate>,
    {
        let parts: Vec<Predicate> = parts.into_iter().map(Into::into).collect();
        if parts.is_empty() {
            return Err(QueryError::EmptyCompositeExpression);
        }
        Ok(Self { kind, parts })
    }

    /// Create a conjunction of the given predicates.
    pub fn and<I, P>(parts: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Predicate>,
    {
        Self::new(CompositeKind::And, parts)
    }

    /// Create a disjunction of the given predicates.
    pub fn or<I, P>(parts: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Predicate>,
    {
        Self::new(CompositeKind::Or, parts)
    }

    /// A composite holding exactly one part, bypassing the emptiness check.
    pub(crate) fn of(kind: CompositeKind, part: Predicate) -> Self {
        Self {
            kind,
            parts: vec![part],
        }
    }

    /// Return a new composite of the same kind with the given parts appended.
    ///
    /// Appended parts are not re-wrapped; original order is preserved.
    pub fn with<I, P>(&self, parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Predicate>,
    {
        let mut combined = self.parts.clone();
        combined.extend(parts.into_iter().map(Into::into));
        Self {
            kind: self.kind,
            parts: combined,
        }
    }

    /// The boolean connective of this composite.
    pub fn kind(&self) -> CompositeKind {
        self.kind
    }

    /// Number of direct parts.
    pub fn count(&self) -> usize {
        self.parts.len()
    }
}

impl fmt::Display for CompositeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parts.len() == 1 {
            return self.parts[0].fmt(f);
        }

        let rendered: Vec<String> = self.parts.iter().map(ToString::to_string).collect();
        write!(f, "({})", rendered.join(&format!(") {} (", self.kind)))
    }
}

/// Convenience constructors for comparison fragments and composites.
///
/// All helpers interpolate their arguments verbatim into SQL fragments; use
/// placeholders plus the builder's parameter methods for actual values.
/// Obtained via [`QueryBuilder::expr`](crate::QueryBuilder::expr).
#[derive(Clone)]
pub struct ExpressionBuilder {
    platform: Arc<dyn Platform>,
}

impl ExpressionBuilder {
    pub(crate) fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    /// Creates a conjunction of the given expressions.
    pub fn and<I, P>(&self, parts: I) -> QueryResult<CompositeExpression>
    where
        I: IntoIterator<Item = P>,
        P: Into<Predicate>,
    {
        CompositeExpression::and(parts)
    }

    /// Creates a disjunction of the given expressions.
    pub fn or<I, P>(&self, parts: I) -> QueryResult<CompositeExpression>
    where
        I: IntoIterator<Item = P>,
        P: Into<Predicate>,
    {
        CompositeExpression::or(parts)
    }

    /// Creates a comparison expression: `<x> <operator> <y>`.
    pub fn comparison(&self, x: &str, operator: &str, y: &str) -> String {
        format!("{x} {operator} {y}")
    }

    /// Creates an equality comparison: `<x> = <y>`.
    pub fn eq(&self, x: &str, y: &str) -> String {
        self.comparison(x, "=", y)
    }

    /// Creates a non-equality comparison: `<x> <> <y>`.
    pub fn neq(&self, x: &str, y: &str) -> String {
        self.comparison(x, "<>", y)
    }

    /// Creates a lower-than comparison: `<x> < <y>`.
    pub fn lt(&self, x: &str, y: &str) -> String {
        self.comparison(x, "<", y)
    }

    /// Creates a lower-than-or-equal comparison: `<x> <= <y>`.
    pub fn lte(&self, x: &str, y: &str) -> String {
        self.comparison(x, "<=", y)
    }

    /// Creates a greater-than comparison: `<x> > <y>`.
    pub fn gt(&self, x: &str, y: &str) -> String {
        self.comparison(x, ">", y)
    }

    /// Creates a greater-than-or-equal comparison: `<x> >= <y>`.
    pub fn gte(&self, x: &str, y: &str) -> String {
        self.comparison(x, ">=", y)
    }

    /// Creates an IS NULL expression.
    pub fn is_null(&self, x: &str) -> String {
        format!("{x} IS NULL")
    }

    /// Creates an IS NOT NULL expression.
    pub fn is_not_null(&self, x: &str) -> String {
        format!("{x} IS NOT NULL")
    }

    /// Creates a LIKE comparison, with an optional ESCAPE character.
    pub fn like(&self, expr: &str, pattern: &str, escape_char: Option<&str>) -> String {
        match escape_char {
            Some(escape) => format!("{} ESCAPE {escape}", self.comparison(expr, "LIKE", pattern)),
            None => self.comparison(expr, "LIKE", pattern),
        }
    }

    /// Creates a NOT LIKE comparison, with an optional ESCAPE character.
    pub fn not_like(&self, expr: &str, pattern: &str, escape_char: Option<&str>) -> String {
        match escape_char {
            Some(escape) => format!(
                "{} ESCAPE {escape}",
                self.comparison(expr, "NOT LIKE", pattern)
            ),
            None => self.comparison(expr, "NOT LIKE", pattern),
        }
    }

    /// Creates an IN () comparison against the given set of expressions.
    pub fn in_list(&self, x: &str, set: &[&str]) -> String {
        self.comparison(x, "IN", &format!("({})", set.join(", ")))
    }

    /// Creates a NOT IN () comparison against the given set of expressions.
    pub fn not_in(&self, x: &str, set: &[&str]) -> String {
        self.comparison(x, "NOT IN", &format!("({})", set.join(", ")))
    }

    /// Quotes a string as an SQL literal using the platform's rules.
    ///
    /// Discouraged; prefer placeholders and bound parameters.
    pub fn literal(&self, input: &str) -> String {
        self.platform.quote_string_literal(input)
    }
}
