//! Error types for sqlforge

use thiserror::Error;

/// Result type alias for sqlforge operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Error types for statement assembly
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// SELECT rendering was requested without any select expressions
    #[error("No SELECT expressions given. Please use select() or add_select().")]
    MissingSelectExpressions,

    /// UNION rendering was requested with fewer than two parts
    #[error(
        "Insufficient UNION parts given, need at least 2. Please use union() and add_union() to set enough UNION parts."
    )]
    InsufficientUnionParts,

    /// `add_union` was called before `union` established the first part
    #[error("No initial UNION part set, use union() to set one first.")]
    MissingInitialUnionPart,

    /// A join references a parent alias that is neither a FROM root nor a prior join alias
    #[error("Unknown alias: {alias}. Known aliases: {known}")]
    UnknownAlias { alias: String, known: String },

    /// A join registers an alias that is already taken
    #[error("Non-unique alias: {0}")]
    NonUniqueAlias(String),

    /// A CTE was declared with an explicit but empty column list
    #[error("Columns defined in CTE \"{0}\" should not be an empty array.")]
    EmptyCteColumns(String),

    /// A composite expression was constructed without any parts
    #[error("A composite expression requires at least one part.")]
    EmptyCompositeExpression,

    /// `upsert` was called with an empty column/value map
    #[error("No values given for upsert into table \"{0}\".")]
    EmptyUpsertValues(String),

    /// The platform has no rendering for the requested feature
    #[error("Operation \"{0}\" is not supported by platform.")]
    NotSupported(&'static str),

    /// A negative offset was passed to the limit-clause injector
    #[error("Offset must be a positive integer or zero, {0} given.")]
    NegativeOffset(i64),
}

impl QueryError {
    /// Create an unknown-alias error listing the currently registered aliases
    pub fn unknown_alias(alias: impl Into<String>, known: &[String]) -> Self {
        Self::UnknownAlias {
            alias: alias.into(),
            known: known.join(", "),
        }
    }

    /// Create a platform-capability error for an unsupported feature
    pub fn not_supported(feature: &'static str) -> Self {
        Self::NotSupported(feature)
    }

    /// Check if this is a platform-capability error
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }

    /// Check if this is a structural error raised during rendering
    pub fn is_render_error(&self) -> bool {
        matches!(
            self,
            Self::MissingSelectExpressions
                | Self::InsufficientUnionParts
                | Self::UnknownAlias { .. }
                | Self::NonUniqueAlias(_)
        )
    }
}
