//! Parameter bookkeeping for assembled statements.
//!
//! Bound values and their declared types are tracked independently of the
//! render step: the assembler only hands out placeholders (`:name` or `?`)
//! and records what the caller intends to bind under each of them. Nothing
//! here talks to a database driver.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A backend-agnostic representation of a bound parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// SQL NULL.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    Text(String),
    /// Raw binary data.
    Bytes(Vec<u8>),
    /// A date without time.
    Date(chrono::NaiveDate),
    /// A date and time with UTC timezone.
    DateTime(chrono::DateTime<chrono::Utc>),
    /// A UUID value.
    Uuid(uuid::Uuid),
    /// A JSON value.
    Json(serde_json::Value),
    /// A homogeneous collection of values (array parameters).
    List(Vec<Value>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<chrono::NaiveDate> for Value {
    fn from(v: chrono::NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Value {
    fn from(v: chrono::DateTime<chrono::Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// The closed set of scalar parameter types a caller can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterType {
    Null,
    Integer,
    String,
    LargeObject,
    Boolean,
    Binary,
    Ascii,
}

/// Element types for array-valued parameters.
///
/// Declaring one of these signals that the bound value is a homogeneous
/// collection; the element type maps 1:1 onto the corresponding scalar
/// [`ParameterType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrayParameterType {
    Integer,
    String,
    Ascii,
    Binary,
}

impl ArrayParameterType {
    /// The scalar type of a single element of the bound collection.
    pub fn element_type(self) -> ParameterType {
        match self {
            ArrayParameterType::Integer => ParameterType::Integer,
            ArrayParameterType::String => ParameterType::String,
            ArrayParameterType::Ascii => ParameterType::Ascii,
            ArrayParameterType::Binary => ParameterType::Binary,
        }
    }
}

/// The declared type of a bound parameter: a scalar or an array of scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BindType {
    Scalar(ParameterType),
    Array(ArrayParameterType),
}

impl Default for BindType {
    fn default() -> Self {
        BindType::Scalar(ParameterType::String)
    }
}

impl From<ParameterType> for BindType {
    fn from(ty: ParameterType) -> Self {
        BindType::Scalar(ty)
    }
}

impl From<ArrayParameterType> for BindType {
    fn from(ty: ArrayParameterType) -> Self {
        BindType::Array(ty)
    }
}

/// A parameter key: the name of a `:name` placeholder, or the 0-based
/// position of a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKey {
    Named(String),
    Positional(usize),
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::Named(name) => f.write_str(name),
            ParamKey::Positional(idx) => write!(f, "{idx}"),
        }
    }
}

impl From<&str> for ParamKey {
    fn from(name: &str) -> Self {
        ParamKey::Named(name.to_string())
    }
}

impl From<String> for ParamKey {
    fn from(name: String) -> Self {
        ParamKey::Named(name)
    }
}

impl From<usize> for ParamKey {
    fn from(position: usize) -> Self {
        ParamKey::Positional(position)
    }
}

/// Tracks bound values and their declared types, keyed by name or position.
///
/// The registry never validates that a value's shape matches its declared
/// type; it is pure bookkeeping consumed by whatever executes the statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterRegistry {
    params: HashMap<ParamKey, Value>,
    types: HashMap<ParamKey, BindType>,
}

impl ParameterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value under the given key with its declared type.
    pub fn set(&mut self, key: impl Into<ParamKey>, value: impl Into<Value>, ty: impl Into<BindType>) {
        let key = key.into();
        self.params.insert(key.clone(), value.into());
        self.types.insert(key, ty.into());
    }

    /// Get a previously bound value, or `None` if the key is unbound.
    pub fn get(&self, key: impl Into<ParamKey>) -> Option<&Value> {
        self.params.get(&key.into())
    }

    /// Get the declared type for a key; unbound keys default to `STRING`.
    pub fn get_type(&self, key: impl Into<ParamKey>) -> BindType {
        self.types.get(&key.into()).copied().unwrap_or_default()
    }

    /// Replace all bound values and declared types at once.
    pub fn replace(
        &mut self,
        params: HashMap<ParamKey, Value>,
        types: HashMap<ParamKey, BindType>,
    ) {
        self.params = params;
        self.types = types;
    }

    /// All bound values, indexed by parameter key.
    pub fn values(&self) -> &HashMap<ParamKey, Value> {
        &self.params
    }

    /// All declared types, indexed by parameter key.
    pub fn types(&self) -> &HashMap<ParamKey, BindType> {
        &self.types
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check whether no parameters are bound.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
