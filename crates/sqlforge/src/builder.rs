//! The fluent statement assembler.
//!
//! [`QueryBuilder`] accumulates clause state through consuming builder
//! methods and renders it to SQL on demand via [`QueryBuilder::to_sql`].
//! Rendering is a pure function of the accumulated state; calling `to_sql`
//! twice on the same builder yields the same string.
//!
//! The assembler performs no validation of the generated SQL beyond alias
//! resolution. Whether a feature works on a given database vendor is the
//! caller's concern. Joins and limits are never applied to UPDATE and
//! DELETE statements, even though some vendors support them.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use tracing::trace;

use crate::error::{QueryError, QueryResult};
use crate::expr::{CompositeExpression, CompositeKind, ExpressionBuilder, Predicate};
use crate::param::{BindType, ParamKey, ParameterRegistry, Value};
use crate::platform::Platform;
use crate::types::{
    CommonTableExpression, ConflictResolutionMode, ForUpdate, FromRoot, Join, Limit, SelectQuery,
    Subquery, Union, UnionQuery, UnionType,
};

/// The kind of statement a builder is currently assembling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Union,
}

/// Which statement shape [`QueryBuilder::upsert`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMode {
    Insert,
    Update,
}

/// Dynamically assembles SQL statements.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    platform: Arc<dyn Platform>,
    registry: ParameterRegistry,
    query_type: QueryType,
    bound_counter: usize,
    first_result: i64,
    max_results: Option<i64>,
    table: Option<String>,
    union_parts: Vec<Union>,
    common_table_expressions: Vec<CommonTableExpression>,
    select: Vec<String>,
    distinct: bool,
    from: Vec<FromRoot>,
    joins: IndexMap<String, Vec<Join>>,
    set: Vec<String>,
    where_clause: Option<Predicate>,
    group_by: Vec<String>,
    having: Option<Predicate>,
    order_by: Vec<String>,
    for_update: Option<ForUpdate>,
    values: IndexMap<String, String>,
}

impl PartialEq for QueryBuilder {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.platform, &other.platform)
            && self.registry == other.registry
            && self.query_type == other.query_type
            && self.bound_counter == other.bound_counter
            && self.first_result == other.first_result
            && self.max_results == other.max_results
            && self.table == other.table
            && self.union_parts == other.union_parts
            && self.common_table_expressions == other.common_table_expressions
            && self.select == other.select
            && self.distinct == other.distinct
            && self.from == other.from
            && self.joins == other.joins
            && self.set == other.set
            && self.where_clause == other.where_clause
            && self.group_by == other.group_by
            && self.having == other.having
            && self.order_by == other.order_by
            && self.for_update == other.for_update
            && self.values == other.values
    }
}

impl Default for QueryBuilder {
    /// A builder targeting the MySQL dialect.
    fn default() -> Self {
        Self::new(Arc::new(crate::platform::MySqlPlatform))
    }
}

impl QueryBuilder {
    /// Create a builder rendering through the given platform.
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            registry: ParameterRegistry::new(),
            query_type: QueryType::Select,
            bound_counter: 0,
            first_result: 0,
            max_results: None,
            table: None,
            union_parts: Vec::new(),
            common_table_expressions: Vec::new(),
            select: Vec::new(),
            distinct: false,
            from: Vec::new(),
            joins: IndexMap::new(),
            set: Vec::new(),
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            for_update: None,
            values: IndexMap::new(),
        }
    }

    /// Gets an [`ExpressionBuilder`] for object-oriented construction of
    /// query expressions. Intended for convenient inline usage; for more
    /// complex expression construction, store it in a local variable.
    pub fn expr(&self) -> ExpressionBuilder {
        ExpressionBuilder::new(Arc::clone(&self.platform))
    }

    /// The kind of statement currently being assembled.
    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    /// Gets the complete SQL string formed by the current specifications
    /// of this builder. Recomputed from the accumulated state on each call.
    pub fn to_sql(&self) -> QueryResult<String> {
        trace!(query_type = ?self.query_type, "assembling sql");

        match self.query_type {
            QueryType::Insert => self.sql_for_insert(),
            QueryType::Delete => self.sql_for_delete(),
            QueryType::Update => self.sql_for_update(),
            QueryType::Select => self.sql_for_select(),
            QueryType::Union => self.sql_for_union(),
        }
    }

    // ---- parameters ----

    /// Binds a value under a name or position, with the default STRING type.
    pub fn set_parameter(self, key: impl Into<ParamKey>, value: impl Into<Value>) -> Self {
        self.set_parameter_typed(key, value, BindType::default())
    }

    /// Binds a value under a name or position with an explicit type.
    pub fn set_parameter_typed(
        mut self,
        key: impl Into<ParamKey>,
        value: impl Into<Value>,
        ty: impl Into<BindType>,
    ) -> Self {
        self.registry.set(key, value, ty);
        self
    }

    /// Replaces all bound parameters and their types at once.
    pub fn set_parameters(
        mut self,
        params: HashMap<ParamKey, Value>,
        types: HashMap<ParamKey, BindType>,
    ) -> Self {
        self.registry.replace(params, types);
        self
    }

    /// Gets a previously bound parameter value.
    pub fn parameter(&self, key: impl Into<ParamKey>) -> Option<&Value> {
        self.registry.get(key)
    }

    /// Gets all bound parameter values, indexed by name or position.
    pub fn parameters(&self) -> &HashMap<ParamKey, Value> {
        self.registry.values()
    }

    /// Gets the declared type of a bound parameter. Unbound keys report
    /// the STRING default.
    pub fn parameter_type(&self, key: impl Into<ParamKey>) -> BindType {
        self.registry.get_type(key)
    }

    /// Gets all declared parameter types, indexed by name or position.
    pub fn parameter_types(&self) -> &HashMap<ParamKey, BindType> {
        self.registry.types()
    }

    /// Creates a new named parameter bound to the given value and returns
    /// its placeholder.
    ///
    /// When `placeholder` is `None` one is generated from a counter shared
    /// with [`create_positional_parameter`](Self::create_positional_parameter):
    /// `:dcValue1`, `:dcValue2` and so on. An explicit placeholder must
    /// carry its leading `:`.
    pub fn create_named_parameter(
        &mut self,
        value: impl Into<Value>,
        ty: impl Into<BindType>,
        placeholder: Option<&str>,
    ) -> String {
        let placeholder = match placeholder {
            Some(placeholder) => placeholder.to_string(),
            None => {
                self.bound_counter += 1;
                format!(":dcValue{}", self.bound_counter)
            }
        };

        let name: String = placeholder.chars().skip(1).collect();
        self.registry.set(name, value, ty);

        placeholder
    }

    /// Creates a new positional parameter bound to the given value and
    /// returns its `?` placeholder.
    ///
    /// Positional parameters must be created in the order their
    /// placeholders appear in the final SQL, otherwise they bind at the
    /// wrong positions.
    pub fn create_positional_parameter(
        &mut self,
        value: impl Into<Value>,
        ty: impl Into<BindType>,
    ) -> String {
        self.registry.set(self.bound_counter, value, ty);
        self.bound_counter += 1;

        "?".to_string()
    }

    // ---- limit / offset ----

    /// Sets the position of the first result to retrieve (the "offset").
    pub fn set_first_result(mut self, first_result: i64) -> Self {
        self.first_result = first_result;
        self
    }

    /// Gets the position of the first result the builder retrieves.
    pub fn first_result(&self) -> i64 {
        self.first_result
    }

    /// Sets the maximum number of results to retrieve (the "limit").
    pub fn set_max_results(mut self, max_results: Option<i64>) -> Self {
        self.max_results = max_results;
        self
    }

    /// Gets the maximum number of results the builder retrieves. `None`
    /// means all results are returned.
    pub fn max_results(&self) -> Option<i64> {
        self.max_results
    }

    /// Locks the queried rows for a subsequent update.
    pub fn for_update(mut self, mode: ConflictResolutionMode) -> Self {
        self.for_update = Some(ForUpdate::new(mode));
        self
    }

    // ---- unions and CTEs ----

    /// Specifies the initial part of a UNION query, replacing any
    /// previously specified parts.
    pub fn union(mut self, part: impl Into<Subquery>) -> Self {
        self.query_type = QueryType::Union;
        self.union_parts = vec![Union::new(part, None)];
        self
    }

    /// Adds a part to a UNION query. Fails when no initial part was set
    /// via [`union`](Self::union).
    pub fn add_union(
        mut self,
        part: impl Into<Subquery>,
        union_type: UnionType,
    ) -> QueryResult<Self> {
        self.query_type = QueryType::Union;
        if self.union_parts.is_empty() {
            return Err(QueryError::MissingInitialUnionPart);
        }
        self.union_parts.push(Union::new(part, Some(union_type)));
        Ok(self)
    }

    /// Adds a UNION DISTINCT part, the default set-operation flavor.
    pub fn add_union_distinct(self, part: impl Into<Subquery>) -> QueryResult<Self> {
        self.add_union(part, UnionType::Distinct)
    }

    /// Adds a common table expression to a SELECT query.
    pub fn with(mut self, name: &str, query: impl Into<Subquery>) -> QueryResult<Self> {
        self.common_table_expressions
            .push(CommonTableExpression::new(name, query, None)?);
        Ok(self)
    }

    /// Adds a common table expression with an explicit column list. The
    /// list must be non-empty.
    pub fn with_columns(
        mut self,
        name: &str,
        query: impl Into<Subquery>,
        columns: &[&str],
    ) -> QueryResult<Self> {
        self.common_table_expressions.push(CommonTableExpression::new(
            name,
            query,
            Some(columns.iter().map(|c| c.to_string()).collect()),
        )?);
        Ok(self)
    }

    // ---- select ----

    /// Specifies the items to be returned by the query, replacing any
    /// previously specified selections.
    pub fn select<I, S>(mut self, expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_type = QueryType::Select;
        self.select = expressions.into_iter().map(Into::into).collect();
        self
    }

    /// Adds an item to be returned by the query.
    pub fn add_select(mut self, expression: impl Into<String>) -> Self {
        self.query_type = QueryType::Select;
        self.select.push(expression.into());
        self
    }

    /// Adds or removes DISTINCT on the query.
    pub fn set_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Adds DISTINCT to the query.
    pub fn distinct(self) -> Self {
        self.set_distinct(true)
    }

    /// Creates and adds a query root for the given table, forming a
    /// cartesian product with any existing roots.
    pub fn from(mut self, table: &str, alias: Option<&str>) -> Self {
        self.from.push(FromRoot::new(table, alias));
        self
    }

    /// Creates and adds an inner join to the query.
    pub fn join(self, from_alias: &str, table: &str, alias: &str, condition: Option<&str>) -> Self {
        self.inner_join(from_alias, table, alias, condition)
    }

    /// Creates and adds an inner join to the query.
    pub fn inner_join(
        mut self,
        from_alias: &str,
        table: &str,
        alias: &str,
        condition: Option<&str>,
    ) -> Self {
        self.joins
            .entry(from_alias.to_string())
            .or_default()
            .push(Join::inner(table, alias, condition));
        self
    }

    /// Creates and adds a left join to the query.
    pub fn left_join(
        mut self,
        from_alias: &str,
        table: &str,
        alias: &str,
        condition: Option<&str>,
    ) -> Self {
        self.joins
            .entry(from_alias.to_string())
            .or_default()
            .push(Join::left(table, alias, condition));
        self
    }

    /// Creates and adds a right join to the query.
    pub fn right_join(
        mut self,
        from_alias: &str,
        table: &str,
        alias: &str,
        condition: Option<&str>,
    ) -> Self {
        self.joins
            .entry(from_alias.to_string())
            .or_default()
            .push(Join::right(table, alias, condition));
        self
    }

    // ---- mutations ----

    /// Turns the query into a bulk delete over the given table.
    pub fn delete(mut self, table: &str) -> Self {
        self.query_type = QueryType::Delete;
        self.table = Some(table.to_string());
        self
    }

    /// Turns the query into a bulk update over the given table.
    pub fn update(mut self, table: &str) -> Self {
        self.query_type = QueryType::Update;
        self.table = Some(table.to_string());
        self
    }

    /// Turns the query into an insert into the given table.
    pub fn insert(mut self, table: &str) -> Self {
        self.query_type = QueryType::Insert;
        self.table = Some(table.to_string());
        self
    }

    /// Sets a new value for a column in a bulk update query. Duplicate
    /// assignments are all retained, in call order.
    pub fn set(mut self, column: &str, value: &str) -> Self {
        self.set.push(format!("{column} = {value}"));
        self
    }

    /// Sets a value for a column in an insert query. Re-setting a column
    /// overwrites its value but keeps its original position.
    pub fn set_value(mut self, column: &str, value: &str) -> Self {
        self.values.insert(column.to_string(), value.to_string());
        self
    }

    /// Specifies the values for an insert query indexed by column names,
    /// replacing any previous values.
    pub fn values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.values = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Builds an INSERT or UPDATE statement from a flat column-to-value
    /// map, binding every value as a fresh positional parameter in map
    /// order. Fails on an empty map for either mode.
    pub fn upsert(
        mut self,
        table: &str,
        data: Vec<(String, Value)>,
        mode: UpsertMode,
    ) -> QueryResult<Self> {
        if data.is_empty() {
            return Err(QueryError::EmptyUpsertValues(table.to_string()));
        }

        match mode {
            UpsertMode::Insert => {
                self = self.insert(table);
                for (column, value) in data {
                    let placeholder = self.create_positional_parameter(value, BindType::default());
                    self = self.set_value(&column, &placeholder);
                }
            }
            UpsertMode::Update => {
                self = self.update(table);
                for (column, value) in data {
                    let placeholder = self.create_positional_parameter(value, BindType::default());
                    self = self.set(&column, &placeholder);
                }
            }
        }

        Ok(self)
    }

    // ---- predicates ----

    /// Specifies a restriction on the query results, replacing any
    /// previously specified restrictions.
    pub fn where_(mut self, predicate: impl Into<Predicate>) -> Self {
        self.where_clause = Some(predicate.into());
        self
    }

    /// Adds a restriction, forming a conjunction with any previously
    /// specified restrictions.
    pub fn and_where(mut self, predicate: impl Into<Predicate>) -> Self {
        self.where_clause = Some(append_to_predicate(
            self.where_clause.take(),
            CompositeKind::And,
            predicate.into(),
        ));
        self
    }

    /// Adds a restriction, forming a disjunction with any previously
    /// specified restrictions.
    pub fn or_where(mut self, predicate: impl Into<Predicate>) -> Self {
        self.where_clause = Some(append_to_predicate(
            self.where_clause.take(),
            CompositeKind::Or,
            predicate.into(),
        ));
        self
    }

    /// Specifies a grouping expression, replacing any previously
    /// specified groupings.
    pub fn group_by(mut self, expression: impl Into<String>) -> Self {
        self.group_by = vec![expression.into()];
        self
    }

    /// Adds a grouping expression to the query.
    pub fn add_group_by(mut self, expression: impl Into<String>) -> Self {
        self.group_by.push(expression.into());
        self
    }

    /// Specifies a restriction over the groups of the query, replacing
    /// any previous having restrictions.
    pub fn having(mut self, predicate: impl Into<Predicate>) -> Self {
        self.having = Some(predicate.into());
        self
    }

    /// Adds a group restriction, forming a conjunction with any existing
    /// having restrictions.
    pub fn and_having(mut self, predicate: impl Into<Predicate>) -> Self {
        self.having = Some(append_to_predicate(
            self.having.take(),
            CompositeKind::And,
            predicate.into(),
        ));
        self
    }

    /// Adds a group restriction, forming a disjunction with any existing
    /// having restrictions.
    pub fn or_having(mut self, predicate: impl Into<Predicate>) -> Self {
        self.having = Some(append_to_predicate(
            self.having.take(),
            CompositeKind::Or,
            predicate.into(),
        ));
        self
    }

    /// Specifies an ordering for the results, replacing any previously
    /// specified orderings.
    pub fn order_by(mut self, sort: &str, order: Option<&str>) -> Self {
        self.order_by = vec![order_clause(sort, order)];
        self
    }

    /// Adds an ordering to the results.
    pub fn add_order_by(mut self, sort: &str, order: Option<&str>) -> Self {
        self.order_by.push(order_clause(sort, order));
        self
    }

    // ---- resets ----

    /// Resets the WHERE conditions.
    pub fn reset_where(mut self) -> Self {
        self.where_clause = None;
        self
    }

    /// Resets the grouping.
    pub fn reset_group_by(mut self) -> Self {
        self.group_by.clear();
        self
    }

    /// Resets the HAVING conditions.
    pub fn reset_having(mut self) -> Self {
        self.having = None;
        self
    }

    /// Resets the ordering.
    pub fn reset_order_by(mut self) -> Self {
        self.order_by.clear();
        self
    }

    // ---- rendering ----

    fn sql_for_select(&self) -> QueryResult<String> {
        if self.select.is_empty() {
            return Err(QueryError::MissingSelectExpressions);
        }

        let mut parts: Vec<String> = Vec::new();

        if !self.common_table_expressions.is_empty() {
            parts.push(
                self.platform
                    .create_with_sql_builder()
                    .build_sql(&self.common_table_expressions)?,
            );
        }

        let query = SelectQuery {
            distinct: self.distinct,
            columns: self.select.clone(),
            from: self.from_clauses()?,
            where_clause: self.where_clause.as_ref().map(ToString::to_string),
            group_by: self.group_by.clone(),
            having: self.having.as_ref().map(ToString::to_string),
            order_by: self.order_by.clone(),
            limit: Limit::new(self.max_results, self.first_result),
            for_update: self.for_update,
        };

        parts.push(
            self.platform
                .create_select_sql_builder()
                .build_sql(self.platform.as_ref(), &query)?,
        );

        Ok(parts.join(" "))
    }

    /// Renders the FROM clauses, one per query root, each carrying its
    /// join subtree. Joins directly attached to an alias are emitted
    /// before any deeper joins are walked.
    fn from_clauses(&self) -> QueryResult<Vec<String>> {
        let mut from_clauses: Vec<String> = Vec::with_capacity(self.from.len());
        let mut known_aliases: IndexSet<String> = IndexSet::new();

        for root in &self.from {
            let reference = root.reference().to_string();
            known_aliases.insert(reference.clone());

            let mut clause = root.table_sql();
            clause.push_str(&self.sql_for_joins(&reference, &mut known_aliases)?);
            from_clauses.push(clause);
        }

        self.verify_all_aliases_are_known(&known_aliases)?;

        Ok(from_clauses)
    }

    fn sql_for_joins(
        &self,
        from_alias: &str,
        known_aliases: &mut IndexSet<String>,
    ) -> QueryResult<String> {
        let mut sql = String::new();

        let Some(joins) = self.joins.get(from_alias) else {
            return Ok(sql);
        };

        for join in joins {
            if known_aliases.contains(&join.alias) {
                return Err(QueryError::NonUniqueAlias(join.alias.clone()));
            }

            sql.push_str(&format!(" {} JOIN {} {}", join.kind, join.table, join.alias));
            if let Some(condition) = &join.condition {
                sql.push_str(&format!(" ON {condition}"));
            }

            known_aliases.insert(join.alias.clone());
        }

        for join in joins {
            sql.push_str(&self.sql_for_joins(&join.alias, known_aliases)?);
        }

        Ok(sql)
    }

    fn verify_all_aliases_are_known(&self, known_aliases: &IndexSet<String>) -> QueryResult<()> {
        for from_alias in self.joins.keys() {
            if !known_aliases.contains(from_alias) {
                let known: Vec<String> = known_aliases.iter().cloned().collect();
                return Err(QueryError::unknown_alias(from_alias, &known));
            }
        }

        Ok(())
    }

    fn sql_for_insert(&self) -> QueryResult<String> {
        let columns: Vec<&str> = self.values.keys().map(String::as_str).collect();
        let values: Vec<&str> = self.values.values().map(String::as_str).collect();

        Ok(format!(
            "INSERT INTO {} ({}) VALUES({})",
            self.table.as_deref().unwrap_or_default(),
            columns.join(", "),
            values.join(", ")
        ))
    }

    fn sql_for_delete(&self) -> QueryResult<String> {
        let mut sql = format!("DELETE FROM {}", self.table.as_deref().unwrap_or_default());

        if let Some(where_clause) = &self.where_clause {
            sql.push_str(&format!(" WHERE {where_clause}"));
        }

        Ok(sql)
    }

    fn sql_for_update(&self) -> QueryResult<String> {
        let mut sql = format!(
            "UPDATE {} SET {}",
            self.table.as_deref().unwrap_or_default(),
            self.set.join(", ")
        );

        if let Some(where_clause) = &self.where_clause {
            sql.push_str(&format!(" WHERE {where_clause}"));
        }

        Ok(sql)
    }

    fn sql_for_union(&self) -> QueryResult<String> {
        if self.union_parts.len() < 2 {
            return Err(QueryError::InsufficientUnionParts);
        }

        let query = UnionQuery {
            union_parts: self.union_parts.clone(),
            order_by: self.order_by.clone(),
            limit: Limit::new(self.max_results, self.first_result),
        };

        self.platform
            .create_union_sql_builder()
            .build_sql(self.platform.as_ref(), &query)
    }
}

fn order_clause(sort: &str, order: Option<&str>) -> String {
    match order {
        Some(order) => format!("{sort} {order}"),
        None => sort.to_string(),
    }
}

/// Combines the current predicate with a new one under the given
/// connective. A composite of the same kind absorbs the new part; any
/// other current predicate is paired with it in a fresh composite; with
/// no current predicate the new part is adopted as-is.
fn append_to_predicate(
    current: Option<Predicate>,
    kind: CompositeKind,
    predicate: Predicate,
) -> Predicate {
    match current {
        Some(Predicate::Composite(composite)) if composite.kind() == kind => {
            Predicate::Composite(composite.with([predicate]))
        }
        Some(current) => {
            Predicate::Composite(CompositeExpression::of(kind, current).with([predicate]))
        }
        None => predicate,
    }
}
