#![forbid(unsafe_code)]

//! SQL text for one configured tree table.
//!
//! Identifiers come from a validated [`TreeConfig`] and are rendered quoted;
//! every value travels as a positional parameter in textual order.

use super::StoreError;
use nset_core::{Containment, NodeFilter, NodeQuery, ScopeKey, ShiftPlan, SortOrder, TreeConfig};
use rusqlite::types::Value;

pub(crate) const META_TABLE: &str = "nested_set_meta";

#[derive(Clone, Debug)]
pub(crate) struct TableLayout {
    table_name: String,
    table: String,
    parent: String,
    left: String,
    right: String,
    scope: Option<String>,
}

fn quote(identifier: &str) -> String {
    format!("\"{identifier}\"")
}

impl TableLayout {
    pub(crate) fn from_config(config: &TreeConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let table_name = config.table.as_str();
        if table_name.eq_ignore_ascii_case(META_TABLE)
            || table_name.to_ascii_lowercase().starts_with("sqlite_")
        {
            return Err(StoreError::InvalidInput("tree table name is reserved"));
        }
        Ok(Self {
            table_name: table_name.to_string(),
            table: quote(table_name),
            parent: quote(config.parent_column.as_str()),
            left: quote(config.left_column.as_str()),
            right: quote(config.right_column.as_str()),
            scope: config.scope_column.as_ref().map(|c| quote(c.as_str())),
        })
    }

    pub(crate) fn is_scoped(&self) -> bool {
        self.scope.is_some()
    }

    pub(crate) fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Column layout as recorded in the meta table.
    pub(crate) fn fingerprint(&self) -> String {
        format!(
            "parent={};left={};right={};scope={}",
            self.parent,
            self.left,
            self.right,
            self.scope.as_deref().unwrap_or("-")
        )
    }

    pub(crate) fn create_sql(&self) -> String {
        let Self {
            table_name,
            table,
            parent,
            left,
            right,
            scope,
        } = self;
        let scope_column = scope
            .as_ref()
            .map(|scope| format!("  {scope} TEXT,\n"))
            .unwrap_or_default();
        let index_prefix = scope
            .as_ref()
            .map(|scope| format!("{scope}, "))
            .unwrap_or_default();
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
            {scope_column}  {parent} INTEGER,
              {left} INTEGER NOT NULL,
              {right} INTEGER NOT NULL,
              attributes_json TEXT NOT NULL DEFAULT '{{}}',
              CHECK({left} >= 1 AND {left} < {right})
            );

            CREATE INDEX IF NOT EXISTS "idx_{table_name}_left" ON {table}({index_prefix}{left});
            CREATE INDEX IF NOT EXISTS "idx_{table_name}_parent" ON {table}({index_prefix}{parent});
            "#
        )
    }

    pub(crate) fn select_sql(&self) -> String {
        let scope = self.scope.as_deref().unwrap_or("NULL");
        format!(
            "SELECT id, {scope}, {}, {}, {}, attributes_json FROM {}",
            self.parent, self.left, self.right, self.table
        )
    }

    /// Parameters: scope (scoped tables only), parent, left, right, attributes.
    pub(crate) fn insert_sql(&self) -> String {
        match &self.scope {
            Some(scope) => format!(
                "INSERT INTO {}({scope}, {}, {}, {}, attributes_json) VALUES (?, ?, ?, ?, ?)",
                self.table, self.parent, self.left, self.right
            ),
            None => format!(
                "INSERT INTO {}({}, {}, {}, attributes_json) VALUES (?, ?, ?, ?)",
                self.table, self.parent, self.left, self.right
            ),
        }
    }

    pub(crate) fn update_attributes_sql(&self) -> String {
        format!("UPDATE {} SET attributes_json=?1 WHERE id=?2", self.table)
    }

    pub(crate) fn update_parent_sql(&self) -> String {
        format!("UPDATE {} SET {}=?1 WHERE id=?2", self.table, self.parent)
    }

    pub(crate) fn max_right_sql(&self, scope: Option<&ScopeKey>, params: &mut Vec<Value>) -> Result<String, StoreError> {
        let clause = self.scope_clause(scope, params)?;
        Ok(format!(
            "SELECT COALESCE(MAX({}), 0) FROM {} WHERE {clause}",
            self.right, self.table
        ))
    }

    pub(crate) fn find_sql(&self, query: &NodeQuery, params: &mut Vec<Value>) -> Result<String, StoreError> {
        let clause = self.where_clause(query, params)?;
        let direction = match query.order {
            SortOrder::LeftAscending => "ASC",
            SortOrder::LeftDescending => "DESC",
        };
        let mut sql = format!("{} WHERE {clause} ORDER BY {} {direction}", self.select_sql(), self.left);
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            params.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        }
        Ok(sql)
    }

    pub(crate) fn count_sql(&self, query: &NodeQuery, params: &mut Vec<Value>) -> Result<String, StoreError> {
        let clause = self.where_clause(query, params)?;
        Ok(format!("SELECT COUNT(*) FROM {} WHERE {clause}", self.table))
    }

    pub(crate) fn delete_sql(&self, query: &NodeQuery, params: &mut Vec<Value>) -> Result<String, StoreError> {
        let clause = self.where_clause(query, params)?;
        Ok(format!("DELETE FROM {} WHERE {clause}", self.table))
    }

    /// One statement rewriting both boundary columns through the plan's arms.
    /// Only rows with a boundary inside some arm are touched.
    pub(crate) fn shift_sql(
        &self,
        scope: Option<&ScopeKey>,
        plan: &ShiftPlan,
        params: &mut Vec<Value>,
    ) -> Result<String, StoreError> {
        let left_case = self.case_expr(&self.left, plan, params);
        let right_case = self.case_expr(&self.right, plan, params);
        let clause = self.scope_clause(scope, params)?;

        let mut touched = Vec::with_capacity(plan.arms().len() * 2);
        for arm in plan.arms() {
            for column in [&self.left, &self.right] {
                touched.push(format!("{column} BETWEEN ? AND ?"));
                params.push(Value::Integer(arm.span.lo()));
                params.push(Value::Integer(arm.span.hi()));
            }
        }

        Ok(format!(
            "UPDATE {} SET {}={left_case}, {}={right_case} WHERE {clause} AND ({})",
            self.table,
            self.left,
            self.right,
            touched.join(" OR ")
        ))
    }

    fn case_expr(&self, column: &str, plan: &ShiftPlan, params: &mut Vec<Value>) -> String {
        let mut expr = String::from("CASE");
        for arm in plan.arms() {
            expr.push_str(&format!(" WHEN {column} BETWEEN ? AND ? THEN {column} + ?"));
            params.push(Value::Integer(arm.span.lo()));
            params.push(Value::Integer(arm.span.hi()));
            params.push(Value::Integer(arm.delta));
        }
        expr.push_str(&format!(" ELSE {column} END"));
        expr
    }

    fn scope_clause(&self, scope: Option<&ScopeKey>, params: &mut Vec<Value>) -> Result<String, StoreError> {
        match (&self.scope, scope) {
            (Some(column), scope) => {
                params.push(scope.map_or(Value::Null, |key| Value::Text(key.as_str().to_string())));
                Ok(format!("{column} IS ?"))
            }
            (None, None) => Ok("1=1".to_string()),
            (None, Some(_)) => Err(StoreError::InvalidInput(
                "scope key given for an unscoped tree table",
            )),
        }
    }

    fn where_clause(&self, query: &NodeQuery, params: &mut Vec<Value>) -> Result<String, StoreError> {
        let mut parts = vec![self.scope_clause(query.scope.as_ref(), params)?];
        for filter in &query.filters {
            parts.push(self.filter_sql(filter, params));
        }
        Ok(parts.join(" AND "))
    }

    fn filter_sql(&self, filter: &NodeFilter, params: &mut Vec<Value>) -> String {
        let (left, right, parent) = (&self.left, &self.right, &self.parent);
        match filter {
            NodeFilter::Id(id) => {
                params.push(Value::Integer(id.get()));
                "id = ?".to_string()
            }
            NodeFilter::NotId(id) => {
                params.push(Value::Integer(id.get()));
                "id <> ?".to_string()
            }
            NodeFilter::Parent(None) => format!("{parent} IS NULL"),
            NodeFilter::Parent(Some(id)) => {
                params.push(Value::Integer(id.get()));
                format!("{parent} = ?")
            }
            NodeFilter::Encloses(inner, containment) => {
                params.push(Value::Integer(inner.left()));
                params.push(Value::Integer(inner.right()));
                match containment {
                    Containment::Inclusive => format!("{left} <= ? AND {right} >= ?"),
                    Containment::Strict => format!("{left} < ? AND {right} > ?"),
                }
            }
            NodeFilter::Within(outer, containment) => {
                params.push(Value::Integer(outer.left()));
                params.push(Value::Integer(outer.right()));
                match containment {
                    Containment::Inclusive => format!("{left} >= ? AND {right} <= ?"),
                    Containment::Strict => format!("{left} > ? AND {right} < ?"),
                }
            }
            NodeFilter::LeftBelow(value) => {
                params.push(Value::Integer(*value));
                format!("{left} < ?")
            }
            NodeFilter::LeftAbove(value) => {
                params.push(Value::Integer(*value));
                format!("{left} > ?")
            }
            NodeFilter::Leaf => format!("{right} - {left} = 1"),
        }
    }
}
