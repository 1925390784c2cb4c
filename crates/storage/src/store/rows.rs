#![forbid(unsafe_code)]

use super::StoreError;
use super::layout::TableLayout;
use nset_core::{
    Attributes, Bounds, NewNode, Node, NodeId, NodeQuery, NodeRow, ScopeKey, ShiftPlan,
};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params, params_from_iter};

struct RawRow {
    id: i64,
    scope: Option<String>,
    parent: Option<i64>,
    left: i64,
    right: i64,
    attributes_json: String,
}

fn raw_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get(0)?,
        scope: row.get(1)?,
        parent: row.get(2)?,
        left: row.get(3)?,
        right: row.get(4)?,
        attributes_json: row.get(5)?,
    })
}

impl RawRow {
    fn into_node(self) -> Result<Node, StoreError> {
        let corrupt = |reason: String| StoreError::CorruptRow {
            id: self.id,
            reason,
        };
        let bounds = Bounds::try_new(self.left, self.right).map_err(|err| corrupt(err.to_string()))?;
        let scope = self
            .scope
            .map(ScopeKey::try_new)
            .transpose()
            .map_err(|err| corrupt(format!("scope: {}", err.message())))?;
        let attributes: Attributes = serde_json::from_str(&self.attributes_json)
            .map_err(|err| corrupt(format!("attributes_json: {err}")))?;

        Ok(Node::from(NodeRow {
            id: NodeId::new(self.id),
            scope,
            parent: self.parent.map(NodeId::new),
            bounds,
            attributes,
        }))
    }
}

fn affected(changed: usize) -> u64 {
    u64::try_from(changed).unwrap_or(u64::MAX)
}

pub(crate) fn load_node(conn: &Connection, layout: &TableLayout, id: NodeId) -> Result<Option<Node>, StoreError> {
    let sql = format!("{} WHERE id=?1", layout.select_sql());
    conn.query_row(&sql, params![id.get()], raw_row)
        .optional()?
        .map(RawRow::into_node)
        .transpose()
}

pub(crate) fn find_nodes(conn: &Connection, layout: &TableLayout, query: &NodeQuery) -> Result<Vec<Node>, StoreError> {
    let mut values = Vec::new();
    let sql = layout.find_sql(query, &mut values)?;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), raw_row)?;

    let mut nodes = Vec::new();
    for row in rows {
        nodes.push(row?.into_node()?);
    }
    Ok(nodes)
}

pub(crate) fn count_nodes(conn: &Connection, layout: &TableLayout, query: &NodeQuery) -> Result<u64, StoreError> {
    let mut values = Vec::new();
    let sql = layout.count_sql(query, &mut values)?;
    let count: i64 = conn.query_row(&sql, params_from_iter(values), |row| row.get(0))?;
    Ok(u64::try_from(count).unwrap_or_default())
}

pub(crate) fn max_right(conn: &Connection, layout: &TableLayout, scope: Option<&ScopeKey>) -> Result<i64, StoreError> {
    let mut values = Vec::new();
    let sql = layout.max_right_sql(scope, &mut values)?;
    Ok(conn.query_row(&sql, params_from_iter(values), |row| row.get(0))?)
}

pub(crate) fn insert_node_tx(tx: &Transaction<'_>, layout: &TableLayout, node: NewNode) -> Result<Node, StoreError> {
    let mut values = Vec::with_capacity(5);
    match (layout.is_scoped(), &node.scope) {
        (true, scope) => values.push(
            scope
                .as_ref()
                .map_or(Value::Null, |key| Value::Text(key.as_str().to_string())),
        ),
        (false, None) => {}
        (false, Some(_)) => {
            return Err(StoreError::InvalidInput(
                "scope key given for an unscoped tree table",
            ));
        }
    }
    values.push(node.parent.map_or(Value::Null, |id| Value::Integer(id.get())));
    values.push(Value::Integer(node.bounds.left()));
    values.push(Value::Integer(node.bounds.right()));
    values.push(Value::Text(serde_json::to_string(&node.attributes)?));

    tx.execute(&layout.insert_sql(), params_from_iter(values))?;
    let id = NodeId::new(tx.last_insert_rowid());

    Ok(Node::from(NodeRow {
        id,
        scope: node.scope,
        parent: node.parent,
        bounds: node.bounds,
        attributes: node.attributes,
    }))
}

pub(crate) fn write_attributes_tx(
    tx: &Transaction<'_>,
    layout: &TableLayout,
    id: NodeId,
    attributes: &Attributes,
) -> Result<bool, StoreError> {
    let attributes_json = serde_json::to_string(attributes)?;
    let changed = tx.execute(
        &layout.update_attributes_sql(),
        params![attributes_json, id.get()],
    )?;
    Ok(changed > 0)
}

pub(crate) fn apply_shift_tx(
    tx: &Transaction<'_>,
    layout: &TableLayout,
    scope: Option<&ScopeKey>,
    plan: &ShiftPlan,
) -> Result<u64, StoreError> {
    if plan.arms().is_empty() {
        return Ok(0);
    }
    let mut values = Vec::new();
    let sql = layout.shift_sql(scope, plan, &mut values)?;
    Ok(affected(tx.execute(&sql, params_from_iter(values))?))
}

pub(crate) fn set_parent_tx(
    tx: &Transaction<'_>,
    layout: &TableLayout,
    id: NodeId,
    parent: Option<NodeId>,
) -> Result<bool, StoreError> {
    let changed = tx.execute(
        &layout.update_parent_sql(),
        params![parent.map(NodeId::get), id.get()],
    )?;
    Ok(changed > 0)
}

pub(crate) fn delete_nodes_tx(tx: &Transaction<'_>, layout: &TableLayout, query: &NodeQuery) -> Result<u64, StoreError> {
    let mut values = Vec::new();
    let sql = layout.delete_sql(query, &mut values)?;
    Ok(affected(tx.execute(&sql, params_from_iter(values))?))
}
