//! Driver entry points (§6 of the engine specification): `parse`, `plan`,
//! `execute`, `cursor`, wired together into the convenience `query`
//! function.
//!
//! `SelectPlan` (from the `planner` crate) carries only the bound tables
//! and columns (§3) — it has no room for join predicates, the `WHERE`
//! clause, or literal projection items, none of which are part of the
//! planner's data model. Those live on the parsed `SelectStatement`, so
//! `execute` takes both the plan and the statement that produced it rather
//! than the plan alone; the spec's driver sketch (§6) is a rough surface,
//! not a literal signature, and `DESIGN.md` records the adaptation.

use std::cmp::Ordering;
use std::sync::Arc;

use catalog::{CatalogAdapter, TableHandle};
use common::{Column, EngineConfig, EngineError, EngineResult, Row};
use hashbrown::HashMap;
use parser::{
    BooleanOp, Comparison, ConditionNode, FieldNode, FieldRef, ProjectionItem, SelectStatement,
    Statement, TableRef,
};
use planner::SelectPlan;
use resultset::ResultSet;
use types::{FieldValue, RawValue};

/// Parses SQL source text into a sequence of statements (§6).
pub fn parse(sql: &str) -> EngineResult<Vec<Statement>> {
    parser::parse_sql(sql)
}

/// Binds a parsed statement's tables and projected columns against the
/// catalog, producing a [`SelectPlan`] (§6, §4.3). `config.case_insensitive_identifiers`
/// governs how table aliases and column names are matched.
pub fn plan(
    statement: &SelectStatement,
    catalog: Arc<dyn CatalogAdapter>,
    config: &EngineConfig,
) -> EngineResult<SelectPlan> {
    let mut select_plan = SelectPlan::new(catalog, config.case_insensitive_identifiers);

    for table_ref in &statement.from {
        select_plan.add_table_by_name(table_ref.alias.clone(), &table_ref.name);
        for join in &table_ref.joins {
            select_plan.add_table_by_name(join.alias.clone(), &join.table_name);
        }
    }

    for item in &statement.projection {
        match item {
            ProjectionItem::Asterisk => expand_asterisk(&mut select_plan)?,
            ProjectionItem::Field(field) => {
                select_plan.add_column(&qualified_reference(field))?;
            }
            ProjectionItem::Character(_, _) | ProjectionItem::Numeric(_, _) => {
                // Literal projection items are not table-bound; nothing to
                // resolve against the catalog.
            }
        }
    }

    Ok(select_plan)
}

fn qualified_reference(field: &FieldRef) -> String {
    match &field.table_alias {
        Some(alias) => format!("{alias}.{}", field.name),
        None => field.name.clone(),
    }
}

fn expand_asterisk(select_plan: &mut SelectPlan) -> EngineResult<()> {
    let aliases: Vec<String> = select_plan.tables().iter().map(|t| t.alias.clone()).collect();
    for alias in aliases {
        let table = select_plan
            .tables()
            .iter()
            .find(|t| t.alias == alias)
            .expect("alias collected from the same table list");
        let handle = table.table.clone().ok_or_else(|| {
            EngineError::NotFound(format!("table for alias '{alias}' could not be opened"))
        })?;
        let column_names: Vec<String> = handle.columns().iter().map(|c| c.name.clone()).collect();
        for name in column_names {
            select_plan.add_column(&format!("{alias}.{name}"))?;
        }
    }
    Ok(())
}

/// One column of the execution's final projection: either bound to a
/// resolved `PlanColumn`, or a literal computed independently of any table.
enum OutputColumn {
    Bound {
        source_table_alias: String,
        column_index: usize,
        label: String,
    },
    Literal {
        value: FieldValue,
        label: String,
    },
}

/// Evaluates a bound plan against the statement it was built from: resolves
/// joins, filters by `WHERE`, deduplicates on `DISTINCT`, and projects rows
/// (§4.3: "Execution (out of core but sketched)").
pub fn execute(
    select_plan: &SelectPlan,
    statement: &SelectStatement,
    config: &EngineConfig,
) -> EngineResult<(Vec<Column>, Vec<Row>)> {
    let tables: HashMap<String, TableHandle> = select_plan
        .tables()
        .iter()
        .filter_map(|t| t.table.clone().map(|handle| (t.alias.clone(), handle)))
        .collect();

    let mut combined: Option<Vec<Binding>> = None;
    for table_ref in &statement.from {
        let rows = resolve_table_ref(table_ref, &tables, select_plan.catalog(), config)?;
        combined = Some(match combined {
            None => rows,
            Some(left) => cross_join(left, rows),
        });
    }
    let combined = combined.unwrap_or_default();

    let filtered: Vec<Binding> = if statement.where_clause.is_empty() {
        combined
    } else {
        combined
            .into_iter()
            .map(|binding| {
                let keep = eval_cond_list(
                    &statement.where_clause,
                    &binding,
                    &tables,
                    select_plan.catalog(),
                    config,
                )?;
                Ok((binding, keep))
            })
            .collect::<EngineResult<Vec<_>>>()?
            .into_iter()
            .filter_map(|(binding, keep)| keep.then_some(binding))
            .collect()
    };

    let (output_columns, columns) = build_output_columns(statement, select_plan, &tables)?;

    let mut rows: Vec<Row> = filtered
        .iter()
        .map(|binding| project_row(&output_columns, binding))
        .collect::<EngineResult<Vec<_>>>()?;

    if statement.distinct {
        dedup_rows(&mut rows);
    }

    Ok((columns, rows))
}

/// Wraps materialized rows and column metadata in a scrollable cursor,
/// sized by `config.default_fetch_size` (§6, §4.4).
pub fn cursor(rows: Vec<Row>, columns: Vec<Column>, config: &EngineConfig) -> ResultSet {
    ResultSet::new(rows, columns, config.default_fetch_size)
}

/// Convenience wrapper running `parse`, `plan`, `execute`, and `cursor` in
/// sequence for a single `SELECT` statement.
pub fn query(sql: &str, catalog: Arc<dyn CatalogAdapter>, config: &EngineConfig) -> EngineResult<ResultSet> {
    let mut statements = parse(sql)?;
    if statements.len() != 1 {
        return Err(EngineError::UnsupportedOperation(
            "exactly one statement is supported per query".to_string(),
        ));
    }
    let Statement::Select(select) = statements.remove(0);
    let select_plan = plan(&select, catalog, config)?;
    let (columns, rows) = execute(&select_plan, &select, config)?;
    Ok(cursor(rows, columns, config))
}

/// A single combination of joined rows, keyed by table alias.
type Binding = HashMap<String, Row>;

fn resolve_table_ref(
    table_ref: &TableRef,
    tables: &HashMap<String, TableHandle>,
    catalog: &Arc<dyn CatalogAdapter>,
    config: &EngineConfig,
) -> EngineResult<Vec<Binding>> {
    let base = tables
        .get(&table_ref.alias)
        .ok_or_else(|| EngineError::NotFound(format!("table for alias '{}' not found", table_ref.alias)))?;
    let mut bindings: Vec<Binding> = base
        .scan()?
        .map(|row| {
            let mut binding = Binding::new();
            binding.insert(table_ref.alias.clone(), row);
            binding
        })
        .collect();

    for join in &table_ref.joins {
        let join_table = catalog.open_table(&join.table_name)?;
        let join_rows: Vec<Row> = join_table.scan()?.collect();
        let mut next = Vec::new();

        for left in &bindings {
            let mut matched = false;
            for row in &join_rows {
                let mut candidate = left.clone();
                candidate.insert(join.alias.clone(), row.clone());
                if eval_cond_list(&join.on, &candidate, tables, catalog, config)? {
                    matched = true;
                    next.push(candidate);
                }
            }
            if !matched && matches!(join.kind, parser::JoinKind::LeftOuter) {
                let mut candidate = left.clone();
                candidate.insert(join.alias.clone(), null_row(&join_table));
                next.push(candidate);
            }
        }

        if matches!(join.kind, parser::JoinKind::RightOuter) {
            let left_aliases: Vec<&str> = bindings
                .first()
                .map(|b| b.keys().map(String::as_str).collect())
                .unwrap_or_default();
            for row in &join_rows {
                let matched_any = bindings.iter().any(|left| {
                    let mut candidate = left.clone();
                    candidate.insert(join.alias.clone(), row.clone());
                    eval_cond_list(&join.on, &candidate, tables, catalog, config).unwrap_or(false)
                });
                if !matched_any {
                    let mut candidate: Binding = HashMap::new();
                    for alias in &left_aliases {
                        if let Some(handle) = tables.get(*alias) {
                            candidate.insert((*alias).to_string(), null_row(handle));
                        }
                    }
                    candidate.insert(join.alias.clone(), row.clone());
                    next.push(candidate);
                }
            }
        }

        bindings = next;
    }

    Ok(bindings)
}

fn null_row(table: &TableHandle) -> Row {
    Row::new(
        table
            .columns()
            .iter()
            .map(|c| FieldValue::null(c.sql_type_code))
            .collect(),
    )
}

fn cross_join(left: Vec<Binding>, right: Vec<Binding>) -> Vec<Binding> {
    let mut out = Vec::with_capacity(left.len() * right.len());
    for l in &left {
        for r in &right {
            let mut merged = l.clone();
            merged.extend(r.clone());
            out.push(merged);
        }
    }
    out
}

fn eval_cond_list(
    nodes: &[ConditionNode],
    binding: &Binding,
    tables: &HashMap<String, TableHandle>,
    catalog: &Arc<dyn CatalogAdapter>,
    config: &EngineConfig,
) -> EngineResult<bool> {
    let mut result: Option<bool> = None;
    let mut pending_op: Option<BooleanOp> = None;

    for node in nodes {
        if let ConditionNode::Operator(op) = node {
            pending_op = Some(*op);
            continue;
        }
        let value = eval_term(node, binding, tables, catalog, config)?;
        result = Some(match result {
            None => value,
            Some(acc) => apply_boolean_op(pending_op.take().unwrap_or(BooleanOp::And), acc, value),
        });
    }

    Ok(result.unwrap_or(true))
}

fn apply_boolean_op(op: BooleanOp, lhs: bool, rhs: bool) -> bool {
    match op {
        BooleanOp::And => lhs && rhs,
        BooleanOp::Or => lhs || rhs,
        BooleanOp::Xor => lhs ^ rhs,
    }
}

fn eval_term(
    node: &ConditionNode,
    binding: &Binding,
    tables: &HashMap<String, TableHandle>,
    catalog: &Arc<dyn CatalogAdapter>,
    config: &EngineConfig,
) -> EngineResult<bool> {
    match node {
        ConditionNode::Comparison(c) => eval_comparison(c, binding, tables, config),
        ConditionNode::Not(inner) => Ok(!eval_term(inner, binding, tables, catalog, config)?),
        ConditionNode::Group(nodes) => eval_cond_list(nodes, binding, tables, catalog, config),
        ConditionNode::Exists(subselect) => eval_exists(subselect, catalog, config),
        ConditionNode::Operator(_) => Err(EngineError::InvalidSql(
            "a boolean operator cannot stand alone as a condition".to_string(),
        )),
    }
}

/// Evaluates an uncorrelated `EXISTS` subquery: the subquery runs once
/// against the same catalog and succeeds iff it produces at least one row.
/// Correlation to the enclosing row's bindings is not supported (the
/// parsed subselect has no access to the outer `binding`); this mirrors the
/// scope of the core's execution sketch (§4.3), which does not specify
/// correlated subquery evaluation.
fn eval_exists(
    subselect: &SelectStatement,
    catalog: &Arc<dyn CatalogAdapter>,
    config: &EngineConfig,
) -> EngineResult<bool> {
    let sub_plan = plan(subselect, catalog.clone(), config)?;
    let (_, rows) = execute(&sub_plan, subselect, config)?;
    Ok(!rows.is_empty())
}

fn eval_comparison(
    comparison: &Comparison,
    binding: &Binding,
    tables: &HashMap<String, TableHandle>,
    config: &EngineConfig,
) -> EngineResult<bool> {
    Ok(match comparison {
        Comparison::Equals(l, r) => ordered(l, r, binding, tables, config)? == Some(Ordering::Equal),
        Comparison::NotEquals(l, r) => ordered(l, r, binding, tables, config)?
            .map(|o| o != Ordering::Equal)
            .unwrap_or(false),
        Comparison::LessThan(l, r) => ordered(l, r, binding, tables, config)? == Some(Ordering::Less),
        Comparison::GreaterThan(l, r) => {
            ordered(l, r, binding, tables, config)? == Some(Ordering::Greater)
        }
        Comparison::Between(field, lo, hi) => {
            let below = ordered(field, lo, binding, tables, config)?;
            let above = ordered(field, hi, binding, tables, config)?;
            matches!(below, Some(Ordering::Greater) | Some(Ordering::Equal))
                && matches!(above, Some(Ordering::Less) | Some(Ordering::Equal))
        }
    })
}

/// `None` when either side is null: comparisons against `NULL` are never
/// true (three-valued logic collapsed to `false` at the comparison level).
fn ordered(
    lhs: &FieldNode,
    rhs: &FieldNode,
    binding: &Binding,
    tables: &HashMap<String, TableHandle>,
    config: &EngineConfig,
) -> EngineResult<Option<Ordering>> {
    let lhs = eval_field_node(lhs, binding, tables, config)?;
    let rhs = eval_field_node(rhs, binding, tables, config)?;
    let (Some(l), Some(r)) = (lhs.value, rhs.value) else {
        return Ok(None);
    };
    let ordering = match (l, r) {
        (RawValue::Integer(a), RawValue::Integer(b)) => a.cmp(&b),
        (RawValue::Floating(a), RawValue::Floating(b)) => a.partial_cmp(&b).ok_or_else(nan_error)?,
        (RawValue::Integer(a), RawValue::Floating(b)) => {
            (a as f64).partial_cmp(&b).ok_or_else(nan_error)?
        }
        (RawValue::Floating(a), RawValue::Integer(b)) => {
            a.partial_cmp(&(b as f64)).ok_or_else(nan_error)?
        }
        (RawValue::Text(a), RawValue::Text(b)) => a.cmp(&b),
        (RawValue::Boolean(a), RawValue::Boolean(b)) => a.cmp(&b),
        (RawValue::Date(a), RawValue::Date(b)) => a.cmp(&b),
        (RawValue::Time(a), RawValue::Time(b)) => a.cmp(&b),
        (RawValue::Timestamp(a), RawValue::Timestamp(b)) => a.cmp(&b),
        _ => {
            return Err(EngineError::DataFormat(
                "cannot compare fields of incompatible types".to_string(),
            ))
        }
    };
    Ok(Some(ordering))
}

fn nan_error() -> EngineError {
    EngineError::DataFormat("cannot order NaN floating-point values".to_string())
}

fn eval_field_node(
    node: &FieldNode,
    binding: &Binding,
    tables: &HashMap<String, TableHandle>,
    config: &EngineConfig,
) -> EngineResult<FieldValue> {
    match node {
        FieldNode::Numeric(text) => Ok(parse_numeric_literal(text)),
        FieldNode::Character(text) => Ok(FieldValue::text(text.clone())),
        FieldNode::Field(field_ref) => resolve_field_ref(field_ref, binding, tables, config),
    }
}

fn parse_numeric_literal(text: &str) -> FieldValue {
    if let Ok(i) = text.parse::<i64>() {
        FieldValue::integer(i)
    } else {
        FieldValue::floating(text.parse::<f64>().unwrap_or(0.0))
    }
}

fn resolve_field_ref(
    field_ref: &FieldRef,
    binding: &Binding,
    tables: &HashMap<String, TableHandle>,
    config: &EngineConfig,
) -> EngineResult<FieldValue> {
    // A delimited identifier (`"Name"`) always compares exact, regardless of
    // `case_insensitive_identifiers` (§4.1, §11).
    let case_insensitive = config.case_insensitive_identifiers && !field_ref.name_delimited;
    let (alias, index) = match &field_ref.table_alias {
        Some(alias) => {
            let table = tables
                .get(alias)
                .ok_or_else(|| EngineError::InvalidSql(format!("unknown table alias '{alias}'")))?;
            let index = table
                .find_column_with_case(&field_ref.name, case_insensitive)
                .ok_or_else(|| {
                    EngineError::InvalidSql(format!(
                        "unknown column '{}' in table '{alias}'",
                        field_ref.name
                    ))
                })?;
            (alias.clone(), index)
        }
        None => {
            let mut found = None;
            for (alias, table) in tables.iter() {
                if let Some(index) = table.find_column_with_case(&field_ref.name, case_insensitive) {
                    if found.is_some() {
                        return Err(EngineError::InvalidSql(format!(
                            "column '{}' is ambiguous",
                            field_ref.name
                        )));
                    }
                    found = Some((alias.clone(), index));
                }
            }
            found.ok_or_else(|| {
                EngineError::InvalidSql(format!("unknown column '{}'", field_ref.name))
            })?
        }
    };

    binding
        .get(&alias)
        .and_then(|row| row.values.get(index))
        .cloned()
        .ok_or_else(|| EngineError::InvalidSql(format!("column '{}' not present in row", field_ref.name)))
}

fn build_output_columns(
    statement: &SelectStatement,
    select_plan: &SelectPlan,
    tables: &HashMap<String, TableHandle>,
) -> EngineResult<(Vec<OutputColumn>, Vec<Column>)> {
    let mut bound_idx = 0;
    let mut output = Vec::new();
    let mut columns = Vec::new();

    for item in &statement.projection {
        match item {
            ProjectionItem::Asterisk => {
                for table_ref in select_plan.tables() {
                    let Some(handle) = tables.get(&table_ref.alias) else {
                        continue;
                    };
                    for descriptor in handle.columns() {
                        let plan_column = &select_plan.columns()[bound_idx];
                        bound_idx += 1;
                        columns.push(
                            Column::new(descriptor.name.clone(), descriptor.sql_type_code, descriptor.nullable)
                                .with_table_name(table_ref.alias.clone()),
                        );
                        output.push(OutputColumn::Bound {
                            source_table_alias: plan_column.source_table_alias.clone(),
                            column_index: plan_column.column_index,
                            label: plan_column.label.clone(),
                        });
                    }
                }
            }
            ProjectionItem::Field(field) => {
                let plan_column = &select_plan.columns()[bound_idx];
                bound_idx += 1;
                let descriptor = tables
                    .get(&plan_column.source_table_alias)
                    .and_then(|t| t.columns().get(plan_column.column_index));
                let (sql_type_code, nullable) = descriptor
                    .map(|d| (d.sql_type_code, d.nullable))
                    .unwrap_or((types::sql_types::NULL, true));
                columns.push(
                    Column::new(field.name.clone(), sql_type_code, nullable)
                        .with_label(field.alias.clone())
                        .with_table_name(plan_column.source_table_alias.clone()),
                );
                output.push(OutputColumn::Bound {
                    source_table_alias: plan_column.source_table_alias.clone(),
                    column_index: plan_column.column_index,
                    label: field.alias.clone(),
                });
            }
            ProjectionItem::Character(text, label) => {
                columns.push(Column::new(label.clone(), types::sql_types::VARCHAR, false));
                output.push(OutputColumn::Literal {
                    value: FieldValue::text(text.clone()),
                    label: label.clone(),
                });
            }
            ProjectionItem::Numeric(text, label) => {
                let value = parse_numeric_literal(text);
                columns.push(Column::new(label.clone(), value.sql_type_code, false));
                output.push(OutputColumn::Literal { value, label: label.clone() });
            }
        }
    }

    Ok((output, columns))
}

fn project_row(output_columns: &[OutputColumn], binding: &Binding) -> EngineResult<Row> {
    let values = output_columns
        .iter()
        .map(|col| match col {
            OutputColumn::Bound {
                source_table_alias,
                column_index,
                ..
            } => binding
                .get(source_table_alias)
                .and_then(|row| row.values.get(*column_index))
                .cloned()
                .ok_or_else(|| {
                    EngineError::InvalidSql(format!(
                        "column not present in row for alias '{source_table_alias}'"
                    ))
                }),
            OutputColumn::Literal { value, .. } => Ok(value.clone()),
        })
        .collect::<EngineResult<Vec<_>>>()?;
    Ok(Row::new(values))
}

fn dedup_rows(rows: &mut Vec<Row>) {
    // Linear scan rather than a hash set: `FieldValue` carries an `f64`
    // payload, which has no `Hash` impl, and the fixture-sized tables this
    // engine targets make O(n^2) dedup cheap enough not to matter.
    let mut unique: Vec<Row> = Vec::with_capacity(rows.len());
    for row in rows.drain(..) {
        if !unique.contains(&row) {
            unique.push(row);
        }
    }
    *rows = unique;
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{areacodes_fixture, ColumnDescriptor, MemoryCatalog, MemoryTable};
    use pretty_assertions::assert_eq;

    fn areacodes_catalog() -> Arc<dyn CatalogAdapter> {
        Arc::new(MemoryCatalog::new().with_table(areacodes_fixture()))
    }

    fn default_config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn select_three_columns_matches_reference_fixture_first_row() {
        let catalog = areacodes_catalog();
        let mut rs = query("SELECT AC, State, CITIES FROM AREACODES", catalog, &default_config()).unwrap();
        rs.next().unwrap();
        assert_eq!(rs.get_string(1).unwrap(), "201");
        assert_eq!(rs.get_string(2).unwrap(), "NJ");
        assert_eq!(
            rs.get_string(3).unwrap(),
            "Hackensack, Jersey City (201/551 overlay)"
        );
    }

    #[test]
    fn select_star_expands_every_column() {
        let catalog = areacodes_catalog();
        let mut rs = query("SELECT * FROM areacodes", catalog, &default_config()).unwrap();
        assert_eq!(rs.get_metadata().unwrap().len(), 3);
        rs.next().unwrap();
        assert_eq!(rs.get_string(1).unwrap(), "201");
    }

    #[test]
    fn where_clause_filters_rows() {
        let catalog = areacodes_catalog();
        let mut rs = query("SELECT AC FROM areacodes WHERE State = 'DC'", catalog, &default_config()).unwrap();
        assert!(rs.next().unwrap());
        assert_eq!(rs.get_string(1).unwrap(), "202");
        assert!(!rs.next().unwrap());
    }

    #[test]
    fn flat_condition_list_folds_left_to_right() {
        let catalog = areacodes_catalog();
        let mut rs = query(
            "SELECT AC FROM areacodes WHERE State = 'NJ' OR State = 'DC' AND AC = '203'",
            catalog,
            &default_config(),
        )
        .unwrap();
        // Left-to-right fold: (State = 'NJ') OR (State = 'DC') then AND (AC
        // = '203') — a genuine precedence tree would instead group the AND
        // before the OR.
        let mut found = Vec::new();
        while rs.next().unwrap() {
            found.push(rs.get_string(1).unwrap());
        }
        assert_eq!(found, vec!["201"]);
    }

    #[test]
    fn inner_join_matches_rows_on_predicate() {
        let mut catalog = MemoryCatalog::new();
        catalog.insert(MemoryTable::new(
            "STATES",
            vec![
                ColumnDescriptor::new("CODE", types::sql_types::VARCHAR, false),
                ColumnDescriptor::new("NAME", types::sql_types::VARCHAR, false),
            ],
            vec![
                Row::new(vec![FieldValue::text("NJ"), FieldValue::text("New Jersey")]),
                Row::new(vec![FieldValue::text("DC"), FieldValue::text("Washington DC")]),
            ],
        ));
        catalog.insert(areacodes_fixture());
        let catalog: Arc<dyn CatalogAdapter> = Arc::new(catalog);

        let mut rs = query(
            "SELECT s.NAME FROM areacodes a JOIN states s ON a.State = s.CODE WHERE a.AC = '201'",
            catalog,
            &default_config(),
        )
        .unwrap();
        assert!(rs.next().unwrap());
        assert_eq!(rs.get_string(1).unwrap(), "New Jersey");
    }

    #[test]
    fn left_outer_join_keeps_unmatched_left_rows() {
        let mut catalog = MemoryCatalog::new();
        catalog.insert(areacodes_fixture());
        catalog.insert(MemoryTable::new(
            "OVERLAYS",
            vec![ColumnDescriptor::new("AC", types::sql_types::VARCHAR, false)],
            vec![Row::new(vec![FieldValue::text("999")])],
        ));
        let catalog: Arc<dyn CatalogAdapter> = Arc::new(catalog);

        let mut rs = query(
            "SELECT a.AC FROM areacodes a LEFT JOIN overlays o ON a.AC = o.AC",
            catalog,
            &default_config(),
        )
        .unwrap();
        let mut count = 0;
        while rs.next().unwrap() {
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn distinct_deduplicates_identical_rows() {
        let mut catalog = MemoryCatalog::new();
        catalog.insert(MemoryTable::new(
            "T",
            vec![ColumnDescriptor::new("X", types::sql_types::VARCHAR, false)],
            vec![
                Row::new(vec![FieldValue::text("a")]),
                Row::new(vec![FieldValue::text("a")]),
                Row::new(vec![FieldValue::text("b")]),
            ],
        ));
        let catalog: Arc<dyn CatalogAdapter> = Arc::new(catalog);

        let mut rs = query("SELECT DISTINCT X FROM T", catalog, &default_config()).unwrap();
        let mut seen = Vec::new();
        while rs.next().unwrap() {
            seen.push(rs.get_string(1).unwrap());
        }
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn literal_projection_item_is_included_alongside_bound_columns() {
        let catalog = areacodes_catalog();
        let mut rs = query("SELECT AC, 'fixed' FROM areacodes", catalog, &default_config()).unwrap();
        rs.next().unwrap();
        assert_eq!(rs.get_string(1).unwrap(), "201");
        assert_eq!(rs.get_string(2).unwrap(), "fixed");
    }

    #[test]
    fn unknown_table_fails_with_not_found() {
        let catalog = areacodes_catalog();
        let err = query("SELECT * FROM ghost", catalog, &default_config()).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn cursor_uses_configured_default_fetch_size() {
        let catalog = areacodes_catalog();
        let config = EngineConfig::builder()
            .catalog_dir(".")
            .default_fetch_size(7)
            .build();
        let rs = query("SELECT AC FROM areacodes", catalog, &config).unwrap();
        assert_eq!(rs.fetch_size(), 7);
    }

    #[test]
    fn case_insensitive_identifiers_false_rejects_mismatched_column_case() {
        let catalog = areacodes_catalog();
        let config = EngineConfig::builder()
            .catalog_dir(".")
            .case_insensitive_identifiers(false)
            .build();
        let err = query("SELECT Ac FROM areacodes", catalog, &config).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSql(_)));
    }

    #[test]
    fn case_insensitive_identifiers_false_accepts_exact_column_case() {
        let catalog = areacodes_catalog();
        let config = EngineConfig::builder()
            .catalog_dir(".")
            .case_insensitive_identifiers(false)
            .build();
        let mut rs = query("SELECT AC FROM areacodes", catalog, &config).unwrap();
        assert!(rs.next().unwrap());
        assert_eq!(rs.get_string(1).unwrap(), "201");
    }
}
