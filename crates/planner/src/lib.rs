//! Logical planner (§4.3 of the engine specification): binds identifiers to
//! catalog tables, validates aliases, detects ambiguity, and collects the
//! columns a query projects.
//!
//! `SelectPlan` is deliberately built around the catalog adapter rather than
//! a whole connection handle (§9: "Prefer passing the catalog adapter
//! explicitly... this breaks a latent cycle between plan objects and
//! connection state"). Holding `Arc<dyn CatalogAdapter>` gives the planner
//! everything it needs to reach the catalog without also pulling in
//! unrelated connection state.

use std::sync::Arc;

use catalog::{CatalogAdapter, TableHandle};
use common::{EngineError, EngineResult};

/// One table slot in a plan: an alias and (if resolved) the underlying
/// table. A `None` table models a reference that failed to resolve at
/// planning time but whose alias was still registered (§4.3, §3 invariant
/// "A `PlanTableRef` with a missing underlying table yields an error when
/// any column is bound").
#[derive(Debug)]
pub struct PlanTableRef {
    pub alias: String,
    pub table: Option<TableHandle>,
}

/// A single bound, projected column (§3: `PlanColumn`).
#[derive(Clone, Debug, PartialEq)]
pub struct PlanColumn {
    pub source_table_alias: String,
    pub column_index: usize,
    pub label: String,
}

/// The resolved, alias-bound representation of a query, ready for execution
/// (§3: `SelectPlan`).
pub struct SelectPlan {
    catalog: Arc<dyn CatalogAdapter>,
    case_insensitive_identifiers: bool,
    tables: Vec<PlanTableRef>,
    columns: Vec<PlanColumn>,
}

impl SelectPlan {
    /// `case_insensitive_identifiers` mirrors
    /// `common::EngineConfig::case_insensitive_identifiers` and governs how
    /// table aliases and column names are matched below (§4.3).
    pub fn new(catalog: Arc<dyn CatalogAdapter>, case_insensitive_identifiers: bool) -> Self {
        Self {
            catalog,
            case_insensitive_identifiers,
            tables: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogAdapter> {
        &self.catalog
    }

    pub fn tables(&self) -> &[PlanTableRef] {
        &self.tables
    }

    /// Ordered bound columns; deduplication is not required (§4.3).
    pub fn columns(&self) -> &[PlanColumn] {
        &self.columns
    }

    /// Appends a table slot under `alias`. Alias collisions are not
    /// rejected here — they surface at `add_column` time against whichever
    /// column reference exposes them (§4.3).
    pub fn add_table(&mut self, alias: impl Into<String>, table: Option<TableHandle>) {
        self.tables.push(PlanTableRef {
            alias: alias.into(),
            table,
        });
    }

    /// Opens `table_name` through the catalog and appends it under `alias`.
    /// A catalog miss still registers the alias with a `None` table, so
    /// that later `add_column` calls report the missing-table error rather
    /// than a surprising "unknown alias".
    pub fn add_table_by_name(&mut self, alias: impl Into<String>, table_name: &str) {
        let table = self.catalog.open_table(table_name).ok();
        self.add_table(alias, table);
    }

    /// Resolves `reference` (`name` or `alias.name`) against the plan's
    /// tables and appends a `PlanColumn` on success. `plan.columns().len()`
    /// increases by exactly one on success and is unchanged on error (§8
    /// invariant 3): every failure path returns before the push.
    pub fn add_column(&mut self, reference: &str) -> EngineResult<()> {
        let column = match reference.split_once('.') {
            Some((alias, name)) => self.resolve_qualified(alias, name)?,
            None => self.resolve_unqualified(reference)?,
        };
        self.columns.push(column);
        Ok(())
    }

    fn alias_matches(&self, candidate: &str, alias: &str) -> bool {
        if self.case_insensitive_identifiers {
            candidate.eq_ignore_ascii_case(alias)
        } else {
            candidate == alias
        }
    }

    fn resolve_qualified(&self, alias: &str, name: &str) -> EngineResult<PlanColumn> {
        let mut matches = self
            .tables
            .iter()
            .filter(|t| self.alias_matches(&t.alias, alias));
        let found = matches
            .next()
            .ok_or_else(|| EngineError::InvalidSql(format!("unknown table alias '{alias}'")))?;
        if matches.next().is_some() {
            return Err(EngineError::InvalidSql(format!(
                "alias '{alias}' is ambiguous: bound to more than one table"
            )));
        }
        let table = found.table.as_ref().ok_or_else(|| {
            EngineError::InvalidSql(format!("alias '{alias}' has no underlying table"))
        })?;
        let index = table
            .find_column_with_case(name, self.case_insensitive_identifiers)
            .ok_or_else(|| {
                EngineError::InvalidSql(format!("unknown column '{name}' in table '{alias}'"))
            })?;
        Ok(PlanColumn {
            source_table_alias: found.alias.clone(),
            column_index: index,
            label: name.to_string(),
        })
    }

    fn resolve_unqualified(&self, name: &str) -> EngineResult<PlanColumn> {
        let mut found: Option<(&str, usize)> = None;
        let mut ambiguous = false;
        for table_ref in &self.tables {
            let Some(table) = table_ref.table.as_ref() else {
                continue;
            };
            if let Some(index) = table.find_column_with_case(name, self.case_insensitive_identifiers) {
                if found.is_some() {
                    ambiguous = true;
                }
                found = Some((table_ref.alias.as_str(), index));
            }
        }
        if ambiguous {
            return Err(EngineError::InvalidSql(format!(
                "column '{name}' is ambiguous: present in more than one table"
            )));
        }
        let (alias, index) = found
            .ok_or_else(|| EngineError::InvalidSql(format!("unknown column '{name}'")))?;
        Ok(PlanColumn {
            source_table_alias: alias.to_string(),
            column_index: index,
            label: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{areacodes_fixture, ColumnDescriptor, MemoryCatalog, MemoryTable};
    use pretty_assertions::assert_eq;

    fn catalog_with_two_areacodes_aliases() -> Arc<dyn CatalogAdapter> {
        Arc::new(MemoryCatalog::new().with_table(areacodes_fixture()))
    }

    fn plan_with_two_aliases_same_table() -> SelectPlan {
        let catalog = catalog_with_two_areacodes_aliases();
        let table = catalog.open_table("AREACODES").unwrap();
        let mut plan = SelectPlan::new(catalog, true);
        plan.add_table("test", Some(table.clone()));
        plan.add_table("test2", Some(table));
        plan
    }

    #[test]
    fn unqualified_column_present_in_two_tables_is_ambiguous() {
        let mut plan = plan_with_two_aliases_same_table();
        let err = plan.add_column("ac").unwrap_err();
        assert!(matches!(err, EngineError::InvalidSql(_)));
        assert_eq!(plan.columns().len(), 0);
    }

    #[test]
    fn qualified_column_on_real_table_succeeds() {
        let mut plan = plan_with_two_aliases_same_table();
        plan.add_column("test.ac").unwrap();
        assert_eq!(plan.columns().len(), 1);
        assert_eq!(plan.columns()[0].source_table_alias, "test");
    }

    #[test]
    fn qualified_column_on_unknown_alias_fails() {
        let catalog = catalog_with_two_areacodes_aliases();
        let table = catalog.open_table("AREACODES").unwrap();
        let mut plan = SelectPlan::new(catalog, true);
        plan.add_table("test", Some(table));
        let err = plan.add_column("test2.ac").unwrap_err();
        assert!(matches!(err, EngineError::InvalidSql(_)));
        assert_eq!(plan.columns().len(), 0);
    }

    #[test]
    fn qualified_column_on_null_table_fails() {
        let catalog = catalog_with_two_areacodes_aliases();
        let mut plan = SelectPlan::new(catalog, true);
        plan.add_table("test", None);
        let err = plan.add_column("test.ac").unwrap_err();
        assert!(matches!(err, EngineError::InvalidSql(_)));
        assert_eq!(plan.columns().len(), 0);
    }

    #[test]
    fn add_column_failure_leaves_column_count_unchanged() {
        let mut plan = plan_with_two_aliases_same_table();
        assert!(plan.add_column("nonexistent").is_err());
        assert_eq!(plan.columns().len(), 0);
        plan.add_column("test.state").unwrap();
        assert_eq!(plan.columns().len(), 1);
        assert!(plan.add_column("ac").is_err());
        assert_eq!(plan.columns().len(), 1);
    }

    #[test]
    fn case_insensitive_identifiers_true_matches_column_regardless_of_case() {
        let catalog = catalog_with_two_areacodes_aliases();
        let table = catalog.open_table("AREACODES").unwrap();
        let mut plan = SelectPlan::new(catalog, true);
        plan.add_table("test", Some(table));
        plan.add_column("test.Ac").unwrap();
        assert_eq!(plan.columns().len(), 1);
    }

    #[test]
    fn case_insensitive_identifiers_false_requires_exact_case() {
        let catalog = catalog_with_two_areacodes_aliases();
        let table = catalog.open_table("AREACODES").unwrap();
        let mut plan = SelectPlan::new(catalog, false);
        plan.add_table("test", Some(table));
        let err = plan.add_column("test.Ac").unwrap_err();
        assert!(matches!(err, EngineError::InvalidSql(_)));
        plan.add_column("test.AC").unwrap();
        assert_eq!(plan.columns().len(), 1);
    }

    #[test]
    fn case_insensitive_identifiers_false_requires_exact_alias_case() {
        let catalog = catalog_with_two_areacodes_aliases();
        let table = catalog.open_table("AREACODES").unwrap();
        let mut plan = SelectPlan::new(catalog, false);
        plan.add_table("Test", Some(table));
        let err = plan.add_column("test.AC").unwrap_err();
        assert!(matches!(err, EngineError::InvalidSql(_)));
        plan.add_column("Test.AC").unwrap();
        assert_eq!(plan.columns().len(), 1);
    }

    #[test]
    fn query_three_columns_from_areacodes_matches_reference_fixture() {
        let mut catalog = MemoryCatalog::new();
        catalog.insert(MemoryTable::new(
            "AREACODES",
            vec![
                ColumnDescriptor::new("AC", types::sql_types::VARCHAR, false),
                ColumnDescriptor::new("STATE", types::sql_types::VARCHAR, false),
                ColumnDescriptor::new("CITIES", types::sql_types::VARCHAR, true),
            ],
            vec![],
        ));
        let catalog: Arc<dyn CatalogAdapter> = Arc::new(catalog);
        let table = catalog.open_table("AREACODES").unwrap();
        let mut plan = SelectPlan::new(catalog, true);
        plan.add_table("areacodes", Some(table));
        for reference in ["ac", "state", "cities"] {
            plan.add_column(reference).unwrap();
        }
        assert_eq!(plan.columns().len(), 3);
    }
}
