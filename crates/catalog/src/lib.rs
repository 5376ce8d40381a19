//! Catalog adapter boundary (§6 of the engine specification).
//!
//! The Paradox binary decoder and the directory walker that locates `.db`
//! files on disk are explicitly out of scope (§1): the core only needs an
//! interface it can consume. This crate defines that interface —
//! [`CatalogAdapter`] and [`TableDescriptor`] — plus an in-memory adapter
//! used by tests, the CLI demo, and anyone wiring up a fixture catalog
//! before a real decoder exists.

use std::sync::Arc;

use common::{EngineError, EngineResult, Row};
use hashbrown::HashMap;

/// Column metadata as exposed by the catalog adapter (§6): name, SQL type
/// code, and nullability. Distinct from [`common::Column`], which also
/// carries a result-set label and source table name assigned by the
/// planner.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub sql_type_code: i32,
    pub nullable: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, sql_type_code: i32, nullable: bool) -> Self {
        Self {
            name: name.into(),
            sql_type_code,
            nullable,
        }
    }
}

/// A table as exposed by the catalog adapter: its columns and a forward-only
/// row scan (§6).
pub trait TableDescriptor: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &str;
    fn columns(&self) -> &[ColumnDescriptor];
    /// Finds a column by name, case-insensitively (§4.3 resolution rule).
    fn find_column(&self, name: &str) -> Option<usize> {
        self.columns()
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
    /// Finds a column by name, honoring `case_insensitive`
    /// (`EngineConfig::case_insensitive_identifiers`, §4.3). Delimited
    /// identifiers are resolved with `case_insensitive: false` by callers
    /// that track them, so they always compare exact regardless of the
    /// configured default.
    fn find_column_with_case(&self, name: &str, case_insensitive: bool) -> Option<usize> {
        if case_insensitive {
            self.find_column(name)
        } else {
            self.columns().iter().position(|c| c.name == name)
        }
    }
    /// A forward-only, finite scan over this table's rows.
    fn scan(&self) -> EngineResult<Box<dyn Iterator<Item = Row> + '_>>;
}

/// A shared handle to a table, as planners and plans pass it around.
pub type TableHandle = Arc<dyn TableDescriptor>;

/// Enumerates and opens tables in a named schema (§6).
pub trait CatalogAdapter: Send + Sync {
    /// Case-insensitive name match; returns zero or more matches.
    fn list_tables(&self, name_pattern: &str) -> EngineResult<Vec<TableHandle>>;
    /// Opens exactly one table by name, failing with `NotFound` if absent.
    fn open_table(&self, name: &str) -> EngineResult<TableHandle> {
        let matches = self.list_tables(name)?;
        matches
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| EngineError::NotFound(format!("no such table '{name}'")))
    }
}

/// Fixed, in-memory table backing a [`MemoryCatalog`] entry.
#[derive(Debug)]
pub struct MemoryTable {
    name: String,
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Row>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }
}

impl TableDescriptor for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    fn scan(&self) -> EngineResult<Box<dyn Iterator<Item = Row> + '_>> {
        Ok(Box::new(self.rows.iter().cloned()))
    }
}

/// In-memory [`CatalogAdapter`] keyed case-insensitively by table name, the
/// way the real directory-backed adapter keys tables by filename stem.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: HashMap<String, TableHandle>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: MemoryTable) -> Self {
        self.insert(table);
        self
    }

    pub fn insert(&mut self, table: MemoryTable) {
        self.tables
            .insert(table.name().to_ascii_uppercase(), Arc::new(table));
    }
}

impl CatalogAdapter for MemoryCatalog {
    fn list_tables(&self, name_pattern: &str) -> EngineResult<Vec<TableHandle>> {
        let key = name_pattern.to_ascii_uppercase();
        Ok(self
            .tables
            .get(&key)
            .cloned()
            .into_iter()
            .collect::<Vec<_>>())
    }
}

/// Builds the `AREACODES` reference fixture used throughout the test suite
/// and the CLI demo (boundary test #12): area code, state, and a free-text
/// city list, first row `AC="201"`.
pub fn areacodes_fixture() -> MemoryTable {
    use types::{sql_types, FieldValue};

    let columns = vec![
        ColumnDescriptor::new("AC", sql_types::VARCHAR, false),
        ColumnDescriptor::new("STATE", sql_types::VARCHAR, false),
        ColumnDescriptor::new("CITIES", sql_types::VARCHAR, true),
    ];

    let row = |ac: &str, state: &str, cities: &str| {
        Row::new(vec![
            FieldValue::text(ac),
            FieldValue::text(state),
            FieldValue::text(cities),
        ])
    };

    let rows = vec![
        row(
            "201",
            "NJ",
            "Hackensack, Jersey City (201/551 overlay)",
        ),
        row("202", "DC", "Washington"),
        row("203", "CT", "Bridgeport, Stamford"),
    ];

    MemoryTable::new("AREACODES", columns, rows)
}
