//! Shared error type, row/column plumbing, and runtime configuration for the
//! Paradox-dialect query engine.

use std::path::PathBuf;

use thiserror::Error;
use types::FieldValue;

/// Closed alphabet of SQL-state-like error kinds (§6, §7 of the engine
/// specification). Every variant carries a message; the offending lexeme or
/// identifier is embedded in the message when one is available.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Parse or binding error: malformed SQL, unresolved identifier,
    /// ambiguous column, unknown alias.
    #[error("InvalidSQL: {0}")]
    InvalidSql(String),
    /// Non-SELECT statement, or syntax the grammar does not support.
    #[error("UnsupportedOperation: {0}")]
    UnsupportedOperation(String),
    /// Cursor used before-first, after-last, or after close.
    #[error("InvalidState: {0}")]
    InvalidState(String),
    /// Decode failure surfaced by the catalog/table adapter.
    #[error("DataFormat: {0}")]
    DataFormat(String),
    /// The catalog adapter could not be reached.
    #[error("ConnectionFailure: {0}")]
    ConnectionFailure(String),
    /// A named table, column, or index does not exist.
    #[error("NotFound: {0}")]
    NotFound(String),
}

impl EngineError {
    /// The fixed SQL-state string for this error kind (§6).
    pub fn sql_state(&self) -> &'static str {
        match self {
            EngineError::InvalidSql(_) => "InvalidSQL",
            EngineError::UnsupportedOperation(_) => "UnsupportedOperation",
            EngineError::InvalidState(_) => "InvalidState",
            EngineError::DataFormat(_) => "DataFormat",
            EngineError::ConnectionFailure(_) => "ConnectionFailure",
            EngineError::NotFound(_) => "NotFound",
        }
    }
}

/// Result alias carrying an [`EngineError`].
pub type EngineResult<T> = Result<T, EngineError>;

/// Result metadata for a single projected column (§3: Column).
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub label: String,
    pub sql_type_code: i32,
    pub nullable: bool,
    pub table_name: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type_code: i32, nullable: bool) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            sql_type_code,
            nullable,
            table_name: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }
}

/// Ordered sequence of field values, one per projected column.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Row {
    pub values: Vec<FieldValue>,
}

impl Row {
    pub fn new(values: Vec<FieldValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<FieldValue>> for Row {
    fn from(values: Vec<FieldValue>) -> Self {
        Row::new(values)
    }
}

/// Runtime configuration for the engine: fetch sizing and identifier
/// case-folding, the two ambient knobs the core needs beyond the catalog
/// location itself.
///
/// # Example
/// ```
/// use common::EngineConfig;
///
/// let config = EngineConfig::builder()
///     .catalog_dir("./tables")
///     .default_fetch_size(256)
///     .build();
/// ```
#[derive(Clone, Debug, bon::Builder)]
pub struct EngineConfig {
    /// Directory the catalog adapter treats as the database (§1, GLOSSARY).
    #[builder(into)]
    pub catalog_dir: PathBuf,
    /// Default `fetch_size` applied to result sets that don't request one
    /// explicitly.
    #[builder(default = 128)]
    pub default_fetch_size: usize,
    /// When true, unquoted identifiers are matched case-insensitively
    /// (§4.1); delimited identifiers always preserve case regardless of
    /// this setting.
    #[builder(default = true)]
    pub case_insensitive_identifiers: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog_dir: PathBuf::from("."),
            default_fetch_size: 128,
            case_insensitive_identifiers: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sql_state_matches_fixed_alphabet() {
        assert_eq!(
            EngineError::InvalidSql("bad".into()).sql_state(),
            "InvalidSQL"
        );
        assert_eq!(
            EngineError::UnsupportedOperation("x".into()).sql_state(),
            "UnsupportedOperation"
        );
        assert_eq!(
            EngineError::InvalidState("closed".into()).sql_state(),
            "InvalidState"
        );
    }

    #[test]
    fn column_defaults_label_to_name() {
        let col = Column::new("ac", types::sql_types::VARCHAR, true);
        assert_eq!(col.label, "ac");
    }

    #[test]
    fn column_with_label_overrides() {
        let col = Column::new("ac", types::sql_types::VARCHAR, true).with_label("area_code");
        assert_eq!(col.name, "ac");
        assert_eq!(col.label, "area_code");
    }

    #[test]
    fn config_builder_applies_defaults() {
        let config = EngineConfig::builder().catalog_dir("./tables").build();
        assert_eq!(config.default_fetch_size, 128);
        assert!(config.case_insensitive_identifiers);
    }
}
