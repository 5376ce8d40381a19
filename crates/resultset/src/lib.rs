//! Materialized, bidirectionally scrollable result-set cursor (§4.4 of the
//! engine specification).
//!
//! The cursor holds every row in memory — the source materializes the full
//! scan up front, and `absolute`/`previous` would not be expressible over a
//! streaming iterator, so this contract is preserved rather than traded for
//! a lazier implementation (§9: "Scroll cursor backing store").

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use common::{Column, EngineError, EngineResult, Row};

/// Cursor position (§3). `On(i)` is only ever constructed for `i <
/// rows.len()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    BeforeFirst,
    On(usize),
    AfterLast,
}

/// Declared scroll direction of the cursor. The engine only ever produces
/// `Forward` cursors; `Reverse` exists so the type mirrors the source's
/// cursor descriptor (§3) even though nothing in this crate constructs it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Forward,
    Reverse,
}

/// Materialized, scroll-insensitive, read-only row cursor (§3: `ResultSet
/// cursor`).
pub struct ResultSet {
    rows: Vec<Row>,
    columns: Vec<Column>,
    position: Position,
    direction: ScrollDirection,
    fetch_size: usize,
    closed: bool,
    last_was_null: bool,
}

impl ResultSet {
    pub fn new(rows: Vec<Row>, columns: Vec<Column>, fetch_size: usize) -> Self {
        Self {
            rows,
            columns,
            position: Position::BeforeFirst,
            direction: ScrollDirection::Forward,
            fetch_size,
            closed: false,
            last_was_null: false,
        }
    }

    fn ensure_open(&self) -> EngineResult<()> {
        if self.closed {
            Err(EngineError::InvalidState(
                "result set is closed".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn fetch_size(&self) -> usize {
        self.fetch_size
    }

    /// Releases row storage and marks the cursor invalid for any further
    /// operation except repeated `close`. Idempotent.
    pub fn close(&mut self) {
        self.closed = true;
        self.rows.clear();
    }

    pub fn next(&mut self) -> EngineResult<bool> {
        self.ensure_open()?;
        match self.position {
            Position::BeforeFirst if !self.rows.is_empty() => {
                self.position = Position::On(0);
                Ok(true)
            }
            Position::On(i) if i + 1 < self.rows.len() => {
                self.position = Position::On(i + 1);
                Ok(true)
            }
            _ => {
                self.position = Position::AfterLast;
                Ok(false)
            }
        }
    }

    pub fn previous(&mut self) -> EngineResult<bool> {
        self.ensure_open()?;
        match self.position {
            Position::AfterLast if !self.rows.is_empty() => {
                self.position = Position::On(self.rows.len() - 1);
                Ok(true)
            }
            Position::On(i) if i > 0 => {
                self.position = Position::On(i - 1);
                Ok(true)
            }
            _ => {
                self.position = Position::BeforeFirst;
                Ok(false)
            }
        }
    }

    pub fn first(&mut self) -> EngineResult<bool> {
        self.ensure_open()?;
        if self.rows.is_empty() {
            self.position = Position::BeforeFirst;
            Ok(false)
        } else {
            self.position = Position::On(0);
            Ok(true)
        }
    }

    pub fn last(&mut self) -> EngineResult<bool> {
        self.ensure_open()?;
        if self.rows.is_empty() {
            self.position = Position::AfterLast;
            Ok(false)
        } else {
            self.position = Position::On(self.rows.len() - 1);
            Ok(true)
        }
    }

    pub fn before_first(&mut self) -> EngineResult<()> {
        self.ensure_open()?;
        self.position = Position::BeforeFirst;
        Ok(())
    }

    pub fn after_last(&mut self) -> EngineResult<()> {
        self.ensure_open()?;
        self.position = Position::AfterLast;
        Ok(())
    }

    pub fn is_before_first(&self) -> EngineResult<bool> {
        self.ensure_open()?;
        Ok(self.position == Position::BeforeFirst)
    }

    pub fn is_after_last(&self) -> EngineResult<bool> {
        self.ensure_open()?;
        Ok(self.position == Position::AfterLast)
    }

    pub fn is_first(&self) -> EngineResult<bool> {
        self.ensure_open()?;
        Ok(self.position == Position::On(0))
    }

    pub fn is_last(&self) -> EngineResult<bool> {
        self.ensure_open()?;
        Ok(!self.rows.is_empty() && self.position == Position::On(self.rows.len() - 1))
    }

    /// Bit-exact `absolute(n)` semantics (§4.4).
    ///
    /// `n == 0` always lands on `BeforeFirst` and returns `true`, even on an
    /// empty result set (§9 open question, resolved in favor of the
    /// boundary table). Negative `n` on an empty set lands on `BeforeFirst`
    /// and returns `false` — the boundary table (test #5) takes precedence
    /// over the contradictory aside about a `len==0` special case.
    pub fn absolute(&mut self, n: i64) -> EngineResult<bool> {
        self.ensure_open()?;
        if n == 0 {
            self.position = Position::BeforeFirst;
            return Ok(true);
        }
        let len = self.rows.len() as i64;
        if n > 0 {
            let idx = n - 1;
            if idx < len {
                self.position = Position::On(idx as usize);
                Ok(true)
            } else {
                self.position = Position::AfterLast;
                Ok(false)
            }
        } else {
            let idx = len + n;
            if idx >= 0 {
                self.position = Position::On(idx as usize);
                Ok(true)
            } else {
                self.position = Position::BeforeFirst;
                Ok(false)
            }
        }
    }

    /// `relative(n)` is `absolute(current + n)` where `current` is the
    /// 1-based row number (0 off-bounds), per §4.4.
    pub fn relative(&mut self, n: i64) -> EngineResult<bool> {
        let current = self.get_row()? as i64;
        self.absolute(current + n)
    }

    /// 1-based index of the current row, 0 if the cursor is not `On(_)`
    /// (§8 invariant 4).
    pub fn get_row(&self) -> EngineResult<usize> {
        self.ensure_open()?;
        Ok(match self.position {
            Position::On(i) => i + 1,
            _ => 0,
        })
    }

    fn current_row(&self) -> EngineResult<&Row> {
        self.ensure_open()?;
        match self.position {
            Position::On(i) => Ok(&self.rows[i]),
            _ => Err(EngineError::InvalidState(
                "cursor is not positioned on a row".to_string(),
            )),
        }
    }

    fn field_at(&mut self, index: usize) -> EngineResult<types::FieldValue> {
        let row = self.current_row()?;
        let field = index
            .checked_sub(1)
            .and_then(|i| row.values.get(i))
            .cloned()
            .ok_or_else(|| {
                EngineError::InvalidState(format!("column index {index} out of bounds"))
            })?;
        self.last_was_null = field.is_null();
        Ok(field)
    }

    fn column_index(&self, name: &str) -> EngineResult<usize> {
        self.find_column(name)
    }

    /// The lexical (`to_string`) representation of the field, following its
    /// declared SQL type. Null surfaces as the empty string.
    pub fn get_string(&mut self, index: usize) -> EngineResult<String> {
        let field = self.field_at(index)?;
        Ok(field.value.map(|v| v.to_string()).unwrap_or_default())
    }

    pub fn get_string_by_name(&mut self, name: &str) -> EngineResult<String> {
        let index = self.column_index(name)?;
        self.get_string(index)
    }

    pub fn get_integer(&mut self, index: usize) -> EngineResult<i64> {
        let field = self.field_at(index)?;
        if field.is_null() {
            return Ok(0);
        }
        field.as_integer().ok_or_else(|| {
            EngineError::DataFormat(format!("column {index} is not an INTEGER field"))
        })
    }

    pub fn get_integer_by_name(&mut self, name: &str) -> EngineResult<i64> {
        let index = self.column_index(name)?;
        self.get_integer(index)
    }

    pub fn get_floating(&mut self, index: usize) -> EngineResult<f64> {
        let field = self.field_at(index)?;
        if field.is_null() {
            return Ok(0.0);
        }
        field.as_floating().ok_or_else(|| {
            EngineError::DataFormat(format!("column {index} is not a floating-point field"))
        })
    }

    pub fn get_floating_by_name(&mut self, name: &str) -> EngineResult<f64> {
        let index = self.column_index(name)?;
        self.get_floating(index)
    }

    pub fn get_boolean(&mut self, index: usize) -> EngineResult<bool> {
        let field = self.field_at(index)?;
        if field.is_null() {
            return Ok(false);
        }
        field
            .as_boolean()
            .ok_or_else(|| EngineError::DataFormat(format!("column {index} is not a BOOLEAN field")))
    }

    pub fn get_boolean_by_name(&mut self, name: &str) -> EngineResult<bool> {
        let index = self.column_index(name)?;
        self.get_boolean(index)
    }

    pub fn get_date(&mut self, index: usize) -> EngineResult<NaiveDate> {
        let field = self.field_at(index)?;
        if field.is_null() {
            return Ok(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        }
        field
            .as_date()
            .ok_or_else(|| EngineError::DataFormat(format!("column {index} is not a DATE field")))
    }

    pub fn get_date_by_name(&mut self, name: &str) -> EngineResult<NaiveDate> {
        let index = self.column_index(name)?;
        self.get_date(index)
    }

    pub fn get_time(&mut self, index: usize) -> EngineResult<NaiveTime> {
        let field = self.field_at(index)?;
        if field.is_null() {
            return Ok(NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        }
        field
            .as_time()
            .ok_or_else(|| EngineError::DataFormat(format!("column {index} is not a TIME field")))
    }

    pub fn get_time_by_name(&mut self, name: &str) -> EngineResult<NaiveTime> {
        let index = self.column_index(name)?;
        self.get_time(index)
    }

    pub fn get_timestamp(&mut self, index: usize) -> EngineResult<NaiveDateTime> {
        let field = self.field_at(index)?;
        if field.is_null() {
            return Ok(NaiveDate::from_ymd_opt(1970, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap());
        }
        field.as_timestamp().ok_or_else(|| {
            EngineError::DataFormat(format!("column {index} is not a TIMESTAMP field"))
        })
    }

    pub fn get_timestamp_by_name(&mut self, name: &str) -> EngineResult<NaiveDateTime> {
        let index = self.column_index(name)?;
        self.get_timestamp(index)
    }

    pub fn get_bytes(&mut self, index: usize) -> EngineResult<Vec<u8>> {
        let field = self.field_at(index)?;
        if field.is_null() {
            return Ok(Vec::new());
        }
        field
            .as_binary()
            .map(|b| b.to_vec())
            .ok_or_else(|| EngineError::DataFormat(format!("column {index} is not a BINARY field")))
    }

    pub fn get_bytes_by_name(&mut self, name: &str) -> EngineResult<Vec<u8>> {
        let index = self.column_index(name)?;
        self.get_bytes(index)
    }

    /// True iff the last accessor call returned a null field.
    pub fn was_null(&self) -> bool {
        self.last_was_null
    }

    pub fn get_metadata(&self) -> EngineResult<&[Column]> {
        self.ensure_open()?;
        Ok(&self.columns)
    }

    /// Case-insensitive label lookup; returns a 1-based index.
    pub fn find_column(&self, name: &str) -> EngineResult<usize> {
        self.ensure_open()?;
        self.columns
            .iter()
            .position(|c| c.label.eq_ignore_ascii_case(name))
            .map(|i| i + 1)
            .ok_or_else(|| EngineError::InvalidSql(format!("no such column '{name}'")))
    }
}
