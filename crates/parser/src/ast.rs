//! Statement tree produced by the parser (§3 of the engine specification).
//!
//! Every node is a plain, immutable sum type; there are no parent pointers
//! and no mutation after parsing (§9: "Cyclic AST / parent pointers: none
//! required").

use std::fmt;

/// A projected or referenced column, optionally qualified by a table alias.
///
/// `alias` is never empty: it defaults to `name` when no `AS` clause (or
/// bare trailing identifier) follows. `name_delimited` records whether the
/// column name was written as a delimited identifier (`"quoted"` or
/// `[bracketed]`), so `Display` can round-trip it (§11 of the expanded
/// specification: delimited identifiers are fully round-trippable, not just
/// accepted by the scanner).
#[derive(Clone, Debug, PartialEq)]
pub struct FieldRef {
    pub table_alias: Option<String>,
    pub name: String,
    pub name_delimited: bool,
    pub alias: String,
}

impl FieldRef {
    pub fn unqualified(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            table_alias: None,
            alias: name.clone(),
            name,
            name_delimited: false,
        }
    }

    pub fn qualified(table_alias: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            table_alias: Some(table_alias.into()),
            alias: name.clone(),
            name,
            name_delimited: false,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn with_name_delimited(mut self, delimited: bool) -> Self {
        self.name_delimited = delimited;
        self
    }
}

/// Quotes `text` as a double-quoted delimited identifier, doubling any
/// embedded quote the way the scanner's `scan_delimited_identifier` unescapes
/// it on the way in (§4.1).
fn display_delimited(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    write!(f, "\"{}\"", text.replace('"', "\"\""))
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(t) = &self.table_alias {
            write!(f, "{t}.")?;
        }
        if self.name_delimited {
            display_delimited(f, &self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// A leaf operand inside a comparison or `BETWEEN`: a column reference or a
/// literal (§4.2 grammar rule `field`).
#[derive(Clone, Debug, PartialEq)]
pub enum FieldNode {
    Field(FieldRef),
    Numeric(String),
    Character(String),
}

impl fmt::Display for FieldNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldNode::Field(field) => write!(f, "{field}"),
            FieldNode::Numeric(text) => write!(f, "{text}"),
            FieldNode::Character(text) => write!(f, "'{}'", text.replace('\'', "''")),
        }
    }
}

/// A projection list entry (§4.2 grammar rule `proj_item`).
#[derive(Clone, Debug, PartialEq)]
pub enum ProjectionItem {
    Asterisk,
    Character(String, String),
    Numeric(String, String),
    Field(FieldRef),
}

/// Comparison predicates (§3: `Comparison`).
#[derive(Clone, Debug, PartialEq)]
pub enum Comparison {
    Equals(FieldNode, FieldNode),
    NotEquals(FieldNode, FieldNode),
    LessThan(FieldNode, FieldNode),
    GreaterThan(FieldNode, FieldNode),
    Between(FieldNode, FieldNode, FieldNode),
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Equals(lhs, rhs) => write!(f, "{lhs} = {rhs}"),
            Comparison::NotEquals(lhs, rhs) => write!(f, "{lhs} <> {rhs}"),
            Comparison::LessThan(lhs, rhs) => write!(f, "{lhs} < {rhs}"),
            Comparison::GreaterThan(lhs, rhs) => write!(f, "{lhs} > {rhs}"),
            Comparison::Between(field, lo, hi) => write!(f, "{field} BETWEEN {lo} AND {hi}"),
        }
    }
}

/// Boolean connective between adjacent conditions in a flat condition list.
///
/// The parser emits these as bare operator markers with no operands (§4.2's
/// "skeleton node" design): a `cond_list` is evaluated left-to-right rather
/// than reshaped into a precedence tree (§9 open question, resolved in
/// `DESIGN.md` in favor of the flat-list model).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BooleanOp {
    And,
    Or,
    Xor,
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BooleanOp::And => write!(f, "AND"),
            BooleanOp::Or => write!(f, "OR"),
            BooleanOp::Xor => write!(f, "XOR"),
        }
    }
}

/// One element of a flat condition list (a `WHERE` or `ON` clause).
#[derive(Clone, Debug, PartialEq)]
pub enum ConditionNode {
    Comparison(Comparison),
    Operator(BooleanOp),
    Not(Box<ConditionNode>),
    Exists(Box<SelectStatement>),
    /// A parenthesized sub-list, evaluated as a single unit.
    ///
    /// The source driver's `parseCondition` treated `(` by expecting an
    /// immediate `)` and returning a null node — almost certainly a bug
    /// (§9). This implementation parses the enclosed condition list
    /// properly instead of reproducing that bug.
    Group(Vec<ConditionNode>),
}

impl fmt::Display for ConditionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionNode::Comparison(c) => write!(f, "{c}"),
            ConditionNode::Operator(op) => write!(f, "{op}"),
            ConditionNode::Not(inner) => write!(f, "NOT {inner}"),
            ConditionNode::Exists(stmt) => write!(f, "EXISTS ({stmt})"),
            ConditionNode::Group(nodes) => {
                write!(f, "(")?;
                for (i, node) in nodes.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{node}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Join kind, including the comma (cross) join that `FROM a, b` produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    RightOuter,
    CrossComma,
}

/// One `JOIN` (or comma-joined) table attached to a `TableRef`.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table_name: String,
    pub alias: String,
    pub on: Vec<ConditionNode>,
}

/// A `FROM`-list entry: a base table plus any joins chained off it.
///
/// `name_delimited` mirrors [`FieldRef::name_delimited`]: whether the table
/// name was written as a delimited identifier, preserved for `Display`
/// round-tripping (§11).
#[derive(Clone, Debug, PartialEq)]
pub struct TableRef {
    pub name: String,
    pub name_delimited: bool,
    pub alias: String,
    pub joins: Vec<JoinClause>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            name,
            name_delimited: false,
            joins: Vec::new(),
        }
    }
}

/// A parsed `SELECT` statement (§3: `SelectStatement`).
#[derive(Clone, Debug, PartialEq)]
pub struct SelectStatement {
    pub distinct: bool,
    pub projection: Vec<ProjectionItem>,
    pub from: Vec<TableRef>,
    pub where_clause: Vec<ConditionNode>,
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        for (i, item) in self.projection.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match item {
                ProjectionItem::Asterisk => write!(f, "*")?,
                ProjectionItem::Field(field) => write!(f, "{field}")?,
                ProjectionItem::Character(text, _) => write!(f, "'{text}'")?,
                ProjectionItem::Numeric(text, _) => write!(f, "{text}")?,
            }
        }
        if !self.from.is_empty() {
            write!(f, " FROM ")?;
            for (i, table) in self.from.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                if table.name_delimited {
                    display_delimited(f, &table.name)?;
                } else {
                    write!(f, "{}", table.name)?;
                }
            }
        }
        if !self.where_clause.is_empty() {
            write!(f, " WHERE ")?;
            for (i, node) in self.where_clause.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{node}")?;
            }
        }
        Ok(())
    }
}

/// Top-level parsed statement. Only `SELECT` is supported (§1, §6).
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
}
