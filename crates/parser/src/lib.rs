//! Hand-written SQL front end: scanner, AST, and recursive-descent parser
//! for the Paradox-dialect read-only `SELECT` grammar (§4.1, §4.2).

mod ast;
mod scanner;
#[cfg(test)]
mod tests;

pub use ast::*;
pub use scanner::{Token, TokenKind};

use common::{EngineError, EngineResult};
use scanner::Scanner;

/// Parse SQL source text into a sequence of statements (§6: `parse`).
///
/// In practice this always yields exactly one `SELECT` statement, but the
/// grammar is driven the same way the original driver's `parse()` worked:
/// a loop over semicolon-separated statements.
pub fn parse_sql(sql: &str) -> EngineResult<Vec<Statement>> {
    let mut parser = Parser::new(sql)?;
    if parser.peek().is_none() {
        return Err(EngineError::InvalidSql("empty input".into()));
    }
    parser.parse_statements()
}

/// Recursive-descent parser holding a single token of lookahead (§4.2).
struct Parser {
    scanner: Scanner,
    lookahead: Option<Token>,
}

impl Parser {
    fn new(sql: &str) -> EngineResult<Self> {
        let mut scanner = Scanner::new(sql);
        let lookahead = if scanner.has_next()? {
            Some(scanner.next_token()?)
        } else {
            None
        };
        Ok(Self { scanner, lookahead })
    }

    fn peek(&self) -> Option<&Token> {
        self.lookahead.as_ref()
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.lookahead.as_ref().map(|t| t.kind)
    }

    fn advance(&mut self) -> EngineResult<Token> {
        let current = self
            .lookahead
            .take()
            .ok_or_else(|| EngineError::InvalidSql("unexpected end of input".into()))?;
        self.lookahead = if self.scanner.has_next()? {
            Some(self.scanner.next_token()?)
        } else {
            None
        };
        Ok(current)
    }

    fn expect(&mut self, kind: TokenKind) -> EngineResult<Token> {
        match self.peek_kind() {
            Some(k) if k == kind => self.advance(),
            Some(_) => {
                let lexeme = self.peek().unwrap().lexeme.clone();
                Err(EngineError::InvalidSql(format!(
                    "unexpected token '{lexeme}', expected {kind:?}"
                )))
            }
            None => Err(EngineError::InvalidSql(format!(
                "unexpected end of input, expected {kind:?}"
            ))),
        }
    }

    fn expect_any(&mut self, kinds: &[TokenKind]) -> EngineResult<Token> {
        match self.peek_kind() {
            Some(k) if kinds.contains(&k) => self.advance(),
            Some(_) => {
                let lexeme = self.peek().unwrap().lexeme.clone();
                Err(EngineError::InvalidSql(format!(
                    "unexpected token '{lexeme}', expected one of {kinds:?}"
                )))
            }
            None => Err(EngineError::InvalidSql(
                "unexpected end of input".to_string(),
            )),
        }
    }

    fn parse_statements(&mut self) -> EngineResult<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            if self.peek().is_none() {
                break;
            }
            statements.push(self.parse_statement()?);
            if self.peek_kind() == Some(TokenKind::Semicolon) {
                self.advance()?;
            } else {
                break;
            }
        }
        if let Some(tok) = self.peek() {
            return Err(EngineError::InvalidSql(format!(
                "unexpected trailing input '{}'",
                tok.lexeme
            )));
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> EngineResult<Statement> {
        match self.peek_kind() {
            Some(TokenKind::Select) => {
                self.advance()?;
                Ok(Statement::Select(self.parse_select_body()?))
            }
            Some(_) => {
                let lexeme = self.peek().unwrap().lexeme.clone();
                Err(EngineError::UnsupportedOperation(format!(
                    "expected SELECT, found '{lexeme}'"
                )))
            }
            None => Err(EngineError::InvalidSql(
                "unexpected end of input".to_string(),
            )),
        }
    }

    fn parse_select_body(&mut self) -> EngineResult<SelectStatement> {
        let distinct = if self.peek_kind() == Some(TokenKind::Distinct) {
            self.advance()?;
            true
        } else {
            false
        };

        let projection = self.parse_projection_list()?;
        self.expect(TokenKind::From)?;
        let from = self.parse_from_list()?;
        let where_clause = if self.peek_kind() == Some(TokenKind::Where) {
            self.advance()?;
            self.parse_cond_list(&[TokenKind::Semicolon])?
        } else {
            Vec::new()
        };

        Ok(SelectStatement {
            distinct,
            projection,
            from,
            where_clause,
        })
    }

    fn parse_projection_list(&mut self) -> EngineResult<Vec<ProjectionItem>> {
        let mut items = vec![self.parse_proj_item()?];
        while self.peek_kind() == Some(TokenKind::Comma) {
            self.advance()?;
            items.push(self.parse_proj_item()?);
        }
        Ok(items)
    }

    fn parse_proj_item(&mut self) -> EngineResult<ProjectionItem> {
        match self.peek_kind() {
            Some(TokenKind::Asterisk) => {
                self.advance()?;
                Ok(ProjectionItem::Asterisk)
            }
            Some(TokenKind::Character) => {
                let tok = self.advance()?;
                let alias = self.parse_alias_opt()?.unwrap_or_else(|| tok.lexeme.clone());
                Ok(ProjectionItem::Character(tok.lexeme, alias))
            }
            Some(TokenKind::Numeric) => {
                let tok = self.advance()?;
                let alias = self.parse_alias_opt()?.unwrap_or_else(|| tok.lexeme.clone());
                Ok(ProjectionItem::Numeric(tok.lexeme, alias))
            }
            Some(TokenKind::Distinct) => Err(EngineError::InvalidSql(
                "DISTINCT is only valid immediately after SELECT".into(),
            )),
            Some(TokenKind::Identifier) => {
                let first = self.advance()?;
                let field = if self.peek_kind() == Some(TokenKind::Period) {
                    self.advance()?;
                    let name = self.expect(TokenKind::Identifier)?;
                    FieldRef::qualified(first.lexeme, name.lexeme).with_name_delimited(name.delimited)
                } else {
                    FieldRef::unqualified(first.lexeme).with_name_delimited(first.delimited)
                };
                let alias = self
                    .parse_alias_opt()?
                    .unwrap_or_else(|| field.name.clone());
                Ok(ProjectionItem::Field(field.with_alias(alias)))
            }
            Some(_) => {
                let lexeme = self.peek().unwrap().lexeme.clone();
                Err(EngineError::InvalidSql(format!(
                    "unexpected token '{lexeme}' in projection list"
                )))
            }
            None => Err(EngineError::InvalidSql(
                "unexpected end of input in projection list".into(),
            )),
        }
    }

    /// `alias := AS (IDENT | CHARACTER) | IDENT`.
    fn parse_alias_opt(&mut self) -> EngineResult<Option<String>> {
        if self.peek_kind() == Some(TokenKind::As) {
            self.advance()?;
            let tok = self.expect_any(&[TokenKind::Identifier, TokenKind::Character])?;
            Ok(Some(tok.lexeme))
        } else if self.peek_kind() == Some(TokenKind::Identifier) {
            let tok = self.advance()?;
            Ok(Some(tok.lexeme))
        } else {
            Ok(None)
        }
    }

    fn parse_from_list(&mut self) -> EngineResult<Vec<TableRef>> {
        let mut tables = vec![self.parse_table_ref()?];
        while self.peek_kind() == Some(TokenKind::Comma) {
            self.advance()?;
            tables.push(self.parse_table_ref()?);
        }
        Ok(tables)
    }

    fn parse_table_ref(&mut self) -> EngineResult<TableRef> {
        let name = self.expect(TokenKind::Identifier)?;
        let alias = self
            .parse_alias_opt()?
            .unwrap_or_else(|| name.lexeme.clone());
        let mut table = TableRef {
            name: name.lexeme,
            name_delimited: name.delimited,
            alias,
            joins: Vec::new(),
        };
        while self.starts_join() {
            table.joins.push(self.parse_join()?);
        }
        Ok(table)
    }

    fn starts_join(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(TokenKind::Left)
                | Some(TokenKind::Right)
                | Some(TokenKind::Inner)
                | Some(TokenKind::Outer)
                | Some(TokenKind::Join)
        )
    }

    fn parse_join(&mut self) -> EngineResult<JoinClause> {
        let side = match self.peek_kind() {
            Some(TokenKind::Left) => {
                self.advance()?;
                Some(JoinKind::LeftOuter)
            }
            Some(TokenKind::Right) => {
                self.advance()?;
                Some(JoinKind::RightOuter)
            }
            _ => None,
        };
        if matches!(
            self.peek_kind(),
            Some(TokenKind::Inner) | Some(TokenKind::Outer)
        ) {
            self.advance()?;
        }
        self.expect(TokenKind::Join)?;
        let kind = side.unwrap_or(JoinKind::Inner);

        let name = self.expect(TokenKind::Identifier)?;
        let alias = self
            .parse_alias_opt()?
            .unwrap_or_else(|| name.lexeme.clone());
        self.expect(TokenKind::On)?;
        let on = self.parse_cond_list(&[
            TokenKind::Left,
            TokenKind::Right,
            TokenKind::Inner,
            TokenKind::Outer,
            TokenKind::Join,
            TokenKind::Comma,
            TokenKind::Where,
            TokenKind::Semicolon,
        ])?;

        Ok(JoinClause {
            kind,
            table_name: name.lexeme,
            alias,
            on,
        })
    }

    /// `cond_list := cond+`, stopping at end of input, an explicit
    /// terminator, or a closing parenthesis (which always ends a list,
    /// whether or not the caller listed it).
    fn parse_cond_list(&mut self, terminators: &[TokenKind]) -> EngineResult<Vec<ConditionNode>> {
        let mut nodes = Vec::new();
        loop {
            match self.peek_kind() {
                None => break,
                Some(TokenKind::RParen) => break,
                Some(k) if terminators.contains(&k) => break,
                _ => nodes.push(self.parse_cond()?),
            }
        }
        Ok(nodes)
    }

    fn parse_cond(&mut self) -> EngineResult<ConditionNode> {
        match self.peek_kind() {
            Some(TokenKind::Not) => {
                self.advance()?;
                Ok(ConditionNode::Not(Box::new(self.parse_cond()?)))
            }
            Some(TokenKind::Exists) => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let inner = self.parse_statement()?;
                self.expect(TokenKind::RParen)?;
                let Statement::Select(select) = inner;
                Ok(ConditionNode::Exists(Box::new(select)))
            }
            Some(TokenKind::LParen) => {
                self.advance()?;
                let inner = self.parse_cond_list(&[TokenKind::RParen])?;
                self.expect(TokenKind::RParen)?;
                Ok(ConditionNode::Group(inner))
            }
            Some(TokenKind::And) => {
                self.advance()?;
                Ok(ConditionNode::Operator(BooleanOp::And))
            }
            Some(TokenKind::Or) => {
                self.advance()?;
                Ok(ConditionNode::Operator(BooleanOp::Or))
            }
            Some(TokenKind::Xor) => {
                self.advance()?;
                Ok(ConditionNode::Operator(BooleanOp::Xor))
            }
            _ => Ok(ConditionNode::Comparison(self.parse_field_pred()?)),
        }
    }

    /// `field_pred := field (BETWEEN field AND field | '=' field | ...)`.
    ///
    /// A bare field with no following comparison operator is illegal: the
    /// grammar has no standalone boolean-valued field (§4.2 design notes).
    fn parse_field_pred(&mut self) -> EngineResult<Comparison> {
        let first = self.parse_field()?;
        match self.peek_kind() {
            Some(TokenKind::Between) => {
                self.advance()?;
                let lo = self.parse_field()?;
                self.expect(TokenKind::And)?;
                let hi = self.parse_field()?;
                Ok(Comparison::Between(first, lo, hi))
            }
            Some(TokenKind::Equals) => {
                self.advance()?;
                Ok(Comparison::Equals(first, self.parse_field()?))
            }
            Some(TokenKind::NotEquals) | Some(TokenKind::NotEquals2) => {
                self.advance()?;
                Ok(Comparison::NotEquals(first, self.parse_field()?))
            }
            Some(TokenKind::Less) => {
                self.advance()?;
                Ok(Comparison::LessThan(first, self.parse_field()?))
            }
            Some(TokenKind::More) => {
                self.advance()?;
                Ok(Comparison::GreaterThan(first, self.parse_field()?))
            }
            _ => Err(EngineError::InvalidSql(format!(
                "bare field '{first}' in condition list: expected a comparison operator"
            ))),
        }
    }

    /// `field := IDENT (PERIOD IDENT)? | NUMERIC | CHARACTER`.
    fn parse_field(&mut self) -> EngineResult<FieldNode> {
        match self.peek_kind() {
            Some(TokenKind::Identifier) => {
                let first = self.advance()?;
                if self.peek_kind() == Some(TokenKind::Period) {
                    self.advance()?;
                    let name = self.expect(TokenKind::Identifier)?;
                    Ok(FieldNode::Field(
                        FieldRef::qualified(first.lexeme, name.lexeme)
                            .with_name_delimited(name.delimited),
                    ))
                } else {
                    Ok(FieldNode::Field(
                        FieldRef::unqualified(first.lexeme).with_name_delimited(first.delimited),
                    ))
                }
            }
            Some(TokenKind::Numeric) => Ok(FieldNode::Numeric(self.advance()?.lexeme)),
            Some(TokenKind::Character) => Ok(FieldNode::Character(self.advance()?.lexeme)),
            Some(_) => {
                let lexeme = self.peek().unwrap().lexeme.clone();
                Err(EngineError::InvalidSql(format!(
                    "expected a field, found '{lexeme}'"
                )))
            }
            None => Err(EngineError::InvalidSql(
                "expected a field, found end of input".into(),
            )),
        }
    }
}
