//! Lexical scanner: turns SQL source text into a token stream with a single
//! token of lookahead (§4.1 of the engine specification).

use common::{EngineError, EngineResult};

/// Classification of a scanned token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Structural
    LParen,
    RParen,
    Comma,
    Period,
    Semicolon,
    // Keywords
    Select,
    Distinct,
    From,
    Where,
    Inner,
    Outer,
    Left,
    Right,
    Join,
    On,
    As,
    Between,
    And,
    Or,
    Xor,
    Not,
    Exists,
    // Operators
    Equals,
    NotEquals,
    NotEquals2,
    Less,
    More,
    Asterisk,
    // Literals
    Numeric,
    Character,
    Identifier,
}

/// A single scanned token: its kind, source lexeme, and byte offset.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: usize,
    /// True for `"quoted"` or `[bracketed]` identifiers: keyword promotion
    /// is suppressed and case is preserved verbatim.
    pub delimited: bool,
}

impl Token {
    fn new(kind: TokenKind, lexeme: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            position,
            delimited: false,
        }
    }
}

fn keyword_kind(word: &str) -> Option<TokenKind> {
    Some(match word.to_ascii_uppercase().as_str() {
        "SELECT" => TokenKind::Select,
        "DISTINCT" => TokenKind::Distinct,
        "FROM" => TokenKind::From,
        "WHERE" => TokenKind::Where,
        "INNER" => TokenKind::Inner,
        "OUTER" => TokenKind::Outer,
        "LEFT" => TokenKind::Left,
        "RIGHT" => TokenKind::Right,
        "JOIN" => TokenKind::Join,
        "ON" => TokenKind::On,
        "AS" => TokenKind::As,
        "BETWEEN" => TokenKind::Between,
        "AND" => TokenKind::And,
        "OR" => TokenKind::Or,
        "XOR" => TokenKind::Xor,
        "NOT" => TokenKind::Not,
        "EXISTS" => TokenKind::Exists,
        _ => return None,
    })
}

/// Character-pointer scanner with one token of lookahead, produced lazily.
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    lookahead: Option<Token>,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            lookahead: None,
        }
    }

    /// Returns true iff there is another token to consume.
    pub fn has_next(&mut self) -> EngineResult<bool> {
        self.fill()?;
        Ok(self.lookahead.is_some())
    }

    /// Consumes and returns the next token. Precondition: `has_next()` was
    /// true; calling this otherwise fails rather than panicking.
    pub fn next_token(&mut self) -> EngineResult<Token> {
        self.fill()?;
        self.lookahead
            .take()
            .ok_or_else(|| EngineError::InvalidSql("unexpected end of input".into()))
    }

    /// Peeks the next token without consuming it.
    pub fn peek(&mut self) -> EngineResult<Option<&Token>> {
        self.fill()?;
        Ok(self.lookahead.as_ref())
    }

    fn fill(&mut self) -> EngineResult<()> {
        if self.lookahead.is_some() {
            return Ok(());
        }
        self.skip_trivia();
        if self.pos >= self.chars.len() {
            return Ok(());
        }
        self.lookahead = Some(self.scan_one()?);
        Ok(())
    }

    fn skip_trivia(&mut self) {
        loop {
            while matches!(self.chars.get(self.pos), Some(c) if c.is_whitespace()) {
                self.pos += 1;
            }
            if self.chars.get(self.pos) == Some(&'-') && self.chars.get(self.pos + 1) == Some(&'-')
            {
                while self.chars.get(self.pos).is_some_and(|c| *c != '\n') {
                    self.pos += 1;
                }
                continue;
            }
            break;
        }
    }

    fn scan_one(&mut self) -> EngineResult<Token> {
        let start = self.pos;
        let c = self.chars[self.pos];

        if c == '_' || c.is_alphabetic() {
            return Ok(self.scan_identifier(start));
        }
        if c.is_ascii_digit() {
            return Ok(self.scan_numeric(start));
        }
        match c {
            '\'' => self.scan_character_literal(start, '\''),
            '"' => Ok(self.scan_delimited_identifier(start, '"')),
            '[' => Ok(self.scan_bracketed_identifier(start)),
            '(' => {
                self.pos += 1;
                Ok(Token::new(TokenKind::LParen, "(", start))
            }
            ')' => {
                self.pos += 1;
                Ok(Token::new(TokenKind::RParen, ")", start))
            }
            ',' => {
                self.pos += 1;
                Ok(Token::new(TokenKind::Comma, ",", start))
            }
            '.' => {
                self.pos += 1;
                Ok(Token::new(TokenKind::Period, ".", start))
            }
            ';' => {
                self.pos += 1;
                Ok(Token::new(TokenKind::Semicolon, ";", start))
            }
            '*' => {
                self.pos += 1;
                Ok(Token::new(TokenKind::Asterisk, "*", start))
            }
            '=' => {
                self.pos += 1;
                Ok(Token::new(TokenKind::Equals, "=", start))
            }
            '<' => {
                self.pos += 1;
                if self.chars.get(self.pos) == Some(&'>') {
                    self.pos += 1;
                    Ok(Token::new(TokenKind::NotEquals, "<>", start))
                } else {
                    Ok(Token::new(TokenKind::Less, "<", start))
                }
            }
            '>' => {
                self.pos += 1;
                Ok(Token::new(TokenKind::More, ">", start))
            }
            '!' => {
                self.pos += 1;
                if self.chars.get(self.pos) == Some(&'=') {
                    self.pos += 1;
                    Ok(Token::new(TokenKind::NotEquals2, "!=", start))
                } else {
                    Err(EngineError::InvalidSql(format!(
                        "unexpected character '!' at position {start}"
                    )))
                }
            }
            other => Err(EngineError::InvalidSql(format!(
                "unexpected character '{other}' at position {start}"
            ))),
        }
    }

    fn scan_identifier(&mut self, start: usize) -> Token {
        while matches!(self.chars.get(self.pos), Some(c) if c.is_alphanumeric() || *c == '_') {
            self.pos += 1;
        }
        let lexeme: String = self.chars[start..self.pos].iter().collect();
        match keyword_kind(&lexeme) {
            Some(kind) => Token::new(kind, lexeme, start),
            None => Token::new(TokenKind::Identifier, lexeme, start),
        }
    }

    fn scan_numeric(&mut self, start: usize) -> Token {
        while matches!(self.chars.get(self.pos), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.chars.get(self.pos) == Some(&'.')
            && matches!(self.chars.get(self.pos + 1), Some(c) if c.is_ascii_digit())
        {
            self.pos += 1;
            while matches!(self.chars.get(self.pos), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.chars.get(self.pos), Some('e') | Some('E')) {
            let mut lookahead = self.pos + 1;
            if matches!(self.chars.get(lookahead), Some('+') | Some('-')) {
                lookahead += 1;
            }
            if matches!(self.chars.get(lookahead), Some(c) if c.is_ascii_digit()) {
                self.pos = lookahead;
                while matches!(self.chars.get(self.pos), Some(c) if c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }
        let lexeme: String = self.chars[start..self.pos].iter().collect();
        Token::new(TokenKind::Numeric, lexeme, start)
    }

    fn scan_character_literal(&mut self, start: usize, quote: char) -> EngineResult<Token> {
        self.pos += 1; // consume opening quote
        let mut lexeme = String::new();
        loop {
            match self.chars.get(self.pos) {
                None => {
                    return Err(EngineError::InvalidSql(format!(
                        "unterminated string literal starting at position {start}"
                    )))
                }
                Some(c) if *c == quote => {
                    if self.chars.get(self.pos + 1) == Some(&quote) {
                        lexeme.push(quote);
                        self.pos += 2;
                    } else {
                        self.pos += 1;
                        break;
                    }
                }
                Some(c) => {
                    lexeme.push(*c);
                    self.pos += 1;
                }
            }
        }
        Ok(Token::new(TokenKind::Character, lexeme, start))
    }

    fn scan_delimited_identifier(&mut self, start: usize, quote: char) -> Token {
        self.pos += 1;
        let mut lexeme = String::new();
        loop {
            match self.chars.get(self.pos) {
                None => break,
                Some(c) if *c == quote => {
                    if self.chars.get(self.pos + 1) == Some(&quote) {
                        lexeme.push(quote);
                        self.pos += 2;
                    } else {
                        self.pos += 1;
                        break;
                    }
                }
                Some(c) => {
                    lexeme.push(*c);
                    self.pos += 1;
                }
            }
        }
        let mut token = Token::new(TokenKind::Identifier, lexeme, start);
        token.delimited = true;
        token
    }

    fn scan_bracketed_identifier(&mut self, start: usize) -> Token {
        self.pos += 1; // consume '['
        let mut lexeme = String::new();
        loop {
            match self.chars.get(self.pos) {
                None => break,
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some(c) => {
                    lexeme.push(*c);
                    self.pos += 1;
                }
            }
        }
        let mut token = Token::new(TokenKind::Identifier, lexeme, start);
        token.delimited = true;
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(sql: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(sql);
        let mut out = Vec::new();
        while scanner.has_next().unwrap() {
            out.push(scanner.next_token().unwrap().kind);
        }
        out
    }

    #[test]
    fn scans_simple_select() {
        assert_eq!(
            kinds("SELECT * FROM t"),
            vec![
                TokenKind::Select,
                TokenKind::Asterisk,
                TokenKind::From,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert_eq!(kinds("select"), vec![TokenKind::Select]);
        assert_eq!(kinds("SeLeCt"), vec![TokenKind::Select]);
    }

    #[test]
    fn operators_classify_correctly() {
        assert_eq!(
            kinds("= <> != < >"),
            vec![
                TokenKind::Equals,
                TokenKind::NotEquals,
                TokenKind::NotEquals2,
                TokenKind::Less,
                TokenKind::More,
            ]
        );
    }

    #[test]
    fn character_literal_strips_quotes_and_unescapes() {
        let mut scanner = Scanner::new("'it''s here'");
        let token = scanner.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::Character);
        assert_eq!(token.lexeme, "it's here");
    }

    #[test]
    fn delimited_identifier_preserves_case_and_suppresses_keywords() {
        let mut scanner = Scanner::new("\"Select\"");
        let token = scanner.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.lexeme, "Select");
        assert!(token.delimited);
    }

    #[test]
    fn bracketed_identifier_is_delimited() {
        let mut scanner = Scanner::new("[Area Code]");
        let token = scanner.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.lexeme, "Area Code");
        assert!(token.delimited);
    }

    #[test]
    fn numeric_literal_supports_fraction_and_exponent() {
        let mut scanner = Scanner::new("3.14e-2");
        let token = scanner.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::Numeric);
        assert_eq!(token.lexeme, "3.14e-2");
    }

    #[test]
    fn line_comment_is_skipped() {
        assert_eq!(
            kinds("SELECT * -- trailing comment\nFROM t"),
            vec![
                TokenKind::Select,
                TokenKind::Asterisk,
                TokenKind::From,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_invalid_sql() {
        let mut scanner = Scanner::new("'unterminated");
        assert!(scanner.next_token().is_err());
    }

    #[test]
    fn unexpected_character_is_invalid_sql() {
        let mut scanner = Scanner::new("@");
        assert!(scanner.next_token().is_err());
    }

    #[test]
    fn has_next_is_false_at_end_of_input() {
        let mut scanner = Scanner::new("   ");
        assert!(!scanner.has_next().unwrap());
    }
}
