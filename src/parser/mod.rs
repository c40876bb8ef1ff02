// Module declarations
pub mod lexer;
mod statement;
mod common;
mod expression;
mod ddl;
mod dml;
mod queries;

pub use lexer::{Lexer, Token, TokenKind};
pub use statement::{
    Statement,
    ColumnDefinition,
    SelectColumn,
    OrderByClause,
    SortOrder,
    Expression,
    FunctionCall,
    AggregateFunction,
    UnaryOperator,
    BinaryOperator,
};

use common::describe;

/// SQL parser over a token stream. Parses one statement per call to
/// [`Parser::parse`] and accumulates line-tagged error messages.
pub struct Parser {
    lexer: Lexer,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<String>,
}

impl Parser {
    #[must_use]
    pub fn new(mut lexer: Lexer) -> Self {
        let cur_token = lexer.next_token();
        let peek_token = lexer.next_token();
        Self {
            lexer,
            cur_token,
            peek_token,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Parses one statement. The first unmet expectation aborts the parse
    /// and returns `None`; [`Parser::errors`] then holds the messages.
    pub fn parse(&mut self) -> Option<Statement> {
        let stmt = match self.cur_token.kind {
            TokenKind::Select => self.parse_select(),
            TokenKind::Insert => self.parse_insert(),
            TokenKind::Create => self.parse_create_table(),
            TokenKind::Drop => self.parse_drop_table(),
            other => {
                let found = describe(other, &self.cur_token.literal);
                self.add_error(&format!("unexpected token: {found}"));
                None
            }
        }?;

        // trailing semicolon is optional
        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
        if !self.peek_token_is(TokenKind::Eof) {
            self.next_token();
            let found = describe(self.cur_token.kind, &self.cur_token.literal);
            self.add_error(&format!("unexpected token after statement: {found}"));
            return None;
        }

        Some(stmt)
    }
}

/// Parses a single SQL statement, returning every accumulated parse error
/// on failure.
pub fn parse_statement(sql: &str) -> Result<Statement, Vec<String>> {
    let mut parser = Parser::new(Lexer::new(sql));
    match parser.parse() {
        Some(stmt) if parser.errors.is_empty() => Ok(stmt),
        _ => Err(parser.errors),
    }
}
