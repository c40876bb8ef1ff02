use super::lexer::TokenKind;
use super::statement::{ColumnDefinition, Statement};
use super::Parser;

impl Parser {
    /// `CREATE TABLE name ( col TYPE [NOT NULL], ... )`
    pub(super) fn parse_create_table(&mut self) -> Option<Statement> {
        self.expect_peek(TokenKind::Table)?;
        self.next_token();
        let name = self.expect_cur_ident("table name")?;

        self.expect_peek(TokenKind::LParen)?;
        let columns = self.parse_column_definitions()?;
        self.expect_peek(TokenKind::RParen)?;

        Some(Statement::CreateTable { name, columns })
    }

    /// `DROP TABLE [IF EXISTS] name`
    pub(super) fn parse_drop_table(&mut self) -> Option<Statement> {
        self.expect_peek(TokenKind::Table)?;

        let mut if_exists = false;
        if self.peek_token_is(TokenKind::If) {
            self.next_token();
            self.expect_peek(TokenKind::Exists)?;
            if_exists = true;
        }

        self.next_token();
        let name = self.expect_cur_ident("table name")?;
        Some(Statement::DropTable { name, if_exists })
    }

    /// Entered with the current token on `(`; leaves it on the last token
    /// of the final definition.
    fn parse_column_definitions(&mut self) -> Option<Vec<ColumnDefinition>> {
        let mut defs = Vec::new();
        self.next_token();

        while !self.cur_token_is(TokenKind::RParen) && !self.cur_token_is(TokenKind::Eof) {
            let name = self.expect_cur_ident("column name")?;
            self.next_token();
            let data_type = self.parse_data_type();

            let mut nullable = true;
            if self.peek_token_is(TokenKind::Not) {
                self.next_token();
                self.expect_peek(TokenKind::Null)?;
                nullable = false;
            }

            defs.push(ColumnDefinition {
                name,
                data_type,
                nullable,
            });

            if !self.peek_token_is(TokenKind::Comma) {
                break;
            }
            self.next_token();
            self.next_token();
        }

        if defs.is_empty() {
            self.add_error("expected at least one column definition");
            return None;
        }
        Some(defs)
    }

    /// Canonical type name for the current token; unknown names pass
    /// through upper-cased for the executor to resolve.
    fn parse_data_type(&self) -> String {
        match self.cur_token.kind {
            TokenKind::TypeInt64 => "INT64".to_string(),
            TokenKind::TypeFloat64 => "FLOAT64".to_string(),
            TokenKind::TypeString => "STRING".to_string(),
            TokenKind::TypeBool => "BOOL".to_string(),
            TokenKind::TypeTimestamp => "TIMESTAMP".to_string(),
            _ => self.cur_token.literal.to_uppercase(),
        }
    }
}
