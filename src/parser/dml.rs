use super::lexer::TokenKind;
use super::statement::Statement;
use super::Parser;

impl Parser {
    /// `INSERT INTO name [(col, ...)] VALUES (expr, ...)`
    pub(super) fn parse_insert(&mut self) -> Option<Statement> {
        self.expect_peek(TokenKind::Into)?;
        self.next_token();
        let table = self.expect_cur_ident("table name")?;

        let mut columns = None;
        if self.peek_token_is(TokenKind::LParen) {
            self.next_token();
            columns = Some(self.parse_identifier_list()?);
            self.expect_peek(TokenKind::RParen)?;
        }

        self.expect_peek(TokenKind::Values)?;
        self.expect_peek(TokenKind::LParen)?;

        let values = if self.peek_token_is(TokenKind::RParen) {
            Vec::new()
        } else {
            self.next_token();
            self.parse_expression_list()?
        };
        self.expect_peek(TokenKind::RParen)?;

        Some(Statement::Insert {
            table,
            columns,
            values,
        })
    }

    /// Entered with the current token on `(`; leaves it on the last name.
    fn parse_identifier_list(&mut self) -> Option<Vec<String>> {
        self.next_token();
        let mut idents = vec![self.expect_cur_ident("column name")?];
        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            idents.push(self.expect_cur_ident("column name")?);
        }
        Some(idents)
    }
}
