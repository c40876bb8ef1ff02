use super::expression::Precedence;
use super::lexer::TokenKind;
use super::statement::{OrderByClause, SelectColumn, SortOrder, Statement};
use super::Parser;

impl Parser {
    /// `SELECT [DISTINCT] items FROM name [WHERE expr] [ORDER BY ...] [LIMIT n] [OFFSET n]`
    pub(super) fn parse_select(&mut self) -> Option<Statement> {
        self.next_token();

        let mut distinct = false;
        if self.cur_token_is(TokenKind::Distinct) {
            distinct = true;
            self.next_token();
        }

        let columns = self.parse_select_columns()?;

        self.expect_peek(TokenKind::From)?;
        self.next_token();
        let from = self.expect_cur_ident("table name")?;

        let mut filter = None;
        if self.peek_token_is(TokenKind::Where) {
            self.next_token();
            self.next_token();
            filter = Some(self.parse_expression(Precedence::Lowest)?);
        }

        let mut order_by = Vec::new();
        if self.peek_token_is(TokenKind::Order) {
            self.next_token();
            self.expect_peek(TokenKind::By)?;
            order_by = self.parse_order_by()?;
        }

        let mut limit = None;
        if self.peek_token_is(TokenKind::Limit) {
            self.next_token();
            self.next_token();
            limit = Some(self.expect_cur_count("LIMIT")?);
        }

        let mut offset = None;
        if self.peek_token_is(TokenKind::Offset) {
            self.next_token();
            self.next_token();
            offset = Some(self.expect_cur_count("OFFSET")?);
        }

        Some(Statement::Select {
            distinct,
            columns,
            from,
            filter,
            order_by,
            limit,
            offset,
        })
    }

    /// Select-list items. An identifier directly after an expression is
    /// taken as its alias, so `SELECT a b FROM t` is one column named `b`.
    fn parse_select_columns(&mut self) -> Option<Vec<SelectColumn>> {
        let mut columns = Vec::new();

        loop {
            if self.cur_token_is(TokenKind::Asterisk) {
                columns.push(SelectColumn::Wildcard);
            } else {
                let expr = self.parse_expression(Precedence::Lowest)?;
                let mut alias = None;
                if self.peek_token_is(TokenKind::As) {
                    self.next_token();
                    self.next_token();
                    alias = Some(self.expect_cur_ident("alias")?);
                } else if self.peek_token_is(TokenKind::Ident) {
                    self.next_token();
                    alias = Some(self.cur_token.literal.clone());
                }
                columns.push(SelectColumn::Expr { expr, alias });
            }

            if !self.peek_token_is(TokenKind::Comma) {
                break;
            }
            self.next_token();
            self.next_token();
        }

        Some(columns)
    }

    /// Entered with the current token on `BY`.
    fn parse_order_by(&mut self) -> Option<Vec<OrderByClause>> {
        let mut clauses = Vec::new();
        self.next_token();

        loop {
            let column = self.expect_cur_ident("column name in ORDER BY")?;
            let mut order = SortOrder::Asc;
            if self.peek_token_is(TokenKind::Desc) {
                order = SortOrder::Desc;
                self.next_token();
            } else if self.peek_token_is(TokenKind::Asc) {
                self.next_token();
            }
            clauses.push(OrderByClause { column, order });

            if !self.peek_token_is(TokenKind::Comma) {
                break;
            }
            self.next_token();
            self.next_token();
        }

        Some(clauses)
    }
}
