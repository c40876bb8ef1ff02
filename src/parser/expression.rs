//! Precedence-climbing (Pratt) expression parsing.

use super::common::describe;
use super::lexer::TokenKind;
use super::statement::{AggregateFunction, BinaryOperator, Expression, FunctionCall, UnaryOperator};
use super::Parser;

/// Binding power, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Precedence {
    Lowest,
    Or,
    And,
    Not,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

impl Precedence {
    const fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Or => Self::Or,
            TokenKind::And => Self::And,
            TokenKind::Eq | TokenKind::NotEq => Self::Equals,
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => Self::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Self::Sum,
            TokenKind::Asterisk | TokenKind::Slash => Self::Product,
            TokenKind::LParen => Self::Call,
            _ => Self::Lowest,
        }
    }
}

const fn infix_operator(kind: TokenKind) -> Option<BinaryOperator> {
    match kind {
        TokenKind::Or => Some(BinaryOperator::Or),
        TokenKind::And => Some(BinaryOperator::And),
        TokenKind::Eq => Some(BinaryOperator::Eq),
        TokenKind::NotEq => Some(BinaryOperator::NotEq),
        TokenKind::Lt => Some(BinaryOperator::Lt),
        TokenKind::Gt => Some(BinaryOperator::Gt),
        TokenKind::LtEq => Some(BinaryOperator::LtEq),
        TokenKind::GtEq => Some(BinaryOperator::GtEq),
        TokenKind::Plus => Some(BinaryOperator::Plus),
        TokenKind::Minus => Some(BinaryOperator::Minus),
        TokenKind::Asterisk => Some(BinaryOperator::Multiply),
        TokenKind::Slash => Some(BinaryOperator::Divide),
        _ => None,
    }
}

impl Parser {
    /// Parses an expression starting at the current token. On return the
    /// current token is the last token of the expression.
    pub(super) fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_token_is(TokenKind::Semicolon)
            && precedence < Precedence::of(self.peek_token.kind)
        {
            // Anything that is not a binary operator ends the expression here.
            let Some(op) = infix_operator(self.peek_token.kind) else {
                return Some(left);
            };
            self.next_token();
            left = self.parse_infix(left, op)?;
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.cur_token.kind {
            TokenKind::Int => match self.cur_token.literal.parse::<i64>() {
                Ok(v) => Some(Expression::Integer(v)),
                Err(_) => {
                    let msg = format!("could not parse '{}' as integer", self.cur_token.literal);
                    self.add_error(&msg);
                    None
                }
            },
            TokenKind::Float => match self.cur_token.literal.parse::<f64>() {
                Ok(v) => Some(Expression::Float(v)),
                Err(_) => {
                    let msg = format!("could not parse '{}' as float", self.cur_token.literal);
                    self.add_error(&msg);
                    None
                }
            },
            TokenKind::String => Some(Expression::String(self.cur_token.literal.clone())),
            TokenKind::True => Some(Expression::Boolean(true)),
            TokenKind::False => Some(Expression::Boolean(false)),
            TokenKind::Null => Some(Expression::Null),
            TokenKind::Not => {
                self.next_token();
                let operand = self.parse_expression(Precedence::Not)?;
                Some(Expression::Unary {
                    op: UnaryOperator::Not,
                    operand: Box::new(operand),
                })
            }
            TokenKind::Minus => {
                self.next_token();
                let operand = self.parse_expression(Precedence::Prefix)?;
                Some(Expression::Unary {
                    op: UnaryOperator::Minus,
                    operand: Box::new(operand),
                })
            }
            TokenKind::LParen => {
                self.next_token();
                let expr = self.parse_expression(Precedence::Lowest)?;
                self.expect_peek(TokenKind::RParen)?;
                Some(expr)
            }
            TokenKind::Count => self.parse_function_call(AggregateFunction::Count),
            TokenKind::Sum => self.parse_function_call(AggregateFunction::Sum),
            TokenKind::Avg => self.parse_function_call(AggregateFunction::Avg),
            TokenKind::Min => self.parse_function_call(AggregateFunction::Min),
            TokenKind::Max => self.parse_function_call(AggregateFunction::Max),
            TokenKind::Ident => Some(Expression::Identifier(self.cur_token.literal.clone())),
            other => {
                let found = describe(other, &self.cur_token.literal);
                self.add_error(&format!("no prefix parse function for {found}"));
                None
            }
        }
    }

    fn parse_infix(&mut self, left: Expression, op: BinaryOperator) -> Option<Expression> {
        let precedence = Precedence::of(self.cur_token.kind);
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    /// `FUNC ( [DISTINCT] * | expr, ... )`
    fn parse_function_call(&mut self, func: AggregateFunction) -> Option<Expression> {
        self.expect_peek(TokenKind::LParen)?;
        self.next_token();

        let mut distinct = false;
        if self.cur_token_is(TokenKind::Distinct) {
            distinct = true;
            self.next_token();
        }

        let args = if self.cur_token_is(TokenKind::Asterisk) {
            vec![Expression::Wildcard]
        } else if self.cur_token_is(TokenKind::RParen) {
            // empty argument list; already positioned on ')'
            return Some(Expression::Function(FunctionCall {
                func,
                distinct,
                args: Vec::new(),
            }));
        } else {
            self.parse_expression_list()?
        };

        self.expect_peek(TokenKind::RParen)?;
        Some(Expression::Function(FunctionCall { func, distinct, args }))
    }

    /// Comma-separated expressions starting at the current token. Leaves the
    /// current token on the last token of the final expression.
    pub(super) fn parse_expression_list(&mut self) -> Option<Vec<Expression>> {
        let mut exprs = vec![self.parse_expression(Precedence::Lowest)?];
        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            exprs.push(self.parse_expression(Precedence::Lowest)?);
        }
        Some(exprs)
    }
}
