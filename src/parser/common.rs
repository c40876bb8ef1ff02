use super::lexer::TokenKind;
use super::Parser;

impl Parser {
    pub(super) fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.cur_token = std::mem::replace(&mut self.peek_token, next);
    }

    pub(super) fn cur_token_is(&self, kind: TokenKind) -> bool {
        self.cur_token.kind == kind
    }

    pub(super) fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek_token.kind == kind
    }

    /// Advances if the peek token has the expected kind, otherwise records
    /// an error against the peek token's line.
    pub(super) fn expect_peek(&mut self, kind: TokenKind) -> Option<()> {
        if self.peek_token_is(kind) {
            self.next_token();
            Some(())
        } else {
            let message = format!(
                "line {}: expected {}, got {}",
                self.peek_token.line,
                kind,
                describe(self.peek_token.kind, &self.peek_token.literal)
            );
            self.errors.push(message);
            None
        }
    }

    pub(super) fn add_error(&mut self, msg: &str) {
        let message = format!("line {}: {}", self.cur_token.line, msg);
        self.errors.push(message);
    }

    /// Returns the current token's literal if it is an identifier.
    pub(super) fn expect_cur_ident(&mut self, what: &str) -> Option<String> {
        if self.cur_token_is(TokenKind::Ident) {
            Some(self.cur_token.literal.clone())
        } else {
            let found = describe(self.cur_token.kind, &self.cur_token.literal);
            self.add_error(&format!("expected {what}, got {found}"));
            None
        }
    }

    /// Parses the current token as a non-negative count (LIMIT/OFFSET).
    pub(super) fn expect_cur_count(&mut self, clause: &str) -> Option<usize> {
        if self.cur_token_is(TokenKind::Int) {
            if let Ok(n) = self.cur_token.literal.parse::<usize>() {
                return Some(n);
            }
        }
        let found = describe(self.cur_token.kind, &self.cur_token.literal);
        self.add_error(&format!("expected non-negative integer after {clause}, got {found}"));
        None
    }
}

/// Human-readable token description for error messages.
pub(super) fn describe(kind: TokenKind, literal: &str) -> String {
    match kind {
        TokenKind::Ident | TokenKind::Int | TokenKind::Float | TokenKind::Illegal => {
            format!("{kind} '{literal}'")
        }
        TokenKind::String => format!("string '{literal}'"),
        _ => kind.to_string(),
    }
}
