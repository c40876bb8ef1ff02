//! Lexical analysis for the SQL surface.
//!
//! The lexer never fails: unknown characters become `Illegal` tokens and an
//! unterminated string literal simply runs to the end of input. Grammar
//! problems are reported later by the parser.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,

    // Literals
    Ident,
    Int,
    Float,
    String,

    // Operators
    Asterisk,
    Plus,
    Minus,
    Slash,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    // Delimiters
    Comma,
    Semicolon,
    LParen,
    RParen,

    // Keywords
    Select,
    From,
    Insert,
    Into,
    Values,
    Create,
    Table,
    Drop,
    Where,
    Order,
    By,
    Asc,
    Desc,
    Limit,
    Offset,
    Distinct,
    As,
    And,
    Or,
    Not,
    Null,
    True,
    False,
    If,
    Exists,

    // Aggregate functions
    Count,
    Sum,
    Avg,
    Min,
    Max,

    // Type names
    TypeInt64,
    TypeFloat64,
    TypeString,
    TypeBool,
    TypeTimestamp,
}

impl TokenKind {
    /// Case-insensitive keyword lookup; anything else is an identifier.
    #[must_use]
    pub fn lookup_ident(ident: &str) -> Self {
        match ident.to_uppercase().as_str() {
            "SELECT" => Self::Select,
            "FROM" => Self::From,
            "INSERT" => Self::Insert,
            "INTO" => Self::Into,
            "VALUES" => Self::Values,
            "CREATE" => Self::Create,
            "TABLE" => Self::Table,
            "DROP" => Self::Drop,
            "WHERE" => Self::Where,
            "ORDER" => Self::Order,
            "BY" => Self::By,
            "ASC" => Self::Asc,
            "DESC" => Self::Desc,
            "LIMIT" => Self::Limit,
            "OFFSET" => Self::Offset,
            "DISTINCT" => Self::Distinct,
            "AS" => Self::As,
            "AND" => Self::And,
            "OR" => Self::Or,
            "NOT" => Self::Not,
            "NULL" => Self::Null,
            "TRUE" => Self::True,
            "FALSE" => Self::False,
            "IF" => Self::If,
            "EXISTS" => Self::Exists,
            "COUNT" => Self::Count,
            "SUM" => Self::Sum,
            "AVG" => Self::Avg,
            "MIN" => Self::Min,
            "MAX" => Self::Max,
            "INT64" => Self::TypeInt64,
            "FLOAT64" => Self::TypeFloat64,
            "STRING" => Self::TypeString,
            "BOOL" => Self::TypeBool,
            "TIMESTAMP" => Self::TypeTimestamp,
            _ => Self::Ident,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Illegal => "ILLEGAL",
            Self::Eof => "EOF",
            Self::Ident => "IDENT",
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::String => "STRING_LITERAL",
            Self::Asterisk => "*",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Slash => "/",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Select => "SELECT",
            Self::From => "FROM",
            Self::Insert => "INSERT",
            Self::Into => "INTO",
            Self::Values => "VALUES",
            Self::Create => "CREATE",
            Self::Table => "TABLE",
            Self::Drop => "DROP",
            Self::Where => "WHERE",
            Self::Order => "ORDER",
            Self::By => "BY",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
            Self::Limit => "LIMIT",
            Self::Offset => "OFFSET",
            Self::Distinct => "DISTINCT",
            Self::As => "AS",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Null => "NULL",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::If => "IF",
            Self::Exists => "EXISTS",
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::TypeInt64 => "INT64",
            Self::TypeFloat64 => "FLOAT64",
            Self::TypeString => "STRING",
            Self::TypeBool => "BOOL",
            Self::TypeTimestamp => "TIMESTAMP",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexical token with its source position (1-based line and column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub line: usize,
    pub column: usize,
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Returns the next token. Once input is exhausted every call yields `Eof`.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let line = self.line;
        let column = self.column;
        let token = |kind: TokenKind, literal: String| Token {
            kind,
            literal,
            line,
            column,
        };

        let Some(ch) = self.current_char() else {
            return token(TokenKind::Eof, String::new());
        };

        match ch {
            '*' | '+' | '/' | ',' | ';' | '(' | ')' | '=' => {
                self.advance();
                let kind = match ch {
                    '*' => TokenKind::Asterisk,
                    '+' => TokenKind::Plus,
                    '/' => TokenKind::Slash,
                    ',' => TokenKind::Comma,
                    ';' => TokenKind::Semicolon,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    _ => TokenKind::Eq,
                };
                token(kind, ch.to_string())
            }
            '<' => {
                self.advance();
                match self.current_char() {
                    Some('=') => {
                        self.advance();
                        token(TokenKind::LtEq, "<=".to_string())
                    }
                    Some('>') => {
                        self.advance();
                        token(TokenKind::NotEq, "<>".to_string())
                    }
                    _ => token(TokenKind::Lt, "<".to_string()),
                }
            }
            '>' => {
                self.advance();
                if self.current_char() == Some('=') {
                    self.advance();
                    token(TokenKind::GtEq, ">=".to_string())
                } else {
                    token(TokenKind::Gt, ">".to_string())
                }
            }
            '!' => {
                self.advance();
                if self.current_char() == Some('=') {
                    self.advance();
                    token(TokenKind::NotEq, "!=".to_string())
                } else {
                    token(TokenKind::Illegal, "!".to_string())
                }
            }
            '-' => {
                self.advance();
                // A minus glued to a digit is part of a signed numeric literal.
                if self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                    let (literal, is_float) = self.read_number();
                    let kind = if is_float { TokenKind::Float } else { TokenKind::Int };
                    token(kind, format!("-{literal}"))
                } else {
                    token(TokenKind::Minus, "-".to_string())
                }
            }
            '\'' => {
                let literal = self.read_string();
                token(TokenKind::String, literal)
            }
            c if is_letter(c) => {
                let literal = self.read_identifier();
                token(TokenKind::lookup_ident(&literal), literal)
            }
            c if c.is_ascii_digit() => {
                let (literal, is_float) = self.read_number();
                let kind = if is_float { TokenKind::Float } else { TokenKind::Int };
                token(kind, literal)
            }
            other => {
                self.advance();
                token(TokenKind::Illegal, other.to_string())
            }
        }
    }

    // --- Navigation helpers ---

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Skips whitespace and `--` line comments.
    fn skip_whitespace(&mut self) {
        loop {
            while self.current_char().is_some_and(char::is_whitespace) {
                self.advance();
            }
            if self.current_char() == Some('-') && self.peek_char() == Some('-') {
                while self.current_char().is_some_and(|c| c != '\n') {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    // --- Extraction ---

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.current_char() {
            if is_letter(c) || c.is_ascii_digit() {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }

    /// Reads digits, promoting to a float when a `.` is followed by a digit.
    fn read_number(&mut self) -> (String, bool) {
        let mut number = String::new();
        let mut is_float = false;

        self.read_digits(&mut number);
        if self.current_char() == Some('.') && self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            number.push('.');
            self.advance();
            self.read_digits(&mut number);
        }

        (number, is_float)
    }

    fn read_digits(&mut self, out: &mut String) {
        while let Some(c) = self.current_char().filter(char::is_ascii_digit) {
            out.push(c);
            self.advance();
        }
    }

    /// Reads a single-quoted literal, unescaping `''` to `'`.
    fn read_string(&mut self) -> String {
        self.advance(); // opening quote
        let mut literal = String::new();

        while let Some(c) = self.current_char() {
            if c == '\'' {
                if self.peek_char() == Some('\'') {
                    literal.push('\'');
                    self.advance();
                    self.advance();
                    continue;
                }
                self.advance(); // closing quote
                break;
            }
            literal.push(c);
            self.advance();
        }

        literal
    }
}

fn is_letter(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}
