use crate::error::{DiagnosticBag, TextSpan};
use crate::source::SourceText;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Trivia and special
    BadToken,
    EndOfFile,
    Whitespace,
    Comment,

    // Literals
    Number,
    String,
    Identifier,

    // Single-character tokens
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Colon,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AmpersandAmpersand,
    PipePipe,

    // Keywords
    Else,
    False,
    For,
    If,
    Let,
    To,
    True,
    Var,
    While,
}

impl TokenType {
    /// Every token type, in declaration order.
    pub const ALL: &'static [TokenType] = &[
        TokenType::BadToken,
        TokenType::EndOfFile,
        TokenType::Whitespace,
        TokenType::Comment,
        TokenType::Number,
        TokenType::String,
        TokenType::Identifier,
        TokenType::Plus,
        TokenType::Minus,
        TokenType::Star,
        TokenType::Slash,
        TokenType::Percent,
        TokenType::LeftParen,
        TokenType::RightParen,
        TokenType::LeftBrace,
        TokenType::RightBrace,
        TokenType::Comma,
        TokenType::Colon,
        TokenType::Bang,
        TokenType::BangEqual,
        TokenType::Equal,
        TokenType::EqualEqual,
        TokenType::Less,
        TokenType::LessEqual,
        TokenType::Greater,
        TokenType::GreaterEqual,
        TokenType::AmpersandAmpersand,
        TokenType::PipePipe,
        TokenType::Else,
        TokenType::False,
        TokenType::For,
        TokenType::If,
        TokenType::Let,
        TokenType::To,
        TokenType::True,
        TokenType::Var,
        TokenType::While,
    ];

    /// The canonical text of tokens that always look the same.
    pub fn fixed_text(self) -> Option<&'static str> {
        let text = match self {
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Star => "*",
            TokenType::Slash => "/",
            TokenType::Percent => "%",
            TokenType::LeftParen => "(",
            TokenType::RightParen => ")",
            TokenType::LeftBrace => "{",
            TokenType::RightBrace => "}",
            TokenType::Comma => ",",
            TokenType::Colon => ":",
            TokenType::Bang => "!",
            TokenType::BangEqual => "!=",
            TokenType::Equal => "=",
            TokenType::EqualEqual => "==",
            TokenType::Less => "<",
            TokenType::LessEqual => "<=",
            TokenType::Greater => ">",
            TokenType::GreaterEqual => ">=",
            TokenType::AmpersandAmpersand => "&&",
            TokenType::PipePipe => "||",
            TokenType::Else => "else",
            TokenType::False => "false",
            TokenType::For => "for",
            TokenType::If => "if",
            TokenType::Let => "let",
            TokenType::To => "to",
            TokenType::True => "true",
            TokenType::Var => "var",
            TokenType::While => "while",
            _ => return None,
        };
        Some(text)
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenType::Else
                | TokenType::False
                | TokenType::For
                | TokenType::If
                | TokenType::Let
                | TokenType::To
                | TokenType::True
                | TokenType::Var
                | TokenType::While
        )
    }

    /// Tokens dropped before parsing.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenType::Whitespace | TokenType::Comment | TokenType::BadToken
        )
    }

    /// Binding power of a prefix operator, 0 when the token isn't one.
    pub fn unary_precedence(self) -> u8 {
        match self {
            TokenType::Plus | TokenType::Minus | TokenType::Bang => 6,
            _ => 0,
        }
    }

    /// Binding power of an infix operator, 0 when the token isn't one.
    pub fn binary_precedence(self) -> u8 {
        match self {
            TokenType::Star | TokenType::Slash | TokenType::Percent => 5,
            TokenType::Plus | TokenType::Minus => 4,
            TokenType::EqualEqual
            | TokenType::BangEqual
            | TokenType::Less
            | TokenType::LessEqual
            | TokenType::Greater
            | TokenType::GreaterEqual => 3,
            TokenType::AmpersandAmpersand => 2,
            TokenType::PipePipe => 1,
            _ => 0,
        }
    }

    pub fn binary_operators() -> impl Iterator<Item = TokenType> {
        Self::ALL
            .iter()
            .copied()
            .filter(|kind| kind.binary_precedence() > 0)
    }

    pub fn unary_operators() -> impl Iterator<Item = TokenType> {
        Self::ALL
            .iter()
            .copied()
            .filter(|kind| kind.unary_precedence() > 0)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub span: TextSpan,
    pub text: String,
    pub value: Option<Value>,
}

impl Token {
    pub fn new(token_type: TokenType, span: TextSpan, text: String, value: Option<Value>) -> Self {
        Self {
            token_type,
            span,
            text,
            value,
        }
    }

    /// A zero-width token the parser put in place of one the source lacks.
    pub fn missing(token_type: TokenType, position: usize) -> Self {
        Self::new(token_type, TextSpan::new(position, 0), String::new(), None)
    }

    pub fn is_missing(&self) -> bool {
        self.text.is_empty() && self.token_type != TokenType::EndOfFile
    }
}

/// Turns source text into tokens on demand. Once the end of the input is
/// reached every further call returns another end-of-file token.
pub struct Lexer<'a> {
    source: &'a SourceText,
    start: usize,
    current: usize,
    keywords: HashMap<&'static str, TokenType>,
    diagnostics: DiagnosticBag,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a SourceText) -> Self {
        let keywords = TokenType::ALL
            .iter()
            .filter(|kind| kind.is_keyword())
            .filter_map(|kind| kind.fixed_text().map(|text| (text, *kind)))
            .collect();

        Self {
            source,
            start: 0,
            current: 0,
            keywords,
            diagnostics: DiagnosticBag::new(),
            finished: false,
        }
    }

    pub fn diagnostics(&self) -> &DiagnosticBag {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> DiagnosticBag {
        self.diagnostics
    }

    pub fn next_token(&mut self) -> Token {
        self.start = self.current;
        if self.is_at_end() {
            return self.make_token(TokenType::EndOfFile, None);
        }

        let c = self.advance();
        match c {
            '+' => self.make_token(TokenType::Plus, None),
            '-' => self.make_token(TokenType::Minus, None),
            '*' => self.make_token(TokenType::Star, None),
            '%' => self.make_token(TokenType::Percent, None),
            '(' => self.make_token(TokenType::LeftParen, None),
            ')' => self.make_token(TokenType::RightParen, None),
            '{' => self.make_token(TokenType::LeftBrace, None),
            '}' => self.make_token(TokenType::RightBrace, None),
            ',' => self.make_token(TokenType::Comma, None),
            ':' => self.make_token(TokenType::Colon, None),
            '/' => {
                if self.match_char('/') {
                    // Comment goes until end of line
                    while !self.is_at_end() && self.peek() != '\n' && self.peek() != '\r' {
                        self.advance();
                    }
                    self.make_token(TokenType::Comment, None)
                } else {
                    self.make_token(TokenType::Slash, None)
                }
            }
            '!' => {
                let token_type = if self.match_char('=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                };
                self.make_token(token_type, None)
            }
            '=' => {
                let token_type = if self.match_char('=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                };
                self.make_token(token_type, None)
            }
            '<' => {
                let token_type = if self.match_char('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.make_token(token_type, None)
            }
            '>' => {
                let token_type = if self.match_char('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.make_token(token_type, None)
            }
            '&' if self.match_char('&') => self.make_token(TokenType::AmpersandAmpersand, None),
            '|' if self.match_char('|') => self.make_token(TokenType::PipePipe, None),
            '"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_whitespace() => self.whitespace(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),
            c => {
                self.diagnostics.report_invalid_character(self.start, c);
                self.make_token(TokenType::BadToken, None)
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source.char_at(self.current);
        if !self.is_at_end() {
            self.current += 1;
        }
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.current += 1;
            true
        }
    }

    fn peek(&self) -> char {
        self.source.char_at(self.current)
    }

    fn peek_next(&self) -> char {
        self.source.char_at(self.current + 1)
    }

    fn whitespace(&mut self) -> Token {
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
        self.make_token(TokenType::Whitespace, None)
    }

    fn string(&mut self) -> Token {
        let mut content = String::new();

        loop {
            if self.is_at_end() || self.peek() == '\n' || self.peek() == '\r' {
                let span = TextSpan::from_bounds(self.start, self.current);
                self.diagnostics.report_unterminated_string(span);
                break;
            }

            if self.peek() == '"' {
                if self.peek_next() == '"' {
                    // A doubled quote stands for one quote character
                    content.push('"');
                    self.current += 2;
                    continue;
                }
                self.advance();
                break;
            }

            content.push(self.advance());
        }

        self.make_token(TokenType::String, Some(Value::String(content)))
    }

    fn number(&mut self) -> Token {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let span = TextSpan::from_bounds(self.start, self.current);
        let text = self.source.slice(span);
        let value = match text.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                self.diagnostics.report_invalid_number(span, &text);
                0
            }
        };

        self.make_token(TokenType::Number, Some(Value::Number(value)))
    }

    fn identifier(&mut self) -> Token {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text = self.source.slice(TextSpan::from_bounds(self.start, self.current));
        match self.keywords.get(text.as_str()).copied() {
            Some(TokenType::True) => self.make_token(TokenType::True, Some(Value::Bool(true))),
            Some(TokenType::False) => self.make_token(TokenType::False, Some(Value::Bool(false))),
            Some(keyword) => self.make_token(keyword, None),
            None => self.make_token(TokenType::Identifier, None),
        }
    }

    fn make_token(&mut self, token_type: TokenType, value: Option<Value>) -> Token {
        let span = TextSpan::from_bounds(self.start, self.current);
        Token::new(token_type, span, self.source.slice(span), value)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.token_type == TokenType::EndOfFile {
            self.finished = true;
        }
        Some(token)
    }
}
