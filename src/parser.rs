use crate::ast::{CompilationUnit, ElseClause, Expr, Stmt, SyntaxTree, TypeClause};
use crate::error::DiagnosticBag;
use crate::lexer::{Lexer, Token, TokenType};
use crate::source::SourceText;
use crate::value::Value;

/// Recursive-descent parser over a pre-filtered token list. Never fails: a
/// token the grammar requires but the input lacks is reported and replaced
/// by a zero-width token, so callers always get a complete tree.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    diagnostics: DiagnosticBag,
}

impl Parser {
    pub fn new(source: &SourceText) -> Self {
        let mut lexer = Lexer::new(source);
        let tokens: Vec<Token> = lexer
            .by_ref()
            .filter(|token| !token.token_type.is_trivia())
            .collect();

        Self {
            tokens,
            current: 0,
            diagnostics: lexer.into_diagnostics(),
        }
    }

    pub fn into_diagnostics(self) -> DiagnosticBag {
        self.diagnostics
    }

    pub fn parse_compilation_unit(&mut self) -> CompilationUnit {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            let start = self.current;
            statements.push(self.statement());

            // A statement that consumed nothing would loop forever
            if self.current == start {
                self.advance();
            }
        }

        let end_of_file = self.consume(TokenType::EndOfFile);
        CompilationUnit {
            statements,
            end_of_file,
        }
    }

    fn statement(&mut self) -> Stmt {
        match self.peek().token_type {
            TokenType::LeftBrace => self.block_statement(),
            TokenType::Var | TokenType::Let => self.variable_declaration(),
            TokenType::If => self.if_statement(),
            TokenType::While => self.while_statement(),
            TokenType::For => self.for_statement(),
            _ => Stmt::Expression {
                expression: self.expression(),
            },
        }
    }

    fn block_statement(&mut self) -> Stmt {
        let open_brace = self.consume(TokenType::LeftBrace);
        let mut statements = Vec::new();

        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            let start = self.current;
            statements.push(self.statement());

            if self.current == start {
                self.advance();
            }
        }

        let close_brace = self.consume(TokenType::RightBrace);
        Stmt::Block {
            open_brace,
            statements,
            close_brace,
        }
    }

    fn variable_declaration(&mut self) -> Stmt {
        let expected = if self.check(TokenType::Let) {
            TokenType::Let
        } else {
            TokenType::Var
        };
        let keyword = self.consume(expected);
        let identifier = self.consume(TokenType::Identifier);
        let type_clause = if self.check(TokenType::Colon) {
            let colon = self.consume(TokenType::Colon);
            let identifier = self.consume(TokenType::Identifier);
            Some(TypeClause { colon, identifier })
        } else {
            None
        };
        let equals = self.consume(TokenType::Equal);
        let initializer = self.expression();

        Stmt::VariableDeclaration {
            keyword,
            identifier,
            type_clause,
            equals,
            initializer,
        }
    }

    fn if_statement(&mut self) -> Stmt {
        let if_keyword = self.consume(TokenType::If);
        let condition = self.expression();
        let then_statement = Box::new(self.statement());
        let else_clause = if self.check(TokenType::Else) {
            let else_keyword = self.consume(TokenType::Else);
            let statement = Box::new(self.statement());
            Some(ElseClause {
                else_keyword,
                statement,
            })
        } else {
            None
        };

        Stmt::If {
            if_keyword,
            condition,
            then_statement,
            else_clause,
        }
    }

    fn while_statement(&mut self) -> Stmt {
        let while_keyword = self.consume(TokenType::While);
        let condition = self.expression();
        let body = Box::new(self.statement());

        Stmt::While {
            while_keyword,
            condition,
            body,
        }
    }

    fn for_statement(&mut self) -> Stmt {
        let for_keyword = self.consume(TokenType::For);
        let identifier = self.consume(TokenType::Identifier);
        let equals = self.consume(TokenType::Equal);
        let lower_bound = self.expression();
        let to_keyword = self.consume(TokenType::To);
        let upper_bound = self.expression();
        let body = Box::new(self.statement());

        Stmt::For {
            for_keyword,
            identifier,
            equals,
            lower_bound,
            to_keyword,
            upper_bound,
            body,
        }
    }

    fn expression(&mut self) -> Expr {
        self.assignment()
    }

    fn assignment(&mut self) -> Expr {
        if self.check(TokenType::Identifier) && self.peek_at(1).token_type == TokenType::Equal {
            let identifier = self.advance();
            let equals = self.advance();
            // Right-associative: a = b = c assigns c to b, then b to a
            let expression = Box::new(self.assignment());
            return Expr::Assignment {
                identifier,
                equals,
                expression,
            };
        }

        self.binary(0)
    }

    /// Precedence climbing. Operators binding no tighter than
    /// `parent_precedence` are left for the caller, which makes equal
    /// precedence left-associative.
    fn binary(&mut self, parent_precedence: u8) -> Expr {
        let unary_precedence = self.peek().token_type.unary_precedence();
        let mut left = if unary_precedence != 0 && unary_precedence >= parent_precedence {
            let operator = self.advance();
            let operand = Box::new(self.binary(unary_precedence));
            Expr::Unary { operator, operand }
        } else {
            self.primary()
        };

        loop {
            let precedence = self.peek().token_type.binary_precedence();
            if precedence == 0 || precedence <= parent_precedence {
                break;
            }

            let operator = self.advance();
            let right = Box::new(self.binary(precedence));
            left = Expr::Binary {
                left: Box::new(left),
                operator,
                right,
            };
        }

        left
    }

    fn primary(&mut self) -> Expr {
        match self.peek().token_type {
            TokenType::LeftParen => {
                let open_paren = self.consume(TokenType::LeftParen);
                let expression = Box::new(self.expression());
                let close_paren = self.consume(TokenType::RightParen);
                Expr::Parenthesized {
                    open_paren,
                    expression,
                    close_paren,
                }
            }
            TokenType::True | TokenType::False => {
                let token = self.advance();
                let value = Value::Bool(token.token_type == TokenType::True);
                Expr::Literal { token, value }
            }
            TokenType::String => {
                let token = self.advance();
                let value = token
                    .value
                    .clone()
                    .unwrap_or_else(|| Value::String(String::new()));
                Expr::Literal { token, value }
            }
            TokenType::Identifier if self.peek_at(1).token_type == TokenType::LeftParen => self.call(),
            TokenType::Identifier => Expr::Name {
                identifier: self.advance(),
            },
            _ => self.number_literal(),
        }
    }

    fn number_literal(&mut self) -> Expr {
        let token = self.consume(TokenType::Number);
        let value = token.value.clone().unwrap_or(Value::Number(0));
        Expr::Literal { token, value }
    }

    fn call(&mut self) -> Expr {
        let identifier = self.consume(TokenType::Identifier);
        let open_paren = self.consume(TokenType::LeftParen);

        let mut arguments = Vec::new();
        if !self.check(TokenType::RightParen) && !self.is_at_end() {
            loop {
                arguments.push(self.expression());
                if self.check(TokenType::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        let close_paren = self.consume(TokenType::RightParen);
        Expr::Call {
            identifier,
            open_paren,
            arguments,
            close_paren,
        }
    }

    fn check(&self, token_type: TokenType) -> bool {
        self.peek().token_type == token_type
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::EndOfFile
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// Looking past the end yields the end-of-file token.
    fn peek_at(&self, offset: usize) -> &Token {
        let index = (self.current + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn consume(&mut self, token_type: TokenType) -> Token {
        if self.check(token_type) {
            return self.advance();
        }

        let current = self.peek();
        let span = current.span;
        let actual = current.token_type;
        self.diagnostics
            .report_unexpected_token(span, &actual.to_string(), &token_type.to_string());
        Token::missing(token_type, span.start)
    }
}

impl SyntaxTree {
    pub fn parse(text: &str) -> SyntaxTree {
        let source = SourceText::new(text);
        let mut parser = Parser::new(&source);
        let root = parser.parse_compilation_unit();
        let diagnostics = parser.into_diagnostics();

        tracing::debug!(
            statements = root.statements.len(),
            diagnostics = diagnostics.len(),
            "parsed syntax tree"
        );

        SyntaxTree {
            source,
            root,
            diagnostics,
        }
    }

    /// Every token of `text` including trivia, without the end-of-file token.
    pub fn parse_tokens(text: &str) -> (Vec<Token>, DiagnosticBag) {
        let source = SourceText::new(text);
        let mut lexer = Lexer::new(&source);
        let tokens = lexer
            .by_ref()
            .filter(|token| token.token_type != TokenType::EndOfFile)
            .collect();
        (tokens, lexer.into_diagnostics())
    }
}
