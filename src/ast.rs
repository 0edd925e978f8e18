use crate::error::{DiagnosticBag, TextSpan};
use crate::lexer::Token;
use crate::source::SourceText;
use crate::value::Value;
use std::fmt;

/// The result of parsing one piece of source text. Always complete, even when
/// `diagnostics` is not empty: missing tokens are synthesized in place.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub source: SourceText,
    pub root: CompilationUnit,
    pub diagnostics: DiagnosticBag,
}

impl SyntaxTree {
    /// False when the source stops in the middle of a statement, which the
    /// REPL takes as a request for another line.
    pub fn is_complete(&self) -> bool {
        match self.root.statements.last() {
            Some(statement) => !statement.last_token().is_missing(),
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub statements: Vec<Stmt>,
    pub end_of_file: Token,
}

#[derive(Debug, Clone)]
pub struct TypeClause {
    pub colon: Token,
    pub identifier: Token,
}

#[derive(Debug, Clone)]
pub struct ElseClause {
    pub else_keyword: Token,
    pub statement: Box<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Block {
        open_brace: Token,
        statements: Vec<Stmt>,
        close_brace: Token,
    },
    VariableDeclaration {
        keyword: Token,
        identifier: Token,
        type_clause: Option<TypeClause>,
        equals: Token,
        initializer: Expr,
    },
    If {
        if_keyword: Token,
        condition: Expr,
        then_statement: Box<Stmt>,
        else_clause: Option<ElseClause>,
    },
    While {
        while_keyword: Token,
        condition: Expr,
        body: Box<Stmt>,
    },
    For {
        for_keyword: Token,
        identifier: Token,
        equals: Token,
        lower_bound: Expr,
        to_keyword: Token,
        upper_bound: Expr,
        body: Box<Stmt>,
    },
    Expression {
        expression: Expr,
    },
}

impl Stmt {
    pub fn first_token(&self) -> &Token {
        match self {
            Stmt::Block { open_brace, .. } => open_brace,
            Stmt::VariableDeclaration { keyword, .. } => keyword,
            Stmt::If { if_keyword, .. } => if_keyword,
            Stmt::While { while_keyword, .. } => while_keyword,
            Stmt::For { for_keyword, .. } => for_keyword,
            Stmt::Expression { expression } => expression.first_token(),
        }
    }

    pub fn last_token(&self) -> &Token {
        match self {
            Stmt::Block { close_brace, .. } => close_brace,
            Stmt::VariableDeclaration { initializer, .. } => initializer.last_token(),
            Stmt::If {
                then_statement,
                else_clause,
                ..
            } => match else_clause {
                Some(else_clause) => else_clause.statement.last_token(),
                None => then_statement.last_token(),
            },
            Stmt::While { body, .. } | Stmt::For { body, .. } => body.last_token(),
            Stmt::Expression { expression } => expression.last_token(),
        }
    }

    pub fn span(&self) -> TextSpan {
        TextSpan::from_bounds(self.first_token().span.start, self.last_token().span.end())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::Block { .. } => "BlockStatement",
            Stmt::VariableDeclaration { .. } => "VariableDeclaration",
            Stmt::If { .. } => "IfStatement",
            Stmt::While { .. } => "WhileStatement",
            Stmt::For { .. } => "ForStatement",
            Stmt::Expression { .. } => "ExpressionStatement",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal {
        token: Token,
        value: Value,
    },
    Unary {
        operator: Token,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Parenthesized {
        open_paren: Token,
        expression: Box<Expr>,
        close_paren: Token,
    },
    Assignment {
        identifier: Token,
        equals: Token,
        expression: Box<Expr>,
    },
    Name {
        identifier: Token,
    },
    Call {
        identifier: Token,
        open_paren: Token,
        arguments: Vec<Expr>,
        close_paren: Token,
    },
}

impl Expr {
    pub fn first_token(&self) -> &Token {
        match self {
            Expr::Literal { token, .. } => token,
            Expr::Unary { operator, .. } => operator,
            Expr::Binary { left, .. } => left.first_token(),
            Expr::Parenthesized { open_paren, .. } => open_paren,
            Expr::Assignment { identifier, .. } => identifier,
            Expr::Name { identifier } => identifier,
            Expr::Call { identifier, .. } => identifier,
        }
    }

    pub fn last_token(&self) -> &Token {
        match self {
            Expr::Literal { token, .. } => token,
            Expr::Unary { operand, .. } => operand.last_token(),
            Expr::Binary { right, .. } => right.last_token(),
            Expr::Parenthesized { close_paren, .. } => close_paren,
            Expr::Assignment { expression, .. } => expression.last_token(),
            Expr::Name { identifier } => identifier,
            Expr::Call { close_paren, .. } => close_paren,
        }
    }

    pub fn span(&self) -> TextSpan {
        TextSpan::from_bounds(self.first_token().span.start, self.last_token().span.end())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Literal { .. } => "LiteralExpression",
            Expr::Unary { .. } => "UnaryExpression",
            Expr::Binary { .. } => "BinaryExpression",
            Expr::Parenthesized { .. } => "ParenthesizedExpression",
            Expr::Assignment { .. } => "AssignmentExpression",
            Expr::Name { .. } => "NameExpression",
            Expr::Call { .. } => "CallExpression",
        }
    }
}

// Tree printing

fn write_token(f: &mut fmt::Formatter, token: &Token, indent: usize) -> fmt::Result {
    write!(f, "{:indent$}{}", "", token.token_type, indent = indent)?;
    if token.is_missing() {
        write!(f, " <missing>")?;
    } else if let Some(value) = &token.value {
        write!(f, " {}", value)?;
    }
    writeln!(f)
}

fn write_expr(f: &mut fmt::Formatter, expr: &Expr, indent: usize) -> fmt::Result {
    writeln!(f, "{:indent$}{}", "", expr.kind_name(), indent = indent)?;
    let indent = indent + 2;
    match expr {
        Expr::Literal { token, .. } => write_token(f, token, indent),
        Expr::Unary { operator, operand } => {
            write_token(f, operator, indent)?;
            write_expr(f, operand, indent)
        }
        Expr::Binary {
            left,
            operator,
            right,
        } => {
            write_expr(f, left, indent)?;
            write_token(f, operator, indent)?;
            write_expr(f, right, indent)
        }
        Expr::Parenthesized {
            open_paren,
            expression,
            close_paren,
        } => {
            write_token(f, open_paren, indent)?;
            write_expr(f, expression, indent)?;
            write_token(f, close_paren, indent)
        }
        Expr::Assignment {
            identifier,
            equals,
            expression,
        } => {
            write_token(f, identifier, indent)?;
            write_token(f, equals, indent)?;
            write_expr(f, expression, indent)
        }
        Expr::Name { identifier } => write_token(f, identifier, indent),
        Expr::Call {
            identifier,
            open_paren,
            arguments,
            close_paren,
        } => {
            write_token(f, identifier, indent)?;
            write_token(f, open_paren, indent)?;
            for argument in arguments {
                write_expr(f, argument, indent)?;
            }
            write_token(f, close_paren, indent)
        }
    }
}

fn write_stmt(f: &mut fmt::Formatter, stmt: &Stmt, indent: usize) -> fmt::Result {
    writeln!(f, "{:indent$}{}", "", stmt.kind_name(), indent = indent)?;
    let indent = indent + 2;
    match stmt {
        Stmt::Block {
            open_brace,
            statements,
            close_brace,
        } => {
            write_token(f, open_brace, indent)?;
            for statement in statements {
                write_stmt(f, statement, indent)?;
            }
            write_token(f, close_brace, indent)
        }
        Stmt::VariableDeclaration {
            keyword,
            identifier,
            type_clause,
            equals,
            initializer,
        } => {
            write_token(f, keyword, indent)?;
            write_token(f, identifier, indent)?;
            if let Some(type_clause) = type_clause {
                write_token(f, &type_clause.colon, indent)?;
                write_token(f, &type_clause.identifier, indent)?;
            }
            write_token(f, equals, indent)?;
            write_expr(f, initializer, indent)
        }
        Stmt::If {
            if_keyword,
            condition,
            then_statement,
            else_clause,
        } => {
            write_token(f, if_keyword, indent)?;
            write_expr(f, condition, indent)?;
            write_stmt(f, then_statement, indent)?;
            if let Some(else_clause) = else_clause {
                writeln!(f, "{:indent$}ElseClause", "", indent = indent)?;
                write_token(f, &else_clause.else_keyword, indent + 2)?;
                write_stmt(f, &else_clause.statement, indent + 2)?;
            }
            Ok(())
        }
        Stmt::While {
            while_keyword,
            condition,
            body,
        } => {
            write_token(f, while_keyword, indent)?;
            write_expr(f, condition, indent)?;
            write_stmt(f, body, indent)
        }
        Stmt::For {
            for_keyword,
            identifier,
            equals,
            lower_bound,
            to_keyword,
            upper_bound,
            body,
        } => {
            write_token(f, for_keyword, indent)?;
            write_token(f, identifier, indent)?;
            write_token(f, equals, indent)?;
            write_expr(f, lower_bound, indent)?;
            write_token(f, to_keyword, indent)?;
            write_expr(f, upper_bound, indent)?;
            write_stmt(f, body, indent)
        }
        Stmt::Expression { expression } => write_expr(f, expression, indent),
    }
}

impl fmt::Display for CompilationUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "CompilationUnit")?;
        for statement in &self.statements {
            write_stmt(f, statement, 2)?;
        }
        write_token(f, &self.end_of_file, 2)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_expr(f, self, 0)
    }
}
