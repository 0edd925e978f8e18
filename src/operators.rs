//! Operator tables: which operator tokens apply to which operand types, and
//! what they produce.

use crate::lexer::TokenType;
use crate::symbols::TypeSymbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundUnaryOperatorKind {
    Identity,
    Negation,
    LogicalNegation,
}

#[derive(Debug, PartialEq, Eq)]
pub struct BoundUnaryOperator {
    pub syntax_kind: TokenType,
    pub kind: BoundUnaryOperatorKind,
    pub operand_type: TypeSymbol,
    pub result_type: TypeSymbol,
}

impl BoundUnaryOperator {
    const fn new(
        syntax_kind: TokenType,
        kind: BoundUnaryOperatorKind,
        operand_type: TypeSymbol,
        result_type: TypeSymbol,
    ) -> Self {
        Self {
            syntax_kind,
            kind,
            operand_type,
            result_type,
        }
    }

    pub fn bind(syntax_kind: TokenType, operand_type: TypeSymbol) -> Option<&'static BoundUnaryOperator> {
        UNARY_OPERATORS
            .iter()
            .find(|op| op.syntax_kind == syntax_kind && op.operand_type == operand_type)
    }

    pub fn syntax_text(&self) -> &'static str {
        self.syntax_kind.fixed_text().unwrap_or("?")
    }
}

static UNARY_OPERATORS: [BoundUnaryOperator; 3] = [
    BoundUnaryOperator::new(
        TokenType::Bang,
        BoundUnaryOperatorKind::LogicalNegation,
        TypeSymbol::Bool,
        TypeSymbol::Bool,
    ),
    BoundUnaryOperator::new(
        TokenType::Plus,
        BoundUnaryOperatorKind::Identity,
        TypeSymbol::Number,
        TypeSymbol::Number,
    ),
    BoundUnaryOperator::new(
        TokenType::Minus,
        BoundUnaryOperatorKind::Negation,
        TypeSymbol::Number,
        TypeSymbol::Number,
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundBinaryOperatorKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Remainder,
    LogicalAnd,
    LogicalOr,
    Equals,
    NotEquals,
    Less,
    LessOrEquals,
    Greater,
    GreaterOrEquals,
}

#[derive(Debug, PartialEq, Eq)]
pub struct BoundBinaryOperator {
    pub syntax_kind: TokenType,
    pub kind: BoundBinaryOperatorKind,
    pub left_type: TypeSymbol,
    pub right_type: TypeSymbol,
    pub result_type: TypeSymbol,
}

impl BoundBinaryOperator {
    const fn new(
        syntax_kind: TokenType,
        kind: BoundBinaryOperatorKind,
        left_type: TypeSymbol,
        right_type: TypeSymbol,
        result_type: TypeSymbol,
    ) -> Self {
        Self {
            syntax_kind,
            kind,
            left_type,
            right_type,
            result_type,
        }
    }

    /// Same operand type on both sides.
    const fn uniform(syntax_kind: TokenType, kind: BoundBinaryOperatorKind, ty: TypeSymbol) -> Self {
        Self::new(syntax_kind, kind, ty, ty, ty)
    }

    /// Same operand type on both sides, bool result.
    const fn predicate(syntax_kind: TokenType, kind: BoundBinaryOperatorKind, ty: TypeSymbol) -> Self {
        Self::new(syntax_kind, kind, ty, ty, TypeSymbol::Bool)
    }

    pub fn bind(
        syntax_kind: TokenType,
        left_type: TypeSymbol,
        right_type: TypeSymbol,
    ) -> Option<&'static BoundBinaryOperator> {
        BINARY_OPERATORS.iter().find(|op| {
            op.syntax_kind == syntax_kind && op.left_type == left_type && op.right_type == right_type
        })
    }

    pub fn syntax_text(&self) -> &'static str {
        self.syntax_kind.fixed_text().unwrap_or("?")
    }
}

use BoundBinaryOperatorKind as Op;
use TokenType as Tk;
use TypeSymbol as Ty;

static BINARY_OPERATORS: [BoundBinaryOperator; 22] = [
    // number arithmetic
    BoundBinaryOperator::uniform(Tk::Plus, Op::Addition, Ty::Number),
    BoundBinaryOperator::uniform(Tk::Minus, Op::Subtraction, Ty::Number),
    BoundBinaryOperator::uniform(Tk::Star, Op::Multiplication, Ty::Number),
    BoundBinaryOperator::uniform(Tk::Slash, Op::Division, Ty::Number),
    BoundBinaryOperator::uniform(Tk::Percent, Op::Remainder, Ty::Number),
    // number comparison
    BoundBinaryOperator::predicate(Tk::EqualEqual, Op::Equals, Ty::Number),
    BoundBinaryOperator::predicate(Tk::BangEqual, Op::NotEquals, Ty::Number),
    BoundBinaryOperator::predicate(Tk::Less, Op::Less, Ty::Number),
    BoundBinaryOperator::predicate(Tk::LessEqual, Op::LessOrEquals, Ty::Number),
    BoundBinaryOperator::predicate(Tk::Greater, Op::Greater, Ty::Number),
    BoundBinaryOperator::predicate(Tk::GreaterEqual, Op::GreaterOrEquals, Ty::Number),
    // bool
    BoundBinaryOperator::uniform(Tk::AmpersandAmpersand, Op::LogicalAnd, Ty::Bool),
    BoundBinaryOperator::uniform(Tk::PipePipe, Op::LogicalOr, Ty::Bool),
    BoundBinaryOperator::predicate(Tk::EqualEqual, Op::Equals, Ty::Bool),
    BoundBinaryOperator::predicate(Tk::BangEqual, Op::NotEquals, Ty::Bool),
    // string
    BoundBinaryOperator::uniform(Tk::Plus, Op::Addition, Ty::String),
    BoundBinaryOperator::predicate(Tk::EqualEqual, Op::Equals, Ty::String),
    BoundBinaryOperator::predicate(Tk::BangEqual, Op::NotEquals, Ty::String),
    // concatenation with a non-string operand
    BoundBinaryOperator::new(Tk::Plus, Op::Addition, Ty::String, Ty::Number, Ty::String),
    BoundBinaryOperator::new(Tk::Plus, Op::Addition, Ty::Number, Ty::String, Ty::String),
    BoundBinaryOperator::new(Tk::Plus, Op::Addition, Ty::String, Ty::Bool, Ty::String),
    BoundBinaryOperator::new(Tk::Plus, Op::Addition, Ty::Bool, Ty::String, Ty::String),
];
