//! The typed expression shapes this crate lowers.
//!
//! These are *input* data, not something this crate parses into existence —
//! an external type checker is expected to have populated `resolved_type` on
//! every expression it could resolve, leaving it `None` only where inference
//! genuinely could not pin down a type.

use crate::ast::span::Range;
use crate::types::Type;

#[derive(Clone, Debug)]
pub enum Expression {
    IntegerLiteral(IntegerLiteralExpression),
    StringLiteral(StringLiteralExpression),
    BooleanLiteral(BooleanLiteralExpression),
    Identifier(IdentifierExpression),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    Call(CallExpression),
    Cast(CastExpression),
    MemberAccess(MemberAccessExpression),
}

impl Expression {
    pub fn range(&self) -> Range {
        match self {
            Expression::IntegerLiteral(e) => e.range,
            Expression::StringLiteral(e) => e.range,
            Expression::BooleanLiteral(e) => e.range,
            Expression::Identifier(e) => e.range,
            Expression::Unary(e) => e.range,
            Expression::Binary(e) => e.range,
            Expression::Call(e) => e.range,
            Expression::Cast(e) => e.range,
            Expression::MemberAccess(e) => e.range,
        }
    }

    pub fn resolved_type(&self) -> Option<&Type> {
        match self {
            Expression::IntegerLiteral(e) => e.resolved_type.as_ref(),
            Expression::StringLiteral(e) => e.resolved_type.as_ref(),
            Expression::BooleanLiteral(e) => e.resolved_type.as_ref(),
            Expression::Identifier(e) => e.resolved_type.as_ref(),
            Expression::Unary(e) => e.resolved_type.as_ref(),
            Expression::Binary(e) => e.resolved_type.as_ref(),
            Expression::Call(e) => e.resolved_type.as_ref(),
            Expression::Cast(e) => e.resolved_type.as_ref(),
            Expression::MemberAccess(e) => e.resolved_type.as_ref(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct IntegerLiteralExpression {
    pub value: String,
    pub resolved_type: Option<Type>,
    pub range: Range,
}

#[derive(Clone, Debug)]
pub struct StringLiteralExpression {
    pub value: String,
    pub resolved_type: Option<Type>,
    pub range: Range,
}

#[derive(Clone, Debug)]
pub struct BooleanLiteralExpression {
    pub value: bool,
    pub resolved_type: Option<Type>,
    pub range: Range,
}

#[derive(Clone, Debug)]
pub struct IdentifierExpression {
    pub name: String,
    pub resolved_type: Option<Type>,
    pub range: Range,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnaryOperator {
    Negate,
    LogicalNot,
    Dereference,
    AddressOf,
}

#[derive(Clone, Debug)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
    pub resolved_type: Option<Type>,
    pub range: Range,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOperator {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Eq
                | BinaryOperator::Ne
                | BinaryOperator::Lt
                | BinaryOperator::Le
                | BinaryOperator::Gt
                | BinaryOperator::Ge
        )
    }

    pub fn is_short_circuit(self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }
}

#[derive(Clone, Debug)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub resolved_type: Option<Type>,
    pub range: Range,
}

#[derive(Clone, Debug)]
pub struct CallArgument {
    pub value: Expression,
}

#[derive(Clone, Debug)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<CallArgument>,
    pub resolved_type: Option<Type>,
    pub range: Range,
}

#[derive(Clone, Debug)]
pub struct CastExpression {
    pub expression: Box<Expression>,
    pub resolved_type: Option<Type>,
    pub range: Range,
}

#[derive(Clone, Debug)]
pub struct MemberAccessExpression {
    pub base: Box<Expression>,
    pub member: String,
    pub resolved_type: Option<Type>,
    pub range: Range,
}
