//! The typed AST shapes this crate lowers — §6.1's input contract.
//!
//! This module only defines data. Producing a tree of these nodes from
//! source text — lexing, parsing, and type checking — is explicitly out of
//! scope; see the crate-level docs.

pub mod declaration;
pub mod expression;
pub mod span;
pub mod statement;

pub use declaration::{
    Declaration, ExternDeclaration, FunctionDeclaration, Parameter, StructDeclaration,
    StructField,
};
pub use expression::{
    BinaryExpression, BinaryOperator, BooleanLiteralExpression, CallArgument, CallExpression,
    CastExpression, Expression, IdentifierExpression, IntegerLiteralExpression,
    MemberAccessExpression, StringLiteralExpression, UnaryExpression, UnaryOperator,
};
pub use span::Range;
pub use statement::{
    AssignStatement, Block, ExpressionStatement, IfClause, IfStatement, LValueAssignStatement,
    MemberAssignStatement, ReturnStatement, Statement, VarBinding,
};
