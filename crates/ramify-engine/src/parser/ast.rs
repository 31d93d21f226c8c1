//! Syntax tree for host function bodies

use crate::parser::token::Span;

/// A parsed source file
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub functions: Vec<FunctionDef>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

/// `def name(params): body`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: Identifier,
    pub params: Vec<Parameter>,
    pub body: Vec<Statement>,
    pub span: Span,
}

/// `name: type`
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Identifier,
    pub type_annotation: TypeAnnotation,
    pub span: Span,
}

/// A type spelled in source, e.g. `f64` or `complex<f32>`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `x = expr`
    Assignment(Assignment),
    /// A call or other expression evaluated for effect
    Expression(ExpressionStatement),
    /// `if` / `elif` / `else`
    If(IfStatement),
    /// `pass`
    Pass(Span),
    /// `return` or `return None`
    Return(ReturnStatement),
}

impl Statement {
    pub fn span(&self) -> &Span {
        match self {
            Statement::Assignment(s) => &s.span,
            Statement::Expression(s) => &s.span,
            Statement::If(s) => &s.span,
            Statement::Pass(span) => span,
            Statement::Return(s) => &s.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: Identifier,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

/// An `if` statement. `elif` chains are stored as an else body holding a
/// single nested `IfStatement`.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_body: Vec<Statement>,
    pub else_body: Option<Vec<Statement>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    IntLiteral(IntLiteral),
    FloatLiteral(FloatLiteral),
    BooleanLiteral(BooleanLiteral),
    NoneLiteral(Span),
    Identifier(Identifier),
    /// `complex<f64>` in expression position
    TypeName(TypeAnnotation),
    List(ListExpression),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    Call(CallExpression),
}

impl Expression {
    pub fn span(&self) -> &Span {
        match self {
            Expression::IntLiteral(e) => &e.span,
            Expression::FloatLiteral(e) => &e.span,
            Expression::BooleanLiteral(e) => &e.span,
            Expression::NoneLiteral(span) => span,
            Expression::Identifier(e) => &e.span,
            Expression::TypeName(e) => &e.span,
            Expression::List(e) => &e.span,
            Expression::Unary(e) => &e.span,
            Expression::Binary(e) => &e.span,
            Expression::Call(e) => &e.span,
        }
    }

    /// Callee name, when this is a call on a plain name
    pub fn call_name(&self) -> Option<&str> {
        match self {
            Expression::Call(call) => Some(call.callee.name.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntLiteral {
    pub value: i64,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatLiteral {
    pub value: f64,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub value: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListExpression {
    pub elements: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl BinaryOperator {
    pub fn is_comparison(&self) -> bool {
        !matches!(
            self,
            BinaryOperator::Add | BinaryOperator::Subtract | BinaryOperator::Multiply
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub callee: Identifier,
    pub arguments: Vec<Expression>,
    pub span: Span,
}
