//! Expression parsing
//!
//! Precedence climbing over a small operator table. Comparisons bind
//! loosest and may not be chained.

use super::ast::{
    BinaryExpression, BinaryOperator, BooleanLiteral, CallExpression, Expression, FloatLiteral,
    IntLiteral, ListExpression, UnaryExpression, UnaryOperator,
};
use super::stmt::parse_type_annotation;
use super::{ParseError, Parser};
use crate::parser::token::Token;

/// Operator precedence level (higher = tighter binding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Comparison = 1,     // < > <= >= == !=
    Additive = 2,       // + -
    Multiplicative = 3, // *
    Unary = 4,          // -
}

impl Precedence {
    fn next(self) -> Precedence {
        match self {
            Precedence::Comparison => Precedence::Additive,
            Precedence::Additive => Precedence::Multiplicative,
            Precedence::Multiplicative | Precedence::Unary => Precedence::Unary,
        }
    }
}

fn binary_operator(token: &Token) -> Option<(BinaryOperator, Precedence)> {
    let op = match token {
        Token::Less => (BinaryOperator::LessThan, Precedence::Comparison),
        Token::Greater => (BinaryOperator::GreaterThan, Precedence::Comparison),
        Token::LessEqual => (BinaryOperator::LessEqual, Precedence::Comparison),
        Token::GreaterEqual => (BinaryOperator::GreaterEqual, Precedence::Comparison),
        Token::EqualEqual => (BinaryOperator::Equal, Precedence::Comparison),
        Token::BangEqual => (BinaryOperator::NotEqual, Precedence::Comparison),
        Token::Plus => (BinaryOperator::Add, Precedence::Additive),
        Token::Minus => (BinaryOperator::Subtract, Precedence::Additive),
        Token::Star => (BinaryOperator::Multiply, Precedence::Multiplicative),
        _ => return None,
    };
    Some(op)
}

/// Parse an expression.
pub fn parse_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    parse_binary(parser, Precedence::Comparison)
}

fn parse_binary(parser: &mut Parser, min: Precedence) -> Result<Expression, ParseError> {
    let mut left = parse_unary(parser)?;

    while let Some((operator, precedence)) = binary_operator(parser.current()) {
        if precedence < min {
            break;
        }
        parser.advance();
        let right = parse_binary(parser, precedence.next())?;

        if operator.is_comparison() && parser.current().is_comparison() {
            return Err(ParseError::invalid_syntax(
                "chained comparisons are not supported",
                parser.current_span(),
            )
            .with_suggestion("nest the conditionals instead"));
        }

        let span = left.span().to(right.span());
        left = Expression::Binary(BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            span,
        });
    }

    Ok(left)
}

fn parse_unary(parser: &mut Parser) -> Result<Expression, ParseError> {
    if parser.check(&Token::Minus) {
        let start_span = parser.current_span();
        parser.advance();
        let operand = parse_unary(parser)?;
        let span = start_span.to(operand.span());
        return Ok(Expression::Unary(UnaryExpression {
            operator: UnaryOperator::Minus,
            operand: Box::new(operand),
            span,
        }));
    }
    parse_primary(parser)
}

/// Parse a primary expression (literal, name, call, list, group).
fn parse_primary(parser: &mut Parser) -> Result<Expression, ParseError> {
    let span = parser.current_span();
    match parser.current() {
        Token::IntLiteral(value) => {
            let value = *value;
            parser.advance();
            Ok(Expression::IntLiteral(IntLiteral { value, span }))
        }
        Token::FloatLiteral(value) => {
            let value = *value;
            parser.advance();
            Ok(Expression::FloatLiteral(FloatLiteral { value, span }))
        }
        Token::True | Token::False => {
            let value = parser.check(&Token::True);
            parser.advance();
            Ok(Expression::BooleanLiteral(BooleanLiteral { value, span }))
        }
        Token::None => {
            parser.advance();
            Ok(Expression::NoneLiteral(span))
        }
        Token::Identifier(name) if name == "complex" && parser.peek() == Some(&Token::Less) => {
            Ok(Expression::TypeName(parse_type_annotation(parser)?))
        }
        Token::Identifier(_) => {
            let callee = parser.expect_identifier()?;
            if !parser.check(&Token::LeftParen) {
                return Ok(Expression::Identifier(callee));
            }
            parser.advance();
            let arguments = parse_comma_list(parser, Token::RightParen)?;
            Ok(Expression::Call(CallExpression {
                callee,
                arguments,
                span: span.to(&parser.previous_span()),
            }))
        }
        Token::LeftBracket => {
            parser.advance();
            let elements = parse_comma_list(parser, Token::RightBracket)?;
            Ok(Expression::List(ListExpression {
                elements,
                span: span.to(&parser.previous_span()),
            }))
        }
        Token::LeftParen => {
            parser.advance();
            let inner = parse_expression(parser)?;
            parser.expect(Token::RightParen)?;
            Ok(inner)
        }
        _ => Err(parser.unexpected_token(&[
            Token::Identifier("identifier".to_string()),
            Token::IntLiteral(0),
            Token::FloatLiteral(0.0),
            Token::LeftBracket,
            Token::LeftParen,
        ])),
    }
}

/// Parse `expr, expr, ...` up to and including `close`
fn parse_comma_list(parser: &mut Parser, close: Token) -> Result<Vec<Expression>, ParseError> {
    let mut items = Vec::new();
    while !parser.check(&close) {
        items.push(parse_expression(parser)?);
        if !parser.check(&Token::Comma) {
            break;
        }
        parser.advance();
    }
    parser.expect(close)?;
    Ok(items)
}
