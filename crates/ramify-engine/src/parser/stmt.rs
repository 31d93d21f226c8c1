//! Function and statement parsing

use super::ast::{
    Assignment, Expression, ExpressionStatement, FunctionDef, IfStatement, Parameter,
    ReturnStatement, Statement, TypeAnnotation,
};
use super::expr::parse_expression;
use super::{ParseError, Parser};
use crate::parser::token::Token;

/// Parse `def name(params) [-> type]: suite`.
pub fn parse_function(parser: &mut Parser) -> Result<FunctionDef, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Def)?;
    let name = parser.expect_identifier()?;

    parser.expect(Token::LeftParen)?;
    let mut params = Vec::new();
    while !parser.check(&Token::RightParen) {
        params.push(parse_parameter(parser)?);
        if !parser.check(&Token::Comma) {
            break;
        }
        parser.advance();
    }
    parser.expect(Token::RightParen)?;

    if parser.check(&Token::Arrow) {
        parser.advance();
        let ty = parse_type_annotation(parser)?;
        if ty.name != "None" {
            return Err(ParseError::invalid_syntax(
                format!("function `{}` cannot return `{}`", name.name, ty.name),
                ty.span,
            ));
        }
    }

    parser.expect(Token::Colon)?;
    let body = parse_suite(parser)?;
    check_returns(&body)?;

    let span = start_span.to(&parser.previous_span());
    Ok(FunctionDef {
        name,
        params,
        body,
        span,
    })
}

fn parse_parameter(parser: &mut Parser) -> Result<Parameter, ParseError> {
    let name = parser.expect_identifier()?;
    parser.expect(Token::Colon)?;
    let type_annotation = parse_type_annotation(parser)?;
    let span = name.span.to(&type_annotation.span);
    Ok(Parameter {
        name,
        type_annotation,
        span,
    })
}

/// Parse a type name: `f64`, `si32`, `index`, `complex<f32>` or `None`
pub fn parse_type_annotation(parser: &mut Parser) -> Result<TypeAnnotation, ParseError> {
    let span = parser.current_span();
    if parser.check(&Token::None) {
        parser.advance();
        return Ok(TypeAnnotation {
            name: "None".to_string(),
            span,
        });
    }
    let base = parser.expect_identifier()?;
    if !parser.check(&Token::Less) {
        return Ok(TypeAnnotation {
            name: base.name,
            span: base.span,
        });
    }
    parser.advance();
    let inner = parser.expect_identifier()?;
    parser.expect(Token::Greater)?;
    Ok(TypeAnnotation {
        name: format!("{}<{}>", base.name, inner.name),
        span: span.to(&parser.previous_span()),
    })
}

/// Parse the body following a `:`. Either an indented block or a single
/// simple statement on the same line.
fn parse_suite(parser: &mut Parser) -> Result<Vec<Statement>, ParseError> {
    if !parser.check(&Token::Newline) {
        let stmt = parse_simple_statement(parser)?;
        parser.expect(Token::Newline)?;
        return Ok(vec![stmt]);
    }
    parser.advance();
    parser.expect(Token::Indent)?;

    let mut body = Vec::new();
    while !parser.check(&Token::Dedent) && !parser.at_eof() {
        body.push(parse_statement(parser)?);
    }
    parser.expect(Token::Dedent)?;
    Ok(body)
}

/// Parse one statement, including its trailing newline.
pub fn parse_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    match parser.current() {
        Token::If => parse_if(parser),
        Token::Elif | Token::Else => Err(ParseError::invalid_syntax(
            format!("`{}` without a matching `if`", parser.current()),
            parser.current_span(),
        )),
        Token::Indent => Err(ParseError::invalid_syntax(
            "unexpected indent",
            parser.current_span(),
        )),
        _ => {
            let stmt = parse_simple_statement(parser)?;
            parser.expect(Token::Newline)?;
            Ok(stmt)
        }
    }
}

fn parse_simple_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    match parser.current() {
        Token::Pass => {
            parser.advance();
            Ok(Statement::Pass(start_span))
        }
        Token::Return => {
            parser.advance();
            let value = if parser.check(&Token::Newline) {
                None
            } else {
                Some(parse_expression(parser)?)
            };
            let span = start_span.to(&parser.previous_span());
            Ok(Statement::Return(ReturnStatement { value, span }))
        }
        Token::Identifier(_) if parser.peek() == Some(&Token::Equal) => {
            let target = parser.expect_identifier()?;
            parser.advance();
            let value = parse_expression(parser)?;
            let span = start_span.to(value.span());
            Ok(Statement::Assignment(Assignment {
                target,
                value,
                span,
            }))
        }
        _ => {
            let expression = parse_expression(parser)?;
            let span = start_span.to(expression.span());
            Ok(Statement::Expression(ExpressionStatement { expression, span }))
        }
    }
}

/// Parse `if`/`elif`/`else`; each `elif` becomes a nested `if` in the else
/// body.
fn parse_if(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.advance();
    let condition = parse_expression(parser)?;
    parser.expect(Token::Colon)?;
    let then_body = parse_suite(parser)?;

    let else_body = match parser.current() {
        Token::Elif => Some(vec![parse_if(parser)?]),
        Token::Else => {
            parser.advance();
            parser.expect(Token::Colon)?;
            Some(parse_suite(parser)?)
        }
        _ => None,
    };

    let span = start_span.to(&parser.previous_span());
    Ok(Statement::If(IfStatement {
        condition,
        then_body,
        else_body,
        span,
    }))
}

/// `return` may only end the function, and only without a value
fn check_returns(body: &[Statement]) -> Result<(), ParseError> {
    for (i, stmt) in body.iter().enumerate() {
        match stmt {
            Statement::Return(ret) => {
                if i + 1 != body.len() {
                    return Err(ParseError::invalid_syntax(
                        "`return` must be the last statement of the function",
                        ret.span,
                    ));
                }
                if !matches!(ret.value, None | Some(Expression::NoneLiteral(_))) {
                    return Err(ParseError::invalid_syntax(
                        "functions cannot return values",
                        ret.span,
                    )
                    .with_suggestion("use `return` or `return None`"));
                }
            }
            Statement::If(stmt) => check_nested_returns(stmt)?,
            _ => {}
        }
    }
    Ok(())
}

fn check_nested_returns(stmt: &IfStatement) -> Result<(), ParseError> {
    let bodies = std::iter::once(&stmt.then_body).chain(stmt.else_body.as_ref());
    for body in bodies {
        for inner in body {
            match inner {
                Statement::Return(ret) => {
                    return Err(ParseError::invalid_syntax(
                        "`return` inside a conditional is not supported",
                        ret.span,
                    ))
                }
                Statement::If(nested) => check_nested_returns(nested)?,
                _ => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::{BinaryOperator, Module};
    use crate::parser::ParseErrorKind;

    fn parse(source: &str) -> Module {
        Parser::new(source).unwrap().parse().unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        Parser::new(source).unwrap().parse().unwrap_err().remove(0)
    }

    #[test]
    fn test_function_signature() {
        let module = parse("def ifs(M: f64, N: complex<f32>, K: si64) -> None:\n    pass\n");
        let func = &module.functions[0];
        assert_eq!(func.name.name, "ifs");
        let types: Vec<_> = func
            .params
            .iter()
            .map(|p| p.type_annotation.name.as_str())
            .collect();
        assert_eq!(types, vec!["f64", "complex<f32>", "si64"]);
        assert!(matches!(func.body.as_slice(), [Statement::Pass(_)]));
    }

    #[test]
    fn test_if_elif_else_nests() {
        let source = "\
def f(a: f64, b: f64):
    if a < b:
        pass
    elif a > b:
        pass
    else:
        x = constant(1.0)
";
        let module = parse(source);
        let Statement::If(outer) = &module.functions[0].body[0] else {
            panic!("expected if");
        };
        let else_body = outer.else_body.as_ref().unwrap();
        assert_eq!(else_body.len(), 1);
        let Statement::If(inner) = &else_body[0] else {
            panic!("expected nested if");
        };
        assert!(matches!(
            inner.condition,
            Expression::Binary(ref b) if b.operator == BinaryOperator::GreaterThan
        ));
        assert!(matches!(
            inner.else_body.as_deref(),
            Some([Statement::Assignment(_)])
        ));
    }

    #[test]
    fn test_single_line_suite() {
        let module = parse("def f(a: i32):\n    if a == a: pass\n");
        let Statement::If(stmt) = &module.functions[0].body[0] else {
            panic!("expected if");
        };
        assert!(matches!(stmt.then_body.as_slice(), [Statement::Pass(_)]));
    }

    #[test]
    fn test_trailing_return() {
        let module = parse("def f():\n    pass\n    return None\n");
        assert!(matches!(
            module.functions[0].body.last(),
            Some(Statement::Return(_))
        ));
        parse("def g():\n    return\n");
    }

    #[test]
    fn test_return_must_be_last() {
        let err = parse_err("def f():\n    return\n    pass\n");
        assert!(matches!(err.kind, ParseErrorKind::InvalidSyntax { .. }));
        assert_eq!(err.span.line, 2);
    }

    #[test]
    fn test_return_value_rejected() {
        let err = parse_err("def f():\n    return 1\n");
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_return_in_branch_rejected() {
        let err = parse_err("def f(a: f64):\n    if a < a:\n        return\n");
        assert!(err.message.contains("inside a conditional"));
    }

    #[test]
    fn test_dangling_else() {
        let err = parse_err("def f():\n    else:\n        pass\n");
        assert!(err.message.contains("without a matching"));
    }

    #[test]
    fn test_missing_colon() {
        let err = parse_err("def f()\n    pass\n");
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
    }
}
