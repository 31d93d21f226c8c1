//! Host body parser
//!
//! Recursive descent over the layout-resolved token stream produced by
//! [`Lexer`]. A source file holds one or more `def` blocks; each becomes a
//! [`FunctionDef`](ast::FunctionDef) for the lowering engine.
//!
//! # Example
//!
//! ```ignore
//! use ramify_engine::parser::Parser;
//!
//! let source = "def f(a: f64, b: f64):\n    if a < b:\n        pass\n";
//! let module = Parser::new(source)?.parse()?;
//! assert_eq!(module.functions[0].name.name, "f");
//! ```

pub mod ast;
pub mod error;
mod expr;
pub mod lexer;
mod stmt;
pub mod token;

pub use error::{ParseError, ParseErrorKind};
pub use lexer::{LexError, Lexer};
pub use token::{Span, Token};

use ast::Module;

/// Parser state over a pre-tokenized source
pub struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    /// Indentation depth after the current position
    depth: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, Vec<LexError>> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            tokens,
            pos: 0,
            depth: 0,
            errors: Vec::new(),
        })
    }

    /// Parse every function in the source.
    ///
    /// Errors are collected per function; parsing resumes at the next
    /// top-level `def`.
    pub fn parse(mut self) -> Result<Module, Vec<ParseError>> {
        let start_span = self.current_span();
        let mut functions = Vec::new();

        while !self.at_eof() {
            if self.check(&Token::Newline) {
                self.advance();
                continue;
            }
            match stmt::parse_function(&mut self) {
                Ok(func) => functions.push(func),
                Err(err) => {
                    self.errors.push(err);
                    self.sync_to_function_boundary();
                }
            }
        }

        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        let span = match functions.last() {
            Some(last) => start_span.to(&last.span),
            None => start_span,
        };
        Ok(Module { functions, span })
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.tokens[self.pos].1
    }

    #[inline]
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|(tok, _)| tok)
    }

    /// Span of the most recently consumed token
    pub fn previous_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].1
    }

    /// Advance to the next token, returning the previous current token.
    pub fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].0.clone();
        match tok {
            Token::Indent => self.depth += 1,
            Token::Dedent => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    /// Check if the current token matches the given kind.
    #[inline]
    pub fn check(&self, expected: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(expected)
    }

    #[inline]
    pub fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    pub fn expect(&mut self, expected: Token) -> Result<Token, ParseError> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected_token(&[expected]))
        }
    }

    /// Consume an identifier and return its name
    pub fn expect_identifier(&mut self) -> Result<ast::Identifier, ParseError> {
        let span = self.current_span();
        match self.current() {
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(ast::Identifier { name, span })
            }
            _ => Err(self.unexpected_token(&[Token::Identifier("identifier".to_string())])),
        }
    }

    pub fn unexpected_token(&self, expected: &[Token]) -> ParseError {
        let span = self.current_span();
        if self.at_eof() {
            ParseError::unexpected_eof(expected.to_vec(), span)
        } else {
            ParseError::unexpected_token(expected.to_vec(), self.current().clone(), span)
        }
    }

    /// Skip to the next `def` at indentation depth zero
    fn sync_to_function_boundary(&mut self) {
        // Always make progress
        if !self.at_eof() {
            self.advance();
        }
        while !self.at_eof() && !(self.depth == 0 && self.check(&Token::Def)) {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_new() {
        let parser = Parser::new("def f():\n    pass\n").unwrap();
        assert!(matches!(parser.current(), Token::Def));
        assert!(matches!(parser.peek(), Some(Token::Identifier(_))));
    }

    #[test]
    fn test_parser_at_eof() {
        let parser = Parser::new("").unwrap();
        assert!(parser.at_eof());
    }

    #[test]
    fn test_depth_tracking() {
        let mut parser = Parser::new("def f():\n    pass\n").unwrap();
        while !parser.check(&Token::Pass) {
            parser.advance();
        }
        assert_eq!(parser.depth, 1);
        while !parser.at_eof() {
            parser.advance();
        }
        assert_eq!(parser.depth, 0);
    }

    #[test]
    fn test_errors_recover_at_next_def() {
        let source = "def f(:\n    pass\ndef g(a f64):\n    pass\ndef h():\n    pass\n";
        let errors = Parser::new(source).unwrap().parse().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].span.line, 1);
        assert_eq!(errors[1].span.line, 3);
    }

    #[test]
    fn test_empty_module() {
        let module = Parser::new("\n# nothing\n").unwrap().parse().unwrap();
        assert!(module.functions.is_empty());
    }
}
