//! Lexer for host function bodies.
//!
//! Raw tokens come from logos. Layout is then resolved in a second pass that
//! turns line starts into `Newline`, `Indent` and `Dedent` tokens the way an
//! indentation-structured language expects. Newlines inside brackets are
//! ignored, blank and comment-only lines never produce layout tokens.

use crate::parser::token::{Span, Token};
use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
enum LogosToken {
    #[regex(r"[ \t\r\x0C]+", logos::skip)]
    Whitespace,

    #[regex(r"#[^\n]*", logos::skip)]
    Comment,

    // Explicit line joining
    #[regex(r"\\\r?\n", logos::skip)]
    Continuation,

    #[token("\n")]
    Newline,

    #[token("def")]
    Def,

    #[token("if")]
    If,

    #[token("elif")]
    Elif,

    #[token("else")]
    Else,

    #[token("pass")]
    Pass,

    #[token("return")]
    Return,

    #[token("True")]
    True,

    #[token("False")]
    False,

    #[token("None")]
    None,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[regex(r"[0-9]+(_[0-9]+)*", parse_int)]
    IntLiteral(i64),

    #[regex(r"[0-9]+(_[0-9]+)*\.([0-9]+(_[0-9]+)*)?([eE][+-]?[0-9]+)?", parse_float)]
    #[regex(r"[0-9]+(_[0-9]+)*[eE][+-]?[0-9]+", parse_float)]
    #[regex(r"\.[0-9]+(_[0-9]+)*([eE][+-]?[0-9]+)?", parse_float)]
    FloatLiteral(f64),

    #[token("->")]
    Arrow,

    #[token("==")]
    EqualEqual,

    #[token("!=")]
    BangEqual,

    #[token("<=")]
    LessEqual,

    #[token(">=")]
    GreaterEqual,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("=")]
    Equal,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("[")]
    LeftBracket,

    #[token("]")]
    RightBracket,
}

fn parse_int(lex: &mut logos::Lexer<LogosToken>) -> Option<i64> {
    lex.slice().replace('_', "").parse().ok()
}

fn parse_float(lex: &mut logos::Lexer<LogosToken>) -> Option<f64> {
    lex.slice().replace('_', "").parse().ok()
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    UnexpectedCharacter { char: char, span: Span },
    InvalidNumber { text: String, span: Span },
    InconsistentDedent { span: Span },
    UnclosedBracket { span: Span },
}

impl LexError {
    pub fn span(&self) -> &Span {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::InvalidNumber { span, .. }
            | LexError::InconsistentDedent { span }
            | LexError::UnclosedBracket { span } => span,
        }
    }

    pub fn description(&self) -> String {
        match self {
            LexError::UnexpectedCharacter { char, .. } => {
                format!("Unexpected character '{}'", char)
            }
            LexError::InvalidNumber { text, .. } => format!("Invalid number '{}'", text),
            LexError::InconsistentDedent { .. } => {
                "Unindent does not match any outer indentation level".to_string()
            }
            LexError::UnclosedBracket { .. } => "Unclosed bracket at end of file".to_string(),
        }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}:{}",
            self.description(),
            self.span().line,
            self.span().column
        )
    }
}

impl std::error::Error for LexError {}

/// Byte offsets of every line start, for span line/column lookup
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn span(&self, start: usize, end: usize) -> Span {
        let line = self.starts.partition_point(|&s| s <= start);
        let column = start - self.starts[line - 1] + 1;
        Span::new(start, end, line as u32, column as u32)
    }

    fn line_start(&self, offset: usize) -> usize {
        let line = self.starts.partition_point(|&s| s <= offset);
        self.starts[line - 1]
    }
}

/// Visual indentation width; tabs advance to the next multiple of eight
fn indent_width(prefix: &str) -> usize {
    prefix.chars().fold(0, |width, c| match c {
        ' ' => width + 1,
        '\t' => (width / 8 + 1) * 8,
        _ => width,
    })
}

pub struct Lexer<'a> {
    source: &'a str,
    lines: LineIndex,
    tokens: Vec<(Token, Span)>,
    errors: Vec<LexError>,
    indents: Vec<usize>,
    bracket_depth: usize,
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            tokens: Vec::new(),
            errors: Vec::new(),
            indents: vec![0],
            bracket_depth: 0,
            at_line_start: true,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<(Token, Span)>, Vec<LexError>> {
        let mut raw = LogosToken::lexer(self.source);
        while let Some(result) = raw.next() {
            let range = raw.span();
            let span = self.lines.span(range.start, range.end);
            match result {
                Ok(LogosToken::Newline) => self.newline(span),
                Ok(token) => {
                    if matches!(token, LogosToken::Def) && span.column == 1 {
                        self.close_dangling_brackets(span);
                    }
                    self.layout(span);
                    self.track_brackets(&token);
                    let token = convert_token(token);
                    self.tokens.push((token, span));
                }
                Err(()) => {
                    let text = &self.source[range.clone()];
                    let error = match text.chars().next() {
                        Some(c) if c.is_ascii_digit() || c == '.' => LexError::InvalidNumber {
                            text: text.to_string(),
                            span,
                        },
                        Some(char) => LexError::UnexpectedCharacter { char, span },
                        None => continue,
                    };
                    self.errors.push(error);
                }
            }
        }

        let end = self.lines.span(self.source.len(), self.source.len());
        if self.bracket_depth > 0 {
            self.errors.push(LexError::UnclosedBracket { span: end });
        }
        if !self.at_line_start {
            self.tokens.push((Token::Newline, end));
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.tokens.push((Token::Dedent, end));
        }
        self.tokens.push((Token::Eof, end));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    fn newline(&mut self, span: Span) {
        if self.bracket_depth == 0 && !self.at_line_start {
            self.tokens.push((Token::Newline, span));
            self.at_line_start = true;
        }
    }

    /// A top-level `def` always starts a new logical line, even when an
    /// earlier bracket was never closed. The parser reports the broken line.
    fn close_dangling_brackets(&mut self, span: Span) {
        if self.bracket_depth == 0 {
            return;
        }
        self.bracket_depth = 0;
        if !self.at_line_start {
            self.tokens.push((Token::Newline, self.lines.span(span.start, span.start)));
            self.at_line_start = true;
        }
    }

    /// Emit indentation changes before the first token of a logical line
    fn layout(&mut self, span: Span) {
        if !self.at_line_start {
            return;
        }
        self.at_line_start = false;

        let line_start = self.lines.line_start(span.start);
        let width = indent_width(&self.source[line_start..span.start]);
        let marker = self.lines.span(span.start, span.start);
        let current = self.indents.last().copied().unwrap_or(0);

        if width > current {
            self.indents.push(width);
            self.tokens.push((Token::Indent, marker));
            return;
        }
        while width < self.indents.last().copied().unwrap_or(0) {
            self.indents.pop();
            self.tokens.push((Token::Dedent, marker));
        }
        if width != self.indents.last().copied().unwrap_or(0) {
            self.errors.push(LexError::InconsistentDedent { span: marker });
        }
    }

    fn track_brackets(&mut self, token: &LogosToken) {
        match token {
            LogosToken::LeftParen | LogosToken::LeftBracket => self.bracket_depth += 1,
            LogosToken::RightParen | LogosToken::RightBracket => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1)
            }
            _ => {}
        }
    }
}

fn convert_token(token: LogosToken) -> Token {
    match token {
        LogosToken::Def => Token::Def,
        LogosToken::If => Token::If,
        LogosToken::Elif => Token::Elif,
        LogosToken::Else => Token::Else,
        LogosToken::Pass => Token::Pass,
        LogosToken::Return => Token::Return,
        LogosToken::True => Token::True,
        LogosToken::False => Token::False,
        LogosToken::None => Token::None,
        LogosToken::Identifier(s) => Token::Identifier(s),
        LogosToken::IntLiteral(n) => Token::IntLiteral(n),
        LogosToken::FloatLiteral(n) => Token::FloatLiteral(n),
        LogosToken::Arrow => Token::Arrow,
        LogosToken::EqualEqual => Token::EqualEqual,
        LogosToken::BangEqual => Token::BangEqual,
        LogosToken::LessEqual => Token::LessEqual,
        LogosToken::GreaterEqual => Token::GreaterEqual,
        LogosToken::Plus => Token::Plus,
        LogosToken::Minus => Token::Minus,
        LogosToken::Star => Token::Star,
        LogosToken::Less => Token::Less,
        LogosToken::Greater => Token::Greater,
        LogosToken::Equal => Token::Equal,
        LogosToken::Colon => Token::Colon,
        LogosToken::Comma => Token::Comma,
        LogosToken::LeftParen => Token::LeftParen,
        LogosToken::RightParen => Token::RightParen,
        LogosToken::LeftBracket => Token::LeftBracket,
        LogosToken::RightBracket => Token::RightBracket,
        LogosToken::Newline => Token::Newline,
        LogosToken::Whitespace | LogosToken::Comment | LogosToken::Continuation => {
            unreachable!("whitespace and comments are skipped")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        Lexer::new(source)
            .tokenize()
            .expect("should lex")
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_simple_line() {
        assert_eq!(
            kinds("x = constant(1.0)"),
            vec![
                Token::Identifier("x".into()),
                Token::Equal,
                Token::Identifier("constant".into()),
                Token::LeftParen,
                Token::FloatLiteral(1.0),
                Token::RightParen,
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_indent_and_dedent() {
        let source = "def f():\n    if a:\n        pass\n    pass\n";
        assert_eq!(
            kinds(source),
            vec![
                Token::Def,
                Token::Identifier("f".into()),
                Token::LeftParen,
                Token::RightParen,
                Token::Colon,
                Token::Newline,
                Token::Indent,
                Token::If,
                Token::Identifier("a".into()),
                Token::Colon,
                Token::Newline,
                Token::Indent,
                Token::Pass,
                Token::Newline,
                Token::Dedent,
                Token::Pass,
                Token::Newline,
                Token::Dedent,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_blank_and_comment_lines_ignored() {
        let source = "def f():\n\n    # comment\n    pass  # trailing\n\n";
        let tokens = kinds(source);
        assert_eq!(tokens.iter().filter(|t| **t == Token::Indent).count(), 1);
        assert_eq!(tokens.iter().filter(|t| **t == Token::Newline).count(), 2);
    }

    #[test]
    fn test_newlines_inside_brackets() {
        let tokens = kinds("m = alloca([3,\n    3], f64)\n");
        assert!(!tokens.contains(&Token::Indent));
        assert_eq!(tokens.iter().filter(|t| **t == Token::Newline).count(), 1);
    }

    #[test]
    fn test_top_level_def_closes_dangling_bracket() {
        let source = "def f(:\n    pass\ndef g():\n    pass\n";
        let tokens = Lexer::new(source).tokenize().unwrap();
        let (_, def_g) = tokens
            .iter()
            .filter(|(t, _)| *t == Token::Def)
            .nth(1)
            .unwrap();
        assert_eq!(def_g.line, 3);
        // the broken line ends before `def g`, which gets its own indented body
        let kinds: Vec<_> = tokens.iter().map(|(t, _)| t.clone()).collect();
        let g = kinds.iter().rposition(|t| *t == Token::Def).unwrap();
        assert_eq!(kinds[g - 1], Token::Newline);
        assert_eq!(kinds.iter().filter(|t| **t == Token::Indent).count(), 1);
    }

    #[test]
    fn test_unclosed_bracket_at_eof() {
        let errors = Lexer::new("def f():\n    m = alloca([3, 3\n").tokenize().unwrap_err();
        assert!(matches!(errors[0], LexError::UnclosedBracket { .. }));
    }

    #[test]
    fn test_inconsistent_dedent() {
        let source = "def f():\n        pass\n    pass\n";
        let errors = Lexer::new(source).tokenize().unwrap_err();
        assert!(matches!(errors[0], LexError::InconsistentDedent { .. }));
        assert_eq!(errors[0].span().line, 3);
    }

    #[test]
    fn test_unexpected_character() {
        let errors = Lexer::new("x = $").tokenize().unwrap_err();
        assert!(matches!(
            errors[0],
            LexError::UnexpectedCharacter { char: '$', .. }
        ));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1_000 2.5 3e2 .5"),
            vec![
                Token::IntLiteral(1000),
                Token::FloatLiteral(2.5),
                Token::FloatLiteral(300.0),
                Token::FloatLiteral(0.5),
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_spans_track_lines() {
        let tokens = Lexer::new("a\n  b").tokenize().unwrap();
        let (_, span) = tokens
            .iter()
            .find(|(t, _)| *t == Token::Identifier("b".into()))
            .unwrap();
        assert_eq!((span.line, span.column), (2, 3));
    }
}
