//! Ramify Lowering Engine
//!
//! Lowers host function bodies written with ordinary conditionals into
//! region-based IR with structured `scf.if` operations:
//! - **Parser**: indentation-aware lexer and parser for host bodies (`parser` module)
//! - **Selector**: type-directed arithmetic, comparison and cast selection (`ops` module)
//! - **Lowering**: insertion-point stack, conditional protocol and AST rewriting (`lower` module)
//! - **IR**: values, operations, regions, verifier and MLIR-style printer (`ir` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use ramify_engine::Compiler;
//!
//! let source = "\
//! def ifs(M: f64, N: f64):
//!     one = constant(1.0)
//!     if M < N:
//!         mem = alloca([3, 3], f64)
//! ";
//!
//! let text = Compiler::default().emit(source)?;
//! assert!(text.contains("scf.if %0 {"));
//! ```

#![warn(rust_2018_idioms)]
#![cfg_attr(test, allow(clippy::float_cmp))]
#![allow(clippy::new_without_default)]
#![allow(clippy::module_inception)]

// ============================================================================
// Core Modules
// ============================================================================

/// IR module: types, values, operations, regions, printer and verifier
pub mod ir;

/// Typed operation selection for arithmetic, comparisons, casts and constants
pub mod ops;

/// Structured control-flow lowering
pub mod lower;

/// Host body lexer and parser
pub mod parser;

/// `ramify.toml` configuration
pub mod config;

/// Compilation errors
pub mod error;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{Config, ConfigError, LoweringOptions, OutputOptions};
pub use error::{CompileError, CompileResult};
pub use ir::{IrFunction, IrModule, IrType, OpBuilder, Value};
pub use lower::{lower_function, lower_module, FunctionBuilder};
pub use parser::{Lexer, ParseError, Parser};

use std::fmt::Write;
use tracing::debug;

/// Parse a source file into its syntax tree
pub fn parse_source(source: &str) -> CompileResult<parser::ast::Module> {
    let parser = Parser::new(source)
        .map_err(|errors| errors.into_iter().map(ParseError::from).collect::<Vec<_>>())?;
    Ok(parser.parse()?)
}

/// Source-to-IR pipeline configured by a [`Config`]
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: Config,
}

impl Compiler {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse and lower every function in `source`
    pub fn compile(&self, source: &str) -> CompileResult<IrModule> {
        let ast = parse_source(source)?;
        debug!(functions = ast.functions.len(), "parsed source");
        lower_module(&ast, &self.config.lowering)
    }

    /// Compile and print the result as text
    pub fn emit(&self, source: &str) -> CompileResult<String> {
        let module = self.compile(source)?;
        if self.config.output.module_wrapper {
            return Ok(module.to_string());
        }
        let mut out = String::new();
        for func in &module.functions {
            write!(out, "{}", func).map_err(|e| CompileError::InternalError {
                message: e.to_string(),
            })?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_reports_lex_errors() {
        let err = parse_source("def f():\n    x = $\n").unwrap_err();
        let CompileError::Parse { errors } = err else {
            panic!("expected parse error");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span.line, 2);
    }

    #[test]
    fn test_emit_without_module_wrapper() {
        let mut config = Config::default();
        config.output.module_wrapper = false;
        let text = Compiler::new(config).emit("def f():\n    pass\n").unwrap();
        assert!(text.starts_with("func.func @f() {"));
        assert!(!text.contains("module"));
    }

    #[test]
    fn test_compile_respects_lowering_mode() {
        let source = "def f(a: f64, b: f64):\n    if a < b:\n        pass\n";
        let mut config = Config::default();
        config.lowering.rewrite_ast = false;
        let err = Compiler::new(config).compile(source).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedFeature { .. }));
    }
}
