//! Statement Lowering

use super::{HostValue, Lowerer};
use crate::error::{CompileError, CompileResult};
use crate::ir::Value;
use crate::ops;
use crate::parser::ast::{self, Statement};
use tracing::trace;

impl<'a> Lowerer<'a> {
    /// Lower a statement list in program order
    pub(super) fn lower_body(&mut self, body: &[Statement]) -> CompileResult<()> {
        for stmt in body {
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &Statement) -> CompileResult<()> {
        match stmt {
            Statement::Assignment(assign) => {
                let value = self.lower_expr(&assign.value)?;
                trace!(target = %assign.target.name, value = %value, "bind");
                self.bind(&assign.target.name, value);
            }
            Statement::Expression(expr) => {
                self.lower_expr(&expr.expression)?;
            }
            Statement::If(if_stmt) => {
                if self.options.rewrite_ast {
                    self.lower_if(if_stmt)?;
                } else {
                    self.lower_explicit_if(if_stmt)?;
                }
            }
            // `func.return` is appended when the builder finishes
            Statement::Pass(_) | Statement::Return(_) => {}
        }
        Ok(())
    }

    /// Rewrite a native `if` into the conditional protocol
    fn lower_if(&mut self, stmt: &ast::IfStatement) -> CompileResult<()> {
        let condition = self.lower_condition(&stmt.condition)?;
        self.builder.begin_conditional(&condition)?;
        self.lower_body(&stmt.then_body)?;
        self.builder.end_branch()?;

        if let Some(else_body) = &stmt.else_body {
            self.builder.begin_alternate()?;
            self.lower_body(else_body)?;
            self.builder.end_branch()?;
        }
        self.builder.end_conditional()
    }

    /// An `if begin_if(cond):` whose bodies bracket themselves
    fn lower_explicit_if(&mut self, stmt: &ast::IfStatement) -> CompileResult<()> {
        if stmt.condition.call_name() != Some("begin_if") {
            return Err(CompileError::UnsupportedFeature {
                feature: format!(
                    "native `if` at line {} with AST rewriting disabled; use `if begin_if(...):`",
                    stmt.span.line
                ),
            });
        }
        self.lower_expr(&stmt.condition)?;
        self.lower_body(&stmt.then_body)?;
        if let Some(else_body) = &stmt.else_body {
            self.lower_body(else_body)?;
        }
        Ok(())
    }

    /// Lower a condition to an `i1` value
    pub(super) fn lower_condition(&mut self, expr: &ast::Expression) -> CompileResult<Value> {
        match self.lower_expr(expr)? {
            HostValue::Value(value) => Ok(value),
            HostValue::Bool(b) => ops::constant_bool(&mut self.builder, b),
            other => Err(CompileError::invalid_argument(
                "if",
                format!("condition must be a boolean, got {}", other.kind_name()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::LoweringOptions;
    use crate::error::CompileError;
    use crate::ir::{IrFunction, OpKind};
    use crate::lower::lower_function;
    use crate::parser::Parser;

    fn lower(source: &str, options: &LoweringOptions) -> Result<IrFunction, CompileError> {
        let module = Parser::new(source).unwrap().parse().unwrap();
        lower_function(&module.functions[0], options)
    }

    #[test]
    fn test_elif_nests_in_else_region() {
        let source = "\
def f(a: f64, b: f64):
    if a < b:
        pass
    elif a > b:
        x = alloca([2], f64)
    else:
        y = alloca([3], f64)
";
        let func = lower(source, &LoweringOptions::default()).unwrap();
        let ifs = func.ops_of_kind(OpKind::If);
        assert_eq!(ifs.len(), 2);
        let outer_else = ifs[0].else_region().unwrap();
        let kinds: Vec<_> = outer_else.operations().map(|op| op.kind).collect();
        assert_eq!(kinds, vec![OpKind::CmpF, OpKind::If]);
    }

    #[test]
    fn test_host_bool_condition_materialized() {
        let func = lower("def f():\n    if True:\n        pass\n", &LoweringOptions::default())
            .unwrap();
        let entry = func.entry().unwrap();
        let kinds: Vec<_> = entry.iter().map(|op| op.kind).collect();
        assert_eq!(kinds, vec![OpKind::Constant, OpKind::If, OpKind::Return]);
    }

    #[test]
    fn test_non_boolean_condition() {
        let err = lower("def f(a: f64):\n    if a:\n        pass\n", &LoweringOptions::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedOperands { .. }));

        let err = lower("def f():\n    if 3:\n        pass\n", &LoweringOptions::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidArgument { .. }));
    }

    #[test]
    fn test_native_if_rejected_in_explicit_mode() {
        let source = "def f(a: f64, b: f64):\n    if a < b:\n        pass\n";
        let err = lower(source, &LoweringOptions::explicit()).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedFeature { .. }));
    }

    #[test]
    fn test_explicit_if_missing_end_if() {
        let source = "\
def f(a: f64, b: f64):
    if begin_if(a < b):
        end_branch()
";
        let err = lower(source, &LoweringOptions::explicit()).unwrap_err();
        assert!(matches!(err, CompileError::ProtocolMisuse { .. }));
    }

    #[test]
    fn test_branch_binding_out_of_scope_after_close() {
        let source = "\
def f(a: f64, b: f64):
    if a < b:
        x = constant(1.0)
    y = -x
";
        let err = lower(source, &LoweringOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::ValueOutOfScope { .. }));
    }
}
