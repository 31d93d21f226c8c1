//! Expression Lowering
//!
//! Host-only operands are folded on the host. As soon as one operand is an
//! IR value the other is materialized as a constant of its type and the
//! selector picks the operation.

use super::{resolve_type, HostValue, Lowerer};
use crate::error::{CompileError, CompileResult};
use crate::ir::{IrType, Value};
use crate::ops::{self, CmpOp, Intent};
use crate::parser::ast::{self, BinaryOperator, Expression, UnaryOperator};

fn intent_of(op: BinaryOperator) -> Intent {
    match op {
        BinaryOperator::Add => Intent::Add,
        BinaryOperator::Subtract => Intent::Sub,
        BinaryOperator::Multiply => Intent::Mul,
        BinaryOperator::LessThan => Intent::Cmp(CmpOp::Lt),
        BinaryOperator::GreaterThan => Intent::Cmp(CmpOp::Gt),
        BinaryOperator::LessEqual => Intent::Cmp(CmpOp::Le),
        BinaryOperator::GreaterEqual => Intent::Cmp(CmpOp::Ge),
        BinaryOperator::Equal => Intent::Cmp(CmpOp::Eq),
        BinaryOperator::NotEqual => Intent::Cmp(CmpOp::Ne),
    }
}

fn compare<T: PartialOrd>(op: CmpOp, lhs: T, rhs: T) -> bool {
    match op {
        CmpOp::Gt => lhs > rhs,
        CmpOp::Lt => lhs < rhs,
        CmpOp::Ge => lhs >= rhs,
        CmpOp::Le => lhs <= rhs,
        CmpOp::Eq => lhs == rhs,
        CmpOp::Ne => lhs != rhs,
    }
}

fn overflow(intent: Intent, lhs: i64, rhs: i64) -> CompileError {
    CompileError::invalid_argument(
        intent.name(),
        format!("{} and {} overflow a 64-bit integer", lhs, rhs),
    )
}

/// Evaluate an operator over two host values
fn fold(intent: Intent, lhs: &HostValue, rhs: &HostValue) -> CompileResult<HostValue> {
    use HostValue::{Bool, Float, Int};

    let folded = match (intent, lhs, rhs) {
        (Intent::Cmp(op), Int(a), Int(b)) => Bool(compare(op, a, b)),
        (Intent::Add, Int(a), Int(b)) => Int(a.checked_add(*b).ok_or_else(|| overflow(intent, *a, *b))?),
        (Intent::Sub, Int(a), Int(b)) => Int(a.checked_sub(*b).ok_or_else(|| overflow(intent, *a, *b))?),
        (Intent::Mul, Int(a), Int(b)) => Int(a.checked_mul(*b).ok_or_else(|| overflow(intent, *a, *b))?),
        (Intent::Cmp(op), Bool(a), Bool(b)) if !op.is_relational() => Bool(compare(op, a, b)),
        (_, Int(_) | Float(_), Int(_) | Float(_)) => {
            let (a, b) = (as_float(lhs), as_float(rhs));
            match intent {
                Intent::Cmp(op) => Bool(compare(op, a, b)),
                Intent::Add => Float(a + b),
                Intent::Sub => Float(a - b),
                _ => Float(a * b),
            }
        }
        _ => {
            return Err(CompileError::invalid_argument(
                intent.name(),
                format!(
                    "cannot combine {} and {}",
                    lhs.kind_name(),
                    rhs.kind_name()
                ),
            ))
        }
    };
    Ok(folded)
}

fn as_float(value: &HostValue) -> f64 {
    match value {
        HostValue::Int(n) => *n as f64,
        HostValue::Float(x) => *x,
        _ => f64::NAN,
    }
}

impl<'a> Lowerer<'a> {
    pub(super) fn lower_expr(&mut self, expr: &Expression) -> CompileResult<HostValue> {
        match expr {
            Expression::IntLiteral(lit) => Ok(HostValue::Int(lit.value)),
            Expression::FloatLiteral(lit) => Ok(HostValue::Float(lit.value)),
            Expression::BooleanLiteral(lit) => Ok(HostValue::Bool(lit.value)),
            Expression::NoneLiteral(_) => Ok(HostValue::None),
            Expression::Identifier(ident) => self.lookup(&ident.name),
            Expression::TypeName(ty) => resolve_type(&ty.name).map(HostValue::Type),
            Expression::List(list) => list
                .elements
                .iter()
                .map(|e| self.lower_expr(e))
                .collect::<CompileResult<Vec<_>>>()
                .map(HostValue::List),
            Expression::Unary(unary) => self.lower_unary(unary),
            Expression::Binary(binary) => self.lower_binary(binary),
            Expression::Call(call) => self.lower_call(call),
        }
    }

    /// Variables first, then type names like `f64`
    fn lookup(&self, name: &str) -> CompileResult<HostValue> {
        if let Some(value) = self.env.get(name) {
            return Ok(value.clone());
        }
        name.parse::<IrType>()
            .map(HostValue::Type)
            .map_err(|_| CompileError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    fn lower_unary(&mut self, unary: &ast::UnaryExpression) -> CompileResult<HostValue> {
        let UnaryOperator::Minus = unary.operator;
        match self.lower_expr(&unary.operand)? {
            HostValue::Int(n) => n.checked_neg().map(HostValue::Int).ok_or_else(|| {
                CompileError::invalid_argument("neg", format!("-({}) overflows", n))
            }),
            HostValue::Float(x) => Ok(HostValue::Float(-x)),
            HostValue::Value(v) => ops::neg(&mut self.builder, &v).map(HostValue::Value),
            other => Err(CompileError::invalid_argument(
                "neg",
                format!("cannot negate {}", other.kind_name()),
            )),
        }
    }

    fn lower_binary(&mut self, binary: &ast::BinaryExpression) -> CompileResult<HostValue> {
        let intent = intent_of(binary.operator);
        let lhs = self.lower_expr(&binary.left)?;
        let rhs = self.lower_expr(&binary.right)?;

        let operands = match (lhs, rhs) {
            (HostValue::Value(l), HostValue::Value(r)) => [l, r],
            (HostValue::Value(l), host) => {
                let r = self.materialize(&host, &l.ty, intent)?;
                [l, r]
            }
            (host, HostValue::Value(r)) => {
                let l = self.materialize(&host, &r.ty, intent)?;
                [l, r]
            }
            (lhs, rhs) => return fold(intent, &lhs, &rhs),
        };
        ops::emit(&mut self.builder, intent, &operands).map(HostValue::Value)
    }

    /// Emit a host literal as a constant of `ty`
    pub(super) fn materialize(
        &mut self,
        host: &HostValue,
        ty: &IrType,
        intent: Intent,
    ) -> CompileResult<Value> {
        let b = &mut self.builder;
        match (host, ty) {
            (HostValue::Bool(v), ty) if ty.is_bool() => ops::constant_bool(b, *v),
            (HostValue::Int(n), IrType::Integer { .. }) => ops::constant_int(b, *n, ty),
            (HostValue::Int(n), IrType::Index) => ops::constant_index(b, *n),
            (HostValue::Int(n), IrType::Float(kind)) => ops::constant_float(b, *n as f64, *kind),
            (HostValue::Float(x), IrType::Float(kind)) => ops::constant_float(b, *x, *kind),
            _ => Err(CompileError::invalid_argument(
                intent.name(),
                format!("cannot use {} `{}` as {}", host.kind_name(), host, ty),
            )),
        }
    }
}
