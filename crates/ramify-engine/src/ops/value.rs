//! Method-call surface over the selector functions

use super::{arith, cast, CmpOp};
use crate::error::CompileResult;
use crate::ir::{IrType, OpBuilder, Value};

/// Arithmetic on typed values. Each method emits through `b` and returns
/// the fresh result.
pub trait ArithValue {
    fn add<B: OpBuilder + ?Sized>(&self, b: &mut B, rhs: &Value) -> CompileResult<Value>;
    fn sub<B: OpBuilder + ?Sized>(&self, b: &mut B, rhs: &Value) -> CompileResult<Value>;
    fn mul<B: OpBuilder + ?Sized>(&self, b: &mut B, rhs: &Value) -> CompileResult<Value>;
    fn neg<B: OpBuilder + ?Sized>(&self, b: &mut B) -> CompileResult<Value>;
    fn abs<B: OpBuilder + ?Sized>(&self, b: &mut B) -> CompileResult<Value>;
    fn floor<B: OpBuilder + ?Sized>(&self, b: &mut B) -> CompileResult<Value>;
    fn ceil<B: OpBuilder + ?Sized>(&self, b: &mut B) -> CompileResult<Value>;
    fn cmp<B: OpBuilder + ?Sized>(&self, b: &mut B, op: CmpOp, rhs: &Value) -> CompileResult<Value>;
    fn cast_to<B: OpBuilder + ?Sized>(
        &self,
        b: &mut B,
        to: &IrType,
        unsigned: bool,
    ) -> CompileResult<Value>;
}

impl ArithValue for Value {
    fn add<B: OpBuilder + ?Sized>(&self, b: &mut B, rhs: &Value) -> CompileResult<Value> {
        arith::add(b, self, rhs)
    }

    fn sub<B: OpBuilder + ?Sized>(&self, b: &mut B, rhs: &Value) -> CompileResult<Value> {
        arith::sub(b, self, rhs)
    }

    fn mul<B: OpBuilder + ?Sized>(&self, b: &mut B, rhs: &Value) -> CompileResult<Value> {
        arith::mul(b, self, rhs)
    }

    fn neg<B: OpBuilder + ?Sized>(&self, b: &mut B) -> CompileResult<Value> {
        arith::neg(b, self)
    }

    fn abs<B: OpBuilder + ?Sized>(&self, b: &mut B) -> CompileResult<Value> {
        arith::abs(b, self)
    }

    fn floor<B: OpBuilder + ?Sized>(&self, b: &mut B) -> CompileResult<Value> {
        arith::floor(b, self)
    }

    fn ceil<B: OpBuilder + ?Sized>(&self, b: &mut B) -> CompileResult<Value> {
        arith::ceil(b, self)
    }

    fn cmp<B: OpBuilder + ?Sized>(&self, b: &mut B, op: CmpOp, rhs: &Value) -> CompileResult<Value> {
        arith::compare(b, op, self, rhs)
    }

    fn cast_to<B: OpBuilder + ?Sized>(
        &self,
        b: &mut B,
        to: &IrType,
        unsigned: bool,
    ) -> CompileResult<Value> {
        cast::cast(b, to, self, unsigned)
    }
}
