//! Operation-construction capability
//!
//! The selector in [`crate::ops`] never touches blocks directly. It creates
//! operations through this trait, which the lowering engine implements by
//! appending to whatever block is the current insertion point.

use super::op::{Attribute, OpKind};
use super::types::IrType;
use super::value::Value;
use crate::error::{CompileError, CompileResult};

/// Creates operations at the current insertion point
pub trait OpBuilder {
    /// Append an operation with the given operands, attributes and result
    /// types; returns the fresh result values in order.
    fn build_op(
        &mut self,
        kind: OpKind,
        operands: Vec<Value>,
        attributes: Vec<Attribute>,
        result_types: Vec<IrType>,
    ) -> CompileResult<Vec<Value>>;

    /// Append a single-result operation
    fn build_value(
        &mut self,
        kind: OpKind,
        operands: Vec<Value>,
        attributes: Vec<Attribute>,
        result_type: IrType,
    ) -> CompileResult<Value> {
        self.build_op(kind, operands, attributes, vec![result_type])?
            .pop()
            .ok_or_else(|| CompileError::InternalError {
                message: format!("{} produced no result", kind),
            })
    }
}
