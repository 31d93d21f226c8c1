//! Typed operation selection
//!
//! Given already materialized operands and an intent, picks the concrete
//! operation family from the operands' [`TypeCategory`](crate::ir::TypeCategory),
//! inserts implicit casts and emits the result through an
//! [`OpBuilder`](crate::ir::OpBuilder).
//!
//! | category | family |
//! |----------|--------|
//! | float    | `arith.*f`, `arith.cmpf` (ordered predicates), `math.*` |
//! | integer  | `arith.*i`, `arith.cmpi` (signed predicates) |
//! | index    | `arith.*i`, `arith.cmpi` (unsigned predicates) |
//! | complex  | `complex.*` |
//!
//! Mixing categories is rejected, except that an index operand paired with
//! an integer operand is first cast to `si64`.

mod arith;
mod cast;
mod constant;
mod value;

pub use arith::{abs, add, ceil, compare, eq, floor, ge, gt, le, lt, mul, ne, neg, sub};
pub use cast::cast;
pub use constant::{constant_bool, constant_float, constant_index, constant_int};
pub use value::ArithValue;

use crate::error::{CompileError, CompileResult};
use crate::ir::{OpBuilder, Value};
use std::fmt;

/// The six syntactic relational operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl CmpOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
            CmpOp::Ge => ">=",
            CmpOp::Le => "<=",
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
        }
    }

    /// Whether the operator orders its operands (as opposed to `==`/`!=`)
    pub fn is_relational(&self) -> bool {
        !matches!(self, CmpOp::Eq | CmpOp::Ne)
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// What the caller wants computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Add,
    Sub,
    Mul,
    Neg,
    Abs,
    Floor,
    Ceil,
    Cmp(CmpOp),
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Add => "add",
            Intent::Sub => "sub",
            Intent::Mul => "mul",
            Intent::Neg => "neg",
            Intent::Abs => "abs",
            Intent::Floor => "floor",
            Intent::Ceil => "ceil",
            Intent::Cmp(_) => "cmp",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Intent::Neg | Intent::Abs | Intent::Floor | Intent::Ceil => 1,
            Intent::Add | Intent::Sub | Intent::Mul | Intent::Cmp(_) => 2,
        }
    }
}

/// Emit the operation selected for `intent` over `operands`
pub fn emit<B: OpBuilder + ?Sized>(
    b: &mut B,
    intent: Intent,
    operands: &[Value],
) -> CompileResult<Value> {
    if operands.len() != intent.arity() {
        return Err(CompileError::invalid_argument(
            intent.name(),
            format!("expected {} operands, got {}", intent.arity(), operands.len()),
        ));
    }
    match (intent, operands) {
        (Intent::Add, [lhs, rhs]) => add(b, lhs, rhs),
        (Intent::Sub, [lhs, rhs]) => sub(b, lhs, rhs),
        (Intent::Mul, [lhs, rhs]) => mul(b, lhs, rhs),
        (Intent::Cmp(op), [lhs, rhs]) => compare(b, op, lhs, rhs),
        (Intent::Neg, [x]) => neg(b, x),
        (Intent::Abs, [x]) => abs(b, x),
        (Intent::Floor, [x]) => floor(b, x),
        (Intent::Ceil, [x]) => ceil(b, x),
        _ => Err(CompileError::InternalError {
            message: format!("operand count check missed {}", intent.name()),
        }),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A bare [`OpBuilder`] that records operations in a flat list

    use crate::error::CompileResult;
    use crate::ir::{Attribute, IrType, OpBuilder, OpKind, Operation, Value, ValueId};

    #[derive(Default)]
    pub struct Recorder {
        pub ops: Vec<Operation>,
        next: u32,
    }

    impl Recorder {
        pub fn value(&mut self, ty: IrType) -> Value {
            let v = Value::new(ValueId(self.next), ty);
            self.next += 1;
            v
        }

        pub fn kinds(&self) -> Vec<OpKind> {
            self.ops.iter().map(|op| op.kind).collect()
        }
    }

    impl OpBuilder for Recorder {
        fn build_op(
            &mut self,
            kind: OpKind,
            operands: Vec<Value>,
            attributes: Vec<Attribute>,
            result_types: Vec<IrType>,
        ) -> CompileResult<Vec<Value>> {
            let results: Vec<Value> = result_types.into_iter().map(|ty| self.value(ty)).collect();
            self.ops
                .push(Operation::new(kind, operands, attributes, results.clone()));
            Ok(results)
        }
    }
}
