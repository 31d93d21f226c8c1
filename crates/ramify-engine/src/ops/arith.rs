//! Arithmetic, unary math and comparison selection

use super::cast::cast;
use super::CmpOp;
use crate::error::{CompileError, CompileResult};
use crate::ir::{
    Attribute, CmpFPredicate, CmpIPredicate, IrType, OpBuilder, OpKind, TypeCategory, Value,
};

/// Bring two operands into one category.
///
/// Same-category operands must already agree on their type. An index
/// operand facing an integer operand is cast to `si64` first; every other
/// mix is rejected.
fn unify<B: OpBuilder + ?Sized>(
    b: &mut B,
    op: &str,
    lhs: &Value,
    rhs: &Value,
) -> CompileResult<(Value, Value)> {
    let (lhs, rhs) = match (lhs.ty.category(), rhs.ty.category()) {
        (l, r) if l == r => (lhs.clone(), rhs.clone()),
        (TypeCategory::Index, TypeCategory::Integer) => {
            tracing::trace!(op, "promoting index lhs to si64");
            (cast(b, &IrType::signed(64), lhs, false)?, rhs.clone())
        }
        (TypeCategory::Integer, TypeCategory::Index) => {
            tracing::trace!(op, "promoting index rhs to si64");
            (lhs.clone(), cast(b, &IrType::signed(64), rhs, false)?)
        }
        _ => return Err(CompileError::unsupported(op, &[&lhs.ty, &rhs.ty])),
    };
    if lhs.ty != rhs.ty {
        return Err(CompileError::unsupported(op, &[&lhs.ty, &rhs.ty]));
    }
    Ok((lhs, rhs))
}

fn binary<B: OpBuilder + ?Sized>(
    b: &mut B,
    op: &str,
    lhs: &Value,
    rhs: &Value,
    select: fn(TypeCategory) -> Option<OpKind>,
) -> CompileResult<Value> {
    let (lhs, rhs) = unify(b, op, lhs, rhs)?;
    let kind = select(lhs.ty.category())
        .ok_or_else(|| CompileError::unsupported(op, &[&lhs.ty, &rhs.ty]))?;
    let ty = lhs.ty.clone();
    b.build_value(kind, vec![lhs, rhs], vec![], ty)
}

/// `lhs + rhs`
pub fn add<B: OpBuilder + ?Sized>(b: &mut B, lhs: &Value, rhs: &Value) -> CompileResult<Value> {
    binary(b, "add", lhs, rhs, |category| match category {
        TypeCategory::Float => Some(OpKind::AddF),
        TypeCategory::Integer | TypeCategory::Index | TypeCategory::Bool => Some(OpKind::AddI),
        TypeCategory::Complex => Some(OpKind::ComplexAdd),
        _ => None,
    })
}

/// `lhs - rhs`
pub fn sub<B: OpBuilder + ?Sized>(b: &mut B, lhs: &Value, rhs: &Value) -> CompileResult<Value> {
    binary(b, "sub", lhs, rhs, |category| match category {
        TypeCategory::Float => Some(OpKind::SubF),
        TypeCategory::Integer | TypeCategory::Index | TypeCategory::Bool => Some(OpKind::SubI),
        TypeCategory::Complex => Some(OpKind::ComplexSub),
        _ => None,
    })
}

/// `lhs * rhs`
pub fn mul<B: OpBuilder + ?Sized>(b: &mut B, lhs: &Value, rhs: &Value) -> CompileResult<Value> {
    binary(b, "mul", lhs, rhs, |category| match category {
        TypeCategory::Float => Some(OpKind::MulF),
        TypeCategory::Integer | TypeCategory::Index | TypeCategory::Bool => Some(OpKind::MulI),
        TypeCategory::Complex => Some(OpKind::ComplexMul),
        _ => None,
    })
}

fn unary<B: OpBuilder + ?Sized>(b: &mut B, op: &str, x: &Value, kind: Option<OpKind>) -> CompileResult<Value> {
    let kind = kind.ok_or_else(|| CompileError::unsupported(op, &[&x.ty]))?;
    b.build_value(kind, vec![x.clone()], vec![], x.ty.clone())
}

/// `-x` for floats and complex numbers
pub fn neg<B: OpBuilder + ?Sized>(b: &mut B, x: &Value) -> CompileResult<Value> {
    let kind = match x.ty.category() {
        TypeCategory::Float => Some(OpKind::NegF),
        TypeCategory::Complex => Some(OpKind::ComplexNeg),
        _ => None,
    };
    unary(b, "neg", x, kind)
}

/// `|x|` for floats
pub fn abs<B: OpBuilder + ?Sized>(b: &mut B, x: &Value) -> CompileResult<Value> {
    unary(b, "abs", x, x.ty.is_float().then_some(OpKind::AbsF))
}

/// `floor(x)` for floats
pub fn floor<B: OpBuilder + ?Sized>(b: &mut B, x: &Value) -> CompileResult<Value> {
    unary(b, "floor", x, x.ty.is_float().then_some(OpKind::Floor))
}

/// `ceil(x)` for floats
pub fn ceil<B: OpBuilder + ?Sized>(b: &mut B, x: &Value) -> CompileResult<Value> {
    unary(b, "ceil", x, x.ty.is_float().then_some(OpKind::Ceil))
}

fn float_predicate(op: CmpOp) -> CmpFPredicate {
    match op {
        CmpOp::Gt => CmpFPredicate::Ogt,
        CmpOp::Lt => CmpFPredicate::Olt,
        CmpOp::Ge => CmpFPredicate::Oge,
        CmpOp::Le => CmpFPredicate::Ole,
        CmpOp::Eq => CmpFPredicate::Oeq,
        CmpOp::Ne => CmpFPredicate::One,
    }
}

fn integer_predicate(op: CmpOp, unsigned: bool) -> CmpIPredicate {
    match (op, unsigned) {
        (CmpOp::Eq, _) => CmpIPredicate::Eq,
        (CmpOp::Ne, _) => CmpIPredicate::Ne,
        (CmpOp::Gt, false) => CmpIPredicate::Sgt,
        (CmpOp::Lt, false) => CmpIPredicate::Slt,
        (CmpOp::Ge, false) => CmpIPredicate::Sge,
        (CmpOp::Le, false) => CmpIPredicate::Sle,
        (CmpOp::Gt, true) => CmpIPredicate::Ugt,
        (CmpOp::Lt, true) => CmpIPredicate::Ult,
        (CmpOp::Ge, true) => CmpIPredicate::Uge,
        (CmpOp::Le, true) => CmpIPredicate::Ule,
    }
}

/// Compare two operands; the result is always `i1`
pub fn compare<B: OpBuilder + ?Sized>(
    b: &mut B,
    op: CmpOp,
    lhs: &Value,
    rhs: &Value,
) -> CompileResult<Value> {
    let name = format!("cmp {}", op);
    let (lhs, rhs) = unify(b, &name, lhs, rhs)?;
    let (kind, predicate) = match lhs.ty.category() {
        TypeCategory::Float => (OpKind::CmpF, Attribute::CmpF(float_predicate(op))),
        // signedness of the type does not pick the predicate; only index is unsigned
        TypeCategory::Integer => (OpKind::CmpI, Attribute::CmpI(integer_predicate(op, false))),
        TypeCategory::Index => (OpKind::CmpI, Attribute::CmpI(integer_predicate(op, true))),
        TypeCategory::Bool if !op.is_relational() => {
            (OpKind::CmpI, Attribute::CmpI(integer_predicate(op, false)))
        }
        _ => return Err(CompileError::unsupported(name, &[&lhs.ty, &rhs.ty])),
    };
    b.build_value(kind, vec![lhs, rhs], vec![predicate], IrType::bool())
}

/// `lhs > rhs`
pub fn gt<B: OpBuilder + ?Sized>(b: &mut B, lhs: &Value, rhs: &Value) -> CompileResult<Value> {
    compare(b, CmpOp::Gt, lhs, rhs)
}

/// `lhs < rhs`
pub fn lt<B: OpBuilder + ?Sized>(b: &mut B, lhs: &Value, rhs: &Value) -> CompileResult<Value> {
    compare(b, CmpOp::Lt, lhs, rhs)
}

/// `lhs >= rhs`
pub fn ge<B: OpBuilder + ?Sized>(b: &mut B, lhs: &Value, rhs: &Value) -> CompileResult<Value> {
    compare(b, CmpOp::Ge, lhs, rhs)
}

/// `lhs <= rhs`
pub fn le<B: OpBuilder + ?Sized>(b: &mut B, lhs: &Value, rhs: &Value) -> CompileResult<Value> {
    compare(b, CmpOp::Le, lhs, rhs)
}

/// `lhs == rhs`
pub fn eq<B: OpBuilder + ?Sized>(b: &mut B, lhs: &Value, rhs: &Value) -> CompileResult<Value> {
    compare(b, CmpOp::Eq, lhs, rhs)
}

/// `lhs != rhs`
pub fn ne<B: OpBuilder + ?Sized>(b: &mut B, lhs: &Value, rhs: &Value) -> CompileResult<Value> {
    compare(b, CmpOp::Ne, lhs, rhs)
}
