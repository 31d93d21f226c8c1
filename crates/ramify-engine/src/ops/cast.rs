//! Explicit and implicit conversions

use crate::error::{CompileError, CompileResult};
use crate::ir::{IrType, OpBuilder, OpKind, Value};

fn invalid(from: &IrType, to: &IrType) -> CompileError {
    CompileError::InvalidCast {
        from: from.to_string(),
        to: to.to_string(),
    }
}

/// Pick the conversion op for `from -> to`
fn select(from: &IrType, to: &IrType, unsigned: bool) -> CompileResult<OpKind> {
    let widths = from.bit_width().zip(to.bit_width());
    let kind = match (from, to) {
        (IrType::Integer { .. }, IrType::Integer { .. }) => match widths {
            Some((f, t)) if t > f && unsigned => OpKind::ExtUI,
            Some((f, t)) if t > f => OpKind::ExtSI,
            Some((f, t)) if t < f => OpKind::TruncI,
            _ => return Err(invalid(from, to)),
        },
        (IrType::Float(_), IrType::Float(_)) => match widths {
            Some((f, t)) if t > f => OpKind::ExtF,
            Some((f, t)) if t < f => OpKind::TruncF,
            _ => return Err(invalid(from, to)),
        },
        (IrType::Float(_), IrType::Integer { .. }) if unsigned => OpKind::FPToUI,
        (IrType::Float(_), IrType::Integer { .. }) => OpKind::FPToSI,
        (IrType::Integer { .. }, IrType::Float(_)) if unsigned => OpKind::UIToFP,
        (IrType::Integer { .. }, IrType::Float(_)) => OpKind::SIToFP,
        (IrType::Index, IrType::Integer { .. }) | (IrType::Integer { .. }, IrType::Index) => {
            OpKind::IndexCast
        }
        (IrType::Index, IrType::Index) => return Err(invalid(from, to)),
        _ => return Err(CompileError::unsupported("cast", &[from, to])),
    };
    Ok(kind)
}

/// Convert `operand` to `to`.
///
/// `unsigned` picks zero-extension and the unsigned int/float conversions;
/// index casts ignore it.
pub fn cast<B: OpBuilder + ?Sized>(
    b: &mut B,
    to: &IrType,
    operand: &Value,
    unsigned: bool,
) -> CompileResult<Value> {
    let kind = select(&operand.ty, to, unsigned)?;
    b.build_value(kind, vec![operand.clone()], vec![], to.clone())
}
