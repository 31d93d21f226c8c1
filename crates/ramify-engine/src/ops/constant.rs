//! `arith.constant` materialization

use crate::error::{CompileError, CompileResult};
use crate::ir::{Attribute, FloatKind, IrType, OpBuilder, OpKind, Signedness, Value};

/// Float constant of the given format
pub fn constant_float<B: OpBuilder + ?Sized>(
    b: &mut B,
    value: f64,
    kind: FloatKind,
) -> CompileResult<Value> {
    b.build_value(
        OpKind::Constant,
        vec![],
        vec![Attribute::Float(value)],
        IrType::Float(kind),
    )
}

fn fits(value: i64, width: u32, signedness: Signedness) -> bool {
    if width >= 64 {
        return signedness != Signedness::Unsigned || value >= 0;
    }
    let value = i128::from(value);
    let span = 1i128 << width;
    match signedness {
        Signedness::Unsigned => (0..span).contains(&value),
        Signedness::Signed => (-(span / 2)..span / 2).contains(&value),
        // Signless constants accept either interpretation of the bits
        Signedness::Signless => (-(span / 2)..span).contains(&value),
    }
}

/// Integer constant; `ty` must be an integer type wide enough for `value`
pub fn constant_int<B: OpBuilder + ?Sized>(
    b: &mut B,
    value: i64,
    ty: &IrType,
) -> CompileResult<Value> {
    let IrType::Integer { width, signedness } = ty else {
        return Err(CompileError::invalid_argument(
            "constant",
            format!("{} is not an integer type", ty),
        ));
    };
    if !fits(value, *width, *signedness) {
        return Err(CompileError::invalid_argument(
            "constant",
            format!("{} does not fit in {}", value, ty),
        ));
    }
    b.build_value(OpKind::Constant, vec![], vec![Attribute::Int(value)], ty.clone())
}

/// Index constant
pub fn constant_index<B: OpBuilder + ?Sized>(b: &mut B, value: i64) -> CompileResult<Value> {
    b.build_value(OpKind::Constant, vec![], vec![Attribute::Int(value)], IrType::Index)
}

/// `i1` constant
pub fn constant_bool<B: OpBuilder + ?Sized>(b: &mut B, value: bool) -> CompileResult<Value> {
    b.build_value(OpKind::Constant, vec![], vec![Attribute::Bool(value)], IrType::bool())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::testing::Recorder;

    #[test]
    fn test_float_constant() {
        let mut b = Recorder::default();
        let c = constant_float(&mut b, 1.5, FloatKind::F32).unwrap();
        assert_eq!(c.ty, IrType::f32());
        assert_eq!(b.ops[0].attributes, vec![Attribute::Float(1.5)]);
    }

    #[test]
    fn test_int_constant_range() {
        let mut b = Recorder::default();
        constant_int(&mut b, 255, &IrType::unsigned(8)).unwrap();
        constant_int(&mut b, 255, &IrType::signless(8)).unwrap();
        constant_int(&mut b, -128, &IrType::signed(8)).unwrap();
        constant_int(&mut b, i64::MIN, &IrType::signed(64)).unwrap();
        assert_eq!(b.ops.len(), 4);

        assert!(constant_int(&mut b, 256, &IrType::unsigned(8)).is_err());
        assert!(constant_int(&mut b, 128, &IrType::signed(8)).is_err());
        assert!(constant_int(&mut b, -1, &IrType::unsigned(64)).is_err());
        assert!(constant_int(&mut b, 2, &IrType::bool()).is_err());
        assert_eq!(b.ops.len(), 4);
    }

    #[test]
    fn test_int_constant_rejects_non_integer() {
        let mut b = Recorder::default();
        let err = constant_int(&mut b, 1, &IrType::f64()).unwrap_err();
        assert!(matches!(err, CompileError::InvalidArgument { .. }));
    }

    #[test]
    fn test_index_and_bool() {
        let mut b = Recorder::default();
        let k = constant_index(&mut b, 7).unwrap();
        let t = constant_bool(&mut b, true).unwrap();
        assert_eq!(k.ty, IrType::Index);
        assert_eq!(t.ty, IrType::bool());
        assert_eq!(b.ops[1].attributes, vec![Attribute::Bool(true)]);
    }
}
