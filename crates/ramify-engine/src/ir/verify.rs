//! Structural IR verification
//!
//! Checks a finished function: single-block regions, operand visibility
//! (an operand must be defined earlier in the same block or in an enclosing
//! block), per-kind operand/result shapes, and the trailing `func.return`.

use super::block::Region;
use super::function::IrFunction;
use super::module::IrModule;
use super::op::{Attribute, OpKind, Operation};
use super::types::{IrType, TypeCategory};
use super::value::ValueId;
use rustc_hash::FxHashSet;

/// IR verification errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VerifyError {
    /// A region does not hold exactly one block
    #[error("{op} region {index} has {blocks} blocks (expected 1)")]
    RegionShape {
        op: &'static str,
        index: usize,
        blocks: usize,
    },

    /// Operand used where it is not visible
    #[error("{op} uses {value} which is not defined in this block or an enclosing one")]
    OperandNotVisible { op: &'static str, value: ValueId },

    /// Value defined more than once
    #[error("{value} is defined more than once")]
    Redefinition { value: ValueId },

    /// Operand/result/attribute counts or types do not fit the op kind
    #[error("malformed {op}: {reason}")]
    Malformed { op: &'static str, reason: String },

    /// Function body does not end in `func.return`, or returns early
    #[error("function @{function}: {reason}")]
    BadReturn { function: String, reason: String },
}

/// Verify every function of a module
pub fn verify_module(module: &IrModule) -> Result<(), VerifyError> {
    for func in &module.functions {
        verify_function(func)?;
    }
    Ok(())
}

/// Verify a single function
pub fn verify_function(func: &IrFunction) -> Result<(), VerifyError> {
    check_single_block("func.func", 0, &func.body)?;

    let entry = func.body.entry().map(|b| b.operations.as_slice()).unwrap_or(&[]);
    match entry.last() {
        Some(op) if op.kind == OpKind::Return => {}
        _ => {
            return Err(VerifyError::BadReturn {
                function: func.name.clone(),
                reason: "body does not end with func.return".to_string(),
            })
        }
    }
    let returns = func.ops_of_kind(OpKind::Return).len();
    if returns != 1 {
        return Err(VerifyError::BadReturn {
            function: func.name.clone(),
            reason: format!("found {} func.return ops (expected 1)", returns),
        });
    }

    let mut defined = FxHashSet::default();
    let mut visible = FxHashSet::default();
    for param in &func.params {
        if !defined.insert(param.id) {
            return Err(VerifyError::Redefinition { value: param.id });
        }
        visible.insert(param.id);
    }
    verify_region(&func.body, &visible, &mut defined)
}

fn check_single_block(op: &'static str, index: usize, region: &Region) -> Result<(), VerifyError> {
    if region.blocks.len() != 1 {
        return Err(VerifyError::RegionShape {
            op,
            index,
            blocks: region.blocks.len(),
        });
    }
    Ok(())
}

fn verify_region(
    region: &Region,
    enclosing: &FxHashSet<ValueId>,
    defined: &mut FxHashSet<ValueId>,
) -> Result<(), VerifyError> {
    let mut visible = enclosing.clone();
    for op in region.operations() {
        for operand in &op.operands {
            if !visible.contains(&operand.id) {
                return Err(VerifyError::OperandNotVisible {
                    op: op.kind.name(),
                    value: operand.id,
                });
            }
        }
        verify_shape(op)?;
        for (index, child) in op.regions.iter().enumerate() {
            check_single_block(op.kind.name(), index, child)?;
            verify_region(child, &visible, defined)?;
        }
        for result in &op.results {
            if !defined.insert(result.id) {
                return Err(VerifyError::Redefinition { value: result.id });
            }
            visible.insert(result.id);
        }
    }
    Ok(())
}

fn malformed(op: &Operation, reason: impl Into<String>) -> VerifyError {
    VerifyError::Malformed {
        op: op.kind.name(),
        reason: reason.into(),
    }
}

fn expect_counts(op: &Operation, operands: usize, results: usize) -> Result<(), VerifyError> {
    if op.operands.len() != operands || op.results.len() != results {
        return Err(malformed(
            op,
            format!(
                "expected {} operands and {} results, found {} and {}",
                operands,
                results,
                op.operands.len(),
                op.results.len()
            ),
        ));
    }
    Ok(())
}

fn verify_shape(op: &Operation) -> Result<(), VerifyError> {
    match op.kind {
        OpKind::If => {
            expect_counts(op, 1, 0)?;
            if !op.operands[0].ty.is_bool() {
                return Err(malformed(op, format!("condition has type {}", op.operands[0].ty)));
            }
            if op.regions.is_empty() || op.regions.len() > 2 {
                return Err(malformed(op, format!("has {} regions", op.regions.len())));
            }
        }
        OpKind::Return => expect_counts(op, 0, 0)?,
        OpKind::Constant => {
            expect_counts(op, 0, 1)?;
            let ty = &op.results[0].ty;
            let fits = match op.attributes.first() {
                Some(Attribute::Float(_)) => ty.is_float(),
                Some(Attribute::Int(_)) => ty.is_integer() || ty.is_index(),
                Some(Attribute::Bool(_)) => ty.is_bool(),
                _ => false,
            };
            if !fits {
                return Err(malformed(op, format!("value attribute does not fit {}", ty)));
            }
        }
        OpKind::Alloca => {
            expect_counts(op, 0, 1)?;
            if op.results[0].ty.category() != TypeCategory::MemRef {
                return Err(malformed(op, "result is not a memref"));
            }
        }
        OpKind::CmpF | OpKind::CmpI => {
            expect_counts(op, 2, 1)?;
            if op.operands[0].ty != op.operands[1].ty {
                return Err(malformed(
                    op,
                    format!("operand types differ: {} vs {}", op.operands[0].ty, op.operands[1].ty),
                ));
            }
            if op.results[0].ty != IrType::bool() {
                return Err(malformed(op, "result is not i1"));
            }
            let has_predicate = match op.kind {
                OpKind::CmpF => op.cmpf_predicate().is_some() && op.operands[0].ty.is_float(),
                _ => op.cmpi_predicate().is_some() && !op.operands[0].ty.is_float(),
            };
            if !has_predicate {
                return Err(malformed(op, "predicate does not match operand family"));
            }
        }
        kind if kind.is_binary() => {
            expect_counts(op, 2, 1)?;
            let ty = &op.results[0].ty;
            if &op.operands[0].ty != ty || &op.operands[1].ty != ty {
                return Err(malformed(op, "operand and result types differ"));
            }
        }
        kind if kind.is_unary() => {
            expect_counts(op, 1, 1)?;
            if op.operands[0].ty != op.results[0].ty {
                return Err(malformed(op, "operand and result types differ"));
            }
        }
        kind if kind.is_cast() => expect_counts(op, 1, 1)?,
        _ => {}
    }
    Ok(())
}
