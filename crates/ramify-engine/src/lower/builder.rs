//! Function builder
//!
//! Owns everything one lowering pass mutates: the entry block, the
//! insertion-point stack and the value/block counters. Operations are
//! appended to the innermost open block; the four-call protocol opens and
//! closes conditional branches around them.

use super::control_flow::{ConditionalFrame, ConstructId, InsertionStack, OpenBlock};
use crate::error::{CompileError, CompileResult};
use crate::ir::{
    Attribute, BlockId, IrFunction, IrType, OpBuilder, OpKind, Operation, Region, Value, ValueId,
};
use tracing::{debug, trace};

pub struct FunctionBuilder {
    name: String,
    params: Vec<Value>,
    entry: OpenBlock,
    stack: InsertionStack,
    next_value: u32,
    next_block: u32,
    next_construct: u32,
}

impl FunctionBuilder {
    /// Create a builder whose entry block defines one value per parameter
    pub fn new(name: impl Into<String>, param_types: Vec<IrType>) -> Self {
        let mut builder = Self {
            name: name.into(),
            params: Vec::with_capacity(param_types.len()),
            entry: OpenBlock::new(BlockId(0)),
            stack: InsertionStack::new(),
            next_value: 0,
            next_block: 1,
            next_construct: 0,
        };
        for ty in param_types {
            let param = builder.fresh_value(ty);
            builder.entry.define(&param);
            builder.params.push(param);
        }
        builder
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Number of open conditionals
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Whether `value` may be used at the current insertion point
    pub fn is_visible(&self, value: &Value) -> bool {
        self.entry.defines(value.id) || self.stack.defines(value.id)
    }

    fn fresh_value(&mut self, ty: IrType) -> Value {
        let value = Value::new(ValueId(self.next_value), ty);
        self.next_value += 1;
        value
    }

    fn fresh_block(&mut self) -> BlockId {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        id
    }

    /// The block new operations go into
    fn insertion_block(&mut self) -> CompileResult<&mut OpenBlock> {
        match self.stack.current_mut() {
            None => Ok(&mut self.entry),
            Some(frame) => {
                let (id, state) = (frame.id, frame.state());
                frame.open_block_mut().ok_or_else(|| {
                    CompileError::protocol(format!(
                        "cannot emit operations {} of {}",
                        state, id
                    ))
                })
            }
        }
    }

    fn check_visible(&self, operands: &[Value]) -> CompileResult<()> {
        match operands.iter().find(|v| !self.is_visible(v)) {
            Some(value) => Err(CompileError::ValueOutOfScope { value: value.id }),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Conditional protocol
    // ========================================================================

    /// Open a conditional on `condition` and start its then branch
    pub fn begin_conditional(&mut self, condition: &Value) -> CompileResult<ConstructId> {
        self.insertion_block()?;
        if !condition.ty.is_bool() {
            return Err(CompileError::unsupported("scf.if", &[&condition.ty]));
        }
        self.check_visible(std::slice::from_ref(condition))?;

        let id = ConstructId(self.next_construct);
        self.next_construct += 1;
        let block = self.fresh_block();
        self.stack
            .push(ConditionalFrame::new(id, condition.clone(), block));
        debug!(construct = %id, depth = self.depth(), "begin conditional");
        Ok(id)
    }

    /// Open the else branch of the innermost conditional
    pub fn begin_alternate(&mut self) -> CompileResult<()> {
        let block = BlockId(self.next_block);
        let frame = self
            .stack
            .current_mut()
            .ok_or_else(|| CompileError::protocol("begin_alternate called with no open conditional"))?;
        frame.open_alternate(block)?;
        self.next_block += 1;
        debug!(construct = %frame.id, "begin alternate");
        Ok(())
    }

    /// Close the branch currently being filled
    pub fn end_branch(&mut self) -> CompileResult<()> {
        let frame = self
            .stack
            .current_mut()
            .ok_or_else(|| CompileError::protocol("end_branch called with no open conditional"))?;
        frame.close_branch()?;
        trace!(construct = %frame.id, state = ?frame.state(), "end branch");
        Ok(())
    }

    /// Close the innermost conditional and append its `scf.if` to the
    /// enclosing block
    pub fn end_conditional(&mut self) -> CompileResult<()> {
        let frame = self
            .stack
            .current()
            .ok_or_else(|| CompileError::protocol("end_conditional called with no open conditional"))?;
        if frame.state().has_open_block() {
            return Err(CompileError::protocol(format!(
                "end_conditional called {} of {}",
                frame.state(),
                frame.id
            )));
        }
        let id = frame.id;
        let op = self
            .stack
            .pop()
            .ok_or_else(|| CompileError::InternalError {
                message: format!("{} vanished from the insertion stack", id),
            })?
            .into_operation()?;
        self.insertion_block()?.push(op);
        debug!(construct = %id, depth = self.depth(), "end conditional");
        Ok(())
    }

    /// Append `func.return` and hand back the finished function
    pub fn finish(mut self) -> CompileResult<IrFunction> {
        if let Some(frame) = self.stack.current() {
            return Err(CompileError::protocol(format!(
                "function @{} finished with {} open conditional(s); innermost {} is {}",
                self.name,
                self.stack.depth(),
                frame.id,
                frame.state()
            )));
        }
        self.entry
            .push(Operation::new(OpKind::Return, vec![], vec![], vec![]));
        let body = Region::with_block(self.entry.into_block());
        Ok(IrFunction::new(self.name, self.params, body))
    }
}

impl OpBuilder for FunctionBuilder {
    fn build_op(
        &mut self,
        kind: OpKind,
        operands: Vec<Value>,
        attributes: Vec<Attribute>,
        result_types: Vec<IrType>,
    ) -> CompileResult<Vec<Value>> {
        if matches!(kind, OpKind::If | OpKind::Return) {
            return Err(CompileError::protocol(format!(
                "{} is only created by the conditional protocol and finish()",
                kind
            )));
        }
        self.insertion_block()?;
        self.check_visible(&operands)?;

        let results: Vec<Value> = result_types
            .into_iter()
            .map(|ty| self.fresh_value(ty))
            .collect();
        trace!(op = %kind, results = results.len(), depth = self.depth(), "build op");
        let op = Operation::new(kind, operands, attributes, results.clone());
        self.insertion_block()?.push(op);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{verify_function, FloatKind};
    use crate::ops;

    fn two_floats() -> FunctionBuilder {
        FunctionBuilder::new("f", vec![IrType::f64(), IrType::f64()])
    }

    #[test]
    fn test_params_are_first_values() {
        let b = two_floats();
        assert_eq!(b.params()[0].id, ValueId(0));
        assert_eq!(b.params()[1].id, ValueId(1));
        assert!(b.is_visible(&b.params()[1]));
    }

    #[test]
    fn test_then_only_construct() {
        let mut b = two_floats();
        let (m, n) = (b.params()[0].clone(), b.params()[1].clone());
        let cond = ops::lt(&mut b, &m, &n).unwrap();

        b.begin_conditional(&cond).unwrap();
        assert_eq!(b.depth(), 1);
        b.build_value(OpKind::Alloca, vec![], vec![], IrType::memref(vec![3, 3], IrType::f64()))
            .unwrap();
        b.end_branch().unwrap();
        b.end_conditional().unwrap();
        assert_eq!(b.depth(), 0);

        let func = b.finish().unwrap();
        verify_function(&func).unwrap();
        let ifs = func.ops_of_kind(OpKind::If);
        assert_eq!(ifs.len(), 1);
        assert!(ifs[0].else_region().is_none());
        assert_eq!(ifs[0].then_region().unwrap().operation_count(), 1);
    }

    #[test]
    fn test_nested_construct_lands_in_parent_block() {
        let mut b = two_floats();
        let (m, n) = (b.params()[0].clone(), b.params()[1].clone());
        let outer = ops::lt(&mut b, &m, &n).unwrap();
        b.begin_conditional(&outer).unwrap();
        let inner = ops::gt(&mut b, &m, &n).unwrap();
        b.begin_conditional(&inner).unwrap();
        b.end_branch().unwrap();
        b.begin_alternate().unwrap();
        b.end_branch().unwrap();
        b.end_conditional().unwrap();
        b.end_branch().unwrap();
        b.end_conditional().unwrap();

        let func = b.finish().unwrap();
        let entry = func.entry().unwrap();
        let kinds: Vec<_> = entry.iter().map(|op| op.kind).collect();
        assert_eq!(kinds, vec![OpKind::CmpF, OpKind::If, OpKind::Return]);
        let then_kinds: Vec<_> = entry.operations[1]
            .then_region()
            .unwrap()
            .operations()
            .map(|op| op.kind)
            .collect();
        assert_eq!(then_kinds, vec![OpKind::CmpF, OpKind::If]);
    }

    #[test]
    fn test_protocol_misuse() {
        let mut b = two_floats();
        assert!(matches!(b.begin_alternate(), Err(CompileError::ProtocolMisuse { .. })));
        assert!(matches!(b.end_branch(), Err(CompileError::ProtocolMisuse { .. })));
        assert!(matches!(b.end_conditional(), Err(CompileError::ProtocolMisuse { .. })));

        let c = ops::constant_bool(&mut b, true).unwrap();
        b.begin_conditional(&c).unwrap();
        // still inside the then branch
        assert!(matches!(b.end_conditional(), Err(CompileError::ProtocolMisuse { .. })));
    }

    #[test]
    fn test_emit_between_branches_rejected() {
        let mut b = two_floats();
        let c = ops::constant_bool(&mut b, true).unwrap();
        b.begin_conditional(&c).unwrap();
        b.end_branch().unwrap();

        let err = ops::constant_float(&mut b, 1.0, FloatKind::F64).unwrap_err();
        assert!(matches!(err, CompileError::ProtocolMisuse { .. }));
        assert!(b.begin_conditional(&c).is_err());
    }

    #[test]
    fn test_finish_with_open_construct() {
        let mut b = two_floats();
        let c = ops::constant_bool(&mut b, false).unwrap();
        b.begin_conditional(&c).unwrap();
        let err = b.finish().unwrap_err();
        assert!(err.to_string().contains("1 open conditional"));
    }

    #[test]
    fn test_condition_must_be_i1() {
        let mut b = two_floats();
        let m = b.params()[0].clone();
        assert!(matches!(
            b.begin_conditional(&m),
            Err(CompileError::UnsupportedOperands { .. })
        ));
    }

    #[test]
    fn test_branch_value_not_visible_after_close() {
        let mut b = two_floats();
        let c = ops::constant_bool(&mut b, true).unwrap();
        b.begin_conditional(&c).unwrap();
        let inner = ops::constant_float(&mut b, 2.0, FloatKind::F64).unwrap();
        b.end_branch().unwrap();
        b.begin_alternate().unwrap();

        // sibling branch
        let err = ops::neg(&mut b, &inner).unwrap_err();
        assert!(matches!(err, CompileError::ValueOutOfScope { value } if value == inner.id));

        b.end_branch().unwrap();
        b.end_conditional().unwrap();
        // after the construct
        assert!(ops::neg(&mut b, &inner).is_err());
    }

    #[test]
    fn test_enclosing_values_visible_in_nested_blocks() {
        let mut b = two_floats();
        let one = ops::constant_float(&mut b, 1.0, FloatKind::F64).unwrap();
        let c = ops::constant_bool(&mut b, true).unwrap();
        b.begin_conditional(&c).unwrap();
        b.begin_conditional(&c).unwrap();
        ops::neg(&mut b, &one).unwrap();
        b.end_branch().unwrap();
        b.end_conditional().unwrap();
        b.end_branch().unwrap();
        b.end_conditional().unwrap();
        verify_function(&b.finish().unwrap()).unwrap();
    }

    #[test]
    fn test_direct_if_creation_rejected() {
        let mut b = two_floats();
        assert!(b.build_op(OpKind::Return, vec![], vec![], vec![]).is_err());
    }
}
