//! IR Functions
//!
//! A function owns its parameter values and a single-block body region.

use super::block::{Block, Region};
use super::op::{OpKind, Operation};
use super::value::Value;

/// An IR function
#[derive(Debug, Clone)]
pub struct IrFunction {
    /// Function name
    pub name: String,
    /// Parameter values (`%arg0`, `%arg1`, ...)
    pub params: Vec<Value>,
    /// Body region; its entry block ends with `func.return`
    pub body: Region,
}

impl IrFunction {
    pub fn new(name: impl Into<String>, params: Vec<Value>, body: Region) -> Self {
        Self {
            name: name.into(),
            params,
            body,
        }
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn entry(&self) -> Option<&Block> {
        self.body.entry()
    }

    /// Visit every operation, nested ones included, in program order
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Operation)) {
        self.body.walk(f);
    }

    /// Collect every operation of the given kind, in program order
    pub fn ops_of_kind(&self, kind: OpKind) -> Vec<&Operation> {
        let mut ops = Vec::new();
        self.walk(&mut |op| {
            if op.kind == kind {
                ops.push(op);
            }
        });
        ops
    }

    /// Total number of operations at any depth
    pub fn operation_count(&self) -> usize {
        self.body.operation_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::block::BlockId;
    use crate::ir::types::IrType;
    use crate::ir::value::ValueId;

    #[test]
    fn test_function_new() {
        let mut entry = Block::new(BlockId(0));
        entry.push(Operation::new(OpKind::Return, vec![], vec![], vec![]));
        let params = vec![
            Value::new(ValueId(0), IrType::f64()),
            Value::new(ValueId(1), IrType::f64()),
        ];
        let func = IrFunction::new("f", params, Region::with_block(entry));

        assert_eq!(func.name, "f");
        assert_eq!(func.param_count(), 2);
        assert_eq!(func.operation_count(), 1);
        assert_eq!(func.ops_of_kind(OpKind::Return).len(), 1);
    }
}
