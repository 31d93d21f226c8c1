//! Control Flow Lowering Utilities
//!
//! Bookkeeping for structured conditionals under construction: each open
//! `scf.if` is a [`ConditionalFrame`] on the [`InsertionStack`]. The frame
//! tracks which branch is being filled and holds the finished branch blocks
//! until the construct closes.

use crate::error::{CompileError, CompileResult};
use crate::ir::{Block, BlockId, Operation, Region, Value, ValueId};
use rustc_hash::FxHashSet;
use std::fmt;

/// Identifies one conditional construct within a function pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstructId(pub u32);

impl fmt::Display for ConstructId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if#{}", self.0)
    }
}

/// Where a conditional is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchState {
    /// Filling the then block
    InThen,
    /// Then block closed, else not started
    ThenClosed,
    /// Filling the else block
    InElse,
    /// Both blocks closed
    ElseClosed,
}

impl BranchState {
    pub fn has_open_block(&self) -> bool {
        matches!(self, BranchState::InThen | BranchState::InElse)
    }
}

impl fmt::Display for BranchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BranchState::InThen => "inside the then branch",
            BranchState::ThenClosed => "after the then branch closed",
            BranchState::InElse => "inside the else branch",
            BranchState::ElseClosed => "after the else branch closed",
        };
        f.write_str(name)
    }
}

/// A block still accepting operations, with the values it defines
#[derive(Debug)]
pub struct OpenBlock {
    pub block: Block,
    defined: FxHashSet<ValueId>,
}

impl OpenBlock {
    pub fn new(id: BlockId) -> Self {
        Self {
            block: Block::new(id),
            defined: FxHashSet::default(),
        }
    }

    /// Record a value (a parameter) as defined here without an operation
    pub fn define(&mut self, value: &Value) {
        self.defined.insert(value.id);
    }

    pub fn defines(&self, id: ValueId) -> bool {
        self.defined.contains(&id)
    }

    /// Append an operation and record its results
    pub fn push(&mut self, op: Operation) {
        self.defined.extend(op.results.iter().map(|r| r.id));
        self.block.push(op);
    }

    pub fn into_block(self) -> Block {
        self.block
    }
}

/// One conditional under construction
#[derive(Debug)]
pub struct ConditionalFrame {
    pub id: ConstructId,
    pub condition: Value,
    state: BranchState,
    open: Option<OpenBlock>,
    then_block: Option<Block>,
    else_block: Option<Block>,
}

impl ConditionalFrame {
    /// Start a construct with its then block open
    pub fn new(id: ConstructId, condition: Value, then_block: BlockId) -> Self {
        Self {
            id,
            condition,
            state: BranchState::InThen,
            open: Some(OpenBlock::new(then_block)),
            then_block: None,
            else_block: None,
        }
    }

    pub fn state(&self) -> BranchState {
        self.state
    }

    pub fn open_block(&self) -> Option<&OpenBlock> {
        self.open.as_ref()
    }

    pub fn open_block_mut(&mut self) -> Option<&mut OpenBlock> {
        self.open.as_mut()
    }

    /// Close whichever branch is open
    pub fn close_branch(&mut self) -> CompileResult<()> {
        let next = match self.state {
            BranchState::InThen => BranchState::ThenClosed,
            BranchState::InElse => BranchState::ElseClosed,
            state => {
                return Err(CompileError::protocol(format!(
                    "end_branch called {} of {}",
                    state, self.id
                )))
            }
        };
        let block = self
            .open
            .take()
            .map(OpenBlock::into_block)
            .ok_or_else(|| CompileError::InternalError {
                message: format!("{} has no open block in state {:?}", self.id, self.state),
            })?;
        match next {
            BranchState::ThenClosed => self.then_block = Some(block),
            _ => self.else_block = Some(block),
        }
        self.state = next;
        Ok(())
    }

    /// Open the else branch
    pub fn open_alternate(&mut self, else_block: BlockId) -> CompileResult<()> {
        if self.state != BranchState::ThenClosed {
            return Err(CompileError::protocol(format!(
                "begin_alternate called {} of {}",
                self.state, self.id
            )));
        }
        self.open = Some(OpenBlock::new(else_block));
        self.state = BranchState::InElse;
        Ok(())
    }

    /// Turn a closed construct into its `scf.if` operation
    pub fn into_operation(self) -> CompileResult<Operation> {
        if !matches!(self.state, BranchState::ThenClosed | BranchState::ElseClosed) {
            return Err(CompileError::protocol(format!(
                "end_conditional called {} of {}",
                self.state, self.id
            )));
        }
        let then_block = self.then_block.ok_or_else(|| CompileError::InternalError {
            message: format!("{} closed without a then block", self.id),
        })?;
        Ok(Operation::conditional(
            self.condition,
            Region::with_block(then_block),
            self.else_block.map(Region::with_block),
        ))
    }
}

/// Stack of open conditionals, innermost last
#[derive(Debug, Default)]
pub struct InsertionStack {
    frames: Vec<ConditionalFrame>,
}

impl InsertionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: ConditionalFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<ConditionalFrame> {
        self.frames.pop()
    }

    /// The innermost open conditional
    pub fn current(&self) -> Option<&ConditionalFrame> {
        self.frames.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut ConditionalFrame> {
        self.frames.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Whether any open block on the stack defines `id`
    pub fn defines(&self, id: ValueId) -> bool {
        self.frames
            .iter()
            .filter_map(ConditionalFrame::open_block)
            .any(|block| block.defines(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{IrType, OpKind};

    fn cond() -> Value {
        Value::new(ValueId(0), IrType::bool())
    }

    #[test]
    fn test_then_only_lifecycle() {
        let mut frame = ConditionalFrame::new(ConstructId(0), cond(), BlockId(1));
        assert_eq!(frame.state(), BranchState::InThen);
        frame.close_branch().unwrap();
        assert_eq!(frame.state(), BranchState::ThenClosed);
        assert!(frame.open_block().is_none());

        let op = frame.into_operation().unwrap();
        assert_eq!(op.kind, OpKind::If);
        assert_eq!(op.regions.len(), 1);
    }

    #[test]
    fn test_then_else_lifecycle() {
        let mut frame = ConditionalFrame::new(ConstructId(0), cond(), BlockId(1));
        frame.close_branch().unwrap();
        frame.open_alternate(BlockId(2)).unwrap();
        assert_eq!(frame.state(), BranchState::InElse);
        frame.close_branch().unwrap();

        let op = frame.into_operation().unwrap();
        assert_eq!(op.regions.len(), 2);
        assert_eq!(op.else_region().and_then(|r| r.entry()).map(|b| b.id), Some(BlockId(2)));
    }

    #[test]
    fn test_out_of_order_calls() {
        let mut frame = ConditionalFrame::new(ConstructId(3), cond(), BlockId(1));
        let err = frame.open_alternate(BlockId(2)).unwrap_err();
        assert!(matches!(err, CompileError::ProtocolMisuse { .. }));
        assert!(err.to_string().contains("if#3"));

        frame.close_branch().unwrap();
        assert!(frame.close_branch().is_err());

        frame.open_alternate(BlockId(2)).unwrap();
        frame.close_branch().unwrap();
        assert!(frame.open_alternate(BlockId(4)).is_err());
    }

    #[test]
    fn test_close_while_open_rejected() {
        let frame = ConditionalFrame::new(ConstructId(0), cond(), BlockId(1));
        assert!(matches!(
            frame.into_operation(),
            Err(CompileError::ProtocolMisuse { .. })
        ));
    }

    #[test]
    fn test_stack_visibility() {
        let mut stack = InsertionStack::new();
        assert!(stack.is_empty());

        let mut outer = ConditionalFrame::new(ConstructId(0), cond(), BlockId(1));
        let v = Value::new(ValueId(5), IrType::f64());
        outer.open_block_mut().unwrap().define(&v);
        stack.push(outer);
        stack.push(ConditionalFrame::new(ConstructId(1), cond(), BlockId(2)));

        assert_eq!(stack.depth(), 2);
        assert!(stack.defines(ValueId(5)));
        assert!(!stack.defines(ValueId(6)));

        stack.pop();
        stack.current_mut().unwrap().close_branch().unwrap();
        // closed blocks no longer contribute visible values
        assert!(!stack.defines(ValueId(5)));
    }
}
