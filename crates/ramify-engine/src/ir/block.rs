//! Blocks and Regions
//!
//! A block is an append-only sequence of operations. Regions own blocks and
//! form the bodies of structured constructs such as `scf.if`.

use super::op::Operation;

/// Block identifier, unique within one function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

impl BlockId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// An ordered list of operations
#[derive(Debug, Clone)]
pub struct Block {
    pub id: BlockId,
    pub operations: Vec<Operation>,
}

impl Block {
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            operations: Vec::new(),
        }
    }

    /// Append an operation
    pub fn push(&mut self, op: Operation) {
        self.operations.push(op);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }

    pub fn last(&self) -> Option<&Operation> {
        self.operations.last()
    }
}

/// The body of a structured construct
#[derive(Debug, Clone, Default)]
pub struct Region {
    pub blocks: Vec<Block>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    /// A region holding exactly one block
    pub fn with_block(block: Block) -> Self {
        Self {
            blocks: vec![block],
        }
    }

    pub fn entry(&self) -> Option<&Block> {
        self.blocks.first()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| b.is_empty())
    }

    /// Operations directly in this region, excluding nested regions
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.blocks.iter().flat_map(|b| b.iter())
    }

    /// Visit every operation in this region and its nested regions
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Operation)) {
        for op in self.operations() {
            op.walk(f);
        }
    }

    /// Count operations at any depth
    pub fn operation_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }
}
