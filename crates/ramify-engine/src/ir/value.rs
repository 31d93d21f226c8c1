//! IR Values
//!
//! A [`Value`] is a handle to a function parameter or an operation result.
//! Identities are allocated per function and never reused.

use super::types::IrType;

/// Value identifier, unique within one function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub u32);

impl ValueId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ValueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Typed value handle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Value {
    pub id: ValueId,
    pub ty: IrType,
}

impl Value {
    pub fn new(id: ValueId, ty: IrType) -> Self {
        Self { id, ty }
    }

    pub fn ty(&self) -> &IrType {
        &self.ty
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.id, self.ty)
    }
}
