//! Region-based Intermediate Representation
//!
//! Control flow is expressed with nested regions instead of branches and
//! labels: an `scf.if` owns a "then" region and an optional "else" region.
//!
//! # Structure
//!
//! - `IrModule` - Ordered collection of functions
//! - `IrFunction` - Parameters plus a single-block body region
//! - `Region` / `Block` - Nested, append-only operation lists
//! - `Operation` - Kind, operands, attributes, results, nested regions
//! - `Value` - Typed handle to a parameter or an operation result

pub mod block;
pub mod builder;
pub mod function;
pub mod module;
pub mod op;
pub mod pretty;
pub mod types;
pub mod value;
pub mod verify;

pub use block::{Block, BlockId, Region};
pub use builder::OpBuilder;
pub use function::IrFunction;
pub use module::IrModule;
pub use op::{Attribute, CmpFPredicate, CmpIPredicate, OpKind, Operation};
pub use pretty::{format_float, PrettyPrint};
pub use types::{FloatKind, IrType, Signedness, TypeCategory, UnknownTypeName};
pub use value::{Value, ValueId};
pub use verify::{verify_function, verify_module, VerifyError};
