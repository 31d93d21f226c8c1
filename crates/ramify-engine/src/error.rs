//! Compilation errors
//!
//! Every error here is a construction-time usage error. Lowering stops at the
//! first one and no partially built function is returned.

use crate::ir::{IrType, ValueId, VerifyError};
use crate::parser::ParseError;
use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{op}: kind not supported for operand types ({})", .types.join(", "))]
    UnsupportedOperands { op: String, types: Vec<String> },

    #[error("Invalid cast from {from} to {to}")]
    InvalidCast { from: String, to: String },

    #[error("Protocol misuse: {message}")]
    ProtocolMisuse { message: String },

    #[error("Value {value} is not visible at the current insertion point")]
    ValueOutOfScope { value: ValueId },

    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String },

    #[error("Undefined function: {name}")]
    UndefinedFunction { name: String },

    #[error("Unknown type: {name}")]
    UnknownType { name: String },

    #[error("Invalid argument to {callee}: {message}")]
    InvalidArgument { callee: String, message: String },

    #[error("Unsupported feature: {feature}")]
    UnsupportedFeature { feature: String },

    #[error("{}", format_parse_errors(.errors))]
    Parse { errors: Vec<ParseError> },

    #[error("Verification failed: {0}")]
    Verification(#[from] VerifyError),

    #[error("Internal compiler error: {message}")]
    InternalError { message: String },
}

impl CompileError {
    pub(crate) fn unsupported(op: impl Into<String>, types: &[&IrType]) -> Self {
        CompileError::UnsupportedOperands {
            op: op.into(),
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        CompileError::ProtocolMisuse {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_argument(callee: &str, message: impl Into<String>) -> Self {
        CompileError::InvalidArgument {
            callee: callee.to_string(),
            message: message.into(),
        }
    }
}

impl From<Vec<ParseError>> for CompileError {
    fn from(errors: Vec<ParseError>) -> Self {
        CompileError::Parse { errors }
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
