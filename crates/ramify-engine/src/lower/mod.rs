//! Host Body to IR Lowering
//!
//! Walks a parsed [`FunctionDef`](ast::FunctionDef) and drives a
//! [`FunctionBuilder`]. Variables are host bindings in a flat environment;
//! only selector results are IR values. Literals stay host-side until an
//! operation needs them, at which point they become `arith.constant` of the
//! other operand's type.
//!
//! In rewrite mode native `if` statements are lowered through the
//! conditional protocol. In explicit mode the body calls `begin_if`,
//! `begin_else`, `end_branch` and `end_if` itself.

mod builder;
mod builtins;
mod control_flow;
mod expr;
mod stmt;

pub use builder::FunctionBuilder;
pub use control_flow::{BranchState, ConstructId};

use crate::config::LoweringOptions;
use crate::error::{CompileError, CompileResult};
use crate::ir::{verify_function, IrFunction, IrModule, IrType, Value};
use crate::parser::ast;
use rustc_hash::FxHashMap;
use std::fmt;
use tracing::debug;

/// A host-side value bound to a name or produced by an expression
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    /// An IR value
    Value(Value),
    /// A type used as an argument, e.g. `f64`
    Type(IrType),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<HostValue>),
    None,
    /// Handle returned by `begin_if`
    Construct(ConstructId),
}

impl HostValue {
    /// Short description used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            HostValue::Value(_) => "IR value",
            HostValue::Type(_) => "type",
            HostValue::Int(_) => "int",
            HostValue::Float(_) => "float",
            HostValue::Bool(_) => "bool",
            HostValue::List(_) => "list",
            HostValue::None => "None",
            HostValue::Construct(_) => "conditional handle",
        }
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Value(v) => write!(f, "{}", v),
            HostValue::Type(ty) => write!(f, "{}", ty),
            HostValue::Int(n) => write!(f, "{}", n),
            HostValue::Float(x) => write!(f, "{:?}", x),
            HostValue::Bool(b) => f.write_str(if *b { "True" } else { "False" }),
            HostValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            HostValue::None => f.write_str("None"),
            HostValue::Construct(id) => write!(f, "{}", id),
        }
    }
}

/// Lowering state for one function
pub struct Lowerer<'a> {
    builder: FunctionBuilder,
    /// Host variable bindings
    env: FxHashMap<String, HostValue>,
    options: &'a LoweringOptions,
}

impl<'a> Lowerer<'a> {
    fn new(builder: FunctionBuilder, options: &'a LoweringOptions) -> Self {
        Self {
            builder,
            env: FxHashMap::default(),
            options,
        }
    }

    fn bind(&mut self, name: &str, value: HostValue) {
        self.env.insert(name.to_string(), value);
    }

    fn finish(self) -> CompileResult<IrFunction> {
        self.builder.finish()
    }
}

/// Resolve a spelled type name
pub fn resolve_type(name: &str) -> CompileResult<IrType> {
    name.parse().map_err(|_| CompileError::UnknownType {
        name: name.to_string(),
    })
}

/// Lower one function definition
pub fn lower_function(
    def: &ast::FunctionDef,
    options: &LoweringOptions,
) -> CompileResult<IrFunction> {
    let param_types = def
        .params
        .iter()
        .map(|p| resolve_type(&p.type_annotation.name))
        .collect::<CompileResult<Vec<_>>>()?;

    debug!(
        function = %def.name.name,
        params = param_types.len(),
        rewrite_ast = options.rewrite_ast,
        "lowering function"
    );

    let builder = FunctionBuilder::new(def.name.name.as_str(), param_types);
    let mut lowerer = Lowerer::new(builder, options);
    let params: Vec<Value> = lowerer.builder.params().to_vec();
    for (param, value) in def.params.iter().zip(params) {
        lowerer.bind(&param.name.name, HostValue::Value(value));
    }

    lowerer.lower_body(&def.body)?;
    let func = lowerer.finish()?;

    if options.verify {
        verify_function(&func)?;
    }
    debug!(
        function = %func.name,
        operations = func.operation_count(),
        "lowered function"
    );
    Ok(func)
}

/// Lower every function of a parsed source file, in order
pub fn lower_module(module: &ast::Module, options: &LoweringOptions) -> CompileResult<IrModule> {
    let mut ir_module = IrModule::new();
    for def in &module.functions {
        ir_module.add_function(lower_function(def, options)?);
    }
    Ok(ir_module)
}
