//! Builtin calls
//!
//! | call | lowers to |
//! |------|-----------|
//! | `constant(lit[, type])` | `arith.constant` |
//! | `index(n)` | `arith.constant : index` |
//! | `alloca([dims], type)` | `memref.alloca` |
//! | `abs(x)` `floor(x)` `ceil(x)` | `math.*` |
//! | `cast(x, type)` `ucast(x, type)` | conversion ops, signed or unsigned |
//! | `begin_if(c)` `begin_else()` `end_branch()` `end_if()` | the conditional protocol |

use super::{HostValue, Lowerer};
use crate::error::{CompileError, CompileResult};
use crate::ir::{FloatKind, IrType, OpBuilder, OpKind, TypeCategory, Value};
use crate::ops::{self, Intent};
use crate::parser::ast::CallExpression;

fn expect_arity(callee: &str, args: &[HostValue], arity: usize) -> CompileResult<()> {
    if args.len() != arity {
        return Err(CompileError::invalid_argument(
            callee,
            format!("expected {} argument(s), got {}", arity, args.len()),
        ));
    }
    Ok(())
}

fn value_arg(callee: &str, arg: &HostValue) -> CompileResult<Value> {
    match arg {
        HostValue::Value(v) => Ok(v.clone()),
        other => Err(CompileError::invalid_argument(
            callee,
            format!("expected an IR value, got {} `{}`", other.kind_name(), other),
        )),
    }
}

fn type_arg(callee: &str, arg: &HostValue) -> CompileResult<IrType> {
    match arg {
        HostValue::Type(ty) => Ok(ty.clone()),
        other => Err(CompileError::invalid_argument(
            callee,
            format!("expected a type, got {} `{}`", other.kind_name(), other),
        )),
    }
}

fn shape_arg(callee: &str, arg: &HostValue) -> CompileResult<Vec<u64>> {
    let HostValue::List(dims) = arg else {
        return Err(CompileError::invalid_argument(
            callee,
            format!("expected a list of dimensions, got {}", arg.kind_name()),
        ));
    };
    dims.iter()
        .map(|dim| match dim {
            HostValue::Int(n) => u64::try_from(*n).map_err(|_| {
                CompileError::invalid_argument(callee, format!("negative dimension {}", n))
            }),
            other => Err(CompileError::invalid_argument(
                callee,
                format!("dimension must be an int, got {}", other.kind_name()),
            )),
        })
        .collect()
}

impl<'a> Lowerer<'a> {
    pub(super) fn lower_call(&mut self, call: &CallExpression) -> CompileResult<HostValue> {
        let callee = call.callee.name.as_str();
        let args = call
            .arguments
            .iter()
            .map(|arg| self.lower_expr(arg))
            .collect::<CompileResult<Vec<_>>>()?;

        match callee {
            "constant" => self.call_constant(&args),
            "index" => {
                expect_arity(callee, &args, 1)?;
                let HostValue::Int(n) = args[0] else {
                    return Err(CompileError::invalid_argument(
                        callee,
                        format!("expected an int, got {}", args[0].kind_name()),
                    ));
                };
                ops::constant_index(&mut self.builder, n).map(HostValue::Value)
            }
            "alloca" => {
                expect_arity(callee, &args, 2)?;
                let shape = shape_arg(callee, &args[0])?;
                let element = type_arg(callee, &args[1])?;
                if element.category() == TypeCategory::MemRef {
                    return Err(CompileError::invalid_argument(
                        callee,
                        format!("element type {} is not a scalar", element),
                    ));
                }
                self.builder
                    .build_value(OpKind::Alloca, vec![], vec![], IrType::memref(shape, element))
                    .map(HostValue::Value)
            }
            "abs" | "floor" | "ceil" => {
                expect_arity(callee, &args, 1)?;
                let intent = match callee {
                    "abs" => Intent::Abs,
                    "floor" => Intent::Floor,
                    _ => Intent::Ceil,
                };
                let x = value_arg(callee, &args[0])?;
                ops::emit(&mut self.builder, intent, &[x]).map(HostValue::Value)
            }
            "cast" | "ucast" => {
                expect_arity(callee, &args, 2)?;
                let x = value_arg(callee, &args[0])?;
                let to = type_arg(callee, &args[1])?;
                ops::cast(&mut self.builder, &to, &x, callee == "ucast").map(HostValue::Value)
            }
            "begin_if" => {
                expect_arity(callee, &args, 1)?;
                let condition = match &args[0] {
                    HostValue::Bool(b) => ops::constant_bool(&mut self.builder, *b)?,
                    other => value_arg(callee, other)?,
                };
                self.builder
                    .begin_conditional(&condition)
                    .map(HostValue::Construct)
            }
            "begin_else" => {
                expect_arity(callee, &args, 0)?;
                self.builder.begin_alternate().map(|_| HostValue::None)
            }
            "end_branch" => {
                expect_arity(callee, &args, 0)?;
                self.builder.end_branch().map(|_| HostValue::None)
            }
            "end_if" => {
                expect_arity(callee, &args, 0)?;
                self.builder.end_conditional().map(|_| HostValue::None)
            }
            _ => Err(CompileError::UndefinedFunction {
                name: callee.to_string(),
            }),
        }
    }

    /// `constant(1.0)` is f64, `constant(1)` is si64, or pass a type
    fn call_constant(&mut self, args: &[HostValue]) -> CompileResult<HostValue> {
        let value = match args {
            [HostValue::Float(x)] => ops::constant_float(&mut self.builder, *x, FloatKind::F64)?,
            [HostValue::Int(n)] => ops::constant_int(&mut self.builder, *n, &IrType::signed(64))?,
            [HostValue::Bool(b)] => ops::constant_bool(&mut self.builder, *b)?,
            [literal @ (HostValue::Float(_) | HostValue::Int(_) | HostValue::Bool(_)), ty] => {
                let ty = type_arg("constant", ty)?;
                self.materialize(literal, &ty, Intent::Add)
                    .map_err(|_| {
                        CompileError::invalid_argument(
                            "constant",
                            format!("`{}` is not representable as {}", literal, ty),
                        )
                    })?
            }
            [other] | [other, _] => {
                return Err(CompileError::invalid_argument(
                    "constant",
                    format!("expected a literal, got {}", other.kind_name()),
                ))
            }
            _ => {
                return Err(CompileError::invalid_argument(
                    "constant",
                    format!("expected 1 or 2 arguments, got {}", args.len()),
                ))
            }
        };
        Ok(HostValue::Value(value))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::LoweringOptions;
    use crate::error::CompileError;
    use crate::ir::{IrFunction, IrType, OpKind};
    use crate::lower::lower_function;
    use crate::parser::Parser;

    fn lower_with(source: &str, options: &LoweringOptions) -> Result<IrFunction, CompileError> {
        let module = Parser::new(source).unwrap().parse().unwrap();
        lower_function(&module.functions[0], options)
    }

    fn lower(source: &str) -> Result<IrFunction, CompileError> {
        lower_with(source, &LoweringOptions::default())
    }

    fn result_type(func: &IrFunction, index: usize) -> IrType {
        func.entry().unwrap().operations[index].results[0].ty.clone()
    }

    #[test]
    fn test_constant_defaults() {
        let func = lower("def f():\n    a = constant(1.0)\n    b = constant(2)\n    c = constant(True)\n").unwrap();
        assert_eq!(result_type(&func, 0), IrType::f64());
        assert_eq!(result_type(&func, 1), IrType::signed(64));
        assert_eq!(result_type(&func, 2), IrType::bool());
    }

    #[test]
    fn test_default_int_constant_meets_index() {
        let func = lower("def f(a: index):\n    b = constant(1)\n    c = a + b\n    d = b < a\n").unwrap();
        let kinds: Vec<_> = func.entry().unwrap().iter().map(|op| op.kind).collect();
        assert_eq!(
            kinds,
            vec![
                OpKind::Constant,
                OpKind::IndexCast,
                OpKind::AddI,
                OpKind::IndexCast,
                OpKind::CmpI,
                OpKind::Return
            ]
        );
        assert_eq!(result_type(&func, 2), IrType::signed(64));
    }

    #[test]
    fn test_constant_with_type() {
        let func = lower("def f():\n    a = constant(1, f32)\n    b = constant(7, ui8)\n").unwrap();
        assert_eq!(result_type(&func, 0), IrType::f32());
        assert_eq!(result_type(&func, 1), IrType::unsigned(8));

        let err = lower("def f():\n    a = constant(1.5, i32)\n").unwrap_err();
        assert!(err.to_string().contains("not representable"));
    }

    #[test]
    fn test_alloca() {
        let func = lower("def f():\n    m = alloca([3, 4], f32)\n").unwrap();
        assert_eq!(result_type(&func, 0), IrType::memref(vec![3, 4], IrType::f32()));

        let err = lower("def f():\n    m = alloca([-1], f32)\n").unwrap_err();
        assert!(err.to_string().contains("negative dimension"));
        let err = lower("def f():\n    m = alloca([2], 3)\n").unwrap_err();
        assert!(matches!(err, CompileError::InvalidArgument { .. }));
    }

    #[test]
    fn test_math_builtins() {
        let func = lower("def f(x: f32):\n    a = abs(x)\n    b = floor(a)\n    c = ceil(b)\n").unwrap();
        let kinds: Vec<_> = func.entry().unwrap().iter().map(|op| op.kind).collect();
        assert_eq!(kinds, vec![OpKind::AbsF, OpKind::Floor, OpKind::Ceil, OpKind::Return]);

        let err = lower("def f(x: i32):\n    a = abs(x)\n").unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedOperands { .. }));
    }

    #[test]
    fn test_cast_builtins() {
        let func = lower("def f(x: i8, y: index):\n    a = cast(x, i32)\n    b = ucast(x, i32)\n    c = cast(y, i64)\n").unwrap();
        let kinds: Vec<_> = func.entry().unwrap().iter().map(|op| op.kind).collect();
        assert_eq!(
            kinds,
            vec![OpKind::ExtSI, OpKind::ExtUI, OpKind::IndexCast, OpKind::Return]
        );

        let err = lower("def f(x: i32):\n    a = cast(x, i32)\n").unwrap_err();
        assert!(matches!(err, CompileError::InvalidCast { .. }));
    }

    #[test]
    fn test_index_builtin() {
        let func = lower("def f():\n    i = index(4)\n").unwrap();
        assert_eq!(result_type(&func, 0), IrType::Index);
    }

    #[test]
    fn test_arity_and_unknown() {
        let err = lower("def f(x: f64):\n    a = abs(x, x)\n").unwrap_err();
        assert!(err.to_string().contains("expected 1 argument"));
        let err = lower("def f():\n    a = sqrt(2.0)\n").unwrap_err();
        assert!(matches!(err, CompileError::UndefinedFunction { ref name } if name == "sqrt"));
    }

    #[test]
    fn test_explicit_protocol_builtins() {
        let source = "\
def f(a: f64, b: f64):
    if begin_if(a < b):
        m = alloca([2, 2], f64)
        end_branch()
    else:
        begin_else()
        end_branch()
        end_if()
";
        let func = lower_with(source, &LoweringOptions::explicit()).unwrap();
        let ifs = func.ops_of_kind(OpKind::If);
        assert_eq!(ifs.len(), 1);
        assert!(ifs[0].else_region().is_some());
    }

    #[test]
    fn test_explicit_builtins_out_of_order() {
        let source = "def f():\n    begin_else()\n";
        let err = lower_with(source, &LoweringOptions::explicit()).unwrap_err();
        assert!(matches!(err, CompileError::ProtocolMisuse { .. }));
    }
}
