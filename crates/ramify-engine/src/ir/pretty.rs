//! Pretty-printing for IR
//!
//! Renders modules and functions in the MLIR textual form. Result names are
//! assigned the way MLIR's printer does it:
//!
//! - parameters are `%arg0`, `%arg1`, ...
//! - constants take a name hint (`%cst`, `%c3`, `%c1_i64`, `%true`) and
//!   get a `_N` suffix on conflict
//! - everything else is numbered `%0`, `%1`, ...
//!
//! Numbering is scoped by region. All results directly in a region are
//! numbered first; each nested region then continues from the counters of
//! its parent, so sibling regions reuse the same numbers and suffixes.

use super::block::Region;
use super::function::IrFunction;
use super::module::IrModule;
use super::op::{Attribute, OpKind, Operation};
use super::types::{FloatKind, IrType};
use super::value::{Value, ValueId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::{self, Write};

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for IrModule {
    fn pretty_print(&self) -> String {
        self.to_string()
    }
}

impl PrettyPrint for IrFunction {
    fn pretty_print(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for IrModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "module {{")?;
        for func in &self.functions {
            FunctionPrinter::new(func).print(f, 1)?;
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for IrFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        FunctionPrinter::new(self).print(f, 0)
    }
}

// ============================================================================
// SSA naming
// ============================================================================

/// Counters and used names visible in one region
#[derive(Debug, Clone, Default)]
struct NameScope {
    next_value: u32,
    next_conflict: u32,
    used: FxHashSet<String>,
}

impl NameScope {
    fn numbered(&mut self) -> String {
        let name = self.next_value.to_string();
        self.next_value += 1;
        name
    }

    fn unique(&mut self, hint: &str) -> String {
        if self.used.insert(hint.to_string()) {
            return hint.to_string();
        }
        loop {
            let probe = format!("{}_{}", hint, self.next_conflict);
            self.next_conflict += 1;
            if self.used.insert(probe.clone()) {
                return probe;
            }
        }
    }
}

fn assign_names(func: &IrFunction) -> FxHashMap<ValueId, String> {
    let mut names = FxHashMap::default();
    let mut scope = NameScope::default();
    for (i, param) in func.params.iter().enumerate() {
        let name = scope.unique(&format!("arg{}", i));
        names.insert(param.id, name);
    }
    number_region(&func.body, scope, &mut names);
    names
}

fn number_region(region: &Region, mut scope: NameScope, names: &mut FxHashMap<ValueId, String>) {
    let mut nested = Vec::new();
    for op in region.operations() {
        for result in &op.results {
            let name = match name_hint(op, result) {
                Some(hint) => scope.unique(&hint),
                None => scope.numbered(),
            };
            names.insert(result.id, name);
        }
        nested.extend(op.regions.iter());
    }
    for child in nested {
        number_region(child, scope.clone(), names);
    }
}

fn name_hint(op: &Operation, result: &Value) -> Option<String> {
    if op.kind != OpKind::Constant {
        return None;
    }
    match (op.attributes.first(), &result.ty) {
        (Some(Attribute::Bool(b)), _) => Some(b.to_string()),
        (Some(Attribute::Float(_)), _) => Some("cst".to_string()),
        (Some(Attribute::Int(v)), IrType::Index) => Some(format!("c{}", v)),
        (Some(Attribute::Int(v)), ty) => Some(format!("c{}_{}", v, ty)),
        _ => None,
    }
}

// ============================================================================
// Literals
// ============================================================================

/// Format a float constant as `d.dddddde±XX`, falling back to the hex bit
/// pattern when six fractional digits would not round-trip.
pub fn format_float(value: f64, kind: FloatKind) -> String {
    if value.is_finite() {
        let text = scientific(value);
        let round_trips = match kind {
            FloatKind::F32 => text.parse::<f32>().ok() == Some(value as f32),
            _ => text.parse::<f64>().ok() == Some(value),
        };
        if round_trips {
            return text;
        }
    }
    match kind {
        FloatKind::F32 => format!("0x{:08X}", (value as f32).to_bits()),
        _ => format!("0x{:016X}", value.to_bits()),
    }
}

fn scientific(value: f64) -> String {
    let raw = format!("{:.6e}", value);
    match raw.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => raw,
    }
}

// ============================================================================
// Printer
// ============================================================================

struct FunctionPrinter<'a> {
    func: &'a IrFunction,
    names: FxHashMap<ValueId, String>,
}

impl<'a> FunctionPrinter<'a> {
    fn new(func: &'a IrFunction) -> Self {
        Self {
            func,
            names: assign_names(func),
        }
    }

    fn name(&self, value: &Value) -> String {
        match self.names.get(&value.id) {
            Some(name) => format!("%{}", name),
            None => format!("<<UNKNOWN {}>>", value.id),
        }
    }

    fn operand_list(&self, values: &[Value]) -> String {
        values
            .iter()
            .map(|v| self.name(v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn print(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        let params = self
            .func
            .params
            .iter()
            .map(|p| format!("{}: {}", self.name(p), p.ty))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "{}func.func @{}({}) {{", pad, self.func.name, params)?;
        self.print_region(f, &self.func.body, depth + 1)?;
        writeln!(f, "{}}}", pad)
    }

    fn print_region(&self, f: &mut fmt::Formatter<'_>, region: &Region, depth: usize) -> fmt::Result {
        for op in region.operations() {
            self.print_op(f, op, depth)?;
        }
        Ok(())
    }

    fn print_op(&self, f: &mut fmt::Formatter<'_>, op: &Operation, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match op.kind {
            OpKind::If => {
                let cond = op.operands.first().map(|c| self.name(c)).unwrap_or_default();
                writeln!(f, "{}scf.if {} {{", pad, cond)?;
                if let Some(then_region) = op.then_region() {
                    self.print_region(f, then_region, depth + 1)?;
                }
                if let Some(else_region) = op.else_region() {
                    writeln!(f, "{}}} else {{", pad)?;
                    self.print_region(f, else_region, depth + 1)?;
                }
                writeln!(f, "{}}}", pad)
            }
            OpKind::Return => writeln!(f, "{}return", pad),
            _ => {
                let mut line = String::new();
                self.format_simple(&mut line, op)?;
                writeln!(f, "{}{}", pad, line)
            }
        }
    }

    /// Single-line operations: `%r = dialect.op operands : type`
    fn format_simple(&self, out: &mut String, op: &Operation) -> fmt::Result {
        if !op.results.is_empty() {
            write!(out, "{} = ", self.operand_list(&op.results))?;
        }
        let result_ty = op.results.first().map(|r| &r.ty);

        match op.kind {
            OpKind::Constant => {
                write!(out, "{} ", op.kind)?;
                match (op.attributes.first(), result_ty) {
                    (Some(Attribute::Bool(b)), _) => write!(out, "{}", b),
                    (Some(Attribute::Float(v)), Some(IrType::Float(kind))) => {
                        write!(out, "{} : {}", format_float(*v, *kind), IrType::Float(*kind))
                    }
                    (Some(Attribute::Float(v)), _) => write!(out, "{}", format_float(*v, FloatKind::F64)),
                    (Some(Attribute::Int(v)), Some(ty)) => write!(out, "{} : {}", v, ty),
                    _ => write!(out, "<<INVALID CONSTANT>>"),
                }
            }
            OpKind::CmpF | OpKind::CmpI => {
                let predicate = op
                    .cmpf_predicate()
                    .map(|p| p.as_str())
                    .or_else(|| op.cmpi_predicate().map(|p| p.as_str()))
                    .unwrap_or("<<NO PREDICATE>>");
                write!(out, "{} {}, {}", op.kind, predicate, self.operand_list(&op.operands))?;
                if let Some(lhs) = op.operands.first() {
                    write!(out, " : {}", lhs.ty)?;
                }
                Ok(())
            }
            OpKind::Alloca => match result_ty {
                Some(ty) => write!(out, "{}() : {}", op.kind, ty),
                None => write!(out, "{}()", op.kind),
            },
            kind if kind.is_cast() => {
                write!(out, "{} {}", kind, self.operand_list(&op.operands))?;
                if let (Some(src), Some(dst)) = (op.operands.first(), result_ty) {
                    write!(out, " : {} to {}", src.ty, dst)?;
                }
                Ok(())
            }
            kind => {
                write!(out, "{} {}", kind, self.operand_list(&op.operands))?;
                if let Some(ty) = result_ty {
                    write!(out, " : {}", ty)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float_scientific() {
        assert_eq!(format_float(1.0, FloatKind::F64), "1.000000e+00");
        assert_eq!(format_float(10.0, FloatKind::F64), "1.000000e+01");
        assert_eq!(format_float(0.5, FloatKind::F64), "5.000000e-01");
        assert_eq!(format_float(-2.5, FloatKind::F64), "-2.500000e+00");
        assert_eq!(format_float(0.0, FloatKind::F64), "0.000000e+00");
        assert_eq!(format_float(1.0e300, FloatKind::F64), "1.000000e+300");
    }

    #[test]
    fn test_format_float_hex_fallback() {
        // pi does not survive six fractional digits
        let pi = std::f64::consts::PI;
        assert_eq!(format_float(pi, FloatKind::F64), format!("0x{:016X}", pi.to_bits()));
        assert_eq!(format_float(f64::INFINITY, FloatKind::F64), "0x7FF0000000000000");
    }

    #[test]
    fn test_format_float_f32_round_trip() {
        assert_eq!(format_float(0.25, FloatKind::F32), "2.500000e-01");
    }

    #[test]
    fn test_name_scope_conflicts() {
        let mut scope = NameScope::default();
        assert_eq!(scope.unique("cst"), "cst");
        assert_eq!(scope.unique("cst"), "cst_0");
        assert_eq!(scope.unique("cst"), "cst_1");
        assert_eq!(scope.numbered(), "0");
        assert_eq!(scope.numbered(), "1");
    }

    #[test]
    fn test_name_scope_probe_skips_taken_suffix() {
        let mut scope = NameScope::default();
        scope.unique("c1_i64");
        scope.unique("c1_i64_0");
        assert_eq!(scope.unique("c1_i64"), "c1_i64_1");
    }
}
