//! IR type system
//!
//! Every value produced during lowering carries one of these types. The
//! selector dispatches on [`TypeCategory`] rather than inspecting types ad hoc.

use std::fmt;
use std::str::FromStr;

/// Integer signedness, following the builtin integer types of the target IR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signedness {
    /// `iN`
    Signless,
    /// `siN`
    Signed,
    /// `uiN`
    Unsigned,
}

/// Floating-point formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
    BF16,
    F16,
    F32,
    F64,
}

impl FloatKind {
    /// Width in bits
    pub fn width(&self) -> u32 {
        match self {
            FloatKind::BF16 | FloatKind::F16 => 16,
            FloatKind::F32 => 32,
            FloatKind::F64 => 64,
        }
    }
}

impl fmt::Display for FloatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloatKind::BF16 => write!(f, "bf16"),
            FloatKind::F16 => write!(f, "f16"),
            FloatKind::F32 => write!(f, "f32"),
            FloatKind::F64 => write!(f, "f64"),
        }
    }
}

/// Coarse classification used for operation selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Integer,
    Index,
    Float,
    Complex,
    /// Signless 1-bit integer
    Bool,
    MemRef,
}

/// IR type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrType {
    Integer { width: u32, signedness: Signedness },
    Index,
    Float(FloatKind),
    Complex(FloatKind),
    MemRef { shape: Vec<u64>, element: Box<IrType> },
}

impl IrType {
    pub fn signless(width: u32) -> Self {
        IrType::Integer {
            width,
            signedness: Signedness::Signless,
        }
    }

    pub fn signed(width: u32) -> Self {
        IrType::Integer {
            width,
            signedness: Signedness::Signed,
        }
    }

    pub fn unsigned(width: u32) -> Self {
        IrType::Integer {
            width,
            signedness: Signedness::Unsigned,
        }
    }

    /// The `i1` type produced by every comparison
    pub fn bool() -> Self {
        Self::signless(1)
    }

    pub fn f64() -> Self {
        IrType::Float(FloatKind::F64)
    }

    pub fn f32() -> Self {
        IrType::Float(FloatKind::F32)
    }

    pub fn memref(shape: Vec<u64>, element: IrType) -> Self {
        IrType::MemRef {
            shape,
            element: Box::new(element),
        }
    }

    pub fn category(&self) -> TypeCategory {
        match self {
            IrType::Integer {
                width: 1,
                signedness: Signedness::Signless,
            } => TypeCategory::Bool,
            IrType::Integer { .. } => TypeCategory::Integer,
            IrType::Index => TypeCategory::Index,
            IrType::Float(_) => TypeCategory::Float,
            IrType::Complex(_) => TypeCategory::Complex,
            IrType::MemRef { .. } => TypeCategory::MemRef,
        }
    }

    /// Bit width for scalar types. Index and memrefs have no fixed width.
    pub fn bit_width(&self) -> Option<u32> {
        match self {
            IrType::Integer { width, .. } => Some(*width),
            IrType::Float(kind) => Some(kind.width()),
            IrType::Complex(kind) => Some(kind.width() * 2),
            IrType::Index | IrType::MemRef { .. } => None,
        }
    }

    pub fn is_bool(&self) -> bool {
        self.category() == TypeCategory::Bool
    }

    /// Integers of any width, booleans included
    pub fn is_integer(&self) -> bool {
        matches!(self, IrType::Integer { .. })
    }

    pub fn is_index(&self) -> bool {
        matches!(self, IrType::Index)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, IrType::Float(_))
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, IrType::Complex(_))
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Integer { width, signedness } => match signedness {
                Signedness::Signless => write!(f, "i{}", width),
                Signedness::Signed => write!(f, "si{}", width),
                Signedness::Unsigned => write!(f, "ui{}", width),
            },
            IrType::Index => write!(f, "index"),
            IrType::Float(kind) => write!(f, "{}", kind),
            IrType::Complex(kind) => write!(f, "complex<{}>", kind),
            IrType::MemRef { shape, element } => {
                write!(f, "memref<")?;
                for dim in shape {
                    write!(f, "{}x", dim)?;
                }
                write!(f, "{}>", element)
            }
        }
    }
}

/// Error returned when a type name cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTypeName(pub String);

impl fmt::Display for UnknownTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown type name `{}`", self.0)
    }
}

impl std::error::Error for UnknownTypeName {}

fn parse_float_kind(s: &str) -> Option<FloatKind> {
    match s {
        "bf16" => Some(FloatKind::BF16),
        "f16" => Some(FloatKind::F16),
        "f32" => Some(FloatKind::F32),
        "f64" => Some(FloatKind::F64),
        _ => None,
    }
}

fn parse_width(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|w| *w > 0)
}

impl FromStr for IrType {
    type Err = UnknownTypeName;

    /// Parses scalar type names (`f64`, `i32`, `si64`, `ui8`, `index`,
    /// `complex<f32>`). Memref types are never spelled by hand.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownTypeName(s.to_string());

        if s == "index" {
            return Ok(IrType::Index);
        }
        if let Some(kind) = parse_float_kind(s) {
            return Ok(IrType::Float(kind));
        }
        if let Some(inner) = s.strip_prefix("complex<").and_then(|r| r.strip_suffix('>')) {
            return parse_float_kind(inner)
                .map(IrType::Complex)
                .ok_or_else(unknown);
        }

        let (signedness, digits) = if let Some(rest) = s.strip_prefix("si") {
            (Signedness::Signed, rest)
        } else if let Some(rest) = s.strip_prefix("ui") {
            (Signedness::Unsigned, rest)
        } else if let Some(rest) = s.strip_prefix('i') {
            (Signedness::Signless, rest)
        } else {
            return Err(unknown());
        };

        parse_width(digits)
            .map(|width| IrType::Integer { width, signedness })
            .ok_or_else(unknown)
    }
}
