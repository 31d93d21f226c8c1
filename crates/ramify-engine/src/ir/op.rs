//! IR Operations
//!
//! An [`Operation`] records its kind, operands, literal attributes, results
//! and any nested regions. Operations are immutable once built.

use super::block::Region;
use super::value::Value;
use std::fmt;

/// Operation kinds known to the lowering engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    // arith
    Constant,
    AddF,
    SubF,
    MulF,
    NegF,
    CmpF,
    AddI,
    SubI,
    MulI,
    CmpI,
    ExtSI,
    ExtUI,
    TruncI,
    ExtF,
    TruncF,
    FPToSI,
    FPToUI,
    SIToFP,
    UIToFP,
    IndexCast,

    // math
    AbsF,
    Floor,
    Ceil,

    // complex
    ComplexAdd,
    ComplexSub,
    ComplexMul,
    ComplexNeg,

    // memref
    Alloca,

    // scf
    If,

    // func
    Return,
}

impl OpKind {
    /// Fully qualified `dialect.name`
    pub fn name(&self) -> &'static str {
        match self {
            OpKind::Constant => "arith.constant",
            OpKind::AddF => "arith.addf",
            OpKind::SubF => "arith.subf",
            OpKind::MulF => "arith.mulf",
            OpKind::NegF => "arith.negf",
            OpKind::CmpF => "arith.cmpf",
            OpKind::AddI => "arith.addi",
            OpKind::SubI => "arith.subi",
            OpKind::MulI => "arith.muli",
            OpKind::CmpI => "arith.cmpi",
            OpKind::ExtSI => "arith.extsi",
            OpKind::ExtUI => "arith.extui",
            OpKind::TruncI => "arith.trunci",
            OpKind::ExtF => "arith.extf",
            OpKind::TruncF => "arith.truncf",
            OpKind::FPToSI => "arith.fptosi",
            OpKind::FPToUI => "arith.fptoui",
            OpKind::SIToFP => "arith.sitofp",
            OpKind::UIToFP => "arith.uitofp",
            OpKind::IndexCast => "arith.index_cast",
            OpKind::AbsF => "math.absf",
            OpKind::Floor => "math.floor",
            OpKind::Ceil => "math.ceil",
            OpKind::ComplexAdd => "complex.add",
            OpKind::ComplexSub => "complex.sub",
            OpKind::ComplexMul => "complex.mul",
            OpKind::ComplexNeg => "complex.neg",
            OpKind::Alloca => "memref.alloca",
            OpKind::If => "scf.if",
            OpKind::Return => "func.return",
        }
    }

    /// Dialect prefix of [`OpKind::name`]
    pub fn dialect(&self) -> &'static str {
        let name = self.name();
        name.split_once('.').map(|(d, _)| d).unwrap_or(name)
    }

    pub fn is_cast(&self) -> bool {
        matches!(
            self,
            OpKind::ExtSI
                | OpKind::ExtUI
                | OpKind::TruncI
                | OpKind::ExtF
                | OpKind::TruncF
                | OpKind::FPToSI
                | OpKind::FPToUI
                | OpKind::SIToFP
                | OpKind::UIToFP
                | OpKind::IndexCast
        )
    }

    pub fn is_compare(&self) -> bool {
        matches!(self, OpKind::CmpF | OpKind::CmpI)
    }

    /// Same-typed two-operand arithmetic
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            OpKind::AddF
                | OpKind::SubF
                | OpKind::MulF
                | OpKind::AddI
                | OpKind::SubI
                | OpKind::MulI
                | OpKind::ComplexAdd
                | OpKind::ComplexSub
                | OpKind::ComplexMul
        )
    }

    /// Same-typed one-operand arithmetic
    pub fn is_unary(&self) -> bool {
        matches!(
            self,
            OpKind::NegF | OpKind::AbsF | OpKind::Floor | OpKind::Ceil | OpKind::ComplexNeg
        )
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Floating-point comparison predicates (ordered / unordered)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpFPredicate {
    False,
    Oeq,
    Ogt,
    Oge,
    Olt,
    Ole,
    One,
    Ord,
    Ueq,
    Ugt,
    Uge,
    Ult,
    Ule,
    Une,
    Uno,
    True,
}

impl CmpFPredicate {
    pub const ALL: [CmpFPredicate; 16] = [
        CmpFPredicate::False,
        CmpFPredicate::Oeq,
        CmpFPredicate::Ogt,
        CmpFPredicate::Oge,
        CmpFPredicate::Olt,
        CmpFPredicate::Ole,
        CmpFPredicate::One,
        CmpFPredicate::Ord,
        CmpFPredicate::Ueq,
        CmpFPredicate::Ugt,
        CmpFPredicate::Uge,
        CmpFPredicate::Ult,
        CmpFPredicate::Ule,
        CmpFPredicate::Une,
        CmpFPredicate::Uno,
        CmpFPredicate::True,
    ];

    /// Attribute encoding (64-bit signless integer)
    pub fn code(&self) -> u64 {
        *self as u64
    }

    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CmpFPredicate::False => "false",
            CmpFPredicate::Oeq => "oeq",
            CmpFPredicate::Ogt => "ogt",
            CmpFPredicate::Oge => "oge",
            CmpFPredicate::Olt => "olt",
            CmpFPredicate::Ole => "ole",
            CmpFPredicate::One => "one",
            CmpFPredicate::Ord => "ord",
            CmpFPredicate::Ueq => "ueq",
            CmpFPredicate::Ugt => "ugt",
            CmpFPredicate::Uge => "uge",
            CmpFPredicate::Ult => "ult",
            CmpFPredicate::Ule => "ule",
            CmpFPredicate::Une => "une",
            CmpFPredicate::Uno => "uno",
            CmpFPredicate::True => "true",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == s)
    }
}

impl fmt::Display for CmpFPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer comparison predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpIPredicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
    Ult,
    Ule,
    Ugt,
    Uge,
}

impl CmpIPredicate {
    pub const ALL: [CmpIPredicate; 10] = [
        CmpIPredicate::Eq,
        CmpIPredicate::Ne,
        CmpIPredicate::Slt,
        CmpIPredicate::Sle,
        CmpIPredicate::Sgt,
        CmpIPredicate::Sge,
        CmpIPredicate::Ult,
        CmpIPredicate::Ule,
        CmpIPredicate::Ugt,
        CmpIPredicate::Uge,
    ];

    pub fn code(&self) -> u64 {
        *self as u64
    }

    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CmpIPredicate::Eq => "eq",
            CmpIPredicate::Ne => "ne",
            CmpIPredicate::Slt => "slt",
            CmpIPredicate::Sle => "sle",
            CmpIPredicate::Sgt => "sgt",
            CmpIPredicate::Sge => "sge",
            CmpIPredicate::Ult => "ult",
            CmpIPredicate::Ule => "ule",
            CmpIPredicate::Ugt => "ugt",
            CmpIPredicate::Uge => "uge",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == s)
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            CmpIPredicate::Ult | CmpIPredicate::Ule | CmpIPredicate::Ugt | CmpIPredicate::Uge
        )
    }
}

impl fmt::Display for CmpIPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal attribute attached to an operation
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    CmpF(CmpFPredicate),
    CmpI(CmpIPredicate),
    Float(f64),
    Int(i64),
    Bool(bool),
}

/// A single IR operation
#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: OpKind,
    pub operands: Vec<Value>,
    pub attributes: Vec<Attribute>,
    pub results: Vec<Value>,
    pub regions: Vec<Region>,
}

impl Operation {
    pub fn new(
        kind: OpKind,
        operands: Vec<Value>,
        attributes: Vec<Attribute>,
        results: Vec<Value>,
    ) -> Self {
        Self {
            kind,
            operands,
            attributes,
            results,
            regions: Vec::new(),
        }
    }

    /// Build an `scf.if` from its condition and branch regions
    pub fn conditional(condition: Value, then_region: Region, else_region: Option<Region>) -> Self {
        let mut regions = vec![then_region];
        regions.extend(else_region);
        Self {
            kind: OpKind::If,
            operands: vec![condition],
            attributes: Vec::new(),
            results: Vec::new(),
            regions,
        }
    }

    /// First result, if any
    pub fn result(&self) -> Option<&Value> {
        self.results.first()
    }

    /// Comparison predicate of a `cmpf`
    pub fn cmpf_predicate(&self) -> Option<CmpFPredicate> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::CmpF(p) => Some(*p),
            _ => None,
        })
    }

    /// Comparison predicate of a `cmpi`
    pub fn cmpi_predicate(&self) -> Option<CmpIPredicate> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::CmpI(p) => Some(*p),
            _ => None,
        })
    }

    pub fn then_region(&self) -> Option<&Region> {
        match self.kind {
            OpKind::If => self.regions.first(),
            _ => None,
        }
    }

    pub fn else_region(&self) -> Option<&Region> {
        match self.kind {
            OpKind::If => self.regions.get(1),
            _ => None,
        }
    }

    /// Visit this operation and every operation nested in its regions, in
    /// program order
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Operation)) {
        f(self);
        for region in &self.regions {
            region.walk(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmpf_codes_are_dense() {
        for (i, p) in CmpFPredicate::ALL.iter().enumerate() {
            assert_eq!(p.code(), i as u64);
            assert_eq!(CmpFPredicate::from_code(i as u64), Some(*p));
        }
        assert_eq!(CmpFPredicate::Olt.code(), 4);
        assert_eq!(CmpFPredicate::True.code(), 15);
        assert_eq!(CmpFPredicate::from_code(16), None);
    }

    #[test]
    fn test_cmpi_codes() {
        assert_eq!(CmpIPredicate::Eq.code(), 0);
        assert_eq!(CmpIPredicate::Slt.code(), 2);
        assert_eq!(CmpIPredicate::Uge.code(), 9);
        assert_eq!(CmpIPredicate::from_code(10), None);
    }

    #[test]
    fn test_predicate_parse() {
        assert_eq!(CmpFPredicate::parse("uno"), Some(CmpFPredicate::Uno));
        assert_eq!(CmpIPredicate::parse("sge"), Some(CmpIPredicate::Sge));
        assert_eq!(CmpIPredicate::parse("olt"), None);
    }

    #[test]
    fn test_op_names() {
        assert_eq!(OpKind::CmpF.name(), "arith.cmpf");
        assert_eq!(OpKind::If.dialect(), "scf");
        assert_eq!(OpKind::AbsF.dialect(), "math");
        assert!(OpKind::IndexCast.is_cast());
        assert!(!OpKind::AddI.is_cast());
    }
}
