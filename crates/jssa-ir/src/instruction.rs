use smallvec::SmallVec;
use std::fmt;

/// Instruction identifier, unique across every CFG produced by one
/// construction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrId(pub u32);

impl fmt::Display for InstrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// Basic block identifier, unique across every CFG produced by one
/// construction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// Constant value embedded in an instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Constant {
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => fmt_number(*n, f),
            Self::String(s) => match serde_json::to_string(s) {
                Ok(quoted) => f.write_str(&quoted),
                Err(_) => write!(f, "{s:?}"),
            },
        }
    }
}

/// Numbers print the way the source language prints them: integral values
/// without a fraction, `NaN`, `Infinity`, and exponent form (`1e+21`,
/// `1.5e-7`) outside `[1e-6, 1e21)`.
fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        f.write_str("0")
    } else if (1e-6..1e21).contains(&n.abs()) {
        write!(f, "{n}")
    } else {
        let exponent = format!("{n:e}");
        match exponent.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => write!(f, "{mantissa}e+{exp}"),
            _ => f.write_str(&exponent),
        }
    }
}

/// Instruction input.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Result of an earlier instruction: `i<id>`.
    Instr(InstrId),
    /// Current value of a local binding: `@name`.
    Local(String),
    /// Embedded constant: `%1`, `%"+"`, `%undefined`.
    Constant(Constant),
    /// Argument count, context depth or slot index: `%N`.
    Count(u32),
    /// Entry block of a nested function: `%"B<n>"`.
    Block(BlockId),
}

impl Operand {
    pub fn as_instr(&self) -> Option<InstrId> {
        match self {
            Self::Instr(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instr(id) => write!(f, "{id}"),
            Self::Local(name) => write!(f, "@{name}"),
            Self::Constant(c) => write!(f, "%{c}"),
            Self::Count(n) => write!(f, "%{n}"),
            Self::Block(b) => write!(f, "%\"{b}\""),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Constants and variables
    Literal,
    LoadGlobal,
    StoreGlobal,
    DeleteGlobal,
    LoadContext,
    StoreContext,
    LoadArg,
    SelfRef,
    This,
    Global,
    Nop,

    // Objects
    LoadProperty,
    StoreProperty,
    DeleteProperty,
    Array,
    Object,
    Fn,

    // Operators
    Binary,
    Unary,

    // Calls
    PushArg,
    Call,
    New,

    // Control
    Branch,
    Ret,
    Phi,
    ToPhi,
}

impl Opcode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::LoadGlobal => "loadGlobal",
            Self::StoreGlobal => "storeGlobal",
            Self::DeleteGlobal => "deleteGlobal",
            Self::LoadContext => "loadContext",
            Self::StoreContext => "storeContext",
            Self::LoadArg => "loadArg",
            Self::SelfRef => "self",
            Self::This => "this",
            Self::Global => "global",
            Self::Nop => "nop",
            Self::LoadProperty => "loadProperty",
            Self::StoreProperty => "storeProperty",
            Self::DeleteProperty => "deleteProperty",
            Self::Array => "array",
            Self::Object => "object",
            Self::Fn => "fn",
            Self::Binary => "binary",
            Self::Unary => "unary",
            Self::PushArg => "pushArg",
            Self::Call => "call",
            Self::New => "new",
            Self::Branch => "branch",
            Self::Ret => "ret",
            Self::Phi => "phi",
            Self::ToPhi => "to_phi",
        }
    }

    /// Whether the instruction yields a value other instructions can use.
    pub fn produces_value(self) -> bool {
        !matches!(
            self,
            Self::StoreGlobal
                | Self::StoreContext
                | Self::StoreProperty
                | Self::PushArg
                | Self::Branch
                | Self::Ret
                | Self::ToPhi
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Operands = SmallVec<[Operand; 3]>;

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub id: InstrId,
    pub opcode: Opcode,
    pub operands: Operands,
    /// Local name this instruction's value is bound to.
    pub binding: Option<String>,
}

impl Instruction {
    pub fn new(id: InstrId, opcode: Opcode, operands: Operands) -> Self {
        Self {
            id,
            opcode,
            operands,
            binding: None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.binding {
            Some(name) => write!(f, "@{name}")?,
            None => write!(f, "{}", self.id)?,
        }
        write!(f, " = {}", self.opcode)?;
        for (i, operand) in self.operands.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            write!(f, "{operand}")?;
        }
        Ok(())
    }
}
