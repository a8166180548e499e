//! Command records: the unit of replication.

use std::fmt;

/// Operation recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Declares the vector length. Always the first record of a log.
    Init = 1,
    /// A bit was set.
    Set = 2,
    /// A bit was cleared.
    Clear = 3,
    /// A bit was flipped.
    Flip = 4,
}

impl Opcode {
    /// All opcodes in tag order.
    pub const ALL: [Opcode; 4] = [Opcode::Init, Opcode::Set, Opcode::Clear, Opcode::Flip];

    /// Converts a tag byte to an opcode.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(Self::Init),
            2 => Some(Self::Set),
            3 => Some(Self::Clear),
            4 => Some(Self::Flip),
            _ => None,
        }
    }

    /// Converts the opcode to its tag byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Upper-case name used in dumps.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::Set => "SET",
            Self::Clear => "CLEAR",
            Self::Flip => "FLIP",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single replicated command.
///
/// For [`Opcode::Init`] the value is the declared vector length; for every
/// other opcode it is a bit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandRecord {
    opcode: Opcode,
    value: u64,
}

impl CommandRecord {
    /// Creates a record.
    #[must_use]
    pub const fn new(opcode: Opcode, value: u64) -> Self {
        Self { opcode, value }
    }

    /// An `Init` record declaring `length` bits.
    #[must_use]
    pub const fn init(length: u64) -> Self {
        Self::new(Opcode::Init, length)
    }

    /// A `Set` record for bit `pos`.
    #[must_use]
    pub const fn set(pos: u64) -> Self {
        Self::new(Opcode::Set, pos)
    }

    /// A `Clear` record for bit `pos`.
    #[must_use]
    pub const fn clear(pos: u64) -> Self {
        Self::new(Opcode::Clear, pos)
    }

    /// A `Flip` record for bit `pos`.
    #[must_use]
    pub const fn flip(pos: u64) -> Self {
        Self::new(Opcode::Flip, pos)
    }

    /// Returns the opcode.
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Returns the length (for `Init`) or bit index.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.value
    }
}

impl fmt::Display for CommandRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode {
            Opcode::Init => write!(f, "{} length={}", self.opcode, self.value),
            _ => write!(f, "{} pos={}", self.opcode, self.value),
        }
    }
}
