//! This AST describes an assembled Pippin program.
//!
//! A program is a code section of encoded instructions followed by a data
//! section of address/value pairs that seed memory before execution.
//!
//! Source syntax is one directive per line. Bare hex literals are
//! immediate operands, a single `[` marks a direct (memory) operand and `[[`
//! an indirect one. A `DATA` line starts the memory image.
//!
//! ```nasm
//! LOD 5
//! ADD [A
//! STO [[B
//! HALT
//! DATA
//! A 7
//! B A
//! ```
//!
//! The assembled form is plain text. Each instruction renders as
//! `OPCODE OPERAND MODE`, the code section ends with a `-1` line, and each
//! datum renders as `ADDRESS VALUE`. All numbers are uppercase hex with no
//! padding.

use std::fmt;

/// Marks the end of the code section in assembled output.
pub const SECTION_SEPARATOR: &str = "-1";

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Mode {
    Immediate,
    Direct,
    Indirect,
}

impl Mode {
    pub fn to_digit(&self) -> u8 {
        use Mode::*;
        match self {
            Immediate => 0,
            Direct    => 1,
            Indirect  => 2,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_digit())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Instruction {
    pub opcode:  u32,
    pub operand: i32,
    pub mode:    Mode,
}

impl Instruction {
    /// An instruction that takes no argument: operand and mode are both zero.
    pub fn bare(opcode: u32) -> Self {
        Instruction { opcode, operand: 0, mode: Mode::Immediate }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:X} {} {}", self.opcode, to_hex(self.operand), self.mode)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Datum {
    pub address: i32,
    pub value:   i32,
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", to_hex(self.address), to_hex(self.value))
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Program {
    pub code: Vec<Instruction>,
    pub data: Vec<Datum>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for ins in self.code.iter() {
            writeln!(f, "{}", ins)?;
        }
        writeln!(f, "{}", SECTION_SEPARATOR)?;
        for datum in self.data.iter() {
            writeln!(f, "{}", datum)?;
        }
        Ok(())
    }
}

/// Parses a base-16 literal with an optional leading `+` or `-`.
/// Digits are case-insensitive and the value must fit in an `i32`.
pub fn parse_hex(text: &str) -> Option<i32> {
    i32::from_str_radix(text, 16).ok()
}

/// Renders a value as uppercase hex. Negative values keep their sign
/// rather than printing two's complement, so `-10` renders as `-A`.
pub fn to_hex(value: i32) -> String {
    if value < 0 {
        format!("-{:X}", value.unsigned_abs())
    } else {
        format!("{:X}", value)
    }
}
