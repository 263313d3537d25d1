//! The instruction set the assembler validates against.
//!
//! A catalog maps uppercase mnemonics to their numeric opcode and records
//! which addressing modes each mnemonic accepts. Lookups are case-sensitive:
//! `lod` does not resolve even though `LOD` does.
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct OpcodeCatalog {
    opcodes:          BTreeMap<String, u32>,
    no_argument:      BTreeSet<String>,
    allows_immediate: BTreeSet<String>,
    allows_indirect:  BTreeSet<String>,
}

impl OpcodeCatalog {
    /// An empty instruction set. Use the builder methods to populate it.
    pub fn new() -> Self {
        Self::default()
    }

    /// The Pippin instruction set.
    ///
    /// ```text
    /// NOP  0    LOD  1    STO  2    ADD  3    SUB  4
    /// MUL  5    DIV  6    AND  7    NOT  8    CMPL 9
    /// CMPZ A    JUMP B    JMPZ C    HALT F
    /// ```
    pub fn pippin() -> Self {
        Self::new()
            .instruction("NOP", 0x0)
            .instruction("LOD", 0x1)
            .instruction("STO", 0x2)
            .instruction("ADD", 0x3)
            .instruction("SUB", 0x4)
            .instruction("MUL", 0x5)
            .instruction("DIV", 0x6)
            .instruction("AND", 0x7)
            .instruction("NOT", 0x8)
            .instruction("CMPL", 0x9)
            .instruction("CMPZ", 0xA)
            .instruction("JUMP", 0xB)
            .instruction("JMPZ", 0xC)
            .instruction("HALT", 0xF)
            .no_argument(&["HALT", "NOP", "NOT"])
            .allows_immediate(&["LOD", "ADD", "SUB", "MUL", "DIV", "AND", "JUMP", "JMPZ"])
            .allows_indirect(&["LOD", "STO", "ADD", "SUB", "MUL", "DIV"])
    }

    pub fn instruction(mut self, mnemonic: &str, opcode: u32) -> Self {
        self.opcodes.insert(mnemonic.to_owned(), opcode);
        self
    }

    /// Marks mnemonics that must appear without an argument.
    pub fn no_argument(mut self, mnemonics: &[&str]) -> Self {
        self.no_argument.extend(mnemonics.iter().map(|m| m.to_string()));
        self
    }

    /// Marks mnemonics that accept a bare hex literal.
    pub fn allows_immediate(mut self, mnemonics: &[&str]) -> Self {
        self.allows_immediate.extend(mnemonics.iter().map(|m| m.to_string()));
        self
    }

    /// Marks mnemonics that accept a `[[` operand.
    pub fn allows_indirect(mut self, mnemonics: &[&str]) -> Self {
        self.allows_indirect.extend(mnemonics.iter().map(|m| m.to_string()));
        self
    }

    pub fn opcode(&self, mnemonic: &str) -> Option<u32> {
        self.opcodes.get(mnemonic).copied()
    }

    pub fn contains(&self, mnemonic: &str) -> bool {
        self.opcodes.contains_key(mnemonic)
    }

    pub fn takes_no_argument(&self, mnemonic: &str) -> bool {
        self.no_argument.contains(mnemonic)
    }

    pub fn accepts_immediate(&self, mnemonic: &str) -> bool {
        self.allows_immediate.contains(mnemonic)
    }

    pub fn accepts_indirect(&self, mnemonic: &str) -> bool {
        self.allows_indirect.contains(mnemonic)
    }

    /// All mnemonics in opcode-name order.
    pub fn mnemonics(&self) -> impl Iterator<Item = &str> {
        self.opcodes.keys().map(String::as_str)
    }
}
