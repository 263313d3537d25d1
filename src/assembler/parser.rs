//! The Parser module turns the code and data sections produced by the
//! lexer into encoded instructions and data.
//!
//! Each line is encoded on its own: success yields a record, failure yields
//! the message for that line. Only the first defect on a line is reported.
use regex::Regex;

use super::ast::*;
use super::catalog::OpcodeCatalog;
use super::diagnostics::Diagnostics;
use super::lexer;

pub struct Parser<'a> {
    catalog: &'a OpcodeCatalog,
    words:   &'static Regex,
}

impl<'a> Parser<'a> {
    pub fn new(catalog: &'a OpcodeCatalog) -> Self {
        Parser { catalog, words: lexer::word_separator() }
    }

    /// Encodes every code line. Diagnostics are keyed by the 1-based
    /// position of the line within the code section.
    pub fn code(&self, lines: &[String], diagnostics: &mut Diagnostics) -> Vec<Instruction> {
        let mut out = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            match self.instruction(line) {
                Ok(ins) => out.push(ins),
                Err(e) => { diagnostics.line(index + 1, e); },
            }
        }
        out
    }

    /// Encodes every data line. Diagnostics are keyed from the line after
    /// the last code line, i.e. `code_len + 1` for the first datum.
    pub fn data(&self, lines: &[String], code_len: usize, diagnostics: &mut Diagnostics) -> Vec<Datum> {
        let offset = code_len + 1;
        let mut out = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            match self.datum(line) {
                Ok(datum) => out.push(datum),
                Err(e) => { diagnostics.line(offset + index, e); },
            }
        }
        out
    }

    /// Encodes a single trimmed code line.
    pub fn instruction(&self, line: &str) -> Result<Instruction, &'static str> {
        let parts: Vec<&str> = self.words.split(line).collect();
        let mnemonic = parts.first().copied().unwrap_or_default();

        if !self.catalog.contains(&mnemonic.to_uppercase()) {
            return Err("illegal mnemonic");
        }
        let opcode = match self.catalog.opcode(mnemonic) {
            Some(opcode) => opcode,
            None => return Err("mnemonic must be in uppercase"),
        };

        if self.catalog.takes_no_argument(mnemonic) {
            return match parts.len() {
                1 => Ok(Instruction::bare(opcode)),
                _ => Err("mnemonic does not take arguments"),
            };
        }

        match parts.len() {
            1 => Err("mnemonic has no arguments"),
            2 => self.operand(mnemonic, parts[1])
                .map(|(operand, mode)| Instruction { opcode, operand, mode }),
            _ => Err("mnemonic has too many arguments"),
        }
    }

    /// Classifies an argument by its bracket prefix and parses the hex
    /// value that follows.
    fn operand(&self, mnemonic: &str, arg: &str) -> Result<(i32, Mode), &'static str> {
        if arg.len() >= 3 && arg.starts_with("[[") {
            if !self.catalog.accepts_indirect(mnemonic) {
                return Err("does not allow indirect addressing");
            }
            parse_hex(&arg[2..])
                .map(|value| (value, Mode::Indirect))
                .ok_or("indirect argument is not a hex number")
        } else if let Some(rest) = arg.strip_prefix('[') {
            parse_hex(rest)
                .map(|value| (value, Mode::Direct))
                .ok_or("direct argument is not a hex number")
        } else {
            if !self.catalog.accepts_immediate(mnemonic) {
                return Err("does not allow immediate addressing");
            }
            parse_hex(arg)
                .map(|value| (value, Mode::Immediate))
                .ok_or("immediate argument is not a hex number")
        }
    }

    /// Encodes a single trimmed data line.
    pub fn datum(&self, line: &str) -> Result<Datum, &'static str> {
        let parts: Vec<&str> = self.words.split(line).collect();
        if parts.len() != 2 {
            return Err("this is not an address/value pair");
        }

        match (parse_hex(parts[0]), parse_hex(parts[1])) {
            (Some(address), Some(value)) => Ok(Datum { address, value }),
            _ => Err("address is not a hex number"),
        }
    }
}
