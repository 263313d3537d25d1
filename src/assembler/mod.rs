//! The Assembler module is in charge of taking a Pippin source file and
//! producing the textual program image read by the Pippin machine.
//!
//! It works in two passes. The lexer checks the layout of every raw line
//! and splits the file into code and data. The parser then encodes each
//! section line by line. Every defect found along the way is recorded in a
//! `Diagnostics` map and output is only written when that map stays empty.

pub mod ast;
pub mod catalog;
pub mod diagnostics;
pub mod lexer;
pub mod parser;

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use self::ast::Program;
use self::catalog::OpcodeCatalog;
use self::diagnostics::Diagnostics;
use self::lexer::{Sections, SourceLine};
use self::parser::Parser;

/// Errors in how the assembler was called, as opposed to defects in the
/// source being assembled.
#[derive(Debug)]
pub enum AssembleError {
    /// The diagnostics container handed in already held messages.
    DiagnosticsNotEmpty(usize),
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssembleError::DiagnosticsNotEmpty(n) => {
                write!(f, "coding error: the diagnostics map already holds {} message(s)", n)
            },
        }
    }
}

impl std::error::Error for AssembleError {}

/// The outcome of one assembler run.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Assembly {
    pub sections: Sections,
    /// Only complete when `success` is set.
    pub program:  Program,
    pub success:  bool,
}

/// Assembles already-read source lines. Diagnostics must be empty on entry.
pub fn assemble(
    lines: &[SourceLine],
    catalog: &OpcodeCatalog,
    diagnostics: &mut Diagnostics,
) -> Result<Assembly, AssembleError> {
    ensure_empty(diagnostics)?;
    let parser = Parser::new(catalog);

    lexer::check_layout(lines, diagnostics);
    let sections = lexer::sections(lines);
    debug!("split {} line(s) into {} code and {} data line(s)",
        lines.len(), sections.code.len(), sections.data.len());

    let code = parser.code(&sections.code, diagnostics);
    let data = parser.data(&sections.data, sections.code.len(), diagnostics);

    let success = diagnostics.is_empty();
    Ok(Assembly { sections, program: Program { code, data }, success })
}

/// Reads `input`, assembles it and, when no diagnostics were recorded,
/// writes the program to `output`. Passing `None` for `output` only checks
/// the source.
///
/// A missing or unreadable input file is recorded under line 0. Nothing
/// else can be diagnosed after that, so the run stops there and fails.
pub fn assemble_file(
    input: &Path,
    output: Option<&Path>,
    catalog: &OpcodeCatalog,
    diagnostics: &mut Diagnostics,
) -> Result<Assembly, AssembleError> {
    ensure_empty(diagnostics)?;

    let lines = match File::open(input).and_then(|f| lexer::read_lines(Box::new(f))) {
        Ok(lines) => lines,
        Err(err) => {
            debug!("unable to read `{}`: {}", input.display(), err);
            diagnostics.file("Unable to open the input file");
            return Ok(Assembly::default());
        },
    };

    let mut assembly = assemble(&lines, catalog, diagnostics)?;
    if let (true, Some(path)) = (assembly.success, output) {
        match write_program(&assembly.program, path) {
            Ok(()) => info!("wrote {} instruction(s) and {} datum(s) to `{}`",
                assembly.program.code.len(), assembly.program.data.len(), path.display()),
            Err(err) => {
                debug!("unable to write `{}`: {}", path.display(), err);
                diagnostics.file("Unable to write the assembled program to the output file");
                assembly.success = false;
            },
        }
    }

    Ok(assembly)
}

/// Name of the file the program is staged in before it replaces `path`.
fn staging_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_owned();
    staged.push(".partial");
    PathBuf::from(staged)
}

/// Writes the whole program next to `path` and renames it into place, so
/// `path` ends up holding either the complete program or nothing new.
fn write_program(program: &Program, path: &Path) -> io::Result<()> {
    let staged = staging_path(path);
    let result = fs::write(&staged, program.to_string())
        .and_then(|_| fs::rename(&staged, path));
    if result.is_err() {
        let _ = fs::remove_file(&staged);
    }
    result
}

fn ensure_empty(diagnostics: &Diagnostics) -> Result<(), AssembleError> {
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(AssembleError::DiagnosticsNotEmpty(diagnostics.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("pasm-{}-{}", std::process::id(), name));
        let _ = fs::remove_file(&path);
        path
    }

    fn assemble_source(
        source: &str,
        catalog: &OpcodeCatalog,
        diagnostics: &mut Diagnostics,
    ) -> Result<Assembly, AssembleError> {
        let lines = lexer::read_lines(Box::new(source.as_bytes())).unwrap();
        assemble(&lines, catalog, diagnostics)
    }

    fn check(source: &str) -> (Assembly, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let assembly = assemble_source(source, &OpcodeCatalog::pippin(), &mut diagnostics).unwrap();
        (assembly, diagnostics)
    }

    #[test]
    fn test_assemble_program() {
        let (assembly, diagnostics) = check("LOD 5\nADD [A\nHALT\nDATA\nA 7\n");
        assert!(diagnostics.is_empty());
        assert!(assembly.success);
        assert_eq!(assembly.program.to_string(), "1 5 0\n3 A 1\nF 0 0\n-1\nA 7\n");
        assert_eq!(assembly.sections.code, vec!["LOD 5", "ADD [A", "HALT"]);
    }

    #[test]
    fn test_leading_white_space() {
        let (assembly, diagnostics) = check(" LOD 5");
        assert!(!assembly.success);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.get(1), Some("Error on line 1: starts with white space"));
    }

    #[test]
    fn test_lowercase_mnemonic() {
        let (assembly, diagnostics) = check("lod 5");
        assert!(!assembly.success);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.get(1), Some("Error on line 1: mnemonic must be in uppercase"));
    }

    #[test]
    fn test_every_defect_is_reported() {
        let (assembly, diagnostics) = check("LOD 5\nSTO 5\nfoo\nHALT 1\nDATA\nA\nB Z\n");
        assert!(!assembly.success);
        assert_eq!(
            diagnostics.iter().map(|(line, _)| line).collect::<Vec<_>>(),
            vec![2, 3, 4, 5, 6]
        );
        assert_eq!(diagnostics.get(5), Some("Error on line 5: this is not an address/value pair"));
        assert_eq!(diagnostics.get(6), Some("Error on line 6: address is not a hex number"));
    }

    #[test]
    fn test_colliding_line_numbers() {
        // The blank line is source line 2; the bad datum is also keyed 2
        // (one code line plus one) and replaces the layout message.
        let (assembly, diagnostics) = check("HALT\n\nDATA\nA\n");
        assert!(!assembly.success);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.get(2), Some("Error on line 2: this is not an address/value pair"));
    }

    #[test]
    fn test_empty_source() {
        let (assembly, diagnostics) = check("");
        assert!(diagnostics.is_empty());
        assert_eq!(assembly.program.to_string(), "-1\n");
    }

    #[test]
    fn test_diagnostics_must_start_empty() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.line(1, "left over");
        match assemble_source("HALT", &OpcodeCatalog::pippin(), &mut diagnostics) {
            Err(AssembleError::DiagnosticsNotEmpty(1)) => {},
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_assemble_file() {
        let input = scratch("ok.pasm");
        let output = scratch("ok.pexe");
        fs::write(&input, "LOD [[B\nSTO [C\nJUMP 0\nDATA\nB C\nC -1\n\n\n").unwrap();

        let mut diagnostics = Diagnostics::new();
        let assembly = assemble_file(&input, Some(&output), &OpcodeCatalog::pippin(), &mut diagnostics).unwrap();
        assert!(diagnostics.is_empty(), "{}", diagnostics);
        assert!(assembly.success);
        assert_eq!(fs::read_to_string(&output).unwrap(), "1 B 2\n2 C 1\nB 0 0\n-1\nB C\nC -1\n");
        assert!(!staging_path(&output).exists());

        let _ = fs::remove_file(&input);
        let _ = fs::remove_file(&output);
    }

    #[test]
    fn test_no_output_on_error() {
        let input = scratch("bad.pasm");
        let output = scratch("bad.pexe");
        fs::write(&input, "LOD 5\nlod 5\n").unwrap();

        let mut diagnostics = Diagnostics::new();
        let assembly = assemble_file(&input, Some(&output), &OpcodeCatalog::pippin(), &mut diagnostics).unwrap();
        assert!(!assembly.success);
        assert_eq!(diagnostics.len(), 1);
        assert!(!output.exists());

        let _ = fs::remove_file(&input);
    }

    #[test]
    fn test_check_only() {
        let input = scratch("check.pasm");
        fs::write(&input, "NOP\n").unwrap();

        let mut diagnostics = Diagnostics::new();
        let assembly = assemble_file(&input, None, &OpcodeCatalog::pippin(), &mut diagnostics).unwrap();
        assert!(assembly.success);
        assert_eq!(assembly.program.to_string(), "0 0 0\n-1\n");

        let _ = fs::remove_file(&input);
    }

    #[test]
    fn test_missing_input() {
        let input = scratch("missing.pasm");
        let output = scratch("missing.pexe");

        let mut diagnostics = Diagnostics::new();
        let assembly = assemble_file(&input, Some(&output), &OpcodeCatalog::pippin(), &mut diagnostics).unwrap();
        assert!(!assembly.success);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.get(0), Some("Error: Unable to open the input file"));
        assert!(!output.exists());
    }

    #[test]
    fn test_unwritable_output() {
        let input = scratch("unwritable.pasm");
        fs::write(&input, "HALT\n").unwrap();
        let output = scratch("no-such-dir").join("out.pexe");

        let mut diagnostics = Diagnostics::new();
        let assembly = assemble_file(&input, Some(&output), &OpcodeCatalog::pippin(), &mut diagnostics).unwrap();
        assert!(!assembly.success);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics.get(0),
            Some("Error: Unable to write the assembled program to the output file")
        );

        let _ = fs::remove_file(&input);
    }

    #[test]
    fn test_carriage_return_line_endings() {
        let (assembly, diagnostics) = check("LOD 5\rHALT\r");
        assert!(diagnostics.is_empty(), "{}", diagnostics);
        assert!(assembly.success);
        assert_eq!(assembly.program.to_string(), "1 5 0\nF 0 0\n-1\n");

        let input = scratch("cr.pasm");
        let output = scratch("cr.pexe");
        fs::write(&input, "LOD 5\rHALT\r").unwrap();

        let mut diagnostics = Diagnostics::new();
        let assembly = assemble_file(&input, Some(&output), &OpcodeCatalog::pippin(), &mut diagnostics).unwrap();
        assert!(assembly.success);
        assert_eq!(fs::read_to_string(&output).unwrap(), "1 5 0\nF 0 0\n-1\n");

        let _ = fs::remove_file(&input);
        let _ = fs::remove_file(&output);
    }

    #[test]
    fn test_failed_rename_leaves_nothing_behind() {
        let input = scratch("rename.pasm");
        fs::write(&input, "HALT\n").unwrap();
        // A directory cannot be replaced by the staged file.
        let output = scratch("rename-dir");
        let _ = fs::remove_dir_all(&output);
        fs::create_dir(&output).unwrap();

        let mut diagnostics = Diagnostics::new();
        let assembly = assemble_file(&input, Some(&output), &OpcodeCatalog::pippin(), &mut diagnostics).unwrap();
        assert!(!assembly.success);
        assert_eq!(
            diagnostics.get(0),
            Some("Error: Unable to write the assembled program to the output file")
        );
        assert!(output.is_dir());
        assert!(!staging_path(&output).exists());

        let _ = fs::remove_file(&input);
        let _ = fs::remove_dir_all(&output);
    }
}
