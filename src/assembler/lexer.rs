//! This lexer checks the layout of a Pippin source file and splits it
//! into its code and data sections.
use std::io::{self, Read};
use std::sync::OnceLock;

use regex::Regex;

use super::diagnostics::Diagnostics;

/// Separates the code section from the data section.
pub const DATA_MARKER: &str = "DATA";

/// Characters that separate the words of a line.
pub const WORD_SEPARATOR: &str = r"[ \t\n\x0B\x0C\r]+";

/// Line terminators: CRLF, or a lone LF, CR, NEL, LS or PS.
pub const LINE_BREAK: &str = r"\r\n|[\n\r\x{85}\x{2028}\x{2029}]";

/// A raw line of source and its 1-based line number.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SourceLine {
    pub number: usize,
    pub text:   String,
}

/// The trimmed, non-blank lines on either side of the `DATA` marker.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Sections {
    pub code: Vec<String>,
    pub data: Vec<String>,
}

/// Reads every line from `reader`, numbering them from 1.
/// Fails when the input is not valid UTF-8.
pub fn read_lines<T: Read + ?Sized>(mut reader: Box<T>) -> io::Result<Vec<SourceLine>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(split_lines(&text))
}

/// Splits source text on any line terminator. A terminator at the very
/// end does not start another line.
pub fn split_lines(text: &str) -> Vec<SourceLine> {
    let mut parts: Vec<&str> = line_break().split(text).collect();
    if parts.last() == Some(&"") {
        parts.pop();
    }

    parts
        .into_iter()
        .enumerate()
        .map(|(index, text)| SourceLine { number: index + 1, text: text.to_owned() })
        .collect()
}

/// Strips control characters and spaces from both ends of a line.
pub fn trim(text: &str) -> &str {
    text.trim_matches(|c: char| c <= ' ')
}

pub fn is_blank(text: &str) -> bool {
    trim(text).is_empty()
}

/// The matcher used to split a line into words.
pub fn word_separator() -> &'static Regex {
    static WORDS: OnceLock<Regex> = OnceLock::new();
    WORDS.get_or_init(|| Regex::new(WORD_SEPARATOR).expect("WORD_SEPARATOR is a valid pattern"))
}

fn line_break() -> &'static Regex {
    static LINES: OnceLock<Regex> = OnceLock::new();
    LINES.get_or_init(|| Regex::new(LINE_BREAK).expect("LINE_BREAK is a valid pattern"))
}

/// Records a diagnostic for every line that starts with a space or tab and
/// for every blank line that has a non-blank line directly after it.
/// Blank lines at the end of the file are allowed.
pub fn check_layout(lines: &[SourceLine], diagnostics: &mut Diagnostics) {
    for (index, line) in lines.iter().enumerate() {
        if !is_blank(&line.text) {
            if line.text.starts_with(' ') || line.text.starts_with('\t') {
                diagnostics.line(line.number, "starts with white space");
            }
        } else if let Some(next) = lines.get(index + 1) {
            if !is_blank(&next.text) {
                diagnostics.line(line.number, "illegal blank line");
            }
        }
    }
}

/// Sorts the non-blank lines into code and data. Every `DATA` line is
/// consumed; the first one switches to the data section.
pub fn sections(lines: &[SourceLine]) -> Sections {
    let mut out = Sections::default();
    let mut in_data = false;

    for line in lines.iter() {
        let text = trim(&line.text);
        if text == DATA_MARKER {
            in_data = true;
        } else if text.is_empty() {
            continue;
        } else if in_data {
            out.data.push(text.to_owned());
        } else {
            out.code.push(text.to_owned());
        }
    }

    out
}
