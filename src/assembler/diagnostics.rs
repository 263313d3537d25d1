//! Line-keyed error reporting.
//!
//! Every defect found during assembly is recorded against the line it was
//! found on rather than aborting the run. Line `0` is reserved for problems
//! with the input or output file as a whole.
//!
//! Only one message is kept per line: the last one recorded wins.
use std::collections::BTreeMap;
use std::fmt;

/// Key used for whole-file failures.
pub const FILE_LINE: usize = 0;

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Diagnostics {
    messages: BTreeMap<usize, String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` against `line`, returning the message it displaced.
    pub fn record(&mut self, line: usize, message: String) -> Option<String> {
        let displaced = self.messages.insert(line, message);
        if let Some(old) = &displaced {
            debug!("diagnostic for line {} replaced: `{}`", line, old);
        }
        displaced
    }

    /// Records a defect on a numbered source line.
    pub fn line(&mut self, line: usize, defect: &str) -> Option<String> {
        self.record(line, format!("Error on line {}: {}", line, defect))
    }

    /// Records a whole-file defect under line 0.
    pub fn file(&mut self, defect: &str) -> Option<String> {
        self.record(FILE_LINE, format!("Error: {}", defect))
    }

    pub fn get(&self, line: usize) -> Option<&str> {
        self.messages.get(&line).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Iterates in ascending line order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.messages.iter().map(|(line, msg)| (*line, msg.as_str()))
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (_, msg) in self.iter() {
            writeln!(f, "{}", msg)?;
        }
        Ok(())
    }
}
