//! Plain enum error types, surfaced through `tracing::error!` rather than
//! a boxed trait-object error or a derive-macro crate.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerError {
    pub line: usize,
    pub message: String,
}

impl AssemblerError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for AssemblerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for AssemblerError {}

#[derive(Debug)]
pub enum LoaderError {
    Io(std::io::Error),
    WrongKeyLength { expected: usize, found: usize },
    UnparseableHexLine { line: usize, text: String },
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderError::Io(e) => write!(f, "io error: {}", e),
            LoaderError::WrongKeyLength { expected, found } => {
                write!(f, "key file must be {} hex characters, found {}", expected, found)
            }
            LoaderError::UnparseableHexLine { line, text } => {
                write!(f, "line {}: unparseable hex word {:?}", line, text)
            }
        }
    }
}

impl std::error::Error for LoaderError {}

impl From<std::io::Error> for LoaderError {
    fn from(e: std::io::Error) -> Self {
        LoaderError::Io(e)
    }
}

/// A non-fatal fault raised while a functional unit executes. Attached to
/// the instruction's result record; simulation continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionDiagnostic {
    DivisionByZero,
    UnknownOpcodeForUnit,
}

impl fmt::Display for ExecutionDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionDiagnostic::DivisionByZero => write!(f, "división por cero"),
            ExecutionDiagnostic::UnknownOpcodeForUnit => {
                write!(f, "opcode routed to a unit that cannot execute it")
            }
        }
    }
}

impl std::error::Error for ExecutionDiagnostic {}
