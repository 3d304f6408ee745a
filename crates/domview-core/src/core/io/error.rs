use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StructureError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: StructureParseErrorKind,
    },
    #[error("Unsupported structure format for '{0}'")]
    UnsupportedFormat(String),
    #[error("No atoms found in structure")]
    Empty,
}

#[derive(Debug, Error)]
pub enum StructureParseErrorKind {
    #[error("Invalid integer in {field} (value: '{value}')")]
    InvalidInt { field: String, value: String },
    #[error("Invalid float in {field} (value: '{value}')")]
    InvalidFloat { field: String, value: String },
    #[error("Atom record is too short ({length} characters)")]
    LineTooShort { length: usize },
    #[error("Required column '{0}' is missing from the atom_site loop")]
    MissingColumn(&'static str),
    #[error("Row has {found} values but the atom_site loop declares {expected} columns")]
    ColumnCountMismatch { expected: usize, found: usize },
}
