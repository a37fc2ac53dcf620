//! Error types returned by the document processor.
//!
//! Every variant carries the 1-based source line at which the problem was
//! detected, mirroring this crate's convention (see `cursor::Cursor::line`)
//! that errors are terminal: the first one surfaces and parsing halts.

use std::path::PathBuf;

use crate::cursor::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{message} (line {line})")]
    Parse { message: String, line: usize },

    #[error("invalid indentation: {message} (line {line})")]
    InvalidIndentation { message: String, line: usize },

    #[error("variable '{name}' is not defined (line {line})")]
    VariableNotDefined { name: String, line: usize },

    #[error("key '{key}' is already defined (line {line})")]
    DuplicatedKey { key: String, line: usize },

    #[error("variable '${name}' is already defined (line {line})")]
    DuplicatedVariable { name: String, line: usize },

    #[error("path '{}' has already been imported (line {line})", path.display())]
    DuplicatedImport { path: PathBuf, line: usize },

    #[error("file not found: '{}'", path.display())]
    FileNotFound { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn parse(message: impl Into<String>, line: usize) -> Self {
        Error::Parse {
            message: message.into(),
            line,
        }
    }

    pub fn invalid_indentation(message: impl Into<String>, line: usize) -> Self {
        Error::InvalidIndentation {
            message: message.into(),
            line,
        }
    }
}

/// A parse failure annotated with the byte offset it occurred at, used
/// internally so [`crate::combinators::choice`] can keep the
/// deepest-position failure across a set of alternatives (spec'd
/// tie-break: the last one encountered at that depth wins).
#[derive(Debug)]
pub(crate) struct Failure {
    pub error: Error,
    pub pos: usize,
}

impl Failure {
    pub fn new(error: Error, pos: usize) -> Self {
        Failure { error, pos }
    }

    /// Builds a failure positioned at the cursor's current offset.
    pub fn at(cursor: &Cursor, error: Error) -> Self {
        Failure::new(error, cursor.pos())
    }
}

impl From<Failure> for Error {
    fn from(failure: Failure) -> Error {
        failure.error
    }
}

pub(crate) type PResult<T> = std::result::Result<T, Failure>;
