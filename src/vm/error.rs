//! Errors raised while parsing or translating VM code

use std::fmt;

/// Failure to parse or translate a VM compilation unit
#[derive(Debug)]
pub enum Error {
    /// The opcode is not one of the known VM commands
    UnknownCommand { command: String },
    /// A command that requires a segment/name/index was missing one
    MissingArgument { command: String, which: &'static str },
    /// An argument was present but not well-formed (e.g. a non-numeric index)
    InvalidArgument { value: String },
    /// A line did not split into one of the supported `command [arg1 [arg2]]` shapes
    InvalidLine { line: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownCommand { command } => write!(f, "unknown command: {command:?}"),
            Error::MissingArgument { command, which } => {
                write!(f, "{command:?} requires {which}")
            }
            Error::InvalidArgument { value } => write!(f, "invalid argument: {value:?}"),
            Error::InvalidLine { line } => write!(f, "malformed line: {line:?}"),
        }
    }
}

impl std::error::Error for Error {}
