//! Errors raised while tokenizing or compiling Jack source

use std::fmt;

use super::token::{Token, TokenType};
use super::tokenizer::LexError;

/// Failure to parse or compile a Jack compilation unit
#[derive(Debug)]
pub enum Error {
    /// Lexing failed before parsing could even begin
    Lex(LexError),
    /// The current token did not match what the grammar expected
    Parse {
        expected: String,
        found: Option<Token>,
    },
    /// A variable was referenced that was never declared in scope
    UndeclaredSymbol { name: String },
}

impl Error {
    pub fn unexpected_end(expected: impl Into<String>) -> Error {
        Error::Parse {
            expected: expected.into(),
            found: None,
        }
    }

    pub fn unexpected_token(expected: impl Into<String>, found: Token) -> Error {
        Error::Parse {
            expected: expected.into(),
            found: Some(found),
        }
    }
}

impl From<LexError> for Error {
    fn from(err: LexError) -> Error {
        Error::Lex(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lex(err) => write!(f, "lex error: {err}"),
            Error::Parse { expected, found: Some(token) } => write!(
                f,
                "parse error: expected {expected}, found {} token {:?}",
                token.kind(),
                token.value()
            ),
            Error::Parse { expected, found: None } => {
                write!(f, "parse error: expected {expected}, found end of input")
            }
            Error::UndeclaredSymbol { name } => {
                write!(f, "symbol error: undeclared identifier {name:?}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Helper mirrored from the original compiler: require the current token to
/// be of `kind` (and, if given, one of `values`), consuming and returning it.
pub fn expect<'a>(
    kind: TokenType,
    values: impl IntoIterator<Item = &'a str>,
    current: Option<&Token>,
) -> Result<(), Error> {
    let values: Vec<&str> = values.into_iter().collect();
    match current {
        None => Err(Error::unexpected_end(describe(kind, &values))),
        Some(token) => {
            let kind_ok = token.kind() == kind;
            let value_ok = values.is_empty() || values.contains(&token.value());
            if kind_ok && value_ok {
                Ok(())
            } else {
                Err(Error::unexpected_token(describe(kind, &values), token.clone()))
            }
        }
    }
}

fn describe(kind: TokenType, values: &[&str]) -> String {
    if values.is_empty() {
        kind.to_string()
    } else if values.len() == 1 {
        format!("{kind} {:?}", values[0])
    } else {
        format!("{kind} one of {values:?}")
    }
}
