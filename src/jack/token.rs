//! [Token] and [TokenStream]

use std::collections::VecDeque;
use std::fmt;

pub const KEYWORDS: [&str; 21] = [
    "class", "constructor", "function", "method", "field", "static", "var",
    "int", "char", "boolean", "void", "true", "false", "null", "this", "let",
    "do", "if", "else", "while", "return",
];

pub const SYMBOLS: [char; 19] = [
    '{', '}', '(', ')', '[', ']', '.', ',', ';', '+', '-', '*', '/', '&',
    '|', '<', '>', '=', '~',
];

/// Kind of a [Token]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Keyword,
    Symbol,
    IntegerConstant,
    StringConstant,
    Identifier,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenType::Keyword => "keyword",
            TokenType::Symbol => "symbol",
            TokenType::IntegerConstant => "integerConstant",
            TokenType::StringConstant => "stringConstant",
            TokenType::Identifier => "identifier",
        };
        write!(f, "{name}")
    }
}

/// Atomic lexical element of the Jack language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenType,
    value: String,
}

impl Token {
    /// Build a token, validating `value` against `kind`
    pub fn new(kind: TokenType, value: impl Into<String>) -> Result<Token, String> {
        let value = value.into();
        match kind {
            TokenType::Keyword => {
                if !KEYWORDS.contains(&value.as_str()) {
                    return Err(format!("invalid keyword: {value}"));
                }
            }
            TokenType::Symbol => {
                if value.chars().count() != 1 || !SYMBOLS.contains(&value.chars().next().unwrap()) {
                    return Err(format!("invalid symbol: {value}"));
                }
            }
            TokenType::IntegerConstant => {
                let in_range = value.chars().all(|c| c.is_ascii_digit())
                    && !value.is_empty()
                    && value.parse::<u32>().map(|n| n <= 32767).unwrap_or(false);
                if !in_range {
                    return Err(format!("invalid integer constant: {value}"));
                }
            }
            TokenType::StringConstant => {
                if value.contains('"') || value.contains('\n') {
                    return Err(format!("invalid string constant: {value}"));
                }
            }
            TokenType::Identifier => {
                if value.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(true) {
                    return Err(format!("invalid identifier: {value}"));
                }
            }
        }
        Ok(Token { kind, value })
    }

    pub fn kind(&self) -> TokenType {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is(&self, kind: TokenType, value: &str) -> bool {
        self.kind == kind && self.value == value
    }
}

/// Ordered sequence of tokens with a movable head
pub struct TokenStream {
    tokens: VecDeque<Token>,
}

impl TokenStream {
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> TokenStream {
        TokenStream {
            tokens: tokens.into_iter().collect(),
        }
    }

    /// The head token, if any
    pub fn current(&self) -> Option<&Token> {
        self.tokens.front()
    }

    /// One token past the head, if any
    pub fn next(&self) -> Option<&Token> {
        self.tokens.get(1)
    }

    /// Return the head token and advance the stream by one
    pub fn pop_current(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_accepts_known_words_and_rejects_others() {
        assert!(Token::new(TokenType::Keyword, "class").is_ok());
        assert!(Token::new(TokenType::Keyword, "integer").is_err());
    }

    #[test]
    fn symbol_must_be_a_single_known_character() {
        assert!(Token::new(TokenType::Symbol, "{").is_ok());
        assert!(Token::new(TokenType::Symbol, "?").is_err());
        assert!(Token::new(TokenType::Symbol, "{{").is_err());
    }

    #[test]
    fn integer_constant_bounds() {
        assert!(Token::new(TokenType::IntegerConstant, "0").is_ok());
        assert!(Token::new(TokenType::IntegerConstant, "32767").is_ok());
        assert!(Token::new(TokenType::IntegerConstant, "32768").is_err());
        assert!(Token::new(TokenType::IntegerConstant, "-1").is_err());
    }

    #[test]
    fn string_constant_rejects_quotes_and_newlines() {
        assert!(Token::new(TokenType::StringConstant, "hello").is_ok());
        assert!(Token::new(TokenType::StringConstant, "he\"llo").is_err());
        assert!(Token::new(TokenType::StringConstant, "he\nllo").is_err());
    }

    #[test]
    fn identifier_cannot_start_with_a_digit() {
        assert!(Token::new(TokenType::Identifier, "foo_bar2").is_ok());
        assert!(Token::new(TokenType::Identifier, "2foo").is_err());
    }

    #[test]
    fn token_stream_advances_one_at_a_time() {
        let a = Token::new(TokenType::Identifier, "a").unwrap();
        let b = Token::new(TokenType::Identifier, "b").unwrap();
        let mut stream = TokenStream::new(vec![a.clone(), b.clone()]);
        assert_eq!(stream.current(), Some(&a));
        assert_eq!(stream.next(), Some(&b));
        assert_eq!(stream.pop_current(), Some(a));
        assert_eq!(stream.current(), Some(&b));
        assert_eq!(stream.pop_current(), Some(b));
        assert_eq!(stream.current(), None);
        assert_eq!(stream.pop_current(), None);
    }
}
