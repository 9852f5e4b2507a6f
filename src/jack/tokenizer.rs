//! String -> [Token] sequence
//!
//! Comments (`// ...`, `/* ... */`, `/** ... */`) are stripped before lexing.
//! The lexer itself is a single alternation regex, tried left-to-right; the
//! first named group that matches at a position wins, so `KEYWORD` must be
//! listed before `IDENTIFIER` (and anchored on word boundaries) or an
//! identifier like `classroom` would only ever yield `class` + `room`.

use regex::Regex;
use std::sync::OnceLock;

use super::token::{Token, TokenType, KEYWORDS, SYMBOLS};

/// Failure to lex a source string into tokens
#[derive(Debug)]
pub struct LexError {
    pub character: String,
    pub position: usize,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unexpected character {:?} at byte offset {}",
            self.character, self.position
        )
    }
}

impl std::error::Error for LexError {}

fn escape_for_bracket_expression(symbol: char) -> String {
    if symbol == ']' || symbol == '-' || symbol == '\\' || symbol == '^' {
        format!("\\{symbol}")
    } else {
        symbol.to_string()
    }
}

fn lexer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let keywords = KEYWORDS.join("|");
        let symbols: String = SYMBOLS.iter().copied().map(escape_for_bracket_expression).collect();
        let pattern = format!(
            r#"(?P<KEYWORD>\b(?:{keywords})\b)|"(?P<STRING_CONSTANT>[^"\n]*)"|(?P<IDENTIFIER>\b[A-Za-z_]\w*)|(?P<SYMBOL>[{symbols}])|(?P<INTEGER_CONSTANT>\d+)|(?P<WHITESPACE>\s+)|(?P<MISMATCH>.)"#
        );
        Regex::new(&pattern).expect("tokenizer regex must compile")
    })
}

/// Remove `//`, `/* */` and `/** */` comments from Jack source text
pub fn strip_comments(source: &str) -> String {
    static LINE: OnceLock<Regex> = OnceLock::new();
    static BLOCK: OnceLock<Regex> = OnceLock::new();

    let block = BLOCK.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
    let without_block = block.replace_all(source, " ");

    let line = LINE.get_or_init(|| Regex::new(r"//[^\n]*").unwrap());
    line.replace_all(&without_block, "").into_owned()
}

/// Convert Jack source text into a flat token sequence
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let stripped = strip_comments(source);
    let mut tokens = Vec::new();

    for m in lexer_regex().captures_iter(&stripped) {
        if m.name("WHITESPACE").is_some() {
            continue;
        }
        if let Some(mismatch) = m.name("MISMATCH") {
            return Err(LexError {
                character: mismatch.as_str().to_string(),
                position: mismatch.start(),
            });
        }

        let (kind, text) = if let Some(g) = m.name("KEYWORD") {
            (TokenType::Keyword, g.as_str())
        } else if let Some(g) = m.name("STRING_CONSTANT") {
            (TokenType::StringConstant, g.as_str())
        } else if let Some(g) = m.name("IDENTIFIER") {
            (TokenType::Identifier, g.as_str())
        } else if let Some(g) = m.name("SYMBOL") {
            (TokenType::Symbol, g.as_str())
        } else if let Some(g) = m.name("INTEGER_CONSTANT") {
            (TokenType::IntegerConstant, g.as_str())
        } else {
            unreachable!("every non-mismatch, non-whitespace alternative is named above")
        };

        let token = Token::new(kind, text).map_err(|_| LexError {
            character: text.to_string(),
            position: m.get(0).expect("capture always has a full match").start(),
        })?;
        tokens.push(token);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(Token::value).collect()
    }

    #[test]
    fn keyword_wins_over_identifier_prefix_match() {
        let tokens = tokenize("classroom").unwrap();
        assert_eq!(values(&tokens), vec!["classroom"]);
        assert_eq!(tokens[0].kind(), TokenType::Identifier);
    }

    #[test]
    fn strips_line_block_and_doc_comments() {
        let source = "// leading\nlet x = 1; /* mid\nblock */ /** doc */ let y = 2;";
        let tokens = tokenize(source).unwrap();
        assert_eq!(
            values(&tokens),
            vec!["let", "x", "=", "1", ";", "let", "y", "=", "2", ";"]
        );
    }

    #[test]
    fn string_constants_cannot_span_lines() {
        let tokens = tokenize(r#""hello world""#).unwrap();
        assert_eq!(values(&tokens), vec!["hello world"]);
        assert_eq!(tokens[0].kind(), TokenType::StringConstant);
    }

    #[test]
    fn unknown_character_is_a_lex_error() {
        let err = tokenize("let x = 1 @ 2;").unwrap_err();
        assert_eq!(err.character, "@");
    }

    #[test]
    fn integer_constant_above_32767_is_a_lex_error_not_a_panic() {
        let err = tokenize("let x = 99999;").unwrap_err();
        assert_eq!(err.character, "99999");
    }

    #[test]
    fn lex_round_trip_preserves_token_sequence() {
        let source = "class Main { field int x; function void main ( ) { return ; } }";
        let tokens = tokenize(source).unwrap();
        let rejoined: Vec<&str> = values(&tokens);
        let re_lexed = tokenize(&rejoined.join(" ")).unwrap();
        assert_eq!(values(&re_lexed), rejoined);
    }
}
