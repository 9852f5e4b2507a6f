//! Two-pass assembler: label resolution, variable allocation, encoding

use std::collections::HashMap;

use super::instruction::{self, Instruction};
use super::lookup::predefined_symbols;

/// Failure to assemble a `.asm` program into `.hack` machine code
#[derive(Debug)]
pub enum Error {
    Encoding(instruction::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Encoding(err) => write!(f, "encoding error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<instruction::Error> for Error {
    fn from(err: instruction::Error) -> Error {
        Error::Encoding(err)
    }
}

/// Strip comments and indentation, keeping one pseudo-instruction per line.
/// Mirrors the original's `^\s*([^\s/]+).*?$` extraction: a line reduces to
/// its first whitespace/`/`-delimited token.
fn extract_pseudo_code(program: &str) -> Vec<String> {
    program
        .lines()
        .filter_map(|line| {
            let token: String = line
                .trim_start()
                .chars()
                .take_while(|c| !c.is_whitespace() && *c != '/')
                .collect();
            if token.is_empty() {
                None
            } else {
                Some(token)
            }
        })
        .collect()
}

/// Pass 1: remove `(LABEL)` lines, recording each label's instruction index
fn resolve_labels(pseudo_code: &[String], symbol_table: &mut HashMap<String, u16>) -> Vec<String> {
    let mut pure_code = Vec::new();
    let mut address: u16 = 0;
    for symbol in pseudo_code {
        if let Some(label) = symbol.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
            symbol_table.insert(label.to_string(), address);
        } else {
            pure_code.push(symbol.clone());
            address += 1;
        }
    }
    pure_code
}

/// Pass 2: assign the next free RAM slot (starting at 16) to every
/// not-yet-known `@variable`
fn resolve_variables(pure_code: &[String], symbol_table: &mut HashMap<String, u16>) {
    let mut next_address: u16 = 16;
    for symbol in pure_code {
        let Some(name) = symbol.strip_prefix('@') else { continue };
        if name.parse::<u32>().is_ok() || symbol_table.contains_key(name) {
            continue;
        }
        symbol_table.insert(name.to_string(), next_address);
        next_address += 1;
    }
}

/// Assemble Hack assembly source into one 16-bit `0`/`1` line per instruction
pub fn assemble(program: &str) -> Result<Vec<String>, Error> {
    let mut symbol_table: HashMap<String, u16> =
        predefined_symbols().iter().map(|(k, v)| (k.clone(), *v)).collect();

    let pseudo_code = extract_pseudo_code(program);
    let pure_code = resolve_labels(&pseudo_code, &mut symbol_table);
    resolve_variables(&pure_code, &mut symbol_table);

    pure_code
        .iter()
        .map(|symbol| encode(symbol, &symbol_table))
        .collect()
}

fn encode(symbol: &str, symbol_table: &HashMap<String, u16>) -> Result<String, Error> {
    let instruction = if let Some(rest) = symbol.strip_prefix('@') {
        let address = match rest.parse::<u32>() {
            Ok(n) => n,
            Err(_) => *symbol_table.get(rest).expect("resolve_variables assigned every symbol") as u32,
        };
        Instruction::a(address)?
    } else {
        Instruction::c_from_symbol(symbol)?
    };
    Ok(instruction.encode())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s5_labels_and_variables() {
        let program = "(LOOP)\n@i\nM=M+1\n@LOOP\n0;JMP";
        let code = assemble(program).unwrap();
        assert_eq!(code.len(), 4);
        assert_eq!(code[0], "0000000000010000");
        assert_eq!(code[3], "1110101010000111");
    }

    #[test]
    fn strips_comments_and_indentation() {
        let program = "  @1  // load 1\n// full line comment\nD=A";
        let code = assemble(program).unwrap();
        assert_eq!(code.len(), 2);
    }

    #[test]
    fn predefined_symbols_resolve_without_allocation() {
        let program = "@SCREEN\nD=A\n@SP\nM=D";
        let code = assemble(program).unwrap();
        assert_eq!(code[0], format!("{:016b}", 0x4000u16));
    }

    #[test]
    fn assembler_is_idempotent_under_comment_and_whitespace_insertion() {
        let program = "@16\nD=A\n@SP\nM=D";
        let once = assemble(program).unwrap();

        let with_noise = "  @16   // comment\nD=A\n\n  @SP\nM=D  ";
        let twice = assemble(with_noise).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn variables_are_allocated_from_16_in_first_seen_order() {
        let program = "@foo\nD=A\n@bar\nD=A\n@foo\nD=A";
        let code = assemble(program).unwrap();
        assert_eq!(code[0], format!("{:016b}", 16u16));
        assert_eq!(code[2], format!("{:016b}", 17u16));
        assert_eq!(code[4], format!("{:016b}", 16u16));
    }
}
