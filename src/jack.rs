//! Compiles Jack source files into VM code
//!
//! A single recursive-descent pass tokenizes, parses and emits VM code for
//! one class at a time; there is no intermediate syntax tree. Every
//! subroutine body unconditionally ends in a VM `return`, constructors
//! allocate `this` via `Memory.alloc`, and methods receive `this` as an
//! implicit first argument (`pointer 0`).
//!
//! The standard library (`Math`, `String`, `Array`, `Output`, `Screen`,
//! `Keyboard`, `Memory`, `Sys`) is assumed to exist at link time; this
//! module only ever emits `call`s to it.

pub mod compilation_engine;
pub mod error;
pub mod symbol_table;
pub mod token;
pub mod tokenizer;
pub mod vm_writer;

pub use error::Error;
pub use vm_writer::VmCode;

use token::TokenStream;

/// Tokenize and compile a single Jack class, returning its VM code as text
pub fn compile(source: &str) -> Result<Vec<String>, Error> {
    let tokens = tokenizer::tokenize(source)?;
    let stream = TokenStream::new(tokens);
    compilation_engine::compile_class(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_rejects_unlexable_source() {
        let err = compile("class Main { @ }").unwrap_err();
        assert!(matches!(err, Error::Lex(_)));
    }
}
