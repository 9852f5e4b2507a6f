//! Combines per-file parsers and the code writer into whole-program translation
//!
//! A single [CodeWriter] is shared across every file in one translation run,
//! so comparison and return-address labels stay globally unique even though
//! static-segment names are file-scoped (via [VmCommand::origin]).

use super::code_writer::CodeWriter;
use super::error::Error;
use super::parser;

/// Translate a single `.vm` unit (no bootstrap)
pub fn translate_file(source: &str, origin: &str) -> Result<Vec<String>, Error> {
    let mut code_writer = CodeWriter::new();
    translate_with(&mut code_writer, source, origin)
}

/// Translate every unit in a directory, bootstrap first, `units` sorted by
/// `origin` for a reproducible, file-order-independent result
pub fn translate_directory(units: &[(String, String)]) -> Result<Vec<String>, Error> {
    let mut ordered: Vec<&(String, String)> = units.iter().collect();
    ordered.sort_by(|a, b| a.0.cmp(&b.0));

    let mut code_writer = CodeWriter::new();
    let mut code = code_writer.bootstrap();
    for (origin, source) in ordered {
        code.extend(translate_with(&mut code_writer, source, origin)?);
    }
    Ok(code)
}

fn translate_with(code_writer: &mut CodeWriter, source: &str, origin: &str) -> Result<Vec<String>, Error> {
    let commands = parser::parse(source, origin)?;
    let mut code = Vec::new();
    for command in &commands {
        code.extend(code_writer.write(command)?);
    }
    Ok(code)
}
