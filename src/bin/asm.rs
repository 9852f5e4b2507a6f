use std::path::Path;
use std::{env, fs};

use nand2tetris::asm::assemble;
use nand2tetris::logging::error;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <path_to_asm_file_or_directory>", args[0]);
        std::process::exit(1);
    }

    let input_path = Path::new(&args[1]);
    if !input_path.exists() {
        error(format!("{} not found", input_path.display()));
        std::process::exit(1);
    }

    let asm_files = if input_path.is_dir() {
        match fs::read_dir(input_path) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("asm"))
                .collect(),
            Err(e) => {
                error(format!("failed to read directory: {e}"));
                std::process::exit(3);
            }
        }
    } else {
        vec![input_path.to_path_buf()]
    };

    let mut asm_files = asm_files;
    asm_files.sort();

    for asm_file in asm_files {
        if let Err(code) = assemble_one(&asm_file) {
            std::process::exit(code);
        }
    }
}

fn assemble_one(asm_file: &Path) -> Result<(), i32> {
    let program = fs::read_to_string(asm_file).map_err(|e| {
        error(format!("failed to read {}: {e}", asm_file.display()));
        2
    })?;

    let code = assemble(&program).map_err(|e| {
        error(format!("{}: {e}", asm_file.display()));
        4
    })?;

    let hack_path = asm_file.with_extension("hack");
    fs::write(&hack_path, code.join("\n") + "\n").map_err(|e| {
        error(format!("failed to write {}: {e}", hack_path.display()));
        3
    })?;

    Ok(())
}
