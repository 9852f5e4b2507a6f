use std::path::Path;
use std::{env, fs};

use nand2tetris::jack;
use nand2tetris::logging::error;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <path_to_jack_file_or_directory>", args[0]);
        std::process::exit(1);
    }

    let input_path = Path::new(&args[1]);
    if !input_path.exists() {
        error(format!("{} not found", input_path.display()));
        std::process::exit(1);
    }

    let jack_files = if input_path.is_dir() {
        match fs::read_dir(input_path) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("jack"))
                .collect(),
            Err(e) => {
                error(format!("failed to read directory: {e}"));
                std::process::exit(3);
            }
        }
    } else {
        vec![input_path.to_path_buf()]
    };

    let mut jack_files = jack_files;
    jack_files.sort();

    for jack_file in jack_files {
        if let Err(code) = compile_one(&jack_file) {
            std::process::exit(code);
        }
    }
}

fn compile_one(jack_file: &Path) -> Result<(), i32> {
    let source = fs::read_to_string(jack_file).map_err(|e| {
        error(format!("failed to read {}: {e}", jack_file.display()));
        2
    })?;

    let vm_code = jack::compile(&source).map_err(|e| {
        error(format!("{}: {e}", jack_file.display()));
        4
    })?;

    let vm_path = jack_file.with_extension("vm");
    fs::write(&vm_path, vm_code.join("\n") + "\n").map_err(|e| {
        error(format!("failed to write {}: {e}", vm_path.display()));
        3
    })?;

    Ok(())
}
