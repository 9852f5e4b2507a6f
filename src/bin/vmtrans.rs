use std::path::Path;
use std::{env, fs};

use nand2tetris::logging::error;
use nand2tetris::vm::translator::{translate_directory, translate_file};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <path_to_vm_file_or_directory>", args[0]);
        std::process::exit(1);
    }

    let input_path = Path::new(&args[1]);
    if !input_path.exists() {
        error(format!("{} not found", input_path.display()));
        std::process::exit(1);
    }

    let (output_path, code) = if input_path.is_dir() {
        let units = match collect_units(input_path) {
            Ok(units) => units,
            Err(e) => {
                error(format!("failed to read directory: {e}"));
                std::process::exit(3);
            }
        };

        let dir_name = input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Main".to_string());
        let output_path = input_path.join(format!("{dir_name}.asm"));

        let code = match translate_directory(&units) {
            Ok(code) => code,
            Err(e) => {
                error(format!("{e}"));
                std::process::exit(4);
            }
        };
        (output_path, code)
    } else {
        let origin = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source = match fs::read_to_string(input_path) {
            Ok(source) => source,
            Err(e) => {
                error(format!("failed to read {}: {e}", input_path.display()));
                std::process::exit(2);
            }
        };
        let code = match translate_file(&source, &origin) {
            Ok(code) => code,
            Err(e) => {
                error(format!("{}: {e}", input_path.display()));
                std::process::exit(4);
            }
        };
        (input_path.with_extension("asm"), code)
    };

    if let Err(e) = fs::write(&output_path, code.join("\n") + "\n") {
        error(format!("failed to write {}: {e}", output_path.display()));
        std::process::exit(3);
    }
}

fn collect_units(dir: &Path) -> std::io::Result<Vec<(String, String)>> {
    let mut units = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("vm") {
            continue;
        }
        let origin = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source = fs::read_to_string(&path)?;
        units.push((origin, source));
    }
    Ok(units)
}
