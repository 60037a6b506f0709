use std::env;
use std::path::Path;
use std::process;

use vm_translator::{translate_directory, translate_file};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.vm | directory>", args[0]);
        process::exit(1);
    }

    let input_path = Path::new(&args[1]);
    let result = if input_path.is_dir() {
        let output_path = output_path_for_directory(input_path);
        translate_directory(input_path, &output_path).map(|()| output_path)
    } else {
        let output_path = input_path.with_extension("asm");
        translate_file(input_path, &output_path, false).map(|()| output_path)
    };

    match result {
        Ok(output_path) => {
            println!(
                "Translation complete: {} -> {}",
                input_path.display(),
                output_path.display()
            );
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// A directory run's output takes the directory's own name, mirroring how
/// a Nand2Tetris project folder named `Foo/` produces `Foo/Foo.asm`.
#[inline]
fn output_path_for_directory(dir: &Path) -> std::path::PathBuf {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("Output");
    dir.join(format!("{name}.asm"))
}
