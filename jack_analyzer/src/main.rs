use std::env;
use std::path::Path;
use std::process;

use jack_analyzer::{analyze_directory, analyze_file};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.jack | directory>", args[0]);
        process::exit(1);
    }

    let input_path = Path::new(&args[1]);

    if input_path.is_dir() {
        match analyze_directory(input_path) {
            Ok(outputs) => {
                for output in outputs {
                    println!("{} generated", output.display());
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    } else {
        match analyze_file(input_path) {
            Ok(output) => println!("{} generated", output.display()),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}
