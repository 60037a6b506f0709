//! Hack Assembler - Main Entry Point
//!
//! A two-pass assembler for the Hack assembly language (`Nand2Tetris` Project 6).
//!
//! # Architecture
//! - **Pass 1**: Builds the symbol table by recording label positions
//! - **Pass 2**: Generates machine code, resolving all symbols
//!
//! # Usage
//! ```bash
//! cargo run <input.asm> [output.hack]
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::process;

mod code;
mod parser;
mod symbol_table;

use parser::{CommandType, ParserError, ParserLines};
use symbol_table::{LabelCollision, SymbolTable};

/// Top-level failure of the assembler pipeline.
///
/// Every variant maps to one of the error-taxonomy categories of the
/// assembly contract: path/argument, I/O, encode. The assembler has no
/// distinct lex/parse failure mode of its own beyond [`ParserError`],
/// which already folds "no regex matched this line" into `InvalidState`.
#[derive(Debug)]
enum AssemblerError {
    Io(std::io::Error),
    Parser(ParserError),
    LabelCollision(LabelCollision),
    AddressOutOfRange { symbol: String, value: u32 },
}

impl fmt::Display for AssemblerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parser(e) => write!(f, "{e}"),
            Self::LabelCollision(e) => write!(f, "{e}"),
            Self::AddressOutOfRange { symbol, value } => {
                write!(f, "address '{symbol}' ({value}) exceeds the 15-bit A-instruction range")
            }
        }
    }
}

impl std::error::Error for AssemblerError {}

impl From<std::io::Error> for AssemblerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ParserError> for AssemblerError {
    fn from(e: ParserError) -> Self {
        Self::Parser(e)
    }
}

impl From<LabelCollision> for AssemblerError {
    fn from(e: LabelCollision) -> Self {
        Self::LabelCollision(e)
    }
}

type Result<T> = std::result::Result<T, AssemblerError>;

/// Reads assembly file into memory
fn read_lines(path: &str) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    reader
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(Into::into)
}

/// First pass: Build symbol table with label addresses
///
/// Scans through all lines and records the ROM address of each label.
/// Label definitions (L-commands) don't generate code, so they don't
/// increment the ROM address counter.
fn first_pass(lines: &[String], symbol_table: &mut SymbolTable) -> Result<()> {
    let mut rom_address = 0u16;
    let mut parser = ParserLines::from_lines(lines);

    while parser.advance() {
        match parser.command_type()? {
            CommandType::LCommand => {
                // Labels mark the next instruction's address
                let symbol = parser.symbol()?;
                symbol_table.bind_label(symbol, rom_address)?;
            }
            CommandType::ACommand | CommandType::CCommand => {
                // Actual instructions increment the address
                rom_address += 1;
            }
        }
    }

    Ok(())
}

/// Second pass: Generate machine code
///
/// Translates each instruction to binary:
/// - A-commands: Resolve symbols to addresses
/// - C-commands: Encode dest, comp, and jump fields
/// - L-commands: Skip (already bound in pass 1; they consume no ROM slot)
fn second_pass(
    lines: &[String],
    symbol_table: &mut SymbolTable,
    writer: &mut BufWriter<File>,
) -> Result<()> {
    let mut ram_address = 16u16; // Variables start at RAM[16]
    let mut parser = ParserLines::from_lines(lines);

    while parser.advance() {
        match parser.command_type()? {
            CommandType::ACommand => {
                let symbol = parser.symbol()?;

                // Try to parse as number first, then lookup/insert as symbol
                let address = symbol
                    .parse::<u32>()
                    .unwrap_or_else(|_| u32::from(symbol_table.get_or_insert(symbol, &mut ram_address)));

                let address = code::checked_address(address).map_err(|value| {
                    AssemblerError::AddressOutOfRange {
                        symbol: symbol.to_string(),
                        value,
                    }
                })?;

                let instruction = code::encode_a_instruction(address);
                writeln!(writer, "{instruction}")?;
            }
            CommandType::CCommand => {
                let dest = parser.dest()?.unwrap_or("");
                let comp = parser.comp()?.unwrap_or("");
                let jump = parser.jump()?.unwrap_or("");

                let instruction = code::encode_c_instruction(dest, comp, jump);
                writeln!(writer, "{instruction}")?;
            }
            CommandType::LCommand => {}
        }
    }

    writer.flush()?;
    Ok(())
}

/// Determines the output file path
fn output_path(input: &str, explicit_output: Option<&str>) -> String {
    explicit_output.map_or_else(
        || input.replace(".asm", ".hack"),
        std::string::ToString::to_string,
    )
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    // Validate arguments
    if !(2..=3).contains(&args.len()) {
        eprintln!("Usage: {} <input.asm> [output.hack]", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} Add.asm", args[0]);
        eprintln!("  {} Add.asm Add.hack", args[0]);
        process::exit(1);
    }

    let input_path = &args[1];

    // Read source file
    let lines = read_lines(input_path)?;

    // Initialize symbol table with predefined symbols
    let mut symbol_table = SymbolTable::new();

    // Pass 1: Build symbol table
    first_pass(&lines, &mut symbol_table)?;

    // Pass 2: Generate machine code
    let output = output_path(input_path, args.get(2).map(String::as_str));
    let output_file = File::create(&output)?;
    let mut writer = BufWriter::new(output_file);

    second_pass(&lines, &mut symbol_table, &mut writer)?;

    println!("Assembly completed. Output written to {output}");
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_generation() {
        assert_eq!(output_path("test.asm", None), "test.hack");
        assert_eq!(output_path("test.asm", Some("custom.hack")), "custom.hack");
        assert_eq!(output_path("dir/file.asm", None), "dir/file.hack");
        assert_eq!(output_path("path/to/file.asm", None), "path/to/file.hack");
    }

    #[test]
    fn test_output_path_explicit() {
        assert_eq!(output_path("any.asm", Some("out.hack")), "out.hack");
        assert_eq!(
            output_path("any.asm", Some("path/to/out.hack")),
            "path/to/out.hack"
        );
    }

    #[test]
    fn test_first_pass_does_not_choke_on_labels() {
        let lines = vec![
            "@i".to_string(),
            "M=1".to_string(),
            "(LOOP)".to_string(),
            "@i".to_string(),
            "D=M".to_string(),
            "@END".to_string(),
            "D;JEQ".to_string(),
            "@LOOP".to_string(),
            "0;JMP".to_string(),
            "(END)".to_string(),
        ];
        let mut symbol_table = SymbolTable::new();
        first_pass(&lines, &mut symbol_table).unwrap();

        // LOOP is the 2nd retained instruction (index 1), END is the 5th (index 4).
        assert_eq!(symbol_table.get_address("LOOP"), 1);
        assert_eq!(symbol_table.get_address("END"), 4);
    }

    #[test]
    fn test_second_pass_skips_labels_without_panicking() {
        let lines = vec!["(LOOP)".to_string(), "@LOOP".to_string(), "0;JMP".to_string()];
        let mut symbol_table = SymbolTable::new();
        first_pass(&lines, &mut symbol_table).unwrap();

        let mut path = std::env::temp_dir();
        path.push(format!("assembler_test_{}.hack", std::process::id()));
        let file = File::create(&path).unwrap();
        let mut writer = BufWriter::new(file);

        second_pass(&lines, &mut symbol_table, &mut writer).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        // Only the @LOOP and 0;JMP lines emit code; the label binds to ROM 0.
        let instructions: Vec<_> = contents.lines().collect();
        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[0], "0000000000000000"); // @LOOP -> address 0
    }

    #[test]
    fn test_first_pass_rejects_predefined_collision() {
        let lines = vec!["(SCREEN)".to_string(), "@0".to_string()];
        let mut symbol_table = SymbolTable::new();
        assert!(first_pass(&lines, &mut symbol_table).is_err());
    }

    #[test]
    fn test_idempotent_assembly() {
        let lines = vec![
            "@2".to_string(),
            "D=A".to_string(),
            "@3".to_string(),
            "D=D+A".to_string(),
        ];

        let encode_once = |lines: &[String]| {
            let mut symbol_table = SymbolTable::new();
            first_pass(lines, &mut symbol_table).unwrap();

            let mut ram_address = 16u16;
            let mut parser = ParserLines::from_lines(lines);
            let mut out = Vec::new();
            while parser.advance() {
                match parser.command_type().unwrap() {
                    CommandType::ACommand => {
                        let symbol = parser.symbol().unwrap();
                        let address = symbol
                            .parse::<u16>()
                            .unwrap_or_else(|_| symbol_table.get_or_insert(symbol, &mut ram_address));
                        out.push(code::encode_a_instruction(address));
                    }
                    CommandType::CCommand => {
                        out.push(code::encode_c_instruction(
                            parser.dest().unwrap().unwrap_or(""),
                            parser.comp().unwrap().unwrap_or(""),
                            parser.jump().unwrap().unwrap_or(""),
                        ));
                    }
                    CommandType::LCommand => {}
                }
            }
            out
        };

        assert_eq!(encode_once(&lines), encode_once(&lines));
    }
}
