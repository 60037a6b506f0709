//! End-to-end assembly tests built from inline fixtures.
//!
//! The pipeline is exercised directly through the library API rather than
//! by shelling out to `cargo run` against on-disk `.asm`/`.hack` fixtures,
//! since none ship with this crate.

use assembler::{code, CommandType, ParserLines, SymbolTable};

fn assemble(source_lines: &[&str]) -> Vec<String> {
    let lines: Vec<String> = source_lines.iter().map(|s| s.to_string()).collect();
    let mut symbol_table = SymbolTable::new();

    // Pass 1
    let mut rom_address = 0u16;
    let mut parser = ParserLines::from_lines(&lines);
    while parser.advance() {
        match parser.command_type().unwrap() {
            CommandType::LCommand => {
                symbol_table
                    .bind_label(parser.symbol().unwrap(), rom_address)
                    .unwrap();
            }
            CommandType::ACommand | CommandType::CCommand => rom_address += 1,
        }
    }

    // Pass 2
    let mut ram_address = 16u16;
    let mut parser = ParserLines::from_lines(&lines);
    let mut output = Vec::new();
    while parser.advance() {
        match parser.command_type().unwrap() {
            CommandType::ACommand => {
                let symbol = parser.symbol().unwrap();
                let address = symbol
                    .parse::<u16>()
                    .unwrap_or_else(|_| symbol_table.get_or_insert(symbol, &mut ram_address));
                output.push(code::encode_a_instruction(address));
            }
            CommandType::CCommand => {
                output.push(code::encode_c_instruction(
                    parser.dest().unwrap().unwrap_or(""),
                    parser.comp().unwrap().unwrap_or(""),
                    parser.jump().unwrap().unwrap_or(""),
                ));
            }
            CommandType::LCommand => {}
        }
    }

    output
}

#[test]
fn test_a_instruction_literal() {
    let output = assemble(&["@21"]);
    assert_eq!(output, vec!["0000000000010101"]);
}

#[test]
fn test_c_instruction() {
    let output = assemble(&["@2", "D=A", "@3", "D=D+A"]);
    assert_eq!(
        output,
        vec![
            "0000000000000010",
            "1110110000010000",
            "0000000000000011",
            "1110000010010000",
        ]
    );
}

#[test]
fn test_symbols_resolve_across_passes() {
    // @i -> first free variable at RAM[16]; @END -> label bound in pass 1.
    let output = assemble(&["@i", "M=1", "@END", "0;JMP", "(END)"]);
    assert_eq!(output.len(), 4);
    assert_eq!(output[0], "0000000000010000"); // @i == 16
    assert_eq!(output[2], "0000000000000100"); // @END == ROM 4
}

#[test]
fn test_loop_program_with_labels() {
    let output = assemble(&[
        "@i", "M=1", "(LOOP)", "@i", "D=M", "@END", "D;JEQ", "@LOOP", "0;JMP", "(END)",
    ]);
    // 10 source lines, 2 of which are labels -> 8 emitted instructions.
    assert_eq!(output.len(), 8);
}

#[test]
fn test_dest_permutation_normalizes_in_full_pipeline() {
    let variant_a = assemble(&["@0", "AMD=D+1"]);
    let variant_b = assemble(&["@0", "DMA=D+1"]);
    assert_eq!(variant_a, variant_b);
}

#[test]
fn test_assembly_is_idempotent() {
    let program = vec!["@16384", "M=0", "@i", "M=D", "(END)", "@END", "0;JMP"];
    assert_eq!(assemble(&program), assemble(&program));
}
