//! End-to-end translation tests built from inline fixtures.
//!
//! Exercised directly through the library API rather than by shelling out
//! to `cargo run` against on-disk `.vm`/`.asm` fixtures, since none ship
//! with this crate.

use std::fs;
use std::io::Write;
use vm_translator::{translate_directory, translate_file};

fn write_temp_vm(name: &str, contents: &str) -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    path.push(name);
    let mut f = fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_push_pop_round_trip() {
    let input = write_temp_vm(
        "it_push_pop.vm",
        "push constant 10\npush constant 20\nadd\npop local 0\n",
    );
    let output = input.with_extension("asm");
    translate_file(&input, &output, false).unwrap();
    let asm = fs::read_to_string(&output).unwrap();
    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();

    assert!(asm.contains("@10"));
    assert!(asm.contains("@20"));
    assert!(asm.contains("@LCL"));
}

#[test]
fn test_comparison_emits_true_false_end_labels() {
    let input = write_temp_vm(
        "it_eq.vm",
        "push constant 5\npush constant 5\neq\n",
    );
    let output = input.with_extension("asm");
    translate_file(&input, &output, false).unwrap();
    let asm = fs::read_to_string(&output).unwrap();
    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();

    assert!(asm.contains("(TRUE.0)"));
    assert!(asm.contains("(FALSE.0)"));
    assert!(asm.contains("(END.0)"));
}

#[test]
fn test_static_segment_scoped_to_filename() {
    let input = write_temp_vm("it_static.vm", "push constant 1\npop static 3\n");
    let output = input.with_extension("asm");
    translate_file(&input, &output, false).unwrap();
    let asm = fs::read_to_string(&output).unwrap();
    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();

    assert!(asm.contains("@it_static.3"));
}

#[test]
fn test_full_call_return_cycle() {
    // Sys.init calls Main.run with one argument; Main.run returns it doubled.
    let input = write_temp_vm(
        "it_call_cycle.vm",
        "function Sys.init 0\n\
         push constant 21\n\
         call Main.run 1\n\
         return\n\
         function Main.run 1\n\
         push argument 0\n\
         push argument 0\n\
         add\n\
         return\n",
    );
    let output = input.with_extension("asm");
    translate_file(&input, &output, false).unwrap();
    let asm = fs::read_to_string(&output).unwrap();
    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();

    assert!(asm.contains("(FUNC_Sys.init_START)"));
    assert!(asm.contains("(FUNC_Main.run_START)"));
    assert!(asm.contains("@FUNC_Main.run_END_0"));
    // write_return's frame teardown touches all four saved segments.
    assert!(asm.contains("@THAT"));
    assert!(asm.contains("@THIS"));
    assert!(asm.contains("@ARG"));
    assert!(asm.contains("@LCL"));
}

#[test]
fn test_directory_translation_bootstraps_and_skips_between_units() {
    let dir = std::env::temp_dir().join("it_vm_directory_project");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("Sys.vm"),
        "function Sys.init 0\ncall Helper.identity 1\nreturn\n",
    )
    .unwrap();
    fs::write(
        dir.join("Helper.vm"),
        "function Helper.identity 0\npush argument 0\nreturn\n",
    )
    .unwrap();

    let output = dir.join("it_vm_directory_project.asm");
    translate_directory(&dir, &output).unwrap();
    let asm = fs::read_to_string(&output).unwrap();
    fs::remove_dir_all(&dir).ok();

    // Bootstrap sets SP then falls straight into Sys.init's body.
    assert!(asm.contains("@256"));
    assert!(asm.contains("// bootstrap"));
    assert!(asm.starts_with("// bootstrap"));
    // Helper.vm's body is not Sys, so it is wrapped in a skip guard.
    assert!(asm.contains("@FILE_Helper_END"));
    assert!(asm.contains("(FILE_Helper_END)"));
    // Sys.vm must never be wrapped, since the bootstrap jumps straight in.
    assert!(!asm.contains("FILE_Sys_END"));
}

#[test]
fn test_translate_directory_rejects_empty_directory() {
    let dir = std::env::temp_dir().join("it_vm_empty_directory");
    fs::create_dir_all(&dir).unwrap();
    let output = dir.join("Empty.asm");

    let result = translate_directory(&dir, &output);
    fs::remove_dir_all(&dir).ok();

    assert!(result.is_err());
}
