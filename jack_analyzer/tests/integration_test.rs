//! End-to-end syntax-analysis tests built from inline fixtures.

use jack_analyzer::analyze_file;
use std::fs;
use std::io::Write;

fn write_temp_jack(name: &str, contents: &str) -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    path.push(name);
    let mut f = fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_class_with_fields_and_methods() {
    let input = write_temp_jack(
        "it_class_full.jack",
        "class Point {\n\
         field int x, y;\n\
         \n\
         constructor Point new(int ax, int ay) {\n\
         let x = ax;\n\
         let y = ay;\n\
         return this;\n\
         }\n\
         \n\
         method int getX() {\n\
         return x;\n\
         }\n\
         }\n",
    );
    let output = analyze_file(&input).unwrap();
    let xml = fs::read_to_string(&output).unwrap();
    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();

    assert!(xml.contains("<classVarDec>"));
    assert!(xml.contains("<keyword> constructor </keyword>"));
    assert!(xml.contains("<keyword> method </keyword>"));
    assert!(xml.contains("<keyword> this </keyword>"));
}

#[test]
fn test_control_flow_and_array_access() {
    let input = write_temp_jack(
        "it_control_flow.jack",
        "class Main {\n\
         function void run() {\n\
         var int i;\n\
         let i = 0;\n\
         while (i < 10) {\n\
         if (i = 5) {\n\
         let i = i + 1;\n\
         } else {\n\
         let i = i + 2;\n\
         }\n\
         }\n\
         return;\n\
         }\n\
         }\n",
    );
    let output = analyze_file(&input).unwrap();
    let xml = fs::read_to_string(&output).unwrap();
    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();

    assert!(xml.contains("<whileStatement>"));
    assert!(xml.contains("<ifStatement>"));
    assert!(xml.contains("<keyword> else </keyword>"));
}

#[test]
fn test_nested_subroutine_calls_and_string_constants() {
    let input = write_temp_jack(
        "it_calls.jack",
        "class Main {\n\
         function void main() {\n\
         do Output.printString(\"Hello\");\n\
         do Main.helper();\n\
         return;\n\
         }\n\
         }\n",
    );
    let output = analyze_file(&input).unwrap();
    let xml = fs::read_to_string(&output).unwrap();
    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();

    assert!(xml.contains("<stringConstant> Hello </stringConstant>"));
    assert!(xml.contains("<identifier> Output </identifier>"));
    assert!(xml.contains("<identifier> helper </identifier>"));
}

#[test]
fn test_empty_parameter_and_expression_lists_still_appear() {
    let input = write_temp_jack(
        "it_empty_lists.jack",
        "class Main {\n\
         function void run() {\n\
         do Main.noop();\n\
         return;\n\
         }\n\
         }\n",
    );
    let output = analyze_file(&input).unwrap();
    let xml = fs::read_to_string(&output).unwrap();
    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();

    assert!(xml.contains("<parameterList>\n  </parameterList>") || xml.contains("<parameterList>"));
    assert!(xml.contains("<expressionList>"));
    assert!(!xml.contains("<pad"));
}
