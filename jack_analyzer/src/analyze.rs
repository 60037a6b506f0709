//! Orchestrates a syntax-analysis run: one `.jack` file, or every `.jack`
//! file in a directory, each producing its own sibling XML file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::parser::{ParseError, Parser};
use crate::tokenizer::{TokenizeError, Tokenizer};
use crate::xml;

#[derive(Debug)]
pub enum AnalyzeError {
    Io(std::io::Error),
    Tokenize(TokenizeError),
    Parse(ParseError),
    NoJackFiles(String),
}

impl fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzeError::Io(e) => write!(f, "I/O error: {e}"),
            AnalyzeError::Tokenize(e) => write!(f, "tokenize error: {e}"),
            AnalyzeError::Parse(e) => write!(f, "parse error: {e}"),
            AnalyzeError::NoJackFiles(dir) => {
                write!(f, "no .jack files found in directory '{dir}'")
            }
        }
    }
}

impl std::error::Error for AnalyzeError {}

impl From<std::io::Error> for AnalyzeError {
    fn from(e: std::io::Error) -> Self {
        AnalyzeError::Io(e)
    }
}

impl From<TokenizeError> for AnalyzeError {
    fn from(e: TokenizeError) -> Self {
        AnalyzeError::Tokenize(e)
    }
}

impl From<ParseError> for AnalyzeError {
    fn from(e: ParseError) -> Self {
        AnalyzeError::Parse(e)
    }
}

/// Analyzes a single `.jack` file, writing `<stem>fromSyntaxAnalyzer.xml`
/// alongside it, and returns the output path.
pub fn analyze_file(input_path: &Path) -> Result<PathBuf, AnalyzeError> {
    let source = fs::read_to_string(input_path)?;
    let tokenizer = Tokenizer::new(&source)?;
    let output_path = output_path_for(input_path);

    // An empty file has no tokens and nothing to compile.
    if !tokenizer.has_more_tokens() {
        fs::write(&output_path, "")?;
        return Ok(output_path);
    }

    let mut parser = Parser::new(tokenizer);
    let tree = parser.parse_class()?;
    let rendered = xml::render(&tree);

    fs::write(&output_path, rendered)?;
    Ok(output_path)
}

/// Analyzes every `.jack` file in `dir`, writing one XML output per file.
/// Returns the output paths in the order the source files were processed.
pub fn analyze_directory(dir: &Path) -> Result<Vec<PathBuf>, AnalyzeError> {
    let mut jack_files: Vec<_> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("jack"))
        .collect();

    if jack_files.is_empty() {
        return Err(AnalyzeError::NoJackFiles(dir.to_string_lossy().into_owned()));
    }
    jack_files.sort();

    jack_files.iter().map(|path| analyze_file(path)).collect()
}

/// Mirrors the naming this tool's output has always used: strip the
/// extension and append `fromSyntaxAnalyzer.xml`, with no separator.
fn output_path_for(input_path: &Path) -> PathBuf {
    let stem = input_path.with_extension("");
    let mut name = stem.into_os_string();
    name.push("fromSyntaxAnalyzer.xml");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_jack(name: &str, contents: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_output_path_naming() {
        let input = Path::new("/tmp/Main.jack");
        assert_eq!(
            output_path_for(input),
            PathBuf::from("/tmp/MainfromSyntaxAnalyzer.xml")
        );
    }

    #[test]
    fn test_analyze_file_with_expression() {
        let input = write_temp_jack(
            "analyze_expr.jack",
            "class Main {\n  function void main() {\n    do Output.printInt(1 + 2);\n    return;\n  }\n}\n",
        );
        let output = analyze_file(&input).unwrap();
        let xml = std::fs::read_to_string(&output).unwrap();
        fs::remove_file(&input).ok();
        fs::remove_file(&output).ok();

        assert!(xml.contains("<doStatement>"));
        assert!(xml.contains("<expressionList>"));
        assert!(xml.contains("<symbol> + </symbol>"));
    }

    #[test]
    fn test_analyze_directory_rejects_empty_directory() {
        let dir = std::env::temp_dir().join("analyze_empty_dir");
        fs::create_dir_all(&dir).unwrap();
        let result = analyze_directory(&dir);
        fs::remove_dir_all(&dir).ok();
        assert!(result.is_err());
    }

    #[test]
    fn test_analyze_directory_processes_every_file() {
        let dir = std::env::temp_dir().join("analyze_dir_multi");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("A.jack"),
            "class A {\n  function void f() {\n    return;\n  }\n}\n",
        )
        .unwrap();
        fs::write(
            dir.join("B.jack"),
            "class B {\n  function void g() {\n    return;\n  }\n}\n",
        )
        .unwrap();

        let outputs = analyze_directory(&dir).unwrap();
        assert_eq!(outputs.len(), 2);
        for output in &outputs {
            assert!(output.exists());
        }
        fs::remove_dir_all(&dir).ok();
    }
}
