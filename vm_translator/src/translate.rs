//! Orchestrates a translation run: one `.vm` file, or a directory of them
//! combined into a single `.asm` output sharing one [`CodeWriter`].

use std::fmt;
use std::fs;
use std::path::Path;

use crate::code_writer::{CodeWriter, CodeWriterError};
use crate::parser::{CommandType, InvalidArg2, Parser};

#[derive(Debug)]
pub enum TranslateError {
    Io(std::io::Error),
    NoVmFiles(String),
    CodeWriter(CodeWriterError),
    Parser(InvalidArg2),
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::Io(e) => write!(f, "I/O error: {e}"),
            TranslateError::NoVmFiles(dir) => {
                write!(f, "no .vm files found in directory '{dir}'")
            }
            TranslateError::CodeWriter(e) => write!(f, "{e}"),
            TranslateError::Parser(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for TranslateError {}

impl From<std::io::Error> for TranslateError {
    fn from(e: std::io::Error) -> Self {
        TranslateError::Io(e)
    }
}

impl From<CodeWriterError> for TranslateError {
    fn from(e: CodeWriterError) -> Self {
        TranslateError::CodeWriter(e)
    }
}

impl From<InvalidArg2> for TranslateError {
    fn from(e: InvalidArg2) -> Self {
        TranslateError::Parser(e)
    }
}

/// Translates a single `.vm` file to `output_path`.
///
/// `with_bootstrap` controls whether the `SP=256` / `call Sys.init 0`
/// preamble is emitted first; single-file runs normally pass `false` so a
/// lone utility file can be assembled standalone, matching how the
/// original toolchain only bootstraps directory-level projects.
pub fn translate_file(
    input_path: &Path,
    output_path: &Path,
    with_bootstrap: bool,
) -> Result<(), TranslateError> {
    let mut writer = CodeWriter::new(&output_path.to_string_lossy())?;
    if with_bootstrap {
        writer.write_bootstrap()?;
    }
    translate_unit(input_path, &mut writer, false)?;
    writer.close()?;
    Ok(())
}

/// Translates every `.vm` file in `dir` into one `output_path`, sharing a
/// single [`CodeWriter`] across all of them so comparison and call-return
/// labels stay unique across file boundaries, preceded by the bootstrap
/// preamble.
pub fn translate_directory(dir: &Path, output_path: &Path) -> Result<(), TranslateError> {
    let mut vm_files: Vec<_> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("vm"))
        .collect();

    if vm_files.is_empty() {
        return Err(TranslateError::NoVmFiles(dir.to_string_lossy().into_owned()));
    }
    vm_files.sort();

    let mut writer = CodeWriter::new(&output_path.to_string_lossy())?;
    writer.write_bootstrap()?;

    for vm_file in &vm_files {
        translate_unit(vm_file, &mut writer, true)?;
    }

    writer.close()?;
    Ok(())
}

/// Translates one file's commands into `writer`. `wrap_skip_guard` is set
/// only for directory-level runs, where every unit besides `Sys.vm` defines
/// functions that must not be fallen into from the file emitted before it;
/// a standalone single-file translation may contain bare top-level
/// commands (as in a tier-1 test program) that a skip guard would make
/// unreachable, so it is never applied there.
fn translate_unit(
    path: &Path,
    writer: &mut CodeWriter,
    wrap_skip_guard: bool,
) -> Result<(), TranslateError> {
    let mut parser = Parser::new(&path.to_string_lossy())?;
    writer.set_filename(&path.to_string_lossy());
    if wrap_skip_guard {
        writer.write_skip_guard_start()?;
    }

    while parser.has_more_commands() {
        parser.advance();

        match parser.command_type() {
            CommandType::Arithmetic => writer.write_arithmetic(parser.arg1())?,
            CommandType::Push => {
                let index = parser.arg2()?;
                writer.write_push_pop("push", parser.arg1(), index)?
            }
            CommandType::Pop => {
                let index = parser.arg2()?;
                writer.write_push_pop("pop", parser.arg1(), index)?
            }
            CommandType::Label => writer.write_label(parser.arg1())?,
            CommandType::Goto => writer.write_goto(parser.arg1())?,
            CommandType::If => writer.write_if_goto(parser.arg1())?,
            CommandType::Function => {
                let n_locals = parser.arg2()?;
                writer.write_function(parser.arg1(), n_locals)?
            }
            CommandType::Call => {
                let n_args = parser.arg2()?;
                writer.write_call(parser.arg1(), n_args)?
            }
            CommandType::Return => writer.write_return()?,
        }
    }

    if wrap_skip_guard {
        writer.write_skip_guard_end()?;
    }
    Ok(())
}
