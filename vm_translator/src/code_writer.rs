use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Failure emitting Hack assembly for a VM command.
///
/// `UnknownArithmetic`/`UnknownSegment` are encode errors per `spec.md`
/// §7 ("unknown mnemonic") — reachable from a malformed `.vm` source
/// line, not internal bugs, so they must propagate as `Result` rather
/// than panic.
#[derive(Debug)]
pub enum CodeWriterError {
    Io(std::io::Error),
    UnknownArithmetic(String),
    UnknownSegment(String),
}

impl fmt::Display for CodeWriterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeWriterError::Io(e) => write!(f, "I/O error: {e}"),
            CodeWriterError::UnknownArithmetic(cmd) => {
                write!(f, "unknown arithmetic command: {cmd}")
            }
            CodeWriterError::UnknownSegment(seg) => write!(f, "unknown segment: {seg}"),
        }
    }
}

impl std::error::Error for CodeWriterError {}

impl From<std::io::Error> for CodeWriterError {
    fn from(e: std::io::Error) -> Self {
        CodeWriterError::Io(e)
    }
}

// Collapses a run of literal assembly lines into one write_all call.
macro_rules! write_asm {
    ($writer:expr, $($line:literal)*) => {
        $writer.write_all(concat!($($line, "\n"),*).as_bytes())
    };
}

#[derive(Clone, Copy)]
enum SegmentSymbol {
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
    Constant,
}

impl SegmentSymbol {
    fn from_str(segment: &str) -> Option<Self> {
        match segment {
            "local" => Some(SegmentSymbol::Local),
            "argument" => Some(SegmentSymbol::Argument),
            "this" => Some(SegmentSymbol::This),
            "that" => Some(SegmentSymbol::That),
            "temp" => Some(SegmentSymbol::Temp),
            "pointer" => Some(SegmentSymbol::Pointer),
            "static" => Some(SegmentSymbol::Static),
            "constant" => Some(SegmentSymbol::Constant),
            _ => None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            SegmentSymbol::Local => "LCL",
            SegmentSymbol::Argument => "ARG",
            SegmentSymbol::This => "THIS",
            SegmentSymbol::That => "THAT",
            SegmentSymbol::Temp => "R5",
            SegmentSymbol::Pointer => "THIS", // Special case handled separately
            SegmentSymbol::Static => "STATIC", // Special case handled separately
            SegmentSymbol::Constant => "CONSTANT", // Special case handled separately
        }
    }
}

/// Emits Hack assembly for a whole translation run (one file, or a
/// directory's worth of files concatenated together).
///
/// Carries three pieces of state across the whole run so that labels stay
/// unique and correctly scoped even when multiple source files are fed
/// through the same writer: a monotonic `label_counter` (shared by
/// comparison labels and call return-address labels, mirroring how the
/// VM command stream assigns one running index to every command), the
/// name of the function whose body is currently being emitted, and the
/// current file's stem (for `static` segment scoping).
pub struct CodeWriter {
    output_file: BufWriter<File>,
    label_counter: usize,
    filename: String,
    current_function: String,
}

impl CodeWriter {
    /// Creates a new `CodeWriter` instance, buffering output at 8KiB.
    pub fn new(output_filename: &str) -> Result<Self, std::io::Error> {
        let file = File::create(output_filename)?;
        let buffered = BufWriter::with_capacity(8192, file);
        Ok(CodeWriter {
            output_file: buffered,
            label_counter: 0,
            filename: String::new(),
            current_function: String::from("Sys.init"),
        })
    }

    #[inline]
    pub fn set_filename(&mut self, filename: &str) {
        // Extract filename without path and extension
        let name = std::path::Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown");
        self.filename.clear();
        self.filename.push_str(name);
    }

    #[inline]
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Mints the next index, shared across comparisons and calls, used to
    /// suffix unique labels for the whole run.
    #[inline]
    fn next_index(&mut self) -> usize {
        let i = self.label_counter;
        self.label_counter += 1;
        i
    }

    /// Emits the bootstrap preamble: `SP=256` followed by a synthetic
    /// `call Sys.init 0`. Only ever written once, at the very start of a
    /// directory-level translation run.
    pub fn write_bootstrap(&mut self) -> Result<(), CodeWriterError> {
        write_asm!(self.output_file,
            "// bootstrap"
            "@256"
            "D=A"
            "@SP"
            "M=D"
        )?;
        self.write_call("Sys.init", 0)
    }

    /// Wraps a non-`Sys` translation unit's body so control never falls
    /// into its function definitions from the unit emitted before it.
    pub fn write_skip_guard_start(&mut self) -> Result<(), CodeWriterError> {
        if self.filename != "Sys" {
            write!(
                self.output_file,
                "@FILE_{}_END\n0;JMP\n",
                self.filename
            )?;
        }
        Ok(())
    }

    pub fn write_skip_guard_end(&mut self) -> Result<(), CodeWriterError> {
        if self.filename != "Sys" {
            writeln!(self.output_file, "(FILE_{}_END)", self.filename)?;
        }
        Ok(())
    }

    pub fn write_arithmetic(&mut self, command: &str) -> Result<(), CodeWriterError> {
        writeln!(self.output_file, "// vm command:{}", command)?;

        match command {
            "add" => self.write_binary_op("D+M"),
            "sub" => self.write_binary_op("D-M"),
            "and" => self.write_binary_op("D&M"),
            "or" => self.write_binary_op("D|M"),
            "neg" => self.write_unary_op(true),
            "not" => self.write_unary_op(false),
            "eq" => self.write_comparison("JEQ"),
            "gt" => self.write_comparison("JGT"),
            "lt" => self.write_comparison("JLT"),
            _ => Err(CodeWriterError::UnknownArithmetic(command.to_string())),
        }
    }

    #[inline]
    fn write_binary_op(&mut self, operation: &str) -> Result<(), CodeWriterError> {
        // Optimized: write all at once to reduce syscalls
        write!(
            self.output_file,
            "// get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // store the result temporarily\n\
             @R14\n\
             M=D\n\
             // get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // store the result temporarily\n\
             @R13\n\
             M=D\n\
             @R13\n\
             D=M\n\
             @R14\n\
             D={}\n",
            operation
        )?;

        self.write_push_d()?;
        self.output_file.write_all(b"\n")?;
        Ok(())
    }

    #[inline]
    fn write_unary_op(&mut self, is_neg: bool) -> Result<(), CodeWriterError> {
        write_asm!(self.output_file,
            "// get the top element of stack"
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
        )?;

        if is_neg {
            write_asm!(self.output_file,
                "@0"
                "D=A-D"
            )?;
        } else {
            write_asm!(self.output_file, "D=!D")?;
        }

        self.write_push_d()?;
        self.output_file.write_all(b"\n")?;
        Ok(())
    }

    #[inline]
    fn write_comparison(&mut self, jump: &str) -> Result<(), CodeWriterError> {
        let label_num = self.next_index();

        write!(
            self.output_file,
            "// get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // store the result temporarily\n\
             @R14\n\
             M=D\n\
             // get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // store the result temporarily\n\
             @R13\n\
             M=D\n\
             @R13\n\
             D=M\n\
             @R14\n\
             D=D-M\n\
             @TRUE.{}\n\
             D;{}\n\
             @FALSE.{}\n\
             0;JMP\n\
             (TRUE.{})\n\
             // push the value into stack\n\
             @SP\n\
             A=M\n\
             M=-1\n\
             @SP\n\
             M=M+1\n\
             @END.{}\n\
             0;JMP\n\
             (FALSE.{})\n\
             // push the value into stack\n\
             @SP\n\
             A=M\n\
             M=0\n\
             @SP\n\
             M=M+1\n\
             (END.{})\n\n",
            label_num, jump, label_num, label_num, label_num, label_num, label_num,
        )
    }

    pub fn write_push_pop(
        &mut self,
        command: &str,
        segment: &str,
        index: i32,
    ) -> Result<(), CodeWriterError> {
        writeln!(
            self.output_file,
            "// vm command:{} {} {}",
            command, segment, index
        )?;

        if command == "push" {
            self.write_push(segment, index)?;
        } else if command == "pop" {
            self.write_pop(segment, index)?;
        }

        self.output_file.write_all(b"\n")?;
        Ok(())
    }

    #[inline]
    fn write_push(&mut self, segment: &str, index: i32) -> Result<(), CodeWriterError> {
        match SegmentSymbol::from_str(segment) {
            Some(SegmentSymbol::Constant) => {
                write!(self.output_file, "@{}\nD=A\n", index)?;
                self.write_push_d()
            }
            Some(seg)
                if matches!(
                    seg,
                    SegmentSymbol::Local
                        | SegmentSymbol::Argument
                        | SegmentSymbol::This
                        | SegmentSymbol::That
                ) =>
            {
                let segment_symbol = seg.symbol();
                write!(
                    self.output_file,
                    "@{}\nD=M\n@{}\nA=D+A\nD=M\n",
                    segment_symbol, index
                )?;
                self.write_push_d()
            }
            Some(SegmentSymbol::Temp) => {
                write!(self.output_file, "@R5\nD=A\n@{}\nA=D+A\nD=M\n", index)?;
                self.write_push_d()
            }
            Some(SegmentSymbol::Pointer) => {
                write!(self.output_file, "@THIS\nD=A\n@{}\nA=D+A\nD=M\n", index)?;
                self.write_push_d()
            }
            Some(SegmentSymbol::Static) => {
                write!(self.output_file, "@{}.{}\nD=M\n", self.filename, index)?;
                self.write_push_d()
            }
            _ => Err(CodeWriterError::UnknownSegment(segment.to_string())),
        }
    }

    #[inline]
    fn write_pop(&mut self, segment: &str, index: i32) -> Result<(), CodeWriterError> {
        match SegmentSymbol::from_str(segment) {
            Some(seg)
                if matches!(
                    seg,
                    SegmentSymbol::Local
                        | SegmentSymbol::Argument
                        | SegmentSymbol::This
                        | SegmentSymbol::That
                ) =>
            {
                let segment_symbol = seg.symbol();
                write!(
                    self.output_file,
                    "@{}\n\
                     D=M\n\
                     @{}\n\
                     D=D+A\n\
                     // store the result temporarily\n\
                     @R13\n\
                     M=D\n",
                    segment_symbol, index
                )?;

                self.write_pop_to_d()?;

                write_asm!(self.output_file,
                    "// store the top value"
                    "@R13"
                    "A=M"
                    "M=D"
                )?;
                Ok(())
            }
            Some(SegmentSymbol::Temp) => {
                write!(
                    self.output_file,
                    "@5\n\
                     D=A\n\
                     @{}\n\
                     D=D+A\n\
                     // store the result temporarily\n\
                     @R13\n\
                     M=D\n",
                    index
                )?;

                self.write_pop_to_d()?;

                write_asm!(self.output_file,
                    "// store the top value"
                    "@R13"
                    "A=M"
                    "M=D"
                )?;
                Ok(())
            }
            Some(SegmentSymbol::Pointer) => {
                write!(
                    self.output_file,
                    "@THIS\n\
                     D=A\n\
                     @{}\n\
                     D=D+A\n\
                     // store the result temporarily\n\
                     @R13\n\
                     M=D\n",
                    index
                )?;

                self.write_pop_to_d()?;

                write_asm!(self.output_file,
                    "// store the top value"
                    "@R13"
                    "A=M"
                    "M=D"
                )?;
                Ok(())
            }
            Some(SegmentSymbol::Static) => {
                self.write_pop_to_d()?;
                write!(self.output_file, "@{}.{}\nM=D\n", self.filename, index)
                    .map_err(CodeWriterError::from)
            }
            _ => Err(CodeWriterError::UnknownSegment(segment.to_string())),
        }
    }

    #[inline]
    fn write_push_d(&mut self) -> Result<(), CodeWriterError> {
        write_asm!(self.output_file,
            "// push the value into stack"
            "@SP"
            "A=M"
            "M=D"
            "@SP"
            "M=M+1"
        )
    }

    #[inline]
    fn write_pop_to_d(&mut self) -> Result<(), CodeWriterError> {
        write_asm!(self.output_file,
            "// get the top element of stack"
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
        )
    }

    /// `label L` scopes to the function currently being emitted.
    pub fn write_label(&mut self, name: &str) -> Result<(), CodeWriterError> {
        writeln!(self.output_file, "({}${})", self.current_function, name)
            .map_err(CodeWriterError::from)
    }

    /// `goto L`, unconditional jump to a function-scoped label.
    pub fn write_goto(&mut self, name: &str) -> Result<(), CodeWriterError> {
        write!(
            self.output_file,
            "@{}${}\n0;JMP\n",
            self.current_function, name
        )
        .map_err(CodeWriterError::from)
    }

    /// `if-goto L`, pop the stack top and jump if it is nonzero.
    pub fn write_if_goto(&mut self, name: &str) -> Result<(), CodeWriterError> {
        write!(
            self.output_file,
            "@SP\nAM=M-1\nD=M\n@{}${}\nD;JNE\n",
            self.current_function, name
        )
        .map_err(CodeWriterError::from)
    }

    /// `function f n` — declares the entry point, zero-initializes `n`
    /// locals, and records `f` as the function label/goto scope for
    /// subsequent commands.
    pub fn write_function(&mut self, name: &str, n_locals: i32) -> Result<(), CodeWriterError> {
        self.current_function = name.to_string();
        writeln!(self.output_file, "(FUNC_{}_START)", name)?;
        for _ in 0..n_locals {
            write_asm!(self.output_file,
                "@SP"
                "A=M"
                "M=0"
                "@SP"
                "M=M+1"
            )?;
        }
        Ok(())
    }

    /// `call f n` — pushes the return address and the caller's frame,
    /// repositions `ARG`/`LCL`, and jumps into the callee.
    pub fn write_call(&mut self, name: &str, n_args: i32) -> Result<(), CodeWriterError> {
        let return_index = self.next_index();
        write!(
            self.output_file,
            "@FUNC_{name}_END_{return_index}\n\
             D=A\n\
             @SP\n\
             A=M\n\
             M=D\n\
             @SP\n\
             M=M+1\n\
             @LCL\n\
             D=M\n\
             @SP\n\
             A=M\n\
             M=D\n\
             @SP\n\
             M=M+1\n\
             @ARG\n\
             D=M\n\
             @SP\n\
             A=M\n\
             M=D\n\
             @SP\n\
             M=M+1\n\
             @THIS\n\
             D=M\n\
             @SP\n\
             A=M\n\
             M=D\n\
             @SP\n\
             M=M+1\n\
             @THAT\n\
             D=M\n\
             @SP\n\
             A=M\n\
             M=D\n\
             @SP\n\
             M=M+1\n\
             @SP\n\
             D=M\n\
             @{n_plus_five}\n\
             D=D-A\n\
             @ARG\n\
             M=D\n\
             @SP\n\
             D=M\n\
             @LCL\n\
             M=D\n\
             @FUNC_{name}_START\n\
             0;JMP\n\
             (FUNC_{name}_END_{return_index})\n",
            name = name,
            return_index = return_index,
            n_plus_five = n_args + 5,
        )
        .map_err(CodeWriterError::from)
    }

    /// `return` — unwinds the callee's frame and restores the caller's
    /// segment pointers before jumping back to the return address.
    ///
    /// `RET` is fetched into `R14` before `*ARG` is overwritten: for a
    /// zero-argument call `ARG` aliases the frame base, so writing the
    /// return value first would clobber the very value `RET` reads from.
    pub fn write_return(&mut self) -> Result<(), CodeWriterError> {
        write_asm!(self.output_file,
            "@LCL"
            "D=M"
            "@R13"
            "M=D"
            "@5"
            "A=D-A"
            "D=M"
            "@R14"
            "M=D"
            "@SP"
            "AM=M-1"
            "D=M"
            "@ARG"
            "A=M"
            "M=D"
            "@ARG"
            "D=M+1"
            "@SP"
            "M=D"
            "@R13"
            "AM=M-1"
            "D=M"
            "@THAT"
            "M=D"
            "@R13"
            "AM=M-1"
            "D=M"
            "@THIS"
            "M=D"
            "@R13"
            "AM=M-1"
            "D=M"
            "@ARG"
            "M=D"
            "@R13"
            "AM=M-1"
            "D=M"
            "@LCL"
            "M=D"
            "@R14"
            "A=M"
            "0;JMP"
        )
        .map_err(CodeWriterError::from)
    }

    #[inline]
    pub fn close(&mut self) -> Result<(), std::io::Error> {
        self.output_file.flush()
    }
}
