use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// A `.vm` command could not be decoded into a valid argument.
///
/// This is the parser's half of the encode-error taxonomy (`spec.md` §7):
/// a non-numeric `arg2` on an otherwise well-formed `push`/`pop`/
/// `function`/`call` line.
#[derive(Debug)]
pub struct InvalidArg2 {
    pub line: String,
    pub token: String,
}

impl fmt::Display for InvalidArg2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid numeric argument '{}' in command '{}'",
            self.token, self.line
        )
    }
}

impl std::error::Error for InvalidArg2 {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    If,
    Function,
    Return,
    Call,
}

pub struct Parser {
    lines: Vec<String>,
    current_line: usize,
    current_command: String,
    /// Cached parts of the current command to avoid repeated parsing
    cached_parts: Vec<String>,
}

impl Parser {
    pub fn new(filename: &str) -> Result<Self, std::io::Error> {
        let file = File::open(filename)?;
        let reader = BufReader::new(file);

        let mut lines = Vec::new();
        for line in reader.lines() {
            let line = line?;
            // Remove comments and whitespace
            let line = if let Some(pos) = line.find("//") {
                &line[..pos]
            } else {
                &line
            };

            let trimmed = line.trim();

            // Skip empty lines
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }

        Ok(Parser {
            lines,
            current_line: 0,
            current_command: String::new(),
            cached_parts: Vec::new(),
        })
    }

    /// Builds a parser directly from already-sanitized lines, for feeding
    /// one file's commands at a time into a `CodeWriter` shared across an
    /// entire directory-level translation run.
    #[must_use]
    pub fn from_lines(lines: Vec<String>) -> Self {
        Parser {
            lines,
            current_line: 0,
            current_command: String::new(),
            cached_parts: Vec::new(),
        }
    }

    #[inline]
    pub fn has_more_commands(&self) -> bool {
        self.current_line < self.lines.len()
    }

    #[inline]
    pub fn advance(&mut self) {
        if self.has_more_commands() {
            // Use swap to avoid allocation
            std::mem::swap(
                &mut self.current_command,
                &mut self.lines[self.current_line],
            );

            // Parse and cache command parts once
            self.cached_parts.clear();
            self.cached_parts.extend(
                self.current_command
                    .split_whitespace()
                    .map(|s| s.to_string()),
            );

            self.current_line += 1;
        }
    }

    #[inline]
    pub fn command_type(&self) -> CommandType {
        debug_assert!(!self.cached_parts.is_empty(), "Empty command");

        match self.cached_parts[0].as_str() {
            "push" => CommandType::Push,
            "pop" => CommandType::Pop,
            "label" => CommandType::Label,
            "goto" => CommandType::Goto,
            "if-goto" => CommandType::If,
            "function" => CommandType::Function,
            "return" => CommandType::Return,
            "call" => CommandType::Call,
            _ => CommandType::Arithmetic,
        }
    }

    #[inline]
    pub fn arg1(&self) -> &str {
        let cmd_type = self.command_type();
        match cmd_type {
            CommandType::Arithmetic => &self.cached_parts[0],
            CommandType::Return => panic!("arg1 should not be called for Return"),
            _ => {
                debug_assert!(self.cached_parts.len() > 1, "No arg1 found");
                &self.cached_parts[1]
            }
        }
    }

    /// Parses the numeric second argument of a `push`/`pop`/`function`/
    /// `call` command.
    ///
    /// # Errors
    /// Returns [`InvalidArg2`] when the token is not a valid integer — an
    /// *encode error* per `spec.md` §7, not an internal bug, since it can
    /// be driven by a malformed `.vm` source line (e.g. `push local x`).
    #[inline]
    pub fn arg2(&self) -> Result<i32, InvalidArg2> {
        let cmd_type = self.command_type();
        match cmd_type {
            CommandType::Push | CommandType::Pop | CommandType::Function | CommandType::Call => {
                debug_assert!(self.cached_parts.len() > 2, "No arg2 found");
                self.cached_parts[2].parse().map_err(|_| InvalidArg2 {
                    line: self.current_command.clone(),
                    token: self.cached_parts[2].clone(),
                })
            }
            // translate_unit only ever calls arg2() after matching one of
            // the four command types above, so this path is never driven
            // by malformed input — it would indicate a bug in this crate.
            _ => panic!("arg2 should not be called for this command type"),
        }
    }
}
