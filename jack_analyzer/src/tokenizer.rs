//! Breaks a Jack source file into tokens, stripping comments and whitespace
//! along the way.

use regex::Regex;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Symbol,
    IntegerConstant,
    StringConstant,
    Identifier,
}

impl TokenKind {
    /// The XML tag this token class is emitted under in the parse tree.
    #[must_use]
    pub fn xml_tag(self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Symbol => "symbol",
            TokenKind::IntegerConstant => "integerConstant",
            TokenKind::StringConstant => "stringConstant",
            TokenKind::Identifier => "identifier",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// The matched lexeme, already stripped of surrounding quotes for
    /// string constants and of trailing delimiters for keywords.
    pub text: String,
}

#[derive(Debug)]
pub struct TokenizeError {
    pub remaining: String,
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no lexical rule matched starting at: {}", self.remaining)
    }
}

impl std::error::Error for TokenizeError {}

/// One lexical rule, tried in order; the first to match wins. Order
/// matters: keywords must be checked before identifiers (a keyword is
/// itself a valid identifier shape), and the two-character relational
/// symbols must be checked before the single-character symbol class.
struct LexRule {
    kind: TokenKind,
    pattern: Regex,
}

fn lex_rules() -> Vec<LexRule> {
    vec![
        LexRule {
            kind: TokenKind::Keyword,
            pattern: Regex::new(
                r"^(class|constructor|function|method|field|static|var|int|char|boolean|void|true|false|null|this|let|do|if|else|while|return)\b",
            )
            .unwrap(),
        },
        LexRule {
            kind: TokenKind::Symbol,
            pattern: Regex::new(r#"^(>=|<=|[{}()\[\].,;+\-*/&|<>=~])"#).unwrap(),
        },
        LexRule {
            kind: TokenKind::IntegerConstant,
            pattern: Regex::new(r"^(\d+)").unwrap(),
        },
        LexRule {
            kind: TokenKind::StringConstant,
            pattern: Regex::new("^\"([^\"]*)\"").unwrap(),
        },
        LexRule {
            kind: TokenKind::Identifier,
            // Stricter than the lexer this was distilled from: a leading
            // digit would make an identifier indistinguishable from an
            // integerConstant prefix, so it is rejected here.
            pattern: Regex::new(r"^([A-Za-z_]\w*)").unwrap(),
        },
    ]
}

pub struct Tokenizer {
    tokens: Vec<Token>,
    cursor: Option<usize>,
}

impl Tokenizer {
    pub fn new(source: &str) -> Result<Self, TokenizeError> {
        let sanitized = sanitize(source);
        let rules = lex_rules();
        let mut tokens = Vec::new();
        let mut rest = sanitized.trim();

        while !rest.is_empty() {
            let Some((token, consumed)) = lex_one(rest, &rules) else {
                return Err(TokenizeError {
                    remaining: rest.chars().take(40).collect(),
                });
            };
            tokens.push(token);
            rest = rest[consumed..].trim_start();
        }

        Ok(Tokenizer {
            tokens,
            cursor: None,
        })
    }

    #[inline]
    #[must_use]
    pub fn has_more_tokens(&self) -> bool {
        match self.cursor {
            None => !self.tokens.is_empty(),
            Some(i) => i + 1 < self.tokens.len(),
        }
    }

    /// Advances the cursor and returns the new current token, or `None`
    /// once the stream is exhausted.
    pub fn advance(&mut self) -> Option<&Token> {
        if !self.has_more_tokens() {
            return None;
        }
        let next = self.cursor.map_or(0, |i| i + 1);
        self.cursor = Some(next);
        self.tokens.get(next)
    }

    /// Undoes the last `advance`. One-slot undo is the normal case; the
    /// term-disambiguation rule in the parser calls this twice in a row.
    pub fn roll_back(&mut self) {
        if let Some(i) = self.cursor {
            if i > 0 {
                self.cursor = Some(i - 1);
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&Token> {
        self.cursor.and_then(|i| self.tokens.get(i))
    }
}

/// Removes `/* ... */` and `//` comments and blank lines, matching the
/// ordering (block comments before line comments) that matters when a `//`
/// lexeme appears inside a block comment's body.
fn sanitize(source: &str) -> String {
    let no_block_comments = strip_block_comments(source);
    no_block_comments
        .lines()
        .map(strip_line_comment)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_block_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start..].find("*/") {
            Some(end) => rest = &rest[start + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

fn strip_line_comment(line: &str) -> String {
    match line.find("//") {
        Some(pos) => line[..pos].trim_end().to_string(),
        None => line.trim_end().to_string(),
    }
}

/// Matches the longest-priority lexical rule at the start of `rest`,
/// returning the token and how many bytes of `rest` it consumed.
fn lex_one(rest: &str, rules: &[LexRule]) -> Option<(Token, usize)> {
    for rule in rules {
        if let Some(caps) = rule.pattern.captures(rest) {
            let whole = caps.get(0).unwrap();
            let text = match rule.kind {
                TokenKind::StringConstant => caps.get(1).unwrap().as_str().to_string(),
                _ => whole.as_str().to_string(),
            };
            return Some((
                Token {
                    kind: rule.kind,
                    text,
                },
                whole.end(),
            ));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_and_identifier() {
        let t = Tokenizer::new("class Main").unwrap();
        assert_eq!(t.tokens[0].kind, TokenKind::Keyword);
        assert_eq!(t.tokens[0].text, "class");
        assert_eq!(t.tokens[1].kind, TokenKind::Identifier);
        assert_eq!(t.tokens[1].text, "Main");
    }

    #[test]
    fn test_identifier_rejects_leading_digit() {
        let err = Tokenizer::new("1abc").unwrap();
        // "1" lexes as an integerConstant, "abc" as a separate identifier;
        // a leading-digit identifier must never be produced as one token.
        assert_eq!(err.tokens[0].kind, TokenKind::IntegerConstant);
        assert_eq!(err.tokens[0].text, "1");
        assert_eq!(err.tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_string_constant_strips_quotes() {
        let t = Tokenizer::new(r#"do Output.printString("Hi");"#).unwrap();
        let string_tok = t
            .tokens
            .iter()
            .find(|tok| tok.kind == TokenKind::StringConstant)
            .unwrap();
        assert_eq!(string_tok.text, "Hi");
    }

    #[test]
    fn test_block_and_line_comments_stripped() {
        let t = Tokenizer::new("/* header */\nvar int x; // trailing\n").unwrap();
        assert_eq!(t.tokens[0].text, "var");
        assert_eq!(t.tokens[1].text, "int");
        assert_eq!(t.tokens[2].text, "x");
        assert_eq!(t.tokens[3].text, ";");
        assert_eq!(t.tokens.len(), 4);
    }

    #[test]
    fn test_relational_symbols_match_before_single_char() {
        let t = Tokenizer::new("a >= b").unwrap();
        assert_eq!(t.tokens[1].text, ">=");
    }

    #[test]
    fn test_rollback_single_slot() {
        let mut t = Tokenizer::new("a b c").unwrap();
        t.advance();
        t.advance();
        assert_eq!(t.current().unwrap().text, "b");
        t.roll_back();
        assert_eq!(t.current().unwrap().text, "a");
    }
}
