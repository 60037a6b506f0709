//! Recursive-descent parser over the Jack grammar. Each `compile_*`
//! function corresponds to one nonterminal and returns the subtree rooted
//! at it; ones that may legitimately not match at the current cursor
//! position return `Ok(None)` having rolled the cursor back, rather than
//! treating "this isn't here" as an error.

use std::fmt;

use crate::tokenizer::{Token, TokenKind, Tokenizer};
use crate::tree::TreeNode;

#[derive(Debug)]
pub enum ParseError {
    UnexpectedEnd { context: &'static str },
    Expected { context: &'static str, expected: String, found: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedEnd { context } => {
                write!(f, "ran out of tokens while parsing {context}")
            }
            ParseError::Expected { context, expected, found } => {
                write!(f, "expected {expected} while parsing {context}, found '{found}'")
            }
        }
    }
}

impl std::error::Error for ParseError {}

pub struct Parser {
    tokenizer: Tokenizer,
}

type PResult<T> = Result<T, ParseError>;

impl Parser {
    #[must_use]
    pub fn new(tokenizer: Tokenizer) -> Self {
        Parser { tokenizer }
    }

    /// Compiles a complete class. This is the only entry point: every
    /// Jack source file is a single class declaration.
    pub fn parse_class(&mut self) -> PResult<TreeNode> {
        self.compile_class()
    }

    fn advance(&mut self, context: &'static str) -> PResult<Token> {
        self.tokenizer
            .advance()
            .cloned()
            .ok_or(ParseError::UnexpectedEnd { context })
    }

    fn roll_back(&mut self) {
        self.tokenizer.roll_back();
    }

    fn ensure_started(&mut self, context: &'static str) -> PResult<Token> {
        if let Some(tok) = self.tokenizer.current() {
            return Ok(tok.clone());
        }
        self.advance(context)
    }

    fn expect_symbol(&mut self, sym: &str, context: &'static str) -> PResult<TreeNode> {
        let tok = self.advance(context)?;
        if tok.kind == TokenKind::Symbol && tok.text == sym {
            Ok(TreeNode::leaf(tok.kind.xml_tag(), tok.text))
        } else {
            Err(ParseError::Expected {
                context,
                expected: format!("'{sym}'"),
                found: tok.text,
            })
        }
    }

    fn expect_identifier(&mut self, context: &'static str) -> PResult<TreeNode> {
        let tok = self.advance(context)?;
        if tok.kind == TokenKind::Identifier {
            Ok(TreeNode::leaf(tok.kind.xml_tag(), tok.text))
        } else {
            Err(ParseError::Expected {
                context,
                expected: "an identifier".to_string(),
                found: tok.text,
            })
        }
    }

    fn expect_keyword_one_of(
        &mut self,
        keywords: &[&str],
        context: &'static str,
    ) -> PResult<TreeNode> {
        let tok = self.advance(context)?;
        if tok.kind == TokenKind::Keyword && keywords.contains(&tok.text.as_str()) {
            Ok(TreeNode::leaf(tok.kind.xml_tag(), tok.text))
        } else {
            Err(ParseError::Expected {
                context,
                expected: format!("one of {keywords:?}"),
                found: tok.text,
            })
        }
    }

    // --- class --------------------------------------------------------

    fn compile_class(&mut self) -> PResult<TreeNode> {
        const CTX: &str = "class";
        let tok = self.ensure_started(CTX)?;
        if !(tok.kind == TokenKind::Keyword && tok.text == "class") {
            return Err(ParseError::Expected {
                context: CTX,
                expected: "'class'".to_string(),
                found: tok.text,
            });
        }
        let mut children = vec![TreeNode::leaf(tok.kind.xml_tag(), tok.text)];
        children.push(self.expect_identifier(CTX)?);
        children.push(self.expect_symbol("{", CTX)?);

        while let Some(node) = self.compile_class_var_dec()? {
            children.push(node);
        }
        while let Some(node) = self.compile_subroutine_dec()? {
            children.push(node);
        }

        children.push(self.expect_symbol("}", CTX)?);
        Ok(TreeNode::node("class", children))
    }

    fn compile_class_var_dec(&mut self) -> PResult<Option<TreeNode>> {
        const CTX: &str = "classVarDec";
        let Some(tok) = self.tokenizer.advance().cloned() else {
            return Ok(None);
        };
        if !(tok.kind == TokenKind::Keyword && (tok.text == "static" || tok.text == "field")) {
            self.roll_back();
            return Ok(None);
        }
        let mut children = vec![TreeNode::leaf(tok.kind.xml_tag(), tok.text)];
        children.push(self.compile_type(CTX)?);
        children.push(self.expect_identifier(CTX)?);

        loop {
            let Some(comma) = self.tokenizer.advance().cloned() else {
                break;
            };
            if !(comma.kind == TokenKind::Symbol && comma.text == ",") {
                self.roll_back();
                break;
            }
            children.push(TreeNode::leaf(comma.kind.xml_tag(), comma.text));
            children.push(self.expect_identifier(CTX)?);
        }

        children.push(self.expect_symbol(";", CTX)?);
        Ok(Some(TreeNode::node("classVarDec", children)))
    }

    /// `int | char | boolean | className`.
    fn compile_type(&mut self, context: &'static str) -> PResult<TreeNode> {
        let tok = self.advance(context)?;
        match tok.kind {
            TokenKind::Keyword if ["int", "char", "boolean"].contains(&tok.text.as_str()) => {
                Ok(TreeNode::leaf(tok.kind.xml_tag(), tok.text))
            }
            TokenKind::Identifier => Ok(TreeNode::leaf(tok.kind.xml_tag(), tok.text)),
            _ => Err(ParseError::Expected {
                context,
                expected: "a type".to_string(),
                found: tok.text,
            }),
        }
    }

    // --- subroutines ----------------------------------------------------

    fn compile_subroutine_dec(&mut self) -> PResult<Option<TreeNode>> {
        const CTX: &str = "subroutineDec";
        let Some(tok) = self.tokenizer.advance().cloned() else {
            return Ok(None);
        };
        if !(tok.kind == TokenKind::Keyword
            && ["constructor", "function", "method"].contains(&tok.text.as_str()))
        {
            self.roll_back();
            return Ok(None);
        }
        let mut children = vec![TreeNode::leaf(tok.kind.xml_tag(), tok.text)];

        // void | type
        let return_tok = self.advance(CTX)?;
        let return_node = if return_tok.kind == TokenKind::Keyword && return_tok.text == "void" {
            TreeNode::leaf(return_tok.kind.xml_tag(), return_tok.text)
        } else if return_tok.kind == TokenKind::Keyword
            && ["int", "char", "boolean"].contains(&return_tok.text.as_str())
        {
            TreeNode::leaf(return_tok.kind.xml_tag(), return_tok.text)
        } else if return_tok.kind == TokenKind::Identifier {
            TreeNode::leaf(return_tok.kind.xml_tag(), return_tok.text)
        } else {
            return Err(ParseError::Expected {
                context: CTX,
                expected: "'void' or a type".to_string(),
                found: return_tok.text,
            });
        };
        children.push(return_node);

        children.push(self.expect_identifier(CTX)?);
        children.push(self.expect_symbol("(", CTX)?);
        children.push(self.compile_parameter_list()?);
        children.push(self.expect_symbol(")", CTX)?);
        children.push(self.compile_subroutine_body()?);

        Ok(Some(TreeNode::node("subroutineDec", children)))
    }

    fn compile_parameter_list(&mut self) -> PResult<TreeNode> {
        const CTX: &str = "parameterList";
        let mut children = Vec::new();

        let Some(tok) = self.tokenizer.advance().cloned() else {
            children.push(TreeNode::Pad);
            return Ok(TreeNode::node("parameterList", children));
        };
        let first_type = if tok.kind == TokenKind::Keyword
            && ["int", "char", "boolean"].contains(&tok.text.as_str())
        {
            Some(TreeNode::leaf(tok.kind.xml_tag(), tok.text))
        } else if tok.kind == TokenKind::Identifier {
            Some(TreeNode::leaf(tok.kind.xml_tag(), tok.text))
        } else {
            None
        };

        let Some(first_type) = first_type else {
            self.roll_back();
            children.push(TreeNode::Pad);
            return Ok(TreeNode::node("parameterList", children));
        };
        children.push(first_type);
        children.push(self.expect_identifier(CTX)?);

        loop {
            let Some(comma) = self.tokenizer.advance().cloned() else {
                break;
            };
            if !(comma.kind == TokenKind::Symbol && comma.text == ",") {
                self.roll_back();
                break;
            }
            children.push(TreeNode::leaf(comma.kind.xml_tag(), comma.text));
            children.push(self.compile_type(CTX)?);
            children.push(self.expect_identifier(CTX)?);
        }

        Ok(TreeNode::node("parameterList", children))
    }

    fn compile_subroutine_body(&mut self) -> PResult<TreeNode> {
        const CTX: &str = "subroutineBody";
        let mut children = vec![self.expect_symbol("{", CTX)?];

        while let Some(node) = self.compile_var_dec()? {
            children.push(node);
        }
        children.push(self.compile_statements()?);
        children.push(self.expect_symbol("}", CTX)?);

        Ok(TreeNode::node("subroutineBody", children))
    }

    fn compile_var_dec(&mut self) -> PResult<Option<TreeNode>> {
        const CTX: &str = "varDec";
        let Some(tok) = self.tokenizer.advance().cloned() else {
            return Ok(None);
        };
        if !(tok.kind == TokenKind::Keyword && tok.text == "var") {
            self.roll_back();
            return Ok(None);
        }
        let mut children = vec![TreeNode::leaf(tok.kind.xml_tag(), tok.text)];
        children.push(self.compile_type(CTX)?);
        children.push(self.expect_identifier(CTX)?);

        loop {
            let Some(comma) = self.tokenizer.advance().cloned() else {
                break;
            };
            if !(comma.kind == TokenKind::Symbol && comma.text == ",") {
                self.roll_back();
                break;
            }
            children.push(TreeNode::leaf(comma.kind.xml_tag(), comma.text));
            children.push(self.expect_identifier(CTX)?);
        }

        children.push(self.expect_symbol(";", CTX)?);
        Ok(Some(TreeNode::node("varDec", children)))
    }

    // --- statements -----------------------------------------------------

    fn compile_statements(&mut self) -> PResult<TreeNode> {
        let mut children = Vec::new();
        loop {
            if let Some(node) = self.compile_do()? {
                children.push(node);
            } else if let Some(node) = self.compile_let()? {
                children.push(node);
            } else if let Some(node) = self.compile_while()? {
                children.push(node);
            } else if let Some(node) = self.compile_return()? {
                children.push(node);
            } else if let Some(node) = self.compile_if()? {
                children.push(node);
            } else {
                break;
            }
        }
        if children.is_empty() {
            children.push(TreeNode::Pad);
        }
        Ok(TreeNode::node("statements", children))
    }

    fn compile_do(&mut self) -> PResult<Option<TreeNode>> {
        const CTX: &str = "doStatement";
        let Some(tok) = self.tokenizer.advance().cloned() else {
            return Ok(None);
        };
        if !(tok.kind == TokenKind::Keyword && tok.text == "do") {
            self.roll_back();
            return Ok(None);
        }
        let mut children = vec![TreeNode::leaf(tok.kind.xml_tag(), tok.text)];
        children.extend(self.compile_subroutine_call(CTX)?);
        children.push(self.expect_symbol(";", CTX)?);
        Ok(Some(TreeNode::node("doStatement", children)))
    }

    /// `subroutineCall` is not itself a tree node; its pieces are spliced
    /// directly into whichever production invoked it (`doStatement` or a
    /// `term`).
    fn compile_subroutine_call(&mut self, context: &'static str) -> PResult<Vec<TreeNode>> {
        let mut children = vec![self.expect_identifier(context)?];

        let tok = self.advance(context)?;
        if tok.kind == TokenKind::Symbol && tok.text == "." {
            children.push(TreeNode::leaf(tok.kind.xml_tag(), tok.text));
            children.push(self.expect_identifier(context)?);
            children.push(self.expect_symbol("(", context)?);
        } else if tok.kind == TokenKind::Symbol && tok.text == "(" {
            children.push(TreeNode::leaf(tok.kind.xml_tag(), tok.text));
        } else {
            return Err(ParseError::Expected {
                context,
                expected: "'.' or '('".to_string(),
                found: tok.text,
            });
        }

        children.push(self.compile_expression_list()?);
        children.push(self.expect_symbol(")", context)?);
        Ok(children)
    }

    fn compile_let(&mut self) -> PResult<Option<TreeNode>> {
        const CTX: &str = "letStatement";
        let Some(tok) = self.tokenizer.advance().cloned() else {
            return Ok(None);
        };
        if !(tok.kind == TokenKind::Keyword && tok.text == "let") {
            self.roll_back();
            return Ok(None);
        }
        let mut children = vec![TreeNode::leaf(tok.kind.xml_tag(), tok.text)];
        children.push(self.expect_identifier(CTX)?);

        let tok = self.advance(CTX)?;
        if tok.kind == TokenKind::Symbol && tok.text == "[" {
            children.push(TreeNode::leaf(tok.kind.xml_tag(), tok.text));
            children.push(self.compile_expression()?);
            children.push(self.expect_symbol("]", CTX)?);
        } else {
            self.roll_back();
        }

        children.push(self.expect_symbol("=", CTX)?);
        children.push(self.compile_expression()?);
        children.push(self.expect_symbol(";", CTX)?);
        Ok(Some(TreeNode::node("letStatement", children)))
    }

    fn compile_while(&mut self) -> PResult<Option<TreeNode>> {
        const CTX: &str = "whileStatement";
        let Some(tok) = self.tokenizer.advance().cloned() else {
            return Ok(None);
        };
        if !(tok.kind == TokenKind::Keyword && tok.text == "while") {
            self.roll_back();
            return Ok(None);
        }
        let mut children = vec![TreeNode::leaf(tok.kind.xml_tag(), tok.text)];
        children.push(self.expect_symbol("(", CTX)?);
        children.push(self.compile_expression()?);
        children.push(self.expect_symbol(")", CTX)?);
        children.push(self.expect_symbol("{", CTX)?);
        children.push(self.compile_statements()?);
        children.push(self.expect_symbol("}", CTX)?);
        Ok(Some(TreeNode::node("whileStatement", children)))
    }

    fn compile_return(&mut self) -> PResult<Option<TreeNode>> {
        const CTX: &str = "returnStatement";
        let Some(tok) = self.tokenizer.advance().cloned() else {
            return Ok(None);
        };
        if !(tok.kind == TokenKind::Keyword && tok.text == "return") {
            self.roll_back();
            return Ok(None);
        }
        let mut children = vec![TreeNode::leaf(tok.kind.xml_tag(), tok.text)];
        if let Some(expr) = self.try_compile_expression()? {
            children.push(expr);
        }
        children.push(self.expect_symbol(";", CTX)?);
        Ok(Some(TreeNode::node("returnStatement", children)))
    }

    fn compile_if(&mut self) -> PResult<Option<TreeNode>> {
        const CTX: &str = "ifStatement";
        let Some(tok) = self.tokenizer.advance().cloned() else {
            return Ok(None);
        };
        if !(tok.kind == TokenKind::Keyword && tok.text == "if") {
            self.roll_back();
            return Ok(None);
        }
        let mut children = vec![TreeNode::leaf(tok.kind.xml_tag(), tok.text)];
        children.push(self.expect_symbol("(", CTX)?);
        children.push(self.compile_expression()?);
        children.push(self.expect_symbol(")", CTX)?);
        children.push(self.expect_symbol("{", CTX)?);
        children.push(self.compile_statements()?);
        children.push(self.expect_symbol("}", CTX)?);

        let Some(else_tok) = self.tokenizer.advance().cloned() else {
            return Ok(Some(TreeNode::node("ifStatement", children)));
        };
        if else_tok.kind == TokenKind::Keyword && else_tok.text == "else" {
            children.push(TreeNode::leaf(else_tok.kind.xml_tag(), else_tok.text));
            children.push(self.expect_symbol("{", CTX)?);
            children.push(self.compile_statements()?);
            children.push(self.expect_symbol("}", CTX)?);
        } else {
            self.roll_back();
        }

        Ok(Some(TreeNode::node("ifStatement", children)))
    }

    // --- expressions ------------------------------------------------

    const BINARY_OPS: [&'static str; 9] = ["+", "-", "*", "/", "&", "|", "<", ">", "="];

    /// Used only by `returnStatement`, where the expression is optional:
    /// peeks one token to see whether a term can start here before
    /// committing to `compile_expression`.
    fn try_compile_expression(&mut self) -> PResult<Option<TreeNode>> {
        let Some(tok) = self.tokenizer.advance().cloned() else {
            return Ok(None);
        };
        self.roll_back();
        let starts_term = tok.kind == TokenKind::Identifier
            || tok.kind == TokenKind::IntegerConstant
            || tok.kind == TokenKind::StringConstant
            || (tok.kind == TokenKind::Symbol && (tok.text == "-" || tok.text == "~" || tok.text == "("))
            || (tok.kind == TokenKind::Keyword
                && ["true", "false", "null", "this"].contains(&tok.text.as_str()));
        if starts_term {
            Ok(Some(self.compile_expression()?))
        } else {
            Ok(None)
        }
    }

    fn compile_expression(&mut self) -> PResult<TreeNode> {
        let mut children = vec![self.compile_term()?];

        loop {
            let Some(tok) = self.tokenizer.advance().cloned() else {
                break;
            };
            if tok.kind == TokenKind::Symbol && Self::BINARY_OPS.contains(&tok.text.as_str()) {
                children.push(TreeNode::leaf(tok.kind.xml_tag(), tok.text));
                children.push(self.compile_term()?);
            } else {
                self.roll_back();
                break;
            }
        }

        Ok(TreeNode::node("expression", children))
    }

    /// Compiles a term. After consuming a leading identifier, the parser
    /// must peek one further token to tell an array access or a bare
    /// variable reference apart from a subroutine call; when it turns out
    /// to be a call, both peeked tokens are rolled back so
    /// `compile_subroutine_call` can re-read them from the start.
    fn compile_term(&mut self) -> PResult<TreeNode> {
        const CTX: &str = "term";
        let tok = self.advance(CTX)?;

        let children: Vec<TreeNode> = match tok.kind {
            TokenKind::IntegerConstant | TokenKind::StringConstant => {
                vec![TreeNode::leaf(tok.kind.xml_tag(), tok.text)]
            }
            TokenKind::Keyword
                if ["true", "false", "null", "this"].contains(&tok.text.as_str()) =>
            {
                vec![TreeNode::leaf(tok.kind.xml_tag(), tok.text)]
            }
            TokenKind::Identifier => {
                let name = tok.text.clone();
                let lookahead = self.advance(CTX)?;
                if lookahead.kind == TokenKind::Symbol
                    && (lookahead.text == "(" || lookahead.text == ".")
                {
                    // Undoes both the identifier and the lookahead symbol so
                    // compile_subroutine_call can re-consume them. Safe only
                    // because compile_class always consumes class/name/{
                    // first, so the cursor can never be below index 2 here.
                    self.roll_back();
                    self.roll_back();
                    self.compile_subroutine_call(CTX)?
                } else if lookahead.kind == TokenKind::Symbol && lookahead.text == "[" {
                    let mut children = vec![
                        TreeNode::leaf(TokenKind::Identifier.xml_tag(), name),
                        TreeNode::leaf(lookahead.kind.xml_tag(), lookahead.text),
                    ];
                    children.push(self.compile_expression()?);
                    children.push(self.expect_symbol("]", CTX)?);
                    children
                } else {
                    self.roll_back();
                    vec![TreeNode::leaf(TokenKind::Identifier.xml_tag(), name)]
                }
            }
            TokenKind::Symbol if tok.text == "(" => {
                let mut children = vec![TreeNode::leaf(tok.kind.xml_tag(), tok.text)];
                children.push(self.compile_expression()?);
                children.push(self.expect_symbol(")", CTX)?);
                children
            }
            TokenKind::Symbol if tok.text == "-" || tok.text == "~" => {
                vec![
                    TreeNode::leaf(tok.kind.xml_tag(), tok.text),
                    self.compile_term()?,
                ]
            }
            _ => {
                return Err(ParseError::Expected {
                    context: CTX,
                    expected: "a term".to_string(),
                    found: tok.text,
                });
            }
        };

        Ok(TreeNode::node("term", children))
    }

    fn compile_expression_list(&mut self) -> PResult<TreeNode> {
        let mut children = Vec::new();

        let Some(first) = self.try_compile_expression()? else {
            children.push(TreeNode::Pad);
            return Ok(TreeNode::node("expressionList", children));
        };
        children.push(first);

        loop {
            let Some(tok) = self.tokenizer.advance().cloned() else {
                break;
            };
            if tok.kind == TokenKind::Symbol && tok.text == "," {
                children.push(TreeNode::leaf(tok.kind.xml_tag(), tok.text));
                children.push(self.compile_expression()?);
            } else {
                self.roll_back();
                break;
            }
        }

        Ok(TreeNode::node("expressionList", children))
    }
}
