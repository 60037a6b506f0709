//! The parse tree shape: either a terminal leaf carrying a token's lexeme,
//! an interior node named after a grammar nonterminal, or a pad sentinel
//! marking a nonterminal that matched nothing.

#[derive(Debug, Clone)]
pub enum TreeNode {
    Leaf {
        tag: &'static str,
        text: String,
    },
    Node {
        tag: &'static str,
        children: Vec<TreeNode>,
    },
    /// Emitted for an empty `parameterList`, `statements`, or
    /// `expressionList` so the grammar slot still appears as a node even
    /// when it matched zero productions; stripped back out at XML
    /// serialization time.
    Pad,
}

impl TreeNode {
    #[must_use]
    pub fn node(tag: &'static str, children: Vec<TreeNode>) -> Self {
        TreeNode::Node { tag, children }
    }

    #[must_use]
    pub fn leaf(tag: &'static str, text: impl Into<String>) -> Self {
        TreeNode::Leaf {
            tag,
            text: text.into(),
        }
    }
}
