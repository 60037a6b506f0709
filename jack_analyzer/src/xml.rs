//! Serializes a [`TreeNode`] into the fixed two-space-indented XML markup
//! the toolchain's downstream stages expect, special-casing the handful of
//! characters XML escapes and dropping `<pad/>` markers from the output.

use crate::tree::TreeNode;

pub fn render(root: &TreeNode) -> String {
    let mut out = String::new();
    write_node(root, 0, &mut out);
    out
}

fn write_node(node: &TreeNode, depth: usize, out: &mut String) {
    match node {
        TreeNode::Pad => {}
        TreeNode::Leaf { tag, text } => {
            push_indent(out, depth);
            out.push_str(&format!("<{tag}> {} </{tag}>\n", escape(text)));
        }
        TreeNode::Node { tag, children } => {
            push_indent(out, depth);
            out.push_str(&format!("<{tag}>\n"));
            for child in children {
                write_node(child, depth + 1, out);
            }
            push_indent(out, depth);
            out.push_str(&format!("</{tag}>\n"));
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
