use std::fmt::Write as _;

use super::{Node, Tree};

/// Totals for a tree: `(directories, files)`.
pub fn count(tree: &Tree) -> (usize, usize) {
    tree.iter().fold((0, 0), |(dirs, files), (_, node)| match node {
        Node::Directory(children) => {
            let (d, f) = count(children);
            (dirs + 1 + d, files + f)
        }
        Node::File(_) => (dirs, files + 1),
    })
}

/// Indented outline of `tree` under a root entry named `root`.
pub fn outline(root: &str, tree: &Tree) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📁 {}/", root.trim_end_matches('/'));
    outline_into(tree, 1, &mut out);
    out
}

fn outline_into(tree: &Tree, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (name, node) in tree.iter() {
        match node {
            Node::Directory(children) => {
                let _ = writeln!(out, "{}📁 {}/", indent, name);
                outline_into(children, depth + 1, out);
            }
            Node::File(contents) if contents.is_empty() => {
                let _ = writeln!(out, "{}📄 {}", indent, name);
            }
            Node::File(contents) => {
                let _ = writeln!(out, "{}📄 {} ({} bytes)", indent, name, contents.len());
            }
        }
    }
}
