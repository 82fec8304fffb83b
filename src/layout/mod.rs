pub mod builtin;
pub mod render;

use std::fmt;
use std::fs;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

/// A named tree together with the directory it is materialized into by default.
#[derive(Debug, Clone)]
pub struct Layout {
    pub name: String,
    pub base: Utf8PathBuf,
    pub tree: Tree,
}

/// Ordered directory contents. Iteration follows insertion (document) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<(String, Node)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Directory(Tree),
    File(String),
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. A repeated name replaces the earlier node in place,
    /// the same way a mapping literal keeps the last value for a key.
    pub fn insert(&mut self, name: impl Into<String>, node: Node) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = node,
            None => self.entries.push((name, node)),
        }
    }

    #[cfg(test)]
    pub fn file(mut self, name: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(name, Node::File(contents.into()));
        self
    }

    #[cfg(test)]
    pub fn dir(mut self, name: impl Into<String>, tree: Tree) -> Self {
        self.insert(name, Node::Directory(tree));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, node)| node)
    }

    /// Look up a `/`-separated path relative to this tree.
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let mut node = self.get(segments.next()?)?;
        for segment in segments {
            match node {
                Node::Directory(tree) => node = tree.get(segment)?,
                Node::File(_) => return None,
            }
        }
        Some(node)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("parsing TOML layout")
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("parsing JSON layout")
    }
}

/// Read a layout document from disk. `.json` files are parsed as JSON, anything else as TOML.
pub fn load_file(path: &Utf8Path) -> Result<Tree> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading layout {}", path))?;
    let tree = match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Tree::from_json_str(&raw),
        _ => Tree::from_toml_str(&raw),
    };
    tree.with_context(|| format!("loading layout {}", path))
}

impl<'de> Deserialize<'de> for Tree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TreeVisitor)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct TreeVisitor;

impl<'de> Visitor<'de> for TreeVisitor {
    type Value = Tree;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a table of directories and files")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Tree, A::Error> {
        let mut tree = Tree::new();
        while let Some((name, node)) = map.next_entry::<String, Node>()? {
            tree.insert(name, node);
        }
        Ok(tree)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("file contents as a string or a directory table")
    }

    fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Node, E> {
        Ok(Node::File(value.to_owned()))
    }

    fn visit_string<E: serde::de::Error>(self, value: String) -> Result<Node, E> {
        Ok(Node::File(value))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Node, A::Error> {
        TreeVisitor.visit_map(map).map(Node::Directory)
    }
}
