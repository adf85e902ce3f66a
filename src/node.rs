//! Documents and nodes.
//!
//! A [`KdlDocument`] is an ordered list of [`KdlNode`]s. Each node has a name, an
//! optional type annotation, ordered arguments, named properties and an optional
//! child document.
//!
//! ## Building a tree
//!
//! ```rust
//! use kdl_doc::{KdlDocument, KdlNode};
//!
//! let mut server = KdlNode::new("server")
//!     .with_argument("main")
//!     .with_property("port", 8080);
//! server.push_child(KdlNode::new("tls").with_property("enabled", true));
//!
//! let doc = KdlDocument::from(vec![server]);
//! assert_eq!(
//!     doc.to_kdl_string(),
//!     "server \"main\" port=8080 {\n    tls enabled=true\n}\n"
//! );
//! ```
//!
//! Equality compares names, annotations, arguments, properties and children.
//! Source spans are ignored.

use crate::value::SourceSpan;
use crate::{KdlMap, KdlPrintOptions, KdlValue, Writer};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// An ordered sequence of nodes.
///
/// An empty document is a valid value. A node whose `children` is
/// `Some(KdlDocument::new())` is printed as `node {}` by the pretty preset.
#[derive(Debug, Clone, Default)]
pub struct KdlDocument {
    pub nodes: Vec<KdlNode>,
    pub span: Option<SourceSpan>,
}

impl PartialEq for KdlDocument {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl KdlDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the first node with the given name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kdl_doc::parse;
    ///
    /// let doc = parse("a 1\nb 2\na 3").unwrap();
    /// assert_eq!(doc.get("a").map(|n| n.arguments[0].as_i64()), Some(Some(1)));
    /// assert!(doc.get("c").is_none());
    /// ```
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&KdlNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut KdlNode> {
        self.nodes.iter_mut().find(|node| node.name == name)
    }

    /// Returns every node with the given name, in document order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a KdlNode> + 'a {
        self.nodes.iter().filter(move |node| node.name == name)
    }

    pub fn push(&mut self, node: KdlNode) {
        self.nodes.push(node);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KdlNode> {
        self.nodes.iter()
    }

    /// Renders the document using the pretty preset.
    #[must_use]
    pub fn to_kdl_string(&self) -> String {
        self.to_kdl_string_with(&KdlPrintOptions::PRETTY)
    }

    #[must_use]
    pub fn to_kdl_string_with(&self, options: &KdlPrintOptions) -> String {
        let mut writer = Writer::new(*options);
        writer.write_document(self);
        writer.into_inner()
    }
}

impl From<Vec<KdlNode>> for KdlDocument {
    fn from(nodes: Vec<KdlNode>) -> Self {
        KdlDocument { nodes, span: None }
    }
}

impl FromIterator<KdlNode> for KdlDocument {
    fn from_iter<T: IntoIterator<Item = KdlNode>>(iter: T) -> Self {
        KdlDocument::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl IntoIterator for KdlDocument {
    type Item = KdlNode;
    type IntoIter = std::vec::IntoIter<KdlNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a KdlDocument {
    type Item = &'a KdlNode;
    type IntoIter = std::slice::Iter<'a, KdlNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl fmt::Display for KdlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_kdl_string())
    }
}

impl Serialize for KdlDocument {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.nodes.len()))?;
        for node in &self.nodes {
            seq.serialize_element(node)?;
        }
        seq.end()
    }
}

/// A named node.
#[derive(Debug, Clone, Default)]
pub struct KdlNode {
    pub name: String,
    pub ty: Option<String>,
    pub arguments: Vec<KdlValue>,
    pub properties: KdlMap,
    /// `None` when the node has no children block at all.
    pub children: Option<KdlDocument>,
    pub span: Option<SourceSpan>,
}

impl PartialEq for KdlNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.ty == other.ty
            && self.arguments == other.arguments
            && self.properties == other.properties
            && self.children == other.children
    }
}

impl KdlNode {
    pub fn new(name: impl Into<String>) -> Self {
        KdlNode {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    #[must_use]
    pub fn with_argument(mut self, value: impl Into<KdlValue>) -> Self {
        self.arguments.push(value.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<KdlValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: KdlDocument) -> Self {
        self.children = Some(children);
        self
    }

    #[inline]
    #[must_use]
    pub fn ty(&self) -> Option<&str> {
        self.ty.as_deref()
    }

    /// Returns the property value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&KdlValue> {
        self.properties.get(key)
    }

    /// Returns the argument at `index`.
    #[must_use]
    pub fn argument(&self, index: usize) -> Option<&KdlValue> {
        self.arguments.get(index)
    }

    /// Returns the first child node with the given name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kdl_doc::parse;
    ///
    /// let doc = parse("parent {\n    child 1\n}").unwrap();
    /// let parent = &doc.nodes[0];
    /// assert_eq!(parent.child("child").and_then(|c| c.arguments[0].as_i64()), Some(1));
    /// assert!(parent.child("missing").is_none());
    /// ```
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&KdlNode> {
        self.children.as_ref().and_then(|doc| doc.get(name))
    }

    /// Appends a child, creating the children block if the node has none.
    pub fn push_child(&mut self, node: KdlNode) {
        self.children.get_or_insert_with(KdlDocument::new).push(node);
    }

    /// Renders the node at the top level using the pretty preset, without a trailing newline.
    #[must_use]
    pub fn to_kdl_string(&self) -> String {
        self.to_kdl_string_with(&KdlPrintOptions::PRETTY)
    }

    #[must_use]
    pub fn to_kdl_string_with(&self, options: &KdlPrintOptions) -> String {
        let mut writer = Writer::new(*options);
        writer.write_node(self);
        writer.into_inner()
    }
}

impl fmt::Display for KdlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_kdl_string())
    }
}

impl Serialize for KdlNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut len = 3;
        if self.ty.is_some() {
            len += 1;
        }
        if self.children.is_some() {
            len += 1;
        }

        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("name", &self.name)?;
        if let Some(ty) = &self.ty {
            map.serialize_entry("type", ty)?;
        }
        map.serialize_entry("arguments", &self.arguments)?;
        map.serialize_entry("properties", &self.properties)?;
        if let Some(children) = &self.children {
            map.serialize_entry("children", children)?;
        }
        map.end()
    }
}
