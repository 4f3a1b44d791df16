//! Abstract syntax tree.
//!
//! Nodes live in an arena owned by the [`Document`]; identities are plain
//! indices. Parents are handles, never owning references, so the parser can
//! keep stacks of currently-open blocks that alias nodes already attached
//! to the tree.

use std::collections::HashMap;

/// Handle to a node in the document arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Emphasis strength, decided by the delimiter run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmphasisKind {
    Italic,
    Bold,
    ItalicAndBold,
}

/// A link or image target: location plus optional title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub location: String,
    pub name: Option<String>,
}

/// One attribute of an HTML passthrough tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAttribute {
    pub name: String,
    pub value: Option<String>,
}

/// The fixed node taxonomy.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // Block
    Document,
    Paragraph,
    Header {
        level: u8,
    },
    Quote,
    List {
        ordered: bool,
        indentation: usize,
    },
    Item {
        indentation: usize,
        ordered: bool,
        loose: bool,
    },
    Code,
    Ruler,
    ResourceDefinition {
        id: String,
        resource: Resource,
    },
    Comment {
        text: String,
    },
    Line,
    // Inline
    Text {
        value: String,
    },
    CodeText {
        value: String,
    },
    CharRef {
        value: String,
    },
    CodeSpan {
        text: String,
    },
    Emphasis {
        kind: EmphasisKind,
        text: String,
    },
    Link {
        referenced: bool,
        reference_name: Option<String>,
        resource: Option<Resource>,
        whitespace_at_middle: bool,
    },
    Image {
        text: String,
        ref_id: Option<String>,
        resource: Option<Resource>,
    },
    InlineUrl {
        url: String,
    },
    LineBreak,
    // HTML passthrough
    OpeningTag {
        name: String,
        attributes: Vec<TagAttribute>,
        balanced: bool,
    },
    ClosingTag {
        name: String,
    },
    EmptyTag {
        name: String,
        attributes: Vec<TagAttribute>,
    },
}

/// A node plus its links into the tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Flat storage for nodes. Pushing a node under a parent appends the child
/// handle to the parent's ordered child list.
#[derive(Debug, Default)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Document-scoped mapping from a reference id, exactly as written, to the
/// `ResourceDefinition` node that owns the resource.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    definitions: HashMap<String, NodeId>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: String, definition: NodeId) {
        self.definitions.insert(id, definition);
    }

    pub fn get(&self, id: &str) -> Option<NodeId> {
        self.definitions.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// A parsed document: the arena, the root handle, and the reference table
/// populated from `[id]: url` definitions during parse.
#[derive(Debug)]
pub struct Document {
    arena: Arena,
    root: NodeId,
    references: ReferenceTable,
}

impl Document {
    pub(crate) fn new(arena: Arena, root: NodeId, references: ReferenceTable) -> Self {
        Self {
            arena,
            root,
            references,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.arena.node(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.arena.children(id)
    }

    pub fn references(&self) -> &ReferenceTable {
        &self.references
    }

    /// Looks up a reference id and returns the resource owned by its
    /// definition node. Ids are matched exactly, case included.
    pub fn resource_for(&self, id: &str) -> Option<&Resource> {
        let definition = self.references.get(id)?;
        match &self.arena.node(definition).kind {
            NodeKind::ResourceDefinition { resource, .. } => Some(resource),
            _ => None,
        }
    }

    /// Concatenated textual content under a node, in document order. Used
    /// to resolve links and images that name no explicit reference id.
    pub fn flat_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.arena.node(id).kind {
            NodeKind::Text { value } | NodeKind::CodeText { value } | NodeKind::CharRef { value } => {
                out.push_str(value)
            }
            NodeKind::CodeSpan { text } | NodeKind::Emphasis { text, .. } => out.push_str(text),
            _ => {
                for &child in self.arena.children(id) {
                    self.collect_text(child, out);
                }
            }
        }
    }
}

/// Whether a text node holds only spaces and tabs.
pub(crate) fn is_whitespace_text(kind: &NodeKind) -> bool {
    match kind {
        NodeKind::Text { value } => value.chars().all(|c| c == ' ' || c == '\t'),
        _ => false,
    }
}
