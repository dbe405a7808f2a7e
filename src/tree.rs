//! Flattened event hierarchy.
//!
//! The nested input is walked once in pre-order and stored as an arena of
//! [`Node`]s. Parents and children refer to each other by [`NodeIndex`], so
//! the arena owns every node and there are no reference cycles.

mod collapse;

use crate::error::Error;
use serde::Deserialize;
use std::collections::HashMap;

/// An RGB marker color parsed from `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct HexColor(pub [u8; 3]);

impl TryFrom<String> for HexColor {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value.strip_prefix('#').unwrap_or(&value);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(Error::InvalidColor(value));
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16);
        match (channel(0..2), channel(2..4), channel(4..6)) {
            (Ok(r), Ok(g), Ok(b)) => Ok(HexColor([r, g, b])),
            _ => Err(Error::InvalidColor(value)),
        }
    }
}

/// One element of the hierarchical input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventSpec {
    pub id: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub color: Option<HexColor>,
    /// Start out collapsed.
    #[serde(default)]
    pub collapse: bool,
    #[serde(default)]
    pub children: Vec<EventSpec>,
}

impl EventSpec {
    pub fn new(id: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            value: None,
            text: None,
            color: None,
            collapse: false,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn child(mut self, child: EventSpec) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn collapsed(mut self, collapse: bool) -> Self {
        self.collapse = collapse;
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Position of a node in the flattened sequence.
pub type NodeIndex = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: String,
    start: f64,
    end: f64,
    value: Option<f64>,
    text: Option<String>,
    color: Option<HexColor>,
    level: u32,
    is_collapsed: bool,
    is_parent_collapsed: bool,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    descendant_count: usize,
    // Rows this node's subtree contributes when its ancestors are expanded.
    open_rows: usize,
}

impl Node {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn color(&self) -> Option<HexColor> {
        self.color
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_collapsed(&self) -> bool {
        self.is_collapsed
    }

    /// True if any ancestor is collapsed.
    pub fn is_parent_collapsed(&self) -> bool {
        self.is_parent_collapsed
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn descendant_count(&self) -> usize {
        self.descendant_count
    }

    /// Number of descendants currently contributing rows beneath this node.
    pub fn visible_children(&self) -> usize {
        if self.is_parent_collapsed {
            0
        } else {
            self.open_rows
        }
    }

    /// Descendants hidden by this node or by collapsed nodes inside its subtree.
    pub fn hidden_children(&self) -> usize {
        self.descendant_count - self.open_rows
    }

    fn is_hiding(&self) -> bool {
        self.is_collapsed || self.is_parent_collapsed
    }
}

/// Explicit domain bounds supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DomainOverride {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

/// The flattened hierarchy together with its domain bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTree {
    nodes: Vec<Node>,
    by_id: HashMap<String, NodeIndex>,
    lo: Option<f64>,
    hi: Option<f64>,
}

impl FlatTree {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.by_id.get(id).copied()
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Lower domain bound: the override, or the smallest `start` seen.
    pub fn lo(&self) -> Option<f64> {
        self.lo
    }

    /// Upper domain bound: the override, or the largest `end` seen.
    pub fn hi(&self) -> Option<f64> {
        self.hi
    }

    /// Number of rows that are not hidden by a collapsed ancestor.
    pub fn visible_len(&self) -> usize {
        self.nodes.iter().filter(|node| !node.is_parent_collapsed).count()
    }

    /// Indices of the ancestors of `index`, nearest first.
    pub fn ancestors(&self, index: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.nodes.get(index).and_then(|node| node.parent),
        }
    }
}

pub struct Ancestors<'a> {
    tree: &'a FlatTree,
    next: Option<NodeIndex>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        let current = self.next?;
        self.next = self.tree.nodes[current].parent;
        Some(current)
    }
}

/// Flatten `roots` into pre-order.
pub fn flatten(roots: &[EventSpec], domain: DomainOverride) -> FlatTree {
    let mut tree = FlatTree {
        nodes: Vec::new(),
        by_id: HashMap::new(),
        lo: domain.start,
        hi: domain.end,
    };

    let mut flattener = Flattener {
        tree: &mut tree,
        domain,
    };
    for root in roots {
        flattener.visit(root, None, 0);
    }

    log::debug!(
        "flattened {} nodes, domain {:?}..{:?}",
        tree.nodes.len(),
        tree.lo,
        tree.hi
    );
    tree
}

struct Flattener<'a> {
    tree: &'a mut FlatTree,
    domain: DomainOverride,
}

impl Flattener<'_> {
    /// Push `spec` and its subtree, returning how many nodes were appended.
    fn visit(&mut self, spec: &EventSpec, parent: Option<NodeIndex>, level: u32) -> usize {
        if self.domain.start.is_none() {
            self.tree.lo = Some(self.tree.lo.map_or(spec.start, |lo| lo.min(spec.start)));
        }
        if self.domain.end.is_none() {
            self.tree.hi = Some(self.tree.hi.map_or(spec.end, |hi| hi.max(spec.end)));
        }

        let is_parent_collapsed = parent.is_some_and(|p| self.tree.nodes[p].is_hiding());
        let index = self.tree.nodes.len();
        self.tree.nodes.push(Node {
            id: spec.id.clone(),
            start: spec.start,
            end: spec.end,
            value: spec.value,
            text: spec.text.clone(),
            color: spec.color,
            level,
            is_collapsed: spec.collapse,
            is_parent_collapsed,
            parent,
            children: Vec::with_capacity(spec.children.len()),
            descendant_count: 0,
            open_rows: 0,
        });
        self.tree.by_id.entry(spec.id.clone()).or_insert(index);
        if let Some(parent) = parent {
            self.tree.nodes[parent].children.push(index);
        }

        let mut visited = 0;
        for child in &spec.children {
            visited += self.visit(child, Some(index), level + 1);
        }

        let open_rows = self.tree.open_rows_of(index);
        let node = &mut self.tree.nodes[index];
        node.descendant_count = visited;
        node.open_rows = open_rows;
        visited + 1
    }
}
