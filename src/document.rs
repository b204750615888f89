//! In-memory document tree
//!
//! A [`Document`] owns every node in a single arena; parent links and the
//! keyed record collection are indices into that arena, never a second
//! ownership path.

use serde::Serialize;
use std::collections::HashMap;
use std::rc::Rc;

use crate::schema::StructureSchema;
use crate::version::GedcomVersion;

/// Index of a node within its owning document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

/// One line of the document: level, optional xref, tag, optional payload,
/// and the resolved schema assigned during construction.
#[derive(Debug, Clone)]
pub struct StructureNode {
    pub level: usize,
    /// Delimited cross-reference identifier, top-level records only
    pub xref: Option<String>,
    pub tag: String,
    pub payload: Option<String>,
    pub line_number: usize,
    pub original_text: String,
    pub schema: Rc<StructureSchema>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// An ordered, keyed collection of top-level records plus the arena that
/// owns every node of the tree.
///
/// Records are keyed by xref when present, else by tag, so at most one
/// tagless record per tag (one HEAD, one TRLR) can exist.
#[derive(Debug)]
pub struct Document {
    pub version: GedcomVersion,
    pub line_count: usize,
    /// Source product declared in the header, used as the extension owner
    /// during schema resolution
    pub source_product: Option<String>,
    pub(crate) nodes: Vec<StructureNode>,
    pub(crate) records: Vec<NodeId>,
    pub(crate) records_by_key: HashMap<String, NodeId>,
}

impl Document {
    pub fn new(version: GedcomVersion) -> Self {
        Self {
            version,
            line_count: 0,
            source_product: None,
            nodes: Vec::new(),
            records: Vec::new(),
            records_by_key: HashMap::new(),
        }
    }

    pub fn node(&self, id: NodeId) -> &StructureNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut StructureNode {
        &mut self.nodes[id.0]
    }

    pub(crate) fn push_node(&mut self, node: StructureNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Top-level records in document order.
    pub fn records(&self) -> &[NodeId] {
        &self.records
    }

    /// Look up a top-level record by its delimited xref (or tag for the
    /// tagless pseudo-records).
    pub fn record_by_key(&self, key: &str) -> Option<NodeId> {
        self.records_by_key.get(key).copied()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Dotted tag path from the record root down to this node,
    /// e.g. `HEAD.GEDC.VERS`.
    pub fn tag_path(&self, id: NodeId) -> String {
        let mut tags = Vec::new();
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            tags.push(self.nodes[c.0].tag.as_str());
            cursor = self.nodes[c.0].parent;
        }
        tags.reverse();
        tags.join(".")
    }

    /// All nodes in document order (records, each followed by its subtree
    /// depth-first).
    pub fn walk(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for &rec in &self.records {
            self.collect_preorder(rec, &mut out);
        }
        out
    }

    fn collect_preorder(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for &child in &self.nodes[id.0].children {
            self.collect_preorder(child, out);
        }
    }

    /// Outward-facing view of a node and its subtree.
    pub fn view(&self, id: NodeId) -> NodeView {
        let node = self.node(id);
        NodeView {
            level: node.level,
            xref: node.xref.clone(),
            tag: node.tag.clone(),
            tag_path: self.tag_path(id),
            payload: node.payload.clone(),
            line_number: node.line_number,
            children: node.children.iter().map(|&c| self.view(c)).collect(),
        }
    }
}

/// Serializable projection of a structure node for external consumers.
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub level: usize,
    pub xref: Option<String>,
    pub tag: String,
    pub tag_path: String,
    pub payload: Option<String>,
    pub line_number: usize,
    pub children: Vec<NodeView>,
}

/// Whether a payload is delimited like a cross-reference identifier.
/// A leading `@@` is the escape for a literal at-sign, not a pointer.
pub fn is_pointer_payload(payload: &str) -> bool {
    payload.len() >= 3
        && payload.starts_with('@')
        && payload.ends_with('@')
        && !payload.starts_with("@@")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(level: usize, tag: &str) -> StructureNode {
        StructureNode {
            level,
            xref: None,
            tag: tag.to_string(),
            payload: None,
            line_number: 0,
            original_text: String::new(),
            schema: Rc::new(StructureSchema::undocumented(tag)),
            parent: None,
            children: Vec::new(),
        }
    }

    #[test]
    fn test_tag_path() {
        let mut doc = Document::new(GedcomVersion::V70);
        let head = doc.push_node(leaf(0, "HEAD"));
        let gedc = doc.push_node(leaf(1, "GEDC"));
        let vers = doc.push_node(leaf(2, "VERS"));
        doc.node_mut(gedc).parent = Some(head);
        doc.node_mut(vers).parent = Some(gedc);
        doc.node_mut(head).children.push(gedc);
        doc.node_mut(gedc).children.push(vers);
        doc.records.push(head);

        assert_eq!(doc.tag_path(vers), "HEAD.GEDC.VERS");
        assert_eq!(doc.walk(), vec![head, gedc, vers]);
    }

    #[test]
    fn test_pointer_payload_shape() {
        assert!(is_pointer_payload("@I1@"));
        assert!(is_pointer_payload("@VOID@"));
        assert!(!is_pointer_payload("@@escaped"));
        assert!(!is_pointer_payload("plain text"));
        assert!(!is_pointer_payload("@"));
    }
}
