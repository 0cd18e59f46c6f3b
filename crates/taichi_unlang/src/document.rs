// SPDX-License-Identifier: MIT OR Apache-2.0
//! Serialized graph format and the load pipeline.

use crate::error::{GraphError, LangError, PersistError};
use crate::graph::Graph;
use crate::node::NodeKey;
use crate::registry::{NodeRegistry, NodeTypeKey};
use serde::{Deserialize, Serialize};

/// Current graph document format version
pub const DOCUMENT_VERSION: u32 = 1;

/// A spot addressed by node ID and spot ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotAddress {
    /// Node ID
    pub node: String,
    /// Spot ID
    pub spot: String,
}

impl SpotAddress {
    /// Create a new address
    pub fn new(node: impl Into<String>, spot: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            spot: spot.into(),
        }
    }
}

/// Serialized node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node ID
    pub id: String,
    /// Display name
    pub tag: String,
    /// Registry key
    pub type_key: NodeTypeKey,
    /// Opaque payload from [`LangNode::export`](crate::behavior::LangNode::export)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub state: Vec<u8>,
}

/// Serialized link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// First endpoint
    pub a: SpotAddress,
    /// Second endpoint
    pub b: SpotAddress,
}

/// Serialized graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Graph name
    pub name: String,
    /// Format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Nodes in insertion order
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    /// Links in creation order
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

impl GraphDocument {
    /// Create an empty document
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: DOCUMENT_VERSION,
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Append a node record
    pub fn with_node(
        mut self,
        id: impl Into<String>,
        tag: impl Into<String>,
        type_key: NodeTypeKey,
    ) -> Self {
        self.nodes.push(NodeRecord {
            id: id.into(),
            tag: tag.into(),
            type_key,
            state: Vec::new(),
        });
        self
    }

    /// Append a link record
    pub fn with_link(mut self, a: SpotAddress, b: SpotAddress) -> Self {
        self.links.push(LinkRecord { a, b });
        self
    }

    /// Parse a RON document, rejecting newer format versions
    pub fn from_ron(text: &str) -> Result<Self, PersistError> {
        let doc: Self = ron::from_str(text)?;
        doc.check_version()?;
        Ok(doc)
    }

    /// Write the document as pretty RON
    pub fn to_ron(&self) -> Result<String, PersistError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    fn check_version(&self) -> Result<(), PersistError> {
        if self.version > DOCUMENT_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: self.version,
                supported: DOCUMENT_VERSION,
            });
        }
        Ok(())
    }
}

impl Graph {
    /// Build a graph from a document.
    ///
    /// Every type key is resolved before any node is built, so an unknown
    /// type fails fast. Then nodes are added (`init`), links are created,
    /// `loaded` runs on every node and saved state is imported.
    pub fn load(doc: &GraphDocument, registry: &NodeRegistry) -> Result<Self, LangError> {
        doc.check_version()?;

        let behaviors = doc
            .nodes
            .iter()
            .map(|record| registry.create(&record.type_key))
            .collect::<Result<Vec<_>, GraphError>>()?;

        let mut graph = Graph::new(doc.name.clone());
        let mut keys = Vec::with_capacity(doc.nodes.len());
        for (record, behavior) in doc.nodes.iter().zip(behaviors) {
            let key = graph.add_node(
                record.id.clone(),
                record.tag.clone(),
                record.type_key.clone(),
                behavior,
            )?;
            keys.push(key);
        }

        for record in &doc.links {
            let a = graph.resolve(&record.a.node, &record.a.spot)?;
            let b = graph.resolve(&record.b.node, &record.b.spot)?;
            graph.link(a, b)?;
        }

        graph.run_loaded()?;

        for (record, key) in doc.nodes.iter().zip(keys) {
            if !record.state.is_empty() {
                graph.behavior_mut(key)?.import(&record.state)?;
            }
        }

        tracing::info!(
            graph = %graph.name,
            nodes = graph.node_count(),
            links = graph.link_count(),
            "loaded graph"
        );
        Ok(graph)
    }

    /// Snapshot the graph, exporting every node's state
    pub fn to_document(&self) -> Result<GraphDocument, LangError> {
        let mut doc = GraphDocument::new(self.name.clone());

        for node in self.nodes() {
            let behavior = self
                .behavior(node.key())
                .ok_or_else(|| GraphError::NodeNotFound(node.id.clone()))?;
            doc.nodes.push(NodeRecord {
                id: node.id.clone(),
                tag: node.tag.clone(),
                type_key: node.type_key.clone(),
                state: behavior.export()?,
            });
        }

        for link in self.links() {
            doc.links.push(LinkRecord {
                a: self.address(link.a.node, link.a.index)?,
                b: self.address(link.b.node, link.b.index)?,
            });
        }

        Ok(doc)
    }

    fn address(&self, node: NodeKey, index: usize) -> Result<SpotAddress, GraphError> {
        let node = self.node_or_err(node)?;
        Ok(SpotAddress::new(node.id.clone(), node.get_at(index)?.id.clone()))
    }
}
