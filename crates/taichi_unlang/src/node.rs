// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph framework.

use crate::error::GraphError;
use crate::registry::NodeTypeKey;
use crate::spot::{Spot, SpotDecl};
use std::fmt;

/// Handle to a node in the graph arena.
///
/// Slots are never reused, so a handle to a removed node stays dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub(crate) u32);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A node instance in the graph
#[derive(Debug, Clone)]
pub struct Node {
    /// ID, unique within the graph
    pub id: String,
    /// Display name
    pub tag: String,
    /// Registry key the node was built from
    pub type_key: NodeTypeKey,
    key: NodeKey,
    spots: Vec<Spot>,
}

impl Node {
    pub(crate) fn new(
        key: NodeKey,
        id: impl Into<String>,
        tag: impl Into<String>,
        type_key: NodeTypeKey,
    ) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
            type_key,
            key,
            spots: Vec::new(),
        }
    }

    /// Arena handle of this node
    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// Append a spot and return its index
    pub fn add(&mut self, decl: SpotDecl) -> Result<usize, GraphError> {
        if self.spots.iter().any(|s| s.id == decl.id) {
            return Err(GraphError::DuplicateKey(format!(
                "spot '{}' on node '{}'",
                decl.id, self.id
            )));
        }

        self.spots.push(Spot::from_decl(decl, self.key));
        Ok(self.spots.len() - 1)
    }

    /// Number of spots
    pub fn spot_count(&self) -> usize {
        self.spots.len()
    }

    /// Get a spot by index
    pub fn get_at(&self, index: usize) -> Result<&Spot, GraphError> {
        self.spots.get(index).ok_or(GraphError::IndexOutOfRange {
            index,
            count: self.spots.len(),
        })
    }

    pub(crate) fn get_at_mut(&mut self, index: usize) -> Result<&mut Spot, GraphError> {
        let count = self.spots.len();
        self.spots
            .get_mut(index)
            .ok_or(GraphError::IndexOutOfRange { index, count })
    }

    /// Get a spot by ID
    pub fn spot(&self, id: &str) -> Option<&Spot> {
        self.spots.iter().find(|s| s.id == id)
    }

    /// Index of the spot with the given ID
    pub fn spot_index(&self, id: &str) -> Option<usize> {
        self.spots.iter().position(|s| s.id == id)
    }

    /// All spots in declaration order
    pub fn spots(&self) -> impl Iterator<Item = &Spot> {
        self.spots.iter()
    }

    /// Total number of links across all spots
    pub fn link_count(&self) -> usize {
        self.spots.iter().map(Spot::link_count).sum()
    }
}
