// SPDX-License-Identifier: MIT OR Apache-2.0
//! Link (edge) definitions for the graph.

use crate::error::GraphError;
use crate::node::NodeKey;
use crate::spot::SpotRef;
use std::fmt;

/// Handle to a link in the graph arena.
///
/// Slots are never reused, so the handle of a disposed link stays dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub(crate) u32);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link#{}", self.0)
    }
}

/// A symmetric link between two spots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Link ID
    pub id: LinkId,
    /// First endpoint, as passed to [`Graph::link`](crate::graph::Graph::link)
    pub a: SpotRef,
    /// Second endpoint
    pub b: SpotRef,
}

impl Link {
    pub(crate) fn new(id: LinkId, a: SpotRef, b: SpotRef) -> Self {
        Self { id, a, b }
    }

    /// Get the endpoint opposite to `spot`
    pub fn linked_spot(&self, spot: SpotRef) -> Result<SpotRef, GraphError> {
        if spot == self.a {
            Ok(self.b)
        } else if spot == self.b {
            Ok(self.a)
        } else {
            Err(GraphError::InvalidOperation(format!(
                "spot {spot} is not an endpoint of {}",
                self.id
            )))
        }
    }

    /// Check if this link touches a specific node
    pub fn involves_node(&self, node: NodeKey) -> bool {
        self.a.node == node || self.b.node == node
    }

    /// Check if this link touches a specific spot
    pub fn involves_spot(&self, spot: SpotRef) -> bool {
        self.a == spot || self.b == spot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linked_spot_both_ends() {
        let a = SpotRef::new(NodeKey(0), 0);
        let b = SpotRef::new(NodeKey(1), 2);
        let link = Link::new(LinkId(0), a, b);

        assert_eq!(link.linked_spot(a).unwrap(), b);
        assert_eq!(link.linked_spot(b).unwrap(), a);
        assert!(link.involves_node(NodeKey(1)));
        assert!(!link.involves_node(NodeKey(2)));
    }

    #[test]
    fn test_linked_spot_rejects_stranger() {
        let link = Link::new(
            LinkId(3),
            SpotRef::new(NodeKey(0), 0),
            SpotRef::new(NodeKey(1), 0),
        );
        let stranger = SpotRef::new(NodeKey(0), 1);

        assert!(matches!(
            link.linked_spot(stranger),
            Err(GraphError::InvalidOperation(_))
        ));
    }
}
