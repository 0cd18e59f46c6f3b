// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for graph construction, persistence and execution.

use crate::link::LinkId;
use crate::registry::NodeTypeKey;

/// Structural error raised by the graph model
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Arity, category or direction rule broken by a link
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A spot or node ID is already taken
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Spot index outside `[0, count)`
    #[error("Spot index {index} out of range (spot count {count})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of spots on the node
        count: usize,
    },

    /// Operation not valid for the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Registry has no constructor for the key
    #[error("Unknown node type: {0}")]
    UnknownNodeType(NodeTypeKey),

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Spot not found on a node
    #[error("Spot not found: {node}.{spot}")]
    SpotNotFound {
        /// Node ID
        node: String,
        /// Spot ID
        spot: String,
    },

    /// Graph has no Entry node
    #[error("Graph has no Entry node")]
    MissingEntry,

    /// Graph has more than one Entry node
    #[error("Graph has {0} Entry nodes, expected exactly one")]
    MultipleEntries(usize),
}

/// Error while exporting or importing persisted state
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Binary node state could not be encoded or decoded
    #[error("Node state codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// Graph document could not be parsed
    #[error("Graph document parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Graph document could not be written
    #[error("Graph document write error: {0}")]
    Write(#[from] ron::Error),

    /// Document was written by a newer format
    #[error("Document version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the document
        found: u32,
        /// Highest version this build reads
        supported: u32,
    },

    /// A node without persisted state was handed a payload
    #[error("Node has no persisted state but received {0} bytes")]
    UnexpectedPayload(usize),
}

/// Any error surfaced by loading or running a graph
#[derive(Debug, thiserror::Error)]
pub enum LangError {
    /// Structural error
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Persistence error
    #[error(transparent)]
    Persist(#[from] PersistError),

    /// The cycle guard saw a link crossed twice in one propagation wave
    #[error("Cycle detected: {link} crossed twice on its way to node {node}")]
    CycleDetected {
        /// Link crossed again
        link: LinkId,
        /// ID of the node the link leads to
        node: String,
    },

    /// A node's own logic failed
    #[error("Node {node} failed: {message}")]
    Node {
        /// ID of the failing node
        node: String,
        /// Failure description
        message: String,
    },
}
