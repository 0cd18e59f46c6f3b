// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node behaviour: lifecycle hooks and the signal context.

use crate::error::{GraphError, LangError, PersistError};
use crate::graph::Graph;
use crate::instance::{InstanceId, InstanceState};
use crate::link::LinkId;
use crate::log::{LogLevel, LogSink};
use crate::node::{Node, NodeKey};
use crate::signal::SignalValue;
use crate::spot::SpotRef;
use indexmap::IndexSet;

/// Runtime behaviour attached to a graph node.
///
/// Hooks run in a fixed order while loading: [`init`](Self::init) when the
/// node is added, [`loaded`](Self::loaded) once every node and link exists,
/// then [`import`](Self::import) when the document carries saved state.
/// Node types with persisted state must round-trip
/// `import(export())`.
///
/// Signal hooks take `&self`: a node can be signalled again while one of its
/// hooks is still on the call stack, so mutable state lives in `Cell` or
/// `RefCell` fields. Nothing stops a loop in the graph from recursing
/// forever; a looping node must decide when to stop signalling.
pub trait LangNode {
    /// Declare the node's spots
    fn init(&mut self, node: &mut Node) -> Result<(), GraphError>;

    /// Post-load fixups; every node and link of the graph is in place
    fn loaded(&self, _ctx: &LoadContext<'_>) -> Result<(), GraphError> {
        Ok(())
    }

    /// Serialize persisted state. Stateless nodes return an empty payload.
    fn export(&self) -> Result<Vec<u8>, PersistError> {
        Ok(Vec::new())
    }

    /// Restore persisted state produced by [`export`](Self::export)
    fn import(&mut self, data: &[u8]) -> Result<(), PersistError> {
        if data.is_empty() {
            Ok(())
        } else {
            Err(PersistError::UnexpectedPayload(data.len()))
        }
    }

    /// Called when the host begins propagation at this node
    fn on_begin(&self, _ctx: &mut SignalContext<'_>) -> Result<(), LangError> {
        Ok(())
    }

    /// Called when a linked neighbour signals `spot` (an index into this
    /// node's spots)
    fn on_signal(
        &self,
        ctx: &mut SignalContext<'_>,
        spot: usize,
        args: &[SignalValue],
    ) -> Result<(), LangError>;
}

/// Read-only view handed to [`LangNode::loaded`]
pub struct LoadContext<'a> {
    pub(crate) graph: &'a Graph,
    pub(crate) node: NodeKey,
}

impl<'a> LoadContext<'a> {
    /// The fully built graph
    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    /// Key of the node being loaded
    pub fn node_key(&self) -> NodeKey {
        self.node
    }

    /// The node being loaded
    pub fn node(&self) -> Result<&'a Node, GraphError> {
        self.graph.node_or_err(self.node)
    }
}

/// Links already crossed in one propagation wave, keyed by the sending spot
pub(crate) type VisitedEdges = IndexSet<(LinkId, SpotRef)>;

/// Mutable runtime state threaded through one propagation cascade
pub(crate) struct Runtime<'a> {
    pub(crate) state: &'a mut InstanceState,
    pub(crate) log: &'a dyn LogSink,
    pub(crate) instance: InstanceId,
    /// `Some` when the cycle guard is on
    pub(crate) visited: Option<&'a mut VisitedEdges>,
}

impl<'a> Runtime<'a> {
    pub(crate) fn reborrow(&mut self) -> Runtime<'_> {
        Runtime {
            state: &mut *self.state,
            log: self.log,
            instance: self.instance,
            visited: self.visited.as_deref_mut(),
        }
    }
}

/// Context handed to [`LangNode::on_begin`] and [`LangNode::on_signal`]
pub struct SignalContext<'a> {
    pub(crate) graph: &'a mut Graph,
    pub(crate) rt: Runtime<'a>,
    pub(crate) node: NodeKey,
    pub(crate) source: Option<SpotRef>,
}

impl<'a> SignalContext<'a> {
    /// Key of the node handling the signal
    pub fn node_key(&self) -> NodeKey {
        self.node
    }

    /// The node handling the signal
    pub fn node(&self) -> Result<&Node, GraphError> {
        self.graph.node_or_err(self.node)
    }

    /// Spot that sent the signal; `None` inside `on_begin`
    pub fn source(&self) -> Option<SpotRef> {
        self.source
    }

    /// Read-only view of the graph
    pub fn graph(&self) -> &Graph {
        &*self.graph
    }

    /// ID of the running instance
    pub fn instance_id(&self) -> InstanceId {
        self.rt.instance
    }

    /// Instance state
    pub fn state(&self) -> &InstanceState {
        &*self.rt.state
    }

    /// Mutable instance state
    pub fn state_mut(&mut self) -> &mut InstanceState {
        &mut *self.rt.state
    }

    /// Send a message to the host log sink, tagged with this node's tag
    pub fn log(&self, level: LogLevel, message: &str) {
        let tag = self
            .graph
            .node(self.node)
            .map_or("?", |n| n.tag.as_str());
        self.rt.log.log(level, tag, message);
    }

    /// Build a node failure for this node
    pub fn fail(&self, message: impl Into<String>) -> LangError {
        LangError::Node {
            node: self.graph.node_id(self.node),
            message: message.into(),
        }
    }

    /// Signal one of this node's own spots. Returns once every linked node
    /// has handled the signal, recursively.
    pub fn signal(&mut self, spot: usize, args: &[SignalValue]) -> Result<(), LangError> {
        let from = SpotRef::new(self.node, spot);
        self.graph.propagate(from, args, &mut self.rt)
    }
}
