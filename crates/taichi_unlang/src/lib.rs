// SPDX-License-Identifier: MIT OR Apache-2.0
//! UNLang node graph core for Taichi.
//!
//! A UNLang script is a directed graph of nodes. Each node owns an ordered
//! list of typed spots (ports), and links join an `Out` spot to an `In`
//! spot. Execution is a synchronous signal cascade:
//! - the host builds a [`Graph`] from a [`GraphDocument`] through a
//!   [`NodeRegistry`]
//! - a [`LangInstance`] binds the graph to its unique `Entry` node
//! - [`LangInstance::begin`] signals the Entry's out spot, and every linked
//!   node's [`LangNode::on_signal`] runs in turn, depth first, on the same
//!   call stack
//!
//! ## Limitations
//!
//! Propagation is single threaded and has no rollback. A node that fails
//! inside `on_signal` unwinds the whole cascade and leaves already-delivered
//! signals in place. There is no cycle detection by default: a loop in the
//! graph runs until one of its nodes stops signalling. The opt-in cycle guard
//! on [`LangInstance`] reports a link crossed twice in one wave as
//! [`LangError::CycleDetected`].

pub mod behavior;
pub mod document;
pub mod error;
pub mod graph;
pub mod instance;
pub mod link;
pub mod log;
pub mod node;
pub mod nodes;
pub mod registry;
pub mod signal;
pub mod spot;

pub use behavior::{LangNode, LoadContext, SignalContext};
pub use document::{GraphDocument, LinkRecord, NodeRecord, SpotAddress, DOCUMENT_VERSION};
pub use error::{GraphError, LangError, PersistError};
pub use graph::Graph;
pub use instance::{InstanceId, InstanceState, LangInstance};
pub use link::{Link, LinkId};
pub use log::{LogLevel, LogSink, TracingSink};
pub use node::{Node, NodeKey};
pub use nodes::builtin_registry;
pub use registry::{NodeRegistry, NodeTypeInfo, NodeTypeKey};
pub use signal::{ObjectHandle, SignalValue};
pub use spot::{Arity, Spot, SpotCategory, SpotDecl, SpotDirection, SpotRef};
