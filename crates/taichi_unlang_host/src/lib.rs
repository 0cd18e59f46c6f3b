// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host side of UNLang: everything the graph core leaves to its embedder.
//!
//! - [`settings`]: RON host configuration
//! - [`logging`]: `tracing` subscriber bootstrap
//! - [`driver`]: loads a graph, begins it once and ticks it from a single loop
//! - [`inspect`]: read-only text view of a graph's nodes, spots and links

pub mod driver;
pub mod error;
pub mod inspect;
pub mod logging;
pub mod settings;

pub use driver::{HostLoop, RunReport};
pub use error::HostError;
pub use settings::HostSettings;
