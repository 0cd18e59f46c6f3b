// SPDX-License-Identifier: MIT OR Apache-2.0
//! Read-only text view of a graph.

use std::fmt;
use taichi_unlang::{Arity, Graph, SpotDirection, SpotRef};

/// Render nodes, their spots and where each link leads
pub fn describe(graph: &Graph) -> String {
    GraphListing(graph).to_string()
}

/// Text listing of a graph, one node per block
pub struct GraphListing<'a>(pub &'a Graph);

impl fmt::Display for GraphListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.0;
        writeln!(
            f,
            "graph \"{}\": {} nodes, {} links",
            graph.name,
            graph.node_count(),
            graph.link_count()
        )?;

        for node in graph.nodes() {
            writeln!(f, "{} [{}] {}", node.id, node.type_key, node.tag)?;

            for (index, spot) in node.spots().enumerate() {
                let direction = match spot.direction {
                    SpotDirection::In => "in ",
                    SpotDirection::Out => "out",
                };
                let arity = match spot.arity {
                    Arity::Unbounded => "*".to_string(),
                    Arity::AtMost(n) => n.to_string(),
                };
                writeln!(
                    f,
                    "  {direction} {}: {} ({}/{arity})",
                    spot.id,
                    spot.category,
                    spot.link_count()
                )?;

                let here = SpotRef::new(node.key(), index);
                for &id in spot.links() {
                    let Some(other) = graph
                        .get_link(id)
                        .and_then(|link| link.linked_spot(here).ok())
                    else {
                        continue;
                    };
                    writeln!(f, "      -> {} ({id})", address(graph, other))?;
                }
            }
        }
        Ok(())
    }
}

fn address(graph: &Graph, spot: SpotRef) -> String {
    graph
        .node(spot.node)
        .and_then(|node| {
            let spot = node.get_at(spot.index).ok()?;
            Some(format!("{}.{}", node.id, spot.id))
        })
        .unwrap_or_else(|| spot.to_string())
}
