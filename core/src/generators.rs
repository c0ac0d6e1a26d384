//! Deterministic fixture graphs with well-known centrality structure.
//!
//! External ids are `offset + i` so callers can exercise sparse id spaces.

use crate::error::{GraphError, Result};
use crate::graph::{EdgeRecord, Graph, GraphBuilder};
use crate::ids::ExternalId;

/// Directed cycle `offset → offset+1 → … → offset+size-1 → offset`.
pub fn ring(size: usize, offset: ExternalId) -> Result<Graph> {
    if size < 2 {
        return Err(GraphError::InvalidFixture(format!(
            "ring size must be >= 2, got {}",
            size
        )));
    }
    let mut builder = GraphBuilder::with_capacity(size);
    add_ring(&mut builder, size as u64, offset);
    Ok(builder.build())
}

/// Directed path of `len` nodes.
pub fn chain(len: usize, offset: ExternalId) -> Graph {
    let mut builder = GraphBuilder::with_capacity(len);
    if len > 0 {
        builder.add_node(offset);
    }
    builder.load_edges((1..len as u64).map(|i| EdgeRecord::new(offset + i - 1, offset + i)));
    builder.build()
}

/// Hub `offset` with edges to `leaves` leaf nodes.
pub fn star(leaves: usize, offset: ExternalId) -> Graph {
    let mut builder = GraphBuilder::with_capacity(leaves + 1);
    builder.add_node(offset);
    builder.load_edges((1..=leaves as u64).map(|i| EdgeRecord::new(offset, offset + i)));
    builder.build()
}

/// `s → a, s → b, a → t, b → t` with ids `offset..offset+4` in that order.
pub fn diamond(offset: ExternalId) -> Graph {
    let (s, a, b, t) = (offset, offset + 1, offset + 2, offset + 3);
    Graph::from_edges([
        EdgeRecord::new(s, a),
        EdgeRecord::new(s, b),
        EdgeRecord::new(a, t),
        EdgeRecord::new(b, t),
    ])
}

/// Two directed rings joined through a center node.
///
/// Every node of ring A points at the center and the center points at every
/// node of ring B, so the center carries every A → B shortest path.
/// Ids: center = `offset`, ring A = `offset+1 ..= offset+size`, ring B follows.
pub fn two_rings_through_center(size: usize, offset: ExternalId) -> Result<Graph> {
    if size < 2 {
        return Err(GraphError::InvalidFixture(format!(
            "ring size must be >= 2, got {}",
            size
        )));
    }
    let size = size as u64;
    let center = offset;
    let ring_a = offset + 1;
    let ring_b = ring_a + size;

    let mut builder = GraphBuilder::with_capacity(2 * size as usize + 1);
    builder.add_node(center);
    add_ring(&mut builder, size, ring_a);
    add_ring(&mut builder, size, ring_b);
    for i in 0..size {
        builder.add_edge(ring_a + i, center);
        builder.add_edge(center, ring_b + i);
    }
    Ok(builder.build())
}

fn add_ring(builder: &mut GraphBuilder, size: u64, offset: ExternalId) {
    for i in 0..size {
        builder.add_edge(offset + i, offset + (i + 1) % size);
    }
}
