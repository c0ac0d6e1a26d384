use crate::error::Result;
use crate::ids::{ExternalId, IdMap, MappedId};

/// Opaque relationship identifier. The unweighted engine never inspects it.
pub type RelationId = u64;

/// Read-only graph capability consumed by the centrality engine.
///
/// Node ids are dense mapped ids. Visitors return `Result` so either side can
/// abort an iteration; the first `Err` propagates out of the `for_each_*` call.
pub trait TraversalGraph {
    fn node_count(&self) -> usize;

    /// Invoke `visit` exactly once per mapped id in `[0, node_count)`.
    fn for_each_node<F>(&self, visit: F) -> Result<()>
    where
        F: FnMut(MappedId) -> Result<()>;

    /// Invoke `visit(source, target, relation)` once per outgoing edge of `node`.
    fn for_each_outgoing<F>(&self, node: MappedId, visit: F) -> Result<()>
    where
        F: FnMut(MappedId, MappedId, RelationId) -> Result<()>;

    fn to_external(&self, node: MappedId) -> ExternalId;
}

/// A directed edge in the adjacency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub target: MappedId,
    pub relation: RelationId,
}

/// Edge in external ids, the bulk-load format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRecord {
    pub from_id: ExternalId,
    pub to_id: ExternalId,
}

impl EdgeRecord {
    pub fn new(from_id: ExternalId, to_id: ExternalId) -> Self {
        Self { from_id, to_id }
    }
}

/// Frozen in-memory graph: outgoing adjacency lists addressed by mapped id.
#[derive(Debug, Clone)]
pub struct Graph {
    ids: IdMap,
    outgoing: Vec<Vec<Edge>>,
    edge_count: usize,
}

impl Graph {
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    /// Graph from a list of edges; nodes are created as they are first seen.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = EdgeRecord>,
    {
        let mut builder = GraphBuilder::new();
        builder.load_edges(edges);
        builder.build()
    }

    pub fn node_count(&self) -> usize {
        self.ids.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn ids(&self) -> &IdMap {
        &self.ids
    }

    /// Mapped id for an external id, if the node is present.
    pub fn lookup(&self, external: ExternalId) -> Option<MappedId> {
        self.ids.lookup(external)
    }

    pub fn neighbors_out(&self, node: MappedId) -> &[Edge] {
        self.outgoing
            .get(node as usize)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let lists = self.outgoing.capacity() * size_of::<Vec<Edge>>();
        let edges: usize = self
            .outgoing
            .iter()
            .map(|v| v.capacity() * size_of::<Edge>())
            .sum();
        self.ids.memory_usage() + lists + edges
    }
}

impl TraversalGraph for Graph {
    fn node_count(&self) -> usize {
        Graph::node_count(self)
    }

    fn for_each_node<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(MappedId) -> Result<()>,
    {
        for node in self.ids.nodes() {
            visit(node)?;
        }
        Ok(())
    }

    fn for_each_outgoing<F>(&self, node: MappedId, mut visit: F) -> Result<()>
    where
        F: FnMut(MappedId, MappedId, RelationId) -> Result<()>,
    {
        for edge in self.neighbors_out(node) {
            visit(node, edge.target, edge.relation)?;
        }
        Ok(())
    }

    fn to_external(&self, node: MappedId) -> ExternalId {
        self.ids.to_external(node)
    }
}

/// Accumulates nodes and edges, then freezes them into a [`Graph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    ids: IdMap,
    outgoing: Vec<Vec<Edge>>,
    next_relation: RelationId,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for a known graph size.
    pub fn with_capacity(node_count: usize) -> Self {
        Self {
            ids: IdMap::with_capacity(node_count),
            outgoing: Vec::with_capacity(node_count),
            next_relation: 0,
        }
    }

    /// Register a node. Adding an existing node is a no-op returning its id.
    pub fn add_node(&mut self, external: ExternalId) -> MappedId {
        let mapped = self.ids.map_or_get(external);
        if mapped as usize == self.outgoing.len() {
            self.outgoing.push(Vec::new());
        }
        mapped
    }

    /// Add a directed edge, registering either endpoint if unseen.
    pub fn add_edge(&mut self, from: ExternalId, to: ExternalId) -> RelationId {
        let source = self.add_node(from);
        let target = self.add_node(to);
        let relation = self.next_relation;
        self.next_relation += 1;
        self.outgoing[source as usize].push(Edge { target, relation });
        relation
    }

    /// Bulk load. This is the primary load path for callers holding an edge list.
    pub fn load_edges<I>(&mut self, edges: I)
    where
        I: IntoIterator<Item = EdgeRecord>,
    {
        for record in edges {
            self.add_edge(record.from_id, record.to_id);
        }
    }

    pub fn node_count(&self) -> usize {
        self.ids.size()
    }

    pub fn build(self) -> Graph {
        let GraphBuilder {
            mut ids,
            outgoing,
            next_relation,
        } = self;
        ids.finalize();
        Graph {
            ids,
            outgoing,
            edge_count: next_relation as usize,
        }
    }
}
