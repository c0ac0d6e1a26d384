//! Brandes betweenness centrality for unweighted, directed graphs.
//!
//! For every source node the engine runs one breadth-first pass that counts
//! shortest paths (`sigma`) and records shortest-path predecessors, then
//! walks the visitation order backwards accumulating dependencies (`delta`)
//! into the persistent centrality array.
//!
//! The centrality array is never re-zeroed between sources or between calls
//! to [`BetweennessCentrality::compute`]. Use a fresh engine or
//! [`BetweennessCentrality::reset`] for an independent computation.

use std::collections::VecDeque;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::config::BetweennessConfig;
use crate::error::{GraphError, Result};
use crate::graph::TraversalGraph;
use crate::ids::{ExternalId, MappedId};
use crate::path::PredecessorPaths;

/// Distance of a node not yet reached in the current pass.
const UNVISITED: u32 = u32::MAX;

/// First-in-first-out work list for the forward pass.
///
/// Only `enqueue` (back) and `dequeue` (front) are exposed; popping from the
/// back would break the distance layering the backward pass depends on.
#[derive(Debug, Default)]
struct NodeQueue {
    inner: VecDeque<MappedId>,
}

impl NodeQueue {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: VecDeque::with_capacity(capacity),
        }
    }

    #[inline]
    fn enqueue(&mut self, node: MappedId) {
        self.inner.push_back(node);
    }

    #[inline]
    fn dequeue(&mut self) -> Option<MappedId> {
        self.inner.pop_front()
    }

    fn clear(&mut self) {
        self.inner.clear();
    }
}

/// Centrality of a single node, labelled with its external id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CentralityResult {
    pub node_id: ExternalId,
    pub centrality: f64,
}

pub struct BetweennessCentrality<'g, G> {
    graph: &'g G,
    config: BetweennessConfig,
    centrality: Vec<f64>,
    sigma: Vec<f64>,
    delta: Vec<f64>,
    distance: Vec<u32>,
    paths: PredecessorPaths,
    stack: Vec<MappedId>,
    queue: NodeQueue,
    sources_processed: usize,
}

impl<'g, G: TraversalGraph> BetweennessCentrality<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self::with_config(graph, BetweennessConfig::default())
    }

    pub fn with_config(graph: &'g G, config: BetweennessConfig) -> Self {
        let n = graph.node_count();
        Self {
            graph,
            config,
            centrality: vec![0.0; n],
            sigma: vec![0.0; n],
            delta: vec![0.0; n],
            distance: vec![UNVISITED; n],
            paths: PredecessorPaths::new(n),
            stack: Vec::with_capacity(n),
            queue: NodeQueue::with_capacity(n),
            sources_processed: 0,
        }
    }

    pub fn config(&self) -> &BetweennessConfig {
        &self.config
    }

    /// Run one forward and one backward pass per node of the graph.
    ///
    /// On error the centrality array holds a partial sum and must be discarded.
    pub fn compute(&mut self) -> Result<&mut Self> {
        let graph = self.graph;
        let node_count = self.centrality.len();
        let progress_interval = self.config.progress_interval.filter(|&n| n > 0);
        debug!(node_count, "betweenness: starting computation");

        let start = Instant::now();
        let mut completed = 0usize;
        let outcome = graph.for_each_node(|source| {
            self.compute_source(source)?;
            completed += 1;
            if let Some(every) = progress_interval {
                if completed % every == 0 {
                    info!(completed, node_count, "betweenness: progress");
                }
            }
            Ok(())
        });

        if let Err(err) = outcome {
            warn!(error = %err, completed, "betweenness: computation aborted");
            return Err(err);
        }

        info!(
            node_count,
            sources = completed,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "betweenness: computation finished"
        );
        Ok(self)
    }

    /// Zero the centrality accumulator.
    pub fn reset(&mut self) {
        self.centrality.fill(0.0);
        self.sources_processed = 0;
    }

    /// Number of source passes completed over the lifetime of this engine.
    pub fn sources_processed(&self) -> usize {
        self.sources_processed
    }

    /// Raw (unnormalized) accumulator, indexed by mapped id.
    pub fn centrality(&self) -> &[f64] {
        &self.centrality
    }

    /// Visit `(external id, centrality)` in descending mapped-id order until
    /// `consumer` returns `false`.
    pub fn for_each<F>(&self, mut consumer: F)
    where
        F: FnMut(ExternalId, f64) -> bool,
    {
        let scale = self.scale();
        for node in (0..self.centrality.len()).rev() {
            let value = self.centrality[node] * scale;
            if !consumer(self.graph.to_external(node as MappedId), value) {
                return;
            }
        }
    }

    /// Results in ascending mapped-id order. Borrowing; may be called repeatedly.
    pub fn results(&self) -> impl Iterator<Item = CentralityResult> + '_ {
        let scale = self.scale();
        self.centrality
            .iter()
            .enumerate()
            .map(move |(node, &value)| CentralityResult {
                node_id: self.graph.to_external(node as MappedId),
                centrality: value * scale,
            })
    }

    fn scale(&self) -> f64 {
        self.config.normalization.scale(self.centrality.len())
    }

    fn compute_source(&mut self, source: MappedId) -> Result<()> {
        let node_count = self.centrality.len();
        if source as usize >= node_count {
            return Err(GraphError::NodeOutOfRange {
                node: source,
                node_count,
            });
        }
        self.reset_pass(source);
        let reached = self.forward(source)?;
        self.backward(source);
        self.sources_processed += 1;
        trace!(source, reached, "betweenness: source pass done");
        Ok(())
    }

    /// Clear all per-pass scratch state and seed the queue with `source`.
    fn reset_pass(&mut self, source: MappedId) {
        self.paths.clear_all();
        self.stack.clear();
        self.queue.clear();
        self.sigma.fill(0.0);
        self.delta.fill(0.0);
        self.distance.fill(UNVISITED);

        self.sigma[source as usize] = 1.0;
        self.distance[source as usize] = 0;
        self.queue.enqueue(source);
    }

    /// Breadth-first shortest-path discovery. Returns the number of nodes reached.
    fn forward(&mut self, source: MappedId) -> Result<usize> {
        let graph = self.graph;
        let node_count = self.distance.len();
        let Self {
            queue,
            stack,
            distance,
            sigma,
            paths,
            ..
        } = self;

        while let Some(v) = queue.dequeue() {
            stack.push(v);
            let next = distance[v as usize] + 1;
            let sigma_v = sigma[v as usize];

            graph.for_each_outgoing(v, |_, target, _| {
                let t = target as usize;
                if t >= node_count {
                    return Err(GraphError::TargetOutOfRange {
                        node: v,
                        target,
                        node_count,
                    });
                }
                if distance[t] == UNVISITED {
                    queue.enqueue(target);
                    distance[t] = next;
                }
                // also taken for the edge that just discovered `target`
                if distance[t] == next {
                    sigma[t] += sigma_v;
                    paths.append(target, v);
                }
                Ok(())
            })?;
        }

        debug_assert_eq!(sigma[source as usize], 1.0);
        Ok(stack.len())
    }

    /// Dependency accumulation in reverse visitation order (farthest first).
    fn backward(&mut self, source: MappedId) {
        let Self {
            stack,
            paths,
            sigma,
            delta,
            centrality,
            ..
        } = self;

        while let Some(w) = stack.pop() {
            let wi = w as usize;
            let sigma_w = sigma[wi];
            let carried = 1.0 + delta[wi];
            for &v in paths.get(w).as_slice() {
                let vi = v as usize;
                delta[vi] += sigma[vi] / sigma_w * carried;
            }
            // once per node, never per predecessor
            if w != source {
                centrality[wi] += delta[wi];
            }
        }
    }
}

/// Compute raw betweenness for every node of `graph`, ascending mapped-id order.
pub fn betweenness_centrality<G: TraversalGraph>(graph: &G) -> Result<Vec<CentralityResult>> {
    let mut engine = BetweennessCentrality::new(graph);
    engine.compute()?;
    Ok(engine.results().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Normalization;
    use crate::generators;
    use crate::graph::{EdgeRecord, Graph, RelationId};

    const EPS: f64 = 1e-9;

    fn make_graph(edges: &[(u64, u64)]) -> Graph {
        Graph::from_edges(edges.iter().map(|&(a, b)| EdgeRecord::new(a, b)))
    }

    /// Centrality keyed by external id.
    fn score(graph: &Graph, engine: &BetweennessCentrality<'_, Graph>, external: u64) -> f64 {
        engine.centrality()[graph.lookup(external).unwrap() as usize]
    }

    fn computed(graph: &Graph) -> BetweennessCentrality<'_, Graph> {
        let mut engine = BetweennessCentrality::new(graph);
        engine.compute().unwrap();
        engine
    }

    // --- basic shapes ---

    #[test]
    fn test_single_isolated_node() {
        let mut b = Graph::builder();
        b.add_node(77);
        let g = b.build();
        let engine = computed(&g);
        assert_eq!(engine.centrality(), &[0.0]);
        assert_eq!(engine.sources_processed(), 1);
    }

    #[test]
    fn test_empty_graph() {
        let g = Graph::builder().build();
        let engine = computed(&g);
        assert!(engine.centrality().is_empty());
        assert_eq!(engine.results().count(), 0);
    }

    #[test]
    fn test_path_middle_is_one() {
        let g = generators::chain(3, 0);
        let engine = computed(&g);
        assert_eq!(score(&g, &engine, 0), 0.0);
        assert_eq!(score(&g, &engine, 1), 1.0);
        assert_eq!(score(&g, &engine, 2), 0.0);
    }

    #[test]
    fn test_longer_chain() {
        // 0→1→2→3: node 1 carries (0,2),(0,3); node 2 carries (0,3),(1,3)
        let g = generators::chain(4, 0);
        let engine = computed(&g);
        assert_eq!(engine.centrality(), &[0.0, 2.0, 2.0, 0.0]);
    }

    #[test]
    fn test_directed_ring_is_uniform() {
        for n in [5usize, 8] {
            let g = generators::ring(n, 1000).unwrap();
            let engine = computed(&g);
            let values = engine.centrality();
            let max = values.iter().cloned().fold(f64::MIN, f64::max);
            let min = values.iter().cloned().fold(f64::MAX, f64::min);
            assert!(max - min < EPS, "ring {} spread {}", n, max - min);
            let expected = ((n - 1) * (n - 2)) as f64 / 2.0;
            assert!((max - expected).abs() < EPS, "ring {}: {} vs {}", n, max, expected);
        }
    }

    #[test]
    fn test_star_hub_carries_nothing_outgoing_only() {
        // hub → leaves: no pair has an intermediate node
        let g = generators::star(10, 0);
        let engine = computed(&g);
        assert!(engine.centrality().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_two_rings_center_is_highest() {
        let g = generators::two_rings_through_center(5, 0).unwrap();
        let engine = computed(&g);
        let center = score(&g, &engine, 0);
        for node in 1..=10u64 {
            assert!(center > score(&g, &engine, node), "node {} >= center", node);
        }
    }

    #[test]
    fn test_self_loop_ignored() {
        let g = make_graph(&[(0, 0), (0, 1), (1, 2)]);
        let engine = computed(&g);
        assert_eq!(score(&g, &engine, 1), 1.0);
        assert_eq!(score(&g, &engine, 0), 0.0);
    }

    #[test]
    fn test_parallel_edges_count_as_distinct_paths() {
        // two parallel a→b edges double sigma[b] but leave the ratio unchanged
        let g = make_graph(&[(0, 1), (0, 1), (1, 2)]);
        let engine = computed(&g);
        assert_eq!(score(&g, &engine, 1), 1.0);
    }

    // --- pass invariants ---

    #[test]
    fn test_sigma_source_is_one_after_reset() {
        let graphs = vec![
            generators::diamond(0),
            generators::ring(5, 0).unwrap(),
            generators::two_rings_through_center(3, 50).unwrap(),
        ];
        for g in &graphs {
            let mut engine = BetweennessCentrality::new(g);
            for source in g.ids().nodes() {
                engine.reset_pass(source);
                assert_eq!(engine.sigma[source as usize], 1.0);
                assert_eq!(engine.distance[source as usize], 0);
                let others_zero = engine
                    .sigma
                    .iter()
                    .enumerate()
                    .all(|(i, &s)| i == source as usize || s == 0.0);
                assert!(others_zero);
                engine.forward(source).unwrap();
                engine.backward(source);
            }
        }
    }

    #[test]
    fn test_sigma_counts_shortest_paths_in_diamond() {
        let g = generators::diamond(10);
        let mut engine = BetweennessCentrality::new(&g);
        let s = g.lookup(10).unwrap();
        let t = g.lookup(13).unwrap();
        engine.reset_pass(s);
        let reached = engine.forward(s).unwrap();
        assert_eq!(reached, 4);
        assert_eq!(engine.sigma[t as usize], 2.0);
        assert_eq!(engine.distance[t as usize], 2);
        assert_eq!(engine.paths.get(t).len(), 2);
        assert_eq!(engine.sigma[g.lookup(11).unwrap() as usize], 1.0);
    }

    #[test]
    fn test_sigma_counts_merging_layers() {
        // 0 fans out to 1,2,3 which all reach 4; 4 fans to 5,6 which reach 7
        let g = make_graph(&[
            (0, 1), (0, 2), (0, 3),
            (1, 4), (2, 4), (3, 4),
            (4, 5), (4, 6),
            (5, 7), (6, 7),
        ]);
        let mut engine = BetweennessCentrality::new(&g);
        let s = g.lookup(0).unwrap();
        engine.reset_pass(s);
        engine.forward(s).unwrap();
        assert_eq!(engine.sigma[g.lookup(4).unwrap() as usize], 3.0);
        assert_eq!(engine.sigma[g.lookup(7).unwrap() as usize], 6.0);
    }

    #[test]
    fn test_unreachable_nodes_stay_unvisited() {
        let g = make_graph(&[(0, 1), (2, 3)]);
        let mut engine = BetweennessCentrality::new(&g);
        engine.reset_pass(0);
        assert_eq!(engine.forward(0).unwrap(), 2);
        assert_eq!(engine.distance[2], UNVISITED);
        assert_eq!(engine.sigma[3], 0.0);
    }

    // --- regressions ---

    #[test]
    fn test_diamond_single_accumulation_per_node() {
        // s→a, s→b, a→t, b→t, t→u: t has two predecessors and nonzero delta
        let g = make_graph(&[(0, 1), (0, 2), (1, 3), (2, 3), (3, 4)]);
        let engine = computed(&g);
        assert!((score(&g, &engine, 1) - 1.0).abs() < EPS);
        assert!((score(&g, &engine, 2) - 1.0).abs() < EPS);
        assert!((score(&g, &engine, 3) - 3.0).abs() < EPS);
        assert_eq!(score(&g, &engine, 0), 0.0);
        assert_eq!(score(&g, &engine, 4), 0.0);
    }

    #[test]
    fn test_plain_diamond_splits_credit() {
        let g = generators::diamond(0);
        let engine = computed(&g);
        assert_eq!(engine.centrality(), &[0.0, 0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_fifo_distance_layering() {
        // s→a, s→b, b→c, c→e, a→e. A LIFO work list reaches e through b,c at
        // distance 3 instead of through a at distance 2.
        let g = make_graph(&[(0, 1), (0, 2), (2, 3), (3, 4), (1, 4)]);
        let mut engine = BetweennessCentrality::new(&g);
        engine.reset_pass(0);
        engine.forward(0).unwrap();
        assert_eq!(engine.distance[4], 2);
        assert_eq!(engine.paths.get(4).as_slice(), &[1]);

        let engine = computed(&g);
        assert_eq!(engine.centrality(), &[0.0, 1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_undirected_style_edges() {
        // both directions of 0-1-2: 1 carries (0,2) and (2,0)
        let g = make_graph(&[(0, 1), (1, 0), (1, 2), (2, 1)]);
        let engine = computed(&g);
        assert_eq!(score(&g, &engine, 1), 2.0);
    }

    // --- repeated computation ---

    #[test]
    fn test_fresh_engines_bit_identical() {
        let g = generators::two_rings_through_center(6, 3).unwrap();
        let first: Vec<u64> = computed(&g).centrality().iter().map(|c| c.to_bits()).collect();
        let second: Vec<u64> = computed(&g).centrality().iter().map(|c| c.to_bits()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_then_recompute_bit_identical() {
        let g = make_graph(&[(0, 1), (0, 2), (1, 3), (2, 3), (3, 4), (4, 0)]);
        let mut engine = BetweennessCentrality::new(&g);
        engine.compute().unwrap();
        let first: Vec<u64> = engine.centrality().iter().map(|c| c.to_bits()).collect();
        engine.reset();
        engine.compute().unwrap();
        let second: Vec<u64> = engine.centrality().iter().map(|c| c.to_bits()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_stale_engine_accumulates() {
        let g = generators::ring(5, 0).unwrap();
        let mut engine = BetweennessCentrality::new(&g);
        engine.compute().unwrap();
        engine.compute().unwrap();
        assert_eq!(engine.sources_processed(), 10);
        assert!(engine.centrality().iter().all(|&c| (c - 12.0).abs() < EPS));
    }

    // --- result contracts ---

    #[test]
    fn test_for_each_descending_with_external_ids() {
        let g = generators::chain(3, 40);
        let engine = computed(&g);
        let mut seen = Vec::new();
        engine.for_each(|id, value| {
            seen.push((id, value));
            true
        });
        assert_eq!(seen, vec![(42, 0.0), (41, 1.0), (40, 0.0)]);
    }

    #[test]
    fn test_for_each_early_stop() {
        let g = generators::ring(8, 0).unwrap();
        let engine = computed(&g);
        let mut calls = 0;
        engine.for_each(|_, _| {
            calls += 1;
            calls < 3
        });
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_results_ascending_and_repeatable() {
        let g = generators::chain(3, 40);
        let engine = computed(&g);
        let first: Vec<_> = engine.results().collect();
        let second: Vec<_> = engine.results().collect();
        assert_eq!(first, second);
        let ids: Vec<u64> = first.iter().map(|r| r.node_id).collect();
        assert_eq!(ids, vec![40, 41, 42]);
    }

    #[test]
    fn test_push_and_pull_same_multiset() {
        let g = generators::two_rings_through_center(4, 900).unwrap();
        let engine = computed(&g);
        let mut pushed = Vec::new();
        engine.for_each(|id, value| {
            pushed.push((id, value.to_bits()));
            true
        });
        let mut pulled: Vec<_> = engine
            .results()
            .map(|r| (r.node_id, r.centrality.to_bits()))
            .collect();
        pushed.sort_unstable();
        pulled.sort_unstable();
        assert_eq!(pushed, pulled);
    }

    #[test]
    fn test_directed_normalization_only_scales_projection() {
        let g = generators::ring(5, 0).unwrap();
        let config = BetweennessConfig {
            normalization: Normalization::Directed,
            progress_interval: Some(2),
        };
        let mut engine = BetweennessCentrality::with_config(&g, config);
        engine.compute().unwrap();
        // raw 6.0 over (4 * 3) ordered pairs
        assert!(engine.centrality().iter().all(|&c| (c - 6.0).abs() < EPS));
        assert!(engine.results().all(|r| (r.centrality - 0.5).abs() < EPS));
    }

    #[test]
    fn test_free_function_matches_engine() {
        let g = generators::diamond(0);
        let results = betweenness_centrality(&g).unwrap();
        let values: Vec<f64> = results.iter().map(|r| r.centrality).collect();
        assert_eq!(values, vec![0.0, 0.5, 0.5, 0.0]);
    }

    // --- faults from the graph view ---

    /// Graph view whose adjacency may point past `node_count` or fail outright.
    struct BrokenGraph {
        node_count: usize,
        edges: Vec<(MappedId, MappedId)>,
        fail_on: Option<MappedId>,
    }

    impl TraversalGraph for BrokenGraph {
        fn node_count(&self) -> usize {
            self.node_count
        }

        fn for_each_node<F>(&self, mut visit: F) -> Result<()>
        where
            F: FnMut(MappedId) -> Result<()>,
        {
            for node in 0..self.node_count as MappedId {
                visit(node)?;
            }
            Ok(())
        }

        fn for_each_outgoing<F>(&self, node: MappedId, mut visit: F) -> Result<()>
        where
            F: FnMut(MappedId, MappedId, RelationId) -> Result<()>,
        {
            if self.fail_on == Some(node) {
                return Err(GraphError::Capability(format!("node {} vanished", node)));
            }
            for (i, &(from, to)) in self.edges.iter().enumerate() {
                if from == node {
                    visit(from, to, i as RelationId)?;
                }
            }
            Ok(())
        }

        fn to_external(&self, node: MappedId) -> ExternalId {
            node as ExternalId
        }
    }

    #[test]
    fn test_target_out_of_range_aborts() {
        let g = BrokenGraph {
            node_count: 2,
            edges: vec![(0, 1), (1, 5)],
            fail_on: None,
        };
        let mut engine = BetweennessCentrality::new(&g);
        let err = engine.compute().err().unwrap();
        assert!(matches!(
            err,
            GraphError::TargetOutOfRange {
                node: 1,
                target: 5,
                node_count: 2
            }
        ));
        assert_eq!(engine.sources_processed(), 0);
    }

    #[test]
    fn test_capability_failure_propagates() {
        let g = BrokenGraph {
            node_count: 3,
            edges: vec![(0, 1), (1, 2)],
            fail_on: Some(2),
        };
        let mut engine = BetweennessCentrality::new(&g);
        assert!(matches!(engine.compute(), Err(GraphError::Capability(_))));
    }

    #[test]
    fn test_node_out_of_range_from_enumeration() {
        struct Overcounting;
        impl TraversalGraph for Overcounting {
            fn node_count(&self) -> usize {
                1
            }
            fn for_each_node<F>(&self, mut visit: F) -> Result<()>
            where
                F: FnMut(MappedId) -> Result<()>,
            {
                visit(0)?;
                visit(1)
            }
            fn for_each_outgoing<F>(&self, _node: MappedId, _visit: F) -> Result<()>
            where
                F: FnMut(MappedId, MappedId, RelationId) -> Result<()>,
            {
                Ok(())
            }
            fn to_external(&self, node: MappedId) -> ExternalId {
                node as ExternalId
            }
        }

        let g = Overcounting;
        let mut engine = BetweennessCentrality::new(&g);
        assert!(matches!(
            engine.compute(),
            Err(GraphError::NodeOutOfRange { node: 1, node_count: 1 })
        ));
        assert_eq!(engine.sources_processed(), 1);
    }
}
