use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Instant;

use centrality_core::{
    BetweennessCentrality, BetweennessConfig, CentralityResult, Graph, GraphBuilder, Normalization,
};
use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Run every generator (default)
    All,
    /// Fractal branching tree (deep paths)
    Lsystem,
    /// Preferential attachment via edge sampling (hub-and-spoke)
    Scalefree,
    /// Watts-Strogatz ring lattice + shortcuts
    Smallworld,
    /// Erdos-Renyi uniform random edges
    Random,
    /// Two dense cliques connected by a thin bridge
    Barbell,
    /// Diffusion-limited aggregation (organic branching)
    Dla,
}

/// Time a full betweenness computation over synthetic graphs.
#[derive(Debug, Parser)]
#[command(name = "centrality-bench")]
struct Args {
    #[arg(value_enum, default_value = "all")]
    mode: Mode,

    /// Target node count per generated graph. Cost grows with nodes x edges.
    #[arg(long, default_value_t = 2_000)]
    nodes: u64,

    /// Scale scores by 1 / ((n-1)(n-2)).
    #[arg(long)]
    normalize: bool,

    /// JSON engine configuration; `--normalize` overrides its normalization.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit one JSON document per graph instead of a table.
    #[arg(long)]
    json: bool,

    /// Number of highest-scoring nodes to report.
    #[arg(long, default_value_t = 5)]
    top: usize,
}

type Generator = fn(u64) -> Graph;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            std::process::exit(2);
        }
    };

    let generators: Vec<(&str, Generator)> = match args.mode {
        Mode::Lsystem => vec![("L-system tree", gen_lsystem)],
        Mode::Scalefree => vec![("Scale-free (edge sampling)", gen_scale_free)],
        Mode::Smallworld => vec![("Small-world (Watts-Strogatz)", gen_small_world)],
        Mode::Random => vec![("Erdos-Renyi random", gen_random)],
        Mode::Barbell => vec![("Barbell (clique-bridge-clique)", gen_barbell)],
        Mode::Dla => vec![("DLA (organic branching)", gen_dla)],
        Mode::All => vec![
            ("L-system tree", gen_lsystem as Generator),
            ("Scale-free (edge sampling)", gen_scale_free),
            ("Small-world (Watts-Strogatz)", gen_small_world),
            ("Erdos-Renyi random", gen_random),
            ("Barbell (clique-bridge-clique)", gen_barbell),
            ("DLA (organic branching)", gen_dla),
        ],
    };

    if !args.json {
        println!("centrality-bench");
        println!("================");
        println!();
    }

    for (name, generator) in generators {
        if let Err(err) = run_benchmark(name, generator, &args, &config) {
            error!(generator = name, error = %err, "benchmark failed");
            std::process::exit(1);
        }
    }
}

fn load_config(args: &Args) -> Result<BetweennessConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => BetweennessConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => BetweennessConfig::default(),
    };
    if args.normalize {
        config.normalization = Normalization::Directed;
    }
    Ok(config)
}

fn run_benchmark(
    name: &str,
    generator: Generator,
    args: &Args,
    config: &BetweennessConfig,
) -> centrality_core::Result<()> {
    let t = Instant::now();
    let graph = generator(args.nodes);
    let gen_time = t.elapsed();
    info!(
        generator = name,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph generated"
    );

    let t = Instant::now();
    let mut engine = BetweennessCentrality::with_config(&graph, config.clone());
    engine.compute()?;
    let compute_time = t.elapsed();

    let mut top: Vec<CentralityResult> = engine.results().collect();
    top.sort_by(|a, b| {
        b.centrality
            .total_cmp(&a.centrality)
            .then(a.node_id.cmp(&b.node_id))
    });
    top.truncate(args.top);

    if args.json {
        let doc = serde_json::json!({
            "generator": name,
            "nodes": graph.node_count(),
            "edges": graph.edge_count(),
            "memory_bytes": graph.memory_usage(),
            "generate_ms": gen_time.as_secs_f64() * 1000.0,
            "compute_ms": compute_time.as_secs_f64() * 1000.0,
            "config": config,
            "top": top,
        });
        println!("{}", doc);
        return Ok(());
    }

    println!("--- {} ---", name);
    println!(
        "Generated in {:.2}s: {} nodes, {} edges, ~{:.1}MB",
        gen_time.as_secs_f64(),
        graph.node_count(),
        graph.edge_count(),
        graph.memory_usage() as f64 / 1_048_576.0
    );
    println!(
        "Betweenness over {} sources in {:.1}ms",
        engine.sources_processed(),
        compute_time.as_secs_f64() * 1000.0
    );
    println!();
    println!("{:>12} {:>16}", "node", "centrality");
    println!("{:->12} {:->16}", "", "");
    for result in &top {
        println!("{:>12} {:>16.4}", result.node_id, result.centrality);
    }
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// Generators: O(n) or O(n + edges), single-threaded, deterministic
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// L-system fractal tree: each node spawns three children.
///
/// Every root-to-leaf path is unique, so interior nodes score by subtree size.
fn gen_lsystem(node_count: u64) -> Graph {
    let mut graph = GraphBuilder::with_capacity(node_count as usize);
    let branching = 3u64;
    graph.add_node(0);

    let mut next_id: u64 = 1;
    let mut frontier: Vec<u64> = vec![0];

    while next_id < node_count && !frontier.is_empty() {
        let mut next_frontier = Vec::with_capacity(frontier.len() * branching as usize);
        for &parent in &frontier {
            for _ in 0..branching {
                if next_id >= node_count {
                    break;
                }
                let child = next_id;
                next_id += 1;
                graph.add_edge(parent, child);
                next_frontier.push(child);
            }
        }
        frontier = next_frontier;
    }

    graph.build()
}

/// Scale-free via edge-list sampling (O(edges), not O(n²)).
///
/// Preferential attachment by picking a random existing edge and connecting
/// to one of its endpoints. Nodes with more edges are more likely to be picked.
fn gen_scale_free(node_count: u64) -> Graph {
    let edges_per_node = 4u64;
    let mut graph = GraphBuilder::with_capacity(node_count as usize);
    let mut rng = FastRng::new(12345);

    let mut edge_endpoints: Vec<u64> = Vec::with_capacity((node_count * edges_per_node * 2) as usize);

    // Seed: small clique, both directions
    let seed = 5u64.min(node_count);
    for i in 0..seed {
        graph.add_node(i);
    }
    for i in 0..seed {
        for j in (i + 1)..seed {
            graph.add_edge(i, j);
            graph.add_edge(j, i);
            edge_endpoints.push(i);
            edge_endpoints.push(j);
        }
    }

    for new_node in seed..node_count {
        graph.add_node(new_node);
        let attach = edges_per_node.min(new_node);
        for _ in 0..attach {
            let idx = rng.next(edge_endpoints.len() as u64) as usize;
            let target = edge_endpoints[idx];
            if target != new_node {
                graph.add_edge(new_node, target);
                graph.add_edge(target, new_node);
                edge_endpoints.push(new_node);
                edge_endpoints.push(target);
            }
        }
    }

    graph.build()
}

/// Small-world (Watts-Strogatz): ring lattice + random rewiring.
fn gen_small_world(node_count: u64) -> Graph {
    let k = 4u64;
    let p = 0.05f64;
    let mut graph = GraphBuilder::with_capacity(node_count as usize);
    let mut rng = FastRng::new(67890);

    for i in 0..node_count {
        graph.add_node(i);
    }

    for i in 0..node_count {
        for j in 1..=k {
            let neighbor = (i + j) % node_count;
            if rng.next_f64() < p {
                let rewired = rng.next(node_count);
                if rewired != i {
                    graph.add_edge(i, rewired);
                } else {
                    graph.add_edge(i, neighbor);
                }
            } else {
                graph.add_edge(i, neighbor);
            }
        }
    }

    graph.build()
}

/// Erdos-Renyi: uniform random edges, ~5 per node.
fn gen_random(node_count: u64) -> Graph {
    let target_edges = node_count * 5;
    let mut graph = GraphBuilder::with_capacity(node_count as usize);
    let mut rng = FastRng::new(54321);

    for i in 0..node_count {
        graph.add_node(i);
    }

    for _ in 0..target_edges {
        let from = rng.next(node_count);
        let to = rng.next(node_count);
        if from != to {
            graph.add_edge(from, to);
        }
    }

    graph.build()
}

/// Barbell: two dense cliques joined by a directed chain of bridge nodes.
///
/// Every A → B shortest path runs through the whole bridge, which should
/// dominate the ranking.
fn gen_barbell(node_count: u64) -> Graph {
    let bridge_len = 10u64.min(node_count / 3);
    let clique_size = ((node_count - bridge_len) / 2).max(1);
    let mut graph = GraphBuilder::with_capacity(node_count as usize);
    let mut rng = FastRng::new(99999);

    for i in 0..clique_size {
        graph.add_node(i);
    }
    for i in 0..clique_size {
        for _ in 0..8u64.min(clique_size - 1) {
            let target = rng.next(clique_size);
            if target != i {
                graph.add_edge(i, target);
            }
        }
    }

    let bridge_start = clique_size;
    for i in 0..bridge_len {
        let id = bridge_start + i;
        if i == 0 {
            graph.add_edge(clique_size - 1, id);
        } else {
            graph.add_edge(id - 1, id);
        }
    }

    let b_start = bridge_start + bridge_len;
    for i in 0..clique_size {
        graph.add_node(b_start + i);
    }
    graph.add_edge(b_start.saturating_sub(1), b_start);

    for i in 0..clique_size {
        for _ in 0..8u64.min(clique_size - 1) {
            let target = rng.next(clique_size);
            if target != i {
                graph.add_edge(b_start + i, b_start + target);
            }
        }
    }

    graph.build()
}

/// DLA (Diffusion-Limited Aggregation): organic branching growth.
///
/// Each new node attaches to a random recent "surface" node, with occasional
/// long-range jumps that create loops.
fn gen_dla(node_count: u64) -> Graph {
    let mut graph = GraphBuilder::with_capacity(node_count as usize);
    let mut rng = FastRng::new(77777);

    graph.add_node(0);

    let surface_max = 1000usize;
    let mut surface: VecDeque<u64> = VecDeque::with_capacity(surface_max + 1);
    surface.push_back(0);

    for new_node in 1..node_count {
        let attach_to = surface[rng.next(surface.len() as u64) as usize];
        graph.add_edge(attach_to, new_node);
        graph.add_edge(new_node, attach_to);

        // 10% chance of a second connection (creates loops / shortcuts)
        if rng.next(10) == 0 && new_node > 1 {
            let other = rng.next(new_node);
            if other != attach_to {
                graph.add_edge(new_node, other);
            }
        }

        surface.push_back(new_node);
        if surface.len() > surface_max {
            surface.pop_front();
        }
    }

    graph.build()
}
