//! centrality-core: betweenness centrality over dense, id-mapped graph views.
//!
//! A pure Rust library. Graphs are addressed by dense mapped ids produced by
//! [`IdMap`]; the engine only consumes the [`TraversalGraph`] capability, so
//! any store that can enumerate nodes and outgoing edges can be plugged in.
//! [`Graph`] is the in-memory implementation used for tests and benchmarks.

mod betweenness;
mod config;
mod error;
pub mod generators;
mod graph;
mod ids;
mod path;

pub use betweenness::{betweenness_centrality, BetweennessCentrality, CentralityResult};
pub use config::{BetweennessConfig, Normalization};
pub use error::{GraphError, Result};
pub use graph::{Edge, EdgeRecord, Graph, GraphBuilder, RelationId, TraversalGraph};
pub use ids::{ExternalId, IdMap, MappedId};
pub use path::{Path, PredecessorPaths};
