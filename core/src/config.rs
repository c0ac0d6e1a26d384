use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Scaling applied when results are projected. The accumulator stays raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    #[default]
    Raw,
    /// Divide by `(n-1)(n-2)`, the number of ordered pairs excluding the node.
    Directed,
}

impl Normalization {
    pub fn scale(self, node_count: usize) -> f64 {
        match self {
            Normalization::Raw => 1.0,
            Normalization::Directed if node_count > 2 => {
                1.0 / ((node_count - 1) * (node_count - 2)) as f64
            }
            Normalization::Directed => 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BetweennessConfig {
    pub normalization: Normalization,
    /// Log progress every N completed source passes. `None` disables.
    pub progress_interval: Option<usize>,
}

impl BetweennessConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
