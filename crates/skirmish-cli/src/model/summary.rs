use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skirmish_training::config::EvolutionConfig;

/// What a finished training run reports about itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrainingSummary {
    pub trained_at: DateTime<Utc>,
    pub final_fitness: f64,
    pub generations: usize,
    pub config: EvolutionConfig,
    pub params: BTreeMap<String, f64>,
}
