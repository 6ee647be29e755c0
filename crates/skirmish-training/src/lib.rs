//! Evolutionary training of agent policy parameters.
//!
//! This crate evolves a fixed-shape vector of bounded real parameters that drives a reactive
//! agent's decision policy. It knows nothing about the simulation the agent lives in: every
//! episode is played through the [`EpisodeRunner`](evaluator::EpisodeRunner) trait.
//!
//! # How Training Works
//!
//! 1. **Population** - Sample `population_size` parameter vectors uniformly within their domains
//! 2. **Evaluation** - Each individual plays `episode_count` episodes; fitness is the mean
//! 3. **Best Record** - A strictly better individual replaces the run-wide best and is persisted
//! 4. **Selection** - The above-median half of the population forms the breeding pool
//! 5. **Reproduction** - Elites are copied, the rest are blended from two parents and mutated
//! 6. **Repeat** - Continue for `generations_limit` generations
//!
//! # Architecture
//!
//! ```text
//! EvolutionEngine
//!     ↓ owns
//! Population (ParameterVector × population_size)
//!     ↓ scored by
//! Evaluator ──→ EpisodeRunner (simulation)
//!     ↓ produces
//! ScoredIndividual ──→ BestRecord ──→ BestSolutionStore
//!     ↓ ranked by
//! SelectionStrategy
//!     ↓ breeding pool
//! Reproducer
//!     ↓ next
//! Population
//! ```
//!
//! # Modules
//!
//! - [`params`] - Parameter domains and the [`ParameterVector`](params::ParameterVector) type
//! - [`evaluator`] - Episode fitness and averaging
//! - [`selection`] - Ranking and truncation selection
//! - [`reproducer`] - Blend crossover, uniform mutation and elitism
//! - [`population`] - Populations, the best record and fitness/diversity summaries
//! - [`engine`] - The generation state machine
//! - [`store`] - Durable best-record storage
//! - [`training_log`] - CSV log of every evaluated individual
//! - [`config`] - Run configuration
//! - [`error`] - Error types
//!
//! # Determinism
//!
//! All randomness comes from the RNG handed to the engine. With a seeded RNG and a
//! deterministic episode runner, a run is reproducible bit-for-bit. Evaluation is strictly
//! sequential.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rand::SeedableRng as _;
//! use skirmish_training::{
//!     config::EvolutionConfig,
//!     engine::EvolutionEngine,
//!     evaluator::EpisodeOutcome,
//!     params::{DomainTable, ParameterVector},
//! };
//!
//! let domains = Arc::new(DomainTable::new([("aim", 0.0, 1.0)]).unwrap());
//! let config = EvolutionConfig {
//!     population_size: 8,
//!     generations_limit: 5,
//!     episode_count: 1,
//!     ..EvolutionConfig::default()
//! };
//! let rng = rand::rngs::StdRng::seed_from_u64(0);
//! let mut engine = EvolutionEngine::new(config, domains, rng).unwrap();
//!
//! let mut runner = |params: &ParameterVector| -> Option<EpisodeOutcome> {
//!     Some(EpisodeOutcome {
//!         raw_score: params.get("aim")?,
//!         eliminated_enemy_count: 0,
//!         survived: true,
//!     })
//! };
//! let best = engine.run(&mut runner).unwrap();
//! assert!(best.is_within_domains());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod params;
pub mod population;
pub mod reproducer;
pub mod selection;
pub mod store;
pub mod training_log;
