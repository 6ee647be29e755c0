//! Error types for the training system.
//!
//! Only two kinds of failure ever leave the training loop as `Err`:
//!
//! - [`InvalidConfiguration`] - engine parameters or domain tables that cannot describe a
//!   consistent run. These are fatal and are reported before any episode is played.
//! - [`PersistenceError`] - the best-record store or training log could not be written. The
//!   engine logs these and keeps going; they only surface directly when the caller uses a
//!   store by hand.
//!
//! Missing episode records and malformed stored records are not errors at all: the former
//! contribute zero fitness (see [`evaluator`](crate::evaluator)), the latter make
//! [`BestSolutionStore::load`](crate::store::BestSolutionStore::load) return `None`.

use std::{io, path::PathBuf};

/// Engine parameters or parameter domains that cannot describe a consistent run.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum InvalidConfiguration {
    #[display("population_size must be at least 1")]
    EmptyPopulation,
    #[display("elite_count ({elite_count}) exceeds population_size ({population_size})")]
    EliteExceedsPopulation {
        elite_count: usize,
        population_size: usize,
    },
    #[display("generations_limit must be at least 1")]
    NoGenerations,
    #[display("episode_count must be at least 1")]
    NoEpisodes,
    #[display("mutation_rate must be within [0, 1], got {mutation_rate}")]
    MutationRateOutOfRange { mutation_rate: f64 },
    #[display("mutation_step must be finite and non-negative, got {mutation_step}")]
    InvalidMutationStep { mutation_step: f64 },
    #[display("domain table must declare at least one parameter")]
    EmptyDomainTable,
    #[display("parameter '{name}' is declared more than once")]
    DuplicateParameter { name: String },
    #[display("parameter '{name}' has an invalid domain [{min}, {max}]")]
    InvalidDomain { name: String, min: f64, max: f64 },
    #[display("breeding pool is empty")]
    EmptyBreedingPool,
    #[display("cannot select from an empty scored population")]
    EmptyScoredPopulation,
}

/// Failure to write a durable record.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PersistenceError {
    #[display("I/O error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to encode record: {source}")]
    Encode { source: serde_json::Error },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
