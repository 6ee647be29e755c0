//! Selection: ranking a scored population and choosing the breeding pool.
//!
//! # Truncation Selection
//!
//! [`TruncationSelection`] keeps the above-median half of the population as breeding
//! candidates. Ranking is by fitness, descending; individuals with equal fitness keep their
//! original order, so re-running with identical fitness values gives identical pools.
//!
//! The pool always contains the top `elite_count` individuals, even if `elite_count` is
//! larger than half the population:
//!
//! ```text
//! pool = ranked[..max(elite_count, max(population_size / 2, 1))]
//! ```
//!
//! Restricting breeding to the top half keeps selection pressure up; the explicit elite
//! slice keeps the best genetic material eligible in small populations where halving
//! would round it away.

use crate::{error::InvalidConfiguration, params::ParameterVector, population::ScoredIndividual};

/// Chooses breeding candidates from a scored population.
pub trait SelectionStrategy {
    /// Returns the breeding pool for the next generation.
    ///
    /// # Errors
    ///
    /// Fails if `scored` is empty or `elite_count` exceeds its length.
    fn select(
        &self,
        scored: &[ScoredIndividual],
        elite_count: usize,
    ) -> Result<Vec<ParameterVector>, InvalidConfiguration>;
}

/// Sorts individuals by fitness, best first. Ties keep their original order.
#[must_use]
pub fn rank(scored: &[ScoredIndividual]) -> Vec<&ScoredIndividual> {
    let mut ranked = scored.iter().collect::<Vec<_>>();
    // stable sort
    ranked.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
    ranked
}

/// Keeps the top half of the ranked population, elites always included.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruncationSelection;

impl TruncationSelection {
    /// Number of pool members for a population of `population_size`.
    #[must_use]
    pub fn pool_size(population_size: usize, elite_count: usize) -> usize {
        usize::max(elite_count, usize::max(population_size / 2, 1)).min(population_size)
    }
}

impl SelectionStrategy for TruncationSelection {
    fn select(
        &self,
        scored: &[ScoredIndividual],
        elite_count: usize,
    ) -> Result<Vec<ParameterVector>, InvalidConfiguration> {
        if scored.is_empty() {
            return Err(InvalidConfiguration::EmptyScoredPopulation);
        }
        if elite_count > scored.len() {
            return Err(InvalidConfiguration::EliteExceedsPopulation {
                elite_count,
                population_size: scored.len(),
            });
        }
        let pool_size = Self::pool_size(scored.len(), elite_count);
        Ok(rank(scored)
            .into_iter()
            .take(pool_size)
            .map(|ind| ind.params().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::params::DomainTable;

    fn scored(fitness: &[f64]) -> Vec<ScoredIndividual> {
        let domains = Arc::new(DomainTable::new([("id", 0.0, 1000.0)]).unwrap());
        fitness
            .iter()
            .enumerate()
            .map(|(i, f)| {
                #[expect(clippy::cast_precision_loss)]
                let id = i as f64;
                let params = ParameterVector::from_values(&domains, vec![id]).unwrap();
                ScoredIndividual::new(params, *f, 0)
            })
            .collect()
    }

    fn ids(pool: &[ParameterVector]) -> Vec<f64> {
        pool.iter().map(|p| p.values()[0]).collect()
    }

    #[test]
    fn test_rank_is_descending_and_stable() {
        let population = scored(&[1.0, 5.0, 3.0, 5.0, 3.0]);
        let ranked = rank(&population)
            .iter()
            .map(|s| s.params().values()[0])
            .collect::<Vec<_>>();
        assert_eq!(ranked, vec![1.0, 3.0, 2.0, 4.0, 0.0]);
    }

    #[test]
    fn test_pool_is_top_half_with_elites() {
        let fitness = (0..20_i32).map(f64::from).collect::<Vec<_>>();
        let population = scored(&fitness);
        let pool = TruncationSelection.select(&population, 2).unwrap();
        assert!(pool.len() >= 10);
        let pool_ids = ids(&pool);
        assert!(pool_ids.contains(&19.0));
        assert!(pool_ids.contains(&18.0));
        assert_eq!(pool_ids[..2], [19.0, 18.0]);
    }

    #[test]
    fn test_elites_beyond_half_are_kept() {
        let population = scored(&[4.0, 3.0, 2.0, 1.0]);
        let pool = TruncationSelection.select(&population, 3).unwrap();
        assert_eq!(ids(&pool), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_single_individual_population() {
        let population = scored(&[7.0]);
        let pool = TruncationSelection.select(&population, 0).unwrap();
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_invalid_selection_requests() {
        assert_eq!(
            TruncationSelection.select(&[], 0),
            Err(InvalidConfiguration::EmptyScoredPopulation)
        );
        assert_eq!(
            TruncationSelection.select(&scored(&[1.0, 2.0]), 3),
            Err(InvalidConfiguration::EliteExceedsPopulation {
                elite_count: 3,
                population_size: 2
            })
        );
    }
}
