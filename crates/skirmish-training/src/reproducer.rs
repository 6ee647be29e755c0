//! Reproduction: building the next population from a breeding pool.
//!
//! # Algorithm
//!
//! 1. **Elitism** - The elite individuals are copied unchanged into the first slots
//! 2. **Parent Selection** - Two parents are drawn uniformly, with replacement, from the pool
//! 3. **Blend Crossover** - The child takes the mean of its parents' values, key by key
//! 4. **Uniform Mutation** - Each value is independently shifted by `U(-step, step)` with
//!    probability `mutation_rate`, then clamped into its own domain
//!
//! Steps 2-4 repeat until the population is full.
//!
//! Blending averages rather than swapping genes: the parameters are continuous behavior
//! weights, and averaging small real vectors converges faster than segment exchange.
//! Clamping happens per mutated parameter, so a mutation event can never push an unrelated
//! parameter out of bounds.

use rand::{Rng, seq::IndexedRandom as _};

use crate::{error::InvalidConfiguration, params::ParameterVector, population::Population};

/// Crossover and mutation settings.
#[derive(Debug, Clone, Copy)]
pub struct Reproducer {
    mutation_rate: f64,
    mutation_step: f64,
}

impl Reproducer {
    /// # Errors
    ///
    /// Fails if `mutation_rate` is outside `[0, 1]` or `mutation_step` is negative or so large
    /// that the interval `[-step, step]` has no finite width.
    pub fn new(mutation_rate: f64, mutation_step: f64) -> Result<Self, InvalidConfiguration> {
        if !(0.0..=1.0).contains(&mutation_rate) {
            return Err(InvalidConfiguration::MutationRateOutOfRange { mutation_rate });
        }
        if !(2.0 * mutation_step).is_finite() || mutation_step < 0.0 {
            return Err(InvalidConfiguration::InvalidMutationStep { mutation_step });
        }
        Ok(Self {
            mutation_rate,
            mutation_step,
        })
    }

    #[must_use]
    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    #[must_use]
    pub fn mutation_step(&self) -> f64 {
        self.mutation_step
    }

    /// Creates one offspring from two parents: blend crossover followed by mutation.
    pub fn breed<R>(
        &self,
        p1: &ParameterVector,
        p2: &ParameterVector,
        rng: &mut R,
    ) -> ParameterVector
    where
        R: Rng + ?Sized,
    {
        let mut child = ParameterVector::blend(p1, p2);
        child.mutate(self.mutation_rate, self.mutation_step, rng);
        child
    }

    /// Builds a population of exactly `population_size` individuals.
    ///
    /// The first `elites.len()` members are the elites, unmodified and in the given order.
    /// If there are more elites than `population_size`, only the first ones are kept.
    ///
    /// # Errors
    ///
    /// Fails if the breeding pool is empty.
    pub fn reproduce<R>(
        &self,
        breeding_pool: &[ParameterVector],
        elites: &[ParameterVector],
        population_size: usize,
        rng: &mut R,
    ) -> Result<Population, InvalidConfiguration>
    where
        R: Rng + ?Sized,
    {
        if breeding_pool.is_empty() {
            return Err(InvalidConfiguration::EmptyBreedingPool);
        }

        let mut next_individuals = Vec::with_capacity(population_size);

        // elite selection
        next_individuals.extend(elites.iter().take(population_size).cloned());

        // generate the rest individuals
        while next_individuals.len() < population_size {
            let p1 = breeding_pool
                .choose(rng)
                .ok_or(InvalidConfiguration::EmptyBreedingPool)?;
            let p2 = breeding_pool
                .choose(rng)
                .ok_or(InvalidConfiguration::EmptyBreedingPool)?;
            next_individuals.push(self.breed(p1, p2, rng));
        }

        Ok(Population::from_individuals(next_individuals))
    }
}
