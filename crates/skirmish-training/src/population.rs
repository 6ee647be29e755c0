//! Populations, scored individuals and the run-wide best record.

use std::sync::Arc;

use rand::Rng;

use crate::params::{DomainTable, ParameterVector};

/// One generation's candidates, in no particular order.
///
/// A population is never edited in place: each generation replaces it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    individuals: Vec<ParameterVector>,
}

impl Population {
    /// Creates `count` individuals sampled uniformly from `domains`.
    #[must_use]
    pub fn random<R>(domains: &Arc<DomainTable>, count: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count)
            .map(|_| ParameterVector::sample_random(domains, rng))
            .collect();
        Self { individuals }
    }

    #[must_use]
    pub fn from_individuals(individuals: Vec<ParameterVector>) -> Self {
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[ParameterVector] {
        &self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Replaces the first individual, used to resume from a stored best.
    pub(crate) fn replace_first(&mut self, individual: ParameterVector) {
        if let Some(first) = self.individuals.first_mut() {
            *first = individual;
        }
    }
}

/// A parameter vector paired with the fitness it scored in a given generation.
///
/// The parameters cannot be modified once scored; offspring are always new vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredIndividual {
    params: ParameterVector,
    fitness: f64,
    generation: usize,
}

impl ScoredIndividual {
    #[must_use]
    pub fn new(params: ParameterVector, fitness: f64, generation: usize) -> Self {
        Self {
            params,
            fitness,
            generation,
        }
    }

    #[must_use]
    pub fn params(&self) -> &ParameterVector {
        &self.params
    }

    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }
}

/// The best individual observed across the whole run.
///
/// Fitness never decreases: [`Self::offer`] only accepts strictly better candidates, so a
/// tie never replaces (or re-persists) the current record.
#[derive(Debug, Clone, Default)]
pub struct BestRecord {
    best: Option<ScoredIndividual>,
}

impl BestRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> Option<&ScoredIndividual> {
        self.best.as_ref()
    }

    #[must_use]
    pub fn fitness(&self) -> Option<f64> {
        self.best.as_ref().map(ScoredIndividual::fitness)
    }

    /// Records `candidate` if it beats the current best. Returns `true` on improvement.
    pub fn offer(&mut self, candidate: &ScoredIndividual) -> bool {
        if self
            .fitness()
            .is_some_and(|best| candidate.fitness() <= best)
        {
            return false;
        }
        self.best = Some(candidate.clone());
        true
    }
}

/// Summary of a generation's fitness distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Mean of the two middle values for an even count
    pub median: f64,
    pub std_dev: f64,
}

impl FitnessStats {
    /// Returns `None` for an empty set of values.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        let min = *values.first()?;
        let max = *values.last()?;
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let mid = values.len() / 2;
        let median = if values.len() % 2 == 0 {
            f64::midpoint(values[mid - 1], values[mid])
        } else {
            values[mid]
        };
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

/// Per-parameter diversity of a population.
///
/// Each entry is the standard deviation of one parameter across the population divided by
/// the width of its domain, so `0.0` means every individual agrees on that parameter. A
/// zero-width domain always reports `0.0`.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn parameter_spread(population: &Population) -> Vec<(String, f64)> {
    let Some(first) = population.individuals().first() else {
        return vec![];
    };
    let n = population.len() as f64;
    first
        .domains()
        .iter()
        .enumerate()
        .map(|(i, (name, domain))| {
            let values = population.individuals().iter().map(|p| p.values()[i]);
            let mean = values.clone().sum::<f64>() / n;
            let std_dev = (values.map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
            let spread = if domain.width() > 0.0 {
                std_dev / domain.width()
            } else {
                0.0
            };
            (name.to_owned(), spread)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(value: f64) -> ParameterVector {
        let domains = Arc::new(DomainTable::new([("a", 0.0, 10.0)]).unwrap());
        ParameterVector::from_values(&domains, vec![value]).unwrap()
    }

    #[test]
    fn test_best_record_ignores_ties_and_regressions() {
        let mut best = BestRecord::new();
        assert!(best.get().is_none());

        assert!(best.offer(&ScoredIndividual::new(vector(1.0), 10.0, 0)));
        assert!(!best.offer(&ScoredIndividual::new(vector(2.0), 10.0, 1)));
        assert!(!best.offer(&ScoredIndividual::new(vector(3.0), 5.0, 1)));
        assert_eq!(best.get().unwrap().params(), &vector(1.0));

        assert!(best.offer(&ScoredIndividual::new(vector(4.0), 12.5, 2)));
        assert_eq!(best.fitness(), Some(12.5));
        assert_eq!(best.get().unwrap().generation(), 2);
    }

    #[test]
    fn test_fitness_stats() {
        assert!(FitnessStats::new([]).is_none());
        let stats = FitnessStats::new([5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.median, 3.0);
        assert!((stats.std_dev - 2.0_f64.sqrt()).abs() < 1e-12);

        let even = FitnessStats::new([4.0, 1.0, 10.0, 2.0]).unwrap();
        assert_eq!(even.median, 3.0);
        assert_eq!(FitnessStats::new([7.0]).unwrap().median, 7.0);
    }

    #[test]
    fn test_parameter_spread() {
        let uniform = Population::from_individuals(vec![vector(4.0); 5]);
        assert_eq!(parameter_spread(&uniform), vec![("a".to_owned(), 0.0)]);

        let split = Population::from_individuals(vec![vector(0.0), vector(10.0)]);
        assert_eq!(parameter_spread(&split), vec![("a".to_owned(), 0.5)]);
    }
}
