use serde::{Deserialize, Serialize};

use crate::{error::InvalidConfiguration, evaluator::FitnessWeights};

/// Parameters of one training run.
///
/// Every field has a default, so a configuration file only needs to name the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvolutionConfig {
    /// Number of individuals per generation
    pub population_size: usize,
    /// Number of generations to run
    pub generations_limit: usize,
    /// Probability of mutating each parameter of an offspring
    pub mutation_rate: f64,
    /// Half-width of the uniform mutation interval `[-step, step]`
    pub mutation_step: f64,
    /// Number of top individuals copied unchanged into the next generation
    pub elite_count: usize,
    /// Number of episodes averaged per fitness evaluation
    pub episode_count: usize,
    /// Coefficients of the episode fitness formula
    pub fitness: FitnessWeights,
    /// Seed of the training RNG; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            generations_limit: 100,
            mutation_rate: 0.1,
            mutation_step: 0.1,
            elite_count: 2,
            episode_count: 3,
            fitness: FitnessWeights::default(),
            seed: None,
        }
    }
}

impl EvolutionConfig {
    /// Checks that the configuration describes a run that can proceed.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), InvalidConfiguration> {
        if self.population_size == 0 {
            return Err(InvalidConfiguration::EmptyPopulation);
        }
        if self.elite_count > self.population_size {
            return Err(InvalidConfiguration::EliteExceedsPopulation {
                elite_count: self.elite_count,
                population_size: self.population_size,
            });
        }
        if self.generations_limit == 0 {
            return Err(InvalidConfiguration::NoGenerations);
        }
        if self.episode_count == 0 {
            return Err(InvalidConfiguration::NoEpisodes);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(InvalidConfiguration::MutationRateOutOfRange {
                mutation_rate: self.mutation_rate,
            });
        }
        if !(2.0 * self.mutation_step).is_finite() || self.mutation_step < 0.0 {
            return Err(InvalidConfiguration::InvalidMutationStep {
                mutation_step: self.mutation_step,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(EvolutionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_reports_inconsistencies() {
        let base = EvolutionConfig::default();
        let cases = [
            (
                EvolutionConfig {
                    population_size: 0,
                    elite_count: 0,
                    ..base.clone()
                },
                InvalidConfiguration::EmptyPopulation,
            ),
            (
                EvolutionConfig {
                    population_size: 4,
                    elite_count: 5,
                    ..base.clone()
                },
                InvalidConfiguration::EliteExceedsPopulation {
                    elite_count: 5,
                    population_size: 4,
                },
            ),
            (
                EvolutionConfig {
                    generations_limit: 0,
                    ..base.clone()
                },
                InvalidConfiguration::NoGenerations,
            ),
            (
                EvolutionConfig {
                    episode_count: 0,
                    ..base.clone()
                },
                InvalidConfiguration::NoEpisodes,
            ),
            (
                EvolutionConfig {
                    mutation_rate: -0.5,
                    ..base.clone()
                },
                InvalidConfiguration::MutationRateOutOfRange {
                    mutation_rate: -0.5,
                },
            ),
            (
                EvolutionConfig {
                    mutation_step: 1e308,
                    ..base.clone()
                },
                InvalidConfiguration::InvalidMutationStep {
                    mutation_step: 1e308,
                },
            ),
        ];
        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }
    }

    #[test]
    fn test_partial_config_file() {
        let config: EvolutionConfig =
            serde_json::from_str(r#"{ "population_size": 50, "seed": 7 }"#).unwrap();
        assert_eq!(config.population_size, 50);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.elite_count, 2);

        assert!(serde_json::from_str::<EvolutionConfig>(r#"{ "populaton_size": 50 }"#).is_err());
    }
}
