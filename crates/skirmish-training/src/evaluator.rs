//! Fitness evaluation: averaging repeated simulation episodes.
//!
//! A single episode is a noisy estimate of how good a parameter vector is (collisions are
//! discrete events, opponents act in a randomized order), so an individual is scored by
//! playing `episode_count` independent episodes and taking the mean of their fitness.
//!
//! # Episode Fitness
//!
//! ```text
//! fitness = raw_score + eliminated_enemy_count × kill_bonus + (survived ? survival_bonus : 0)
//! ```
//!
//! with `kill_bonus = 50` and `survival_bonus = 100` by default (see [`FitnessWeights`]).
//!
//! # Missing Records
//!
//! The simulation reports outcomes per participant. If the tracked agent's record cannot be
//! found in an episode (for example because it was never spawned), the episode still counts
//! towards the mean with fitness `0`. Evaluation never aborts because of a missing record.
//!
//! Episodes run strictly one after another; the simulation collaborator is assumed to be
//! stateful and non-reentrant.

use serde::{Deserialize, Serialize};

use crate::{error::InvalidConfiguration, params::ParameterVector};

/// Bonus granted per eliminated enemy.
pub const KILL_BONUS: f64 = 50.0;
/// Bonus granted when the agent is still alive at the end of an episode.
pub const SURVIVAL_BONUS: f64 = 100.0;

/// What one episode reports about the tracked agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    pub raw_score: f64,
    pub eliminated_enemy_count: u32,
    pub survived: bool,
}

/// Runs one simulation episode with the given parameters.
///
/// This is the only way the training system touches the simulation. The candidate
/// parameters are passed in directly; implementations must not leak mutable state from
/// one call into the outcome of the next.
pub trait EpisodeRunner {
    /// Plays one episode and returns the tracked agent's outcome, or `None` if the agent's
    /// record is missing from the episode result.
    fn run_episode(&mut self, params: &ParameterVector) -> Option<EpisodeOutcome>;
}

impl<F> EpisodeRunner for F
where
    F: FnMut(&ParameterVector) -> Option<EpisodeOutcome>,
{
    fn run_episode(&mut self, params: &ParameterVector) -> Option<EpisodeOutcome> {
        self(params)
    }
}

/// Coefficients turning an [`EpisodeOutcome`] into a scalar fitness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessWeights {
    pub kill_bonus: f64,
    pub survival_bonus: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            kill_bonus: KILL_BONUS,
            survival_bonus: SURVIVAL_BONUS,
        }
    }
}

impl FitnessWeights {
    #[must_use]
    pub fn episode_fitness(&self, outcome: &EpisodeOutcome) -> f64 {
        let mut fitness =
            outcome.raw_score + f64::from(outcome.eliminated_enemy_count) * self.kill_bonus;
        if outcome.survived {
            fitness += self.survival_bonus;
        }
        fitness
    }
}

/// Result of evaluating one individual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Mean fitness over all episodes, missing ones counted as `0`.
    pub fitness: f64,
    /// Number of episodes played.
    pub episodes: usize,
    /// Number of episodes whose outcome record was missing.
    pub missing_records: usize,
}

/// Scores parameter vectors by averaging `episode_count` episodes.
#[derive(Debug, Clone)]
pub struct Evaluator {
    episode_count: usize,
    weights: FitnessWeights,
}

impl Evaluator {
    /// # Errors
    ///
    /// Fails if `episode_count` is zero.
    pub fn new(episode_count: usize, weights: FitnessWeights) -> Result<Self, InvalidConfiguration> {
        if episode_count == 0 {
            return Err(InvalidConfiguration::NoEpisodes);
        }
        Ok(Self {
            episode_count,
            weights,
        })
    }

    #[must_use]
    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    #[must_use]
    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    /// Returns the mean fitness of `params` over `episode_count` episodes.
    pub fn evaluate<E>(&self, params: &ParameterVector, runner: &mut E) -> f64
    where
        E: EpisodeRunner + ?Sized,
    {
        self.evaluate_detailed(params, runner).fitness
    }

    /// Like [`Self::evaluate`], but also reports how many episode records were missing.
    ///
    /// A non-finite episode fitness is treated like a missing record.
    #[expect(clippy::cast_precision_loss)]
    pub fn evaluate_detailed<E>(&self, params: &ParameterVector, runner: &mut E) -> Evaluation
    where
        E: EpisodeRunner + ?Sized,
    {
        let mut total_fitness = 0.0;
        let mut missing_records = 0;
        for episode in 0..self.episode_count {
            let fitness = runner
                .run_episode(params)
                .map(|outcome| self.weights.episode_fitness(&outcome))
                .filter(|f| f.is_finite());
            match fitness {
                Some(f) => total_fitness += f,
                None => {
                    missing_records += 1;
                    tracing::debug!(episode, "agent record missing, counting episode as 0");
                }
            }
        }
        Evaluation {
            fitness: total_fitness / self.episode_count as f64,
            episodes: self.episode_count,
            missing_records,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::params::DomainTable;

    fn params() -> ParameterVector {
        let domains = Arc::new(DomainTable::new([("aggressiveness", 0.0, 1.0)]).unwrap());
        ParameterVector::from_values(&domains, vec![0.5]).unwrap()
    }

    fn scripted(
        outcomes: Vec<Option<EpisodeOutcome>>,
    ) -> impl FnMut(&ParameterVector) -> Option<EpisodeOutcome> {
        let mut outcomes = outcomes.into_iter();
        move |_| outcomes.next().flatten()
    }

    #[test]
    fn test_zero_episodes_is_rejected() {
        assert!(matches!(
            Evaluator::new(0, FitnessWeights::default()),
            Err(InvalidConfiguration::NoEpisodes)
        ));
    }

    #[test]
    fn test_mean_of_episode_fitness() {
        let evaluator = Evaluator::new(2, FitnessWeights::default()).unwrap();
        let mut runner = scripted(vec![
            Some(EpisodeOutcome {
                raw_score: 10.0,
                eliminated_enemy_count: 2,
                survived: true,
            }),
            Some(EpisodeOutcome {
                raw_score: 0.0,
                eliminated_enemy_count: 0,
                survived: false,
            }),
        ]);
        assert_eq!(evaluator.evaluate(&params(), &mut runner), 105.0);
    }

    #[test]
    fn test_missing_record_counts_as_zero() {
        let evaluator = Evaluator::new(3, FitnessWeights::default()).unwrap();
        let outcome = EpisodeOutcome {
            raw_score: 30.0,
            eliminated_enemy_count: 1,
            survived: false,
        };
        let mut runner = scripted(vec![Some(outcome), None, Some(outcome)]);
        let evaluation = evaluator.evaluate_detailed(&params(), &mut runner);
        assert_eq!(evaluation.missing_records, 1);
        assert_eq!(evaluation.episodes, 3);
        assert!((evaluation.fitness - 160.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_runner_receives_candidate_params() {
        let evaluator = Evaluator::new(3, FitnessWeights::default()).unwrap();
        let expected = params();
        let mut calls = 0;
        let mut runner = |p: &ParameterVector| -> Option<EpisodeOutcome> {
            calls += 1;
            assert_eq!(p, &expected);
            None
        };
        assert_eq!(evaluator.evaluate(&expected, &mut runner), 0.0);
        assert_eq!(calls, 3);
    }
}
