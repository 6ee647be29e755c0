//! The generational loop tying evaluation, selection and reproduction together.
//!
//! # State Machine
//!
//! ```text
//! Initializing -> Evaluating -> Selecting -> Reproducing -> (Evaluating | Done)
//! ```
//!
//! - **Initializing** - Samples the initial population; an optional seed individual (usually
//!   the stored best of an earlier run) takes the first slot
//! - **Evaluating** - Scores every individual in turn and updates the run-wide best
//! - **Selecting** - Builds the breeding pool with the [`SelectionStrategy`]
//! - **Reproducing** - Builds the next population with the [`Reproducer`] and advances the
//!   generation counter
//!
//! The run is done once `generations_limit` generations have been evaluated. There is no
//! early stopping; a convergence criterion can be layered on top by driving the engine with
//! [`EvolutionEngine::step`] and inspecting each [`GenerationReport`].
//!
//! # Elitism
//!
//! The elites copied into generation `g + 1` are the top `elite_count` individuals of
//! generation `g`, bit-for-bit. The run-wide best is tracked separately in a [`BestRecord`]
//! and is what [`EvolutionEngine::run`] returns.
//!
//! # Persistence
//!
//! Whenever the best record improves, it is handed to the configured
//! [`BestSolutionStore`]. A failed write is logged and the run continues; the in-memory
//! record stays authoritative.

use std::sync::Arc;

use rand::Rng;

use crate::{
    config::EvolutionConfig,
    error::InvalidConfiguration,
    evaluator::{EpisodeRunner, Evaluator},
    params::{DomainTable, ParameterVector},
    population::{self, BestRecord, FitnessStats, Population, ScoredIndividual},
    reproducer::Reproducer,
    selection::{self, SelectionStrategy, TruncationSelection},
    store::BestSolutionStore,
    training_log::TrainingLog,
};

/// Where the engine is within its generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum EngineState {
    Initializing,
    Evaluating,
    Selecting,
    Reproducing,
    Done,
}

/// What happened during one generation.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub generation: usize,
    /// Every individual of the generation with its fitness, in population order.
    pub scored: Vec<ScoredIndividual>,
    pub fitness: FitnessStats,
    /// Normalized standard deviation of each parameter across the population.
    pub parameter_spread: Vec<(String, f64)>,
    pub generation_best: ScoredIndividual,
    /// Whether this generation produced a new run-wide best.
    pub new_best: bool,
    /// Number of episodes without an outcome record for the tracked agent.
    pub missing_records: usize,
}

/// Drives a training run.
pub struct EvolutionEngine<R, S = TruncationSelection> {
    config: EvolutionConfig,
    domains: Arc<DomainTable>,
    evaluator: Evaluator,
    reproducer: Reproducer,
    selection: S,
    rng: R,
    state: EngineState,
    generation: usize,
    population: Population,
    seed_individual: Option<ParameterVector>,
    best: BestRecord,
    store: Option<Box<dyn BestSolutionStore>>,
    training_log: Option<TrainingLog>,
}

impl<R, S> std::fmt::Debug for EvolutionEngine<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvolutionEngine")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("best_fitness", &self.best.fitness())
            .finish_non_exhaustive()
    }
}

impl<R> EvolutionEngine<R>
where
    R: Rng,
{
    /// Creates an engine with truncation selection.
    ///
    /// # Errors
    ///
    /// Fails if `config` is inconsistent. No episode has been played at that point.
    pub fn new(
        config: EvolutionConfig,
        domains: Arc<DomainTable>,
        rng: R,
    ) -> Result<Self, InvalidConfiguration> {
        config.validate()?;
        let evaluator = Evaluator::new(config.episode_count, config.fitness)?;
        let reproducer = Reproducer::new(config.mutation_rate, config.mutation_step)?;
        Ok(Self {
            config,
            domains,
            evaluator,
            reproducer,
            selection: TruncationSelection,
            rng,
            state: EngineState::Initializing,
            generation: 0,
            population: Population::from_individuals(vec![]),
            seed_individual: None,
            best: BestRecord::new(),
            store: None,
            training_log: None,
        })
    }
}

impl<R, S> EvolutionEngine<R, S>
where
    R: Rng,
    S: SelectionStrategy,
{
    /// Replaces the selection strategy.
    #[must_use]
    pub fn with_selection<T>(self, selection: T) -> EvolutionEngine<R, T>
    where
        T: SelectionStrategy,
    {
        EvolutionEngine {
            config: self.config,
            domains: self.domains,
            evaluator: self.evaluator,
            reproducer: self.reproducer,
            selection,
            rng: self.rng,
            state: self.state,
            generation: self.generation,
            population: self.population,
            seed_individual: self.seed_individual,
            best: self.best,
            store: self.store,
            training_log: self.training_log,
        }
    }

    /// Places `individual` in the first slot of the initial population.
    ///
    /// Ignored (with a warning) if it was built for a different domain table.
    #[must_use]
    pub fn with_seed_individual(mut self, individual: ParameterVector) -> Self {
        if **individual.domains() == *self.domains {
            self.seed_individual = Some(individual);
        } else {
            tracing::warn!("seed individual has a different parameter set; ignoring it");
        }
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: Box<dyn BestSolutionStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_training_log(mut self, log: TrainingLog) -> Self {
        self.training_log = Some(log);
        self
    }

    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Number of completed generations.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// The population that will be evaluated next (or the final one once done).
    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn best(&self) -> Option<&ScoredIndividual> {
        self.best.get()
    }

    /// Runs one full generation.
    ///
    /// Returns `None` once the run is done.
    ///
    /// # Errors
    ///
    /// Fails if selection or reproduction reject their inputs.
    pub fn step<E>(
        &mut self,
        runner: &mut E,
    ) -> Result<Option<GenerationReport>, InvalidConfiguration>
    where
        E: EpisodeRunner + ?Sized,
    {
        if self.state.is_initializing() {
            self.initialize();
        }
        if self.state.is_done() {
            return Ok(None);
        }

        debug_assert!(self.state.is_evaluating());
        let (scored, missing_records) = self.evaluate_population(runner);
        let report = self.record_generation(scored, missing_records)?;

        self.state = EngineState::Selecting;
        let pool = self.selection.select(&report.scored, self.config.elite_count)?;
        let elites = selection::rank(&report.scored)
            .into_iter()
            .take(self.config.elite_count)
            .map(|ind| ind.params().clone())
            .collect::<Vec<_>>();

        self.state = EngineState::Reproducing;
        self.population = self.reproducer.reproduce(
            &pool,
            &elites,
            self.config.population_size,
            &mut self.rng,
        )?;
        self.generation += 1;
        self.state = if self.generation >= self.config.generations_limit {
            EngineState::Done
        } else {
            EngineState::Evaluating
        };

        Ok(Some(report))
    }

    /// Runs until done and returns the best parameters seen.
    ///
    /// # Errors
    ///
    /// Fails if selection or reproduction reject their inputs.
    pub fn run<E>(&mut self, runner: &mut E) -> Result<ParameterVector, InvalidConfiguration>
    where
        E: EpisodeRunner + ?Sized,
    {
        while self.step(runner)?.is_some() {}
        self.best
            .get()
            .map(|best| best.params().clone())
            .ok_or(InvalidConfiguration::EmptyScoredPopulation)
    }

    fn initialize(&mut self) {
        self.population =
            Population::random(&self.domains, self.config.population_size, &mut self.rng);
        if let Some(seed) = self.seed_individual.take() {
            self.population.replace_first(seed);
        }
        self.generation = 0;
        self.state = EngineState::Evaluating;
    }

    fn evaluate_population<E>(&self, runner: &mut E) -> (Vec<ScoredIndividual>, usize)
    where
        E: EpisodeRunner + ?Sized,
    {
        let mut missing_records = 0;
        let scored = self
            .population
            .individuals()
            .iter()
            .enumerate()
            .map(|(index, params)| {
                let evaluation = self.evaluator.evaluate_detailed(params, runner);
                missing_records += evaluation.missing_records;
                tracing::debug!(
                    generation = self.generation,
                    index,
                    fitness = evaluation.fitness,
                    "individual evaluated"
                );
                ScoredIndividual::new(params.clone(), evaluation.fitness, self.generation)
            })
            .collect();
        (scored, missing_records)
    }

    fn record_generation(
        &mut self,
        scored: Vec<ScoredIndividual>,
        missing_records: usize,
    ) -> Result<GenerationReport, InvalidConfiguration> {
        let generation_best = selection::rank(&scored)
            .first()
            .map(|best| (*best).clone())
            .ok_or(InvalidConfiguration::EmptyScoredPopulation)?;
        let fitness = FitnessStats::new(scored.iter().map(ScoredIndividual::fitness))
            .ok_or(InvalidConfiguration::EmptyScoredPopulation)?;

        let new_best = self.best.offer(&generation_best);
        if new_best {
            tracing::info!(
                generation = self.generation,
                fitness = generation_best.fitness(),
                "new best individual"
            );
            if let Some(store) = &mut self.store {
                if let Err(e) = store.persist(generation_best.params()) {
                    tracing::warn!("failed to persist best individual: {e}");
                }
            }
        }

        if let Some(log) = &mut self.training_log {
            if let Err(e) = log.append_generation(self.generation, &scored) {
                tracing::warn!(path = %log.path().display(), "failed to write training log: {e}");
            }
        }

        Ok(GenerationReport {
            generation: self.generation,
            parameter_spread: population::parameter_spread(&self.population),
            scored,
            fitness,
            generation_best,
            new_best,
            missing_records,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::evaluator::EpisodeOutcome;

    fn domains() -> Arc<DomainTable> {
        Arc::new(DomainTable::new([("x", 0.0, 10.0), ("y", -5.0, 5.0)]).unwrap())
    }

    // Deterministic landscape peaking at x = 7, y = 0.
    fn landscape(params: &ParameterVector) -> Option<EpisodeOutcome> {
        let x = params.get("x")?;
        let y = params.get("y")?;
        Some(EpisodeOutcome {
            raw_score: 100.0 - (x - 7.0).powi(2) - y.powi(2),
            eliminated_enemy_count: 0,
            survived: false,
        })
    }

    fn config() -> EvolutionConfig {
        EvolutionConfig {
            population_size: 12,
            generations_limit: 15,
            episode_count: 1,
            ..EvolutionConfig::default()
        }
    }

    #[test]
    fn test_state_transitions() {
        let mut engine =
            EvolutionEngine::new(config(), domains(), Pcg64Mcg::seed_from_u64(1)).unwrap();
        assert!(engine.state().is_initializing());
        assert!(engine.best().is_none());

        let mut runner = landscape;
        let report = engine.step(&mut runner).unwrap().unwrap();
        assert_eq!(report.generation, 0);
        assert!(report.new_best);
        assert_eq!(engine.generation(), 1);
        assert!(engine.state().is_evaluating());

        for _ in 1..15 {
            assert!(engine.step(&mut runner).unwrap().is_some());
        }
        assert!(engine.state().is_done());
        assert!(engine.step(&mut runner).unwrap().is_none());
        assert_eq!(engine.generation(), 15);
    }

    #[test]
    fn test_run_improves_on_smooth_landscape() {
        let mut engine =
            EvolutionEngine::new(config(), domains(), Pcg64Mcg::seed_from_u64(2)).unwrap();
        let mut runner = landscape;
        let mut first_best = None;
        while let Some(report) = engine.step(&mut runner).unwrap() {
            first_best.get_or_insert(report.generation_best.fitness());
        }
        let best = engine.best().unwrap();
        assert!(best.fitness() >= first_best.unwrap());
        assert!(best.fitness() > 80.0, "{best:?}");
    }

    #[test]
    fn test_seed_individual_takes_first_slot() {
        let domains = domains();
        let seed = ParameterVector::from_values(&domains, vec![7.0, 0.0]).unwrap();
        let mut engine = EvolutionEngine::new(config(), domains, Pcg64Mcg::seed_from_u64(3))
            .unwrap()
            .with_seed_individual(seed.clone());
        let mut runner = landscape;
        let report = engine.step(&mut runner).unwrap().unwrap();
        assert_eq!(report.scored[0].params(), &seed);
        assert_eq!(report.generation_best.params(), &seed);
        assert_eq!(report.generation_best.fitness(), 100.0);
    }

    #[test]
    fn test_foreign_seed_individual_is_ignored() {
        let foreign = Arc::new(DomainTable::new([("z", 0.0, 1.0)]).unwrap());
        let seed = ParameterVector::from_values(&foreign, vec![0.5]).unwrap();
        let mut engine = EvolutionEngine::new(config(), domains(), Pcg64Mcg::seed_from_u64(4))
            .unwrap()
            .with_seed_individual(seed);
        let mut runner = landscape;
        let report = engine.step(&mut runner).unwrap().unwrap();
        assert!(report.scored.iter().all(|s| s.params().get("x").is_some()));
    }

    #[test]
    fn test_missing_records_are_reported() {
        let mut engine =
            EvolutionEngine::new(config(), domains(), Pcg64Mcg::seed_from_u64(5)).unwrap();
        let mut runner = |_: &ParameterVector| -> Option<EpisodeOutcome> { None };
        let report = engine.step(&mut runner).unwrap().unwrap();
        assert_eq!(report.missing_records, 12);
        assert_eq!(report.fitness.max, 0.0);
    }
}
