use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64Mcg;
use skirmish_arena::ArenaConfig;
use skirmish_policy::{hunter::hunter_domains, runner::ArenaEpisodeRunner};
use skirmish_training::{
    config::EvolutionConfig,
    engine::{EvolutionEngine, GenerationReport},
    store::JsonFileStore,
    training_log::TrainingLog,
};

use crate::{
    model::summary::TrainingSummary,
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    population_size: Option<usize>,
    #[arg(long)]
    generations: Option<usize>,
    #[arg(long)]
    mutation_rate: Option<f64>,
    #[arg(long)]
    mutation_step: Option<f64>,
    #[arg(long)]
    elite_count: Option<usize>,
    /// Episodes per fitness evaluation
    #[arg(long)]
    episodes: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Number of built-in opponents in every episode
    #[arg(long, default_value_t = ArenaEpisodeRunner::DEFAULT_OPPONENTS)]
    opponents: usize,
    /// Best record file, rewritten on every improvement
    #[arg(long, default_value = "best_params.json")]
    best: PathBuf,
    /// Append per-individual fitness rows to this CSV file
    #[arg(long)]
    log: Option<PathBuf>,
    /// Run summary output file (stdout if omitted)
    #[arg(long)]
    summary: Option<PathBuf>,
    /// Seed the first generation with the stored best record
    #[arg(long)]
    resume: bool,
}

impl TrainArg {
    fn evolution_config(&self) -> anyhow::Result<EvolutionConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file::<EvolutionConfig>("configuration", path)?,
            None => EvolutionConfig::default(),
        };
        let overrides = [
            (&mut config.population_size, self.population_size),
            (&mut config.generations_limit, self.generations),
            (&mut config.elite_count, self.elite_count),
            (&mut config.episode_count, self.episodes),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(rate) = self.mutation_rate {
            config.mutation_rate = rate;
        }
        if let Some(step) = self.mutation_step {
            config.mutation_step = step;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let mut config = arg.evolution_config()?;
    config.validate().context("Invalid training configuration")?;
    // record the drawn seed so that the summary can replay the run
    let seed = *config.seed.get_or_insert_with(|| rand::rng().random());
    let mut rng = Pcg64Mcg::seed_from_u64(seed);

    let domains = hunter_domains();
    let mut runner = ArenaEpisodeRunner::new(ArenaConfig::default(), arg.opponents, rng.random())
        .context("Too many opponents")?;
    let store = JsonFileStore::new(&arg.best, domains.clone());
    let resumed = arg.resume.then(|| store.load_merged(&mut rng));

    let mut engine =
        EvolutionEngine::new(config.clone(), domains, rng)?.with_store(Box::new(store));
    if let Some(individual) = resumed {
        engine = engine.with_seed_individual(individual);
    }
    if let Some(path) = &arg.log {
        engine = engine.with_training_log(TrainingLog::open(path)?);
    }

    tracing::info!(seed, opponents = arg.opponents, "training started");
    while let Some(report) = engine.step(&mut runner)? {
        print_report(&report);
    }

    let best = engine
        .best()
        .context("Training finished without a best individual")?;
    eprintln!("Best individual (generation #{}):", best.generation());
    for (name, value) in best.params().iter() {
        eprintln!("  {name:<18} {value:.3}");
    }
    eprintln!("  => Fitness: {:.3}", best.fitness());

    let summary = TrainingSummary {
        trained_at: Utc::now(),
        final_fitness: best.fitness(),
        generations: engine.generation(),
        config,
        params: best.params().to_map(),
    };
    Output::save_json(&summary, arg.summary.as_deref())?;

    eprintln!();
    eprintln!("Training completed");
    eprintln!("  Best record: {}", arg.best.display());
    if let Some(path) = &arg.summary {
        eprintln!("  Summary: {}", path.display());
    }
    eprintln!("  Trained at: {}", summary.trained_at);
    eprintln!("  Final fitness: {:.3}", summary.final_fitness);

    Ok(())
}

fn print_report(report: &GenerationReport) {
    let GenerationReport {
        generation,
        scored: _,
        fitness,
        parameter_spread,
        generation_best,
        new_best,
        missing_records,
    } = report;

    eprintln!("Generation #{generation}:");
    eprintln!("  Fitness Stats:");
    eprintln!("    Min:    {:.3}", fitness.min);
    eprintln!("    Max:    {:.3}", fitness.max);
    eprintln!("    Mean:   {:.3}", fitness.mean);
    eprintln!("    Median: {:.3}", fitness.median);
    eprintln!("    StdDev: {:.3}", fitness.std_dev);
    eprintln!(
        "  NormStddev: {:.3?}",
        parameter_spread.iter().map(|(_, s)| *s).collect::<Vec<_>>()
    );
    let marker = if *new_best { " (new best)" } else { "" };
    eprintln!("  Best: {:.3}{marker}", generation_best.fitness());
    if *missing_records > 0 {
        eprintln!("  Missing records: {missing_records}");
    }
}
