use std::path::PathBuf;

use anyhow::Context;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64Mcg;
use skirmish_arena::ArenaConfig;
use skirmish_policy::{
    hunter::{HUNTER_ID, hunter_domains},
    runner::{self, ArenaEpisodeRunner},
};
use skirmish_training::{evaluator::FitnessWeights, store::JsonFileStore};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Best record file to fly the hunter with
    #[arg(long, default_value = "best_params.json")]
    best: PathBuf,
    #[arg(long, default_value_t = 5)]
    episodes: usize,
    #[arg(long, default_value_t = ArenaEpisodeRunner::DEFAULT_OPPONENTS)]
    opponents: usize,
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<f64> {
    anyhow::ensure!(arg.episodes > 0, "--episodes must be at least 1");
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg64Mcg::seed_from_u64(seed);

    let store = JsonFileStore::new(&arg.best, hunter_domains());
    let params = store.load_merged(&mut rng);
    eprintln!("Hunter parameters ({}):", arg.best.display());
    for (name, value) in params.iter() {
        eprintln!("  {name:<18} {value:.3}");
    }

    let mut runner = ArenaEpisodeRunner::new(ArenaConfig::default(), arg.opponents, rng.random())
        .context("Too many opponents")?;
    let weights = FitnessWeights::default();
    let mut total = 0.0;
    for episode in 0..arg.episodes {
        let result = runner
            .play(&params)
            .context("Hunter could not be spawned")?;
        let winner = result.winner.as_deref().unwrap_or("-");
        println!("Episode #{episode}: {} ticks, winner: {winner}", result.ticks);
        for record in &result.records {
            println!(
                "  {:<10} score: {:4}  kills: {}  health: {:5.1}  survived: {}",
                record.id, record.score, record.kills, record.health, record.survived
            );
        }
        let fitness = runner::hunter_outcome(&result)
            .map_or(0.0, |outcome| weights.episode_fitness(&outcome));
        println!("  {HUNTER_ID} fitness: {fitness:.3}");
        total += fitness;
    }

    #[expect(clippy::cast_precision_loss)]
    let mean = total / arg.episodes as f64;
    println!("Mean {HUNTER_ID} fitness over {} episodes: {mean:.3}", arg.episodes);
    Ok(mean)
}
