use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64Mcg;
use skirmish_arena::{
    Arena, ArenaConfig, ArenaFullError, EpisodeResult, MAX_SHIPS, Pilot,
    opponents::{Chaser, Drifter},
};
use skirmish_training::{
    evaluator::{EpisodeOutcome, EpisodeRunner},
    params::ParameterVector,
};

use crate::hunter::{HUNTER_ID, HunterPilot};

/// Plays hunter episodes against a fixed set of built-in opponents.
///
/// Opponents alternate between [`Chaser`]s and [`Drifter`]s. Every episode draws a fresh
/// arena seed from the runner's own RNG, so a runner created with a given seed replays the
/// same sequence of episodes.
#[derive(Debug, Clone)]
pub struct ArenaEpisodeRunner {
    config: ArenaConfig,
    opponents: usize,
    rng: Pcg64Mcg,
}

impl ArenaEpisodeRunner {
    pub const DEFAULT_OPPONENTS: usize = 3;

    /// # Errors
    ///
    /// Fails if the hunter and `opponents` do not fit in one arena.
    pub fn new(config: ArenaConfig, opponents: usize, seed: u64) -> Result<Self, ArenaFullError> {
        if opponents + 1 > MAX_SHIPS {
            return Err(ArenaFullError);
        }
        Ok(Self {
            config,
            opponents,
            rng: Pcg64Mcg::seed_from_u64(seed),
        })
    }

    #[must_use]
    pub fn opponents(&self) -> usize {
        self.opponents
    }

    fn opponent(index: usize) -> Option<Box<dyn Pilot>> {
        let id = index + 1;
        if index % 2 == 0 {
            let chaser = Chaser::new(format!("chaser-{id}"), Chaser::DEFAULT_AIM_JITTER).ok()?;
            Some(Box::new(chaser))
        } else {
            Some(Box::new(Drifter::new(format!("drifter-{id}"))))
        }
    }

    /// Plays one full episode with a hunter flown by `params`.
    ///
    /// Returns `None` if `params` cannot fly a hunter, in which case no hunter is spawned.
    pub fn play(&mut self, params: &ParameterVector) -> Option<EpisodeResult> {
        let seed = self.rng.random();
        let hunter = match HunterPilot::from_vector(params) {
            Ok(hunter) => hunter,
            Err(e) => {
                tracing::warn!("hunter not spawned: {e}");
                return None;
            }
        };

        let mut arena = Arena::with_config(self.config, seed);
        arena.add_pilot(Box::new(hunter)).ok()?;
        for index in 0..self.opponents {
            arena.add_pilot(Self::opponent(index)?).ok()?;
        }
        Some(arena.run())
    }
}

/// Extracts the hunter's outcome from a finished episode.
#[must_use]
pub fn hunter_outcome(result: &EpisodeResult) -> Option<EpisodeOutcome> {
    let record = result.record(HUNTER_ID)?;
    Some(EpisodeOutcome {
        raw_score: f64::from(record.score),
        eliminated_enemy_count: record.kills,
        survived: record.survived,
    })
}

impl EpisodeRunner for ArenaEpisodeRunner {
    fn run_episode(&mut self, params: &ParameterVector) -> Option<EpisodeOutcome> {
        hunter_outcome(&self.play(params)?)
    }
}
