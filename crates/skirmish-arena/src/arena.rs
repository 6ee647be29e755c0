use arrayvec::ArrayVec;
use rand::{Rng as _, SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    geometry::Vec2,
    pilot::{Observation, Pilot, ShipView},
    ship::{BULLET_DAMAGE, Bullet, SHIP_RADIUS, Ship, ShipRecord},
};

/// Maximum number of ships in one arena.
pub const MAX_SHIPS: usize = 8;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("arena already holds {MAX_SHIPS} ships")]
pub struct ArenaFullError;

/// Dimensions and duration of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub width: f64,
    pub height: f64,
    pub max_ticks: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            max_ticks: 1500,
        }
    }
}

/// Outcome of one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub ticks: u32,
    /// The sole surviving ship, if exactly one is left.
    pub winner: Option<String>,
    /// One record per ship, in spawn order.
    pub records: Vec<ShipRecord>,
}

impl EpisodeResult {
    /// Looks up the record of the ship named `id`.
    #[must_use]
    pub fn record(&self, id: &str) -> Option<&ShipRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}

/// A single episode of the ship battle.
///
/// Every tick, the living ships act one after another in a freshly shuffled order: each pilot
/// observes the current state, its action is applied and its ship moves. Bullets then fly and
/// hit. The episode ends when at most one ship is left or after `max_ticks` ticks.
///
/// # Example
///
/// ```
/// use skirmish_arena::{Arena, opponents::Drifter};
///
/// let mut arena = Arena::with_seed(42);
/// arena.add_pilot(Box::new(Drifter::new("a"))).unwrap();
/// arena.add_pilot(Box::new(Drifter::new("b"))).unwrap();
/// let result = arena.run();
/// assert_eq!(result.records.len(), 2);
/// ```
pub struct Arena {
    config: ArenaConfig,
    rng: Pcg32,
    ships: ArrayVec<Ship, MAX_SHIPS>,
    pilots: ArrayVec<Box<dyn Pilot>, MAX_SHIPS>,
    bullets: Vec<Bullet>,
    tick: u32,
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("config", &self.config)
            .field("ships", &self.ships)
            .field("bullets", &self.bullets.len())
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    /// Creates an arena with default dimensions and a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but reproducible from `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_config(ArenaConfig::default(), seed)
    }

    #[must_use]
    pub fn with_config(config: ArenaConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            ships: ArrayVec::new(),
            pilots: ArrayVec::new(),
            bullets: vec![],
            tick: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    #[must_use]
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// Spawns a ship for `pilot` at a random position and heading.
    ///
    /// # Errors
    ///
    /// Fails if the arena already holds [`MAX_SHIPS`] ships.
    pub fn add_pilot(&mut self, pilot: Box<dyn Pilot>) -> Result<(), ArenaFullError> {
        if self.ships.is_full() {
            return Err(ArenaFullError);
        }
        let margin = SHIP_RADIUS * 2.0;
        let position = Vec2::new(
            self.rng.random_range(margin..self.config.width - margin),
            self.rng.random_range(margin..self.config.height - margin),
        );
        let heading = self.rng.random_range(0.0..360.0);
        self.ships.push(Ship::new(pilot.id(), position, heading));
        self.pilots.push(pilot);
        Ok(())
    }

    fn alive_count(&self) -> usize {
        self.ships.iter().filter(|s| !s.is_destroyed()).count()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.tick >= self.config.max_ticks || self.alive_count() <= 1
    }

    /// Advances the episode by one tick.
    pub fn step(&mut self) {
        let mut order = (0..self.ships.len()).collect::<ArrayVec<_, MAX_SHIPS>>();
        order.shuffle(&mut self.rng);

        for index in order {
            if self.ships[index].is_destroyed() {
                continue;
            }
            let observation = Observation {
                tick: self.tick,
                width: self.config.width,
                height: self.config.height,
                ships: self.ships.iter().map(ShipView::from).collect(),
                own_index: index,
            };
            let action = self.pilots[index].decide(&observation, &mut self.rng);
            let ship = &mut self.ships[index];
            if let Some(bullet) = ship.apply(action, index) {
                self.bullets.push(bullet);
            }
            ship.advance(self.config.width, self.config.height);
        }

        self.move_bullets();
        self.tick += 1;
    }

    fn move_bullets(&mut self) {
        let (width, height) = (self.config.width, self.config.height);
        let ships = &mut self.ships;
        self.bullets.retain_mut(|bullet| {
            bullet.position += bullet.velocity;
            bullet.ttl = bullet.ttl.saturating_sub(1);
            let Vec2 { x, y } = bullet.position;
            if bullet.ttl == 0 || !(0.0..=width).contains(&x) || !(0.0..=height).contains(&y) {
                return false;
            }
            let hit = ships.iter().enumerate().position(|(i, ship)| {
                i != bullet.owner
                    && !ship.is_destroyed()
                    && ship.position().distance(bullet.position) <= SHIP_RADIUS
            });
            let Some(target) = hit else {
                return true;
            };
            let destroyed = ships[target].take_hit(BULLET_DAMAGE);
            ships[bullet.owner].credit_hit(destroyed);
            false
        });
    }

    /// Plays the episode to the end and reports every ship's final state.
    #[must_use]
    pub fn run(mut self) -> EpisodeResult {
        while !self.is_finished() {
            self.step();
        }
        self.result()
    }

    #[must_use]
    pub fn result(&self) -> EpisodeResult {
        let mut survivors = self.ships.iter().filter(|s| !s.is_destroyed());
        let winner = match (survivors.next(), survivors.next()) {
            (Some(ship), None) => Some(ship.id().to_owned()),
            _ => None,
        };
        EpisodeResult {
            ticks: self.tick,
            winner,
            records: self.ships.iter().map(Ship::record).collect(),
        }
    }
}
