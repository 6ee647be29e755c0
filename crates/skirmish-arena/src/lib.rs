//! A small 2D ship battle used as the training environment.
//!
//! Up to [`MAX_SHIPS`] ships fight in a walled arena. Each ship is flown by a [`Pilot`],
//! which is asked for one [`Action`] per tick:
//!
//! - `Accelerate` / `Brake` - change speed along the current heading
//! - `RotateLeft` / `RotateRight` - turn by a fixed number of degrees
//! - `Shoot` - fire a bullet, subject to a cooldown
//!
//! A bullet hit deals damage and scores points for the shooter; destroying a ship scores a
//! kill. The episode ends when at most one ship is left or the tick limit is reached, and
//! yields an [`EpisodeResult`] with one [`ShipRecord`] per ship.
//!
//! All randomness (spawn positions, action order, randomized pilots) is drawn from the
//! arena's own seeded RNG, so an episode is reproducible from its seed and pilots.

pub use self::{
    arena::{Arena, ArenaConfig, ArenaFullError, EpisodeResult, MAX_SHIPS},
    geometry::Vec2,
    pilot::{Observation, Pilot, ShipView},
    ship::{Action, Ship, ShipRecord},
};

pub mod arena;
pub mod geometry;
pub mod opponents;
pub mod pilot;
pub mod ship;
