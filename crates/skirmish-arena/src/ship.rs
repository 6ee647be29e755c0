use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use crate::geometry::{self, Vec2};

/// Starting and maximum health of a ship.
pub const MAX_HEALTH: f64 = 100.0;
/// Collision radius of a ship.
pub const SHIP_RADIUS: f64 = 15.0;
/// Speed gained per `Accelerate`.
pub const THRUST: f64 = 0.5;
/// Velocity multiplier applied per `Brake`.
pub const BRAKE_FACTOR: f64 = 0.8;
pub const MAX_SPEED: f64 = 6.0;
/// Degrees turned per rotation action.
pub const TURN_RATE: f64 = 5.0;
/// Ticks between two shots of the same ship.
pub const SHOOT_COOLDOWN: u32 = 10;

pub const BULLET_SPEED: f64 = 10.0;
pub const BULLET_LIFETIME: u32 = 60;
pub const BULLET_DAMAGE: f64 = 20.0;

/// Score for landing a hit.
pub const HIT_SCORE: u32 = 10;
/// Score for destroying a ship.
pub const KILL_SCORE: u32 = 50;

/// What a pilot can do in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum Action {
    Accelerate,
    Brake,
    RotateLeft,
    RotateRight,
    Shoot,
}

impl Action {
    pub const ALL: [Self; 5] = [
        Self::Accelerate,
        Self::Brake,
        Self::RotateLeft,
        Self::RotateRight,
        Self::Shoot,
    ];
}

impl Distribution<Action> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Action {
        Action::ALL[rng.random_range(0..Action::ALL.len())]
    }
}

/// A ship taking part in an episode.
#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    id: String,
    position: Vec2,
    velocity: Vec2,
    heading: f64,
    health: f64,
    score: u32,
    kills: u32,
    cooldown: u32,
}

impl Ship {
    #[must_use]
    pub fn new(id: impl Into<String>, position: Vec2, heading: f64) -> Self {
        Self {
            id: id.into(),
            position,
            velocity: Vec2::ZERO,
            heading: geometry::normalize_degrees(heading),
            health: MAX_HEALTH,
            score: 0,
            kills: 0,
            cooldown: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Heading in degrees, within `[0, 360)`.
    #[must_use]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    #[must_use]
    pub fn health(&self) -> f64 {
        self.health
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn kills(&self) -> u32 {
        self.kills
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }

    /// Applies `action` and returns the bullet it fired, if any.
    pub fn apply(&mut self, action: Action, ship_index: usize) -> Option<Bullet> {
        match action {
            Action::Accelerate => {
                self.velocity = (self.velocity + Vec2::from_heading(self.heading) * THRUST)
                    .clamp_length(MAX_SPEED);
            }
            Action::Brake => self.velocity = self.velocity * BRAKE_FACTOR,
            Action::RotateLeft => {
                self.heading = geometry::normalize_degrees(self.heading - TURN_RATE);
            }
            Action::RotateRight => {
                self.heading = geometry::normalize_degrees(self.heading + TURN_RATE);
            }
            Action::Shoot => {
                if self.cooldown == 0 {
                    self.cooldown = SHOOT_COOLDOWN;
                    let direction = Vec2::from_heading(self.heading);
                    return Some(Bullet {
                        owner: ship_index,
                        position: self.position + direction * SHIP_RADIUS,
                        velocity: direction * BULLET_SPEED,
                        ttl: BULLET_LIFETIME,
                    });
                }
            }
        }
        None
    }

    /// Moves the ship by its velocity, stopping at the arena walls.
    pub(crate) fn advance(&mut self, width: f64, height: f64) {
        self.cooldown = self.cooldown.saturating_sub(1);
        let next = self.position + self.velocity;
        let (min_x, max_x) = (SHIP_RADIUS, width - SHIP_RADIUS);
        let (min_y, max_y) = (SHIP_RADIUS, height - SHIP_RADIUS);
        if !(min_x..=max_x).contains(&next.x) {
            self.velocity.x = 0.0;
        }
        if !(min_y..=max_y).contains(&next.y) {
            self.velocity.y = 0.0;
        }
        self.position = Vec2::new(next.x.clamp(min_x, max_x), next.y.clamp(min_y, max_y));
    }

    /// Applies a hit. Returns `true` if this hit destroyed the ship.
    pub(crate) fn take_hit(&mut self, damage: f64) -> bool {
        let was_destroyed = self.is_destroyed();
        self.health = (self.health - damage).max(0.0);
        !was_destroyed && self.is_destroyed()
    }

    pub(crate) fn credit_hit(&mut self, destroyed: bool) {
        self.score += HIT_SCORE;
        if destroyed {
            self.score += KILL_SCORE;
            self.kills += 1;
        }
    }

    #[must_use]
    pub fn record(&self) -> ShipRecord {
        ShipRecord {
            id: self.id.clone(),
            score: self.score,
            kills: self.kills,
            survived: !self.is_destroyed(),
            health: self.health,
        }
    }
}

/// A projectile in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    /// Index of the firing ship within the arena.
    pub owner: usize,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Remaining ticks before the bullet fizzles out.
    pub ttl: u32,
}

/// Final state of one ship at the end of an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipRecord {
    pub id: String,
    pub score: u32,
    pub kills: u32,
    pub survived: bool,
    pub health: f64,
}
