//! Built-in pilots used as sparring partners.

use rand::{Rng as _, RngCore};
use rand_distr::{Distribution as _, Normal};

use crate::{
    geometry,
    pilot::{Observation, Pilot},
    ship::Action,
};

/// Picks a uniformly random action every tick.
#[derive(Debug, Clone)]
pub struct Drifter {
    id: String,
}

impl Drifter {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Pilot for Drifter {
    fn id(&self) -> &str {
        &self.id
    }

    fn decide(&mut self, _observation: &Observation, rng: &mut dyn RngCore) -> Action {
        rng.random()
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("aim jitter must be finite and non-negative, got {aim_jitter}")]
pub struct InvalidAimJitterError {
    pub aim_jitter: f64,
}

/// Turns toward the nearest enemy, closes in and shoots when roughly aligned.
///
/// Its aim is perturbed by Gaussian noise so that it does not hit every shot.
#[derive(Debug, Clone)]
pub struct Chaser {
    id: String,
    aim_jitter: Normal<f64>,
}

impl Chaser {
    /// Default standard deviation of the aim error, in degrees.
    pub const DEFAULT_AIM_JITTER: f64 = 8.0;

    const FIRING_CONE: f64 = 10.0;
    const FIRING_RANGE: f64 = 350.0;
    const PREFERRED_DISTANCE: f64 = 200.0;

    /// # Errors
    ///
    /// Fails if `aim_jitter` is negative or not finite.
    pub fn new(id: impl Into<String>, aim_jitter: f64) -> Result<Self, InvalidAimJitterError> {
        let invalid = InvalidAimJitterError { aim_jitter };
        if !aim_jitter.is_finite() || aim_jitter < 0.0 {
            return Err(invalid);
        }
        Ok(Self {
            id: id.into(),
            aim_jitter: Normal::new(0.0, aim_jitter).map_err(|_| invalid)?,
        })
    }
}

impl Pilot for Chaser {
    fn id(&self) -> &str {
        &self.id
    }

    fn decide(&mut self, observation: &Observation, rng: &mut dyn RngCore) -> Action {
        let own = observation.own_ship();
        let Some(target) = observation.nearest_enemy() else {
            return Action::Brake;
        };
        let offset = target.position - own.position;
        let distance = offset.length();
        let aim = offset.heading() + self.aim_jitter.sample(rng);
        let diff = geometry::angle_diff(aim, own.heading);

        if diff.abs() < Self::FIRING_CONE && distance < Self::FIRING_RANGE {
            return Action::Shoot;
        }
        if distance > Self::PREFERRED_DISTANCE && diff.abs() < 45.0 && rng.random_bool(0.5) {
            return Action::Accelerate;
        }
        if diff > 0.0 {
            Action::RotateRight
        } else {
            Action::RotateLeft
        }
    }
}
