use rand::RngCore;
use serde::Serialize;

use crate::{
    geometry::Vec2,
    ship::{Action, Ship},
};

/// Publicly visible state of one ship.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipView {
    pub id: String,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Heading in degrees, within `[0, 360)`.
    pub heading: f64,
    pub health: f64,
}

impl ShipView {
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

impl From<&Ship> for ShipView {
    fn from(ship: &Ship) -> Self {
        Self {
            id: ship.id().to_owned(),
            position: ship.position(),
            velocity: ship.velocity(),
            heading: ship.heading(),
            health: ship.health(),
        }
    }
}

/// What a pilot sees when asked for its next action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub tick: u32,
    pub width: f64,
    pub height: f64,
    /// Every ship of the episode, destroyed ones included, in spawn order.
    pub ships: Vec<ShipView>,
    /// Index of the observing ship within `ships`.
    pub own_index: usize,
}

impl Observation {
    #[must_use]
    pub fn own_ship(&self) -> &ShipView {
        &self.ships[self.own_index]
    }

    /// Ships other than the observer that are still alive.
    pub fn enemies(&self) -> impl Iterator<Item = &ShipView> + '_ {
        self.ships
            .iter()
            .enumerate()
            .filter(move |(i, ship)| *i != self.own_index && ship.is_alive())
            .map(|(_, ship)| ship)
    }

    /// The living enemy closest to the observer.
    #[must_use]
    pub fn nearest_enemy(&self) -> Option<&ShipView> {
        let own = self.own_ship().position;
        self.enemies().min_by(|a, b| {
            own.distance(a.position)
                .total_cmp(&own.distance(b.position))
        })
    }
}

/// Decision logic steering one ship.
///
/// A pilot is asked for exactly one action per tick while its ship is alive. Randomized
/// pilots must draw from the given RNG so that an episode is reproducible from its seed.
pub trait Pilot {
    /// Identifier of the ship this pilot flies. Should be unique within an arena.
    fn id(&self) -> &str;

    fn decide(&mut self, observation: &Observation, rng: &mut dyn RngCore) -> Action;
}

impl<P> Pilot for Box<P>
where
    P: Pilot + ?Sized,
{
    fn id(&self) -> &str {
        (**self).id()
    }

    fn decide(&mut self, observation: &Observation, rng: &mut dyn RngCore) -> Action {
        (**self).decide(observation, rng)
    }
}
