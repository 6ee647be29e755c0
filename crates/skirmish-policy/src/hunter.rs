//! The hunter: a reactive pilot steered by six evolvable parameters.
//!
//! # Decision Rules
//!
//! Each tick, the first matching rule wins:
//!
//! 1. **Retreat** - health below `retreat_threshold × 100`: accelerate away
//! 2. **Idle** - no living enemy: rotate right
//! 3. **Shoot** - the target is within `shoot_accuracy` degrees of the heading and inside the
//!    firing range `distance_weight × 300`
//! 4. **Brake** - inside the firing range and moving fast: brake with probability
//!    `brake_usage`
//! 5. **Close In** - outside the firing range: accelerate with probability `aggressiveness`
//! 6. **Align** - rotate toward the target
//!
//! The target is the living enemy minimizing `distance × (targeting_weight + health / 100)`,
//! so a low `targeting_weight` favors finishing off damaged ships over engaging the closest.

use std::sync::{Arc, LazyLock};

use rand::{Rng as _, RngCore};
use skirmish_arena::{
    Action, Observation, Pilot, ShipView,
    geometry::{self, Vec2},
    ship::MAX_HEALTH,
};
use skirmish_training::params::{DomainTable, ParameterVector};

/// Ship identifier of the hunter in every arena.
pub const HUNTER_ID: &str = "hunter";

/// Firing range per unit of `distance_weight`, in pixels.
pub const RANGE_UNIT: f64 = 300.0;

/// Speed above which the hunter considers braking.
const FAST_SPEED: f64 = 3.0;

/// Parameter names and their domains, in declaration order.
pub const HUNTER_PARAMETERS: [(&str, f64, f64); 6] = [
    ("retreat_threshold", 0.0, 1.0),
    ("targeting_weight", 0.5, 1.5),
    ("shoot_accuracy", 1.0, 30.0),
    ("distance_weight", 0.1, 5.0),
    ("aggressiveness", 0.0, 1.0),
    ("brake_usage", 0.0, 1.0),
];

static HUNTER_DOMAINS: LazyLock<Arc<DomainTable>> = LazyLock::new(|| {
    let table = DomainTable::new(HUNTER_PARAMETERS).expect("hunter parameter table is valid");
    Arc::new(table)
});

/// The domain table every hunter parameter vector is built from.
#[must_use]
pub fn hunter_domains() -> Arc<DomainTable> {
    Arc::clone(&HUNTER_DOMAINS)
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("parameter vector lacks hunter parameter '{name}'")]
pub struct MissingParameterError {
    pub name: &'static str,
}

/// Hunter parameters decoded from a [`ParameterVector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HunterParams {
    pub retreat_threshold: f64,
    pub targeting_weight: f64,
    /// Half-width of the firing cone, in degrees
    pub shoot_accuracy: f64,
    pub distance_weight: f64,
    /// Probability of closing in when out of range
    pub aggressiveness: f64,
    /// Probability of braking when in range and fast
    pub brake_usage: f64,
}

impl TryFrom<&ParameterVector> for HunterParams {
    type Error = MissingParameterError;

    fn try_from(params: &ParameterVector) -> Result<Self, Self::Error> {
        let get = |name: &'static str| params.get(name).ok_or(MissingParameterError { name });
        Ok(Self {
            retreat_threshold: get("retreat_threshold")?,
            targeting_weight: get("targeting_weight")?,
            shoot_accuracy: get("shoot_accuracy")?,
            distance_weight: get("distance_weight")?,
            aggressiveness: get("aggressiveness")?.clamp(0.0, 1.0),
            brake_usage: get("brake_usage")?.clamp(0.0, 1.0),
        })
    }
}

impl HunterParams {
    #[must_use]
    pub fn firing_range(&self) -> f64 {
        self.distance_weight * RANGE_UNIT
    }

    fn target_cost(&self, own: Vec2, enemy: &ShipView) -> f64 {
        own.distance(enemy.position) * (self.targeting_weight + enemy.health / MAX_HEALTH)
    }
}

/// A [`Pilot`] following the hunter decision rules.
#[derive(Debug, Clone)]
pub struct HunterPilot {
    params: HunterParams,
}

impl HunterPilot {
    #[must_use]
    pub fn new(params: HunterParams) -> Self {
        Self { params }
    }

    /// # Errors
    ///
    /// Fails if `params` lacks one of the hunter parameters.
    pub fn from_vector(params: &ParameterVector) -> Result<Self, MissingParameterError> {
        HunterParams::try_from(params).map(Self::new)
    }

    #[must_use]
    pub fn params(&self) -> &HunterParams {
        &self.params
    }
}

impl Pilot for HunterPilot {
    fn id(&self) -> &str {
        HUNTER_ID
    }

    fn decide(&mut self, observation: &Observation, rng: &mut dyn RngCore) -> Action {
        let p = &self.params;
        let own = observation.own_ship();

        if own.health < p.retreat_threshold * MAX_HEALTH {
            return Action::Accelerate;
        }

        let target = observation.enemies().min_by(|a, b| {
            p.target_cost(own.position, a)
                .total_cmp(&p.target_cost(own.position, b))
        });
        let Some(target) = target else {
            return Action::RotateRight;
        };

        let offset = target.position - own.position;
        let distance = offset.length();
        let diff = geometry::angle_diff(offset.heading(), own.heading);
        let in_range = distance < p.firing_range();

        if diff.abs() < p.shoot_accuracy && in_range {
            return Action::Shoot;
        }
        if in_range && own.velocity.length() > FAST_SPEED && rng.random_bool(p.brake_usage) {
            return Action::Brake;
        }
        if !in_range && rng.random_bool(p.aggressiveness) {
            return Action::Accelerate;
        }
        if diff > 0.0 {
            Action::RotateRight
        } else {
            Action::RotateLeft
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn params() -> HunterParams {
        HunterParams {
            retreat_threshold: 0.2,
            targeting_weight: 1.0,
            shoot_accuracy: 10.0,
            distance_weight: 1.0,
            aggressiveness: 1.0,
            brake_usage: 1.0,
        }
    }

    fn view(id: &str, position: Vec2, heading: f64, health: f64) -> ShipView {
        ShipView {
            id: id.to_owned(),
            position,
            velocity: Vec2::ZERO,
            heading,
            health,
        }
    }

    fn observation(own: ShipView, enemies: Vec<ShipView>) -> Observation {
        let mut ships = vec![own];
        ships.extend(enemies);
        Observation {
            tick: 0,
            width: 800.0,
            height: 600.0,
            ships,
            own_index: 0,
        }
    }

    fn decide(params: HunterParams, observation: &Observation) -> Action {
        let mut rng = Pcg32::seed_from_u64(0);
        HunterPilot::new(params).decide(observation, &mut rng)
    }

    #[test]
    fn test_domains_match_declaration() {
        let domains = hunter_domains();
        assert_eq!(domains.len(), HUNTER_PARAMETERS.len());
        assert_eq!(
            domains.domain("shoot_accuracy").map(|d| (d.min(), d.max())),
            Some((1.0, 30.0))
        );
        assert!(Arc::ptr_eq(&domains, &hunter_domains()));
    }

    #[test]
    fn test_decode_from_vector() {
        let domains = hunter_domains();
        let mut rng = Pcg32::seed_from_u64(3);
        let vector = ParameterVector::sample_random(&domains, &mut rng);
        let decoded = HunterParams::try_from(&vector).unwrap();
        assert_eq!(Some(decoded.brake_usage), vector.get("brake_usage"));

        let partial = Arc::new(DomainTable::new([("retreat_threshold", 0.0, 1.0)]).unwrap());
        let vector = ParameterVector::sample_random(&partial, &mut rng);
        assert!(matches!(
            HunterPilot::from_vector(&vector),
            Err(MissingParameterError {
                name: "targeting_weight"
            })
        ));
    }

    #[test]
    fn test_retreats_when_damaged() {
        let obs = observation(
            view(HUNTER_ID, Vec2::new(100.0, 100.0), 0.0, 10.0),
            vec![view("enemy", Vec2::new(150.0, 100.0), 0.0, 100.0)],
        );
        assert_eq!(decide(params(), &obs), Action::Accelerate);
    }

    #[test]
    fn test_idles_without_enemies() {
        let obs = observation(
            view(HUNTER_ID, Vec2::new(100.0, 100.0), 0.0, 100.0),
            vec![view("wreck", Vec2::new(150.0, 100.0), 0.0, 0.0)],
        );
        assert_eq!(decide(params(), &obs), Action::RotateRight);
    }

    #[test]
    fn test_shoots_aligned_target_in_range() {
        let obs = observation(
            view(HUNTER_ID, Vec2::new(100.0, 100.0), 0.0, 100.0),
            vec![view("enemy", Vec2::new(300.0, 105.0), 0.0, 100.0)],
        );
        assert_eq!(decide(params(), &obs), Action::Shoot);

        let short_range = HunterParams {
            distance_weight: 0.5,
            ..params()
        };
        assert_eq!(decide(short_range, &obs), Action::Accelerate);
    }

    #[test]
    fn test_brakes_when_fast_in_range() {
        let mut own = view(HUNTER_ID, Vec2::new(100.0, 100.0), 0.0, 100.0);
        own.velocity = Vec2::new(5.0, 0.0);
        let obs = observation(own, vec![view("enemy", Vec2::new(100.0, 250.0), 0.0, 100.0)]);
        assert_eq!(decide(params(), &obs), Action::Brake);

        let no_brake = HunterParams {
            brake_usage: 0.0,
            ..params()
        };
        assert_eq!(decide(no_brake, &obs), Action::RotateRight);
    }

    #[test]
    fn test_targeting_weight_prefers_damaged_ships() {
        let own = view(HUNTER_ID, Vec2::new(100.0, 300.0), 0.0, 100.0);
        // healthy enemy ahead at 200 px, damaged enemy above at 250 px
        let enemies = vec![
            view("healthy", Vec2::new(300.0, 300.0), 0.0, 100.0),
            view("damaged", Vec2::new(100.0, 50.0), 0.0, 10.0),
        ];
        let obs = observation(own, enemies);

        // 200 × 1.6 = 320 vs 250 × 0.7 = 175: the damaged ship is the target
        let picky = HunterParams {
            targeting_weight: 0.6,
            ..params()
        };
        assert_eq!(decide(picky, &obs), Action::RotateLeft);
        // a much closer healthy ship wins: 50 × 2.0 = 100 vs 250 × 1.1 = 275
        let obs = observation(
            view(HUNTER_ID, Vec2::new(100.0, 300.0), 0.0, 100.0),
            vec![
                view("healthy", Vec2::new(150.0, 300.0), 0.0, 100.0),
                view("damaged", Vec2::new(100.0, 50.0), 0.0, 10.0),
            ],
        );
        assert_eq!(decide(params(), &obs), Action::Shoot);
    }
}
