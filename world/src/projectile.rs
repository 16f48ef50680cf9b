//! Pooled projectiles fired by towers.

use dam_defense_core::{
    geometry, AttackType, Effect, EnemyId, Poolable, Position, PROJECTILE_HIT_DISTANCE,
};

/// Splash parameters carried by an area projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Splash {
    /// Splash radius in range units.
    pub radius: f32,
    /// Upper bound on enemies hit.
    pub max_targets: Option<u32>,
}

/// Everything a tower decides when it fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Launch {
    /// Firing position.
    pub origin: Position,
    /// Homing target, if any.
    pub target: Option<EnemyId>,
    /// Fallback travel direction.
    pub direction: Position,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Damage before mitigation; zero for cosmetic shots.
    pub damage: f32,
    /// Damage channel.
    pub attack_type: AttackType,
    /// Splash parameters for area shots.
    pub splash: Option<Splash>,
    /// Effect applied on impact.
    pub effect: Option<Effect>,
    /// Distance after which an untargeted shot expires.
    pub max_distance: f32,
}

/// Outcome of advancing a projectile by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flight {
    /// Still travelling.
    Travelling,
    /// Reached its target this tick.
    Arrived,
    /// Lost its target or flew past its maximum distance.
    Expired,
}

/// A projectile in flight.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projectile {
    origin: Position,
    position: Position,
    target: Option<EnemyId>,
    direction: Position,
    speed: f32,
    damage: f32,
    attack_type: Option<AttackType>,
    splash: Option<Splash>,
    effect: Option<Effect>,
    travelled: f32,
    max_distance: f32,
    active: bool,
}

impl Projectile {
    /// Arms the projectile with a launch description.
    pub fn launch(&mut self, launch: Launch) {
        self.origin = launch.origin;
        self.position = launch.origin;
        self.target = launch.target;
        self.direction = geometry::normalize(launch.direction);
        self.speed = launch.speed;
        self.damage = launch.damage;
        self.attack_type = Some(launch.attack_type);
        self.splash = launch.splash;
        self.effect = launch.effect;
        self.travelled = 0.0;
        self.max_distance = launch.max_distance;
        self.active = true;
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Firing position.
    #[must_use]
    pub fn origin(&self) -> Position {
        self.origin
    }

    /// Homing target.
    #[must_use]
    pub fn target(&self) -> Option<EnemyId> {
        self.target
    }

    /// Damage before mitigation.
    #[must_use]
    pub fn damage(&self) -> f32 {
        self.damage
    }

    /// Damage channel; physical until launched.
    #[must_use]
    pub fn attack_type(&self) -> AttackType {
        self.attack_type.unwrap_or(AttackType::Physical)
    }

    /// Splash parameters.
    #[must_use]
    pub fn splash(&self) -> Option<Splash> {
        self.splash
    }

    /// Effect applied on impact.
    #[must_use]
    pub fn effect(&self) -> Option<Effect> {
        self.effect
    }

    /// Whether the projectile is in flight.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Moves the projectile for `dt` seconds.
    ///
    /// `target_position` is the current position of the homing target, or
    /// `None` when the target is gone. Homing shots without a target expire.
    pub fn advance(&mut self, dt: f32, target_position: Option<Position>) -> Flight {
        if !self.active {
            return Flight::Expired;
        }
        let step = self.speed * dt;
        match (self.target, target_position) {
            (Some(_), None) => self.retire(),
            (Some(_), Some(goal)) => {
                if geometry::distance(self.position, goal) < PROJECTILE_HIT_DISTANCE {
                    self.active = false;
                    return Flight::Arrived;
                }
                self.direction = geometry::normalize(goal - self.position);
                self.position = geometry::step_toward(self.position, goal, step);
                Flight::Travelling
            }
            (None, _) => {
                self.position += self.direction * step;
                self.travelled += step;
                if self.travelled >= self.max_distance {
                    self.retire()
                } else {
                    Flight::Travelling
                }
            }
        }
    }

    fn retire(&mut self) -> Flight {
        self.active = false;
        Flight::Expired
    }
}

impl Poolable for Projectile {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dam_defense_core::{EnemyKind, ObjectPool};

    fn launch(target: Option<EnemyId>) -> Launch {
        Launch {
            origin: Position::ZERO,
            target,
            direction: Position::X,
            speed: 100.0,
            damage: 10.0,
            attack_type: AttackType::Physical,
            splash: None,
            effect: None,
            max_distance: 150.0,
        }
    }

    #[test]
    fn homing_shot_arrives_within_hit_distance() {
        let mut projectile = Projectile::default();
        projectile.launch(launch(Some(EnemyId::new(EnemyKind::Rat, 1))));
        let goal = Position::new(50.0, 0.0);

        assert_eq!(projectile.advance(0.3, Some(goal)), Flight::Travelling);
        assert_eq!(projectile.advance(0.3, Some(goal)), Flight::Travelling);
        assert_eq!(projectile.position(), goal);
        assert_eq!(projectile.advance(0.3, Some(goal)), Flight::Arrived);
        assert!(!projectile.is_active());
    }

    #[test]
    fn homing_shot_without_target_expires() {
        let mut projectile = Projectile::default();
        projectile.launch(launch(Some(EnemyId::new(EnemyKind::Rat, 1))));
        assert_eq!(projectile.advance(0.1, None), Flight::Expired);
    }

    #[test]
    fn straight_shot_expires_after_max_distance() {
        let mut projectile = Projectile::default();
        projectile.launch(launch(None));
        assert_eq!(projectile.advance(1.0, None), Flight::Travelling);
        assert_eq!(projectile.advance(1.0, None), Flight::Expired);
    }

    #[test]
    fn pooled_projectile_is_reset() {
        let mut pool = ObjectPool::with_capacity(2);
        let mut projectile = pool.acquire(Projectile::default);
        projectile.launch(launch(None));
        pool.release(projectile);

        let reused = pool.acquire(Projectile::default);
        assert_eq!(reused, Projectile::default());
    }
}
