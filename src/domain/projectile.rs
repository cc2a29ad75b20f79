/// Straight-line projectiles: bananas thrown by monkeys, bullets from the blaster.
///
/// A projectile flies horizontally in a fixed direction at a fixed speed and
/// expires once another step would take its travelled distance past
/// `MAX_RANGE`. There is no screen clamp; off-screen flight is harmless.

use super::entity::{Facing, Sprite};
use super::geometry::{Aabb, Bounded};

/// Maximum distance any projectile may travel, pixels.
pub const MAX_RANGE: f64 = 300.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ProjectileKind {
    Banana,
    Bullet,
}

impl ProjectileKind {
    /// Pixels per frame.
    pub fn speed(self) -> f64 {
        match self {
            ProjectileKind::Banana => 1.8,
            ProjectileKind::Bullet => 3.8,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub x: f64,
    pub y: f64,
    pub facing: Facing,
    pub distance: f64,
    pub destroyed: bool,
}

impl Projectile {
    pub fn new(kind: ProjectileKind, x: f64, y: f64, facing: Facing) -> Self {
        Projectile { kind, x, y, facing, distance: 0.0, destroyed: false }
    }

    pub fn banana(x: f64, y: f64, facing: Facing) -> Self {
        Self::new(ProjectileKind::Banana, x, y, facing)
    }

    pub fn bullet(x: f64, y: f64, facing: Facing) -> Self {
        Self::new(ProjectileKind::Bullet, x, y, facing)
    }

    /// One frame of flight.
    pub fn travel(&mut self) {
        let speed = self.kind.speed();
        if self.distance + speed > MAX_RANGE {
            self.destroyed = true;
        } else {
            self.x += speed * self.facing.sign();
            self.distance += speed;
        }
    }

    pub fn sprite(&self) -> Sprite {
        match (self.kind, self.facing) {
            (ProjectileKind::Banana, _) => Sprite::Banana,
            (ProjectileKind::Bullet, Facing::Left) => Sprite::BulletLeft,
            (ProjectileKind::Bullet, Facing::Right) => Sprite::BulletRight,
        }
    }
}

impl Bounded for Projectile {
    fn bounds(&self) -> Aabb { self.sprite().aabb_at(self.x, self.y) }
}
