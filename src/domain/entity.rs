/// Entities: platforms, ladders, barrels, pickups, monkeys and the boss.
///
/// Entities are flat structs tagged by kind where kinds differ only in data
/// (pickup kind, monkey kind). Behaviour lives in free functions and in the
/// capability traits of `physics` (fallable) and `geometry` (bounded).
/// The player and projectiles have their own modules.
///
/// Nothing is deallocated mid-level: `destroyed` is a logical flag.

use super::geometry::{Aabb, Bounded};
use super::patrol::Patrol;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// -1.0 for left, +1.0 for right.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flip(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Per-frame input signals, polled once per frame by the game loop.
/// Movement is level-triggered; `jump` and `shoot` fire once per press.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub shoot: bool,
}

// ── Sprites ──

/// Sprite handle. The presentation layer decides how a handle looks;
/// the core only needs its pixel size, which defines the entity's box.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Sprite {
    Platform,
    Ladder,
    Barrel,
    Hammer,
    Blaster,
    Boss,
    PlayerLeft,
    PlayerRight,
    PlayerHammerLeft,
    PlayerHammerRight,
    PlayerBlasterLeft,
    PlayerBlasterRight,
    NormalMonkeyLeft,
    NormalMonkeyRight,
    IntelMonkeyLeft,
    IntelMonkeyRight,
    Banana,
    BulletLeft,
    BulletRight,
}

impl Sprite {
    /// (width, height) in pixels of the stock artwork.
    pub fn size(self) -> (f64, f64) {
        match self {
            Sprite::Platform => (128.0, 16.0),
            Sprite::Ladder => (40.0, 152.0),
            Sprite::Barrel => (32.0, 32.0),
            Sprite::Hammer => (28.0, 28.0),
            Sprite::Blaster => (32.0, 22.0),
            Sprite::Boss => (96.0, 80.0),
            Sprite::PlayerLeft | Sprite::PlayerRight => (30.0, 42.0),
            Sprite::PlayerHammerLeft | Sprite::PlayerHammerRight => (46.0, 42.0),
            Sprite::PlayerBlasterLeft | Sprite::PlayerBlasterRight => (44.0, 42.0),
            Sprite::NormalMonkeyLeft | Sprite::NormalMonkeyRight
            | Sprite::IntelMonkeyLeft | Sprite::IntelMonkeyRight => (40.0, 40.0),
            Sprite::Banana => (20.0, 14.0),
            Sprite::BulletLeft | Sprite::BulletRight => (18.0, 8.0),
        }
    }

    /// Box of this sprite drawn centered at (x, y).
    #[inline]
    pub fn aabb_at(self, x: f64, y: f64) -> Aabb {
        let (w, h) = self.size();
        Aabb::new(x, y, w, h)
    }
}

// ── Static scenery ──

/// Landing surface. Never moves.
#[derive(Clone, Debug)]
pub struct Platform {
    pub x: f64,
    pub y: f64,
}

impl Platform {
    pub fn new(x: f64, y: f64) -> Self {
        Platform { x, y }
    }

    /// Y of the walkable top edge.
    #[inline]
    pub fn top(&self) -> f64 {
        self.bounds().top()
    }
}

/// Climbable zone. Falls onto the platform beneath it at level start.
#[derive(Clone, Debug)]
pub struct Ladder {
    pub x: f64,
    pub y: f64,
    pub velocity: f64,
    pub spawn: (f64, f64),
}

impl Ladder {
    pub fn new(x: f64, y: f64) -> Self {
        Ladder { x, y, velocity: 0.0, spawn: (x, y) }
    }

    pub fn reset(&mut self) {
        self.x = self.spawn.0;
        self.y = self.spawn.1;
        self.velocity = 0.0;
    }
}

// ── Hazards and pickups ──

#[derive(Clone, Debug)]
pub struct Barrel {
    pub x: f64,
    pub y: f64,
    pub velocity: f64,
    pub destroyed: bool,
    pub spawn: (f64, f64),
}

impl Barrel {
    pub fn new(x: f64, y: f64) -> Self {
        Barrel { x, y, velocity: 0.0, destroyed: false, spawn: (x, y) }
    }

    pub fn reset(&mut self) {
        self.x = self.spawn.0;
        self.y = self.spawn.1;
        self.velocity = 0.0;
        self.destroyed = false;
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PickupKind {
    Hammer,
    Blaster,
}

/// Weapon lying in the level; consumed on contact.
#[derive(Clone, Debug)]
pub struct Pickup {
    pub kind: PickupKind,
    pub x: f64,
    pub y: f64,
    pub destroyed: bool,
}

impl Pickup {
    pub fn new(kind: PickupKind, x: f64, y: f64) -> Self {
        Pickup { kind, x, y, destroyed: false }
    }

    pub fn sprite(&self) -> Sprite {
        match self.kind {
            PickupKind::Hammer => Sprite::Hammer,
            PickupKind::Blaster => Sprite::Blaster,
        }
    }
}

// ── Characters ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MonkeyKind {
    Normal,
    Intelligent,
}

/// A patrolling monkey. Intelligent monkeys also throw bananas.
#[derive(Clone, Debug)]
pub struct Monkey {
    pub kind: MonkeyKind,
    pub x: f64,
    pub y: f64,
    pub velocity: f64,
    pub destroyed: bool,
    pub patrol: Patrol,
    /// Frames spent grounded since the last banana (intelligent only).
    pub shoot_timer: u32,
    spawn: (f64, f64),
    spawn_facing: Facing,
}

impl Monkey {
    pub fn new(kind: MonkeyKind, x: f64, y: f64, facing: Facing, path: Vec<u32>) -> Self {
        Monkey {
            kind,
            x, y,
            velocity: 0.0,
            destroyed: false,
            patrol: Patrol::new(facing, path),
            shoot_timer: 0,
            spawn: (x, y),
            spawn_facing: facing,
        }
    }

    pub fn facing(&self) -> Facing {
        self.patrol.facing
    }

    pub fn sprite(&self) -> Sprite {
        match (self.kind, self.patrol.facing) {
            (MonkeyKind::Normal, Facing::Left) => Sprite::NormalMonkeyLeft,
            (MonkeyKind::Normal, Facing::Right) => Sprite::NormalMonkeyRight,
            (MonkeyKind::Intelligent, Facing::Left) => Sprite::IntelMonkeyLeft,
            (MonkeyKind::Intelligent, Facing::Right) => Sprite::IntelMonkeyRight,
        }
    }

    pub fn reset(&mut self) {
        self.x = self.spawn.0;
        self.y = self.spawn.1;
        self.velocity = 0.0;
        self.destroyed = false;
        self.shoot_timer = 0;
        self.patrol.reset(self.spawn_facing);
    }
}

/// Starting health of the boss.
pub const BOSS_HEALTH: u32 = 5;

/// The boss: stationary, falls onto its platform, loses health to bullets.
#[derive(Clone, Debug)]
pub struct Boss {
    pub x: f64,
    pub y: f64,
    pub velocity: f64,
    pub health: u32,
    spawn: (f64, f64),
}

impl Boss {
    pub fn new(x: f64, y: f64) -> Self {
        Boss { x, y, velocity: 0.0, health: BOSS_HEALTH, spawn: (x, y) }
    }

    /// One qualifying hit. Health never drops below zero.
    pub fn take_hit(&mut self) {
        self.health = self.health.saturating_sub(1);
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    pub fn reset(&mut self) {
        self.x = self.spawn.0;
        self.y = self.spawn.1;
        self.velocity = 0.0;
        self.health = BOSS_HEALTH;
    }
}

// ── Bounded ──

impl Bounded for Platform {
    fn bounds(&self) -> Aabb { Sprite::Platform.aabb_at(self.x, self.y) }
}

impl Bounded for Ladder {
    fn bounds(&self) -> Aabb { Sprite::Ladder.aabb_at(self.x, self.y) }
}

impl Bounded for Barrel {
    fn bounds(&self) -> Aabb { Sprite::Barrel.aabb_at(self.x, self.y) }
}

impl Bounded for Pickup {
    fn bounds(&self) -> Aabb { self.sprite().aabb_at(self.x, self.y) }
}

impl Bounded for Monkey {
    fn bounds(&self) -> Aabb { self.sprite().aabb_at(self.x, self.y) }
}

impl Bounded for Boss {
    fn bounds(&self) -> Aabb { Sprite::Boss.aabb_at(self.x, self.y) }
}
