/// The player character: movement, ladders, jumping, weapons and contacts.
///
/// ## States
///
/// Movement: grounded, airborne (jumping or falling), climbing.
/// Loadout: unarmed, hammer, blaster (with ammo > 0).
///
/// The loadout is a single `Weapon` value, so hammer and blaster can never be
/// held together. Picking up either one replaces the other; firing the last
/// round drops back to unarmed.
///
/// Contact queries (`touch_*`) destroy what the hammer smashes and report
/// whether any contact happened; the level decides what a contact means.

use super::entity::{Barrel, Boss, Facing, Ladder, Monkey, Pickup, PickupKind, Platform, Sprite};
use super::geometry::{intersects, Aabb, Bounded};
use super::physics::{self, Fallable, PLAYER_GRAVITY};
use super::projectile::Projectile;

/// Horizontal walk and ladder climb speed, pixels per frame.
pub const PLAYER_SPEED: f64 = 3.5;

/// Upward impulse applied when a jump starts.
pub const JUMP_VELOCITY: f64 = -5.0;

/// Highest the player can be above a barrel's top and still score jumping it.
pub const JUMP_HEIGHT: f64 = 65.0;

/// Rounds granted by each blaster pickup.
pub const BLASTER_AMMO: u32 = 5;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Weapon {
    None,
    Hammer,
    Blaster,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    pub velocity: f64,
    pub facing: Facing,
    pub climbing: bool,
    pub weapon: Weapon,
    pub ammo: u32,
    spawn: (f64, f64),
}

impl Player {
    pub fn new(x: f64, y: f64) -> Self {
        Player {
            x, y,
            velocity: 0.0,
            facing: Facing::Right,
            climbing: false,
            weapon: Weapon::None,
            ammo: 0,
            spawn: (x, y),
        }
    }

    /// Back to the respawn point, unarmed and facing right.
    pub fn reset(&mut self) {
        *self = Player::new(self.spawn.0, self.spawn.1);
    }

    pub fn has_hammer(&self) -> bool {
        self.weapon == Weapon::Hammer
    }

    pub fn has_blaster(&self) -> bool {
        self.weapon == Weapon::Blaster
    }

    pub fn sprite(&self) -> Sprite {
        match (self.weapon, self.facing) {
            (Weapon::None, Facing::Left) => Sprite::PlayerLeft,
            (Weapon::None, Facing::Right) => Sprite::PlayerRight,
            (Weapon::Hammer, Facing::Left) => Sprite::PlayerHammerLeft,
            (Weapon::Hammer, Facing::Right) => Sprite::PlayerHammerRight,
            (Weapon::Blaster, Facing::Left) => Sprite::PlayerBlasterLeft,
            (Weapon::Blaster, Facing::Right) => Sprite::PlayerBlasterRight,
        }
    }

    // ── Gravity ──

    /// Like `physics::is_airborne`, but a climbing player is never airborne.
    pub fn is_airborne(&mut self, platforms: &[Platform]) -> bool {
        if self.climbing {
            return false;
        }
        physics::is_airborne(self, platforms)
    }

    /// Resolve one frame of falling. Returns whether the player was airborne.
    pub fn fall(&mut self, platforms: &[Platform]) -> bool {
        if self.is_airborne(platforms) {
            physics::apply_gravity(self);
            true
        } else {
            false
        }
    }

    // ── Ladders ──

    /// Enter or leave the climbing state depending on ladder overlap.
    /// Entering a ladder cancels any vertical velocity.
    pub fn update_ladder(&mut self, ladders: &[Ladder]) -> bool {
        self.climbing = physics::ladder_at(&self.bounds(), ladders).is_some();
        if self.climbing {
            self.velocity = 0.0;
        }
        self.climbing
    }

    pub fn at_ladder_top(&self, ladders: &[Ladder]) -> bool {
        let b = self.bounds();
        physics::ladder_at(&b, ladders).is_some_and(|l| physics::at_ladder_top(&b, l))
    }

    pub fn above_ladder_bottom(&self, ladders: &[Ladder]) -> bool {
        let b = self.bounds();
        physics::ladder_at(&b, ladders).is_some_and(|l| physics::above_ladder_bottom(&b, l))
    }

    /// Climb up if on a ladder and not yet at its top. Returns whether it moved.
    pub fn climb_up(&mut self, ladders: &[Ladder]) -> bool {
        if !self.update_ladder(ladders) || self.at_ladder_top(ladders) {
            return false;
        }
        let b = self.bounds();
        if let Some(l) = physics::ladder_at(&b, ladders) {
            self.y = physics::climb_up_y(&b, l, PLAYER_SPEED);
        }
        true
    }

    /// Climb down if on a ladder and above its bottom. Returns whether it moved.
    pub fn climb_down(&mut self, ladders: &[Ladder]) -> bool {
        if !self.update_ladder(ladders) || !self.above_ladder_bottom(ladders) {
            return false;
        }
        let b = self.bounds();
        if let Some(l) = physics::ladder_at(&b, ladders) {
            self.y = physics::climb_down_y(&b, l, PLAYER_SPEED);
        }
        true
    }

    // ── Movement ──

    pub fn move_left(&mut self) {
        self.x = (self.x - PLAYER_SPEED).max(0.0);
        self.facing = Facing::Left;
    }

    pub fn move_right(&mut self, window_width: f64) {
        self.x = (self.x + PLAYER_SPEED).min(window_width);
        self.facing = Facing::Right;
    }

    /// A jump may start from the ground, or from the head of a ladder.
    pub fn can_jump(&mut self, platforms: &[Platform], ladders: &[Ladder]) -> bool {
        !self.is_airborne(platforms) && (!self.climbing || self.at_ladder_top(ladders))
    }

    /// Start a jump if vertically at rest. The first step of the arc is
    /// taken immediately so the next landing check sees the player airborne.
    pub fn start_jump(&mut self) -> bool {
        if self.velocity != 0.0 {
            return false;
        }
        self.velocity = JUMP_VELOCITY;
        self.y += self.velocity;
        true
    }

    // ── Weapons ──

    /// Consume the first untouched pickup of `kind` under the player and equip it.
    pub fn take_pickup(&mut self, pickups: &mut [Pickup], kind: PickupKind) -> bool {
        let me = self.bounds();
        let Some(p) = pickups
            .iter_mut()
            .find(|p| p.kind == kind && !p.destroyed && p.bounds().intersects(&me))
        else {
            return false;
        };
        p.destroyed = true;
        self.equip(kind);
        true
    }

    pub fn equip(&mut self, kind: PickupKind) {
        match kind {
            PickupKind::Hammer => {
                self.weapon = Weapon::Hammer;
                self.ammo = 0;
            }
            PickupKind::Blaster => {
                self.ammo = if self.has_blaster() { self.ammo + BLASTER_AMMO } else { BLASTER_AMMO };
                self.weapon = Weapon::Blaster;
            }
        }
    }

    /// Fire one bullet in the facing direction. The last round drops the blaster.
    pub fn shoot(&mut self) -> Option<Projectile> {
        if self.ammo == 0 {
            return None;
        }
        self.ammo -= 1;
        if self.ammo == 0 {
            self.weapon = Weapon::None;
        }
        Some(Projectile::bullet(self.x, self.y, self.facing))
    }

    // ── Contacts ──

    /// Touching a live barrel. Smashes it when holding the hammer.
    pub fn touch_barrel(&self, barrels: &mut [Barrel]) -> bool {
        let me = self.bounds();
        match barrels.iter_mut().find(|b| !b.destroyed && b.bounds().intersects(&me)) {
            Some(b) => {
                if self.has_hammer() {
                    b.destroyed = true;
                }
                true
            }
            None => false,
        }
    }

    /// Touching a live monkey. Smashes it when holding the hammer.
    pub fn touch_monkey(&self, monkeys: &mut [Monkey]) -> bool {
        let me = self.bounds();
        match monkeys.iter_mut().find(|m| !m.destroyed && m.bounds().intersects(&me)) {
            Some(m) => {
                if self.has_hammer() {
                    m.destroyed = true;
                }
                true
            }
            None => false,
        }
    }

    pub fn touch_boss(&self, boss: &Boss) -> bool {
        intersects(self, boss)
    }

    /// Bananas hit regardless of weapon.
    pub fn touch_banana(&self, bananas: &[Projectile]) -> bool {
        bananas.iter().any(|b| !b.destroyed && intersects(self, b))
    }

    // ── Jump-over scoring ──

    /// Will this frame's step right carry the player over a live barrel
    /// while within jumping height above it?
    pub fn passes_barrel_right(&self, barrels: &[Barrel]) -> bool {
        barrels.iter().any(|b| {
            !b.destroyed
                && self.x < b.x
                && self.x + PLAYER_SPEED >= b.x
                && self.clears(b)
        })
    }

    pub fn passes_barrel_left(&self, barrels: &[Barrel]) -> bool {
        barrels.iter().any(|b| {
            !b.destroyed
                && self.x > b.x
                && self.x - PLAYER_SPEED <= b.x
                && self.clears(b)
        })
    }

    fn clears(&self, b: &Barrel) -> bool {
        self.y < b.y && b.bounds().top() - self.y <= JUMP_HEIGHT
    }
}

impl Bounded for Player {
    fn bounds(&self) -> Aabb { self.sprite().aabb_at(self.x, self.y) }
}

impl Fallable for Player {
    fn gravity(&self) -> f64 { PLAYER_GRAVITY }
    fn velocity(&self) -> f64 { self.velocity }
    fn set_velocity(&mut self, v: f64) { self.velocity = v; }
    fn set_y(&mut self, y: f64) { self.y = y; }
    fn y(&self) -> f64 { self.y }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
