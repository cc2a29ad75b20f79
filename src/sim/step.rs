/// The step function: advances the world by one frame.
///
/// Processing order:
///   1. Input (walk, climb, jump, shoot; jump-over scoring)
///   2. Spawn settling (barrels and ladders authored inside platforms)
///   3. Gravity (barrels, ladders, boss, monkeys, player)
///   4. Monkeys (banana timer, patrol walk) and projectile travel
///   5. Contacts (pickups, ladders, hammer smashes, bullet hits)
///   6. Win / lose
///   7. Frame budget
///
/// Expired and spent projectiles are compacted at the end of the frame,
/// never while their list is being walked.

use tracing::{debug, info};

use crate::domain::entity::{FrameInput, MonkeyKind, PickupKind};
use crate::domain::geometry::Bounded;
use crate::domain::physics;
use crate::domain::projectile::Projectile;
use super::event::GameEvent;
use super::world::{Level, LevelKind, Phase, WorldState};

/// Points for jumping over a barrel.
pub const BARREL_JUMP_POINTS: u32 = 30;
/// Points for smashing a barrel.
pub const BARREL_SMASH_POINTS: u32 = 100;
/// Points for destroying a monkey, by hammer or bullet.
pub const MONKEY_POINTS: u32 = 100;
/// Points per whole second left when a shooting level is cleared.
pub const TIME_BONUS_FACTOR: u32 = 3;
/// Seconds a grounded intelligent monkey waits between bananas.
pub const BANANA_PERIOD_SECS: u32 = 5;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Outcome {
    Continue,
    Won,
    Lost,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    let fresh_jump = input.jump && !world.jump_held;
    world.jump_held = input.jump;
    let input = FrameInput { jump: fresh_jump, ..input };

    let window_w = world.window.width;
    let fps = world.gameplay.fps.max(1);
    let lv = &mut world.levels[world.current];
    let score = &mut world.score;

    resolve_input(lv, input, window_w, score, &mut events);
    resolve_settling(lv);
    resolve_gravity(lv);
    resolve_monkeys(lv, window_w, fps, &mut events);
    resolve_projectiles(lv);
    resolve_contacts(lv, score, &mut events);

    let outcome = resolve_outcome(lv);
    lv.bananas.retain(|p| !p.destroyed);
    lv.bullets.retain(|p| !p.destroyed);

    match outcome {
        Outcome::Continue => {
            lv.frames_left = lv.frames_left.saturating_sub(1);
        }
        Outcome::Won => {
            let time_bonus = if lv.kind == LevelKind::Shoot {
                lv.boss.health = 0;
                TIME_BONUS_FACTOR * (lv.frames_left / fps)
            } else {
                0
            };
            *score += time_bonus;
            let level = world.current;
            info!(level, time_bonus, score = world.score, "level cleared");
            events.push(GameEvent::LevelCleared { level, time_bonus });
            if world.advance() {
                info!(score = world.score, "game won");
                events.push(GameEvent::GameWon);
            }
        }
        Outcome::Lost => {
            info!(level = world.current, "game lost");
            world.lose();
            events.push(GameEvent::GameLost);
        }
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Input
// ══════════════════════════════════════════════════════════════

fn resolve_input(
    lv: &mut Level,
    input: FrameInput,
    window_w: f64,
    score: &mut u32,
    events: &mut Vec<GameEvent>,
) {
    let p = &mut lv.player;

    if input.right {
        if p.passes_barrel_right(&lv.barrels) {
            *score += BARREL_JUMP_POINTS;
            events.push(GameEvent::BarrelJumped);
        }
        p.move_right(window_w);
    }
    if input.left {
        if p.passes_barrel_left(&lv.barrels) {
            *score += BARREL_JUMP_POINTS;
            events.push(GameEvent::BarrelJumped);
        }
        p.move_left();
    }

    if input.up {
        p.climb_up(&lv.ladders);
    }
    if input.down {
        p.climb_down(&lv.ladders);
    }

    if input.jump && p.can_jump(&lv.platforms, &lv.ladders) && p.start_jump() {
        events.push(GameEvent::Jumped);
    }

    if input.shoot {
        if let Some(bullet) = p.shoot() {
            lv.bullets.push(bullet);
            events.push(GameEvent::Shot { ammo_left: p.ammo });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Settling and gravity
// ══════════════════════════════════════════════════════════════

fn resolve_settling(lv: &mut Level) {
    for b in lv.barrels.iter_mut().filter(|b| !b.destroyed) {
        physics::settle_barrel(b, &lv.platforms);
    }
    for l in &mut lv.ladders {
        physics::settle_ladder(l, &lv.platforms);
    }
}

fn resolve_gravity(lv: &mut Level) {
    let platforms = &lv.platforms;
    for b in lv.barrels.iter_mut().filter(|b| !b.destroyed) {
        physics::fall(b, platforms);
    }
    for l in &mut lv.ladders {
        physics::fall(l, platforms);
    }
    for m in lv.monkeys.iter_mut().filter(|m| !m.destroyed) {
        physics::fall(m, platforms);
    }
    physics::fall(&mut lv.boss, platforms);
    lv.player.fall(platforms);
}

// ══════════════════════════════════════════════════════════════
// Monkeys and projectiles
// ══════════════════════════════════════════════════════════════

/// Grounded monkeys walk their patrol; grounded intelligent monkeys also
/// count down to their next banana.
fn resolve_monkeys(lv: &mut Level, window_w: f64, fps: u32, events: &mut Vec<GameEvent>) {
    let period = BANANA_PERIOD_SECS * fps;
    for m in lv.monkeys.iter_mut().filter(|m| !m.destroyed) {
        if physics::is_airborne(m, &lv.platforms) {
            continue;
        }

        if m.kind == MonkeyKind::Intelligent {
            m.shoot_timer += 1;
            if m.shoot_timer >= period {
                m.shoot_timer = 0;
                lv.bananas.push(Projectile::banana(m.x, m.y, m.facing()));
                events.push(GameEvent::BananaThrown);
            }
        }

        let body = m.bounds();
        m.x = m.patrol.advance(&body, &lv.platforms, window_w);
    }
}

fn resolve_projectiles(lv: &mut Level) {
    for p in lv.bananas.iter_mut().chain(lv.bullets.iter_mut()) {
        p.travel();
    }
}

// ══════════════════════════════════════════════════════════════
// Contacts
// ══════════════════════════════════════════════════════════════

fn resolve_contacts(lv: &mut Level, score: &mut u32, events: &mut Vec<GameEvent>) {
    let p = &mut lv.player;

    for kind in [PickupKind::Hammer, PickupKind::Blaster] {
        if p.take_pickup(&mut lv.pickups, kind) {
            debug!(?kind, ammo = p.ammo, "weapon picked");
            events.push(GameEvent::WeaponPicked(kind));
        }
    }

    p.update_ladder(&lv.ladders);

    if p.has_hammer() && p.touch_barrel(&mut lv.barrels) {
        *score += BARREL_SMASH_POINTS;
        debug!("barrel smashed");
        events.push(GameEvent::BarrelSmashed);
    }
    if p.has_hammer() && p.touch_monkey(&mut lv.monkeys) {
        *score += MONKEY_POINTS;
        debug!("monkey smashed");
        events.push(GameEvent::MonkeySmashed);
    }

    // One bullet per monkey; a spent bullet hits nothing else.
    for m in lv.monkeys.iter_mut().filter(|m| !m.destroyed) {
        let body = m.bounds();
        if let Some(b) = lv.bullets.iter_mut().find(|b| !b.destroyed && b.bounds().intersects(&body)) {
            b.destroyed = true;
            m.destroyed = true;
            *score += MONKEY_POINTS;
            debug!("monkey shot");
            events.push(GameEvent::MonkeyShot);
        }
    }

    // Only the shoot-level boss can be worn down.
    if lv.kind != LevelKind::Shoot {
        return;
    }
    let boss = lv.boss.bounds();
    for b in lv.bullets.iter_mut().filter(|b| !b.destroyed) {
        if b.bounds().intersects(&boss) {
            b.destroyed = true;
            lv.boss.take_hit();
            debug!(health = lv.boss.health, "boss hit");
            events.push(GameEvent::BossHit { health: lv.boss.health });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Win / lose
// ══════════════════════════════════════════════════════════════

fn resolve_outcome(lv: &mut Level) -> Outcome {
    let p = &lv.player;
    let armed = p.has_hammer();

    let lost = lv.frames_left == 0
        || (!armed && p.touch_barrel(&mut lv.barrels))
        || (!armed && p.touch_boss(&lv.boss))
        || p.touch_banana(&lv.bananas)
        || (!armed && p.touch_monkey(&mut lv.monkeys));

    let hammered_boss = armed && p.touch_boss(&lv.boss);

    match lv.kind {
        LevelKind::Climb => {
            if lost {
                Outcome::Lost
            } else if hammered_boss {
                Outcome::Won
            } else {
                Outcome::Continue
            }
        }
        LevelKind::Shoot => {
            if hammered_boss || lv.boss.is_defeated() {
                Outcome::Won
            } else if lost {
                Outcome::Lost
            } else {
                Outcome::Continue
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameplayConfig, WindowConfig};
    use crate::domain::entity::{Barrel, Boss, Facing, Monkey, Platform};
    use crate::domain::player::Player;

    const FLOOR_TOP: f64 = 744.0;
    const STAND_Y: f64 = FLOOR_TOP - 21.0;

    fn floor() -> Vec<Platform> {
        (0..8).map(|i| Platform::new(64.0 + 128.0 * i as f64, 752.0)).collect()
    }

    fn flat_level(kind: LevelKind) -> Level {
        Level {
            name: "flat".into(),
            kind,
            max_frames: 1000,
            frames_left: 1000,
            platforms: floor(),
            ladders: vec![],
            barrels: vec![],
            pickups: vec![],
            monkeys: vec![],
            player: Player::new(100.0, STAND_Y),
            boss: Boss::new(900.0, FLOOR_TOP - 40.0),
            bananas: vec![],
            bullets: vec![],
        }
    }

    /// World already playing level `idx` (0 = climb, 1 = shoot).
    fn playing(idx: usize) -> WorldState {
        let mut w = WorldState::new(
            vec![flat_level(LevelKind::Climb), flat_level(LevelKind::Shoot)],
            WindowConfig::default(),
            GameplayConfig { fps: 60, max_frames: 1000 },
        );
        w.start(idx);
        w
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    // ── hammer ──

    #[test]
    fn hammer_smashes_barrel_without_losing() {
        let mut w = playing(0);
        w.level_mut().player.equip(PickupKind::Hammer);
        w.level_mut().barrels.push(Barrel::new(110.0, FLOOR_TOP - 16.0));

        let events = step(&mut w, idle());

        assert!(w.level().barrels[0].destroyed);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.score, BARREL_SMASH_POINTS);
        assert!(events.contains(&GameEvent::BarrelSmashed));
    }

    #[test]
    fn unarmed_barrel_contact_loses() {
        let mut w = playing(0);
        w.level_mut().barrels.push(Barrel::new(110.0, FLOOR_TOP - 16.0));
        step(&mut w, idle());
        assert_eq!(w.phase, Phase::End { won: false });
    }

    // ── boss ──

    #[test]
    fn unarmed_boss_contact_loses_and_zeroes_score() {
        let mut w = playing(0);
        w.score = 450;
        let lv = w.level_mut();
        lv.frames_left = 300;
        lv.boss = Boss::new(110.0, FLOOR_TOP - 40.0);

        let events = step(&mut w, idle());

        assert_eq!(w.phase, Phase::End { won: false });
        assert_eq!(w.score, 0);
        assert!(events.contains(&GameEvent::GameLost));
    }

    #[test]
    fn hammer_on_boss_clears_climb_level() {
        let mut w = playing(0);
        let lv = w.level_mut();
        lv.player.equip(PickupKind::Hammer);
        lv.boss = Boss::new(140.0, FLOOR_TOP - 40.0);

        let events = step(&mut w, idle());

        assert!(events.contains(&GameEvent::LevelCleared { level: 0, time_bonus: 0 }));
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.current, 1);
    }

    #[test]
    fn five_bullets_defeat_boss_and_award_time_bonus() {
        let mut w = playing(1);
        let lv = w.level_mut();
        lv.frames_left = 600;
        lv.player = Player::new(200.0, STAND_Y);
        lv.player.equip(PickupKind::Blaster);
        lv.boss = Boss::new(300.0, FLOOR_TOP - 40.0);

        let mut hits = 0;
        let mut frames_before_win = 0;
        for frame in 0..200 {
            if w.phase != Phase::Playing {
                break;
            }
            frames_before_win = w.level().frames_left;
            let input = FrameInput { shoot: frame < 5, ..FrameInput::default() };
            hits += step(&mut w, input)
                .iter()
                .filter(|e| matches!(e, GameEvent::BossHit { .. }))
                .count();
        }

        assert_eq!(hits, 5);
        assert_eq!(w.phase, Phase::End { won: true });
        assert_eq!(w.level().boss.health, 0);
        assert_eq!(w.score, 3 * (frames_before_win / 60));
        assert!(w.level().bullets.is_empty());
    }

    #[test]
    fn climb_level_boss_ignores_bullets() {
        let mut w = playing(0);
        let lv = w.level_mut();
        lv.boss = Boss::new(300.0, FLOOR_TOP - 40.0);
        lv.bullets.push(Projectile::bullet(260.0, STAND_Y, Facing::Right));

        let events = step(&mut w, idle());

        assert_eq!(w.level().boss.health, crate::domain::entity::BOSS_HEALTH);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::BossHit { .. })));
        assert_eq!(w.phase, Phase::Playing);
    }

    // ── monkeys ──

    #[test]
    fn intelligent_monkey_throws_every_five_seconds() {
        let mut w = playing(1);
        let lv = w.level_mut();
        lv.frames_left = 10_000;
        lv.monkeys.push(Monkey::new(
            MonkeyKind::Intelligent, 600.0, FLOOR_TOP - 20.0, Facing::Left, vec![40],
        ));

        let mut thrown = 0;
        for _ in 0..299 {
            thrown += step(&mut w, idle()).iter().filter(|e| **e == GameEvent::BananaThrown).count();
        }
        assert_eq!(thrown, 0);

        thrown += step(&mut w, idle()).iter().filter(|e| **e == GameEvent::BananaThrown).count();
        assert_eq!(thrown, 1);
        assert_eq!(w.level().monkeys[0].shoot_timer, 0);

        for _ in 0..299 {
            thrown += step(&mut w, idle()).iter().filter(|e| **e == GameEvent::BananaThrown).count();
        }
        assert_eq!(thrown, 1);
        thrown += step(&mut w, idle()).iter().filter(|e| **e == GameEvent::BananaThrown).count();
        assert_eq!(thrown, 2);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn airborne_monkey_neither_walks_nor_counts() {
        let mut w = playing(1);
        w.level_mut().monkeys.push(Monkey::new(
            MonkeyKind::Intelligent, 600.0, 300.0, Facing::Left, vec![40],
        ));
        step(&mut w, idle());
        let m = &w.level().monkeys[0];
        assert_eq!(m.x, 600.0);
        assert_eq!(m.shoot_timer, 0);
        assert!(m.y > 300.0);
    }

    #[test]
    fn bullet_destroys_monkey_and_is_spent() {
        let mut w = playing(1);
        let lv = w.level_mut();
        lv.monkeys.push(Monkey::new(MonkeyKind::Normal, 300.0, FLOOR_TOP - 20.0, Facing::Left, vec![4]));
        lv.bullets.push(Projectile::bullet(280.0, STAND_Y, Facing::Right));

        let events = step(&mut w, idle());

        assert!(w.level().monkeys[0].destroyed);
        assert!(w.level().bullets.is_empty());
        assert_eq!(w.score, MONKEY_POINTS);
        assert!(events.contains(&GameEvent::MonkeyShot));
    }

    #[test]
    fn banana_loses_even_with_hammer() {
        let mut w = playing(1);
        let lv = w.level_mut();
        lv.player.equip(PickupKind::Hammer);
        lv.bananas.push(Projectile::banana(105.0, STAND_Y, Facing::Left));
        step(&mut w, idle());
        assert_eq!(w.phase, Phase::End { won: false });
    }

    // ── outcome priority ──

    #[test]
    fn climb_level_loss_beats_simultaneous_win() {
        let mut w = playing(0);
        let lv = w.level_mut();
        lv.player.equip(PickupKind::Hammer);
        lv.boss = Boss::new(140.0, FLOOR_TOP - 40.0);
        lv.frames_left = 0;
        step(&mut w, idle());
        assert_eq!(w.phase, Phase::End { won: false });
    }

    #[test]
    fn shoot_level_win_beats_simultaneous_loss() {
        let mut w = playing(1);
        let lv = w.level_mut();
        lv.player.equip(PickupKind::Hammer);
        lv.boss = Boss::new(140.0, FLOOR_TOP - 40.0);
        lv.bananas.push(Projectile::banana(105.0, STAND_Y, Facing::Left));
        step(&mut w, idle());
        assert_eq!(w.phase, Phase::End { won: true });
    }

    // ── frame budget ──

    #[test]
    fn running_out_of_time_loses_on_the_next_frame() {
        let mut w = playing(0);
        w.level_mut().frames_left = 1;
        step(&mut w, idle());
        assert_eq!(w.level().frames_left, 0);
        assert_eq!(w.phase, Phase::Playing);
        step(&mut w, idle());
        assert_eq!(w.phase, Phase::End { won: false });
    }

    // ── input ──

    #[test]
    fn jumping_over_a_barrel_scores() {
        let mut w = playing(0);
        let lv = w.level_mut();
        lv.barrels.push(Barrel::new(202.0, FLOOR_TOP - 16.0));
        lv.player = Player::new(200.0, 652.0);

        let events = step(&mut w, FrameInput { right: true, ..FrameInput::default() });

        assert_eq!(w.score, BARREL_JUMP_POINTS);
        assert!(events.contains(&GameEvent::BarrelJumped));
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn jump_from_ground_emits_event_once() {
        let mut w = playing(0);
        let jump = FrameInput { jump: true, ..FrameInput::default() };
        assert!(step(&mut w, jump).contains(&GameEvent::Jumped));
        assert!(!step(&mut w, jump).contains(&GameEvent::Jumped));
    }

    #[test]
    fn held_jump_fires_once_until_released() {
        let mut w = playing(0);
        let jump = FrameInput { jump: true, ..FrameInput::default() };
        let mut jumps = 0;
        for _ in 0..300 {
            jumps += step(&mut w, jump).iter().filter(|e| **e == GameEvent::Jumped).count();
        }
        assert_eq!(jumps, 1);
        assert_eq!(w.level().player.velocity, 0.0);
        assert_eq!(w.level().player.y, STAND_Y);

        step(&mut w, idle());
        assert!(step(&mut w, jump).contains(&GameEvent::Jumped));
    }

    #[test]
    fn expired_bullets_are_compacted() {
        let mut w = playing(1);
        w.level_mut().player.equip(PickupKind::Blaster);
        step(&mut w, FrameInput { shoot: true, ..FrameInput::default() });
        assert_eq!(w.level().bullets.len(), 1);
        for _ in 0..100 {
            step(&mut w, idle());
        }
        assert!(w.level().bullets.is_empty());
    }

    // ── screens ──

    #[test]
    fn nothing_moves_outside_play() {
        let mut w = playing(0);
        w.phase = Phase::Start;
        assert!(step(&mut w, FrameInput { right: true, ..FrameInput::default() }).is_empty());
        assert_eq!(w.level().player.x, 100.0);
        assert_eq!(w.level().frames_left, 1000);
    }

    #[test]
    fn restart_resets_everything() {
        let mut w = playing(1);
        w.level_mut().player.equip(PickupKind::Blaster);
        w.level_mut().bullets.push(Projectile::bullet(0.0, 0.0, Facing::Right));
        w.level_mut().boss.take_hit();
        for _ in 0..10 {
            step(&mut w, FrameInput { right: true, ..FrameInput::default() });
        }
        step(&mut w, FrameInput { jump: true, ..FrameInput::default() });
        assert!(w.jump_held);
        w.restart();

        assert_eq!(w.phase, Phase::Start);
        assert!(!w.jump_held);
        assert_eq!(w.score, 0);
        let lv = &w.levels[1];
        assert_eq!(lv.frames_left, lv.max_frames);
        assert_eq!(lv.player.x, 100.0);
        assert_eq!(lv.player.ammo, 0);
        assert_eq!(lv.boss.health, crate::domain::entity::BOSS_HEALTH);
        assert!(lv.bullets.is_empty());
    }

    #[test]
    fn start_shortcut_goes_straight_to_second_level() {
        let mut w = WorldState::new(
            vec![flat_level(LevelKind::Climb), flat_level(LevelKind::Shoot)],
            WindowConfig::default(),
            GameplayConfig::default(),
        );
        w.start(1);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.current, 1);
        let hud = w.hud();
        assert_eq!(hud.boss_health, Some(5));
        assert_eq!(hud.combat_lines(), vec!["Donkey Health 5".to_string(), "Bullet 0".to_string()]);
    }

    #[test]
    fn draw_list_skips_destroyed_entities() {
        let mut w = playing(0);
        let lv = w.level_mut();
        lv.barrels.push(Barrel::new(500.0, FLOOR_TOP - 16.0));
        lv.barrels.push(Barrel::new(600.0, FLOOR_TOP - 16.0));
        lv.barrels[1].destroyed = true;
        let barrels = w.draw_list().iter()
            .filter(|d| d.sprite == crate::domain::entity::Sprite::Barrel)
            .count();
        assert_eq!(barrels, 1);
    }
}
