/// WorldState: the complete snapshot of a running game.
///
/// ## Levels
///
/// The game is a fixed sequence of levels. Each `Level` owns every entity on
/// it plus its own frame budget, and remembers its spawn layout so it can be
/// put back exactly as loaded. Levels are independent: finishing level 1
/// does not touch level 2's state.
///
/// ## Screens
///
///   Start ──confirm──▶ Playing(0) ──win──▶ Playing(1) ──win──▶ End{won}
///     │                    │                    │
///     └──skip──▶ Playing(1)└──────loss──────────┴──▶ End{lost}
///
/// Confirming on the end screen resets every level and the score.
///
/// ## Presentation
///
/// The core never draws. `draw_list()` and `hud()` describe what should be
/// on screen this frame; the renderer decides how.

use crate::config::{GameplayConfig, WindowConfig};
use crate::domain::entity::{Barrel, Boss, Ladder, Monkey, Pickup, Platform, Sprite};
use crate::domain::player::Player;
use crate::domain::projectile::Projectile;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Start,
    Playing,
    End { won: bool },
}

/// What winning and losing mean on a level.
#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    /// Reach the boss holding a hammer. A loss in the same frame wins out.
    Climb,
    /// Hammer the boss or shoot its health down to zero. A win in the same
    /// frame wins out; clearing it earns a time bonus.
    Shoot,
}

#[derive(Clone, Debug)]
pub struct Level {
    pub name: String,
    pub kind: LevelKind,
    pub max_frames: u32,
    pub frames_left: u32,

    pub platforms: Vec<Platform>,
    pub ladders: Vec<Ladder>,
    pub barrels: Vec<Barrel>,
    pub pickups: Vec<Pickup>,
    pub monkeys: Vec<Monkey>,
    pub player: Player,
    pub boss: Boss,

    pub bananas: Vec<Projectile>,
    pub bullets: Vec<Projectile>,
}

impl Level {
    /// Everything back to its spawn state and a full frame budget.
    pub fn reset(&mut self) {
        self.frames_left = self.max_frames;
        self.ladders.iter_mut().for_each(Ladder::reset);
        self.barrels.iter_mut().for_each(Barrel::reset);
        for p in &mut self.pickups {
            p.destroyed = false;
        }
        self.monkeys.iter_mut().for_each(Monkey::reset);
        self.player.reset();
        self.boss.reset();
        self.bananas.clear();
        self.bullets.clear();
    }

    /// Whole seconds left on the clock.
    pub fn seconds_left(&self, fps: u32) -> u32 {
        self.frames_left / fps.max(1)
    }
}

/// One sprite to draw, centered at `(x, y)` in playfield pixels.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DrawRequest {
    pub sprite: Sprite,
    pub x: f64,
    pub y: f64,
}

/// Status values shown while a level is played.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Hud {
    pub score: u32,
    pub seconds_left: u32,
    /// Boss health and ammo are only shown on shooting levels.
    pub boss_health: Option<u32>,
    pub ammo: Option<u32>,
}

impl Hud {
    /// Top-left status block.
    pub fn status_lines(&self) -> Vec<String> {
        vec![format!("Score {}", self.score), format!("Time Left {}", self.seconds_left)]
    }

    /// Top-right combat block, empty on climbing levels.
    pub fn combat_lines(&self) -> Vec<String> {
        let mut lines = vec![];
        if let Some(h) = self.boss_health {
            lines.push(format!("Donkey Health {h}"));
        }
        if let Some(a) = self.ammo {
            lines.push(format!("Bullet {a}"));
        }
        lines
    }
}

pub struct WorldState {
    pub phase: Phase,
    pub levels: Vec<Level>,
    /// Index into `levels` of the level being played.
    pub current: usize,
    pub score: u32,
    pub window: WindowConfig,
    pub gameplay: GameplayConfig,
    /// Jump signal seen on the previous frame. A jump needs a fresh press.
    pub jump_held: bool,
}

// ── Construction ──

impl WorldState {
    pub fn new(levels: Vec<Level>, window: WindowConfig, gameplay: GameplayConfig) -> Self {
        WorldState {
            phase: Phase::Start,
            levels,
            current: 0,
            score: 0,
            window,
            gameplay,
            jump_held: false,
        }
    }
}

// ── Screen transitions ──

impl WorldState {
    /// Leave the start screen into level `idx` (0 = first level).
    pub fn start(&mut self, idx: usize) {
        if self.phase != Phase::Start || idx >= self.levels.len() {
            return;
        }
        self.current = idx;
        self.phase = Phase::Playing;
    }

    /// Move on after clearing the current level. Returns true when that was
    /// the last level and the game is won.
    pub fn advance(&mut self) -> bool {
        if self.current + 1 < self.levels.len() {
            self.current += 1;
            false
        } else {
            self.phase = Phase::End { won: true };
            true
        }
    }

    pub fn lose(&mut self) {
        self.score = 0;
        self.phase = Phase::End { won: false };
    }

    /// Back to the start screen with every level and the score reset.
    pub fn restart(&mut self) {
        for level in &mut self.levels {
            level.reset();
        }
        self.score = 0;
        self.current = 0;
        self.jump_held = false;
        self.phase = Phase::Start;
    }

    pub fn level(&self) -> &Level {
        &self.levels[self.current]
    }

    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.levels[self.current]
    }
}

// ── Presentation queries ──

impl WorldState {
    /// Visible entities of the current level, back to front.
    pub fn draw_list(&self) -> Vec<DrawRequest> {
        if self.phase != Phase::Playing {
            return vec![];
        }
        let lv = self.level();
        let mut out = Vec::new();
        let mut push = |sprite: Sprite, x: f64, y: f64| out.push(DrawRequest { sprite, x, y });

        for p in &lv.platforms {
            push(Sprite::Platform, p.x, p.y);
        }
        for l in &lv.ladders {
            push(Sprite::Ladder, l.x, l.y);
        }
        for b in lv.barrels.iter().filter(|b| !b.destroyed) {
            push(Sprite::Barrel, b.x, b.y);
        }
        for p in lv.pickups.iter().filter(|p| !p.destroyed) {
            push(p.sprite(), p.x, p.y);
        }
        for m in lv.monkeys.iter().filter(|m| !m.destroyed) {
            push(m.sprite(), m.x, m.y);
        }
        for p in lv.bananas.iter().chain(&lv.bullets).filter(|p| !p.destroyed) {
            push(p.sprite(), p.x, p.y);
        }
        push(Sprite::Boss, lv.boss.x, lv.boss.y);
        push(lv.player.sprite(), lv.player.x, lv.player.y);
        out
    }

    pub fn hud(&self) -> Hud {
        let lv = self.level();
        let shooting = lv.kind == LevelKind::Shoot;
        Hud {
            score: self.score,
            seconds_left: lv.seconds_left(self.gameplay.fps),
            boss_health: shooting.then_some(lv.boss.health),
            ammo: shooting.then_some(lv.player.ammo),
        }
    }
}
