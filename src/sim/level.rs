/// Level loader.
///
/// ## Sources (priority order):
///   1. `general.levels_file` from `config.toml`
///   2. Built-in levels embedded from `levels/default.toml`
///
/// ## Level file format (TOML):
///   ```toml
///   [[level]]
///   name = "Barrel Yard"
///   kind = "climb"              # or "shoot"
///   platforms = "64,752;192,752"  # polyline of platform centers, ';' or ':'
///   player = "100,700"
///   boss = "150,200"
///   barrels = ["300,728"]
///   ladders = ["600,668"]
///   hammers = ["800,424"]
///   blasters = []
///   normal_monkeys = ["540,600;right;70,70"]      # x,y;direction;path
///   intelligent_monkeys = []
///   ```
///
/// Positions are entity centers in playfield pixels. A monkey path is a
/// comma-separated list of whole-pixel segment lengths.
///
/// Malformed data is an error: the game refuses to start on a broken file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::config::GameConfig;
use crate::domain::entity::{Barrel, Boss, Facing, Ladder, Monkey, MonkeyKind, Pickup, PickupKind, Platform};
use crate::domain::player::Player;
use super::world::{Level, LevelKind};

/// Number of levels the game is built around.
pub const LEVEL_COUNT: usize = 2;

/// The stock levels, compiled in.
pub const BUILTIN_LEVELS: &str = include_str!("../../levels/default.toml");

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("cannot read level file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("level file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("level '{level}': bad point {text:?} in {field}")]
    BadPoint { level: String, field: &'static str, text: String },

    #[error("level '{level}': bad direction {text:?} (expected left or right)")]
    BadDirection { level: String, text: String },

    #[error("level '{level}': empty patrol path in {text:?}")]
    EmptyPath { level: String, text: String },

    #[error("level '{level}': bad patrol path {text:?}")]
    BadPath { level: String, text: String },

    #[error("expected 2 levels, found {0}")]
    WrongLevelCount(usize),
}

// ── TOML Schema ──

#[derive(Deserialize, Debug)]
struct LevelFile {
    #[serde(default)]
    level: Vec<LevelDef>,
}

/// One level as written in the file.
#[derive(Deserialize, Debug)]
struct LevelDef {
    name: String,
    kind: LevelKind,
    platforms: String,
    player: String,
    boss: String,
    #[serde(default)]
    barrels: Vec<String>,
    #[serde(default)]
    ladders: Vec<String>,
    #[serde(default)]
    hammers: Vec<String>,
    #[serde(default)]
    blasters: Vec<String>,
    #[serde(default)]
    normal_monkeys: Vec<String>,
    #[serde(default)]
    intelligent_monkeys: Vec<String>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load the configured level file, or the built-in levels.
pub fn load_levels(config: &GameConfig) -> Result<Vec<Level>, LevelError> {
    match &config.levels_file {
        Some(path) => {
            let text = read_file(path)?;
            parse_levels(&text, config.gameplay.max_frames)
        }
        None => parse_levels(BUILTIN_LEVELS, config.gameplay.max_frames),
    }
}

/// Parse a whole level file. Every level gets a budget of `max_frames`.
pub fn parse_levels(text: &str, max_frames: u32) -> Result<Vec<Level>, LevelError> {
    let file: LevelFile = toml::from_str(text)?;
    if file.level.len() != LEVEL_COUNT {
        return Err(LevelError::WrongLevelCount(file.level.len()));
    }
    file.level.iter().map(|def| build_level(def, max_frames)).collect()
}

fn read_file(path: &Path) -> Result<String, LevelError> {
    std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ══════════════════════════════════════════════════════════════
// Building
// ══════════════════════════════════════════════════════════════

fn build_level(def: &LevelDef, max_frames: u32) -> Result<Level, LevelError> {
    let name = def.name.as_str();
    let point = |field: &'static str, text: &str| parse_point(name, field, text);
    let points = |field: &'static str, list: &[String]| -> Result<Vec<(f64, f64)>, LevelError> {
        list.iter().map(|t| parse_point(name, field, t)).collect()
    };

    let platforms = parse_polyline(name, &def.platforms)?
        .into_iter()
        .map(|(x, y)| Platform::new(x, y))
        .collect();

    let (px, py) = point("player", &def.player)?;
    let (bx, by) = point("boss", &def.boss)?;

    let mut pickups: Vec<Pickup> = points("hammers", &def.hammers)?
        .into_iter()
        .map(|(x, y)| Pickup::new(PickupKind::Hammer, x, y))
        .collect();
    pickups.extend(
        points("blasters", &def.blasters)?
            .into_iter()
            .map(|(x, y)| Pickup::new(PickupKind::Blaster, x, y)),
    );

    let mut monkeys = Vec::new();
    for text in &def.normal_monkeys {
        monkeys.push(parse_monkey(name, MonkeyKind::Normal, text)?);
    }
    for text in &def.intelligent_monkeys {
        monkeys.push(parse_monkey(name, MonkeyKind::Intelligent, text)?);
    }

    Ok(Level {
        name: def.name.clone(),
        kind: def.kind,
        max_frames,
        frames_left: max_frames,
        platforms,
        ladders: points("ladders", &def.ladders)?
            .into_iter()
            .map(|(x, y)| Ladder::new(x, y))
            .collect(),
        barrels: points("barrels", &def.barrels)?
            .into_iter()
            .map(|(x, y)| Barrel::new(x, y))
            .collect(),
        pickups,
        monkeys,
        player: Player::new(px, py),
        boss: Boss::new(bx, by),
        bananas: Vec::new(),
        bullets: Vec::new(),
    })
}

// ══════════════════════════════════════════════════════════════
// Tuple parsing
// ══════════════════════════════════════════════════════════════

/// `"x,y"` → (x, y).
fn parse_point(level: &str, field: &'static str, text: &str) -> Result<(f64, f64), LevelError> {
    let bad = || LevelError::BadPoint { level: level.to_string(), field, text: text.to_string() };
    let (x, y) = text.split_once(',').ok_or_else(bad)?;
    let x: f64 = x.trim().parse().map_err(|_| bad())?;
    let y: f64 = y.trim().parse().map_err(|_| bad())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(bad());
    }
    Ok((x, y))
}

/// `"x,y;x,y;..."` (or `:` separated) → points.
fn parse_polyline(level: &str, text: &str) -> Result<Vec<(f64, f64)>, LevelError> {
    text.split([';', ':'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_point(level, "platforms", s))
        .collect()
}

/// `"x,y;direction;a,b,c"` → a monkey at (x, y) facing `direction`.
fn parse_monkey(level: &str, kind: MonkeyKind, text: &str) -> Result<Monkey, LevelError> {
    let field = match kind {
        MonkeyKind::Normal => "normal_monkeys",
        MonkeyKind::Intelligent => "intelligent_monkeys",
    };
    let mut parts = text.splitn(3, ';');
    let pos = parts.next().unwrap_or_default();
    let (x, y) = parse_point(level, field, pos)?;

    let dir = parts.next().unwrap_or_default().trim();
    let facing = match dir.to_ascii_lowercase().as_str() {
        "left" => Facing::Left,
        "right" => Facing::Right,
        _ => {
            return Err(LevelError::BadDirection { level: level.to_string(), text: dir.to_string() })
        }
    };

    let path_text = parts.next().unwrap_or_default().trim();
    if path_text.is_empty() {
        return Err(LevelError::EmptyPath { level: level.to_string(), text: text.to_string() });
    }
    let path = path_text
        .split(',')
        .map(|s| s.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| LevelError::BadPath { level: level.to_string(), text: path_text.to_string() })?;

    Ok(Monkey::new(kind, x, y, facing, path))
}
