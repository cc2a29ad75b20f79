/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Problems found while loading are kept in `warnings` so they can be
/// logged once the log file is open.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub gameplay: GameplayConfig,
    pub gamepad: GamepadConfig,
    /// Level file to load instead of the built-in levels.
    pub levels_file: Option<PathBuf>,
    pub log_file: PathBuf,
    pub log_level: String,
    pub warnings: Vec<String>,
}

/// Playfield size in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowConfig {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameplayConfig {
    /// Logical frames per second.
    pub fps: u32,
    /// Frame budget of each level.
    pub max_frames: u32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub shoot: Vec<String>,
    pub confirm: Vec<String>,
    pub level_skip: Vec<String>,
    pub quit: Vec<String>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig { width: default_width(), height: default_height() }
    }
}

impl Default for GameplayConfig {
    fn default() -> Self {
        GameplayConfig { fps: default_fps(), max_frames: default_max_frames() }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    window: TomlWindow,
    #[serde(default)]
    gameplay: TomlGameplay,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlWindow {
    #[serde(default = "default_width")]
    width: f64,
    #[serde(default = "default_height")]
    height: f64,
}

#[derive(Deserialize, Debug)]
struct TomlGameplay {
    #[serde(default = "default_fps")]
    fps: u32,
    #[serde(default = "default_max_frames")]
    max_frames: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_shoot")]
    shoot: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_level_skip")]
    level_skip: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    levels_file: String,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

fn default_width() -> f64 { 1024.0 }
fn default_height() -> f64 { 768.0 }
fn default_fps() -> u32 { 60 }
fn default_max_frames() -> u32 { 10_000 }

fn default_jump() -> Vec<String> { vec!["A".into()] }
fn default_shoot() -> Vec<String> { vec!["X".into(), "B".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_level_skip() -> Vec<String> { vec!["Y".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_log_file() -> String { "shadow-kong.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlWindow {
    fn default() -> Self {
        TomlWindow { width: default_width(), height: default_height() }
    }
}

impl Default for TomlGameplay {
    fn default() -> Self {
        TomlGameplay { fps: default_fps(), max_frames: default_max_frames() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            shoot: default_shoot(),
            confirm: default_confirm(),
            level_skip: default_level_skip(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_file: String::new(),
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = vec![];
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        Self::from_toml(toml_cfg, &search_dirs, warnings)
    }

    /// Build a config from TOML text, as if it were the contents of `config.toml`.
    pub fn from_toml_str(text: &str) -> Self {
        let mut warnings = vec![];
        let toml_cfg = parse_toml(text, &mut warnings);
        Self::from_toml(toml_cfg, &[], warnings)
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf], mut warnings: Vec<String>) -> Self {
        let mut gameplay = GameplayConfig { fps: cfg.gameplay.fps, max_frames: cfg.gameplay.max_frames };
        if gameplay.fps == 0 {
            warnings.push("gameplay.fps must be positive; using 60".into());
            gameplay.fps = default_fps();
        }

        let mut window = WindowConfig { width: cfg.window.width, height: cfg.window.height };
        if !(window.width > 0.0 && window.height > 0.0) {
            warnings.push("window size must be positive; using 1024x768".into());
            window = WindowConfig::default();
        }

        let levels_file = if cfg.general.levels_file.is_empty() {
            None
        } else {
            Some(resolve_path(&cfg.general.levels_file, search_dirs))
        };

        GameConfig {
            window,
            gameplay,
            gamepad: GamepadConfig {
                jump: cfg.gamepad.jump,
                shoot: cfg.gamepad.shoot,
                confirm: cfg.gamepad.confirm,
                level_skip: cfg.gamepad.level_skip,
                quit: cfg.gamepad.quit,
            },
            levels_file,
            log_file: PathBuf::from(cfg.general.log_file),
            log_level: cfg.general.log_level,
            warnings,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), &[], vec![])
    }
}

/// Relative paths are looked up in the candidate dirs, falling back to CWD.
fn resolve_path(raw: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p;
    }
    search_dirs.iter()
        .map(|d| d.join(raw))
        .find(|p| p.is_file())
        .unwrap_or(p)
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => return parse_toml(&text, warnings),
                Err(e) => warnings.push(format!("could not read {}: {e}", path.display())),
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str, warnings: &mut Vec<String>) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warnings.push(format!("config.toml parse error, using default settings: {e}"));
            TomlConfig::default()
        }
    }
}
