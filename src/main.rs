/// Entry point and game loop.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::process::ExitCode;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use config::GameConfig;
use domain::entity::FrameInput;
use sim::level::load_levels;
use sim::event::GameEvent;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::{Action, InputState};
use ui::renderer::Renderer;
use ui::sound::{self, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(2);

fn main() -> ExitCode {
    let config = GameConfig::load();

    // Without a writable log file the game still runs, just unlogged.
    let _ = logging::init(&config.log_file, &config.log_level);
    for w in &config.warnings {
        warn!("{w}");
    }

    let levels = match load_levels(&config) {
        Ok(levels) => levels,
        Err(e) => {
            error!("level data rejected: {e}");
            eprintln!("shadow-kong: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        levels = levels.len(),
        fps = config.gameplay.fps,
        max_frames = config.gameplay.max_frames,
        "levels loaded"
    );

    let mut world = WorldState::new(levels, config.window, config.gameplay);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        let _ = renderer.cleanup();
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }

    let sfx = SoundEngine::new();
    if sfx.is_none() {
        info!("no audio output, sound disabled");
    }

    let key_release = renderer.reports_key_release();
    info!(key_release, "terminal ready");

    let result = game_loop(&mut world, &mut renderer, sfx.as_ref(), &config, key_release);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        error!("game loop failed: {e}");
        eprintln!("Game error: {e}");
        return ExitCode::FAILURE;
    }

    info!(score = world.score, "quit");
    println!();
    println!("Thanks for playing Shadow Kong!");
    println!("Final Score: {}", world.score);
    ExitCode::SUCCESS
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sfx: Option<&SoundEngine>,
    config: &GameConfig,
    key_release: bool,
) -> std::io::Result<()> {
    let mut kb = InputState::new();
    kb.honor_release = key_release;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let tick_rate = Duration::from_secs_f64(1.0 / f64::from(config.gameplay.fps.max(1)));
    let mut last_tick = Instant::now();
    // Jump and shoot presses between ticks are latched so none is lost.
    let mut pending_jump = false;
    let mut pending_shoot = false;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || handle_screens(world, &kb, &gp) {
            break;
        }

        let held = merge(kb.frame_input(), gp.frame_input());
        if world.phase == Phase::Playing {
            pending_jump |= held.jump;
            pending_shoot |= held.shoot;
        }

        if last_tick.elapsed() >= tick_rate {
            if world.phase == Phase::Playing {
                let input = FrameInput {
                    jump: std::mem::take(&mut pending_jump),
                    shoot: std::mem::take(&mut pending_shoot),
                    ..held
                };
                let events = step::step(world, input);
                log_events(&events);
                sound::play_events(sfx, &events);
            } else {
                pending_jump = false;
                pending_shoot = false;
            }
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Keyboard and pad together; a signal is on if either source has it.
fn merge(a: FrameInput, b: FrameInput) -> FrameInput {
    FrameInput {
        left: a.left || b.left,
        right: a.right || b.right,
        up: a.up || b.up,
        down: a.down || b.down,
        jump: a.jump || b.jump,
        shoot: a.shoot || b.shoot,
    }
}

fn log_events(events: &[GameEvent]) {
    for event in events {
        debug!(?event, "game event");
    }
}

/// Start and end screen navigation. Returns true when the player quits.
fn handle_screens(world: &mut WorldState, kb: &InputState, gp: &GamepadState) -> bool {
    if kb.pressed(Action::Quit) || gp.quit_pressed() {
        return true;
    }
    let pad_confirm = gp.confirm_pressed();
    let skip = kb.pressed(Action::LevelSkip) || gp.level_skip_pressed();

    match world.phase {
        Phase::Start => {
            let start = kb.pressed(Action::Start) || pad_confirm;
            let first = if skip { Some(1) } else if start { Some(0) } else { None };
            if let Some(idx) = first {
                world.start(idx);
                info!(level = idx, name = %world.level().name, "game started");
            }
        }
        Phase::End { won } => {
            if kb.pressed(Action::Continue) || pad_confirm {
                info!(won, score = world.score, "back to start screen");
                world.restart();
            }
        }
        Phase::Playing => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_a_per_signal_or() {
        let keys = FrameInput { left: true, shoot: true, ..FrameInput::default() };
        let pad = FrameInput { jump: true, ..FrameInput::default() };
        let both = merge(keys, pad);
        assert!(both.left && both.jump && both.shoot);
        assert!(!both.right && !both.up && !both.down);
    }

    #[test]
    fn step_events_reach_the_debug_log() {
        let path = std::env::temp_dir().join(format!("shadow-kong-events-{}.log", std::process::id()));
        let file = std::fs::File::create(&path).expect("temp log file");
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            log_events(&[GameEvent::Jumped, GameEvent::BossHit { health: 4 }]);
        });

        let text = std::fs::read_to_string(&path).expect("log written");
        let _ = std::fs::remove_file(&path);
        assert!(text.contains("Jumped"));
        assert!(text.contains("BossHit { health: 4 }"));
    }
}
