/// Keyboard tracker.
///
/// Keys are mapped onto `Action`s. An action is *held* while any of its keys
/// is down (movement, climbing) and *pressed* on the frame one of its keys
/// goes down (jump, shoot and the screen keys).
///
/// Terminals that report key releases get exact hold tracking once
/// `honor_release` is set; everywhere else a key counts as released after
/// `HOLD_TIMEOUT` without a Press/Repeat event.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::FrameInput;

/// After this long without a Press/Repeat event a key counts as released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Shoot,
    /// Leave the start screen.
    Start,
    /// Leave the end screen.
    Continue,
    /// Start straight on the second level.
    LevelSkip,
    Quit,
}

impl Action {
    pub fn keys(self) -> &'static [KeyCode] {
        match self {
            Action::Left => &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')],
            Action::Right => &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')],
            Action::Up => &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')],
            Action::Down => &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')],
            Action::Jump => &[KeyCode::Char(' ')],
            Action::Shoot => &[KeyCode::Char('f'), KeyCode::Char('F'), KeyCode::Char('x'), KeyCode::Char('X')],
            Action::Start => &[KeyCode::Enter],
            Action::Continue => &[KeyCode::Enter, KeyCode::Char(' ')],
            Action::LevelSkip => &[KeyCode::Char('2')],
            Action::Quit => &[KeyCode::Esc],
        }
    }
}

pub struct InputState {
    /// Last Press/Repeat time per key.
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went from released to held during the last drain.
    fresh_presses: Vec<KeyCode>,
    ctrl_c: bool,
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            ctrl_c: false,
            honor_release: false,
        }
    }

    /// Read every pending terminal event without blocking.
    /// Call once per loop iteration.
    pub fn drain_events(&mut self) {
        self.begin_frame();
        let now = Instant::now();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, now);
            }
        }
        self.expire(now);
    }

    fn begin_frame(&mut self) {
        self.fresh_presses.clear();
        self.ctrl_c = false;
    }

    fn record(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            self.ctrl_c = true;
            return;
        }
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.held_at(key.code, now);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active
            .get(&code)
            .is_some_and(|t| now.duration_since(*t) < HOLD_TIMEOUT)
    }

    // ── Queries ──

    pub fn held(&self, action: Action) -> bool {
        let now = Instant::now();
        action.keys().iter().any(|c| self.held_at(*c, now))
    }

    pub fn pressed(&self, action: Action) -> bool {
        action.keys().iter().any(|c| self.fresh_presses.contains(c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }

    /// Gameplay signals for this frame from the keyboard alone.
    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            left: self.held(Action::Left) || self.pressed(Action::Left),
            right: self.held(Action::Right) || self.pressed(Action::Right),
            up: self.held(Action::Up) || self.pressed(Action::Up),
            down: self.held(Action::Down) || self.pressed(Action::Down),
            jump: self.pressed(Action::Jump),
            shoot: self.pressed(Action::Shoot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release)
    }

    #[test]
    fn first_press_is_fresh_repeat_is_not() {
        let mut kb = InputState::new();
        let now = Instant::now();
        kb.begin_frame();
        kb.record(press(KeyCode::Char('f')), now);
        assert!(kb.pressed(Action::Shoot));

        kb.begin_frame();
        kb.record(press(KeyCode::Char('f')), now);
        assert!(!kb.pressed(Action::Shoot));
    }

    #[test]
    fn held_keys_drive_movement_but_not_shooting() {
        let mut kb = InputState::new();
        let now = Instant::now();
        kb.record(press(KeyCode::Left), now);
        kb.record(press(KeyCode::Char('x')), now);
        kb.begin_frame();

        let input = kb.frame_input();
        assert!(input.left);
        assert!(!input.right);
        assert!(!input.shoot);
    }

    #[test]
    fn release_only_counts_when_honored() {
        let mut kb = InputState::new();
        let now = Instant::now();
        kb.record(press(KeyCode::Right), now);
        kb.record(release(KeyCode::Right), now);
        assert!(kb.held(Action::Right));

        kb.honor_release = true;
        kb.record(release(KeyCode::Right), now);
        assert!(!kb.held(Action::Right));
    }

    #[test]
    fn keys_expire_after_timeout() {
        let mut kb = InputState::new();
        let then = Instant::now();
        kb.record(press(KeyCode::Up), then);
        kb.expire(then + HOLD_TIMEOUT);
        assert!(!kb.held(Action::Up));
    }

    #[test]
    fn ctrl_c_is_not_a_shoot_or_move_key() {
        let mut kb = InputState::new();
        kb.record(
            KeyEvent::new_with_kind(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press),
            Instant::now(),
        );
        assert!(kb.ctrl_c_pressed());
        assert_eq!(kb.frame_input(), FrameInput::default());
    }

    #[test]
    fn held_space_jumps_once() {
        let mut kb = InputState::new();
        let now = Instant::now();
        kb.begin_frame();
        kb.record(press(KeyCode::Char(' ')), now);
        kb.record(press(KeyCode::Left), now);
        assert!(kb.frame_input().jump);

        kb.begin_frame();
        kb.record(press(KeyCode::Char(' ')), now);
        kb.record(press(KeyCode::Left), now);
        let repeat = kb.frame_input();
        assert!(!repeat.jump);
        assert!(repeat.left);
    }

    #[test]
    fn space_continues_but_does_not_start() {
        assert!(Action::Jump.keys().contains(&KeyCode::Char(' ')));
        assert!(!Action::Start.keys().contains(&KeyCode::Char(' ')));
        assert!(Action::Start.keys().contains(&KeyCode::Enter));
        assert!(Action::Continue.keys().contains(&KeyCode::Char(' ')));
        assert!(Action::Continue.keys().contains(&KeyCode::Enter));
        assert!(!Action::Start.keys().contains(&KeyCode::Char('2')));
    }
}
