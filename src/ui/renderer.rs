/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into `front` (a grid of `Cell`s)
///   2. Compare each cell with `back` (the previous frame)
///   3. Queue terminal commands only for cells that changed, flush once
///   4. Swap front/back
///
/// The playfield is measured in pixels; `Viewport` scales it onto whatever
/// terminal area is left under the HUD row. Every draw request is filled in
/// as its sprite box, using one glyph and colour per sprite.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::WindowConfig;
use crate::domain::entity::Sprite;
use crate::sim::world::{DrawRequest, Hud, Phase, WorldState};

const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };
const HUD_FG: Color = Color::Rgb { r: 230, g: 230, b: 230 };
const TITLE_FG: Color = Color::Rgb { r: 255, g: 170, b: 40 };
const PROMPT_FG: Color = Color::Rgb { r: 160, g: 160, b: 190 };

const HUD_ROWS: usize = 2;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };

    /// Differs from every real cell; forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            *self = FrameBuffer::new(w, h);
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell { ch, fg, bg: BASE_BG });
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color) {
        let x = self.width.saturating_sub(s.chars().count()) / 2;
        self.put_str(x, y, s, fg);
    }

    fn put_right(&mut self, y: usize, s: &str, fg: Color) {
        let x = self.width.saturating_sub(s.chars().count() + 1);
        self.put_str(x, y, s, fg);
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Viewport: pixel playfield → terminal cells ──

#[derive(Clone, Copy, PartialEq, Debug)]
struct Viewport {
    /// First terminal row of the playfield.
    top: usize,
    cols: usize,
    rows: usize,
    /// Cells per pixel on each axis.
    sx: f64,
    sy: f64,
}

impl Viewport {
    fn fit(window: &WindowConfig, term_w: usize, term_h: usize) -> Self {
        let rows = term_h.saturating_sub(HUD_ROWS).max(1);
        let cols = term_w.max(1);
        Viewport {
            top: HUD_ROWS,
            cols,
            rows,
            sx: cols as f64 / window.width.max(1.0),
            sy: rows as f64 / window.height.max(1.0),
        }
    }

    /// Terminal cell span `[start, end)` covered by the pixel span `[lo, hi]`.
    /// Anything on screen covers at least one cell.
    fn span(lo: f64, hi: f64, scale: f64, limit: usize) -> Option<(usize, usize)> {
        let start = (lo * scale).floor().max(0.0);
        let end = (hi * scale).ceil().min(limit as f64);
        if end <= 0.0 || start >= limit as f64 {
            return None;
        }
        let start = start as usize;
        Some((start, (end as usize).max(start + 1)))
    }

    fn cover(&self, req: &DrawRequest) -> Option<((usize, usize), (usize, usize))> {
        let b = req.sprite.aabb_at(req.x, req.y);
        let cols = Self::span(b.left(), b.right(), self.sx, self.cols)?;
        let rows = Self::span(b.top(), b.bottom(), self.sy, self.rows)?;
        Some((cols, rows))
    }
}

/// Glyph and colour per sprite.
fn sprite_style(sprite: Sprite) -> (char, Color) {
    match sprite {
        Sprite::PlayerLeft | Sprite::PlayerRight => ('@', Color::Rgb { r: 80, g: 200, b: 255 }),
        Sprite::PlayerHammerLeft | Sprite::PlayerHammerRight => ('@', Color::Rgb { r: 255, g: 220, b: 60 }),
        Sprite::PlayerBlasterLeft | Sprite::PlayerBlasterRight => ('@', Color::Rgb { r: 120, g: 255, b: 120 }),
        Sprite::Platform => ('=', Color::Rgb { r: 200, g: 60, b: 60 }),
        Sprite::Ladder => ('H', Color::Rgb { r: 90, g: 200, b: 220 }),
        Sprite::Barrel => ('o', Color::Rgb { r: 190, g: 120, b: 50 }),
        Sprite::Hammer => ('T', Color::Rgb { r: 255, g: 220, b: 60 }),
        Sprite::Blaster => ('r', Color::Rgb { r: 120, g: 255, b: 120 }),
        Sprite::Boss => ('K', Color::Rgb { r: 150, g: 90, b: 40 }),
        Sprite::NormalMonkeyLeft | Sprite::NormalMonkeyRight => ('m', Color::Rgb { r: 210, g: 150, b: 90 }),
        Sprite::IntelMonkeyLeft | Sprite::IntelMonkeyRight => ('M', Color::Rgb { r: 230, g: 100, b: 200 }),
        Sprite::Banana => (')', Color::Yellow),
        Sprite::BulletLeft | Sprite::BulletRight => ('-', Color::White),
    }
}

// ── Compose: build front buffer content ──

fn compose(buf: &mut FrameBuffer, world: &WorldState) {
    buf.clear();
    match world.phase {
        Phase::Start => compose_start(buf, world),
        Phase::Playing => compose_playing(buf, world),
        Phase::End { won } => compose_end(buf, world, won),
    }
}

fn compose_start(buf: &mut FrameBuffer, world: &WorldState) {
    let mid = buf.height / 2;
    buf.put_centered(mid.saturating_sub(4), "S H A D O W   K O N G", TITLE_FG);
    for (i, lv) in world.levels.iter().enumerate() {
        buf.put_centered(mid.saturating_sub(2) + i, &format!("Level {}: {}", i + 1, lv.name), HUD_FG);
    }
    buf.put_centered(mid + 1, "Press ENTER to start", PROMPT_FG);
    buf.put_centered(mid + 2, "Press 2 to start on level 2", PROMPT_FG);
    buf.put_centered(mid + 4, "Move: arrows/WASD   Jump: SPACE   Shoot: F/X   Quit: ESC", PROMPT_FG);
}

fn compose_playing(buf: &mut FrameBuffer, world: &WorldState) {
    let vp = Viewport::fit(&world.window, buf.width, buf.height);
    for req in world.draw_list() {
        let Some(((c0, c1), (r0, r1))) = vp.cover(&req) else { continue };
        let (ch, fg) = sprite_style(req.sprite);
        for row in r0..r1 {
            for col in c0..c1 {
                buf.set(col, vp.top + row, Cell { ch, fg, bg: BASE_BG });
            }
        }
    }
    compose_hud(buf, &world.hud(), &world.level().name);
}

fn compose_hud(buf: &mut FrameBuffer, hud: &Hud, level_name: &str) {
    for (row, line) in hud.status_lines().iter().enumerate() {
        buf.put_str(1, row, line, HUD_FG);
    }
    for (row, line) in hud.combat_lines().iter().enumerate() {
        buf.put_right(row, line, HUD_FG);
    }
    buf.put_centered(0, level_name, TITLE_FG);
}

fn compose_end(buf: &mut FrameBuffer, world: &WorldState, won: bool) {
    let mid = buf.height / 2;
    let (banner, fg) = if won {
        ("YOU WIN!", Color::Rgb { r: 120, g: 255, b: 120 })
    } else {
        ("GAME OVER", Color::Rgb { r: 255, g: 80, b: 80 })
    };
    buf.put_centered(mid.saturating_sub(2), banner, fg);
    buf.put_centered(mid, &format!("Final Score {}", world.score), HUD_FG);
    buf.put_centered(mid + 2, "Press SPACE or ENTER to continue", PROMPT_FG);
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    last_phase: Option<Phase>,
    /// Set once the terminal agreed to report key releases.
    key_release: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            last_phase: None,
            key_release: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.key_release = true;
        }
        self.fit_terminal()?;
        Ok(())
    }

    /// Whether key release events will arrive from the terminal.
    pub fn reports_key_release(&self) -> bool {
        self.key_release
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if std::mem::take(&mut self.key_release) {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Track the terminal size; a resize forces a full repaint.
    fn fit_terminal(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let (tw, th) = (tw as usize, th as usize);
        if tw != self.front.width || th != self.front.height || self.last_phase.is_none() {
            self.front.resize(tw, th);
            self.back.resize(tw, th);
            self.invalidate()?;
        }
        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.back.cells.fill(Cell::INVALID);
        queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        self.fit_terminal()?;
        if self.last_phase != Some(world.phase) {
            self.invalidate()?;
            self.last_phase = Some(world.phase);
        }

        compose(&mut self.front, world);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameplayConfig;
    use crate::sim::level::{parse_levels, BUILTIN_LEVELS};

    fn world() -> WorldState {
        let levels = parse_levels(BUILTIN_LEVELS, 10_000).expect("builtin levels parse");
        WorldState::new(levels, WindowConfig::default(), GameplayConfig::default())
    }

    #[test]
    fn key_release_is_off_until_the_terminal_agrees() {
        let r = Renderer::new();
        assert!(!r.reports_key_release());
    }

    #[test]
    fn viewport_scales_whole_playfield() {
        let vp = Viewport::fit(&WindowConfig { width: 1024.0, height: 768.0 }, 128, 50);
        assert_eq!(vp.rows, 48);
        assert_eq!(vp.cols, 128);
        assert_eq!(vp.sx, 0.125);
        assert_eq!(vp.sy, 48.0 / 768.0);
    }

    #[test]
    fn small_sprites_still_cover_a_cell() {
        let vp = Viewport::fit(&WindowConfig::default(), 80, 26);
        let req = DrawRequest { sprite: Sprite::BulletRight, x: 500.0, y: 400.0 };
        let ((c0, c1), (r0, r1)) = vp.cover(&req).expect("on screen");
        assert!(c1 > c0);
        assert!(r1 > r0);
    }

    #[test]
    fn offscreen_sprites_are_skipped() {
        let vp = Viewport::fit(&WindowConfig::default(), 80, 26);
        let req = DrawRequest { sprite: Sprite::Banana, x: -200.0, y: 400.0 };
        assert_eq!(vp.cover(&req), None);
        let req = DrawRequest { sprite: Sprite::Banana, x: 1400.0, y: 400.0 };
        assert_eq!(vp.cover(&req), None);
    }

    #[test]
    fn start_screen_lists_both_levels() {
        let mut buf = FrameBuffer::new(100, 30);
        compose(&mut buf, &world());
        let text: String = (0..buf.height).map(|y| buf.row_text(y)).collect();
        assert!(text.contains("S H A D O W"));
        assert!(text.contains("Level 1: Barrel Stairs"));
        assert!(text.contains("Level 2: Monkey Business"));
    }

    #[test]
    fn playing_screen_shows_hud_and_sprites() {
        let mut w = world();
        w.start(1);
        let mut buf = FrameBuffer::new(128, 50);
        compose(&mut buf, &w);

        assert!(buf.row_text(0).contains("Score 0"));
        assert!(buf.row_text(1).contains("Time Left 166"));
        assert!(buf.row_text(0).contains("Donkey Health 5"));
        assert!(buf.row_text(1).contains("Bullet 0"));
        let field: String = (HUD_ROWS..buf.height).map(|y| buf.row_text(y)).collect();
        assert!(field.contains('@'));
        assert!(field.contains('K'));
        assert!(field.contains('='));
    }

    #[test]
    fn climb_level_hud_has_no_combat_block() {
        let mut w = world();
        w.start(0);
        let mut buf = FrameBuffer::new(128, 50);
        compose(&mut buf, &w);
        assert!(!buf.row_text(0).contains("Donkey Health"));
    }

    #[test]
    fn end_screen_reports_final_score() {
        let mut w = world();
        w.phase = Phase::End { won: true };
        w.score = 1230;
        let mut buf = FrameBuffer::new(80, 24);
        compose(&mut buf, &w);
        let text: String = (0..buf.height).map(|y| buf.row_text(y)).collect();
        assert!(text.contains("YOU WIN!"));
        assert!(text.contains("Final Score 1230"));
    }
}
