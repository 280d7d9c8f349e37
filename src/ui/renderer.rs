/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// The renderer is the engine's display sink. `update_display` only copies
/// the pushed state into a snapshot; `present` composes and draws it.
///
/// Drawing:
///   1. Compose the next frame into the `front` buffer
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Emit terminal commands only for cells that changed, batched with `queue!`
///   4. Swap front/back

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Dropper, Facing, Player};
use crate::domain::grid::Grid;
use crate::domain::tile::Tile;
use crate::sim::display::DisplaySink;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every empty terminal cell, so the gaps
    /// between rows match the cells on VTE-based terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Differs from any real cell; forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = if bg == Color::Reset { Self::BASE_BG } else { bg };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

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
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
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

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Snapshot / HUD ──

/// Last state pushed by the engine.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub grid: Grid,
    pub player: Player,
    pub dropper: Dropper,
}

/// Session counters the sink interface does not carry.
#[derive(Clone, Debug, Default)]
pub struct Hud {
    pub level: u32,
    pub turn: u64,
    pub items_required: u32,
    /// Set once the player has been crushed.
    pub crushed_at: Option<(usize, usize)>,
    pub message: String,
}

// ── Layout ──

/// Each room cell is two terminal columns wide.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const ENERGY_BAR_W: usize = 20;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    snapshot: Option<Snapshot>,
}

impl DisplaySink for Renderer {
    fn update_display(&mut self, grid: &Grid, player: &Player, dropper: &Dropper) {
        self.snapshot = Some(Snapshot {
            grid: grid.clone(),
            player: player.clone(),
            dropper: *dropper,
        });
    }
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            snapshot: None,
        }
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Draw the latest snapshot with the given HUD.
    pub fn present(&mut self, hud: &Hud) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        if let Some(snap) = &self.snapshot {
            compose(&mut self.front, snap, hud);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) { continue; }

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

// ══════════════════════════════════════════════════════════════
// Compose: build front buffer content
// ══════════════════════════════════════════════════════════════

fn compose(buf: &mut FrameBuffer, snap: &Snapshot, hud: &Hud) {
    compose_hud(buf, snap, hud);

    let g = &snap.grid;
    for gy in 0..g.height() {
        let row = MAP_ROW + gy;
        if row >= buf.height { break; }
        for gx in 0..g.width() {
            let col = gx * CELL_W;
            if col + 1 >= buf.width { break; }
            compose_cell(buf, snap, gx, gy, col, row);
        }
    }

    let below = MAP_ROW + g.height() + 1;
    if !hud.message.is_empty() && below < buf.height {
        buf.fill_row(below, MSG_BG);
        buf.put_str(0, below, &format!(" ◈ {} ", hud.message), Color::Black, MSG_BG);
    }
    let help_row = below + 2;
    if help_row < buf.height {
        let help = " ←/A →/D: Move  Q/E: Break  S/Space: Wait  Esc: Quit";
        buf.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
    }

    if let Some((x, y)) = hud.crushed_at {
        compose_game_over(buf, g, hud, x, y);
    }
}

fn compose_hud(buf: &mut FrameBuffer, snap: &Snapshot, hud: &Hud) {
    let p = &snap.player;
    let filled = if p.max_energy() == 0 {
        0
    } else {
        (p.energy() as usize * ENERGY_BAR_W) / p.max_energy() as usize
    };
    let bar: String = (0..ENERGY_BAR_W).map(|i| if i < filled { '█' } else { '░' }).collect();
    let ready = if p.has_full_energy() { "READY" } else { "" };

    let text = format!(
        " Level {:<3} Turn {:<6} ${}/{}  Energy {} {:>3}/{:<3} {}",
        hud.level, hud.turn,
        p.items_collected(), hud.items_required,
        bar, p.energy(), p.max_energy(), ready,
    );
    buf.fill_row(HUD_ROW, HUD_BG);
    buf.put_str(0, HUD_ROW, &text, Color::White, HUD_BG);
}

/// Two terminal columns for room cell (gx, gy).
fn compose_cell(buf: &mut FrameBuffer, snap: &Snapshot, gx: usize, gy: usize, col: usize, row: usize) {
    let p = &snap.player;
    let d = &snap.dropper;

    let (c0, c1, fg, bg) = if p.x == gx && p.y == gy {
        let (a, b) = match p.facing {
            Facing::Left => ('◀', '☻'),
            Facing::Right => ('☻', '▶'),
        };
        (a, b, Color::Rgb { r: 120, g: 255, b: 120 }, Color::Reset)
    } else if d.x == gx && d.y == gy {
        ('▼', '▼', Color::Rgb { r: 255, g: 90, b: 90 }, Color::Rgb { r: 60, g: 20, b: 20 })
    } else {
        tile_look(snap.grid.tile_at(gx, gy))
    };
    buf.set(col, row, Cell::new(c0, fg, bg));
    buf.set(col + 1, row, Cell::new(c1, fg, bg));
}

fn tile_look(tile: Tile) -> (char, char, Color, Color) {
    match tile {
        Tile::Background => (' ', ' ', Color::Reset, Color::Reset),
        Tile::Ceiling    => ('▀', '▀', Color::Rgb { r: 120, g: 120, b: 120 }, Color::Rgb { r: 50, g: 50, b: 50 }),
        Tile::Floor      => ('█', '█', Color::Rgb { r: 120, g: 120, b: 120 }, Color::Rgb { r: 70, g: 70, b: 70 }),
        Tile::Wall       => ('▓', '▓', Color::Rgb { r: 110, g: 110, b: 130 }, Color::Rgb { r: 60, g: 60, b: 75 }),
        Tile::Box        => ('[', ']', Color::Rgb { r: 220, g: 160, b: 90 }, Color::Rgb { r: 100, g: 65, b: 30 }),
        Tile::ItemBox    => ('[', ']', Color::Rgb { r: 255, g: 220, b: 50 }, Color::Rgb { r: 110, g: 80, b: 20 }),
        Tile::Item       => ('$', ' ', Color::Rgb { r: 255, g: 220, b: 50 }, Color::Reset),
        Tile::Door       => ('▐', '▌', Color::Rgb { r: 100, g: 200, b: 255 }, Color::Rgb { r: 20, g: 50, b: 80 }),
    }
}

fn compose_game_over(buf: &mut FrameBuffer, grid: &Grid, hud: &Hud, x: usize, y: usize) {
    let red = Color::Rgb { r: 255, g: 60, b: 60 };
    let dim = Color::Rgb { r: 40, g: 20, b: 20 };
    let lines = [
        "╔══════════════════════════════╗".to_string(),
        "║           CRUSHED!           ║".to_string(),
        "╚══════════════════════════════╝".to_string(),
        format!(" Level {}, turn {}, at ({x}, {y}) ", hud.level, hud.turn),
        " ENTER: New game   ESC: Quit ".to_string(),
    ];

    let box_w = lines[0].chars().count();
    let map_cols = grid.width() * CELL_W;
    let left = map_cols.saturating_sub(box_w) / 2;
    let top = MAP_ROW + grid.height().saturating_sub(lines.len()) / 2;

    for (i, line) in lines.iter().enumerate() {
        let fg = if i < 3 { red } else { Color::White };
        buf.put_str(left, top + i, line, fg, dim);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
