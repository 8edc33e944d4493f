//! Rendering layer: all terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! game state.  No game logic is performed; this module only translates
//! world coordinates into terminal cells.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Attribute, Color, Print},
    terminal, QueueableCommand,
};
use gap_runner::entities::{GameState, Pipe, PipeFrame, RunStatus, Viewport};
use gap_runner::events::DeathCause;

/// Terminal cells are about twice as tall as they are wide; one world unit
/// spans this many columns and one row.
pub const CELL_ASPECT: f32 = 2.0;

/// Row 0 is the HUD, the play field starts below it.
const PLAY_TOP: u16 = 1;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD: Color = Color::DarkGrey;
const C_SCORE: Color = Color::White;
const C_PIPE_BODY: Color = Color::Green;
const C_PIPE_CAP: Color = Color::DarkGreen;
const C_PLAYER: Color = Color::Yellow;
const C_PLAYER_DEAD: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;

/// Viewport for a terminal of `cols` × `rows`, leaving the HUD and hint rows
/// out of the play field.
pub fn viewport_for(cols: u16, rows: u16) -> Viewport {
    Viewport::new(
        cols as f32 / CELL_ASPECT,
        rows.saturating_sub(PLAY_TOP + 1).max(1) as f32,
    )
}

fn to_col(x: f32) -> i32 {
    (x * CELL_ASPECT).round() as i32
}

fn to_row(y: f32) -> i32 {
    y.round() as i32 + PLAY_TOP as i32
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    for pipe in state.pipes.values() {
        draw_pipe(out, pipe, cols, rows)?;
    }
    draw_player(out, state, cols, rows)?;
    // Score is drawn last so it sits in front of the pipes.
    draw_score(out, state, cols)?;
    draw_hud(out, state, cols)?;
    draw_controls_hint(out, rows)?;

    if state.status == RunStatus::Frozen {
        draw_game_over(out, state, cols, rows)?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

/// Title screen with the last and best score of this session.
pub fn render_menu<W: Write>(out: &mut W, last: Option<u32>, best: u32) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "≡  GAP  RUNNER  ≡";
    centred(out, cx, cy.saturating_sub(4), title, Color::Cyan)?;

    if let Some(score) = last {
        centred(out, cx, cy.saturating_sub(2), &format!("Last run: {score}"), Color::White)?;
    }
    if best > 0 {
        centred(out, cx, cy.saturating_sub(1), &format!("Best: {best}"), Color::Yellow)?;
    }

    centred(out, cx, cy + 1, "SPACE / click : Start", Color::Green)?;
    centred(out, cx, cy + 2, "Q : Quit", C_HINT)?;

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

fn centred<W: Write>(
    out: &mut W,
    cx: u16,
    row: u16,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = cx.saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_pipe<W: Write>(out: &mut W, pipe: &Pipe, cols: u16, rows: u16) -> std::io::Result<()> {
    let left = to_col(pipe.body.x);
    let right = to_col(pipe.body.x + pipe.size);
    let top = to_row(pipe.body.y);
    let bottom = to_row(pipe.body.y + pipe.size);

    let first_col = left.max(0);
    let last_col = right.min(cols as i32);
    if first_col >= last_col {
        return Ok(());
    }
    let span = (last_col - first_col) as usize;

    for row in top.max(PLAY_TOP as i32)..bottom.min(rows as i32 - 1) {
        // The cap is the row facing the gap.
        let is_cap_row = match pipe.frame {
            PipeFrame::BottomCap => row == bottom - 1,
            PipeFrame::TopCap => row == top,
            PipeFrame::Body => false,
        };
        let (glyph, color) = if is_cap_row {
            ("▓", C_PIPE_CAP)
        } else {
            ("█", C_PIPE_BODY)
        };
        out.queue(cursor::MoveTo(first_col as u16, row as u16))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(glyph.repeat(span)))?;
    }
    Ok(())
}

fn draw_player<W: Write>(
    out: &mut W,
    state: &GameState,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let p = &state.player;
    // Cover the whole hitbox so what touches a pipe on screen is what collides.
    let left = to_col(p.body.x);
    let right = to_col(p.body.x + p.width).max(left + 1);
    let top = to_row(p.body.y);
    let bottom = to_row(p.body.y + p.height).max(top + 1);

    let first_col = left.max(0);
    let last_col = right.min(cols as i32);
    if first_col >= last_col {
        return Ok(());
    }
    let span = (last_col - first_col) as usize;
    let beak_row = top + (bottom - top) / 2;

    // Frames: 0 glide, 1 wings down, 2 dead.
    let (fill, beak, color) = match p.sprite_frame() {
        1 => ("v", ">", C_PLAYER),
        2 => ("x", "<", C_PLAYER_DEAD),
        _ => ("o", ">", C_PLAYER),
    };
    for row in top.max(PLAY_TOP as i32)..bottom.min(rows as i32 - 1) {
        let line = if row == beak_row && right <= cols as i32 {
            fill.repeat(span - 1) + beak
        } else {
            fill.repeat(span)
        };
        out.queue(cursor::MoveTo(first_col as u16, row as u16))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(line))?;
    }
    Ok(())
}

// ── HUD ───────────────────────────────────────────────────────────────────────

fn draw_score<W: Write>(out: &mut W, state: &GameState, cols: u16) -> std::io::Result<()> {
    let text = state.score.to_string();
    let col = (cols / 2).saturating_sub(text.len() as u16 / 2);
    out.queue(cursor::MoveTo(col, PLAY_TOP + 1))?;
    out.queue(style::SetAttribute(Attribute::Bold))?;
    out.queue(style::SetForegroundColor(C_SCORE))?;
    out.queue(Print(&text))?;
    out.queue(style::SetAttribute(Attribute::Reset))?;
    Ok(())
}

fn draw_hud<W: Write>(out: &mut W, state: &GameState, cols: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print("‹ Esc"))?;

    let pools = format!(
        "pipes {}/{}  zones {}/{}",
        state.pipes.len(),
        state.pipes.capacity(),
        state.score_zones.len(),
        state.score_zones.capacity()
    );
    let rx = cols.saturating_sub(pools.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(Print(&pools))?;
    Ok(())
}

fn draw_controls_hint<W: Write>(out: &mut W, rows: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("SPACE / ↑ / click : Flap   Esc : Back   Q : Quit"))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(
    out: &mut W,
    state: &GameState,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let cause = match state.death {
        Some(DeathCause::Collision) => "You hit a pipe",
        Some(DeathCause::OutOfBounds) | None => "You left the sky",
    };
    let score_line = format!("Score: {}", state.score);
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", Color::Red),
        ("║    GAME  OVER    ║", Color::Red),
        ("╚══════════════════╝", Color::Red),
        (cause, Color::White),
        (&score_line, Color::Yellow),
    ];

    let cx = cols / 2;
    let start_row = (rows / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        centred(out, cx, start_row + i as u16, msg, *color)?;
    }
    Ok(())
}
