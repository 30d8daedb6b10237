//! Terminal drawing for the board front-end.
//!
//! Writes are queued into one buffered pass per frame and flushed once.
//! The screen panel samples the 178x128 framebuffer down to its cell
//! rect using half-block glyphs, two pixel rows per terminal row.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};

use crate::layout::PanelRect;
use crate::theme::BoardTheme;
use crate::types::{Rgb, SCREEN_HEIGHT, SCREEN_WIDTH, StatusLight};

fn term_color(color: Rgb) -> Color {
    Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

// =============================================================================
// PANELS
// =============================================================================

/// Draw a bordered panel with its cached text lines.
pub fn draw_panel<W: Write>(
    out: &mut W,
    rect: PanelRect,
    lines: &[String],
    selected: bool,
    theme: &BoardTheme,
) -> io::Result<()> {
    if rect.width < 4 || rect.height < 3 {
        return Ok(());
    }
    let border = if selected {
        theme.border_selected
    } else {
        theme.border
    };
    queue!(out, SetForegroundColor(term_color(border)))?;

    let inner = rect.width as usize - 2;
    let top = format!("┌{}┐", "─".repeat(inner));
    let bottom = format!("└{}┘", "─".repeat(inner));
    queue!(out, MoveTo(rect.x, rect.y), Print(&top))?;
    for row in 1..rect.height - 1 {
        queue!(
            out,
            MoveTo(rect.x, rect.y + row),
            Print(format!("│{}│", " ".repeat(inner)))
        )?;
    }
    queue!(out, MoveTo(rect.x, rect.y + rect.height - 1), Print(&bottom))?;

    queue!(out, SetForegroundColor(term_color(theme.text)))?;
    for (i, line) in lines.iter().enumerate() {
        let row = rect.y + 1 + i as u16;
        if row >= rect.y + rect.height - 1 {
            break;
        }
        let mut text: String = line.chars().take(inner).collect();
        text.truncate(inner);
        queue!(out, MoveTo(rect.x + 1, row), Print(text))?;
    }
    queue!(out, ResetColor)?;
    Ok(())
}

/// Clear a rect to the terminal default.
pub fn clear_rect<W: Write>(out: &mut W, rect: PanelRect) -> io::Result<()> {
    let blank = " ".repeat(rect.width as usize);
    for row in 0..rect.height {
        queue!(out, MoveTo(rect.x, rect.y + row), Print(&blank))?;
    }
    Ok(())
}

// =============================================================================
// SCREEN
// =============================================================================

/// Draw the 178x128 framebuffer into a cell rect with half blocks.
///
/// Each cell covers two pixel rows; nearest-neighbor sampling maps the
/// fixed screen geometry onto whatever rect the layout produced.
pub fn draw_screen<W: Write>(
    out: &mut W,
    rect: PanelRect,
    pixels: &[u8],
    theme: &BoardTheme,
) -> io::Result<()> {
    if !rect.is_visible() || pixels.len() != SCREEN_WIDTH * SCREEN_HEIGHT {
        return Ok(());
    }
    let cols = rect.width as usize;
    let rows = rect.height as usize;

    let sample = |cx: usize, sub_row: usize, row: usize| -> u8 {
        let px = cx * SCREEN_WIDTH / cols;
        let py = ((row * 2 + sub_row) * SCREEN_HEIGHT) / (rows * 2);
        pixels[py.min(SCREEN_HEIGHT - 1) * SCREEN_WIDTH + px.min(SCREEN_WIDTH - 1)]
    };

    for row in 0..rows {
        queue!(out, MoveTo(rect.x, rect.y + row as u16))?;
        for col in 0..cols {
            let upper = theme.screen_shade(sample(col, 0, row));
            let lower = theme.screen_shade(sample(col, 1, row));
            queue!(
                out,
                SetForegroundColor(term_color(upper)),
                SetBackgroundColor(term_color(lower)),
                Print("▀")
            )?;
        }
    }
    queue!(out, ResetColor)?;
    Ok(())
}

// =============================================================================
// BRICK FACE
// =============================================================================

/// Draw the five face buttons in their diamond arrangement.
pub fn draw_buttons<W: Write>(
    out: &mut W,
    rect: PanelRect,
    held: impl Fn(crate::types::BrickButton) -> bool,
    theme: &BoardTheme,
) -> io::Result<()> {
    use crate::types::BrickButton::*;
    if rect.width < 17 || rect.height < 5 {
        return Ok(());
    }
    let cx = rect.x + rect.width / 2;
    let cy = rect.y + rect.height / 2;

    // (button, label, dx, dy) relative to the pad center.
    let pads: [(crate::types::BrickButton, &str, i32, i32); 5] = [
        (Up, " ▲ ", 0, -2),
        (Down, " ▼ ", 0, 2),
        (Left, " ◀ ", -6, 0),
        (Right, " ▶ ", 6, 0),
        (Enter, "[⏎]", 0, 0),
    ];

    for (button, label, dx, dy) in pads {
        let color = if held(button) {
            theme.button_down
        } else {
            theme.button_up
        };
        let x = (cx as i32 + dx - 1).max(0) as u16;
        let y = (cy as i32 + dy).max(0) as u16;
        queue!(
            out,
            MoveTo(x, y),
            SetForegroundColor(term_color(theme.button_outer)),
            SetBackgroundColor(term_color(color)),
            Print(label),
            ResetColor
        )?;
    }
    Ok(())
}

/// Draw the status light row.
pub fn draw_light<W: Write>(
    out: &mut W,
    rect: PanelRect,
    light: StatusLight,
    blink_on: bool,
    theme: &BoardTheme,
) -> io::Result<()> {
    // The glyph pair is four cells wide, centered.
    if !rect.is_visible() || rect.width < 4 {
        return Ok(());
    }
    let lit = match light.base_color() {
        Some(color) if !light.is_animated() || blink_on => color,
        _ => theme.border,
    };
    let x = rect.x + rect.width / 2 - 2;
    let y = rect.y + rect.height / 2;
    queue!(
        out,
        MoveTo(x, y),
        SetForegroundColor(term_color(lit)),
        Print("●  ●"),
        ResetColor
    )?;
    Ok(())
}

/// Draw the one-line help/status bar.
pub fn draw_status<W: Write>(
    out: &mut W,
    rect: PanelRect,
    running: bool,
    theme: &BoardTheme,
) -> io::Result<()> {
    if !rect.is_visible() {
        return Ok(());
    }
    let state = if running { "running" } else { "stopped" };
    let help = format!(
        " {state} | r run/stop  1-4 port  tab overlay  +/- adjust  m mode  space tap  arrows brick  q quit"
    );
    let mut text: String = help.chars().take(rect.width as usize).collect();
    text.truncate(rect.width as usize);
    queue!(
        out,
        MoveTo(rect.x, rect.y),
        SetForegroundColor(term_color(theme.text_muted)),
        Print(text),
        ResetColor
    )?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
