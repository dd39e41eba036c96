//! Drawing: render a [`ShellState`] into a terminal-sized bordered box.
//!
//! Every frame clears the screen and redraws the active screen from
//! scratch. The writer is generic so tests can render into a `Vec<u8>`.

use super::state::{Screen, ShellState};
use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{queue, QueueableCommand};
use std::io::{self, Write};

const HINT: &str = "↑/↓ move · Enter or 1-9 generate · q quit";

/// Draw `state` on a terminal of `cols` × `rows` cells and flush.
pub fn draw<W: Write>(out: &mut W, state: &ShellState, (cols, rows): (u16, u16)) -> io::Result<()> {
    queue!(out, ResetColor, Clear(ClearType::All))?;
    if cols < 4 || rows < 3 {
        return out.flush();
    }

    draw_border(out, state.screen().title(), cols, rows)?;

    let inner_width = usize::from(cols - 4);
    match state.screen() {
        Screen::List => draw_list(out, state, inner_width, rows)?,
        Screen::Loading => {
            draw_centered(out, &[(state.spinner_text(), None)], cols, rows)?;
        }
        Screen::Final(outcome) => {
            let color = if outcome.is_success() {
                Color::Green
            } else {
                Color::Red
            };
            let lines: Vec<_> = wrap(&outcome.message(), inner_width)
                .into_iter()
                .map(|l| (l, Some(color)))
                .collect();
            draw_centered(out, &lines, cols, rows)?;
        }
    }

    out.queue(ResetColor)?;
    out.flush()
}

fn draw_border<W: Write>(out: &mut W, title: &str, cols: u16, rows: u16) -> io::Result<()> {
    let width = usize::from(cols);
    let title = format!(" {title} ");
    let title_len = title.chars().count();

    let top = if title_len + 2 <= width {
        let left = (width - 2 - title_len) / 2;
        let right = width - 2 - title_len - left;
        format!("┌{}{title}{}┐", "─".repeat(left), "─".repeat(right))
    } else {
        format!("┌{}┐", "─".repeat(width - 2))
    };
    queue!(out, MoveTo(0, 0), Print(top))?;

    for row in 1..rows - 1 {
        queue!(out, MoveTo(0, row), Print("│"), MoveTo(cols - 1, row), Print("│"))?;
    }
    queue!(
        out,
        MoveTo(0, rows - 1),
        Print(format!("└{}┘", "─".repeat(width - 2)))
    )
}

fn draw_list<W: Write>(out: &mut W, state: &ShellState, inner_width: usize, rows: u16) -> io::Result<()> {
    let visible = usize::from(rows.saturating_sub(4)).max(1);
    // Scroll so the selection stays on screen.
    let first = state.selected().saturating_sub(visible - 1);

    for (row, (idx, entry)) in state
        .entries()
        .iter()
        .enumerate()
        .skip(first)
        .take(visible)
        .enumerate()
    {
        let shortcut = entry.shortcut.map_or_else(|| "   ".to_string(), |c| format!("({c})"));
        let line = truncate(&format!("{shortcut} {}", entry.label), inner_width);
        let y = u16::try_from(row + 1).unwrap_or(u16::MAX);

        queue!(out, MoveTo(2, y))?;
        if idx == state.selected() {
            queue!(
                out,
                SetAttribute(Attribute::Reverse),
                Print(line),
                SetAttribute(Attribute::Reset)
            )?;
        } else {
            queue!(out, Print(line))?;
        }
    }

    queue!(
        out,
        MoveTo(2, rows - 2),
        SetAttribute(Attribute::Dim),
        Print(truncate(HINT, inner_width)),
        SetAttribute(Attribute::Reset)
    )
}

/// Draw lines centred horizontally and vertically inside the border.
fn draw_centered<W: Write>(
    out: &mut W,
    lines: &[(String, Option<Color>)],
    cols: u16,
    rows: u16,
) -> io::Result<()> {
    let inner_rows = usize::from(rows - 2);
    let shown = lines.len().min(inner_rows);
    let top = 1 + (inner_rows - shown) / 2;

    for (i, (text, color)) in lines.iter().take(shown).enumerate() {
        let len = text.chars().count();
        let x = (usize::from(cols).saturating_sub(len)) / 2;
        let x = u16::try_from(x.max(2)).unwrap_or(2);
        let y = u16::try_from(top + i).unwrap_or(u16::MAX);
        queue!(out, MoveTo(x, y))?;
        if let Some(c) = color {
            queue!(out, SetForegroundColor(*c))?;
        }
        queue!(out, Print(text), ResetColor)?;
    }
    Ok(())
}

/// Greedy word wrap to `width` columns; explicit newlines are kept.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            while current.chars().count() > width {
                let head: String = current.chars().take(width).collect();
                let tail: String = current.chars().skip(width).collect();
                lines.push(head);
                current = tail;
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut s: String = text.chars().take(width.saturating_sub(1)).collect();
        s.push('…');
        s
    }
}
