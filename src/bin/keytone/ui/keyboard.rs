//! On-screen keyboard widget
//!
//! One cell per playable key, left to right in pitch order. Sharps are drawn
//! dark, held keys are highlighted. The same geometry is used to hit-test
//! mouse events.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use keytone::synth::NoteId;

/// Columns per key cell
const KEY_WIDTH: u16 = 3;

/// Pitch classes of the sharps, counting semitones from C.
fn is_sharp(index: usize) -> bool {
    matches!(index % 12, 1 | 3 | 6 | 8 | 10)
}

fn key_style(index: usize, held: bool) -> Style {
    if held {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else if is_sharp(index) {
        Style::default().fg(Color::Gray).bg(Color::Black)
    } else {
        Style::default().fg(Color::Black).bg(Color::White)
    }
}

/// Render the keyboard and return the inner area the keys occupy.
pub fn render_keyboard(
    frame: &mut Frame,
    area: Rect,
    notes: &[NoteId],
    is_held: impl Fn(NoteId) -> bool,
) -> Rect {
    let block = Block::default().title(" Keyboard ").borders(Borders::ALL);
    let inner = block.inner(area);

    let cells = |label: bool| -> Line<'static> {
        notes
            .iter()
            .enumerate()
            .map(|(i, &note)| {
                let text = if label {
                    format!(" {} ", note.key_char())
                } else {
                    " ".repeat(KEY_WIDTH as usize)
                };
                Span::styled(text, key_style(i, is_held(note)))
            })
            .collect()
    };

    let lines: Vec<Line> = (0..inner.height)
        .map(|row| cells(row + 1 == inner.height))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
    inner
}

/// The key under a terminal cell, if any.
pub fn key_at(area: Rect, notes: &[NoteId], column: u16, row: u16) -> Option<NoteId> {
    let inside = column >= area.x
        && row >= area.y
        && row < area.y.saturating_add(area.height)
        && column < area.x.saturating_add(area.width);
    if !inside {
        return None;
    }
    let index = usize::from((column - area.x) / KEY_WIDTH);
    notes.get(index).copied()
}
