//! Status bar widget - wave shape, input mode, output format and levels

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use keytone::{
    dsp::{amplify::gain_to_db, WaveShape},
    io::keymap::GateMode,
};

use super::SessionInfo;

/// What the status bar shows besides the fixed session facts.
pub struct StatusLine {
    pub shape: WaveShape,
    pub held: usize,
    pub dropped_events: u64,
    /// Peak and RMS of the scope window
    pub peak: f32,
    pub rms: f32,
}

/// Render the status bar
pub fn render_status(frame: &mut Frame, area: Rect, session: &SessionInfo, status: &StatusLine) {
    let block = Block::default().title(" keytone ").borders(Borders::ALL);
    let StatusLine {
        shape,
        held,
        dropped_events,
        peak,
        rms,
    } = *status;

    let input = match session.mode {
        GateMode::KeyRelease => "key release".to_string(),
        GateMode::Timed { hold } => format!("gated {}ms", hold.as_millis()),
    };

    let mut spans = vec![
        Span::styled(
            format!(" ~ {shape}  "),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{held} held  "),
            Style::default().fg(if held > 0 { Color::Green } else { Color::White }),
        ),
        Span::styled(format!("input: {input}  "), Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!(
                "{:.1}kHz x{}  ",
                session.sample_rate / 1000.0,
                session.channels
            ),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("gain {:.1} dB  ", gain_to_db(session.master_gain)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {peak:.3}  RMS: {rms:.3}"),
            Style::default().fg(Color::Magenta),
        ),
    ];

    if dropped_events > 0 {
        spans.push(Span::styled(
            format!("  dropped: {dropped_events}"),
            Style::default().fg(Color::Red),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
