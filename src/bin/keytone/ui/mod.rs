//! TUI module for keytone
//!
//! Draws the output waveform and the on-screen keyboard, and turns terminal
//! input into note events for the engine.

mod keyboard;
mod status;
mod waveform;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use tracing::debug;

use keytone::{
    dsp::WaveShape,
    io::{
        analysis::Scope,
        keymap::{GateMode, KeyInputAdapter, NoteEvent},
    },
    synth::SynthHandle,
};

use keyboard::{key_at, render_keyboard};
use status::{render_status, StatusLine};
use waveform::{render_waveform, ScopeTint};

/// Fixed facts about the running session, shown in the status bar.
#[derive(Debug, Clone, Copy)]
pub struct SessionInfo {
    pub sample_rate: f32,
    pub channels: u16,
    pub master_gain: f32,
    pub mode: GateMode,
}

/// UI application state
pub struct UiApp {
    handle: SynthHandle,
    scope: Scope,
    keys: KeyInputAdapter,
    shape: WaveShape,
    session: SessionInfo,
    tint: ScopeTint,
    /// Inner area of the keyboard widget from the last draw, for hit-testing
    keyboard_area: Rect,
    /// Events the control queue had no room for
    dropped_events: u64,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        handle: SynthHandle,
        scope: Scope,
        keys: KeyInputAdapter,
        shape: WaveShape,
        session: SessionInfo,
    ) -> Self {
        Self {
            handle,
            scope,
            keys,
            shape,
            session,
            tint: ScopeTint::default(),
            keyboard_area: Rect::default(),
            dropped_events: 0,
            should_quit: false,
        }
    }

    /// Give the control handle back so the engine can shut down.
    pub fn into_handle(self) -> SynthHandle {
        self.handle
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.scope.poll();

            let expired = self.keys.expire(Instant::now());
            self.dispatch(expired);

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                let event = event::read()?;
                self.handle_event(event);
            }
        }

        let held = self.keys.release_all();
        self.dispatch(held);
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::FocusLost => {
                let held = self.keys.release_all();
                self.dispatch(held);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Press {
            match key.code {
                KeyCode::Esc => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::F(n @ 1..=4) => {
                    self.select_shape(WaveShape::ALL[usize::from(n) - 1]);
                    return;
                }
                KeyCode::Tab => {
                    self.select_shape(self.shape.next());
                    return;
                }
                _ => {}
            }
        }

        if let Some(event) = self.keys.handle_key(&key, Instant::now()) {
            self.dispatch([event]);
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let target = key_at(self.keyboard_area, self.keys.notes(), mouse.column, mouse.row);
        let events = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => match target {
                Some(note) => self.keys.pointer_down(note),
                None => Vec::new(),
            },
            MouseEventKind::Drag(MouseButton::Left) => self.keys.pointer_moved(target),
            MouseEventKind::Up(MouseButton::Left) => self.keys.pointer_up(),
            _ => Vec::new(),
        };
        self.dispatch(events);
    }

    fn select_shape(&mut self, shape: WaveShape) {
        if self.handle.set_wave_shape(shape).is_ok() {
            debug!(%shape, "wave shape changed");
            self.shape = shape;
        } else {
            self.dropped_events += 1;
        }
    }

    fn dispatch(&mut self, events: impl IntoIterator<Item = NoteEvent>) {
        for event in events {
            let sent = match event {
                NoteEvent::On(note) => {
                    if let Some(frequency) = self.keys.frequency(note) {
                        self.tint.aim_at(frequency);
                    }
                    self.handle.note_on(note)
                }
                NoteEvent::Off(note) => self.handle.note_off(note),
            };
            if sent.is_err() {
                self.dropped_events += 1;
            }
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: status, waveform, keyboard, help
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Min(8),    // Waveform
                Constraint::Length(4), // Keyboard
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let status = StatusLine {
            shape: self.shape,
            held: self.keys.held_notes().count(),
            dropped_events: self.dropped_events,
            peak: self.scope.peak(),
            rms: self.scope.rms(),
        };
        render_status(frame, chunks[0], &self.session, &status);

        self.tint.step();
        let samples = self.scope.to_vec();
        render_waveform(frame, chunks[1], &samples, self.shape, self.tint.color());

        self.keyboard_area =
            render_keyboard(frame, chunks[2], self.keys.notes(), |note| self.keys.is_held(note));

        let help = Paragraph::new(
            " [Z..M Q..O] Play  [F1-F4/Tab] Wave shape  [Esc] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
