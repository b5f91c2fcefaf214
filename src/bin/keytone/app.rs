//! KeyTone - wires the audio engine, the terminal and the UI together

use std::io::stdout;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use crossterm::{
    event::{
        DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use tracing::info;

use keytone::{
    io::keymap::{GateMode, KeyInputAdapter, DEFAULT_GATE},
    AudioEngine, EngineConfig,
};

use super::ui::{SessionInfo, UiApp};

pub struct KeyTone {
    config: EngineConfig,
}

impl KeyTone {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Run until the user quits. The terminal is restored and every voice
    /// silenced on the way out, including when the UI loop fails.
    pub fn run(self) -> EyreResult<()> {
        let (engine, handle, scope) =
            AudioEngine::start(self.config.clone()).wrap_err("failed to start audio engine")?;

        let mut terminal = ratatui::init();
        let key_release = match enable_input() {
            Ok(key_release) => key_release,
            Err(e) => {
                ratatui::restore();
                engine.stop(handle);
                return Err(e);
            }
        };

        let mode = if key_release {
            GateMode::KeyRelease
        } else {
            GateMode::Timed { hold: DEFAULT_GATE }
        };
        info!(?mode, "input ready");

        let session = SessionInfo {
            sample_rate: engine.sample_rate(),
            channels: engine.channels(),
            master_gain: self.config.effective_master_gain(),
            mode,
        };
        let keys = KeyInputAdapter::new(self.config.table.clone(), mode);
        let mut ui = UiApp::new(handle, scope, keys, self.config.wave_shape, session);

        let result = ui.run(&mut terminal);

        disable_input(key_release);
        ratatui::restore();
        engine.stop(ui.into_handle());
        result
    }
}

/// Turn on mouse and focus reporting, plus key release reporting where the
/// terminal supports it. Returns whether releases will be reported.
fn enable_input() -> EyreResult<bool> {
    let mut out = stdout();
    execute!(out, EnableMouseCapture, EnableFocusChange)
        .wrap_err("failed to enable mouse capture")?;

    let key_release = supports_keyboard_enhancement().unwrap_or(false);
    if key_release {
        execute!(
            out,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .wrap_err("failed to enable key release events")?;
    }
    Ok(key_release)
}

fn disable_input(key_release: bool) {
    let mut out = stdout();
    if key_release {
        let _ = execute!(out, PopKeyboardEnhancementFlags);
    }
    let _ = execute!(out, DisableFocusChange, DisableMouseCapture);
}
