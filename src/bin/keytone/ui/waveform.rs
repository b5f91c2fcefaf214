//! Waveform oscilloscope widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use keytone::dsp::WaveShape;

/// Smallest vertical range, so a quiet single voice is still visible.
const MIN_SPAN: f64 = 0.02;

/// Hue of the trace before any note is played, in degrees.
const IDLE_HUE: f32 = 200.0;
/// Fraction of the remaining distance to the target hue covered per frame.
const HUE_EASING: f32 = 0.1;

/// Trace colour that drifts toward a hue picked by the last note's pitch:
/// low notes blue-green, high notes violet.
#[derive(Debug, Clone, Copy)]
pub struct ScopeTint {
    hue: f32,
    target: f32,
}

impl Default for ScopeTint {
    fn default() -> Self {
        Self {
            hue: IDLE_HUE,
            target: IDLE_HUE,
        }
    }
}

impl ScopeTint {
    pub fn aim_at(&mut self, frequency: f32) {
        self.target = ((frequency - 200.0) / 3.0).clamp(0.0, 300.0);
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        self.hue += (self.target - self.hue) * HUE_EASING;
    }

    pub fn color(&self) -> Color {
        let (r, g, b) = hsl_to_rgb(self.hue, 0.8, 0.6);
        Color::Rgb(r, g, b)
    }
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> (u8, u8, u8) {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue.rem_euclid(360.0) / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u8 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let to_byte = |c: f32| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}

/// Render the waveform oscilloscope, scaled to the loudest sample in view
pub fn render_waveform(
    frame: &mut Frame,
    area: Rect,
    samples: &[f32],
    shape: WaveShape,
    color: Color,
) {
    let peak = samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs())) as f64;
    let span = peak.max(MIN_SPAN) * 1.1;

    let block = Block::default()
        .title(format!(" Waveform ({shape}, ±{span:.3}) "))
        .borders(Borders::ALL);

    // Convert audio samples to chart data points
    let len = samples.len().max(1) as f64;
    let data: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / len, sample as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-span, span])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
