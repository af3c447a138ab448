//! Built-in starting shapes for the waveform editor.

use super::{ControlPoint, WaveformTable};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Number of control points used to approximate one sine cycle.
pub const SINE_POINTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Silence,
    Square,
    Saw,
    Sine,
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Silence, Shape::Square, Shape::Saw, Shape::Sine];

    pub fn name(self) -> &'static str {
        match self {
            Shape::Silence => "silence",
            Shape::Square => "square",
            Shape::Saw => "saw",
            Shape::Sine => "sine",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|shape| shape.name().eq_ignore_ascii_case(name))
    }

    pub fn table(self) -> WaveformTable {
        match self {
            Shape::Silence => WaveformTable::silent(),
            Shape::Square => square(),
            Shape::Saw => saw(),
            Shape::Sine => sine(),
        }
    }
}

// The built-in point lists below are valid by construction.
fn build(points: Vec<ControlPoint>) -> WaveformTable {
    WaveformTable { points }
}

/// Low half then high half, with a vertical edge at the midpoint.
pub fn square() -> WaveformTable {
    build(vec![
        ControlPoint::new(0.0, -1.0),
        ControlPoint::new(0.5, -1.0),
        ControlPoint::new(0.5, 1.0),
        ControlPoint::new(1.0, 1.0),
    ])
}

pub fn saw() -> WaveformTable {
    build(vec![ControlPoint::new(0.0, -1.0), ControlPoint::new(1.0, 1.0)])
}

/// One sine cycle sampled at [`SINE_POINTS`] evenly spaced phases, ending at phase 1.
pub fn sine() -> WaveformTable {
    let last = (SINE_POINTS - 1) as f32;
    build(
        (0..SINE_POINTS)
            .map(|i| {
                let phase = i as f32 / last;
                ControlPoint::new(phase, (2.0 * PI * phase).sin())
            })
            .collect(),
    )
}
