//! Periodic waveform shapes described by control points over one cycle.

mod interpolate;
pub mod shapes;

pub use self::interpolate::{interpolate, LookupError};

use serde::{Deserialize, Serialize};
use std::fmt;

/// One sample of a periodic shape at a normalized cycle position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub phase: f32,
    pub value: f32,
}

impl ControlPoint {
    pub const fn new(phase: f32, value: f32) -> Self {
        Self { phase, value }
    }
}

/// Why a point sequence cannot be used as a waveform
#[derive(Debug, Clone, PartialEq)]
pub enum WaveformError {
    Empty,
    FirstPhaseNotZero { phase: f32 },
    PhaseOutOfRange { index: usize, phase: f32 },
    NonFinite { index: usize },
    Unordered { index: usize, previous: f32, phase: f32 },
}

impl fmt::Display for WaveformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveformError::Empty => write!(f, "waveform has no control points"),
            WaveformError::FirstPhaseNotZero { phase } => {
                write!(f, "first control point must sit at phase 0, found {phase}")
            }
            WaveformError::PhaseOutOfRange { index, phase } => {
                write!(f, "control point {index} has phase {phase} outside [0, 1]")
            }
            WaveformError::NonFinite { index } => {
                write!(f, "control point {index} is not a finite number")
            }
            WaveformError::Unordered { index, previous, phase } => write!(
                f,
                "control point {index} at phase {phase} comes after phase {previous}"
            ),
        }
    }
}

impl std::error::Error for WaveformError {}

/// A validated, circular waveform.
///
/// Points are sorted by ascending phase and the first one sits at phase 0, so
/// every query in `[0, 1]` has a bracketing segment. Past the last point the
/// shape wraps back to the first point as if it were repeated at phase 1.
///
/// Tables are never edited in place once handed to the engine; a new table
/// replaces the old one wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformTable {
    points: Vec<ControlPoint>,
}

impl WaveformTable {
    /// Build a table from points already in phase order.
    pub fn new(points: Vec<ControlPoint>) -> Result<Self, WaveformError> {
        validate(&points)?;
        Ok(Self { points })
    }

    /// Sort the points by phase, then validate.
    ///
    /// Editors append points wherever the user clicks, so this is the usual
    /// entry point for hand-drawn shapes.
    pub fn from_unsorted(mut points: Vec<ControlPoint>) -> Result<Self, WaveformError> {
        if let Some(index) = points
            .iter()
            .position(|p| !p.phase.is_finite() || !p.value.is_finite())
        {
            return Err(WaveformError::NonFinite { index });
        }
        points.sort_by(|a, b| a.phase.total_cmp(&b.phase));
        Self::new(points)
    }

    /// Two points at zero: the engine's startup shape.
    pub fn silent() -> Self {
        Self {
            points: vec![ControlPoint::new(0.0, 0.0), ControlPoint::new(1.0, 0.0)],
        }
    }

    /// Copy of this table with one more point inserted in phase order.
    pub fn with_point(&self, point: ControlPoint) -> Result<Self, WaveformError> {
        let mut points = self.points.clone();
        points.push(point);
        Self::from_unsorted(points)
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a validated table.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Signal value at `phase`, which must lie in `[0, 1]`.
    pub fn lookup(&self, phase: f32) -> Result<f32, LookupError> {
        if !(0.0..=1.0).contains(&phase) {
            return Err(LookupError::PhaseOutOfRange(phase));
        }
        interpolate(phase, &self.points)
    }

    /// Smallest and largest control point values.
    pub fn value_range(&self) -> (f32, f32) {
        self.points
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.value), hi.max(p.value))
            })
    }
}

impl Default for WaveformTable {
    fn default() -> Self {
        Self::silent()
    }
}

fn validate(points: &[ControlPoint]) -> Result<(), WaveformError> {
    let first = points.first().ok_or(WaveformError::Empty)?;
    if !first.phase.is_finite() || !first.value.is_finite() {
        return Err(WaveformError::NonFinite { index: 0 });
    }
    if first.phase != 0.0 {
        return Err(WaveformError::FirstPhaseNotZero { phase: first.phase });
    }

    let mut previous = first.phase;
    for (index, point) in points.iter().enumerate().skip(1) {
        if !point.phase.is_finite() || !point.value.is_finite() {
            return Err(WaveformError::NonFinite { index });
        }
        if !(0.0..=1.0).contains(&point.phase) {
            return Err(WaveformError::PhaseOutOfRange { index, phase: point.phase });
        }
        if point.phase < previous {
            return Err(WaveformError::Unordered { index, previous, phase: point.phase });
        }
        previous = point.phase;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f32, f32)]) -> Vec<ControlPoint> {
        raw.iter().map(|&(phase, value)| ControlPoint::new(phase, value)).collect()
    }

    #[test]
    fn rejects_empty_table() {
        assert_eq!(WaveformTable::new(Vec::new()), Err(WaveformError::Empty));
    }

    #[test]
    fn rejects_first_phase_above_zero() {
        let err = WaveformTable::new(pts(&[(0.1, 1.0), (1.0, 0.0)])).unwrap_err();
        assert_eq!(err, WaveformError::FirstPhaseNotZero { phase: 0.1 });
    }

    #[test]
    fn rejects_descending_phases() {
        let err = WaveformTable::new(pts(&[(0.0, 0.0), (0.6, 1.0), (0.4, 0.0)])).unwrap_err();
        assert!(matches!(err, WaveformError::Unordered { index: 2, .. }));
    }

    #[test]
    fn rejects_phase_past_one() {
        let err = WaveformTable::new(pts(&[(0.0, 0.0), (1.5, 1.0)])).unwrap_err();
        assert!(matches!(err, WaveformError::PhaseOutOfRange { index: 1, .. }));
    }

    #[test]
    fn rejects_nan_values() {
        let err = WaveformTable::new(pts(&[(0.0, 0.0), (0.5, f32::NAN)])).unwrap_err();
        assert_eq!(err, WaveformError::NonFinite { index: 1 });
        let err = WaveformTable::from_unsorted(pts(&[(0.5, 0.0), (f32::NAN, 1.0)])).unwrap_err();
        assert_eq!(err, WaveformError::NonFinite { index: 1 });
    }

    #[test]
    fn accepts_duplicate_phases() {
        let table = WaveformTable::new(pts(&[(0.0, -1.0), (0.5, -1.0), (0.5, 1.0), (1.0, 1.0)]));
        assert!(table.is_ok());
    }

    #[test]
    fn from_unsorted_orders_points() {
        let table =
            WaveformTable::from_unsorted(pts(&[(0.75, 1.0), (0.0, 0.0), (0.25, -1.0)])).unwrap();
        let phases: Vec<f32> = table.points().iter().map(|p| p.phase).collect();
        assert_eq!(phases, vec![0.0, 0.25, 0.75]);
    }

    #[test]
    fn with_point_leaves_base_untouched() {
        let base = WaveformTable::silent();
        let edited = base.with_point(ControlPoint::new(0.5, 1.0)).unwrap();
        assert_eq!(base.len(), 2);
        assert_eq!(edited.len(), 3);
        assert_eq!(edited.points()[1], ControlPoint::new(0.5, 1.0));
        assert_eq!(edited.lookup(0.5), Ok(1.0));
    }

    #[test]
    fn lookup_rejects_out_of_range_phase() {
        let table = WaveformTable::silent();
        assert_eq!(table.lookup(-0.25), Err(LookupError::PhaseOutOfRange(-0.25)));
        assert!(table.lookup(f32::NAN).is_err());
        assert!(table.lookup(1.0).is_ok());
    }

    #[test]
    fn value_range_spans_points() {
        let table = WaveformTable::new(pts(&[(0.0, -0.5), (0.3, 0.8), (0.9, 0.1)])).unwrap();
        assert_eq!(table.value_range(), (-0.5, 0.8));
    }
}
