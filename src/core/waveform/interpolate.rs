use super::ControlPoint;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum LookupError {
    /// No control point at or before the queried phase
    NoLowerBound { phase: f32 },
    PhaseOutOfRange(f32),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NoLowerBound { phase } => {
                write!(f, "no control point at or before phase {phase}")
            }
            LookupError::PhaseOutOfRange(phase) => write!(f, "phase {phase} is outside [0, 1]"),
        }
    }
}

impl std::error::Error for LookupError {}

/// Linearly interpolate a circular point sequence at `phase`.
///
/// `points` must be sorted by phase. The lower bound is the last point whose
/// phase is `<= phase`; the upper bound is the point after it, or the first
/// point moved to phase 1 when the lower bound is the last point. Two points
/// sharing a phase encode a vertical edge and resolve to the upper value.
pub fn interpolate(phase: f32, points: &[ControlPoint]) -> Result<f32, LookupError> {
    let at_or_below = points.partition_point(|p| p.phase <= phase);
    if at_or_below == 0 {
        return Err(LookupError::NoLowerBound { phase });
    }

    let lower_index = at_or_below - 1;
    let lower = points[lower_index];
    let (upper_phase, upper_value) = match points.get(lower_index + 1) {
        Some(upper) => (upper.phase, upper.value),
        None => (1.0, points[0].value),
    };

    let phase_range = upper_phase - lower.phase;
    if phase_range <= 0.0 {
        return Ok(upper_value);
    }

    let fraction = (phase - lower.phase) / phase_range;
    Ok(lower.value + fraction * (upper_value - lower.value))
}
