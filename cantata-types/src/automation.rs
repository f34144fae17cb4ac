//! Automation lanes: time-ordered control curves for one parameter.

use serde::{Deserialize, Serialize};

/// Interpolation kind from a point to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveKind {
    /// Hold the previous value until the next point.
    Step,
    /// Straight line to the next point.
    Linear,
    /// Square-law ease (good for gain and frequency ranges).
    Exponential,
}

impl Default for CurveKind {
    fn default() -> Self {
        Self::Linear
    }
}

/// A single control point on a lane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutomationPoint {
    pub beat: f64,
    pub value: f64,
    pub curve: CurveKind,
}

impl AutomationPoint {
    pub fn new(beat: f64, value: f64, curve: CurveKind) -> Self {
        Self { beat, value, curve }
    }
}

/// An ordered-by-beat sequence of control points for one parameter.
///
/// Invariant: `points` is strictly increasing in beat. Inserting at an
/// occupied beat replaces the existing point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutomationLane {
    pub enabled: bool,
    pub points: Vec<AutomationPoint>,
}

impl AutomationLane {
    pub fn new() -> Self {
        Self {
            enabled: true,
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Insert a point, keeping the strictly-increasing invariant.
    /// Returns the point that was replaced, if the beat was occupied.
    pub fn insert_point(&mut self, point: AutomationPoint) -> Option<AutomationPoint> {
        let idx = self.points.partition_point(|p| p.beat < point.beat);
        if let Some(existing) = self.points.get_mut(idx) {
            if existing.beat == point.beat {
                return Some(std::mem::replace(existing, point));
            }
        }
        self.points.insert(idx, point);
        None
    }

    /// Remove the point at exactly `beat`, returning it.
    pub fn remove_point(&mut self, beat: f64) -> Option<AutomationPoint> {
        let idx = self.points.iter().position(|p| p.beat == beat)?;
        Some(self.points.remove(idx))
    }

    pub fn point_at(&self, beat: f64) -> Option<&AutomationPoint> {
        self.points.iter().find(|p| p.beat == beat)
    }

    /// Evaluate the lane at a beat.
    ///
    /// Beats before the first point hold the first point's value,
    /// beats after the last hold the last. Between points the value is
    /// interpolated per the earlier point's curve kind. Returns `None`
    /// for an empty lane.
    pub fn value_at(&self, beat: f64) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        // Index of the first point strictly after `beat`.
        let idx = self.points.partition_point(|p| p.beat <= beat);
        if idx == 0 {
            return Some(self.points[0].value);
        }
        let prev = &self.points[idx - 1];
        if idx == self.points.len() || prev.beat == beat {
            return Some(prev.value);
        }
        let next = &self.points[idx];
        let t = (beat - prev.beat) / (next.beat - prev.beat);
        Some(interpolate(prev.value, next.value, t, prev.curve))
    }
}

/// Interpolate between two values based on curve kind.
fn interpolate(from: f64, to: f64, t: f64, curve: CurveKind) -> f64 {
    match curve {
        CurveKind::Step => from,
        CurveKind::Linear => from + (to - from) * t,
        CurveKind::Exponential => from + (to - from) * t * t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane(points: &[(f64, f64, CurveKind)]) -> AutomationLane {
        let mut lane = AutomationLane::new();
        for &(beat, value, curve) in points {
            lane.insert_point(AutomationPoint::new(beat, value, curve));
        }
        lane
    }

    #[test]
    fn empty_lane_has_no_value() {
        assert_eq!(AutomationLane::new().value_at(1.0), None);
    }

    #[test]
    fn linear_midpoint() {
        let lane = lane(&[(0.0, -6.0, CurveKind::Linear), (4.0, 0.0, CurveKind::Linear)]);
        assert_eq!(lane.value_at(2.0), Some(-3.0));
    }

    #[test]
    fn holds_outside_bounds() {
        let lane = lane(&[(1.0, 0.25, CurveKind::Linear), (3.0, 0.75, CurveKind::Linear)]);
        assert_eq!(lane.value_at(0.0), Some(0.25));
        assert_eq!(lane.value_at(10.0), Some(0.75));
    }

    #[test]
    fn exact_beat_returns_point_value_for_every_curve() {
        for curve in [CurveKind::Step, CurveKind::Linear, CurveKind::Exponential] {
            let lane = lane(&[(0.0, 0.1, curve), (2.0, 0.9, curve), (4.0, 0.5, curve)]);
            assert_eq!(lane.value_at(0.0), Some(0.1));
            assert_eq!(lane.value_at(2.0), Some(0.9));
            assert_eq!(lane.value_at(4.0), Some(0.5));
        }
    }

    #[test]
    fn step_holds_previous_value() {
        let lane = lane(&[(0.0, 1.0, CurveKind::Step), (4.0, 2.0, CurveKind::Step)]);
        assert_eq!(lane.value_at(3.999), Some(1.0));
        assert_eq!(lane.value_at(4.0), Some(2.0));
    }

    #[test]
    fn exponential_eases_in() {
        let lane = lane(&[(0.0, 0.0, CurveKind::Exponential), (4.0, 1.0, CurveKind::Exponential)]);
        // t = 0.5 -> t^2 = 0.25
        assert_eq!(lane.value_at(2.0), Some(0.25));
    }

    #[test]
    fn insert_at_occupied_beat_replaces() {
        let mut lane = lane(&[(1.0, 0.5, CurveKind::Linear)]);
        let replaced = lane.insert_point(AutomationPoint::new(1.0, 0.9, CurveKind::Step));
        assert_eq!(replaced.map(|p| p.value), Some(0.5));
        assert_eq!(lane.points.len(), 1);
        assert_eq!(lane.value_at(1.0), Some(0.9));
    }

    #[test]
    fn points_stay_strictly_increasing() {
        let lane = lane(&[
            (4.0, 0.4, CurveKind::Linear),
            (1.0, 0.1, CurveKind::Linear),
            (2.0, 0.2, CurveKind::Linear),
        ]);
        let beats: Vec<f64> = lane.points.iter().map(|p| p.beat).collect();
        assert_eq!(beats, vec![1.0, 2.0, 4.0]);
    }

    #[test]
    fn remove_point_returns_it() {
        let mut lane = lane(&[(1.0, 0.1, CurveKind::Linear), (2.0, 0.2, CurveKind::Linear)]);
        let removed = lane.remove_point(1.0);
        assert_eq!(removed.map(|p| p.value), Some(0.1));
        assert_eq!(lane.points.len(), 1);
        assert_eq!(lane.remove_point(9.0), None);
    }
}
