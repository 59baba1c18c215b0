//! Hand-landmark signal as produced by an external landmark model.

use serde::{Deserialize, Serialize};

/// One keypoint, normalized to `[0, 1]` of the frame dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Keypoints of a single detected hand.
pub type LandmarkSet = Vec<LandmarkPoint>;

/// Per-frame output of the landmark model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSignal {
    pub presence: bool,
    #[serde(default)]
    pub sets: Vec<LandmarkSet>,
}

impl LandmarkSignal {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn present(sets: Vec<LandmarkSet>) -> Self {
        Self {
            presence: true,
            sets,
        }
    }

    pub fn point_count(&self) -> usize {
        self.sets.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_has_no_points() {
        let signal = LandmarkSignal::absent();
        assert!(!signal.presence);
        assert_eq!(signal.point_count(), 0);
    }

    #[test]
    fn test_point_count_spans_sets() {
        let signal = LandmarkSignal::present(vec![
            vec![LandmarkPoint::new(0.1, 0.1), LandmarkPoint::new(0.2, 0.2)],
            vec![LandmarkPoint::new(0.5, 0.5)],
        ]);
        assert_eq!(signal.point_count(), 3);
    }

    #[test]
    fn test_deserialize_without_sets() {
        let signal: LandmarkSignal = serde_json::from_str(r#"{"presence": false}"#).unwrap();
        assert_eq!(signal, LandmarkSignal::absent());
    }
}
