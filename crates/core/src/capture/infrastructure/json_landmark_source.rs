use std::path::Path;

use crate::capture::domain::landmark_source::LandmarkSource;
use crate::shared::frame::Frame;
use crate::shared::landmarks::LandmarkSignal;

/// Serves pre-recorded hand landmarks keyed by frame index.
///
/// The file holds a JSON array with one entry per frame:
/// `{"presence": true, "sets": [[{"x": 0.4, "y": 0.5}, ...]]}`.
/// Frames past the end of the recording report no hands.
pub struct JsonLandmarkSource {
    signals: Vec<LandmarkSignal>,
}

impl JsonLandmarkSource {
    pub fn new(signals: Vec<LandmarkSignal>) -> Self {
        Self { signals }
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read landmarks {}: {e}", path.display()))?;
        let signals: Vec<LandmarkSignal> = serde_json::from_str(&text)
            .map_err(|e| format!("Invalid landmarks {}: {e}", path.display()))?;
        log::debug!("Loaded landmarks for {} frames", signals.len());
        Ok(Self::new(signals))
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

impl LandmarkSource for JsonLandmarkSource {
    fn detect(&mut self, frame: &Frame) -> LandmarkSignal {
        self.signals
            .get(frame.index())
            .cloned()
            .unwrap_or_else(LandmarkSignal::absent)
    }
}
