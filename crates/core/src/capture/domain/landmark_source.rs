use crate::shared::frame::Frame;
use crate::shared::landmarks::LandmarkSignal;

/// Domain interface for the hand-landmark collaborator.
///
/// A source that fails to produce landmarks for a frame reports absence
/// rather than an error; the pipeline treats both the same way.
pub trait LandmarkSource: Send {
    fn detect(&mut self, frame: &Frame) -> LandmarkSignal;
}
