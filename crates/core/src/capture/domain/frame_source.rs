use crate::shared::frame::Frame;

/// Domain interface for the camera side of the pipeline.
///
/// Implementations may block briefly while decoding, but must not wait for
/// new frames to be produced: `Ok(None)` means the source is exhausted.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;
}
