use crate::stream::domain::protocol::DetectRequest;

/// Domain interface for one-shot detection of a single still image.
///
/// Unlike [`DetectorTransport`], a call blocks until the detector answers
/// and returns the raw reply text for [`parse_reply`].
///
/// [`DetectorTransport`]: crate::stream::domain::transport::DetectorTransport
/// [`parse_reply`]: crate::stream::domain::protocol::parse_reply
pub trait ImageDetector: Send {
    fn detect(&self, request: &DetectRequest) -> Result<String, Box<dyn std::error::Error>>;
}
