use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid detector url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("transport is not connected")]
    NotConnected,
    #[error("failed to send request: {0}")]
    Send(String),
    #[error("failed to start connection thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Something that happened on the connection since the last poll.
#[derive(Clone, Debug, PartialEq)]
pub enum TransportEvent {
    Opened,
    Message(String),
    Error(String),
    Closed,
}

/// Domain interface for the persistent, message-oriented detector
/// connection.
///
/// All calls return without waiting on the network. Connection progress
/// and inbound messages are observed through [`poll_event`].
///
/// [`poll_event`]: DetectorTransport::poll_event
pub trait DetectorTransport: Send {
    /// Starts opening the connection. Success is reported later as
    /// [`TransportEvent::Opened`].
    fn connect(&mut self) -> Result<(), TransportError>;

    fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Tears the connection down. Events still queued are discarded.
    fn close(&mut self);

    fn poll_event(&mut self) -> Option<TransportEvent>;
}
