use std::time::Instant;

use crate::capture::domain::frame_encoder::{CropTransform, EncodedFrame};
use crate::stream::domain::connection_state::{ConnectionEvent, ConnectionState};
use crate::stream::domain::protocol::{
    parse_reply, remap_detections, DetectRequest, DetectorReply,
};
use crate::stream::domain::reply_rate::ReplyRateCounter;
use crate::stream::domain::transport::{DetectorTransport, TransportEvent};
use crate::tracking::domain::detection::Detection;

/// Everything the client observed since the previous poll.
#[derive(Debug, Default)]
pub struct StreamPoll {
    /// Source-space detection batches, in arrival order.
    pub batches: Vec<Vec<Detection>>,
    /// Set on the first failure of a connection episode only.
    pub failure: Option<String>,
}

/// Sole owner of the detector connection.
///
/// Keeps at most one request in flight and remembers the crop transform it
/// was encoded with, so the matching reply is mapped back through exactly
/// that transform. Whether a send should happen at all is decided by the
/// caller; the client only refuses when the connection is not idle.
pub struct StreamClient {
    transport: Box<dyn DetectorTransport>,
    state: ConnectionState,
    in_flight: Option<CropTransform>,
    replies: ReplyRateCounter,
    failure_reported: bool,
    pending_failure: Option<String>,
}

impl StreamClient {
    pub fn new(transport: Box<dyn DetectorTransport>) -> Self {
        Self {
            transport,
            state: ConnectionState::Disconnected,
            in_flight: None,
            replies: ReplyRateCounter::new(),
            failure_reported: false,
            pending_failure: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn replies_per_second(&self) -> u32 {
        self.replies.per_second()
    }

    /// Starts a connection attempt unless one is open or already pending.
    pub fn ensure_connected(&mut self) {
        if self.state != ConnectionState::Disconnected {
            return;
        }
        self.state = self.state.on(ConnectionEvent::ConnectRequested);
        log::debug!("Connecting to detector");
        if let Err(e) = self.transport.connect() {
            self.state = self.state.on(ConnectionEvent::TransportFailed);
            self.report_failure(e.to_string());
        }
    }

    /// Issues a request for `frame`. Returns `false` without side effects
    /// unless the connection is open and idle.
    pub fn send(&mut self, frame: &EncodedFrame) -> bool {
        if self.state != ConnectionState::OpenIdle {
            return false;
        }
        let text = match DetectRequest::from_encoded(frame).to_json() {
            Ok(text) => text,
            Err(e) => {
                log::error!("Failed to serialize detect request: {e}");
                return false;
            }
        };

        self.state = self.state.on(ConnectionEvent::RequestSent);
        self.in_flight = Some(frame.transform);
        if let Err(e) = self.transport.send(text) {
            log::error!("Detector send failed: {e}");
            self.state = self.state.on(ConnectionEvent::RequestFailed);
            self.in_flight = None;
            return false;
        }
        true
    }

    /// Drains pending transport events.
    pub fn poll(&mut self, now: Instant) -> StreamPoll {
        let mut out = StreamPoll::default();
        while let Some(event) = self.transport.poll_event() {
            match event {
                TransportEvent::Opened => self.on_opened(),
                TransportEvent::Message(text) => {
                    if let Some(batch) = self.on_message(&text, now) {
                        out.batches.push(batch);
                    }
                }
                TransportEvent::Error(reason) => self.on_error(reason),
                TransportEvent::Closed => self.on_closed(),
            }
        }
        out.failure = self.take_failure();
        out
    }

    /// The failure notice raised since the last poll, if any.
    pub fn take_failure(&mut self) -> Option<String> {
        self.pending_failure.take()
    }

    /// Tears the connection down and forgets the session. Not a failure.
    pub fn stop(&mut self) {
        self.in_flight = None;
        self.replies.reset();
        self.failure_reported = false;
        self.pending_failure = None;
        if self.state == ConnectionState::Disconnected {
            return;
        }
        self.state = self.state.on(ConnectionEvent::StopRequested);
        self.transport.close();
        self.state = self.state.on(ConnectionEvent::Closed);
        log::debug!("Detector connection closed on stop");
    }

    fn on_opened(&mut self) {
        if self.state != ConnectionState::Connecting {
            return;
        }
        self.state = self.state.on(ConnectionEvent::HandshakeCompleted);
        self.failure_reported = false;
        log::info!("Detector connection open");
    }

    fn on_message(&mut self, text: &str, now: Instant) -> Option<Vec<Detection>> {
        // Cleared whatever the reply turns out to be.
        let transform = self.in_flight.take();
        self.state = self.state.on(ConnectionEvent::ReplyReceived);

        match parse_reply(text) {
            Ok(DetectorReply::Detections(list)) => {
                let Some(transform) = transform else {
                    log::debug!("Ignoring reply with no request in flight");
                    return None;
                };
                self.replies.record(now);
                Some(remap_detections(list, &transform))
            }
            Ok(DetectorReply::Error(message)) => {
                log::warn!("Detector reported an error: {message}");
                None
            }
            Err(e) => {
                log::error!("Malformed detector reply: {e}");
                None
            }
        }
    }

    fn on_error(&mut self, reason: String) {
        self.in_flight = None;
        match self.state {
            ConnectionState::Connecting => {
                self.state = self.state.on(ConnectionEvent::TransportFailed);
                self.transport.close();
            }
            ConnectionState::OpenAwaitingReply => {
                self.state = self.state.on(ConnectionEvent::RequestFailed);
            }
            _ => {}
        }
        self.report_failure(reason);
    }

    fn on_closed(&mut self) {
        self.in_flight = None;
        if self.state == ConnectionState::Disconnected {
            return;
        }
        self.state = self.state.on(ConnectionEvent::RemoteClosed);
        self.transport.close();
        log::info!("Detector connection closed");
    }

    fn report_failure(&mut self, reason: String) {
        if self.failure_reported {
            log::debug!("Detector connection still failing: {reason}");
            return;
        }
        self.failure_reported = true;
        log::warn!("Detector connection failed: {reason}");
        self.pending_failure = Some(reason);
    }
}
