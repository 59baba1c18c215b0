/// Lifecycle of the persistent detector connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    OpenIdle,
    OpenAwaitingReply,
    Closing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionEvent {
    ConnectRequested,
    HandshakeCompleted,
    RequestSent,
    ReplyReceived,
    /// A single request failed but the connection is still usable.
    RequestFailed,
    TransportFailed,
    RemoteClosed,
    StopRequested,
    Closed,
}

impl ConnectionState {
    /// Next state after `event`. Events that make no sense in the current
    /// state leave it unchanged.
    pub fn on(self, event: ConnectionEvent) -> Self {
        use ConnectionEvent::*;
        use ConnectionState::*;

        match (self, event) {
            (Disconnected, ConnectRequested) => Connecting,
            (Connecting, HandshakeCompleted) => OpenIdle,
            (OpenIdle, RequestSent) => OpenAwaitingReply,
            (OpenAwaitingReply, ReplyReceived | RequestFailed) => OpenIdle,
            (Connecting | OpenIdle | OpenAwaitingReply, TransportFailed | RemoteClosed) => {
                Disconnected
            }
            (Connecting | OpenIdle | OpenAwaitingReply, StopRequested) => Closing,
            (Closing, Closed | TransportFailed | RemoteClosed) => Disconnected,
            (state, _) => state,
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, Self::OpenIdle | Self::OpenAwaitingReply)
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectionEvent::*;
    use super::ConnectionState::*;
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Disconnected, ConnectRequested, Connecting)]
    #[case(Connecting, HandshakeCompleted, OpenIdle)]
    #[case(OpenIdle, RequestSent, OpenAwaitingReply)]
    #[case(OpenAwaitingReply, ReplyReceived, OpenIdle)]
    #[case(OpenAwaitingReply, RequestFailed, OpenIdle)]
    #[case(Connecting, TransportFailed, Disconnected)]
    #[case(OpenIdle, RemoteClosed, Disconnected)]
    #[case(OpenAwaitingReply, TransportFailed, Disconnected)]
    #[case(OpenIdle, StopRequested, Closing)]
    #[case(OpenAwaitingReply, StopRequested, Closing)]
    #[case(Closing, Closed, Disconnected)]
    fn test_transitions(
        #[case] from: ConnectionState,
        #[case] event: ConnectionEvent,
        #[case] to: ConnectionState,
    ) {
        assert_eq!(from.on(event), to);
    }

    #[rstest]
    #[case(OpenAwaitingReply, RequestSent)]
    #[case(Connecting, RequestSent)]
    #[case(Disconnected, RequestSent)]
    #[case(OpenIdle, ConnectRequested)]
    #[case(Connecting, ConnectRequested)]
    #[case(Disconnected, StopRequested)]
    #[case(OpenIdle, ReplyReceived)]
    fn test_irrelevant_events_are_ignored(
        #[case] state: ConnectionState,
        #[case] event: ConnectionEvent,
    ) {
        assert_eq!(state.on(event), state);
    }

    #[test]
    fn test_is_open() {
        assert!(OpenIdle.is_open());
        assert!(OpenAwaitingReply.is_open());
        assert!(!Connecting.is_open());
        assert!(!Closing.is_open());
        assert!(!ConnectionState::default().is_open());
    }
}
