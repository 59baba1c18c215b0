use std::time::{Duration, Instant};

/// What the drive loop knows when it considers sending a frame.
#[derive(Clone, Copy, Debug)]
pub struct GateInput {
    pub active: bool,
    pub presence: bool,
    pub awaiting_reply: bool,
    pub connected: bool,
    pub now: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Send,
    /// Everything allows a send except the connection; open it instead.
    Connect,
    SourceInactive,
    NoPresence,
    RequestOutstanding,
    Throttled,
}

/// Decides, once per tick, whether a frame goes to the detector.
///
/// Checks run in a fixed order: session active and hands present, no
/// request outstanding, minimum interval elapsed, connection open. A
/// refusal is backpressure, not an error.
#[derive(Debug)]
pub struct SendGate {
    min_interval: Duration,
    last_send: Option<Instant>,
}

impl SendGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_send: None,
        }
    }

    pub fn evaluate(&self, input: &GateInput) -> GateDecision {
        if !input.active {
            return GateDecision::SourceInactive;
        }
        if !input.presence {
            return GateDecision::NoPresence;
        }
        if input.awaiting_reply {
            return GateDecision::RequestOutstanding;
        }
        if let Some(last) = self.last_send {
            if input.now.saturating_duration_since(last) < self.min_interval {
                return GateDecision::Throttled;
            }
        }
        if !input.connected {
            return GateDecision::Connect;
        }
        GateDecision::Send
    }

    pub fn record_send(&mut self, now: Instant) {
        self.last_send = Some(now);
    }

    pub fn reset(&mut self) {
        self.last_send = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn input(now: Instant) -> GateInput {
        GateInput {
            active: true,
            presence: true,
            awaiting_reply: false,
            connected: true,
            now,
        }
    }

    #[test]
    fn test_all_clear_sends() {
        let gate = SendGate::new(Duration::ZERO);
        assert_eq!(gate.evaluate(&input(Instant::now())), GateDecision::Send);
    }

    #[rstest]
    #[case(false, true, false, true, GateDecision::SourceInactive)]
    #[case(true, false, false, true, GateDecision::NoPresence)]
    #[case(true, true, true, true, GateDecision::RequestOutstanding)]
    #[case(true, true, false, false, GateDecision::Connect)]
    // inactive wins over every later check
    #[case(false, false, true, false, GateDecision::SourceInactive)]
    // an outstanding request is reported before the missing connection
    #[case(true, true, true, false, GateDecision::RequestOutstanding)]
    fn test_refusals_in_order(
        #[case] active: bool,
        #[case] presence: bool,
        #[case] awaiting_reply: bool,
        #[case] connected: bool,
        #[case] expected: GateDecision,
    ) {
        let gate = SendGate::new(Duration::ZERO);
        let decision = gate.evaluate(&GateInput {
            active,
            presence,
            awaiting_reply,
            connected,
            now: Instant::now(),
        });
        assert_eq!(decision, expected);
    }

    #[test]
    fn test_throttle_until_interval_elapsed() {
        let mut gate = SendGate::new(Duration::from_millis(200));
        let t0 = Instant::now();
        gate.record_send(t0);

        let early = input(t0 + Duration::from_millis(199));
        assert_eq!(gate.evaluate(&early), GateDecision::Throttled);
        let due = input(t0 + Duration::from_millis(200));
        assert_eq!(gate.evaluate(&due), GateDecision::Send);
    }

    #[test]
    fn test_throttle_precedes_connect() {
        let mut gate = SendGate::new(Duration::from_millis(200));
        let t0 = Instant::now();
        gate.record_send(t0);
        let mut i = input(t0 + Duration::from_millis(50));
        i.connected = false;
        assert_eq!(gate.evaluate(&i), GateDecision::Throttled);
    }

    #[test]
    fn test_zero_interval_never_throttles() {
        let mut gate = SendGate::new(Duration::ZERO);
        let t0 = Instant::now();
        gate.record_send(t0);
        assert_eq!(gate.evaluate(&input(t0)), GateDecision::Send);
    }

    #[test]
    fn test_reset_forgets_last_send() {
        let mut gate = SendGate::new(Duration::from_secs(10));
        let t0 = Instant::now();
        gate.record_send(t0);
        gate.reset();
        assert_eq!(gate.evaluate(&input(t0)), GateDecision::Send);
    }
}
