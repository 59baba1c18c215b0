use std::net::TcpStream;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use crate::stream::domain::transport::{DetectorTransport, TransportError, TransportEvent};

/// How long a blocked read waits before outbound commands are serviced.
const READ_POLL_INTERVAL: Duration = Duration::from_millis(5);

enum Command {
    Send(String),
    Close,
}

struct Session {
    commands: Sender<Command>,
    events: Receiver<TransportEvent>,
}

/// WebSocket connection to the detector, driven by a dedicated I/O thread.
///
/// Layout: `caller → commands → io thread [tungstenite] → events → caller`
///
/// The caller never blocks on the network: `connect` and `send` only enqueue
/// work, and everything the socket reports comes back through
/// [`DetectorTransport::poll_event`].
pub struct WebSocketTransport {
    url: String,
    session: Option<Session>,
}

impl WebSocketTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            session: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn validate_url(url: &str) -> Result<(), TransportError> {
    let invalid = |reason: &str| TransportError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };
    let uri: tungstenite::http::Uri = url.parse().map_err(|_| invalid("not a valid URI"))?;
    match uri.scheme_str() {
        Some("ws") | Some("wss") => {}
        _ => return Err(invalid("scheme must be ws or wss")),
    }
    if uri.host().is_none() {
        return Err(invalid("missing host"));
    }
    Ok(())
}

impl DetectorTransport for WebSocketTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        validate_url(&self.url)?;
        self.close();

        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let url = self.url.clone();
        std::thread::Builder::new()
            .name("detector-io".into())
            .spawn(move || run_session(&url, command_rx, event_tx))?;

        self.session = Some(Session {
            commands: command_tx,
            events: event_rx,
        });
        Ok(())
    }

    fn send(&mut self, text: String) -> Result<(), TransportError> {
        let session = self.session.as_ref().ok_or(TransportError::NotConnected)?;
        session
            .commands
            .send(Command::Send(text))
            .map_err(|_| TransportError::Send("I/O thread has exited".into()))
    }

    fn close(&mut self) {
        if let Some(session) = self.session.take() {
            // The thread finishes the close handshake on its own; dropping
            // the receiver discards anything it still reports.
            let _ = session.commands.send(Command::Close);
        }
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.session.as_ref()?.events.try_recv().ok()
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.close();
    }
}

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

fn run_session(url: &str, commands: Receiver<Command>, events: Sender<TransportEvent>) {
    let mut socket = match tungstenite::connect(url) {
        Ok((socket, _response)) => socket,
        Err(e) => {
            let _ = events.send(TransportEvent::Error(e.to_string()));
            let _ = events.send(TransportEvent::Closed);
            return;
        }
    };
    if let Err(e) = set_read_timeout(&mut socket, READ_POLL_INTERVAL) {
        log::warn!("Could not set detector read timeout: {e}");
    }
    if events.send(TransportEvent::Opened).is_err() {
        shutdown(&mut socket);
        return;
    }

    loop {
        match drain_commands(&mut socket, &commands) {
            Ok(true) => {}
            Ok(false) => {
                shutdown(&mut socket);
                return;
            }
            Err(e) => {
                let _ = events.send(TransportEvent::Error(e.to_string()));
                let _ = events.send(TransportEvent::Closed);
                return;
            }
        }

        match socket.read() {
            Ok(Message::Text(text)) => {
                if events.send(TransportEvent::Message(text)).is_err() {
                    shutdown(&mut socket);
                    return;
                }
            }
            // Close frames are answered by tungstenite; the next read
            // reports ConnectionClosed.
            Ok(_) => {}
            Err(tungstenite::Error::Io(e))
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) => {}
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                let _ = events.send(TransportEvent::Closed);
                return;
            }
            Err(e) => {
                let _ = events.send(TransportEvent::Error(e.to_string()));
                let _ = events.send(TransportEvent::Closed);
                return;
            }
        }
    }
}

/// Forwards queued outbound messages. `Ok(false)` means the owner asked to
/// close or went away.
fn drain_commands(
    socket: &mut Socket,
    commands: &Receiver<Command>,
) -> Result<bool, tungstenite::Error> {
    loop {
        match commands.try_recv() {
            Ok(Command::Send(text)) => socket.send(Message::text(text))?,
            Ok(Command::Close) | Err(TryRecvError::Disconnected) => return Ok(false),
            Err(TryRecvError::Empty) => return Ok(true),
        }
    }
}

fn shutdown(socket: &mut Socket) {
    let _ = socket.close(None);
    let _ = socket.flush();
}

fn set_read_timeout(socket: &mut Socket, timeout: Duration) -> std::io::Result<()> {
    match socket.get_mut() {
        MaybeTlsStream::Plain(stream) => stream.set_read_timeout(Some(timeout)),
        MaybeTlsStream::Rustls(stream) => stream.sock.set_read_timeout(Some(timeout)),
        _ => Ok(()),
    }
}
