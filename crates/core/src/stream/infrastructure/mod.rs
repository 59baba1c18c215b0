pub mod http_detector;
pub mod websocket_transport;
