pub mod connection_state;
pub mod image_detector;
pub mod protocol;
pub mod reply_rate;
pub mod stream_client;
pub mod transport;
