use std::time::Duration;

/// Detections below this confidence never create or update a track.
pub const MIN_DETECTION_SCORE: f64 = 0.60;

/// Minimum IoU between a track's target box and a same-class detection.
pub const ASSOCIATION_IOU: f64 = 0.3;

/// Weight of the previous score when blending in a matched detection.
pub const SCORE_RETENTION: f64 = 0.7;

/// Unmatched tracks are evicted once this much time has passed.
pub const TRACK_TTL: Duration = Duration::from_millis(1000);

/// Exponential approach rate of displayed boxes, per second.
pub const SMOOTHING_RATE_PER_SEC: f64 = 5.0;

/// ROI margin as a fraction of the landmark box's longest side.
pub const SINGLE_HAND_MARGIN: f64 = 1.0;
pub const MULTI_HAND_MARGIN: f64 = 0.8;

/// Regions narrower or shorter than this fall back to the full frame.
pub const MIN_ROI_SIDE_PX: f64 = 10.0;

pub const LOCAL_TARGET_WIDTH: u32 = 480;
pub const LOCAL_QUALITY: f64 = 0.6;
pub const LOCAL_MIN_SEND_INTERVAL: Duration = Duration::ZERO;

pub const REMOTE_TARGET_WIDTH: u32 = 320;
pub const REMOTE_QUALITY: f64 = 0.4;
/// Caps remote traffic at 5 requests per second.
pub const REMOTE_MIN_SEND_INTERVAL: Duration = Duration::from_millis(200);

/// Roughly one display refresh at 60 Hz.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

pub const DETECT_PATH: &str = "/ws/detect";

/// One-shot still-image detection over plain HTTP.
pub const IMAGE_DETECT_PATH: &str = "/detect";
pub const IMAGE_TARGET_WIDTH: u32 = 640;
pub const IMAGE_QUALITY: f64 = 0.7;
pub const IMAGE_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];
