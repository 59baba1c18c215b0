//! Pipeline configuration: reachability-based profiles plus optional
//! overrides loaded from a JSON settings file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    ASSOCIATION_IOU, DEFAULT_TICK_INTERVAL, DETECT_PATH, IMAGE_DETECT_PATH,
    LOCAL_MIN_SEND_INTERVAL, LOCAL_QUALITY, LOCAL_TARGET_WIDTH, MIN_DETECTION_SCORE,
    REMOTE_MIN_SEND_INTERVAL, REMOTE_QUALITY, REMOTE_TARGET_WIDTH, SMOOTHING_RATE_PER_SEC,
    TRACK_TTL,
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{name} must be {expected}, got {value}")]
    OutOfRange {
        name: &'static str,
        expected: &'static str,
        value: f64,
    },
}

/// Where the detector runs relative to this process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reachability {
    Local,
    Remote,
}

impl Reachability {
    /// Same-host when the URL's host is a loopback name or address.
    pub fn from_url(url: &str) -> Self {
        let host = url
            .parse::<tungstenite::http::Uri>()
            .ok()
            .and_then(|uri| uri.host().map(str::to_owned));
        match host.as_deref() {
            Some("localhost") | Some("127.0.0.1") | Some("[::1]") | Some("::1") => Self::Local,
            _ => Self::Remote,
        }
    }
}

/// Frame size, quality and send pacing for one reachability class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamProfile {
    pub target_width: u32,
    /// Compression quality in `0..=1`.
    pub quality: f64,
    pub min_send_interval: Duration,
}

impl StreamProfile {
    pub fn for_reachability(reachability: Reachability) -> Self {
        match reachability {
            Reachability::Local => Self {
                target_width: LOCAL_TARGET_WIDTH,
                quality: LOCAL_QUALITY,
                min_send_interval: LOCAL_MIN_SEND_INTERVAL,
            },
            Reachability::Remote => Self {
                target_width: REMOTE_TARGET_WIDTH,
                quality: REMOTE_QUALITY,
                min_send_interval: REMOTE_MIN_SEND_INTERVAL,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerConfig {
    pub association_iou: f64,
    pub min_detection_score: f64,
    pub track_ttl: Duration,
    pub smoothing_rate_per_sec: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            association_iou: ASSOCIATION_IOU,
            min_detection_score: MIN_DETECTION_SCORE,
            track_ttl: TRACK_TTL,
            smoothing_rate_per_sec: SMOOTHING_RATE_PER_SEC,
        }
    }
}

/// Consecutive-frame thresholds for flipping the presence signal.
/// `1/1` passes the raw signal straight through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebounceConfig {
    pub on_frames: u32,
    pub off_frames: u32,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            on_frames: 1,
            off_frames: 1,
        }
    }
}

/// Optional overrides as stored on disk. Missing fields fall back to the
/// reachability profile or the tracker defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSettings {
    pub target_width: Option<u32>,
    pub quality: Option<f64>,
    pub min_send_interval_ms: Option<u64>,
    #[serde(rename = "associationIoU")]
    pub association_iou: Option<f64>,
    pub min_detection_score: Option<f64>,
    pub track_ttl_ms: Option<u64>,
    pub smoothing_rate_per_sec: Option<f64>,
    pub presence_on_frames: Option<u32>,
    pub presence_off_frames: Option<u32>,
    pub tick_interval_ms: Option<u64>,
}

/// Fully resolved configuration for one session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedSettings {
    pub profile: StreamProfile,
    pub tracker: TrackerConfig,
    pub debounce: DebounceConfig,
    pub tick_interval: Duration,
}

impl PipelineSettings {
    /// Reads settings from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `<config_dir>/handstream/settings.json`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("handstream").join("settings.json"))
    }

    pub fn resolve(&self, reachability: Reachability) -> Result<ResolvedSettings, SettingsError> {
        let base = StreamProfile::for_reachability(reachability);
        let defaults = TrackerConfig::default();

        let profile = StreamProfile {
            target_width: self.target_width.unwrap_or(base.target_width),
            quality: self.quality.unwrap_or(base.quality),
            min_send_interval: self
                .min_send_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(base.min_send_interval),
        };
        let tracker = TrackerConfig {
            association_iou: self.association_iou.unwrap_or(defaults.association_iou),
            min_detection_score: self
                .min_detection_score
                .unwrap_or(defaults.min_detection_score),
            track_ttl: self
                .track_ttl_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.track_ttl),
            smoothing_rate_per_sec: self
                .smoothing_rate_per_sec
                .unwrap_or(defaults.smoothing_rate_per_sec),
        };
        let debounce = DebounceConfig {
            on_frames: self.presence_on_frames.unwrap_or(1),
            off_frames: self.presence_off_frames.unwrap_or(1),
        };
        let tick_interval = self
            .tick_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TICK_INTERVAL);

        check_unit("quality", profile.quality)?;
        check_unit("associationIoU", tracker.association_iou)?;
        check_unit("minDetectionScore", tracker.min_detection_score)?;
        if profile.target_width == 0 {
            return Err(SettingsError::OutOfRange {
                name: "targetWidth",
                expected: "positive",
                value: 0.0,
            });
        }
        let rate = tracker.smoothing_rate_per_sec;
        if rate.is_nan() || rate <= 0.0 {
            return Err(SettingsError::OutOfRange {
                name: "smoothingRatePerSec",
                expected: "positive",
                value: tracker.smoothing_rate_per_sec,
            });
        }
        if debounce.on_frames == 0 || debounce.off_frames == 0 {
            return Err(SettingsError::OutOfRange {
                name: "presenceOnFrames/presenceOffFrames",
                expected: "at least 1",
                value: 0.0,
            });
        }

        Ok(ResolvedSettings {
            profile,
            tracker,
            debounce,
            tick_interval,
        })
    }
}

fn check_unit(name: &'static str, value: f64) -> Result<(), SettingsError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange {
            name,
            expected: "between 0.0 and 1.0",
            value,
        })
    }
}

/// Turns an HTTP(S) API base into the detector's WebSocket endpoint.
pub fn detector_url(api_base: &str) -> String {
    let base = api_base.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https") {
        format!("wss{rest}")
    } else if let Some(rest) = base.strip_prefix("http") {
        format!("ws{rest}")
    } else {
        base.to_string()
    };
    format!("{ws_base}{DETECT_PATH}")
}

/// The HTTP endpoint for one-shot image detection under the same API base.
pub fn image_detect_url(api_base: &str) -> String {
    let base = api_base.trim_end_matches('/');
    let http_base = if let Some(rest) = base.strip_prefix("wss") {
        format!("https{rest}")
    } else if let Some(rest) = base.strip_prefix("ws") {
        format!("http{rest}")
    } else {
        base.to_string()
    };
    format!("{http_base}{IMAGE_DETECT_PATH}")
}
