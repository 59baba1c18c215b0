//! JSON messages exchanged with the detector service.
//!
//! Requests carry a base64 data URL of the encoded crop. Replies are either
//! a bare array of boxes in the crop's pixel space or an `{"error": ...}`
//! object.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::capture::domain::frame_encoder::{CropTransform, EncodedFrame};
use crate::tracking::domain::detection::Detection;

const UNKNOWN_CLASS: f64 = -1.0;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("reply is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected reply shape: {0}")]
    UnexpectedShape(String),
}

#[derive(Debug, Serialize)]
pub struct DetectRequest {
    pub image: String,
}

impl DetectRequest {
    pub fn from_encoded(frame: &EncodedFrame) -> Self {
        Self {
            image: format!(
                "data:{};base64,{}",
                frame.mime_type,
                STANDARD.encode(&frame.payload)
            ),
        }
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// One box as reported by the detector, in encoded-image pixels.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDetection {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub class_id: Option<f64>,
    #[serde(default)]
    pub class_name: Option<String>,
}

impl WireDetection {
    pub fn class_id(&self) -> i32 {
        self.class_id.unwrap_or(UNKNOWN_CLASS).round() as i32
    }

    pub fn score(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }

    /// Converts to a source-space detection through the crop it was sent with.
    pub fn into_detection(self, transform: &CropTransform) -> Detection {
        let bbox = transform.remap_corners(self.x1, self.y1, self.x2, self.y2);
        let detection = Detection::new(self.class_id(), self.score(), bbox);
        match self.class_name {
            Some(name) => detection.with_class_name(name),
            None => detection,
        }
    }
}

/// Maps a reply batch back to source pixels, dropping inverted boxes so no
/// malformed geometry reaches the tracker.
pub fn remap_detections(list: Vec<WireDetection>, transform: &CropTransform) -> Vec<Detection> {
    list.into_iter()
        .map(|d| d.into_detection(transform))
        .filter(|d| {
            let keep = d.bbox.is_well_formed();
            if !keep {
                log::debug!("Dropping inverted detector box {:?}", d.bbox);
            }
            keep
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub enum DetectorReply {
    Detections(Vec<WireDetection>),
    Error(String),
}

pub fn parse_reply(text: &str) -> Result<DetectorReply, ProtocolError> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Array(_) => Ok(DetectorReply::Detections(serde_json::from_value(value)?)),
        Value::Object(ref map) => match map.get("error") {
            Some(Value::String(message)) => Ok(DetectorReply::Error(message.clone())),
            Some(other) if !other.is_null() => Ok(DetectorReply::Error(other.to_string())),
            _ => Err(ProtocolError::UnexpectedShape(truncate(text))),
        },
        _ => Err(ProtocolError::UnexpectedShape(truncate(text))),
    }
}

fn truncate(text: &str) -> String {
    const LIMIT: usize = 80;
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
