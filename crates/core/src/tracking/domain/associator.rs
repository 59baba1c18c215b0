//! Greedy, class-partitioned association of detections to tracks.
//!
//! Detections are visited in input order; each claims the unmatched
//! same-class track whose target box overlaps it most, provided the IoU
//! clears the association threshold. Anything left over becomes a new
//! track. No global assignment is attempted, so the first detection in
//! the batch wins a contested track.
use std::time::Instant;

use crate::shared::constants::SCORE_RETENTION;
use crate::shared::settings::TrackerConfig;
use crate::tracking::domain::detection::Detection;
use crate::tracking::domain::track::{Track, TrackIdGenerator};

pub fn associate(
    mut tracks: Vec<Track>,
    detections: &[Detection],
    ids: &mut TrackIdGenerator,
    now: Instant,
    config: &TrackerConfig,
) -> Vec<Track> {
    reset_match_flags(&mut tracks);

    for det in detections
        .iter()
        .filter(|d| d.score >= config.min_detection_score)
    {
        match best_candidate(&tracks, det) {
            Some((idx, iou)) if iou >= config.association_iou => {
                apply_match(&mut tracks[idx], det, now);
            }
            _ => tracks.push(Track::spawn(ids.next_id(), det, now)),
        }
    }

    tracks.retain(|t| !t.is_expired(now, config.track_ttl));
    tracks
}

fn reset_match_flags(tracks: &mut [Track]) {
    for track in tracks {
        track.matched = false;
    }
}

/// Highest-IoU unmatched track of the detection's class. Ties keep the
/// earlier track.
fn best_candidate(tracks: &[Track], det: &Detection) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, track) in tracks.iter().enumerate() {
        if track.matched || track.class_id != det.class_id {
            continue;
        }
        let iou = track.target.iou(&det.bbox);
        if iou > best.map_or(0.0, |(_, b)| b) {
            best = Some((idx, iou));
        }
    }
    best
}

fn apply_match(track: &mut Track, det: &Detection, now: Instant) {
    track.target = det.bbox;
    track.score = SCORE_RETENTION * track.score + (1.0 - SCORE_RETENTION) * det.score;
    track.last_seen = now;
    track.matched = true;
}
