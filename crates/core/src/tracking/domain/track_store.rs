use std::time::Instant;

use crate::shared::settings::TrackerConfig;
use crate::tracking::domain::associator::associate;
use crate::tracking::domain::detection::Detection;
use crate::tracking::domain::track::{Track, TrackIdGenerator};

/// Sole owner of the live track set and its id sequence.
///
/// Detection batches mutate it through [`TrackStore::ingest`]; the render
/// side only reads tracks and advances their display geometry.
#[derive(Debug)]
pub struct TrackStore {
    tracks: Vec<Track>,
    ids: TrackIdGenerator,
    config: TrackerConfig,
}

impl TrackStore {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracks: Vec::new(),
            ids: TrackIdGenerator::new(),
            config,
        }
    }

    pub fn ingest(&mut self, detections: &[Detection], now: Instant) {
        let tracks = std::mem::take(&mut self.tracks);
        self.tracks = associate(tracks, detections, &mut self.ids, now, &self.config);
    }

    /// Drops tracks past their TTL without running an association pass.
    pub fn prune_expired(&mut self, now: Instant) {
        let ttl = self.config.track_ttl;
        self.tracks.retain(|t| !t.is_expired(now, ttl));
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn tracks_mut(&mut self) -> &mut [Track] {
        &mut self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Forgets every track and restarts the id sequence for a new session.
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.ids = TrackIdGenerator::new();
    }
}
