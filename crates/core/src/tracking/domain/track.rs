use std::time::{Duration, Instant};

use crate::shared::region::Region;
use crate::tracking::domain::detection::Detection;

/// A persistent identity for one tracked object.
///
/// `target` is the last box confirmed by a detection; `display` is what
/// is drawn and only ever moves toward `target`.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub id: u32,
    pub class_id: i32,
    pub class_name: Option<String>,
    pub score: f64,
    pub target: Region,
    pub display: Region,
    pub last_seen: Instant,
    /// Set only while an association pass is running.
    pub matched: bool,
}

impl Track {
    /// Born from a detection: display starts on the target, no lag.
    pub fn spawn(id: u32, detection: &Detection, now: Instant) -> Self {
        Self {
            id,
            class_id: detection.class_id,
            class_name: detection.class_name.clone(),
            score: detection.score,
            target: detection.bbox,
            display: detection.bbox,
            last_seen: now,
            matched: true,
        }
    }

    pub fn unseen_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_seen)
    }

    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        self.unseen_for(now) > ttl
    }
}

/// Hands out track ids: strictly increasing, starting at 1.
#[derive(Debug)]
pub struct TrackIdGenerator {
    next: u32,
}

impl TrackIdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for TrackIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut ids = TrackIdGenerator::new();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
    }

    #[test]
    fn test_spawn_display_equals_target() {
        let now = Instant::now();
        let det = Detection::new(4, 0.8, Region::new(1.0, 2.0, 3.0, 4.0)).with_class_name("A");
        let track = Track::spawn(9, &det, now);
        assert_eq!(track.id, 9);
        assert_eq!(track.display, track.target);
        assert_eq!(track.class_name.as_deref(), Some("A"));
        assert!(track.matched);
    }

    #[test]
    fn test_expiry_is_strictly_after_ttl() {
        let now = Instant::now();
        let det = Detection::new(0, 0.9, Region::new(0.0, 0.0, 1.0, 1.0));
        let track = Track::spawn(1, &det, now);
        let ttl = Duration::from_millis(1000);
        assert!(!track.is_expired(now + ttl, ttl));
        assert!(track.is_expired(now + ttl + Duration::from_millis(1), ttl));
    }
}
