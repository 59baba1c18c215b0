use std::time::Duration;

use crate::shared::constants::SMOOTHING_RATE_PER_SEC;
use crate::tracking::domain::track::Track;

/// Domain interface for advancing displayed track geometry once per
/// render tick.
pub trait DisplaySmoother: Send {
    fn advance(&self, tracks: &mut [Track], dt: Duration);
}

/// Critically-damped exponential approach toward each track's target.
///
/// Formula: `display += (target - display) * (1 - e^(-rate * dt))`
/// Default rate: 5 per second.
///
/// The blend factor stays in `[0, 1)`, so a held target is approached
/// monotonically without overshoot, and a jump in the target only raises
/// the speed of approach.
#[derive(Clone, Copy, Debug)]
pub struct ExponentialSmoother {
    rate_per_sec: f64,
}

impl ExponentialSmoother {
    pub fn new(rate_per_sec: f64) -> Self {
        Self { rate_per_sec }
    }

    pub fn blend_factor(&self, dt: Duration) -> f64 {
        1.0 - (-self.rate_per_sec * dt.as_secs_f64()).exp()
    }
}

impl Default for ExponentialSmoother {
    fn default() -> Self {
        Self::new(SMOOTHING_RATE_PER_SEC)
    }
}

impl DisplaySmoother for ExponentialSmoother {
    fn advance(&self, tracks: &mut [Track], dt: Duration) {
        let k = self.blend_factor(dt);
        for track in tracks {
            let target = track.target;
            track.display.approach(&target, k);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use approx::assert_relative_eq;

    use crate::shared::region::Region;
    use crate::tracking::domain::detection::Detection;

    const TICK: Duration = Duration::from_millis(16);

    fn track_at(display: Region, target: Region) -> Track {
        let mut t = Track::spawn(1, &Detection::new(0, 0.9, display), Instant::now());
        t.target = target;
        t
    }

    #[test]
    fn test_default_rate() {
        let s = ExponentialSmoother::default();
        assert_relative_eq!(s.blend_factor(Duration::from_secs(1)), 1.0 - (-5.0f64).exp());
    }

    #[test]
    fn test_zero_dt_does_not_move() {
        let mut tracks = [track_at(
            Region::new(0.0, 0.0, 10.0, 10.0),
            Region::new(100.0, 100.0, 50.0, 50.0),
        )];
        ExponentialSmoother::default().advance(&mut tracks, Duration::ZERO);
        assert_eq!(tracks[0].display, Region::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_single_step_matches_formula() {
        let mut tracks = [track_at(
            Region::new(0.0, 0.0, 10.0, 10.0),
            Region::new(100.0, 50.0, 30.0, 20.0),
        )];
        ExponentialSmoother::new(5.0).advance(&mut tracks, TICK);

        let k = 1.0 - (-5.0 * 0.016f64).exp();
        assert_relative_eq!(tracks[0].display.x, 100.0 * k);
        assert_relative_eq!(tracks[0].display.y, 50.0 * k);
        assert_relative_eq!(tracks[0].display.width, 10.0 + 20.0 * k);
        assert_relative_eq!(tracks[0].display.height, 10.0 + 10.0 * k);
    }

    #[test]
    fn test_convergence_without_overshoot() {
        let target = Region::new(500.0, 300.0, 100.0, 80.0);
        let mut tracks = [track_at(Region::new(0.0, 0.0, 10.0, 200.0), target)];
        let smoother = ExponentialSmoother::default();

        let mut prev = tracks[0].display;
        for _ in 0..600 {
            smoother.advance(&mut tracks, TICK);
            let d = tracks[0].display;
            // Increasing components never pass the target, decreasing ones
            // never drop below it.
            assert!(d.x >= prev.x && d.x <= target.x);
            assert!(d.y >= prev.y && d.y <= target.y);
            assert!(d.width >= prev.width && d.width <= target.width);
            assert!(d.height <= prev.height && d.height >= target.height);
            prev = d;
        }

        let d = tracks[0].display;
        assert_relative_eq!(d.x, target.x, epsilon = 0.01);
        assert_relative_eq!(d.y, target.y, epsilon = 0.01);
        assert_relative_eq!(d.width, target.width, epsilon = 0.01);
        assert_relative_eq!(d.height, target.height, epsilon = 0.01);
    }

    #[test]
    fn test_target_jump_moves_display_continuously() {
        let mut tracks = [track_at(
            Region::new(0.0, 0.0, 10.0, 10.0),
            Region::new(0.0, 0.0, 10.0, 10.0),
        )];
        tracks[0].target = Region::new(1000.0, 0.0, 10.0, 10.0);
        ExponentialSmoother::default().advance(&mut tracks, TICK);

        let step = tracks[0].display.x;
        assert!(step > 0.0);
        assert!(step < 1000.0 * 0.1);
    }

    #[test]
    fn test_newborn_track_has_no_lag() {
        let region = Region::new(3.0, 4.0, 5.0, 6.0);
        let mut tracks = [Track::spawn(
            1,
            &Detection::new(0, 0.9, region),
            Instant::now(),
        )];
        ExponentialSmoother::default().advance(&mut tracks, TICK);
        assert_eq!(tracks[0].display, region);
    }
}
