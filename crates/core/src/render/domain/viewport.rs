use serde::{Deserialize, Serialize};

use crate::shared::region::Region;

/// How the source frame is fitted into the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Fill the viewport, cropping the overflowing axis.
    #[default]
    Cover,
    /// Show the whole frame, letterboxing the spare axis.
    Contain,
}

/// Display-space placement of a source frame: uniform scale, centred, and
/// optionally mirrored horizontally like a selfie camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub fit: Fit,
    pub mirrored: bool,
}

impl Viewport {
    pub fn new(width: f64, height: f64, fit: Fit, mirrored: bool) -> Self {
        Self {
            width,
            height,
            fit,
            mirrored,
        }
    }

    /// A viewport the same size as the frame, so projection is the identity
    /// apart from optional mirroring.
    pub fn native(frame_width: u32, frame_height: u32, mirrored: bool) -> Self {
        Self::new(
            f64::from(frame_width),
            f64::from(frame_height),
            Fit::Contain,
            mirrored,
        )
    }

    pub fn scale(&self, frame_width: u32, frame_height: u32) -> f64 {
        let sx = self.width / f64::from(frame_width);
        let sy = self.height / f64::from(frame_height);
        match self.fit {
            Fit::Cover => sx.max(sy),
            Fit::Contain => sx.min(sy),
        }
    }

    fn offset(&self, frame_width: u32, frame_height: u32, scale: f64) -> (f64, f64) {
        (
            (self.width - f64::from(frame_width) * scale) / 2.0,
            (self.height - f64::from(frame_height) * scale) / 2.0,
        )
    }

    /// Maps a source-pixel box into viewport coordinates.
    pub fn project(&self, frame_width: u32, frame_height: u32, region: &Region) -> Region {
        let scale = self.scale(frame_width, frame_height);
        let (off_x, off_y) = self.offset(frame_width, frame_height, scale);
        let width = region.width * scale;
        let mut x = off_x + region.x * scale;
        if self.mirrored {
            x = self.width - x - width;
        }
        Region::new(x, off_y + region.y * scale, width, region.height * scale)
    }

    /// Maps a point normalized to `[0, 1]` of the frame into viewport
    /// coordinates.
    pub fn project_normalized(
        &self,
        frame_width: u32,
        frame_height: u32,
        x: f64,
        y: f64,
    ) -> (f64, f64) {
        let scale = self.scale(frame_width, frame_height);
        let (off_x, off_y) = self.offset(frame_width, frame_height, scale);
        let mut px = off_x + x * f64::from(frame_width) * scale;
        if self.mirrored {
            px = self.width - px;
        }
        (px, off_y + y * f64::from(frame_height) * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_native_viewport_is_identity() {
        let vp = Viewport::native(640, 480, false);
        let r = Region::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(vp.project(640, 480, &r), r);
    }

    #[rstest]
    #[case(Fit::Cover, 2.0)]
    #[case(Fit::Contain, 1.5)]
    fn test_scale_by_fit(#[case] fit: Fit, #[case] expected: f64) {
        // 640x480 into 1280x720: width ratio 2.0, height ratio 1.5
        let vp = Viewport::new(1280.0, 720.0, fit, false);
        assert_relative_eq!(vp.scale(640, 480), expected);
    }

    #[test]
    fn test_cover_centres_overflow() {
        let vp = Viewport::new(1280.0, 720.0, Fit::Cover, false);
        // drawn 1280x960, so 120 px overflow above and below
        let r = vp.project(640, 480, &Region::new(0.0, 0.0, 100.0, 100.0));
        assert_relative_eq!(r.x, 0.0);
        assert_relative_eq!(r.y, -120.0);
        assert_relative_eq!(r.width, 200.0);
        assert_relative_eq!(r.height, 200.0);
    }

    #[test]
    fn test_contain_letterboxes() {
        let vp = Viewport::new(1280.0, 720.0, Fit::Contain, false);
        // drawn 960x720, so 160 px bars left and right
        let r = vp.project(640, 480, &Region::new(0.0, 0.0, 100.0, 100.0));
        assert_relative_eq!(r.x, 160.0);
        assert_relative_eq!(r.y, 0.0);
        assert_relative_eq!(r.width, 150.0);
    }

    #[test]
    fn test_mirroring_flips_box_horizontally() {
        let vp = Viewport::native(640, 480, true);
        let r = vp.project(640, 480, &Region::new(10.0, 20.0, 100.0, 50.0));
        assert_relative_eq!(r.x, 530.0);
        assert_relative_eq!(r.y, 20.0);
        assert_relative_eq!(r.width, 100.0);
    }

    #[test]
    fn test_normalized_points() {
        let vp = Viewport::native(200, 100, false);
        assert_eq!(vp.project_normalized(200, 100, 0.5, 0.5), (100.0, 50.0));

        let mirrored = Viewport::native(200, 100, true);
        assert_eq!(mirrored.project_normalized(200, 100, 0.25, 0.0), (150.0, 0.0));
    }
}
