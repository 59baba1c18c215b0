use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::region::Region;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("target width must be positive")]
    ZeroTargetWidth,
    #[error("region {width}x{height} at ({x}, {y}) covers no pixels of the frame")]
    EmptyRegion {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    #[error("cropped buffer does not match its dimensions")]
    BufferMismatch,
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Mapping from the encoded payload's pixel space back to source pixels.
///
/// `source = origin + detector / scale`, applied per axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub scale: f64,
}

impl CropTransform {
    pub fn to_source(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.origin_x + x / self.scale,
            self.origin_y + y / self.scale,
        )
    }

    /// Maps a corner-form box from detector space to a source-space region.
    pub fn remap_corners(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Region {
        let (sx1, sy1) = self.to_source(x1, y1);
        let (sx2, sy2) = self.to_source(x2, y2);
        Region::from_corners(sx1, sy1, sx2, sy2)
    }
}

/// A compressed crop ready for transmission, plus the transform the reply
/// must be mapped back through.
#[derive(Clone, Debug)]
pub struct EncodedFrame {
    pub payload: Vec<u8>,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub transform: CropTransform,
}

/// Whole-pixel rectangle inside a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Snaps `region` outward to whole pixels and clips it to the frame.
/// Returns `None` when nothing of the frame remains.
pub fn snap_to_pixels(region: &Region, frame_width: u32, frame_height: u32) -> Option<PixelRect> {
    let fw = f64::from(frame_width);
    let fh = f64::from(frame_height);
    let x0 = region.x.floor().clamp(0.0, fw);
    let y0 = region.y.floor().clamp(0.0, fh);
    let x1 = region.right().ceil().clamp(0.0, fw);
    let y1 = region.bottom().ceil().clamp(0.0, fh);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(PixelRect {
        x: x0 as u32,
        y: y0 as u32,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    })
}

/// Domain interface for turning a frame region into a transmittable payload.
///
/// The output is `target_width` wide and keeps the region's aspect ratio.
pub trait FrameEncoder: Send {
    fn encode(
        &self,
        frame: &Frame,
        region: &Region,
        target_width: u32,
    ) -> Result<EncodedFrame, EncodeError>;
}
