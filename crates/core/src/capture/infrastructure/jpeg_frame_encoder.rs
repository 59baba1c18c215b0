use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::capture::domain::frame_encoder::{
    snap_to_pixels, CropTransform, EncodeError, EncodedFrame, FrameEncoder,
};
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Crops, downsamples and JPEG-compresses a frame region using the `image`
/// crate.
///
/// The region is snapped outward to whole pixels first; the transform
/// records the snapped origin so replies map back onto the pixels that were
/// actually sent.
pub struct JpegFrameEncoder {
    quality: u8,
}

impl JpegFrameEncoder {
    /// `quality` is in `0..=1`, mapped onto the JPEG 1..=100 scale.
    pub fn new(quality: f64) -> Self {
        let q = (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0);
        Self { quality: q as u8 }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl FrameEncoder for JpegFrameEncoder {
    fn encode(
        &self,
        frame: &Frame,
        region: &Region,
        target_width: u32,
    ) -> Result<EncodedFrame, EncodeError> {
        if target_width == 0 {
            return Err(EncodeError::ZeroTargetWidth);
        }
        let rect = snap_to_pixels(region, frame.width(), frame.height()).ok_or(
            EncodeError::EmptyRegion {
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
            },
        )?;

        let cropped = frame.crop(rect.x, rect.y, rect.width, rect.height);
        let img = image::RgbImage::from_raw(rect.width, rect.height, cropped.into_data())
            .ok_or(EncodeError::BufferMismatch)?;

        let scale = f64::from(target_width) / f64::from(rect.width);
        let target_height = ((f64::from(rect.height) * scale).round() as u32).max(1);
        let resized = image::imageops::resize(&img, target_width, target_height, FilterType::Triangle);

        let mut payload = Vec::new();
        JpegEncoder::new_with_quality(&mut payload, self.quality).encode_image(&resized)?;

        Ok(EncodedFrame {
            payload,
            mime_type: "image/jpeg",
            width: target_width,
            height: target_height,
            transform: CropTransform {
                origin_x: f64::from(rect.x),
                origin_y: f64::from(rect.y),
                scale,
            },
        })
    }
}
