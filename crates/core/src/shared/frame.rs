use ndarray::{s, ArrayView3};

const RGB_CHANNELS: usize = 3;

/// A single camera frame: contiguous RGB bytes in row-major order.
///
/// `index` is the position of the frame in its source, used to line up
/// auxiliary per-frame signals such as hand landmarks.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * RGB_CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the pixels inside `[x, x + width) × [y, y + height)` into a
    /// new frame. The rectangle is clipped to the frame bounds.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Frame {
        let x0 = x.min(self.width) as usize;
        let y0 = y.min(self.height) as usize;
        let x1 = (x.saturating_add(width)).min(self.width) as usize;
        let y1 = (y.saturating_add(height)).min(self.height) as usize;

        let view = self.as_ndarray();
        let cropped = view.slice(s![y0..y1, x0..x1, ..]);
        let data: Vec<u8> = cropped.iter().copied().collect();
        Frame::new(data, (x1 - x0) as u32, (y1 - y0) as u32, self.index)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, RGB_CHANNELS)
    }
}
