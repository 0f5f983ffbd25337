/// Output of the preprocessing pipeline: a flat row-major pixel buffer.
///
/// With a single channel the channels-last and channels-first layouts are the
/// same buffer, `data[y * width + x]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedTensor {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<f32>,
}

impl PreprocessedTensor {
    #[allow(dead_code)]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.channels)
    }

    #[allow(dead_code)]
    pub fn at(&self, x: usize, y: usize, channel: usize) -> f32 {
        self.data[(y * self.width + x) * self.channels + channel]
    }
}
