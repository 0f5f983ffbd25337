use image::DynamicImage;
use std::error::Error;

/// A video source the realtime loop owns for the length of one session.
pub trait DeviceCamera: Send {
    /// Opens the source selected by `device_index`; 0 is the default device.
    fn open(&mut self, device_index: i32) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Pulls the next frame. `Ok(None)` is an empty frame and ends the stream.
    fn capture_frame(&mut self) -> Result<Option<DynamicImage>, Box<dyn Error + Send + Sync>>;

    fn release(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;
}
