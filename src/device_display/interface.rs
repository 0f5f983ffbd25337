use crate::realtime::indicator::Indicator;
use image::DynamicImage;
use std::error::Error;

/// Where the realtime loop shows each frame and its detection. The loop
/// hands over a structured result; all terminal or window state belongs to
/// the implementation.
pub trait DeviceDisplay: Send {
    fn open(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn render(
        &mut self,
        frame: &DynamicImage,
        indicator: &Indicator,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn close(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;
}
