use crate::device_display::interface::DeviceDisplay;
use crate::library::logger::interface::Logger;
use crate::realtime::indicator::Indicator;
use image::DynamicImage;
use std::error::Error;
use std::sync::Arc;

pub struct DeviceDisplayFake {
    logger: Arc<dyn Logger + Send + Sync>,
    fail_open: bool,
}

impl DeviceDisplayFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("display").with_namespace("fake"),
            fail_open: false,
        }
    }

    pub fn failing_to_open(mut self) -> Self {
        self.fail_open = true;
        self
    }
}

impl DeviceDisplay for DeviceDisplayFake {
    fn open(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.fail_open {
            self.logger.info("DeviceDisplayFake::open() failed")?;
            return Err("display is not available".into());
        }
        self.logger.info("DeviceDisplayFake::open()")?;
        Ok(())
    }

    fn render(
        &mut self,
        frame: &DynamicImage,
        indicator: &Indicator,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.logger.info(&format!(
            "DeviceDisplayFake::render({}x{}, {})",
            frame.width(),
            frame.height(),
            indicator.text
        ))?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.logger.info("DeviceDisplayFake::close()")?;
        Ok(())
    }
}
