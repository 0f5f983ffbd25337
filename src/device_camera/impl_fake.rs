use crate::device_camera::interface::DeviceCamera;
use crate::library::logger::interface::Logger;
use image::DynamicImage;
use std::collections::VecDeque;
use std::error::Error;
use std::sync::Arc;

pub enum FakeFrame {
    Image(DynamicImage),
    Unreadable(String),
}

/// Plays back a scripted list of frames, then reports end of stream.
/// Every call is written to the logger so tests can read the call order.
pub struct DeviceCameraFake {
    logger: Arc<dyn Logger + Send + Sync>,
    script: VecDeque<FakeFrame>,
    unavailable_indices: Vec<i32>,
    is_open: bool,
}

impl DeviceCameraFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>, frames: Vec<DynamicImage>) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("fake"),
            script: frames.into_iter().map(FakeFrame::Image).collect(),
            unavailable_indices: vec![],
            is_open: false,
        }
    }

    pub fn with_unavailable_index(mut self, device_index: i32) -> Self {
        self.unavailable_indices.push(device_index);
        self
    }

    pub fn with_unreadable_frame(mut self, reason: &str) -> Self {
        self.script.push_back(FakeFrame::Unreadable(reason.to_string()));
        self
    }
}

impl DeviceCamera for DeviceCameraFake {
    fn open(&mut self, device_index: i32) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.unavailable_indices.contains(&device_index) {
            self.logger
                .info(&format!("DeviceCameraFake::open({}) failed", device_index))?;
            return Err(format!("no device at index {}", device_index).into());
        }
        self.is_open = true;
        self.logger
            .info(&format!("DeviceCameraFake::open({})", device_index))?;
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<Option<DynamicImage>, Box<dyn Error + Send + Sync>> {
        if !self.is_open {
            return Err("camera is not open".into());
        }
        self.logger.info("DeviceCameraFake::capture_frame()")?;
        match self.script.pop_front() {
            Some(FakeFrame::Image(image)) => Ok(Some(image)),
            Some(FakeFrame::Unreadable(reason)) => Err(reason.into()),
            None => Ok(None),
        }
    }

    fn release(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.is_open = false;
        self.logger.info("DeviceCameraFake::release()")?;
        Ok(())
    }
}
