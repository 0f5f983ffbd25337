use crate::device_camera::interface::DeviceCamera;
use crate::library::logger::interface::Logger;
use image::{DynamicImage, RgbImage};
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::{imgproc, videoio};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

/// Live capture through OpenCV's `VideoCapture`.
pub struct DeviceCameraOpenCv {
    fps: f64,
    logger: Arc<dyn Logger + Send + Sync>,
    capture: Option<videoio::VideoCapture>,
}

impl DeviceCameraOpenCv {
    pub fn new(frame_delay: Duration, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        let fps = if frame_delay.is_zero() {
            30.0
        } else {
            1.0 / frame_delay.as_secs_f64()
        };
        Self {
            fps,
            logger: logger.with_namespace("camera").with_namespace("opencv"),
            capture: None,
        }
    }
}

impl DeviceCamera for DeviceCameraOpenCv {
    fn open(&mut self, device_index: i32) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut capture = videoio::VideoCapture::new(device_index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(format!("VideoCapture({}) did not open", device_index).into());
        }
        capture.set(videoio::CAP_PROP_FPS, self.fps)?;

        self.logger.info(&format!(
            "Opened capture device {} at {:.1} fps",
            device_index, self.fps
        ))?;
        self.capture = Some(capture);
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<Option<DynamicImage>, Box<dyn Error + Send + Sync>> {
        let capture = self.capture.as_mut().ok_or("camera is not open")?;

        let mut bgr = Mat::default();
        if !capture.read(&mut bgr)? || bgr.empty() {
            return Ok(None);
        }

        let mut rgb = Mat::default();
        imgproc::cvt_color(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        let pixels = rgb.data_bytes()?.to_vec();
        let image = RgbImage::from_raw(width, height, pixels)
            .ok_or_else(|| format!("frame buffer does not match {}x{} RGB", width, height))?;

        Ok(Some(DynamicImage::ImageRgb8(image)))
    }

    fn release(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        if let Some(mut capture) = self.capture.take() {
            capture.release()?;
            self.logger.info("Released capture device")?;
        }
        Ok(())
    }
}
