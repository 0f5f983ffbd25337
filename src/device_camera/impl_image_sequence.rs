use crate::device_camera::interface::DeviceCamera;
use crate::library::logger::interface::Logger;
use image::DynamicImage;
use std::collections::VecDeque;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

/// Replays recorded frames from disk. Device `i` is the directory
/// `<frames_directory>/<i>/`; its image files are played in name order and
/// the stream ends after the last one.
pub struct DeviceCameraImageSequence {
    frames_directory: PathBuf,
    extensions: Vec<String>,
    logger: Arc<dyn Logger + Send + Sync>,
    pending: Option<VecDeque<PathBuf>>,
}

impl DeviceCameraImageSequence {
    pub fn new(
        frames_directory: PathBuf,
        extensions: Vec<String>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            frames_directory,
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
            logger: logger.with_namespace("camera").with_namespace("image_sequence"),
            pending: None,
        }
    }

    fn is_frame(&self, path: &std::path::Path) -> bool {
        path.is_file()
            && path
                .extension()
                .map(|e| self.extensions.contains(&e.to_string_lossy().to_lowercase()))
                .unwrap_or(false)
    }
}

impl DeviceCamera for DeviceCameraImageSequence {
    fn open(&mut self, device_index: i32) -> Result<(), Box<dyn Error + Send + Sync>> {
        if device_index < 0 {
            return Err(format!("device index {} is negative", device_index).into());
        }

        let directory = self.frames_directory.join(device_index.to_string());
        if !directory.is_dir() {
            return Err(format!("{:?} is not a directory", directory).into());
        }

        let mut files = std::fs::read_dir(&directory)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        files.retain(|path| self.is_frame(path));
        files.sort();

        self.logger.info(&format!(
            "Opened {:?} with {} frames",
            directory,
            files.len()
        ))?;
        self.pending = Some(files.into());
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<Option<DynamicImage>, Box<dyn Error + Send + Sync>> {
        let pending = self.pending.as_mut().ok_or("camera is not open")?;
        match pending.pop_front() {
            Some(path) => {
                let image = image::open(&path)
                    .map_err(|e| format!("could not decode {:?}: {}", path, e))?;
                Ok(Some(image))
            }
            None => Ok(None),
        }
    }

    fn release(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.pending.take().is_some() {
            self.logger.info("Released")?;
        }
        Ok(())
    }
}
