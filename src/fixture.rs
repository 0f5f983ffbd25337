use crate::config::Config;
use crate::feature_extractor::impl_fake::ScorerFake;
use crate::library::logger::impl_fake::LoggerFake;
use image::{DynamicImage, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const LABELS: [&str; 3] = ["standing", "falling", "empty"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pose {
    Standing,
    Falling,
    Empty,
}

impl Pose {
    pub fn label(&self) -> &'static str {
        match self {
            Pose::Standing => "standing",
            Pose::Falling => "falling",
            Pose::Empty => "empty",
        }
    }

    pub fn all() -> [Pose; 3] {
        [Pose::Standing, Pose::Falling, Pose::Empty]
    }
}

/// 80x60 noisy dark frame; standing draws a bright vertical bar, falling a
/// bright horizontal one, empty nothing.
pub fn synthetic_frame(pose: Pose, seed: u64) -> DynamicImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut image = RgbImage::new(80, 60);

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let on_bar = match pose {
            Pose::Standing => (34..46).contains(&x),
            Pose::Falling => (24..36).contains(&y) && (8..72).contains(&x),
            Pose::Empty => false,
        };
        let value: u8 = if on_bar {
            rng.random_range(210..=255)
        } else {
            rng.random_range(0..=40)
        };
        *pixel = Rgb([value, value, value]);
    }

    DynamicImage::ImageRgb8(image)
}

/// Writes `<root>/<label>/<n>.jpg` for every pose.
pub fn write_dataset(root: &Path, per_class: usize) -> PathBuf {
    for (class, pose) in Pose::all().iter().enumerate() {
        let dir = root.join(pose.label());
        std::fs::create_dir_all(&dir).unwrap();
        for i in 0..per_class {
            let seed = (class * 1000 + i) as u64;
            synthetic_frame(*pose, seed)
                .save(dir.join(format!("{:02}.jpg", i)))
                .unwrap();
        }
    }
    root.to_path_buf()
}

#[allow(dead_code)]
pub struct Fixture {
    pub dir: TempDir,
    pub config: Config,
    pub logger: LoggerFake,
    pub scorer: Arc<ScorerFake>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            model_path: dir.path().join("models").join("model.tar.gz"),
            frames_directory: dir.path().join("frames"),
            ..Config::default()
        };

        Self {
            dir,
            config,
            logger: LoggerFake::new(),
            scorer: Arc::new(ScorerFake::new(4)),
        }
    }

    pub fn dataset_path(&self, per_class: usize) -> PathBuf {
        write_dataset(&self.dir.path().join("dataset"), per_class)
    }

    pub fn logger(&self) -> Arc<LoggerFake> {
        Arc::new(self.logger.clone())
    }
}
