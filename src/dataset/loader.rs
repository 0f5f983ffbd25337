use crate::dataset::sample::{Dataset, Sample};
use crate::error::{ClassifierError, Result};
use crate::library::logger::interface::Logger;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct DatasetLoader {
    extensions: Vec<String>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl DatasetLoader {
    pub fn new(extensions: Vec<String>, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
            logger: logger.with_namespace("dataset"),
        }
    }

    /// Reads `<dataset_path>/<label>/*.<ext>`. Only one directory level is
    /// visited; files directly under `dataset_path` and nested directories
    /// are ignored. Any image that fails to decode aborts the load.
    pub fn load(&self, dataset_path: &Path) -> Result<Dataset> {
        if !dataset_path.is_dir() {
            return Err(ClassifierError::Dataset(format!(
                "{:?} does not exist or is not a directory",
                dataset_path
            )));
        }

        let mut samples = Vec::new();

        for label_dir in sorted_entries(dataset_path)? {
            if !label_dir.is_dir() {
                continue;
            }

            let label = match label_dir.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };

            for file in sorted_entries(&label_dir)? {
                if !file.is_file() || !self.has_image_extension(&file) {
                    continue;
                }

                let image = image::open(&file).map_err(|e| {
                    ClassifierError::Dataset(format!("failed to decode {:?}: {}", file, e))
                })?;

                samples.push(Sample::new(label.clone(), image));
            }
        }

        let dataset = Dataset::new(samples);

        if dataset.is_empty() {
            return Err(ClassifierError::Dataset(format!(
                "no usable samples found in {:?}",
                dataset_path
            )));
        }

        let _ = self.logger.info(&format!(
            "Loaded {} samples from {} classes",
            dataset.len(),
            dataset.labels().len()
        ));
        for label in dataset.labels() {
            let _ = self
                .logger
                .info(&format!("  {}: {} samples", label, dataset.count_for(&label)));
        }

        Ok(dataset)
    }

    fn has_image_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let unreadable = |e: std::io::Error| ClassifierError::Dataset(format!("cannot read {:?}: {}", dir, e));

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(unreadable)? {
        paths.push(entry.map_err(unreadable)?.path());
    }
    paths.sort();

    Ok(paths)
}
