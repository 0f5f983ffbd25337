use image::DynamicImage;

/// One labelled image. The label is the name of the directory it was read from.
#[derive(Debug, Clone)]
pub struct Sample {
    pub label: String,
    pub image: DynamicImage,
}

impl Sample {
    pub fn new(label: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            label: label.into(),
            image,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub samples: Vec<Sample>,
}

impl Dataset {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Distinct labels in alphabetical order.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.samples.iter().map(|s| s.label.clone()).collect();
        labels.sort();
        labels.dedup();
        labels
    }

    pub fn count_for(&self, label: &str) -> usize {
        self.samples.iter().filter(|s| s.label == label).count()
    }
}
