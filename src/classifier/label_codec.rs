use crate::error::{ClassifierError, Result};
use serde::{Deserialize, Serialize};

/// Maps labels to dense keys `0..len` in alphabetical order, so the same label
/// set always gets the same keys regardless of directory enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelCodec {
    labels: Vec<String>,
}

impl LabelCodec {
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels: Vec<String> = labels.into_iter().map(|l| l.as_ref().to_string()).collect();
        labels.sort();
        labels.dedup();
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn encode(&self, label: &str) -> Option<usize> {
        self.labels.binary_search_by(|l| l.as_str().cmp(label)).ok()
    }

    pub fn decode(&self, key: usize) -> Result<&str> {
        self.labels
            .get(key)
            .map(String::as_str)
            .ok_or(ClassifierError::UnknownLabelKey(key))
    }
}

impl TryFrom<Vec<String>> for LabelCodec {
    type Error = String;

    fn try_from(labels: Vec<String>) -> std::result::Result<Self, Self::Error> {
        let codec = LabelCodec::from_labels(&labels);
        if codec.labels != labels {
            return Err(format!(
                "labels {:?} are not unique and alphabetically ordered",
                labels
            ));
        }
        Ok(codec)
    }
}

impl From<LabelCodec> for Vec<String> {
    fn from(codec: LabelCodec) -> Self {
        codec.labels
    }
}
