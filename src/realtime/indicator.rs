use crate::config::{IndicatorColor, IndicatorConfig};

pub const UNDETECTED_TEXT: &str = "Undetected";

/// What the display shows for one classified frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub label: String,
    pub text: String,
    pub color: IndicatorColor,
}

impl Indicator {
    pub fn undetected(label: &str) -> Self {
        Self {
            label: label.to_string(),
            text: UNDETECTED_TEXT.to_string(),
            color: IndicatorColor::White,
        }
    }

    #[allow(dead_code)]
    pub fn is_undetected(&self) -> bool {
        self.text == UNDETECTED_TEXT && self.color == IndicatorColor::White
    }
}

pub struct IndicatorMap {
    entries: Vec<IndicatorConfig>,
}

impl IndicatorMap {
    pub fn new(entries: &[IndicatorConfig]) -> Self {
        Self {
            entries: entries.to_vec(),
        }
    }

    /// Labels without a configured entry fall back to the undetected indicator.
    pub fn lookup(&self, label: &str) -> Indicator {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| Indicator {
                label: label.to_string(),
                text: entry.text.clone(),
                color: entry.color,
            })
            .unwrap_or_else(|| Indicator::undetected(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_known_labels_get_their_own_indicator() {
        let map = IndicatorMap::new(&Config::default().indicators);

        assert_eq!(map.lookup("standing").color, IndicatorColor::Green);
        assert_eq!(map.lookup("falling").color, IndicatorColor::Red);
        assert_eq!(map.lookup("empty").color, IndicatorColor::Yellow);
        assert_eq!(map.lookup("falling").text, "Falling");
    }

    #[test]
    fn test_unknown_label_is_undetected() {
        let map = IndicatorMap::new(&Config::default().indicators);

        let indicator = map.lookup("sitting");

        assert!(indicator.is_undetected());
        assert_eq!(indicator.label, "sitting");
        assert_eq!(indicator.text, "Undetected");
    }

    #[test]
    fn test_empty_label_is_undetected() {
        let map = IndicatorMap::new(&[]);

        assert!(map.lookup("").is_undetected());
    }
}
