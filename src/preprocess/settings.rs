use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

pub const IMAGE_WIDTH: u32 = 224;
pub const IMAGE_HEIGHT: u32 = 224;
pub const MEAN: f32 = 117.0;
pub const CHANNELS_LAST: bool = true;
pub const GRAYSCALE_WEIGHTS: [f32; 3] = [0.3, 0.59, 0.11];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    /// Stretch to the target size, ignoring the aspect ratio.
    Fill,
    /// Scale to cover the target, then crop the centre.
    IsoCrop,
    /// Scale to fit inside the target, then pad with black around it.
    IsoPad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// RGB8 of any size -> RGB8 of `width` x `height`.
    Resize {
        width: u32,
        height: u32,
        mode: ResizeMode,
        filter: ResizeFilter,
    },
    /// RGB8 -> Luma8, `round(w0 * r + w1 * g + w2 * b)`.
    Grayscale { weights: [f32; 3] },
    /// Luma8 -> tensor of `pixel - offset`.
    ExtractPixels { offset: f32, channels_last: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessSettings {
    pub stages: Vec<Stage>,
}

impl Default for PreprocessSettings {
    fn default() -> Self {
        Self {
            stages: vec![
                Stage::Resize {
                    width: IMAGE_WIDTH,
                    height: IMAGE_HEIGHT,
                    mode: ResizeMode::IsoCrop,
                    filter: ResizeFilter::Triangle,
                },
                Stage::Grayscale {
                    weights: GRAYSCALE_WEIGHTS,
                },
                Stage::ExtractPixels {
                    offset: MEAN,
                    channels_last: CHANNELS_LAST,
                },
            ],
        }
    }
}

impl PreprocessSettings {
    /// Checks the stages run resize, grayscale, extract-pixels in that order
    /// and returns the output shape `(width, height, channels)`.
    pub fn validate(&self) -> Result<(usize, usize, usize), String> {
        match self.stages.as_slice() {
            [Stage::Resize { width, height, .. }, Stage::Grayscale { weights }, Stage::ExtractPixels { offset, channels_last }] =>
            {
                if !channels_last {
                    return Err("only channels-last pixel extraction is supported".to_string());
                }
                if *width == 0 || *height == 0 {
                    return Err(format!("resize target {}x{} is empty", width, height));
                }
                if weights.iter().chain(std::iter::once(offset)).any(|v| !v.is_finite()) {
                    return Err("non-finite preprocessing constant".to_string());
                }
                Ok((*width as usize, *height as usize, 1))
            }
            stages => Err(format!(
                "expected stages [resize, grayscale, extract_pixels], got {:?}",
                stages.iter().map(Stage::name).collect::<Vec<_>>()
            )),
        }
    }
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Resize { .. } => "resize",
            Stage::Grayscale { .. } => "grayscale",
            Stage::ExtractPixels { .. } => "extract_pixels",
        }
    }
}
