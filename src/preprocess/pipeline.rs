use crate::preprocess::settings::{PreprocessSettings, Stage};
use crate::preprocess::stages::{extract_pixels, grayscale, resize};
use crate::preprocess::tensor::PreprocessedTensor;
use image::{DynamicImage, GrayImage, RgbImage};

enum Intermediate {
    Rgb(RgbImage),
    Gray(GrayImage),
    Tensor(PreprocessedTensor),
}

impl Intermediate {
    fn kind(&self) -> &'static str {
        match self {
            Intermediate::Rgb(_) => "rgb image",
            Intermediate::Gray(_) => "grayscale image",
            Intermediate::Tensor(_) => "tensor",
        }
    }
}

/// Runs the configured stages over `image` in order. Pure: the same image and
/// settings always give a bit-identical tensor.
pub fn preprocess(
    image: &DynamicImage,
    settings: &PreprocessSettings,
) -> Result<PreprocessedTensor, String> {
    let mut value = Intermediate::Rgb(image.to_rgb8());

    for stage in &settings.stages {
        value = apply(stage, value)?;
    }

    match value {
        Intermediate::Tensor(tensor) => Ok(tensor),
        other => Err(format!(
            "preprocessing ended with a {} instead of a tensor",
            other.kind()
        )),
    }
}

fn apply(stage: &Stage, value: Intermediate) -> Result<Intermediate, String> {
    match (stage, value) {
        (
            Stage::Resize {
                width,
                height,
                mode,
                filter,
            },
            Intermediate::Rgb(image),
        ) => Ok(Intermediate::Rgb(resize(&image, *width, *height, *mode, *filter))),
        (Stage::Grayscale { weights }, Intermediate::Rgb(image)) => {
            Ok(Intermediate::Gray(grayscale(&image, *weights)))
        }
        (
            Stage::ExtractPixels {
                offset,
                channels_last: true,
            },
            Intermediate::Gray(image),
        ) => Ok(Intermediate::Tensor(extract_pixels(&image, *offset))),
        (
            Stage::ExtractPixels {
                channels_last: false,
                ..
            },
            _,
        ) => Err("only channels-last pixel extraction is supported".to_string()),
        (stage, value) => Err(format!(
            "stage {} cannot take a {}",
            stage.name(),
            value.kind()
        )),
    }
}
