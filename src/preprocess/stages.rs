use crate::preprocess::settings::{ResizeFilter, ResizeMode};
use crate::preprocess::tensor::PreprocessedTensor;
use image::{imageops, GrayImage, Luma, RgbImage};

/// Resizes to exactly `width` x `height`. Intermediate sizes are rounded to
/// the nearest pixel; crop and pad offsets round down.
pub fn resize(
    image: &RgbImage,
    width: u32,
    height: u32,
    mode: ResizeMode,
    filter: ResizeFilter,
) -> RgbImage {
    let filter = filter.into();

    if image.width() == 0 || image.height() == 0 {
        return RgbImage::new(width, height);
    }

    match mode {
        ResizeMode::Fill => imageops::resize(image, width, height, filter),
        ResizeMode::IsoCrop => {
            let (w, h) = (image.width() as f64, image.height() as f64);
            let scale = (width as f64 / w).max(height as f64 / h);
            let new_w = ((w * scale).round() as u32).max(width);
            let new_h = ((h * scale).round() as u32).max(height);

            let scaled = imageops::resize(image, new_w, new_h, filter);
            let x_offset = (new_w - width) / 2;
            let y_offset = (new_h - height) / 2;

            imageops::crop_imm(&scaled, x_offset, y_offset, width, height).to_image()
        }
        ResizeMode::IsoPad => {
            let (w, h) = (image.width() as f64, image.height() as f64);
            let scale = (width as f64 / w).min(height as f64 / h);
            let new_w = ((w * scale).round() as u32).clamp(1, width);
            let new_h = ((h * scale).round() as u32).clamp(1, height);

            let scaled = imageops::resize(image, new_w, new_h, filter);
            let mut padded = RgbImage::new(width, height);
            let x_offset = (width - new_w) / 2;
            let y_offset = (height - new_h) / 2;

            imageops::replace(&mut padded, &scaled, x_offset as i64, y_offset as i64);
            padded
        }
    }
}

pub fn grayscale(image: &RgbImage, weights: [f32; 3]) -> GrayImage {
    let mut gray = GrayImage::new(image.width(), image.height());

    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let value = weights[0] * r as f32 + weights[1] * g as f32 + weights[2] * b as f32;
        gray.put_pixel(x, y, Luma([value.round().clamp(0.0, 255.0) as u8]));
    }

    gray
}

pub fn extract_pixels(image: &GrayImage, offset: f32) -> PreprocessedTensor {
    let data = image.pixels().map(|p| p.0[0] as f32 - offset).collect();

    PreprocessedTensor {
        width: image.width() as usize,
        height: image.height() as usize,
        channels: 1,
        data,
    }
}
