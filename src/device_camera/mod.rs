#[cfg(test)]
pub mod impl_fake;
pub mod impl_image_sequence;
#[cfg(feature = "opencv")]
pub mod impl_opencv;
pub mod interface;
