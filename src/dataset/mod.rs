pub mod loader;
pub mod sample;
