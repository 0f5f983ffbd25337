pub mod model_metadata;
pub mod model_storage;
