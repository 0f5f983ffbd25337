pub mod pipeline;
pub mod settings;
pub mod stages;
pub mod tensor;
