pub mod label_codec;
pub mod lbfgs;
pub mod maxent;
pub mod trained_model;
pub mod trainer;
