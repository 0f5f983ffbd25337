pub mod core;
pub mod indicator;
pub mod run;
pub mod stop_signal;
