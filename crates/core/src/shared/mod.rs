pub mod color;
pub mod constants;
pub mod frame;
pub mod landmarks;
pub mod region;
pub mod settings;
