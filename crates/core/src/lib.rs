pub mod capture;
pub mod pipeline;
pub mod render;
pub mod shared;
pub mod stream;
pub mod tracking;
