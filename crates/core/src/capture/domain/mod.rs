pub mod frame_encoder;
pub mod frame_source;
pub mod landmark_source;
pub mod roi_selector;
