pub mod image_sequence_source;
pub mod jpeg_frame_encoder;
pub mod json_landmark_source;
