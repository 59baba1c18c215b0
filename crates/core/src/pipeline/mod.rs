pub mod detect_image_use_case;
pub mod drive_loop;
pub mod pipeline_logger;
pub mod send_gate;
