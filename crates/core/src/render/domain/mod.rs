pub mod drawing_surface;
pub mod label_table;
pub mod scene;
pub mod viewport;
