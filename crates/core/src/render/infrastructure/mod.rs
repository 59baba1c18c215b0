pub mod json_lines_surface;
