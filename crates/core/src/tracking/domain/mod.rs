pub mod associator;
pub mod detection;
pub mod presence_debouncer;
pub mod track;
pub mod track_smoother;
pub mod track_store;
