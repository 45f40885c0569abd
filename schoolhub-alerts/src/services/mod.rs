pub mod alert_service;
pub mod collectors;
pub mod read_state;
pub mod synthesizer;
