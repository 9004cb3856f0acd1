/// CSV ingestion
pub mod csv;
/// Dataset container and resampling utilities
pub mod dataset;
