pub mod config;
pub mod data_models;
pub mod dates;
pub mod extractor;
pub mod headers;
pub mod orchestrator;
pub mod providers;
pub mod serp;
