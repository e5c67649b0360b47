// src/core/mod.rs
pub mod engine;
pub mod indexer;
pub mod letters;
pub mod query;
pub mod types;
