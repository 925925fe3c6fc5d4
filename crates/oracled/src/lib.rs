//! Oracle daemon library - exposes modules for testing.

pub mod config;
pub mod extractor;
pub mod gateway;
pub mod notifier;
pub mod pipeline;
pub mod prompts;
pub mod ranker;
pub mod routes;
pub mod seed;
pub mod server;
pub mod store;
pub mod synthesizer;
