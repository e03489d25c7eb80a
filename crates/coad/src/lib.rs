//! CoA metrics daemon library - exposes modules for testing.

pub mod broadcast;
pub mod config;
pub mod sampler;
pub mod server;
pub mod state;
