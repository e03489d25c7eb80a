//! coactl library - stream client, assistant and notifications.

pub mod assistant;
pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod notify;
pub mod stream;
