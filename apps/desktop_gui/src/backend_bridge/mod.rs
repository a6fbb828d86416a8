//! Bridge between the UI thread and the background network worker.

pub mod commands;
pub mod runtime;
