//! UI layer for the desktop portal: app shell and the two pages.

pub mod app;

pub use app::{PortalApp, StartupConfig};
