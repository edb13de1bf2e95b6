pub mod config;
pub mod engine;
pub mod headless;
pub mod tui;
