// Terminal UI implementation using ratatui
// The page the controller draws into

pub mod app;
pub mod runner;
pub mod surface;
pub mod ui;

pub use app::{App, FilterField, InputMode};
pub use runner::run_tui;
pub use surface::{Snapshot, WatchSurface};
