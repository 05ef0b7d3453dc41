// Library surface for the terminal binary and headless/integration tests.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod controller;
pub mod display;
pub mod race;
pub mod runtime;
pub mod summary;
pub mod text_source;
pub mod view;

pub use controller::RaceController;
pub use race::{Race, RaceError};
