//! Command-line presentation: argument handling and rendering

pub mod calc;
pub mod setup;
pub mod ui;
