//! Presentation layer: command entry points and table rendering

pub mod assets;
pub mod history;
pub mod setup;
pub mod summary;
pub mod transfer;
pub mod ui;
