//! Bridge between the egui thread and the backend worker thread.

pub mod commands;
pub mod runtime;
