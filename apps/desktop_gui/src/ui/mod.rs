//! UI layer for desktop GUI: app shell and editor views.

pub mod app;

pub use app::{DesktopGuiApp, PersistedDesktopSettings, SETTINGS_STORAGE_KEY};
