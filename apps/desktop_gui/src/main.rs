mod backend_bridge;
mod controller;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use client_core::config::{load_settings, Settings, DEFAULT_SETTINGS_FILE};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{DesktopGuiApp, PersistedDesktopSettings, SETTINGS_STORAGE_KEY};

#[derive(Parser, Debug)]
#[command(name = "followpack-desktop", about = "Desktop follow pack editor")]
struct Args {
    /// Settings file; defaults to the per-user config directory.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    service_url: Option<String>,
    /// npub or hex key of the signed-in user.
    #[arg(long)]
    session: Option<String>,
    /// Open this follow pack for editing on startup.
    #[arg(long)]
    edit: Option<String>,
}

fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("followpack").join(DEFAULT_SETTINGS_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
}

fn resolve_settings(args: &Args) -> Settings {
    let path = args.config.clone().unwrap_or_else(default_settings_path);
    let mut settings = load_settings(&path);
    tracing::info!(path = %path.display(), service_url = %settings.service_url, "loaded settings");
    if let Some(url) = &args.service_url {
        settings.service_url = url.clone();
    }
    if let Some(session) = &args.session {
        settings.session_identity = Some(session.clone());
    }
    settings
}

fn initial_query(args: &Args) -> String {
    args.edit
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| format!("edit={id}"))
        .unwrap_or_default()
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let settings = resolve_settings(&args);
    let query = initial_query(&args);

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Follow Packs")
            .with_inner_size([900.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Follow Packs",
        options,
        Box::new(|cc| {
            let persisted_settings = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedDesktopSettings>(&text).ok())
            });
            Ok(Box::new(DesktopGuiApp::new(
                cmd_tx,
                ui_rx,
                persisted_settings,
                query,
            )))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_flag_becomes_route_query() {
        let args = Args::try_parse_from(["followpack-desktop", "--edit", " abc "]).expect("parse");
        assert_eq!(initial_query(&args), "edit=abc");

        let args = Args::try_parse_from(["followpack-desktop"]).expect("parse");
        assert_eq!(initial_query(&args), "");
    }

    #[test]
    fn session_flag_overrides_settings() {
        let args = Args::try_parse_from([
            "followpack-desktop",
            "--config",
            "/nonexistent/followpack.toml",
            "--session",
            "npub10elfcs4fr0l0r8af98jlmgdh9c8tcxjvz9qkw038js35mp4dma8qzvjptg",
        ])
        .expect("parse");
        let settings = resolve_settings(&args);
        assert_eq!(
            settings.session_identity.as_deref(),
            Some("npub10elfcs4fr0l0r8af98jlmgdh9c8tcxjvz9qkw038js35mp4dma8qzvjptg")
        );
    }
}
