//! Runtime bridge between UI command queue and backend event intake.
//!
//! The worker owns the editor and applies commands strictly in queue order, so
//! at most one editor action is in flight at a time.

use std::thread;

use client_core::{
    config::Settings, edit_id_from_query, EditorOutcome, EditorServices, FollowPackEditor,
};
use crossbeam_channel::{Receiver, Sender};
use reqwest::Client as HttpClient;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{BusyKind, FormSync, UiError, UiErrorContext, UiEvent};
use crate::ui::app::PreviewImage;

const COVER_PREVIEW_MAX_BYTES: usize = 8 * 1024 * 1024;
const COVER_PREVIEW_MAX_DIMENSION: u32 = 480;

pub fn launch(settings: Settings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(run_worker(settings, cmd_rx, ui_tx));
    });
}

async fn run_worker(settings: Settings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    let services = match EditorServices::from_settings(&settings) {
        Ok(services) => services,
        Err(err) => {
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: {err:#}"),
            )));
            tracing::error!("failed to build editor services: {err:#}");
            return;
        }
    };
    let http = match HttpClient::builder()
        .timeout(settings.request_timeout())
        .build()
    {
        Ok(http) => http,
        Err(err) => {
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: failed to build http client: {err}"),
            )));
            return;
        }
    };

    let mut editor = FollowPackEditor::new(services);
    let _ = ui_tx.try_send(UiEvent::Info(format!(
        "Backend worker ready ({})",
        settings.service_url
    )));

    while let Ok(cmd) = cmd_rx.recv() {
        tracing::debug!(command = cmd.name(), "backend command");
        apply_command(&mut editor, &http, &ui_tx, cmd).await;
    }
    tracing::info!("ui command queue closed; backend worker exiting");
}

/// Snapshots are never dropped; the worker waits for the UI to drain the queue.
fn send_state(editor: &FollowPackEditor, ui_tx: &Sender<UiEvent>, sync: FormSync) {
    let event = UiEvent::StateChanged {
        state: Box::new(editor.snapshot()),
        sync,
    };
    if ui_tx.send(event).is_err() {
        tracing::debug!("ui event queue closed; dropping editor snapshot");
    }
}

fn send_busy(ui_tx: &Sender<UiEvent>, kind: BusyKind) {
    let _ = ui_tx.try_send(UiEvent::Busy(kind));
}

async fn apply_command(
    editor: &mut FollowPackEditor,
    http: &HttpClient,
    ui_tx: &Sender<UiEvent>,
    cmd: BackendCommand,
) {
    match cmd {
        BackendCommand::Open { query } => {
            if edit_id_from_query(&query).is_some() {
                send_busy(ui_tx, BusyKind::Loading);
            }
            editor.open(&query).await;
            send_state(editor, ui_tx, FormSync::All);
        }
        BackendCommand::Search { query } => {
            editor.set_search_query(query);
            send_busy(ui_tx, BusyKind::Searching);
            let outcome = editor.search().await;
            tracing::debug!(?outcome, "search finished");
            send_state(editor, ui_tx, FormSync::SearchBox);
        }
        BackendCommand::AddHit { pubkey } => {
            let index = editor
                .state()
                .search_results
                .iter()
                .position(|hit| hit.pubkey == pubkey);
            if let Some(index) = index {
                send_busy(ui_tx, BusyKind::Searching);
                editor.add_hit(index).await;
            }
            send_state(editor, ui_tx, FormSync::Keep);
        }
        BackendCommand::RemoveEntry { pubkey } => {
            let index = editor
                .state()
                .entries
                .iter()
                .position(|entry| entry.pubkey == pubkey);
            if let Some(index) = index {
                editor.remove_entry(index);
            }
            send_state(editor, ui_tx, FormSync::Keep);
        }
        BackendCommand::MoveUp { index } => {
            editor.move_up(index);
            send_state(editor, ui_tx, FormSync::Keep);
        }
        BackendCommand::MoveDown { index } => {
            editor.move_down(index);
            send_state(editor, ui_tx, FormSync::Keep);
        }
        BackendCommand::Submit { fields } => {
            fields.apply(editor);
            send_busy(ui_tx, BusyKind::Submitting);
            let outcome = editor.submit().await;
            send_state(editor, ui_tx, FormSync::Keep);
            if let EditorOutcome::Navigate(route) = outcome {
                let _ = ui_tx.try_send(UiEvent::Navigated(route));
            }
        }
        BackendCommand::RequestDelete => {
            editor.request_delete();
            send_state(editor, ui_tx, FormSync::Keep);
        }
        BackendCommand::CancelDelete => {
            editor.cancel_delete();
            send_state(editor, ui_tx, FormSync::Keep);
        }
        BackendCommand::ConfirmDelete => {
            send_busy(ui_tx, BusyKind::Deleting);
            let outcome = editor.confirm_delete().await;
            send_state(editor, ui_tx, FormSync::Keep);
            if let EditorOutcome::Navigate(route) = outcome {
                let _ = ui_tx.try_send(UiEvent::Navigated(route));
            }
        }
        BackendCommand::DismissError => {
            editor.clear_error();
            send_state(editor, ui_tx, FormSync::Keep);
        }
        BackendCommand::FetchCover { url } => {
            let http = http.clone();
            let ui_tx = ui_tx.clone();
            tokio::spawn(async move {
                let event = match fetch_cover_preview(&http, &url).await {
                    Ok(image) => UiEvent::CoverLoaded { url, image },
                    Err(reason) => {
                        tracing::warn!(url = %url, "cover preview failed: {reason}");
                        UiEvent::CoverFailed { url, reason }
                    }
                };
                let _ = ui_tx.try_send(event);
            });
        }
    }
}

async fn fetch_cover_preview(http: &HttpClient, url: &str) -> Result<PreviewImage, String> {
    let response = http.get(url).send().await.map_err(|err| err.to_string())?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("cover image returned HTTP {}", status.as_u16()));
    }
    let bytes = response.bytes().await.map_err(|err| err.to_string())?;
    if bytes.len() > COVER_PREVIEW_MAX_BYTES {
        return Err("cover image is too large to preview".to_string());
    }
    decode_preview_image(&bytes)
}

pub(crate) fn decode_preview_image(bytes: &[u8]) -> Result<PreviewImage, String> {
    let dynamic = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let resized = if dynamic.width().max(dynamic.height()) > COVER_PREVIEW_MAX_DIMENSION {
        dynamic.thumbnail(COVER_PREVIEW_MAX_DIMENSION, COVER_PREVIEW_MAX_DIMENSION)
    } else {
        dynamic
    }
    .to_rgba8();
    let width = resized.width() as usize;
    let height = resized.height() as usize;
    Ok(PreviewImage {
        width,
        height,
        rgba: resized.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    use crossbeam_channel::bounded;

    use crate::backend_bridge::commands::FormFields;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    fn next_state(ui_rx: &Receiver<UiEvent>) -> client_core::EditorState {
        loop {
            match ui_rx.recv_timeout(Duration::from_secs(5)).expect("ui event") {
                UiEvent::StateChanged { state, .. } => return *state,
                UiEvent::Error(err) => panic!("backend error: {}", err.message()),
                _ => {}
            }
        }
    }

    #[test]
    fn preview_is_downscaled_to_max_dimension() {
        let preview = decode_preview_image(&png_bytes(1200, 600)).expect("decode");
        assert_eq!(preview.width, COVER_PREVIEW_MAX_DIMENSION as usize);
        assert!(preview.height <= 300);
        assert_eq!(preview.rgba.len(), preview.width * preview.height * 4);
    }

    #[test]
    fn small_preview_keeps_its_size() {
        let preview = decode_preview_image(&png_bytes(32, 16)).expect("decode");
        assert_eq!((preview.width, preview.height), (32, 16));
    }

    #[test]
    fn undecodable_cover_is_an_error() {
        assert!(decode_preview_image(b"definitely not an image").is_err());
    }

    #[test]
    fn worker_reports_editor_errors_in_snapshots() {
        let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
        let (ui_tx, ui_rx) = bounded::<UiEvent>(64);
        launch(Settings::default(), cmd_rx, ui_tx);

        cmd_tx
            .send(BackendCommand::Open {
                query: String::new(),
            })
            .expect("send");
        let opened = next_state(&ui_rx);
        assert!(!opened.is_edit());
        assert!(opened.error.is_none());

        cmd_tx
            .send(BackendCommand::Submit {
                fields: FormFields {
                    name: "Rustaceans".to_string(),
                    ..FormFields::default()
                },
            })
            .expect("send");
        let submitted = next_state(&ui_rx);
        assert_eq!(submitted.name, "Rustaceans");
        assert_eq!(
            submitted.error.as_deref(),
            Some("You must be logged in to publish a follow pack")
        );

        cmd_tx.send(BackendCommand::DismissError).expect("send");
        assert!(next_state(&ui_rx).error.is_none());
    }

    #[test]
    fn full_ui_queue_still_receives_every_snapshot() {
        let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
        let (ui_tx, ui_rx) = bounded::<UiEvent>(2);
        launch(Settings::default(), cmd_rx, ui_tx);

        for _ in 0..5 {
            cmd_tx.send(BackendCommand::MoveUp { index: 0 }).expect("send");
        }
        for _ in 0..5 {
            next_state(&ui_rx);
        }
    }

    #[test]
    fn create_mode_ignores_delete_request() {
        let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
        let (ui_tx, ui_rx) = bounded::<UiEvent>(64);
        launch(Settings::default(), cmd_rx, ui_tx);

        cmd_tx.send(BackendCommand::RequestDelete).expect("send");
        assert!(!next_state(&ui_rx).show_delete_confirm);
    }
}
