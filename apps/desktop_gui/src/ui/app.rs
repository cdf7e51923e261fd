use client_core::EditorState;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::TextureHandle;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{FollowListEntry, FollowListId, Route},
    identity::hex_to_npub,
};

use crate::backend_bridge::commands::{BackendCommand, FormFields};
use crate::controller::events::{
    BusyKind, FormSync, UiError, UiErrorCategory, UiErrorContext, UiEvent,
};
use crate::controller::orchestration::dispatch_backend_command;

pub const SETTINGS_STORAGE_KEY: &str = "followpack.desktop.settings";
const MAX_RECENT_PACKS: usize = 12;

#[derive(Clone)]
pub struct PreviewImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedDesktopSettings {
    #[serde(default)]
    pub recent_packs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AppViewState {
    Home,
    Editor,
    Published(FollowListId),
}

enum CoverPreview {
    None,
    Loading(String),
    Ready {
        url: String,
        texture: TextureHandle,
        size: egui::Vec2,
    },
    Failed {
        url: String,
        reason: String,
    },
}

impl CoverPreview {
    fn url(&self) -> Option<&str> {
        match self {
            CoverPreview::None => None,
            CoverPreview::Loading(url)
            | CoverPreview::Ready { url, .. }
            | CoverPreview::Failed { url, .. } => Some(url),
        }
    }
}

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Auth => "Sign-in",
        UiErrorCategory::NotFound => "Not found",
        UiErrorCategory::Transport => "Network",
        UiErrorCategory::Validation => "Check the form",
        UiErrorCategory::Unknown => "Error",
    }
}

fn previewable_url(url: &str) -> Option<String> {
    let url = url.trim();
    (url.starts_with("https://") || url.starts_with("http://")).then(|| url.to_string())
}

/// Shortened npub for list rows; falls back to the hex form.
fn short_npub(entry: &FollowListEntry) -> String {
    match hex_to_npub(&entry.pubkey) {
        Ok(npub) if npub.len() > 20 => format!("{}…{}", &npub[..12], &npub[npub.len() - 6..]),
        Ok(npub) => npub,
        Err(_) => entry.pubkey.short(),
    }
}

pub struct DesktopGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    view_state: AppViewState,
    editor: EditorState,

    name: String,
    cover_image_url: String,
    description: String,
    search_query: String,
    open_id_input: String,

    busy: Option<BusyKind>,
    last_action: UiErrorContext,
    status: String,
    startup_error: Option<UiError>,
    cover: CoverPreview,
    recent_packs: Vec<String>,
}

impl DesktopGuiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        persisted_settings: Option<PersistedDesktopSettings>,
        initial_query: String,
    ) -> Self {
        let persisted = persisted_settings.unwrap_or_default();
        let mut app = Self {
            cmd_tx,
            ui_rx,
            view_state: AppViewState::Home,
            editor: EditorState::default(),
            name: String::new(),
            cover_image_url: String::new(),
            description: String::new(),
            search_query: String::new(),
            open_id_input: String::new(),
            busy: None,
            last_action: UiErrorContext::General,
            status: "Starting...".to_string(),
            startup_error: None,
            cover: CoverPreview::None,
            recent_packs: persisted.recent_packs,
        };
        if !initial_query.trim().is_empty() {
            app.open(initial_query);
        }
        app
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    fn open(&mut self, query: String) {
        self.view_state = AppViewState::Editor;
        self.last_action = UiErrorContext::Load;
        self.cover = CoverPreview::None;
        self.dispatch(BackendCommand::Open { query });
    }

    fn open_new(&mut self) {
        self.open(String::new());
    }

    fn open_for_edit(&mut self, id: &str) {
        self.open(format!("edit={}", id.trim()));
    }

    fn form_fields(&self) -> FormFields {
        FormFields {
            name: self.name.clone(),
            cover_image_url: self.cover_image_url.clone(),
            description: self.description.clone(),
        }
    }

    fn remember_pack(&mut self, id: &FollowListId) {
        self.recent_packs.retain(|known| known != &id.0);
        self.recent_packs.insert(0, id.0.clone());
        self.recent_packs.truncate(MAX_RECENT_PACKS);
    }

    fn forget_pack(&mut self, id: &FollowListId) {
        self.recent_packs.retain(|known| known != &id.0);
    }

    fn visible_error(&self) -> Option<UiError> {
        self.startup_error.clone().or_else(|| {
            self.editor
                .error
                .as_ref()
                .map(|message| UiError::from_message(self.last_action, message.clone()))
        })
    }

    fn controls_enabled(&self) -> bool {
        self.busy.is_none() && !self.editor.is_busy() && self.startup_error.is_none()
    }

    fn request_cover_preview(&mut self) {
        let Some(url) = previewable_url(&self.cover_image_url) else {
            self.cover = CoverPreview::None;
            return;
        };
        if self.cover.url() == Some(url.as_str()) {
            return;
        }
        self.cover = CoverPreview::Loading(url.clone());
        self.dispatch(BackendCommand::FetchCover { url });
    }

    fn apply_snapshot(&mut self, state: EditorState, sync: FormSync) {
        match sync {
            FormSync::All => {
                self.name = state.name.clone();
                self.cover_image_url = state.cover_image_url.clone();
                self.description = state.description.clone();
                self.search_query = state.search_query.clone();
            }
            FormSync::SearchBox => self.search_query = state.search_query.clone(),
            FormSync::Keep => {}
        }
        self.editor = state;
        self.busy = None;
        if sync == FormSync::All {
            self.request_cover_preview();
        }
    }

    fn apply_navigation(&mut self, route: Route) {
        self.status = format!("Navigated to {}", route.path());
        match route {
            Route::Pack(id) => {
                self.remember_pack(&id);
                self.view_state = AppViewState::Published(id);
            }
            Route::Home => {
                if let Some(id) = self.editor.editing_id().cloned() {
                    self.forget_pack(&id);
                }
                self.status = "Follow pack deleted".to_string();
                self.view_state = AppViewState::Home;
            }
        }
    }

    fn handle_event(&mut self, ctx: &egui::Context, event: UiEvent) {
        match event {
            UiEvent::Info(message) => self.status = message,
            UiEvent::Busy(kind) => {
                self.busy = Some(kind);
                self.last_action = kind.context();
                self.status = kind.label().to_string();
            }
            UiEvent::StateChanged { state, sync } => self.apply_snapshot(*state, sync),
            UiEvent::Navigated(route) => self.apply_navigation(route),
            UiEvent::CoverLoaded { url, image } => {
                if self.cover.url() != Some(url.as_str()) {
                    return;
                }
                let color_image =
                    egui::ColorImage::from_rgba_unmultiplied([image.width, image.height], &image.rgba);
                let texture = ctx.load_texture(
                    format!("cover-preview:{url}"),
                    color_image,
                    egui::TextureOptions::LINEAR,
                );
                self.cover = CoverPreview::Ready {
                    url,
                    texture,
                    size: egui::vec2(image.width as f32, image.height as f32),
                };
            }
            UiEvent::CoverFailed { url, reason } => {
                if self.cover.url() == Some(url.as_str()) {
                    self.cover = CoverPreview::Failed { url, reason };
                }
            }
            UiEvent::Error(err) => {
                tracing::error!(context = ?err.context(), "{}", err.message());
                self.busy = None;
                if err.context() == UiErrorContext::BackendStartup {
                    self.startup_error = Some(err);
                } else {
                    self.status = err.message().to_string();
                }
            }
        }
    }

    fn process_ui_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.handle_event(ctx, event);
        }
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.busy.is_some() || self.editor.is_busy() {
                    ui.spinner();
                }
                ui.label(&self.status);
            });
        });
    }

    fn show_error_banner(&mut self, ui: &mut egui::Ui) {
        let Some(err) = self.visible_error() else {
            return;
        };
        let dismissable = self.startup_error.is_none();
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(
                    ui.visuals().error_fg_color,
                    format!("{}: {}", err_label(err.category()), err.message()),
                );
                if dismissable && ui.small_button("Dismiss").clicked() {
                    self.dispatch(BackendCommand::DismissError);
                }
            });
            if !err.is_user_fixable() && dismissable {
                ui.small(
                    "Check the follow pack service address in settings and try again.",
                );
            }
        });
        ui.add_space(6.0);
    }

    fn show_home(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_error_banner(ui);
            ui.heading("Follow packs");
            ui.add_space(8.0);

            let enabled = self.controls_enabled();
            if ui
                .add_enabled(enabled, egui::Button::new("New follow pack"))
                .clicked()
            {
                self.open_new();
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label("Edit by id");
                let response = ui.text_edit_singleline(&mut self.open_id_input);
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let clicked = ui
                    .add_enabled(
                        enabled && !self.open_id_input.trim().is_empty(),
                        egui::Button::new("Open"),
                    )
                    .clicked();
                if (submitted || clicked) && !self.open_id_input.trim().is_empty() {
                    let id = std::mem::take(&mut self.open_id_input);
                    self.open_for_edit(&id);
                }
            });

            if !self.recent_packs.is_empty() {
                ui.add_space(12.0);
                ui.label("Recently published");
                let mut chosen = None;
                for id in &self.recent_packs {
                    ui.horizontal(|ui| {
                        ui.monospace(id);
                        if ui.add_enabled(enabled, egui::Button::new("Edit")).clicked() {
                            chosen = Some(id.clone());
                        }
                    });
                }
                if let Some(id) = chosen {
                    self.open_for_edit(&id);
                }
            }
        });
    }

    fn show_published(&mut self, ctx: &egui::Context, id: FollowListId) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Follow pack published");
            ui.add_space(6.0);
            ui.label(format!("Name: {}", self.editor.name.trim()));
            ui.label(format!("People: {}", self.editor.entries.len()));
            ui.horizontal(|ui| {
                ui.label("Link:");
                ui.monospace(Route::Pack(id.clone()).path());
            });
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.button("Edit this pack").clicked() {
                    self.open_for_edit(&id.0);
                }
                if ui.button("New follow pack").clicked() {
                    self.open_new();
                }
                if ui.button("Home").clicked() {
                    self.view_state = AppViewState::Home;
                }
            });
        });
    }

    fn render_cover(&self, ui: &mut egui::Ui) {
        match &self.cover {
            CoverPreview::None => {}
            CoverPreview::Loading(_) => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.small("Loading cover preview...");
                });
            }
            CoverPreview::Ready { texture, size, .. } => {
                let max_width = ui.available_width().min(480.0);
                let scale = (max_width / size.x).min(1.0);
                ui.add(egui::Image::from_texture((texture.id(), *size * scale)));
            }
            CoverPreview::Failed { reason, .. } => {
                ui.colored_label(
                    ui.visuals().warn_fg_color,
                    format!("Couldn't preview cover image: {reason}"),
                );
            }
        }
    }

    fn render_fields(&mut self, ui: &mut egui::Ui, enabled: bool) {
        egui::Grid::new("pack_fields")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Name");
                ui.add_enabled(
                    enabled,
                    egui::TextEdit::singleline(&mut self.name).hint_text("My favourite people"),
                );
                ui.end_row();

                ui.label("Cover image URL");
                let cover = ui.add_enabled(
                    enabled,
                    egui::TextEdit::singleline(&mut self.cover_image_url)
                        .hint_text("https://..."),
                );
                if cover.lost_focus() {
                    self.request_cover_preview();
                }
                ui.end_row();

                ui.label("Description");
                ui.add_enabled(
                    enabled,
                    egui::TextEdit::multiline(&mut self.description).desired_rows(3),
                );
                ui.end_row();
            });
        self.render_cover(ui);
    }

    fn render_search(&mut self, ui: &mut egui::Ui, enabled: bool) {
        ui.label("Add people by npub, hex key, NIP-05 address or name");
        ui.horizontal(|ui| {
            let response = ui.add_enabled(
                enabled,
                egui::TextEdit::singleline(&mut self.search_query)
                    .hint_text("npub1... or alice@example.com"),
            );
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let clicked = ui.add_enabled(enabled, egui::Button::new("Search")).clicked();
            if enabled && (submitted || clicked) {
                let query = self.search_query.clone();
                self.dispatch(BackendCommand::Search { query });
            }
        });

        if self.editor.search_results.is_empty() {
            return;
        }
        let mut chosen = None;
        egui::ScrollArea::vertical()
            .id_salt("search_results")
            .max_height(180.0)
            .show(ui, |ui| {
                for hit in &self.editor.search_results {
                    ui.horizontal(|ui| {
                        let already = self.editor.contains(&hit.pubkey);
                        let label = if already { "Added" } else { "Add" };
                        if ui
                            .add_enabled(enabled && !already, egui::Button::new(label))
                            .clicked()
                        {
                            chosen = Some(hit.pubkey.clone());
                        }
                        ui.label(hit.name.as_deref().unwrap_or("(no name)"));
                        if let Some(nip05) = &hit.nip05 {
                            ui.small(nip05);
                        }
                        ui.monospace(hit.pubkey.short());
                    });
                }
            });
        if let Some(pubkey) = chosen {
            self.dispatch(BackendCommand::AddHit { pubkey });
        }
    }

    fn render_entries(&mut self, ui: &mut egui::Ui, enabled: bool) {
        ui.label(format!("People in this pack ({})", self.editor.entries.len()));
        if self.editor.entries.is_empty() {
            ui.small("Nobody yet. Search above to add people.");
            return;
        }

        let last = self.editor.entries.len() - 1;
        let mut command = None;
        egui::ScrollArea::vertical()
            .id_salt("pack_entries")
            .show(ui, |ui| {
                for (index, entry) in self.editor.entries.iter().enumerate() {
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.strong(entry.display_name());
                            ui.small(short_npub(entry));
                            if let Some(nip05) = &entry.nip05 {
                                ui.small(nip05);
                            }
                        });
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.add_enabled(enabled, egui::Button::new("Remove")).clicked() {
                                command = Some(BackendCommand::RemoveEntry {
                                    pubkey: entry.pubkey.clone(),
                                });
                            }
                            if ui
                                .add_enabled(enabled && index < last, egui::Button::new("Down"))
                                .clicked()
                            {
                                command = Some(BackendCommand::MoveDown { index });
                            }
                            if ui
                                .add_enabled(enabled && index > 0, egui::Button::new("Up"))
                                .clicked()
                            {
                                command = Some(BackendCommand::MoveUp { index });
                            }
                        });
                    });
                    ui.separator();
                }
            });
        if let Some(command) = command {
            self.dispatch(command);
        }
    }

    fn show_editor(&mut self, ctx: &egui::Context) {
        let enabled = self.controls_enabled();
        egui::TopBottomPanel::top("editor_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.add_enabled(enabled, egui::Button::new("Home")).clicked() {
                    self.view_state = AppViewState::Home;
                }
                ui.heading(if self.editor.is_edit() {
                    "Edit follow pack"
                } else {
                    "New follow pack"
                });
            });
        });

        egui::TopBottomPanel::bottom("editor_actions").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let publish_label = if self.editor.submitting || self.busy == Some(BusyKind::Submitting) {
                    "Publishing..."
                } else if self.editor.is_edit() {
                    "Update follow pack"
                } else {
                    "Publish follow pack"
                };
                if ui
                    .add_enabled(enabled, egui::Button::new(publish_label))
                    .clicked()
                {
                    let fields = self.form_fields();
                    self.dispatch(BackendCommand::Submit { fields });
                }
                if self.editor.is_edit()
                    && ui
                        .add_enabled(enabled, egui::Button::new("Delete"))
                        .clicked()
                {
                    self.dispatch(BackendCommand::RequestDelete);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_error_banner(ui);
            if self.busy == Some(BusyKind::Loading) || self.editor.loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(BusyKind::Loading.label());
                });
                return;
            }
            self.render_fields(ui, enabled);
            ui.separator();
            self.render_search(ui, enabled);
            ui.separator();
            self.render_entries(ui, enabled);
        });

        if self.editor.show_delete_confirm {
            self.show_delete_confirm(ctx);
        }
    }

    fn show_delete_confirm(&mut self, ctx: &egui::Context) {
        let deleting = self.editor.deleting || self.busy == Some(BusyKind::Deleting);
        let mut command = None;
        egui::Window::new("Delete follow pack?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!(
                    "\"{}\" will be deleted. This cannot be undone.",
                    self.editor.name.trim()
                ));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(!deleting, egui::Button::new("Cancel"))
                        .clicked()
                    {
                        command = Some(BackendCommand::CancelDelete);
                    }
                    let label = if deleting { "Deleting..." } else { "Delete" };
                    if ui
                        .add_enabled(!deleting, egui::Button::new(label))
                        .clicked()
                    {
                        command = Some(BackendCommand::ConfirmDelete);
                    }
                });
            });
        if let Some(command) = command {
            self.dispatch(command);
        }
    }
}

impl eframe::App for DesktopGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events(ctx);
        self.show_status_bar(ctx);

        match self.view_state.clone() {
            AppViewState::Home => self.show_home(ctx),
            AppViewState::Editor => self.show_editor(ctx),
            AppViewState::Published(id) => self.show_published(ctx, id),
        }

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedDesktopSettings {
            recent_packs: self.recent_packs.clone(),
        };
        if let Ok(serialized) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::EditorMode;
    use crossbeam_channel::bounded;
    use shared::domain::PublicKeyHex;

    const AUTHOR: &str = "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e";
    const MEMBER: &str = "b0635d6a9851d3aed0cd6c495b282167acf761729078d975fc341b22650b07b9";

    fn app() -> (DesktopGuiApp, Receiver<BackendCommand>, Sender<UiEvent>) {
        let (cmd_tx, cmd_rx) = bounded(32);
        let (ui_tx, ui_rx) = bounded(32);
        (
            DesktopGuiApp::new(cmd_tx, ui_rx, None, String::new()),
            cmd_rx,
            ui_tx,
        )
    }

    fn edit_state(id: &str) -> EditorState {
        EditorState {
            mode: EditorMode::Edit {
                id: FollowListId(id.to_string()),
                author: PublicKeyHex::parse(AUTHOR).expect("key"),
            },
            name: "Rust folks".to_string(),
            description: "people writing rust".to_string(),
            entries: vec![FollowListEntry::new(PublicKeyHex::parse(MEMBER).expect("key"))],
            ..EditorState::default()
        }
    }

    #[test]
    fn initial_query_opens_editor_for_that_pack() {
        let (cmd_tx, cmd_rx) = bounded(4);
        let (_ui_tx, ui_rx) = bounded(4);
        let app = DesktopGuiApp::new(cmd_tx, ui_rx, None, "edit=abc".to_string());

        assert_eq!(app.view_state, AppViewState::Editor);
        match cmd_rx.try_recv().expect("open queued") {
            BackendCommand::Open { query } => assert_eq!(query, "edit=abc"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn loaded_snapshot_fills_form_buffers() {
        let (mut app, _cmd_rx, ui_tx) = app();
        let ctx = egui::Context::default();
        ui_tx
            .send(UiEvent::Busy(BusyKind::Loading))
            .expect("send");
        ui_tx
            .send(UiEvent::StateChanged {
                state: Box::new(edit_state("abc")),
                sync: FormSync::All,
            })
            .expect("send");
        app.process_ui_events(&ctx);

        assert_eq!(app.name, "Rust folks");
        assert_eq!(app.description, "people writing rust");
        assert!(app.busy.is_none());
        assert!(app.editor.is_edit());
    }

    #[test]
    fn keep_sync_does_not_clobber_typing() {
        let (mut app, _cmd_rx, ui_tx) = app();
        let ctx = egui::Context::default();
        app.name = "typed but not sent".to_string();
        ui_tx
            .send(UiEvent::StateChanged {
                state: Box::new(edit_state("abc")),
                sync: FormSync::Keep,
            })
            .expect("send");
        app.process_ui_events(&ctx);

        assert_eq!(app.name, "typed but not sent");
        assert_eq!(app.editor.entries.len(), 1);
    }

    #[test]
    fn publish_navigation_shows_pack_and_remembers_it() {
        let (mut app, _cmd_rx, ui_tx) = app();
        let ctx = egui::Context::default();
        ui_tx
            .send(UiEvent::Navigated(Route::Pack(FollowListId("evt1".to_string()))))
            .expect("send");
        app.process_ui_events(&ctx);

        assert_eq!(
            app.view_state,
            AppViewState::Published(FollowListId("evt1".to_string()))
        );
        assert_eq!(app.recent_packs, vec!["evt1".to_string()]);
        assert_eq!(app.status, "Navigated to /d/evt1");
    }

    #[test]
    fn delete_navigation_returns_home_and_forgets_pack() {
        let (mut app, _cmd_rx, ui_tx) = app();
        let ctx = egui::Context::default();
        app.recent_packs = vec!["abc".to_string(), "other".to_string()];
        ui_tx
            .send(UiEvent::StateChanged {
                state: Box::new(edit_state("abc")),
                sync: FormSync::Keep,
            })
            .expect("send");
        ui_tx.send(UiEvent::Navigated(Route::Home)).expect("send");
        app.process_ui_events(&ctx);

        assert_eq!(app.view_state, AppViewState::Home);
        assert_eq!(app.recent_packs, vec!["other".to_string()]);
    }

    #[test]
    fn editor_error_is_classified_with_last_action() {
        let (mut app, _cmd_rx, ui_tx) = app();
        let ctx = egui::Context::default();
        ui_tx
            .send(UiEvent::Busy(BusyKind::Submitting))
            .expect("send");
        ui_tx
            .send(UiEvent::StateChanged {
                state: Box::new(EditorState {
                    error: Some("Please enter a name for your follow pack".to_string()),
                    ..EditorState::default()
                }),
                sync: FormSync::Keep,
            })
            .expect("send");
        app.process_ui_events(&ctx);

        let err = app.visible_error().expect("error shown");
        assert_eq!(err.category(), UiErrorCategory::Validation);
        assert_eq!(err.context(), UiErrorContext::Publish);
        assert!(app.controls_enabled());
    }

    #[test]
    fn startup_failure_disables_controls() {
        let (mut app, _cmd_rx, ui_tx) = app();
        let ctx = egui::Context::default();
        ui_tx
            .send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                "backend worker startup failure: invalid service url",
            )))
            .expect("send");
        app.process_ui_events(&ctx);

        assert!(!app.controls_enabled());
        assert!(app.visible_error().is_some());
    }

    #[test]
    fn cover_preview_is_requested_once_per_url() {
        let (mut app, cmd_rx, _ui_tx) = app();
        app.cover_image_url = " https://img.example/cover.png ".to_string();
        app.request_cover_preview();
        app.request_cover_preview();

        let fetches: Vec<_> = cmd_rx
            .try_iter()
            .filter_map(|cmd| match cmd {
                BackendCommand::FetchCover { url } => Some(url),
                _ => None,
            })
            .collect();
        assert_eq!(fetches, vec!["https://img.example/cover.png".to_string()]);

        app.cover_image_url = "not a url".to_string();
        app.request_cover_preview();
        assert!(app.cover.url().is_none());
    }

    #[test]
    fn persisted_settings_tolerate_missing_fields() {
        let settings: PersistedDesktopSettings = serde_json::from_str("{}").expect("parse");
        assert!(settings.recent_packs.is_empty());
    }
}
