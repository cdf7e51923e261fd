//! Backend commands queued from UI to backend worker.

use client_core::FollowPackEditor;
use shared::domain::PublicKeyHex;

/// Text buffers owned by the UI, pushed to the editor before publishing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub name: String,
    pub cover_image_url: String,
    pub description: String,
}

impl FormFields {
    pub fn apply(self, editor: &mut FollowPackEditor) {
        editor.set_name(self.name);
        editor.set_cover_image_url(self.cover_image_url);
        editor.set_description(self.description);
    }
}

#[derive(Debug)]
pub enum BackendCommand {
    /// Route query of the editor page, e.g. `edit=<id>` or empty for a new pack.
    Open {
        query: String,
    },
    Search {
        query: String,
    },
    AddHit {
        pubkey: PublicKeyHex,
    },
    RemoveEntry {
        pubkey: PublicKeyHex,
    },
    MoveUp {
        index: usize,
    },
    MoveDown {
        index: usize,
    },
    Submit {
        fields: FormFields,
    },
    RequestDelete,
    CancelDelete,
    ConfirmDelete,
    DismissError,
    FetchCover {
        url: String,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Open { .. } => "open",
            BackendCommand::Search { .. } => "search",
            BackendCommand::AddHit { .. } => "add_hit",
            BackendCommand::RemoveEntry { .. } => "remove_entry",
            BackendCommand::MoveUp { .. } => "move_up",
            BackendCommand::MoveDown { .. } => "move_down",
            BackendCommand::Submit { .. } => "submit",
            BackendCommand::RequestDelete => "request_delete",
            BackendCommand::CancelDelete => "cancel_delete",
            BackendCommand::ConfirmDelete => "confirm_delete",
            BackendCommand::DismissError => "dismiss_error",
            BackendCommand::FetchCover { .. } => "fetch_cover",
        }
    }
}
