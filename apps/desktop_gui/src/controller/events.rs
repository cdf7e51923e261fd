//! UI/backend events and error modeling for desktop GUI controller.

use client_core::EditorState;
use shared::domain::Route;

use crate::ui::app::PreviewImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyKind {
    Loading,
    Searching,
    Submitting,
    Deleting,
}

impl BusyKind {
    pub fn label(self) -> &'static str {
        match self {
            BusyKind::Loading => "Loading follow pack...",
            BusyKind::Searching => "Searching...",
            BusyKind::Submitting => "Publishing follow pack...",
            BusyKind::Deleting => "Deleting follow pack...",
        }
    }

    pub fn context(self) -> UiErrorContext {
        match self {
            BusyKind::Loading => UiErrorContext::Load,
            BusyKind::Searching => UiErrorContext::Search,
            BusyKind::Submitting => UiErrorContext::Publish,
            BusyKind::Deleting => UiErrorContext::Delete,
        }
    }
}

/// Which UI text buffers a fresh editor snapshot overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSync {
    Keep,
    SearchBox,
    All,
}

pub enum UiEvent {
    Info(String),
    Busy(BusyKind),
    StateChanged {
        state: Box<EditorState>,
        sync: FormSync,
    },
    Navigated(Route),
    CoverLoaded {
        url: String,
        image: PreviewImage,
    },
    CoverFailed {
        url: String,
        reason: String,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    NotFound,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Load,
    Search,
    Publish,
    Delete,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("logged in")
            || message_lower.contains("your own")
            || message_lower.contains("401")
            || message_lower.contains("403")
            || message_lower.contains("unauthorized")
            || message_lower.contains("forbidden")
        {
            UiErrorCategory::Auth
        } else if message_lower.contains("not found") || message_lower.contains("not listed") {
            UiErrorCategory::NotFound
        } else if message_lower.contains("invalid")
            || message_lower.contains("please enter")
            || message_lower.contains("at least one")
            || message_lower.contains("malformed")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("error sending request")
            || message_lower.contains("network")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Retrying the same action cannot succeed without the user changing something.
    pub fn is_user_fixable(&self) -> bool {
        matches!(
            self.category,
            UiErrorCategory::Auth | UiErrorCategory::Validation | UiErrorCategory::NotFound
        )
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_editor_messages() {
        let cases = [
            ("You must be logged in to publish a follow pack", UiErrorCategory::Auth),
            ("You can only edit your own follow packs", UiErrorCategory::Auth),
            ("Follow pack not found", UiErrorCategory::NotFound),
            ("bob is not listed in example.com's nostr.json", UiErrorCategory::NotFound),
            ("Please enter a name for your follow pack", UiErrorCategory::Validation),
            ("Add at least one person to your follow pack", UiErrorCategory::Validation),
            ("Invalid npub: npub1bad", UiErrorCategory::Validation),
            (
                "Search failed: error sending request for url (http://127.0.0.1:8787/search)",
                UiErrorCategory::Transport,
            ),
            ("Failed to publish follow pack", UiErrorCategory::Unknown),
        ];
        for (message, expected) in cases {
            let err = UiError::from_message(UiErrorContext::General, message);
            assert_eq!(err.category(), expected, "{message}");
            assert_eq!(err.message(), message);
        }
    }

    #[test]
    fn classifies_backend_command_processor_disconnect_as_transport_error() {
        let err = UiError::from_message(
            UiErrorContext::General,
            "Backend command processor disconnected (possible startup/runtime failure)",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
        assert!(!err.is_user_fixable());
    }

    #[test]
    fn busy_kinds_map_to_error_contexts() {
        assert_eq!(BusyKind::Submitting.context(), UiErrorContext::Publish);
        assert_eq!(BusyKind::Deleting.context(), UiErrorContext::Delete);
        assert_eq!(BusyKind::Loading.context(), UiErrorContext::Load);
    }
}
