//! Follow pack editor: form state plus the async handlers behind each form action.
//!
//! Every handler clears the visible error when it starts and stores any failure
//! as the single visible error string. Nothing propagates to the caller; the
//! return values only tell the shell where to navigate or what happened.

use std::sync::Arc;

use shared::{
    domain::{
        FollowList, FollowListEntry, FollowListId, ProfileMetadata, PublicKeyHex, Route, SearchHit,
    },
    protocol::PublishFollowListRequest,
};
use tracing::{error, info, warn};

use crate::{
    config::Settings,
    error::EditorError,
    nip05::{HttpNip05Resolver, Nip05Resolver},
    pack_service::PackServiceClient,
    query::IdentityQuery,
    session::StaticSession,
    FollowListService, ProfileDirectory, SessionStore, UserSearch,
};

const EDIT_QUERY_PARAM: &str = "edit";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorMode {
    #[default]
    Create,
    Edit {
        id: FollowListId,
        author: PublicKeyHex,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    pub mode: EditorMode,
    pub name: String,
    pub cover_image_url: String,
    pub description: String,
    pub entries: Vec<FollowListEntry>,
    pub search_query: String,
    pub search_results: Vec<SearchHit>,
    pub searching: bool,
    pub submitting: bool,
    pub deleting: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub show_delete_confirm: bool,
}

impl EditorState {
    pub fn is_edit(&self) -> bool {
        matches!(self.mode, EditorMode::Edit { .. })
    }

    pub fn editing_id(&self) -> Option<&FollowListId> {
        match &self.mode {
            EditorMode::Edit { id, .. } => Some(id),
            EditorMode::Create => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.searching || self.submitting || self.deleting || self.loading
    }

    pub fn contains(&self, pubkey: &PublicKeyHex) -> bool {
        self.entries.iter().any(|entry| &entry.pubkey == pubkey)
    }
}

#[derive(Clone)]
pub struct EditorServices {
    pub search: Arc<dyn UserSearch>,
    pub profiles: Arc<dyn ProfileDirectory>,
    pub lists: Arc<dyn FollowListService>,
    pub session: Arc<dyn SessionStore>,
    pub nip05: Arc<dyn Nip05Resolver>,
    pub search_limit: usize,
}

impl EditorServices {
    /// Gateway-backed services for the configured service url and session.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let gateway = Arc::new(PackServiceClient::new(
            &settings.service_url,
            settings.request_timeout(),
        )?);
        let session = StaticSession::from_identity(settings.session_identity.as_deref())?;
        let nip05 = HttpNip05Resolver::new(settings.request_timeout())?
            .with_scheme(settings.nip05_scheme.clone());

        Ok(Self {
            search: gateway.clone(),
            profiles: gateway.clone(),
            lists: gateway,
            session: Arc::new(session),
            nip05: Arc::new(nip05),
            search_limit: settings.search_limit,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    Stay,
    Navigate(Route),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Cleared,
    Added(PublicKeyHex),
    AlreadyPresent(PublicKeyHex),
    Results(usize),
    Failed,
}

/// `edit=<id>` from a page query string such as `edit=abc&ref=home`.
pub fn edit_id_from_query(query: &str) -> Option<FollowListId> {
    let query = query.trim().trim_start_matches('?');
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key.as_ref() == EDIT_QUERY_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(FollowListId)
}

fn enrich(mut entry: FollowListEntry, profile: ProfileMetadata) -> FollowListEntry {
    entry.name = profile.name.or(entry.name);
    entry.picture = profile.picture.or(entry.picture);
    entry.bio = profile.bio.or(entry.bio);
    entry.nip05 = profile.nip05.or(entry.nip05);
    entry
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub struct FollowPackEditor {
    services: EditorServices,
    state: EditorState,
}

impl FollowPackEditor {
    pub fn new(services: EditorServices) -> Self {
        Self {
            services,
            state: EditorState::default(),
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn snapshot(&self) -> EditorState {
        self.state.clone()
    }

    fn fail(&mut self, err: EditorError) {
        if err.is_user_error() {
            warn!(error = %err, "follow pack editor action rejected");
        } else {
            error!(error = %err, "follow pack editor action failed");
        }
        self.state.error = Some(err.to_string());
    }

    pub fn clear_error(&mut self) {
        self.state.error = None;
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.state.name = value.into();
    }

    pub fn set_cover_image_url(&mut self, value: impl Into<String>) {
        self.state.cover_image_url = value.into();
    }

    pub fn set_description(&mut self, value: impl Into<String>) {
        self.state.description = value.into();
    }

    pub fn set_search_query(&mut self, value: impl Into<String>) {
        self.state.search_query = value.into();
    }

    /// Opens the page for a route query: `edit=<id>` loads that list, anything else starts a new one.
    pub async fn open(&mut self, query: &str) -> bool {
        match edit_id_from_query(query) {
            Some(id) => self.load_for_edit(&id).await,
            None => {
                self.state = EditorState::default();
                true
            }
        }
    }

    pub async fn load_for_edit(&mut self, id: &FollowListId) -> bool {
        info!(id = %id, "editor: load_for_edit");
        self.state = EditorState {
            loading: true,
            ..EditorState::default()
        };

        let result = self.fetch_owned_list(id).await;
        self.state.loading = false;

        match result {
            Ok(list) => {
                self.populate(list);
                true
            }
            Err(err) => {
                self.fail(err);
                false
            }
        }
    }

    async fn fetch_owned_list(&self, id: &FollowListId) -> Result<FollowList, EditorError> {
        let user = self
            .services
            .session
            .current_user()
            .ok_or(EditorError::NotLoggedInForEdit)?;

        let list = self
            .services
            .lists
            .get_follow_list_by_id(id)
            .await
            .map_err(|err| EditorError::Load(format!("{err:#}")))?
            .ok_or(EditorError::NotFound)?;

        if list.author != user {
            return Err(EditorError::NotAuthor);
        }
        Ok(list)
    }

    fn populate(&mut self, list: FollowList) {
        self.state.mode = EditorMode::Edit {
            id: list.id,
            author: list.author,
        };
        self.state.name = list.name;
        self.state.cover_image_url = list.cover_image_url.unwrap_or_default();
        self.state.description = list.description.unwrap_or_default();
        self.state.entries.clear();
        for entry in list.entries {
            if !self.state.contains(&entry.pubkey) {
                self.state.entries.push(entry);
            }
        }
    }

    /// Acts on the search box: adds keys and NIP-05 identifiers directly, runs a
    /// people search for anything else.
    pub async fn search(&mut self) -> SearchOutcome {
        self.state.error = None;
        let query = match IdentityQuery::classify(&self.state.search_query) {
            Ok(query) => query,
            Err(err) => {
                self.fail(err);
                return SearchOutcome::Failed;
            }
        };

        match query {
            IdentityQuery::Empty => {
                self.state.search_results.clear();
                SearchOutcome::Cleared
            }
            IdentityQuery::PublicKey(pubkey) => self.add_direct(pubkey).await,
            IdentityQuery::Nip05(identifier) => {
                info!(identifier = %identifier, "editor: resolve nip-05");
                self.state.searching = true;
                let resolved = self.services.nip05.resolve(&identifier).await;
                self.state.searching = false;
                match resolved {
                    Ok(pubkey) => self.add_direct(pubkey).await,
                    Err(err) => {
                        self.fail(err.into());
                        SearchOutcome::Failed
                    }
                }
            }
            IdentityQuery::Search(text) => {
                info!(query = %text, "editor: search_users");
                self.state.searching = true;
                let hits = self
                    .services
                    .search
                    .search_users(&text, self.services.search_limit)
                    .await;
                self.state.searching = false;
                match hits {
                    Ok(hits) => {
                        let count = hits.len();
                        self.state.search_results = hits;
                        SearchOutcome::Results(count)
                    }
                    Err(err) => {
                        self.fail(EditorError::Search(format!("{err:#}")));
                        SearchOutcome::Failed
                    }
                }
            }
        }
    }

    async fn add_direct(&mut self, pubkey: PublicKeyHex) -> SearchOutcome {
        let added = self.add_entry(pubkey.clone()).await;
        self.state.search_query.clear();
        self.state.search_results.clear();
        if added {
            SearchOutcome::Added(pubkey)
        } else {
            SearchOutcome::AlreadyPresent(pubkey)
        }
    }

    /// Appends `pubkey` with whatever profile metadata is available. Returns
    /// `false` when it is already in the list.
    pub async fn add_entry(&mut self, pubkey: PublicKeyHex) -> bool {
        self.state.error = None;
        self.insert_enriched(FollowListEntry::new(pubkey)).await
    }

    /// Adds the search hit at `index` and drops it from the visible hits.
    pub async fn add_hit(&mut self, index: usize) -> bool {
        self.state.error = None;
        if index >= self.state.search_results.len() {
            return false;
        }
        let hit = self.state.search_results.remove(index);
        self.insert_enriched(hit.into_entry()).await
    }

    async fn insert_enriched(&mut self, entry: FollowListEntry) -> bool {
        if self.state.contains(&entry.pubkey) {
            return false;
        }

        let entry = match self
            .services
            .profiles
            .get_profile_by_pubkey(&entry.pubkey)
            .await
        {
            Ok(profile) => enrich(entry, profile),
            Err(err) => {
                warn!(pubkey = %entry.pubkey, "profile lookup failed, adding without metadata: {err:#}");
                entry
            }
        };

        // The lookup awaited; re-check before inserting.
        if self.state.contains(&entry.pubkey) {
            return false;
        }
        info!(pubkey = %entry.pubkey, position = self.state.entries.len(), "editor: entry added");
        self.state.entries.push(entry);
        true
    }

    pub fn remove_entry(&mut self, index: usize) -> Option<FollowListEntry> {
        self.state.error = None;
        (index < self.state.entries.len()).then(|| self.state.entries.remove(index))
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        self.state.error = None;
        if index == 0 || index >= self.state.entries.len() {
            return false;
        }
        self.state.entries.swap(index - 1, index);
        true
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        self.state.error = None;
        let Some(next) = index.checked_add(1) else {
            return false;
        };
        if next >= self.state.entries.len() {
            return false;
        }
        self.state.entries.swap(index, next);
        true
    }

    /// Checks the form and returns the signed-in user it would publish as.
    pub fn validate(&self) -> Result<PublicKeyHex, EditorError> {
        let user = self
            .services
            .session
            .current_user()
            .ok_or(EditorError::NotLoggedInForPublish)?;
        if self.state.name.trim().is_empty() {
            return Err(EditorError::MissingName);
        }
        if self.state.entries.is_empty() {
            return Err(EditorError::NoEntries);
        }
        Ok(user)
    }

    fn publish_request(&self) -> Result<PublishFollowListRequest, EditorError> {
        let user = self.validate()?;
        let existing_id = match &self.state.mode {
            EditorMode::Create => None,
            EditorMode::Edit { id, author } => {
                if author != &user {
                    return Err(EditorError::NotAuthor);
                }
                Some(id.clone())
            }
        };

        Ok(PublishFollowListRequest {
            name: self.state.name.trim().to_string(),
            cover_image_url: self.state.cover_image_url.trim().to_string(),
            entries: self.state.entries.clone(),
            existing_id,
            description: non_empty(&self.state.description),
        })
    }

    pub async fn submit(&mut self) -> EditorOutcome {
        self.state.error = None;
        let request = match self.publish_request() {
            Ok(request) => request,
            Err(err) => {
                self.fail(err);
                return EditorOutcome::Stay;
            }
        };

        info!(
            name = %request.name,
            entries = request.entries.len(),
            edit = request.existing_id.is_some(),
            "editor: submit"
        );
        self.state.submitting = true;
        let result = self.services.lists.publish_follow_list(&request).await;
        self.state.submitting = false;

        match result {
            Ok(Some(id)) => {
                info!(id = %id, "editor: follow pack published");
                EditorOutcome::Navigate(Route::Pack(id))
            }
            Ok(None) => {
                self.fail(EditorError::PublishRejected);
                EditorOutcome::Stay
            }
            Err(err) => {
                self.fail(EditorError::Publish(format!("{err:#}")));
                EditorOutcome::Stay
            }
        }
    }

    pub fn request_delete(&mut self) {
        self.state.error = None;
        if self.state.is_edit() {
            self.state.show_delete_confirm = true;
        }
    }

    pub fn cancel_delete(&mut self) {
        self.state.error = None;
        self.state.show_delete_confirm = false;
    }

    pub async fn confirm_delete(&mut self) -> EditorOutcome {
        self.state.error = None;
        let Some(id) = self.state.editing_id().cloned() else {
            self.state.show_delete_confirm = false;
            return EditorOutcome::Stay;
        };

        info!(id = %id, "editor: confirm_delete");
        self.state.deleting = true;
        let result = self.services.lists.delete_follow_list(&id).await;
        self.state.deleting = false;
        self.state.show_delete_confirm = false;

        match result {
            Ok(true) => EditorOutcome::Navigate(Route::Home),
            Ok(false) => {
                self.fail(EditorError::DeleteRejected);
                EditorOutcome::Stay
            }
            Err(err) => {
                self.fail(EditorError::Delete(format!("{err:#}")));
                EditorOutcome::Stay
            }
        }
    }
}
