//! Paginated list controller shared by every resource view.
//!
//! The controller owns the cached collection, the add and edit drafts and the
//! current page. Every mutation is followed by a full refetch; nothing is merged
//! locally. Errors are reported through the [`Notifier`] and never escape, except
//! that a rejected token ends the session through the [`SessionGuard`].

use std::sync::Arc;

use serde_json::Value;
use shared::{
    domain::{Fields, LookupEntry, LookupId, NoticeKind, Resource, ResourceId},
    error::ClientError,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    client::ResourceClient,
    guard::SessionGuard,
    notify::{ConfirmationGate, Notifier},
    pagination::{self, PageSlice, PaginationState},
    schema::ResourceSchema,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Loading,
    Ready,
    LoadError,
    /// Terminal: the session ended while this controller was live.
    SignedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditSelection {
    NoSelection,
    Editing { original: Resource, draft: Fields },
}

impl EditSelection {
    pub fn id(&self) -> Option<ResourceId> {
        match self {
            EditSelection::NoSelection => None,
            EditSelection::Editing { original, .. } => Some(original.id),
        }
    }

    pub fn draft(&self) -> Option<&Fields> {
        match self {
            EditSelection::NoSelection => None,
            EditSelection::Editing { draft, .. } => Some(draft),
        }
    }
}

/// What an intent amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Failed(ClientError),
    /// The user dismissed the confirmation.
    Cancelled,
    /// Nothing to submit.
    Skipped,
    SignedOut,
}

#[derive(Clone, Copy)]
enum Operation {
    Fetch,
    Add,
    Update,
    Delete,
    Lookup,
}

/// Everything an intent may change. Locked only between awaits.
struct ListState {
    state: ControllerState,
    collection: Vec<Resource>,
    pagination: PaginationState,
    add_draft: Fields,
    edit: EditSelection,
    lookup: Vec<LookupEntry>,
}

/// Shared by every task of a view: intents take `&self`, and no lock is held
/// while a request is in flight, so drafts stay editable and a second mutation
/// may start before the first refresh lands. The last refresh to land wins.
pub struct ResourceListController {
    schema: ResourceSchema,
    client: Arc<dyn ResourceClient>,
    notifier: Arc<dyn Notifier>,
    confirmation: Arc<dyn ConfirmationGate>,
    session_guard: Arc<dyn SessionGuard>,
    inner: Mutex<ListState>,
}

impl ResourceListController {
    pub fn new(
        schema: ResourceSchema,
        client: Arc<dyn ResourceClient>,
        notifier: Arc<dyn Notifier>,
        confirmation: Arc<dyn ConfirmationGate>,
        session_guard: Arc<dyn SessionGuard>,
    ) -> Self {
        let add_draft = schema.default_draft();
        Self {
            schema,
            client,
            notifier,
            confirmation,
            session_guard,
            inner: Mutex::new(ListState {
                state: ControllerState::Idle,
                collection: Vec::new(),
                pagination: PaginationState::default(),
                add_draft,
                edit: EditSelection::NoSelection,
                lookup: Vec::new(),
            }),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.inner.get_mut().pagination = PaginationState::with_page_size(page_size);
        self
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    pub async fn state(&self) -> ControllerState {
        self.inner.lock().await.state
    }

    pub async fn is_signed_out(&self) -> bool {
        self.state().await == ControllerState::SignedOut
    }

    pub async fn collection(&self) -> Vec<Resource> {
        self.inner.lock().await.collection.clone()
    }

    pub async fn current_page(&self) -> usize {
        self.inner.lock().await.pagination.current_page
    }

    pub async fn page(&self) -> PageSlice<Resource> {
        let inner = self.inner.lock().await;
        pagination::slice(
            &inner.collection,
            inner.pagination.page_size,
            inner.pagination.current_page,
        )
    }

    pub async fn add_draft(&self) -> Fields {
        self.inner.lock().await.add_draft.clone()
    }

    pub async fn edit_selection(&self) -> EditSelection {
        self.inner.lock().await.edit.clone()
    }

    pub async fn lookup_entries(&self) -> Vec<LookupEntry> {
        self.inner.lock().await.lookup.clone()
    }

    pub async fn lookup_label(&self, id: LookupId) -> Option<String> {
        self.inner
            .lock()
            .await
            .lookup
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.name.clone())
    }

    /// Initial load: the collection, then the lookup table.
    pub async fn mount(&self) -> Outcome {
        let outcome = self.refresh().await;
        if outcome != Outcome::SignedOut {
            self.load_lookup().await;
        }
        outcome
    }

    /// Refetches the whole collection and replaces the local copy.
    pub async fn refresh(&self) -> Outcome {
        {
            let mut inner = self.inner.lock().await;
            if inner.state == ControllerState::SignedOut {
                return Outcome::SignedOut;
            }
            inner.state = ControllerState::Loading;
        }
        debug!(resource = %self.schema.plural, "loading collection");

        match self.client.list().await {
            Ok(records) => {
                let count = records.len();
                let committed = self
                    .commit(|inner| {
                        inner.collection = records;
                        inner.pagination.clamp_to(inner.collection.len());
                        inner.state = ControllerState::Ready;
                    })
                    .await;
                if committed.is_none() {
                    return Outcome::SignedOut;
                }
                info!(resource = %self.schema.plural, count, "collection loaded");
                Outcome::Applied
            }
            Err(err) => {
                let outcome = self.fail(Operation::Fetch, err).await;
                if matches!(outcome, Outcome::Failed(_)) {
                    let mut inner = self.inner.lock().await;
                    if inner.state != ControllerState::SignedOut {
                        inner.state = ControllerState::LoadError;
                    }
                }
                outcome
            }
        }
    }

    async fn load_lookup(&self) {
        match self.client.lookup().await {
            Ok(entries) => {
                self.commit(|inner| inner.lookup = entries).await;
            }
            Err(err) => {
                self.fail(Operation::Lookup, err).await;
            }
        }
    }

    /// Moves to page `page`, clamped into the valid range. No network traffic.
    pub async fn change_page(&self, page: usize) -> PageSlice<Resource> {
        let mut inner = self.inner.lock().await;
        let slice = pagination::slice(&inner.collection, inner.pagination.page_size, page);
        inner.pagination.current_page = slice.effective_page;
        slice
    }

    pub async fn update_add_draft(&self, field: impl Into<String>, value: Value) {
        self.inner
            .lock()
            .await
            .add_draft
            .insert(field.into(), value);
    }

    pub async fn submit_add(&self) -> Outcome {
        let draft = {
            let inner = self.inner.lock().await;
            if inner.state == ControllerState::SignedOut {
                return Outcome::SignedOut;
            }
            inner.add_draft.clone()
        };
        match self.client.create(&draft).await {
            Ok(created) => {
                let defaults = self.schema.default_draft();
                if self
                    .commit(|inner| inner.add_draft = defaults)
                    .await
                    .is_none()
                {
                    return Outcome::SignedOut;
                }
                info!(resource = %self.schema.plural, id = ?created.map(|r| r.id), "record created");
                self.notify_success(
                    "Success",
                    &format!("{} has been added successfully", self.schema.singular),
                );
                self.refresh_after_mutation().await
            }
            Err(err) => self.fail(Operation::Add, err).await,
        }
    }

    /// Opens `resource` for editing, replacing any edit already in progress.
    pub async fn begin_edit(&self, resource: &Resource) {
        self.inner.lock().await.edit = EditSelection::Editing {
            original: resource.clone(),
            draft: resource.fields.clone(),
        };
    }

    /// Opens the cached record with `id` for editing; false when it is not loaded.
    pub async fn begin_edit_by_id(&self, id: ResourceId) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(resource) = inner.collection.iter().find(|r| r.id == id).cloned() else {
            return false;
        };
        inner.edit = EditSelection::Editing {
            draft: resource.fields.clone(),
            original: resource,
        };
        true
    }

    /// Returns false when no record is under edit.
    pub async fn update_edit_draft(&self, field: impl Into<String>, value: Value) -> bool {
        match &mut self.inner.lock().await.edit {
            EditSelection::NoSelection => false,
            EditSelection::Editing { draft, .. } => {
                draft.insert(field.into(), value);
                true
            }
        }
    }

    pub async fn cancel_edit(&self) {
        self.inner.lock().await.edit = EditSelection::NoSelection;
    }

    pub async fn submit_edit(&self) -> Outcome {
        let (id, draft) = {
            let inner = self.inner.lock().await;
            if inner.state == ControllerState::SignedOut {
                return Outcome::SignedOut;
            }
            match &inner.edit {
                EditSelection::NoSelection => return Outcome::Skipped,
                EditSelection::Editing { original, draft } => (original.id, draft.clone()),
            }
        };
        match self.client.update(id, &draft).await {
            Ok(_) => {
                // A different record may have been opened meanwhile; that edit stays.
                let committed = self
                    .commit(|inner| {
                        if inner.edit.id() == Some(id) {
                            inner.edit = EditSelection::NoSelection;
                        }
                    })
                    .await;
                if committed.is_none() {
                    return Outcome::SignedOut;
                }
                info!(resource = %self.schema.plural, %id, "record updated");
                self.notify_success(
                    "Success",
                    &format!("{} has been updated successfully", self.schema.singular),
                );
                self.refresh_after_mutation().await
            }
            Err(err) => self.fail(Operation::Update, err).await,
        }
    }

    pub async fn request_delete(&self, id: ResourceId) -> Outcome {
        if self.is_signed_out().await {
            return Outcome::SignedOut;
        }
        let confirmed = self
            .confirmation
            .confirm("Are you sure?", "You won't be able to revert this")
            .await;
        if !confirmed {
            debug!(resource = %self.schema.plural, %id, "delete dismissed");
            return Outcome::Cancelled;
        }
        if self.commit(|_| ()).await.is_none() {
            return Outcome::SignedOut;
        }

        match self.client.remove(id).await {
            Ok(()) => {
                if self.commit(|_| ()).await.is_none() {
                    return Outcome::SignedOut;
                }
                info!(resource = %self.schema.plural, %id, "record deleted");
                self.notify_success(
                    "Deleted!",
                    &format!("{} has been deleted successfully", self.schema.singular),
                );
                self.refresh_after_mutation().await
            }
            Err(err) => self.fail(Operation::Delete, err).await,
        }
    }

    /// The mutation itself already succeeded; only a session loss changes the outcome.
    async fn refresh_after_mutation(&self) -> Outcome {
        match self.refresh().await {
            Outcome::SignedOut => Outcome::SignedOut,
            _ => Outcome::Applied,
        }
    }

    /// Applies a response unless the session ended while it was in flight, in
    /// which case the response is dropped and the controller goes terminal.
    async fn commit<R>(&self, apply: impl FnOnce(&mut ListState) -> R) -> Option<R> {
        let active = self.session_guard.is_active().await;
        let mut inner = self.inner.lock().await;
        if !active {
            debug!(resource = %self.schema.plural, "discarding response for ended session");
            inner.state = ControllerState::SignedOut;
            return None;
        }
        if inner.state == ControllerState::SignedOut {
            return None;
        }
        Some(apply(&mut inner))
    }

    async fn fail(&self, operation: Operation, err: ClientError) -> Outcome {
        if err == ClientError::MissingToken {
            self.inner.lock().await.state = ControllerState::SignedOut;
            return Outcome::SignedOut;
        }
        // Only the first 401 to land while the session is live reaches the guard.
        let expired = err == ClientError::AuthExpired;
        let committed = self
            .commit(|inner| {
                if expired {
                    inner.state = ControllerState::SignedOut;
                }
            })
            .await;
        if committed.is_none() {
            return Outcome::SignedOut;
        }

        match err {
            ClientError::AuthExpired => {
                warn!(resource = %self.schema.plural, "token rejected, ending session");
                self.session_guard.on_unauthorized().await;
                Outcome::SignedOut
            }
            err => {
                warn!(resource = %self.schema.plural, error = %err, "request failed");
                let message = self.failure_message(operation, &err);
                self.notifier.show(NoticeKind::Error, "Error", &message);
                Outcome::Failed(err)
            }
        }
    }

    fn failure_message(&self, operation: Operation, err: &ClientError) -> String {
        let noun = self.schema.singular.to_lowercase();
        let plural = &self.schema.plural;
        match (operation, err) {
            (Operation::Fetch, ClientError::TransportFailure(_)) => {
                format!("An error occurred during fetching {plural}.")
            }
            (Operation::Fetch, _) => {
                format!("Failed to fetch {plural}. Please check the API.")
            }
            (Operation::Lookup, _) => "An error occurred during fetching lookup data.".into(),
            (_, ClientError::TransportFailure(detail)) => detail.clone(),
            (Operation::Add, _) => format!("Failed to add {noun}. Please try again later."),
            (Operation::Update, _) => format!("Failed to update {noun}. Please try again later."),
            (Operation::Delete, _) => format!("Failed to delete {noun}. Please try again later."),
        }
    }

    fn notify_success(&self, title: &str, message: &str) {
        self.notifier.show(NoticeKind::Success, title, message);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
