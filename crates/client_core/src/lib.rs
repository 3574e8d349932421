//! Client-side core for token-authenticated resource views: the REST client,
//! pagination, user-feedback seams and the list controller that ties them together.

pub mod client;
pub mod controller;
pub mod guard;
pub mod notify;
pub mod pagination;
pub mod schema;
pub mod session;
pub mod settings;

pub use client::{HttpResourceClient, ResourceClient};
pub use controller::{ControllerState, EditSelection, Outcome, ResourceListController};
pub use guard::{SessionGuard, StoreSessionGuard};
pub use notify::{ConfirmationGate, Notifier, StaticConfirmation};
pub use pagination::{PageSlice, DEFAULT_PAGE_SIZE};
pub use schema::{EndpointSet, FieldSpec, ResourceKind, ResourceProfile, ResourceSchema};
pub use session::{
    restore_session, session_handle, FileTokenStore, MemoryTokenStore, Session, SessionHandle,
    TokenStore,
};
pub use settings::{load_settings, ClientSettings};
