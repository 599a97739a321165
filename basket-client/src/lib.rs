//! Client-side synchronization for Basket shopping lists.
//!
//! Owns the network edge of the system: a [`RestClient`] speaking the
//! Persistence API, a [`ListStore`] applying domain mutations optimistically
//! and compensating on failure, and the TOML [`ClientConfig`] that wires them
//! together. All domain rules live in `basket-core`; nothing in this crate
//! recomputes prices or lifecycle state on its own.

pub mod api_client;
pub mod config;
pub mod error;
pub mod state;
pub mod types;

pub use api_client::{PersistenceApi, RestClient};
pub use config::{AuthConfig, ClientConfig, ConfigError};
pub use error::{ApiClientError, SyncError};
pub use state::{ListEntry, ListStore};
pub use types::{
    AddItemRequest, ApiErrorBody, CompleteListRequest, CompleteListResponse, CreateListRequest,
    CreateStoreRequest, DuplicateListRequest, ItemResponse, ListDetailResponse, ListResponse,
    PatchItemRequest, StoreResponse, SuggestionsResponse,
};
