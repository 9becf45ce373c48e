//! Narrow seam between the advisor controllers and the backend.
//!
//! Every operation is an awaited boundary returning a result or a failure.
//! Implementations hold no state that the controllers depend on.

pub mod error;
pub mod http;
pub mod types;

use futures::future::BoxFuture;

pub use error::{GatewayError, GatewayResult};
pub use http::{GatewayConfig, HttpGateway, classify_ensure_response};
pub use types::{BackendAvailability, DeleteAllOutcome, HistoryEntry, User, backend_status};

pub trait RemoteDataGateway: Send + Sync {
    /// Full client list; no pagination.
    fn list_users<'a>(&'a self) -> BoxFuture<'a, GatewayResult<Vec<User>>>;

    fn fetch_history<'a>(&'a self, offset: usize)
    -> BoxFuture<'a, GatewayResult<Vec<HistoryEntry>>>;

    /// Expected failures come back as `ok: false`; `Err` means transport trouble.
    fn delete_all_history<'a>(&'a self) -> BoxFuture<'a, GatewayResult<DeleteAllOutcome>>;

    fn ensure_history<'a>(&'a self) -> BoxFuture<'a, GatewayResult<BackendAvailability>>;
}
