//! Data exchanged with the mock-server management API.
//!
//! - Route definitions, drafts and partial updates
//! - Listing pages and query parameters
//! - Health snapshots

pub mod health;
pub mod route;

pub use health::HealthSnapshot;
pub use route::{
    BatchOperation, BatchRequest, HttpMethod, ListQuery, MessageResponse, MutationResponse,
    Route, RouteDraft, RouteMethod, RoutePage, RouteUpdate,
};
