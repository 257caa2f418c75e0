//! Admin client for a mock HTTP server.
//!
//! The mock server owns a set of routes (path, methods, canned response) and
//! exposes a management API under `/_manage`. This library lists, pages,
//! filters, creates, edits, toggles and deletes those routes, and shows the
//! server's health, either from the terminal or through a small
//! server-rendered web panel.
//!
//! # Layout
//!
//! ```text
//!   CLI / shell / web panel
//!            │
//!     AdminController  ── state (pages, tabs, notices, debounced search)
//!            │         ── render (pure view tree → HTML or text)
//!        RouteApi      ── HttpRouteApi (reqwest) | MockRouteApi (in memory)
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`model`]: Routes, listing pages and health snapshots
//! - [`client`]: Management API clients and the API key store
//! - [`form`]: Route form parsing and validation
//! - [`state`]: Pagination, debouncing, tabs and notices
//! - [`render`]: View functions and their HTML/text serializers
//! - [`controller`]: The panel controller tying it all together
//! - [`shell`]: Interactive line-oriented front end
//! - [`web`]: Server-rendered web panel
//! - [`i18n`]: English and Chinese UI strings
//! - [`metrics`]: Request and mutation metrics

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod i18n;
pub mod metrics;
pub mod model;
pub mod render;
pub mod shell;
pub mod state;
pub mod web;

pub use config::Config;
pub use controller::{AdminController, ConfirmationToken};
pub use error::{AdminError, Result};
