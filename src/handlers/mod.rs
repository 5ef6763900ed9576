//! HTTP handlers, one module per resource
//!
//! Every module exposes `routes()`; [`crate::server::router::build_api_routes`]
//! nests them under `/api`.

pub mod accounts;
pub mod complaints;
pub mod houses;
pub mod messages;
pub mod payments;
pub mod rentals;
