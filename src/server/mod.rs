//! HTTP server: host, builder, routes and exposures

pub mod builder;
pub mod exposure;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use exposure::{RestExposure, WebSocketExposure};
pub use host::ServerHost;
