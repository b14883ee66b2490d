//! HTTP adapter for the marketplace listing and media endpoints.

mod gateway;

pub use gateway::{GatewayBuildError, HttpGateway};
