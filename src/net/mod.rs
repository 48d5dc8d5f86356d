//! Network layer: wire schemas and the REST client.

pub mod api;
pub mod types;
