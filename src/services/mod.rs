//! Services that sit between the network layer and the state stores.

pub mod auth;
pub mod guard;
