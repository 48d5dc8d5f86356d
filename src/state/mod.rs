//! Client-side state containers.
//!
//! DESIGN
//! ======
//! State is split by domain (`session`, `statistics`) so callers can depend
//! on small focused stores. Both are plain structs with interior locking,
//! shared through `Arc` and created once at startup.

pub mod session;
pub mod statistics;
