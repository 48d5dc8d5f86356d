//! # jobboard-client
//!
//! Native client for the job-board API: bearer-token session handling,
//! a route guard, the cached statistics dashboard, and chart theming.
//!
//! The `JobBoardApi` trait is the network seam; `App` wires the HTTP
//! implementation, storage backends, and stores together once at startup.

pub mod app;
pub mod config;
pub mod net;
pub mod services;
pub mod state;
pub mod storage;
pub mod util;
