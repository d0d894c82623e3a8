//! Controllers for the 3D print showcase.
//!
//! Exposes the building blocks (config, context, error handling, the vote,
//! upload and viewer controllers) so integration tests and the binary
//! entrypoint can both access them.

pub mod config;
pub mod context;
pub mod error;
pub mod telemetry;
pub mod upload;
pub mod viewer;
pub mod vote;
