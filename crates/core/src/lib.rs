//! Domain logic for the 3D print showcase.
//!
//! Everything in this crate is pure: no I/O, no async runtime. The
//! controllers in `showcase-app` drive these types against a
//! persistence client.

pub mod demo;
pub mod error;
pub mod format;
pub mod navigation;
pub mod print;
pub mod types;
pub mod upload;
pub mod vote;
