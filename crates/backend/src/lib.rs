//! Persistence client for the managed backend (row store + object storage).
//!
//! Controllers receive an [`Arc<dyn PersistenceClient>`](PersistenceClient)
//! at construction. [`RestClient`] talks to the hosted service;
//! [`MemoryClient`] keeps everything in process for demo mode and tests.

pub mod client;
pub mod error;
pub mod memory;
pub mod rest;

pub use client::{PersistenceClient, StoredObject, TABLE_PRINTS, TABLE_UPVOTES};
pub use error::BackendError;
pub use memory::MemoryClient;
pub use rest::{RestClient, RestClientConfig};
