//! In-memory provider implementations for tests.
//!
//! Compiled under `cfg(test)` or the `test-utils` feature.

pub mod api;
pub mod storage;

pub use api::MockAuthApi;
pub use storage::MemoryStorage;
