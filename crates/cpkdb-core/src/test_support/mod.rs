//! Shared fixtures and an in-memory backend for unit tests.

pub(crate) mod backend;
pub(crate) mod eval;
pub(crate) mod fixtures;
