//! Infrastructure layer
//!
//! All filesystem access lives here: walking the packages root into an
//! [`crate::core::package::Environment`] and enumerating source trees.
//! The core modules only ever see the parsed results.

pub mod discovery;
pub mod sources;
