//! Core resolution and generation logic
//!
//! This module contains the configuration engine. It performs no I/O;
//! discovery and file writing belong in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`properties`] - Layered key/value property trees
//! - [`catalog`] - Versioned name catalogs and loose version ordering
//! - [`package`] - Vendor packages, toolchains, and the environment root
//! - [`platform`] - Platforms, boards, and menu handling
//! - [`library`] - Libraries and pool-priority resolution
//! - [`project`] - Project manifest and per-project records
//! - [`configuration`] - Board + project configuration resolution
//! - [`expand`] - Recipe template expansion
//! - [`plan`] - Build plan generation
//! - [`makefile`] - Makefile rendering
//! - [`version`] - Engine version gating

pub mod catalog;
pub mod configuration;
pub mod expand;
pub mod library;
pub mod makefile;
pub mod package;
pub mod plan;
pub mod platform;
pub mod project;
pub mod properties;
pub mod version;
