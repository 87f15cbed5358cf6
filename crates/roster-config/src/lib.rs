// crates/roster-config/src/lib.rs
// ============================================================================
// Module: Roster Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for roster.toml semantics.
// Dependencies: roster-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `roster-config` defines the canonical configuration model for the Roster
//! service. It provides strict, fail-closed validation and a deterministic
//! example generator. Config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
