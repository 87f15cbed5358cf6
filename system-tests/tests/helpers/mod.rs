// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for roster system-tests.
// Purpose: Provide the API server harness, readiness probes, and artifacts.
// Dependencies: roster-api, roster-config, serde, tokio
// ============================================================================

//! ## Overview
//! Shared helpers for roster system-tests. Servers run in-process on
//! ephemeral loopback ports; teardown is explicit so suites control restart
//! ordering.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod harness;
