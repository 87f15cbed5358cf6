// system-tests/src/lib.rs
// ============================================================================
// Module: Roster System Tests Library
// Description: Crate root for the end-to-end test binaries.
// Purpose: Anchor the system-tests package; all content lives in tests/.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The end-to-end suites in `system-tests/tests` spin up the real REST
//! server on an ephemeral loopback port and drive it over HTTP. This library
//! target is intentionally empty.
