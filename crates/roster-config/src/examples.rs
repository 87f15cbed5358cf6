// crates/roster-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical examples for Roster configuration. Outputs are deterministic and
//! kept in sync with the configuration model.

/// Returns a canonical example `roster.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
bind = "127.0.0.1:3001"
max_body_bytes = 65536

[record_store]
type = "sqlite"
path = "roster.sqlite"
journal_mode = "wal"
sync_mode = "full"
busy_timeout_ms = 5000
# type = "memory" keeps records in process memory (tests and demos)

[audit]
enabled = true
# path = "roster-audit.log"
"#,
    )
}

// ============================================================================
// SECTION: Tests
// ============================================================================
