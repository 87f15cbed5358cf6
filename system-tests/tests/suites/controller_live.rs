// system-tests/tests/suites/controller_live.rs
// ============================================================================
// Module: Controller Live Tests
// Description: View-controller flows driven against live roster servers.
// Purpose: Ensure the client state machine holds over a real HTTP gateway.
// Dependencies: system-tests helpers
// ============================================================================

//! Controller-over-HTTP system tests.

use helpers::artifacts::TestReporter;
use helpers::harness::ApiServerHandle;
use helpers::harness::allocate_bind_addr;
use helpers::harness::memory_config;
use helpers::harness::spawn_api_server;
use helpers::harness::wait_for_api_ready;
use roster_client::DeletePrompt;
use roster_client::FormState;
use roster_client::GatewayConfig;
use roster_client::HttpRecordGateway;
use roster_client::RecordGateway;
use roster_client::ViewController;
use roster_core::UserDraft;
use roster_core::UserRecord;

use crate::helpers;

/// Prompt that always confirms deletion.
struct AlwaysConfirm;

impl DeletePrompt for AlwaysConfirm {
    fn confirm_delete(&self, _record: &UserRecord) -> bool {
        true
    }
}

/// Prompt that always declines deletion.
struct AlwaysDecline;

impl DeletePrompt for AlwaysDecline {
    fn confirm_delete(&self, _record: &UserRecord) -> bool {
        false
    }
}

/// Builds a gateway pointed at the spawned server.
fn live_gateway(base_url: &str) -> Result<HttpRecordGateway, Box<dyn std::error::Error>> {
    let mut config = GatewayConfig::for_endpoint(base_url.to_string());
    config.timeout = std::time::Duration::from_secs(5);
    Ok(HttpRecordGateway::new(&config)?)
}

/// Builds a user draft from parts.
fn draft(name: &str, email: &str, age: i64) -> UserDraft {
    UserDraft {
        name: name.to_string(),
        email: email.to_string(),
        age,
    }
}

/// Spawns an in-memory server and a controller bound to it.
async fn start_controller()
-> Result<(ApiServerHandle, ViewController<HttpRecordGateway>), Box<dyn std::error::Error>> {
    let bind = allocate_bind_addr()?.to_string();
    let server = spawn_api_server(memory_config(&bind)).await?;
    let probe = reqwest::Client::builder().timeout(std::time::Duration::from_secs(5)).build()?;
    wait_for_api_ready(&probe, server.base_url(), std::time::Duration::from_secs(5)).await?;
    let controller = ViewController::new(live_gateway(server.base_url())?);
    Ok((server, controller))
}

#[tokio::test(flavor = "multi_thread")]
async fn controller_crud_round_trip_against_a_live_server()
-> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("controller_crud_round_trip_against_a_live_server")?;
    let (server, mut controller) = start_controller().await?;

    controller.refresh().await;
    if let Some(error) = &controller.state().error {
        return Err(format!("initial refresh failed: {error}").into());
    }
    if !controller.state().records.is_empty() {
        return Err("expected an empty roster before any create".into());
    }

    controller.begin_create();
    controller.set_draft(draft("Ana", "ana@example.com", 30));
    controller.submit().await;
    if let Some(error) = &controller.state().error {
        return Err(format!("create submit failed: {error}").into());
    }
    if controller.state().form != FormState::Hidden {
        return Err("form stayed open after a successful create".into());
    }
    if controller.state().records.len() != 1 {
        return Err(format!("expected one record, got {}", controller.state().records.len()).into());
    }
    let record = controller.state().records[0].clone();
    if record.name != "Ana" {
        return Err(format!("unexpected record name: {}", record.name).into());
    }

    controller.begin_edit(record.id);
    controller.set_draft(draft("Ana Maria", "ana@example.com", 31));
    controller.submit().await;
    if let Some(error) = &controller.state().error {
        return Err(format!("edit submit failed: {error}").into());
    }
    let updated = controller.state().records[0].clone();
    if updated.name != "Ana Maria" || updated.age != 31 {
        return Err(format!("edit did not persist: {} aged {}", updated.name, updated.age).into());
    }
    if updated.created_at != record.created_at {
        return Err("createdAt drifted across the edit".into());
    }

    controller.delete(record.id, &AlwaysConfirm).await;
    if let Some(error) = &controller.state().error {
        return Err(format!("confirmed delete failed: {error}").into());
    }
    if !controller.state().records.is_empty() {
        return Err("roster still lists the deleted record".into());
    }

    reporter.finish(
        "pass",
        vec!["controller created, edited, and deleted over a live gateway".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn wire_errors_surface_verbatim_in_controller_state()
-> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("wire_errors_surface_verbatim_in_controller_state")?;
    let (server, mut controller) = start_controller().await?;

    controller.begin_create();
    controller.set_draft(draft("Ana", "ana@example.com", 30));
    controller.submit().await;
    if let Some(error) = &controller.state().error {
        return Err(format!("seed create failed: {error}").into());
    }

    controller.begin_create();
    controller.set_draft(draft("Imposter", "ana@example.com", 44));
    controller.submit().await;
    if controller.state().error.as_deref() != Some("Email already registered") {
        return Err(format!("expected the wire message, got {:?}", controller.state().error).into());
    }
    let FormState::Creating { draft: kept } = controller.state().form.clone() else {
        return Err("form closed after a rejected submit".into());
    };
    if kept.email != "ana@example.com" {
        return Err(format!("draft was not preserved: {}", kept.email).into());
    }
    if controller.state().records.len() != 1 {
        return Err("rejected create altered the cached roster".into());
    }

    reporter.finish(
        "pass",
        vec!["duplicate-email rejection surfaced verbatim with the form open".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn declined_delete_confirmation_changes_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("declined_delete_confirmation_changes_nothing")?;
    let (server, mut controller) = start_controller().await?;

    controller.begin_create();
    controller.set_draft(draft("Ana", "ana@example.com", 30));
    controller.submit().await;
    if let Some(error) = &controller.state().error {
        return Err(format!("seed create failed: {error}").into());
    }
    let id = controller.state().records[0].id;

    controller.delete(id, &AlwaysDecline).await;
    if let Some(error) = &controller.state().error {
        return Err(format!("declined delete reported an error: {error}").into());
    }
    if controller.state().records.len() != 1 {
        return Err("declined delete dropped the cached record".into());
    }

    let probe = live_gateway(server.base_url())?;
    let fetched = probe.get(id).await?;
    if fetched.name != "Ana" {
        return Err(format!("server-side record changed: {}", fetched.name).into());
    }

    reporter.finish(
        "pass",
        vec!["declined confirmation left client and server state untouched".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn stale_records_survive_a_lost_server() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("stale_records_survive_a_lost_server")?;
    let (server, mut controller) = start_controller().await?;

    controller.begin_create();
    controller.set_draft(draft("Ana", "ana@example.com", 30));
    controller.submit().await;
    if let Some(error) = &controller.state().error {
        return Err(format!("seed create failed: {error}").into());
    }
    if controller.state().records.len() != 1 {
        return Err("expected one cached record before the outage".into());
    }

    server.shutdown().await;

    controller.refresh().await;
    if controller.state().error.is_none() {
        return Err("refresh against a dead server reported no error".into());
    }
    if controller.state().records.len() != 1 {
        return Err("stale roster was discarded on a failed refresh".into());
    }
    if controller.state().records[0].name != "Ana" {
        return Err("stale roster no longer matches the last good fetch".into());
    }

    reporter.finish(
        "pass",
        vec!["failed refresh kept the stale roster and surfaced an error".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn local_validation_never_reaches_the_wire() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("local_validation_never_reaches_the_wire")?;
    let (server, mut controller) = start_controller().await?;

    controller.begin_create();
    controller.set_draft(draft("Ana", "", 30));
    controller.submit().await;
    if controller.state().error.as_deref() != Some("name, email and age are required") {
        return Err(
            format!("expected the local message, got {:?}", controller.state().error).into(),
        );
    }
    if controller.state().form == FormState::Hidden {
        return Err("form closed after a locally rejected submit".into());
    }

    let probe = live_gateway(server.base_url())?;
    let listed = probe.list().await?;
    if !listed.is_empty() {
        return Err(format!("incomplete draft reached the server: {} records", listed.len()).into());
    }

    reporter.finish(
        "pass",
        vec!["incomplete draft rejected locally with no server write".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    server.shutdown().await;
    Ok(())
}
