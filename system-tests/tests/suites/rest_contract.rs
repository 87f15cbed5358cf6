// system-tests/tests/suites/rest_contract.rs
// ============================================================================
// Module: REST Contract Tests
// Description: End-to-end wire-contract validation for the roster API.
// Purpose: Ensure live servers honor the documented statuses and bodies.
// Dependencies: system-tests helpers
// ============================================================================

//! REST wire-contract system tests.

use helpers::artifacts::TestReporter;
use helpers::harness::ApiServerHandle;
use helpers::harness::allocate_bind_addr;
use helpers::harness::memory_config;
use helpers::harness::memory_config_with_body_limit;
use helpers::harness::spawn_api_server;
use helpers::harness::sqlite_config;
use helpers::harness::wait_for_api_ready;
use roster_core::Timestamp;
use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

use crate::helpers;

/// Builds a reqwest client with a bounded request timeout.
fn http_client() -> Result<reqwest::Client, Box<dyn std::error::Error>> {
    Ok(reqwest::Client::builder().timeout(std::time::Duration::from_secs(5)).build()?)
}

/// Spawns an in-memory API server and waits for readiness.
async fn start_memory_server()
-> Result<(reqwest::Client, ApiServerHandle), Box<dyn std::error::Error>> {
    let bind = allocate_bind_addr()?.to_string();
    let server = spawn_api_server(memory_config(&bind)).await?;
    let client = http_client()?;
    wait_for_api_ready(&client, server.base_url(), std::time::Duration::from_secs(5)).await?;
    Ok((client, server))
}

/// Creates a user and returns the decoded 201 body.
async fn create_user(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
    email: &str,
    age: i64,
) -> Result<Value, Box<dyn std::error::Error>> {
    let response = client
        .post(format!("{base_url}/api/users"))
        .json(&json!({ "name": name, "email": email, "age": age }))
        .send()
        .await?;
    if response.status().as_u16() != 201 {
        return Err(format!("expected 201 on create, got {}", response.status()).into());
    }
    Ok(response.json().await?)
}

/// Fetches the roster list and returns the decoded array.
async fn list_users(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
    let response = client.get(format!("{base_url}/api/users")).send().await?;
    if response.status().as_u16() != 200 {
        return Err(format!("expected 200 on list, got {}", response.status()).into());
    }
    Ok(response.json().await?)
}

#[tokio::test(flavor = "multi_thread")]
async fn create_assigns_the_first_id_and_a_server_timestamp()
-> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("create_assigns_the_first_id_and_a_server_timestamp")?;
    let (client, server) = start_memory_server().await?;

    let before = Timestamp::now().as_unix_millis();
    let body = create_user(&client, server.base_url(), "Ana", "ana@example.com", 30).await?;
    if body["id"] != 1 {
        return Err(format!("expected first id 1, got {}", body["id"]).into());
    }
    if body["name"] != "Ana" || body["email"] != "ana@example.com" || body["age"] != 30 {
        return Err(format!("unexpected record body: {body}").into());
    }
    let created_at = body["createdAt"].as_i64().ok_or("createdAt must be an integer")?;
    if created_at < before {
        return Err(format!("createdAt {created_at} precedes request time {before}").into());
    }

    reporter.artifacts().write_json("created_record.json", &body)?;
    reporter.finish(
        "pass",
        vec!["first insert assigned id 1 with a server-side timestamp".to_string()],
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "created_record.json".to_string(),
        ],
    )?;
    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_email_is_rejected_without_a_write() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("duplicate_email_is_rejected_without_a_write")?;
    let (client, server) = start_memory_server().await?;

    create_user(&client, server.base_url(), "Ana", "ana@example.com", 30).await?;
    let response = client
        .post(format!("{}/api/users", server.base_url()))
        .json(&json!({ "name": "Imposter", "email": "ana@example.com", "age": 44 }))
        .send()
        .await?;
    if response.status().as_u16() != 400 {
        return Err(format!("expected 400 for duplicate email, got {}", response.status()).into());
    }
    let body: Value = response.json().await?;
    if body != json!({"error": "Email already registered"}) {
        return Err(format!("unexpected duplicate-email body: {body}").into());
    }

    let listed = list_users(&client, server.base_url()).await?;
    if listed.len() != 1 {
        return Err(format!("expected one record after rejection, got {}", listed.len()).into());
    }
    if listed[0]["name"] != "Ana" {
        return Err(format!("original record was altered: {}", listed[0]).into());
    }

    reporter.finish(
        "pass",
        vec!["duplicate email rejected and the original record untouched".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn update_rewrites_fields_and_preserves_created_at()
-> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("update_rewrites_fields_and_preserves_created_at")?;
    let (client, server) = start_memory_server().await?;

    let created = create_user(&client, server.base_url(), "Ana", "ana@example.com", 30).await?;
    let created_at = created["createdAt"].as_i64().ok_or("createdAt must be an integer")?;

    let response = client
        .put(format!("{}/api/users/1", server.base_url()))
        .json(&json!({ "name": "Ana Maria", "email": "ana@example.com", "age": 31 }))
        .send()
        .await?;
    if response.status().as_u16() != 200 {
        return Err(format!("expected 200 on update, got {}", response.status()).into());
    }
    let body: Value = response.json().await?;
    if body != json!({"message": "User updated successfully", "id": 1}) {
        return Err(format!("unexpected update receipt: {body}").into());
    }

    let response = client.get(format!("{}/api/users/1", server.base_url())).send().await?;
    if response.status().as_u16() != 200 {
        return Err(format!("expected 200 on fetch, got {}", response.status()).into());
    }
    let fetched: Value = response.json().await?;
    if fetched["name"] != "Ana Maria" || fetched["age"] != 31 {
        return Err(format!("update did not persist: {fetched}").into());
    }
    if fetched["createdAt"] != created_at {
        return Err(format!(
            "createdAt changed across update: {} then {}",
            created_at, fetched["createdAt"]
        )
        .into());
    }

    reporter.finish(
        "pass",
        vec!["update rewrote the record while preserving createdAt".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_the_record_and_later_reads_miss()
-> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("delete_removes_the_record_and_later_reads_miss")?;
    let (client, server) = start_memory_server().await?;

    create_user(&client, server.base_url(), "Ana", "ana@example.com", 30).await?;
    let response = client.delete(format!("{}/api/users/1", server.base_url())).send().await?;
    if response.status().as_u16() != 200 {
        return Err(format!("expected 200 on delete, got {}", response.status()).into());
    }
    let body: Value = response.json().await?;
    if body != json!({"message": "User deleted successfully"}) {
        return Err(format!("unexpected delete receipt: {body}").into());
    }

    let response = client.get(format!("{}/api/users/1", server.base_url())).send().await?;
    if response.status().as_u16() != 404 {
        return Err(format!("expected 404 after delete, got {}", response.status()).into());
    }
    let body: Value = response.json().await?;
    if body != json!({"error": "User not found"}) {
        return Err(format!("unexpected missing-record body: {body}").into());
    }

    let listed = list_users(&client, server.base_url()).await?;
    if !listed.is_empty() {
        return Err(format!("expected an empty roster, got {} records", listed.len()).into());
    }

    reporter.finish(
        "pass",
        vec!["delete removed the record and later reads miss".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn incomplete_drafts_are_rejected_without_a_write()
-> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("incomplete_drafts_are_rejected_without_a_write")?;
    let (client, server) = start_memory_server().await?;

    let cases = [
        ("empty object", json!({})),
        ("blank name", json!({"name": "", "email": "ana@example.com", "age": 30})),
        ("blank email", json!({"name": "Ana", "email": "", "age": 30})),
        ("zero age", json!({"name": "Ana", "email": "ana@example.com", "age": 0})),
        ("missing age", json!({"name": "Ana", "email": "ana@example.com"})),
    ];
    for (label, payload) in cases {
        let response = client
            .post(format!("{}/api/users", server.base_url()))
            .json(&payload)
            .send()
            .await?;
        if response.status().as_u16() != 400 {
            return Err(format!("expected 400 for {label}, got {}", response.status()).into());
        }
        let body: Value = response.json().await?;
        if body != json!({"error": "name, email and age are required"}) {
            return Err(format!("unexpected error body for {label}: {body}").into());
        }
    }
    let listed = list_users(&client, server.base_url()).await?;
    if !listed.is_empty() {
        return Err(format!("rejected drafts reached the store: {listed:?}").into());
    }

    let created = create_user(&client, server.base_url(), "Ana", "ana@example.com", 30).await?;
    if created["id"] != 1 {
        return Err(format!("expected id 1, got {}", created["id"]).into());
    }
    let response = client
        .put(format!("{}/api/users/1", server.base_url()))
        .json(&json!({"name": "Imposter", "email": "", "age": 30}))
        .send()
        .await?;
    if response.status().as_u16() != 400 {
        return Err(format!("expected 400 for blank email, got {}", response.status()).into());
    }
    let response = client.get(format!("{}/api/users/1", server.base_url())).send().await?;
    let fetched: Value = response.json().await?;
    if fetched["name"] != "Ana" {
        return Err(format!("rejected update altered the record: {fetched}").into());
    }

    reporter.finish(
        "pass",
        vec!["incomplete drafts rejected on create and update with no writes".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn deleted_ids_are_never_reassigned() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("deleted_ids_are_never_reassigned")?;
    let (client, server) = start_memory_server().await?;

    let first = create_user(&client, server.base_url(), "Ana", "ana@example.com", 30).await?;
    let second = create_user(&client, server.base_url(), "Bea", "bea@example.com", 35).await?;
    if first["id"] != 1 || second["id"] != 2 {
        return Err(format!("unexpected id sequence: {} then {}", first["id"], second["id"]).into());
    }

    let response = client.delete(format!("{}/api/users/2", server.base_url())).send().await?;
    if response.status().as_u16() != 200 {
        return Err(format!("expected 200 on delete, got {}", response.status()).into());
    }

    let third = create_user(&client, server.base_url(), "Cam", "cam@example.com", 28).await?;
    if third["id"] != 3 {
        return Err(format!("expected id 3 after deleting id 2, got {}", third["id"]).into());
    }

    let listed = list_users(&client, server.base_url()).await?;
    let ids: Vec<i64> = listed.iter().filter_map(|record| record["id"].as_i64()).collect();
    if ids != vec![3, 1] {
        return Err(format!("expected newest-first ids [3, 1], got {ids:?}").into());
    }

    reporter.finish(
        "pass",
        vec!["freed ids stay retired and the list reads newest first".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn liveness_route_reports_running() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("liveness_route_reports_running")?;
    let (client, server) = start_memory_server().await?;

    let response = client.get(server.base_url()).send().await?;
    if response.status().as_u16() != 200 {
        return Err(format!("expected 200 on liveness, got {}", response.status()).into());
    }
    let body: Value = response.json().await?;
    if body != json!({"message": "User roster API is running"}) {
        return Err(format!("unexpected liveness body: {body}").into());
    }

    reporter.finish(
        "pass",
        vec!["liveness route reported the running message".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_json_reads_as_invalid_request_body() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("malformed_json_reads_as_invalid_request_body")?;
    let (client, server) = start_memory_server().await?;

    let response = client
        .post(format!("{}/api/users", server.base_url()))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await?;
    if response.status().as_u16() != 400 {
        return Err(format!("expected 400 for malformed JSON, got {}", response.status()).into());
    }
    let body: Value = response.json().await?;
    if body != json!({"error": "Invalid request body"}) {
        return Err(format!("unexpected malformed-body response: {body}").into());
    }

    reporter.finish(
        "pass",
        vec!["malformed JSON rejected with the invalid-body message".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_bodies_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("oversized_bodies_are_rejected")?;
    let bind = allocate_bind_addr()?.to_string();
    let server = spawn_api_server(memory_config_with_body_limit(&bind, 64)).await?;
    let client = http_client()?;
    wait_for_api_ready(&client, server.base_url(), std::time::Duration::from_secs(5)).await?;

    let oversized = "a".repeat(128);
    let response = client
        .post(format!("{}/api/users", server.base_url()))
        .json(&json!({ "name": oversized, "email": "ana@example.com", "age": 30 }))
        .send()
        .await?;
    if response.status().as_u16() != 413 {
        return Err(format!("expected 413 for oversized body, got {}", response.status()).into());
    }
    let body: Value = response.json().await?;
    if body != json!({"error": "Request body too large"}) {
        return Err(format!("unexpected oversized-body response: {body}").into());
    }

    let listed = list_users(&client, server.base_url()).await?;
    if !listed.is_empty() {
        return Err(format!("oversized draft reached the store: {listed:?}").into());
    }

    reporter.finish(
        "pass",
        vec!["bodies over the configured cap rejected with the 413 message".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn non_numeric_ids_read_as_missing() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("non_numeric_ids_read_as_missing")?;
    let (client, server) = start_memory_server().await?;

    create_user(&client, server.base_url(), "Ana", "ana@example.com", 30).await?;

    let response = client.get(format!("{}/api/users/abc", server.base_url())).send().await?;
    if response.status().as_u16() != 404 {
        return Err(format!("expected 404 on fetch, got {}", response.status()).into());
    }
    let response = client.delete(format!("{}/api/users/abc", server.base_url())).send().await?;
    if response.status().as_u16() != 404 {
        return Err(format!("expected 404 on delete, got {}", response.status()).into());
    }

    let response = client
        .put(format!("{}/api/users/abc", server.base_url()))
        .json(&json!({ "name": "Ana", "email": "ana@example.com", "age": 30 }))
        .send()
        .await?;
    if response.status().as_u16() != 404 {
        return Err(format!("expected 404 on update, got {}", response.status()).into());
    }
    let body: Value = response.json().await?;
    if body != json!({"error": "User not found"}) {
        return Err(format!("unexpected missing-record body: {body}").into());
    }

    // Draft validation runs before the id is inspected.
    let response = client
        .put(format!("{}/api/users/abc", server.base_url()))
        .json(&json!({ "name": "", "email": "ana@example.com", "age": 30 }))
        .send()
        .await?;
    if response.status().as_u16() != 400 {
        return Err(format!("expected 400 for a blank name, got {}", response.status()).into());
    }
    let body: Value = response.json().await?;
    if body != json!({"error": "name, email and age are required"}) {
        return Err(format!("unexpected validation body: {body}").into());
    }

    reporter.finish(
        "pass",
        vec!["non-numeric ids read as missing once the draft validates".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn sqlite_records_survive_a_server_restart() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("sqlite_records_survive_a_server_restart")?;
    let temp = TempDir::new()?;
    let db_path = temp.path().join("roster.sqlite");

    let bind = allocate_bind_addr()?.to_string();
    let server = spawn_api_server(sqlite_config(&bind, &db_path)).await?;
    let client = http_client()?;
    wait_for_api_ready(&client, server.base_url(), std::time::Duration::from_secs(5)).await?;

    let created = create_user(&client, server.base_url(), "Ana", "ana@example.com", 30).await?;
    if created["id"] != 1 {
        return Err(format!("expected id 1, got {}", created["id"]).into());
    }
    server.shutdown().await;

    let bind2 = allocate_bind_addr()?.to_string();
    let server2 = spawn_api_server(sqlite_config(&bind2, &db_path)).await?;
    wait_for_api_ready(&client, server2.base_url(), std::time::Duration::from_secs(5)).await?;

    let listed = list_users(&client, server2.base_url()).await?;
    if listed.len() != 1 || listed[0]["name"] != "Ana" {
        return Err(format!("records did not survive the restart: {listed:?}").into());
    }
    let second = create_user(&client, server2.base_url(), "Bea", "bea@example.com", 35).await?;
    if second["id"] != 2 {
        return Err(format!("expected id 2 after restart, got {}", second["id"]).into());
    }

    reporter.artifacts().write_json("relisted_records.json", &listed)?;
    reporter.finish(
        "pass",
        vec!["sqlite-backed records survive a server restart".to_string()],
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "relisted_records.json".to_string(),
        ],
    )?;
    server2.shutdown().await;
    Ok(())
}
