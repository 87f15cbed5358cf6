// crates/roster-cli/src/main.rs
// ============================================================================
// Module: Roster CLI Entry Point
// Description: Command dispatcher for the roster server and client tools.
// Purpose: Serve the REST API, drive one-shot record operations, and host
//          the interactive console.
// Dependencies: clap, roster-api, roster-client, roster-config, roster-core,
//               serde_json, thiserror, tokio.
// ============================================================================

//! ## Overview
//! The roster CLI wraps three surfaces: `serve` runs the REST API from a
//! config file, `users` issues one-shot record operations against a running
//! server, and `console` hosts the interactive view. All remote calls go
//! through the client gateway, so the CLI sees exactly the wire contract.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub(crate) mod console;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use roster_api::ApiServer;
use roster_client::DeletePrompt;
use roster_client::GatewayConfig;
use roster_client::HttpRecordGateway;
use roster_client::RecordGateway;
use roster_client::ViewController;
use roster_config::RosterConfig;
use roster_config::config_toml_example;
use roster_core::RecordId;
use roster_core::UserDraft;
use thiserror::Error;

use crate::console::StdinPrompt;
use crate::console::render_record_table;
use crate::console::run_console;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default API endpoint for client commands.
const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3001";
/// Default request timeout for client commands in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "roster", version, disable_help_subcommand = true, arg_required_else_help = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the roster REST API server.
    Serve(ServeCommand),
    /// One-shot record operations against a running server.
    Users {
        /// Selected users subcommand.
        #[command(subcommand)]
        command: UsersCommand,
    },
    /// Interactive roster console.
    Console(ConsoleCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to roster.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Users subcommands.
#[derive(Subcommand, Debug)]
enum UsersCommand {
    /// List all users, newest first.
    List(UsersListCommand),
    /// Fetch a single user by id.
    Get(UsersGetCommand),
    /// Create a user.
    Add(UsersAddCommand),
    /// Update a user's fields.
    Update(UsersUpdateCommand),
    /// Delete a user.
    Remove(UsersRemoveCommand),
}

/// Shared endpoint arguments for client commands.
#[derive(Args, Debug)]
struct EndpointArgs {
    /// API endpoint base URL.
    #[arg(long, value_name = "URL", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

/// Output formats for record listings.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum OutputFormat {
    /// Aligned text table.
    Text,
    /// Raw JSON as returned by the API.
    Json,
}

/// Arguments for `users list`.
#[derive(Args, Debug)]
struct UsersListCommand {
    /// Endpoint selection.
    #[command(flatten)]
    endpoint: EndpointArgs,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `users get`.
#[derive(Args, Debug)]
struct UsersGetCommand {
    /// User id.
    #[arg(value_name = "ID")]
    id: String,
    /// Endpoint selection.
    #[command(flatten)]
    endpoint: EndpointArgs,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `users add`.
#[derive(Args, Debug)]
struct UsersAddCommand {
    /// Display name.
    #[arg(long, value_name = "NAME")]
    name: String,
    /// Contact email.
    #[arg(long, value_name = "EMAIL")]
    email: String,
    /// Age in years.
    #[arg(long, value_name = "YEARS")]
    age: i64,
    /// Endpoint selection.
    #[command(flatten)]
    endpoint: EndpointArgs,
}

/// Arguments for `users update`.
#[derive(Args, Debug)]
struct UsersUpdateCommand {
    /// User id.
    #[arg(value_name = "ID")]
    id: String,
    /// New display name; keeps the current one when omitted.
    #[arg(long, value_name = "NAME")]
    name: Option<String>,
    /// New contact email; keeps the current one when omitted.
    #[arg(long, value_name = "EMAIL")]
    email: Option<String>,
    /// New age in years; keeps the current one when omitted.
    #[arg(long, value_name = "YEARS")]
    age: Option<i64>,
    /// Endpoint selection.
    #[command(flatten)]
    endpoint: EndpointArgs,
}

/// Arguments for `users remove`.
#[derive(Args, Debug)]
struct UsersRemoveCommand {
    /// User id.
    #[arg(value_name = "ID")]
    id: String,
    /// Skip the confirmation prompt.
    #[arg(long)]
    yes: bool,
    /// Endpoint selection.
    #[command(flatten)]
    endpoint: EndpointArgs,
}

/// Arguments for the `console` command.
#[derive(Args, Debug)]
struct ConsoleCommand {
    /// Endpoint selection.
    #[command(flatten)]
    endpoint: EndpointArgs,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print a canonical example roster.toml.
    Example,
    /// Validate a roster configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to roster.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Users {
            command,
        } => command_users(command).await,
        Commands::Console(command) => command_console(command).await,
        Commands::Config {
            command,
        } => command_config(command),
    }
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = RosterConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let server = tokio::task::spawn_blocking(move || ApiServer::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("server init failed: init join failed: {err}")))?
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server
        .serve()
        .await
        .map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Users Commands
// ============================================================================

/// Dispatches `users` subcommands.
async fn command_users(command: UsersCommand) -> CliResult<ExitCode> {
    match command {
        UsersCommand::List(command) => command_users_list(command).await,
        UsersCommand::Get(command) => command_users_get(command).await,
        UsersCommand::Add(command) => command_users_add(command).await,
        UsersCommand::Update(command) => command_users_update(command).await,
        UsersCommand::Remove(command) => command_users_remove(command).await,
    }
}

/// Executes `users list`.
async fn command_users_list(command: UsersListCommand) -> CliResult<ExitCode> {
    let gateway = build_gateway(&command.endpoint)?;
    let records = gateway.list().await.map_err(|err| CliError::new(err.user_message()))?;
    match command.format {
        OutputFormat::Text => {
            write_stdout_text(&render_record_table(&records))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string(&records)
                .map_err(|err| CliError::new(format!("json output failed: {err}")))?;
            write_stdout_line(&json).map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `users get`.
async fn command_users_get(command: UsersGetCommand) -> CliResult<ExitCode> {
    let id = parse_record_id(&command.id)?;
    let gateway = build_gateway(&command.endpoint)?;
    let record = gateway.get(id).await.map_err(|err| CliError::new(err.user_message()))?;
    match command.format {
        OutputFormat::Text => {
            write_stdout_text(&render_record_table(std::slice::from_ref(&record)))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string(&record)
                .map_err(|err| CliError::new(format!("json output failed: {err}")))?;
            write_stdout_line(&json).map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `users add`.
async fn command_users_add(command: UsersAddCommand) -> CliResult<ExitCode> {
    let gateway = build_gateway(&command.endpoint)?;
    let draft = UserDraft {
        name: command.name,
        email: command.email,
        age: command.age,
    };
    let record = gateway.create(&draft).await.map_err(|err| CliError::new(err.user_message()))?;
    write_stdout_line(&format!("created user {} ({})", record.id, record.email))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `users update`.
///
/// Omitted fields are prefilled from the current record, so a partial update
/// still satisfies the wire contract's all-fields rule.
async fn command_users_update(command: UsersUpdateCommand) -> CliResult<ExitCode> {
    let id = parse_record_id(&command.id)?;
    let gateway = build_gateway(&command.endpoint)?;
    let current = gateway.get(id).await.map_err(|err| CliError::new(err.user_message()))?;
    let mut draft = current.to_draft();
    if let Some(name) = command.name {
        draft.name = name;
    }
    if let Some(email) = command.email {
        draft.email = email;
    }
    if let Some(age) = command.age {
        draft.age = age;
    }
    let receipt =
        gateway.update(id, &draft).await.map_err(|err| CliError::new(err.user_message()))?;
    write_stdout_line(&receipt.message)
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `users remove`.
async fn command_users_remove(command: UsersRemoveCommand) -> CliResult<ExitCode> {
    let id = parse_record_id(&command.id)?;
    let gateway = build_gateway(&command.endpoint)?;
    if !command.yes {
        let record = gateway.get(id).await.map_err(|err| CliError::new(err.user_message()))?;
        let prompt = StdinPrompt;
        if !prompt.confirm_delete(&record) {
            write_stdout_line("delete aborted")
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            return Ok(ExitCode::SUCCESS);
        }
    }
    let receipt = gateway.delete(id).await.map_err(|err| CliError::new(err.user_message()))?;
    write_stdout_line(&receipt.message)
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Console Command
// ============================================================================

/// Executes the `console` command.
async fn command_console(command: ConsoleCommand) -> CliResult<ExitCode> {
    let gateway = build_gateway(&command.endpoint)?;
    let controller = ViewController::new(gateway);
    run_console(controller).await.map_err(|err| CliError::new(output_error("console", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches `config` subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Example => command_config_example(),
        ConfigCommand::Validate(command) => command_config_validate(command),
    }
}

/// Executes `config example`.
fn command_config_example() -> CliResult<ExitCode> {
    write_stdout_text(&config_toml_example())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `config validate`.
fn command_config_validate(command: ConfigValidateCommand) -> CliResult<ExitCode> {
    RosterConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config validation failed: {err}")))?;
    write_stdout_line("configuration is valid")
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Client Helpers
// ============================================================================

/// Builds the HTTP gateway from endpoint arguments.
fn build_gateway(endpoint: &EndpointArgs) -> CliResult<HttpRecordGateway> {
    if endpoint.timeout_secs == 0 {
        return Err(CliError::new("--timeout-secs must be greater than zero".to_string()));
    }
    let mut config = GatewayConfig::for_endpoint(endpoint.endpoint.clone());
    config.timeout = Duration::from_secs(endpoint.timeout_secs);
    HttpRecordGateway::new(&config).map_err(|err| CliError::new(err.to_string()))
}

/// Parses a user id argument.
fn parse_record_id(raw: &str) -> CliResult<RecordId> {
    raw.parse::<RecordId>().map_err(|_| CliError::new(format!("invalid user id: {raw}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw text to stdout without adding a newline.
fn write_stdout_text(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes())
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Tests
// ============================================================================
