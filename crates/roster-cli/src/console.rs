// crates/roster-cli/src/console.rs
// ============================================================================
// Module: Interactive Console
// Description: Line-oriented console over the view controller.
// Purpose: Render view state as text and translate typed commands into
//          controller operations.
// Dependencies: roster-client, roster-core, time
// ============================================================================

//! ## Overview
//! The console is a thin text front end over [`ViewController`]: it parses
//! one intent per input line, runs the matching controller operation, and
//! re-renders the resulting state. All remote failures surface through the
//! controller's error field; only stdio failures abort the loop.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::io::BufRead;
use std::io::Write;

use roster_client::DeletePrompt;
use roster_client::FormState;
use roster_client::RecordGateway;
use roster_client::ViewController;
use roster_client::ViewState;
use roster_core::RecordId;
use roster_core::Timestamp;
use roster_core::UserDraft;
use roster_core::UserRecord;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Console help text.
const HELP_TEXT: &str = "commands:\n  list          refresh and show all users\n  new           \
                         create a user\n  edit <id>     edit a user\n  delete <id>   delete a \
                         user\n  help          show this help\n  quit          exit the console\n";

/// Input prompt shown before each command.
const PROMPT: &str = "roster> ";

// ============================================================================
// SECTION: Intents
// ============================================================================

/// Parsed console input.
#[derive(Debug, PartialEq, Eq)]
enum ConsoleIntent {
    /// Refresh and show the record list.
    List,
    /// Open the creation flow.
    New,
    /// Open the edit flow for an id.
    Edit(String),
    /// Run the delete flow for an id.
    Delete(String),
    /// Show the help text.
    Help,
    /// Leave the console.
    Quit,
    /// Blank input line.
    Empty,
    /// Unusable input with a message to show.
    Invalid(String),
}

/// Parses one input line into an intent.
fn parse_intent(line: &str) -> ConsoleIntent {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return ConsoleIntent::Empty;
    };
    let argument = parts.next();
    if parts.next().is_some() {
        return ConsoleIntent::Invalid(format!("too many arguments for '{word}'"));
    }
    match (word, argument) {
        ("list", None) => ConsoleIntent::List,
        ("new", None) => ConsoleIntent::New,
        ("help", None) => ConsoleIntent::Help,
        ("quit" | "exit", None) => ConsoleIntent::Quit,
        ("edit", Some(id)) => ConsoleIntent::Edit(id.to_string()),
        ("delete", Some(id)) => ConsoleIntent::Delete(id.to_string()),
        ("edit" | "delete", None) => ConsoleIntent::Invalid(format!("'{word}' needs a user id")),
        ("list" | "new" | "help" | "quit" | "exit", Some(_)) => {
            ConsoleIntent::Invalid(format!("'{word}' takes no argument"))
        }
        _ => ConsoleIntent::Invalid(format!("unknown command: {word}")),
    }
}

// ============================================================================
// SECTION: Console Loop
// ============================================================================

/// Runs the interactive console until quit or end of input.
///
/// # Errors
///
/// Returns an error only when reading or writing the terminal fails; remote
/// failures are rendered from view state instead.
pub(crate) async fn run_console<G: RecordGateway>(
    mut controller: ViewController<G>,
) -> std::io::Result<()> {
    write_stdout_text(HELP_TEXT)?;
    controller.refresh().await;
    render_state(controller.state())?;
    loop {
        write_prompt(PROMPT)?;
        let Some(line) = read_input_line()? else {
            break;
        };
        match parse_intent(&line) {
            ConsoleIntent::Empty => {}
            ConsoleIntent::Help => write_stdout_text(HELP_TEXT)?,
            ConsoleIntent::Quit => break,
            ConsoleIntent::Invalid(message) => {
                write_stderr_text(&format!("error: {message}\n"))?;
            }
            ConsoleIntent::List => {
                controller.refresh().await;
                render_state(controller.state())?;
            }
            ConsoleIntent::New => {
                controller.begin_create();
                let draft = prompt_draft(None)?;
                controller.set_draft(draft);
                controller.submit().await;
                render_state(controller.state())?;
            }
            ConsoleIntent::Edit(raw) => {
                let Some(id) = parse_console_id(&raw)? else {
                    continue;
                };
                run_edit_flow(&mut controller, id).await?;
            }
            ConsoleIntent::Delete(raw) => {
                let Some(id) = parse_console_id(&raw)? else {
                    continue;
                };
                let prompt = StdinPrompt;
                controller.delete(id, &prompt).await;
                render_state(controller.state())?;
            }
        }
    }
    Ok(())
}

/// Runs the edit flow: open the form, collect fields, submit.
async fn run_edit_flow<G: RecordGateway>(
    controller: &mut ViewController<G>,
    id: RecordId,
) -> std::io::Result<()> {
    controller.begin_edit(id);
    let current = match &controller.state().form {
        FormState::Editing {
            draft, ..
        } => draft.clone(),
        FormState::Hidden
        | FormState::Creating {
            ..
        } => {
            render_state(controller.state())?;
            return Ok(());
        }
    };
    let draft = prompt_draft(Some(&current))?;
    controller.set_draft(draft);
    controller.submit().await;
    render_state(controller.state())
}

/// Parses a console id argument, reporting failures to the user.
fn parse_console_id(raw: &str) -> std::io::Result<Option<RecordId>> {
    match raw.parse::<RecordId>() {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            write_stderr_text(&format!("error: invalid user id: {raw}\n"))?;
            Ok(None)
        }
    }
}

// ============================================================================
// SECTION: Field Prompts
// ============================================================================

/// Collects a draft from field prompts, prefilled from `current` when set.
fn prompt_draft(current: Option<&UserDraft>) -> std::io::Result<UserDraft> {
    let name = prompt_field("name", current.map(|draft| draft.name.as_str()))?;
    let email = prompt_field("email", current.map(|draft| draft.email.as_str()))?;
    let age_default = current.map(|draft| draft.age.to_string());
    let age_text = prompt_field("age", age_default.as_deref())?;
    // Unparseable ages become zero, which local validation rejects.
    let age = age_text.parse::<i64>().unwrap_or(0);
    Ok(UserDraft {
        name,
        email,
        age,
    })
}

/// Prompts for one field; blank input keeps the default when one exists.
fn prompt_field(label: &str, default: Option<&str>) -> std::io::Result<String> {
    match default {
        Some(value) => write_prompt(&format!("{label} [{value}]: "))?,
        None => write_prompt(&format!("{label}: "))?,
    }
    let input = read_input_line()?.unwrap_or_default();
    let trimmed = input.trim();
    if trimmed.is_empty()
        && let Some(value) = default
    {
        return Ok(value.to_string());
    }
    Ok(trimmed.to_string())
}

/// Confirmation prompt reading a y/N answer from stdin.
///
/// Any input other than `y` declines, as does an unreadable terminal.
pub(crate) struct StdinPrompt;

impl DeletePrompt for StdinPrompt {
    fn confirm_delete(&self, record: &UserRecord) -> bool {
        let question = format!("delete {} <{}>? [y/N] ", record.name, record.email);
        if write_prompt(&question).is_err() {
            return false;
        }
        match read_input_line() {
            Ok(Some(line)) => line.trim().eq_ignore_ascii_case("y"),
            Ok(None) | Err(_) => false,
        }
    }
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders current view state: the error line if any, then the record table.
fn render_state(state: &ViewState) -> std::io::Result<()> {
    if let Some(error) = &state.error {
        write_stderr_text(&format!("error: {error}\n"))?;
    }
    write_stdout_text(&render_record_table(&state.records))
}

/// Renders records as an aligned text table, newest first.
pub(crate) fn render_record_table(records: &[UserRecord]) -> String {
    if records.is_empty() {
        return "no users\n".to_string();
    }
    let name_width = column_width("name", records.iter().map(|record| record.name.len()));
    let email_width = column_width("email", records.iter().map(|record| record.email.len()));
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{:>4}  {:<name_width$}  {:<email_width$}  {:>4}  {}",
        "id", "name", "email", "age", "created"
    );
    for record in records {
        let _ = writeln!(
            output,
            "{:>4}  {:<name_width$}  {:<email_width$}  {:>4}  {}",
            record.id,
            record.name,
            record.email,
            record.age,
            format_created_at(record.created_at)
        );
    }
    output
}

/// Returns the display width of a column including its header.
fn column_width(header: &str, lengths: impl Iterator<Item = usize>) -> usize {
    lengths.chain(std::iter::once(header.len())).max().unwrap_or(0)
}

/// Formats a creation timestamp as RFC 3339, falling back to raw millis.
fn format_created_at(timestamp: Timestamp) -> String {
    let millis = timestamp.as_unix_millis();
    let nanos = i128::from(millis).saturating_mul(1_000_000);
    OffsetDateTime::from_unix_timestamp_nanos(nanos).map_or_else(
        |_| millis.to_string(),
        |datetime| datetime.format(&Rfc3339).map_or_else(|_| millis.to_string(), |text| text),
    )
}

// ============================================================================
// SECTION: Terminal Helpers
// ============================================================================

/// Writes prompt text without a newline and flushes.
fn write_prompt(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(&mut stdout, "{text}")?;
    stdout.flush()
}

/// Writes raw text to stdout.
fn write_stdout_text(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes())
}

/// Writes raw text to stderr.
fn write_stderr_text(text: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    stderr.write_all(text.as_bytes())
}

/// Reads one input line; `None` means end of input.
fn read_input_line() -> std::io::Result<Option<String>> {
    let mut line = String::new();
    let count = std::io::stdin().lock().read_line(&mut line)?;
    if count == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
