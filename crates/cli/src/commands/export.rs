//! export command - Archive selected items of one folder
//!
//! Items are picked by name inside the folder, or all at once from the
//! visible page. Folders are exported with everything below them.

use std::path::PathBuf;

use clap::Args;
use jiff::Timestamp;
use serde::Serialize;

use s3nav_core::{BrowserSession, SessionEvent};

use super::ViewArgs;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Spinner};

/// Export items of a folder as a tar.gz archive
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Configured bucket name (see `s3nav bucket list`)
    pub bucket: String,

    /// Folder below the bucket's root folder
    pub path: Option<String>,

    #[command(flatten)]
    pub view: ViewArgs,

    /// Names of files or folders in the folder to export
    #[arg(long, num_args = 1.., required_unless_present = "all", conflicts_with = "all")]
    pub select: Vec<String>,

    /// Export every item on the selected page
    #[arg(long)]
    pub all: bool,

    /// Archive to write (default: <bucket>-<folder>-<timestamp>.tar.gz)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Output structure for export command (JSON format)
#[derive(Debug, Serialize)]
struct ExportOutput {
    file: String,
    item_count: usize,
    byte_count: usize,
    byte_count_human: String,
}

/// Execute the export command
pub async fn execute(args: ExportArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (mut session, mut events) = match super::open_session(&args.bucket).await {
        Ok(opened) => opened,
        Err(e) => return super::fail(&formatter, "Failed to open bucket", &e),
    };

    if let Err(e) = session
        .enter_child(args.path.as_deref().unwrap_or_default())
        .await
    {
        return super::fail(&formatter, "Invalid folder", &e);
    }
    if let Some(code) = super::report_listing_errors(&formatter, &super::drain_events(&mut events))
    {
        return code;
    }

    args.view.apply(&mut session);
    if args.all {
        session.select_all_visible(true);
    } else if let Err(missing) = select_by_name(&mut session, &args.select) {
        formatter.error(&format!(
            "Not found in '{}': {}",
            display_folder(session.current_prefix()),
            missing.join(", ")
        ));
        return ExitCode::NotFound;
    }

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(default_file_name(&session, Timestamp::now())));

    let spinner = Spinner::new(formatter.config(), "Exporting...");
    let result = session.export_selection().await;
    spinner.finish_and_clear();

    for event in super::drain_events(&mut events) {
        tracing::debug!(?event, "export event");
    }

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            formatter.error(&format!("Export failed: {}", e.reason()));
            return ExitCode::GeneralError;
        }
    };

    if let Err(e) = tokio::fs::write(&path, &outcome.bytes).await {
        formatter.error(&format!("Failed to write {}: {e}", path.display()));
        return ExitCode::GeneralError;
    }

    report_completed(&formatter, &path, outcome.item_count, outcome.byte_count());
    ExitCode::Success
}

/// Select every named item; returns the names that are not in the folder
pub fn select_by_name(session: &mut BrowserSession, names: &[String]) -> Result<(), Vec<String>> {
    let prefix = session.current_prefix().to_string();
    let mut keys = Vec::new();
    let mut missing = Vec::new();

    for name in names {
        let wanted = name.trim_matches('/');
        match session
            .items()
            .iter()
            .find(|item| item.display_name(&prefix) == wanted)
        {
            Some(item) => keys.push(item.key().to_string()),
            None => missing.push(name.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(missing);
    }
    for key in keys {
        session.select(key, true);
    }
    Ok(())
}

/// `<bucket>-<folder>-<timestamp>.tar.gz`
pub fn default_file_name(session: &BrowserSession, now: Timestamp) -> String {
    let crumbs = session.breadcrumbs();
    let folder = crumbs.last().map(String::as_str).unwrap_or("home");
    format!(
        "{}-{}-{}.tar.gz",
        sanitize(&session.bucket().bucket),
        sanitize(folder),
        now.strftime("%Y%m%d-%H%M%S")
    )
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn display_folder(prefix: &str) -> &str {
    if prefix.is_empty() { "/" } else { prefix }
}

/// Print the summary of a finished export
pub fn report_completed(
    formatter: &Formatter,
    path: &std::path::Path,
    item_count: usize,
    byte_count: usize,
) {
    let byte_count_human = humansize::format_size(byte_count, humansize::BINARY);
    if formatter.is_json() {
        formatter.json(&ExportOutput {
            file: path.display().to_string(),
            item_count,
            byte_count,
            byte_count_human,
        });
    } else {
        formatter.success(&format!(
            "Exported {item_count} item(s) to {} ({byte_count_human})",
            path.display()
        ));
    }
}

/// Summary line for export events in the interactive browser
pub fn describe_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::ExportStarted { item_count } => {
            Some(format!("Exporting {item_count} item(s)..."))
        }
        SessionEvent::ExportFailed { reason } => Some(format!("Export failed: {reason}")),
        _ => None,
    }
}
