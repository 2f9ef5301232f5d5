//! CLI command definitions and execution
//!
//! Every command that talks to a bucket goes through [`open_session`], so
//! listing, paging and selection behave the same in `ls`, `export` and
//! `browse`.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc::UnboundedReceiver;

use s3nav_core::{
    BrowserSession, BucketManager, ConfigManager, Error, PageSize, Result, SessionEvent,
};
use s3nav_s3::{S3ArchiveBuilder, S3Client};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod browse;
mod bucket;
mod completions;
mod export;
mod ls;

/// s3nav - browse S3-compatible buckets as folders
///
/// Lists one folder level at a time, searches and pages through it, and
/// exports selected files and folders as a single tar.gz archive.
#[derive(Parser, Debug)]
#[command(name = "s3nav")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable spinners
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configured buckets
    #[command(subcommand)]
    Bucket(bucket::BucketCommands),

    /// List one folder of a bucket
    Ls(ls::LsArgs),

    /// Export selected items of a folder as a tar.gz archive
    Export(export::ExportArgs),

    /// Browse a bucket interactively
    Browse(browse::BrowseArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Bucket(cmd) => bucket::execute(cmd, output_config).await,
        Commands::Ls(args) => ls::execute(args, output_config).await,
        Commands::Export(args) => export::execute(args, output_config).await,
        Commands::Browse(args) => browse::execute(args, output_config).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Search and paging flags shared by `ls` and `export`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Only show items whose name contains this text (case-insensitive)
    #[arg(short, long)]
    pub search: Option<String>,

    /// Page to show, starting at 1
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Items per page: 10, 25, 50 or 100 (default from config)
    #[arg(long)]
    pub page_size: Option<PageSize>,
}

impl ViewArgs {
    /// Apply search, page size and page to a listed session
    pub fn apply(&self, session: &mut BrowserSession) {
        if let Some(page_size) = self.page_size {
            session.set_page_size(page_size);
        }
        if let Some(query) = &self.search {
            session.set_search(query.as_str());
        }
        session.set_page(self.page);
    }
}

/// Open a session on a configured bucket
///
/// Nothing is listed yet; the caller navigates first.
pub async fn open_session(
    name: &str,
) -> Result<(BrowserSession, UnboundedReceiver<SessionEvent>)> {
    let manager = BucketManager::with_repository(ConfigManager::new()?);
    let bucket = manager.get(name)?;
    let page_size = manager.default_page_size()?;

    let client = Arc::new(S3Client::new(bucket.clone()).await?);
    let builder = Arc::new(S3ArchiveBuilder::new(Arc::clone(&client)));

    Ok(BrowserSession::new(bucket, client, builder, page_size))
}

/// Everything emitted since the last call
pub fn drain_events(events: &mut UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

/// Report listing failures among `events`
///
/// Returns the exit code of the first failure, if any.
pub fn report_listing_errors(formatter: &Formatter, events: &[SessionEvent]) -> Option<ExitCode> {
    let mut code = None;
    for event in events {
        match event {
            SessionEvent::ListingError {
                prefix,
                kind,
                message,
                likely_misconfiguration,
            } => {
                let location = if prefix.is_empty() { "/" } else { prefix.as_str() };
                formatter.error(&format!("Failed to list '{location}': {message}"));
                if *likely_misconfiguration {
                    formatter.warning(
                        "Check the endpoint, credentials and CORS settings of this bucket",
                    );
                }
                code.get_or_insert(ExitCode::from_listing(*kind));
            }
            SessionEvent::Disconnected => {
                tracing::debug!("session disconnected");
            }
            _ => {}
        }
    }
    code
}

/// Print an error and convert it to an exit code
pub fn fail(formatter: &Formatter, context: &str, err: &Error) -> ExitCode {
    formatter.error(&format!("{context}: {err}"));
    ExitCode::from(err)
}
