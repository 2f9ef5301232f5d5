//! browse command - Interactive folder browser
//!
//! Reads one command per line from stdin and prints the folder after every
//! change. A failed listing ends the session.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Args;
use jiff::Timestamp;
use tokio::io::{AsyncBufReadExt, BufReader};

use s3nav_core::{BrowserSession, PageSize};

use super::export::{default_file_name, describe_event, report_completed, select_by_name};
use super::ls::print_listing;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Spinner};

const HELP: &str = "\
Commands:
  ls                 show the current page
  cd <path>          enter a folder (cd .. goes up)
  up                 go up one folder
  crumb <n>          jump to breadcrumb n (0 is home)
  refresh            list the current folder again
  search [text]      filter by name; no text clears the filter
  page <n> | next | prev
  size <10|25|50|100>
  select <name>...   select items on this folder
  unselect <name>...
  all | none         select or clear the visible page
  export [file]      archive the selection
  help | quit";

/// Browse a bucket interactively
#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// Configured bucket name (see `s3nav bucket list`)
    pub bucket: String,
}

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    List,
    Enter(String),
    Up,
    Crumb(usize),
    Refresh,
    Search(String),
    Page(usize),
    Next,
    Prev,
    Size(PageSize),
    Select(Vec<String>),
    Unselect(Vec<String>),
    All,
    Clear,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

impl BrowseCommand {
    /// Parse one line; blank lines yield `None`
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let rest: Vec<String> = words.map(str::to_string).collect();

        let command = match verb {
            "ls" | "l" => Self::List,
            "cd" => match rest.first().map(String::as_str) {
                Some("..") => Self::Up,
                Some(path) => Self::Enter(path.to_string()),
                None => Self::Crumb(0),
            },
            "up" => Self::Up,
            "crumb" => Self::Crumb(number(&rest, "crumb")?),
            "refresh" => Self::Refresh,
            "search" | "/" => Self::Search(rest.join(" ")),
            "page" => Self::Page(number(&rest, "page")?),
            "next" | "n" => Self::Next,
            "prev" | "p" => Self::Prev,
            "size" => {
                let size = rest.first().context("size needs a value")?;
                Self::Size(size.parse()?)
            }
            "select" | "s" if !rest.is_empty() => Self::Select(rest),
            "unselect" | "u" if !rest.is_empty() => Self::Unselect(rest),
            "select" | "s" | "unselect" | "u" => bail!("{verb} needs at least one name"),
            "all" => Self::All,
            "none" => Self::Clear,
            "export" => Self::Export(rest.first().map(PathBuf::from)),
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => bail!("unknown command '{other}' (try 'help')"),
        };
        Ok(Some(command))
    }
}

fn number(rest: &[String], verb: &str) -> anyhow::Result<usize> {
    rest.first()
        .with_context(|| format!("{verb} needs a number"))?
        .parse()
        .with_context(|| format!("{verb} needs a number"))
}

/// Execute the browse command
pub async fn execute(args: BrowseArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (mut session, mut events) = match super::open_session(&args.bucket).await {
        Ok(opened) => opened,
        Err(e) => return super::fail(&formatter, "Failed to open bucket", &e),
    };

    if let Err(e) = session.refresh().await {
        return super::fail(&formatter, "Failed to list", &e);
    }
    if let Some(code) = super::report_listing_errors(&formatter, &super::drain_events(&mut events))
    {
        return code;
    }
    print_listing(&formatter, &mut session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                formatter.error(&format!("Failed to read input: {e}"));
                return ExitCode::GeneralError;
            }
        };

        let command = match BrowseCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                formatter.error(&e.to_string());
                continue;
            }
        };
        if command == BrowseCommand::Quit {
            break;
        }

        if let Err(e) = run(&formatter, &mut session, command).await {
            formatter.error(&format!("{e:#}"));
        }

        for event in super::drain_events(&mut events) {
            if let Some(code) = super::report_listing_errors(&formatter, &[event.clone()]) {
                return code;
            }
            if let Some(message) = describe_event(&event) {
                tracing::debug!("{message}");
            }
        }
    }

    ExitCode::Success
}

/// Apply one command to the session and print the result
async fn run(
    formatter: &Formatter,
    session: &mut BrowserSession,
    command: BrowseCommand,
) -> anyhow::Result<()> {
    match command {
        BrowseCommand::List => {}
        BrowseCommand::Enter(path) => navigate(formatter, session.enter_child(&path)).await?,
        BrowseCommand::Up => navigate(formatter, session.go_up()).await?,
        BrowseCommand::Crumb(index) => {
            navigate(formatter, session.jump_to_breadcrumb(index)).await?
        }
        BrowseCommand::Refresh => navigate(formatter, session.refresh()).await?,
        BrowseCommand::Search(query) => session.set_search(query),
        BrowseCommand::Page(index) => {
            session.set_page(index);
        }
        BrowseCommand::Next => {
            session.next_page();
        }
        BrowseCommand::Prev => {
            session.prev_page();
        }
        BrowseCommand::Size(size) => session.set_page_size(size),
        BrowseCommand::Select(names) => {
            if let Err(missing) = select_by_name(session, &names) {
                bail!("not in this folder: {}", missing.join(", "));
            }
        }
        BrowseCommand::Unselect(names) => {
            let prefix = session.current_prefix().to_string();
            let keys: Vec<String> = session
                .items()
                .iter()
                .filter(|item| {
                    let name = item.display_name(&prefix);
                    names.iter().any(|n| n.trim_matches('/') == name)
                })
                .map(|item| item.key().to_string())
                .collect();
            for key in keys {
                session.select(key, false);
            }
        }
        BrowseCommand::All => session.select_all_visible(true),
        BrowseCommand::Clear => session.select_all_visible(false),
        BrowseCommand::Export(path) => {
            let path = path
                .unwrap_or_else(|| PathBuf::from(default_file_name(session, Timestamp::now())));
            let spinner = Spinner::new(formatter.config(), "Exporting...");
            let result = session.export_selection().await;
            spinner.finish_and_clear();

            let outcome = result.map_err(|e| anyhow::anyhow!("export failed: {}", e.reason()))?;
            tokio::fs::write(&path, &outcome.bytes)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            report_completed(formatter, &path, outcome.item_count, outcome.byte_count());
            return Ok(());
        }
        BrowseCommand::Help => {
            formatter.println(HELP);
            return Ok(());
        }
        BrowseCommand::Quit => return Ok(()),
    }

    print_listing(formatter, session);
    Ok(())
}

async fn navigate(
    formatter: &Formatter,
    listing: impl std::future::Future<Output = s3nav_core::Result<()>>,
) -> anyhow::Result<()> {
    let spinner = Spinner::new(formatter.config(), "Listing...");
    let result = listing.await;
    spinner.finish_and_clear();
    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> BrowseCommand {
        BrowseCommand::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse("cd photos/2024"), BrowseCommand::Enter("photos/2024".into()));
        assert_eq!(parse("cd .."), BrowseCommand::Up);
        assert_eq!(parse("cd"), BrowseCommand::Crumb(0));
        assert_eq!(parse("crumb 2"), BrowseCommand::Crumb(2));
        assert_eq!(parse("  up  "), BrowseCommand::Up);
    }

    #[test]
    fn test_parse_view() {
        assert_eq!(
            parse("search annual report"),
            BrowseCommand::Search("annual report".into())
        );
        assert_eq!(parse("search"), BrowseCommand::Search(String::new()));
        assert_eq!(parse("size 50"), BrowseCommand::Size(PageSize::Fifty));
        assert_eq!(parse("page 3"), BrowseCommand::Page(3));
    }

    #[test]
    fn test_parse_selection_and_export() {
        assert_eq!(
            parse("select a.txt img"),
            BrowseCommand::Select(vec!["a.txt".into(), "img".into()])
        );
        assert_eq!(parse("export"), BrowseCommand::Export(None));
        assert_eq!(
            parse("export out.tar.gz"),
            BrowseCommand::Export(Some(PathBuf::from("out.tar.gz")))
        );
        assert_eq!(parse("none"), BrowseCommand::Clear);
        assert_eq!(parse("q"), BrowseCommand::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert!(BrowseCommand::parse("").unwrap().is_none());
        assert!(BrowseCommand::parse("size 30").is_err());
        assert!(BrowseCommand::parse("page x").is_err());
        assert!(BrowseCommand::parse("select").is_err());
        assert!(BrowseCommand::parse("rm -rf").is_err());
    }
}
