//! ls command - List one folder of a configured bucket
//!
//! Shows folders before files, one page at a time, optionally filtered by a
//! search term.

use clap::Args;

use s3nav_core::BrowserSession;

use super::ViewArgs;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Spinner, render_page};

/// List one folder
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Configured bucket name (see `s3nav bucket list`)
    pub bucket: String,

    /// Folder below the bucket's root folder (e.g., "photos/2024")
    pub path: Option<String>,

    #[command(flatten)]
    pub view: ViewArgs,
}

/// Execute the ls command
pub async fn execute(args: LsArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (mut session, mut events) = match super::open_session(&args.bucket).await {
        Ok(opened) => opened,
        Err(e) => return super::fail(&formatter, "Failed to open bucket", &e),
    };

    let spinner = Spinner::new(formatter.config(), "Listing...");
    let navigated = session
        .enter_child(args.path.as_deref().unwrap_or_default())
        .await;
    spinner.finish_and_clear();

    if let Err(e) = navigated {
        return super::fail(&formatter, "Invalid folder", &e);
    }
    if let Some(code) = super::report_listing_errors(&formatter, &super::drain_events(&mut events))
    {
        return code;
    }

    args.view.apply(&mut session);
    print_listing(&formatter, &mut session);
    ExitCode::Success
}

/// Print the current page with its breadcrumb trail
pub fn print_listing(formatter: &Formatter, session: &mut BrowserSession) {
    if formatter.is_json() {
        formatter.json(&session.snapshot());
        return;
    }

    let page = session.page();
    formatter.println(&formatter.dim(&breadcrumb_line(&session.breadcrumbs())));
    if page.total_items == 0 {
        if session.query().is_empty() {
            formatter.println("(empty folder)");
        } else {
            formatter.println(&format!("No items match '{}'", session.query()));
        }
        return;
    }
    formatter.println(&render_page(
        formatter,
        &page,
        session.current_prefix(),
        session.selection(),
    ));
}

/// "0:home > 1:photos > 2:2024"
pub fn breadcrumb_line(crumbs: &[String]) -> String {
    crumbs
        .iter()
        .enumerate()
        .map(|(i, crumb)| format!("{i}:{crumb}"))
        .collect::<Vec<_>>()
        .join(" > ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breadcrumb_line() {
        let crumbs = vec!["home".to_string(), "photos".to_string(), "2024".to_string()];
        assert_eq!(breadcrumb_line(&crumbs), "0:home > 1:photos > 2:2024");
        assert_eq!(breadcrumb_line(&["home".to_string()]), "0:home");
    }
}
