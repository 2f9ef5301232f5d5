//! Table rendering for one page of a folder

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, CellAlignment, Table};
use jiff::Timestamp;

use s3nav_core::{NavigationItem, PageView, Selection};

use super::Formatter;

/// Render `page` as a table, marking selected items
pub fn render_page(
    formatter: &Formatter,
    page: &PageView,
    current_prefix: &str,
    selection: &Selection,
) -> String {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec!["", "Name", "Size", "Modified"]);

    for item in &page.items {
        let mark = if selection.is_selected(item.key()) {
            "[x]"
        } else {
            "[ ]"
        };
        let name = item.display_name(current_prefix);
        let name = match item {
            NavigationItem::Folder { .. } => formatter.folder(&format!("{name}/")),
            NavigationItem::File { .. } => name,
        };
        table.add_row(vec![
            Cell::new(mark),
            Cell::new(name),
            Cell::new(item.size_human().unwrap_or_default()).set_alignment(CellAlignment::Right),
            Cell::new(item.last_modified().map(format_modified).unwrap_or_default()),
        ]);
    }

    let footer = formatter.dim(&format!(
        "Page {}/{} · {} item(s) · {} per page",
        page.page_index, page.total_pages, page.total_items, page.page_size
    ));
    format!("{table}\n{footer}")
}

/// Modification time as shown in listings
pub fn format_modified(timestamp: Timestamp) -> String {
    timestamp.strftime("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputConfig;
    use s3nav_core::PageSize;
    use s3nav_core::pipeline::apply;

    fn plain() -> Formatter {
        Formatter::new(OutputConfig {
            no_color: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_format_modified() {
        let ts = Timestamp::from_second(1_700_000_000).unwrap();
        assert_eq!(format_modified(ts), "2023-11-14 22:13:20");
    }

    #[test]
    fn test_render_page_marks_selection() {
        let items = vec![
            NavigationItem::folder("docs/img/"),
            NavigationItem::file("docs/a.txt", 2048),
        ];
        let page = apply(&items, "", PageSize::Ten, 1, "docs/");
        let mut selection = Selection::new();
        selection.select("docs/a.txt", true);

        let rendered = render_page(&plain(), &page, "docs/", &selection);
        let lines: Vec<&str> = rendered.lines().collect();
        let folder = lines.iter().find(|l| l.contains("img/")).unwrap();
        let file = lines.iter().find(|l| l.contains("a.txt")).unwrap();
        assert!(folder.contains("[ ]"));
        assert!(file.contains("[x]"));
        assert!(file.contains("KiB"));
        assert!(rendered.contains("Page 1/1"));
        assert!(rendered.contains("2 item(s)"));
    }
}
