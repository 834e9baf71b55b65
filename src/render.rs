//! Report rendering for the `run` subcommand.

use std::io::{self, Write};

use itertools::Itertools;
use lintree_core::{SubView, View};

/// Linters shown as columns: those enabled during the run plus any that
/// reported issues in the view.
fn columns(view: &View) -> Vec<&str> {
    view.linters
        .iter()
        .map(String::as_str)
        .chain(
            view.subviews
                .values()
                .flat_map(|subview| subview.issues.keys().map(String::as_str)),
        )
        .sorted()
        .dedup()
        .collect()
}

/// Sub-views ordered by depth, then by label.
fn rows(view: &View) -> Vec<&SubView> {
    view.subviews
        .values()
        .sorted_by(|a, b| {
            let depth = |s: &SubView| s.path.matches('/').count();
            depth(a).cmp(&depth(b)).then_with(|| a.path.cmp(&b.path))
        })
        .collect()
}

fn cell(subview: &SubView, linter: &str) -> String {
    format!(
        "{} ({:5.2})",
        subview.linter_issue_count(linter),
        subview.density(linter)
    )
}

fn aligned<'a>(fields: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    fields
        .zip(widths.iter().copied())
        .map(|(field, width)| format!("{field:<width$}"))
        .join("  ")
        .trim_end()
        .to_string()
}

/// Aligned plain-text table, one column per linter as `count (density)`.
pub fn text(view: &View, out: &mut impl Write) -> io::Result<()> {
    if view.subviews.is_empty() {
        return Ok(());
    }
    let linters = columns(view);
    let rows = rows(view);

    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|subview| {
            std::iter::once(subview.path.clone())
                .chain(linters.iter().map(|linter| cell(subview, linter)))
                .collect()
        })
        .collect();

    let header: Vec<&str> = std::iter::once("path").chain(linters.iter().copied()).collect();
    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(idx, title)| {
            table
                .iter()
                .map(|row| row[idx].len())
                .chain(std::iter::once(title.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    writeln!(
        out,
        "Quality report for Go codebase located at '{}'",
        view.path.display()
    )?;
    writeln!(out)?;
    writeln!(out, "{}", aligned(header.iter().copied(), &widths))?;
    for row in &table {
        writeln!(out, "{}", aligned(row.iter().map(String::as_str), &widths))?;
    }
    Ok(())
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Comma-separated table with a count and density column per linter.
pub fn csv(view: &View, out: &mut impl Write) -> io::Result<()> {
    let linters = columns(view);

    let header = ["path".to_string(), "lines".to_string()]
        .into_iter()
        .chain(
            linters
                .iter()
                .flat_map(|linter| [linter.to_string(), format!("{linter} density")]),
        )
        .map(|field| csv_field(&field))
        .join(",");
    writeln!(out, "{header}")?;

    for subview in rows(view) {
        let record = [csv_field(&subview.path), subview.line_count.to_string()]
            .into_iter()
            .chain(linters.iter().flat_map(|linter| {
                [
                    subview.linter_issue_count(linter).to_string(),
                    format!("{:.2}", subview.density(linter)),
                ]
            }))
            .join(",");
        writeln!(out, "{record}")?;
    }
    Ok(())
}

/// The whole view as pretty-printed JSON.
pub fn json(view: &View, out: &mut impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, view)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use lintree_core::Issue;

    use super::*;

    fn subview(path: &str, lines: u64, issues: &[(&str, usize)]) -> SubView {
        let issues: BTreeMap<String, Vec<Issue>> = issues
            .iter()
            .map(|(linter, count)| {
                let list = (0..*count)
                    .map(|line| Issue::new(*linter, "x", "a.go", line as u64 + 1, 1))
                    .collect();
                (linter.to_string(), list)
            })
            .collect();
        SubView {
            path: path.to_string(),
            issues,
            line_count: lines,
            recursive: path.ends_with("..."),
        }
    }

    fn view() -> View {
        let subviews = [
            subview("foo/dir/...", 500, &[("govet", 1)]),
            subview("bar/...", 1000, &[("unused", 2)]),
            subview(".", 250, &[]),
        ]
        .into_iter()
        .map(|s| (s.path.clone(), s))
        .collect();
        View {
            path: "/my/project".into(),
            subviews,
            linters: vec!["govet".into(), "unused".into()],
        }
    }

    fn rendered(render: fn(&View, &mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        render(&view(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_rows_sorted_by_depth_then_path() {
        let view = view();
        let order: Vec<&str> = rows(&view).iter().map(|s| s.path.as_str()).collect();
        assert_eq!(order, vec![".", "bar/...", "foo/dir/..."]);
    }

    #[test]
    fn test_text_table() {
        let output = rendered(|v, o| text(v, o));
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines[0],
            "Quality report for Go codebase located at '/my/project'"
        );
        assert!(lines[1].is_empty());
        assert!(lines[2].starts_with("path"));
        assert!(lines[2].contains("govet") && lines[2].contains("unused"));
        assert!(lines[3].starts_with(". "));
        assert!(lines[4].contains("2 ( 2.00)"));
        assert!(lines[5].starts_with("foo/dir/..."));
        assert!(lines[5].contains("1 ( 2.00)"));
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_text_empty_view_prints_nothing() {
        let mut out = Vec::new();
        text(&View::default(), &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_csv() {
        let output = rendered(|v, o| csv(v, o));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "path,lines,govet,govet density,unused,unused density");
        assert_eq!(lines[1], ".,250,0,0.00,0,0.00");
        assert_eq!(lines[2], "bar/...,1000,0,0.00,2,2.00");
        assert_eq!(lines[3], "foo/dir/...,500,1,2.00,0,0.00");
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_json() {
        let output = rendered(|v, o| json(v, o));
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["linters"], serde_json::json!(["govet", "unused"]));
        assert_eq!(value["subviews"]["bar/..."]["line_count"], 1000);
    }
}
