use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::assigner::{AssignmentResult, Group};

pub struct ReportGenerator;

impl ReportGenerator {
    fn group_heading(group: &Group) -> String {
        if group.initial_load > 0 {
            format!(
                "Group {} (Total Pages: {}, carried over: {})",
                group.id, group.total, group.initial_load
            )
        } else {
            format!("Group {} (Total Pages: {})", group.id, group.total)
        }
    }

    /// Plain-text tables, one per group, for the terminal
    pub fn generate_text(result: &AssignmentResult) -> String {
        let mut text = String::new();

        for group in result.groups() {
            text.push_str(&Self::group_heading(group));
            text.push('\n');

            if group.items.is_empty() {
                text.push_str("  (no cases)\n\n");
                continue;
            }

            let width = group
                .items
                .iter()
                .map(|i| i.name.chars().count())
                .max()
                .unwrap_or(0)
                .max("Case Name".len());

            text.push_str(&format!("  {:<width$}  {:>5}\n", "Case Name", "Pages"));
            text.push_str(&format!("  {}  {}\n", "-".repeat(width), "-".repeat(5)));
            for item in &group.items {
                text.push_str(&format!("  {:<width$}  {:>5}\n", item.name, item.weight));
            }
            text.push('\n');
        }

        text.push_str(&format!(
            "{} cases, {} pages across {} groups (largest group: {} pages)\n",
            result.item_count(),
            result.total_weight(),
            result.num_groups(),
            result.makespan()
        ));

        text
    }

    /// One row per assigned case
    pub fn generate_rows_csv(result: &AssignmentResult) -> Result<String> {
        let mut wtr = Self::csv_writer();
        wtr.write_record(["Group", "Case Name", "Pages", "Group Total"])?;

        for group in result.groups() {
            for item in &group.items {
                wtr.write_record([
                    group.id.to_string(),
                    item.name.clone(),
                    item.weight.to_string(),
                    group.total.to_string(),
                ])?;
            }
        }

        Self::finish_csv(wtr)
    }

    /// One row per group
    pub fn generate_summary_csv(result: &AssignmentResult) -> Result<String> {
        let mut wtr = Self::csv_writer();
        wtr.write_record(["Group", "Initial Load", "Cases", "Total Pages"])?;

        for group in result.groups() {
            wtr.write_record([
                group.id.to_string(),
                group.initial_load.to_string(),
                group.items.len().to_string(),
                group.total.to_string(),
            ])?;
        }

        Self::finish_csv(wtr)
    }

    fn csv_writer() -> csv::Writer<Vec<u8>> {
        csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new())
    }

    fn finish_csv(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
        let bytes = wtr
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e.error()))?;

        String::from_utf8(bytes).context("CSV output is not valid UTF-8")
    }

    pub fn generate_html(result: &AssignmentResult, title: &str, date: DateTime<Utc>) -> String {
        let mut html = String::new();

        // Format date as "Sunday, 1 February 2026"
        let formatted_date = date.format("%A, %-d %B %Y").to_string();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("  <meta charset=\"UTF-8\">\n");
        html.push_str(&format!(
            "  <title>{} - {}</title>\n",
            Self::escape_html(title),
            formatted_date
        ));
        html.push_str("  <style>\n");
        html.push_str("    body { font-family: Arial, sans-serif; max-width: 900px; margin: 40px auto; padding: 0 20px; line-height: 1.6; }\n");
        html.push_str("    h1 { color: #2c3e50; border-bottom: 3px solid #3498db; padding-bottom: 10px; text-align: center; }\n");
        html.push_str("    h1 .date { display: block; font-size: 0.6em; font-weight: normal; color: #555; }\n");
        html.push_str("    h2 { color: #34495e; padding: 10px; background-color: #ecf0f1; border-left: 4px solid #3498db; }\n");
        html.push_str("    table { border-collapse: collapse; width: 100%; margin-bottom: 20px; }\n");
        html.push_str("    th, td { border: 1px solid #ddd; padding: 6px 10px; text-align: left; }\n");
        html.push_str("    td.pages, th.pages { text-align: right; width: 80px; }\n");
        html.push_str("    .carried { color: #7f8c8d; font-size: 0.9em; }\n");
        html.push_str("    .empty { color: #7f8c8d; font-style: italic; }\n");
        html.push_str("  </style>\n");
        html.push_str("</head>\n<body>\n");

        html.push_str(&format!(
            "<h1>{}<span class=\"date\">{}</span></h1>\n",
            Self::escape_html(title),
            formatted_date
        ));

        // Summary table
        html.push_str("<h2>Summary</h2>\n<table>\n");
        html.push_str("  <tr><th>Group</th><th class=\"pages\">Cases</th><th class=\"pages\">Pages</th></tr>\n");
        for group in result.groups() {
            html.push_str(&format!(
                "  <tr><td>Group {}</td><td class=\"pages\">{}</td><td class=\"pages\">{}</td></tr>\n",
                group.id,
                group.items.len(),
                group.total
            ));
        }
        html.push_str("</table>\n");

        for group in result.groups() {
            html.push_str(&format!(
                "<h2>Group {} (Total Pages: {})</h2>\n",
                group.id, group.total
            ));
            if group.initial_load > 0 {
                html.push_str(&format!(
                    "<p class=\"carried\">Includes {} pages carried over from earlier assignments.</p>\n",
                    group.initial_load
                ));
            }

            if group.items.is_empty() {
                html.push_str("<p class=\"empty\">No cases assigned.</p>\n");
                continue;
            }

            html.push_str("<table>\n");
            html.push_str("  <tr><th>Case Name</th><th class=\"pages\">Pages</th></tr>\n");
            for item in &group.items {
                html.push_str(&format!(
                    "  <tr><td>{}</td><td class=\"pages\">{}</td></tr>\n",
                    Self::escape_html(&item.name),
                    item.weight
                ));
            }
            html.push_str("</table>\n");
        }

        html.push_str("</body>\n</html>");
        html
    }

    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    /// Documents directory, falling back to the current directory
    pub fn default_output_dir() -> PathBuf {
        dirs::document_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn save(
        content: &str,
        dir: &Path,
        stem: &str,
        extension: &str,
        date: DateTime<Utc>,
    ) -> Result<PathBuf> {
        let filename = format!("{}-{}.{}", stem, date.format("%Y-%m-%d-%H%M%S"), extension);
        let filepath = dir.join(&filename);

        fs::write(&filepath, content)
            .with_context(|| format!("Failed to write {}", filepath.display()))?;

        Ok(filepath)
    }
}
