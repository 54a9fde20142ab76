//! IA map exports
//!
//! Renders an [`IaResult`] as a plain indented tree, a CSV table, a Markdown
//! link list, or JSON. Every format emits one entry per top-level node and
//! one nested entry per child, section by section.

use crate::error::Result;
use crate::extraction::{IaResult, LinkNode, Section};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Indented text tree
    #[default]
    Txt,
    /// Table with section, text, url and depth columns
    Csv,
    /// Nested Markdown link list
    Md,
    /// Pretty-printed JSON
    Json,
}

impl ExportFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Md => "md",
            ExportFormat::Json => "json",
        }
    }

    /// MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "text/plain",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Md => "text/markdown",
            ExportFormat::Json => "application/json",
        }
    }
}

/// Render `ia` in the requested format
pub fn render(ia: &IaResult, format: ExportFormat) -> Result<String> {
    Ok(match format {
        ExportFormat::Txt => render_text(ia),
        ExportFormat::Csv => render_csv(ia),
        ExportFormat::Md => render_markdown(ia),
        ExportFormat::Json => serde_json::to_string_pretty(ia)?,
    })
}

fn heading(section: Section) -> &'static str {
    match section {
        Section::Gnb => "GNB Menu",
        Section::Side => "Side Menu",
        Section::Footer => "Footer Menu",
        Section::Other => "Other Links",
    }
}

fn empty_notice(section: Section) -> String {
    format!("No {} data", section.label())
}

/// Indented text tree
pub fn render_text(ia: &IaResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Site IA map ({})", ia.base_url);
    let _ = writeln!(out, "{}\n", "=".repeat(50));

    for (index, (section, nodes)) in ia.sections().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "📌 {}", heading(section));
        if nodes.is_empty() {
            let _ = writeln!(out, "├── {}", empty_notice(section));
        }
        for node in nodes {
            let _ = writeln!(out, "├── {} - {}", node.text, node.url);
            for child in &node.children {
                let _ = writeln!(out, "│   ├── {} - {}", child.text, child.url);
            }
        }
    }
    out
}

/// CSV table with a UTF-8 BOM so spreadsheet tools pick the right encoding
pub fn render_csv(ia: &IaResult) -> String {
    let mut out = String::from("\u{feff}section,text,url,depth\n");
    for (section, nodes) in ia.sections() {
        for node in nodes {
            push_csv_row(&mut out, section, node);
            for child in &node.children {
                push_csv_row(&mut out, section, child);
            }
        }
    }
    out
}

fn push_csv_row(out: &mut String, section: Section, node: &LinkNode) {
    let _ = writeln!(
        out,
        "{},{},{},{}",
        csv_field(section.label()),
        csv_field(&node.text),
        csv_field(&node.url),
        node.depth
    );
}

/// Quote a field when it contains a delimiter, quote, or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Nested Markdown link list
pub fn render_markdown(ia: &IaResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Site IA map ({})", ia.base_url);

    for (section, nodes) in ia.sections() {
        let _ = writeln!(out, "\n## 📌 {}\n", heading(section));
        if nodes.is_empty() {
            let _ = writeln!(out, "{}", empty_notice(section));
        }
        for node in nodes {
            let _ = writeln!(out, "- [{}]({})", md_text(&node.text), node.url);
            for child in &node.children {
                let _ = writeln!(out, "  - [{}]({})", md_text(&child.text), child.url);
            }
        }
    }
    out
}

fn md_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}
