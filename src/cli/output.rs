//! Output formatting utilities for the CLI.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::style;
use serde::Serialize;

use crate::domain::models::compromise::ImpactLevel;
use crate::domain::models::processing::ProcessingStatus;

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Borderless list table with upper-cased headers.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

pub fn styled_status(status: ProcessingStatus) -> String {
    let label = status.as_str();
    match status {
        ProcessingStatus::Compromised => style(label).green().to_string(),
        ProcessingStatus::NotNeeded => style(label).dim().to_string(),
        ProcessingStatus::NoStrategy => style(label).yellow().to_string(),
        ProcessingStatus::Failed => style(label).red().bold().to_string(),
    }
}

pub fn styled_impact(level: ImpactLevel) -> String {
    let label = level.as_str();
    match level {
        ImpactLevel::Low => style(label).green().to_string(),
        ImpactLevel::Medium => style(label).yellow().to_string(),
        ImpactLevel::High => style(label).red().to_string(),
        ImpactLevel::Critical => style(label).red().bold().to_string(),
    }
}

pub fn heading(text: &str) -> String {
    style(text).bold().underlined().to_string()
}
