//! Report renderer: turns a [`Report`] into chat-ready markdown.

use statusbot_core::error::StatusBotError;
use statusbot_core::types::{Accent, RenderedReport};

use crate::aggregate::{ConnectionBucket, Report, Tally};

const HEADER: &str = "📊 **Record Status Report**";

/// Render a report. Empty reports get an explicit "no records" message.
pub fn render(report: &Report) -> RenderedReport {
    if report.is_empty() {
        return render_empty(report);
    }

    let hidden = if report.excluded_count > 0 {
        format!(" ({} excluded hidden)", report.excluded_count)
    } else {
        String::new()
    };

    let mut content = format!(
        "{HEADER}\n\n\
         **General Summary:**\n\
         • Total shown: {} record(s){hidden}\n\
         • Standard: {}\n\
         • Active: {} | Inactive: {}\n\n",
        report.visible_count, report.standard_count, report.active_count, report.inactive_count,
    );
    content.push_str(&format!(
        "**Connection Status:**\n{}\n\n",
        summary_line(&report.connections, ConnectionBucket::label)
    ));
    content.push_str(&format!(
        "**By Phase:**\n{}\n\n",
        summary_line(&report.phases, |k| format!("`{k}`"))
    ));
    content.push_str(&format!(
        "**By Marking:**\n{}\n\n",
        summary_line(&report.markings, |k| format!("`{k}`"))
    ));
    content.push_str(&report.lines.join("\n\n"));

    RenderedReport {
        content,
        accent: Accent::Success,
        error: None,
    }
}

fn render_empty(report: &Report) -> RenderedReport {
    let mut content = String::from("⚠️ **No records to display**\n\n");
    if report.total_received == 0 {
        content.push_str("The data source is reachable but holds no records.");
    } else {
        content.push_str(&format!(
            "No records outside the excluded categories.\n\n\
             **Total received:** {} record(s)\n\
             **Excluded (hidden):** {} record(s)",
            report.total_received, report.excluded_count
        ));
    }
    RenderedReport {
        content,
        accent: Accent::Warning,
        error: None,
    }
}

fn summary_line<K: PartialEq>(tally: &Tally<K>, label: impl Fn(&K) -> String) -> String {
    if tally.is_empty() {
        return "N/A".into();
    }
    tally
        .iter()
        .map(|(k, count)| format!("{}: {count}", label(k)))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Wrap an error message in the same template used for success.
pub fn render_error(message: &str) -> RenderedReport {
    RenderedReport {
        content: format!("❌ **Failed to fetch records**\n\n```\n{message}\n```"),
        accent: Accent::Error,
        error: Some(message.to_string()),
    }
}

/// Like [`render_error`], with the operator hint for known failure kinds.
pub fn render_failure(err: &StatusBotError) -> RenderedReport {
    let mut rendered = render_error(&err.to_string());
    if let Some(hint) = err.operator_hint() {
        rendered.content.push_str(&format!("\n\n**Hint:** {hint}"));
    }
    rendered
}
