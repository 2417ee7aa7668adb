use std::fmt::{Display, Write};

use crate::data_mgmt::models::{DeviceRecord, PowerMode};
use crate::data_mgmt::stats::PowerModeBreakdown;

const TABLE_OPEN: &str = r#"<table border="1" cellpadding="4" style="border-collapse: collapse;">"#;
const RECORD_COLUMNS: [&str; 6] = [
    "DeviceID",
    "DeviceName",
    "Organization",
    "EventTimeUTC",
    "Voltage",
    "PowerMode",
];

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

// One cell per line keeps the HTML mail part free of overlong lines
fn header_row(out: &mut String, columns: &[&str]) {
    out.push_str("<tr>\n");
    for column in columns {
        let _ = writeln!(out, "<th>{}</th>", escape(column));
    }
    out.push_str("</tr>\n");
}

fn cell(out: &mut String, value: impl Display) {
    let _ = writeln!(out, "<td>{value}</td>");
}

/// Device table; an empty list renders as a short note instead
pub fn records_table(records: &[&DeviceRecord]) -> String {
    if records.is_empty() {
        return "<p><em>No devices.</em></p>\n".to_string();
    }
    let mut out = String::new();
    out.push_str(TABLE_OPEN);
    out.push('\n');
    header_row(&mut out, &RECORD_COLUMNS);
    for r in records {
        out.push_str("<tr>\n");
        cell(&mut out, escape(&r.device_id));
        cell(&mut out, escape(r.device_name.as_deref().unwrap_or_default()));
        cell(&mut out, escape(r.organization.as_deref().unwrap_or_default()));
        cell(&mut out, r.event_time.format("%Y-%m-%d %H:%M:%S"));
        cell(&mut out, format!("{:.3}", r.voltage));
        cell(&mut out, r.power_mode);
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
    out
}

/// One row per group: device count, then count and share per power mode
pub fn breakdown_table(rows: &[(String, PowerModeBreakdown)]) -> String {
    let mut out = String::new();
    out.push_str(TABLE_OPEN);
    out.push('\n');
    let mut columns = vec!["Group", "Devices"];
    columns.extend(PowerMode::ALL.iter().map(|m| m.as_str()));
    header_row(&mut out, &columns);

    for (name, breakdown) in rows {
        out.push_str("<tr>\n");
        cell(&mut out, escape(name));
        cell(&mut out, breakdown.total);
        for mode in PowerMode::ALL {
            cell(
                &mut out,
                format!(
                    "{} ({})",
                    breakdown.count(mode),
                    format_percent(breakdown.percent(mode))
                ),
            );
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
    out
}
