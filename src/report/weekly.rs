use std::fmt::Write;

use crate::config::OrganizationRef;
use crate::data_mgmt::filters::{Fleet, FleetFilter};
use crate::data_mgmt::snapshot::DailySnapshot;
use crate::data_mgmt::stats::{self, PowerModeBreakdown};
use crate::helpers::time::{report_label, DATE_FORMAT};
use crate::interfaces::{Email, InlineImage};

use super::html;

pub const SUBJECT: &str = "Weekly Battery Report of ZIM's New PV Trackers";

/// One report date in the weekly email
pub struct Section<'a> {
    pub snapshot: &'a DailySnapshot,
    pub filter: FleetFilter,
    /// Missing when the chart could not be rendered
    pub chart_png: Option<Vec<u8>>,
}

/// Who gets the weekly email: everyone, or only the first recipient in debug mode
pub fn recipients_for(recipients: &[String], debug: bool) -> Vec<String> {
    if debug {
        recipients.iter().take(1).cloned().collect()
    } else {
        recipients.to_vec()
    }
}

/// The sent-dates log only follows tracking-mode emails that reached more than one recipient
pub fn should_update_log(tracking: bool, debug: bool, recipient_count: usize) -> bool {
    tracking && !debug && recipient_count > 1
}

fn section_html(section: &Section, content_id: &str, organizations: &[OrganizationRef]) -> String {
    let records = &section.snapshot.records;
    let filter = &section.filter;
    let mut out = String::new();

    let _ = writeln!(out, "<h3>{}</h3>", report_label(section.snapshot.date));
    out.push_str(r#"<div style="display: flex; align-items: flex-start; gap: 20px;">"#);
    out.push('\n');
    if section.chart_png.is_some() {
        let _ = writeln!(out, r#"<img src="cid:{content_id}" style="display:inline;">"#);
    }
    let low = filter.low_battery_new_pv(records);
    let _ = writeln!(
        out,
        "<div><h4>{} low battery ({})</h4>\n{}</div>",
        html::escape(Fleet::NewPv.title()),
        low.len(),
        html::records_table(&low)
    );
    out.push_str("</div>\n");

    let fleet_rows: Vec<(String, PowerModeBreakdown)> = std::iter::once(Fleet::NewPv)
        .chain(Fleet::SECONDARY)
        .map(|fleet| {
            (
                fleet.title().to_string(),
                PowerModeBreakdown::from_records(filter.select(fleet, records)),
            )
        })
        .collect();
    let _ = writeln!(out, "<h4>Fleets</h4>\n{}", html::breakdown_table(&fleet_rows));

    for fleet in Fleet::SECONDARY {
        let low = filter.low_battery(fleet, records);
        let _ = writeln!(
            out,
            "<h4>{} low battery ({})</h4>\n{}",
            html::escape(fleet.title()),
            low.len(),
            html::records_table(&low)
        );
    }

    let org_rows: Vec<_> = stats::by_organization(records, organizations)
        .into_iter()
        .map(|s| (s.name, s.breakdown))
        .collect();
    let _ = writeln!(
        out,
        "<h4>Fleet-wide Statistics</h4>\n{}<br>",
        html::breakdown_table(&org_rows)
    );
    out
}

/// Weekly email with one section per snapshot, in the order given
pub fn compose(sections: Vec<Section>, organizations: &[OrganizationRef]) -> Email {
    let mut body = String::from("<html>\n<body>\n");
    let mut images = Vec::new();

    for section in &sections {
        let content_id = format!("chart_{}", section.snapshot.date.format(DATE_FORMAT));
        body.push_str(&section_html(section, &content_id, organizations));
        if let Some(png) = &section.chart_png {
            images.push(InlineImage {
                content_id,
                png: png.clone(),
            });
        }
    }
    body.push_str("</body>\n</html>\n");

    Email {
        subject: SUBJECT.to_string(),
        html: body,
        images,
    }
}
