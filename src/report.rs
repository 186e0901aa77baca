// src/report.rs

use crate::analytics::{self, Metrics};
use crate::config::TrackerSettings;
use crate::intake::IntakeReport;
use crate::record::LoadRecord;
use std::fmt::Write;

const DISPLAY_COLUMNS: [&str; 9] = [
    "Date Added",
    "Customer",
    "Reference #",
    "Equipment",
    "Container #",
    "Rate",
    "Chassis Count",
    "Status",
    "Notes",
];

const BAR_WIDTH: usize = 40;

/// `1234567.891` -> `$1,234,567.89`
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// `12345` -> `12,345`
pub fn format_count(n: u64) -> String {
    group_thousands(&n.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn render_metrics(m: &Metrics) -> String {
    if m.total_loads == 0 {
        return "No data available to display metrics.\n".to_string();
    }

    let mut out = String::new();
    let mut section = |title: &str, rows: &[(&str, String)]| {
        let _ = writeln!(out, "{title}");
        for (label, value) in rows {
            let _ = writeln!(out, "  {label:<28} {value:>16}");
        }
        out.push('\n');
    };

    section(
        "Key Performance Indicators",
        &[
            ("Total Loads", format_count(m.total_loads as u64)),
            ("Total Revenue", format_currency(m.total_revenue)),
            ("Average Rate / Load", format_currency(m.avg_rate_per_load)),
        ],
    );
    section(
        "Revenue Breakdown",
        &[
            ("Total Drayage Revenue", format_currency(m.drayage_revenue)),
            ("Total Chassis Revenue", format_currency(m.chassis_revenue)),
            ("Non-Standard Revenue", format_currency(m.non_standard_revenue)),
        ],
    );
    section(
        "Operational & Quality Statistics",
        &[
            ("Total Chassis Units Billed", format_count(m.total_chassis_units)),
            ("Avg. Chassis Days / Load", format!("{:.1}", m.avg_chassis_per_load)),
            ("Mismatched Rates", m.mismatched_count.to_string()),
        ],
    );
    out
}

/// Horizontal text bars, scaled so the largest count fills `BAR_WIDTH`.
pub fn render_bars(title: &str, rows: &[(String, usize)]) -> String {
    let mut out = format!("{title}\n");
    let Some(max) = rows.iter().map(|(_, n)| *n).max() else {
        return out;
    };
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    for (label, n) in rows {
        let len = (n * BAR_WIDTH).div_ceil(max.max(1));
        let _ = writeln!(out, "  {label:<label_width$} | {} {n}", "#".repeat(len));
    }
    out
}

pub fn render_charts(records: &[LoadRecord], settings: &TrackerSettings) -> String {
    if records.is_empty() {
        return String::new();
    }
    let chassis: Vec<(String, usize)> = analytics::chassis_distribution(records, settings)
        .into_iter()
        .map(|(days, n)| (days.to_string(), n))
        .collect();
    let equipment = analytics::top_equipment(records, 10);

    let mut out = render_bars("Loads by Chassis Count", &chassis);
    out.push('\n');
    out.push_str(&render_bars("Top 10 Loads by Equipment Type", &equipment));
    out
}

/// Record table; rows whose rate doesn't fit the chassis model are marked with `!`.
pub fn render_table(records: &[LoadRecord], settings: &TrackerSettings) -> String {
    if records.is_empty() {
        return String::new();
    }
    let loads = analytics::process(records, settings);
    let rows: Vec<[String; 9]> = loads
        .iter()
        .map(|l| {
            let r = l.record;
            [
                r.date_added.clone(),
                r.customer.clone(),
                r.reference.clone(),
                r.equipment.clone(),
                r.container.clone(),
                format_currency(l.parsed_rate),
                l.chassis_count.to_string(),
                r.status.clone(),
                r.notes.clone(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = DISPLAY_COLUMNS.iter().map(|c| c.len()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<&str> = DISPLAY_COLUMNS.to_vec();
    push_row(&mut out, ' ', &header, &widths);
    for (row, load) in rows.iter().zip(&loads) {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        push_row(&mut out, if load.mismatch { '!' } else { ' ' }, &cells, &widths);
    }
    out
}

fn push_row(out: &mut String, flag: char, cells: &[&str], widths: &[usize]) {
    out.push(flag);
    for (cell, w) in cells.iter().zip(widths) {
        let _ = write!(out, " {cell:<w$} ");
    }
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out.push('\n');
}

pub fn render_intake(report: &IntakeReport, settings: &TrackerSettings) -> String {
    let mut out = String::new();
    if report.accepted.is_empty() {
        out.push_str("No new records.\n");
    } else {
        let _ = writeln!(out, "New records ({}):", report.accepted.len());
        for r in &report.accepted {
            let _ = writeln!(
                out,
                "  {:<16} {:>12}  {:<20} {:<14} {}",
                r.reference,
                format_currency(analytics::parse_rate(&r.rate)),
                r.equipment,
                r.container,
                r.file
            );
        }
        for load in analytics::process(&report.accepted, settings)
            .iter()
            .filter(|l| l.mismatch)
        {
            let _ = writeln!(
                out,
                "  ! {}: rate {} does not match drayage + chassis ({})",
                load.record.reference,
                format_currency(load.parsed_rate),
                format_currency(load.expected_rate)
            );
        }
    }
    if !report.skipped.is_empty() {
        let _ = writeln!(out, "Skipped files ({}):", report.skipped.len());
        for s in &report.skipped {
            let _ = writeln!(out, "  {}: {}", s.file, s.reason);
        }
    }
    out
}
