// src/analytics.rs

use crate::config::TrackerSettings;
use crate::record::LoadRecord;
use std::collections::{BTreeMap, HashMap};

/// A record with its rate checked against the drayage + chassis model.
#[derive(Debug, Clone)]
pub struct ProcessedLoad<'a> {
    pub record: &'a LoadRecord,
    pub parsed_rate: f64,
    pub chassis_count: u32,
    pub expected_rate: f64,
    pub mismatch: bool,
}

/// Parse a stored rate, tolerating `$` and thousands separators. Unparsable is 0.
pub fn parse_rate(raw: &str) -> f64 {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

pub fn process<'a>(records: &'a [LoadRecord], settings: &TrackerSettings) -> Vec<ProcessedLoad<'a>> {
    records
        .iter()
        .map(|record| {
            let parsed_rate = parse_rate(&record.rate);
            let days = ((parsed_rate - settings.drayage_rate) / settings.chassis_rate).round_ties_even();
            let chassis_count = if days.is_finite() && days > 0.0 { days as u32 } else { 0 };
            let expected_rate = settings.drayage_rate + chassis_count as f64 * settings.chassis_rate;
            ProcessedLoad {
                record,
                parsed_rate,
                chassis_count,
                expected_rate,
                mismatch: parsed_rate != expected_rate,
            }
        })
        .collect()
}

/// Dashboard KPIs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    pub total_loads: usize,
    pub total_revenue: f64,
    pub avg_rate_per_load: f64,
    pub drayage_revenue: f64,
    pub chassis_revenue: f64,
    /// Revenue from loads whose rate doesn't fit drayage + chassis.
    pub non_standard_revenue: f64,
    pub total_chassis_units: u64,
    pub avg_chassis_per_load: f64,
    pub mismatched_count: usize,
}

pub fn metrics(records: &[LoadRecord], settings: &TrackerSettings) -> Metrics {
    let loads = process(records, settings);
    if loads.is_empty() {
        return Metrics::default();
    }

    let total_loads = loads.len();
    let total_revenue: f64 = loads.iter().map(|l| l.parsed_rate).sum();
    let total_chassis_units: u64 = loads.iter().map(|l| u64::from(l.chassis_count)).sum();
    let mismatched: Vec<&ProcessedLoad> = loads.iter().filter(|l| l.mismatch).collect();

    Metrics {
        total_loads,
        total_revenue,
        avg_rate_per_load: total_revenue / total_loads as f64,
        drayage_revenue: total_loads as f64 * settings.drayage_rate,
        chassis_revenue: total_chassis_units as f64 * settings.chassis_rate,
        non_standard_revenue: mismatched.iter().map(|l| l.parsed_rate).sum(),
        total_chassis_units,
        avg_chassis_per_load: total_chassis_units as f64 / total_loads as f64,
        mismatched_count: mismatched.len(),
    }
}

/// Loads per chassis count, ascending by count.
pub fn chassis_distribution(records: &[LoadRecord], settings: &TrackerSettings) -> Vec<(u32, usize)> {
    let mut dist: BTreeMap<u32, usize> = BTreeMap::new();
    for load in process(records, settings) {
        *dist.entry(load.chassis_count).or_default() += 1;
    }
    dist.into_iter().collect()
}

/// The `limit` most common equipment types; ties broken by name.
pub fn top_equipment(records: &[LoadRecord], limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.equipment.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, n)| (name.to_string(), n))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}
