//! Flattened tabular export of the session window.
//!
//! Column order is fixed: timestamp, junction_id, the four approach counts
//! (north, south, east, west), avg_speed, level, confidence, ns_green,
//! ew_green, delay_reduction_pct, alerts (semicolon-joined).

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

use super::TickRecord;

pub const CSV_HEADER: &str = "timestamp,junction_id,north,south,east,west,avg_speed,level,\
confidence,ns_green,ew_green,delay_reduction_pct,alerts";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(PipelineError::InvalidConfig(format!(
                "unknown export format '{other}' (expected csv or json)"
            ))),
        }
    }
}

/// One tick record flattened to scalar columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub timestamp: String,
    pub tick: u64,
    pub junction_id: String,
    pub north: u32,
    pub south: u32,
    pub east: u32,
    pub west: u32,
    pub avg_speed: f32,
    pub level: String,
    pub confidence: f32,
    pub ns_green: u32,
    pub ew_green: u32,
    pub delay_reduction_pct: f32,
    /// Alert summaries joined with `;`, empty when the tick raised none.
    pub alerts: String,
}

impl ExportRow {
    pub fn from_record(record: &TickRecord) -> Self {
        let s = &record.sample;
        let alerts: Vec<String> = record.alerts.iter().map(|a| a.summary_line()).collect();
        Self {
            timestamp: s.timestamp.formatted(),
            tick: s.tick,
            junction_id: s.junction_id.clone(),
            north: s.counts[0],
            south: s.counts[1],
            east: s.counts[2],
            west: s.counts[3],
            avg_speed: s.average_speed(),
            level: record.classification.level.label().to_string(),
            confidence: record.classification.confidence,
            ns_green: record.plan.ns_green,
            ew_green: record.plan.ew_green,
            delay_reduction_pct: record.plan.estimated_delay_reduction_pct,
            alerts: alerts.join(";"),
        }
    }

    fn write_csv_line(&self, out: &mut String) {
        let fields = [
            csv_field(&self.timestamp),
            csv_field(&self.junction_id),
            self.north.to_string(),
            self.south.to_string(),
            self.east.to_string(),
            self.west.to_string(),
            format!("{:.2}", self.avg_speed),
            csv_field(&self.level),
            format!("{:.3}", self.confidence),
            self.ns_green.to_string(),
            self.ew_green.to_string(),
            format!("{:.2}", self.delay_reduction_pct),
            csv_field(&self.alerts),
        ];
        let _ = writeln!(out, "{}", fields.join(","));
    }
}

/// Quote a field when it contains a separator, a quote or a line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub(super) fn encode(rows: &[ExportRow], format: ExportFormat) -> Vec<u8> {
    match format {
        ExportFormat::Csv => {
            let mut out = String::with_capacity(CSV_HEADER.len() + 1 + rows.len() * 96);
            out.push_str(CSV_HEADER);
            out.push('\n');
            for row in rows {
                row.write_csv_line(&mut out);
            }
            out.into_bytes()
        }
        // Plain structs of strings and numbers always serialize.
        ExportFormat::Json => serde_json::to_vec_pretty(rows).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::record;
    use super::super::SessionWindow;
    use super::*;
    use crate::alerts::AlertSeverity;

    #[test]
    fn test_empty_window_exports_header_only() {
        let window = SessionWindow::new(10);
        let bytes = window.export_bytes(ExportFormat::Csv);
        assert_eq!(String::from_utf8(bytes).unwrap(), format!("{CSV_HEADER}\n"));
        assert_eq!(window.export_bytes(ExportFormat::Json), b"[]".to_vec());
    }

    #[test]
    fn test_csv_row_layout() {
        let mut window = SessionWindow::new(10);
        window.push(record(1, [10, 12, 3, 4], 32.5, &[AlertSeverity::Medium]));
        let text = String::from_utf8(window.export_bytes(ExportFormat::Csv)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "Day 1 07:00:05,J-001,10,12,3,4,32.50,Moderate,0.500,50,30,4.00,Medium: Medium test alert"
        );
        assert_eq!(
            lines[0].split(',').count(),
            lines[1].split(',').count(),
            "header and row column counts differ"
        );
    }

    #[test]
    fn test_multiple_alerts_are_semicolon_joined() {
        let mut window = SessionWindow::new(10);
        window.push(record(2, [1, 1, 1, 1], 30.0, &[AlertSeverity::High, AlertSeverity::Low]));
        let row = &window.export()[0];
        assert_eq!(row.alerts, "High: High test alert;Low: Low test alert");
    }

    #[test]
    fn test_csv_field_escaping() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_json_export_parses_back() {
        let mut window = SessionWindow::new(10);
        for tick in 0..3 {
            window.push(record(tick, [5, 6, 7, 8], 41.0, &[]));
        }
        let bytes = window.export_bytes(ExportFormat::Json);
        let rows: Vec<ExportRow> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(rows, window.export());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(" json ".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xml".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Json.extension(), "json");
    }
}
