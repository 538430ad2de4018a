// src/reporting.rs

use std::io::{self, Write};

use serde::Serialize;

use crate::allocation::{AdjustedPreset, MixAdjuster, PortfolioPreset};
use crate::assets::MixEntry;
use crate::profile::ClientProfile;

#[derive(Debug, Clone, Serialize)]
pub struct AdjustmentLogEvent {
    /// Unix timestamp in UTC (seconden)
    pub ts_utc: i64,
    /// Profiel-id als string (bijv. "balanced")
    pub preset: String,
    pub stage: String,
    pub plan_volume_eur: f64,

    pub risk_cap: f64,
    pub risk_score: f64,
    pub expected_yield: f64,
    pub cap_converged: bool,

    pub mix: Vec<MixEntry>,
    pub warnings: Vec<String>,
}

impl AdjustmentLogEvent {
    pub fn from_adjusted_preset(ts_utc: i64, adjusted: &AdjustedPreset) -> Self {
        let info = &adjusted.result.info;

        Self {
            ts_utc,
            preset: adjusted.id.to_string(),
            stage: info.stage.to_string(),
            plan_volume_eur: info.plan_volume_eur,
            risk_cap: info.risk_cap_enforcement.cap,
            risk_score: info.risk_score,
            expected_yield: info.expected_yield,
            cap_converged: info.risk_cap_enforcement.converged,
            mix: adjusted.result.mix.clone(),
            warnings: adjusted
                .result
                .warning_messages()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Convenience: direct JSON-string van één event.
pub fn encode_adjustment_log_event_json(ts_utc: i64, adjusted: &AdjustedPreset) -> String {
    let evt = AdjustmentLogEvent::from_adjusted_preset(ts_utc, adjusted);
    serde_json::to_string(&evt).unwrap_or_else(|_| "{}".to_string())
}

/// Sink-interface voor adjustment-logs (JSON-per-regel).
pub trait AdjustmentLogSink {
    fn log(&mut self, line: &str);

    /// Optionele flush (default no-op).
    fn flush(&mut self) {}
}

#[derive(Debug, Default)]
pub struct InMemoryAdjustmentLog {
    pub lines: Vec<String>,
}

impl InMemoryAdjustmentLog {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }
}

impl AdjustmentLogSink for InMemoryAdjustmentLog {
    fn log(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Logger die JSON als één regel naar stdout schrijft.
///
/// In tests kun je `with_writer(...)` gebruiken met een in-memory buffer.
#[derive(Debug)]
pub struct StdoutAdjustmentLogger<W: Write = io::Stdout> {
    writer: W,
}

impl StdoutAdjustmentLogger {
    pub fn new() -> Self {
        Self {
            writer: io::stdout(),
        }
    }
}

impl Default for StdoutAdjustmentLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> StdoutAdjustmentLogger<W> {
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> AdjustmentLogSink for StdoutAdjustmentLogger<W> {
    fn log(&mut self, line: &str) {
        if let Err(e) = writeln!(self.writer, "{}", line) {
            // Logging mag de berekening nooit laten crashen.
            debug_assert!(false, "StdoutAdjustmentLogger: failed to write line: {:?}", e);
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            debug_assert!(false, "StdoutAdjustmentLogger: failed to flush writer: {:?}", e);
        }
    }
}

/// Adjust één preset en log het resultaat als één JSON-regel.
pub fn run_adjustment_with_logging(
    ts_utc: i64,
    adjuster: &MixAdjuster,
    preset: &PortfolioPreset,
    profile: &ClientProfile,
    sink: &mut impl AdjustmentLogSink,
) -> AdjustedPreset {
    let adjusted = adjuster.adjust_preset(preset, profile);
    sink.log(&encode_adjustment_log_event_json(ts_utc, &adjusted));
    adjusted
}
