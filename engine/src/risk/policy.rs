// src/risk/policy.rs

use serde::{Deserialize, Serialize};

use crate::profile::RiskPreference;
use crate::risk::stage::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskCapEntry {
    pub risk_preference: RiskPreference,
    pub stage: Stage,
    pub cap: f64, // max risk-score, 0..10
}

/// Lookup-tabel (risicoprofiel x stage) → maximale risico-score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCapTable {
    pub entries: Vec<RiskCapEntry>,
    /// Cap voor combinaties die niet in de tabel staan.
    pub fallback_cap: f64,
}

impl RiskCapTable {
    pub fn cap_for(&self, risk_preference: RiskPreference, stage: Stage) -> f64 {
        self.entries
            .iter()
            .find(|e| e.risk_preference == risk_preference && e.stage == stage)
            .map(|e| e.cap)
            .filter(|cap| cap.is_finite())
            .unwrap_or(self.fallback_cap)
    }
}

fn entry(risk_preference: RiskPreference, stage: Stage, cap: f64) -> RiskCapEntry {
    RiskCapEntry { risk_preference, stage, cap }
}

impl Default for RiskCapTable {
    fn default() -> Self {
        use RiskPreference::*;
        use Stage::*;

        Self {
            entries: vec![
                // Starter: kleine buffers, dus strakker
                entry(Conservative, Starter, 3.0),
                entry(Balanced, Starter, 4.5),
                entry(Growth, Starter, 6.0),
                // Builder
                entry(Conservative, Builder, 3.5),
                entry(Balanced, Builder, 5.0),
                entry(Growth, Builder, 6.5),
                // Established: meer ruimte
                entry(Conservative, Established, 4.0),
                entry(Balanced, Established, 5.5),
                entry(Growth, Established, 7.0),
            ],
            fallback_cap: 3.0,
        }
    }
}

/// Adaptieve cap met de default tabel.
pub fn adaptive_risk_cap(risk_preference: RiskPreference, stage: Stage) -> f64 {
    crate::config::default_config()
        .risk_caps
        .cap_for(risk_preference, stage)
}
