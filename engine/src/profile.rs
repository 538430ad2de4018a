// src/profile.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskPreference {
    Conservative,
    Balanced,
    Growth,
}

impl RiskPreference {
    pub const ALL: [RiskPreference; 3] = [
        RiskPreference::Conservative,
        RiskPreference::Balanced,
        RiskPreference::Growth,
    ];

    /// Onbekende waarden vallen terug op het meest conservatieve profiel.
    pub fn parse_lossy(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "conservative" => RiskPreference::Conservative,
            "balanced" => RiskPreference::Balanced,
            "growth" => RiskPreference::Growth,
            other => {
                debug!(value = other, "unknown risk preference, falling back to conservative");
                RiskPreference::Conservative
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskPreference::Conservative => "conservative",
            RiskPreference::Balanced => "balanced",
            RiskPreference::Growth => "growth",
        }
    }

    /// -1 / 0 / +1, gebruikt door de tier-correctie in de risico-score.
    pub fn sensitivity(&self) -> f64 {
        match self {
            RiskPreference::Conservative => -1.0,
            RiskPreference::Balanced => 0.0,
            RiskPreference::Growth => 1.0,
        }
    }
}

impl Default for RiskPreference {
    fn default() -> Self {
        RiskPreference::Conservative
    }
}

impl From<String> for RiskPreference {
    fn from(raw: String) -> Self {
        RiskPreference::parse_lossy(&raw)
    }
}

impl From<RiskPreference> for String {
    fn from(pref: RiskPreference) -> Self {
        pref.as_str().to_string()
    }
}

impl fmt::Display for RiskPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ====== Klantprofiel ======

/// Invoer voor de mix-adjuster. Bedragen in EUR.
///
/// Velden worden niet gevalideerd bij het inlezen; `sanitized()` klemt ze
/// naar het geldige domein.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientProfile {
    pub lump_sum_eur: f64,
    pub monthly_eur: f64,
    pub horizon_years: i64,

    pub monthly_income_eur: f64,
    pub fixed_expenses_eur: f64,
    pub variable_expenses_eur: f64,

    pub cash_reserve_eur: f64,
    pub reserve_target_months: f64,

    pub goal_assets_eur: f64,
    pub risk_preference: RiskPreference,
}

impl Default for ClientProfile {
    fn default() -> Self {
        Self {
            lump_sum_eur: 0.0,
            monthly_eur: 0.0,
            horizon_years: 10,
            monthly_income_eur: 0.0,
            fixed_expenses_eur: 0.0,
            variable_expenses_eur: 0.0,
            cash_reserve_eur: 0.0,
            reserve_target_months: 3.0,
            goal_assets_eur: 0.0,
            risk_preference: RiskPreference::Conservative,
        }
    }
}

impl ClientProfile {
    /// Compacte constructor voor de drie velden die de allocatie sturen.
    pub fn with_plan(lump_sum_eur: f64, monthly_eur: f64, horizon_years: i64) -> Self {
        Self {
            lump_sum_eur,
            monthly_eur,
            horizon_years,
            ..Self::default()
        }
    }

    pub fn with_risk_preference(mut self, risk_preference: RiskPreference) -> Self {
        self.risk_preference = risk_preference;
        self
    }

    /// Kopie met alle bedragen >= 0 en horizon >= 1 jaar.
    pub fn sanitized(&self) -> Self {
        let clamped = Self {
            lump_sum_eur: non_negative(self.lump_sum_eur),
            monthly_eur: non_negative(self.monthly_eur),
            horizon_years: self.horizon_years.max(1),
            monthly_income_eur: non_negative(self.monthly_income_eur),
            fixed_expenses_eur: non_negative(self.fixed_expenses_eur),
            variable_expenses_eur: non_negative(self.variable_expenses_eur),
            cash_reserve_eur: non_negative(self.cash_reserve_eur),
            reserve_target_months: non_negative(self.reserve_target_months),
            goal_assets_eur: non_negative(self.goal_assets_eur),
            risk_preference: self.risk_preference,
        };

        if clamped != *self {
            debug!("client profile contained out-of-domain values, clamped");
        }

        clamped
    }

    /// Horizon als positief aantal jaren.
    pub fn horizon(&self) -> u32 {
        self.horizon_years.clamp(1, u32::MAX as i64) as u32
    }

    /// Effectief planvolume: lump sum plus `months` maanden inleg.
    pub fn plan_volume_eur(&self, months: u32) -> f64 {
        non_negative(self.lump_sum_eur) + months as f64 * non_negative(self.monthly_eur)
    }

    pub fn monthly_expenses_eur(&self) -> f64 {
        non_negative(self.fixed_expenses_eur) + non_negative(self.variable_expenses_eur)
    }
}

/// Negatief, NaN of oneindig → 0.
pub(crate) fn non_negative(x: f64) -> f64 {
    if x.is_finite() { x.max(0.0) } else { 0.0 }
}
