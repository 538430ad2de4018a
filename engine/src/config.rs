// src/config.rs

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assets::{AssetKey, AssetSpec, AssetTable, MAX_RISK_SCORE};
use crate::error::{PlannerError, Result};
use crate::risk::{RiskCapTable, StageThresholds, cautious_planner_config, default_planner_config};

// ====== Config structs ======

/// Kleinste stap in de cap-loop; houdt de iteratiegrens op ~10k.
pub const MIN_STEP_PP: f64 = 0.01;

/// Ontgrendeling van een asset op kapitaal + horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub key: AssetKey,
    pub unlock_volume_eur: f64,
    #[serde(default)]
    pub min_horizon_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnforcementConfig {
    /// Procentpunten per verschuiving in de cap-loop.
    pub step_pp: f64,
    /// Tier-gevoeligheid in de risico-score: `1 + factor * sensitivity`.
    pub tier_adjustment_factor: f64,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            step_pp: 1.0,
            tier_adjustment_factor: 0.05,
        }
    }
}

impl EnforcementConfig {
    /// Harde bovengrens voor de cap-loop: elke iteratie verschuift een volle
    /// stap of maakt een donor leeg.
    pub fn max_iterations(&self, assets: usize) -> usize {
        let step = self.effective_step();
        (100.0 / step).ceil() as usize + assets + 1
    }

    pub fn effective_step(&self) -> f64 {
        if self.step_pp.is_finite() && self.step_pp > 0.0 {
            self.step_pp.clamp(MIN_STEP_PP, 100.0)
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresetTuning {
    /// Planvolume waaronder obligaties in de default-mix naar cash/ETF gaan.
    pub small_plan_eur: f64,
    /// Horizon vanaf waar niet-conservatieve profielen cash → ETF kantelen.
    pub long_horizon_years: u32,
    pub long_horizon_tilt_pp: f64,
}

impl Default for PresetTuning {
    fn default() -> Self {
        Self {
            small_plan_eur: 10_000.0,
            long_horizon_years: 20,
            long_horizon_tilt_pp: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub assets: Vec<AssetSpec>,
    #[serde(default)]
    pub availability: Vec<AvailabilityRule>,
    /// Maanden inleg die meetellen in het effectieve planvolume.
    pub plan_volume_months: u32,
    #[serde(default)]
    pub stage: StageThresholds,
    #[serde(default)]
    pub risk_caps: RiskCapTable,
    #[serde(default)]
    pub enforcement: EnforcementConfig,
    #[serde(default)]
    pub presets: PresetTuning,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        default_planner_config()
    }
}

impl PlannerConfig {
    pub fn asset_table(&self) -> AssetTable {
        AssetTable::new(self.assets.clone())
    }

    pub fn availability_rule(&self, key: AssetKey) -> Option<&AvailabilityRule> {
        self.availability.iter().find(|r| r.key == key)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let cfg: PlannerConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| PlannerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        // 1) Assets: uniek, eindige niet-negatieve gewichten
        let mut seen = HashSet::new();
        for a in &self.assets {
            if !seen.insert(a.key) {
                return Err(PlannerError::invalid_config(format!(
                    "asset {:?} is listed more than once",
                    a.key
                )));
            }
            if !a.risk_weight.is_finite() || !(0.0..=MAX_RISK_SCORE).contains(&a.risk_weight) {
                return Err(PlannerError::invalid_config(format!(
                    "asset {:?}: risk_weight must be within 0..=10, got {}",
                    a.key, a.risk_weight
                )));
            }
            if !a.expected_yield.is_finite() {
                return Err(PlannerError::invalid_config(format!(
                    "asset {:?}: expected_yield must be finite",
                    a.key
                )));
            }
            if let Some(min) = a.min_investment_eur {
                if !min.is_finite() || min < 0.0 {
                    return Err(PlannerError::invalid_config(format!(
                        "asset {:?}: min_investment_eur must be >= 0, got {}",
                        a.key, min
                    )));
                }
            }
            if !a.floor_pct.is_finite() || !(0.0..=100.0).contains(&a.floor_pct) {
                return Err(PlannerError::invalid_config(format!(
                    "asset {:?}: floor_pct must be within 0..=100, got {}",
                    a.key, a.floor_pct
                )));
            }
        }
        match self.assets.iter().find(|a| a.key == AssetKey::Cash) {
            None => return Err(PlannerError::invalid_config("asset table must contain cash")),
            Some(cash) if cash.min_investment_eur.is_some_and(|m| m > 0.0) => {
                return Err(PlannerError::invalid_config(
                    "cash must not carry a minimum investment",
                ));
            }
            Some(_) => {}
        }
        // Cash is het vangnet van herverdeling en cap-loop
        if self.availability_rule(AssetKey::Cash).is_some() {
            return Err(PlannerError::invalid_config("cash must not have an availability rule"));
        }

        // 2) Availability
        for r in &self.availability {
            if !r.unlock_volume_eur.is_finite() || r.unlock_volume_eur < 0.0 {
                return Err(PlannerError::invalid_config(format!(
                    "availability {:?}: unlock_volume_eur must be >= 0",
                    r.key
                )));
            }
        }

        // 3) Caps + loop
        for e in &self.risk_caps.entries {
            if !e.cap.is_finite() || !(0.0..=MAX_RISK_SCORE).contains(&e.cap) {
                return Err(PlannerError::invalid_config(format!(
                    "risk cap {:?}/{:?} must be within 0..=10, got {}",
                    e.risk_preference, e.stage, e.cap
                )));
            }
        }
        if !self.risk_caps.fallback_cap.is_finite()
            || !(0.0..=MAX_RISK_SCORE).contains(&self.risk_caps.fallback_cap)
        {
            return Err(PlannerError::invalid_config("fallback_cap must be within 0..=10"));
        }
        if !self.enforcement.step_pp.is_finite()
            || !(MIN_STEP_PP..=100.0).contains(&self.enforcement.step_pp)
        {
            return Err(PlannerError::invalid_config(format!(
                "enforcement.step_pp must be within {}..=100, got {}",
                MIN_STEP_PP, self.enforcement.step_pp
            )));
        }

        Ok(())
    }
}

// ====== Selectie via environment ======

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerProfile {
    Default,
    Cautious,
}

impl PlannerProfile {
    pub fn from_env() -> Self {
        match env::var("PLANNER_PROFILE") {
            Ok(val) => Self::parse(&val),
            Err(_) => PlannerProfile::Default,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "cautious" => PlannerProfile::Cautious,
            // onbekend → default
            _ => PlannerProfile::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlannerProfile::Default => "default",
            PlannerProfile::Cautious => "cautious",
        }
    }

    pub fn config(&self) -> PlannerConfig {
        match self {
            PlannerProfile::Default => default_planner_config(),
            PlannerProfile::Cautious => cautious_planner_config(),
        }
    }
}

/// `PLANNER_CONFIG` (JSON-bestand) wint van `PLANNER_PROFILE`.
pub fn load_from_env() -> Result<PlannerConfig> {
    if let Ok(path) = env::var("PLANNER_CONFIG") {
        info!(path = %path, "loading planner config from file");
        return PlannerConfig::from_json_file(path);
    }

    let profile = PlannerProfile::from_env();
    info!(profile = profile.as_str(), "using built-in planner profile");
    Ok(profile.config())
}

static DEFAULT_CONFIG: LazyLock<PlannerConfig> = LazyLock::new(default_planner_config);

/// Gedeelde, read-only default-calibratie.
pub fn default_config() -> &'static PlannerConfig {
    &DEFAULT_CONFIG
}
