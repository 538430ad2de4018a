// src/risk/profiles.rs

use crate::assets::{AssetKey, AssetSpec, AssetTable};
use crate::config::{AvailabilityRule, EnforcementConfig, PlannerConfig, PresetTuning};
use crate::risk::{RiskCapEntry, RiskCapTable, StageThresholds};

/// Convenience helper voor het aanmaken van een asset-spec.
fn mk_asset(
    key: AssetKey,
    risk_weight: f64,
    expected_yield: f64,
    min_investment_eur: Option<f64>,
) -> AssetSpec {
    AssetSpec {
        key,
        risk_weight,
        expected_yield,
        min_investment_eur,
        floor_pct: 0.0,
    }
}

/// Default risico- en rendementsgewichten per asset-klasse.
pub fn default_asset_specs() -> Vec<AssetSpec> {
    vec![
        mk_asset(AssetKey::Cash, 0.5, 0.020, None),
        // Directe obligaties: pas vanaf een flinke coupure
        mk_asset(AssetKey::Bonds, 2.5, 0.030, Some(10_000.0)),
        mk_asset(AssetKey::Etf, 6.5, 0.070, None),
        // Fysiek goud, kleinste zinnige baar
        mk_asset(AssetKey::Gold, 5.0, 0.035, Some(2_500.0)),
        mk_asset(AssetKey::Dynamic, 7.0, 0.060, None),
        mk_asset(AssetKey::Crypto, 9.5, 0.090, None),
    ]
}

pub fn default_asset_table() -> AssetTable {
    AssetTable::new(default_asset_specs())
}

/// Standaard-calibratie. Dit is de enige bron van waarheid voor de
/// drempels; de binaries kunnen hem vervangen via `PLANNER_CONFIG`.
pub fn default_planner_config() -> PlannerConfig {
    PlannerConfig {
        assets: default_asset_specs(),
        availability: vec![
            // Alternatieven pas bij serieus kapitaal en wat horizon
            AvailabilityRule {
                key: AssetKey::Dynamic,
                unlock_volume_eur: 15_000.0,
                min_horizon_years: 3,
            },
            // Crypto: klein bedrag mag, maar alleen met lange horizon
            AvailabilityRule {
                key: AssetKey::Crypto,
                unlock_volume_eur: 5_000.0,
                min_horizon_years: 5,
            },
        ],
        plan_volume_months: 12,
        stage: StageThresholds::default(),
        risk_caps: RiskCapTable::default(),
        enforcement: EnforcementConfig::default(),
        presets: PresetTuning::default(),
    }
}

/// Voorzichtiger profiel: hogere drempels, caps een half punt lager en
/// fijnere stappen in de cap-loop.
pub fn cautious_planner_config() -> PlannerConfig {
    let mut assets = default_asset_specs();
    for a in assets.iter_mut() {
        match a.key {
            AssetKey::Bonds => a.min_investment_eur = Some(25_000.0),
            AssetKey::Gold => a.min_investment_eur = Some(5_000.0),
            _ => {}
        }
    }

    let risk_caps = RiskCapTable {
        entries: RiskCapTable::default()
            .entries
            .into_iter()
            .map(|e| RiskCapEntry {
                cap: (e.cap - 0.5).max(0.0),
                ..e
            })
            .collect(),
        fallback_cap: 2.5,
    };

    PlannerConfig {
        assets,
        availability: vec![
            AvailabilityRule {
                key: AssetKey::Dynamic,
                unlock_volume_eur: 50_000.0,
                min_horizon_years: 5,
            },
            AvailabilityRule {
                key: AssetKey::Crypto,
                unlock_volume_eur: 25_000.0,
                min_horizon_years: 10,
            },
        ],
        plan_volume_months: 12,
        stage: StageThresholds {
            starter_capital_eur: 25_000.0,
            ..StageThresholds::default()
        },
        risk_caps,
        enforcement: EnforcementConfig {
            step_pp: 0.5,
            ..EnforcementConfig::default()
        },
        presets: PresetTuning::default(),
    }
}
