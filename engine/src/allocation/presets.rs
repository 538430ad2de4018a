// src/allocation/presets.rs

use serde::Serialize;

use crate::assets::{AssetKey, Mix, MixEntry, normalize_mix};
use crate::config::PlannerConfig;
use crate::profile::{ClientProfile, RiskPreference};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PortfolioPreset {
    pub id: RiskPreference,
    pub label: &'static str,
    pub mix: &'static [MixEntry],
}

const CONSERVATIVE_MIX: [MixEntry; 6] = [
    MixEntry::new(AssetKey::Cash, 30.0),
    MixEntry::new(AssetKey::Bonds, 40.0),
    MixEntry::new(AssetKey::Etf, 20.0),
    MixEntry::new(AssetKey::Gold, 10.0),
    MixEntry::new(AssetKey::Dynamic, 0.0),
    MixEntry::new(AssetKey::Crypto, 0.0),
];

const BALANCED_MIX: [MixEntry; 6] = [
    MixEntry::new(AssetKey::Cash, 15.0),
    MixEntry::new(AssetKey::Bonds, 25.0),
    MixEntry::new(AssetKey::Etf, 45.0),
    MixEntry::new(AssetKey::Gold, 10.0),
    MixEntry::new(AssetKey::Dynamic, 5.0),
    MixEntry::new(AssetKey::Crypto, 0.0),
];

const GROWTH_MIX: [MixEntry; 6] = [
    MixEntry::new(AssetKey::Cash, 5.0),
    MixEntry::new(AssetKey::Bonds, 10.0),
    MixEntry::new(AssetKey::Etf, 65.0),
    MixEntry::new(AssetKey::Gold, 5.0),
    MixEntry::new(AssetKey::Dynamic, 10.0),
    MixEntry::new(AssetKey::Crypto, 5.0),
];

/// Eén canonieke start-allocatie per risicoprofiel, oplopend in risico.
pub static PORTFOLIO_PRESETS: [PortfolioPreset; 3] = [
    PortfolioPreset {
        id: RiskPreference::Conservative,
        label: "Conservative",
        mix: &CONSERVATIVE_MIX,
    },
    PortfolioPreset {
        id: RiskPreference::Balanced,
        label: "Balanced",
        mix: &BALANCED_MIX,
    },
    PortfolioPreset {
        id: RiskPreference::Growth,
        label: "Growth",
        mix: &GROWTH_MIX,
    },
];

pub fn preset_for(risk_preference: RiskPreference) -> &'static PortfolioPreset {
    match risk_preference {
        RiskPreference::Conservative => &PORTFOLIO_PRESETS[0],
        RiskPreference::Balanced => &PORTFOLIO_PRESETS[1],
        RiskPreference::Growth => &PORTFOLIO_PRESETS[2],
    }
}

/// Basis-mix afgestemd op het profiel.
///
/// - Klein planvolume: obligaties zijn toch niet koopbaar, dus dat deel gaat
///   half naar cash en half naar ETF's.
/// - Lange horizon (niet-conservatief): een paar procentpunt cash → ETF.
///
/// Zonder profiel komt de statische preset terug. Sommeert altijd tot 100.
pub fn dynamic_default_mix(
    config: &PlannerConfig,
    risk_preference: RiskPreference,
    profile: Option<&ClientProfile>,
) -> Mix {
    let mut mix = preset_for(risk_preference).mix.to_vec();

    if let Some(raw) = profile {
        let profile = raw.sanitized();
        let tuning = &config.presets;
        let volume = profile.plan_volume_eur(config.plan_volume_months);

        // 1) Klein kapitaal
        if volume < tuning.small_plan_eur {
            let bonds = take(&mut mix, AssetKey::Bonds, f64::INFINITY);
            add(&mut mix, AssetKey::Cash, bonds / 2.0);
            add(&mut mix, AssetKey::Etf, bonds / 2.0);
        }

        // 2) Lange horizon
        if risk_preference != RiskPreference::Conservative
            && profile.horizon() >= tuning.long_horizon_years
        {
            let tilt = take(&mut mix, AssetKey::Cash, tuning.long_horizon_tilt_pp.max(0.0));
            add(&mut mix, AssetKey::Etf, tilt);
        }
    }

    normalize_mix(&mut mix);
    mix
}

/// `dynamic_default_mix` met de default-calibratie.
pub fn get_dynamic_default_mix(risk_preference: RiskPreference, profile: Option<&ClientProfile>) -> Mix {
    dynamic_default_mix(crate::config::default_config(), risk_preference, profile)
}

fn take(mix: &mut [MixEntry], key: AssetKey, max_pct: f64) -> f64 {
    match mix.iter_mut().find(|e| e.key == key) {
        Some(e) => {
            let taken = e.pct.min(max_pct).max(0.0);
            e.pct -= taken;
            taken
        }
        None => 0.0,
    }
}

fn add(mix: &mut Vec<MixEntry>, key: AssetKey, pct: f64) {
    if pct <= 0.0 {
        return;
    }
    match mix.iter_mut().find(|e| e.key == key) {
        Some(e) => e.pct += pct,
        None => mix.push(MixEntry::new(key, pct)),
    }
}
