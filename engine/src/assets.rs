// src/assets.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::profile::RiskPreference;

// ====== Asset-klassen ======

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKey {
    Cash,
    Bonds,
    Etf,
    Gold,
    Dynamic, // alternatieve / dynamische strategieën
    Crypto,
}

impl AssetKey {
    pub const ALL: [AssetKey; 6] = [
        AssetKey::Cash,
        AssetKey::Bonds,
        AssetKey::Etf,
        AssetKey::Gold,
        AssetKey::Dynamic,
        AssetKey::Crypto,
    ];

    /// Naam zoals hij in waarschuwingen voor de klant verschijnt.
    pub fn label(&self) -> &'static str {
        match self {
            AssetKey::Cash => "Cash",
            AssetKey::Bonds => "Bonds",
            AssetKey::Etf => "Equity ETFs",
            AssetKey::Gold => "Gold",
            AssetKey::Dynamic => "Alternative strategies",
            AssetKey::Crypto => "Crypto",
        }
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixEntry {
    pub key: AssetKey,
    pub pct: f64, // procentpunten, 0..=100
}

impl MixEntry {
    pub const fn new(key: AssetKey, pct: f64) -> Self {
        Self { key, pct }
    }
}

/// Geordende allocatie; elke key hoogstens één keer.
pub type Mix = Vec<MixEntry>;

pub fn mix_total(mix: &[MixEntry]) -> f64 {
    mix.iter().map(|e| e.pct).sum()
}

pub fn pct_of(mix: &[MixEntry], key: AssetKey) -> f64 {
    mix.iter().filter(|e| e.key == key).map(|e| e.pct).sum()
}

/// Schaalt naar exact 100 zonder volgorde te wijzigen; nullen blijven nul.
/// Restdrift van de schaling gaat naar de grootste positie.
/// Geeft `false` als er niets te schalen valt (totaal <= 0).
pub fn normalize_mix(mix: &mut [MixEntry]) -> bool {
    let total = mix_total(mix);
    if !(total.is_finite() && total > 0.0) {
        return false;
    }

    let scale = 100.0 / total;
    for e in mix.iter_mut() {
        e.pct = (e.pct * scale).clamp(0.0, 100.0);
    }

    let drift = 100.0 - mix_total(mix);
    if drift != 0.0 {
        let largest = mix
            .iter_mut()
            .max_by(|a, b| a.pct.total_cmp(&b.pct));
        if let Some(e) = largest {
            e.pct = (e.pct + drift).clamp(0.0, 100.0);
        }
    }

    true
}

// ====== Statische gewichten per asset ======

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetSpec {
    pub key: AssetKey,
    pub risk_weight: f64,    // 0 .. 10
    pub expected_yield: f64, // fractie p.a., 0.07 = 7%
    /// Minimale aankoop (EUR); None = geen drempel.
    #[serde(default)]
    pub min_investment_eur: Option<f64>,
    /// Verplichte minimale allocatie die de risk-cap niet mag wegschuiven.
    #[serde(default)]
    pub floor_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetTable {
    pub assets: Vec<AssetSpec>,
}

pub const MAX_RISK_SCORE: f64 = 10.0;

impl AssetTable {
    pub fn new(assets: Vec<AssetSpec>) -> Self {
        Self { assets }
    }

    pub fn get(&self, key: AssetKey) -> Option<&AssetSpec> {
        self.assets.iter().find(|a| a.key == key)
    }

    /// Onbekende key telt als nul risico (geen warning).
    pub fn risk_weight(&self, key: AssetKey) -> f64 {
        self.get(key).map(|a| a.risk_weight).unwrap_or(0.0)
    }

    pub fn expected_yield(&self, key: AssetKey) -> f64 {
        self.get(key).map(|a| a.expected_yield).unwrap_or(0.0)
    }

    pub fn floor_pct(&self, key: AssetKey) -> f64 {
        self.get(key).map(|a| a.floor_pct.max(0.0)).unwrap_or(0.0)
    }

    /// Gewogen risico-score op een 0..10 schaal.
    ///
    /// Valideert de mix niet: werkt ook op tussenstanden die (nog) niet op
    /// 100 uitkomen. `adjustment_factor` schaalt de score met de
    /// gevoeligheid van het risicoprofiel: `1 + factor * sensitivity`.
    pub fn risk_score(
        &self,
        mix: &[MixEntry],
        risk_pref: RiskPreference,
        adjustment_factor: Option<f64>,
    ) -> f64 {
        let base: f64 = mix
            .iter()
            .map(|e| finite_or_zero(e.pct) / 100.0 * self.risk_weight(e.key))
            .sum();

        let score = base * tier_multiplier(Some(risk_pref), adjustment_factor);
        if score.is_finite() {
            score.clamp(0.0, MAX_RISK_SCORE)
        } else {
            0.0
        }
    }

    /// Lineaire verwachte opbrengst (fractie p.a.), geen compounding.
    ///
    /// Met een risicoprofiel en factor krijgt de opbrengst dezelfde
    /// tier-correctie als `risk_score`; zonder profiel is hij tier-neutraal.
    pub fn approx_yield(
        &self,
        mix: &[MixEntry],
        risk_pref: Option<RiskPreference>,
        adjustment_factor: Option<f64>,
    ) -> f64 {
        let base: f64 = mix
            .iter()
            .map(|e| finite_or_zero(e.pct) / 100.0 * self.expected_yield(e.key))
            .sum();

        let y = base * tier_multiplier(risk_pref, adjustment_factor);
        if y.is_finite() { y } else { 0.0 }
    }

    /// Asset met het laagste risicogewicht binnen `candidates`.
    /// Bij gelijk gewicht wint de eerste in de lijst.
    pub fn lowest_risk_of(&self, candidates: impl IntoIterator<Item = AssetKey>) -> Option<AssetKey> {
        let mut best: Option<(AssetKey, f64)> = None;
        for key in candidates {
            let w = self.risk_weight(key);
            match best {
                Some((_, bw)) if bw <= w => {}
                _ => best = Some((key, w)),
            }
        }
        best.map(|(k, _)| k)
    }
}

/// `1 + factor * sensitivity`, nooit negatief; 1 zonder profiel of factor.
fn tier_multiplier(risk_pref: Option<RiskPreference>, adjustment_factor: Option<f64>) -> f64 {
    match (risk_pref, adjustment_factor) {
        (Some(p), Some(f)) if f.is_finite() => (1.0 + f * p.sensitivity()).max(0.0),
        _ => 1.0,
    }
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() { x } else { 0.0 }
}

// ====== Convenience op de default-calibratie ======

pub fn risk_score(mix: &[MixEntry], risk_pref: RiskPreference, adjustment_factor: Option<f64>) -> f64 {
    crate::config::default_config()
        .asset_table()
        .risk_score(mix, risk_pref, adjustment_factor)
}

pub fn approx_yield(
    mix: &[MixEntry],
    risk_pref: Option<RiskPreference>,
    adjustment_factor: Option<f64>,
) -> f64 {
    crate::config::default_config()
        .asset_table()
        .approx_yield(mix, risk_pref, adjustment_factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::default_asset_table;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn zero_mix_scores_zero() {
        let table = default_asset_table();
        let mix: Mix = AssetKey::ALL.iter().map(|k| MixEntry::new(*k, 0.0)).collect();

        assert_eq!(table.risk_score(&mix, RiskPreference::Balanced, None), 0.0);
        assert_eq!(table.approx_yield(&mix, Some(RiskPreference::Growth), Some(0.05)), 0.0);
    }

    #[test]
    fn single_asset_mix_equals_asset_weight() {
        let table = default_asset_table();
        for key in AssetKey::ALL {
            let mix = vec![MixEntry::new(key, 100.0)];
            let score = table.risk_score(&mix, RiskPreference::Balanced, None);
            assert!(
                approx_eq(score, table.risk_weight(key), 1e-12),
                "{key:?}: expected score {} got {}",
                table.risk_weight(key),
                score
            );
        }
    }

    #[test]
    fn shifting_into_riskier_asset_increases_score() {
        let table = default_asset_table();
        let before = vec![MixEntry::new(AssetKey::Cash, 50.0), MixEntry::new(AssetKey::Etf, 50.0)];
        let after = vec![MixEntry::new(AssetKey::Cash, 40.0), MixEntry::new(AssetKey::Etf, 60.0)];

        let s0 = table.risk_score(&before, RiskPreference::Growth, Some(0.05));
        let s1 = table.risk_score(&after, RiskPreference::Growth, Some(0.05));
        assert!(s1 > s0, "expected {s1} > {s0}");
    }

    #[test]
    fn adjustment_factor_orders_tiers() {
        let table = default_asset_table();
        let mix = vec![MixEntry::new(AssetKey::Etf, 60.0), MixEntry::new(AssetKey::Bonds, 40.0)];

        let c = table.risk_score(&mix, RiskPreference::Conservative, Some(0.05));
        let b = table.risk_score(&mix, RiskPreference::Balanced, Some(0.05));
        let g = table.risk_score(&mix, RiskPreference::Growth, Some(0.05));
        assert!(c < b && b < g, "tier scaling not ordered: {c} {b} {g}");
    }

    #[test]
    fn unknown_asset_contributes_nothing() {
        let table = AssetTable::new(vec![AssetSpec {
            key: AssetKey::Cash,
            risk_weight: 1.0,
            expected_yield: 0.02,
            min_investment_eur: None,
            floor_pct: 0.0,
        }]);
        let mix = vec![MixEntry::new(AssetKey::Cash, 50.0), MixEntry::new(AssetKey::Crypto, 50.0)];

        assert!(approx_eq(table.risk_score(&mix, RiskPreference::Balanced, None), 0.5, 1e-12));
        assert!(approx_eq(table.approx_yield(&mix, None, None), 0.01, 1e-12));
    }

    #[test]
    fn yield_is_linear() {
        let table = default_asset_table();
        let mix = vec![MixEntry::new(AssetKey::Cash, 50.0), MixEntry::new(AssetKey::Etf, 50.0)];
        let expected = 0.5 * table.expected_yield(AssetKey::Cash) + 0.5 * table.expected_yield(AssetKey::Etf);
        assert!(approx_eq(table.approx_yield(&mix, None, None), expected, 1e-12));
    }

    #[test]
    fn yield_follows_tier_adjustment() {
        let table = default_asset_table();
        let mix = vec![MixEntry::new(AssetKey::Etf, 60.0), MixEntry::new(AssetKey::Bonds, 40.0)];
        let neutral = table.approx_yield(&mix, None, Some(0.05));

        let c = table.approx_yield(&mix, Some(RiskPreference::Conservative), Some(0.05));
        let b = table.approx_yield(&mix, Some(RiskPreference::Balanced), Some(0.05));
        let g = table.approx_yield(&mix, Some(RiskPreference::Growth), Some(0.05));
        assert!(c < b && b < g, "tier scaling not ordered: {c} {b} {g}");
        assert!(approx_eq(b, neutral, 1e-12), "balanced must equal the neutral yield");
        assert!(approx_eq(g, neutral * 1.05, 1e-12));
    }
}
