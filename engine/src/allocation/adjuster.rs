// src/allocation/adjuster.rs

use std::fmt;
use std::sync::LazyLock;

use serde::Serialize;
use tracing::{debug, warn};

use crate::allocation::presets::PortfolioPreset;
use crate::assets::{AssetKey, AssetTable, Mix, MixEntry, mix_total, normalize_mix};
use crate::config::PlannerConfig;
use crate::profile::{ClientProfile, RiskPreference};
use crate::risk::Stage;

/// Marge waarbinnen een score als "op de cap" telt.
pub const SCORE_EPSILON: f64 = 1e-9;

// ====== Output ======

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    EmptyMix,
    MinimumInvestment,
    Unavailable,
    RiskCapEnforced,
    RiskCapNotReached,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentWarning {
    pub kind: WarningKind,
    pub asset: Option<AssetKey>,
    pub message: String,
}

impl fmt::Display for AdjustmentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetMinimumCheck {
    pub key: AssetKey,
    pub minimum_eur: f64,
    pub plan_volume_eur: f64,
    pub shortfall_eur: f64,
    /// None = wordt met de huidige inleg nooit gehaald.
    pub months_to_reach: Option<u32>,
    pub gated: bool,
    pub removed_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityCheck {
    pub key: AssetKey,
    pub unlock_volume_eur: f64,
    pub min_horizon_years: u32,
    pub unlocked: bool,
    pub removed_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskCapEnforcement {
    pub risk_preference: RiskPreference,
    pub stage: Stage,
    pub cap: f64,
    pub score_before: f64,
    pub score_after: f64,
    pub target: Option<AssetKey>,
    pub shifted_pp: f64,
    pub iterations: usize,
    pub applied: bool,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReserveCheck {
    pub monthly_expenses_eur: f64,
    pub target_reserve_eur: f64,
    pub current_reserve_eur: f64,
    pub shortfall_eur: f64,
    /// None als er geen uitgaven bekend zijn.
    pub months_covered: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetCheck {
    /// None als er geen inkomen is opgegeven.
    pub monthly_surplus_eur: Option<f64>,
    pub contribution_exceeds_surplus: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentInfo {
    pub stage: Stage,
    pub plan_volume_eur: f64,
    pub asset_minima: Vec<AssetMinimumCheck>,
    pub availability: Vec<AvailabilityCheck>,
    pub risk_cap_enforcement: RiskCapEnforcement,
    pub reserve: ReserveCheck,
    pub budget: BudgetCheck,
    pub risk_score: f64,
    pub expected_yield: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentResult {
    pub mix: Mix,
    pub warnings: Vec<AdjustmentWarning>,
    pub info: AdjustmentInfo,
}

impl AdjustmentResult {
    pub fn warning_messages(&self) -> Vec<&str> {
        self.warnings.iter().map(|w| w.message.as_str()).collect()
    }

    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedPreset {
    pub id: RiskPreference,
    pub label: &'static str,
    pub result: AdjustmentResult,
}

// ====== Adjuster ======

/// Stateless constraint-pipeline over een vaste calibratie.
///
/// Volgorde per call: minimum-inleg → beschikbaarheid → risk-cap →
/// normalisatie. Latere stappen werken op de al gesnoeide asset-set.
#[derive(Debug, Clone)]
pub struct MixAdjuster {
    config: PlannerConfig,
    assets: AssetTable,
}

impl MixAdjuster {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            assets: config.asset_table(),
            config,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn assets(&self) -> &AssetTable {
        &self.assets
    }

    /// Risico-score met de tier-correctie uit de config.
    pub fn risk_score(&self, mix: &[MixEntry], risk_preference: RiskPreference) -> f64 {
        self.assets.risk_score(
            mix,
            risk_preference,
            Some(self.config.enforcement.tier_adjustment_factor),
        )
    }

    /// Verwachte opbrengst met dezelfde tier-correctie als de score.
    pub fn approx_yield(&self, mix: &[MixEntry], risk_preference: RiskPreference) -> f64 {
        self.assets.approx_yield(
            mix,
            Some(risk_preference),
            Some(self.config.enforcement.tier_adjustment_factor),
        )
    }

    pub fn stage_for(&self, profile: &ClientProfile) -> Stage {
        let p = profile.sanitized();
        self.config
            .stage
            .detect(p.lump_sum_eur, p.monthly_eur, p.horizon(), p.goal_assets_eur)
    }

    pub fn cap_for(&self, profile: &ClientProfile) -> f64 {
        self.config
            .risk_caps
            .cap_for(profile.risk_preference, self.stage_for(profile))
    }

    /// Hoofdfunctie: faalt nooit, geeft altijd een mix die optelt tot 100.
    pub fn adjust(&self, base_mix: &[MixEntry], profile: &ClientProfile) -> AdjustmentResult {
        let profile = profile.sanitized();
        let risk_preference = profile.risk_preference;
        let plan_volume = profile.plan_volume_eur(self.config.plan_volume_months);
        let stage = self.config.stage.detect(
            profile.lump_sum_eur,
            profile.monthly_eur,
            profile.horizon(),
            profile.goal_assets_eur,
        );

        let mut warnings = Vec::new();
        // Alleen voor warnings: welke mix-posities al gemeld zijn
        let mut blocked: Vec<AssetKey> = Vec::new();
        // Alles wat de klant niet kan kopen, ook buiten de basis-mix
        let ineligible = self.ineligible_assets(plan_volume, profile.horizon());

        // ===== 0) Basis-mix opschonen =====
        let mut mix = sanitize_mix(base_mix);
        if mix_total(&mix) <= 0.0 {
            let target = self.fallback_target(&mix, &ineligible);
            set_pct(&mut mix, target, 100.0);
            debug!(target = ?target, "empty base mix, falling back");
            warnings.push(AdjustmentWarning {
                kind: WarningKind::EmptyMix,
                asset: Some(target),
                message: format!(
                    "The starting allocation was empty, so the full amount was placed in {}.",
                    target
                ),
            });
        }

        // ===== 1) Minimum-inleg =====
        let mut asset_minima = Vec::new();
        let keys: Vec<AssetKey> = mix.iter().map(|e| e.key).collect();

        for key in &keys {
            let Some(minimum) = self
                .assets
                .get(*key)
                .and_then(|a| a.min_investment_eur)
                .filter(|m| *m > 0.0)
            else {
                continue;
            };

            let gated = plan_volume < minimum;
            let shortfall = (minimum - plan_volume).max(0.0);
            let months = months_to_reach(minimum, profile.lump_sum_eur, profile.monthly_eur);

            let removed = if gated {
                blocked.push(*key);
                self.zero_and_redistribute(&mut mix, *key, &ineligible)
            } else {
                0.0
            };

            if removed > 0.0 {
                debug!(asset = ?key, minimum, plan_volume, removed, "minimum investment not reached");
                warnings.push(AdjustmentWarning {
                    kind: WarningKind::MinimumInvestment,
                    asset: Some(*key),
                    message: minimum_message(
                        *key,
                        minimum,
                        plan_volume,
                        shortfall,
                        months,
                        self.config.plan_volume_months,
                    ),
                });
            }

            asset_minima.push(AssetMinimumCheck {
                key: *key,
                minimum_eur: minimum,
                plan_volume_eur: plan_volume,
                shortfall_eur: shortfall,
                months_to_reach: if gated { months } else { Some(0) },
                gated,
                removed_pct: removed,
            });
        }

        // ===== 2) Beschikbaarheid / locking =====
        let mut availability = Vec::new();
        let horizon = profile.horizon();

        for key in &keys {
            let Some(rule) = self.config.availability_rule(*key) else {
                continue;
            };

            let volume_ok = plan_volume >= rule.unlock_volume_eur;
            let horizon_ok = horizon >= rule.min_horizon_years;
            let unlocked = volume_ok && horizon_ok;

            let removed = if !unlocked && !blocked.contains(key) {
                blocked.push(*key);
                self.zero_and_redistribute(&mut mix, *key, &ineligible)
            } else {
                0.0
            };

            if removed > 0.0 {
                debug!(asset = ?key, unlock = rule.unlock_volume_eur, plan_volume, horizon, "asset locked");
                let mut reasons = Vec::new();
                if !volume_ok {
                    reasons.push(format!(
                        "a plan volume of at least {} (currently {})",
                        fmt_eur(rule.unlock_volume_eur),
                        fmt_eur(plan_volume)
                    ));
                }
                if !horizon_ok {
                    reasons.push(format!(
                        "an investment horizon of at least {} years (currently {})",
                        rule.min_horizon_years, horizon
                    ));
                }
                warnings.push(AdjustmentWarning {
                    kind: WarningKind::Unavailable,
                    asset: Some(*key),
                    message: format!(
                        "{} is not available for this plan yet and was removed from the allocation. It requires {}.",
                        key,
                        reasons.join(" and ")
                    ),
                });
            }

            availability.push(AvailabilityCheck {
                key: *key,
                unlock_volume_eur: rule.unlock_volume_eur,
                min_horizon_years: rule.min_horizon_years,
                unlocked,
                removed_pct: removed,
            });
        }

        // Zonder normalisatie zou de score op een mix != 100 te laag uitvallen
        normalize_mix(&mut mix);

        // ===== 3) Risk-cap =====
        let cap = self.config.risk_caps.cap_for(risk_preference, stage);
        let enforcement = self.enforce_risk_cap(&mut mix, risk_preference, stage, cap, &ineligible);

        if enforcement.shifted_pp > 0.0 {
            warnings.push(AdjustmentWarning {
                kind: WarningKind::RiskCapEnforced,
                asset: enforcement.target,
                message: format!(
                    "The risk score was reduced from {:.2} to {:.2} to stay within the limit of {:.1} for a {} investor in the {} stage. {:.1} percentage points were moved into {}.",
                    enforcement.score_before,
                    enforcement.score_after,
                    cap,
                    risk_preference,
                    stage,
                    enforcement.shifted_pp,
                    enforcement
                        .target
                        .map(|k| k.label())
                        .unwrap_or(AssetKey::Cash.label()),
                ),
            });
        }
        if enforcement.applied && !enforcement.converged {
            warn!(
                cap,
                score = enforcement.score_after,
                iterations = enforcement.iterations,
                "risk cap could not be reached"
            );
            warnings.push(AdjustmentWarning {
                kind: WarningKind::RiskCapNotReached,
                asset: None,
                message: format!(
                    "The risk limit of {:.1} for a {} investor in the {} stage could not be fully met. The lowest achievable risk score for this plan is {:.2}.",
                    cap, risk_preference, stage, enforcement.score_after
                ),
            });
        }

        // ===== 4) Normalisatie =====
        if !normalize_mix(&mut mix) {
            // kan alleen als alles weg-gegated is zonder ontvanger
            let target = self.fallback_target(&mix, &ineligible);
            set_pct(&mut mix, target, 100.0);
        }

        let risk_score = self.risk_score(&mix, risk_preference);
        let expected_yield = self.approx_yield(&mix, risk_preference);

        AdjustmentResult {
            mix,
            warnings,
            info: AdjustmentInfo {
                stage,
                plan_volume_eur: plan_volume,
                asset_minima,
                availability,
                risk_cap_enforcement: RiskCapEnforcement {
                    score_after: if enforcement.applied { risk_score } else { enforcement.score_after },
                    ..enforcement
                },
                reserve: reserve_check(&profile),
                budget: budget_check(&profile),
                risk_score,
                expected_yield,
            },
        }
    }

    pub fn adjust_preset(&self, preset: &PortfolioPreset, profile: &ClientProfile) -> AdjustedPreset {
        AdjustedPreset {
            id: preset.id,
            label: preset.label,
            result: self.adjust(preset.mix, profile),
        }
    }

    /// Schuift in vaste stappen van het riskantste naar het veiligste
    /// beschikbare asset tot de score onder de cap zit. Begrensd door
    /// `EnforcementConfig::max_iterations`.
    fn enforce_risk_cap(
        &self,
        mix: &mut Mix,
        risk_preference: RiskPreference,
        stage: Stage,
        cap: f64,
        blocked: &[AssetKey],
    ) -> RiskCapEnforcement {
        let score_before = self.risk_score(mix, risk_preference);

        let mut out = RiskCapEnforcement {
            risk_preference,
            stage,
            cap,
            score_before,
            score_after: score_before,
            target: None,
            shifted_pp: 0.0,
            iterations: 0,
            applied: false,
            converged: true,
        };

        if score_before <= cap + SCORE_EPSILON {
            return out;
        }

        out.applied = true;
        out.converged = false;

        let target = self.fallback_target(mix, blocked);
        if !mix.iter().any(|e| e.key == target) {
            mix.push(MixEntry::new(target, 0.0));
        }
        out.target = Some(target);

        let target_weight = self.assets.risk_weight(target);
        let step = self.config.enforcement.effective_step();
        let max_iter = self.config.enforcement.max_iterations(mix.len());

        while out.iterations < max_iter {
            if self.risk_score(mix, risk_preference) <= cap + SCORE_EPSILON {
                out.converged = true;
                break;
            }

            // Donor: hoogste risicogewicht met ruimte boven de floor
            let donor = mix
                .iter()
                .enumerate()
                .filter(|(_, e)| e.key != target)
                .filter(|(_, e)| self.assets.risk_weight(e.key) > target_weight)
                .filter(|(_, e)| e.pct - self.assets.floor_pct(e.key) > SCORE_EPSILON)
                .fold(None::<(usize, f64)>, |best, (i, e)| {
                    let w = self.assets.risk_weight(e.key);
                    match best {
                        Some((_, bw)) if bw >= w => best,
                        _ => Some((i, w)),
                    }
                })
                .map(|(i, _)| i);

            let Some(donor) = donor else {
                break;
            };

            let room = mix[donor].pct - self.assets.floor_pct(mix[donor].key);
            let shift = step.min(room);

            mix[donor].pct -= shift;
            if let Some(t) = mix.iter_mut().find(|e| e.key == target) {
                t.pct += shift;
            }
            out.shifted_pp += shift;
            out.iterations += 1;
        }

        out.score_after = self.risk_score(mix, risk_preference);
        if out.score_after <= cap + SCORE_EPSILON {
            out.converged = true;
        }

        debug!(
            cap,
            before = out.score_before,
            after = out.score_after,
            shifted_pp = out.shifted_pp,
            iterations = out.iterations,
            converged = out.converged,
            "risk cap enforcement"
        );

        out
    }

    /// Zet `key` op nul en verdeelt de vrijgekomen procentpunten naar rato
    /// over de resterende niet-nul, niet-geblokkeerde posities.
    fn zero_and_redistribute(&self, mix: &mut Mix, key: AssetKey, blocked: &[AssetKey]) -> f64 {
        let Some(idx) = mix.iter().position(|e| e.key == key) else {
            return 0.0;
        };

        let removed = mix[idx].pct;
        if removed <= 0.0 {
            return 0.0;
        }
        mix[idx].pct = 0.0;

        let receivers_total: f64 = mix
            .iter()
            .filter(|e| e.pct > 0.0 && !blocked.contains(&e.key))
            .map(|e| e.pct)
            .sum();

        if receivers_total > 0.0 {
            for e in mix.iter_mut() {
                if e.pct > 0.0 && !blocked.contains(&e.key) {
                    e.pct += removed * e.pct / receivers_total;
                }
            }
        } else {
            let target = self.fallback_target(mix, blocked);
            let current = mix.iter().find(|e| e.key == target).map(|e| e.pct).unwrap_or(0.0);
            set_pct(mix, target, current + removed);
        }

        removed
    }

    /// Assets onder hun minimum-inleg of nog op slot, los van de basis-mix.
    /// Cash valt hier nooit onder (zie `PlannerConfig::validate`).
    fn ineligible_assets(&self, plan_volume: f64, horizon: u32) -> Vec<AssetKey> {
        self.assets
            .assets
            .iter()
            .map(|a| a.key)
            .filter(|key| {
                let below_minimum = self
                    .assets
                    .get(*key)
                    .and_then(|a| a.min_investment_eur)
                    .is_some_and(|m| m > 0.0 && plan_volume < m);
                let locked = self.config.availability_rule(*key).is_some_and(|r| {
                    plan_volume < r.unlock_volume_eur || horizon < r.min_horizon_years
                });
                below_minimum || locked
            })
            .collect()
    }

    /// Laagste-risico asset dat niet geblokkeerd is; cash als laatste redmiddel.
    fn fallback_target(&self, mix: &[MixEntry], blocked: &[AssetKey]) -> AssetKey {
        let candidates = mix
            .iter()
            .map(|e| e.key)
            .chain(self.assets.assets.iter().map(|a| a.key))
            .filter(|k| !blocked.contains(k));

        self.assets.lowest_risk_of(candidates).unwrap_or(AssetKey::Cash)
    }
}

impl Default for MixAdjuster {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

// ====== Helpers ======

/// Clamp naar 0..=100, NaN → 0, dubbele keys samenvoegen op eerste positie.
fn sanitize_mix(base: &[MixEntry]) -> Mix {
    let mut out: Mix = Vec::with_capacity(base.len());
    for e in base {
        let pct = if e.pct.is_finite() { e.pct.clamp(0.0, 100.0) } else { 0.0 };
        match out.iter_mut().find(|o| o.key == e.key) {
            Some(existing) => existing.pct = (existing.pct + pct).min(100.0),
            None => out.push(MixEntry::new(e.key, pct)),
        }
    }
    out
}

fn set_pct(mix: &mut Mix, key: AssetKey, pct: f64) {
    match mix.iter_mut().find(|e| e.key == key) {
        Some(e) => e.pct = pct,
        None => mix.push(MixEntry::new(key, pct)),
    }
}

/// Maanden tot lump + n * monthly >= minimum; None bij nul inleg.
pub fn months_to_reach(minimum_eur: f64, lump_sum_eur: f64, monthly_eur: f64) -> Option<u32> {
    let missing = minimum_eur - lump_sum_eur;
    if missing <= 0.0 {
        return Some(0);
    }
    if monthly_eur.is_nan() || monthly_eur <= 0.0 {
        return None;
    }
    Some((missing / monthly_eur).ceil() as u32)
}

fn minimum_message(
    key: AssetKey,
    minimum: f64,
    plan_volume: f64,
    shortfall: f64,
    months: Option<u32>,
    volume_months: u32,
) -> String {
    let eta = match months {
        Some(m) => format!(
            " At your current monthly contribution the minimum is reached in about {} months.",
            m
        ),
        None => " Without a monthly contribution the minimum will not be reached.".to_string(),
    };

    format!(
        "{} was removed from the allocation: the minimum investment is {}, but your plan volume over the first {} months is {} ({} short).{}",
        key,
        fmt_eur(minimum),
        volume_months,
        fmt_eur(plan_volume),
        fmt_eur(shortfall),
        eta
    )
}

/// "12,500 EUR"
pub fn fmt_eur(amount: f64) -> String {
    let rounded = if amount.is_finite() && amount > 0.0 { amount.round() } else { 0.0 };
    let digits = format!("{:.0}", rounded);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{} EUR", grouped)
}

fn reserve_check(profile: &ClientProfile) -> ReserveCheck {
    let expenses = profile.monthly_expenses_eur();
    let target = expenses * profile.reserve_target_months;
    let current = profile.cash_reserve_eur;

    ReserveCheck {
        monthly_expenses_eur: expenses,
        target_reserve_eur: target,
        current_reserve_eur: current,
        shortfall_eur: (target - current).max(0.0),
        months_covered: if expenses > 0.0 { Some(current / expenses) } else { None },
    }
}

fn budget_check(profile: &ClientProfile) -> BudgetCheck {
    if profile.monthly_income_eur <= 0.0 {
        return BudgetCheck {
            monthly_surplus_eur: None,
            contribution_exceeds_surplus: false,
        };
    }

    let surplus = profile.monthly_income_eur - profile.monthly_expenses_eur();
    BudgetCheck {
        monthly_surplus_eur: Some(surplus),
        contribution_exceeds_surplus: profile.monthly_eur > surplus,
    }
}

// ====== Convenience op de default-calibratie ======

static DEFAULT_ADJUSTER: LazyLock<MixAdjuster> = LazyLock::new(MixAdjuster::default);

pub fn default_adjuster() -> &'static MixAdjuster {
    &DEFAULT_ADJUSTER
}

pub fn get_adjusted_mix(base_mix: &[MixEntry], profile: &ClientProfile) -> AdjustmentResult {
    default_adjuster().adjust(base_mix, profile)
}

pub fn get_adjusted_preset(preset: &PortfolioPreset, profile: &ClientProfile) -> AdjustedPreset {
    default_adjuster().adjust_preset(preset, profile)
}
