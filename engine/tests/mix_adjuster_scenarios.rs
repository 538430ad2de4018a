// tests/mix_adjuster_scenarios.rs

use mix_engine::allocation::{
    MixAdjuster, WarningKind, dynamic_default_mix, get_adjusted_mix, get_adjusted_preset,
    preset_for,
};
use mix_engine::assets::{AssetKey, MixEntry, mix_total, pct_of};
use mix_engine::config::PlannerConfig;
use mix_engine::profile::{ClientProfile, RiskPreference};
use mix_engine::risk::{Stage, adaptive_risk_cap, detect_stage};

fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

fn assert_valid_mix(mix: &[MixEntry]) {
    let total = mix_total(mix);
    assert!(approx_eq(total, 100.0, 0.01), "mix must sum to 100, got {total}");
    for e in mix {
        assert!(
            (0.0..=100.0).contains(&e.pct),
            "{:?}: pct out of range ({})",
            e.key,
            e.pct
        );
    }
}

#[test]
fn bonds_are_gated_below_minimum_investment() {
    // 1000 + 12 * 450 = 6400 EUR, ruim onder de 10k obligatie-drempel
    let profile = ClientProfile::with_plan(1_000.0, 450.0, 40);
    let result = get_adjusted_mix(preset_for(RiskPreference::Conservative).mix, &profile);

    assert_valid_mix(&result.mix);
    assert_eq!(pct_of(&result.mix, AssetKey::Bonds), 0.0, "bonds must be forced to 0%");
    assert!(approx_eq(result.info.plan_volume_eur, 6_400.0, 1e-9));

    let w = result
        .warnings
        .iter()
        .find(|w| w.kind == WarningKind::MinimumInvestment)
        .expect("minimum investment warning");
    assert_eq!(w.asset, Some(AssetKey::Bonds));
    assert!(w.message.contains("Bonds"), "warning must name the asset: {}", w.message);
    assert!(w.message.contains("3,600 EUR"), "warning must state the shortfall: {}", w.message);
    assert!(w.message.contains("20 months"), "warning must state the ETA: {}", w.message);

    let check = result
        .info
        .asset_minima
        .iter()
        .find(|c| c.key == AssetKey::Bonds)
        .expect("bonds minimum check");
    assert!(check.gated);
    assert_eq!(check.months_to_reach, Some(20));
    assert!(approx_eq(check.removed_pct, 40.0, 1e-9));
}

#[test]
fn gated_share_is_redistributed_in_proportion() {
    // Balanced-klant: cap 4.5 grijpt hier niet in, dus ratio's blijven zuiver
    let profile =
        ClientProfile::with_plan(1_000.0, 450.0, 40).with_risk_preference(RiskPreference::Balanced);
    let result = get_adjusted_mix(preset_for(RiskPreference::Conservative).mix, &profile);

    assert!(!result.has_warning(WarningKind::RiskCapEnforced));
    assert_eq!(result.warnings.len(), 1, "only bonds should fire: {:?}", result.warning_messages());

    // Origineel cash:etf:gold = 30:20:10
    let cash = pct_of(&result.mix, AssetKey::Cash);
    let etf = pct_of(&result.mix, AssetKey::Etf);
    let gold = pct_of(&result.mix, AssetKey::Gold);
    assert!(approx_eq(cash / etf, 1.5, 1e-9), "cash:etf ratio changed ({cash}:{etf})");
    assert!(approx_eq(etf / gold, 2.0, 1e-9), "etf:gold ratio changed ({etf}:{gold})");
    assert!(approx_eq(cash, 50.0, 1e-9));
}

#[test]
fn zero_monthly_rate_has_no_eta() {
    let profile = ClientProfile::with_plan(5_000.0, 0.0, 20);
    let result = get_adjusted_mix(preset_for(RiskPreference::Conservative).mix, &profile);

    let check = result
        .info
        .asset_minima
        .iter()
        .find(|c| c.key == AssetKey::Bonds)
        .expect("bonds minimum check");
    assert!(check.gated);
    assert_eq!(check.months_to_reach, None);

    let w = result
        .warnings
        .iter()
        .find(|w| w.asset == Some(AssetKey::Bonds))
        .expect("bonds warning");
    assert!(w.message.contains("will not be reached"), "got: {}", w.message);
}

#[test]
fn locked_assets_follow_minimum_checks_in_warning_order() {
    // Planvolume 4200, horizon 3: bonds gegated, dynamic en crypto op slot
    let profile =
        ClientProfile::with_plan(3_000.0, 100.0, 3).with_risk_preference(RiskPreference::Growth);
    let result = get_adjusted_mix(preset_for(RiskPreference::Growth).mix, &profile);

    assert_valid_mix(&result.mix);
    let kinds: Vec<WarningKind> = result.warnings.iter().map(|w| w.kind).collect();
    assert_eq!(
        kinds,
        vec![
            WarningKind::MinimumInvestment,
            WarningKind::Unavailable,
            WarningKind::Unavailable,
        ]
    );
    let assets: Vec<Option<AssetKey>> = result.warnings.iter().map(|w| w.asset).collect();
    assert_eq!(
        assets,
        vec![Some(AssetKey::Bonds), Some(AssetKey::Dynamic), Some(AssetKey::Crypto)]
    );

    for key in [AssetKey::Bonds, AssetKey::Dynamic, AssetKey::Crypto] {
        assert_eq!(pct_of(&result.mix, key), 0.0, "{key:?} must be removed");
    }

    let crypto_msg = &result.warnings[2].message;
    assert!(crypto_msg.contains("plan volume"), "got: {crypto_msg}");
    assert!(crypto_msg.contains("horizon"), "got: {crypto_msg}");

    assert_eq!(result.info.stage, Stage::Builder);
}

#[test]
fn risk_cap_shifts_riskiest_assets_into_cash_first() {
    let profile = ClientProfile::with_plan(200_000.0, 0.0, 20);
    let result = get_adjusted_mix(preset_for(RiskPreference::Growth).mix, &profile);

    assert_valid_mix(&result.mix);
    assert_eq!(result.info.stage, Stage::Established);

    let enforcement = &result.info.risk_cap_enforcement;
    assert!(enforcement.applied && enforcement.converged);
    assert_eq!(enforcement.target, Some(AssetKey::Cash));
    assert!(enforcement.score_before > enforcement.cap);
    assert!(result.info.risk_score <= enforcement.cap + 1e-6);

    assert_eq!(pct_of(&result.mix, AssetKey::Crypto), 0.0);
    assert_eq!(pct_of(&result.mix, AssetKey::Dynamic), 0.0);
    assert!(pct_of(&result.mix, AssetKey::Etf) > 0.0);

    let w = result
        .warnings
        .iter()
        .find(|w| w.kind == WarningKind::RiskCapEnforced)
        .expect("cap warning");
    assert!(w.message.contains("4.0"), "cap must be in the message: {}", w.message);
    assert!(!result.has_warning(WarningKind::RiskCapNotReached));
}

#[test]
fn unreachable_cap_is_reported_separately() {
    let mut cfg = PlannerConfig::default();
    for a in cfg.assets.iter_mut() {
        if a.key == AssetKey::Crypto {
            a.floor_pct = 60.0;
        }
    }
    let adjuster = MixAdjuster::new(cfg);
    let profile = ClientProfile::with_plan(200_000.0, 0.0, 20);
    let base = vec![MixEntry::new(AssetKey::Cash, 0.0), MixEntry::new(AssetKey::Crypto, 100.0)];

    let result = adjuster.adjust(&base, &profile);

    assert_valid_mix(&result.mix);
    assert!(approx_eq(pct_of(&result.mix, AssetKey::Crypto), 60.0, 1e-9));
    assert!(!result.info.risk_cap_enforcement.converged);
    assert!(result.info.risk_score > result.info.risk_cap_enforcement.cap);

    let kinds: Vec<WarningKind> = result.warnings.iter().map(|w| w.kind).collect();
    assert_eq!(kinds, vec![WarningKind::RiskCapEnforced, WarningKind::RiskCapNotReached]);
    assert_ne!(result.warnings[0].message, result.warnings[1].message);
    assert!(result.warnings[1].message.contains("could not be fully met"));
}

#[test]
fn empty_base_mix_falls_back_to_cash() {
    let profile = ClientProfile::with_plan(10_000.0, 100.0, 10);
    let result = get_adjusted_mix(&[], &profile);

    assert_eq!(result.mix, vec![MixEntry::new(AssetKey::Cash, 100.0)]);
    assert!(result.has_warning(WarningKind::EmptyMix));
}

#[test]
fn out_of_domain_profile_is_clamped_not_rejected() {
    let profile = ClientProfile {
        lump_sum_eur: -5_000.0,
        monthly_eur: f64::NAN,
        horizon_years: -3,
        goal_assets_eur: -1.0,
        ..ClientProfile::default()
    };
    let result = get_adjusted_mix(preset_for(RiskPreference::Balanced).mix, &profile);

    assert_valid_mix(&result.mix);
    assert_eq!(result.info.plan_volume_eur, 0.0);
}

#[test]
fn malformed_base_mix_is_normalized() {
    let profile = ClientProfile::with_plan(500_000.0, 0.0, 25).with_risk_preference(RiskPreference::Growth);
    let base = vec![
        MixEntry::new(AssetKey::Etf, 30.0),
        MixEntry::new(AssetKey::Cash, -10.0),
        MixEntry::new(AssetKey::Etf, 10.0),
        MixEntry::new(AssetKey::Cash, 20.0),
    ];

    let result = get_adjusted_mix(&base, &profile);

    assert_valid_mix(&result.mix);
    let keys: Vec<AssetKey> = result.mix.iter().map(|e| e.key).collect();
    assert_eq!(keys, vec![AssetKey::Etf, AssetKey::Cash], "order must be preserved");
}

#[test]
fn identical_input_gives_identical_result() {
    let profile = ClientProfile::with_plan(2_500.0, 275.0, 17).with_risk_preference(RiskPreference::Growth);
    let base = preset_for(RiskPreference::Growth).mix;

    let a = get_adjusted_mix(base, &profile);
    let b = get_adjusted_mix(base, &profile);
    assert_eq!(a, b);
}

#[test]
fn tiers_diverge_for_small_monthly_plan() {
    // Regressie: 0 inleg, 50/mnd, 30 jaar gaf vroeger drie identieke uitkomsten
    let adjuster = MixAdjuster::default();
    let base = ClientProfile::with_plan(0.0, 50.0, 30);

    let mut scores = Vec::new();
    let mut yields = Vec::new();
    for pref in RiskPreference::ALL {
        let profile = base.clone().with_risk_preference(pref);
        let mix = dynamic_default_mix(adjuster.config(), pref, Some(&profile));
        let result = adjuster.adjust(&mix, &profile);

        assert_valid_mix(&result.mix);
        assert_eq!(result.info.stage, Stage::Starter);
        scores.push(result.info.risk_score);
        yields.push(result.info.expected_yield);
    }

    assert!(
        scores[0] < scores[1] && scores[1] < scores[2],
        "risk scores must be strictly distinct and ordered: {scores:?}"
    );
    assert!(
        yields[0] < yields[1] && yields[1] < yields[2],
        "expected yields must be strictly distinct and ordered: {yields:?}"
    );
}

#[test]
fn conservative_preset_diverges_across_tiers() {
    // Zelfde vaste basis-mix voor alle tiers: score en opbrengst moeten toch uiteenlopen
    let base = ClientProfile::with_plan(0.0, 50.0, 30);
    let preset = preset_for(RiskPreference::Conservative);

    let mut scores = Vec::new();
    let mut yields = Vec::new();
    for pref in RiskPreference::ALL {
        let result = get_adjusted_preset(preset, &base.clone().with_risk_preference(pref)).result;
        assert_valid_mix(&result.mix);
        scores.push(result.info.risk_score);
        yields.push(result.info.expected_yield);
    }

    assert!(scores[0] < scores[1] && scores[1] < scores[2], "scores collapsed: {scores:?}");
    assert!(yields[0] < yields[1] && yields[1] < yields[2], "yields collapsed: {yields:?}");

    // Cash 60 / ETF 40 na gating: 0.6 * 2% + 0.4 * 7% = 4%, geschaald per tier
    assert!(approx_eq(yields[0], 0.038, 1e-9), "conservative yield {}", yields[0]);
    assert!(approx_eq(yields[1], 0.040, 1e-9), "balanced yield {}", yields[1]);
    assert!(approx_eq(yields[2], 0.042, 1e-9), "growth yield {}", yields[2]);
}

#[test]
fn cap_enforcement_never_moves_into_a_gated_asset() {
    // Bonds als laagste-risico asset, maar onbereikbaar bij 2200 EUR planvolume
    let mut cfg = PlannerConfig::default();
    for a in cfg.assets.iter_mut() {
        if a.key == AssetKey::Bonds {
            a.risk_weight = 0.2;
        }
    }
    cfg.validate().expect("config stays valid");

    let adjuster = MixAdjuster::new(cfg);
    let profile = ClientProfile::with_plan(1_000.0, 100.0, 30);
    let base = vec![MixEntry::new(AssetKey::Cash, 20.0), MixEntry::new(AssetKey::Etf, 80.0)];

    let result = adjuster.adjust(&base, &profile);

    assert_valid_mix(&result.mix);
    assert!(approx_eq(result.info.plan_volume_eur, 2_200.0, 1e-9));
    assert_eq!(pct_of(&result.mix, AssetKey::Bonds), 0.0, "bonds below minimum must stay at 0%");

    let enforcement = &result.info.risk_cap_enforcement;
    assert!(enforcement.applied && enforcement.converged);
    assert_eq!(enforcement.target, Some(AssetKey::Cash));
    assert!(result.info.risk_score <= enforcement.cap + 1e-6);
    assert!(
        result.warnings.iter().all(|w| w.asset != Some(AssetKey::Bonds)),
        "no warning may route allocation into bonds: {:?}",
        result.warning_messages()
    );
}

#[test]
fn adjusted_preset_carries_id_and_label() {
    let profile = ClientProfile::with_plan(20_000.0, 300.0, 15);
    let adjusted = get_adjusted_preset(preset_for(RiskPreference::Balanced), &profile);

    assert_eq!(adjusted.id, RiskPreference::Balanced);
    assert_eq!(adjusted.label, "Balanced");
    assert_valid_mix(&adjusted.result.mix);
}

#[test]
fn stage_and_cap_match_public_lookups() {
    let profile =
        ClientProfile::with_plan(40_000.0, 800.0, 12).with_risk_preference(RiskPreference::Balanced);
    let result = get_adjusted_mix(preset_for(RiskPreference::Balanced).mix, &profile);

    let stage = detect_stage(40_000.0, 800.0, 12, 0.0);
    assert_eq!(result.info.stage, stage);
    assert_eq!(
        result.info.risk_cap_enforcement.cap,
        adaptive_risk_cap(RiskPreference::Balanced, stage)
    );
}

#[test]
fn reserve_and_budget_diagnostics_do_not_touch_the_mix() {
    let profile = ClientProfile {
        monthly_income_eur: 3_000.0,
        fixed_expenses_eur: 1_200.0,
        variable_expenses_eur: 800.0,
        cash_reserve_eur: 4_000.0,
        reserve_target_months: 3.0,
        ..ClientProfile::with_plan(20_000.0, 1_500.0, 15)
    };
    let plain = ClientProfile::with_plan(20_000.0, 1_500.0, 15);
    let base = preset_for(RiskPreference::Conservative).mix;

    let with_budget = get_adjusted_mix(base, &profile);
    let without = get_adjusted_mix(base, &plain);
    assert_eq!(with_budget.mix, without.mix);
    assert_eq!(with_budget.warnings, without.warnings);

    let reserve = &with_budget.info.reserve;
    assert!(approx_eq(reserve.monthly_expenses_eur, 2_000.0, 1e-9));
    assert!(approx_eq(reserve.target_reserve_eur, 6_000.0, 1e-9));
    assert!(approx_eq(reserve.shortfall_eur, 2_000.0, 1e-9));
    assert_eq!(reserve.months_covered, Some(2.0));

    let budget = &with_budget.info.budget;
    assert_eq!(budget.monthly_surplus_eur, Some(1_000.0));
    assert!(budget.contribution_exceeds_surplus);

    assert_eq!(without.info.budget.monthly_surplus_eur, None);
    assert_eq!(without.info.reserve.months_covered, None);
}
